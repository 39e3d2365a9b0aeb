//! Run-scoped generation context.
//! Holds the selected options as typed fields and a separate extension map for
//! values defined by templates and modules.

use crate::constants::NONE_SELECTION;
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

/// Keys backed by typed fields of [`GenerationContext`]; templates cannot redefine them.
pub const WELL_KNOWN_KEYS: [&str; 6] =
    ["framework", "database", "provider", "auth", "features", "combo"];

/// A value visible to conditions and templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl ContextValue {
    /// Textual form used for comparisons and substitution.
    pub fn as_text(&self) -> String {
        match self {
            ContextValue::Bool(b) => b.to_string(),
            ContextValue::Text(s) => s.clone(),
            ContextValue::List(items) => items.join(", "),
        }
    }

    /// `false`, empty strings, `"false"`, `"none"` and empty lists are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            ContextValue::Bool(b) => *b,
            ContextValue::Text(s) => !(s.is_empty() || s == "false" || s == NONE_SELECTION),
            ContextValue::List(items) => !items.is_empty(),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Text(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

/// The options collected by the selection source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub framework: String,
    pub database: String,
    pub auth: String,
    pub provider: Option<String>,
    pub features: Vec<String>,
}

impl Selection {
    pub fn new<S: Into<String>>(framework: S) -> Self {
        Self {
            framework: framework.into(),
            database: NONE_SELECTION.to_string(),
            auth: NONE_SELECTION.to_string(),
            provider: None,
            features: Vec::new(),
        }
    }

    pub fn with_database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_auth<S: Into<String>>(mut self, auth: S) -> Self {
        self.auth = auth.into();
        self
    }

    pub fn with_provider<S: Into<String>>(mut self, provider: S) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_database(&self) -> bool {
        is_selected(&self.database)
    }

    pub fn has_auth(&self) -> bool {
        is_selected(&self.auth)
    }
}

fn is_selected(value: &str) -> bool {
    !value.is_empty() && value != NONE_SELECTION
}

/// Key/value environment for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub framework: String,
    pub database: String,
    pub provider: Option<String>,
    pub auth: String,
    pub features: Vec<String>,
    /// `"{database}-{framework}"`
    pub combo: String,
    extensions: IndexMap<String, ContextValue>,
}

impl GenerationContext {
    pub fn from_selection(selection: &Selection) -> Self {
        Self {
            framework: selection.framework.clone(),
            database: selection.database.clone(),
            provider: selection.provider.clone(),
            auth: selection.auth.clone(),
            features: selection.features.clone(),
            combo: format!("{}-{}", selection.database, selection.framework),
            extensions: IndexMap::new(),
        }
    }

    /// Looks up a key, typed fields first, then extensions.
    pub fn get(&self, key: &str) -> Option<ContextValue> {
        match key {
            "framework" => Some(ContextValue::Text(self.framework.clone())),
            "database" => Some(ContextValue::Text(self.database.clone())),
            "provider" => self.provider.clone().map(ContextValue::Text),
            "auth" => Some(ContextValue::Text(self.auth.clone())),
            "features" => Some(ContextValue::List(self.features.clone())),
            "combo" => Some(ContextValue::Text(self.combo.clone())),
            _ => self.extensions.get(key).cloned(),
        }
    }

    /// Writes an extension value. Returns `false` without writing when `name`
    /// is one of [`WELL_KNOWN_KEYS`].
    pub fn define<S: Into<String>>(&mut self, name: S, value: ContextValue) -> bool {
        let name = name.into();
        if WELL_KNOWN_KEYS.contains(&name.as_str()) {
            warn!("Refusing to redefine built-in context key '{}'", name);
            return false;
        }
        self.extensions.insert(name, value);
        true
    }

    pub fn extensions(&self) -> &IndexMap<String, ContextValue> {
        &self.extensions
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.iter().any(|f| f == name)
    }
}
