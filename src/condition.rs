//! Structural predicates over the generation context, used to gate
//! operations and patch operations.

use crate::context::{ContextValue, GenerationContext};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key whose condition value is a required subset rather than a single match
pub const FEATURES_KEY: &str = "features";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Text(String),
    /// Matches when the context value equals any element. For `features`,
    /// every element must be enabled.
    AnyOf(Vec<String>),
}

/// All key checks are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(pub IndexMap<String, ConditionValue>);

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K: Into<String>>(mut self, key: K, value: ConditionValue) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn matches(&self, context: &GenerationContext) -> bool {
        self.0.iter().all(|(key, expected)| {
            if key == FEATURES_KEY {
                features_match(expected, &context.features)
            } else {
                value_matches(expected, context.get(key).as_ref())
            }
        })
    }
}

/// An absent condition always matches.
pub fn matches(condition: Option<&Condition>, context: &GenerationContext) -> bool {
    condition.map_or(true, |c| c.matches(context))
}

fn features_match(expected: &ConditionValue, enabled: &[String]) -> bool {
    match expected {
        ConditionValue::AnyOf(required) => required.iter().all(|r| enabled.contains(r)),
        ConditionValue::Text(required) => enabled.contains(required),
        ConditionValue::Bool(b) => enabled.is_empty() != *b,
    }
}

fn value_matches(expected: &ConditionValue, actual: Option<&ContextValue>) -> bool {
    let Some(actual) = actual else {
        return matches!(expected, ConditionValue::Bool(false));
    };
    match (expected, actual) {
        (ConditionValue::Bool(b), value) => value.is_truthy() == *b,
        (ConditionValue::Text(s), ContextValue::List(items)) => items.contains(s),
        (ConditionValue::Text(s), value) => value.as_text() == *s,
        (ConditionValue::AnyOf(options), ContextValue::List(items)) => {
            items.iter().any(|item| options.contains(item))
        }
        (ConditionValue::AnyOf(options), value) => options.contains(&value.as_text()),
    }
}
