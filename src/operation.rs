//! Declarative operations contributed by module generators.
//!
//! Both enums are tagged by a `type` field in kebab-case. Unknown tags
//! deserialize to `Unknown` and are skipped by the executor.

use crate::condition::Condition;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Operation {
    CreateFile(CreateFile),
    PatchFile(PatchFile),
    AddDependency(AddDependency),
    AddScript(AddScript),
    AddEnv(AddEnv),
    RunCommand(RunCommand),
    #[serde(other)]
    Unknown,
}

impl Operation {
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Operation::CreateFile(op) => op.condition.as_ref(),
            Operation::PatchFile(op) => op.condition.as_ref(),
            Operation::AddDependency(op) => op.condition.as_ref(),
            Operation::AddScript(op) => op.condition.as_ref(),
            Operation::AddEnv(op) => op.condition.as_ref(),
            Operation::RunCommand(op) => op.condition.as_ref(),
            Operation::Unknown => None,
        }
    }

    /// The operation's own priority, if it declares one.
    pub fn priority(&self) -> Option<i32> {
        match self {
            Operation::CreateFile(op) => op.priority,
            Operation::PatchFile(op) => op.priority,
            Operation::AddDependency(op) => op.priority,
            Operation::AddScript(op) => op.priority,
            Operation::AddEnv(op) => op.priority,
            Operation::RunCommand(op) => op.priority,
            Operation::Unknown => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CreateFile(_) => "create-file",
            Operation::PatchFile(_) => "patch-file",
            Operation::AddDependency(_) => "add-dependency",
            Operation::AddScript(_) => "add-script",
            Operation::AddEnv(_) => "add-env",
            Operation::RunCommand(_) => "run-command",
            Operation::Unknown => "unknown",
        }
    }
}

/// Writes one file from inline `content`, or one or more files from the
/// module bundle when `source` is given. `content` takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFile {
    #[serde(default)]
    pub source: Option<String>,
    pub destination: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchFile {
    pub file: String,
    /// Appended to the file before `operations` run
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub operations: Vec<PatchOperation>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDependency {
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
    /// Defaults to `package.json`
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddScript {
    #[serde(default)]
    pub scripts: IndexMap<String, String>,
    /// Defaults to `package.json`
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEnv {
    #[serde(default, alias = "envVars")]
    pub vars: IndexMap<String, String>,
    /// Defaults to `.env`
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCommand {
    pub command: String,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub priority: Option<i32>,
}

/// In-file mutations of a `patch-file` operation, applied in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PatchOperation {
    AddImport {
        #[serde(alias = "import", deserialize_with = "one_or_many")]
        imports: Vec<String>,
        #[serde(default)]
        condition: Option<Condition>,
    },
    AddCode {
        code: String,
        #[serde(default)]
        after: Option<String>,
        #[serde(default)]
        before: Option<String>,
        #[serde(default)]
        condition: Option<Condition>,
    },
    ReplaceCode {
        #[serde(alias = "search")]
        replace: String,
        code: String,
        #[serde(default)]
        condition: Option<Condition>,
    },
    AddToTop {
        #[serde(default)]
        content: Option<String>,
        /// Companion file in the module bundle, used when `content` is absent
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        condition: Option<Condition>,
    },
    AddToBottom {
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        condition: Option<Condition>,
    },
    #[serde(other)]
    Unknown,
}

impl PatchOperation {
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            PatchOperation::AddImport { condition, .. }
            | PatchOperation::AddCode { condition, .. }
            | PatchOperation::ReplaceCode { condition, .. }
            | PatchOperation::AddToTop { condition, .. }
            | PatchOperation::AddToBottom { condition, .. } => condition.as_ref(),
            PatchOperation::Unknown => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PatchOperation::AddImport { .. } => "add-import",
            PatchOperation::AddCode { .. } => "add-code",
            PatchOperation::ReplaceCode { .. } => "replace-code",
            PatchOperation::AddToTop { .. } => "add-to-top",
            PatchOperation::AddToBottom { .. } => "add-to-bottom",
            PatchOperation::Unknown => "unknown",
        }
    }
}

/// Accepts either a single string or a list of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(item) => vec![item],
        OneOrMany::Many(items) => items,
    })
}
