//! Conditions and inline expressions of the template language.

use crate::context::{ContextValue, GenerationContext};
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static LEGACY_INCLUDES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Za-z_][A-Za-z0-9_]*)\.includes\((.+)\)$"#).expect("valid regex")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// A literal or a context variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(String),
    Variable(String),
}

impl Operand {
    /// Quoted strings, booleans and numbers are literals; bare words are variables.
    pub fn parse(word: &str) -> Self {
        let word = word.trim();
        if let Some(inner) = unquote(word) {
            Operand::Literal(inner.to_string())
        } else if word == "true" || word == "false" || word.parse::<f64>().is_ok() {
            Operand::Literal(word.to_string())
        } else {
            Operand::Variable(word.to_string())
        }
    }

    pub fn resolve(&self, context: &GenerationContext) -> Option<ContextValue> {
        match self {
            Operand::Literal(s) => Some(ContextValue::Text(s.clone())),
            Operand::Variable(name) => context.get(name),
        }
    }

    /// Like [`Operand::resolve`], but an unknown variable stands for its own name.
    pub fn resolve_or_word(&self, context: &GenerationContext) -> ContextValue {
        match self {
            Operand::Literal(s) => ContextValue::Text(s.clone()),
            Operand::Variable(name) => {
                context.get(name).unwrap_or_else(|| ContextValue::Text(name.clone()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Includes,
    StartsWith,
    EndsWith,
}

impl Comparison {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "==" | "===" => Some(Comparison::Eq),
            "!=" | "!==" => Some(Comparison::Ne),
            "includes" => Some(Comparison::Includes),
            "startsWith" => Some(Comparison::StartsWith),
            "endsWith" => Some(Comparison::EndsWith),
            _ => None,
        }
    }

    /// An absent left-hand side only satisfies `!=`.
    pub fn holds(self, actual: Option<&ContextValue>, expected: &ContextValue) -> bool {
        let Some(actual) = actual else {
            return self == Comparison::Ne;
        };
        let expected = expected.as_text();
        match self {
            Comparison::Eq => actual.as_text() == expected,
            Comparison::Ne => actual.as_text() != expected,
            Comparison::Includes => match actual {
                ContextValue::List(items) => items.contains(&expected),
                ContextValue::Text(s) => s.contains(&expected),
                ContextValue::Bool(_) => false,
            },
            Comparison::StartsWith => match actual {
                ContextValue::List(_) => false,
                value => value.as_text().starts_with(&expected),
            },
            Comparison::EndsWith => match actual {
                ContextValue::List(_) => false,
                value => value.as_text().ends_with(&expected),
            },
        }
    }
}

/// Label of a switch arm, either a value or `default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseLabel {
    Value(String),
    Default,
}

impl CaseLabel {
    /// `default` accepts any value, so it shadows cases written after it.
    pub fn accepts(&self, actual: Option<&str>) -> bool {
        match self {
            CaseLabel::Value(value) => actual == Some(value.as_str()),
            CaseLabel::Default => true,
        }
    }
}

/// Boolean test used by `#if` blocks, ternaries and `if … then:` expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `lhs <op> rhs`
    Compare { lhs: Operand, op: Comparison, rhs: Operand },
    /// `var "value"`
    LegacyEquals { variable: String, value: Operand },
    /// `list.includes("value")`
    LegacyIncludes { list: String, value: Operand },
    /// `feature:name`
    Feature(String),
    /// `var`
    Truthy(String),
}

impl Predicate {
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if let Some(name) = source.strip_prefix("feature:") {
            return Ok(Predicate::Feature(name.trim().to_string()));
        }

        let words = split_words(source);
        if words.len() == 3 {
            if let Some(op) = Comparison::parse(&words[1]) {
                return Ok(Predicate::Compare {
                    lhs: Operand::parse(&words[0]),
                    op,
                    rhs: Operand::parse(&words[2]),
                });
            }
        }

        if let Some(caps) = LEGACY_INCLUDES.captures(source) {
            return Ok(Predicate::LegacyIncludes {
                list: caps[1].to_string(),
                value: Operand::parse(&caps[2]),
            });
        }

        match words.as_slice() {
            [variable, value] if IDENTIFIER.is_match(variable) => Ok(Predicate::LegacyEquals {
                variable: variable.clone(),
                value: Operand::parse(value),
            }),
            [variable] if IDENTIFIER.is_match(variable) => {
                Ok(Predicate::Truthy(variable.clone()))
            }
            _ => Err(Error::TemplateError(format!("invalid condition '{}'", source))),
        }
    }

    pub fn evaluate(&self, context: &GenerationContext) -> bool {
        match self {
            Predicate::Compare { lhs, op, rhs } => {
                op.holds(lhs.resolve(context).as_ref(), &rhs.resolve_or_word(context))
            }
            Predicate::LegacyEquals { variable, value } => Comparison::Eq
                .holds(context.get(variable).as_ref(), &value.resolve_or_word(context)),
            Predicate::LegacyIncludes { list, value } => Comparison::Includes
                .holds(context.get(list).as_ref(), &value.resolve_or_word(context)),
            Predicate::Feature(name) => context.has_feature(name),
            Predicate::Truthy(name) => context.get(name).is_some_and(|v| v.is_truthy()),
        }
    }
}

/// Expressions allowed in a plain `{{ … }}` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Ternary { predicate: Predicate, then: Operand, otherwise: Operand },
    Switch { subject: String, arms: Vec<(CaseLabel, Operand)> },
    Heading(String),
    Feature(String),
    IfThenElse { predicate: Predicate, then: Operand, otherwise: Option<Operand> },
    Lookup(String),
}

impl Inline {
    /// Returns `None` when the source is not an expression of this language;
    /// such tags are emitted verbatim.
    pub fn parse(source: &str) -> Option<Self> {
        let source = source.trim();

        if let Some(rest) = source.strip_prefix("switch ") {
            return parse_inline_switch(rest);
        }
        if let Some(question) = find_unquoted(source, '?') {
            let (then, otherwise) = split_once_unquoted(&source[question + 1..], ':')?;
            let predicate = Predicate::parse(&source[..question]).ok()?;
            if matches!(predicate, Predicate::Compare { .. } | Predicate::LegacyEquals { .. }) {
                return Some(Inline::Ternary {
                    predicate,
                    then: Operand::parse(then),
                    otherwise: Operand::parse(otherwise),
                });
            }
            return None;
        }

        if let Some(variable) = source.strip_prefix("heading:") {
            return Some(Inline::Heading(variable.trim().to_string()));
        }
        if let Some(name) = source.strip_prefix("feature:") {
            return Some(Inline::Feature(name.trim().to_string()));
        }
        if let Some(rest) = source.strip_prefix("if ") {
            return parse_if_then_else(rest);
        }
        if IDENTIFIER.is_match(source) {
            return Some(Inline::Lookup(source.to_string()));
        }
        None
    }

    /// `None` means the expression could not be resolved and the tag stays as written.
    pub fn evaluate(&self, context: &GenerationContext) -> Option<String> {
        match self {
            Inline::Ternary { predicate, then, otherwise } => {
                let branch = if predicate.evaluate(context) { then } else { otherwise };
                Some(branch.resolve_or_word(context).as_text())
            }
            Inline::Switch { subject, arms } => {
                let actual = context.get(subject).map(|v| v.as_text());
                let chosen = arms.iter().find(|(label, _)| label.accepts(actual.as_deref()));
                Some(
                    chosen
                        .map(|(_, value)| value.resolve_or_word(context).as_text())
                        .unwrap_or_default(),
                )
            }
            Inline::Heading(variable) => Some("#".repeat(heading_depth(variable, context))),
            Inline::Feature(name) => Some(context.has_feature(name).to_string()),
            Inline::IfThenElse { predicate, then, otherwise } => {
                if predicate.evaluate(context) {
                    Some(then.resolve_or_word(context).as_text())
                } else {
                    Some(
                        otherwise
                            .as_ref()
                            .map(|v| v.resolve_or_word(context).as_text())
                            .unwrap_or_default(),
                    )
                }
            }
            Inline::Lookup(name) => context.get(name).map(|v| v.as_text()),
        }
    }
}

/// `var prisma:Prisma,"drizzle":Drizzle ORM,default:Other`
fn parse_inline_switch(rest: &str) -> Option<Inline> {
    let rest = rest.trim();
    let space = rest.find(char::is_whitespace)?;
    let subject = rest[..space].to_string();
    let mut arms = Vec::new();

    for item in split_unquoted(&rest[space..], ',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (label, value) = split_once_unquoted(item, ':')?;
        let label = label.trim();
        let label = match unquote(label) {
            Some(quoted) => CaseLabel::Value(quoted.to_string()),
            None if label == "default" => CaseLabel::Default,
            None if !label.is_empty() => CaseLabel::Value(label.to_string()),
            None => return None,
        };
        arms.push((label, Operand::parse(value)));
    }
    if arms.is_empty() {
        return None;
    }
    Some(Inline::Switch { subject, arms })
}

/// `<predicate> then:x else:y`
fn parse_if_then_else(rest: &str) -> Option<Inline> {
    let then_at = rest.find(" then:")?;
    let predicate = Predicate::parse(&rest[..then_at]).ok()?;
    let branches = &rest[then_at + " then:".len()..];
    let (then, otherwise) = match branches.find(" else:") {
        Some(else_at) => (
            &branches[..else_at],
            Some(Operand::parse(&branches[else_at + " else:".len()..])),
        ),
        None => (branches, None),
    };
    Some(Inline::IfThenElse { predicate, then: Operand::parse(then), otherwise })
}

fn heading_depth(variable: &str, context: &GenerationContext) -> usize {
    let raw = context
        .get(variable)
        .map(|v| v.as_text())
        .unwrap_or_else(|| variable.to_string());
    raw.trim().parse::<i64>().unwrap_or(1).clamp(1, 6) as usize
}

/// Strips one pair of matching `"` or `'` quotes.
pub fn unquote(word: &str) -> Option<&str> {
    let bytes = word.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return Some(&word[1..word.len() - 1]);
        }
    }
    None
}

/// Whitespace-separated words; quoted sections stay in one word.
fn split_words(source: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in source.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn find_unquoted(source: &str, needle: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in source.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == needle => return Some(i),
            None => {}
        }
    }
    None
}

fn split_once_unquoted(source: &str, needle: char) -> Option<(&str, &str)> {
    find_unquoted(source, needle).map(|i| (&source[..i], &source[i + needle.len_utf8()..]))
}

fn split_unquoted(source: &str, needle: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = source;
    while let Some((head, tail)) = split_once_unquoted(rest, needle) {
        parts.push(head);
        rest = tail;
    }
    parts.push(rest);
    parts
}
