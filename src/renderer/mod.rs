//! The template language used by module files and descriptor fields.
//!
//! Rendering runs in two passes over a parsed node tree. The first pass
//! evaluates every `{{#var name = …}}` definition in document order and
//! stores the result in the context's extension map; definitions inside
//! `#if`/`#switch` only count when their branch is taken. The second pass
//! emits text, resolving blocks and inline expressions. Unresolvable inline
//! expressions and malformed blocks are emitted exactly as written.

pub mod expression;
pub mod lexer;
pub mod parser;

use crate::context::{ContextValue, GenerationContext};
use crate::error::Result;
use expression::Inline;
use parser::{Case, DefineValue, Node};
use regex::Regex;
use std::sync::LazyLock;

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){3,}").expect("valid regex"));

static LEADING_BLANKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[ \t]*\n)+").expect("valid regex"));

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables; template definitions are written back into it
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, template: &str, context: &mut GenerationContext) -> Result<String>;
}

/// Renderer for the `{{#if}}`/`{{#switch}}`/`{{#var}}` directive language.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveRenderer;

impl DirectiveRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for DirectiveRenderer {
    /// Never fails: malformed blocks (unclosed `#if`, stray `/if`, invalid
    /// conditions) are logged and kept as text.
    fn render(&self, template: &str, context: &mut GenerationContext) -> Result<String> {
        let nodes = parser::parse_source(template);
        define_variables(&nodes, context);

        let mut out = String::with_capacity(template.len());
        emit(&nodes, context, &mut out);

        let out = collapse_blank_lines(&out);
        Ok(LEADING_BLANKS.replace(&out, "").into_owned())
    }
}

/// Collapses runs of three or more blank lines into a single blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

fn define_variables(nodes: &[Node], context: &mut GenerationContext) {
    for node in nodes {
        match node {
            Node::Define { name, value } => {
                let resolved = match value {
                    DefineValue::Template(body) => {
                        define_variables(body, context);
                        let mut out = String::new();
                        emit(body, context, &mut out);
                        out
                    }
                    DefineValue::Expression(source) => evaluate_inline(source, context),
                };
                context.define(name.clone(), ContextValue::Text(resolved));
            }
            Node::If { predicate, then, otherwise } => {
                let branch = if predicate.evaluate(context) { then } else { otherwise };
                define_variables(branch, context);
            }
            Node::Switch { subject, cases } => {
                if let Some(body) = select_case(subject, cases, context) {
                    define_variables(body, context);
                }
            }
            Node::Text(_) | Node::Expr(_) => {}
        }
    }
}

fn emit(nodes: &[Node], context: &GenerationContext, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Expr(source) => out.push_str(&evaluate_inline(source, context)),
            Node::Define { .. } => {}
            Node::If { predicate, then, otherwise } => {
                let branch = if predicate.evaluate(context) { then } else { otherwise };
                emit(branch, context, out);
            }
            Node::Switch { subject, cases } => {
                if let Some(body) = select_case(subject, cases, context) {
                    emit(body, context, out);
                }
            }
        }
    }
}

/// Arms are tried in document order; the first matching case or `default` wins.
fn select_case<'n>(
    subject: &str,
    cases: &'n [Case],
    context: &GenerationContext,
) -> Option<&'n [Node]> {
    let actual = context.get(subject).map(|v| v.as_text());
    cases
        .iter()
        .find(|case| case.label.accepts(actual.as_deref()))
        .map(|case| case.body.as_slice())
}

fn evaluate_inline(source: &str, context: &GenerationContext) -> String {
    Inline::parse(source)
        .and_then(|expr| expr.evaluate(context))
        .unwrap_or_else(|| format!("{{{{{}}}}}", source))
}
