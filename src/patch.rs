//! In-file text mutations for `patch-file` operations.
//!
//! Every mutation works on anchor substrings; file syntax is never parsed.
//! An anchor that cannot be found leaves the buffer untouched and is logged
//! as a warning.

use crate::condition;
use crate::config::GeneratorConfig;
use crate::context::GenerationContext;
use crate::error::Result;
use crate::operation::PatchOperation;
use crate::renderer::{collapse_blank_lines, TemplateRenderer};
use log::{debug, warn};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Lines treated as part of an import block (JS/TS, Python, Rust, C).
static IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?:import[\s{*'"]|export\s+(?:\*|\{[^}]*\})\s*from\s|from\s+\S+\s+import\s|(?:const|let|var)\s+[\w{},\s]+=\s*require\(|\}\s*from\s+['"]|use\s+[\w:{]|#include\s)"#,
    )
    .expect("valid regex")
});

/// `'use client'`-style prologue lines that must stay above imports.
static DIRECTIVE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*['"]use [\w ]+['"];?\s*$"#).expect("valid regex"));

/// Result of a single text mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Changed(String),
    /// Nothing to do, e.g. the code is already present.
    Unchanged,
    /// The `after`/`before`/`replace` anchor does not occur in the buffer.
    AnchorNotFound(String),
}

impl PatchOutcome {
    fn apply_to(self, buffer: &mut String, kind: &str, file: &str) {
        match self {
            PatchOutcome::Changed(text) => *buffer = text,
            PatchOutcome::Unchanged => debug!("{} on '{}': already applied", kind, file),
            PatchOutcome::AnchorNotFound(anchor) => {
                warn!("{} on '{}': anchor '{}' not found, skipping", kind, file, anchor.trim())
            }
        }
    }
}

/// Applies `operations` in order to `text`. Each operation is gated by its own
/// condition and rendered with `engine` before insertion.
///
/// # Errors
/// * `Error::TemplateError` if a fragment fails to render
/// * `Error::MissingSource` if an `add-to-top`/`add-to-bottom` companion file is missing
pub fn apply_patches(
    text: &str,
    operations: &[PatchOperation],
    engine: &dyn TemplateRenderer,
    context: &mut GenerationContext,
    owner: &GeneratorConfig,
    file: &str,
) -> Result<String> {
    let mut buffer = text.to_string();

    for operation in operations {
        if !condition::matches(operation.condition(), context) {
            debug!("{} on '{}': condition not met", operation.kind(), file);
            continue;
        }

        let outcome = match operation {
            PatchOperation::AddImport { imports, .. } => {
                let rendered = imports
                    .iter()
                    .map(|import| engine.render(import, context))
                    .collect::<Result<Vec<_>>>()?;
                add_imports(&buffer, &rendered)
            }
            PatchOperation::AddCode { code, after, before, .. } => {
                let code = engine.render(code, context)?;
                add_code(&buffer, &code, after.as_deref(), before.as_deref())
            }
            PatchOperation::ReplaceCode { replace, code, .. } => {
                let code = engine.render(code, context)?;
                replace_code(&buffer, replace, &code)
            }
            PatchOperation::AddToTop { content, source, .. } => {
                let content = fragment(content, source, engine, context, owner)?;
                PatchOutcome::Changed(add_to_top(&buffer, &content))
            }
            PatchOperation::AddToBottom { content, source, .. } => {
                let content = fragment(content, source, engine, context, owner)?;
                PatchOutcome::Changed(add_to_bottom(&buffer, &content))
            }
            PatchOperation::Unknown => {
                warn!("Unknown patch operation on '{}', skipping", file);
                continue;
            }
        };
        outcome.apply_to(&mut buffer, operation.kind(), file);
    }

    Ok(collapse_blank_lines(&buffer))
}

/// Inline `content`, or the rendered companion `source` file from the module bundle.
fn fragment(
    content: &Option<String>,
    source: &Option<String>,
    engine: &dyn TemplateRenderer,
    context: &mut GenerationContext,
    owner: &GeneratorConfig,
) -> Result<String> {
    let raw = match (content, source) {
        (Some(content), _) => content.clone(),
        (None, Some(source)) => owner.read_bundle_file(source)?,
        (None, None) => String::new(),
    };
    engine.render(&raw, context)
}

/// Inserts `imports` after the last import-like line (or at the top),
/// skipping any already present and leaving one blank line before the rest.
pub fn add_imports(text: &str, imports: &[String]) -> PatchOutcome {
    let lines: Vec<&str> = text.lines().collect();
    let existing: HashSet<&str> = lines.iter().map(|line| line.trim()).collect();
    let mut seen = HashSet::new();

    let mut new_lines: Vec<&str> = Vec::new();
    for import in imports {
        let import = import.trim_matches('\n');
        if import.trim().is_empty() {
            continue;
        }
        let present = if import.contains('\n') {
            text.contains(import.trim())
        } else {
            existing.contains(import.trim())
        };
        if !present && seen.insert(import.trim()) {
            new_lines.extend(import.lines());
        }
    }
    if new_lines.is_empty() {
        return PatchOutcome::Unchanged;
    }

    let split = match lines.iter().rposition(|line| IMPORT_LINE.is_match(line)) {
        Some(last_import) => last_import + 1,
        None => lines.iter().take_while(|line| DIRECTIVE_LINE.is_match(line)).count(),
    };
    let (head, rest) = lines.split_at(split);
    let rest: Vec<&str> = rest.iter().copied().skip_while(|line| line.trim().is_empty()).collect();

    let eol = line_ending(text);
    let mut out = String::with_capacity(text.len() + imports.len() * 32);
    if !head.is_empty() {
        out.push_str(&head.join(eol));
        out.push_str(eol);
        if !IMPORT_LINE.is_match(head[head.len() - 1]) {
            // directive prologue
            out.push_str(eol);
        }
    }
    out.push_str(&new_lines.join(eol));
    out.push_str(eol);
    if !rest.is_empty() {
        out.push_str(eol);
        out.push_str(&rest.join(eol));
        if text.ends_with('\n') {
            out.push_str(eol);
        }
    }
    PatchOutcome::Changed(out)
}

/// `\r\n` when the buffer already uses it, `\n` otherwise.
fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Inserts `code` after the first `after` anchor or before the first `before`
/// anchor, separated by one blank line on each side. With no anchor the code
/// is appended. Code already present in the buffer is not inserted again.
pub fn add_code(text: &str, code: &str, after: Option<&str>, before: Option<&str>) -> PatchOutcome {
    let needle = code.trim();
    if needle.is_empty() || text.contains(needle) {
        return PatchOutcome::Unchanged;
    }
    let code = code.trim_matches('\n');

    if let Some(anchor) = after {
        let Some(found) = text.find(anchor) else {
            return PatchOutcome::AnchorNotFound(anchor.to_string());
        };
        let (head, tail) = text.split_at(found + anchor.len());
        let head = head.trim_end();
        return PatchOutcome::Changed(if tail.trim().is_empty() {
            format!("{}\n\n{}\n", head, code)
        } else {
            format!("{}\n\n{}\n\n{}", head, code, tail.trim_start_matches(['\r', '\n']))
        });
    }

    if let Some(anchor) = before {
        let Some(found) = text.find(anchor) else {
            return PatchOutcome::AnchorNotFound(anchor.to_string());
        };
        let line_start = text[..found].rfind('\n').map_or(0, |n| n + 1);
        let start = if text[line_start..found].trim().is_empty() { line_start } else { found };
        let (head, tail) = text.split_at(start);
        let head = head.trim_end();
        return PatchOutcome::Changed(if head.is_empty() {
            format!("{}\n\n{}", code, tail)
        } else {
            format!("{}\n\n{}\n\n{}", head, code, tail)
        });
    }

    PatchOutcome::Changed(add_to_bottom(text, code))
}

/// Replaces the first occurrence of `search` with `code`.
pub fn replace_code(text: &str, search: &str, code: &str) -> PatchOutcome {
    if search.is_empty() || !text.contains(search) {
        return PatchOutcome::AnchorNotFound(search.to_string());
    }
    PatchOutcome::Changed(text.replacen(search, code, 1))
}

pub fn add_to_top(text: &str, content: &str) -> String {
    let content = content.trim_end_matches('\n');
    let text = text.trim_start_matches('\n');
    if text.is_empty() {
        format!("{}\n", content)
    } else {
        format!("{}\n{}", content, text)
    }
}

pub fn add_to_bottom(text: &str, content: &str) -> String {
    let content = content.trim_matches('\n');
    let text = text.trim_end_matches('\n');
    if text.is_empty() {
        format!("{}\n", content)
    } else {
        format!("{}\n{}\n", text, content)
    }
}
