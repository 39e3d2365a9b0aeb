//! Splits template text into literal text and `{{ … }}` tags.
//!
//! A tag's extent is found by counting nested `{{`/`}}` pairs, so a tag may
//! carry nested tags inside a quoted value (`{{#var y = "{{x}}b"}}`).
//! An opening `{{` that is never balanced is kept as literal text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    /// Inner source of a tag, without the surrounding braces.
    Tag(&'a str),
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(offset) = source[pos..].find(OPEN) {
        let start = pos + offset;
        let Some(end) = balanced_end(source, start) else {
            break;
        };
        if start > pos {
            tokens.push(Token::Text(&source[pos..start]));
        }
        tokens.push(Token::Tag(&source[start + OPEN.len()..end - CLOSE.len()]));
        pos = end;
    }
    if pos < source.len() {
        tokens.push(Token::Text(&source[pos..]));
    }

    trim_standalone_tags(&mut tokens);
    tokens
}

/// Returns the byte offset just past the `}}` matching the `{{` at `start`.
fn balanced_end(source: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < source.len() {
        let rest = &source[i..];
        if rest.starts_with(OPEN) {
            depth += 1;
            i += OPEN.len();
        } else if rest.starts_with(CLOSE) {
            depth -= 1;
            i += CLOSE.len();
            if depth == 0 {
                return Some(i);
            }
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

/// Block tags (`#if`, `else`, `/if`, `#var`, …) as opposed to inline expressions.
pub fn is_block_tag(inner: &str) -> bool {
    let inner = inner.trim();
    inner.starts_with('#') || inner.starts_with('/') || inner == "else"
}

/// A block tag alone on its line swallows the line's indentation and newline.
fn trim_standalone_tags(tokens: &mut [Token<'_>]) {
    let standalone: Vec<usize> = (0..tokens.len())
        .filter(|&i| match tokens[i] {
            Token::Tag(inner) => {
                is_block_tag(inner) && line_clear_before(tokens, i) && line_clear_after(tokens, i)
            }
            Token::Text(_) => false,
        })
        .collect();

    for i in standalone {
        if i > 0 {
            if let Token::Text(text) = tokens[i - 1] {
                let keep = text.rfind('\n').map_or(0, |n| n + 1);
                tokens[i - 1] = Token::Text(&text[..keep]);
            }
        }
        if i + 1 < tokens.len() {
            if let Token::Text(text) = tokens[i + 1] {
                let skip = text.find('\n').map_or(text.len(), |n| n + 1);
                tokens[i + 1] = Token::Text(&text[skip..]);
            }
        }
    }
}

fn line_clear_before(tokens: &[Token<'_>], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    match tokens[i - 1] {
        Token::Text(text) => match text.rfind('\n') {
            Some(n) => text[n + 1..].trim().is_empty(),
            None => i == 1 && text.trim().is_empty(),
        },
        Token::Tag(_) => false,
    }
}

fn line_clear_after(tokens: &[Token<'_>], i: usize) -> bool {
    if i + 1 == tokens.len() {
        return true;
    }
    match tokens[i + 1] {
        Token::Text(text) => match text.find('\n') {
            Some(n) => text[..n].trim().is_empty(),
            None => i + 2 == tokens.len() && text.trim().is_empty(),
        },
        Token::Tag(_) => false,
    }
}
