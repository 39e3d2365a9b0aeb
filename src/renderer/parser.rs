//! Recursive-descent parser turning lexer tokens into a node tree.
//!
//! Malformed blocks never fail the parse. An invalid condition, an unclosed
//! block or a stray closing tag is logged and kept in the output as text.

use super::expression::{unquote, CaseLabel, Predicate};
use super::lexer::Token;
use log::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    /// Inline expression, kept as raw source so it can be emitted verbatim.
    Expr(String),
    Define { name: String, value: DefineValue },
    If { predicate: Predicate, then: Vec<Node>, otherwise: Vec<Node> },
    /// Arms in document order, `default` included.
    Switch { subject: String, cases: Vec<Case> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineValue {
    /// `"…"`: the quoted text is itself a template
    Template(Vec<Node>),
    /// Unquoted: an inline expression
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub label: CaseLabel,
    pub body: Vec<Node>,
}

/// What a single tag means to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive<'a> {
    If(&'a str),
    Else,
    EndIf,
    Switch(&'a str),
    Case(&'a str),
    EndCase,
    Default,
    EndDefault,
    EndSwitch,
    Define(&'a str),
    Expr(&'a str),
}

impl<'a> Directive<'a> {
    fn classify(raw: &'a str) -> Self {
        let inner = raw.trim();
        if let Some(rest) = inner.strip_prefix("#if ") {
            return Directive::If(rest);
        }
        if let Some(rest) = inner.strip_prefix("#switch ") {
            return Directive::Switch(rest);
        }
        if let Some(rest) = inner.strip_prefix("#case ") {
            return Directive::Case(rest);
        }
        if let Some(rest) = inner.strip_prefix("#var ") {
            return Directive::Define(rest);
        }
        match inner {
            "else" | "#else" => Directive::Else,
            "/if" => Directive::EndIf,
            "/case" => Directive::EndCase,
            "#default" => Directive::Default,
            "/default" => Directive::EndDefault,
            "/switch" => Directive::EndSwitch,
            _ => Directive::Expr(raw),
        }
    }
}

pub fn parse(tokens: &[Token<'_>]) -> Vec<Node> {
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_until(&[]).0
}

/// Parses a full template string, used for quoted `#var` values.
pub fn parse_source(source: &str) -> Vec<Node> {
    parse(&super::lexer::tokenize(source))
}

/// A tag exactly as it appeared in the template.
fn literal(raw: &str) -> Node {
    Node::Text(format!("{{{{{}}}}}", raw))
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'a> Parser<'_, 'a> {
    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    /// Collects nodes until a tag whose directive is one of `terminators` and
    /// returns that tag's raw source, or `None` at the end of input.
    fn parse_until(&mut self, terminators: &[Directive<'a>]) -> (Vec<Node>, Option<&'a str>) {
        let mut nodes = Vec::new();

        while let Some(token) = self.next() {
            let raw = match token {
                Token::Text(text) => {
                    if !text.is_empty() {
                        nodes.push(Node::Text(text.to_string()));
                    }
                    continue;
                }
                Token::Tag(raw) => raw,
            };

            match Directive::classify(raw) {
                Directive::If(condition) => self.parse_if(raw, condition, &mut nodes),
                Directive::Switch(subject) => self.parse_switch(raw, subject, &mut nodes),
                Directive::Define(definition) => nodes.push(parse_define(raw, definition)),
                Directive::Expr(source) => nodes.push(Node::Expr(source.to_string())),
                directive if terminators.contains(&directive) => return (nodes, Some(raw)),
                _ => {
                    warn!("Unexpected '{{{{{}}}}}' in template, keeping it as text", raw);
                    nodes.push(literal(raw));
                }
            }
        }
        (nodes, None)
    }

    fn parse_if(&mut self, raw: &'a str, condition: &str, nodes: &mut Vec<Node>) {
        let (then, terminator) = self.parse_until(&[Directive::Else, Directive::EndIf]);
        let mut otherwise = Vec::new();
        let mut separator = None;
        let mut closing = terminator;

        if let Some(tag) = terminator.filter(|&tag| Directive::classify(tag) == Directive::Else) {
            let (body, end) = self.parse_until(&[Directive::EndIf]);
            otherwise = body;
            separator = Some(tag);
            closing = end;
        }

        let predicate = match (closing, Predicate::parse(condition)) {
            (Some(_), Ok(predicate)) => Some(predicate),
            (None, _) => {
                warn!("Unclosed '{{{{{}}}}}' in template, keeping it as text", raw);
                None
            }
            (Some(_), Err(err)) => {
                warn!("Keeping '{{{{{}}}}}' block as text: {}", raw, err);
                None
            }
        };

        match predicate {
            Some(predicate) => nodes.push(Node::If { predicate, then, otherwise }),
            None => {
                nodes.push(literal(raw));
                nodes.extend(then);
                if let Some(tag) = separator {
                    nodes.push(literal(tag));
                    nodes.extend(otherwise);
                }
                nodes.extend(closing.map(literal));
            }
        }
    }

    /// Anything other than arms and blank text between `#switch` and `/switch`
    /// turns the whole block into text.
    fn parse_switch(&mut self, raw: &'a str, subject: &str, nodes: &mut Vec<Node>) {
        let mut cases = Vec::new();
        let mut verbatim = vec![literal(raw)];
        let mut well_formed = true;

        loop {
            let Some(token) = self.next() else {
                warn!("Unclosed '{{{{{}}}}}' in template, keeping it as text", raw);
                nodes.extend(verbatim);
                return;
            };
            let tag = match token {
                Token::Text(text) => {
                    well_formed &= text.trim().is_empty();
                    verbatim.push(Node::Text(text.to_string()));
                    continue;
                }
                Token::Tag(tag) => tag,
            };
            verbatim.push(literal(tag));

            let (label, end) = match Directive::classify(tag) {
                Directive::Case(value) => {
                    let value = value.trim();
                    let value = unquote(value).unwrap_or(value).to_string();
                    (CaseLabel::Value(value), Directive::EndCase)
                }
                Directive::Default => (CaseLabel::Default, Directive::EndDefault),
                Directive::EndSwitch => break,
                _ => {
                    well_formed = false;
                    continue;
                }
            };

            let (body, closing) = self.parse_until(&[end]);
            verbatim.extend(body.iter().cloned());
            let Some(closing) = closing else {
                warn!("Unclosed '{{{{{}}}}}' in template, keeping it as text", tag);
                nodes.extend(verbatim);
                return;
            };
            verbatim.push(literal(closing));
            cases.push(Case { label, body });
        }

        if well_formed {
            nodes.push(Node::Switch { subject: subject.trim().to_string(), cases });
        } else {
            warn!("Malformed '{{{{{}}}}}' block in template, keeping it as text", raw);
            nodes.extend(verbatim);
        }
    }
}

/// `name = "template"` or `name = expression`
fn parse_define(raw: &str, definition: &str) -> Node {
    let Some((name, value)) = definition.split_once('=') else {
        warn!("Variable definition '{}' has no '='", definition.trim());
        return literal(raw);
    };
    let name = name.trim();
    if name.is_empty() {
        warn!("Variable definition '{}' has no name", definition.trim());
        return literal(raw);
    }

    let value = value.trim();
    let value = match unquote(value) {
        Some(template) => DefineValue::Template(parse_source(template)),
        None => DefineValue::Expression(value.to_string()),
    };
    Node::Define { name: name.to_string(), value }
}
