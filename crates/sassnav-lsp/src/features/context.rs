//! Cursor context
//!
//! Providers work on raw text: a small lexer finds symbol references
//! (`$var`, `ns.$var`, `ns.fn(`, `@include ns.mixin`, `fn(`) and the line
//! before the cursor decides what completion applies.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::resolution::SymbolKind;

/// A symbol reference found in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolReference {
    pub namespace: Option<String>,
    /// Name as written, `$` kept for variables
    pub name: String,
    /// None when the syntax does not tell mixins from functions
    pub kind: Option<SymbolKind>,
    /// Byte span of the whole reference, namespace included
    pub span: Range<usize>,
    /// Byte offset where the name (after `ns.`) starts
    pub name_start: usize,
}

impl SymbolReference {
    pub fn contains(&self, offset: usize) -> bool {
        self.span.start <= offset && offset <= self.span.end
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '-' || c == '_' || !c.is_ascii()
}

fn ident_end(text: &str, start: usize) -> usize {
    text[start..]
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map(|(i, _)| start + i)
        .unwrap_or(text.len())
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Kind implied by the text before an identifier
fn kind_from_keyword(before: &str) -> Option<SymbolKind> {
    let trimmed = before.trim_end();
    if trimmed.ends_with("@include") || trimmed.ends_with("@mixin") {
        return Some(SymbolKind::Mixin);
    }
    if trimmed.ends_with("@function") {
        return Some(SymbolKind::Function);
    }
    // Indented syntax: `+name` includes, `=name` declares
    let line = &before[before.rfind('\n').map_or(0, |i| i + 1)..];
    if matches!(line.trim_start(), "+" | "=") {
        return Some(SymbolKind::Mixin);
    }
    None
}

/// Every symbol reference in `text`, in order. Declarations are included.
pub fn references_in(text: &str) -> Vec<SymbolReference> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut parens = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = text[i + 2..]
                    .find("*/")
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(bytes.len());
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') && parens == 0 => {
                i = text[i..].find('\n').map(|p| i + p).unwrap_or(bytes.len());
                continue;
            }
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b'$' => {
                let end = ident_end(text, i + 1);
                if end > i + 1 {
                    found.push(SymbolReference {
                        namespace: None,
                        name: text[i..end].to_string(),
                        kind: Some(SymbolKind::Variable),
                        span: i..end,
                        name_start: i,
                    });
                    i = end;
                    continue;
                }
            }
            _ => {}
        }

        let Some(c) = text[i..].chars().next() else {
            break;
        };
        let follows_word = text[..i]
            .chars()
            .next_back()
            .is_some_and(|p| is_ident_char(p) || matches!(p, '$' | '.' | '#' | '@' | '%'));
        if !is_ident_start(c) || follows_word {
            i += c.len_utf8();
            continue;
        }

        let end = ident_end(text, i);
        let word = &text[i..end];
        if word.chars().all(|c| c == '-') {
            i = end;
            continue;
        }

        // ns.$member / ns.member
        if bytes.get(end) == Some(&b'.') {
            let member_start = end + 1;
            let sigil = bytes.get(member_start) == Some(&b'$');
            let ident_start = if sigil { member_start + 1 } else { member_start };
            let member_end = ident_end(text, ident_start);
            if member_end > ident_start {
                let kind = if sigil {
                    Some(SymbolKind::Variable)
                } else if let Some(kind) = kind_from_keyword(&text[..i]) {
                    Some(kind)
                } else if bytes.get(member_end) == Some(&b'(') {
                    Some(SymbolKind::Function)
                } else {
                    None
                };
                found.push(SymbolReference {
                    namespace: Some(word.to_string()),
                    name: text[member_start..member_end].to_string(),
                    kind,
                    span: i..member_end,
                    name_start: member_start,
                });
                i = member_end;
                continue;
            }
        }

        let kind = kind_from_keyword(&text[..i]).or_else(|| {
            (bytes.get(end) == Some(&b'(')).then_some(SymbolKind::Function)
        });
        if kind.is_some() {
            found.push(SymbolReference {
                namespace: None,
                name: word.to_string(),
                kind,
                span: i..end,
                name_start: i,
            });
        }
        i = end;
    }

    found
}

/// The reference under `offset`, if any
pub fn reference_at(text: &str, offset: usize) -> Option<SymbolReference> {
    references_in(text).into_iter().find(|r| r.contains(offset))
}

/// What the cursor is completing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// After `$` or `ns.$`
    Variable { namespace: Option<String> },
    /// After `@include` (or `+` in the indented syntax)
    Include { namespace: Option<String> },
    /// After `ns.` in a value
    Member { namespace: String },
    /// Anywhere else in code: functions and variables
    Value,
    /// Inside a comment
    None,
}

/// Detect the completion context from the text of the line before the cursor
pub fn completion_context(text: &str, offset: usize) -> CompletionContext {
    static INCLUDE_RE: OnceLock<Regex> = OnceLock::new();
    static SASS_INCLUDE_RE: OnceLock<Regex> = OnceLock::new();
    static VARIABLE_RE: OnceLock<Regex> = OnceLock::new();
    static MEMBER_RE: OnceLock<Regex> = OnceLock::new();
    let include_re =
        INCLUDE_RE.get_or_init(|| Regex::new(r"@include\s+(?:([\w-]+)\.)?[\w-]*$").unwrap());
    let sass_include_re =
        SASS_INCLUDE_RE.get_or_init(|| Regex::new(r"^\s*\+(?:([\w-]+)\.)?[\w-]*$").unwrap());
    let variable_re =
        VARIABLE_RE.get_or_init(|| Regex::new(r"(?:(?:^|[^\w$.-])([\w-]+)\.)?\$[\w-]*$").unwrap());
    let member_re =
        MEMBER_RE.get_or_init(|| Regex::new(r"(?:^|[^\w$.#-])([A-Za-z_][\w-]*)\.[\w-]*$").unwrap());

    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_before = &text[line_start..offset];

    if line_before.contains("//") || line_before.trim_start().starts_with("/*") {
        return CompletionContext::None;
    }

    let namespace_of = |cap: regex::Captures<'_>| cap.get(1).map(|m| m.as_str().to_string());

    if let Some(cap) = include_re
        .captures(line_before)
        .or_else(|| sass_include_re.captures(line_before))
    {
        return CompletionContext::Include {
            namespace: namespace_of(cap),
        };
    }
    if let Some(cap) = variable_re.captures(line_before) {
        return CompletionContext::Variable {
            namespace: namespace_of(cap),
        };
    }
    if let Some(cap) = member_re.captures(line_before) {
        if let Some(namespace) = namespace_of(cap) {
            return CompletionContext::Member { namespace };
        }
    }
    CompletionContext::Value
}
