//! Declaration scanning over inline script text.
//!
//! Finds top-level `<keyword> name = expression;` statements in document
//! order. Declarations inside function bodies or other bracketed blocks are
//! not part of the page's data and are skipped. The expression is read with
//! a bracket-depth and string-aware scanner, so a `;` nested inside `{}`,
//! `[]`, `()` or a quoted string does not end it.
//! Keywords that appear inside string literals or comments are ignored.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declaration keyword used by the page's script dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    Var,
    Let,
    Const,
}

impl Keyword {
    /// The keyword as it appears in script source.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Let => "let",
            Self::Const => "const",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "var" => Ok(Self::Var),
            "let" => Ok(Self::Let),
            "const" => Ok(Self::Const),
            other => Err(ExtractError::UnknownKeyword(other.to_string())),
        }
    }
}

/// One `name = expression;` statement found in a script block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Identifier on the left of `=`.
    pub name: String,
    /// Raw expression text between `=` and the terminating `;`, trimmed.
    pub expression: String,
    /// Byte offset of the keyword within the scanned text.
    pub offset: usize,
}

/// Find every top-level declaration introduced by `keyword` in `text`.
///
/// Duplicate names are all returned in the order they appear; folding them
/// into a mapping makes the last one win. A declaration whose expression
/// never reaches a terminator is skipped and scanning resumes right after
/// its keyword, so later declarations are still found.
pub fn scan_declarations(text: &str, keyword: Keyword) -> Vec<Declaration> {
    let bytes = text.as_bytes();
    let kw = keyword.as_str().as_bytes();
    let mut found = Vec::new();
    let mut depth: usize = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' | b'`' => {
                i = skip_string(bytes, i).unwrap_or(i + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line_comment(bytes, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
            }
            b'{' | b'[' | b'(' => {
                depth += 1;
                i += 1;
            }
            b'}' | b']' | b')' => {
                // A stray closer cannot push the scan below top level.
                depth = depth.saturating_sub(1);
                i += 1;
            }
            _ if depth == 0 && bytes[i..].starts_with(kw) && is_word_start(bytes, i) => {
                match parse_declaration(text, i, i + kw.len()) {
                    Some((decl, next)) => {
                        found.push(decl);
                        i = next;
                    }
                    None => i += kw.len(),
                }
            }
            _ => i += 1,
        }
    }

    found
}

// ---- Private helpers --------------------------------------------------------

/// Parse the remainder of a declaration whose keyword ends at `pos`.
///
/// Returns the declaration and the index just past its `;`.
fn parse_declaration(text: &str, offset: usize, pos: usize) -> Option<(Declaration, usize)> {
    let bytes = text.as_bytes();

    // The keyword must be followed by whitespace.
    let after_ws = skip_whitespace(bytes, pos);
    if after_ws == pos {
        return None;
    }

    let name_len: usize = text[after_ws..]
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .map(char::len_utf8)
        .sum();
    if name_len == 0 {
        return None;
    }
    let name = &text[after_ws..after_ws + name_len];

    let eq = skip_whitespace(bytes, after_ws + name_len);
    if bytes.get(eq) != Some(&b'=') || bytes.get(eq + 1) == Some(&b'=') {
        return None;
    }

    let expr_start = skip_whitespace(bytes, eq + 1);
    let terminator = find_terminator(bytes, expr_start)?;
    let expression = text[expr_start..terminator].trim_end();
    if expression.is_empty() {
        return None;
    }

    Some((
        Declaration {
            name: name.to_string(),
            expression: expression.to_string(),
            offset,
        },
        terminator + 1,
    ))
}

/// Find the `;` that ends an expression starting at `start`.
///
/// Returns `None` when the text ends first, or when a closing bracket with
/// no matching opener shows the enclosing block ended before any `;`.
fn find_terminator(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut j = start;

    while j < bytes.len() {
        match bytes[j] {
            b'"' | b'\'' | b'`' => {
                j = skip_string(bytes, j)?;
                continue;
            }
            b'/' if bytes.get(j + 1) == Some(&b'/') => {
                j = skip_line_comment(bytes, j);
                continue;
            }
            b'/' if bytes.get(j + 1) == Some(&b'*') => {
                j = skip_block_comment(bytes, j);
                continue;
            }
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            b';' if depth == 0 => return Some(j),
            _ => {}
        }
        j += 1;
    }

    None
}

/// Skip a quoted string starting at `start`, returning the index past its
/// closing quote. Single and double quoted strings cannot span lines;
/// template literals can.
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' if quote != b'`' => return None,
            c if c == quote => return Some(j + 1),
            _ => j += 1,
        }
    }
    None
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| start + p + 1)
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |p| start + 2 + p + 2)
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn is_word_start(bytes: &[u8], i: usize) -> bool {
    i == 0 || !(bytes[i - 1].is_ascii_alphanumeric() || matches!(bytes[i - 1], b'_' | b'$' | b'.'))
}

// ---- Tests ------------------------------------------------------------------
