//! Canonical text rendering.
//!
//! Rendering writes one entry per line with four-space indentation: bare
//! values first, then elements in declaration order. Tokens that would not
//! survive the lexer as written are quoted and escaped, so feeding the output
//! back through [`crate::parse`] reproduces the same tree.

use std::fmt::{self, Write};
use std::io;
use std::path::Path;

use crate::{Element, Operator, ScopeNode};

const INDENT: &str = "    ";

fn needs_quotes(token: &str) -> bool {
    token.is_empty()
        || token == "{"
        || token == "}"
        || Operator::looks_like_operator(token)
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '#' | '\\'))
}

/// Writes `token` so that the lexer reads it back unchanged.
fn write_token(out: &mut impl Write, token: &str) -> fmt::Result {
    if !needs_quotes(token) {
        return out.write_str(token);
    }

    out.write_char('"')?;
    for c in token.chars() {
        match c {
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            other => out.write_char(other)?,
        }
    }
    out.write_char('"')
}

fn write_indent(out: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    Ok(())
}

fn write_body(out: &mut impl Write, scope: &ScopeNode, depth: usize) -> fmt::Result {
    for value in &scope.values {
        write_indent(out, depth)?;
        write_token(out, value)?;
        out.write_char('\n')?;
    }

    for element in &scope.elements {
        write_indent(out, depth)?;
        match element {
            Element::Property(property) => {
                write_token(out, &property.key)?;
                write!(out, " {} ", property.operator)?;
                write_token(out, &property.value)?;
                out.write_char('\n')?;
            }
            Element::Scope(child) => {
                if !child.tag.is_empty() {
                    write_token(out, &child.tag)?;
                    write!(out, " {} ", child.operator)?;
                }
                out.write_str("{\n")?;
                write_body(out, child, depth + 1)?;
                write_indent(out, depth)?;
                out.write_str("}\n")?;
            }
        }
    }

    Ok(())
}

impl fmt::Display for ScopeNode {
    /// Renders the scope's contents; the scope's own tag is not written, the
    /// same way a file's stem is not part of the file.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_body(f, self, 0)
    }
}

impl ScopeNode {
    /// Renders the scope to canonical markup text.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Writes the rendered scope to `path`.
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_text())
    }
}
