//! Declarative markup used for every data definition.
//!
//! The format is a whitespace-separated stream of `key <operator> value`
//! properties, `tag <operator> { ... }` scopes, anonymous `{ ... }` blocks and
//! bare values, with `#` comments and double-quoted strings.
//!
//! ```
//! let root = markup::parse("hero = { strength = 5 traits += { brave } }")?;
//! let hero = root.child("hero").unwrap();
//! assert_eq!(hero.property_value("strength"), Some("5"));
//! assert_eq!(hero.child("traits").unwrap().values, ["brave"]);
//! # Ok::<(), markup::ParseError>(())
//! ```
//!
//! [`parse_file`] uses the file stem as the tag of the returned root scope and
//! wraps any error with the file path.

mod error;
mod lexer;
mod node;
mod operator;
mod parser;
mod render;

use std::path::Path;

pub use error::ParseError;
pub use node::{Element, PropertyNode, ScopeNode};
pub use operator::Operator;
pub use parser::{parse, parse_tagged};

/// Reads and parses a whole file.
///
/// The returned root scope is tagged with the file stem.
pub fn parse_file(path: &Path) -> Result<ScopeNode, ParseError> {
    if !path.exists() {
        return Err(ParseError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::trace!(path = %path.display(), "parsing markup file");
    parse_tagged(&text, &stem).map_err(|error| error.in_file(path))
}
