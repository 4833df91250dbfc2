//! Line tokenizer.
//!
//! Splits one line into tokens on whitespace, honoring quoted strings and
//! `#` comments. Quoting only affects how characters are read; the parser
//! still needs to know whether a token was quoted so that `"{"` stays an
//! ordinary value instead of opening a scope.

use crate::ParseError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub text: String,
    pub quoted: bool,
}

impl Token {
    /// Returns true if the token is the given structural symbol written bare.
    pub fn is_bare(&self, symbol: &str) -> bool {
        !self.quoted && self.text == symbol
    }
}

#[derive(Default)]
struct TokenBuilder {
    text: String,
    quoted: bool,
    started: bool,
}

impl TokenBuilder {
    fn push(&mut self, c: char) {
        self.text.push(c);
        self.started = true;
    }

    fn finish(&mut self, tokens: &mut Vec<Token>) {
        if self.started {
            let builder = std::mem::take(self);
            tokens.push(Token {
                text: builder.text,
                quoted: builder.quoted,
            });
        }
    }
}

fn unescape(c: char, line: usize) -> Result<char, ParseError> {
    match c {
        'n' => Ok('\n'),
        't' => Ok('\t'),
        'r' => Ok('\r'),
        '"' => Ok('"'),
        '\\' => Ok('\\'),
        other => Err(ParseError::InvalidEscape {
            line,
            character: other,
        }),
    }
}

/// Tokenizes a single line. `line` is the 1-based number used in errors.
pub(crate) fn tokenize_line(text: &str, line: usize) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = TokenBuilder::default();
    let mut in_quotes = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => in_quotes = false,
                '\\' => {
                    let escaped = chars
                        .next()
                        .ok_or(ParseError::UnterminatedQuote { line })?;
                    current.push(unescape(escaped, line)?);
                }
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                current.quoted = true;
                current.started = true;
            }
            '#' => break,
            ' ' | '\t' | '\r' | '\n' => current.finish(&mut tokens),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(ParseError::UnterminatedQuote { line });
    }
    current.finish(&mut tokens);

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<String> {
        tokenize_line(line, 1)
            .unwrap()
            .into_iter()
            .map(|token| token.text)
            .collect()
    }

    #[test]
    fn splits_on_whitespace_and_tabs() {
        assert_eq!(texts("a =\t{ b }"), ["a", "=", "{", "b", "}"]);
    }

    #[test]
    fn comment_ends_the_line() {
        assert_eq!(texts("gold = 5 # starting gold"), ["gold", "=", "5"]);
        assert!(texts("# only a comment").is_empty());
    }

    #[test]
    fn quotes_keep_whitespace_and_hash() {
        let tokens = tokenize_line(r#"name = "Red # Keep""#, 1).unwrap();
        assert_eq!(tokens[2].text, "Red # Keep");
        assert!(tokens[2].quoted);
        assert!(!tokens[0].quoted);
    }

    #[test]
    fn empty_quotes_yield_empty_token() {
        let tokens = tokenize_line(r#"text = """#, 1).unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].text, "");
    }

    #[test]
    fn escapes_inside_quotes() {
        let tokens = tokenize_line(r#""a\nb\t\"c\"\\""#, 1).unwrap();
        assert_eq!(tokens[0].text, "a\nb\t\"c\"\\");
    }

    #[test]
    fn backslash_outside_quotes_is_literal() {
        assert_eq!(texts(r"path\to"), [r"path\to"]);
    }

    #[test]
    fn unknown_escape_fails() {
        let error = tokenize_line(r#""bad \q""#, 7).unwrap_err();
        assert!(matches!(
            error,
            ParseError::InvalidEscape {
                line: 7,
                character: 'q'
            }
        ));
    }

    #[test]
    fn unterminated_quote_fails() {
        let error = tokenize_line(r#"name = "open"#, 3).unwrap_err();
        assert!(matches!(error, ParseError::UnterminatedQuote { line: 3 }));
    }

    #[test]
    fn quoted_brace_is_marked_quoted() {
        let tokens = tokenize_line(r#"{ "{" }"#, 1).unwrap();
        assert!(tokens[0].is_bare("{"));
        assert!(!tokens[1].is_bare("{"));
        assert!(tokens[2].is_bare("}"));
    }
}
