//! Token-stream parser building a [`ScopeNode`] tree.
//!
//! The parser keeps a stack of open scopes. Each open scope records the
//! [`ScopeId`] of its parent instead of a pointer, so closing a scope is a
//! matter of popping it and attaching it to the scope its id names.
//!
//! Per token the parser is in one of three states:
//!
//! | pending       | token                 | result                               |
//! |---------------|-----------------------|--------------------------------------|
//! | nothing       | bare `{` / `}`        | open anonymous scope / close scope   |
//! | nothing       | anything else         | becomes the pending key              |
//! | key           | operator              | becomes the pending operator         |
//! | key           | anything else         | key turns into a bare value          |
//! | key, operator | bare `{`              | opens a tagged scope (`=`/`+=` only) |
//! | key, operator | anything else         | commits a property                   |

use tracing::trace;

use crate::lexer::{Token, tokenize_line};
use crate::{Operator, ParseError, PropertyNode, ScopeNode};

/// Index of an open scope on the parser stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ScopeId(usize);

struct OpenScope {
    node: ScopeNode,
    parent: Option<ScopeId>,
    opened_at: usize,
}

struct PendingKey {
    token: Token,
    line: usize,
}

pub(crate) struct Parser {
    open: Vec<OpenScope>,
    key: Option<PendingKey>,
    operator: Option<Operator>,
}

impl Parser {
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            open: vec![OpenScope {
                node: ScopeNode::new(root_tag, Operator::Assignment),
                parent: None,
                opened_at: 1,
            }],
            key: None,
            operator: None,
        }
    }

    fn current_id(&self) -> ScopeId {
        ScopeId(self.open.len() - 1)
    }

    fn current(&mut self) -> &mut ScopeNode {
        let id = self.current_id();
        &mut self.open[id.0].node
    }

    pub fn feed_line(&mut self, text: &str, line: usize) -> Result<(), ParseError> {
        for token in tokenize_line(text, line)? {
            self.feed_token(token, line)?;
        }

        // A key never followed by an operator on its own line is a bare value.
        if self.operator.is_none() {
            self.flush_key_as_value();
        }

        Ok(())
    }

    fn feed_token(&mut self, token: Token, line: usize) -> Result<(), ParseError> {
        match (self.key.take(), self.operator.take()) {
            (None, _) => self.start(token, line),
            (Some(key), None) => {
                if !token.quoted {
                    if let Ok(operator) = token.text.parse::<Operator>() {
                        self.key = Some(key);
                        self.operator = Some(operator);
                        return Ok(());
                    }
                    if Operator::looks_like_operator(&token.text) {
                        return Err(ParseError::UnknownOperator {
                            line,
                            key: key.token.text,
                            operator: token.text,
                        });
                    }
                }
                self.current().push_value(key.token.text);
                self.start(token, line)
            }
            (Some(key), Some(operator)) => self.complete(key, operator, token, line),
        }
    }

    fn start(&mut self, token: Token, line: usize) -> Result<(), ParseError> {
        if token.is_bare("{") {
            self.open_scope(ScopeNode::default(), line);
            Ok(())
        } else if token.is_bare("}") {
            self.close_scope(line)
        } else {
            self.key = Some(PendingKey { token, line });
            Ok(())
        }
    }

    fn complete(
        &mut self,
        key: PendingKey,
        operator: Operator,
        token: Token,
        line: usize,
    ) -> Result<(), ParseError> {
        if token.is_bare("{") {
            if !operator.opens_scope() {
                return Err(ParseError::InvalidScopeOperator {
                    line,
                    tag: key.token.text,
                    operator,
                });
            }
            self.open_scope(ScopeNode::new(key.token.text, operator), line);
            return Ok(());
        }

        if token.is_bare("}") {
            return Err(ParseError::MissingValue {
                line,
                key: key.token.text,
                operator,
            });
        }

        self.current()
            .push_property(PropertyNode::new(key.token.text, operator, token.text));
        Ok(())
    }

    fn open_scope(&mut self, node: ScopeNode, line: usize) {
        let parent = Some(self.current_id());
        self.open.push(OpenScope {
            node,
            parent,
            opened_at: line,
        });
    }

    fn close_scope(&mut self, line: usize) -> Result<(), ParseError> {
        let Some(parent) = self.open[self.current_id().0].parent else {
            return Err(ParseError::UnexpectedClosingBrace { line });
        };

        if let Some(closed) = self.open.pop() {
            self.open[parent.0].node.push_scope(closed.node);
        }
        Ok(())
    }

    fn flush_key_as_value(&mut self) {
        if let Some(key) = self.key.take() {
            self.current().push_value(key.token.text);
        }
    }

    pub fn finish(mut self) -> Result<ScopeNode, ParseError> {
        if let (Some(key), Some(operator)) = (self.key.take(), self.operator.take()) {
            return Err(ParseError::MissingValue {
                line: key.line,
                key: key.token.text,
                operator,
            });
        }
        self.flush_key_as_value();

        if self.open.len() > 1 {
            let unclosed = &self.open[self.open.len() - 1];
            return Err(ParseError::UnclosedScope {
                line: unclosed.opened_at,
                tag: unclosed.node.tag.clone(),
            });
        }

        let root = self.open.pop().map(|open| open.node).unwrap_or_default();
        trace!(
            tag = %root.tag,
            elements = root.elements.len(),
            "parsed markup tree"
        );
        Ok(root)
    }
}

/// Parses markup text into an untagged root scope.
pub fn parse(text: &str) -> Result<ScopeNode, ParseError> {
    parse_tagged(text, "")
}

/// Parses markup text into a root scope with the given tag.
pub fn parse_tagged(text: &str, root_tag: &str) -> Result<ScopeNode, ParseError> {
    let mut parser = Parser::new(root_tag);
    for (index, line) in text.lines().enumerate() {
        parser.feed_line(line, index + 1)?;
    }
    parser.finish()
}
