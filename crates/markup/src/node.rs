//! Tree model produced by the parser.
//!
//! A [`ScopeNode`] is an optionally tagged block holding an ordered list of
//! [`Element`]s plus a separate list of bare positional values:
//!
//! ```text
//! hero = {            # scope "hero", operator "="
//!     strength = 5    # property
//!     traits += {     # scope "traits", operator "+="
//!         brave       # bare value
//!     }
//! }
//! ```
//!
//! Element order is preserved because effect lists execute in declaration
//! order.

use crate::Operator;

/// A single `key <operator> value` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyNode {
    pub key: String,
    pub operator: Operator,
    pub value: String,
}

impl PropertyNode {
    pub fn new(key: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Entry of a scope, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Property(PropertyNode),
    Scope(ScopeNode),
}

/// A (possibly anonymous) block of elements and bare values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeNode {
    /// Tag before the operator; empty for anonymous `{ ... }` blocks and
    /// for the root of an in-memory parse.
    pub tag: String,
    pub operator: Operator,
    pub elements: Vec<Element>,
    pub values: Vec<String>,
}

impl ScopeNode {
    pub fn new(tag: impl Into<String>, operator: Operator) -> Self {
        Self {
            tag: tag.into(),
            operator,
            elements: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Returns true if the scope holds neither elements nor values.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.values.is_empty()
    }

    pub fn push_property(&mut self, property: PropertyNode) {
        self.elements.push(Element::Property(property));
    }

    pub fn push_scope(&mut self, scope: ScopeNode) {
        self.elements.push(Element::Scope(scope));
    }

    pub fn push_value(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyNode> {
        self.elements.iter().filter_map(|element| match element {
            Element::Property(property) => Some(property),
            Element::Scope(_) => None,
        })
    }

    /// Child scopes in declaration order.
    pub fn children(&self) -> impl Iterator<Item = &ScopeNode> {
        self.elements.iter().filter_map(|element| match element {
            Element::Scope(scope) => Some(scope),
            Element::Property(_) => None,
        })
    }

    /// First child scope with the given tag.
    pub fn child(&self, tag: &str) -> Option<&ScopeNode> {
        self.children().find(|scope| scope.tag == tag)
    }

    /// Value of the first property with the given key.
    pub fn property_value(&self, key: &str) -> Option<&str> {
        self.properties()
            .find(|property| property.key == key)
            .map(|property| property.value.as_str())
    }
}
