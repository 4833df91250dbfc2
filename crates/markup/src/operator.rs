//! Operators that bind a key to its value or child scope.

use core::cmp::Ordering;

/// Operator token between a key and its value.
///
/// The first three are the "definition" operators used to assign, amend or
/// retract; the rest only make sense inside conditions, where they compare a
/// measured quantity against the written value.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
pub enum Operator {
    #[default]
    #[strum(serialize = "=")]
    Assignment,
    #[strum(serialize = "+=")]
    Addition,
    #[strum(serialize = "-=")]
    Subtraction,
    #[strum(serialize = "==")]
    Equality,
    #[strum(serialize = "!=")]
    Inequality,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = "<=")]
    LessThanOrEqual,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = ">=")]
    GreaterThanOrEqual,
}

impl Operator {
    /// Characters an operator token is made of.
    pub const CHARACTERS: &'static str = "=+-!<>";

    /// Returns the textual form of the operator.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Whether a `{` may follow this operator to open a tagged scope.
    pub const fn opens_scope(self) -> bool {
        matches!(self, Self::Assignment | Self::Addition)
    }

    /// Whether this operator can be used to compare two quantities.
    ///
    /// Plain assignment counts as equality, so `score = 10` in a condition
    /// block reads as "score equals 10".
    pub const fn is_comparison(self) -> bool {
        !matches!(self, Self::Addition | Self::Subtraction)
    }

    /// Compares `lhs` against `rhs`. Returns `None` for non-comparison
    /// operators.
    pub fn compare<T: Ord>(self, lhs: &T, rhs: &T) -> Option<bool> {
        let ordering = lhs.cmp(rhs);
        let result = match self {
            Self::Assignment | Self::Equality => ordering == Ordering::Equal,
            Self::Inequality => ordering != Ordering::Equal,
            Self::LessThan => ordering == Ordering::Less,
            Self::LessThanOrEqual => ordering != Ordering::Greater,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::GreaterThanOrEqual => ordering != Ordering::Less,
            Self::Addition | Self::Subtraction => return None,
        };
        Some(result)
    }

    /// Returns true if `token` consists solely of operator characters.
    ///
    /// Used by the parser to tell a mistyped operator (`=>`, `!`) apart from
    /// a bare value that simply follows a key.
    pub fn looks_like_operator(token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| Self::CHARACTERS.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_operator_parses_from_its_text() {
        for operator in Operator::iter() {
            assert_eq!(operator.as_str().parse::<Operator>(), Ok(operator));
            assert!(Operator::looks_like_operator(operator.as_str()));
        }
    }

    #[test]
    fn only_assignment_and_addition_open_scopes() {
        let openers: Vec<_> = Operator::iter().filter(|op| op.opens_scope()).collect();
        assert_eq!(openers, vec![Operator::Assignment, Operator::Addition]);
    }

    #[test]
    fn compare_treats_assignment_as_equality() {
        assert_eq!(Operator::Assignment.compare(&3, &3), Some(true));
        assert_eq!(Operator::GreaterThanOrEqual.compare(&2, &3), Some(false));
        assert_eq!(Operator::LessThan.compare(&2, &3), Some(true));
        assert_eq!(Operator::Inequality.compare(&2, &3), Some(true));
        assert_eq!(Operator::Addition.compare(&2, &3), None);
    }

    #[test]
    fn operator_lookalikes() {
        assert!(Operator::looks_like_operator("=>"));
        assert!(!Operator::looks_like_operator("-5"));
        assert!(!Operator::looks_like_operator(""));
    }
}
