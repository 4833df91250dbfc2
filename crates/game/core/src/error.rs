//! Errors raised while running effects and conditions.
//!
//! Bad data is rejected while definitions are configured and validated, so
//! evaluation errors point at a gap in that validation rather than at the
//! data itself.

use database::DataError;
use markup::Operator;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{class}: operator '{operator}' is not supported")]
    UnsupportedOperator {
        class: &'static str,
        operator: Operator,
    },

    #[error("{class}: unresolved reference")]
    Reference {
        class: &'static str,
        #[source]
        source: DataError,
    },

    #[error("scripted effects nested deeper than {limit} levels")]
    RecursionLimit { limit: usize },

    #[error(transparent)]
    Data(#[from] DataError),
}

impl ScriptError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedOperator { .. } => "SCRIPT_UNSUPPORTED_OPERATOR",
            Self::Reference { .. } => "SCRIPT_UNRESOLVED_REFERENCE",
            Self::RecursionLimit { .. } => "SCRIPT_RECURSION_LIMIT",
            Self::Data(error) => error.error_code(),
        }
    }

    pub fn unsupported(class: &'static str, operator: Operator) -> Self {
        Self::UnsupportedOperator { class, operator }
    }

    /// Reference that configure should have resolved but did not.
    pub fn unresolved(class: &'static str, what: &str) -> Self {
        Self::Reference {
            class,
            source: DataError::Invalid(format!("{what} was never set")),
        }
    }
}

/// Wraps lookup failures with the class of the effect or condition that
/// performed them.
pub trait ReferenceExt<T> {
    fn within(self, class: &'static str) -> Result<T, ScriptError>;
}

impl<T> ReferenceExt<T> for Result<T, DataError> {
    fn within(self, class: &'static str) -> Result<T, ScriptError> {
        self.map_err(|source| ScriptError::Reference { class, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_errors_keep_the_cause() {
        let result: Result<(), DataError> = Err(DataError::NotFound {
            class: "resource",
            identifier: "gold".into(),
        });
        let error = result.within("create_unit").unwrap_err();

        assert_eq!(error.error_code(), "SCRIPT_UNRESOLVED_REFERENCE");
        assert_eq!(error.to_string(), "create_unit: unresolved reference");
        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), "resource: no entity named 'gold'");
    }
}
