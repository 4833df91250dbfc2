//! Errors raised by the registry and the load pipeline.
//!
//! Failures are wrapped with more context as they travel up: a bad value
//! inside an entity becomes [`DataError::Entity`] (stage, class, identifier,
//! module), and a broken file becomes [`DataError::Module`]. The validate pass
//! collects every entity's failure into a single [`DataError::Validation`].

use std::path::PathBuf;

use markup::{Operator, ParseError};
use thiserror::Error;

/// Pipeline stage an entity-level failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Define,
    Configure,
    Initialize,
    FinalizeText,
    Validate,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------
    #[error("{class}: identifier must not be empty")]
    EmptyIdentifier { class: &'static str },

    #[error("{class}: identifier '{identifier}' is reserved")]
    ReservedIdentifier {
        class: &'static str,
        identifier: String,
    },

    #[error("{class}: identifier '{identifier}' is already in use")]
    DuplicateIdentifier {
        class: &'static str,
        identifier: String,
    },

    #[error("{class}: alias '{alias}' is already in use")]
    DuplicateAlias { class: &'static str, alias: String },

    #[error("{class}: no entity named '{identifier}'")]
    NotFound {
        class: &'static str,
        identifier: String,
    },

    #[error("{class}: entity handle #{index} is no longer valid")]
    StaleHandle { class: &'static str, index: u32 },

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------
    #[error("{class}: unknown property '{key}'")]
    UnknownProperty { class: &'static str, key: String },

    #[error("{class}: unknown scope '{tag}'")]
    UnknownScope { class: &'static str, tag: String },

    #[error("{class}: unexpected bare value '{value}'")]
    UnexpectedValue { class: &'static str, value: String },

    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("operator '{operator}' is not supported for '{key}'")]
    InvalidOperator { key: String, operator: Operator },

    #[error("{0}")]
    Invalid(String),

    #[error("{stage} failed for {class} '{identifier}' (module '{module}')")]
    Entity {
        stage: Stage,
        class: &'static str,
        identifier: String,
        module: String,
        #[source]
        source: Box<DataError>,
    },

    #[error("{} validation error(s)", .0.len())]
    Validation(Vec<DataError>),

    // ------------------------------------------------------------------
    // Types and modules
    // ------------------------------------------------------------------
    #[error("type '{class}' is not registered")]
    UnregisteredType { class: &'static str },

    #[error("type '{class}' is registered twice")]
    DuplicateType { class: &'static str },

    #[error("type '{class}' depends on unregistered type '{dependency}'")]
    UnknownDependency {
        class: &'static str,
        dependency: &'static str,
    },

    #[error("dependency cycle between types: {}", .classes.join(", "))]
    DependencyCycle { classes: Vec<&'static str> },

    #[error("unknown data module '{0}'")]
    UnknownModule(String),

    #[error("data module '{0}' is registered twice")]
    DuplicateModule(String),

    #[error("failed to load data module '{module}'")]
    Module {
        module: String,
        #[source]
        source: Box<DataError>,
    },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DataError {
    /// Stable identifier for tooling and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(inner) => inner.error_code(),
            Self::EmptyIdentifier { .. } => "DATA_EMPTY_IDENTIFIER",
            Self::ReservedIdentifier { .. } => "DATA_RESERVED_IDENTIFIER",
            Self::DuplicateIdentifier { .. } => "DATA_DUPLICATE_IDENTIFIER",
            Self::DuplicateAlias { .. } => "DATA_DUPLICATE_ALIAS",
            Self::NotFound { .. } => "DATA_NOT_FOUND",
            Self::StaleHandle { .. } => "DATA_STALE_HANDLE",
            Self::UnknownProperty { .. } => "DATA_UNKNOWN_PROPERTY",
            Self::UnknownScope { .. } => "DATA_UNKNOWN_SCOPE",
            Self::UnexpectedValue { .. } => "DATA_UNEXPECTED_VALUE",
            Self::InvalidValue { .. } => "DATA_INVALID_VALUE",
            Self::InvalidOperator { .. } => "DATA_INVALID_OPERATOR",
            Self::Invalid(_) => "DATA_INVALID",
            Self::Entity { source, .. } | Self::Module { source, .. } => source.error_code(),
            Self::Validation(_) => "DATA_VALIDATION",
            Self::UnregisteredType { .. } => "DATA_UNREGISTERED_TYPE",
            Self::DuplicateType { .. } => "DATA_DUPLICATE_TYPE",
            Self::UnknownDependency { .. } => "DATA_UNKNOWN_DEPENDENCY",
            Self::DependencyCycle { .. } => "DATA_DEPENDENCY_CYCLE",
            Self::UnknownModule(_) => "DATA_UNKNOWN_MODULE",
            Self::DuplicateModule(_) => "DATA_DUPLICATE_MODULE",
            Self::Io { .. } => "DATA_IO",
        }
    }

    /// Shorthand for [`DataError::InvalidValue`].
    pub fn invalid_value(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`DataError::InvalidOperator`].
    pub fn invalid_operator(key: &str, operator: Operator) -> Self {
        Self::InvalidOperator {
            key: key.to_owned(),
            operator,
        }
    }

    /// Innermost cause, skipping entity and module wrappers.
    pub fn root_cause(&self) -> &DataError {
        match self {
            Self::Entity { source, .. } | Self::Module { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Renders the error and its causes as an indented multi-line report.
    ///
    /// Validation reports list every collected error in turn.
    pub fn report(&self) -> String {
        let mut out = String::new();
        self.write_report(&mut out, 0);
        out
    }

    fn write_report(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        out.push_str(&self.to_string());
        out.push('\n');

        match self {
            Self::Validation(errors) => {
                for error in errors {
                    error.write_report(out, depth + 1);
                }
            }
            Self::Entity { source, .. } | Self::Module { source, .. } => {
                source.write_report(out, depth + 1);
            }
            other => {
                let mut cause = std::error::Error::source(other);
                let mut level = depth + 1;
                while let Some(error) = cause {
                    out.push_str(&"  ".repeat(level));
                    out.push_str(&error.to_string());
                    out.push('\n');
                    cause = error.source();
                    level += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_wrapper_keeps_the_cause() {
        let error = DataError::Entity {
            stage: Stage::Configure,
            class: "unit_class",
            identifier: "archer".into(),
            module: "base".into(),
            source: Box::new(DataError::UnknownProperty {
                class: "unit_class",
                key: "speed".into(),
            }),
        };

        assert_eq!(
            error.to_string(),
            "configure failed for unit_class 'archer' (module 'base')"
        );
        assert_eq!(error.error_code(), "DATA_UNKNOWN_PROPERTY");
        assert!(matches!(
            error.root_cause(),
            DataError::UnknownProperty { .. }
        ));
    }

    #[test]
    fn report_nests_validation_errors() {
        let error = DataError::Validation(vec![
            DataError::Invalid("first".into()),
            DataError::Invalid("second".into()),
        ]);
        assert_eq!(
            error.report(),
            "2 validation error(s)\n  first\n  second\n"
        );
    }

    #[test]
    fn stage_names_are_snake_case() {
        assert_eq!(Stage::FinalizeText.to_string(), "finalize_text");
    }
}
