//! Errors surfaced by the runtime.
//!
//! Wraps configuration, data and script failures so the binary can report
//! them with a stable code.
use std::path::PathBuf;

use database::DataError;
use game_core::ScriptError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to read config {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("player faction '{0}' is not defined")]
    UnknownPlayerFaction(String),

    #[error("unknown script call '{0}'")]
    UnknownCall(String),

    #[error("{call}: expected {expected}")]
    BadArguments {
        call: &'static str,
        expected: &'static str,
    },
}

impl RuntimeError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigRead { .. } => "RUNTIME_CONFIG_READ",
            Self::ConfigParse { .. } => "RUNTIME_CONFIG_PARSE",
            Self::Data(error) => error.error_code(),
            Self::Script(error) => error.error_code(),
            Self::UnknownPlayerFaction(_) => "RUNTIME_UNKNOWN_PLAYER_FACTION",
            Self::UnknownCall(_) => "RUNTIME_UNKNOWN_CALL",
            Self::BadArguments { .. } => "RUNTIME_BAD_ARGUMENTS",
        }
    }
}
