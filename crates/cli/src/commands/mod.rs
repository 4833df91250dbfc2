//! Command implementations for datacheck
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod check;
mod describe;
mod parse;
mod simulate;

pub use check::Check;
pub use describe::Describe;
pub use parse::Parse;
pub use simulate::Simulate;

use std::path::Path;

use anyhow::{Context, Result};
use runtime::{ConfigLoader, RuntimeConfig};

/// Configuration from `path` when given, otherwise defaults; environment
/// variables override either.
pub(crate) fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    let config = match path {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    Ok(config.with_env())
}
