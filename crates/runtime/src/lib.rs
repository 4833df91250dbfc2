//! Runtime for data-driven matches.
//!
//! This crate wires the definition database, the match state and the
//! scheduler together behind a synchronous [`Simulation`], loads its
//! [`RuntimeConfig`] from TOML and the environment, and exposes a small
//! boolean/string call surface for external scripting engines.
//!
//! Modules are organized by responsibility:
//! - [`config`] holds configuration and its loader
//! - [`simulation`] hosts the match driver
//! - [`bridge`] exposes script calls by name
pub mod bridge;
pub mod config;
pub mod error;
pub mod simulation;

pub use bridge::{ScriptBridge, ScriptValue};
pub use config::{ConfigLoader, DataConfig, ModuleConfig, RuntimeConfig};
pub use error::{Result, RuntimeError};
pub use simulation::{RunSummary, Simulation};
