//! Typed, multi-module entity database loaded from markup.
//!
//! Each data type implements [`DataEntry`] and is registered once with a
//! [`Database`]. Loading runs the fixed pass sequence over all modules:
//!
//! 1. **parse**: read each module's `<folder>/**/*.txt` files into per-type
//!    queues of top-level scopes
//! 2. **define**: create an entity per `tag = { }`, look up the existing one
//!    for `tag += { }`, register `aliases += name` entries
//! 3. **configure**: dispatch each definition's properties and scopes onto
//!    its entity
//! 4. **initialize**, **finalize_text**, **validate**: per-entity hooks
//!
//! Types declare the classes they depend on and every pass visits them in
//! dependency order. Later modules may add entities or amend existing ones
//! with `+=`, never delete them.
//!
//! Entities are addressed through typed [`Handle`]s. A handle is stable
//! until the registry is cleared, so data types store handles to each other
//! instead of references.

mod catalog;
mod database;
mod entry;
mod error;
mod handle;
mod module;
mod pipeline;
mod record;
mod registry;
pub mod value;

pub use catalog::Catalog;
pub use database::{DEFAULT_FILE_EXTENSION, Database};
pub use entry::{ConfigContext, DataEntry, configure_entry};
pub use error::{DataError, Stage};
pub use handle::{Handle, ModuleId};
pub use module::{DataModule, MANIFEST_FILE, ModuleManifest, discover_modules};
pub use pipeline::TypeMetadata;
pub use record::{NONE_IDENTIFIER, Record, SEPARATORS, swapped_separators};
pub use registry::{PendingDefinition, Registry};
pub use value::FixedPoint;

/// Property key used to declare extra names for an entity.
pub const ALIASES_KEY: &str = "aliases";
