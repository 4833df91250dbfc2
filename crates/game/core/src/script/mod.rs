//! Effect, condition and factor interpreter.
//!
//! Script trees are built from markup while their owning definitions are
//! configured and run later against one of two scope kinds:
//! [`FactionScope`] (the primary scope) and [`UnitScope`]. Node kinds are
//! looked up by key in per-scope constructor tables, so adding a kind means
//! adding a table entry.
//!
//! Effects mutate the [`crate::GameState`] through an [`Env`]; conditions and
//! factors only see a read-only [`View`].

pub mod condition;
mod context;
pub mod effect;
mod factor;
mod scope;

pub use condition::{Comparison, Condition, ConditionConstructor, ConditionTable, Conditions};
pub use context::{Context, Env, Operators, View};
pub use effect::{Effect, EffectConstructor, EffectList, EffectNode, EffectTable};
pub use factor::{Factor, FactorModifier, Weight};
pub use scope::{FactionScope, ScopeCapture, ScopeType, UnitScope};

use database::{Catalog, Handle};

use crate::data::Named;

/// One description line: caller prefix, then four spaces per indent level.
pub(crate) fn line(indent: usize, prefix: &str, text: impl AsRef<str>) -> String {
    format!("{prefix}{}{}", "    ".repeat(indent), text.as_ref())
}

/// Display name of a referenced entity, or its handle if it is gone.
pub(crate) fn name_of<T: Named>(data: &Catalog, handle: Handle<T>) -> String {
    data.entry(handle)
        .map(|entry| entry.name().to_owned())
        .unwrap_or_else(|_| format!("<{} #{}>", T::CLASS, handle.index()))
}

/// Same as [`name_of`] for an optional reference.
pub(crate) fn name_or_unset<T: Named>(data: &Catalog, handle: Option<Handle<T>>) -> String {
    match handle {
        Some(handle) => name_of(data, handle),
        None => "<unset>".to_owned(),
    }
}
