//! The contract every data type implements to take part in the pipeline.

use markup::{PropertyNode, ScopeNode};

use crate::{Catalog, DataError, DataModule, Handle, Record};

/// Read-only view handed to entities while they are configured.
///
/// Every registered type has finished its define pass by the time configure
/// runs, so any identifier written in the data can be resolved here.
pub struct ConfigContext<'a> {
    pub catalog: &'a Catalog,
    pub module: &'a DataModule,
}

impl ConfigContext<'_> {
    /// Resolves a reference; `"none"` yields `Ok(None)`.
    pub fn resolve<U: crate::DataEntry>(&self, identifier: &str) -> Result<Option<Handle<U>>, DataError> {
        self.catalog.get::<U>(identifier)
    }

    /// Resolves a reference that must name an entity.
    pub fn require<U: crate::DataEntry>(&self, identifier: &str) -> Result<Handle<U>, DataError> {
        self.catalog.require::<U>(identifier)
    }
}

/// A data type loaded from markup.
///
/// Implementors provide the storage for their [`Record`] and override the
/// `process_*` hooks for the properties, scopes and bare values they accept.
/// Anything not handled is rejected by the defaults, naming the type.
///
/// # Lifecycle
///
/// 1. `new` when a definition is first seen (define pass)
/// 2. `process_*` once per element of every definition and amendment
///    (configure pass)
/// 3. `initialize` once, after every type has been configured
/// 4. `finalize_text` to fill derived display text
/// 5. `check` during validation
pub trait DataEntry: Sized + 'static {
    /// Class identifier used in messages and dependency declarations.
    const CLASS: &'static str;

    /// Sub-folder of each data module holding this type's files. Types
    /// without a folder are never parsed from disk.
    const FOLDER: Option<&'static str> = None;

    /// Classes that must complete each pass before this one.
    const DEPENDENCIES: &'static [&'static str] = &[];

    fn new(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn identifier(&self) -> &str {
        self.record().identifier()
    }

    /// Handles one `key <op> value` element.
    ///
    /// While a type is configured its entities are detached from their
    /// registry. Identifiers of the same type still resolve to handles
    /// through `context`, but `Catalog::entry` on such a handle fails with
    /// [`DataError::StaleHandle`] until the pass is over. The same holds for
    /// the other `process_*` hooks and for `initialize`.
    fn process_property(
        &mut self,
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<(), DataError> {
        Err(DataError::UnknownProperty {
            class: Self::CLASS,
            key: property.key.clone(),
        })
    }

    fn process_scope(
        &mut self,
        scope: &ScopeNode,
        _context: &ConfigContext<'_>,
    ) -> Result<(), DataError> {
        Err(DataError::UnknownScope {
            class: Self::CLASS,
            tag: scope.tag.clone(),
        })
    }

    fn process_value(&mut self, value: &str, _context: &ConfigContext<'_>) -> Result<(), DataError> {
        Err(DataError::UnexpectedValue {
            class: Self::CLASS,
            value: value.to_owned(),
        })
    }

    /// Resolves derived state. Must leave the record marked initialized.
    /// Other types can be read from `catalog`; this type's own entities
    /// cannot.
    fn initialize(&mut self, _catalog: &Catalog) -> Result<(), DataError> {
        self.record_mut().mark_initialized();
        Ok(())
    }

    fn finalize_text(&mut self) -> Result<(), DataError> {
        Ok(())
    }

    fn check(&self, _catalog: &Catalog) -> Result<(), DataError> {
        Ok(())
    }
}

/// Dispatches every element and bare value of `node` onto `entry`, in
/// declaration order.
///
/// `aliases` properties are skipped: they are consumed by the define pass.
pub fn configure_entry<T: DataEntry>(
    entry: &mut T,
    node: &ScopeNode,
    context: &ConfigContext<'_>,
) -> Result<(), DataError> {
    for value in &node.values {
        entry.process_value(value, context)?;
    }

    for element in &node.elements {
        match element {
            markup::Element::Property(property) if property.key == crate::ALIASES_KEY => {}
            markup::Element::Property(property) => entry.process_property(property, context)?,
            markup::Element::Scope(scope) => entry.process_scope(scope, context)?,
        }
    }

    Ok(())
}
