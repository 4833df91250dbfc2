//! Per-type entity storage with identifier and alias lookup.

use std::collections::HashMap;

use markup::ScopeNode;
use tracing::trace;

use crate::record::{NONE_IDENTIFIER, swapped_separators};
use crate::{DataEntry, DataError, Handle, ModuleId, Record};

/// Top-level definition waiting for the define and configure passes.
#[derive(Clone, Debug)]
pub struct PendingDefinition {
    pub module: ModuleId,
    pub node: ScopeNode,
}

/// All entities of one data type.
///
/// Primary identifiers and aliases share one namespace: no two entities of
/// the same type may be reachable through the same string.
pub struct Registry<T> {
    entries: Vec<Option<T>>,
    identifiers: HashMap<String, Handle<T>>,
    pending: Vec<PendingDefinition>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            identifiers: HashMap::new(),
            pending: Vec::new(),
        }
    }
}

impl<T: DataEntry> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new entity owned by `module`.
    ///
    /// Also registers the separator-swapped spelling of `identifier` as an
    /// alias.
    pub fn add(&mut self, identifier: &str, module: ModuleId) -> Result<Handle<T>, DataError> {
        if identifier.is_empty() {
            return Err(DataError::EmptyIdentifier { class: T::CLASS });
        }
        if identifier == NONE_IDENTIFIER {
            return Err(DataError::ReservedIdentifier {
                class: T::CLASS,
                identifier: identifier.to_owned(),
            });
        }
        if self.identifiers.contains_key(identifier) {
            return Err(DataError::DuplicateIdentifier {
                class: T::CLASS,
                identifier: identifier.to_owned(),
            });
        }
        let swapped = swapped_separators(identifier);
        if let Some(swapped) = &swapped
            && self.identifiers.contains_key(swapped.as_str())
        {
            return Err(DataError::DuplicateIdentifier {
                class: T::CLASS,
                identifier: identifier.to_owned(),
            });
        }

        let handle = Handle::new(self.entries.len() as u32);
        let mut record = Record::new(identifier.to_owned(), module);
        self.identifiers.insert(identifier.to_owned(), handle);
        if let Some(swapped) = swapped {
            self.identifiers.insert(swapped.clone(), handle);
            record.push_alias(swapped);
        }
        self.entries.push(Some(T::new(record)));

        trace!(class = T::CLASS, identifier, "added entity");
        Ok(handle)
    }

    /// Registers an extra name for an existing entity, plus its
    /// separator-swapped spelling.
    pub fn add_alias(&mut self, handle: Handle<T>, alias: &str) -> Result<(), DataError> {
        if alias.is_empty() {
            return Err(DataError::EmptyIdentifier { class: T::CLASS });
        }

        let mut names = vec![alias.to_owned()];
        names.extend(swapped_separators(alias));

        for name in &names {
            if name == NONE_IDENTIFIER || self.identifiers.contains_key(name.as_str()) {
                return Err(DataError::DuplicateAlias {
                    class: T::CLASS,
                    alias: name.clone(),
                });
            }
        }

        let entry = self.entry_mut(handle)?;
        for name in &names {
            entry.record_mut().push_alias(name.clone());
        }
        for name in names {
            self.identifiers.insert(name, handle);
        }
        Ok(())
    }

    /// Removes an entity and every name it was reachable through.
    pub fn remove(&mut self, handle: Handle<T>) -> Result<T, DataError> {
        let entry = self
            .entries
            .get_mut(handle.index() as usize)
            .and_then(Option::take)
            .ok_or(DataError::StaleHandle {
                class: T::CLASS,
                index: handle.index(),
            })?;
        self.identifiers.retain(|_, existing| *existing != handle);
        Ok(entry)
    }

    /// Resolves an identifier or alias.
    ///
    /// `"none"` resolves to `Ok(None)`; any other unknown name fails.
    pub fn get(&self, identifier: &str) -> Result<Option<Handle<T>>, DataError> {
        if identifier == NONE_IDENTIFIER {
            return Ok(None);
        }
        self.try_get(identifier)
            .map(Some)
            .ok_or_else(|| DataError::NotFound {
                class: T::CLASS,
                identifier: identifier.to_owned(),
            })
    }

    /// Resolves an identifier or alias, returning `None` when unknown.
    pub fn try_get(&self, identifier: &str) -> Option<Handle<T>> {
        self.identifiers.get(identifier).copied()
    }

    /// Like [`Registry::get`] but treats `"none"` as an error too.
    pub fn require(&self, identifier: &str) -> Result<Handle<T>, DataError> {
        self.get(identifier)?.ok_or_else(|| DataError::NotFound {
            class: T::CLASS,
            identifier: identifier.to_owned(),
        })
    }

    pub fn exists(&self, identifier: &str) -> bool {
        self.identifiers.contains_key(identifier)
    }

    pub fn entry(&self, handle: Handle<T>) -> Result<&T, DataError> {
        self.entries
            .get(handle.index() as usize)
            .and_then(Option::as_ref)
            .ok_or(DataError::StaleHandle {
                class: T::CLASS,
                index: handle.index(),
            })
    }

    pub fn entry_mut(&mut self, handle: Handle<T>) -> Result<&mut T, DataError> {
        self.entries
            .get_mut(handle.index() as usize)
            .and_then(Option::as_mut)
            .ok_or(DataError::StaleHandle {
                class: T::CLASS,
                index: handle.index(),
            })
    }

    /// Looks up an entity by name.
    pub fn find(&self, identifier: &str) -> Option<&T> {
        self.try_get(identifier)
            .and_then(|handle| self.entry(handle).ok())
    }

    /// Live entities in insertion order, with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|entry| (Handle::new(index as u32), entry)))
    }

    /// Live entities in insertion order.
    pub fn get_all(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.get_all().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------
    // Pipeline support
    // ------------------------------------------------------------------

    pub(crate) fn enqueue(&mut self, module: ModuleId, node: ScopeNode) {
        self.pending.push(PendingDefinition { module, node });
    }

    /// Orders pending definitions by module rank, keeping file order within
    /// a module.
    pub(crate) fn sort_pending(&mut self) {
        self.pending.sort_by_key(|definition| definition.module);
    }

    pub(crate) fn take_pending(&mut self) -> Vec<PendingDefinition> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn restore_pending(&mut self, pending: Vec<PendingDefinition>) {
        self.pending = pending;
    }

    /// Moves entity storage out so entities can be mutated while the rest
    /// of the catalog (including this registry's name table) stays readable.
    pub(crate) fn take_entries(&mut self) -> Vec<Option<T>> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn restore_entries(&mut self, entries: Vec<Option<T>>) {
        self.entries = entries;
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().flatten()
    }

    /// Drops all entities, names and pending definitions.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.identifiers.clear();
        self.pending.clear();
    }
}
