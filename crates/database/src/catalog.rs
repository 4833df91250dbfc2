//! Type-indexed collection of registries.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::{DataEntry, DataError, Handle, Registry};

/// Owns one [`Registry`] per registered data type.
///
/// Lookups for a type that was never registered fail with
/// [`DataError::UnregisteredType`] instead of panicking.
#[derive(Default)]
pub struct Catalog {
    registries: HashMap<TypeId, Box<dyn Any>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert<T: DataEntry>(&mut self) -> bool {
        if self.registries.contains_key(&TypeId::of::<T>()) {
            return false;
        }
        self.registries
            .insert(TypeId::of::<T>(), Box::new(Registry::<T>::new()));
        true
    }

    pub fn contains<T: DataEntry>(&self) -> bool {
        self.registries.contains_key(&TypeId::of::<T>())
    }

    pub fn registry<T: DataEntry>(&self) -> Result<&Registry<T>, DataError> {
        self.registries
            .get(&TypeId::of::<T>())
            .and_then(|registry| registry.downcast_ref::<Registry<T>>())
            .ok_or(DataError::UnregisteredType { class: T::CLASS })
    }

    pub fn registry_mut<T: DataEntry>(&mut self) -> Result<&mut Registry<T>, DataError> {
        self.registries
            .get_mut(&TypeId::of::<T>())
            .and_then(|registry| registry.downcast_mut::<Registry<T>>())
            .ok_or(DataError::UnregisteredType { class: T::CLASS })
    }

    /// Resolves a name; `"none"` yields `Ok(None)`.
    pub fn get<T: DataEntry>(&self, identifier: &str) -> Result<Option<Handle<T>>, DataError> {
        self.registry::<T>()?.get(identifier)
    }

    /// Resolves a name that must refer to an entity.
    pub fn require<T: DataEntry>(&self, identifier: &str) -> Result<Handle<T>, DataError> {
        self.registry::<T>()?.require(identifier)
    }

    pub fn exists<T: DataEntry>(&self, identifier: &str) -> bool {
        self.registry::<T>()
            .map(|registry| registry.exists(identifier))
            .unwrap_or(false)
    }

    pub fn entry<T: DataEntry>(&self, handle: Handle<T>) -> Result<&T, DataError> {
        self.registry::<T>()?.entry(handle)
    }

    /// Identifier of the entity behind `handle`, for messages and rendering.
    pub fn identifier<T: DataEntry>(&self, handle: Handle<T>) -> Result<&str, DataError> {
        Ok(self.entry(handle)?.record().identifier())
    }
}
