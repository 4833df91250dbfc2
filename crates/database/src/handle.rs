//! Typed indices into registries.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// Index of an entity inside its type's [`crate::Registry`].
///
/// Handles stay valid for the lifetime of the registry contents: removing an
/// entity empties its slot instead of shifting the ones after it. They are
/// invalidated by [`crate::Registry::clear`].
pub struct Handle<T> {
    index: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) const fn new(index: u32) -> Self {
        Self {
            index,
            marker: PhantomData,
        }
    }

    pub const fn index(self) -> u32 {
        self.index
    }
}

// Manual impls: deriving would require `T` itself to implement each trait.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

/// Position of a data module in load order. The default is the first
/// module added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    pub const fn rank(self) -> u32 {
        self.0
    }
}
