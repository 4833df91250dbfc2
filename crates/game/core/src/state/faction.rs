use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use database::Handle;

use crate::data::{Faction, Resource, Trigger};
use crate::state::UnitHandle;

/// Index of a faction in [`crate::GameState::factions`].
///
/// Factions live for the whole match, so the index never dangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactionId(pub u32);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faction#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactionState {
    pub definition: Handle<Faction>,
    pub resources: BTreeMap<Handle<Resource>, i64>,
    pub score: i64,
    pub flags: BTreeSet<String>,
    pub defeated: bool,
    pub last_created_unit: Option<UnitHandle>,
    /// Fire-once pulse triggers that already fired for this faction.
    pub retired_triggers: BTreeSet<Handle<Trigger>>,
}

impl FactionState {
    pub fn new(definition: Handle<Faction>) -> Self {
        Self {
            definition,
            resources: BTreeMap::new(),
            score: 0,
            flags: BTreeSet::new(),
            defeated: false,
            last_created_unit: None,
            retired_triggers: BTreeSet::new(),
        }
    }

    pub fn resource(&self, resource: Handle<Resource>) -> i64 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    pub fn set_resource(&mut self, resource: Handle<Resource>, quantity: i64) {
        self.resources.insert(resource, quantity);
    }

    /// Adds `change`, saturating at the bounds of `i64`.
    pub fn change_resource(&mut self, resource: Handle<Resource>, change: i64) {
        let quantity = self.resources.entry(resource).or_insert(0);
        *quantity = quantity.saturating_add(change);
    }
}
