//! Mutable match state the interpreter acts on.
//!
//! Definitions stay in the [`database::Catalog`]; the state only stores
//! handles to them plus the per-match numbers (resources, score, unit hit
//! points). Factions are created once per match and addressed by
//! [`FactionId`]; units come and go and are addressed by generational
//! [`UnitHandle`]s.
mod faction;
mod unit;

pub use faction::{FactionId, FactionState};
pub use unit::{UnitArena, UnitHandle, UnitState};

use database::{Catalog, DataError, Handle};
use tracing::debug;

use crate::data::{Character, Faction, UnitClass};

/// Simulation tick counter.
pub type Tick = u64;

#[derive(Clone, Debug, Default)]
pub struct GameState {
    pub tick: Tick,
    pub factions: Vec<FactionState>,
    pub units: UnitArena,
    /// Faction bound to the local player, if any.
    pub player: Option<FactionId>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates one faction per faction definition, in registry order, with
    /// its starting resources, units and characters.
    pub fn from_definitions(data: &Catalog) -> Result<Self, DataError> {
        let mut state = Self::new();
        for (handle, _) in data.registry::<Faction>()?.iter() {
            state.add_faction(data, handle)?;
        }
        debug!(
            factions = state.factions.len(),
            units = state.units.len(),
            "created match state"
        );
        Ok(state)
    }

    pub fn add_faction(&mut self, data: &Catalog, definition: Handle<Faction>) -> Result<FactionId, DataError> {
        let faction = data.entry(definition)?;
        let id = FactionId(self.factions.len() as u32);

        let mut state = FactionState::new(definition);
        for &(resource, quantity) in &faction.starting_resources {
            state.change_resource(resource, quantity);
        }
        self.factions.push(state);

        for &(class, count) in &faction.starting_units {
            for _ in 0..count {
                self.spawn_unit(data, class, id, None)?;
            }
        }
        for &character in &faction.starting_characters {
            let class = data.entry(character)?.unit_class()?;
            self.spawn_unit(data, class, id, Some(character))?;
        }

        Ok(id)
    }

    pub fn faction(&self, id: FactionId) -> Option<&FactionState> {
        self.factions.get(id.0 as usize)
    }

    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut FactionState> {
        self.factions.get_mut(id.0 as usize)
    }

    pub fn faction_by_definition(&self, definition: Handle<Faction>) -> Option<FactionId> {
        self.factions
            .iter()
            .position(|faction| faction.definition == definition)
            .map(|index| FactionId(index as u32))
    }

    /// Factions that have not been defeated, in creation order.
    pub fn active_factions(&self) -> Vec<FactionId> {
        self.factions
            .iter()
            .enumerate()
            .filter(|(_, faction)| !faction.defeated)
            .map(|(index, _)| FactionId(index as u32))
            .collect()
    }

    /// Creates a unit at full hit points and records it as the owner's last
    /// created unit.
    pub fn spawn_unit(
        &mut self,
        data: &Catalog,
        class: Handle<UnitClass>,
        owner: FactionId,
        character: Option<Handle<Character>>,
    ) -> Result<UnitHandle, DataError> {
        let hit_points = data.entry(class)?.hit_points;
        let handle = self.units.insert(UnitState {
            class,
            owner,
            character,
            hit_points,
            experience: 0,
        });
        if let Some(faction) = self.faction_mut(owner) {
            faction.last_created_unit = Some(handle);
        }
        Ok(handle)
    }

    pub fn units_of(&self, owner: FactionId) -> impl Iterator<Item = (UnitHandle, &UnitState)> {
        self.units.iter().filter(move |(_, unit)| unit.owner == owner)
    }
}
