//! Units live in a generational arena.
//!
//! A [`UnitHandle`] pairs a slot index with the generation the slot had
//! when the unit was created. Removing a unit bumps the slot's generation,
//! so handles kept by delayed effects or faction bookkeeping stop resolving
//! instead of silently pointing at whatever reuses the slot.

use database::Handle;

use crate::data::{Character, UnitClass};
use crate::state::FactionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitHandle {
    index: u32,
    generation: u32,
}

impl UnitHandle {
    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// A unit on the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitState {
    pub class: Handle<UnitClass>,
    pub owner: FactionId,
    pub character: Option<Handle<Character>>,
    pub hit_points: i64,
    pub experience: i64,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    unit: Option<UnitState>,
}

#[derive(Clone, Debug, Default)]
pub struct UnitArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl UnitArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: UnitState) -> UnitHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.unit = Some(unit);
            return UnitHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            unit: Some(unit),
        });
        UnitHandle {
            index,
            generation: 0,
        }
    }

    pub fn remove(&mut self, handle: UnitHandle) -> Option<UnitState> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let unit = slot.unit.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(unit)
    }

    pub fn get(&self, handle: UnitHandle) -> Option<&UnitState> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.unit.as_ref())
    }

    pub fn get_mut(&mut self, handle: UnitHandle) -> Option<&mut UnitState> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.unit.as_mut())
    }

    pub fn contains(&self, handle: UnitHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Live units in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitHandle, &UnitState)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.unit.as_ref().map(|unit| {
                (
                    UnitHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    unit,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.unit.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
