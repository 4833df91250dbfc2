//! Definition types loaded through the database pipeline.
//!
//! | class | folder |
//! |-------|--------|
//! | `resource` | `resources/` |
//! | `unit_class` | `unit_classes/` |
//! | `character` | `characters/` |
//! | `faction` | `factions/` |
//! | `faction_scripted_effect` | `scripted_effects/faction/` |
//! | `unit_scripted_effect` | `scripted_effects/unit/` |
//! | `dialogue` | `dialogues/` |
//! | `trigger` | `triggers/` |

mod character;
mod dialogue;
mod faction;
mod resource;
mod scripted_effect;
mod trigger;
mod unit_class;

pub use character::Character;
pub use dialogue::Dialogue;
pub use faction::Faction;
pub use resource::Resource;
pub use scripted_effect::{FactionScriptedEffect, ScriptedEffect, UnitScriptedEffect};
pub use trigger::{Trigger, TriggerKind};
pub use unit_class::UnitClass;

use database::{DataEntry, DataError, Database, Record};

/// Definitions with a display name.
pub trait Named: DataEntry {
    fn name(&self) -> &str;
}

/// Fills an unset display name from the identifier.
pub(crate) fn default_name(name: &mut Option<String>, record: &Record) {
    if name.is_none() {
        *name = Some(record.display_name());
    }
}

/// Registers every definition type with the database.
pub fn register_types(database: &mut Database) -> Result<(), DataError> {
    database.register::<Resource>()?;
    database.register::<UnitClass>()?;
    database.register::<Character>()?;
    database.register::<Faction>()?;
    database.register::<FactionScriptedEffect>()?;
    database.register::<UnitScriptedEffect>()?;
    database.register::<Dialogue>()?;
    database.register::<Trigger>()?;
    Ok(())
}
