//! Boolean/string call surface for an external scripting engine.
//!
//! The engine calls into the match by name with positional arguments:
//!
//! | Call | Arguments | Result |
//! |------|-----------|--------|
//! | `trigger_conditions` | trigger, faction | whether the trigger's conditions hold |
//! | `run_scripted_effect` | faction scripted effect, faction | `true` once applied |
//! | `describe_scripted_effect` | faction scripted effect | description text |
//! | `entity_exists` | class, identifier | whether the definition exists |
//!
//! Factions are passed either as the faction definition's identifier or as
//! the match's faction index.

use core::fmt;

use database::Catalog;
use game_core::{
    Character, Context, Dialogue, Faction, FactionId, FactionScriptedEffect, Resource,
    ScriptedEffect, Trigger, UnitClass, UnitScriptedEffect,
};
use tracing::trace;

use crate::error::{Result, RuntimeError};
use crate::simulation::Simulation;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ScriptValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ScriptValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

pub struct ScriptBridge<'a> {
    simulation: &'a mut Simulation,
}

impl<'a> ScriptBridge<'a> {
    pub const CALLS: &'static [&'static str] = &[
        "trigger_conditions",
        "run_scripted_effect",
        "describe_scripted_effect",
        "entity_exists",
    ];

    pub fn new(simulation: &'a mut Simulation) -> Self {
        Self { simulation }
    }

    pub fn call(&mut self, name: &str, arguments: &[ScriptValue]) -> Result<ScriptValue> {
        trace!(call = name, arguments = arguments.len(), "script call");
        match name {
            "trigger_conditions" => self.trigger_conditions(arguments),
            "run_scripted_effect" => self.run_scripted_effect(arguments),
            "describe_scripted_effect" => self.describe_scripted_effect(arguments),
            "entity_exists" => self.entity_exists(arguments),
            _ => Err(RuntimeError::UnknownCall(name.to_owned())),
        }
    }

    fn trigger_conditions(&self, arguments: &[ScriptValue]) -> Result<ScriptValue> {
        const CALL: &str = "trigger_conditions";
        let identifier = string(arguments, 0, CALL, "a trigger identifier")?;
        let faction = self.faction(arguments, 1, CALL)?;

        let data = self.simulation.data();
        let trigger = data.entry(data.require::<Trigger>(identifier)?)?;
        let view = game_core::View {
            state: self.simulation.state(),
            data,
        };
        let holds = trigger.conditions_hold(faction, &Context::for_faction(faction), view)?;
        Ok(holds.into())
    }

    fn run_scripted_effect(&mut self, arguments: &[ScriptValue]) -> Result<ScriptValue> {
        const CALL: &str = "run_scripted_effect";
        let identifier = string(arguments, 0, CALL, "a scripted effect identifier")?;
        let faction = self.faction(arguments, 1, CALL)?;

        let handle = self.simulation.data().require::<FactionScriptedEffect>(identifier)?;
        self.simulation.with_env(|env| {
            ScriptedEffect::run(handle, faction, &Context::for_faction(faction), env)
        })?;
        Ok(true.into())
    }

    fn describe_scripted_effect(&self, arguments: &[ScriptValue]) -> Result<ScriptValue> {
        let identifier = string(arguments, 0, "describe_scripted_effect", "a scripted effect identifier")?;
        let data = self.simulation.data();
        let handle = data.require::<FactionScriptedEffect>(identifier)?;
        Ok(ScriptedEffect::describe(handle, data, 0, "").into())
    }

    fn entity_exists(&self, arguments: &[ScriptValue]) -> Result<ScriptValue> {
        const CALL: &str = "entity_exists";
        let class = string(arguments, 0, CALL, "a class and an identifier")?;
        let identifier = string(arguments, 1, CALL, "a class and an identifier")?;
        Ok(exists(self.simulation.data(), class, identifier).into())
    }

    fn faction(&self, arguments: &[ScriptValue], index: usize, call: &'static str) -> Result<FactionId> {
        const EXPECTED: &str = "a faction identifier or index";
        let state = self.simulation.state();

        let faction = match arguments.get(index) {
            Some(ScriptValue::Int(index)) => u32::try_from(*index).ok().map(FactionId),
            Some(ScriptValue::Str(identifier)) => self
                .simulation
                .data()
                .get::<Faction>(identifier)?
                .and_then(|handle| state.faction_by_definition(handle)),
            _ => None,
        };

        faction
            .filter(|&faction| state.faction(faction).is_some())
            .ok_or(RuntimeError::BadArguments {
                call,
                expected: EXPECTED,
            })
    }
}

fn string<'v>(
    arguments: &'v [ScriptValue],
    index: usize,
    call: &'static str,
    expected: &'static str,
) -> Result<&'v str> {
    arguments
        .get(index)
        .and_then(ScriptValue::as_str)
        .ok_or(RuntimeError::BadArguments { call, expected })
}

fn exists(data: &Catalog, class: &str, identifier: &str) -> bool {
    match class {
        "resource" => data.exists::<Resource>(identifier),
        "unit_class" => data.exists::<UnitClass>(identifier),
        "character" => data.exists::<Character>(identifier),
        "faction" => data.exists::<Faction>(identifier),
        "faction_scripted_effect" => data.exists::<FactionScriptedEffect>(identifier),
        "unit_scripted_effect" => data.exists::<UnitScriptedEffect>(identifier),
        "dialogue" => data.exists::<Dialogue>(identifier),
        "trigger" => data.exists::<Trigger>(identifier),
        _ => false,
    }
}
