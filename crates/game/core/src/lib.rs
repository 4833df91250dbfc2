//! Game data types, the script interpreter and the tick scheduler.
//!
//! `game-core` registers the definition types (resources, unit classes,
//! factions, scripted effects, dialogues, triggers) with a
//! [`database::Database`], interprets the effect and condition trees they
//! carry, and drives delayed effects and triggers tick by tick. Match state
//! lives in [`GameState`]; all randomness flows through an
//! [`env::RngOracle`] so a seeded match replays identically.
pub mod config;
pub mod data;
pub mod env;
pub mod error;
pub mod schedule;
pub mod script;
pub mod state;

pub use config::SchedulerConfig;
pub use data::{
    Character, Dialogue, Faction, FactionScriptedEffect, Named, Resource, ScriptedEffect, Trigger,
    TriggerKind, UnitClass, UnitScriptedEffect, register_types,
};
pub use env::{DialogueEvent, NarrativeHost, NarrativeLog, PcgRng, RngOracle, SequenceRng};
pub use error::{ReferenceExt, ScriptError};
pub use schedule::{
    DelayedEffectInstance, DelayedQueue, DelayedTarget, PulseClock, Scheduler, TickReport,
    TriggerPump,
};
pub use script::{
    Condition, Conditions, Context, Effect, EffectList, Env, FactionScope, Factor, ScopeType,
    UnitScope, View, Weight,
};
pub use state::{
    FactionId, FactionState, GameState, Tick, UnitArena, UnitHandle, UnitState,
};
