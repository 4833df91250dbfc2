//! The two scope kinds scripts run against.

use core::fmt;
use std::sync::OnceLock;

use database::{ConfigContext, DataError, Handle};
use markup::PropertyNode;

use crate::data::ScriptedEffect;
use crate::schedule::DelayedTarget;
use crate::script::condition::{self, Condition, ConditionTable};
use crate::script::effect::{self, Effect, EffectTable};
use crate::state::{FactionId, GameState, UnitHandle};

/// A kind of entity effects and conditions are evaluated against.
pub trait ScopeType: Sized + 'static {
    /// How a scope instance is addressed in the match state.
    type Ref: Copy + fmt::Debug + PartialEq;

    const NAME: &'static str;
    /// Class named by "unknown key" errors for this scope's effects.
    const EFFECT_CLASS: &'static str;
    const CONDITION_CLASS: &'static str;
    const SCRIPTED_EFFECT_CLASS: &'static str;
    const SCRIPTED_EFFECT_FOLDER: &'static str;

    fn effect_table() -> &'static EffectTable<Self>;

    fn condition_table() -> &'static ConditionTable<Self>;

    /// Builds an effect for a key missing from the table, if the scope has a
    /// shorthand for it.
    fn fallback_effect(
        _property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Option<Result<Box<dyn Effect<Self>>, DataError>> {
        None
    }

    fn fallback_condition(
        _property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Option<Result<Box<dyn Condition<Self>>, DataError>> {
        None
    }

    fn capture(target: Self::Ref) -> ScopeCapture;

    /// Re-resolves a captured scope; `None` once it no longer exists.
    fn resolve(capture: ScopeCapture, state: &GameState) -> Option<Self::Ref>;

    /// Faction a scope instance belongs to.
    fn faction_of(target: Self::Ref, state: &GameState) -> Option<FactionId>;

    fn delayed_effect(handle: Handle<ScriptedEffect<Self>>) -> DelayedTarget;
}

/// Scope reference held by a delayed effect.
///
/// Factions exist for the whole match and are kept as a stable index. Units
/// can be destroyed before the effect fires, so they are held by
/// generational handle and checked for liveness when resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeCapture {
    Stable(FactionId),
    Owned(UnitHandle),
}

/// Primary scope: a faction.
#[derive(Debug)]
pub enum FactionScope {}

/// Secondary scope: a single unit.
#[derive(Debug)]
pub enum UnitScope {}

impl ScopeType for FactionScope {
    type Ref = FactionId;

    const NAME: &'static str = "faction";
    const EFFECT_CLASS: &'static str = "faction effect";
    const CONDITION_CLASS: &'static str = "faction condition";
    const SCRIPTED_EFFECT_CLASS: &'static str = "faction_scripted_effect";
    const SCRIPTED_EFFECT_FOLDER: &'static str = "scripted_effects/faction";

    fn effect_table() -> &'static EffectTable<Self> {
        static TABLE: OnceLock<EffectTable<FactionScope>> = OnceLock::new();
        TABLE.get_or_init(effect::faction_effects)
    }

    fn condition_table() -> &'static ConditionTable<Self> {
        static TABLE: OnceLock<ConditionTable<FactionScope>> = OnceLock::new();
        TABLE.get_or_init(condition::faction_conditions)
    }

    fn fallback_effect(
        property: &PropertyNode,
        context: &ConfigContext<'_>,
    ) -> Option<Result<Box<dyn Effect<Self>>, DataError>> {
        effect::resource_shorthand(property, context)
    }

    fn fallback_condition(
        property: &PropertyNode,
        context: &ConfigContext<'_>,
    ) -> Option<Result<Box<dyn Condition<Self>>, DataError>> {
        condition::resource_shorthand(property, context)
    }

    fn capture(target: FactionId) -> ScopeCapture {
        ScopeCapture::Stable(target)
    }

    fn resolve(capture: ScopeCapture, state: &GameState) -> Option<FactionId> {
        match capture {
            ScopeCapture::Stable(faction) => state.faction(faction).map(|_| faction),
            ScopeCapture::Owned(_) => None,
        }
    }

    fn faction_of(target: FactionId, state: &GameState) -> Option<FactionId> {
        state.faction(target).map(|_| target)
    }

    fn delayed_effect(handle: Handle<ScriptedEffect<Self>>) -> DelayedTarget {
        DelayedTarget::FactionEffect(handle)
    }
}

impl ScopeType for UnitScope {
    type Ref = UnitHandle;

    const NAME: &'static str = "unit";
    const EFFECT_CLASS: &'static str = "unit effect";
    const CONDITION_CLASS: &'static str = "unit condition";
    const SCRIPTED_EFFECT_CLASS: &'static str = "unit_scripted_effect";
    const SCRIPTED_EFFECT_FOLDER: &'static str = "scripted_effects/unit";

    fn effect_table() -> &'static EffectTable<Self> {
        static TABLE: OnceLock<EffectTable<UnitScope>> = OnceLock::new();
        TABLE.get_or_init(effect::unit_effects)
    }

    fn condition_table() -> &'static ConditionTable<Self> {
        static TABLE: OnceLock<ConditionTable<UnitScope>> = OnceLock::new();
        TABLE.get_or_init(condition::unit_conditions)
    }

    fn capture(target: UnitHandle) -> ScopeCapture {
        ScopeCapture::Owned(target)
    }

    fn resolve(capture: ScopeCapture, state: &GameState) -> Option<UnitHandle> {
        match capture {
            ScopeCapture::Owned(unit) if state.units.contains(unit) => Some(unit),
            _ => None,
        }
    }

    fn faction_of(target: UnitHandle, state: &GameState) -> Option<FactionId> {
        state.units.get(target).map(|unit| unit.owner)
    }

    fn delayed_effect(handle: Handle<ScriptedEffect<Self>>) -> DelayedTarget {
        DelayedTarget::UnitEffect(handle)
    }
}
