use bitflags::bitflags;
use database::Catalog;
use markup::Operator;

use crate::config::SchedulerConfig;
use crate::env::{NarrativeHost, RngOracle};
use crate::error::ScriptError;
use crate::schedule::DelayedQueue;
use crate::state::{FactionId, GameState, UnitHandle};

bitflags! {
    /// Operators an effect kind accepts.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Operators: u8 {
        const ASSIGN = 1 << 0;
        const ADD = 1 << 1;
        const SUBTRACT = 1 << 2;

        const ALL = Self::ASSIGN.bits() | Self::ADD.bits() | Self::SUBTRACT.bits();
    }
}

impl Operators {
    pub fn supports(self, operator: Operator) -> bool {
        match operator {
            Operator::Assignment => self.contains(Self::ASSIGN),
            Operator::Addition => self.contains(Self::ADD),
            Operator::Subtraction => self.contains(Self::SUBTRACT),
            _ => false,
        }
    }
}

/// Read-only execution context carried alongside the scope.
///
/// Captured by delayed effects and restored when they fire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    /// Faction the running trigger, dialogue or script was started for.
    pub current_faction: Option<FactionId>,
    pub source_unit: Option<UnitHandle>,
}

impl Context {
    pub fn for_faction(faction: FactionId) -> Self {
        Self {
            current_faction: Some(faction),
            source_unit: None,
        }
    }
}

/// Everything an effect may touch while it runs.
pub struct Env<'a> {
    pub state: &'a mut GameState,
    pub data: &'a Catalog,
    pub rng: &'a mut dyn RngOracle,
    pub delayed: &'a mut DelayedQueue,
    pub narrative: &'a mut dyn NarrativeHost,
    pub(crate) depth: usize,
}

impl<'a> Env<'a> {
    pub fn new(
        state: &'a mut GameState,
        data: &'a Catalog,
        rng: &'a mut dyn RngOracle,
        delayed: &'a mut DelayedQueue,
        narrative: &'a mut dyn NarrativeHost,
    ) -> Self {
        Self {
            state,
            data,
            rng,
            delayed,
            narrative,
            depth: 0,
        }
    }

    /// Enters a nested named script, failing past the nesting limit.
    pub(crate) fn enter(&mut self) -> Result<(), ScriptError> {
        if self.depth >= SchedulerConfig::MAX_SCRIPT_DEPTH {
            return Err(ScriptError::RecursionLimit {
                limit: SchedulerConfig::MAX_SCRIPT_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn view(&self) -> View<'_> {
        View {
            state: self.state,
            data: self.data,
        }
    }
}

/// Read-only access for conditions and factors.
#[derive(Clone, Copy)]
pub struct View<'a> {
    pub state: &'a GameState,
    pub data: &'a Catalog,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_only_cover_effect_operators() {
        let flags = Operators::ADD | Operators::SUBTRACT;
        assert!(flags.supports(Operator::Addition));
        assert!(flags.supports(Operator::Subtraction));
        assert!(!flags.supports(Operator::Assignment));
        assert!(!Operators::ALL.supports(Operator::GreaterThan));
    }
}
