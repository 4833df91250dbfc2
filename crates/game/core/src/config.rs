use crate::state::Tick;

/// Periods of the coarse trigger pulses, in ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    pub half_minute_pulse: Tick,
    pub minute_pulse: Tick,
}

impl SchedulerConfig {
    pub const TICKS_PER_SECOND: Tick = 30;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_HALF_MINUTE_PULSE: Tick = 30 * Self::TICKS_PER_SECOND;
    pub const DEFAULT_MINUTE_PULSE: Tick = 60 * Self::TICKS_PER_SECOND;

    /// Upper bound on nested scripted effect calls.
    pub const MAX_SCRIPT_DEPTH: usize = 32;

    pub fn new() -> Self {
        Self {
            half_minute_pulse: Self::DEFAULT_HALF_MINUTE_PULSE,
            minute_pulse: Self::DEFAULT_MINUTE_PULSE,
        }
    }

    pub fn with_pulses(half_minute_pulse: Tick, minute_pulse: Tick) -> Self {
        Self {
            half_minute_pulse,
            minute_pulse,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}
