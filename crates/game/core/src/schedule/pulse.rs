use crate::env::RngOracle;
use crate::state::Tick;

/// Fires once per period at a random offset into the period.
///
/// The offset is drawn again at the start of every period, so triggers on
/// different pulses do not keep landing on the same tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PulseClock {
    period: Tick,
    period_start: Tick,
    offset: Tick,
    fired: bool,
}

impl PulseClock {
    /// Clock whose first period starts at `start`.
    pub fn new(period: Tick, start: Tick, rng: &mut dyn RngOracle) -> Self {
        Self {
            period,
            period_start: start,
            offset: rng.below(period),
            fired: false,
        }
    }

    pub fn period(&self) -> Tick {
        self.period
    }

    /// Tick on which the current period fires.
    pub fn next_fire(&self) -> Tick {
        self.period_start + self.offset
    }

    /// Moves the clock to `tick`; returns whether the pulse fires on it.
    pub fn advance(&mut self, tick: Tick, rng: &mut dyn RngOracle) -> bool {
        if self.period == 0 {
            return false;
        }

        while tick >= self.period_start + self.period {
            self.period_start += self.period;
            self.offset = rng.below(self.period);
            self.fired = false;
        }

        if !self.fired && tick >= self.next_fire() {
            self.fired = true;
            return true;
        }
        false
    }
}
