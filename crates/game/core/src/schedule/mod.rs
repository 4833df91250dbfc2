//! Per-tick driver for delayed effects and triggers.
//!
//! Each [`Scheduler::tick`] runs, in this order:
//!
//! 1. every delayed effect whose countdown reaches zero
//! 2. one default trigger, round-robin, for the player's faction
//! 3. each pulse whose random phase falls on this tick, for every faction
//!    still in the match
//!
//! Given the same random sequence the order of everything inside a tick is
//! fixed.

mod delayed;
mod pulse;
mod pump;

pub use delayed::{DelayedEffectInstance, DelayedQueue, DelayedTarget};
pub use pulse::PulseClock;
pub use pump::TriggerPump;

use database::{Catalog, DataEntry, DataError, Handle};
use tracing::{debug, trace};

use crate::config::SchedulerConfig;
use crate::data::{Trigger, TriggerKind};
use crate::env::{NarrativeHost, RngOracle};
use crate::error::ScriptError;
use crate::script::{Context, Env};
use crate::state::{FactionId, GameState, Tick};

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    pub delayed_fired: usize,
    pub default_trigger: Option<Handle<Trigger>>,
    pub pulses: Vec<TriggerKind>,
    pub pulse_triggers_fired: usize,
}

#[derive(Clone, Debug)]
struct Pulse {
    kind: TriggerKind,
    clock: PulseClock,
    triggers: Vec<Handle<Trigger>>,
}

#[derive(Clone, Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    delayed: DelayedQueue,
    pump: TriggerPump,
    pulses: Vec<Pulse>,
}

impl Scheduler {
    /// Collects the triggers of every kind and starts the pulse clocks at
    /// `start`.
    pub fn new(
        config: SchedulerConfig,
        data: &Catalog,
        start: Tick,
        rng: &mut dyn RngOracle,
    ) -> Result<Self, DataError> {
        let registry = data.registry::<Trigger>()?;

        let mut pulses = Vec::new();
        for (kind, period) in [
            (TriggerKind::HalfMinutePulse, config.half_minute_pulse),
            (TriggerKind::MinutePulse, config.minute_pulse),
        ] {
            let triggers = registry
                .iter()
                .filter(|(_, trigger)| trigger.kind() == kind)
                .map(|(handle, _)| handle)
                .collect();
            pulses.push(Pulse {
                kind,
                clock: PulseClock::new(period, start, rng),
                triggers,
            });
        }

        let pump = TriggerPump::from_catalog(data)?;
        debug!(
            default_triggers = pump.active().len(),
            half_minute_pulse = config.half_minute_pulse,
            minute_pulse = config.minute_pulse,
            "scheduler ready"
        );

        Ok(Self {
            config,
            delayed: DelayedQueue::new(),
            pump,
            pulses,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn delayed(&self) -> &DelayedQueue {
        &self.delayed
    }

    pub fn delayed_mut(&mut self) -> &mut DelayedQueue {
        &mut self.delayed
    }

    pub fn pump(&self) -> &TriggerPump {
        &self.pump
    }

    pub fn pulse_clock(&self, kind: TriggerKind) -> Option<&PulseClock> {
        self.pulses
            .iter()
            .find(|pulse| pulse.kind == kind)
            .map(|pulse| &pulse.clock)
    }

    /// Advances the match by one tick.
    pub fn tick(
        &mut self,
        state: &mut GameState,
        data: &Catalog,
        rng: &mut dyn RngOracle,
        narrative: &mut dyn NarrativeHost,
    ) -> Result<TickReport, ScriptError> {
        state.tick += 1;
        let tick = state.tick;
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        let due = self.delayed.advance();
        let mut env = Env::new(state, data, rng, &mut self.delayed, narrative);

        for instance in due {
            if instance.fire(&mut env)? {
                report.delayed_fired += 1;
            }
        }

        report.default_trigger = self.pump.advance(&mut env)?;

        for pulse in &mut self.pulses {
            if !pulse.clock.advance(tick, &mut *env.rng) {
                continue;
            }
            trace!(kind = %pulse.kind, tick, "pulse");
            report.pulses.push(pulse.kind);
            report.pulse_triggers_fired += run_pulse(&pulse.triggers, &mut env)?;
        }

        Ok(report)
    }
}

fn is_eligible(state: &GameState, faction: FactionId, trigger: Handle<Trigger>) -> bool {
    state
        .faction(faction)
        .is_some_and(|faction| !faction.defeated && !faction.retired_triggers.contains(&trigger))
}

fn retire(state: &mut GameState, faction: FactionId, trigger: Handle<Trigger>) {
    if let Some(faction) = state.faction_mut(faction) {
        faction.retired_triggers.insert(trigger);
    }
}

/// Checks a pulse's triggers for every faction still in the match.
fn run_pulse(triggers: &[Handle<Trigger>], env: &mut Env<'_>) -> Result<usize, ScriptError> {
    let data = env.data;
    let mut fired = 0;

    for faction in env.state.active_factions() {
        let mut candidates = Vec::new();

        for &handle in triggers {
            if !is_eligible(env.state, faction, handle) {
                continue;
            }
            let trigger = data.entry(handle)?;
            if trigger.is_random() {
                candidates.push(handle);
                continue;
            }
            if trigger.try_fire(faction, env)? {
                debug!(trigger = trigger.identifier(), %faction, "pulse trigger fired");
                fired += 1;
                if trigger.only_once() {
                    retire(env.state, faction, handle);
                }
            }
        }

        if fire_random(candidates, faction, env)?.is_some() {
            fired += 1;
        }
    }

    Ok(fired)
}

/// Draws among random triggers by weight until one fires. A drawn trigger
/// whose conditions fail leaves the pool for the next draw.
fn fire_random(
    mut pool: Vec<Handle<Trigger>>,
    faction: FactionId,
    env: &mut Env<'_>,
) -> Result<Option<Handle<Trigger>>, ScriptError> {
    let data = env.data;
    let context = Context::for_faction(faction);

    while !pool.is_empty() {
        if !env.state.faction(faction).is_some_and(|state| !state.defeated) {
            return Ok(None);
        }

        let view = env.view();
        let mut weights = Vec::with_capacity(pool.len());
        for &handle in &pool {
            weights.push(data.entry(handle)?.weight(faction, &context, view)?.max(0));
        }

        let total = weights.iter().fold(0_i64, |sum, &weight| sum.saturating_add(weight));
        if total == 0 {
            return Ok(None);
        }

        let mut draw = env.rng.below(total as u64) as i64;
        let mut index = 0;
        while draw >= weights[index] {
            draw -= weights[index];
            index += 1;
        }

        let handle = pool.remove(index);
        let trigger = data.entry(handle)?;
        if trigger.try_fire(faction, env)? {
            debug!(trigger = trigger.identifier(), %faction, "random pulse trigger fired");
            if trigger.only_once() {
                retire(env.state, faction, handle);
            }
            return Ok(Some(handle));
        }
    }

    Ok(None)
}
