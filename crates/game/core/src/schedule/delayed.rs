use database::Handle;
use tracing::trace;

use crate::data::{Dialogue, FactionScriptedEffect, ScriptedEffect, UnitScriptedEffect};
use crate::error::ScriptError;
use crate::script::{Context, Env, FactionScope, ScopeCapture, ScopeType, UnitScope};
use crate::state::{FactionId, GameState, Tick};

/// What a delayed effect runs when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayedTarget {
    FactionEffect(Handle<FactionScriptedEffect>),
    UnitEffect(Handle<UnitScriptedEffect>),
    Dialogue(Handle<Dialogue>),
}

/// A queued call waiting for its tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelayedEffectInstance {
    pub target: DelayedTarget,
    pub scope: ScopeCapture,
    pub context: Context,
    /// Ticks left; fires on the tick this reaches zero.
    pub remaining: Tick,
}

impl DelayedEffectInstance {
    pub fn new(target: DelayedTarget, scope: ScopeCapture, context: Context, remaining: Tick) -> Self {
        Self {
            target,
            scope,
            context,
            remaining,
        }
    }

    /// Runs the call if its scope still exists. Returns whether it ran.
    pub fn fire(&self, env: &mut Env<'_>) -> Result<bool, ScriptError> {
        match self.target {
            DelayedTarget::FactionEffect(handle) => self.run_scripted::<FactionScope>(handle, env),
            DelayedTarget::UnitEffect(handle) => self.run_scripted::<UnitScope>(handle, env),
            DelayedTarget::Dialogue(handle) => {
                let Some(faction) = self.faction(env.state) else {
                    trace!(scope = ?self.scope, "delayed dialogue scope is gone");
                    return Ok(false);
                };
                Dialogue::present(handle, faction, &self.context, env)?;
                Ok(true)
            }
        }
    }

    fn run_scripted<S: ScopeType>(&self, handle: Handle<ScriptedEffect<S>>, env: &mut Env<'_>) -> Result<bool, ScriptError> {
        let Some(target) = S::resolve(self.scope, env.state) else {
            trace!(scope = ?self.scope, "delayed effect scope is gone");
            return Ok(false);
        };
        ScriptedEffect::run(handle, target, &self.context, env)?;
        Ok(true)
    }

    fn faction(&self, state: &GameState) -> Option<FactionId> {
        match self.scope {
            ScopeCapture::Stable(faction) => FactionScope::resolve(self.scope, state).map(|_| faction),
            ScopeCapture::Owned(unit) => UnitScope::faction_of(unit, state),
        }
    }
}

/// Delayed effects in the order they were queued.
#[derive(Clone, Debug, Default)]
pub struct DelayedQueue {
    pending: Vec<DelayedEffectInstance>,
}

impl DelayedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instance: DelayedEffectInstance) {
        trace!(call = ?instance.target, delay = instance.remaining, "queued delayed effect");
        self.pending.push(instance);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DelayedEffectInstance> {
        self.pending.iter()
    }

    /// Counts every instance down by one tick and removes the ones that are
    /// due, keeping queue order.
    pub fn advance(&mut self) -> Vec<DelayedEffectInstance> {
        let mut due = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());

        for mut instance in self.pending.drain(..) {
            instance.remaining = instance.remaining.saturating_sub(1);
            if instance.remaining == 0 {
                due.push(instance);
            } else {
                waiting.push(instance);
            }
        }

        self.pending = waiting;
        due
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FactionId;

    fn instance(remaining: Tick) -> DelayedEffectInstance {
        let mut registry = database::Registry::<Dialogue>::new();
        let dialogue = registry.add("greeting", database::ModuleId::default()).unwrap();
        DelayedEffectInstance::new(
            DelayedTarget::Dialogue(dialogue),
            ScopeCapture::Stable(FactionId(0)),
            Context::default(),
            remaining,
        )
    }

    #[test]
    fn instance_is_due_on_its_last_tick() {
        let mut queue = DelayedQueue::new();
        queue.push(instance(3));

        assert!(queue.advance().is_empty());
        assert!(queue.advance().is_empty());
        assert_eq!(queue.advance().len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn due_instances_keep_queue_order() {
        let mut queue = DelayedQueue::new();
        let mut first = instance(1);
        first.context.current_faction = Some(FactionId(1));
        let mut second = instance(1);
        second.context.current_faction = Some(FactionId(2));
        queue.push(first.clone());
        queue.push(instance(2));
        queue.push(second.clone());

        let due = queue.advance();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].context, first.context);
        assert_eq!(due[1].context, second.context);
        assert_eq!(queue.len(), 1);
    }
}
