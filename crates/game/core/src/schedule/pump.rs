use database::{Catalog, DataEntry, DataError, Handle};
use tracing::debug;

use crate::data::{Trigger, TriggerKind};
use crate::error::ScriptError;
use crate::script::Env;

/// Round-robin driver for default triggers: at most one trigger is checked
/// per tick, whatever the number of triggers.
///
/// A fire-once trigger that fires is dropped from the rotation without
/// moving the cursor, so the next trigger takes its slot.
#[derive(Clone, Debug, Default)]
pub struct TriggerPump {
    active: Vec<Handle<Trigger>>,
    cursor: usize,
}

impl TriggerPump {
    pub fn new(triggers: Vec<Handle<Trigger>>) -> Self {
        Self {
            active: triggers,
            cursor: 0,
        }
    }

    /// Every default trigger in the catalog, in registry order.
    pub fn from_catalog(data: &Catalog) -> Result<Self, DataError> {
        let triggers = data
            .registry::<Trigger>()?
            .iter()
            .filter(|(_, trigger)| trigger.kind() == TriggerKind::Default)
            .map(|(handle, _)| handle)
            .collect();
        Ok(Self::new(triggers))
    }

    pub fn active(&self) -> &[Handle<Trigger>] {
        &self.active
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Checks the trigger under the cursor for the player's faction.
    /// Returns the trigger if it fired.
    pub fn advance(&mut self, env: &mut Env<'_>) -> Result<Option<Handle<Trigger>>, ScriptError> {
        let Some(player) = env.state.player else {
            return Ok(None);
        };
        if self.active.is_empty() {
            return Ok(None);
        }
        if self.cursor >= self.active.len() {
            self.cursor = 0;
        }

        let handle = self.active[self.cursor];
        let data = env.data;
        let trigger = data.entry(handle)?;

        if !trigger.try_fire(player, env)? {
            self.cursor += 1;
            return Ok(None);
        }

        debug!(trigger = trigger.identifier(), faction = %player, "default trigger fired");
        if trigger.only_once() {
            self.active.remove(self.cursor);
        } else {
            self.cursor += 1;
        }
        Ok(Some(handle))
    }
}
