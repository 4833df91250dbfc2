//! Narrative output: dialogues presented to a faction.
//!
//! The interpreter does not render anything itself. It hands a
//! [`DialogueEvent`] to whatever [`NarrativeHost`] the simulation wires in.

use crate::state::{FactionId, Tick};

/// A dialogue shown to a faction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueEvent {
    pub tick: Tick,
    pub faction: FactionId,
    pub dialogue: String,
    pub speaker: Option<String>,
    pub title: String,
    pub text: String,
}

/// Receiver of narrative events.
pub trait NarrativeHost {
    fn present(&mut self, event: DialogueEvent);
}

/// Host that records every event in order.
#[derive(Clone, Debug, Default)]
pub struct NarrativeLog {
    events: Vec<DialogueEvent>,
}

impl NarrativeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DialogueEvent] {
        &self.events
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&mut self) -> Vec<DialogueEvent> {
        std::mem::take(&mut self.events)
    }
}

impl NarrativeHost for NarrativeLog {
    fn present(&mut self, event: DialogueEvent) {
        tracing::debug!(
            dialogue = %event.dialogue,
            faction = event.faction.0,
            tick = event.tick,
            "presenting dialogue"
        );
        self.events.push(event);
    }
}
