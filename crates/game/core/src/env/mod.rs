//! Collaborators the interpreter consults but does not own.
//!
//! - [`RngOracle`]: every random draw
//! - [`NarrativeHost`]: where dialogues go

mod narrative;
mod rng;

pub use narrative::{DialogueEvent, NarrativeHost, NarrativeLog};
pub use rng::{PcgRng, RngOracle, SequenceRng};
