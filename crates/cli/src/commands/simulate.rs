//! Run the scheduler for a number of ticks and print a summary

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use game_core::{Named, Resource, SchedulerConfig};
use runtime::Simulation;

use super::load_config;

/// Run the scheduler for a number of ticks
#[derive(Parser, Debug)]
pub struct Simulate {
    /// Number of ticks to run
    #[arg(short, long, default_value_t = SchedulerConfig::DEFAULT_MINUTE_PULSE * 5)]
    ticks: u64,

    /// RNG seed (overrides config and RNG_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Faction bound to the player (overrides config and PLAYER_FACTION)
    #[arg(long, value_name = "FACTION")]
    player: Option<String>,

    /// Print every dialogue shown during the run
    #[arg(long)]
    dialogues: bool,
}

impl Simulate {
    pub fn execute(self, config: Option<&Path>) -> Result<()> {
        let mut config = load_config(config)?;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.player.is_some() {
            config.player_faction = self.player;
        }

        let mut simulation = Simulation::new(config)?;
        let summary = simulation.run(self.ticks)?;

        println!("ticks:                 {}", summary.ticks);
        println!("delayed effects fired: {}", summary.delayed_fired);
        println!("default triggers:      {}", summary.default_triggers_fired);
        println!("pulses:                {}", summary.pulses);
        println!("pulse triggers:        {}", summary.pulse_triggers_fired);
        println!("dialogues:             {}", summary.dialogues);

        let data = simulation.data();
        let state = simulation.state();
        for faction in &state.factions {
            let definition = data.entry(faction.definition)?;
            let resources: Vec<String> = faction
                .resources
                .iter()
                .map(|(&resource, quantity)| {
                    let name = data
                        .entry::<Resource>(resource)
                        .map(|entry| entry.name().to_owned())
                        .unwrap_or_default();
                    format!("{name} {quantity}")
                })
                .collect();
            println!(
                "{}{}: score {}, {} flag(s), [{}]",
                definition.name(),
                if faction.defeated { " (defeated)" } else { "" },
                faction.score,
                faction.flags.len(),
                resources.join(", "),
            );
        }

        if self.dialogues {
            for event in simulation.narrative().events() {
                println!("[{}] {} -> {}: {}", event.tick, event.title, event.faction, event.text);
            }
        }
        Ok(())
    }
}
