//! Print the description of a scripted effect

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use game_core::{FactionScriptedEffect, ScriptedEffect, UnitScriptedEffect};
use runtime::Simulation;

use super::load_config;

/// Print the description of a scripted effect
#[derive(Parser, Debug)]
pub struct Describe {
    /// Identifier of the scripted effect
    #[arg(value_name = "EFFECT")]
    effect: String,

    /// Scope the scripted effect is defined for
    #[arg(short, long, value_enum, default_value = "faction")]
    scope: Scope,

    /// Prefix written before every line
    #[arg(short, long, default_value = "")]
    prefix: String,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Scope {
    Faction,
    Unit,
}

impl Describe {
    pub fn execute(self, config: Option<&Path>) -> Result<()> {
        let simulation = Simulation::new(load_config(config)?)?;
        let data = simulation.data();

        let text = match self.scope {
            Scope::Faction => {
                let handle = data.require::<FactionScriptedEffect>(&self.effect)?;
                ScriptedEffect::describe(handle, data, 0, &self.prefix)
            }
            Scope::Unit => {
                let handle = data.require::<UnitScriptedEffect>(&self.effect)?;
                ScriptedEffect::describe(handle, data, 0, &self.prefix)
            }
        };

        if text.is_empty() {
            println!("{}(no visible effects)", self.prefix);
        } else {
            println!("{text}");
        }
        Ok(())
    }
}
