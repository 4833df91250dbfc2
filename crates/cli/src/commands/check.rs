//! Load every module and report validation errors

use std::path::Path;

use anyhow::{Result, bail};
use clap::Parser;
use database::{Catalog, DataEntry, DataError};
use game_core::{
    Character, Dialogue, Faction, FactionScriptedEffect, Resource, Trigger, UnitClass,
    UnitScriptedEffect,
};
use runtime::Simulation;

use super::load_config;

/// Load every module and report validation errors
#[derive(Parser, Debug)]
pub struct Check {
    /// Print the order in which types are processed
    #[arg(long)]
    order: bool,
}

impl Check {
    pub fn execute(self, config: Option<&Path>) -> Result<()> {
        let mut config = load_config(config)?;
        // Collect every error instead of stopping at the first report.
        config.strict_validation = false;
        let simulation = Simulation::new(config)?;
        let database = simulation.database();

        for module in database.modules() {
            println!("module {} ({})", module.identifier, module.path.display());
        }
        if self.order {
            let order: Vec<&str> = database.load_order()?.iter().map(|metadata| metadata.class).collect();
            println!("load order: {}", order.join(" -> "));
        }
        for (class, count) in counts(simulation.data())? {
            println!("{class:>24}: {count}");
        }

        let errors = simulation.warnings();
        if errors.is_empty() {
            println!("no validation errors");
            return Ok(());
        }
        for error in errors {
            print_error(error, 0);
        }
        bail!("{} validation error(s)", errors.len());
    }
}

fn counts(data: &Catalog) -> Result<Vec<(&'static str, usize)>, DataError> {
    Ok(vec![
        (Resource::CLASS, data.registry::<Resource>()?.len()),
        (UnitClass::CLASS, data.registry::<UnitClass>()?.len()),
        (Character::CLASS, data.registry::<Character>()?.len()),
        (Faction::CLASS, data.registry::<Faction>()?.len()),
        (FactionScriptedEffect::CLASS, data.registry::<FactionScriptedEffect>()?.len()),
        (UnitScriptedEffect::CLASS, data.registry::<UnitScriptedEffect>()?.len()),
        (Dialogue::CLASS, data.registry::<Dialogue>()?.len()),
        (Trigger::CLASS, data.registry::<Trigger>()?.len()),
    ])
}

/// Prints an error and its cause chain, one level of indentation per cause.
fn print_error(error: &(dyn std::error::Error + 'static), depth: usize) {
    println!("{}{error} [{}]", "  ".repeat(depth), code(error));
    if let Some(source) = error.source() {
        print_error(source, depth + 1);
    }
}

fn code(error: &(dyn std::error::Error + 'static)) -> &'static str {
    match error.downcast_ref::<DataError>() {
        Some(error) => error.error_code(),
        None => "-",
    }
}
