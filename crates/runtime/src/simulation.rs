//! Synchronous match driver.
//!
//! [`Simulation`] owns the loaded [`Database`], the match state, the
//! scheduler and the random source, and advances them one tick at a time.

use database::{Catalog, DataError, Database};
use game_core::{
    Env, Faction, FactionId, GameState, NarrativeLog, PcgRng, Scheduler, TickReport,
    register_types,
};
use tracing::{info, warn};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};

/// Totals over several ticks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub delayed_fired: usize,
    pub default_triggers_fired: usize,
    pub pulses: usize,
    pub pulse_triggers_fired: usize,
    pub dialogues: usize,
}

impl RunSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.delayed_fired += report.delayed_fired;
        self.default_triggers_fired += usize::from(report.default_trigger.is_some());
        self.pulses += report.pulses.len();
        self.pulse_triggers_fired += report.pulse_triggers_fired;
    }
}

pub struct Simulation {
    config: RuntimeConfig,
    database: Database,
    warnings: Vec<DataError>,
    state: GameState,
    scheduler: Scheduler,
    rng: PcgRng,
    narrative: NarrativeLog,
}

impl Simulation {
    /// Loads every configured module and starts a match.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let mut database = open_database(&config)?;
        let warnings = load_database(&mut database, config.strict_validation)?;
        let (state, scheduler, rng) = start(&config, database.catalog())?;

        Ok(Self {
            config,
            database,
            warnings,
            state,
            scheduler,
            rng,
            narrative: NarrativeLog::new(),
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn data(&self) -> &Catalog {
        self.database.catalog()
    }

    /// Validation errors tolerated because strict validation is off.
    pub fn warnings(&self) -> &[DataError] {
        &self.warnings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn narrative(&self) -> &NarrativeLog {
        &self.narrative
    }

    pub fn narrative_mut(&mut self) -> &mut NarrativeLog {
        &mut self.narrative
    }

    /// Discards the current match and starts a fresh one from the loaded
    /// definitions.
    pub fn start_match(&mut self) -> Result<()> {
        let (state, scheduler, rng) = start(&self.config, self.database.catalog())?;
        self.state = state;
        self.scheduler = scheduler;
        self.rng = rng;
        self.narrative = NarrativeLog::new();
        Ok(())
    }

    pub fn tick(&mut self) -> Result<TickReport> {
        let report = self.scheduler.tick(
            &mut self.state,
            self.database.catalog(),
            &mut self.rng,
            &mut self.narrative,
        )?;
        Ok(report)
    }

    pub fn run(&mut self, ticks: u64) -> Result<RunSummary> {
        let dialogues = self.narrative.events().len();
        let mut summary = RunSummary::default();
        for _ in 0..ticks {
            let report = self.tick()?;
            summary.record(&report);
        }
        summary.dialogues = self.narrative.events().len() - dialogues;

        info!(
            ticks = summary.ticks,
            delayed = summary.delayed_fired,
            default_triggers = summary.default_triggers_fired,
            pulse_triggers = summary.pulse_triggers_fired,
            dialogues = summary.dialogues,
            "run finished"
        );
        Ok(summary)
    }

    /// Reads every module again and restarts the match. Handles into the
    /// previous data are invalid afterwards.
    ///
    /// If loading fails the database is left empty and the match is reset
    /// to one without factions, so nothing points into the discarded data.
    /// Call `reload` again once the files are fixed.
    pub fn reload(&mut self) -> Result<()> {
        self.database.clear();
        let result = load_database(&mut self.database, self.config.strict_validation).and_then(|warnings| {
            self.warnings = warnings;
            self.start_match()
        });

        if let Err(error) = result {
            warn!(code = error.error_code(), %error, "reload failed, match discarded");
            self.discard_match()?;
            return Err(error);
        }
        Ok(())
    }

    fn discard_match(&mut self) -> Result<()> {
        self.database.clear();
        self.warnings.clear();
        self.state = GameState::new();
        self.rng = PcgRng::new(self.config.seed);
        self.scheduler = Scheduler::new(
            self.config.scheduler.clone(),
            self.database.catalog(),
            self.state.tick,
            &mut self.rng,
        )?;
        self.narrative = NarrativeLog::new();
        Ok(())
    }

    /// Runs `f` with an interpreter environment over the current match.
    pub fn with_env<R>(&mut self, f: impl FnOnce(&mut Env<'_>) -> R) -> R {
        let mut env = Env::new(
            &mut self.state,
            self.database.catalog(),
            &mut self.rng,
            self.scheduler.delayed_mut(),
            &mut self.narrative,
        );
        f(&mut env)
    }
}

fn open_database(config: &RuntimeConfig) -> Result<Database> {
    let mut database = Database::new().with_file_extension(config.data.file_extension.clone());
    register_types(&mut database)?;

    for module in config.data.resolved_modules() {
        database.add_module(module.identifier, module.path, module.parent.as_deref())?;
    }

    if let Some(mods_dir) = config.data.resolved_mods_dir() {
        if mods_dir.is_dir() {
            let added = database.add_overlay_modules(&mods_dir)?;
            info!(mods_dir = %mods_dir.display(), modules = added.len(), "added overlay modules");
        } else {
            warn!(mods_dir = %mods_dir.display(), "mods directory not found");
        }
    }

    Ok(database)
}

/// Runs every pass. Validation errors fail the load when `strict`, and are
/// returned as warnings otherwise.
fn load_database(database: &mut Database, strict: bool) -> Result<Vec<DataError>> {
    database.build()?;

    let errors = database.validation_errors()?;
    if errors.is_empty() {
        return Ok(errors);
    }
    if strict {
        return Err(DataError::Validation(errors).into());
    }

    for error in &errors {
        warn!(code = error.error_code(), %error, "validation error");
    }
    Ok(errors)
}

fn start(config: &RuntimeConfig, data: &Catalog) -> Result<(GameState, Scheduler, PcgRng)> {
    let mut state = GameState::from_definitions(data)?;
    state.player = player_faction(config, data, &state)?;

    let mut rng = PcgRng::new(config.seed);
    let scheduler = Scheduler::new(config.scheduler.clone(), data, state.tick, &mut rng)?;

    info!(
        factions = state.factions.len(),
        units = state.units.len(),
        player = ?state.player,
        seed = config.seed,
        "match started"
    );
    Ok((state, scheduler, rng))
}

fn player_faction(config: &RuntimeConfig, data: &Catalog, state: &GameState) -> Result<Option<FactionId>> {
    let Some(identifier) = &config.player_faction else {
        return Ok((!state.factions.is_empty()).then_some(FactionId(0)));
    };

    data.get::<Faction>(identifier)?
        .and_then(|handle| state.faction_by_definition(handle))
        .map(Some)
        .ok_or_else(|| RuntimeError::UnknownPlayerFaction(identifier.clone()))
}
