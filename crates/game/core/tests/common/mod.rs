//! Shared fixture: a small on-disk data module plus a match built from it.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use database::{Catalog, DataError, Database};
use game_core::{
    Context, DelayedQueue, Env, FactionId, GameState, NarrativeLog, Resource, ScriptError,
    SequenceRng, Trigger, register_types,
};
use tempfile::TempDir;

pub const RED: FactionId = FactionId(0);
pub const BLUE: FactionId = FactionId(1);

const BASE: &[(&str, &str)] = &[
    ("resources/base.txt", "gold = { name = Gold }\n"),
    (
        "unit_classes/base.txt",
        "archer = { hit_points = 10 }\nknight = { hit_points = 30 }\n",
    ),
    ("characters/base.txt", "hero = { unit_class = knight }\n"),
    (
        "factions/base.txt",
        r#"
red = {
    name = "Red Kingdom"
    resources = { gold = 100 }
    starting_units = { archer = 2 }
    starting_characters = { hero }
}
blue = { }
"#,
    ),
];

pub struct Fixture {
    _dir: TempDir,
    pub database: Database,
}

impl Fixture {
    /// Writes the base files plus `extra` and runs every pass except
    /// validation.
    pub fn new(extra: &[(&str, &str)]) -> Result<Self, DataError> {
        let dir = TempDir::new().expect("temp dir");
        for (path, text) in BASE.iter().chain(extra) {
            write(dir.path(), path, text);
        }

        let mut database = Database::new();
        register_types(&mut database)?;
        database.add_module("base", dir.path(), None)?;
        database.build()?;

        Ok(Self { _dir: dir, database })
    }

    pub fn data(&self) -> &Catalog {
        self.database.catalog()
    }
}

fn write(root: &Path, path: &str, text: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    fs::write(path, text).expect("write file");
}

/// Match state with the red faction bound to the player.
pub struct Match {
    pub state: GameState,
    pub rng: SequenceRng,
    pub narrative: NarrativeLog,
    pub delayed: DelayedQueue,
}

impl Match {
    pub fn new(data: &Catalog, draws: Vec<u64>) -> Self {
        let mut state = GameState::from_definitions(data).expect("factions");
        state.player = Some(RED);
        Self {
            state,
            rng: SequenceRng::new(draws),
            narrative: NarrativeLog::new(),
            delayed: DelayedQueue::new(),
        }
    }

    /// Runs a trigger's effects for `faction`, ignoring its conditions.
    pub fn fire(&mut self, data: &Catalog, trigger: &str, faction: FactionId) -> Result<(), ScriptError> {
        let trigger = data.entry(data.require::<Trigger>(trigger)?)?;
        let mut env = Env::new(
            &mut self.state,
            data,
            &mut self.rng,
            &mut self.delayed,
            &mut self.narrative,
        );
        trigger.fire(faction, &Context::for_faction(faction), &mut env)
    }

    pub fn gold(&self, data: &Catalog, faction: FactionId) -> i64 {
        let gold = data.require::<Resource>("gold").expect("gold");
        self.state.faction(faction).expect("faction").resource(gold)
    }

    pub fn score(&self, faction: FactionId) -> i64 {
        self.state.faction(faction).expect("faction").score
    }
}
