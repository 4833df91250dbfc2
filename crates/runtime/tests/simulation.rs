//! Simulation and script bridge over on-disk data modules.

use std::fs;
use std::path::Path;

use database::DataError;
use game_core::{FactionId, SchedulerConfig};
use runtime::{DataConfig, RuntimeConfig, RuntimeError, ScriptBridge, ScriptValue, Simulation};
use tempfile::TempDir;

const RED: FactionId = FactionId(0);
const BLUE: FactionId = FactionId(1);

fn write(root: &Path, path: &str, text: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "resources/base.txt", "gold = { }\n");
    write(root, "unit_classes/base.txt", "archer = { hit_points = 10 }\n");
    write(
        root,
        "factions/base.txt",
        "red = { resources = { gold = 10 } starting_units = { archer = 1 } }\nblue = { }\n",
    );
    write(root, "scripted_effects/faction/base.txt", "reward = { score += 5 }\n");
    write(
        root,
        "triggers/base.txt",
        r#"
income = { type = half_minute_pulse effects = { score += 1 } }
rich = { conditions = { gold >= 50 } effects = { flag += rich } }
"#,
    );
    dir
}

fn config(root: &Path) -> RuntimeConfig {
    let mut config = RuntimeConfig::new(DataConfig::new(root));
    config.scheduler = SchedulerConfig::with_pulses(10, 0);
    config.seed = 11;
    config
}

fn score(simulation: &Simulation, faction: FactionId) -> i64 {
    simulation.state().faction(faction).unwrap().score
}

#[test]
fn run_fires_one_pulse_per_period() {
    let dir = data_dir();
    let mut simulation = Simulation::new(config(dir.path())).unwrap();
    assert_eq!(simulation.state().player, Some(RED));
    assert!(simulation.warnings().is_empty());

    let summary = simulation.run(19).unwrap();
    assert_eq!(summary.ticks, 19);
    assert_eq!(summary.pulses, 2);
    assert_eq!(summary.pulse_triggers_fired, 4);
    assert_eq!(summary.default_triggers_fired, 0);
    assert_eq!(score(&simulation, RED), 2);
    assert_eq!(score(&simulation, BLUE), 2);
    assert_eq!(simulation.state().tick, 19);
}

#[test]
fn same_seed_replays_the_same_match() {
    let dir = data_dir();
    let mut first = Simulation::new(config(dir.path())).unwrap();
    let mut second = Simulation::new(config(dir.path())).unwrap();

    let a: Vec<_> = (0..40).map(|_| first.tick().unwrap().pulses.len()).collect();
    let b: Vec<_> = (0..40).map(|_| second.tick().unwrap().pulses.len()).collect();
    assert_eq!(a, b);
}

#[test]
fn overlay_modules_amend_base_definitions() {
    let dir = data_dir();
    write(dir.path(), "mods/bonus/module.txt", "parent = base\n");
    write(
        dir.path(),
        "mods/bonus/triggers/bonus.txt",
        "income += { effects = { score += 1 } }\n",
    );

    let mut config = config(dir.path());
    config.data.mods_dir = Some("mods".into());
    let mut simulation = Simulation::new(config).unwrap();
    assert_eq!(simulation.database().modules().len(), 2);

    simulation.run(9).unwrap();
    assert_eq!(score(&simulation, RED), 2);
}

#[test]
fn player_faction_is_resolved_by_identifier() {
    let dir = data_dir();
    let mut config = config(dir.path());
    config.player_faction = Some("blue".into());
    let simulation = Simulation::new(config).unwrap();
    assert_eq!(simulation.state().player, Some(BLUE));

    let mut config = self::config(dir.path());
    config.player_faction = Some("green".into());
    let error = Simulation::new(config).err().unwrap();
    assert_eq!(error.error_code(), "RUNTIME_UNKNOWN_PLAYER_FACTION");
}

#[test]
fn strict_validation_rejects_invalid_data() {
    let dir = data_dir();
    write(dir.path(), "triggers/broken.txt", "odd = { random = yes effects = { score += 1 } }\n");

    let error = Simulation::new(config(dir.path())).err().unwrap();
    assert!(matches!(error, RuntimeError::Data(DataError::Validation(ref errors)) if errors.len() == 1));

    let mut lenient = config(dir.path());
    lenient.strict_validation = false;
    let simulation = Simulation::new(lenient).unwrap();
    assert_eq!(simulation.warnings().len(), 1);
}

#[test]
fn reload_picks_up_changed_files() {
    let dir = data_dir();
    let mut simulation = Simulation::new(config(dir.path())).unwrap();
    simulation.run(5).unwrap();

    write(dir.path(), "factions/base.txt", "red = { resources = { gold = 60 } }\n");
    simulation.reload().unwrap();
    assert_eq!(simulation.state().tick, 0);
    assert_eq!(simulation.state().factions.len(), 1);

    // The default trigger now sees enough gold on its first check.
    let report = simulation.tick().unwrap();
    assert!(report.default_trigger.is_some());
    assert!(simulation.state().faction(RED).unwrap().flags.contains("rich"));
}

#[test]
fn failed_reload_discards_the_match() {
    let dir = data_dir();
    let mut simulation = Simulation::new(config(dir.path())).unwrap();
    simulation.run(5).unwrap();

    let broken = dir.path().join("triggers/broken.txt");
    fs::write(&broken, "odd = {\n").unwrap();
    assert!(simulation.reload().is_err());
    assert!(simulation.state().factions.is_empty());
    assert_eq!(simulation.state().player, None);
    assert!(simulation.scheduler().pump().active().is_empty());
    assert!(simulation.data().registry::<game_core::Faction>().unwrap().is_empty());

    // Nothing left refers to the discarded definitions.
    let report = simulation.tick().unwrap();
    assert_eq!(report.default_trigger, None);

    fs::remove_file(&broken).unwrap();
    simulation.reload().unwrap();
    assert_eq!(simulation.state().factions.len(), 2);
    assert_eq!(simulation.state().player, Some(RED));
}

#[test]
fn bridge_exposes_conditions_effects_and_descriptions() {
    let dir = data_dir();
    let mut simulation = Simulation::new(config(dir.path())).unwrap();
    let mut bridge = ScriptBridge::new(&mut simulation);

    let holds = bridge
        .call("trigger_conditions", &["rich".into(), "red".into()])
        .unwrap();
    assert_eq!(holds, ScriptValue::Bool(false));

    let applied = bridge
        .call("run_scripted_effect", &["reward".into(), ScriptValue::Int(1)])
        .unwrap();
    assert_eq!(applied.as_bool(), Some(true));

    let text = bridge
        .call("describe_scripted_effect", &["reward".into()])
        .unwrap();
    assert_eq!(text.as_str(), Some("Score: +5"));

    let exists = bridge
        .call("entity_exists", &["unit_class".into(), "archer".into()])
        .unwrap();
    assert_eq!(exists, ScriptValue::Bool(true));
    let missing = bridge
        .call("entity_exists", &["trigger".into(), "nothing".into()])
        .unwrap();
    assert_eq!(missing, ScriptValue::Bool(false));

    let unknown = bridge.call("spawn_dragon", &[]).unwrap_err();
    assert_eq!(unknown.error_code(), "RUNTIME_UNKNOWN_CALL");
    let bad = bridge
        .call("trigger_conditions", &["rich".into(), ScriptValue::Int(7)])
        .unwrap_err();
    assert_eq!(bad.error_code(), "RUNTIME_BAD_ARGUMENTS");

    assert_eq!(score(&simulation, BLUE), 5);
    assert_eq!(score(&simulation, RED), 0);
}
