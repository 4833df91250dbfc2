//! Tick ordering: delayed effects, the default trigger pump and pulses.

mod common;

use common::{BLUE, Fixture, Match, RED};
use database::Catalog;
use game_core::script::ScopeCapture;
use game_core::{
    Context, DelayedEffectInstance, DelayedTarget, Dialogue, FactionScriptedEffect, Scheduler,
    SchedulerConfig, TickReport, Trigger, UnitClass,
};

/// Scheduler with pulses every `half_minute` ticks and the minute pulse
/// turned off.
fn scheduler(data: &Catalog, game: &mut Match, half_minute: u64) -> Scheduler {
    let config = SchedulerConfig::with_pulses(half_minute, 0);
    Scheduler::new(config, data, game.state.tick, &mut game.rng).expect("scheduler")
}

fn tick(scheduler: &mut Scheduler, data: &Catalog, game: &mut Match) -> TickReport {
    scheduler
        .tick(&mut game.state, data, &mut game.rng, &mut game.narrative)
        .expect("tick")
}

#[test]
fn delayed_effect_fires_after_its_delay() {
    let fixture = Fixture::new(&[
        ("scripted_effects/faction/bonus.txt", "bonus = { score += 10 }"),
        (
            "triggers/test.txt",
            "later = { only_once = yes effects = { delayed = { scripted_effect = bonus delay = 3 } } }",
        ),
    ])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    let mut scheduler = scheduler(data, &mut game, 0);

    let first = tick(&mut scheduler, data, &mut game);
    assert_eq!(first.tick, 1);
    assert!(first.default_trigger.is_some());
    assert_eq!(scheduler.delayed().len(), 1);

    for _ in 0..2 {
        let report = tick(&mut scheduler, data, &mut game);
        assert_eq!(report.delayed_fired, 0);
    }
    assert_eq!(game.score(RED), 0);

    let fourth = tick(&mut scheduler, data, &mut game);
    assert_eq!(fourth.tick, 4);
    assert_eq!(fourth.delayed_fired, 1);
    assert_eq!(game.score(RED), 10);
    assert!(scheduler.delayed().is_empty());
}

#[test]
fn delayed_calls_run_against_the_captured_context() {
    let fixture = Fixture::new(&[
        ("scripted_effects/faction/credit.txt", "credit = { current_faction = { score += 10 } }"),
        (
            "dialogues/base.txt",
            r#"envoy = { text = "Terms are offered." effects = { current_faction = { score += 1 } } }"#,
        ),
    ])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    let mut scheduler = scheduler(data, &mut game, 0);

    // Both calls act on blue but were queued from a script started for red.
    let credit = data.require::<FactionScriptedEffect>("credit").expect("credit");
    let envoy = data.require::<Dialogue>("envoy").expect("envoy");
    for target in [DelayedTarget::FactionEffect(credit), DelayedTarget::Dialogue(envoy)] {
        scheduler.delayed_mut().push(DelayedEffectInstance::new(
            target,
            ScopeCapture::Stable(BLUE),
            Context::for_faction(RED),
            1,
        ));
    }

    let report = tick(&mut scheduler, data, &mut game);
    assert_eq!(report.delayed_fired, 2);
    assert_eq!(game.score(RED), 11);
    assert_eq!(game.score(BLUE), 0);

    let events = game.narrative.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].faction, BLUE);
}

#[test]
fn delayed_effect_on_a_removed_unit_is_dropped() {
    let fixture = Fixture::new(&[
        ("scripted_effects/unit/heal.txt", "heal = { hit_points += 5 }"),
        (
            "triggers/test.txt",
            r#"
doomed = {
    only_once = yes
    effects = {
        any_unit_of_class = {
            unit_class = archer
            delayed = { scripted_effect = heal delay = 2 }
            remove = yes
        }
    }
}
"#,
        ),
    ])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    let mut scheduler = scheduler(data, &mut game, 0);

    tick(&mut scheduler, data, &mut game);
    assert_eq!(scheduler.delayed().len(), 1);
    assert_eq!(game.state.units_of(RED).count(), 2);

    tick(&mut scheduler, data, &mut game);
    let report = tick(&mut scheduler, data, &mut game);
    assert_eq!(report.delayed_fired, 0);
    assert!(scheduler.delayed().is_empty());

    let archer = data.require::<UnitClass>("archer").expect("archer");
    let archers: Vec<_> = game
        .state
        .units_of(RED)
        .filter(|(_, unit)| unit.class == archer)
        .collect();
    assert_eq!(archers.len(), 1);
    assert_eq!(archers[0].1.hit_points, 10);
}

#[test]
fn default_triggers_are_checked_one_per_tick() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        r#"
opening = { only_once = yes effects = { score += 1 } }
rich = { conditions = { score >= 100 } effects = { gold += 1 } }
"#,
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    let mut scheduler = scheduler(data, &mut game, 0);
    assert_eq!(scheduler.pump().active().len(), 2);

    let opening = data.require::<Trigger>("opening").expect("opening");
    let first = tick(&mut scheduler, data, &mut game);
    assert_eq!(first.default_trigger, Some(opening));
    assert_eq!(scheduler.pump().active().len(), 1);

    for _ in 0..4 {
        let report = tick(&mut scheduler, data, &mut game);
        assert_eq!(report.default_trigger, None);
    }

    assert_eq!(game.score(RED), 1);
    assert_eq!(game.gold(data, RED), 100);
    assert_eq!(game.score(BLUE), 0);
}

#[test]
fn default_triggers_need_a_player() {
    let fixture = Fixture::new(&[("triggers/test.txt", "opening = { effects = { score += 1 } }")])
        .expect("load");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.state.player = None;
    let mut scheduler = scheduler(data, &mut game, 0);

    let report = tick(&mut scheduler, data, &mut game);
    assert_eq!(report.default_trigger, None);
    assert_eq!(game.score(RED), 0);
}

#[test]
fn pulse_triggers_run_for_every_faction() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        r#"
income = { type = half_minute_pulse effects = { score += 1 } }
charter = { type = half_minute_pulse only_once = yes effects = { gold += 1 } }
"#,
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    // Every offset draw is 0: the pulse fires on the first tick of each
    // five-tick period.
    let mut game = Match::new(data, vec![0]);
    let mut scheduler = scheduler(data, &mut game, 5);

    let fired: Vec<u64> = (0..10)
        .map(|_| tick(&mut scheduler, data, &mut game))
        .filter(|report| !report.pulses.is_empty())
        .map(|report| report.tick)
        .collect();
    assert_eq!(fired, [1, 5, 10]);

    assert_eq!(game.score(RED), 3);
    assert_eq!(game.score(BLUE), 3);
    assert_eq!(game.gold(data, RED), 101);
    assert_eq!(game.gold(data, BLUE), 1);
}

#[test]
fn defeated_factions_are_skipped_by_pulses() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "income = { type = half_minute_pulse effects = { score += 1 } }",
    )])
    .expect("load");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.state.faction_mut(BLUE).expect("blue").defeated = true;
    let mut scheduler = scheduler(data, &mut game, 5);

    tick(&mut scheduler, data, &mut game);
    assert_eq!(game.score(RED), 1);
    assert_eq!(game.score(BLUE), 0);
}

#[test]
fn random_pulse_draws_again_when_the_pick_cannot_fire() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        r#"
jackpot = {
    type = half_minute_pulse
    random = yes
    weight = 1
    conditions = { score >= 100 }
    effects = { gold += 50 }
}
tribute = { type = half_minute_pulse random = yes weight = 1 effects = { score += 1 } }
"#,
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    // The first draw lands on jackpot, which fails; the pool shrinks to
    // tribute.
    let mut game = Match::new(data, vec![0]);
    let mut scheduler = scheduler(data, &mut game, 100);

    let report = tick(&mut scheduler, data, &mut game);
    assert_eq!(report.pulse_triggers_fired, 2);
    assert_eq!(game.score(RED), 1);
    assert_eq!(game.score(BLUE), 1);
    assert_eq!(game.gold(data, RED), 100);
}

#[test]
fn random_pulse_with_huge_weights_does_not_overflow() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        r#"
tithe = { type = half_minute_pulse random = yes weight = 9000000000000000000 effects = { score += 1 } }
levy = { type = half_minute_pulse random = yes weight = 9000000000000000000 effects = { score += 2 } }
"#,
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    let mut scheduler = scheduler(data, &mut game, 100);

    let report = tick(&mut scheduler, data, &mut game);
    assert_eq!(report.pulse_triggers_fired, 2);
    assert_eq!(game.score(RED), 1);
    assert_eq!(game.score(BLUE), 1);
}

#[test]
fn random_on_a_default_trigger_fails_validation() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "odd = { random = yes effects = { score += 1 } }",
    )])
    .expect("load");
    assert!(fixture.database.validate().is_err());
}
