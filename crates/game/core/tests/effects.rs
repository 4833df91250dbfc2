//! Effect interpretation through loaded trigger definitions.

mod common;

use common::{BLUE, Fixture, Match, RED};
use database::DataEntry;
use game_core::{Context, Env, ScriptError, Trigger, UnitClass, View};

#[test]
fn resource_and_score_effects_follow_their_operator() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "bonus = { effects = { gold += 5 score = 3 score += 2 resource += { resource = gold quantity = 7 } } }",
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.fire(data, "bonus", RED).expect("fire");

    assert_eq!(game.gold(data, RED), 112);
    assert_eq!(game.score(RED), 5);
    assert_eq!(game.score(BLUE), 0);
}

#[test]
fn unsupported_operator_fails_check_and_application() {
    let fixture = Fixture::new(&[("triggers/test.txt", "bad = { effects = { flag = lucky } }")])
        .expect("load");
    assert!(fixture.database.validate().is_err());

    let data = fixture.data();
    let mut game = Match::new(data, vec![0]);
    let error = game.fire(data, "bad", RED).unwrap_err();
    assert!(matches!(
        error,
        ScriptError::UnsupportedOperator { class: "flag", .. }
    ));
    assert_eq!(error.error_code(), "SCRIPT_UNSUPPORTED_OPERATOR");
}

#[test]
fn flags_are_set_and_cleared() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "set = { effects = { flag += lucky flag += brave } }\nclear = { effects = { flag -= lucky } }",
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.fire(data, "set", RED).expect("set");
    game.fire(data, "clear", RED).expect("clear");

    let flags = &game.state.faction(RED).expect("red").flags;
    assert!(flags.contains("brave"));
    assert!(!flags.contains("lucky"));
}

#[test]
fn scope_redirect_rejects_non_assignment() {
    let result = Fixture::new(&[(
        "triggers/test.txt",
        "bad = { effects = { current_faction += { score += 1 } } }",
    )]);
    assert!(result.is_err());
}

#[test]
fn random_list_without_positive_weights_does_nothing() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "roll = { effects = { random_list = { 0 = { score += 1 } 0 = { score += 2 } } } }",
    )])
    .expect("load");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.fire(data, "roll", RED).expect("fire");

    assert_eq!(game.score(RED), 0);
    assert_eq!(game.rng.draws(), 0);
}

#[test]
fn random_list_always_picks_the_only_positive_entry() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "roll = { effects = { random_list = { 0 = { score += 1 } 5 = { score += 10 } } } }",
    )])
    .expect("load");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0, 1, 2, 3, 4]);
    for _ in 0..5 {
        game.fire(data, "roll", RED).expect("fire");
    }

    assert_eq!(game.score(RED), 50);
}

#[test]
fn score_and_resources_saturate_at_the_integer_bounds() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        r#"
hoard = { effects = { score += 9000000000000000000 gold += 9000000000000000000 } }
squander = { effects = { score -= 9000000000000000000 gold -= 9000000000000000000 } }
"#,
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.fire(data, "hoard", RED).expect("first");
    game.fire(data, "hoard", RED).expect("second");
    assert_eq!(game.score(RED), i64::MAX);
    assert_eq!(game.gold(data, RED), i64::MAX);

    for _ in 0..4 {
        game.fire(data, "squander", BLUE).expect("squander");
    }
    assert_eq!(game.score(BLUE), i64::MIN);
    assert_eq!(game.gold(data, BLUE), i64::MIN);
}

#[test]
fn random_list_with_huge_weights_still_picks_an_entry() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "roll = { effects = { random_list = { 9000000000000000000 = { score += 1 } 9000000000000000000 = { score += 2 } } } }",
    )])
    .expect("load");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.fire(data, "roll", RED).expect("fire");
    assert_eq!(game.score(RED), 1);
}

#[test]
fn factor_base_out_of_fixed_point_range_is_rejected_on_load() {
    let result = Fixture::new(&[(
        "triggers/test.txt",
        "roll = { effects = { random_list = { entry = { weight = { base = 1000000000000000 } score += 1 } } } }",
    )]);
    assert!(result.is_err());
}

#[test]
fn conditional_and_repeated_effects() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        r#"
grow = {
    effects = {
        repeat = { count = 3 score += 2 }
        if = { conditions = { score >= 6 } gold += 1 }
        if = { conditions = { score > 6 } gold += 100 }
    }
}
"#,
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.fire(data, "grow", RED).expect("fire");

    assert_eq!(game.score(RED), 6);
    assert_eq!(game.gold(data, RED), 101);
}

#[test]
fn created_unit_is_reachable_through_redirect() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "recruit = { effects = { create_unit = knight last_created_unit = { hit_points -= 5 experience += 3 } } }",
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.fire(data, "recruit", RED).expect("fire");

    let handle = game.state.faction(RED).and_then(|faction| faction.last_created_unit).expect("unit");
    let unit = game.state.units.get(handle).expect("alive");
    let knight = data.require::<UnitClass>("knight").expect("knight");
    assert_eq!(unit.class, knight);
    assert_eq!(unit.hit_points, 25);
    assert_eq!(unit.experience, 3);
    assert_eq!(unit.owner, RED);
}

#[test]
fn units_at_zero_hit_points_are_removed() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "volley = { effects = { any_unit_of_class = { unit_class = archer hit_points = 0 } } }",
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    // Two archers plus the hero's knight.
    assert_eq!(game.state.units_of(RED).count(), 3);
    game.fire(data, "volley", RED).expect("fire");
    assert_eq!(game.state.units_of(RED).count(), 2);
}

#[test]
fn runaway_scripted_effect_hits_the_depth_limit() {
    let fixture = Fixture::new(&[
        ("scripted_effects/faction/loop.txt", "forever = { score += 1 scripted_effect = forever }"),
        ("triggers/test.txt", "start = { effects = { scripted_effect = forever } }"),
    ])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    let error = game.fire(data, "start", RED).unwrap_err();
    assert!(matches!(error, ScriptError::RecursionLimit { .. }));
}

#[test]
fn dialogue_is_presented_and_runs_its_effects() {
    let fixture = Fixture::new(&[
        (
            "dialogues/base.txt",
            r#"welcome = { title = "Welcome" speaker = hero text = "Hold the line." effects = { score += 2 } }"#,
        ),
        ("triggers/test.txt", "greet = { effects = { dialogue = welcome } }"),
    ])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();

    let mut game = Match::new(data, vec![0]);
    game.fire(data, "greet", RED).expect("fire");

    let events = game.narrative.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].dialogue, "welcome");
    assert_eq!(events[0].title, "Welcome");
    assert_eq!(events[0].text, "Hold the line.");
    assert_eq!(events[0].faction, RED);
    assert!(events[0].speaker.is_some());
    assert_eq!(game.score(RED), 2);
}

#[test]
fn dialogue_effects_keep_the_callers_context() {
    let fixture = Fixture::new(&[
        (
            "dialogues/base.txt",
            r#"envoy = { text = "Terms are offered." effects = { current_faction = { score += 1 } score += 5 } }"#,
        ),
        ("triggers/test.txt", "parley = { effects = { dialogue = envoy } }"),
    ])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();
    let trigger = data
        .entry(data.require::<Trigger>("parley").expect("handle"))
        .expect("trigger");

    // Shown to blue from a script started for red.
    let mut game = Match::new(data, vec![0]);
    let mut env = Env::new(
        &mut game.state,
        data,
        &mut game.rng,
        &mut game.delayed,
        &mut game.narrative,
    );
    trigger
        .effects()
        .apply(BLUE, &Context::for_faction(RED), &mut env)
        .expect("apply");

    assert_eq!(game.score(RED), 1);
    assert_eq!(game.score(BLUE), 5);
    assert_eq!(game.narrative.events()[0].faction, BLUE);
}

#[test]
fn factor_modifiers_compound_in_order() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        r#"
windfall = {
    type = half_minute_pulse
    random = yes
    weight = {
        base = 10
        modifier = { factor = 2 has_flag = lucky }
        modifier = { factor = 1.5 score >= 0 }
    }
    effects = { gold += 1 }
}
"#,
    )])
    .expect("load");
    fixture.database.validate().expect("valid");
    let data = fixture.data();
    let trigger = data
        .entry(data.require::<Trigger>("windfall").expect("handle"))
        .expect("trigger");

    let mut game = Match::new(data, vec![0]);
    let context = Context::for_faction(RED);
    let view = View { state: &game.state, data };
    assert_eq!(trigger.weight(RED, &context, view).expect("weight"), 15);

    game.state.faction_mut(RED).expect("red").flags.insert("lucky".into());
    let view = View { state: &game.state, data };
    assert_eq!(trigger.weight(RED, &context, view).expect("weight"), 30);
}

#[test]
fn descriptions_skip_hidden_and_silent_effects() {
    let fixture = Fixture::new(&[(
        "triggers/test.txt",
        "quiet = { effects = { score += 2 hidden = { gold += 1 } flag += secret } }",
    )])
    .expect("load");
    let data = fixture.data();
    let trigger = data
        .entry(data.require::<Trigger>("quiet").expect("handle"))
        .expect("trigger");

    assert_eq!(trigger.effects().description(data, 0, ""), "Score: +2");
    assert_eq!(trigger.effects().description(data, 1, "> "), ">     Score: +2");
    assert_eq!(trigger.identifier(), "quiet");
}
