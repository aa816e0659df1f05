use std::collections::HashMap;

use draft_model::{Attribute, DraftAction, DraftData, Hero, HeroCatalog, MatchupTable, Position};
use draft_model::{RoleProfile, RoleProfileTable};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;

const N: usize = 100;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn hero(id: &str, attribute: Attribute) -> Hero {
    Hero::new(id, id, attribute)
}

fn heroes() -> Vec<Hero> {
    vec![
        hero("axe", Attribute::Strength),
        hero("pudge", Attribute::Strength),
        hero("lina", Attribute::Intelligence),
        hero("lion", Attribute::Intelligence),
        hero("juggernaut", Attribute::Agility),
        hero("techies", Attribute::Intelligence),
        hero("meepo", Attribute::Agility),
    ]
}

fn data(matchups: &[(&str, &str, f64)], roles: &[(&str, [u8; 5], bool)]) -> DraftData {
    let mut rows: HashMap<HeroId, HashMap<HeroId, f64>> = HashMap::new();
    for &(candidate, enemy, score) in matchups {
        rows.entry(candidate.into())
            .or_default()
            .insert(enemy.into(), score);
    }
    let profiles = roles
        .iter()
        .map(|&(id, positions, weak)| (id.into(), RoleProfile { positions, weak }))
        .collect();
    DraftData::new(
        HeroCatalog::new(heroes()).unwrap(),
        MatchupTable::new(rows),
        RoleProfileTable::new(profiles),
    )
    .unwrap()
}

fn find<'a>(data: &'a DraftData, ids: &[&str]) -> Vec<&'a Hero> {
    ids.iter()
        .map(|id| data.heroes.get(&HeroId::from(*id)).unwrap())
        .collect()
}

#[test]
fn captains_ban_takes_sole_counter() {
    init_logs();
    let data = data(&[("lina", "axe", 5.0), ("pudge", "axe", -2.0)], &[]);
    let available = find(&data, &["pudge", "lina", "lion", "juggernaut"]);
    let enemy_picks = vec![hero("axe", Attribute::Strength)];
    let options = BotOptions::default();
    for seed in 0..N as u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let chosen = choose_hero(
            &data,
            &available,
            &[],
            &enemy_picks,
            DraftAction::Ban,
            &options,
            &mut rng,
        );
        assert_eq!(chosen.map(|h| h.id.as_str()), Some("lina"));
    }
}

#[test]
fn ban_without_counters_is_still_possible() {
    let data = data(&[("pudge", "axe", -2.0)], &[]);
    let available = find(&data, &["pudge", "lion"]);
    let enemy_picks = vec![hero("axe", Attribute::Strength)];
    let options = BotOptions::default();
    let mut rng = StdRng::seed_from_u64(5);
    let mut seen = HashSet::new();
    for _ in 0..N {
        let chosen = choose_hero(
            &data,
            &available,
            &[],
            &enemy_picks,
            DraftAction::Ban,
            &options,
            &mut rng,
        )
        .unwrap();
        seen.insert(chosen.id.clone());
    }
    assert_eq!(seen.len(), 2);
}

#[test]
fn laggy_heroes_are_avoided() {
    let data = data(&[], &[]);
    let available = find(&data, &["techies", "meepo", "axe"]);
    let options = BotOptions::default();
    let mut rng = StdRng::seed_from_u64(9);
    for action in [DraftAction::Ban, DraftAction::Pick] {
        for _ in 0..N {
            let chosen =
                choose_hero(&data, &available, &[], &[], action, &options, &mut rng).unwrap();
            assert_eq!(chosen.id.as_str(), "axe");
        }
    }
}

#[test]
fn laggy_only_pool_still_yields_a_hero() {
    let data = data(&[], &[]);
    let available = find(&data, &["techies", "meepo"]);
    let options = BotOptions::default();
    let mut rng = StdRng::seed_from_u64(2);
    let chosen = choose_hero(
        &data,
        &available,
        &[],
        &[],
        DraftAction::Pick,
        &options,
        &mut rng,
    );
    assert!(chosen.is_some_and(|h| is_laggy(&h.id)));
}

#[test]
fn empty_pool_yields_nothing() {
    let data = data(&[], &[]);
    let mut rng = StdRng::seed_from_u64(2);
    let options = BotOptions::default();
    assert!(choose_hero(&data, &[], &[], &[], DraftAction::Pick, &options, &mut rng).is_none());
    assert!(choose_counter_ban(&data, &[], &[], &mut rng).is_none());
    assert!(choose_random(&[], &mut rng).is_none());
}

#[test]
fn pick_respects_desired_position() {
    let data = data(
        &[],
        &[
            ("lion", [0, 0, 0, 60, 90], false),
            ("axe", [0, 0, 100, 0, 0], false),
        ],
    );
    let available = find(&data, &["axe", "lion", "lina", "juggernaut"]);
    let options = BotOptions::default().with_desired_position(Position::new(5));
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..N {
        let chosen = choose_hero(
            &data,
            &available,
            &[],
            &[],
            DraftAction::Pick,
            &options,
            &mut rng,
        )
        .unwrap();
        assert_eq!(chosen.id.as_str(), "lion");
    }
}

#[test]
fn pick_falls_back_when_nobody_plays_position() {
    let data = data(&[], &[("axe", [0, 0, 100, 0, 0], false)]);
    // The fallback uses the lag-filtered pool, so techies never comes up.
    let available = find(&data, &["axe", "lina", "techies"]);
    let options = BotOptions::default().with_desired_position(Position::new(1));
    let mut rng = StdRng::seed_from_u64(8);
    let mut seen = HashSet::new();
    for _ in 0..N {
        let chosen = choose_hero(
            &data,
            &available,
            &[],
            &[],
            DraftAction::Pick,
            &options,
            &mut rng,
        )
        .unwrap();
        seen.insert(chosen.id.as_str().to_string());
    }
    let mut seen: Vec<_> = seen.into_iter().collect();
    seen.sort();
    assert_eq!(seen, vec!["axe", "lina"]);
}

#[test]
fn laggy_hero_is_picked_when_only_it_plays_position() {
    let data = data(
        &[],
        &[
            ("meepo", [0, 80, 0, 0, 0], false),
            ("axe", [0, 0, 100, 0, 0], false),
            ("lina", [0, 0, 0, 40, 0], false),
        ],
    );
    let available = find(&data, &["axe", "lina", "meepo"]);
    let options = BotOptions::default().with_desired_position(Position::new(2));
    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..N {
        let chosen = choose_hero(
            &data,
            &available,
            &[],
            &[],
            DraftAction::Pick,
            &options,
            &mut rng,
        )
        .unwrap();
        assert_eq!(chosen.id.as_str(), "meepo");
    }
}

#[test]
fn pick_prefers_missing_attribute() {
    let data = data(&[], &[]);
    let available = find(&data, &["pudge", "juggernaut"]);
    let own_picks = vec![hero("axe", Attribute::Strength)];
    let options = BotOptions::default();
    let mut rng = StdRng::seed_from_u64(13);
    let mut agility = 0;
    for _ in 0..N * 10 {
        let chosen = choose_hero(
            &data,
            &available,
            &own_picks,
            &[],
            DraftAction::Pick,
            &options,
            &mut rng,
        )
        .unwrap();
        if chosen.attribute == Attribute::Agility {
            agility += 1;
        }
    }
    // Roughly 3:1 in favour of the new attribute.
    assert!(agility > N * 6, "agility picked {agility} times");
}

#[test]
fn weak_heroes_are_penalised() {
    let data = data(
        &[],
        &[
            ("lina", [0, 50, 0, 0, 0], true),
            ("lion", [0, 50, 0, 0, 0], false),
        ],
    );
    let available = find(&data, &["lina", "lion"]);
    let options = BotOptions::default();
    let mut rng = StdRng::seed_from_u64(21);
    let mut weak = 0;
    for _ in 0..N * 10 {
        let chosen = choose_hero(
            &data,
            &available,
            &[],
            &[],
            DraftAction::Pick,
            &options,
            &mut rng,
        )
        .unwrap();
        if chosen.id.as_str() == "lina" {
            weak += 1;
        }
    }
    assert!(weak < N * 5, "weak hero picked {weak} times");
}

#[test]
fn counter_ban_is_uniform_without_enemy_picks() {
    let data = data(&[("lina", "axe", 5.0)], &[]);
    let available = find(&data, &["lina", "lion", "pudge", "juggernaut"]);
    let mut rng = StdRng::seed_from_u64(17);
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for _ in 0..N * 20 {
        let chosen = choose_counter_ban(&data, &available, &[], &mut rng).unwrap();
        *counts.entry(chosen.id.as_str()).or_default() += 1;
    }
    assert_eq!(counts.len(), 4);
    for (id, count) in counts {
        assert!(count.abs_diff(N * 5) < N, "{id} banned {count} times");
    }
}

#[test]
fn counter_ban_targets_counters() {
    let data = data(&[("lina", "axe", 5.0)], &[]);
    let available = find(&data, &["lina", "lion", "pudge"]);
    let enemy_picks = vec![hero("axe", Attribute::Strength)];
    let mut rng = StdRng::seed_from_u64(19);
    let lina = (0..N * 10)
        .filter(|_| {
            choose_counter_ban(&data, &available, &enemy_picks, &mut rng)
                .is_some_and(|h| h.id.as_str() == "lina")
        })
        .count();
    assert!(lina > N * 9, "counter banned {lina} times");
}

#[test]
fn random_choice_includes_laggy_heroes() {
    let data = data(&[], &[]);
    let available = find(&data, &["techies"]);
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(
        choose_random(&available, &mut rng).map(|h| h.id.as_str()),
        Some("techies")
    );
}

fn count_choices(
    data: &DraftData,
    available: &[&Hero],
    enemy_picks: &[Hero],
    action: DraftAction,
    options: &BotOptions,
    seed: u64,
    target: &str,
) -> usize {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..N * 10)
        .filter(|_| {
            choose_hero(data, available, &[], enemy_picks, action, options, &mut rng)
                .is_some_and(|h| h.id.as_str() == target)
        })
        .count()
}

#[test]
fn non_captains_ban_penalises_weak_counters() {
    // Equal counters, but lion is weak: 5.0 against 3.0.
    let data = data(
        &[("lina", "axe", 5.0), ("lion", "axe", 5.0)],
        &[("lion", [0, 0, 0, 50, 50], true)],
    );
    let available = find(&data, &["lina", "lion"]);
    let enemy_picks = vec![hero("axe", Attribute::Strength)];
    let options = BotOptions {
        captains_mode: false,
        ..Default::default()
    };
    let lion = count_choices(
        &data,
        &available,
        &enemy_picks,
        DraftAction::Ban,
        &options,
        3,
        "lion",
    );
    assert!(
        (N * 3..N * 5).contains(&lion),
        "weak counter banned {lion} times"
    );
}

#[test]
fn non_captains_ban_works_without_enemy_picks() {
    // Every score sits on the floor, so the draw is uniform.
    let data = data(&[("lina", "axe", 5.0)], &[("lion", [0, 0, 0, 50, 50], true)]);
    let available = find(&data, &["lina", "lion", "pudge", "juggernaut"]);
    let options = BotOptions {
        captains_mode: false,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(23);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..N * 20 {
        let chosen = choose_hero(
            &data,
            &available,
            &[],
            &[],
            DraftAction::Ban,
            &options,
            &mut rng,
        )
        .unwrap();
        *counts.entry(chosen.id.to_string()).or_default() += 1;
    }
    assert_eq!(counts.len(), 4);
    for (id, count) in counts {
        assert!(count.abs_diff(N * 5) < N, "{id} banned {count} times");
    }
}

#[test]
fn picks_favour_counters_to_enemy_picks() {
    let data = data(&[("juggernaut", "axe", 3.0)], &[]);
    let available = find(&data, &["juggernaut", "pudge"]);
    let enemy_picks = vec![hero("axe", Attribute::Strength)];
    let counter = BotOptions::default();
    let neutral = BotOptions {
        prefer_counter: false,
        ..Default::default()
    };

    // Scores 3.0 + 3.6 against 3.0, and 3.0 + 1.8 against 3.0.
    let juggernaut = |options: &BotOptions| {
        count_choices(
            &data,
            &available,
            &enemy_picks,
            DraftAction::Pick,
            options,
            31,
            "juggernaut",
        )
    };
    let with_counter = juggernaut(&counter);
    let without_counter = juggernaut(&neutral);
    assert!(with_counter > N * 6, "counter picked {with_counter} times");
    assert!(
        without_counter > N * 5 && without_counter < with_counter,
        "counter picked {without_counter} times without the preference"
    );
}
