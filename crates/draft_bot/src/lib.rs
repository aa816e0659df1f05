use std::collections::HashSet;

use draft_model::{DraftAction, DraftData, Hero, HeroId, Position};
use itertools::Itertools;
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;

mod options;
mod sampling;

pub use options::{desired_position, BotOptions, PICK_POSITION_SEQUENCE};
pub use sampling::weighted_random;

/// Heroes that commonly cause server lag. Bots avoid picking or banning them while anything
/// else is left.
pub const LAGGY_HEROES: [&str; 18] = [
    "broodmother",
    "chen",
    "chaos_knight",
    "techies",
    "meepo",
    "invoker",
    "tinker",
    "arc_warden",
    "enigma",
    "naga_siren",
    "terrorblade",
    "phantom_lancer",
    "furion",
    "monkey_king",
    "skeleton_king",
    "viper",
    "troll_warlord",
    "sniper",
];

const BAN_SCORE_FLOOR: f64 = 0.01;
const PICK_SCORE_FLOOR: f64 = 0.001;
const WEAK_PENALTY: f64 = 0.6;
const ATTRIBUTE_BONUS: f64 = 2.0;
const COUNTER_PICK_WEIGHT: f64 = 1.2;
const MATCHUP_WEIGHT: f64 = 0.6;
const POSITION_BONUS: f64 = 3.0;
const PICK_JITTER: f64 = 0.3;

pub fn is_laggy(id: &HeroId) -> bool {
    LAGGY_HEROES.contains(&id.as_str())
}

/// Chooses a hero for a bot's ban or pick.
///
/// `own_picks` and `enemy_picks` are the picks of the acting side and of its opponent. Returns
/// `None` only if `available` is empty.
pub fn choose_hero<'h, R: Rng>(
    data: &DraftData,
    available: &[&'h Hero],
    own_picks: &[Hero],
    enemy_picks: &[Hero],
    action: DraftAction,
    options: &BotOptions,
    rng: &mut R,
) -> Option<&'h Hero> {
    let pool = candidate_pool(available);
    let chosen = match action {
        DraftAction::Ban => choose_ban(data, &pool, enemy_picks, options, rng),
        DraftAction::Pick => {
            choose_pick(data, available, &pool, own_picks, enemy_picks, options, rng)
        }
    };
    debug!(
        "Bot {action}: {} (candidates: {}, desired position: {:?})",
        chosen.map(|h| h.id.as_str()).unwrap_or("<none>"),
        pool.len(),
        options.desired_position.map(Position::get),
    );
    chosen
}

/// Revenge ban: deny whatever scores best against the opponent's picks so far.
/// Uniformly random while the opponent has no picks.
pub fn choose_counter_ban<'h, R: Rng>(
    data: &DraftData,
    available: &[&'h Hero],
    enemy_picks: &[Hero],
    rng: &mut R,
) -> Option<&'h Hero> {
    let pool = candidate_pool(available);
    let chosen = if enemy_picks.is_empty() {
        pool.choose(rng).copied()
    } else {
        let scores: Vec<f64> = pool
            .iter()
            .map(|c| {
                data.matchups
                    .advantage_sum(&c.id, enemy_picks)
                    .max(BAN_SCORE_FLOOR)
            })
            .collect();
        log_scores("counter ban", &pool, &scores);
        weighted_random(&pool, &scores, rng).copied()
    };
    debug!(
        "Bot counter ban: {} (candidates: {}, enemy picks: {})",
        chosen.map(|h| h.id.as_str()).unwrap_or("<none>"),
        pool.len(),
        enemy_picks.iter().map(|h| h.id.as_str()).join(", "),
    );
    chosen
}

/// Uniform choice over everything still available, laggy heroes included.
pub fn choose_random<'h, R: Rng>(available: &[&'h Hero], rng: &mut R) -> Option<&'h Hero> {
    available.choose(rng).copied()
}

fn candidate_pool<'h>(available: &[&'h Hero]) -> Vec<&'h Hero> {
    let pool: Vec<_> = available
        .iter()
        .copied()
        .filter(|h| !is_laggy(&h.id))
        .collect();
    if pool.is_empty() {
        available.to_vec()
    } else {
        pool
    }
}

fn choose_ban<'h, R: Rng>(
    data: &DraftData,
    pool: &[&'h Hero],
    enemy_picks: &[Hero],
    options: &BotOptions,
    rng: &mut R,
) -> Option<&'h Hero> {
    let scores: Vec<f64> = if options.captains_mode && !enemy_picks.is_empty() {
        // Only real counters carry weight; if none exist the draw is uniform.
        pool.iter()
            .map(|c| data.matchups.advantage_sum(&c.id, enemy_picks).max(0.0))
            .collect()
    } else {
        pool.iter()
            .map(|c| {
                let mut score = data.matchups.advantage_sum(&c.id, enemy_picks);
                if data.roles.is_weak(&c.id) {
                    score *= WEAK_PENALTY;
                }
                score.max(BAN_SCORE_FLOOR)
            })
            .collect()
    };
    log_scores("ban", pool, &scores);
    weighted_random(pool, &scores, rng).copied()
}

/// `available` is the unfiltered list; `pool` has laggy heroes removed.
fn choose_pick<'h, R: Rng>(
    data: &DraftData,
    available: &[&'h Hero],
    pool: &[&'h Hero],
    own_picks: &[Hero],
    enemy_picks: &[Hero],
    options: &BotOptions,
    rng: &mut R,
) -> Option<&'h Hero> {
    let candidates = match options.desired_position {
        Some(position) => position_candidates(data, available, pool, position),
        None => pool.to_vec(),
    };
    let scores = pick_scores(data, &candidates, own_picks, enemy_picks, options, rng);
    log_scores("pick", &candidates, &scores);
    weighted_random(&candidates, &scores, rng).copied()
}

/// Heroes playing `position`, laggy ones included. Falls back to the lag-filtered `pool` when
/// nobody qualifies.
fn position_candidates<'h>(
    data: &DraftData,
    available: &[&'h Hero],
    pool: &[&'h Hero],
    position: Position,
) -> Vec<&'h Hero> {
    let qualified: Vec<_> = available
        .iter()
        .copied()
        .filter(|h| data.roles.position_value(&h.id, position) > 0)
        .collect();
    if qualified.is_empty() {
        debug!(
            "No candidate plays position {}, using the whole pool",
            position.get()
        );
        pool.to_vec()
    } else {
        qualified
    }
}

fn pick_scores<R: Rng>(
    data: &DraftData,
    candidates: &[&Hero],
    own_picks: &[Hero],
    enemy_picks: &[Hero],
    options: &BotOptions,
    rng: &mut R,
) -> Vec<f64> {
    let owned_attributes: HashSet<_> = own_picks.iter().map(|h| h.attribute).collect();
    let matchup_weight = if options.prefer_counter {
        COUNTER_PICK_WEIGHT
    } else {
        MATCHUP_WEIGHT
    };

    candidates
        .iter()
        .map(|c| {
            let mut score = 1.0;
            if !owned_attributes.contains(&c.attribute) {
                score += ATTRIBUTE_BONUS;
            }
            score += data.matchups.advantage_sum(&c.id, enemy_picks) * matchup_weight;
            if data.roles.is_weak(&c.id) {
                score *= WEAK_PENALTY;
            }
            if let Some(position) = options.desired_position {
                let value = data.roles.position_value(&c.id, position);
                score += f64::from(value) / 100.0 * POSITION_BONUS;
            }
            score += rng.gen_range(-PICK_JITTER..=PICK_JITTER);
            score.max(PICK_SCORE_FLOOR)
        })
        .collect()
}

fn log_scores(label: &str, candidates: &[&Hero], scores: &[f64]) {
    if log::log_enabled!(log::Level::Trace) {
        trace!(
            "{label} scores: {}",
            candidates
                .iter()
                .zip(scores)
                .map(|(h, s)| format!("{}={s:.3}", h.id))
                .join(", ")
        );
    }
}

#[cfg(test)]
mod tests;
