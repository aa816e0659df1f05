use draft_model::{PerSide, Side};
use rand::Rng;
use serde::Serialize;

const DEEP_THINK_CHANCE: f64 = 0.5;
const MIN_DEEP_THINK_MS: u64 = 1500;
const QUICK_THINK_MIN_MS: u64 = 1000;
const QUICK_THINK_MAX_MS: u64 = 6000;
const MIN_THINK_MS: u64 = 200;
const SAFETY_MARGIN_MS: u64 = 200;

/// Moments of a turn a host may want to announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClockCue {
    TenSeconds,
    FiveSeconds,
    ReserveStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    Running(Option<ClockCue>),
    /// Both the turn timer and the side's reserve are used up.
    Expired,
}

/// Per-turn countdown backed by a reserve pool per side.
#[derive(Debug, Clone)]
pub struct DraftClock {
    turn_seconds: u32,
    main: u32,
    reserve: PerSide<u32>,
    reserve_running: bool,
}

impl DraftClock {
    pub fn new(turn_seconds: u32, reserve_seconds: u32) -> Self {
        Self {
            turn_seconds,
            main: turn_seconds,
            reserve: PerSide::splat(reserve_seconds),
            reserve_running: false,
        }
    }

    pub fn main(&self) -> u32 {
        self.main
    }

    pub fn reserve(&self, side: Side) -> u32 {
        self.reserve[side]
    }

    pub fn reserves(&self) -> &PerSide<u32> {
        &self.reserve
    }

    /// Starts the next turn. Reserves carry over.
    pub fn reset_turn(&mut self) {
        self.main = self.turn_seconds;
        self.reserve_running = false;
    }

    /// Advances the clock of the active `side` by one second.
    pub fn tick(&mut self, side: Side) -> ClockTick {
        if self.main > 0 {
            self.main -= 1;
            let cue = match self.main {
                10 => Some(ClockCue::TenSeconds),
                5 => Some(ClockCue::FiveSeconds),
                _ => None,
            };
            return ClockTick::Running(cue);
        }
        let reserve = &mut self.reserve[side];
        if *reserve == 0 {
            return ClockTick::Expired;
        }
        *reserve -= 1;
        let started = !self.reserve_running;
        self.reserve_running = true;
        ClockTick::Running(started.then_some(ClockCue::ReserveStarted))
    }

    /// `"27"` while the turn timer runs, `"2:05"` once the reserve is being spent.
    pub fn display(&self, side: Side) -> String {
        if self.main > 0 {
            self.main.to_string()
        } else {
            let reserve = self.reserve[side];
            format!("{}:{:02}", reserve / 60, reserve % 60)
        }
    }
}

/// How long a bot deliberates, in clock milliseconds, given the time its side has left.
///
/// Half of the time the bot thinks deeply and may run into its reserve, otherwise it answers
/// within a few seconds. The result always leaves a margin before the clock would expire.
pub fn think_delay<R: Rng>(main: u32, reserve: u32, rng: &mut R) -> u64 {
    let available = (u64::from(main) + u64::from(reserve)) * 1000;
    let window = available.saturating_sub(400).max(500);

    let deep = rng.gen_bool(DEEP_THINK_CHANCE);
    let delay = if deep && window > 2000 {
        let min = MIN_DEEP_THINK_MS.min(window - SAFETY_MARGIN_MS);
        let extra = window.saturating_sub(min + SAFETY_MARGIN_MS);
        min + rng.gen_range(0..=extra)
    } else {
        let max = QUICK_THINK_MAX_MS.min(window);
        let span = (max + 1).saturating_sub(QUICK_THINK_MIN_MS).max(1);
        QUICK_THINK_MIN_MS + rng.gen_range(0..span)
    };
    delay.max(MIN_THINK_MS)
}
