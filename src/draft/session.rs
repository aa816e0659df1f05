use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;
use draft_bot::{desired_position, BotOptions};
use draft_model::{
    DraftAction, DraftData, DraftOrder, DraftStep, Hero, HeroId, PerSide, Side, TeamDraftState,
    DRAFT_LENGTH,
};
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use super::clock::{self, ClockCue, ClockTick, DraftClock};
use super::coin_toss::{self, CoinFace, CoinToss};
use super::config::{BanStrategy, Config};
use super::message_bus::CommitSource;
use super::ui_state::{DraftResult, DraftSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftPhase {
    AwaitingSideSelection,
    AwaitingCoinToss,
    AwaitingOrderChoice,
    Drafting,
    Complete,
}

impl Display for DraftPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DraftPhase::AwaitingSideSelection => "side selection",
            DraftPhase::AwaitingCoinToss => "coin toss",
            DraftPhase::AwaitingOrderChoice => "order choice",
            DraftPhase::Drafting => "drafting",
            DraftPhase::Complete => "complete",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    #[error("Cannot {operation} during {phase}")]
    WrongPhase {
        operation: &'static str,
        phase: DraftPhase,
    },
    #[error("It is not the human's turn")]
    NotHumanTurn,
    #[error("It is not a bot's turn")]
    NotBotTurn,
    #[error("Unknown hero {0}")]
    UnknownHero(HeroId),
    #[error("Hero {0} is already drafted")]
    HeroTaken(HeroId),
    #[error("Turn already advanced")]
    StaleTurn,
    #[error("No hero left to draft")]
    NoHeroAvailable,
    #[error("Hero {0} is not in the team's pool")]
    NotInPool(HeroId),
    #[error("Human slot is already filled")]
    HumanSlotFilled,
    #[error("Hero assignment is not running")]
    NoAssignment,
}

/// Identifies one turn of one session. Anything scheduled with an outdated token is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnToken {
    pub generation: u64,
    pub turn_index: usize,
}

/// A turn that was just committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub step: DraftStep,
    pub hero: Hero,
    pub source: CommitSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The clock is not running.
    Idle,
    Running { side: Side, cue: Option<ClockCue> },
    /// Time ran out and a random hero was committed.
    Forced(Commit),
}

/// The draft state machine: side selection, coin toss, the 24 turns and their clock.
///
/// Holds no timers itself. The owner drives it with [`DraftSession::tick`] and delivers bot
/// moves with the token obtained from [`DraftSession::plan_bot_think`].
pub struct DraftSession {
    data: Arc<DraftData>,
    turn_seconds: u32,
    reserve_seconds: u32,
    bot_options: BotOptions,
    ban_strategy: BanStrategy,
    team_names: PerSide<String>,

    generation: u64,
    phase: DraftPhase,
    human_side: Option<Side>,
    order: DraftOrder,
    turn_index: usize,
    teams: PerSide<TeamDraftState>,
    clock: DraftClock,
    paused: bool,
}

impl DraftSession {
    pub fn new(data: Arc<DraftData>, config: &Config) -> Self {
        Self {
            data,
            turn_seconds: config.turn_seconds,
            reserve_seconds: config.reserve_seconds,
            bot_options: config.bot_options(),
            ban_strategy: config.ban_strategy,
            team_names: config.team_names(),
            generation: 0,
            phase: DraftPhase::AwaitingSideSelection,
            human_side: None,
            order: DraftOrder::default(),
            turn_index: 0,
            teams: PerSide::default(),
            clock: DraftClock::new(config.turn_seconds, config.reserve_seconds),
            paused: false,
        }
    }

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn human_side(&self) -> Option<Side> {
        self.human_side
    }

    pub fn order(&self) -> DraftOrder {
        self.order
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn team(&self, side: Side) -> &TeamDraftState {
        &self.teams[side]
    }

    pub fn clock(&self) -> &DraftClock {
        &self.clock
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_clock_running(&self) -> bool {
        self.phase == DraftPhase::Drafting && !self.paused
    }

    pub fn active_step(&self) -> Option<DraftStep> {
        if self.phase != DraftPhase::Drafting {
            return None;
        }
        self.order.get(self.turn_index)
    }

    pub fn turn_token(&self) -> Option<TurnToken> {
        self.active_step().map(|_| TurnToken {
            generation: self.generation,
            turn_index: self.turn_index,
        })
    }

    pub fn is_human_turn(&self) -> bool {
        self.active_step()
            .is_some_and(|step| Some(step.side) == self.human_side)
    }

    pub fn is_taken(&self, id: &HeroId) -> bool {
        self.teams.iter().any(|(_, team)| team.contains(id))
    }

    /// Heroes not yet picked or banned by either side.
    pub fn available(&self) -> Vec<&Hero> {
        self.data
            .heroes
            .all()
            .iter()
            .filter(|h| !self.is_taken(&h.id))
            .collect()
    }

    /// Starts a new session with the human on `side`.
    pub fn select_side(&mut self, side: Side) -> Result<(), DraftError> {
        match self.phase {
            DraftPhase::AwaitingSideSelection | DraftPhase::Complete => {}
            phase => {
                return Err(DraftError::WrongPhase {
                    operation: "select a side",
                    phase,
                })
            }
        }
        self.reset();
        self.human_side = Some(side);
        self.phase = DraftPhase::AwaitingCoinToss;
        info!(
            "New draft #{}: human plays {}",
            self.generation, self.team_names[side]
        );
        Ok(())
    }

    /// Human calls the coin. On a wrong call the bot side decides the order right away.
    pub fn choose_coin_call<R: Rng>(
        &mut self,
        call: CoinFace,
        rng: &mut R,
    ) -> Result<CoinToss, DraftError> {
        let human = self.expect_phase(DraftPhase::AwaitingCoinToss, "call the coin")?;
        let toss = coin_toss::resolve(call, human, rng);
        info!(
            "Coin toss: called {}, landed {} ({})",
            toss.call,
            toss.outcome,
            if toss.won() { "won" } else { "lost" }
        );
        match toss.first {
            Some(first) => self.start_drafting(first),
            None => self.phase = DraftPhase::AwaitingOrderChoice,
        }
        Ok(toss)
    }

    /// The coin toss winner decides whether to draft first. Returns the side going first.
    pub fn choose_go_first(&mut self, go_first: bool) -> Result<Side, DraftError> {
        let human = self.expect_phase(DraftPhase::AwaitingOrderChoice, "choose the order")?;
        let first = if go_first { human } else { human.opponent() };
        info!(
            "Human chose to go {}",
            if go_first { "first" } else { "second" }
        );
        self.start_drafting(first);
        Ok(first)
    }

    /// Abandons the session. Anything scheduled against it becomes stale.
    pub fn exit(&mut self) {
        info!("Leaving draft #{}", self.generation);
        self.reset();
        self.phase = DraftPhase::AwaitingSideSelection;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            debug!("Clock {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Advances the active side's clock by one second. When the turn timer and the reserve are
    /// both used up a random available hero is committed.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> TickOutcome {
        if !self.is_clock_running() {
            return TickOutcome::Idle;
        }
        let Some(step) = self.active_step() else {
            return TickOutcome::Idle;
        };
        match self.clock.tick(step.side) {
            ClockTick::Running(cue) => TickOutcome::Running {
                side: step.side,
                cue,
            },
            ClockTick::Expired => {
                let Some(hero) = draft_bot::choose_random(&self.available(), rng).cloned() else {
                    warn!("Clock expired with no hero left to draft");
                    return TickOutcome::Idle;
                };
                info!("{} ran out of time", self.team_names[step.side]);
                TickOutcome::Forced(self.commit(hero, CommitSource::Timeout))
            }
        }
    }

    pub fn commit_human_choice(&mut self, id: &HeroId) -> Result<Commit, DraftError> {
        if self.phase != DraftPhase::Drafting {
            return Err(DraftError::WrongPhase {
                operation: "commit a hero",
                phase: self.phase,
            });
        }
        if !self.is_human_turn() {
            return Err(DraftError::NotHumanTurn);
        }
        let hero = self
            .data
            .heroes
            .get(id)
            .cloned()
            .ok_or_else(|| DraftError::UnknownHero(id.clone()))?;
        if self.is_taken(&hero.id) {
            return Err(DraftError::HeroTaken(hero.id));
        }
        Ok(self.commit(hero, CommitSource::Human))
    }

    /// Lets the bot decide the turn identified by `token`.
    pub fn commit_bot<R: Rng>(
        &mut self,
        token: TurnToken,
        rng: &mut R,
    ) -> Result<Commit, DraftError> {
        if self.turn_token() != Some(token) {
            return Err(DraftError::StaleTurn);
        }
        if self.is_human_turn() {
            return Err(DraftError::NotBotTurn);
        }
        let step = self.active_step().ok_or(DraftError::StaleTurn)?;
        let hero = self
            .bot_choice(step, rng)
            .cloned()
            .ok_or(DraftError::NoHeroAvailable)?;
        Ok(self.commit(hero, CommitSource::Bot))
    }

    /// Token and thinking time (clock milliseconds) for the bot owning the current turn.
    pub fn plan_bot_think<R: Rng>(&self, rng: &mut R) -> Option<(TurnToken, u64)> {
        if self.is_human_turn() {
            return None;
        }
        let token = self.turn_token()?;
        let side = self.active_step()?.side;
        let delay = clock::think_delay(self.clock.main(), self.clock.reserve(side), rng);
        debug!("{} thinks for {delay}ms", self.team_names[side]);
        Some((token, delay))
    }

    /// Final picks, once all turns are done.
    pub fn result(&self) -> Option<DraftResult> {
        if self.phase != DraftPhase::Complete {
            return None;
        }
        Some(DraftResult {
            left_picks: self.teams.left.picks.clone(),
            right_picks: self.teams.right.picks.clone(),
            human_side: self.human_side?,
            completed_at: Utc::now(),
        })
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        let display_side = self
            .active_step()
            .map(|s| s.side)
            .or(self.human_side)
            .unwrap_or(Side::Left);
        DraftSnapshot {
            phase: self.phase,
            generation: self.generation,
            turn_index: self.turn_index,
            active_step: self.active_step(),
            main_seconds_remaining: self.clock.main(),
            reserve: self.clock.reserves().clone(),
            left: self.teams.left.clone(),
            right: self.teams.right.clone(),
            human_side: self.human_side,
            order: self.order,
            paused: self.paused,
            clock_display: self.clock.display(display_side),
            team_names: self.team_names.clone(),
            assignment: None,
        }
    }

    fn bot_choice<R: Rng>(&self, step: DraftStep, rng: &mut R) -> Option<&Hero> {
        let available = self.available();
        let own_picks = &self.teams[step.side].picks;
        let enemy_picks = &self.teams[step.side.opponent()].picks;
        let chosen = match (step.action, self.ban_strategy) {
            (DraftAction::Ban, BanStrategy::CounterBan) => {
                draft_bot::choose_counter_ban(&self.data, &available, enemy_picks, rng)
            }
            (action, _) => {
                let desired = match action {
                    DraftAction::Pick => desired_position(self.order.ordinal(self.turn_index)),
                    DraftAction::Ban => None,
                };
                let options = self.bot_options.clone().with_desired_position(desired);
                draft_bot::choose_hero(
                    &self.data,
                    &available,
                    own_picks,
                    enemy_picks,
                    action,
                    &options,
                    rng,
                )
            }
        };
        chosen.or_else(|| {
            warn!("Bot found no candidate, choosing at random");
            draft_bot::choose_random(&available, rng)
        })
    }

    fn commit(&mut self, hero: Hero, source: CommitSource) -> Commit {
        let step = self.order.step(self.turn_index);
        info!(
            "{} {} {} ({source:?})",
            self.team_names[step.side],
            step.action.past_tense(),
            hero.name
        );
        if !self.teams[step.side].push(step.action, hero.clone()) {
            warn!(
                "{} has no {} left in phase {}",
                self.team_names[step.side], step.action, step.phase
            );
        }
        self.turn_index += 1;
        self.clock.reset_turn();
        if self.turn_index >= DRAFT_LENGTH {
            info!("Draft #{} complete", self.generation);
            self.phase = DraftPhase::Complete;
        }
        Commit { step, hero, source }
    }

    fn start_drafting(&mut self, first: Side) {
        self.order = DraftOrder::with_first(first);
        self.phase = DraftPhase::Drafting;
        info!(
            "{} drafts first ({:?} order)",
            self.team_names[first], self.order
        );
    }

    fn expect_phase(
        &self,
        expected: DraftPhase,
        operation: &'static str,
    ) -> Result<Side, DraftError> {
        match (self.phase, self.human_side) {
            (phase, Some(side)) if phase == expected => Ok(side),
            (phase, _) => Err(DraftError::WrongPhase { operation, phase }),
        }
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.human_side = None;
        self.order = DraftOrder::default();
        self.turn_index = 0;
        self.teams = PerSide::default();
        self.clock = DraftClock::new(self.turn_seconds, self.reserve_seconds);
        self.paused = false;
    }
}
