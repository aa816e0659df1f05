use std::pin::pin;
use std::sync::Arc;

use anyhow::Result;
use draft_model::{DraftData, HeroId, Side};
use futures_util::{Stream, StreamExt as _};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::utils::print_err;
use assignment::{chain_delay, Assignment, AssignmentBoard};
use coin_toss::CoinFace;
use message_bus::{DraftCommand, Event, Message, MessageBus, MessageBusSubscription};
use scheduler::{wait_until, JobQueue};
use session::{Commit, DraftSession, TickOutcome, TurnToken};

pub mod assignment;
pub mod clock;
pub mod coin_toss;
pub mod config;
pub mod message_bus;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod ui_state;

pub use config::{BanStrategy, Config};
pub use session::{DraftError, DraftPhase};

/// Hand-off from the finished draft to hero assignment, in clock milliseconds.
const HAND_OFF_DELAY_MS: u64 = 600;
/// Pause between the human's own slot and the rest of the human side's assignments.
const HUMAN_SIDE_CHAIN_DELAY_MS: u64 = 600;
const ASSIGNMENT_COMPLETE_DELAY_MS: u64 = 800;

#[derive(Debug, Clone)]
enum Job {
    BotMove(TurnToken),
    HandOff {
        generation: u64,
    },
    StartAssignments {
        side: Side,
        generation: u64,
    },
    Assign {
        side: Side,
        step: usize,
        generation: u64,
    },
    FinishAssignment {
        generation: u64,
    },
}

/// Single owner of the draft: applies commands from the bus, runs the clock and every delayed
/// bot action from one loop, and publishes snapshots and events back to the bus.
pub struct DraftEngine<R: Rng = StdRng> {
    config: Config,
    session: DraftSession,
    board: Option<AssignmentBoard>,
    jobs: JobQueue<Job>,
    message_bus: MessageBus,
    rng: R,
}

impl DraftEngine<StdRng> {
    pub fn new(config: Config, data: Arc<DraftData>, message_bus: MessageBus) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, data, message_bus, rng)
    }
}

impl<R: Rng + Send + 'static> DraftEngine<R> {
    pub fn with_rng(config: Config, data: Arc<DraftData>, message_bus: MessageBus, rng: R) -> Self {
        Self {
            session: DraftSession::new(data, &config),
            config,
            board: None,
            jobs: JobQueue::new(),
            message_bus,
            rng,
        }
    }

    /// Subscribes to commands and runs the engine on a new task.
    pub fn start(self) -> JoinHandle<()> {
        let commands = self.message_bus.subscribe().command_stream();
        tokio::spawn(self.run(commands))
    }

    async fn run(mut self, commands: impl Stream<Item = Result<DraftCommand>>) {
        info!("Draft engine started.");
        let mut commands = pin!(commands);
        let mut ticker = time::interval(self.config.tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = self.clock_state();
        self.publish_snapshot();

        loop {
            let deadline = self.jobs.next_deadline();
            tokio::select! {
                command = commands.next() => match command {
                    Some(Ok(DraftCommand::Shutdown)) | None => break,
                    Some(Ok(command)) => {
                        if let Err(e) = self.dispatch_command(command) {
                            debug!("Command rejected: {e}");
                            continue;
                        }
                    }
                    Some(Err(e)) => {
                        print_err(&e);
                        continue;
                    }
                },
                _ = ticker.tick(), if self.session.is_clock_running() => self.on_tick(),
                _ = wait_until(deadline) => self.run_due_jobs(),
            }

            let current = self.clock_state();
            if current != last {
                if current.1 {
                    // A new turn or a resumed clock gets a full second before the first tick.
                    ticker.reset();
                }
                if current.0 != last.0 {
                    self.on_turn_started();
                }
                last = current;
            }
            self.publish_snapshot();
        }
        self.jobs.clear();
        info!("Draft engine stopped.");
    }

    fn clock_state(&self) -> (Option<TurnToken>, bool) {
        (self.session.turn_token(), self.session.is_clock_running())
    }

    fn dispatch_command(&mut self, command: DraftCommand) -> Result<(), DraftError> {
        debug!("< {command:?}");
        match command {
            DraftCommand::SelectSide(side) => {
                self.session.select_side(side)?;
                self.cancel_scheduled();
            }
            DraftCommand::CoinCall(call) => self.coin_call(call)?,
            DraftCommand::GoFirst(go_first) => {
                let first = self.session.choose_go_first(go_first)?;
                if let Some(human) = self.session.human_side() {
                    self.send(Event::OrderResolved {
                        first,
                        chosen_by: human,
                    });
                }
            }
            DraftCommand::CommitHero(id) => {
                let commit = self.session.commit_human_choice(&id)?;
                self.on_commit(commit);
            }
            DraftCommand::ChooseHero(id) => self.choose_hero(&id)?,
            DraftCommand::Pause => self.session.set_paused(true),
            DraftCommand::Resume => self.session.set_paused(false),
            DraftCommand::Exit => {
                self.session.exit();
                self.cancel_scheduled();
            }
            DraftCommand::Shutdown => {}
        }
        Ok(())
    }

    fn coin_call(&mut self, call: CoinFace) -> Result<(), DraftError> {
        let toss = self.session.choose_coin_call(call, &mut self.rng)?;
        self.send(Event::CoinTossed {
            call: toss.call,
            outcome: toss.outcome,
            won: toss.won(),
        });
        if let (Some(first), Some(human)) = (toss.first, self.session.human_side()) {
            self.send(Event::OrderResolved {
                first,
                chosen_by: human.opponent(),
            });
        }
        Ok(())
    }

    fn choose_hero(&mut self, id: &HeroId) -> Result<(), DraftError> {
        let board = self.board.as_mut().ok_or(DraftError::NoAssignment)?;
        let assignment = board.choose_hero(id)?;
        let side = assignment.side;
        let generation = board.generation();
        self.on_assigned(assignment);
        self.jobs.schedule_in(
            self.config.scaled(HUMAN_SIDE_CHAIN_DELAY_MS),
            Job::StartAssignments { side, generation },
        );
        Ok(())
    }

    fn on_tick(&mut self) {
        match self.session.tick(&mut self.rng) {
            TickOutcome::Idle | TickOutcome::Running { cue: None, .. } => {}
            TickOutcome::Running {
                side,
                cue: Some(cue),
            } => self.send(Event::ClockCue { side, cue }),
            TickOutcome::Forced(commit) => self.on_commit(commit),
        }
    }

    fn on_turn_started(&mut self) {
        let Some(step) = self.session.active_step() else {
            return;
        };
        self.send(Event::TurnStarted {
            phase: step.phase,
            side: step.side,
            action: step.action,
            human: self.session.is_human_turn(),
        });
        if let Some((token, delay)) = self.session.plan_bot_think(&mut self.rng) {
            self.jobs
                .schedule_in(self.config.scaled(delay), Job::BotMove(token));
        }
    }

    fn on_commit(&mut self, commit: Commit) {
        let Commit { step, hero, source } = commit;
        self.send(Event::TurnCommitted {
            phase: step.phase,
            side: step.side,
            action: step.action,
            hero,
            source,
        });
        if self.session.result().is_some() {
            self.jobs.schedule_in(
                self.config.scaled(HAND_OFF_DELAY_MS),
                Job::HandOff {
                    generation: self.session.generation(),
                },
            );
        }
    }

    fn on_assigned(&mut self, assignment: Assignment) {
        let Assignment {
            side,
            slot,
            player,
            hero,
        } = assignment;
        self.send(Event::HeroAssigned {
            side,
            slot,
            player,
            hero,
        });
        if let Some(board) = &self.board {
            if board.is_complete() {
                let generation = board.generation();
                self.jobs.schedule_in(
                    self.config.scaled(ASSIGNMENT_COMPLETE_DELAY_MS),
                    Job::FinishAssignment { generation },
                );
            }
        }
    }

    fn run_due_jobs(&mut self) {
        let now = Instant::now();
        while let Some(job) = self.jobs.pop_due(now) {
            if let Err(e) = self.run_job(job) {
                debug!("Scheduled job dropped: {e}");
            }
        }
    }

    fn run_job(&mut self, job: Job) -> Result<(), DraftError> {
        match job {
            Job::BotMove(token) => {
                let commit = self.session.commit_bot(token, &mut self.rng)?;
                self.on_commit(commit);
            }
            Job::HandOff { generation } => self.hand_off(generation)?,
            Job::StartAssignments { side, generation } => {
                self.check_board(generation)?;
                self.schedule_assignment(side, 0, generation);
            }
            Job::Assign {
                side,
                step,
                generation,
            } => {
                self.check_board(generation)?;
                let Some(board) = self.board.as_mut() else {
                    return Err(DraftError::NoAssignment);
                };
                let Some(assignment) = board.assign_next(side, &mut self.rng) else {
                    return Ok(());
                };
                let more = board.bot_slots_remaining(side) > 0;
                self.on_assigned(assignment);
                if more {
                    self.schedule_assignment(side, step + 1, generation);
                }
            }
            Job::FinishAssignment { generation } => {
                self.check_board(generation)?;
                if let Some(assigned) = self.board.as_ref().and_then(AssignmentBoard::assigned) {
                    info!("Hero assignment complete");
                    self.send(Event::AssignmentComplete(assigned));
                }
            }
        }
        Ok(())
    }

    fn hand_off(&mut self, generation: u64) -> Result<(), DraftError> {
        if generation != self.session.generation() {
            return Err(DraftError::StaleTurn);
        }
        let Some(result) = self.session.result() else {
            return Err(DraftError::WrongPhase {
                operation: "hand off the draft",
                phase: self.session.phase(),
            });
        };
        info!("Handing the draft over to hero assignment");
        let human = result.human_side;
        self.board = Some(AssignmentBoard::new(
            &result,
            self.config.player_labels(),
            generation,
        ));
        self.send(Event::DraftComplete(result));
        self.schedule_assignment(human.opponent(), 0, generation);
        Ok(())
    }

    /// Queues the `step`-th assignment of `side`, counted from now.
    fn schedule_assignment(&mut self, side: Side, step: usize, generation: u64) {
        let delay = self.config.scaled(chain_delay(step, &mut self.rng));
        self.jobs.schedule_in(
            delay,
            Job::Assign {
                side,
                step,
                generation,
            },
        );
    }

    fn check_board(&self, generation: u64) -> Result<(), DraftError> {
        match &self.board {
            Some(board) if board.generation() == generation => Ok(()),
            Some(_) => Err(DraftError::StaleTurn),
            None => Err(DraftError::NoAssignment),
        }
    }

    fn cancel_scheduled(&mut self) {
        if !self.jobs.is_empty() {
            debug!("Cancelling {} scheduled jobs", self.jobs.len());
        }
        self.jobs.clear();
        self.board = None;
    }

    fn publish_snapshot(&self) {
        let mut snapshot = self.session.snapshot();
        snapshot.assignment = self.board.as_ref().map(AssignmentBoard::view);
        self.message_bus.send(snapshot);
    }

    fn send(&self, event: Event) {
        debug!("> {event:?}");
        self.message_bus.send(event);
    }
}

/// Typed front door to a running [`DraftEngine`].
#[derive(Clone)]
pub struct DraftHandle {
    message_bus: MessageBus,
}

impl DraftHandle {
    pub fn new(message_bus: MessageBus) -> Self {
        Self { message_bus }
    }

    pub fn select_side(&self, side: Side) {
        self.send(DraftCommand::SelectSide(side));
    }

    pub fn choose_coin_call(&self, call: CoinFace) {
        self.send(DraftCommand::CoinCall(call));
    }

    pub fn choose_go_first_or_second(&self, go_first: bool) {
        self.send(DraftCommand::GoFirst(go_first));
    }

    pub fn commit_human_choice(&self, hero: impl Into<HeroId>) {
        self.send(DraftCommand::CommitHero(hero.into()));
    }

    pub fn choose_hero(&self, hero: impl Into<HeroId>) {
        self.send(DraftCommand::ChooseHero(hero.into()));
    }

    pub fn pause(&self) {
        self.send(DraftCommand::Pause);
    }

    pub fn resume(&self) {
        self.send(DraftCommand::Resume);
    }

    pub fn exit(&self) {
        self.send(DraftCommand::Exit);
    }

    pub fn shutdown(&self) {
        self.send(DraftCommand::Shutdown);
    }

    pub fn subscribe(&self) -> MessageBusSubscription {
        self.message_bus.subscribe()
    }

    fn send(&self, command: DraftCommand) {
        self.message_bus.send(Message::Command(command));
    }
}
