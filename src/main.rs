use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use captains_draft::draft::assignment::HUMAN_SLOT;
use captains_draft::draft::coin_toss::CoinFace;
use captains_draft::draft::message_bus::{Event, MessageBus, Update};
use captains_draft::draft::store;
use captains_draft::draft::ui_state::DraftSnapshot;
use captains_draft::draft::{Config, DraftEngine, DraftHandle, DraftPhase};
use captains_draft::logging;
use captains_draft::utils::{print_err, unwrap_or_def_verbose, ResultExt as _};
use clap::{Parser, Subcommand, ValueEnum};
use draft_bot::desired_position;
use draft_model::{DraftData, Hero, HeroId, Side};
use futures_util::StreamExt as _;
use itertools::Itertools;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

/// Captains mode draft against bots
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file. Defaults to config.yaml in the data directory
    #[clap(long, short, value_parser)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draft interactively, reading moves from stdin
    Play {
        #[clap(long, value_enum)]
        side: Option<SideArg>,

        /// Coin call made right after the side is chosen
        #[clap(long, value_enum, requires = "side")]
        call: Option<CallArg>,
    },
    /// Run a whole draft with a bot standing in for the human
    Simulate {
        #[clap(long, value_enum, default_value_t = SideArg::Left)]
        side: SideArg,

        #[clap(long)]
        seed: Option<u64>,

        /// Wall-clock length of one draft second
        #[clap(long, default_value_t = 20)]
        tick_ms: u64,

        /// Print events as JSON lines
        #[clap(long)]
        json: bool,
    },
    /// List the hero catalog
    Heroes,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(value: SideArg) -> Self {
        match value {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CallArg {
    Heads,
    Tails,
}

impl From<CallArg> for CoinFace {
    fn from(value: CallArg) -> Self {
        match value {
            CallArg::Heads => CoinFace::Heads,
            CallArg::Tails => CoinFace::Tails,
        }
    }
}

const PLAY_HELP: &str = "\
Commands:
  left | right        pick a side (also starts a new draft once finished)
  heads | tails       call the coin
  first | second      draft order after a won toss
  pick <hero>         commit a hero on your turn (bans too)
  slot <hero>         take a hero from your picks after the draft
  pause | resume      stop or restart the clock
  exit                leave the current draft
  quit                close the program";

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

fn names(heroes: &[Hero]) -> String {
    heroes.iter().map(|h| &h.name).join(", ")
}

fn describe(event: &Event, config: &Config) -> String {
    match event {
        Event::CoinTossed { call, outcome, won } => format!(
            "Coin landed {outcome} (called {call}), toss {}",
            if *won { "won" } else { "lost" }
        ),
        Event::OrderResolved { first, chosen_by } => format!(
            "{} drafts first, chosen by {}",
            config.team_name(*first),
            config.team_name(*chosen_by)
        ),
        Event::TurnStarted {
            phase,
            side,
            action,
            human,
        } => format!(
            "Turn {phase}: {} to {action}{}",
            config.team_name(*side),
            if *human { " (you)" } else { "" }
        ),
        Event::TurnCommitted {
            phase,
            side,
            action,
            hero,
            source,
        } => format!(
            "Turn {phase}: {} {} {} ({source:?})",
            config.team_name(*side),
            action.past_tense(),
            hero.name
        ),
        Event::ClockCue { side, cue } => format!("{} clock: {cue:?}", config.team_name(*side)),
        Event::DraftComplete(result) => format!(
            "Draft complete. {}: {}. {}: {}",
            config.team_name(Side::Left),
            names(&result.left_picks),
            config.team_name(Side::Right),
            names(&result.right_picks)
        ),
        Event::HeroAssigned {
            side,
            player,
            hero,
            ..
        } => format!("{} {player} plays {}", config.team_name(*side), hero.name),
        Event::AssignmentComplete(_) => "Hero assignment complete".into(),
    }
}

fn print_event(event: &Event, config: &Config, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("[{}] {}", timestamp(), describe(event, config));
    }
    Ok(())
}

fn prompt(event: &Event) {
    match event {
        Event::CoinTossed { won: true, .. } => println!("You won the toss: first or second?"),
        Event::TurnStarted {
            human: true,
            action,
            ..
        } => println!("Your {action}: pick <hero>"),
        Event::DraftComplete(result) => println!(
            "Choose your hero with slot <hero>: {}",
            result
                .picks(result.human_side)
                .iter()
                .map(|h| &h.id)
                .join(", ")
        ),
        Event::AssignmentComplete(_) => println!("Pick a side to draft again, or quit"),
        _ => {}
    }
}

/// Returns false once the user asks to quit.
fn dispatch_input(handle: &DraftHandle, line: &str) -> bool {
    let (verb, arg) = line
        .split_once(' ')
        .map(|(verb, arg)| (verb, arg.trim()))
        .unwrap_or((line, ""));
    match verb {
        "" => {}
        "quit" | "q" => return false,
        "help" | "?" => println!("{PLAY_HELP}"),
        "pause" => handle.pause(),
        "resume" => handle.resume(),
        "exit" => handle.exit(),
        "first" => handle.choose_go_first_or_second(true),
        "second" => handle.choose_go_first_or_second(false),
        "pick" | "ban" => handle.commit_human_choice(arg),
        "slot" => handle.choose_hero(arg),
        other => match (Side::from_str(other), CoinFace::from_str(other)) {
            (Some(side), _) => handle.select_side(side),
            (_, Some(call)) => handle.choose_coin_call(call),
            _ => println!("Unknown command {line:?}, try help"),
        },
    }
    true
}

async fn play(
    config: Config,
    data: Arc<DraftData>,
    side: Option<Side>,
    call: Option<CoinFace>,
) -> Result<()> {
    let message_bus = MessageBus::new();
    let handle = DraftHandle::new(message_bus.clone());
    let mut events = handle.subscribe().event_stream().boxed();
    let engine = DraftEngine::new(config.clone(), data, message_bus).start();

    println!("{PLAY_HELP}");
    match side {
        Some(side) => handle.select_side(side),
        None => println!("Choose a side: left or right"),
    }
    if let Some(call) = call {
        handle.choose_coin_call(call);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Cannot read stdin")? {
                Some(line) => {
                    if !dispatch_input(&handle, line.trim()) {
                        break;
                    }
                }
                None => break,
            },
            event = events.next() => match event {
                Some(Ok(event)) => {
                    print_event(&event, &config, false).print_err();
                    prompt(&event);
                }
                Some(Err(e)) => print_err(&e),
                None => break,
            },
        }
    }

    handle.shutdown();
    engine.await?;
    Ok(())
}

/// Hero the stand-in bot drafts for the human side, if it is the human's turn.
fn stand_in_choice<R: Rng>(
    data: &DraftData,
    config: &Config,
    snapshot: &DraftSnapshot,
    rng: &mut R,
) -> Option<HeroId> {
    let human = snapshot.human_side?;
    let step = snapshot.active_step.filter(|step| step.side == human)?;
    let available: Vec<&Hero> = data
        .heroes
        .all()
        .iter()
        .filter(|h| !snapshot.left.contains(&h.id) && !snapshot.right.contains(&h.id))
        .collect();
    let own = &snapshot.team(human).picks;
    let enemy = &snapshot.team(human.opponent()).picks;
    let options = config
        .bot_options()
        .with_desired_position(desired_position(own.len()));
    draft_bot::choose_hero(data, &available, own, enemy, step.action, &options, rng)
        .map(|hero| hero.id.clone())
}

async fn simulate(config: Config, data: Arc<DraftData>, side: Side, json: bool) -> Result<()> {
    let message_bus = MessageBus::new();
    let handle = DraftHandle::new(message_bus.clone());
    let mut events = handle.subscribe().event_stream().boxed();
    let mut updates = handle.subscribe().update_stream().boxed();
    let engine = DraftEngine::new(config.clone(), data.clone(), message_bus).start();
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };

    handle.select_side(side);
    handle.choose_coin_call(CoinFace::toss(&mut rng));

    let mut answered = None;
    let mut slot_taken = false;
    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => {
                    print_event(&event, &config, json)?;
                    match event {
                        Event::CoinTossed { won: true, .. } => {
                            handle.choose_go_first_or_second(rng.gen_bool(0.5))
                        }
                        Event::AssignmentComplete(_) => break,
                        _ => {}
                    }
                }
                Some(Err(e)) => print_err(&e),
                None => break,
            },
            update = updates.next() => match update {
                Some(Ok(Update::Snapshot(snapshot))) => {
                    let turn = (snapshot.generation, snapshot.turn_index);
                    if snapshot.phase == DraftPhase::Drafting
                        && snapshot.is_human_turn()
                        && answered != Some(turn)
                    {
                        if let Some(id) = stand_in_choice(&data, &config, &snapshot, &mut rng) {
                            debug!("Stand-in drafts {id}");
                            handle.commit_human_choice(id);
                            answered = Some(turn);
                        }
                    }
                    if let (Some(board), Some(human), false) =
                        (&snapshot.assignment, snapshot.human_side, slot_taken)
                    {
                        if board.slots[human][HUMAN_SLOT].hero.is_none() {
                            if let Some(hero) = board.pools[human].first() {
                                handle.choose_hero(hero.id.clone());
                                slot_taken = true;
                            }
                        }
                    }
                }
                Some(Err(e)) => print_err(&e),
                None => break,
            },
        }
    }

    handle.shutdown();
    engine.await?;
    Ok(())
}

fn list_heroes(data: &DraftData) -> Result<()> {
    let width = data
        .heroes
        .all()
        .iter()
        .map(|h| h.id.as_str().len())
        .max()
        .unwrap_or_default();
    for hero in data.heroes.all() {
        let role = data
            .roles
            .get(&hero.id)
            .map(|r| r.positions.iter().join(" "))
            .unwrap_or_else(|| "-".into());
        println!("{:width$} {} {role:9} {}", hero.id, hero.attribute, hero.name);
    }
    Ok(())
}

async fn terminate_on_signal() -> Result<()> {
    let mut interrupt = signal::unix::signal(signal::unix::SignalKind::interrupt())
        .context("Failed to register terminate signal handlers!")?;
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("Failed to register terminate signal handlers!")?;
    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
    }
    Ok(())
}

async fn run_until_signal(task: impl Future<Output = Result<()>>) -> Result<()> {
    tokio::select! {
        result = task => result,
        result = terminate_on_signal() => {
            info!("Terminating.");
            result
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _logger = logging::init();
    let mut config = match &args.config {
        Some(path) => store::load_config_from(path)?,
        None => unwrap_or_def_verbose(store::load_config()),
    };
    let data = store::load_draft_data(&config)?;

    match args.command {
        Command::Heroes => list_heroes(&data),
        Command::Play { side, call } => {
            run_until_signal(play(
                config,
                data,
                side.map(Side::from),
                call.map(CoinFace::from),
            ))
            .await
        }
        Command::Simulate {
            side,
            seed,
            tick_ms,
            json,
        } => {
            if seed.is_some() {
                config.seed = seed;
            }
            config.tick_millis = tick_ms;
            config.validate()?;
            run_until_signal(simulate(config, data, side.into(), json)).await
        }
    }
}
