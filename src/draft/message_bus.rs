use anyhow::Result;
use draft_model::{DraftAction, Hero, HeroId, Side};
use futures_util::{Stream, StreamExt};
use log::error;
use serde::Serialize;
use tokio::sync::broadcast::{Receiver, Sender};
use tokio_stream::wrappers::BroadcastStream;

use super::clock::ClockCue;
use super::coin_toss::CoinFace;
use super::ui_state::{AssignedSlots, DraftResult, DraftSnapshot};

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct MessageBus(Sender<Message>);

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(CHANNEL_CAPACITY);
        Self(sender)
    }

    pub fn send(&self, message: impl Into<Message>) {
        if let Err(message) = self.0.send(message.into()) {
            error!("Message not sent {:?}", message);
        }
    }

    pub fn subscribe(&self) -> MessageBusSubscription {
        MessageBusSubscription(self.0.subscribe())
    }
}

pub struct MessageBusSubscription(Receiver<Message>);

impl MessageBusSubscription {
    pub fn stream(self) -> impl Stream<Item = Result<Message>> {
        BroadcastStream::new(self.0).map(|r| r.map_err(anyhow::Error::from))
    }

    pub fn command_stream(self) -> impl Stream<Item = Result<DraftCommand>> {
        self.stream().filter_map(|r| async move {
            match r {
                Ok(Message::Command(command)) => Some(Ok(command)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    pub fn update_stream(self) -> impl Stream<Item = Result<Update>> {
        self.stream().filter_map(|r| async move {
            match r {
                Ok(Message::Update(update)) => Some(Ok(update)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    pub fn event_stream(self) -> impl Stream<Item = Result<Event>> {
        self.stream().filter_map(|r| async move {
            match r {
                Ok(Message::Event(event)) => Some(Ok(event)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }
}

#[derive(Clone, Debug)]
pub enum Message {
    Command(DraftCommand),
    Update(Update),
    Event(Event),
}

impl From<DraftCommand> for Message {
    fn from(value: DraftCommand) -> Self {
        Message::Command(value)
    }
}

impl From<DraftSnapshot> for Message {
    fn from(value: DraftSnapshot) -> Self {
        Message::Update(Update::Snapshot(value))
    }
}

impl From<Event> for Message {
    fn from(value: Event) -> Self {
        Message::Event(value)
    }
}

#[derive(Clone, Debug)]
pub enum DraftCommand {
    SelectSide(Side),
    CoinCall(CoinFace),
    /// `true` to draft first. Only valid after winning the coin toss.
    GoFirst(bool),
    CommitHero(HeroId),
    /// Fills the human's roster slot once the draft is over.
    ChooseHero(HeroId),
    Pause,
    Resume,
    /// Leaves the draft screen, dropping the session and everything scheduled for it.
    Exit,
    Shutdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Update {
    Snapshot(DraftSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitSource {
    Human,
    Bot,
    Timeout,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Event {
    CoinTossed {
        call: CoinFace,
        outcome: CoinFace,
        won: bool,
    },
    OrderResolved {
        first: Side,
        chosen_by: Side,
    },
    TurnStarted {
        phase: u8,
        side: Side,
        action: DraftAction,
        human: bool,
    },
    TurnCommitted {
        phase: u8,
        side: Side,
        action: DraftAction,
        hero: Hero,
        source: CommitSource,
    },
    ClockCue {
        side: Side,
        cue: ClockCue,
    },
    DraftComplete(DraftResult),
    HeroAssigned {
        side: Side,
        slot: usize,
        player: String,
        hero: Hero,
    },
    AssignmentComplete(AssignedSlots),
}
