use chrono::{DateTime, Utc};
use draft_model::{DraftOrder, DraftStep, Hero, PerSide, Side, TeamDraftState};
use serde::Serialize;

use super::session::DraftPhase;

/// Everything a host needs to render the draft screen.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub phase: DraftPhase,
    pub generation: u64,
    pub turn_index: usize,
    pub active_step: Option<DraftStep>,
    pub main_seconds_remaining: u32,
    pub reserve: PerSide<u32>,
    pub left: TeamDraftState,
    pub right: TeamDraftState,
    pub human_side: Option<Side>,
    pub order: DraftOrder,
    pub paused: bool,
    pub clock_display: String,
    pub team_names: PerSide<String>,
    pub assignment: Option<SlotBoardView>,
}

impl DraftSnapshot {
    pub fn team(&self, side: Side) -> &TeamDraftState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn is_human_turn(&self) -> bool {
        self.active_step
            .is_some_and(|step| Some(step.side) == self.human_side)
    }
}

/// Final picks handed over to hero assignment.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftResult {
    pub left_picks: Vec<Hero>,
    pub right_picks: Vec<Hero>,
    pub human_side: Side,
    pub completed_at: DateTime<Utc>,
}

impl DraftResult {
    pub fn picks(&self, side: Side) -> &[Hero] {
        match side {
            Side::Left => &self.left_picks,
            Side::Right => &self.right_picks,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub player: String,
    pub hero: Option<Hero>,
    pub human: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotBoardView {
    pub slots: PerSide<Vec<SlotView>>,
    /// Heroes of each side not yet given to a slot.
    pub pools: PerSide<Vec<Hero>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignedSlot {
    pub player: String,
    pub hero: Hero,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignedSlots {
    pub left: Vec<AssignedSlot>,
    pub right: Vec<AssignedSlot>,
}
