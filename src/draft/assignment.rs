use draft_model::{Hero, HeroId, PerSide, Side};
use log::debug;
use rand::Rng;

use super::session::DraftError;
use super::ui_state::{AssignedSlot, AssignedSlots, DraftResult, SlotBoardView, SlotView};

pub const SLOTS_PER_SIDE: usize = 5;
/// Slot of the human's side the human fills personally.
pub const HUMAN_SLOT: usize = 0;

const CHAIN_BASE_MS: u64 = 600;
const CHAIN_STEP_MS: u64 = 600;
const CHAIN_JITTER_MS: u64 = 700;

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub side: Side,
    pub slot: usize,
    pub player: String,
    pub hero: Hero,
}

/// Post-draft board distributing each side's picks over its roster slots.
#[derive(Debug, Clone)]
pub struct AssignmentBoard {
    generation: u64,
    human_side: Side,
    players: PerSide<Vec<String>>,
    slots: PerSide<Vec<Option<Hero>>>,
    pools: PerSide<Vec<Hero>>,
}

impl AssignmentBoard {
    pub fn new(result: &DraftResult, players: PerSide<Vec<String>>, generation: u64) -> Self {
        Self {
            generation,
            human_side: result.human_side,
            players,
            slots: PerSide::splat(vec![None; SLOTS_PER_SIDE]),
            pools: PerSide::new(result.left_picks.clone(), result.right_picks.clone()),
        }
    }

    /// Draft session the board was created for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pool(&self, side: Side) -> &[Hero] {
        &self.pools[side]
    }

    /// Fills the human's slot with a hero from the human side's remaining pool.
    pub fn choose_hero(&mut self, id: &HeroId) -> Result<Assignment, DraftError> {
        let side = self.human_side;
        if self.slots[side][HUMAN_SLOT].is_some() {
            return Err(DraftError::HumanSlotFilled);
        }
        let position = self.pools[side]
            .iter()
            .position(|h| &h.id == id)
            .ok_or_else(|| DraftError::NotInPool(id.clone()))?;
        let hero = self.pools[side].remove(position);
        Ok(self.fill(side, HUMAN_SLOT, hero))
    }

    /// Gives the next empty bot slot of `side` a hero drawn uniformly from that side's pool.
    pub fn assign_next<R: Rng>(&mut self, side: Side, rng: &mut R) -> Option<Assignment> {
        let slot = self.next_bot_slot(side)?;
        let pool = &mut self.pools[side];
        if pool.is_empty() {
            return None;
        }
        let hero = pool.swap_remove(rng.gen_range(0..pool.len()));
        Some(self.fill(side, slot, hero))
    }

    pub fn bot_slots_remaining(&self, side: Side) -> usize {
        self.bot_slots(side)
            .filter(|&slot| self.slots[side][slot].is_none())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|(_, s)| s.iter().all(Option::is_some))
    }

    /// Final roster; `None` until every slot is filled.
    pub fn assigned(&self) -> Option<AssignedSlots> {
        let side_slots = |side: Side| -> Option<Vec<AssignedSlot>> {
            self.slots[side]
                .iter()
                .enumerate()
                .map(|(slot, hero)| {
                    hero.clone().map(|hero| AssignedSlot {
                        player: self.player(side, slot),
                        hero,
                    })
                })
                .collect()
        };
        Some(AssignedSlots {
            left: side_slots(Side::Left)?,
            right: side_slots(Side::Right)?,
        })
    }

    pub fn view(&self) -> SlotBoardView {
        SlotBoardView {
            slots: self.slots.clone().map(|side, slots| {
                slots
                    .into_iter()
                    .enumerate()
                    .map(|(slot, hero)| SlotView {
                        player: self.player(side, slot),
                        hero,
                        human: self.is_human_slot(side, slot),
                    })
                    .collect()
            }),
            pools: self.pools.clone(),
        }
    }

    fn fill(&mut self, side: Side, slot: usize, hero: Hero) -> Assignment {
        debug!("{side} slot {slot} gets {}", hero.id);
        self.slots[side][slot] = Some(hero.clone());
        Assignment {
            side,
            slot,
            player: self.player(side, slot),
            hero,
        }
    }

    fn player(&self, side: Side, slot: usize) -> String {
        self.players[side]
            .get(slot)
            .cloned()
            .unwrap_or_else(|| format!("Player {}", slot + 1))
    }

    fn is_human_slot(&self, side: Side, slot: usize) -> bool {
        side == self.human_side && slot == HUMAN_SLOT
    }

    fn bot_slots(&self, side: Side) -> impl Iterator<Item = usize> + '_ {
        (0..SLOTS_PER_SIDE).filter(move |&slot| !self.is_human_slot(side, slot))
    }

    fn next_bot_slot(&self, side: Side) -> Option<usize> {
        self.bot_slots(side)
            .find(|&slot| self.slots[side][slot].is_none())
    }
}

/// Wait before the `step`-th assignment of a side's chain, counted from the previous one, in
/// clock milliseconds. Later steps wait longer.
pub fn chain_delay<R: Rng>(step: usize, rng: &mut R) -> u64 {
    let step = step as u64;
    CHAIN_BASE_MS + step * (CHAIN_STEP_MS + rng.gen_range(0..CHAIN_JITTER_MS))
}
