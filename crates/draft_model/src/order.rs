use serde::{Deserialize, Serialize};

use crate::{DraftAction, Side};

pub const DRAFT_LENGTH: usize = 24;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStep {
    /// 1-indexed position of the turn within the draft.
    pub phase: u8,
    pub action: DraftAction,
    pub side: Side,
}

const fn step(phase: u8, action: DraftAction, side: Side) -> DraftStep {
    DraftStep {
        phase,
        action,
        side,
    }
}

use DraftAction::{Ban, Pick};
use Side::{Left, Right};

const PRIMARY: [DraftStep; DRAFT_LENGTH] = [
    step(1, Ban, Left),
    step(2, Ban, Right),
    step(3, Ban, Right),
    step(4, Ban, Left),
    step(5, Ban, Right),
    step(6, Ban, Right),
    step(7, Ban, Left),
    step(8, Pick, Left),
    step(9, Pick, Right),
    step(10, Ban, Left),
    step(11, Ban, Left),
    step(12, Ban, Right),
    step(13, Pick, Right),
    step(14, Pick, Left),
    step(15, Pick, Left),
    step(16, Pick, Right),
    step(17, Pick, Right),
    step(18, Pick, Left),
    step(19, Ban, Left),
    step(20, Ban, Right),
    step(21, Ban, Right),
    step(22, Ban, Left),
    step(23, Pick, Left),
    step(24, Pick, Right),
];

/// The two fixed captains-mode orderings. `Alternate` is `Primary` with the sides swapped at
/// every step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftOrder {
    #[default]
    Primary,
    Alternate,
}

impl DraftOrder {
    /// Ordering whose first action belongs to `side`.
    pub fn with_first(side: Side) -> Self {
        if PRIMARY[0].side == side {
            DraftOrder::Primary
        } else {
            DraftOrder::Alternate
        }
    }

    pub fn step(self, index: usize) -> DraftStep {
        let step = PRIMARY[index];
        match self {
            DraftOrder::Primary => step,
            DraftOrder::Alternate => DraftStep {
                side: step.side.opponent(),
                ..step
            },
        }
    }

    pub fn get(self, index: usize) -> Option<DraftStep> {
        (index < DRAFT_LENGTH).then(|| self.step(index))
    }

    pub fn steps(self) -> impl Iterator<Item = DraftStep> {
        (0..DRAFT_LENGTH).map(move |i| self.step(i))
    }

    /// How many turns of the same side and action precede `index`.
    /// For a pick turn this is the team's pick number (0 for its first pick).
    pub fn ordinal(self, index: usize) -> usize {
        let Some(current) = self.get(index) else {
            return 0;
        };
        self.steps()
            .take(index)
            .filter(|s| s.side == current.side && s.action == current.action)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_opens_with_left_ban() {
        assert_eq!(DraftOrder::Primary.step(0), step(1, Ban, Left));
        assert_eq!(DraftOrder::Alternate.step(0), step(1, Ban, Right));
        assert_eq!(DraftOrder::with_first(Right), DraftOrder::Alternate);
    }

    #[test]
    fn alternate_swaps_every_side() {
        for (p, a) in DraftOrder::Primary.steps().zip(DraftOrder::Alternate.steps()) {
            assert_eq!(p.phase, a.phase);
            assert_eq!(p.action, a.action);
            assert_eq!(p.side, a.side.opponent());
        }
    }

    #[test]
    fn phases_are_sequential() {
        for (i, s) in DraftOrder::Primary.steps().enumerate() {
            assert_eq!(s.phase as usize, i + 1);
        }
        assert_eq!(DraftOrder::Primary.get(DRAFT_LENGTH), None);
    }

    #[test]
    fn each_side_has_five_picks_and_seven_bans() {
        for order in [DraftOrder::Primary, DraftOrder::Alternate] {
            for side in Side::ALL {
                let picks = order
                    .steps()
                    .filter(|s| s.side == side && s.action == Pick)
                    .count();
                let bans = order
                    .steps()
                    .filter(|s| s.side == side && s.action == Ban)
                    .count();
                assert_eq!(picks, 5);
                assert_eq!(bans, 7);
            }
        }
    }

    #[test]
    fn with_first_places_side_at_phase_one() {
        for side in Side::ALL {
            assert_eq!(DraftOrder::with_first(side).step(0).side, side);
        }
    }

    #[test]
    fn pick_ordinals() {
        // Left picks at phases 8, 14, 15, 18, 23.
        let order = DraftOrder::Primary;
        assert_eq!(order.ordinal(7), 0);
        assert_eq!(order.ordinal(13), 1);
        assert_eq!(order.ordinal(14), 2);
        assert_eq!(order.ordinal(17), 3);
        assert_eq!(order.ordinal(22), 4);
        // Right's first pick is phase 9.
        assert_eq!(order.ordinal(8), 0);
    }
}
