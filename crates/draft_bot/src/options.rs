use draft_model::Position;
use serde::{Deserialize, Serialize};

/// Positions a team's successive picks aim for: mid first, then offlane, carry, hard support,
/// soft support.
pub const PICK_POSITION_SEQUENCE: [u8; 5] = [2, 3, 1, 5, 4];

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct BotOptions {
    pub captains_mode: bool,
    pub prefer_counter: bool,
    pub desired_position: Option<Position>,
}

impl Default for BotOptions {
    fn default() -> Self {
        Self {
            captains_mode: true,
            prefer_counter: true,
            desired_position: None,
        }
    }
}

impl BotOptions {
    pub fn with_desired_position(self, desired_position: Option<Position>) -> Self {
        Self {
            desired_position,
            ..self
        }
    }
}

/// Position requested by a team's `pick_number`-th pick (0-based).
pub fn desired_position(pick_number: usize) -> Option<Position> {
    PICK_POSITION_SEQUENCE
        .get(pick_number)
        .and_then(|&p| Position::new(p))
}
