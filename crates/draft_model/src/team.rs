use serde::{Deserialize, Serialize};

use crate::{DraftAction, Hero, HeroId};

pub const MAX_PICKS: usize = 5;
pub const MAX_BANS: usize = 7;

/// Append-only record of one side's draft.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDraftState {
    pub picks: Vec<Hero>,
    pub bans: Vec<Hero>,
}

impl TeamDraftState {
    /// Returns false (and leaves the state untouched) when the list is already full.
    pub fn push(&mut self, action: DraftAction, hero: Hero) -> bool {
        let (list, max) = match action {
            DraftAction::Ban => (&mut self.bans, MAX_BANS),
            DraftAction::Pick => (&mut self.picks, MAX_PICKS),
        };
        if list.len() >= max {
            return false;
        }
        list.push(hero);
        true
    }

    pub fn contains(&self, id: &HeroId) -> bool {
        self.all().any(|h| &h.id == id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Hero> {
        self.picks.iter().chain(self.bans.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attribute;

    fn hero(id: &str) -> Hero {
        Hero::new(id, id, Attribute::Strength)
    }

    #[test]
    fn push_respects_limits() {
        let mut team = TeamDraftState::default();
        for i in 0..MAX_PICKS {
            assert!(team.push(DraftAction::Pick, hero(&format!("p{i}"))));
        }
        assert!(!team.push(DraftAction::Pick, hero("extra")));
        assert_eq!(team.picks.len(), MAX_PICKS);
        assert!(team.push(DraftAction::Ban, hero("b0")));
        assert!(team.contains(&HeroId::from("b0")));
        assert!(!team.contains(&HeroId::from("extra")));
    }
}
