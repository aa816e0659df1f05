use std::fmt::Display;

use draft_model::Side;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoinFace {
    Heads,
    Tails,
}

impl CoinFace {
    pub fn toss<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            CoinFace::Heads
        } else {
            CoinFace::Tails
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "heads" | "h" => Some(CoinFace::Heads),
            "tails" | "t" => Some(CoinFace::Tails),
            _ => None,
        }
    }
}

impl Display for CoinFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CoinFace::Heads => "heads",
            CoinFace::Tails => "tails",
        })
    }
}

/// Result of the human's call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinToss {
    pub call: CoinFace,
    pub outcome: CoinFace,
    /// Side drafting first when the bot decided it. `None` while the human still has to choose.
    pub first: Option<Side>,
}

impl CoinToss {
    pub fn won(&self) -> bool {
        self.call == self.outcome
    }
}

/// Tosses the coin for `human` and, if the call was wrong, lets the bot side decide on a coin
/// flip which side drafts first.
pub fn resolve<R: Rng>(call: CoinFace, human: Side, rng: &mut R) -> CoinToss {
    let outcome = CoinFace::toss(rng);
    let first = (call != outcome).then(|| {
        if rng.gen_bool(0.5) {
            human.opponent()
        } else {
            human
        }
    });
    CoinToss {
        call,
        outcome,
        first,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const N: usize = 1000;

    #[test]
    fn winner_chooses_later() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..N {
            let toss = resolve(CoinFace::Heads, Side::Left, &mut rng);
            assert_eq!(toss.won(), toss.first.is_none());
        }
    }

    #[test]
    fn toss_and_bot_choice_are_fair() {
        let mut rng = StdRng::seed_from_u64(2);
        let tosses: Vec<_> = (0..N)
            .map(|_| resolve(CoinFace::Tails, Side::Right, &mut rng))
            .collect();
        let won = tosses.iter().filter(|t| t.won()).count();
        assert!(won.abs_diff(N / 2) < N / 10, "won {won}");
        let lost = N - won;
        let bot_first = tosses
            .iter()
            .filter(|t| t.first == Some(Side::Left))
            .count();
        assert!(bot_first.abs_diff(lost / 2) < lost / 5, "bot first {bot_first}");
    }

    #[test]
    fn parse_call() {
        assert_eq!(CoinFace::from_str("Heads"), Some(CoinFace::Heads));
        assert_eq!(CoinFace::from_str("t"), Some(CoinFace::Tails));
        assert_eq!(CoinFace::from_str("edge"), None);
    }
}
