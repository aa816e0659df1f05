use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Result};
use draft_bot::BotOptions;
use draft_model::{PerSide, Side};
use serde::{Deserialize, Serialize};

use crate::draft::assignment::SLOTS_PER_SIDE;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_left_team_name")]
    pub left_team_name: String,

    #[serde(default = "default_right_team_name")]
    pub right_team_name: String,

    /// Roster slot labels shown during hero assignment. Empty entries become "Player N".
    #[serde(default = "default_players")]
    pub left_players: Vec<String>,

    #[serde(default = "default_players")]
    pub right_players: Vec<String>,

    #[serde(default = "default_turn_seconds")]
    pub turn_seconds: u32,

    #[serde(default = "default_reserve_seconds")]
    pub reserve_seconds: u32,

    /// Wall-clock length of one clock second. Every draft delay scales with it.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    #[serde(default = "default_true")]
    pub captains_mode: bool,

    #[serde(default = "default_true")]
    pub enable_counter_pick: bool,

    #[serde(default = "default_ban_strategy")]
    pub ban_strategy: BanStrategy,

    #[serde(default)]
    pub seed: Option<u64>,

    /// Directory with `heroes.yaml`, `matchups.yaml` and `roles.yaml` replacing the bundled
    /// tables.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_left_team_name() -> String {
    "Radiant".into()
}

fn default_right_team_name() -> String {
    "Dire".into()
}

fn default_players() -> Vec<String> {
    vec![String::new(); SLOTS_PER_SIDE]
}

fn default_turn_seconds() -> u32 {
    30
}

fn default_reserve_seconds() -> u32 {
    130
}

fn default_tick_millis() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_ban_strategy() -> BanStrategy {
    BanStrategy::CounterBan
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left_team_name: default_left_team_name(),
            right_team_name: default_right_team_name(),
            left_players: default_players(),
            right_players: default_players(),
            turn_seconds: default_turn_seconds(),
            reserve_seconds: default_reserve_seconds(),
            tick_millis: default_tick_millis(),
            captains_mode: true,
            enable_counter_pick: true,
            ban_strategy: default_ban_strategy(),
            seed: None,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.turn_seconds > 0, "turnSeconds must be positive");
        ensure!(self.tick_millis > 0, "tickMillis must be positive");
        ensure!(
            !self.left_team_name.trim().is_empty() && !self.right_team_name.trim().is_empty(),
            "Team names must not be empty"
        );
        Ok(())
    }

    pub fn team_name(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left_team_name,
            Side::Right => &self.right_team_name,
        }
    }

    pub fn team_names(&self) -> PerSide<String> {
        PerSide::new(self.left_team_name.clone(), self.right_team_name.clone())
    }

    pub fn player_label(&self, side: Side, slot: usize) -> String {
        let players = match side {
            Side::Left => &self.left_players,
            Side::Right => &self.right_players,
        };
        match players.get(slot).map(|p| p.trim()) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("Player {}", slot + 1),
        }
    }

    pub fn player_labels(&self) -> PerSide<Vec<String>> {
        PerSide::splat(()).map(|side, _| {
            (0..SLOTS_PER_SIDE)
                .map(|slot| self.player_label(side, slot))
                .collect()
        })
    }

    pub fn bot_options(&self) -> BotOptions {
        BotOptions {
            captains_mode: self.captains_mode,
            prefer_counter: self.enable_counter_pick,
            desired_position: None,
        }
    }

    /// Converts a delay expressed in clock milliseconds into wall-clock time.
    pub fn scaled(&self, clock_millis: u64) -> Duration {
        Duration::from_millis(clock_millis.saturating_mul(self.tick_millis) / 1000)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

/// How bots choose bans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BanStrategy {
    /// Deny whatever counters the opponent's picks, uniformly random before any are made.
    CounterBan,
    /// The general ban heuristic (captains-mode counters, weak-hero penalty).
    Heuristic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.turn_seconds, 30);
        assert_eq!(config.reserve_seconds, 130);
        assert_eq!(config.ban_strategy, BanStrategy::CounterBan);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = serde_yaml::from_str(
            "leftTeamName: Sentinel\ntickMillis: 10\nbanStrategy: heuristic\nleftPlayers: [j, bixkog]\n",
        )
        .unwrap();
        assert_eq!(config.team_name(Side::Left), "Sentinel");
        assert_eq!(config.team_name(Side::Right), "Dire");
        assert_eq!(config.ban_strategy, BanStrategy::Heuristic);
        assert_eq!(config.scaled(1500), Duration::from_millis(15));
        assert_eq!(config.player_label(Side::Left, 1), "bixkog");
        assert_eq!(config.player_label(Side::Left, 3), "Player 4");
        assert_eq!(config.player_label(Side::Right, 0), "Player 1");
    }

    #[test]
    fn validate_rejects_broken_values() {
        let config = Config {
            turn_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = Config {
            tick_millis: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = Config {
            right_team_name: " ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bot_options_follow_config() {
        let config = Config {
            captains_mode: false,
            enable_counter_pick: false,
            ..Default::default()
        };
        let options = config.bot_options();
        assert!(!options.captains_mode);
        assert!(!options.prefer_counter);
    }
}
