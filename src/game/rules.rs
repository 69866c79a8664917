use serde::{Deserialize, Serialize};

use crate::game::catalog::RewardRange;
use crate::game::cooldown::Cooldowns;

/// Tunable numbers that are not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    #[serde(default)]
    pub cooldowns: Cooldowns,
    /// One point of spiritual power comes back per this many seconds.
    #[serde(default = "default_regen_interval_secs")]
    pub regen_interval_secs: u64,
    /// Added to maximum spiritual power on every breakthrough.
    #[serde(default = "default_breakthrough_power_bonus")]
    pub breakthrough_power_bonus: u32,
    #[serde(default)]
    pub meditation: MeditationRules,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

fn default_regen_interval_secs() -> u64 {
    5
}

fn default_breakthrough_power_bonus() -> u32 {
    50
}

fn default_leaderboard_size() -> usize {
    20
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            cooldowns: Cooldowns::default(),
            regen_interval_secs: default_regen_interval_secs(),
            breakthrough_power_bonus: default_breakthrough_power_bonus(),
            meditation: MeditationRules::default(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationRules {
    pub spirit_cost: u32,
    pub exp: RewardRange,
    /// Spiritual power restored after a session that did not break through.
    pub recovery: RewardRange,
}

impl Default for MeditationRules {
    fn default() -> Self {
        Self {
            spirit_cost: 5,
            exp: RewardRange::new(15, 30),
            recovery: RewardRange::new(2, 8),
        }
    }
}

impl GameRules {
    pub fn validate(&self) -> Result<(), String> {
        if self.regen_interval_secs == 0 {
            return Err("regen_interval_secs must be at least 1".into());
        }
        if self.leaderboard_size == 0 {
            return Err("leaderboard_size must be at least 1".into());
        }
        let m = &self.meditation;
        if m.exp.min > m.exp.max || m.recovery.min > m.recovery.max {
            return Err("meditation ranges must have min <= max".into());
        }
        Ok(())
    }
}
