//! The cooldown-and-cost gate every action passes through before it may
//! touch a player record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::errors::{ActionError, Resource};
use crate::game::types::PlayerRecord;

/// Timed actions, each with its own last-performed timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Meditation,
    HerbGathering,
    Mining,
    DungeonChallenge,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Meditation,
        ActionKind::HerbGathering,
        ActionKind::Mining,
        ActionKind::DungeonChallenge,
    ];
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Meditation => "meditation",
            ActionKind::HerbGathering => "herb gathering",
            ActionKind::Mining => "mining",
            ActionKind::DungeonChallenge => "dungeon challenge",
        })
    }
}

/// Per-action cooldowns in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldowns {
    #[serde(default = "default_meditation_secs")]
    pub meditation_secs: u64,
    #[serde(default = "default_herb_gathering_secs")]
    pub herb_gathering_secs: u64,
    #[serde(default = "default_mining_secs")]
    pub mining_secs: u64,
    #[serde(default = "default_dungeon_secs")]
    pub dungeon_secs: u64,
}

fn default_meditation_secs() -> u64 {
    60
}

fn default_herb_gathering_secs() -> u64 {
    180
}

fn default_mining_secs() -> u64 {
    120
}

fn default_dungeon_secs() -> u64 {
    600
}

impl Default for Cooldowns {
    fn default() -> Self {
        Self {
            meditation_secs: default_meditation_secs(),
            herb_gathering_secs: default_herb_gathering_secs(),
            mining_secs: default_mining_secs(),
            dungeon_secs: default_dungeon_secs(),
        }
    }
}

impl Cooldowns {
    pub fn seconds_for(&self, action: ActionKind) -> u64 {
        match action {
            ActionKind::Meditation => self.meditation_secs,
            ActionKind::HerbGathering => self.herb_gathering_secs,
            ActionKind::Mining => self.mining_secs,
            ActionKind::DungeonChallenge => self.dungeon_secs,
        }
    }
}

/// Whole seconds left before an action last performed at `last` may run
/// again. A timestamp in the future counts as zero elapsed time.
pub fn remaining_secs(last: Option<DateTime<Utc>>, cooldown_secs: u64, now: DateTime<Utc>) -> u64 {
    let Some(last) = last else {
        return 0;
    };
    let elapsed = (now - last).num_seconds().max(0) as u64;
    cooldown_secs.saturating_sub(elapsed)
}

/// Fails with `CooldownNotElapsed` while the action is cooling down.
pub fn check_cooldown(
    player: &PlayerRecord,
    action: ActionKind,
    cooldowns: &Cooldowns,
    now: DateTime<Utc>,
) -> Result<(), ActionError> {
    let remaining = remaining_secs(
        player.last_action_at(action),
        cooldowns.seconds_for(action),
        now,
    );
    if remaining > 0 {
        return Err(ActionError::CooldownNotElapsed {
            action,
            remaining_secs: remaining,
        });
    }
    Ok(())
}

/// Fails with `InsufficientResource` when the player cannot pay `cost`.
pub fn check_spiritual_power(player: &PlayerRecord, cost: u32) -> Result<(), ActionError> {
    if player.spiritual_power < cost {
        return Err(ActionError::InsufficientResource {
            resource: Resource::SpiritualPower,
            required: u64::from(cost),
            available: u64::from(player.spiritual_power),
        });
    }
    Ok(())
}

/// Deducts the (already checked) cost and starts the cooldown.
pub(crate) fn commit(player: &mut PlayerRecord, action: ActionKind, cost: u32, now: DateTime<Utc>) {
    player.spiritual_power -= cost;
    player.mark_action(action, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn no_timestamp_means_ready() {
        assert_eq!(remaining_secs(None, 180, Utc::now()), 0);
    }

    #[test]
    fn remaining_counts_whole_seconds() {
        let now = Utc::now();
        let last = now - Duration::milliseconds(59_500);
        assert_eq!(remaining_secs(Some(last), 60, now), 1);
        assert_eq!(remaining_secs(Some(now - Duration::seconds(60)), 60, now), 0);
        assert_eq!(remaining_secs(Some(now + Duration::seconds(30)), 60, now), 60);
    }

    #[test]
    fn gate_reports_action_and_remaining() {
        let now = Utc::now();
        let mut player = PlayerRecord::new(1, "lin", "Lin Dong", now);
        player.last_mining_time = Some(now - Duration::seconds(20));
        let err = check_cooldown(&player, ActionKind::Mining, &Cooldowns::default(), now)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::CooldownNotElapsed {
                action: ActionKind::Mining,
                remaining_secs: 100,
            }
        );
        assert!(check_cooldown(&player, ActionKind::Meditation, &Cooldowns::default(), now).is_ok());
    }

    #[test]
    fn spiritual_power_gate() {
        let mut player = PlayerRecord::new(1, "lin", "Lin Dong", Utc::now());
        player.spiritual_power = 4;
        assert!(matches!(
            check_spiritual_power(&player, 5),
            Err(ActionError::InsufficientResource { required: 5, available: 4, .. })
        ));
        assert!(check_spiritual_power(&player, 4).is_ok());
    }
}
