//! Turn-based dungeon combat.
//!
//! The player always strikes first. Each strike deals the attacker's power
//! minus the defender's defense, never less than 1. An opponent that drops
//! to zero HP does not strike back. The player's HP starts full at every
//! challenge and carries over between the monsters of a stage.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::game::catalog::{BossTemplate, Encounter, MonsterTemplate};
use crate::game::types::PlayerRecord;

/// The player's side of a fight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatStats {
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
}

impl CombatStats {
    pub fn of(player: &PlayerRecord) -> Self {
        Self {
            max_hp: player.max_hp,
            attack: player.total_attack(),
            defense: player.defense,
        }
    }
}

pub fn damage(attack: u32, defense: u32) -> u32 {
    attack.saturating_sub(defense).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    Encounter {
        opponent: String,
        boss: bool,
    },
    PlayerStrike {
        opponent: String,
        damage: u32,
        opponent_hp: i64,
    },
    OpponentStrike {
        opponent: String,
        skill: Option<String>,
        damage: u32,
        player_hp: i64,
    },
    OpponentDefeated {
        opponent: String,
    },
    PlayerDefeated {
        opponent: String,
    },
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::Encounter { opponent, boss: true } => {
                write!(f, "[Boss] {} bars the way!", opponent)
            }
            BattleEvent::Encounter { opponent, .. } => write!(f, "You encounter {}!", opponent),
            BattleEvent::PlayerStrike {
                opponent, damage, ..
            } => write!(f, "You deal {} damage to {}.", damage, opponent),
            BattleEvent::OpponentStrike {
                opponent,
                skill: Some(skill),
                damage,
                ..
            } => write!(f, "{} uses {} and deals {} damage to you.", opponent, skill, damage),
            BattleEvent::OpponentStrike {
                opponent, damage, ..
            } => write!(f, "{} deals {} damage to you.", opponent, damage),
            BattleEvent::OpponentDefeated { opponent } => write!(f, "{} is defeated.", opponent),
            BattleEvent::PlayerDefeated { opponent } => write!(f, "You fall before {}.", opponent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleReport {
    pub victory: bool,
    /// Player strikes made across the whole challenge.
    pub exchanges: u32,
    pub player_hp: i64,
    pub defeated: Vec<String>,
    pub events: Vec<BattleEvent>,
}

impl BattleReport {
    /// The battle as text, one line per event.
    pub fn log(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }
}

struct Opponent<'a> {
    name: &'a str,
    hp: i64,
    defense: u32,
    boss: Option<&'a BossTemplate>,
    attack: u32,
}

impl<'a> Opponent<'a> {
    fn monster(m: &'a MonsterTemplate) -> Self {
        Self {
            name: &m.name,
            hp: i64::from(m.hp),
            defense: m.defense,
            boss: None,
            attack: m.attack,
        }
    }

    fn boss(b: &'a BossTemplate) -> Self {
        Self {
            name: &b.name,
            hp: i64::from(b.hp),
            defense: b.defense,
            boss: Some(b),
            attack: b.attack,
        }
    }

    /// A boss picks one of its skills at random each turn.
    fn choose_strike<R: Rng + ?Sized>(&self, rng: &mut R) -> (Option<String>, u32) {
        match self.boss.and_then(|b| b.skills.choose(rng)) {
            Some(skill) => (Some(skill.name.clone()), skill.damage),
            None => (None, self.attack),
        }
    }
}

/// Fights through `encounter`, stopping at the first point the player's HP
/// reaches zero.
pub fn resolve<R: Rng + ?Sized>(
    player: &CombatStats,
    encounter: &Encounter,
    rng: &mut R,
) -> BattleReport {
    let opponents: Vec<Opponent<'_>> = match encounter {
        Encounter::Monsters(monsters) => monsters.iter().map(Opponent::monster).collect(),
        Encounter::Boss(boss) => vec![Opponent::boss(boss)],
    };

    let mut report = BattleReport {
        victory: false,
        exchanges: 0,
        player_hp: i64::from(player.max_hp),
        defeated: Vec::new(),
        events: Vec::new(),
    };

    for mut foe in opponents {
        report.events.push(BattleEvent::Encounter {
            opponent: foe.name.to_string(),
            boss: foe.boss.is_some(),
        });
        loop {
            let dealt = damage(player.attack, foe.defense);
            foe.hp -= i64::from(dealt);
            report.exchanges += 1;
            report.events.push(BattleEvent::PlayerStrike {
                opponent: foe.name.to_string(),
                damage: dealt,
                opponent_hp: foe.hp.max(0),
            });
            if foe.hp <= 0 {
                report.defeated.push(foe.name.to_string());
                report.events.push(BattleEvent::OpponentDefeated {
                    opponent: foe.name.to_string(),
                });
                break;
            }

            let (skill, power) = foe.choose_strike(rng);
            let taken = damage(power, player.defense);
            report.player_hp -= i64::from(taken);
            report.events.push(BattleEvent::OpponentStrike {
                opponent: foe.name.to_string(),
                skill,
                damage: taken,
                player_hp: report.player_hp.max(0),
            });
            if report.player_hp <= 0 {
                report.events.push(BattleEvent::PlayerDefeated {
                    opponent: foe.name.to_string(),
                });
                return report;
            }
        }
    }

    report.victory = true;
    report
}
