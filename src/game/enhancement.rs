//! Weapon enhancement: a spirit-stone fee buys one roll against a success
//! rate that shrinks as the weapon's level grows.
//!
//! The fee is charged on every attempt, successful or not. Buying in the
//! shop, by contrast, only charges when the purchase goes through.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::errors::ActionError;
use crate::game::realm::Realm;
use crate::game::types::{PlayerRecord, Rarity, WeaponType, MAX_ENHANCEMENT_LEVEL};

const TABLE_LEN: usize = MAX_ENHANCEMENT_LEVEL as usize + 1;

/// Cost, success chance and reward of each enhancement step.
///
/// `success_rates` and `costs` are indexed by the weapon's current level.
/// `attack_bonuses` is indexed by the level being reached, so entry 0 is
/// always zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementTable {
    pub success_rates: Vec<u8>,
    pub costs: Vec<u64>,
    pub attack_bonuses: Vec<u32>,
}

impl Default for EnhancementTable {
    fn default() -> Self {
        Self {
            success_rates: vec![
                100, 95, 90, 85, 80, 75, 70, 65, 60, 55, 50, 30, 20, 10, 5, 4, 3, 3, 2, 1, 1,
            ],
            costs: vec![
                100, 200, 300, 450, 600, 800, 1_000, 1_500, 2_000, 2_500, 3_000, 4_000, 5_000,
                7_000, 10_000, 15_000, 20_000, 25_000, 30_000, 35_000, 40_000,
            ],
            attack_bonuses: vec![
                0, 10, 25, 45, 70, 100, 135, 175, 220, 270, 325, 385, 450, 520, 595, 675, 760,
                850, 945, 1_045, 1_150,
            ],
        }
    }
}

impl EnhancementTable {
    pub fn success_rate(&self, level: u8) -> u8 {
        self.success_rates[level as usize]
    }

    pub fn cost(&self, level: u8) -> u64 {
        self.costs[level as usize]
    }

    /// Attack gained when a weapon reaches `level`.
    pub fn attack_bonus(&self, level: u8) -> u32 {
        self.attack_bonuses[level as usize]
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.success_rates.len() != TABLE_LEN
            || self.costs.len() != TABLE_LEN
            || self.attack_bonuses.len() != TABLE_LEN
        {
            return Err(format!("enhancement tables need {} entries each", TABLE_LEN));
        }
        if self.success_rates.iter().any(|r| *r == 0 || *r > 100) {
            return Err("success rates must lie in 1..=100".into());
        }
        if self.success_rates.windows(2).any(|w| w[1] > w[0]) {
            return Err("success rates must not increase with level".into());
        }
        if self.costs.windows(2).any(|w| w[1] < w[0]) {
            return Err("enhancement costs must not decrease with level".into());
        }
        if self.attack_bonuses[0] != 0 {
            return Err("attack bonus for level 0 must be 0".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhanceOutcome {
    pub weapon: String,
    pub success: bool,
    pub success_rate: u8,
    pub cost: u64,
    pub old_level: u8,
    pub new_level: u8,
    pub old_attack: u32,
    pub new_attack: u32,
    pub remaining_spirit_stones: u64,
}

/// Attempts to raise `weapon_name` by one level.
pub fn enhance<R: Rng + ?Sized>(
    player: &mut PlayerRecord,
    weapon_name: &str,
    table: &EnhancementTable,
    rng: &mut R,
) -> Result<EnhanceOutcome, ActionError> {
    let Some(weapon_name) = player.owned_weapon_name(weapon_name).map(str::to_string) else {
        return Err(ActionError::WeaponNotOwned(weapon_name.to_string()));
    };
    let Some(weapon) = player.weapon(&weapon_name) else {
        return Err(ActionError::WeaponNotOwned(weapon_name));
    };
    let level = weapon.enhancement_level;
    if level >= MAX_ENHANCEMENT_LEVEL {
        return Err(ActionError::MaxLevelReached {
            weapon: weapon.name.clone(),
            level,
        });
    }
    let cost = table.cost(level);
    let rate = table.success_rate(level);
    let old_attack = weapon.attack;

    player.inventory.spend_spirit_stones(cost)?;

    let success = rng.gen_range(1..=100u8) <= rate;
    let mut new_level = level;
    let mut new_attack = old_attack;
    if success {
        new_level = level + 1;
        new_attack = old_attack.saturating_add(table.attack_bonus(new_level));
        if let Some(weapon) = player.weapon_mut(&weapon_name) {
            weapon.enhancement_level = new_level;
            weapon.attack = new_attack;
        }
    }

    Ok(EnhanceOutcome {
        weapon: weapon_name,
        success,
        success_rate: rate,
        cost,
        old_level: level,
        new_level,
        old_attack,
        new_attack,
        remaining_spirit_stones: player.inventory.spirit_stones,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextEnhancement {
    pub cost: u64,
    pub success_rate: u8,
    pub attack_bonus: u32,
}

/// An owned weapon together with what its next enhancement would take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponDetails {
    pub name: String,
    pub weapon_type: WeaponType,
    pub rarity: Rarity,
    pub required_realm: Realm,
    pub attack: u32,
    pub enhancement_level: u8,
    pub equipped: bool,
    pub next: Option<NextEnhancement>,
}

/// Details for one owned weapon, or for all of them when `name` is `None`.
pub fn weapon_details(
    player: &PlayerRecord,
    name: Option<&str>,
    table: &EnhancementTable,
) -> Result<Vec<WeaponDetails>, ActionError> {
    let weapons: Vec<_> = match name {
        Some(name) => vec![player
            .weapon(name)
            .ok_or_else(|| ActionError::WeaponNotOwned(name.to_string()))?],
        None => player.inventory.weapons.values().collect(),
    };
    Ok(weapons
        .into_iter()
        .map(|w| WeaponDetails {
            name: w.name.clone(),
            weapon_type: w.weapon_type,
            rarity: w.rarity,
            required_realm: w.required_realm,
            attack: w.attack,
            enhancement_level: w.enhancement_level,
            equipped: player.equipped_weapon.as_deref() == Some(w.name.as_str()),
            next: (w.enhancement_level < MAX_ENHANCEMENT_LEVEL).then(|| NextEnhancement {
                cost: table.cost(w.enhancement_level),
                success_rate: table.success_rate(w.enhancement_level),
                attack_bonus: table.attack_bonus(w.enhancement_level + 1),
            }),
        })
        .collect())
}
