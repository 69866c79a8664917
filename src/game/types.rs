use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::cooldown::ActionKind;
use crate::game::errors::{ActionError, Resource};
use crate::game::realm::{Realm, RealmThresholds};

pub const PLAYER_SCHEMA_VERSION: u8 = 1;

/// Highest level the enhancement curve reaches.
pub const MAX_ENHANCEMENT_LEVEL: u8 = 20;

/// Reward name that is credited to the currency balance rather than stored
/// as a material.
pub const SPIRIT_STONE: &str = "Spirit Stone";

pub const STARTING_SPIRITUAL_POWER: u32 = 100;
pub const STARTING_MAX_HP: u32 = 100;
pub const STARTING_ATTACK: u32 = 10;
pub const STARTING_DEFENSE: u32 = 5;

pub type PlayerId = u64;

/// Who is acting. Usernames and display names come from the chat platform and
/// are refreshed on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub id: PlayerId,
    pub username: String,
    pub display_name: String,
}

impl PlayerIdentity {
    pub fn new(id: PlayerId, username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Sword,
    Saber,
    Spear,
    Axe,
    Halberd,
    Hammer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Fine,
    Rare,
    Epic,
    Legendary,
    Divine,
    Artifact,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rarity::Common => "common",
            Rarity::Fine => "fine",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Divine => "divine",
            Rarity::Artifact => "artifact",
        })
    }
}

/// A weapon a player owns. Its attack grows with each successful enhancement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponInstance {
    pub name: String,
    pub weapon_type: WeaponType,
    pub attack: u32,
    pub rarity: Rarity,
    pub required_realm: Realm,
    pub enhancement_level: u8,
    pub acquired_at: DateTime<Utc>,
}

/// Everything a player carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub spirit_stones: u64,
    /// Sellable materials: herbs, graded stones and ores.
    #[serde(default)]
    pub materials: BTreeMap<String, u64>,
    /// Dungeon drops; kept apart because they can never be sold.
    #[serde(default)]
    pub dungeon_materials: BTreeMap<String, u64>,
    #[serde(default)]
    pub weapons: BTreeMap<String, WeaponInstance>,
}

impl Inventory {
    pub fn material_count(&self, name: &str) -> u64 {
        self.materials.get(name).copied().unwrap_or(0)
    }

    pub fn dungeon_material_count(&self, name: &str) -> u64 {
        self.dungeon_materials.get(name).copied().unwrap_or(0)
    }

    pub fn add_material(&mut self, name: &str, quantity: u64) {
        if quantity == 0 {
            return;
        }
        let slot = self.materials.entry(name.to_string()).or_insert(0);
        *slot = slot.saturating_add(quantity);
    }

    pub fn add_dungeon_material(&mut self, name: &str, quantity: u64) {
        if quantity == 0 {
            return;
        }
        let slot = self.dungeon_materials.entry(name.to_string()).or_insert(0);
        *slot = slot.saturating_add(quantity);
    }

    /// Removes `quantity` of a sellable material, dropping the entry once it
    /// reaches zero.
    pub fn remove_material(&mut self, name: &str, quantity: u64) -> Result<(), ActionError> {
        let available = self.material_count(name);
        if available < quantity {
            return Err(ActionError::InsufficientResource {
                resource: Resource::Material(name.to_string()),
                required: quantity,
                available,
            });
        }
        if available == quantity {
            self.materials.remove(name);
        } else {
            self.materials.insert(name.to_string(), available - quantity);
        }
        Ok(())
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        self.spirit_stones >= amount
    }

    pub fn spend_spirit_stones(&mut self, amount: u64) -> Result<(), ActionError> {
        if !self.can_afford(amount) {
            return Err(ActionError::InsufficientCurrency {
                required: amount,
                available: self.spirit_stones,
            });
        }
        self.spirit_stones -= amount;
        Ok(())
    }

    pub fn add_spirit_stones(&mut self, amount: u64) {
        self.spirit_stones = self.spirit_stones.saturating_add(amount);
    }
}

/// One player's persistent cultivation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub username: String,
    pub display_name: String,
    pub realm: Realm,
    pub exp: u64,
    pub spiritual_power: u32,
    pub max_spiritual_power: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    #[serde(default)]
    pub equipped_weapon: Option<String>,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub last_meditation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_herb_gathering_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_mining_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_challenge_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl PlayerRecord {
    pub fn new(id: PlayerId, username: &str, display_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username: username.to_string(),
            display_name: display_name.to_string(),
            realm: Realm::QiRefining,
            exp: 0,
            spiritual_power: STARTING_SPIRITUAL_POWER,
            max_spiritual_power: STARTING_SPIRITUAL_POWER,
            max_hp: STARTING_MAX_HP,
            attack: STARTING_ATTACK,
            defense: STARTING_DEFENSE,
            equipped_weapon: None,
            inventory: Inventory::default(),
            last_meditation_time: None,
            last_herb_gathering_time: None,
            last_mining_time: None,
            last_challenge_time: None,
            created_at: now,
            updated_at: now,
            schema_version: PLAYER_SCHEMA_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// The later of creation and last save; passive regeneration counts from here.
    pub fn last_saved_at(&self) -> DateTime<Utc> {
        self.updated_at.max(self.created_at)
    }

    pub fn last_action_at(&self, action: ActionKind) -> Option<DateTime<Utc>> {
        match action {
            ActionKind::Meditation => self.last_meditation_time,
            ActionKind::HerbGathering => self.last_herb_gathering_time,
            ActionKind::Mining => self.last_mining_time,
            ActionKind::DungeonChallenge => self.last_challenge_time,
        }
    }

    pub fn mark_action(&mut self, action: ActionKind, at: DateTime<Utc>) {
        let slot = match action {
            ActionKind::Meditation => &mut self.last_meditation_time,
            ActionKind::HerbGathering => &mut self.last_herb_gathering_time,
            ActionKind::Mining => &mut self.last_mining_time,
            ActionKind::DungeonChallenge => &mut self.last_challenge_time,
        };
        *slot = Some(at);
    }

    pub fn equipped(&self) -> Option<&WeaponInstance> {
        self.equipped_weapon
            .as_deref()
            .and_then(|name| self.inventory.weapons.get(name))
    }

    /// Base attack plus the equipped weapon's attack.
    pub fn total_attack(&self) -> u32 {
        self.attack
            .saturating_add(self.equipped().map(|w| w.attack).unwrap_or(0))
    }

    /// The stored name of an owned weapon, matching `name` in any
    /// capitalization.
    pub fn owned_weapon_name(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if let Some((key, _)) = self.inventory.weapons.get_key_value(name) {
            return Some(key.as_str());
        }
        self.inventory
            .weapons
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    pub fn weapon(&self, name: &str) -> Option<&WeaponInstance> {
        let key = self.owned_weapon_name(name)?;
        self.inventory.weapons.get(key)
    }

    pub fn weapon_mut(&mut self, name: &str) -> Option<&mut WeaponInstance> {
        let key = self.owned_weapon_name(name)?.to_string();
        self.inventory.weapons.get_mut(&key)
    }

    /// Stores `weapon`, replacing any instance with the same name.
    pub fn add_weapon(&mut self, weapon: WeaponInstance) -> Option<WeaponInstance> {
        self.inventory.weapons.insert(weapon.name.clone(), weapon)
    }

    /// Drops a weapon, unequipping it first if needed.
    pub fn remove_weapon(&mut self, name: &str) -> Option<WeaponInstance> {
        let removed = self.inventory.weapons.remove(name)?;
        if self.equipped_weapon.as_deref() == Some(name) {
            self.equipped_weapon = None;
        }
        Some(removed)
    }

    pub fn equip(&mut self, name: &str) -> Result<&WeaponInstance, ActionError> {
        let Some(key) = self.owned_weapon_name(name).map(str::to_string) else {
            return Err(ActionError::WeaponNotOwned(name.to_string()));
        };
        self.equipped_weapon = Some(key.clone());
        self.inventory
            .weapons
            .get(&key)
            .ok_or(ActionError::WeaponNotOwned(key))
    }

    pub fn unequip(&mut self) -> Option<String> {
        self.equipped_weapon.take()
    }

    pub fn restore_spiritual_power(&mut self, amount: u32) -> u32 {
        let before = self.spiritual_power;
        self.spiritual_power = self
            .spiritual_power
            .saturating_add(amount)
            .min(self.max_spiritual_power);
        self.spiritual_power - before
    }

    /// Checks the conditions no persisted record may break.
    pub fn check_invariants(&self, thresholds: &RealmThresholds) -> Result<(), String> {
        if self.spiritual_power > self.max_spiritual_power {
            return Err(format!(
                "player {}: spiritual power {} exceeds maximum {}",
                self.id, self.spiritual_power, self.max_spiritual_power
            ));
        }
        if self.realm > thresholds.highest_reachable(self.exp) {
            return Err(format!(
                "player {}: realm {} not supported by {} exp",
                self.id, self.realm, self.exp
            ));
        }
        if let Some(name) = &self.equipped_weapon {
            if !self.inventory.weapons.contains_key(name) {
                return Err(format!("player {}: equipped weapon {} not owned", self.id, name));
            }
        }
        if let Some(w) = self
            .inventory
            .weapons
            .values()
            .find(|w| w.enhancement_level > MAX_ENHANCEMENT_LEVEL)
        {
            return Err(format!(
                "player {}: {} enhanced past +{}",
                self.id, w.name, MAX_ENHANCEMENT_LEVEL
            ));
        }
        let empty = self
            .inventory
            .materials
            .iter()
            .chain(self.inventory.dungeon_materials.iter())
            .find(|(_, qty)| **qty == 0);
        if let Some((name, _)) = empty {
            return Err(format!("player {}: empty stack for {}", self.id, name));
        }
        Ok(())
    }
}

/// One row of the experience leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub id: PlayerId,
    pub username: String,
    pub display_name: String,
    pub realm: Realm,
    pub exp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sword(attack: u32) -> WeaponInstance {
        WeaponInstance {
            name: "Azure Wood Sword".into(),
            weapon_type: WeaponType::Sword,
            attack,
            rarity: Rarity::Common,
            required_realm: Realm::QiRefining,
            enhancement_level: 0,
            acquired_at: Utc::now(),
        }
    }

    #[test]
    fn new_player_defaults() {
        let p = PlayerRecord::new(7, "xiao", "Xiao Yan", Utc::now());
        assert_eq!(p.realm, Realm::QiRefining);
        assert_eq!(p.exp, 0);
        assert_eq!((p.spiritual_power, p.max_spiritual_power), (100, 100));
        assert_eq!((p.max_hp, p.attack, p.defense), (100, 10, 5));
        assert!(p.inventory.weapons.is_empty());
        assert!(p.check_invariants(&RealmThresholds::default()).is_ok());
    }

    #[test]
    fn total_attack_includes_equipped_weapon() {
        let mut p = PlayerRecord::new(7, "xiao", "Xiao Yan", Utc::now());
        p.add_weapon(sword(15));
        assert_eq!(p.total_attack(), 10);
        p.equip("Azure Wood Sword").unwrap();
        assert_eq!(p.total_attack(), 25);
        assert_eq!(p.unequip().as_deref(), Some("Azure Wood Sword"));
        assert_eq!(p.total_attack(), 10);
    }

    #[test]
    fn removing_equipped_weapon_unequips() {
        let mut p = PlayerRecord::new(7, "xiao", "Xiao Yan", Utc::now());
        p.add_weapon(sword(15));
        p.equip("Azure Wood Sword").unwrap();
        assert!(p.remove_weapon("Azure Wood Sword").is_some());
        assert_eq!(p.equipped_weapon, None);
        assert!(p.check_invariants(&RealmThresholds::default()).is_ok());
    }

    #[test]
    fn owned_weapons_resolve_in_any_case() {
        let mut p = PlayerRecord::new(8, "qin", "Qin Yu", Utc::now());
        p.add_weapon(sword(15));
        assert_eq!(p.owned_weapon_name(" azure WOOD sword"), Some("Azure Wood Sword"));
        p.weapon_mut("AZURE WOOD SWORD").unwrap().enhancement_level = 2;
        assert_eq!(p.weapon("azure wood sword").unwrap().enhancement_level, 2);
        p.equip("azure wood sword").unwrap();
        assert_eq!(p.equipped_weapon.as_deref(), Some("Azure Wood Sword"));
        assert!(p.owned_weapon_name("Frost Spear").is_none());
    }

    #[test]
    fn equip_unknown_weapon_fails() {
        let mut p = PlayerRecord::new(7, "xiao", "Xiao Yan", Utc::now());
        assert_eq!(
            p.equip("Void Blade").unwrap_err(),
            ActionError::WeaponNotOwned("Void Blade".into())
        );
    }

    #[test]
    fn materials_drop_empty_stacks() {
        let mut inv = Inventory::default();
        inv.add_material("Spirit Grass", 3);
        inv.add_material("Spirit Grass", 0);
        inv.remove_material("Spirit Grass", 3).unwrap();
        assert!(inv.materials.is_empty());
        assert!(matches!(
            inv.remove_material("Spirit Grass", 1),
            Err(ActionError::InsufficientResource { required: 1, available: 0, .. })
        ));
    }

    #[test]
    fn spending_more_than_balance_is_rejected() {
        let mut inv = Inventory::default();
        inv.add_spirit_stones(50);
        assert_eq!(
            inv.spend_spirit_stones(51),
            Err(ActionError::InsufficientCurrency {
                required: 51,
                available: 50
            })
        );
        inv.spend_spirit_stones(50).unwrap();
        assert_eq!(inv.spirit_stones, 0);
    }

    #[test]
    fn invariants_catch_overfull_power_and_unearned_realm() {
        let thresholds = RealmThresholds::default();
        let mut p = PlayerRecord::new(7, "xiao", "Xiao Yan", Utc::now());
        p.spiritual_power = 101;
        assert!(p.check_invariants(&thresholds).is_err());
        p.spiritual_power = 100;
        p.realm = Realm::CoreFormation;
        p.exp = 4_999;
        assert!(p.check_invariants(&thresholds).is_err());
        p.exp = 5_000;
        assert!(p.check_invariants(&thresholds).is_ok());
    }
}
