//! Static reference data: realms, weapons, gathering and mining spots, the
//! dungeon, material prices and the enhancement curve.
//!
//! The built-in catalog is used unless a JSON catalog file is configured.
//! Sections missing from a file fall back to the built-in values, so a file
//! may override only what it needs to.

pub mod dungeon;
pub mod locations;
pub mod materials;
pub mod weapons;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::enhancement::EnhancementTable;
use crate::game::errors::CatalogError;
use crate::game::realm::{Realm, RealmThresholds};

pub use dungeon::{
    BossSkill, BossTemplate, Dungeon, DungeonStage, Encounter, MonsterTemplate, RareDrop,
    StageRewards,
};
pub use locations::{HerbLocation, MiningLocation, RewardSlot};
pub use weapons::WeaponEntry;

/// An inclusive `[min, max]` range rolled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRange {
    pub min: u64,
    pub max: u64,
}

impl RewardRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: u64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub realms: RealmThresholds,
    pub weapons: Vec<WeaponEntry>,
    pub herb_locations: Vec<HerbLocation>,
    pub mining_locations: Vec<MiningLocation>,
    pub dungeon: Dungeon,
    pub material_values: BTreeMap<String, u64>,
    pub enhancement: EnhancementTable,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            realms: RealmThresholds::default(),
            weapons: weapons::builtin_weapons(),
            herb_locations: locations::builtin_herb_locations(),
            mining_locations: locations::builtin_mining_locations(),
            dungeon: dungeon::builtin_dungeon(),
            material_values: materials::builtin_material_values(),
            enhancement: EnhancementTable::default(),
        }
    }

    /// Read and validate a JSON catalog.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let catalog: Catalog = serde_json::from_str(&text)?;
        catalog.validate()?;
        log::info!(
            "Loaded catalog from {}: {} weapons, {} herb spots, {} mines, {} stages",
            path.as_ref().display(),
            catalog.weapons.len(),
            catalog.herb_locations.len(),
            catalog.mining_locations.len(),
            catalog.dungeon.stages.len()
        );
        Ok(catalog)
    }

    pub fn to_json_pretty(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn weapon(&self, name: &str) -> Option<&WeaponEntry> {
        self.weapons
            .iter()
            .find(|w| w.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn stage(&self, name: &str) -> Option<&DungeonStage> {
        self.dungeon
            .stages
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn material_value(&self, name: &str) -> Option<u64> {
        self.material_values.get(name).copied()
    }

    pub fn herb_locations_for(&self, realm: Realm) -> Vec<&HerbLocation> {
        self.herb_locations
            .iter()
            .filter(|l| l.min_realm <= realm)
            .collect()
    }

    pub fn mining_locations_for(&self, realm: Realm) -> Vec<&MiningLocation> {
        self.mining_locations
            .iter()
            .filter(|l| l.min_realm <= realm)
            .collect()
    }

    /// Reject data the engines cannot run on: empty or inverted ranges,
    /// probabilities outside [0, 1], duplicate names and broken tables.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |msg: String| Err(CatalogError::Invalid(msg));

        if let Err(e) = self.realms.validate() {
            return invalid(e);
        }
        if let Err(e) = self.enhancement.validate() {
            return invalid(e);
        }

        let mut seen = HashSet::new();
        for w in &self.weapons {
            if !seen.insert(w.name.to_ascii_lowercase()) {
                return invalid(format!("duplicate weapon {}", w.name));
            }
        }

        for loc in &self.herb_locations {
            if loc.herbs.is_empty() {
                return invalid(format!("herb location {} has no herbs", loc.name));
            }
            for (what, range) in [("amount", loc.amount), ("exp", loc.exp)] {
                if range.min > range.max {
                    return invalid(format!("herb location {}: bad {} range", loc.name, what));
                }
            }
        }

        for loc in &self.mining_locations {
            if !(0.0..=1.0).contains(&loc.drop_chance) {
                return invalid(format!("mine {}: drop chance out of range", loc.name));
            }
            if loc.exp.min > loc.exp.max {
                return invalid(format!("mine {}: bad exp range", loc.name));
            }
            if let Some(slot) = loc.rewards.iter().find(|s| s.range.min > s.range.max) {
                return invalid(format!("mine {}: bad range for {}", loc.name, slot.item));
            }
        }

        let mut seen = HashSet::new();
        for stage in &self.dungeon.stages {
            if !seen.insert(stage.name.to_ascii_lowercase()) {
                return invalid(format!("duplicate stage {}", stage.name));
            }
            if let Encounter::Monsters(monsters) = &stage.encounter {
                if monsters.is_empty() {
                    return invalid(format!("stage {} has no monsters", stage.name));
                }
            }
            let rewards = &stage.rewards;
            if rewards.exp.min > rewards.exp.max
                || rewards.items.iter().any(|s| s.range.min > s.range.max)
            {
                return invalid(format!("stage {}: bad reward range", stage.name));
            }
            if rewards
                .rare_items
                .iter()
                .any(|r| !(0.0..=1.0).contains(&r.chance))
            {
                return invalid(format!("stage {}: rare drop chance out of range", stage.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        catalog.validate().unwrap();
        assert_eq!(catalog.weapons.len(), 27);
        assert_eq!(catalog.herb_locations.len(), 7);
        assert_eq!(catalog.mining_locations.len(), 7);
        assert_eq!(catalog.dungeon.stages.len(), 5);
    }

    #[test]
    fn every_realm_sells_three_weapons() {
        let catalog = Catalog::builtin();
        for realm in Realm::ALL {
            let count = catalog
                .weapons
                .iter()
                .filter(|w| w.required_realm == realm)
                .count();
            assert_eq!(count, 3, "{}", realm);
        }
    }

    #[test]
    fn lookups_ignore_case() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.weapon("azure wood sword").unwrap().price, 150);
        assert_eq!(catalog.stage("PRIMORDIAL SANCTUM").unwrap().spirit_cost, 200);
        assert!(catalog.weapon("Wooden Spoon").is_none());
        assert_eq!(catalog.material_value("Star Iron"), Some(500));
        assert_eq!(catalog.material_value("Primordial Essence"), None);
    }

    #[test]
    fn eligibility_follows_realm() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.herb_locations_for(Realm::QiRefining).len(), 1);
        assert_eq!(catalog.mining_locations_for(Realm::CoreFormation).len(), 3);
        assert_eq!(catalog.herb_locations_for(Realm::Tribulation).len(), 7);
    }

    #[test]
    fn partial_json_falls_back_to_builtin_sections() {
        let json = r#"{ "material_values": { "Common Herb": 99 } }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.material_value("Common Herb"), Some(99));
        assert_eq!(catalog.material_value("Spirit Grass"), None);
        assert_eq!(catalog.weapons.len(), 27);
    }

    #[test]
    fn json_round_trip_keeps_catalog() {
        let catalog = Catalog::builtin();
        let text = catalog.to_json_pretty().unwrap();
        let back: Catalog = serde_json::from_str(&text).unwrap();
        assert_eq!(back.weapons, catalog.weapons);
        assert_eq!(back.enhancement, catalog.enhancement);
        assert_eq!(back.material_values, catalog.material_values);
        assert_eq!(back.dungeon.stages.len(), 5);
    }

    #[test]
    fn validation_rejects_bad_chance() {
        let mut catalog = Catalog::builtin();
        catalog.mining_locations[0].drop_chance = 1.5;
        assert!(matches!(catalog.validate(), Err(CatalogError::Invalid(_))));
    }
}
