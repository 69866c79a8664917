use serde::{Deserialize, Serialize};

use crate::game::catalog::RewardRange;
use crate::game::realm::Realm;

/// A place herbs can be gathered. One herb from `herbs` is picked per trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerbLocation {
    pub name: String,
    pub min_realm: Realm,
    pub spirit_cost: u32,
    pub herbs: Vec<String>,
    #[serde(default = "default_herb_amount")]
    pub amount: RewardRange,
    #[serde(default = "default_herb_exp")]
    pub exp: RewardRange,
}

fn default_herb_amount() -> RewardRange {
    RewardRange::new(2, 5)
}

fn default_herb_exp() -> RewardRange {
    RewardRange::new(5, 15)
}

/// One possible drop from a mine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSlot {
    pub item: String,
    pub range: RewardRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningLocation {
    pub name: String,
    pub min_realm: Realm,
    pub spirit_cost: u32,
    pub rewards: Vec<RewardSlot>,
    /// Chance each slot drops at all, rolled independently per slot.
    #[serde(default = "default_drop_chance")]
    pub drop_chance: f64,
    pub exp: RewardRange,
}

fn default_drop_chance() -> f64 {
    0.7
}

fn herbs(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn herb_location(name: &str, min_realm: Realm, spirit_cost: u32, names: &[&str]) -> HerbLocation {
    HerbLocation {
        name: name.to_string(),
        min_realm,
        spirit_cost,
        herbs: herbs(names),
        amount: default_herb_amount(),
        exp: default_herb_exp(),
    }
}

pub fn builtin_herb_locations() -> Vec<HerbLocation> {
    vec![
        herb_location(
            "Mortal Village",
            Realm::QiRefining,
            20,
            &["Common Herb", "Spirit Grass", "Azure Dragon Grass", "White Tiger Leaf"],
        ),
        herb_location(
            "Novice Spirit Garden",
            Realm::FoundationEstablishment,
            40,
            &[
                "Low-Grade Spirit Medicine",
                "Mid-Grade Spirit Medicine",
                "Violet Sun Flower",
                "Starlight Grass",
                "Dragon Blood Grass",
            ],
        ),
        herb_location(
            "Intermediate Spirit Garden",
            Realm::CoreFormation,
            60,
            &[
                "Mid-Grade Spirit Medicine",
                "High-Grade Spirit Medicine",
                "Sun God Grass",
                "Moon Essence Grass",
                "Nine-Leaf Heaven Chrysanthemum",
            ],
        ),
        herb_location(
            "Advanced Spirit Garden",
            Realm::NascentSoul,
            80,
            &[
                "High-Grade Spirit Medicine",
                "Supreme Spirit Medicine",
                "Undying Divine Medicine",
                "Chaos Azure Lotus",
                "Eternal Life Grass",
            ],
        ),
        herb_location(
            "Immortal Herb Garden",
            Realm::SpiritSevering,
            100,
            &[
                "Immortal Medicine",
                "Nine-Turn Soul Return Grass",
                "Divine King Grass",
                "Undying Divine Medicine",
                "Chaos Body Grass",
            ],
        ),
        herb_location(
            "Primeval Forbidden Land",
            Realm::BodyIntegration,
            150,
            &[
                "Primeval Divine Medicine",
                "Elixir of Undying",
                "Divine Emperor Grass",
                "Genesis Divine Medicine",
                "Chaos Immortal Medicine",
            ],
        ),
        herb_location(
            "Immortal Realm Secret Domain",
            Realm::Mahayana,
            200,
            &[
                "Immortal Realm Divine Medicine",
                "Longevity Grass",
                "Chaos Divine Medicine",
                "Great Dao Treasure Medicine",
                "Genesis Eternal Medicine",
            ],
        ),
    ]
}

fn slot(item: &str, min: u64, max: u64) -> RewardSlot {
    RewardSlot {
        item: item.to_string(),
        range: RewardRange::new(min, max),
    }
}

fn mine(
    name: &str,
    min_realm: Realm,
    spirit_cost: u32,
    rewards: Vec<RewardSlot>,
    exp: (u64, u64),
) -> MiningLocation {
    MiningLocation {
        name: name.to_string(),
        min_realm,
        spirit_cost,
        rewards,
        drop_chance: default_drop_chance(),
        exp: RewardRange::new(exp.0, exp.1),
    }
}

pub fn builtin_mining_locations() -> Vec<MiningLocation> {
    vec![
        mine(
            "Shallow Mine",
            Realm::QiRefining,
            15,
            vec![
                slot("Spirit Stone", 5, 15),
                slot("Low-Grade Spirit Stone", 0, 2),
                slot("Bronze Source Ore", 1, 3),
                slot("Dark Iron Ore", 0, 1),
            ],
            (5, 10),
        ),
        mine(
            "Middle Mine",
            Realm::FoundationEstablishment,
            25,
            vec![
                slot("Spirit Stone", 15, 30),
                slot("Low-Grade Spirit Stone", 2, 5),
                slot("Mid-Grade Spirit Stone", 0, 2),
                slot("Refined Steel Ore", 1, 3),
                slot("Star Iron", 0, 1),
            ],
            (10, 20),
        ),
        mine(
            "Deep Mine",
            Realm::CoreFormation,
            40,
            vec![
                slot("Spirit Stone", 30, 50),
                slot("Mid-Grade Spirit Stone", 2, 5),
                slot("High-Grade Spirit Stone", 0, 2),
                slot("Sun Essence Gold", 0, 1),
                slot("Moonlight Jade", 0, 1),
            ],
            (20, 30),
        ),
        mine(
            "Earth-Core Mine",
            Realm::NascentSoul,
            60,
            vec![
                slot("Spirit Stone", 50, 100),
                slot("High-Grade Spirit Stone", 2, 5),
                slot("Supreme Spirit Stone", 0, 2),
                slot("Dragon Bone Gold", 0, 1),
                slot("Phoenix Marrow Jade", 0, 1),
            ],
            (30, 50),
        ),
        mine(
            "Mysterious Mine",
            Realm::SpiritSevering,
            80,
            vec![
                slot("Supreme Spirit Stone", 2, 5),
                slot("Divine Spirit Stone", 0, 2),
                slot("Chaos Stone", 0, 1),
                slot("Immortal Source Ore", 0, 1),
            ],
            (50, 80),
        ),
        mine(
            "Primeval Vein",
            Realm::BodyIntegration,
            100,
            vec![
                slot("Divine Spirit Stone", 2, 5),
                slot("Primeval Divine Stone", 0, 2),
                slot("Imperishable Gold", 0, 1),
                slot("Eternal Source Essence", 0, 1),
            ],
            (80, 120),
        ),
        mine(
            "Immortal Realm Mine",
            Realm::Mahayana,
            150,
            vec![
                slot("Primeval Divine Stone", 2, 5),
                slot("Immortal Realm Divine Stone", 0, 2),
                slot("Chaos Divine Gold", 0, 1),
                slot("Great Dao Source Stone", 0, 1),
            ],
            (120, 200),
        ),
    ]
}
