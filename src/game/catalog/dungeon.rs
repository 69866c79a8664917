use serde::{Deserialize, Serialize};

use crate::game::catalog::locations::RewardSlot;
use crate::game::catalog::RewardRange;
use crate::game::realm::Realm;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossSkill {
    pub name: String,
    pub damage: u32,
}

/// A boss strikes with one of its skills each turn, or with its plain
/// attack when it has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossTemplate {
    pub name: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    #[serde(default)]
    pub skills: Vec<BossSkill>,
}

/// Who waits inside a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encounter {
    /// Fought one after another in order.
    Monsters(Vec<MonsterTemplate>),
    Boss(BossTemplate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RareDrop {
    pub item: String,
    pub chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRewards {
    pub exp: RewardRange,
    pub items: Vec<RewardSlot>,
    #[serde(default)]
    pub rare_items: Vec<RareDrop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonStage {
    pub name: String,
    pub min_realm: Realm,
    pub spirit_cost: u32,
    pub encounter: Encounter,
    pub rewards: StageRewards,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dungeon {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub stages: Vec<DungeonStage>,
}

fn monster(name: &str, hp: u32, attack: u32, defense: u32) -> MonsterTemplate {
    MonsterTemplate {
        name: name.to_string(),
        hp,
        attack,
        defense,
    }
}

fn item(name: &str, min: u64, max: u64) -> RewardSlot {
    RewardSlot {
        item: name.to_string(),
        range: RewardRange::new(min, max),
    }
}

fn rewards(exp: (u64, u64), items: Vec<RewardSlot>) -> StageRewards {
    StageRewards {
        exp: RewardRange::new(exp.0, exp.1),
        items,
        rare_items: Vec::new(),
    }
}

pub fn builtin_dungeon() -> Dungeon {
    let boss = BossTemplate {
        name: "Ancient Great Emperor".to_string(),
        hp: 2_000,
        attack: 200,
        defense: 150,
        skills: vec![
            BossSkill {
                name: "Emperor's Judgment".to_string(),
                damage: 300,
            },
            BossSkill {
                name: "Imperial Might".to_string(),
                damage: 250,
            },
            BossSkill {
                name: "Primordial Divine Art".to_string(),
                damage: 400,
            },
        ],
    };
    let mut sanctum_rewards = rewards(
        (2_000, 4_000),
        vec![
            item("Great Emperor Dao Fruit", 1, 1),
            item("Spirit Stone", 1_000, 2_000),
            item("Primordial Essence", 10, 20),
        ],
    );
    sanctum_rewards.rare_items = vec![
        RareDrop {
            item: "Primordial Divine Crown".to_string(),
            chance: 0.05,
        },
        RareDrop {
            item: "Emperor Dao Divine Weapon".to_string(),
            chance: 0.03,
        },
        RareDrop {
            item: "Great Emperor Scripture".to_string(),
            chance: 0.02,
        },
    ];

    Dungeon {
        name: "Elsevier Dojo".to_string(),
        description: "An ancient proving ground holding the legacy of a great emperor.".to_string(),
        stages: vec![
            DungeonStage {
                name: "Hall of Dao Scripture".to_string(),
                min_realm: Realm::QiRefining,
                spirit_cost: 30,
                encounter: Encounter::Monsters(vec![
                    monster("Dao Scripture Guardian", 100, 20, 10),
                    monster("Ancient Dao Spirit", 150, 25, 15),
                ]),
                rewards: rewards(
                    (100, 200),
                    vec![
                        item("Dao Source Fragment", 1, 3),
                        item("Spirit Stone", 50, 100),
                        item("Primordial Essence", 1, 2),
                    ],
                ),
            },
            DungeonStage {
                name: "Source Heaven Corridor".to_string(),
                min_realm: Realm::FoundationEstablishment,
                spirit_cost: 50,
                encounter: Encounter::Monsters(vec![
                    monster("Source Heaven Envoy", 200, 35, 20),
                    monster("Ancient Source Spirit", 250, 40, 25),
                ]),
                rewards: rewards(
                    (200, 400),
                    vec![
                        item("Source Heaven Power", 1, 3),
                        item("Spirit Stone", 100, 200),
                        item("Primordial Essence", 2, 4),
                    ],
                ),
            },
            DungeonStage {
                name: "Emperor Scripture Chamber".to_string(),
                min_realm: Realm::CoreFormation,
                spirit_cost: 80,
                encounter: Encounter::Monsters(vec![
                    monster("Emperor Scripture Keeper", 400, 60, 40),
                    monster("Will of the Great Emperor", 500, 70, 45),
                ]),
                rewards: rewards(
                    (400, 800),
                    vec![
                        item("Emperor Scripture Page", 1, 2),
                        item("Spirit Stone", 200, 400),
                        item("Primordial Essence", 3, 6),
                    ],
                ),
            },
            DungeonStage {
                name: "Divine King Hall".to_string(),
                min_realm: Realm::NascentSoul,
                spirit_cost: 120,
                encounter: Encounter::Monsters(vec![
                    monster("Divine King Envoy", 800, 100, 70),
                    monster("Ancient Divine King", 1_000, 120, 80),
                ]),
                rewards: rewards(
                    (800, 1_600),
                    vec![
                        item("Divine King Power", 1, 2),
                        item("Spirit Stone", 400, 800),
                        item("Primordial Essence", 5, 10),
                    ],
                ),
            },
            DungeonStage {
                name: "Primordial Sanctum".to_string(),
                min_realm: Realm::SpiritSevering,
                spirit_cost: 200,
                encounter: Encounter::Boss(boss),
                rewards: sanctum_rewards,
            },
        ],
    }
}
