//! Cultivation game engine: realms and experience, cooldown-gated actions,
//! the weapon shop and enhancement forge, dungeon combat, and the sled-backed
//! player store that all of it persists through.
//!
//! The engine modules are synchronous and take the current time and a random
//! source as arguments. [`GameService`] is the async entry point that adds
//! per-player locking and persistence around them.

pub mod actions;
pub mod catalog;
pub mod combat;
pub mod cooldown;
pub mod enhancement;
pub mod errors;
pub mod locks;
pub mod progression;
pub mod realm;
pub mod regen;
pub mod report;
pub mod rules;
pub mod service;
pub mod shop;
pub mod storage;
pub mod types;

pub use actions::{
    BulkSale, ChallengeOutcome, GatherOutcome, MeditationOutcome, MiningOutcome, SaleLine,
    StageListing, StageLoot,
};
pub use catalog::{Catalog, RewardRange, WeaponEntry};
pub use combat::{BattleEvent, BattleReport, CombatStats};
pub use cooldown::{ActionKind, Cooldowns};
pub use enhancement::{EnhanceOutcome, EnhancementTable, WeaponDetails};
pub use errors::{ActionError, CatalogError, GameError, Resource, StoreError};
pub use progression::Breakthrough;
pub use realm::{Realm, RealmThresholds};
pub use report::{InventoryReport, StatusReport};
pub use rules::GameRules;
pub use service::GameService;
pub use shop::{EquipOutcome, PurchaseOutcome};
pub use storage::{PlayerRepository, PlayerStore};
pub use types::*;
