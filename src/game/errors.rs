use thiserror::Error;

use crate::game::cooldown::ActionKind;
use crate::game::realm::Realm;

/// A resource that an action can run short of.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum Resource {
    SpiritualPower,
    Material(String),
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::SpiritualPower => write!(f, "spiritual power"),
            Resource::Material(name) => write!(f, "{}", name),
        }
    }
}

/// Validation failures. Returning one of these guarantees the player record
/// was not mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{action} is on cooldown for another {remaining_secs}s")]
    CooldownNotElapsed { action: ActionKind, remaining_secs: u64 },

    #[error("not enough {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: Resource,
        required: u64,
        available: u64,
    },

    #[error("not enough spirit stones: need {required}, have {available}")]
    InsufficientCurrency { required: u64, available: u64 },

    #[error("no such weapon: {0}")]
    UnknownWeapon(String),

    #[error("no such dungeon stage: {0}")]
    UnknownStage(String),

    #[error("no such material: {0}")]
    UnknownMaterial(String),

    #[error("requires {required}, currently {current}")]
    RealmTooLow { required: Realm, current: Realm },

    #[error("weapon not owned: {0}")]
    WeaponNotOwned(String),

    #[error("{weapon} is already at maximum enhancement level {level}")]
    MaxLevelReached { weapon: String, level: u8 },

    #[error("no location is open to your realm for {action}")]
    NoEligibleTarget { action: ActionKind },

    #[error("{0} cannot be sold")]
    NotSellable(String),

    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// Errors that can arise while interacting with the player store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}

/// Problems found while loading or validating catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error reading catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid catalog: {0}")]
    Invalid(String),
}

/// Everything a game service call can fail with.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A mutation left the record in a state that must never be persisted.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl GameError {
    /// The validation failure, if this is one.
    pub fn as_action(&self) -> Option<&ActionError> {
        match self {
            GameError::Action(err) => Some(err),
            _ => None,
        }
    }
}
