//! Shared fixtures for integration tests.

use std::path::Path;
use std::sync::Arc;

use xiuxian::game::{Catalog, GameRules, GameService, PlayerIdentity, PlayerRecord, PlayerRepository, PlayerStore};

/// A service over a fresh store in `dir` with a fixed random seed.
#[allow(dead_code)]
pub fn seeded_service(dir: &Path, seed: u64) -> GameService {
    let store = PlayerStore::open(dir.join("xiuxian.db")).expect("open store");
    GameService::with_seed(store, Arc::new(Catalog::builtin()), GameRules::default(), seed)
}

#[allow(dead_code)]
pub fn identity(id: u64) -> PlayerIdentity {
    PlayerIdentity::new(id, format!("user{}", id), format!("Cultivator {}", id))
}

/// Creates the player if needed, applies `edit` and writes it back.
#[allow(dead_code)]
pub fn seed_player<F: FnOnce(&mut PlayerRecord)>(service: &GameService, id: &PlayerIdentity, edit: F) -> PlayerRecord {
    let mut player = service.store().create(id).expect("create player");
    edit(&mut player);
    service.store().save(player).expect("save player")
}
