use std::path::{Path, PathBuf};

use sled::IVec;

use crate::game::errors::StoreError;
use crate::game::types::{
    LeaderboardEntry, PlayerId, PlayerIdentity, PlayerRecord, PLAYER_SCHEMA_VERSION,
};
use crate::logutil::sanitize_for_log;

const TREE_PLAYERS: &str = "xiuxian_players";
const PLAYER_PREFIX: &[u8] = b"players:";

/// What the game needs from a player store. Each call is a single atomic
/// read or write; callers serialize read-modify-write cycles themselves.
pub trait PlayerRepository: Send + Sync {
    fn load(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StoreError>;

    /// Insert a fresh record for `identity`. If one already exists it is
    /// returned unchanged.
    fn create(&self, identity: &PlayerIdentity) -> Result<PlayerRecord, StoreError>;

    /// Persist `player`, stamping `updated_at`. Returns what was written.
    fn save(&self, player: PlayerRecord) -> Result<PlayerRecord, StoreError>;

    /// Highest experience first, ties broken by lower id.
    fn top_by_experience(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;

    fn player_count(&self) -> Result<usize, StoreError>;
}

/// Sled-backed persistence for player records, keyed `players:<id>` with
/// bincode values behind a schema version byte.
pub struct PlayerStore {
    path: PathBuf,
    _db: sled::Db,
    /// One entry per player.
    players: sled::Tree,
}

impl PlayerStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let players = db.open_tree(TREE_PLAYERS)?;
        log::debug!("opened player store at {}", path_ref.display());
        Ok(Self {
            path: path_ref.to_path_buf(),
            _db: db,
            players,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn player_key(id: PlayerId) -> Vec<u8> {
        // Zero padded so keys sort numerically.
        format!("players:{:020}", id).into_bytes()
    }

    fn serialize(player: &PlayerRecord) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(player)?)
    }

    fn deserialize(bytes: &IVec) -> Result<PlayerRecord, StoreError> {
        let record: PlayerRecord = bincode::deserialize(bytes)?;
        if record.schema_version != PLAYER_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "player",
                expected: PLAYER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Fetch a player that must exist.
    pub fn get(&self, id: PlayerId) -> Result<PlayerRecord, StoreError> {
        self.load(id)?
            .ok_or_else(|| StoreError::NotFound(format!("player: {}", id)))
    }

    fn all_players(&self) -> Result<Vec<PlayerRecord>, StoreError> {
        let mut players = Vec::new();
        for entry in self.players.scan_prefix(PLAYER_PREFIX) {
            let (_, bytes) = entry?;
            players.push(Self::deserialize(&bytes)?);
        }
        Ok(players)
    }
}

impl PlayerRepository for PlayerStore {
    fn load(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        match self.players.get(Self::player_key(id))? {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn create(&self, identity: &PlayerIdentity) -> Result<PlayerRecord, StoreError> {
        let record = PlayerRecord::new(
            identity.id,
            &identity.username,
            &identity.display_name,
            chrono::Utc::now(),
        );
        let key = Self::player_key(identity.id);
        let bytes = Self::serialize(&record)?;
        match self.players.compare_and_swap(&key, None as Option<&[u8]>, Some(bytes))? {
            Ok(()) => {
                self.players.flush()?;
                log::info!(
                    "created player {} ({})",
                    identity.id,
                    sanitize_for_log(&identity.username)
                );
                Ok(record)
            }
            Err(conflict) => match conflict.current {
                Some(existing) => Self::deserialize(&existing),
                None => Err(StoreError::NotFound(format!("player: {}", identity.id))),
            },
        }
    }

    fn save(&self, mut player: PlayerRecord) -> Result<PlayerRecord, StoreError> {
        player.schema_version = PLAYER_SCHEMA_VERSION;
        player.touch();
        let bytes = Self::serialize(&player)?;
        self.players.insert(Self::player_key(player.id), bytes)?;
        self.players.flush()?;
        Ok(player)
    }

    fn top_by_experience(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut players = self.all_players()?;
        players.sort_by(|a, b| b.exp.cmp(&a.exp).then(a.id.cmp(&b.id)));
        Ok(players
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i + 1,
                id: p.id,
                username: p.username,
                display_name: p.display_name,
                realm: p.realm,
                exp: p.exp,
            })
            .collect())
    }

    fn player_count(&self) -> Result<usize, StoreError> {
        Ok(self.players.scan_prefix(PLAYER_PREFIX).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_is_idempotent() {
        let tmp = tempdir().unwrap();
        let store = PlayerStore::open(tmp.path()).unwrap();
        let id = PlayerIdentity::new(42, "wang", "Wang Lin");
        let mut first = store.create(&id).unwrap();
        first.exp = 77;
        store.save(first).unwrap();
        let again = store.create(&id).unwrap();
        assert_eq!(again.exp, 77);
        assert_eq!(store.player_count().unwrap(), 1);
    }

    #[test]
    fn missing_player_is_none() {
        let tmp = tempdir().unwrap();
        let store = PlayerStore::open(tmp.path()).unwrap();
        assert!(store.load(1).unwrap().is_none());
        assert!(matches!(store.get(1), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn schema_mismatch_is_reported() {
        let tmp = tempdir().unwrap();
        let store = PlayerStore::open(tmp.path()).unwrap();
        let mut record = PlayerRecord::new(5, "a", "A", chrono::Utc::now());
        record.schema_version = 99;
        let bytes = bincode::serialize(&record).unwrap();
        store.players.insert(PlayerStore::player_key(5), bytes).unwrap();
        assert!(matches!(
            store.load(5),
            Err(StoreError::SchemaMismatch { found: 99, .. })
        ));
    }
}
