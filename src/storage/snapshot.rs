//! Point-in-time snapshots of the player database.
//!
//! A snapshot is a gzipped tarball of the sled directory plus a SHA-256
//! checksum recorded in `snapshots.json` beside it. Snapshots should be taken
//! and restored while no process has the database open.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tar::{Archive, Builder};

const METADATA_FILE: &str = "snapshots.json";
/// Directory name used inside every archive.
const ARCHIVE_ROOT: &str = "db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub id: String,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub checksum: String,
    pub verified: bool,
    /// Archive file name, relative to the snapshot directory.
    pub file: PathBuf,
}

pub struct SnapshotManager {
    db_path: PathBuf,
    snapshot_dir: PathBuf,
    snapshots: BTreeMap<String, SnapshotMetadata>,
}

impl SnapshotManager {
    pub fn new(db_path: impl Into<PathBuf>, snapshot_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let snapshot_dir = snapshot_dir.into();
        fs::create_dir_all(&snapshot_dir)?;
        let mut manager = Self {
            db_path: db_path.into(),
            snapshot_dir,
            snapshots: BTreeMap::new(),
        };
        manager.load_metadata()?;
        Ok(manager)
    }

    fn load_metadata(&mut self) -> io::Result<()> {
        let path = self.snapshot_dir.join(METADATA_FILE);
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            self.snapshots = serde_json::from_str(&contents)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        }
        Ok(())
    }

    fn save_metadata(&self) -> io::Result<()> {
        let contents = serde_json::to_string_pretty(&self.snapshots)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.snapshot_dir.join(METADATA_FILE), contents)
    }

    fn entry(&self, id: &str) -> io::Result<&SnapshotMetadata> {
        self.snapshots
            .get(id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("snapshot {} not found", id)))
    }

    pub fn create(&mut self, label: Option<String>) -> io::Result<SnapshotMetadata> {
        if !self.db_path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("database directory {} does not exist", self.db_path.display()),
            ));
        }
        let created_at = Utc::now();
        let mut id = format!("snapshot_{}", created_at.format("%Y%m%d_%H%M%S_%3f"));
        // Two snapshots inside the same millisecond.
        let mut n = 1;
        while self.snapshots.contains_key(&id) {
            id = format!("snapshot_{}_{}", created_at.format("%Y%m%d_%H%M%S_%3f"), n);
            n += 1;
        }
        let file = PathBuf::from(format!("{}.tar.gz", id));
        let archive_path = self.snapshot_dir.join(&file);

        let encoder = GzEncoder::new(File::create(&archive_path)?, Compression::default());
        let mut tar = Builder::new(encoder);
        tar.append_dir_all(ARCHIVE_ROOT, &self.db_path)?;
        // The archive must be complete before it is hashed.
        tar.into_inner()?.finish()?;

        let metadata = SnapshotMetadata {
            id: id.clone(),
            label,
            created_at,
            size_bytes: fs::metadata(&archive_path)?.len(),
            checksum: checksum(&archive_path)?,
            verified: false,
            file,
        };
        self.snapshots.insert(id.clone(), metadata.clone());
        self.save_metadata()?;
        log::info!("created snapshot {} ({} bytes)", id, metadata.size_bytes);
        Ok(metadata)
    }

    /// Recomputes the checksum. A match marks the snapshot verified.
    pub fn verify(&mut self, id: &str) -> io::Result<bool> {
        let entry = self.entry(id)?;
        let archive_path = self.snapshot_dir.join(&entry.file);
        let valid = checksum(&archive_path)? == entry.checksum;
        if valid {
            if let Some(meta) = self.snapshots.get_mut(id) {
                meta.verified = true;
            }
            self.save_metadata()?;
            log::info!("snapshot {} verified", id);
        } else {
            log::error!("snapshot {} failed verification (checksum mismatch)", id);
        }
        Ok(valid)
    }

    /// Replaces the database directory with the snapshot's contents. The
    /// current directory, if any, is moved aside rather than deleted; its new
    /// location is returned.
    pub fn restore(&self, id: &str) -> io::Result<Option<PathBuf>> {
        let entry = self.entry(id)?;
        let archive_path = self.snapshot_dir.join(&entry.file);
        if checksum(&archive_path)? != entry.checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("snapshot {} checksum mismatch", id),
            ));
        }

        let staging = sibling(&self.db_path, "restore-staging");
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;
        Archive::new(GzDecoder::new(File::open(&archive_path)?)).unpack(&staging)?;

        let set_aside = if self.db_path.exists() {
            let aside = sibling(
                &self.db_path,
                &format!("pre-restore-{}", Utc::now().format("%Y%m%d_%H%M%S_%3f")),
            );
            fs::rename(&self.db_path, &aside)?;
            Some(aside)
        } else {
            None
        };
        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(staging.join(ARCHIVE_ROOT), &self.db_path)?;
        fs::remove_dir_all(&staging)?;
        log::info!("restored snapshot {} into {}", id, self.db_path.display());
        Ok(set_aside)
    }

    /// Newest first.
    pub fn list(&self) -> Vec<SnapshotMetadata> {
        let mut all: Vec<_> = self.snapshots.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        all
    }

    pub fn get(&self, id: &str) -> Option<&SnapshotMetadata> {
        self.snapshots.get(id)
    }

    pub fn delete(&mut self, id: &str) -> io::Result<()> {
        let entry = self.entry(id)?.clone();
        let archive_path = self.snapshot_dir.join(&entry.file);
        if archive_path.exists() {
            fs::remove_file(&archive_path)?;
        }
        self.snapshots.remove(id);
        self.save_metadata()?;
        log::info!("deleted snapshot {}", id);
        Ok(())
    }

    /// Deletes all but the newest `keep` snapshots. Returns the deleted ids.
    pub fn prune(&mut self, keep: usize) -> io::Result<Vec<String>> {
        let doomed: Vec<String> = self.list().into_iter().skip(keep).map(|s| s.id).collect();
        for id in &doomed {
            self.delete(id)?;
        }
        Ok(doomed)
    }
}

/// `<dir>.<suffix>` next to `dir`.
fn sibling(dir: &Path, suffix: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "db".to_string());
    dir.with_file_name(format!("{}.{}", name, suffix))
}

fn checksum(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0; 8192];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_db(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path).unwrap();
        fs::write(path.join("db"), contents).unwrap();
        fs::write(path.join("conf"), b"segment_size: 524288").unwrap();
    }

    #[test]
    fn create_then_verify() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("xiuxian.db");
        fake_db(&db, b"players");
        let mut manager = SnapshotManager::new(&db, temp.path().join("snapshots")).unwrap();

        let meta = manager.create(Some("before patch".into())).unwrap();
        assert!(meta.size_bytes > 0);
        assert_eq!(meta.checksum.len(), 64);
        assert!(manager.verify(&meta.id).unwrap());
        assert!(manager.get(&meta.id).unwrap().verified);
    }

    #[test]
    fn tampered_archive_fails_verification_and_restore() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("xiuxian.db");
        fake_db(&db, b"players");
        let snapshots = temp.path().join("snapshots");
        let mut manager = SnapshotManager::new(&db, &snapshots).unwrap();
        let meta = manager.create(None).unwrap();

        fs::write(snapshots.join(&meta.file), b"garbage").unwrap();
        assert!(!manager.verify(&meta.id).unwrap());
        let err = manager.restore(&meta.id).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn restore_replaces_database_and_keeps_the_old_one() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("xiuxian.db");
        fake_db(&db, b"before");
        let mut manager = SnapshotManager::new(&db, temp.path().join("snapshots")).unwrap();
        let meta = manager.create(None).unwrap();

        fs::write(db.join("db"), b"changed").unwrap();
        let aside = manager.restore(&meta.id).unwrap().unwrap();
        assert_eq!(fs::read(db.join("db")).unwrap(), b"before");
        assert_eq!(fs::read(aside.join("db")).unwrap(), b"changed");
    }

    #[test]
    fn metadata_survives_reopen_and_prune_keeps_newest() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("xiuxian.db");
        fake_db(&db, b"players");
        let snapshots = temp.path().join("snapshots");
        let mut ids = Vec::new();
        {
            let mut manager = SnapshotManager::new(&db, &snapshots).unwrap();
            for _ in 0..4 {
                ids.push(manager.create(None).unwrap().id);
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
        }
        let mut manager = SnapshotManager::new(&db, &snapshots).unwrap();
        assert_eq!(manager.list().len(), 4);
        assert_eq!(manager.list()[0].id, ids[3]);

        let deleted = manager.prune(2).unwrap();
        assert_eq!(deleted.len(), 2);
        assert!(deleted.contains(&ids[0]) && deleted.contains(&ids[1]));
        let left: Vec<_> = manager.list().into_iter().map(|s| s.id).collect();
        assert_eq!(left, vec![ids[3].clone(), ids[2].clone()]);
    }

    #[test]
    fn missing_database_cannot_be_snapshotted() {
        let temp = TempDir::new().unwrap();
        let mut manager =
            SnapshotManager::new(temp.path().join("absent"), temp.path().join("snapshots")).unwrap();
        assert_eq!(manager.create(None).unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
