//! On-disk maintenance of the player database. Player records themselves are
//! read and written through [`crate::game::PlayerStore`].

pub mod snapshot;

pub use snapshot::{SnapshotManager, SnapshotMetadata};
