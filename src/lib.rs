//! # xiuxian - cultivation progression and economy engine
//!
//! The game state behind a chat-hosted idle cultivation game. Players climb
//! nine realms by earning experience from meditation, herb gathering, mining
//! and dungeon fights; spend spirit stones on weapons; and gamble on
//! enhancing them. Everything a player owns lives in one record persisted in
//! sled.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xiuxian::game::{Catalog, GameRules, GameService, PlayerIdentity, PlayerStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = PlayerStore::open("./data/xiuxian.db")?;
//!     let service = GameService::new(store, Arc::new(Catalog::builtin()), GameRules::default());
//!
//!     let me = PlayerIdentity::new(1001, "hanli", "Han Li");
//!     let outcome = service.meditate(&me).await?;
//!     println!("+{} exp", outcome.exp_gained);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - realms, actions, shop, enhancement, combat and the player store
//! - [`config`] - TOML configuration
//! - [`storage`] - database snapshots
//! - [`logutil`] - log hygiene for user-supplied names

pub mod config;
pub mod game;
pub mod logutil;
pub mod storage;
