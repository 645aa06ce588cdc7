#![deny(warnings)]

//! Persistence layer: durable save slots, snapshot codec and the background writer.

pub mod kv;
pub mod sqlite;
pub mod writer;

pub use kv::{FileStore, KvStore, MemoryStore};
pub use sqlite::{init_db, SqliteStore};
pub use writer::{SaveFailure, SaveFailures, SaveHandle, SaveWriter};

use game_core::{validate_saved_game, SavedGame, ValidationError};
use thiserror::Error;

/// Slot holding the whole game.
pub const DEFAULT_SAVE_KEY: &str = "gameState";

/// Returns the default SQLite URL used for local saves.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./saves/main.db"
}

/// Errors raised by storage backends and the snapshot codec.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("malformed snapshot: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] ValidationError),
    #[error("invalid slot key: {0:?}")]
    InvalidKey(String),
    #[error("save writer is not running")]
    WriterClosed,
}

/// Serialize a snapshot to JSON.
pub fn encode_snapshot(save: &SavedGame) -> Result<String, PersistError> {
    Ok(serde_json::to_string(save)?)
}

/// Parse and validate a snapshot.
pub fn decode_snapshot(text: &str) -> Result<SavedGame, PersistError> {
    let save: SavedGame = serde_json::from_str(text)?;
    validate_saved_game(&save)?;
    Ok(save)
}
