#![deny(warnings)]

//! Game state store for Indie Hacker Journey.
//!
//! [`GameStore`] owns the player, their projects and campaigns, applies
//! every game mutation and hands a snapshot to the background save writer
//! after each successful one. Rules that are worth tuning live in
//! [`GameConfig`].

pub mod config;
pub mod error;
pub mod state;
pub mod store;
pub mod update;

pub use config::{ConfigError, GameConfig};
pub use error::{StoreError, StoreResult};
pub use state::{ActiveGame, GameState};
pub use store::{CampaignOutcome, GameStore};
pub use update::{CampaignUpdate, ProjectUpdate};
