//! Error types for store operations.

use game_core::{CampaignId, ProjectId, ValidationError};
use game_econ::EconError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Why a store operation was rejected. A rejected operation changes nothing.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// No player has been created yet.
    #[error("no active game")]
    NoActiveGame,

    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("campaign {campaign} not found in project {project}")]
    CampaignNotFound {
        project: ProjectId,
        campaign: CampaignId,
    },

    /// The balance does not cover the requested spend.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    /// Negative amounts.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// A money total would leave the `Decimal` range.
    #[error("amount overflows the money range")]
    Overflow,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Econ(#[from] EconError),
}
