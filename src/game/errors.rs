use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can arise while mutating or persisting the player aggregate.
#[derive(Debug, Error)]
pub enum GameError {
    /// Wrapper around IO errors (save directory creation, temp file writes, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON serialization errors.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// User input rejected before anything was mutated.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("habit not found: {0}")]
    HabitNotFound(u64),

    #[error("no quest at position {0}")]
    QuestIndexOutOfRange(usize),

    #[error("no location at position {0}")]
    LocationIndexOutOfRange(usize),

    /// Shop lookup failed.
    #[error("unknown reward item: {0}")]
    UnknownItem(String),

    /// Purchase would drive gold below zero.
    #[error("insufficient gold: need {needed}, have {available}")]
    InsufficientGold { needed: u64, available: u64 },
}
