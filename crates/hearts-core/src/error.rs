//! Error taxonomy shared by the engine and its drivers.

use crate::model::card::Card;
use crate::model::trick::TrickError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The submitted card is not among the player's legal moves. With action
    /// masking off the engine substitutes a legal card instead of failing.
    #[error("player {player} may not play {card}")]
    IllegalMove { player: usize, card: Card },
    /// Internal state is inconsistent. Indicates a logic defect; the game
    /// should be abandoned.
    #[error("game invariant violated: {0}")]
    InvariantViolation(String),
    #[error("{field}: {message}")]
    InvalidConfig { field: String, message: String },
    #[error("game is already over")]
    GameOver,
    #[error(transparent)]
    Trick(#[from] TrickError),
}

impl GameError {
    pub fn invariant(message: impl Into<String>) -> Self {
        GameError::InvariantViolation(message.into())
    }
}
