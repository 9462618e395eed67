//! Domain errors reported by the game core.

use thiserror::Error;

/// Failures surfaced by grid, economy, movement and save decoding operations.
///
/// None of these are fatal: callers report them and keep the session going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The save text could not be decoded; callers treat this as "no save".
    #[error("no valid save: {0}")]
    InvalidSave(String),
    /// A move would leave the grid.
    #[error("move leaves the mine")]
    OutOfBounds,
    /// A shop purchase costs more than the player owns.
    #[error("not enough coins: need {cost}, have {coins}")]
    InsufficientFunds {
        /// Price of the rejected purchase.
        cost: u32,
        /// Coins the player had at the time.
        coins: u32,
    },
    /// The upgrade cannot go any higher.
    #[error("already at the highest level")]
    MaxLevel,
    /// Movement is blocked until energy is restored.
    #[error("no energy left")]
    NoEnergy,
    /// The session already ended; the mine must be re-entered first.
    #[error("session already ended")]
    SessionEnded,
    /// Row generation was requested somewhere other than the frontier.
    #[error("rows can only be generated at the frontier {frontier}, requested {start}")]
    GridFrontier {
        /// First row of the rejected request.
        start: usize,
        /// Current number of generated rows.
        frontier: usize,
    },
}

/// Result alias for core game operations.
pub type Result<T> = core::result::Result<T, GameError>;
