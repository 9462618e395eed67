#![warn(clippy::all, missing_docs)]

//! Core domain logic for the DeepMine terminal mining game.
//!
//! This crate hosts the tile model, the depth-scaled ore generator, the
//! mine grid, the player economy, the game state machine and the save
//! file persistence used by the terminal UI.

pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod ore;
pub mod player;
pub mod save;
pub mod tile;

pub use config::AppConfig;
pub use error::GameError;
pub use game::{Command, Direction, GameState, MoveReport, Outcome, Phase};
pub use grid::{MineGrid, MAX_COLS, MAX_ROWS};
pub use ore::{OreGenerator, OreThresholds};
pub use player::{Inventory, PlayerState};
pub use save::{SaveManager, Snapshot};
pub use tile::{Ore, Tile};
