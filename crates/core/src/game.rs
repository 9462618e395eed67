#![allow(missing_docs)]

//! The game aggregate: mine, miner, ore source and session phase.

use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    error::{GameError, Result},
    grid::MineGrid,
    ore::OreGenerator,
    player::PlayerState,
    tile::{Ore, Tile},
};

/// Size of the grid a new game starts with.
pub const INITIAL_ROWS: usize = 5;
/// Width of a new mine.
pub const INITIAL_COLS: usize = 5;
/// The mine deepens once the player is this close to the frontier.
pub const EXPAND_MARGIN: usize = 3;
/// Rows appended per expansion.
pub const EXPAND_ROWS: usize = 4;

/// Compass direction of a single step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Target of a step from `(x, y)`, or `None` when it would leave
    /// `cols` × `rows`.
    pub fn step(
        self,
        (x, y): (usize, usize),
        (cols, rows): (usize, usize),
    ) -> Option<(usize, usize)> {
        let (nx, ny) = match self {
            Self::Up => (Some(x), y.checked_sub(1)),
            Self::Down => (Some(x), y.checked_add(1)),
            Self::Left => (x.checked_sub(1), Some(y)),
            Self::Right => (x.checked_add(1), Some(y)),
        };
        match (nx, ny) {
            (Some(nx), Some(ny)) if nx < cols && ny < rows => Some((nx, ny)),
            _ => None,
        }
    }
}

/// A player request the game understands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Sell,
    UpgradePickaxe,
    UpgradeEnergy,
    /// End the session; the caller persists the game.
    Quit,
}

/// Text that does not name a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let command = match input.trim().to_ascii_lowercase().as_str() {
            "w" | "up" => Self::Move(Direction::Up),
            "s" | "down" => Self::Move(Direction::Down),
            "a" | "left" => Self::Move(Direction::Left),
            "d" | "right" => Self::Move(Direction::Right),
            "e" | "end" | "quit" | "q" => Self::Quit,
            "sell" => Self::Sell,
            "pickaxe" => Self::UpgradePickaxe,
            "energy" => Self::UpgradeEnergy,
            other => return Err(UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

/// Where the current session stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next command.
    Idle,
    /// The player left the mine; moves are rejected until it is re-entered.
    SessionEnded,
}

/// Result of a single accepted step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub position: (usize, usize),
    /// What the target cell held before the step.
    pub dug: Tile,
    pub collected: Option<Ore>,
    /// Rows appended because the player neared the frontier.
    pub expanded: usize,
}

/// What an accepted command did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Moved(MoveReport),
    Sold { earned: u32 },
    PickaxeUpgraded { cost: u32, level: u32 },
    EnergyUpgraded { cost: u32, max_energy: u32 },
    SessionEnded,
}

/// Exclusive owner of one mine and one miner.
#[derive(Clone, Debug)]
pub struct GameState {
    grid: MineGrid,
    player: PlayerState,
    ore: OreGenerator,
    phase: Phase,
}

impl GameState {
    /// Fresh default game: a 5×5 mine and a starting player.
    pub fn new_game(mut ore: OreGenerator) -> Self {
        let grid = MineGrid::generate(INITIAL_ROWS, INITIAL_COLS, &mut ore);
        info!(rows = grid.rows(), cols = grid.cols(), "New mine generated");
        Self {
            grid,
            player: PlayerState::default(),
            ore,
            phase: Phase::Idle,
        }
    }

    /// Assemble a game from restored parts. The player is clamped back into
    /// the grid and its invariants.
    pub fn from_parts(grid: MineGrid, mut player: PlayerState, ore: OreGenerator) -> Self {
        player.normalize(grid.cols(), grid.rows());
        Self {
            grid,
            player,
            ore,
            phase: Phase::Idle,
        }
    }

    pub fn grid(&self) -> &MineGrid {
        &self.grid
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Player position as `(x, y)`.
    pub fn position(&self) -> (usize, usize) {
        (self.player.x, self.player.y)
    }

    /// Start a session. A depleted miner comes back rested.
    pub fn enter_mine(&mut self) {
        if self.player.energy == 0 || self.player.energy > self.player.max_energy {
            self.player.refill_energy();
            info!(energy = self.player.energy, "Energy restored");
        }
        self.phase = Phase::Idle;
    }

    /// Mark the session as over. Persisting is left to the caller.
    pub fn end_session(&mut self) {
        self.phase = Phase::SessionEnded;
        info!(
            depth = self.player.y,
            rows = self.grid.rows(),
            coins = self.player.coins,
            "Session ended"
        );
    }

    /// Dispatch one command.
    pub fn apply(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Move(direction) => self.move_player(direction).map(Outcome::Moved),
            Command::Sell => Ok(Outcome::Sold {
                earned: self.sell_all(),
            }),
            Command::UpgradePickaxe => {
                let cost = self.upgrade_pickaxe()?;
                Ok(Outcome::PickaxeUpgraded {
                    cost,
                    level: self.player.pickaxe_level,
                })
            }
            Command::UpgradeEnergy => {
                let cost = self.upgrade_max_energy()?;
                Ok(Outcome::EnergyUpgraded {
                    cost,
                    max_energy: self.player.max_energy,
                })
            }
            Command::Quit => {
                if self.phase == Phase::SessionEnded {
                    return Err(GameError::SessionEnded);
                }
                self.end_session();
                Ok(Outcome::SessionEnded)
            }
        }
    }

    /// Take one step, digging or collecting whatever is in the way.
    ///
    /// Rejected steps leave the game untouched.
    pub fn move_player(&mut self, direction: Direction) -> Result<MoveReport> {
        if self.phase == Phase::SessionEnded {
            return Err(GameError::SessionEnded);
        }
        let bounds = (self.grid.cols(), self.grid.rows());
        let (x, y) = direction
            .step(self.position(), bounds)
            .ok_or(GameError::OutOfBounds)?;
        if !self.player.has_energy() {
            return Err(GameError::NoEnergy);
        }

        let dug = self.grid.tile_at(y, x);
        let collected = self.player.collect(dug);
        if dug != Tile::Empty {
            self.grid.set_tile(y, x, Tile::Empty);
        }
        self.player.x = x;
        self.player.y = y;
        self.player.energy -= 1;

        let mut expanded = 0;
        if y + EXPAND_MARGIN >= self.grid.rows() && !self.grid.is_full_depth() {
            expanded = self.grid.expand_by(EXPAND_ROWS, &mut self.ore);
        }
        debug!(x, y, ?dug, energy = self.player.energy, "Player moved");
        Ok(MoveReport {
            position: (x, y),
            dug,
            collected,
            expanded,
        })
    }

    pub fn sell_all(&mut self) -> u32 {
        self.player.sell_all()
    }

    pub fn upgrade_pickaxe(&mut self) -> Result<u32> {
        self.player.upgrade_pickaxe()
    }

    pub fn upgrade_max_energy(&mut self) -> Result<u32> {
        self.player.upgrade_max_energy()
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut MineGrid {
        &mut self.grid
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }
}
