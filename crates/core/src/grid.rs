//! The mine: a grid of tiles that only ever grows downward.

use std::ops::Range;

use tracing::debug;

use crate::{
    error::{GameError, Result},
    ore::OreGenerator,
    tile::Tile,
};

/// Deepest the mine can grow.
pub const MAX_ROWS: usize = 200;
/// Widest a mine can be.
pub const MAX_COLS: usize = 20;

/// Row-major tile storage. Rows past the frontier do not exist yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MineGrid {
    cols: usize,
    tiles: Vec<Vec<Tile>>,
}

impl MineGrid {
    /// Generate a fresh grid of `rows` × `cols`, both clamped to `1..=MAX`.
    pub fn generate(rows: usize, cols: usize, ore: &mut OreGenerator) -> Self {
        let mut grid = Self {
            cols: cols.clamp(1, MAX_COLS),
            tiles: Vec::with_capacity(rows),
        };
        grid.expand_by(rows.clamp(1, MAX_ROWS), ore);
        grid
    }

    /// Build a grid from already decoded rows. Short rows are padded with
    /// stone, long rows truncated, and rows past `MAX_ROWS` dropped.
    pub fn from_rows(cols: usize, rows: Vec<Vec<Tile>>) -> Self {
        let cols = cols.clamp(1, MAX_COLS);
        let tiles = rows
            .into_iter()
            .take(MAX_ROWS)
            .map(|mut row| {
                row.resize(cols, Tile::Stone);
                row
            })
            .collect();
        Self { cols, tiles }
    }

    /// Number of generated rows, which is also the frontier depth.
    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_full_depth(&self) -> bool {
        self.rows() >= MAX_ROWS
    }

    /// Whether `(row, col)` lies inside the generated area.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols
    }

    /// Tile at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinates lie outside the generated area.
    pub fn tile_at(&self, row: usize, col: usize) -> Tile {
        self.check_bounds(row, col);
        self.tiles[row][col]
    }

    /// Replace the tile at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinates lie outside the generated area.
    pub fn set_tile(&mut self, row: usize, col: usize, tile: Tile) {
        self.check_bounds(row, col);
        self.tiles[row][col] = tile;
    }

    /// Non-panicking lookup for renderers.
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.tiles.get(row).and_then(|cells| cells.get(col)).copied()
    }

    /// Iterate over generated rows, surface first.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.tiles.iter().map(Vec::as_slice)
    }

    /// Fill rows `range.start..min(range.end, MAX_ROWS)` with sampled tiles.
    ///
    /// Generation must start exactly at the frontier: rows already dug are
    /// never regenerated and no gaps are left. Returns the number of rows
    /// added.
    pub fn generate_rows(
        &mut self,
        range: Range<usize>,
        ore: &mut OreGenerator,
    ) -> Result<usize> {
        let frontier = self.rows();
        if range.start != frontier {
            return Err(GameError::GridFrontier {
                start: range.start,
                frontier,
            });
        }
        let end = range.end.min(MAX_ROWS);
        for depth in range.start..end {
            let row = (0..self.cols).map(|_| ore.sample(depth)).collect();
            self.tiles.push(row);
        }
        Ok(end.saturating_sub(range.start))
    }

    /// Append up to `extra` rows, never growing past `MAX_ROWS`. Returns the
    /// number of rows actually added.
    pub fn expand_by(&mut self, extra: usize, ore: &mut OreGenerator) -> usize {
        let frontier = self.rows();
        let extra = extra.min(MAX_ROWS.saturating_sub(frontier));
        let added = self
            .generate_rows(frontier..frontier + extra, ore)
            .unwrap_or_default();
        if added > 0 {
            debug!(from = frontier, to = self.rows(), "Mine expanded");
        }
        added
    }

    fn check_bounds(&self, row: usize, col: usize) {
        assert!(
            self.contains(row, col),
            "tile ({row}, {col}) outside {}x{} mine",
            self.rows(),
            self.cols
        );
    }
}
