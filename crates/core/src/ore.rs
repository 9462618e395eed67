#![allow(missing_docs)]

//! Depth-scaled ore sampling.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::tile::Tile;

/// Rolls are drawn uniformly from `0..ROLL_RANGE`.
pub const ROLL_RANGE: u32 = 1000;

/// Rows per step of the rarity curve.
const DEPTH_STEP: usize = 5;

/// Cumulative thresholds out of [`ROLL_RANGE`]; anything at or above
/// `diamond` is a crystal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OreThresholds {
    pub stone: u32,
    pub coal: u32,
    pub iron: u32,
    pub gold: u32,
    pub diamond: u32,
}

impl OreThresholds {
    /// Thresholds for the surface rows.
    pub const SURFACE: Self = Self {
        stone: 600,
        coal: 850,
        iron: 940,
        gold: 985,
        diamond: 998,
    };

    /// Thresholds for a depth row index, shifted toward rarer ores as the
    /// mine deepens and clamped so no band ever collapses or inverts.
    pub fn at_depth(depth: usize) -> Self {
        let factor = i64::try_from(depth / DEPTH_STEP).unwrap_or(i64::MAX);
        let shift = |base: u32, per_step: i64| i64::from(base) - factor.saturating_mul(per_step);

        let stone = shift(Self::SURFACE.stone, 10).max(350);
        let coal = shift(Self::SURFACE.coal, 6).max(stone + 50);
        let iron = shift(Self::SURFACE.iron, 4).max(coal + 20);
        let gold = shift(Self::SURFACE.gold, 2).max(iron + 10);
        let diamond = shift(Self::SURFACE.diamond, 1).max(gold + 2);

        // every band is clamped upward from 350, so all values fit
        let narrow = |value: i64| value as u32;
        Self {
            stone: narrow(stone),
            coal: narrow(coal),
            iron: narrow(iron),
            gold: narrow(gold),
            diamond: narrow(diamond),
        }
    }

    /// Tile for a roll in `0..ROLL_RANGE`.
    pub fn classify(&self, roll: u32) -> Tile {
        if roll < self.stone {
            Tile::Stone
        } else if roll < self.coal {
            Tile::Coal
        } else if roll < self.iron {
            Tile::Iron
        } else if roll < self.gold {
            Tile::Gold
        } else if roll < self.diamond {
            Tile::Diamond
        } else {
            Tile::Crystal
        }
    }
}

/// Samples tiles for freshly generated rows.
///
/// Owns its random source so a game is reproducible from a seed.
#[derive(Clone, Debug)]
pub struct OreGenerator {
    rng: StdRng,
}

impl OreGenerator {
    /// Generator with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Use the configured seed when present, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Sample one tile for the given depth row index.
    pub fn sample(&mut self, depth: usize) -> Tile {
        Self::sample_with(&mut self.rng, depth)
    }

    /// Sample one tile using an arbitrary random source.
    pub fn sample_with<R: Rng + ?Sized>(rng: &mut R, depth: usize) -> Tile {
        let roll = rng.gen_range(0..ROLL_RANGE);
        OreThresholds::at_depth(depth).classify(roll)
    }
}
