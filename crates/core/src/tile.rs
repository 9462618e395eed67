#![allow(missing_docs)]

//! Cell contents of the mine.

/// Content of one grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Non-collectible filler.
    Stone,
    Coal,
    Iron,
    Gold,
    Diamond,
    Crystal,
    /// Cleared cell, either dug stone or collected ore.
    Empty,
}

impl Tile {
    /// Ore carried by this tile, if it is collectible.
    pub const fn ore(self) -> Option<Ore> {
        match self {
            Self::Coal => Some(Ore::Coal),
            Self::Iron => Some(Ore::Iron),
            Self::Gold => Some(Ore::Gold),
            Self::Diamond => Some(Ore::Diamond),
            Self::Crystal => Some(Ore::Crystal),
            Self::Stone | Self::Empty => None,
        }
    }

    pub const fn is_ore(self) -> bool {
        self.ore().is_some()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::Stone
    }
}

/// Collectible resources tracked in the inventory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ore {
    Coal,
    Iron,
    Gold,
    Diamond,
    Crystal,
}

impl Ore {
    /// Every ore, cheapest first.
    pub const ALL: [Ore; 5] = [
        Ore::Coal,
        Ore::Iron,
        Ore::Gold,
        Ore::Diamond,
        Ore::Crystal,
    ];

    /// Coins paid per unit when selling.
    pub const fn price(self) -> u32 {
        match self {
            Self::Coal => 2,
            Self::Iron => 5,
            Self::Gold => 12,
            Self::Diamond => 40,
            Self::Crystal => 80,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Coal => "Coal",
            Self::Iron => "Iron",
            Self::Gold => "Gold",
            Self::Diamond => "Diamond",
            Self::Crystal => "Crystal",
        }
    }

    pub const fn tile(self) -> Tile {
        match self {
            Self::Coal => Tile::Coal,
            Self::Iron => Tile::Iron,
            Self::Gold => Tile::Gold,
            Self::Diamond => Tile::Diamond,
            Self::Crystal => Tile::Crystal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ores_are_collectible() {
        assert!(!Tile::Stone.is_ore());
        assert!(!Tile::Empty.is_ore());
        for ore in Ore::ALL {
            assert_eq!(ore.tile().ore(), Some(ore));
        }
    }
}
