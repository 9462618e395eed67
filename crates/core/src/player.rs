#![allow(missing_docs)]

//! Player position, energy, inventory and the shop economy.

use tracing::info;

use crate::{
    error::{GameError, Result},
    tile::{Ore, Tile},
};

/// Energy a new player starts with; max energy never drops below it.
pub const STARTING_ENERGY: u32 = 10;
/// Price of the first pickaxe upgrade.
pub const PICKAXE_BASE_COST: u32 = 50;
/// Added to the pickaxe price for every level already owned.
pub const PICKAXE_COST_STEP: u32 = 30;
/// Flat price of a max-energy upgrade.
pub const ENERGY_UPGRADE_COST: u32 = 60;
/// Max energy gained per upgrade.
pub const ENERGY_UPGRADE_AMOUNT: u32 = 5;

/// Ore counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    pub coal: u32,
    pub iron: u32,
    pub gold: u32,
    pub diamond: u32,
    pub crystal: u32,
}

impl Inventory {
    /// Count held for one ore.
    pub fn count(&self, ore: Ore) -> u32 {
        match ore {
            Ore::Coal => self.coal,
            Ore::Iron => self.iron,
            Ore::Gold => self.gold,
            Ore::Diamond => self.diamond,
            Ore::Crystal => self.crystal,
        }
    }

    fn slot_mut(&mut self, ore: Ore) -> &mut u32 {
        match ore {
            Ore::Coal => &mut self.coal,
            Ore::Iron => &mut self.iron,
            Ore::Gold => &mut self.gold,
            Ore::Diamond => &mut self.diamond,
            Ore::Crystal => &mut self.crystal,
        }
    }

    /// Coins the whole inventory is worth.
    pub fn value(&self) -> u32 {
        Ore::ALL
            .iter()
            .map(|&ore| self.count(ore).saturating_mul(ore.price()))
            .fold(0, u32::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        Ore::ALL.iter().all(|&ore| self.count(ore) == 0)
    }
}

/// Everything about the miner apart from the mine itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerState {
    pub x: usize,
    pub y: usize,
    pub energy: u32,
    pub max_energy: u32,
    pub pickaxe_level: u32,
    pub coins: u32,
    pub inventory: Inventory,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            energy: STARTING_ENERGY,
            max_energy: STARTING_ENERGY,
            pickaxe_level: 1,
            coins: 0,
            inventory: Inventory::default(),
        }
    }
}

impl PlayerState {
    /// Pick up the ore carried by `tile`, if any. Clearing the tile is up to
    /// the caller, which owns the grid.
    pub fn collect(&mut self, tile: Tile) -> Option<Ore> {
        let ore = tile.ore()?;
        let slot = self.inventory.slot_mut(ore);
        *slot = slot.saturating_add(1);
        Some(ore)
    }

    /// Sell every ore, returning the coins earned.
    pub fn sell_all(&mut self) -> u32 {
        let earned = self.inventory.value();
        self.coins = self.coins.saturating_add(earned);
        self.inventory = Inventory::default();
        info!(earned, coins = self.coins, "Sold all ores");
        earned
    }

    /// Price of the next pickaxe level.
    pub fn pickaxe_upgrade_cost(&self) -> u32 {
        PICKAXE_BASE_COST.saturating_add(
            PICKAXE_COST_STEP.saturating_mul(self.pickaxe_level.saturating_sub(1)),
        )
    }

    /// Buy the next pickaxe level, returning the price paid.
    pub fn upgrade_pickaxe(&mut self) -> Result<u32> {
        let cost = self.pickaxe_upgrade_cost();
        let level = self
            .pickaxe_level
            .checked_add(1)
            .ok_or(GameError::MaxLevel)?;
        self.spend(cost)?;
        self.pickaxe_level = level;
        info!(level = self.pickaxe_level, cost, "Pickaxe upgraded");
        Ok(cost)
    }

    /// Buy extra max energy, returning the price paid. Current energy is left
    /// as is.
    pub fn upgrade_max_energy(&mut self) -> Result<u32> {
        let max_energy = self
            .max_energy
            .checked_add(ENERGY_UPGRADE_AMOUNT)
            .ok_or(GameError::MaxLevel)?;
        self.spend(ENERGY_UPGRADE_COST)?;
        self.max_energy = max_energy;
        info!(max_energy = self.max_energy, "Max energy increased");
        Ok(ENERGY_UPGRADE_COST)
    }

    /// Pull every field back inside its invariant for a `cols` × `rows`
    /// mine. A position outside the mine resets to the surface corner.
    pub fn normalize(&mut self, cols: usize, rows: usize) {
        if self.x >= cols {
            self.x = 0;
        }
        if self.y >= rows {
            self.y = 0;
        }
        self.pickaxe_level = self.pickaxe_level.max(1);
        self.max_energy = self.max_energy.max(STARTING_ENERGY);
        self.energy = self.energy.min(self.max_energy);
    }

    pub fn refill_energy(&mut self) {
        self.energy = self.max_energy;
    }

    pub fn has_energy(&self) -> bool {
        self.energy > 0
    }

    fn spend(&mut self, cost: u32) -> Result<()> {
        if self.coins < cost {
            return Err(GameError::InsufficientFunds {
                cost,
                coins: self.coins,
            });
        }
        self.coins -= cost;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_counts_ores_only() {
        let mut player = PlayerState::default();
        assert_eq!(player.collect(Tile::Coal), Some(Ore::Coal));
        assert_eq!(player.collect(Tile::Crystal), Some(Ore::Crystal));
        assert_eq!(player.collect(Tile::Stone), None);
        assert_eq!(player.collect(Tile::Empty), None);
        assert_eq!(player.inventory.coal, 1);
        assert_eq!(player.inventory.crystal, 1);
        assert_eq!(player.inventory.iron, 0);
    }

    #[test]
    fn sell_all_pays_listed_prices_and_empties_inventory() {
        let mut player = PlayerState {
            coins: 7,
            inventory: Inventory {
                coal: 3,
                iron: 2,
                gold: 1,
                diamond: 2,
                crystal: 1,
            },
            ..PlayerState::default()
        };
        let earned = player.sell_all();
        assert_eq!(earned, 3 * 2 + 2 * 5 + 12 + 2 * 40 + 80);
        assert_eq!(player.coins, 7 + earned);
        assert!(player.inventory.is_empty());
        assert_eq!(player.sell_all(), 0);
    }

    #[test]
    fn pickaxe_upgrade_charges_scaling_price() {
        let mut player = PlayerState {
            coins: 50,
            ..PlayerState::default()
        };
        assert_eq!(player.upgrade_pickaxe(), Ok(50));
        assert_eq!(player.coins, 0);
        assert_eq!(player.pickaxe_level, 2);
        assert_eq!(player.pickaxe_upgrade_cost(), 80);

        let before = player.clone();
        assert_eq!(
            player.upgrade_pickaxe(),
            Err(GameError::InsufficientFunds { cost: 80, coins: 0 })
        );
        assert_eq!(player, before);
    }

    #[test]
    fn energy_upgrade_raises_cap_without_refill() {
        let mut player = PlayerState {
            coins: 100,
            energy: 3,
            ..PlayerState::default()
        };
        assert_eq!(player.upgrade_max_energy(), Ok(60));
        assert_eq!(player.max_energy, 15);
        assert_eq!(player.energy, 3);
        assert_eq!(player.coins, 40);
        assert!(matches!(
            player.upgrade_max_energy(),
            Err(GameError::InsufficientFunds { cost: 60, coins: 40 })
        ));
        assert_eq!(player.max_energy, 15);
    }

    #[test]
    fn maxed_upgrades_fail_without_charging() {
        let mut player = PlayerState {
            coins: u32::MAX,
            pickaxe_level: u32::MAX,
            max_energy: u32::MAX,
            ..PlayerState::default()
        };
        let before = player.clone();
        assert_eq!(player.upgrade_pickaxe(), Err(GameError::MaxLevel));
        assert_eq!(player.upgrade_max_energy(), Err(GameError::MaxLevel));
        assert_eq!(player, before);
    }
}
