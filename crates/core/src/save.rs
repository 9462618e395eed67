//! Save-game persistence in the classic line-oriented text layout.
//!
//! ```text
//! rows cols playerX playerY pickaxeLevel maxEnergy energy coins
//! coal iron gold diamond crystal
//! <rows lines of exactly cols tile symbols>
//! ```

use std::{
    fmt::Write as _,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::{
    error::GameError,
    game::GameState,
    grid::{MineGrid, MAX_COLS, MAX_ROWS},
    ore::OreGenerator,
    player::{Inventory, PlayerState},
    tile::Tile,
};

/// Directory under the user's data dir holding the save.
pub const DEFAULT_SAVE_DIR: &str = "deepmine";
/// File name of the save.
pub const DEFAULT_SAVE_FILE: &str = "save.txt";

const HEADER_FIELDS: usize = 8;
const INVENTORY_FIELDS: usize = 5;
const FALLBACK_DIMENSION: usize = 5;

/// Symbol written for a tile.
pub fn tile_symbol(tile: Tile) -> char {
    match tile {
        Tile::Stone => '#',
        Tile::Coal => 'C',
        Tile::Iron => 'I',
        Tile::Gold => 'G',
        Tile::Diamond => 'D',
        Tile::Crystal => 'X',
        Tile::Empty => ' ',
    }
}

/// Tile for a saved symbol, if it is one.
pub fn tile_from_symbol(symbol: char) -> Option<Tile> {
    let tile = match symbol {
        '#' => Tile::Stone,
        'C' => Tile::Coal,
        'I' => Tile::Iron,
        'G' => Tile::Gold,
        'D' => Tile::Diamond,
        'X' => Tile::Crystal,
        ' ' => Tile::Empty,
        _ => return None,
    };
    Some(tile)
}

/// A decoded save: everything but the random source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub grid: MineGrid,
    pub player: PlayerState,
}

impl Snapshot {
    /// Turn the snapshot into a playable game drawing new rows from `ore`.
    pub fn into_game(self, ore: OreGenerator) -> GameState {
        GameState::from_parts(self.grid, self.player, ore)
    }
}

/// Render a game in the save layout. The player is stored only in the
/// header; its cell holds the underlying tile.
pub fn encode(game: &GameState) -> String {
    let grid = game.grid();
    let player = game.player();
    let inv = &player.inventory;
    let mut out = String::with_capacity(grid.rows() * (grid.cols() + 1) + 64);

    // writing into a String cannot fail
    let _ = writeln!(
        out,
        "{} {} {} {} {} {} {} {}",
        grid.rows(),
        grid.cols(),
        player.x,
        player.y,
        player.pickaxe_level,
        player.max_energy,
        player.energy,
        player.coins
    );
    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        inv.coal, inv.iron, inv.gold, inv.diamond, inv.crystal
    );
    for row in grid.iter_rows() {
        out.extend(row.iter().copied().map(tile_symbol));
        out.push('\n');
    }
    out
}

/// Parse save text. Only malformed header or inventory lines are fatal;
/// everything after them is repaired.
pub fn decode(text: &str) -> Result<Snapshot, GameError> {
    let mut lines = text.lines();
    let header = parse_numbers::<HEADER_FIELDS>(lines.next(), "header")?;
    let counts = parse_numbers::<INVENTORY_FIELDS>(lines.next(), "inventory")?;
    let [rows, cols, x, y, pickaxe_level, max_energy, energy, coins] = header;

    let rows = dimension(rows, MAX_ROWS, "rows");
    let cols = dimension(cols, MAX_COLS, "cols");
    let x = coordinate(x, cols);
    let y = coordinate(y, rows);

    let mut unknown = 0usize;
    let tiles: Vec<Vec<Tile>> = (0..rows)
        .map(|_| {
            let line = lines.next().unwrap_or_default();
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.chars()
                .take(cols)
                .map(|symbol| {
                    tile_from_symbol(symbol).unwrap_or_else(|| {
                        unknown += 1;
                        Tile::Stone
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();
    if unknown > 0 {
        warn!(unknown, "Unknown tile symbols in save read as stone");
    }

    let [coal, iron, gold, diamond, crystal] = counts.map(count);
    let mut player = PlayerState {
        x,
        y,
        energy: count(energy),
        max_energy: count(max_energy),
        pickaxe_level: count(pickaxe_level),
        coins: count(coins),
        inventory: Inventory {
            coal,
            iron,
            gold,
            diamond,
            crystal,
        },
    };
    player.normalize(cols, rows);
    Ok(Snapshot {
        grid: MineGrid::from_rows(cols, tiles),
        player,
    })
}

fn parse_numbers<const N: usize>(
    line: Option<&str>,
    what: &str,
) -> Result<[i64; N], GameError> {
    let line = line.ok_or_else(|| GameError::InvalidSave(format!("missing {what} line")))?;
    let values = line
        .split_whitespace()
        .map(str::parse::<i64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| GameError::InvalidSave(format!("{what} line: {err}")))?;
    let found = values.len();
    values.try_into().map_err(|_| {
        GameError::InvalidSave(format!("{what} line has {found} numbers, expected {N}"))
    })
}

fn dimension(value: i64, max: usize, what: &str) -> usize {
    match usize::try_from(value) {
        Ok(value) if (1..=max).contains(&value) => value,
        _ => {
            warn!(value, field = what, "Save dimension out of range, using default");
            FALLBACK_DIMENSION
        }
    }
}

fn coordinate(value: i64, limit: usize) -> usize {
    usize::try_from(value)
        .ok()
        .filter(|&value| value < limit)
        .unwrap_or(0)
}

fn count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Manager responsible for the single save file.
#[derive(Debug, Clone)]
pub struct SaveManager {
    path: PathBuf,
}

impl SaveManager {
    /// Create a manager for the save file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_SAVE_DIR)
            .join(DEFAULT_SAVE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the game, replacing any previous save only once the new one is
    /// complete.
    pub fn save(&self, game: &GameState) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

        let mut file = NamedTempFile::new_in(&dir)
            .with_context(|| format!("failed to create temporary save in {}", dir.display()))?;
        file.write_all(encode(game).as_bytes())
            .context("failed to write save data")?;
        file.as_file()
            .sync_all()
            .context("failed to flush save data")?;
        file.persist(&self.path)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        info!(path = %self.path.display(), rows = game.grid().rows(), "Game saved");
        Ok(())
    }

    /// Read the save. A missing or malformed file is "no save" and yields
    /// `None`; only unexpected I/O failures are errors.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        match decode(&content) {
            Ok(snapshot) => {
                info!(path = %self.path.display(), "Save loaded");
                Ok(Some(snapshot))
            }
            Err(err) => {
                warn!(path = %self.path.display(), "Ignoring save: {err}");
                Ok(None)
            }
        }
    }

    /// Remove the save file if there is one.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to delete {}", self.path.display()))
            }
        }
    }

    /// Reset to a fresh game and persist it straight away.
    pub fn new_game(&self, ore: OreGenerator) -> Result<GameState> {
        self.delete()?;
        let game = GameState::new_game(ore);
        self.save(&game)?;
        Ok(game)
    }

    /// Handle the quit command: end the session, then persist. The session
    /// ends even when the write fails.
    pub fn end_session(&self, game: &mut GameState) -> Result<()> {
        game.end_session();
        self.save(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
5 3 1 2 2 15 7 40
1 2 3 4 5
#CI
GDX
# #
   
###
";

    fn played_game() -> GameState {
        let mut game = GameState::new_game(OreGenerator::seeded(99));
        for direction in [
            Direction::Down,
            Direction::Down,
            Direction::Right,
            Direction::Down,
            Direction::Right,
        ] {
            game.move_player(direction).unwrap();
        }
        game.player_mut().coins = 130;
        game.player_mut().inventory.gold = 3;
        game
    }

    #[test]
    fn decodes_classic_layout() {
        let snapshot = decode(SAMPLE).unwrap();
        let player = &snapshot.player;
        assert_eq!((player.x, player.y), (1, 2));
        assert_eq!(player.pickaxe_level, 2);
        assert_eq!(player.max_energy, 15);
        assert_eq!(player.energy, 7);
        assert_eq!(player.coins, 40);
        assert_eq!(
            player.inventory,
            Inventory {
                coal: 1,
                iron: 2,
                gold: 3,
                diamond: 4,
                crystal: 5,
            }
        );
        let grid = &snapshot.grid;
        assert_eq!((grid.rows(), grid.cols()), (5, 3));
        assert_eq!(grid.tile_at(0, 1), Tile::Coal);
        assert_eq!(grid.tile_at(1, 2), Tile::Crystal);
        assert_eq!(grid.tile_at(2, 1), Tile::Empty);
        assert_eq!(grid.tile_at(3, 0), Tile::Empty);
    }

    #[test]
    fn save_text_round_trips() {
        let game = played_game();
        let first = encode(&game);
        let restored = decode(&first).unwrap().into_game(OreGenerator::seeded(1));
        assert_eq!(encode(&restored), first);
        assert_eq!(restored.position(), game.position());
        assert_eq!(restored.player(), game.player());
        assert_eq!(restored.grid(), game.grid());
    }

    #[test]
    fn player_cell_is_written_as_its_tile() {
        let mut game = GameState::new_game(OreGenerator::seeded(5));
        game.grid_mut().set_tile(0, 0, Tile::Gold);
        let text = encode(&game);
        assert_eq!(text.lines().nth(2).unwrap().chars().next(), Some('G'));
        assert!(!text.contains('*'));
    }

    #[test]
    fn short_header_is_invalid() {
        let err = decode("5 5 0 0 1 10\n0 0 0 0 0\n").unwrap_err();
        assert!(matches!(err, GameError::InvalidSave(_)));
    }

    #[test]
    fn malformed_inventory_is_invalid() {
        for text in [
            "5 5 0 0 1 10 10 0\n0 0 0 0\n",
            "5 5 0 0 1 10 10 0\n0 0 x 0 0\n",
            "5 5 0 0 1 10 10 0\n0 0 0 0 0 0\n",
            "5 5 0 0 1 10 10 0\n",
        ] {
            assert!(
                matches!(decode(text), Err(GameError::InvalidSave(_))),
                "{text:?}"
            );
        }
    }

    #[test]
    fn out_of_range_fields_are_clamped() {
        let snapshot = decode("999 0 -3 42 0 4 90 -5\n-1 2 3 4 5\n").unwrap();
        assert_eq!(snapshot.grid.rows(), 5);
        assert_eq!(snapshot.grid.cols(), 5);
        let player = &snapshot.player;
        assert_eq!((player.x, player.y), (0, 0));
        assert_eq!(player.pickaxe_level, 1);
        assert_eq!(player.max_energy, 10);
        assert_eq!(player.energy, 10);
        assert_eq!(player.coins, 0);
        assert_eq!(player.inventory.coal, 0);
        // missing grid lines become stone
        assert!(snapshot
            .grid
            .iter_rows()
            .all(|row| row.iter().all(|&tile| tile == Tile::Stone)));
    }

    #[test]
    fn short_and_odd_grid_lines_are_repaired() {
        let snapshot = decode("2 4 0 0 1 10 10 0\n0 0 0 0 0\nC?\r\nGGGGGG\n").unwrap();
        let rows: Vec<Vec<Tile>> = snapshot.grid.iter_rows().map(<[Tile]>::to_vec).collect();
        assert_eq!(
            rows,
            vec![
                vec![Tile::Coal, Tile::Stone, Tile::Stone, Tile::Stone],
                vec![Tile::Gold; 4],
            ]
        );
    }

    #[test]
    fn manager_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let manager = SaveManager::new(dir.path().join("nested").join(DEFAULT_SAVE_FILE));
        assert!(manager.load()?.is_none());

        let game = played_game();
        manager.save(&game)?;
        assert!(manager.exists());

        let restored = manager
            .load()?
            .expect("expected a save")
            .into_game(OreGenerator::seeded(2));
        assert_eq!(encode(&restored), encode(&game));
        Ok(())
    }

    #[test]
    fn corrupt_save_reads_as_missing() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(DEFAULT_SAVE_FILE);
        fs::write(&path, "5 5 0 0 1 10\n0 0 0 0 0\n")?;
        let manager = SaveManager::new(&path);
        assert!(manager.load()?.is_none());
        // the corrupt file is left for the player to inspect
        assert!(manager.exists());
        Ok(())
    }

    #[test]
    fn new_game_replaces_previous_save() -> Result<()> {
        let dir = tempdir()?;
        let manager = SaveManager::new(dir.path().join(DEFAULT_SAVE_FILE));
        manager.save(&played_game())?;

        let fresh = manager.new_game(OreGenerator::seeded(8))?;
        let stored = manager.load()?.expect("new game is saved immediately");
        assert_eq!(stored.player, PlayerState::default());
        assert_eq!(stored.grid, *fresh.grid());
        Ok(())
    }

    #[test]
    fn end_session_saves_and_blocks_moves() -> Result<()> {
        let dir = tempdir()?;
        let manager = SaveManager::new(dir.path().join(DEFAULT_SAVE_FILE));
        let mut game = played_game();
        manager.end_session(&mut game)?;

        assert_eq!(game.move_player(Direction::Up), Err(GameError::SessionEnded));
        let stored = fs::read_to_string(manager.path())?;
        assert_eq!(stored, encode(&game));
        Ok(())
    }

    #[test]
    fn delete_tolerates_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let manager = SaveManager::new(dir.path().join(DEFAULT_SAVE_FILE));
        manager.delete()?;
        manager.save(&played_game())?;
        manager.delete()?;
        assert!(!manager.exists());
        Ok(())
    }

    #[test]
    fn saturated_counters_load_and_upgrades_stay_safe() -> anyhow::Result<()> {
        let snapshot = decode("5 5 0 0 4294967295 10 10 4294967295\n0 0 0 0 0\n")?;
        let mut game = snapshot.into_game(OreGenerator::seeded(8));
        assert_eq!(game.player().pickaxe_level, u32::MAX);
        assert_eq!(game.upgrade_pickaxe(), Err(GameError::MaxLevel));
        assert_eq!(game.player().coins, u32::MAX);
        assert_eq!(game.player().pickaxe_level, u32::MAX);
        Ok(())
    }
}
