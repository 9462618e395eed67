use std::io;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use deepmine_core::{
    game::{Command, Direction, Outcome},
    player::{ENERGY_UPGRADE_AMOUNT, ENERGY_UPGRADE_COST},
    save::tile_symbol,
    AppConfig, GameError, GameState, Ore, SaveManager, Tile,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction as Axis, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{error, info};

use crate::banner;

const PLAYER_GLYPH: char = '*';

const MENU_ITEMS: [&str; 8] = [
    "New Game (resets save)",
    "Continue (load save)",
    "Play (current game)",
    "Inventory",
    "Sell Ores",
    "Shop",
    "Help",
    "Exit (saves)",
];

const HELP_LINES: [&str; 6] = [
    "W/A/S/D or arrows : move. Every step costs 1 energy.",
    "Stepping on an ore (C/I/G/D/X) picks it up automatically.",
    "Stone (#) is dug out as you walk through it.",
    "E or Esc : end the session, save and return to the menu.",
    "Sell ores for coins, then upgrade your pickaxe and energy in the shop.",
    "Deeper rows hold rarer ores. Out of energy? End the session to rest.",
];

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    primary_fg: Color,
    muted_fg: Color,
    player: Color,
    warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            primary_fg: Color::White,
            muted_fg: Color::DarkGray,
            player: Color::LightYellow,
            warning: Color::LightRed,
        }
    }
}

impl Theme {
    fn tile_style(&self, tile: Tile) -> Style {
        let color = match tile {
            Tile::Stone => self.muted_fg,
            Tile::Coal => Color::Gray,
            Tile::Iron => Color::LightRed,
            Tile::Gold => Color::Yellow,
            Tile::Diamond => Color::LightCyan,
            Tile::Crystal => Color::LightMagenta,
            Tile::Empty => self.primary_fg,
        };
        let style = Style::default().fg(color);
        if matches!(tile, Tile::Diamond | Tile::Crystal) {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Menu,
    Mine,
    Inventory,
    SellConfirm,
    Shop,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShopItem {
    Pickaxe,
    MaxEnergy,
    Sell,
    Back,
}

impl ShopItem {
    const ALL: [ShopItem; 4] = [Self::Pickaxe, Self::MaxEnergy, Self::Sell, Self::Back];
}

/// Terminal front end: reads keys, forwards commands to the game and draws
/// whatever state the core exposes.
pub struct DeepMineApp {
    config: AppConfig,
    save_manager: SaveManager,
    game: GameState,
    screen: Screen,
    state: UiState,
    theme: Theme,
}

impl DeepMineApp {
    pub fn new(config: AppConfig) -> Self {
        let save_manager = config.save_manager();
        let (game, status) = match save_manager.load() {
            Ok(Some(snapshot)) => (
                snapshot.into_game(config.ore_generator()),
                "Save loaded. Choose Continue or Play.".to_string(),
            ),
            Ok(None) => (
                GameState::new_game(config.ore_generator()),
                "No save found. A new mine is ready.".to_string(),
            ),
            Err(err) => {
                error!(?err, "Failed to read save");
                (
                    GameState::new_game(config.ore_generator()),
                    format!("Could not read save: {err}"),
                )
            }
        };
        let mut state = UiState::default();
        state.set_status(status);
        Self {
            config,
            save_manager,
            game,
            screen: Screen::Menu,
            state,
            theme: Theme::default(),
        }
    }

    /// Run until the player exits. Returns the farewell line to print once
    /// the terminal is restored.
    pub fn run(&mut self) -> Result<String> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result?;
        Ok(self.state.status.clone())
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                return Ok(());
            }
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.exit();
            return;
        }
        match self.screen {
            Screen::Menu => self.handle_menu_key(key),
            Screen::Mine => self.handle_mine_key(key),
            Screen::SellConfirm => self.handle_sell_confirm_key(key),
            Screen::Shop => self.handle_shop_key(key),
            Screen::Inventory | Screen::Help => self.screen = Screen::Menu,
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.move_menu_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_menu_cursor(-1),
            KeyCode::Char(ch @ '1'..='8') => {
                let index = ch as usize - '1' as usize;
                self.state.menu_cursor = index;
                self.select_menu_item(index);
            }
            KeyCode::Enter => self.select_menu_item(self.state.menu_cursor),
            KeyCode::Esc | KeyCode::Char('q') => self.exit(),
            _ => {}
        }
    }

    fn select_menu_item(&mut self, index: usize) {
        match index {
            0 => self.start_new_game(),
            1 => self.continue_saved_game(),
            2 => self.enter_mine("Back in the mine"),
            3 => self.screen = Screen::Inventory,
            4 => self.screen = Screen::SellConfirm,
            5 => {
                self.state.shop_cursor = 0;
                self.screen = Screen::Shop;
            }
            6 => self.screen = Screen::Help,
            7 => self.exit(),
            _ => {}
        }
    }

    fn start_new_game(&mut self) {
        match self.save_manager.new_game(self.config.ore_generator()) {
            Ok(game) => {
                self.game = game;
                self.enter_mine("New game created. Starting...");
            }
            Err(err) => {
                error!(?err, "Failed to persist new game");
                self.game = GameState::new_game(self.config.ore_generator());
                self.enter_mine(&format!("New game started, but saving failed: {err}"));
            }
        }
    }

    fn continue_saved_game(&mut self) {
        match self.save_manager.load() {
            Ok(Some(snapshot)) => {
                self.game = snapshot.into_game(self.config.ore_generator());
                self.enter_mine("Save loaded. Resuming...");
            }
            Ok(None) => self
                .state
                .set_status("No valid save found. Start a new game instead.".to_string()),
            Err(err) => {
                error!(?err, "Failed to load save");
                self.state.set_status(format!("Failed to load save: {err}"));
            }
        }
    }

    fn enter_mine(&mut self, message: &str) {
        self.game.enter_mine();
        self.screen = Screen::Mine;
        info!(position = ?self.game.position(), "Entered mine");
        self.state.set_status(message.to_string());
    }

    fn handle_mine_key(&mut self, key: KeyEvent) {
        let direction = match mine_command(key.code) {
            Some(Command::Move(direction)) => direction,
            Some(Command::Quit) => {
                self.end_session();
                return;
            }
            _ => return,
        };
        match self.game.apply(Command::Move(direction)) {
            Ok(Outcome::Moved(report)) => {
                let mut message = match report.collected {
                    Some(ore) => format!("Collected {}!", ore.name()),
                    None if report.dug == Tile::Stone => "Dug through stone.".to_string(),
                    None => String::new(),
                };
                if report.expanded > 0 {
                    if !message.is_empty() {
                        message.push(' ');
                    }
                    message.push_str("The mine goes deeper...");
                }
                self.state.set_status(message);
            }
            Ok(_) => {}
            // walking into the edge is a silent no-op
            Err(GameError::OutOfBounds) => {}
            Err(GameError::NoEnergy) => self.state.set_status(
                "You have no energy left. Press E to return to the menu and recover.".to_string(),
            ),
            Err(err) => self.state.set_status(err.to_string()),
        }
    }

    fn end_session(&mut self) {
        let message = match self.save_manager.end_session(&mut self.game) {
            Ok(()) => format!(
                "Saved at {}. Returned to menu.",
                Local::now().format("%H:%M:%S")
            ),
            Err(err) => {
                error!(?err, "Failed to save on session end");
                format!("Returned to menu, but saving failed: {err}")
            }
        };
        self.screen = Screen::Menu;
        self.state.set_status(message);
    }

    fn handle_sell_confirm_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            self.sell_all();
        } else {
            self.state.set_status("Kept your ores.".to_string());
        }
        self.screen = Screen::Menu;
    }

    fn sell_all(&mut self) {
        if let Ok(Outcome::Sold { earned }) = self.game.apply(Command::Sell) {
            self.state
                .set_status(format!("Sold all ores. You obtained {earned} coins."));
        }
    }

    fn handle_shop_key(&mut self, key: KeyEvent) {
        let count = ShopItem::ALL.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.shop_cursor = (self.state.shop_cursor + 1) % count;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.shop_cursor = (self.state.shop_cursor + count - 1) % count;
            }
            KeyCode::Char(ch @ '1'..='4') => {
                let index = ch as usize - '1' as usize;
                self.state.shop_cursor = index;
                self.buy(ShopItem::ALL[index]);
            }
            KeyCode::Enter => self.buy(ShopItem::ALL[self.state.shop_cursor]),
            KeyCode::Esc => self.screen = Screen::Menu,
            _ => {}
        }
    }

    fn buy(&mut self, item: ShopItem) {
        let command = match item {
            ShopItem::Pickaxe => Command::UpgradePickaxe,
            ShopItem::MaxEnergy => Command::UpgradeEnergy,
            ShopItem::Sell => {
                self.sell_all();
                return;
            }
            ShopItem::Back => {
                self.screen = Screen::Menu;
                return;
            }
        };
        let message = match self.game.apply(command) {
            Ok(Outcome::PickaxeUpgraded { level, .. }) => {
                format!("Pickaxe upgraded to level {level}!")
            }
            Ok(Outcome::EnergyUpgraded { max_energy, .. }) => {
                format!("Max energy increased to {max_energy}!")
            }
            Ok(_) => String::new(),
            Err(GameError::InsufficientFunds { cost, coins }) => {
                format!("Not enough coins ({coins}/{cost}).")
            }
            Err(err) => err.to_string(),
        };
        self.state.set_status(message);
    }

    fn exit(&mut self) {
        let message = match self.save_manager.save(&self.game) {
            Ok(()) => "Saved. Goodbye!".to_string(),
            Err(err) => {
                error!(?err, "Failed to save on exit");
                format!("Save failed: {err:#}. Goodbye anyway.")
            }
        };
        self.state.set_status(message);
        self.state.should_quit = true;
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Menu => self.draw_menu(frame),
            Screen::Mine => self.draw_mine(frame),
            Screen::Inventory => self.draw_inventory(frame),
            Screen::SellConfirm => {
                self.draw_menu(frame);
                self.render_sell_prompt(frame);
            }
            Screen::Shop => self.draw_shop(frame),
            Screen::Help => self.draw_help(frame),
        }
    }

    fn draw_menu(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let banner_lines = banner::render("DeepMine");
        let banner_height = banner_lines.len() as u16;
        let layout = Layout::default()
            .direction(Axis::Vertical)
            .constraints([
                Constraint::Length((banner_height + 2).min(area.height)),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(area);

        let banner_content: Vec<Line> = banner_lines
            .into_iter()
            .map(|line| {
                Line::from(Span::styled(
                    line,
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();
        let banner = Paragraph::new(banner_content).alignment(Alignment::Center);
        frame.render_widget(banner, layout[0]);

        let menu_height = (MENU_ITEMS.len() as u16 + 2).min(layout[1].height);
        let menu_width = 34.min(layout[1].width.max(1));
        let menu_area = centered_rect(menu_width, menu_height, layout[1]);
        let menu_lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(idx, item)| self.selectable_line(idx + 1, item, idx == self.state.menu_cursor))
            .collect();
        let menu = Paragraph::new(menu_lines)
            .block(Block::default().borders(Borders::ALL).title("Menu"));
        frame.render_widget(menu, menu_area);

        self.render_status(frame, layout[2]);
    }

    fn draw_mine(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let rows = Layout::default()
            .direction(Axis::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(area);
        let body = Layout::default()
            .direction(Axis::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(34)])
            .split(rows[0]);

        self.render_board(frame, body[0]);
        self.render_stats(frame, body[1]);
        self.render_status(frame, rows[1]);
    }

    fn render_board(&self, frame: &mut Frame, area: Rect) {
        let grid = self.game.grid();
        let (px, py) = self.game.position();
        let visible = area.height.saturating_sub(2) as usize;
        let first = first_visible_row(py, grid.rows(), visible);

        let lines: Vec<Line> = grid
            .iter_rows()
            .enumerate()
            .skip(first)
            .take(visible.max(1))
            .map(|(y, row)| {
                let spans: Vec<Span> = row
                    .iter()
                    .enumerate()
                    .map(|(x, &tile)| {
                        if (x, y) == (px, py) {
                            Span::styled(
                                format!("{PLAYER_GLYPH} "),
                                Style::default()
                                    .fg(self.theme.player)
                                    .add_modifier(Modifier::BOLD),
                            )
                        } else {
                            Span::styled(
                                format!("{} ", tile_symbol(tile)),
                                self.theme.tile_style(tile),
                            )
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        let title = format!("Mine · depth {}/{}", py + 1, grid.rows());
        let board =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(board, area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let player = self.game.player();
        let energy_style = if player.energy == 0 {
            Style::default().fg(self.theme.warning)
        } else {
            Style::default().fg(self.theme.primary_fg)
        };
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Energy: {}/{}", player.energy, player.max_energy),
                energy_style,
            )),
            Line::from(format!("Coins: {}", player.coins)),
            Line::from(format!("Pickaxe Lv: {}", player.pickaxe_level)),
            Line::from(""),
        ];
        lines.extend(self.inventory_lines());
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "w/a/s/d move · e end",
            Style::default().fg(self.theme.muted_fg),
        )));
        let stats = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Miner"))
            .wrap(Wrap { trim: true });
        frame.render_widget(stats, area);
    }

    fn inventory_lines(&self) -> Vec<Line<'static>> {
        let inventory = &self.game.player().inventory;
        Ore::ALL
            .iter()
            .map(|&ore| {
                Line::from(vec![
                    Span::styled(
                        format!("{} ", tile_symbol(ore.tile())),
                        self.theme.tile_style(ore.tile()),
                    ),
                    Span::raw(format!("{:<8} {}", ore.name(), inventory.count(ore))),
                ])
            })
            .collect()
    }

    fn draw_inventory(&mut self, frame: &mut Frame) {
        let player = self.game.player();
        let mut lines = self.inventory_lines();
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Coins: {}", player.coins)));
        lines.push(Line::from(format!("Pickaxe level: {}", player.pickaxe_level)));
        lines.push(Line::from(format!(
            "Energy: {}/{}",
            player.energy, player.max_energy
        )));
        lines.push(Line::from(format!(
            "Worth when sold: {} coins",
            player.inventory.value()
        )));
        self.render_panel(frame, "Inventory", lines, "Press any key to return");
    }

    fn draw_shop(&mut self, frame: &mut Frame) {
        let player = self.game.player();
        let labels = [
            format!(
                "Upgrade pickaxe (level {} -> {}) : {} coins",
                player.pickaxe_level,
                player.pickaxe_level.saturating_add(1),
                player.pickaxe_upgrade_cost()
            ),
            format!("Increase max energy (+{ENERGY_UPGRADE_AMOUNT}) : {ENERGY_UPGRADE_COST} coins"),
            "Sell ores here".to_string(),
            "Back".to_string(),
        ];
        let mut lines = vec![Line::from(format!("Coins: {}", player.coins)), Line::from("")];
        lines.extend(
            labels
                .iter()
                .enumerate()
                .map(|(idx, label)| {
                    self.selectable_line(idx + 1, label, idx == self.state.shop_cursor)
                }),
        );
        self.render_panel(frame, "Shop", lines, "1-4 or Enter to choose · Esc back");
    }

    fn draw_help(&mut self, frame: &mut Frame) {
        let lines = HELP_LINES.iter().map(|&line| Line::from(line)).collect();
        self.render_panel(frame, "Help", lines, "Press any key to return");
    }

    fn render_panel(
        &self,
        frame: &mut Frame,
        title: &str,
        mut lines: Vec<Line>,
        footer: &str,
    ) {
        let area = frame.size();
        let layout = Layout::default()
            .direction(Axis::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            footer.to_string(),
            Style::default().fg(self.theme.muted_fg),
        )));
        let height = (lines.len() as u16 + 2).min(layout[0].height);
        let width = 72.min(layout[0].width.max(1));
        let panel_area = centered_rect(width, height, layout[0]);
        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .wrap(Wrap { trim: true });
        frame.render_widget(panel, panel_area);
        self.render_status(frame, layout[1]);
    }

    fn render_sell_prompt(&self, frame: &mut Frame) {
        let value = self.game.player().inventory.value();
        let lines = vec![
            Line::from("Sell all ores? (y/n)"),
            Line::from(Span::styled(
                format!("Worth {value} coins"),
                Style::default().fg(self.theme.muted_fg),
            )),
        ];
        let area = centered_rect(30.min(frame.size().width), 4, frame.size());
        frame.render_widget(Clear, area);
        let prompt = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Sell"))
            .alignment(Alignment::Center);
        frame.render_widget(prompt, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let paragraph = Paragraph::new(Line::from(self.state.status.clone()))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn selectable_line(&self, number: usize, label: &str, selected: bool) -> Line<'static> {
        if selected {
            Line::from(Span::styled(
                format!("▶ {number}) {label}"),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(
                format!("  {number}) {label}"),
                Style::default().fg(self.theme.primary_fg),
            ))
        }
    }
}

/// First grid row to draw so the player stays near the middle of `visible`
/// rows without scrolling past the bottom of the mine.
/// Command bound to a key on the mine screen. Letters go through the same
/// parser as typed commands.
fn mine_command(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Up => Some(Command::Move(Direction::Up)),
        KeyCode::Down => Some(Command::Move(Direction::Down)),
        KeyCode::Left => Some(Command::Move(Direction::Left)),
        KeyCode::Right => Some(Command::Move(Direction::Right)),
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(ch) => ch.to_string().parse().ok(),
        _ => None,
    }
}

fn first_visible_row(player_row: usize, total_rows: usize, visible: usize) -> usize {
    if visible == 0 || total_rows <= visible {
        return 0;
    }
    player_row
        .saturating_sub(visible / 2)
        .min(total_rows - visible)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

struct UiState {
    status: String,
    should_quit: bool,
    menu_cursor: usize,
    shop_cursor: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: "Ready".to_string(),
            should_quit: false,
            menu_cursor: 0,
            shop_cursor: 0,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_menu_cursor(&mut self, delta: isize) {
        let last = MENU_ITEMS.len() as isize - 1;
        self.menu_cursor = (self.menu_cursor as isize + delta).clamp(0, last) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepmine_core::{OreGenerator, Phase};

    fn app_in(dir: &std::path::Path) -> DeepMineApp {
        let config = AppConfig {
            save_path: dir.join("save.txt"),
            seed: Some(17),
            log_dir: dir.join("logs"),
        };
        DeepMineApp::new(config)
    }

    fn press(app: &mut DeepMineApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn viewport_follows_player_and_stops_at_bottom() {
        assert_eq!(first_visible_row(0, 5, 10), 0);
        assert_eq!(first_visible_row(30, 100, 10), 25);
        assert_eq!(first_visible_row(99, 100, 10), 90);
        assert_eq!(first_visible_row(3, 100, 0), 0);
    }

    #[test]
    fn mine_keys_map_to_commands() {
        assert_eq!(mine_command(KeyCode::Char('w')), Some(Command::Move(Direction::Up)));
        assert_eq!(mine_command(KeyCode::Char('D')), Some(Command::Move(Direction::Right)));
        assert_eq!(mine_command(KeyCode::Left), Some(Command::Move(Direction::Left)));
        assert_eq!(mine_command(KeyCode::Char('e')), Some(Command::Quit));
        assert_eq!(mine_command(KeyCode::Esc), Some(Command::Quit));
        assert_eq!(mine_command(KeyCode::Char('x')), None);
        assert_eq!(mine_command(KeyCode::Tab), None);
    }

    #[test]
    fn shop_survives_maxed_pickaxe() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("save.txt"),
            "5 5 0 0 4294967295 10 10 4294967295\n0 0 0 0 0\n",
        )?;
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('6'));
        assert_eq!(app.screen, Screen::Shop);
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend)?;
        terminal.draw(|frame| app.draw(frame))?;

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.game.player().pickaxe_level, u32::MAX);
        assert_eq!(app.game.player().coins, u32::MAX);
        Ok(())
    }

    #[test]
    fn menu_cursor_is_clamped() {
        let mut state = UiState::default();
        state.move_menu_cursor(-1);
        assert_eq!(state.menu_cursor, 0);
        state.move_menu_cursor(100);
        assert_eq!(state.menu_cursor, MENU_ITEMS.len() - 1);
    }

    #[test]
    fn new_game_then_end_session_writes_save() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.screen, Screen::Mine);
        assert!(app.save_manager.exists());

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.game.position(), (1, 0));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.game.phase(), Phase::SessionEnded);

        let stored = app
            .save_manager
            .load()?
            .expect("session end saves")
            .into_game(OreGenerator::seeded(1));
        assert_eq!(stored.position(), (1, 0));
        Ok(())
    }

    #[test]
    fn continue_without_save_stays_in_menu() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.screen, Screen::Menu);
        assert!(app.state.status.contains("No valid save"));
        Ok(())
    }

    #[test]
    fn exit_saves_and_quits() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('8'));
        assert!(app.state.should_quit);
        assert!(app.save_manager.exists());
        Ok(())
    }
}
