use crate::config::ThemeChoice;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use quartet_core::{GameState, GenerateError, GroupView, GuessOutcome, Toggle};
use std::time::Duration;
use tracing::{info, warn};

/// Result of handling a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    /// Build a new board
    NewGame,
    Quit,
}

/// The main application state
pub struct App {
    /// Current session; `None` until the first board arrives
    pub game: Option<GameState>,
    /// Board position under the cursor
    pub cursor: usize,
    pub theme_choice: ThemeChoice,
    pub theme: Theme,
    /// Message to display
    pub message: Option<String>,
    message_timer: u32,
    /// A board is being built
    pub generating: bool,
    /// Groups exposed by the last reveal
    pub revealed: Vec<GroupView>,
}

impl App {
    pub fn new(theme_choice: ThemeChoice) -> Self {
        Self {
            game: None,
            cursor: 0,
            theme_choice,
            theme: theme_choice.theme(),
            message: None,
            message_timer: 0,
            generating: false,
            revealed: Vec::new(),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// Update timers (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 30; // ~3 seconds at 100ms poll
    }

    /// Tiles per board row
    pub fn columns(&self) -> usize {
        self.game.as_ref().map_or(4, |g| g.group_size().max(1))
    }

    pub fn begin_generation(&mut self) {
        self.generating = true;
        self.message = Some("Building a new board...".to_string());
        self.message_timer = 0;
    }

    /// Install a finished board, or report why there is none
    pub fn finish_generation(&mut self, result: Result<GameState, GenerateError>) {
        self.generating = false;
        match result {
            Ok(game) => {
                info!(items = game.len(), "board installed");
                self.game = Some(game);
                self.cursor = 0;
                self.revealed.clear();
                self.show_message("Find four groups of four");
            }
            Err(GenerateError::Superseded) => {}
            Err(err) => {
                warn!(error = %err, "board generation failed");
                self.show_message(&format!("Could not build a board: {}", err));
            }
        }
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        // raw mode turns Ctrl+C into a key press
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            KeyCode::Char('n') if !self.generating => return AppAction::NewGame,
            KeyCode::Char('t') => {
                self.theme_choice = self.theme_choice.next();
                self.theme = self.theme_choice.theme();
            }

            // Navigation
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),

            KeyCode::Char(' ') => self.toggle_at_cursor(),
            KeyCode::Enter => self.submit(),
            KeyCode::Char('c') => {
                if let Some(game) = self.game.as_mut() {
                    game.clear_selection();
                }
            }
            KeyCode::Char('r') => self.reveal(),
            _ => {}
        }
        AppAction::Continue
    }

    fn toggle_at_cursor(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        match game.toggle_select(self.cursor) {
            Ok(Toggle::Ignored) => self.show_message("That group is already solved"),
            Ok(_) => {}
            Err(err) => self.show_message(&capitalize(&err.to_string())),
        }
    }

    fn submit(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let msg = match game.submit_selection() {
            Ok(GuessOutcome::Correct { connection, won: true, .. }) => {
                format!("{}! Puzzle solved", connection)
            }
            Ok(GuessOutcome::Correct { connection, .. }) => format!("{}!", connection),
            Ok(GuessOutcome::Incorrect { repeated: true, .. }) => "Already tried that".to_string(),
            Ok(GuessOutcome::Incorrect { one_away: true, .. }) => "One away...".to_string(),
            Ok(GuessOutcome::Incorrect { .. }) => "Not a group".to_string(),
            Err(err) => capitalize(&err.to_string()),
        };
        self.show_message(&msg);
    }

    fn reveal(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        if game.is_revealed() {
            return;
        }
        self.revealed = game.reveal();
        self.show_message("Solution revealed. Press n for a new board");
    }

    fn move_cursor(&mut self, row_delta: i32, col_delta: i32) {
        let Some(game) = self.game.as_ref() else {
            return;
        };
        let columns = self.columns();
        let rows = game.len().div_ceil(columns);
        let row = (self.cursor / columns) as i32;
        let col = (self.cursor % columns) as i32;
        let new_row = (row + row_delta).clamp(0, rows as i32 - 1) as usize;
        let new_col = (col + col_delta).clamp(0, columns as i32 - 1) as usize;
        self.cursor = (new_row * columns + new_col).min(game.len().saturating_sub(1));
    }

    pub fn is_selected(&self, position: usize) -> bool {
        self.game
            .as_ref()
            .is_some_and(|g| g.selection().contains(&position))
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
