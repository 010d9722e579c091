//! Application state management for the matchday TUI
//!
//! This module contains the terminal-side application state: the latest
//! fixtures snapshot, list selection, and keyboard handling. All data
//! loading lives in the refresh orchestrator; the app only consumes its
//! published snapshots and raises refresh requests for the event loop to
//! forward.

use crossterm::event::{KeyCode, KeyEvent};

use crate::refresh::FixturesState;

/// Main application struct managing UI state
pub struct App {
    /// Latest state snapshot published by the orchestrator
    pub snapshot: FixturesState,
    /// Index of the currently selected fixture in the list
    pub selected_index: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show the help overlay
    pub show_help: bool,
    /// Pending refresh request; `Some(force)` is drained by the event loop
    pub refresh_requested: Option<bool>,
}

impl App {
    /// Creates a new App instance with default state
    pub fn new() -> Self {
        Self {
            snapshot: FixturesState::default(),
            selected_index: 0,
            should_quit: false,
            show_help: false,
            refresh_requested: None,
        }
    }

    /// Adopts a fresh state snapshot, keeping the selection in bounds.
    pub fn apply_snapshot(&mut self, snapshot: FixturesState) {
        self.snapshot = snapshot;
        let count = self.snapshot.fixtures.len();
        if count == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }

    /// True while the full-screen loading view should be shown: only before
    /// any data or error has ever been displayed.
    pub fn is_initial_loading(&self) -> bool {
        self.snapshot.is_loading
            || (self.snapshot.last_fetched.is_none() && self.snapshot.error.is_none())
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: quit (Esc closes the help overlay first)
    /// - `Up`/`k`, `Down`/`j`: move the selection
    /// - `r`: refresh (cache-preferring)
    /// - `f`: force refresh (bypass the cache)
    /// - `?`: toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection_down();
            }
            KeyCode::Char('r') => {
                self.refresh_requested = Some(false);
            }
            KeyCode::Char('f') => {
                self.refresh_requested = Some(true);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    /// Moves the selection up, wrapping to the bottom at the top
    fn move_selection_up(&mut self) {
        let count = self.snapshot.fixtures.len();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down, wrapping to the top at the bottom
    fn move_selection_down(&mut self) {
        let count = self.snapshot.fixtures.len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
