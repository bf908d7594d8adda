//! Application state for the chart viewer
//!
//! Holds the prepared log-log plots and handles keyboard input for switching
//! between them, toggling help and quitting.

use crossterm::event::{KeyCode, KeyEvent};

use crate::analysis::Comparison;
use crate::ui::LogPlot;

/// A documented key binding, as listed in the help overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub keys: &'static str,
    pub action: &'static str,
}

/// Bindings for moving between charts, handled by `App::handle_key`
pub const CHART_KEYS: [KeyBinding; 3] = [
    KeyBinding {
        keys: "Tab/→/l",
        action: "Next chart",
    },
    KeyBinding {
        keys: "S-Tab/←/h",
        action: "Previous chart",
    },
    KeyBinding {
        keys: "1-9",
        action: "Jump to chart",
    },
];

/// Remaining bindings handled by `App::handle_key`
pub const OTHER_KEYS: [KeyBinding; 2] = [
    KeyBinding {
        keys: "?",
        action: "Toggle this help",
    },
    KeyBinding {
        keys: "q/Esc",
        action: "Quit application",
    },
];

/// Main application struct managing state and data
pub struct App {
    /// One plot per analyzed dataset
    pub plots: Vec<LogPlot>,
    /// Index of the plot currently shown
    pub selected: usize,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
}

impl App {
    /// Creates a new App showing the first of the given comparisons
    pub fn new(comparisons: &[Comparison]) -> Self {
        Self {
            plots: comparisons.iter().map(LogPlot::from_comparison).collect(),
            selected: 0,
            show_help: false,
            should_quit: false,
        }
    }

    /// Returns the plot currently shown, if any
    pub fn selected_plot(&self) -> Option<&LogPlot> {
        self.plots.get(self.selected)
    }

    /// Moves to the next plot, wrapping around
    pub fn next_chart(&mut self) {
        if !self.plots.is_empty() {
            self.selected = (self.selected + 1) % self.plots.len();
        }
    }

    /// Moves to the previous plot, wrapping around
    pub fn previous_chart(&mut self) {
        if !self.plots.is_empty() {
            self.selected = (self.selected + self.plots.len() - 1) % self.plots.len();
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// Keep `CHART_KEYS` and `OTHER_KEYS` in sync with the arms below.
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.next_chart();
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.previous_chart();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < self.plots.len() {
                    self.selected = index;
                }
            }
            _ => {}
        }
    }
}
