//! Terminal-side state: the [`Board`] plus selection, the blocking alert and
//! the quit flag. Key handling lives here so it can be tested without a
//! terminal.

use std::time::Instant;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ticklist_core::{Board, Overlay, OverlaySettings, TaskId, Toggle};
use tracing::{debug, info};

#[derive(Debug)]
pub struct App {
    board: Board,
    settings: OverlaySettings,
    /// Index into `board.tasks()`; clamped whenever the list shrinks.
    selected: usize,
    /// Blocking alert; while set every key only dismisses it.
    alert: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            board: Board::new(Overlay::from_settings(&settings)),
            settings,
            selected: 0,
            alert: None,
            should_quit: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn selected(&self) -> Option<usize> {
        if self.board.tasks().is_empty() {
            None
        } else {
            Some(self.selected.min(self.board.tasks().len() - 1))
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.selected().map(|idx| self.board.tasks()[idx].id)
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn tick(&mut self, now: Instant) {
        if self.board.tick(now) > 0 {
            debug!("overlay hide fired");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            info!("quit requested");
            self.should_quit = true;
            return;
        }

        if self.alert.take().is_some() {
            debug!("alert dismissed");
            return;
        }

        // The overlay covers the input and the list; only quitting gets through.
        if self.board.overlay().is_visible() {
            if key.code == KeyCode::Esc {
                info!("quit requested");
                self.should_quit = true;
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                info!("quit requested");
                self.should_quit = true;
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.board.pop_char();
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let last = self.board.tasks().len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::Tab => self.toggle_selected(now),
            KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('t') if ctrl => self.toggle_selected(now),
            KeyCode::Char('d') if ctrl => self.delete_selected(),
            KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.board.push_char(ch);
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        match self.board.submit(Utc::now()) {
            Ok(Some(_)) => self.selected = 0,
            Ok(None) => {}
            Err(err) => self.alert = Some(err.to_string()),
        }
    }

    fn toggle_selected(&mut self, now: Instant) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Toggle::Completed(_) = self.board.toggle(id, now) {
            debug!(id = %id, "overlay shown");
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        self.board.delete(id);
        let last = self.board.tasks().len().saturating_sub(1);
        self.selected = self.selected.min(last);
    }
}
