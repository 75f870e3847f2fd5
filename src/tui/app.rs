//! Main TUI application state and logic

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::time::Duration;
use tracing::{debug, info};

use super::components::{RecordGrid, StatusBar, StatusSnapshot, TypePicker};
use crate::models::DraftEdit;
use crate::search::{AccountSearch, SearchEvent};
use crate::source::RecordSource;

const TICK: Duration = Duration::from_millis(50);
const TOAST_TIMEOUT: Duration = Duration::from_secs(5);

/// Pane that receives key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Types,
    Grid,
}

pub struct App<S: RecordSource> {
    pub search: AccountSearch<S>,
    pub picker: TypePicker,
    pub grid: RecordGrid,
    pub status: StatusBar,
    pub focus: Focus,
    pub should_quit: bool,
    /// Drafts handed to the running save, as submitted
    submitted: Vec<DraftEdit>,
}

impl<S: RecordSource> App<S> {
    pub fn new(search: AccountSearch<S>) -> Self {
        Self {
            search,
            picker: TypePicker::new(),
            grid: RecordGrid::new(),
            status: StatusBar::new().with_auto_clear(TOAST_TIMEOUT),
            focus: Focus::Types,
            should_quit: false,
            submitted: Vec::new(),
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.search.mount();

        loop {
            self.process_completions();
            terminal.draw(|f| self.draw(f))?;

            if crossterm::event::poll(TICK)? {
                if let Event::Key(key) = crossterm::event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
            // let spawned fetches progress on the current-thread runtime
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    /// Apply finished remote calls and route their effects to the widgets
    pub fn process_completions(&mut self) {
        for event in self.search.pump() {
            self.on_search_event(event);
        }
        for toast in self.search.drain_toasts() {
            self.status.show_toast(toast);
        }
        self.status.expire();
        self.grid.sync_rows(self.search.rows().len());
    }

    pub fn on_search_event(&mut self, event: SearchEvent) {
        debug!("Search event: {:?}", event);
        match event {
            SearchEvent::CatalogLoaded(_) => {
                let options = self.search.type_options().unwrap_or_default().to_vec();
                let label = self.search.selected_label().to_string();
                self.picker.set_options(options, &label);
            }
            SearchEvent::CatalogFailed(_) => self.picker.clear(),
            SearchEvent::CommitSucceeded(_) => {
                let saved = std::mem::take(&mut self.submitted);
                self.grid.consume_saved(&saved);
            }
            SearchEvent::CommitFailed(_) => self.submitted.clear(),
            SearchEvent::RecordsLoaded(_)
            | SearchEvent::RecordsFailed(_)
            | SearchEvent::RecordsDiscarded => {}
        }
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if self.grid.is_editing() {
            self.handle_editor_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Types => Focus::Grid,
                    Focus::Grid => Focus::Types,
                };
            }
            KeyCode::Char('r') => {
                self.search.refresh();
            }
            _ => match self.focus {
                Focus::Types => self.handle_picker_key(key),
                Focus::Grid => self.handle_grid_key(key),
            },
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.picker.navigate_up(),
            KeyCode::Down => self.picker.navigate_down(),
            KeyCode::Enter => {
                if let Some(value) = self.picker.choose() {
                    info!("Type selected: '{}'", value);
                    self.search.select_type(&value);
                    self.focus = Focus::Grid;
                }
            }
            _ => {}
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent) {
        let row_count = self.search.rows().len();
        match key.code {
            KeyCode::Up => self.grid.navigate_up(row_count),
            KeyCode::Down => self.grid.navigate_down(row_count),
            KeyCode::Enter | KeyCode::Char('e') => {
                self.grid.begin_edit(self.search.rows());
            }
            KeyCode::Char('s') => self.save(),
            KeyCode::Esc => self.grid.clear_drafts(),
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.grid.finish_edit(self.search.rows());
            return;
        }
        if key.code == KeyCode::Esc {
            self.grid.cancel_edit();
            return;
        }
        if let Some(input) = self.grid.editor_mut() {
            match key.code {
                KeyCode::Char(c) => input.insert_char(c),
                KeyCode::Backspace => input.delete_char(),
                KeyCode::Delete => input.delete_char_forward(),
                KeyCode::Left => input.move_cursor_left(),
                KeyCode::Right => input.move_cursor_right(),
                KeyCode::Home => input.move_cursor_to_start(),
                KeyCode::End => input.move_cursor_to_end(),
                _ => {}
            }
        }
    }

    /// Submit pending drafts unless a save is already running
    pub fn save(&mut self) {
        if !self.grid.has_drafts() || self.search.is_saving() {
            return;
        }
        self.submitted = self.grid.drafts();
        self.search.save(self.submitted.clone());
    }

    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            loading: self.search.is_loading(),
            saving: self.search.is_saving(),
            drafts: self.grid.draft_count(),
            record_error: self.search.record_error().map(|e| e.to_string()),
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(rows[0]);

        let catalog_error = self.search.catalog_error().map(|e| e.to_string());
        self.picker.render(
            f,
            panes[0],
            self.focus == Focus::Types,
            catalog_error.as_deref(),
        );

        let title = match self.search.selected_label() {
            "" => format!("Accounts ({})", self.search.rows().len()),
            label => format!("Accounts: {} ({})", label, self.search.rows().len()),
        };
        self.grid.render(
            f,
            panes[1],
            self.search.rows(),
            self.focus == Focus::Grid,
            &title,
        );

        let status = self.status_snapshot();
        self.status.render(f, rows[1], &status);
    }
}
