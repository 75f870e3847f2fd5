//! Account search terminal user interface
//!
//! A type picker on the left, the editable account grid on the right and a
//! status bar for busy state and save notifications.

pub mod app;
pub mod components;
pub mod ui;

pub use app::App;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{error, info};

use crate::search::AccountSearch;
use crate::source::RecordSource;

/// Take over the terminal and run the app until the user quits
pub async fn run_tui<S: RecordSource>(search: AccountSearch<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(search);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match &result {
        Ok(_) => info!("TUI exited successfully"),
        Err(e) => error!("TUI encountered an error: {}", e),
    }
    result
}
