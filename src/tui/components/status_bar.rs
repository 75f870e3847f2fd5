//! Status bar: busy state, the latest toast and stored load errors

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Duration;

use crate::search::{Toast, ToastVariant};
use crate::tui::ui::Styles;

/// What the status bar should show, gathered from the controller each frame
#[derive(Debug, Default, Clone)]
pub struct StatusSnapshot {
    pub loading: bool,
    pub saving: bool,
    pub drafts: usize,
    pub record_error: Option<String>,
}

pub struct StatusBar {
    toast: Option<Toast>,
    auto_clear: Option<Duration>,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            toast: None,
            auto_clear: None,
        }
    }

    pub fn with_auto_clear(mut self, timeout: Duration) -> Self {
        self.auto_clear = Some(timeout);
        self
    }

    pub fn show_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }

    pub fn current_toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Drop the toast once it has been visible longer than the auto-clear timeout
    pub fn expire(&mut self) {
        if let (Some(timeout), Some(toast)) = (self.auto_clear, &self.toast) {
            let elapsed = chrono::Local::now().signed_duration_since(toast.timestamp);
            if elapsed.to_std().unwrap_or_default() > timeout {
                self.toast = None;
            }
        }
    }

    /// Status text and its style. Busy states win over toasts, toasts over errors.
    pub fn text(&self, status: &StatusSnapshot) -> (String, Style) {
        if status.saving {
            return ("⟳ Saving record updates…".to_string(), Styles::warning());
        }
        if status.loading {
            return ("⟳ Loading accounts…".to_string(), Styles::warning());
        }
        if let Some(toast) = &self.toast {
            let (prefix, style) = match toast.variant {
                ToastVariant::Success => ("✓", Styles::success()),
                ToastVariant::Error => ("✗", Styles::error()),
            };
            return (format!("{} {}: {}", prefix, toast.title, toast.message), style);
        }
        if let Some(err) = &status.record_error {
            return (format!("✗ {}", err), Styles::error());
        }
        if status.drafts > 0 {
            return (
                format!("{} unsaved row(s) | s: Save | Esc: Discard", status.drafts),
                Styles::draft(),
            );
        }
        (
            "Tab: Switch pane | Enter: Select/Edit | r: Refresh | q: Quit".to_string(),
            Styles::inactive(),
        )
    }

    pub fn render(&self, f: &mut Frame, area: Rect, status: &StatusSnapshot) {
        let (content, style) = self.text(status);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::inactive_border());
        f.render_widget(Paragraph::new(content).style(style).block(block), area);
    }
}
