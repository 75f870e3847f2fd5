//! Common UI styles and widgets for the account search TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

/// Common UI styles
pub struct Styles;

impl Styles {
    pub fn default() -> Style {
        Style::default()
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn success() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn warning() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn inactive() -> Style {
        Style::default().fg(Color::Gray)
    }

    /// Cells carrying an unsaved draft value
    pub fn draft() -> Style {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn active_border() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn inactive_border() -> Style {
        Style::default().fg(Color::Gray)
    }
}

/// Single-line text input. The cursor is a char index, not a byte index.
#[derive(Clone, Debug)]
pub struct InputField {
    pub label: String,
    pub value: String,
    pub cursor_position: usize,
}

impl InputField {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            cursor_position: 0,
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.cursor_position = value.chars().count();
        self
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor_position)
            .map_or(self.value.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index();
        self.value.insert(idx, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let idx = self.byte_index();
            self.value.remove(idx);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.value.chars().count() {
            let idx = self.byte_index();
            self.value.remove(idx);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.value.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.value.chars().count();
    }

    /// Render the input field as a bordered box with the cursor placed
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.label.as_str())
            .borders(Borders::ALL)
            .border_style(Styles::active_border());

        let paragraph = Paragraph::new(self.value.clone()).block(block);
        f.render_widget(paragraph, area);

        let offset: usize = self
            .value
            .chars()
            .take(self.cursor_position)
            .map(|c| c.width().unwrap_or(0))
            .sum();
        let cursor_x = area.x + 1 + offset as u16;
        if cursor_x < area.x + area.width.saturating_sub(1) {
            f.set_cursor(cursor_x, area.y + 1);
        }
    }
}

/// Cut `text` to at most `width` terminal columns, marking the cut with '…'
pub fn truncate(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
