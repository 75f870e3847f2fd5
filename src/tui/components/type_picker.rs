//! Account type picker

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::search::{normalize, CategoryOption};
use crate::tui::ui::Styles;

/// Selectable list of category options; emits the option value on selection
pub struct TypePicker {
    pub options: Vec<CategoryOption>,
    pub state: ListState,
    /// Value of the option currently applied as the filter
    pub applied_value: String,
}

impl Default for TypePicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePicker {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            state: ListState::default(),
            applied_value: String::new(),
        }
    }

    /// Replace the options, keeping the cursor on the applied filter when present
    pub fn set_options(&mut self, options: Vec<CategoryOption>, selected_label: &str) {
        self.applied_value = normalize(selected_label);
        self.options = options;
        let idx = self
            .options
            .iter()
            .position(|o| o.value == self.applied_value);
        self.state.select(idx.or(if self.options.is_empty() { None } else { Some(0) }));
    }

    pub fn clear(&mut self) {
        self.options.clear();
        self.state.select(None);
    }

    pub fn navigate_up(&mut self) {
        if self.options.is_empty() {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        let new_selected = if selected == 0 {
            self.options.len() - 1
        } else {
            selected - 1
        };
        self.state.select(Some(new_selected));
    }

    pub fn navigate_down(&mut self) {
        if self.options.is_empty() {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        self.state.select(Some((selected + 1) % self.options.len()));
    }

    /// Value of the highlighted option, marking it as applied
    pub fn choose(&mut self) -> Option<String> {
        let value = self
            .state
            .selected()
            .and_then(|i| self.options.get(i))
            .map(|o| o.value.clone())?;
        self.applied_value = value.clone();
        Some(value)
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, error: Option<&str>) {
        let border = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };
        let block = Block::default()
            .title("Account Type")
            .borders(Borders::ALL)
            .border_style(border);

        let items: Vec<ListItem> = if self.options.is_empty() {
            let text = match error {
                Some(err) => Span::styled(err.to_string(), Styles::error()),
                None => Span::styled("Loading types…", Styles::inactive()),
            };
            vec![ListItem::new(Line::from(text))]
        } else {
            self.options
                .iter()
                .map(|option| {
                    let marker = if option.value == self.applied_value { "● " } else { "  " };
                    let style = if option.is_all() { Styles::title() } else { Style::default() };
                    ListItem::new(Line::from(Span::styled(
                        format!("{}{}", marker, option.label),
                        style,
                    )))
                })
                .collect()
        };

        let list = List::new(items)
            .block(block)
            .highlight_style(Styles::selected());
        f.render_stateful_widget(list, area, &mut self.state);
    }
}
