//! Editable account grid
//!
//! Rows come from the controller's snapshot and are never modified here.
//! Edits live in per-row drafts until they are saved.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};
use std::collections::BTreeMap;

use crate::models::{DraftEdit, Field, RecordId, RecordRow, COLUMNS};
use crate::tui::ui::{truncate, InputField, Styles};

pub struct RecordGrid {
    pub state: TableState,
    drafts: BTreeMap<RecordId, DraftEdit>,
    editor: Option<(RecordId, Field, InputField)>,
}

impl Default for RecordGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordGrid {
    pub fn new() -> Self {
        Self {
            state: TableState::default(),
            drafts: BTreeMap::new(),
            editor: None,
        }
    }

    /// Keep the cursor inside the current row count
    pub fn sync_rows(&mut self, row_count: usize) {
        let selected = match (self.state.selected(), row_count) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), n) => Some(i.min(n - 1)),
        };
        self.state.select(selected);
    }

    pub fn navigate_up(&mut self, row_count: usize) {
        if row_count == 0 {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        self.state
            .select(Some(if selected == 0 { row_count - 1 } else { selected - 1 }));
    }

    pub fn navigate_down(&mut self, row_count: usize) {
        if row_count == 0 {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        self.state.select(Some((selected + 1) % row_count));
    }

    pub fn selected_row<'a>(&self, rows: &'a [RecordRow]) -> Option<&'a RecordRow> {
        self.state.selected().and_then(|i| rows.get(i))
    }

    /// Value shown for a cell: the draft value if one exists, else the row's
    pub fn display_value<'a>(&'a self, row: &'a RecordRow, field: Field) -> &'a str {
        self.drafts
            .get(&row.id)
            .and_then(|d| d.fields.get(&field))
            .map(String::as_str)
            .unwrap_or_else(|| row.value(field))
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    pub fn editor_mut(&mut self) -> Option<&mut InputField> {
        self.editor.as_mut().map(|(_, _, input)| input)
    }

    /// Open the first editable column of the selected row
    pub fn begin_edit(&mut self, rows: &[RecordRow]) -> bool {
        let Some(row) = self.selected_row(rows) else {
            return false;
        };
        let Some(column) = COLUMNS.iter().find(|c| c.editable) else {
            return false;
        };
        let input = InputField::new(column.label).with_value(self.display_value(row, column.field));
        self.editor = Some((row.id.clone(), column.field, input));
        true
    }

    /// Close the editor and record its value as a draft.
    /// A value equal to the stored one removes the field from the draft.
    /// If the row has left the current rows the value is kept as typed.
    pub fn finish_edit(&mut self, rows: &[RecordRow]) {
        let Some((id, field, input)) = self.editor.take() else {
            return;
        };
        let stored = rows.iter().find(|r| r.id == id).map(|row| row.value(field));

        let draft = self
            .drafts
            .entry(id.clone())
            .or_insert_with(|| DraftEdit::new(id.clone()));
        if stored == Some(input.value.as_str()) {
            draft.fields.remove(&field);
        } else {
            draft.fields.insert(field, input.value);
        }
        if draft.is_empty() {
            self.drafts.remove(&id);
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editor = None;
    }

    pub fn has_drafts(&self) -> bool {
        !self.drafts.is_empty()
    }

    pub fn draft_count(&self) -> usize {
        self.drafts.len()
    }

    /// Drafts in row-id order, for submission
    pub fn drafts(&self) -> Vec<DraftEdit> {
        self.drafts.values().cloned().collect()
    }

    pub fn clear_drafts(&mut self) {
        self.drafts.clear();
        self.editor = None;
    }

    /// Drop draft fields that a successful save wrote. A field edited again
    /// since submission no longer matches and stays. The editor is untouched.
    pub fn consume_saved(&mut self, saved: &[DraftEdit]) {
        for edit in saved {
            let Some(draft) = self.drafts.get_mut(&edit.id) else {
                continue;
            };
            for (field, value) in &edit.fields {
                if draft.fields.get(field) == Some(value) {
                    draft.fields.remove(field);
                }
            }
            if draft.is_empty() {
                self.drafts.remove(&edit.id);
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, rows: &[RecordRow], focused: bool, title: &str) {
        let border = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };
        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border);

        let name_width = (area.width.saturating_sub(4) as usize * 3 / 5).max(8);
        let type_width = (area.width.saturating_sub(4) as usize).saturating_sub(name_width + 1);

        let header = Row::new(
            COLUMNS
                .iter()
                .map(|c| Cell::from(Span::styled(c.label, Styles::title()))),
        );

        let table_rows: Vec<Row> = rows
            .iter()
            .map(|row| {
                let cells = COLUMNS.iter().map(|column| {
                    let width = match column.field {
                        Field::Name => name_width,
                        Field::Type => type_width,
                    };
                    let value = truncate(self.display_value(row, column.field), width);
                    let has_draft = self
                        .drafts
                        .get(&row.id)
                        .map_or(false, |d| d.fields.contains_key(&column.field));
                    let style = if has_draft { Styles::draft() } else { Styles::default() };
                    Cell::from(Line::from(Span::styled(value, style)))
                });
                Row::new(cells)
            })
            .collect();

        let table = Table::new(
            table_rows,
            [
                Constraint::Length(name_width as u16),
                Constraint::Length(type_width as u16),
            ],
        )
        .header(header)
        .block(block)
        .highlight_style(Styles::selected());

        f.render_stateful_widget(table, area, &mut self.state);

        if let Some((_, _, input)) = &self.editor {
            let offset = self.state.selected().unwrap_or(0).saturating_sub(self.state.offset());
            let y = area.y + 2 + offset as u16;
            if y + 3 <= area.y + area.height {
                let editor_area = Rect::new(area.x + 1, y, (name_width as u16 + 2).min(area.width.saturating_sub(2)), 3);
                input.render(f, editor_area);
            }
        }
    }
}
