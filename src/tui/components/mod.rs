//! Reusable UI components for the account search TUI

pub mod record_grid;
pub mod status_bar;
pub mod type_picker;

pub use record_grid::RecordGrid;
pub use status_bar::{StatusBar, StatusSnapshot};
pub use type_picker::TypePicker;
