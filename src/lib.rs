//! account-search: a filtered, inline-editable account list
//!
//! The library holds the record source abstraction, the search controller
//! and the terminal UI. The `account-search` binary wires them to a SQLite
//! account store.

pub mod config;
pub mod errors;
pub mod models;
pub mod search;
pub mod source;
pub mod tui;

pub use config::Config;
pub use errors::{ControllerError, SourceError};
pub use search::AccountSearch;
pub use source::{RecordSource, SqliteSource};
