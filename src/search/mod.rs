//! Account search: type catalog, filtered record loading and batch edits
//!
//! [`AccountSearch`] ties the three together. The pieces it is built from
//! are public so the UI and the CLI can use the same option building and
//! commit logic.

pub mod catalog;
pub mod commit;
pub mod controller;
pub mod loader;
pub mod notify;

pub use catalog::{build_options, denormalize, normalize, CategoryOption, ALL_CATEGORIES_LABEL};
pub use commit::{commit_batch, CommitOutcome};
pub use controller::{AccountSearch, Completion, FilterState, SearchEvent};
pub use loader::{FetchApplied, RecordQuery};
pub use notify::{Toast, ToastVariant};
