//! Record source: the remote collaborator behind the account grid
//!
//! The controller only ever talks to the data service through the three
//! operations of [`RecordSource`]. `SqliteSource` is the bundled backend.

pub mod sqlite;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::models::{RecordRow, RecordUpdate};

pub use sqlite::SqliteSource;

/// Data service consumed by the search controller.
///
/// Implementations must be `Send + Sync + 'static`: every call runs on a
/// spawned task that holds the source through an `Arc`.
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
    /// Distinct account type labels, in display order
    async fn list_categories(&self) -> Result<Vec<String>, SourceError>;

    /// Accounts whose type equals `category_filter`; all accounts when it is empty
    async fn list_records(&self, category_filter: &str) -> Result<Vec<RecordRow>, SourceError>;

    /// Apply a partial update. Fields absent from `update` are left untouched.
    async fn update_record(&self, update: &RecordUpdate) -> Result<(), SourceError>;
}
