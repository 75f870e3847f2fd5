//! Batch commit of grid edits
//!
//! Every update in a batch is sent at once and the batch settles only when
//! all of them have. The result is all-or-nothing for reporting purposes,
//! but writes that succeeded are not rolled back when another one fails.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::errors::SourceError;
use crate::models::{DraftEdit, RecordUpdate};
use crate::source::RecordSource;

/// Aggregate result of a commit batch
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    AllSucceeded { count: usize },
    /// `first_error` is the earliest failure in batch order
    SomeFailed {
        first_error: SourceError,
        failed: usize,
        succeeded: usize,
    },
}

impl CommitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommitOutcome::AllSucceeded { .. })
    }
}

/// Turn drafts into update requests, preserving order
pub fn build_updates(drafts: Vec<DraftEdit>) -> Vec<RecordUpdate> {
    drafts.into_iter().map(RecordUpdate::from).collect()
}

/// Submit all updates concurrently and wait for every one to settle
pub async fn commit_batch<S>(source: &S, updates: &[RecordUpdate]) -> CommitOutcome
where
    S: RecordSource + ?Sized,
{
    debug!("Submitting {} record updates", updates.len());

    let results = join_all(updates.iter().map(|update| source.update_record(update))).await;

    let mut first_error = None;
    let mut failed = 0;
    for (update, result) in updates.iter().zip(results) {
        if let Err(e) = result {
            warn!("Update of {} failed: {}", update.id, e);
            failed += 1;
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        None => CommitOutcome::AllSucceeded {
            count: updates.len(),
        },
        Some(first_error) => CommitOutcome::SomeFailed {
            first_error,
            failed,
            succeeded: updates.len() - failed,
        },
    }
}
