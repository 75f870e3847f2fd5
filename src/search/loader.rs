//! Record loader state: issued queries, the last snapshot and load errors

use tracing::{debug, warn};

use crate::config::FetchOrdering;
use crate::errors::{ControllerError, SourceError};
use crate::models::{RecordRow, RecordSnapshot};

/// A record fetch that has been issued to the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub seq: u64,
    pub filter: String,
}

/// What happened to a settled fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    /// Rows replaced the snapshot
    Updated,
    /// Error stored, previous snapshot kept
    Failed,
    /// Response belonged to a superseded request and was dropped
    Discarded,
}

pub struct RecordLoader {
    ordering: FetchOrdering,
    last_query: Option<RecordQuery>,
    next_seq: u64,
    pending: usize,
    snapshot: Option<RecordSnapshot>,
    error: Option<ControllerError>,
}

impl RecordLoader {
    pub fn new(ordering: FetchOrdering) -> Self {
        Self {
            ordering,
            last_query: None,
            next_seq: 1,
            pending: 0,
            snapshot: None,
            error: None,
        }
    }

    /// Register a new fetch for `filter`
    pub fn issue(&mut self, filter: &str) -> RecordQuery {
        let query = RecordQuery {
            seq: self.next_seq,
            filter: filter.to_string(),
        };
        self.next_seq += 1;
        self.pending += 1;
        self.last_query = Some(query.clone());
        query
    }

    /// Re-issue the last query with its original filter
    pub fn reissue(&mut self) -> Option<RecordQuery> {
        let filter = self.last_query.as_ref()?.filter.clone();
        Some(self.issue(&filter))
    }

    pub fn complete(
        &mut self,
        query: &RecordQuery,
        result: Result<Vec<RecordRow>, SourceError>,
    ) -> FetchApplied {
        self.pending = self.pending.saturating_sub(1);

        if self.ordering == FetchOrdering::LatestRequest && !self.is_latest(query) {
            debug!(
                "Discarding stale response for '{}' (request {}, latest {:?})",
                query.filter,
                query.seq,
                self.last_query.as_ref().map(|q| q.seq)
            );
            return FetchApplied::Discarded;
        }

        match result {
            Ok(rows) => {
                debug!("Loaded {} accounts for '{}'", rows.len(), query.filter);
                self.snapshot = Some(RecordSnapshot::new(query.filter.clone(), rows));
                self.error = None;
                FetchApplied::Updated
            }
            Err(e) => {
                warn!("Account fetch for '{}' failed: {}", query.filter, e);
                self.error = Some(ControllerError::RecordLoad(e));
                FetchApplied::Failed
            }
        }
    }

    fn is_latest(&self, query: &RecordQuery) -> bool {
        self.last_query.as_ref().map_or(true, |last| last.seq == query.seq)
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn last_query(&self) -> Option<&RecordQuery> {
        self.last_query.as_ref()
    }

    pub fn snapshot(&self) -> Option<&RecordSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn rows(&self) -> &[RecordRow] {
        self.snapshot.as_ref().map(|s| s.rows.as_slice()).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&ControllerError> {
        self.error.as_ref()
    }
}
