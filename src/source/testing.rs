//! In-memory record sources for controller tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use super::RecordSource;
use crate::errors::SourceError;
use crate::models::{RecordId, RecordRow, RecordUpdate};

type Gate = oneshot::Receiver<Result<Vec<RecordRow>, SourceError>>;

/// Source with canned responses that records every call it receives.
///
/// Record fetches can be gated per filter: the call then waits until the
/// test releases it, which makes completion order controllable.
#[derive(Default)]
pub struct ScriptedSource {
    categories: Mutex<Option<Result<Vec<String>, SourceError>>>,
    rows: Mutex<Vec<RecordRow>>,
    failing_updates: Mutex<HashMap<RecordId, SourceError>>,
    gates: Mutex<HashMap<String, VecDeque<Gate>>>,
    pub record_calls: Mutex<Vec<String>>,
    pub update_calls: Mutex<Vec<RecordUpdate>>,
    pub category_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(categories: &[&str], rows: Vec<RecordRow>) -> Self {
        let source = Self::default();
        *source.categories.lock().unwrap() =
            Some(Ok(categories.iter().map(|c| c.to_string()).collect()));
        *source.rows.lock().unwrap() = rows;
        source
    }

    pub fn with_catalog_error(self, err: SourceError) -> Self {
        *self.categories.lock().unwrap() = Some(Err(err));
        self
    }

    pub fn fail_update(self, id: &str, err: SourceError) -> Self {
        self.failing_updates
            .lock()
            .unwrap()
            .insert(RecordId::new(id), err);
        self
    }

    /// Hold the next fetch for `filter` until the returned sender fires
    pub fn gate(&self, filter: &str) -> oneshot::Sender<Result<Vec<RecordRow>, SourceError>> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(filter.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn record_call_count(&self) -> usize {
        self.record_calls.lock().unwrap().len()
    }

    pub fn rows(&self) -> Vec<RecordRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn list_categories(&self) -> Result<Vec<String>, SourceError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        self.categories
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_records(&self, category_filter: &str) -> Result<Vec<RecordRow>, SourceError> {
        self.record_calls
            .lock()
            .unwrap()
            .push(category_filter.to_string());

        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(category_filter)
            .and_then(|queue| queue.pop_front());
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(SourceError::Task("gate dropped".to_string())));
        }

        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| {
                category_filter.is_empty() || row.account_type.as_deref() == Some(category_filter)
            })
            .cloned()
            .collect())
    }

    async fn update_record(&self, update: &RecordUpdate) -> Result<(), SourceError> {
        self.update_calls.lock().unwrap().push(update.clone());

        if let Some(err) = self.failing_updates.lock().unwrap().get(&update.id) {
            return Err(err.clone());
        }

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == update.id)
            .ok_or_else(|| SourceError::NotFound(update.id.clone()))?;
        for (field, value) in &update.fields {
            match field {
                crate::models::Field::Name => row.name = value.clone(),
                crate::models::Field::Type => row.account_type = Some(value.clone()),
            }
        }
        Ok(())
    }
}
