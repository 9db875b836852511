use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Local};

use crate::error::{Error, Result};
use crate::models::Dataset;
use crate::parser::{compute_checksum, parse_payload, ParseOptions};
use crate::query::{search, Query, QueryResult};
use crate::source::{Fetched, Source};
use crate::store::DatasetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Fetching,
    Parsing,
    Ready,
    Failed,
}

impl RefreshState {
    /// A cycle is in flight; new refresh requests are refused.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Fetching | Self::Parsing | Self::Ready)
    }
}

impl fmt::Display for RefreshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Everything the presentation layer needs in one snapshot.
#[derive(Debug, Clone)]
pub struct ControllerStatus {
    pub source: String,
    pub state: RefreshState,
    pub last_error: Option<String>,
    pub captured_at: Option<DateTime<Local>>,
    pub record_count: Option<usize>,
    pub skipped_rows: usize,
    pub active_term: Option<String>,
}

/// Leaves the controller `Failed` if a cycle unwinds, so it can be retried.
struct CycleGuard<'a> {
    controller: &'a RefreshController,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut inner = self.controller.lock();
            inner.state = RefreshState::Failed;
            inner.last_error = Some("Refresh aborted unexpectedly".to_string());
        }
    }
}

struct Inner {
    state: RefreshState,
    last_error: Option<String>,
    active: Option<Query>,
    last_result: Option<QueryResult>,
}

pub struct RefreshController {
    source: Box<dyn Source>,
    store: Arc<DatasetStore>,
    options: ParseOptions,
    inner: Mutex<Inner>,
}

impl RefreshController {
    pub fn new(source: Box<dyn Source>, store: Arc<DatasetStore>, options: ParseOptions) -> Self {
        Self {
            source,
            store,
            options,
            inner: Mutex::new(Inner {
                state: RefreshState::Idle,
                last_error: None,
                active: None,
                last_result: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: RefreshState) {
        self.lock().state = state;
    }

    fn fail(&self, err: Error) -> Error {
        log::warn!("refresh from {} failed: {err}", self.source.describe());
        let mut inner = self.lock();
        inner.state = RefreshState::Failed;
        inner.last_error = Some(err.to_string());
        err
    }

    // -----------------------------------------------------------------------
    // Refresh cycle
    // -----------------------------------------------------------------------

    /// Run one fetch → parse → swap → re-query cycle. On failure the previous
    /// dataset stays current.
    pub fn refresh(&self) -> Result<Arc<Dataset>> {
        {
            let mut inner = self.lock();
            if inner.state.is_busy() {
                log::info!("refresh refused: already {}", inner.state);
                return Err(Error::RefreshInProgress);
            }
            inner.state = RefreshState::Fetching;
        }

        let _guard = CycleGuard { controller: self };
        let started = Instant::now();
        log::debug!("fetching {}", self.source.describe());
        let body = match self.source.fetch().and_then(Fetched::into_body) {
            Ok(body) => body,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.set_state(RefreshState::Parsing);
        let parsed = match parse_payload(&body, &self.options) {
            Ok(parsed) => parsed,
            Err(e) => return Err(self.fail(e.into())),
        };

        let checksum = compute_checksum(&body);
        if self
            .store
            .current()
            .is_some_and(|current| current.checksum == checksum)
        {
            log::debug!("payload unchanged since last refresh");
        }
        let dataset = Dataset {
            records: parsed.records,
            columns: parsed.columns,
            captured_at: Local::now(),
            checksum,
            skipped_rows: parsed.skipped_rows,
        };

        self.set_state(RefreshState::Ready);
        let mut guard = self.lock();
        let inner = &mut *guard;
        let dataset = self.store.replace(dataset);
        if let Some(query) = &inner.active {
            let result = search(&dataset, query);
            log::debug!("re-ran {:?}: {} match(es)", query.term(), result.len());
            inner.last_result = Some(result);
        }
        inner.last_error = None;
        inner.state = RefreshState::Idle;
        drop(guard);

        log::info!(
            "loaded {} record(s) ({} skipped) in {:.2?}",
            dataset.len(),
            dataset.skipped_rows,
            started.elapsed()
        );
        Ok(dataset)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Search the current snapshot and remember the term for later refreshes.
    pub fn search(&self, raw: &str) -> Result<QueryResult> {
        let query = Query::new(raw)?;
        // Held across the read so a concurrent swap either sees this query or
        // happens before it
        let mut inner = self.lock();
        let dataset = self.store.current().ok_or(Error::NotLoaded)?;
        let result = search(&dataset, &query);
        inner.active = Some(query);
        inner.last_result = Some(result.clone());
        Ok(result)
    }

    pub fn clear_query(&self) {
        let mut inner = self.lock();
        inner.active = None;
        inner.last_result = None;
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    pub fn state(&self) -> RefreshState {
        self.lock().state
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn last_result(&self) -> Option<QueryResult> {
        self.lock().last_result.clone()
    }

    pub fn captured_at(&self) -> Option<DateTime<Local>> {
        self.store.captured_at()
    }

    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.store.current()
    }

    pub fn status(&self) -> ControllerStatus {
        let dataset = self.store.current();
        let inner = self.lock();
        ControllerStatus {
            source: self.source.describe(),
            state: inner.state,
            last_error: inner.last_error.clone(),
            captured_at: dataset.as_ref().map(|d| d.captured_at),
            record_count: dataset.as_ref().map(|d| d.len()),
            skipped_rows: dataset.as_ref().map_or(0, |d| d.skipped_rows),
            active_term: inner.active.as_ref().map(|q| q.term().to_string()),
        }
    }
}
