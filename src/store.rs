use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Local};

use crate::models::Dataset;

/// Holds the one authoritative snapshot. Readers clone the `Arc` out, so a
/// swap never tears a dataset someone is still searching.
#[derive(Debug, Default)]
pub struct DatasetStore {
    current: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&dataset));
        dataset
    }

    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn captured_at(&self) -> Option<DateTime<Local>> {
        self.current().map(|d| d.captured_at)
    }
}
