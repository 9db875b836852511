use chrono::{DateTime, Local};

use crate::error::{Error, Result};
use crate::models::{Dataset, Field, Record};

/// A normalized search term and the column it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    term: String,
    field: Field,
}

impl Query {
    /// Query against the purchaser e-mail column. Blank terms are rejected here
    /// so they never reach `search`.
    pub fn new(raw: &str) -> Result<Self> {
        Self::on_field(raw, Field::PurchaserEmail)
    }

    pub fn on_field(raw: &str, field: Field) -> Result<Self> {
        let term = raw.trim().to_lowercase();
        if term.is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(Self { term, field })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn field(&self) -> Field {
        self.field
    }

    fn matches(&self, record: &Record) -> bool {
        let value = record.get(self.field);
        !value.is_empty() && value.to_lowercase().contains(&self.term)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub query: Query,
    pub records: Vec<Record>,
    /// Capture time of the dataset the query ran against.
    pub captured_at: DateTime<Local>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Matching rows in source order. No de-duplication.
pub fn search(dataset: &Dataset, query: &Query) -> QueryResult {
    let records = dataset
        .records
        .iter()
        .filter(|r| query.matches(r))
        .cloned()
        .collect();
    QueryResult {
        query: query.clone(),
        records,
        captured_at: dataset.captured_at,
    }
}
