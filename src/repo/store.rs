use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::{read_csv_path, sort_dedup, StoreError, WorkingTable};
use crate::domain::HistoricalRow;

/// Read-only historical table, ordered by timestamp with unique hours
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesStore {
    rows: Vec<HistoricalRow>,
}

impl TimeSeriesStore {
    pub fn new(rows: Vec<HistoricalRow>) -> Self {
        Self {
            rows: sort_dedup(rows),
        }
    }

    /// Load the cleaned dataset from disk
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            rows: read_csv_path(path)?,
        })
    }

    pub fn rows(&self) -> &[HistoricalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&HistoricalRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&HistoricalRow> {
        self.rows.last()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.last().map(|r| r.timestamp)
    }

    /// Rows with `timestamp >= last - span`
    pub fn tail_window(&self, span: Duration) -> &[HistoricalRow] {
        let Some(last) = self.last_timestamp() else {
            return &[];
        };
        let from = last - span;
        let start = self.rows.partition_point(|r| r.timestamp < from);
        &self.rows[start..]
    }

    /// All rows of one calendar day
    pub fn day(&self, date: NaiveDate) -> &[HistoricalRow] {
        let start = self.rows.partition_point(|r| r.date() < date);
        let end = self.rows.partition_point(|r| r.date() <= date);
        &self.rows[start..end]
    }

    /// Fresh working table seeded with the full history
    pub fn working_table(&self) -> WorkingTable {
        WorkingTable::from_sorted(self.rows.clone())
    }
}
