//! Historical data access
//!
//! The cleaned dataset is read once into a [`TimeSeriesStore`]; forecast runs
//! take a [`WorkingTable`] copy that they can extend with synthesized rows.

use itertools::Itertools;
use thiserror::Error;

use crate::domain::HistoricalRow;

pub mod csv_source;
pub mod store;
pub mod working;

pub use csv_source::*;
pub use store::*;
pub use working::*;

/// Errors raised while loading the historical table
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid timestamp '{value}' on record {record}")]
    InvalidTimestamp { record: usize, value: String },

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Dataset contains no rows")]
    Empty,
}

/// Order rows by timestamp, keeping the last occurrence of a duplicated hour
pub fn sort_dedup(rows: Vec<HistoricalRow>) -> Vec<HistoricalRow> {
    let mut rows: Vec<HistoricalRow> = rows
        .into_iter()
        .rev()
        .unique_by(|r| r.timestamp)
        .collect();
    rows.sort_by_key(|r| r.timestamp);
    rows
}
