use chrono::{NaiveDate, NaiveDateTime};

use super::sort_dedup;
use crate::domain::{normalize_holiday, HistoricalRow};

/// Mutable table owned by one forecast run: history plus synthesized rows.
///
/// Rows stay ordered by timestamp with no duplicate hours, so every lookup
/// is a binary search.
#[derive(Debug, Clone, Default)]
pub struct WorkingTable {
    rows: Vec<HistoricalRow>,
}

impl WorkingTable {
    /// Caller guarantees `rows` is sorted and unique
    pub(crate) fn from_sorted(rows: Vec<HistoricalRow>) -> Self {
        Self { rows }
    }

    pub fn from_rows(rows: Vec<HistoricalRow>) -> Self {
        Self {
            rows: sort_dedup(rows),
        }
    }

    /// Append previously generated rows (session state) to this table
    pub fn extend_with(self, extra: &[HistoricalRow]) -> Self {
        if extra.is_empty() {
            return self;
        }
        let mut rows = self.rows;
        rows.extend_from_slice(extra);
        Self::from_rows(rows)
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

    pub fn last(&self) -> Option<&HistoricalRow> {
        self.rows.last()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.last().map(|r| r.timestamp)
    }

    /// Insert a row, replacing any row with the same timestamp
    pub fn push(&mut self, row: HistoricalRow) {
        match self.last_timestamp() {
            None => self.rows.push(row),
            Some(last) if row.timestamp > last => self.rows.push(row),
            Some(_) => match self
                .rows
                .binary_search_by_key(&row.timestamp, |r| r.timestamp)
            {
                Ok(idx) => self.rows[idx] = row,
                Err(idx) => self.rows.insert(idx, row),
            },
        }
    }

    /// Row with exactly this timestamp
    pub fn at(&self, ts: NaiveDateTime) -> Option<&HistoricalRow> {
        self.rows
            .binary_search_by_key(&ts, |r| r.timestamp)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Rows strictly inside `(from, to)`
    pub fn between_exclusive(&self, from: NaiveDateTime, to: NaiveDateTime) -> &[HistoricalRow] {
        let start = self.rows.partition_point(|r| r.timestamp <= from);
        let end = self.rows.partition_point(|r| r.timestamp < to);
        if start >= end {
            return &[];
        }
        &self.rows[start..end]
    }

    /// First real holiday name recorded on this calendar day
    pub fn holiday_on(&self, date: NaiveDate) -> Option<String> {
        let start = self.rows.partition_point(|r| r.date() < date);
        self.rows[start..]
            .iter()
            .take_while(|r| r.date() == date)
            .find_map(|r| normalize_holiday(r.holiday.as_deref()))
    }
}
