//! In-memory row heap for TallyDB
//!
//! Rows are addressed by a [`RowId`] that never changes for the life of the row.
//! Ids are handed out in increasing order, so iterating by id is insertion order.

use super::tuple::Row;
use std::collections::BTreeMap;
use std::fmt;

/// Stable row identity within one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered row set of one table
#[derive(Debug, Default, Clone)]
pub struct RowHeap {
    rows: BTreeMap<RowId, Row>,
    next_id: u64,
}

impl RowHeap {
    /// Create an empty heap
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a heap from rows in stored order
    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut heap = Self::new();
        for row in rows {
            heap.insert(row);
        }
        heap
    }

    /// Append a row, returning its id
    pub fn insert(&mut self, row: Row) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.insert(id, row);
        id
    }

    /// Put a row back under an id it previously held
    pub fn restore(&mut self, id: RowId, row: Row) {
        self.rows.insert(id, row);
    }

    /// Replace a row, returning the previous version
    pub fn update(&mut self, id: RowId, row: Row) -> Option<Row> {
        self.rows.get_mut(&id).map(|slot| std::mem::replace(slot, row))
    }

    /// Remove a row, returning it
    pub fn delete(&mut self, id: RowId) -> Option<Row> {
        self.rows.remove(&id)
    }

    /// Get a row by id
    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    /// Iterate rows in insertion order
    pub fn scan(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    /// Iterate rows in insertion order, without ids
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the heap has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
