//! Hash indexes for TallyDB
//!
//! Every primary key and unique column gets a [`HashIndex`] mapping each value to
//! the rows holding it. The index does not enforce uniqueness itself; the executor
//! probes it before committing a change.

use super::heap::{RowHeap, RowId};
use super::tuple::{Row, Value};
use crate::catalog::TableSchema;
use std::collections::{BTreeSet, HashMap};

/// Value -> row ids for one column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HashIndex {
    entries: HashMap<Value, BTreeSet<RowId>>,
}

impl HashIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over one column of a row set in a single pass
    pub fn build<'a>(column: usize, rows: impl IntoIterator<Item = (RowId, &'a Row)>) -> Self {
        let mut index = Self::new();
        for (id, row) in rows {
            if let Some(value) = row.get(column) {
                index.insert(value.clone(), id);
            }
        }
        index
    }

    /// Row ids holding `value`, in insertion order
    pub fn lookup(&self, value: &Value) -> BTreeSet<RowId> {
        self.entries.get(value).cloned().unwrap_or_default()
    }

    /// Check whether any row holds `value`
    pub fn contains(&self, value: &Value) -> bool {
        self.entries.contains_key(value)
    }

    pub fn insert(&mut self, value: Value, id: RowId) {
        self.entries.entry(value).or_default().insert(id);
    }

    pub fn remove(&mut self, value: &Value, id: RowId) {
        if let Some(ids) = self.entries.get_mut(value) {
            ids.remove(&id);
            if ids.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    pub fn update(&mut self, old: &Value, new: Value, id: RowId) {
        if old != &new {
            self.remove(old, id);
            self.insert(new, id);
        }
    }

    /// A value held by more than one row, if any
    pub fn duplicate(&self) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(_, ids)| ids.len() > 1)
            .map(|(value, _)| value)
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Indexes of one table, keyed by column position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableIndexes {
    by_column: HashMap<usize, HashIndex>,
}

impl TableIndexes {
    /// Build every index a schema calls for from the table's current rows
    pub fn build(schema: &TableSchema, heap: &RowHeap) -> Self {
        let by_column = schema
            .indexed_columns()
            .map(|(pos, _)| (pos, HashIndex::build(pos, heap.scan())))
            .collect();
        Self { by_column }
    }

    pub fn get(&self, column: usize) -> Option<&HashIndex> {
        self.by_column.get(&column)
    }

    /// First column position whose index maps a value to several rows
    pub fn duplicate(&self) -> Option<(usize, &Value)> {
        let mut positions: Vec<&usize> = self.by_column.keys().collect();
        positions.sort();
        positions.into_iter().find_map(|pos| {
            self.by_column[pos]
                .duplicate()
                .map(|value| (*pos, value))
        })
    }

    fn insert_row(&mut self, id: RowId, row: &Row) {
        for (&pos, index) in self.by_column.iter_mut() {
            if let Some(value) = row.get(pos) {
                index.insert(value.clone(), id);
            }
        }
    }

    fn remove_row(&mut self, id: RowId, row: &Row) {
        for (&pos, index) in self.by_column.iter_mut() {
            if let Some(value) = row.get(pos) {
                index.remove(value, id);
            }
        }
    }

    fn update_row(&mut self, id: RowId, old: &Row, new: &Row) {
        for (&pos, index) in self.by_column.iter_mut() {
            if let (Some(before), Some(after)) = (old.get(pos), new.get(pos)) {
                index.update(before, after.clone(), id);
            }
        }
    }
}

/// Index manager - owns the indexes of every table
#[derive(Debug, Default)]
pub struct IndexManager {
    tables: HashMap<String, TableIndexes>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)build all indexes of a table from its rows
    pub fn build_table(&mut self, schema: &TableSchema, heap: &RowHeap) {
        self.tables
            .insert(schema.name().to_string(), TableIndexes::build(schema, heap));
    }

    /// Forget every index of a table
    pub fn drop_table(&mut self, table: &str) {
        self.tables.remove(table);
    }

    pub fn table(&self, table: &str) -> Option<&TableIndexes> {
        self.tables.get(table)
    }

    pub fn is_indexed(&self, table: &str, column: usize) -> bool {
        self.index(table, column).is_some()
    }

    /// The index on one column, if there is one
    pub fn index(&self, table: &str, column: usize) -> Option<&HashIndex> {
        self.tables.get(table).and_then(|t| t.get(column))
    }

    /// Rows holding `value` in `column`, or `None` if the column is not indexed
    pub fn lookup(&self, table: &str, column: usize, value: &Value) -> Option<BTreeSet<RowId>> {
        self.index(table, column).map(|index| index.lookup(value))
    }

    /// Add index entries for every indexed column of a new row
    pub fn insert_row(&mut self, table: &str, id: RowId, row: &Row) {
        if let Some(indexes) = self.tables.get_mut(table) {
            indexes.insert_row(id, row);
        }
    }

    /// Drop index entries for every indexed column of a removed row
    pub fn remove_row(&mut self, table: &str, id: RowId, row: &Row) {
        if let Some(indexes) = self.tables.get_mut(table) {
            indexes.remove_row(id, row);
        }
    }

    /// Move index entries of a row from its old values to its new ones
    pub fn update_row(&mut self, table: &str, id: RowId, old: &Row, new: &Row) {
        if let Some(indexes) = self.tables.get_mut(table) {
            indexes.update_row(id, old, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};

    fn schema() -> TableSchema {
        TableSchema::new(
            "users",
            vec![
                Column::new("id", DataType::Integer).primary_key(true),
                Column::new("email", DataType::Text).unique(true),
                Column::new("age", DataType::Integer),
            ],
        )
        .unwrap()
    }

    fn user(id: i64, email: &str, age: i64) -> Row {
        Row::new(vec![Value::Integer(id), Value::from(email), Value::Integer(age)])
    }

    #[test]
    fn test_build_indexes_only_constrained_columns() {
        let heap = RowHeap::from_rows(vec![user(1, "a@x", 30), user(2, "b@x", 30)]);
        let mut manager = IndexManager::new();
        manager.build_table(&schema(), &heap);

        assert!(manager.is_indexed("users", 0));
        assert!(manager.is_indexed("users", 1));
        assert!(!manager.is_indexed("users", 2));
        assert_eq!(manager.lookup("users", 2, &Value::Integer(30)), None);

        let hits = manager.lookup("users", 1, &Value::from("b@x")).unwrap();
        let (second, _) = heap.scan().nth(1).unwrap();
        assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![second]);

        assert!(manager
            .lookup("users", 0, &Value::Integer(99))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_duplicate_detection() {
        let heap = RowHeap::from_rows(vec![user(1, "a@x", 1), user(2, "b@x", 2)]);
        assert_eq!(TableIndexes::build(&schema(), &heap).duplicate(), None);

        // Non-indexed columns may repeat freely
        let heap = RowHeap::from_rows(vec![user(1, "a@x", 5), user(2, "b@x", 5)]);
        assert_eq!(TableIndexes::build(&schema(), &heap).duplicate(), None);

        let heap = RowHeap::from_rows(vec![user(1, "a@x", 1), user(2, "a@x", 2)]);
        let indexes = TableIndexes::build(&schema(), &heap);
        assert_eq!(indexes.duplicate(), Some((1, &Value::from("a@x"))));

        let heap = RowHeap::from_rows(vec![user(1, "a@x", 1), user(1, "a@x", 2)]);
        let indexes = TableIndexes::build(&schema(), &heap);
        assert_eq!(indexes.duplicate(), Some((0, &Value::Integer(1))));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let heap = RowHeap::from_rows(vec![user(1, "a@x", 1), user(2, "b@x", 2)]);
        let first = TableIndexes::build(&schema(), &heap);
        let second = TableIndexes::build(&schema(), &heap);
        assert_eq!(first, second);
    }

    #[test]
    fn test_entry_maintenance_matches_rebuild() {
        let schema = schema();
        let mut heap = RowHeap::new();
        let mut manager = IndexManager::new();
        manager.build_table(&schema, &heap);

        let a = heap.insert(user(1, "a@x", 1));
        manager.insert_row("users", a, heap.get(a).unwrap());
        let b = heap.insert(user(2, "b@x", 2));
        manager.insert_row("users", b, heap.get(b).unwrap());

        let old = heap.update(a, user(1, "c@x", 1)).unwrap();
        manager.update_row("users", a, &old, heap.get(a).unwrap());

        let removed = heap.delete(b).unwrap();
        manager.remove_row("users", b, &removed);

        let rebuilt = TableIndexes::build(&schema, &heap);
        assert_eq!(manager.table("users"), Some(&rebuilt));
        assert!(!manager.index("users", 1).unwrap().contains(&Value::from("a@x")));
    }

    #[test]
    fn test_drop_table_forgets_indexes() {
        let heap = RowHeap::from_rows(vec![user(1, "a@x", 1)]);
        let mut manager = IndexManager::new();
        manager.build_table(&schema(), &heap);
        assert_eq!(manager.index("users", 0).unwrap().len(), 1);

        manager.drop_table("users");
        assert!(manager.table("users").is_none());
        assert_eq!(manager.lookup("users", 0, &Value::Integer(1)), None);
    }
}
