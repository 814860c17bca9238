//! Query Executor for TallyDB
//!
//! This module executes parsed statements against the catalog, the row store
//! and the hash indexes, and returns results.
//!
//! Every statement is all-or-nothing. Constraints are checked before anything
//! changes; the change is then applied in memory and the table persisted. If
//! persisting fails the change is undone from its before-images.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use super::planner::{self, AccessPath, JoinPlan, Side};
use crate::catalog::{Catalog, TableSchema};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::storage::{IndexManager, Row, RowId, Storage, TableIndexes, Value};

/// Query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<Row>,
    /// Number of affected rows (for INSERT/UPDATE/DELETE)
    pub affected_rows: usize,
    /// Message
    pub message: Option<String>,
}

impl QueryResult {
    /// Create a result with a message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
            message: Some(message.into()),
        }
    }

    /// Create a result with affected rows count
    pub fn with_affected_rows(count: usize, message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: count,
            message: Some(message.into()),
        }
    }

    /// Create a result set
    pub fn with_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            affected_rows: 0,
            message: None,
        }
    }
}

/// Before-image of one row change
#[derive(Debug)]
enum Undo {
    Inserted(RowId),
    Updated(RowId, Row),
    Deleted(RowId, Row),
}

/// Execution Engine
///
/// Owns all engine state. Independent engines over different data
/// directories do not interact.
#[derive(Debug)]
pub struct ExecutionEngine {
    /// System catalog
    catalog: Catalog,
    /// Committed rows of every table
    storage: Storage,
    /// Hash indexes on primary key and unique columns
    indexes: IndexManager,
}

impl ExecutionEngine {
    /// Open the engine: load the catalog and every table, then rebuild indexes
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let mut storage = Storage::open(config)?;
        let catalog = storage.load_catalog()?;
        storage.load_all(&catalog)?;

        let mut indexes = IndexManager::new();
        for schema in catalog.schemas() {
            indexes.build_table(schema, storage.table(schema.name())?);

            // Rows on disk must already satisfy every key constraint
            let duplicate = indexes
                .table(schema.name())
                .and_then(TableIndexes::duplicate);
            if let Some((pos, value)) = duplicate {
                return Err(Error::Corrupted {
                    path: storage.disk().table_path(schema.name()),
                    reason: format!(
                        "duplicate value {} in column '{}'",
                        value.to_literal(),
                        schema.columns()[pos].name
                    ),
                });
            }
        }

        info!(
            data_dir = %config.data_dir.display(),
            tables = catalog.list_tables().len(),
            "engine opened"
        );

        Ok(Self {
            catalog,
            storage,
            indexes,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn indexes(&self) -> &IndexManager {
        &self.indexes
    }

    /// Execute a parsed statement
    pub fn execute(&mut self, stmt: Statement) -> Result<QueryResult> {
        match stmt {
            Statement::CreateTable(s) => self.execute_create_table(s),
            Statement::DropTable(s) => self.execute_drop_table(s),
            Statement::Insert(s) => self.execute_insert(s),
            Statement::Update(s) => self.execute_update(s),
            Statement::Delete(s) => self.execute_delete(s),
            Statement::Select(s) => self.execute_select(s),
            Statement::SelectJoin(s) => self.execute_join(s),
        }
    }

    // ========== DDL ==========

    fn execute_create_table(&mut self, stmt: CreateTableStatement) -> Result<QueryResult> {
        let table_name = stmt.table_name;
        let schema = self
            .catalog
            .define_table(&table_name, &stmt.columns)?
            .clone();

        if let Err(err) = self.storage.create_table_store(&schema) {
            self.forget_table(&table_name);
            return Err(err);
        }
        self.indexes
            .build_table(&schema, self.storage.table(&table_name)?);

        if let Err(err) = self.storage.save_catalog(&self.catalog) {
            warn!(table = %table_name, error = %err, "catalog write failed, undoing CREATE TABLE");
            self.forget_table(&table_name);
            if let Err(cleanup) = self.storage.delete_table_store(&table_name) {
                warn!(table = %table_name, error = %cleanup, "could not remove data file");
            }
            self.indexes.drop_table(&table_name);
            return Err(err);
        }

        info!(table = %table_name, columns = schema.column_count(), "created table");
        Ok(QueryResult::with_message(format!(
            "Table '{}' created",
            table_name
        )))
    }

    fn execute_drop_table(&mut self, stmt: DropTableStatement) -> Result<QueryResult> {
        let table_name = stmt.table_name;
        let schema = self.catalog.drop_table(&table_name)?;

        if let Err(err) = self.storage.save_catalog(&self.catalog) {
            warn!(table = %table_name, error = %err, "catalog write failed, undoing DROP TABLE");
            self.catalog.register(schema)?;
            return Err(err);
        }

        // The catalog no longer names the table, so a leftover file is inert
        if let Err(err) = self.storage.delete_table_store(&table_name) {
            warn!(table = %table_name, error = %err, "could not remove data file");
        }
        self.indexes.drop_table(&table_name);

        info!(table = %table_name, "dropped table");
        Ok(QueryResult::with_message(format!(
            "Table '{}' dropped",
            table_name
        )))
    }

    fn forget_table(&mut self, table_name: &str) {
        if let Err(err) = self.catalog.drop_table(table_name) {
            warn!(table = %table_name, error = %err, "could not undo catalog entry");
        }
    }

    // ========== DML ==========

    fn execute_insert(&mut self, stmt: InsertStatement) -> Result<QueryResult> {
        let schema = self.catalog.lookup(&stmt.table_name)?.clone();
        let table_name = schema.name();

        if stmt.values.len() != schema.column_count() {
            return Err(Error::ColumnCountMismatch {
                table: table_name.to_string(),
                expected: schema.column_count(),
                found: stmt.values.len(),
            });
        }
        for (pos, value) in stmt.values.iter().enumerate() {
            planner::check_type(&schema, pos, value)?;
        }

        for (pos, column) in schema.indexed_columns() {
            let value = &stmt.values[pos];
            let taken = self
                .indexes
                .index(table_name, pos)
                .map_or(false, |index| index.contains(value));
            if taken {
                return Err(Error::ConstraintViolation {
                    column: column.name.clone(),
                    value: value.to_literal(),
                });
            }
        }

        let row = Row::new(stmt.values);
        let id = self.storage.table_mut(table_name)?.insert(row.clone());
        self.indexes.insert_row(table_name, id, &row);
        self.commit(&schema, vec![Undo::Inserted(id)])?;

        debug!(statement = "INSERT", table = table_name, affected = 1, "executed");
        Ok(QueryResult::with_affected_rows(1, "1 row(s) inserted"))
    }

    fn execute_update(&mut self, stmt: UpdateStatement) -> Result<QueryResult> {
        let schema = self.catalog.lookup(&stmt.table_name)?.clone();
        let table_name = schema.name();

        let mut assignments = Vec::with_capacity(stmt.assignments.len());
        for assignment in &stmt.assignments {
            let pos = planner::resolve_column(&schema, &assignment.column)?;
            planner::check_type(&schema, pos, &assignment.value)?;
            assignments.push((pos, assignment.value.clone()));
        }

        let filter = planner::bind_filter(&schema, &stmt.predicate)?;
        let path = AccessPath::choose(table_name, Some(filter), &self.indexes);
        let heap = self.storage.table(table_name)?;
        let ids = path.row_ids(table_name, heap, &self.indexes);

        let mut changes = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(old) = heap.get(id) else { continue };
            let mut new = old.clone();
            for (pos, value) in &assignments {
                new.set(*pos, value.clone());
            }
            changes.push((id, new));
        }

        self.check_update_constraints(&schema, &assignments, &changes)?;

        let mut undo = Vec::with_capacity(changes.len());
        let heap = self.storage.table_mut(table_name)?;
        for (id, new) in changes {
            if let Some(old) = heap.update(id, new.clone()) {
                self.indexes.update_row(table_name, id, &old, &new);
                undo.push(Undo::Updated(id, old));
            }
        }

        let count = undo.len();
        if count > 0 {
            self.commit(&schema, undo)?;
        }

        debug!(
            statement = "UPDATE",
            table = table_name,
            access = path.describe(),
            affected = count,
            "executed"
        );
        Ok(QueryResult::with_affected_rows(
            count,
            format!("{} row(s) updated", count),
        ))
    }

    /// No updated row may end up sharing a primary key or unique value with
    /// another row, whether that row is being updated too or not.
    fn check_update_constraints(
        &self,
        schema: &TableSchema,
        assignments: &[(usize, Value)],
        changes: &[(RowId, Row)],
    ) -> Result<()> {
        let updated: BTreeSet<RowId> = changes.iter().map(|(id, _)| *id).collect();

        for (pos, column) in schema.indexed_columns() {
            if !assignments.iter().any(|(assigned, _)| *assigned == pos) {
                continue;
            }

            let violation = |value: &Value| Error::ConstraintViolation {
                column: column.name.clone(),
                value: value.to_literal(),
            };

            let mut seen: HashMap<&Value, RowId> = HashMap::new();
            for (id, row) in changes {
                let Some(value) = row.get(pos) else { continue };
                if seen.insert(value, *id).is_some() {
                    return Err(violation(value));
                }
                let holders = self
                    .indexes
                    .lookup(schema.name(), pos, value)
                    .unwrap_or_default();
                if holders.iter().any(|holder| !updated.contains(holder)) {
                    return Err(violation(value));
                }
            }
        }
        Ok(())
    }

    fn execute_delete(&mut self, stmt: DeleteStatement) -> Result<QueryResult> {
        let schema = self.catalog.lookup(&stmt.table_name)?.clone();
        let table_name = schema.name();

        let filter = planner::bind_filter(&schema, &stmt.predicate)?;
        let path = AccessPath::choose(table_name, Some(filter), &self.indexes);
        let ids = path.row_ids(table_name, self.storage.table(table_name)?, &self.indexes);

        let mut undo = Vec::with_capacity(ids.len());
        let heap = self.storage.table_mut(table_name)?;
        for id in ids {
            if let Some(row) = heap.delete(id) {
                self.indexes.remove_row(table_name, id, &row);
                undo.push(Undo::Deleted(id, row));
            }
        }

        let count = undo.len();
        if count > 0 {
            self.commit(&schema, undo)?;
        }

        debug!(
            statement = "DELETE",
            table = table_name,
            access = path.describe(),
            affected = count,
            "executed"
        );
        Ok(QueryResult::with_affected_rows(
            count,
            format!("{} row(s) deleted", count),
        ))
    }

    /// Persist a changed table, undoing the in-memory change if that fails
    fn commit(&mut self, schema: &TableSchema, undo: Vec<Undo>) -> Result<()> {
        if let Err(err) = self.storage.persist(schema) {
            warn!(
                table = schema.name(),
                error = %err,
                rows = undo.len(),
                "persist failed, rolling back"
            );
            self.rollback(schema.name(), undo)?;
            return Err(err);
        }
        Ok(())
    }

    fn rollback(&mut self, table_name: &str, undo: Vec<Undo>) -> Result<()> {
        let heap = self.storage.table_mut(table_name)?;
        for entry in undo.into_iter().rev() {
            match entry {
                Undo::Inserted(id) => {
                    if let Some(row) = heap.delete(id) {
                        self.indexes.remove_row(table_name, id, &row);
                    }
                }
                Undo::Updated(id, old) => {
                    if let Some(new) = heap.update(id, old.clone()) {
                        self.indexes.update_row(table_name, id, &new, &old);
                    }
                }
                Undo::Deleted(id, row) => {
                    self.indexes.insert_row(table_name, id, &row);
                    heap.restore(id, row);
                }
            }
        }
        Ok(())
    }

    // ========== Queries ==========

    fn execute_select(&self, stmt: SelectStatement) -> Result<QueryResult> {
        let schema = self.catalog.lookup(&stmt.table_name)?;
        let table_name = schema.name();

        let (positions, columns) = planner::bind_projection(schema, &stmt.projection)?;
        let filter = stmt
            .predicate
            .as_ref()
            .map(|p| planner::bind_filter(schema, p))
            .transpose()?;
        let path = AccessPath::choose(table_name, filter, &self.indexes);

        let heap = self.storage.table(table_name)?;
        let rows: Vec<Row> = path
            .row_ids(table_name, heap, &self.indexes)
            .into_iter()
            .filter_map(|id| heap.get(id))
            .map(|row| row.project(&positions))
            .collect();

        debug!(
            statement = "SELECT",
            table = table_name,
            access = path.describe(),
            rows = rows.len(),
            "executed"
        );
        Ok(QueryResult::with_rows(columns, rows))
    }

    /// Filter the left table, then probe the right table once per left row
    fn execute_join(&self, stmt: JoinSelectStatement) -> Result<QueryResult> {
        let left = self.catalog.lookup(&stmt.left_table)?;
        let right = self.catalog.lookup(&stmt.right_table)?;
        let plan = JoinPlan::bind(&stmt, left, right)?;

        let (left_filter, right_filter) = match &plan.filter {
            Some((Side::Left, filter)) => (Some(filter.clone()), None),
            Some((Side::Right, filter)) => (None, Some(filter)),
            None => (None, None),
        };

        let left_heap = self.storage.table(left.name())?;
        let right_heap = self.storage.table(right.name())?;
        let left_path = AccessPath::choose(left.name(), left_filter, &self.indexes);
        let right_access = if self.indexes.is_indexed(right.name(), plan.right_key) {
            "index lookup"
        } else {
            "full scan"
        };

        let mut rows = Vec::new();
        for left_id in left_path.row_ids(left.name(), left_heap, &self.indexes) {
            let Some(left_row) = left_heap.get(left_id) else {
                continue;
            };
            let Some(key) = left_row.get(plan.left_key) else {
                continue;
            };

            let matches: Vec<&Row> = match self.indexes.lookup(right.name(), plan.right_key, key) {
                Some(ids) => ids.into_iter().filter_map(|id| right_heap.get(id)).collect(),
                None => right_heap
                    .rows()
                    .filter(|row| row.get(plan.right_key) == Some(key))
                    .collect(),
            };

            for right_row in matches {
                if right_filter.map_or(true, |filter| filter.matches(right_row)) {
                    rows.push(plan.combine(left_row, right_row));
                }
            }
        }

        debug!(
            statement = "SELECT",
            left = left.name(),
            right = right.name(),
            left_access = left_path.describe(),
            right_access,
            rows = rows.len(),
            "executed join"
        );
        Ok(QueryResult::with_rows(plan.columns, rows))
    }
}
