//! Query Planner for TallyDB
//!
//! Binds parsed statements to table schemas (column positions, literal types)
//! and chooses how candidate rows are found: a hash index lookup when the
//! filtered column is indexed, a full scan otherwise.

use crate::catalog::TableSchema;
use crate::error::{Error, Result};
use crate::sql::ast::{ColumnRef, JoinSelectStatement, Predicate, Projection};
use crate::storage::{IndexManager, Row, RowHeap, RowId, Value};

/// A bound `column = value` filter
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column position in the table schema
    pub column: usize,
    pub value: Value,
}

impl Filter {
    pub fn matches(&self, row: &Row) -> bool {
        row.get(self.column) == Some(&self.value)
    }
}

/// How candidate rows of one table are located
#[derive(Debug, Clone, PartialEq)]
pub enum AccessPath {
    /// Every row
    FullScan,
    /// Linear scan keeping rows that match the filter
    Scan(Filter),
    /// Probe the hash index on the filter column
    IndexLookup(Filter),
}

impl AccessPath {
    /// Pick an index lookup when the filter column is indexed
    pub fn choose(table: &str, filter: Option<Filter>, indexes: &IndexManager) -> Self {
        match filter {
            None => AccessPath::FullScan,
            Some(filter) if indexes.is_indexed(table, filter.column) => {
                AccessPath::IndexLookup(filter)
            }
            Some(filter) => AccessPath::Scan(filter),
        }
    }

    /// Ids of the matching rows, in insertion order
    pub fn row_ids(&self, table: &str, heap: &RowHeap, indexes: &IndexManager) -> Vec<RowId> {
        match self {
            AccessPath::FullScan => heap.scan().map(|(id, _)| id).collect(),
            AccessPath::Scan(filter) => heap
                .scan()
                .filter(|(_, row)| filter.matches(row))
                .map(|(id, _)| id)
                .collect(),
            AccessPath::IndexLookup(filter) => indexes
                .lookup(table, filter.column, &filter.value)
                .unwrap_or_default()
                .into_iter()
                .collect(),
        }
    }

    /// Short label for logs
    pub fn describe(&self) -> &'static str {
        match self {
            AccessPath::FullScan => "full scan",
            AccessPath::Scan(_) => "filtered scan",
            AccessPath::IndexLookup(_) => "index lookup",
        }
    }
}

/// Resolve a column reference against a single table
pub fn resolve_column(schema: &TableSchema, column: &ColumnRef) -> Result<usize> {
    if let Some(table) = &column.table {
        if table != schema.name() {
            return Err(Error::ColumnNotFound(
                column.to_string(),
                schema.name().to_string(),
            ));
        }
    }
    schema
        .get_column_index(&column.column)
        .ok_or_else(|| Error::ColumnNotFound(column.column.clone(), schema.name().to_string()))
}

/// Check a literal against the type of the column at `pos`
pub fn check_type(schema: &TableSchema, pos: usize, value: &Value) -> Result<()> {
    let column = &schema.columns()[pos];
    if value.matches_type(column.data_type) {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            column: column.name.clone(),
            expected: column.data_type.to_string(),
            found: value.data_type().to_string(),
        })
    }
}

/// Bind a WHERE predicate to a single table
pub fn bind_filter(schema: &TableSchema, predicate: &Predicate) -> Result<Filter> {
    let column = resolve_column(schema, &predicate.column)?;
    check_type(schema, column, &predicate.value)?;
    Ok(Filter {
        column,
        value: predicate.value.clone(),
    })
}

/// Output column positions and names of a single-table SELECT
pub fn bind_projection(
    schema: &TableSchema,
    projection: &Projection,
) -> Result<(Vec<usize>, Vec<String>)> {
    match projection {
        Projection::All => Ok((
            (0..schema.column_count()).collect(),
            schema.columns().iter().map(|c| c.name.clone()).collect(),
        )),
        Projection::Columns(columns) => {
            let mut positions = Vec::with_capacity(columns.len());
            let mut names = Vec::with_capacity(columns.len());
            for column in columns {
                let pos = resolve_column(schema, column)?;
                positions.push(pos);
                names.push(schema.columns()[pos].name.clone());
            }
            Ok((positions, names))
        }
    }
}

/// Side of a join a column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A join statement bound to both schemas
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    /// Join column of the left table
    pub left_key: usize,
    /// Join column of the right table
    pub right_key: usize,
    /// WHERE filter, applied to the side it names
    pub filter: Option<(Side, Filter)>,
    /// Output columns, in order
    pub output: Vec<(Side, usize)>,
    /// Output column names, always `table.column`
    pub columns: Vec<String>,
}

impl JoinPlan {
    /// Bind a join statement. The first ON column is looked up on the left
    /// table and the second on the right; the swapped pairing is tried when
    /// only that one resolves.
    pub fn bind(
        stmt: &JoinSelectStatement,
        left: &TableSchema,
        right: &TableSchema,
    ) -> Result<Self> {
        let first = candidates(&stmt.left_column, left, right);
        let second = candidates(&stmt.right_column, left, right);

        let find = |found: &[(Side, usize)], side: Side| {
            found.iter().find(|(s, _)| *s == side).map(|(_, pos)| *pos)
        };

        let (left_key, right_key) = match (
            find(&first, Side::Left),
            find(&second, Side::Right),
            find(&first, Side::Right),
            find(&second, Side::Left),
        ) {
            (Some(l), Some(r), _, _) => (l, r),
            (_, _, Some(r), Some(l)) => (l, r),
            _ if first.is_empty() => {
                return Err(not_found(&stmt.left_column, left));
            }
            _ => return Err(not_found(&stmt.right_column, right)),
        };

        let left_type = left.columns()[left_key].data_type;
        let right_type = right.columns()[right_key].data_type;
        if left_type != right_type {
            return Err(Error::TypeMismatch {
                column: format!(
                    "{}.{}",
                    right.name(),
                    right.columns()[right_key].name
                ),
                expected: left_type.to_string(),
                found: right_type.to_string(),
            });
        }

        let filter = match &stmt.predicate {
            None => None,
            Some(predicate) => {
                let (side, column) = resolve_unique(&predicate.column, left, right)?;
                let schema = match side {
                    Side::Left => left,
                    Side::Right => right,
                };
                check_type(schema, column, &predicate.value)?;
                Some((
                    side,
                    Filter {
                        column,
                        value: predicate.value.clone(),
                    },
                ))
            }
        };

        let output: Vec<(Side, usize)> = match &stmt.projection {
            Projection::All => (0..left.column_count())
                .map(|pos| (Side::Left, pos))
                .chain((0..right.column_count()).map(|pos| (Side::Right, pos)))
                .collect(),
            Projection::Columns(columns) => columns
                .iter()
                .map(|c| resolve_unique(c, left, right))
                .collect::<Result<_>>()?,
        };

        let columns = output
            .iter()
            .map(|(side, pos)| {
                let schema = match side {
                    Side::Left => left,
                    Side::Right => right,
                };
                format!("{}.{}", schema.name(), schema.columns()[*pos].name)
            })
            .collect();

        Ok(Self {
            left_key,
            right_key,
            filter,
            output,
            columns,
        })
    }

    /// Build one output row from a matched pair
    pub fn combine(&self, left: &Row, right: &Row) -> Row {
        self.output
            .iter()
            .filter_map(|(side, pos)| match side {
                Side::Left => left.get(*pos).cloned(),
                Side::Right => right.get(*pos).cloned(),
            })
            .collect()
    }
}

/// Every (side, position) a reference could name
fn candidates(column: &ColumnRef, left: &TableSchema, right: &TableSchema) -> Vec<(Side, usize)> {
    [(Side::Left, left), (Side::Right, right)]
        .into_iter()
        .filter(|(_, schema)| {
            column
                .table
                .as_deref()
                .map_or(true, |table| table == schema.name())
        })
        .filter_map(|(side, schema)| {
            schema
                .get_column_index(&column.column)
                .map(|pos| (side, pos))
        })
        .collect()
}

fn resolve_unique(
    column: &ColumnRef,
    left: &TableSchema,
    right: &TableSchema,
) -> Result<(Side, usize)> {
    let found = candidates(column, left, right);
    match found.as_slice() {
        [single] => Ok(*single),
        [] => {
            let schema = match column.table.as_deref() {
                Some(table) if table == right.name() => right,
                _ => left,
            };
            Err(not_found(column, schema))
        }
        _ => Err(Error::AmbiguousColumn(column.to_string())),
    }
}

fn not_found(column: &ColumnRef, schema: &TableSchema) -> Error {
    Error::ColumnNotFound(column.to_string(), schema.name().to_string())
}
