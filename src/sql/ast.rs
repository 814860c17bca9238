//! SQL Abstract Syntax Tree (AST)
//!
//! This module defines the AST nodes for the seven statement shapes the engine
//! accepts. Nodes are purely syntactic: names are unresolved and literal types
//! are unchecked until execution.

use crate::catalog::ColumnDefinition;
use crate::storage::Value;
use std::fmt;

/// A SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// Single-table SELECT
    Select(SelectStatement),
    /// SELECT over an INNER JOIN of two tables
    SelectJoin(JoinSelectStatement),
}

impl Statement {
    /// Statement name, as used in logs and replies
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::DropTable(_) => "DROP TABLE",
            Statement::Insert(_) => "INSERT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
            Statement::Select(_) | Statement::SelectJoin(_) => "SELECT",
        }
    }

    /// Whether the statement can change persisted state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Statement::Select(_) | Statement::SelectJoin(_))
    }
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<ColumnDefinition>,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table_name: String,
}

/// INSERT statement. Values are positional, in schema column order.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table_name: String,
    /// Values to insert
    pub values: Vec<Value>,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table_name: String,
    /// SET clause (column = value pairs)
    pub assignments: Vec<Assignment>,
    /// WHERE clause
    pub predicate: Predicate,
}

/// Column assignment (for UPDATE)
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name
    pub column: ColumnRef,
    /// New value
    pub value: Value,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table name
    pub table_name: String,
    /// WHERE clause
    pub predicate: Predicate,
}

/// Single-table SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Source table
    pub table_name: String,
    /// Select list
    pub projection: Projection,
    /// Optional WHERE clause
    pub predicate: Option<Predicate>,
}

/// `SELECT ... FROM left [INNER] JOIN right ON a = b [WHERE ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSelectStatement {
    pub left_table: String,
    pub right_table: String,
    /// First column of the ON equality
    pub left_column: ColumnRef,
    /// Second column of the ON equality
    pub right_column: ColumnRef,
    /// Select list
    pub projection: Projection,
    /// Optional WHERE clause
    pub predicate: Option<Predicate>,
}

/// Select list
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// All columns (*)
    All,
    /// Named columns, in output order
    Columns(Vec<ColumnRef>),
}

/// Possibly qualified column reference (`col` or `table.col`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    /// Unqualified reference
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    /// Reference qualified by a table name
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// Equality predicate `column = literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: ColumnRef,
    pub value: Value,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value.to_literal())
    }
}
