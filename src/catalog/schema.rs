//! Schema definitions for TallyDB
//!
//! This module defines table schemas and column metadata.

use super::types::DataType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column definition as written in a CREATE TABLE statement.
///
/// The type is kept as the raw name; the catalog resolves it when the table is
/// defined, so an unknown type surfaces as a schema error rather than a syntax error.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
}

impl ColumnDefinition {
    /// Create a plain column definition
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            primary_key: false,
            unique: false,
        }
    }

    /// Set primary key flag
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        self
    }

    /// Set unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }
}

/// Column in a table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Is this the primary key?
    pub primary_key: bool,
    /// Is this column unique?
    pub unique: bool,
}

impl Column {
    /// Create a new column with minimal required fields
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            unique: false,
        }
    }

    /// Set primary key flag
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        self
    }

    /// Set unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Primary key and unique columns carry a hash index
    pub fn is_indexed(&self) -> bool {
        self.primary_key || self.unique
    }
}

/// Table schema - defines the structure of a table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    /// Table name
    name: String,
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to index mapping
    name_to_index: HashMap<String, usize>,
    /// Position of the primary key column
    primary_key: usize,
}

impl TableSchema {
    /// Build a schema, enforcing exactly one primary key and distinct column names
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();

        if columns.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "table '{}' must have at least one column",
                name
            )));
        }

        let mut name_to_index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if name_to_index.insert(column.name.clone(), position).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name '{}' in table '{}'",
                    column.name, name
                )));
            }
        }

        let pk_positions: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(i, _)| i)
            .collect();
        let primary_key = match pk_positions.as_slice() {
            [single] => *single,
            [] => {
                return Err(Error::InvalidSchema(format!(
                    "table '{}' has no primary key",
                    name
                )))
            }
            _ => {
                return Err(Error::InvalidSchema(format!(
                    "table '{}' declares {} primary keys, expected exactly one",
                    name,
                    pk_positions.len()
                )))
            }
        };

        Ok(Self {
            name,
            columns,
            name_to_index,
            primary_key,
        })
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Get column index by name
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The primary key column
    pub fn primary_key(&self) -> &Column {
        &self.columns[self.primary_key]
    }

    /// Columns that carry an index (primary key first, then unique columns in order)
    pub fn indexed_columns(&self) -> impl Iterator<Item = (usize, &Column)> {
        self.columns.iter().enumerate().filter(|(_, c)| c.is_indexed())
    }
}
