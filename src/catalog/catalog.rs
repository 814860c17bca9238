//! System Catalog for TallyDB
//!
//! This module manages the table-name-to-schema directory.

use super::schema::{Column, ColumnDefinition, TableSchema};
use super::types::DataType;
use crate::error::{Error, Result};
use crate::storage::disk;
use indexmap::IndexMap;
use std::path::Path;

/// System Catalog - manages all table schemas
#[derive(Debug, Default)]
pub struct Catalog {
    /// Table schemas by name, in creation order
    tables: IndexMap<String, TableSchema>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new table from its column definitions
    pub fn define_table(
        &mut self,
        name: &str,
        definitions: &[ColumnDefinition],
    ) -> Result<&TableSchema> {
        if self.tables.contains_key(name) {
            return Err(Error::DuplicateTable(name.to_string()));
        }

        let mut columns = Vec::with_capacity(definitions.len());
        for def in definitions {
            let data_type = DataType::from_name(&def.type_name).ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "unsupported data type '{}' for column '{}'",
                    def.type_name, def.name
                ))
            })?;
            columns.push(
                Column::new(def.name.clone(), data_type)
                    .primary_key(def.primary_key)
                    .unique(def.unique),
            );
        }

        let schema = TableSchema::new(name, columns)?;
        self.register(schema)
    }

    /// Register an already validated schema
    pub fn register(&mut self, schema: TableSchema) -> Result<&TableSchema> {
        let name = schema.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(Error::DuplicateTable(name));
        }
        let (idx, _) = self.tables.insert_full(name, schema);
        Ok(&self.tables[idx])
    }

    /// Get a table schema by name
    pub fn lookup(&self, name: &str) -> Result<&TableSchema> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Drop a table, returning its schema
    pub fn drop_table(&mut self, name: &str) -> Result<TableSchema> {
        self.tables
            .shift_remove(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// List all table names in creation order
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Iterate over all schemas in creation order
    pub fn schemas(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    /// Get table schema info as a formatted string (for .schema command)
    pub fn get_table_info(&self, name: &str) -> Result<String> {
        let schema = self.lookup(name)?;
        let mut info = format!("Table: {}\n", schema.name());
        info.push_str("Columns:\n");

        for col in schema.columns() {
            let mut flags = Vec::new();
            if col.primary_key {
                flags.push("PRIMARY KEY");
            }
            if col.unique {
                flags.push("UNIQUE");
            }

            let flags_str = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };

            info.push_str(&format!("  {} {}{}\n", col.name, col.data_type, flags_str));
        }

        let indexed: Vec<&str> = schema
            .indexed_columns()
            .map(|(_, c)| c.name.as_str())
            .collect();
        info.push_str(&format!("Indexes: {}\n", indexed.join(", ")));

        Ok(info)
    }

    /// Save catalog to disk, replacing the previous record atomically
    pub fn save_to_disk(&self, path: &Path, sync: bool) -> Result<()> {
        let data = CatalogData {
            tables: self
                .tables
                .values()
                .map(|schema| TableRecord {
                    name: schema.name().to_string(),
                    columns: schema.columns().to_vec(),
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&data)
            .map_err(|e| Error::Storage(format!("cannot encode catalog: {}", e)))?;
        disk::write_atomic(path, json.as_bytes(), sync)
    }

    /// Load catalog from disk; every schema is re-validated
    pub fn load_from_disk(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let data: CatalogData = serde_json::from_str(&json).map_err(|e| Error::Corrupted {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut catalog = Self::new();
        for record in data.tables {
            let bad_name = std::iter::once(&record.name)
                .chain(record.columns.iter().map(|c| &c.name))
                .find(|name| !is_identifier(name));
            if let Some(bad) = bad_name {
                return Err(Error::Corrupted {
                    path: path.to_path_buf(),
                    reason: format!("invalid name '{}'", bad),
                });
            }
            let schema =
                TableSchema::new(record.name, record.columns).map_err(|e| Error::Corrupted {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            catalog.register(schema).map_err(|e| Error::Corrupted {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        Ok(catalog)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, the names the SQL lexer can produce
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Serializable proxy for Catalog
#[derive(serde::Serialize, serde::Deserialize)]
struct CatalogData {
    tables: Vec<TableRecord>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct TableRecord {
    name: String,
    columns: Vec<Column>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_definitions() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INT").primary_key(true),
            ColumnDefinition::new("name", "TEXT"),
            ColumnDefinition::new("email", "TEXT").unique(true),
        ]
    }

    #[test]
    fn test_define_and_lookup_table() {
        let mut catalog = Catalog::new();
        catalog.define_table("users", &users_definitions()).unwrap();

        let schema = catalog.lookup("users").unwrap();
        assert_eq!(schema.name(), "users");
        assert_eq!(schema.column_count(), 3);
        assert_eq!(schema.get_column("id").unwrap().data_type, DataType::Integer);
    }

    #[test]
    fn test_table_already_exists() {
        let mut catalog = Catalog::new();
        catalog.define_table("users", &users_definitions()).unwrap();

        let result = catalog.define_table("users", &users_definitions());
        assert!(matches!(result, Err(Error::DuplicateTable(_))));
    }

    #[test]
    fn test_unknown_type_is_schema_error() {
        let mut catalog = Catalog::new();
        let defs = vec![
            ColumnDefinition::new("id", "INT").primary_key(true),
            ColumnDefinition::new("price", "FLOAT"),
        ];
        let result = catalog.define_table("items", &defs);
        assert!(matches!(result, Err(Error::InvalidSchema(_))));
        assert!(!catalog.table_exists("items"));
    }

    #[test]
    fn test_drop_table() {
        let mut catalog = Catalog::new();
        catalog.define_table("users", &users_definitions()).unwrap();
        assert!(catalog.table_exists("users"));

        catalog.drop_table("users").unwrap();
        assert!(!catalog.table_exists("users"));
        assert!(matches!(
            catalog.drop_table("users"),
            Err(Error::TableNotFound(_))
        ));
    }

    #[test]
    fn test_list_tables_in_creation_order() {
        let mut catalog = Catalog::new();
        for name in ["zeta", "alpha", "mid"] {
            catalog.define_table(name, &users_definitions()).unwrap();
        }
        assert_eq!(catalog.list_tables(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = Catalog::new();
        catalog.define_table("users", &users_definitions()).unwrap();
        catalog.save_to_disk(&path, false).unwrap();

        let loaded = Catalog::load_from_disk(&path).unwrap();
        assert_eq!(loaded.lookup("users").unwrap(), catalog.lookup("users").unwrap());
    }

    #[test]
    fn test_load_rejects_invalid_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = Catalog::new();
        catalog.define_table("users", &users_definitions()).unwrap();
        catalog.save_to_disk(&path, false).unwrap();

        for (from, to) in [
            ("\"name\": \"users\"", "\"name\": \"../x\""),
            ("\"name\": \"email\"", "\"name\": \"e mail\""),
            ("\"name\": \"users\"", "\"name\": \"9users\""),
        ] {
            let json = std::fs::read_to_string(&path).unwrap();
            assert!(json.contains(from));
            let edited = dir.path().join("edited.json");
            std::fs::write(&edited, json.replace(from, to)).unwrap();

            let result = Catalog::load_from_disk(&edited);
            assert!(matches!(result, Err(Error::Corrupted { .. })), "{}", to);
        }
    }

    #[test]
    fn test_identifier_names() {
        assert!(is_identifier("users"));
        assert!(is_identifier("_tmp2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier("../x"));
    }

    #[test]
    fn test_table_info() {
        let mut catalog = Catalog::new();
        catalog.define_table("users", &users_definitions()).unwrap();

        let info = catalog.get_table_info("users").unwrap();
        assert!(info.contains("id INTEGER [PRIMARY KEY]"));
        assert!(info.contains("email TEXT [UNIQUE]"));
        assert!(info.contains("Indexes: id, email"));
    }
}
