//! Table storage for TallyDB
//!
//! Holds the committed rows of every table and writes a table's full row set to
//! its data file after each mutation.

use super::codec;
use super::disk::DiskManager;
use super::heap::RowHeap;
use crate::catalog::{Catalog, TableSchema};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, info};

/// Row storage for all tables
#[derive(Debug)]
pub struct Storage {
    disk: DiskManager,
    tables: HashMap<String, RowHeap>,
}

impl Storage {
    /// Open storage rooted at the configured data directory
    pub fn open(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            disk: DiskManager::new(config)?,
            tables: HashMap::new(),
        })
    }

    pub fn disk(&self) -> &DiskManager {
        &self.disk
    }

    /// Read the persisted catalog, or an empty one on first start
    pub fn load_catalog(&self) -> Result<Catalog> {
        let path = self.disk.catalog_path();
        if path.exists() {
            Catalog::load_from_disk(&path)
        } else {
            info!(path = %path.display(), "no catalog found, starting empty");
            Ok(Catalog::new())
        }
    }

    /// Replace the persisted catalog record
    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        catalog.save_to_disk(&self.disk.catalog_path(), self.disk.sync_writes())
    }

    /// Load the rows of every catalogued table.
    ///
    /// A missing or unreadable data file for a catalogued table is an error.
    pub fn load_all(&mut self, catalog: &Catalog) -> Result<()> {
        let mut tables = HashMap::new();
        for schema in catalog.schemas() {
            let data = self.disk.read_table(schema.name())?;
            let path = self.disk.table_path(schema.name());
            let rows = codec::decode_table(schema, &path, &data)?;
            debug!(table = schema.name(), rows = rows.len(), "loaded table");
            tables.insert(schema.name().to_string(), RowHeap::from_rows(rows));
        }
        self.tables = tables;
        Ok(())
    }

    /// Provision an empty, persisted row set for a new table
    pub fn create_table_store(&mut self, schema: &TableSchema) -> Result<()> {
        if self.tables.contains_key(schema.name()) {
            return Err(Error::Storage(format!(
                "table '{}' already has a row store",
                schema.name()
            )));
        }
        let heap = RowHeap::new();
        self.disk
            .write_table(schema.name(), &codec::encode_table(schema, &heap))?;
        self.tables.insert(schema.name().to_string(), heap);
        Ok(())
    }

    /// Remove a table's rows from memory and disk
    pub fn delete_table_store(&mut self, name: &str) -> Result<()> {
        self.tables.remove(name);
        self.disk.remove_table(name)
    }

    /// Write a table's full current row set
    pub fn persist(&self, schema: &TableSchema) -> Result<()> {
        let heap = self.table(schema.name())?;
        self.disk
            .write_table(schema.name(), &codec::encode_table(schema, heap))?;
        debug!(table = schema.name(), rows = heap.len(), "persisted table");
        Ok(())
    }

    /// Rows of a table
    pub fn table(&self, name: &str) -> Result<&RowHeap> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Mutable rows of a table
    pub fn table_mut(&mut self, name: &str) -> Result<&mut RowHeap> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }
}
