//! Engine configuration

use std::path::PathBuf;

/// Default data directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the catalog and table files
    pub data_dir: PathBuf,
    /// Catalog file name inside `data_dir`
    pub catalog_file: String,
    /// Extension for per-table data files
    pub table_extension: String,
    /// fsync every file before it replaces the previous version
    pub sync_writes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            catalog_file: "catalog.json".to_string(),
            table_extension: "tbl".to_string(),
            sync_writes: true,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the catalog file name
    pub fn catalog_file(mut self, name: impl Into<String>) -> Self {
        self.catalog_file = name.into();
        self
    }

    /// Set the table file extension
    pub fn table_extension(mut self, ext: impl Into<String>) -> Self {
        self.table_extension = ext.into();
        self
    }

    /// Enable or disable fsync on writes
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }
}
