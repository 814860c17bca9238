//! Disk manager for TallyDB
//!
//! This module handles file placement and whole-file atomic replacement.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Disk manager
#[derive(Debug, Clone)]
pub struct DiskManager {
    /// Directory where data files are stored
    data_dir: PathBuf,
    /// Catalog file name inside `data_dir`
    catalog_file: String,
    /// Extension for per-table data files
    table_extension: String,
    /// fsync files before they replace the previous version
    sync_writes: bool,
}

impl DiskManager {
    /// Create a disk manager, creating the data directory if needed
    pub fn new(config: &EngineConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            data_dir: config.data_dir.clone(),
            catalog_file: config.catalog_file.clone(),
            table_extension: config.table_extension.clone(),
            sync_writes: config.sync_writes,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", table_name, self.table_extension))
    }

    pub fn sync_writes(&self) -> bool {
        self.sync_writes
    }

    /// Replace a table's data file
    pub fn write_table(&self, table_name: &str, data: &[u8]) -> Result<()> {
        write_atomic(&self.table_path(table_name), data, self.sync_writes)
    }

    /// Read a table's data file
    pub fn read_table(&self, table_name: &str) -> Result<Vec<u8>> {
        let path = self.table_path(table_name);
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::Storage(format!(
                "data file '{}' for table '{}' is missing",
                path.display(),
                table_name
            )),
            _ => Error::Io(e),
        })
    }

    /// Remove a table's data file; a file that is already gone is not an error
    pub fn remove_table(&self, table_name: &str) -> Result<()> {
        match fs::remove_file(self.table_path(table_name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Write `data` to `path` so readers see either the old or the new content, never a mix.
///
/// The bytes go to a temporary file in the same directory which is then renamed
/// over the target.
pub fn write_atomic(path: &Path, data: &[u8], sync: bool) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.flush()?;
    if sync {
        file.as_file().sync_all()?;
    }
    file.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tbl");

        write_atomic(&path, b"first", false).unwrap();
        write_atomic(&path, b"second", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");

        // No temporary files left behind
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_table_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::new().data_dir(dir.path().join("db"));
        let disk = DiskManager::new(&config).unwrap();

        assert!(disk.data_dir().is_dir());
        assert_eq!(disk.table_path("users"), dir.path().join("db").join("users.tbl"));

        assert!(matches!(disk.read_table("users"), Err(Error::Storage(_))));
        disk.write_table("users", b"rows").unwrap();
        assert_eq!(disk.read_table("users").unwrap(), b"rows");

        disk.remove_table("users").unwrap();
        disk.remove_table("users").unwrap();
        assert!(!disk.table_path("users").exists());
    }
}
