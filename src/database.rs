//! Database handle
//!
//! [`Database`] is the entry point for embedding TallyDB: it owns one engine
//! rooted at a data directory and executes SQL text against it.
//!
//! ```no_run
//! use tallydb::{Database, EngineConfig};
//!
//! let mut db = Database::open(EngineConfig::new().data_dir("data"))?;
//! db.execute("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)")?;
//! db.execute("INSERT INTO users VALUES (1, 'Ann')")?;
//! let result = db.execute("SELECT * FROM users WHERE id = 1")?;
//! assert_eq!(result.rows.len(), 1);
//! # Ok::<(), tallydb::Error>(())
//! ```

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::executor::{ExecutionEngine, QueryResult};
use crate::sql;
use tracing::debug;

/// An open database
#[derive(Debug)]
pub struct Database {
    config: EngineConfig,
    engine: ExecutionEngine,
}

impl Database {
    /// Open (or create) the database in `config.data_dir`.
    ///
    /// Fails if the catalog or any catalogued table's data cannot be read.
    pub fn open(config: EngineConfig) -> Result<Self> {
        let engine = ExecutionEngine::open(&config)?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse and execute one statement
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        let stmt = sql::parse(sql)?;
        debug!(statement = stmt.kind(), mutation = stmt.is_mutation(), "parsed");
        self.engine.execute(stmt)
    }

    /// Table names in creation order
    pub fn list_tables(&self) -> Vec<String> {
        self.engine.catalog().list_tables()
    }

    /// Human-readable summary of a table's schema
    pub fn describe_table(&self, name: &str) -> Result<String> {
        self.engine.catalog().get_table_info(name)
    }

    pub fn catalog(&self) -> &Catalog {
        self.engine.catalog()
    }
}
