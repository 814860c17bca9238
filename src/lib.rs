//! TallyDB - A small embeddable relational database engine written in Rust
//!
//! This library provides the core components:
//! - SQL parsing (lexer, parser, AST) for a restricted statement grammar
//! - System catalog with primary key and unique constraints
//! - Row storage persisted per table with atomic file replacement
//! - Hash indexes on primary key and unique columns
//! - Statement execution (planner, executor)

pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod output;
pub mod sql;
pub mod storage;

pub use config::EngineConfig;
pub use database::Database;
pub use error::{Error, ErrorKind, Result};
pub use executor::QueryResult;
pub use storage::{Row, Value};
