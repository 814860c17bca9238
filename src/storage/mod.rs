//! Storage engine module
//!
//! This module contains the storage engine components:
//! - Values and rows
//! - In-memory row heaps
//! - Hash indexes
//! - Table file format and atomic disk writes

pub mod codec;
pub mod disk;
pub mod heap;
pub mod index;
pub mod store;
pub mod tuple;

pub use disk::DiskManager;
pub use heap::{RowHeap, RowId};
pub use index::{HashIndex, IndexManager, TableIndexes};
pub use store::Storage;
pub use tuple::{Row, Value};
