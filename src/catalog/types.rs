//! Data types for TallyDB
//!
//! This module defines the column types supported by the database.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    /// 64-bit signed integer
    Integer,
    /// UTF-8 text
    Text,
    /// Boolean
    Boolean,
}

impl DataType {
    /// Resolve a type name as written in CREATE TABLE (case-insensitive)
    pub fn from_name(name: &str) -> Option<DataType> {
        match name.to_uppercase().as_str() {
            "INT" | "INTEGER" => Some(DataType::Integer),
            "TEXT" | "VARCHAR" => Some(DataType::Text),
            "BOOL" | "BOOLEAN" => Some(DataType::Boolean),
            _ => None,
        }
    }

    /// Tag byte used by the table file format
    pub fn tag(&self) -> u8 {
        match self {
            DataType::Integer => 0,
            DataType::Text => 1,
            DataType::Boolean => 2,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(DataType::from_name("int"), Some(DataType::Integer));
        assert_eq!(DataType::from_name("INTEGER"), Some(DataType::Integer));
        assert_eq!(DataType::from_name("Text"), Some(DataType::Text));
        assert_eq!(DataType::from_name("bool"), Some(DataType::Boolean));
        assert_eq!(DataType::from_name("FLOAT"), None);
    }

    #[test]
    fn test_serialized_form() {
        let json = serde_json::to_string(&DataType::Boolean).unwrap();
        assert_eq!(json, "\"BOOLEAN\"");
        let back: DataType = serde_json::from_str("\"INTEGER\"").unwrap();
        assert_eq!(back, DataType::Integer);
    }
}
