//! Data types for minirel
//!
//! This module defines the column attributes and index types the catalog
//! records for every table and index.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Column attribute: the data-type tag of a stored value.
///
/// `INT` and `TEXT` are user-declarable; `BOOLEAN` appears only in catalog
/// projections (the `is_unique` column of `_indices`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnAttribute {
    /// Integer (32-bit signed)
    Int,
    /// UTF-8 text
    Text,
    /// Boolean
    Boolean,
}

impl ColumnAttribute {
    /// Parse the textual encoding used in `_columns.data_type`
    pub fn from_sql(s: &str) -> Result<Self> {
        match s {
            "INT" => Ok(ColumnAttribute::Int),
            "TEXT" => Ok(ColumnAttribute::Text),
            "BOOLEAN" => Ok(ColumnAttribute::Boolean),
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for ColumnAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnAttribute::Int => write!(f, "INT"),
            ColumnAttribute::Text => write!(f, "TEXT"),
            ColumnAttribute::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// Index type: BTREE indices are unique, HASH indices are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    BTree,
    Hash,
}

impl IndexType {
    /// Whether indices of this type enforce key uniqueness
    pub fn is_unique(&self) -> bool {
        matches!(self, IndexType::BTree)
    }

    /// Parse the textual encoding used in `_indices.index_type`
    pub fn from_sql(s: &str) -> Result<Self> {
        match s {
            "BTREE" => Ok(IndexType::BTree),
            "HASH" => Ok(IndexType::Hash),
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexType::BTree => write!(f, "BTREE"),
            IndexType::Hash => write!(f, "HASH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_round_trip() {
        for attr in [
            ColumnAttribute::Int,
            ColumnAttribute::Text,
            ColumnAttribute::Boolean,
        ] {
            assert_eq!(ColumnAttribute::from_sql(&attr.to_string()).unwrap(), attr);
        }
        assert!(matches!(
            ColumnAttribute::from_sql("DOUBLE"),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_index_type_uniqueness() {
        assert!(IndexType::BTree.is_unique());
        assert!(!IndexType::Hash.is_unique());
        assert_eq!(IndexType::from_sql("HASH").unwrap(), IndexType::Hash);
    }
}
