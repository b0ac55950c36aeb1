//! Catalog module
//!
//! This module contains the self-describing system catalog and the data type
//! tags it records.

pub mod catalog;
pub mod types;

pub use catalog::{Catalog, COLUMNS_TABLE_NAME, INDICES_TABLE_NAME, TABLES_TABLE_NAME};
pub use types::{ColumnAttribute, IndexType};
