//! minirel - a small SQL execution engine written in Rust
//!
//! This library provides the core of a small relational database:
//! - A self-describing schema catalog (`_tables`, `_columns`, `_indices`)
//! - Statement execution (CREATE, DROP, SHOW, INSERT, DELETE, SELECT)
//!   with compensating rollback for multi-step DDL
//! - A composable evaluation plan (TableScan, Select, Project)
//! - A heap storage engine behind abstract relation and index contracts

pub mod catalog;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use error::{Error, Result};
