//! SQL frontend contract
//!
//! The AST types an external parser hands to the executor.

pub mod ast;
