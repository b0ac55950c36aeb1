//! SQL Abstract Syntax Tree (AST)
//!
//! This module defines the statement and expression nodes the executor
//! accepts. They are produced by an external SQL parser; the executor never
//! sees raw SQL text.

use crate::catalog::types::IndexType;

/// A SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// CREATE INDEX statement
    CreateIndex(CreateIndexStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
    /// DROP INDEX statement
    DropIndex(DropIndexStatement),
    /// SHOW TABLES
    ShowTables,
    /// SHOW COLUMNS FROM table
    ShowColumns { table_name: String },
    /// SHOW INDEX FROM table
    ShowIndex { table_name: String },
    /// INSERT statement
    Insert(InsertStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// SELECT statement
    Select(SelectStatement),
    /// UPDATE statement (parsed, not executed)
    Update(UpdateStatement),
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions in declaration order
    pub columns: Vec<ColumnDef>,
    /// IF NOT EXISTS flag
    pub if_not_exists: bool,
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Declared data type
    pub data_type: ColumnType,
}

/// Declared column type. `DOUBLE` parses but the executor rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Text,
    Double,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Int => write!(f, "INT"),
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::Double => write!(f, "DOUBLE"),
        }
    }
}

/// CREATE INDEX statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    /// Index name
    pub index_name: String,
    /// Table name
    pub table_name: String,
    /// USING clause
    pub index_type: IndexType,
    /// Indexed columns in key order
    pub columns: Vec<String>,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table_name: String,
}

/// DROP INDEX statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStatement {
    /// Index name
    pub index_name: String,
    /// Table name
    pub table_name: String,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table_name: String,
    /// Column names; empty means positional schema order
    pub columns: Vec<String>,
    /// Literal values, one per column
    pub values: Vec<Literal>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table name
    pub table_name: String,
    /// WHERE clause
    pub where_clause: Option<Expr>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Select list
    pub columns: SelectColumns,
    /// FROM table
    pub table_name: String,
    /// WHERE clause
    pub where_clause: Option<Expr>,
}

/// The select list: star or named columns
#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumns {
    Star,
    Columns(Vec<String>),
}

/// UPDATE statement (accepted by the parser; the executor answers it with a
/// "not implemented" result)
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table_name: String,
    /// SET clause (column = literal pairs)
    pub assignments: Vec<(String, Literal)>,
    /// WHERE clause
    pub where_clause: Option<Expr>,
}

/// SQL expression (WHERE trees)
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference
    Column(String),
    /// Literal value
    Literal(Literal),
    /// Binary operation
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// Parenthesized expression
    Nested(Box<Expr>),
}

impl Expr {
    /// `column = literal`
    pub fn eq(column: impl Into<String>, literal: Literal) -> Self {
        Expr::BinaryOp {
            left: Box::new(Expr::Column(column.into())),
            op: BinaryOperator::Eq,
            right: Box::new(Expr::Literal(literal)),
        }
    }

    /// `left AND right`
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op: BinaryOperator::And,
            right: Box::new(right),
        }
    }
}

/// Literal value. Integers carry parser width; the executor narrows them to
/// the engine's 32-bit INT.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer
    Integer(i64),
    /// Quoted string
    String(String),
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Logical
    And,
    Or,
    // Comparison
    Eq,
    Neq,
    Lt,
    Gt,
}
