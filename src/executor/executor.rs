//! Statement executor for minirel
//!
//! This module dispatches parsed statements against the catalog and storage
//! layer. DDL statements edit the catalog directly, with compensating
//! rollback when a multi-step operation fails partway; DML statements run
//! through an evaluation plan.

use serde::Serialize;
use std::fmt;

use super::plan::{where_conjunction, EvalPlan};
use crate::catalog::{
    Catalog, ColumnAttribute, COLUMNS_TABLE_NAME, INDICES_TABLE_NAME, TABLES_TABLE_NAME,
};
use crate::error::{Error, Result};
use crate::sql::ast::{
    ColumnType, CreateIndexStatement, CreateTableStatement, DeleteStatement, DropIndexStatement,
    DropTableStatement, InsertStatement, Literal, SelectColumns, SelectStatement, Statement,
};
use crate::storage::{Handle, Row, Value};

/// Query result
///
/// Non-result-producing statements carry only a message; SELECT and SHOW also
/// carry the projected column names, their attributes, and the rows.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    /// Projected column names, in result order
    pub column_names: Option<Vec<String>>,
    /// Attributes of the projected columns
    pub column_attributes: Option<Vec<ColumnAttribute>>,
    /// Materialized result rows
    pub rows: Option<Vec<Row>>,
    /// Human-readable outcome
    pub message: String,
}

impl QueryResult {
    /// Create a result carrying only a message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            column_names: None,
            column_attributes: None,
            rows: None,
            message: message.into(),
        }
    }

    /// Create a result carrying rows
    pub fn with_rows(
        column_names: Vec<String>,
        column_attributes: Vec<ColumnAttribute>,
        rows: Vec<Row>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            column_names: Some(column_names),
            column_attributes: Some(column_attributes),
            rows: Some(rows),
            message: message.into(),
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(column_names), Some(rows)) = (&self.column_names, &self.rows) {
            for column_name in column_names {
                write!(f, "{} ", column_name)?;
            }
            writeln!(f)?;
            write!(f, "+")?;
            for _ in column_names {
                write!(f, "----------+")?;
            }
            writeln!(f)?;
            for row in rows {
                for column_name in column_names {
                    match row.get(column_name) {
                        Some(value) => write!(f, "{} ", value)?,
                        None => write!(f, "??? ")?,
                    }
                }
                writeln!(f)?;
            }
        }
        write!(f, "{}", self.message)
    }
}

/// Which meta-relation a compensating delete targets
#[derive(Debug, Clone, Copy)]
enum MetaRelation {
    Tables,
    Columns,
    Indices,
}

impl MetaRelation {
    fn table_name(self) -> &'static str {
        match self {
            MetaRelation::Tables => TABLES_TABLE_NAME,
            MetaRelation::Columns => COLUMNS_TABLE_NAME,
            MetaRelation::Indices => INDICES_TABLE_NAME,
        }
    }
}

/// Ledger of catalog writes made by one multi-step DDL operation.
///
/// On success the ledger is dismissed; on failure `undo` deletes the
/// recorded rows in reverse order. Failures during undo are swallowed so the
/// original error reaches the caller.
struct Compensation {
    written: Vec<(MetaRelation, Handle)>,
}

impl Compensation {
    fn new() -> Self {
        Self {
            written: Vec::new(),
        }
    }

    fn record(&mut self, meta: MetaRelation, handle: Handle) {
        self.written.push((meta, handle));
    }

    fn dismiss(self) {}

    fn undo(self, catalog: &mut Catalog) {
        for (meta, handle) in self.written.into_iter().rev() {
            if let Ok(relation) = catalog.get_table(meta.table_name()) {
                let _ = relation.del(handle);
            }
        }
    }
}

/// Statement executor
pub struct SqlExecutor {
    catalog: Catalog,
}

impl SqlExecutor {
    /// Create an executor over an opened catalog
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Access the underlying catalog
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Execute one parsed statement
    pub fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        match statement {
            Statement::CreateTable(stmt) => self.create_table(stmt),
            Statement::CreateIndex(stmt) => self.create_index(stmt),
            Statement::DropTable(stmt) => self.drop_table(stmt),
            Statement::DropIndex(stmt) => self.drop_index(stmt),
            Statement::ShowTables => self.show_tables(),
            Statement::ShowColumns { table_name } => self.show_columns(table_name),
            Statement::ShowIndex { table_name } => self.show_index(table_name),
            Statement::Insert(stmt) => self.insert(stmt),
            Statement::Delete(stmt) => self.delete(stmt),
            Statement::Select(stmt) => self.select(stmt),
            Statement::Update(_) => Ok(QueryResult::with_message("not implemented")),
        }
    }

    // ========== DDL ==========

    fn create_table(&mut self, stmt: &CreateTableStatement) -> Result<QueryResult> {
        let mut column_names = Vec::with_capacity(stmt.columns.len());
        let mut column_attributes = Vec::with_capacity(stmt.columns.len());
        for column in &stmt.columns {
            let attribute = match column.data_type {
                ColumnType::Int => ColumnAttribute::Int,
                ColumnType::Text => ColumnAttribute::Text,
                ColumnType::Double => {
                    return Err(Error::UnsupportedType(column.data_type.to_string()))
                }
            };
            column_names.push(column.name.clone());
            column_attributes.push(attribute);
        }

        let mut table_row = Row::new();
        table_row.insert(
            "table_name".to_string(),
            Value::Text(stmt.table_name.clone()),
        );
        {
            let tables = self.catalog.get_table(TABLES_TABLE_NAME)?;
            if !tables.select(Some(&table_row))?.is_empty() {
                if stmt.if_not_exists {
                    return Ok(QueryResult::with_message(format!(
                        "table '{}' already exists",
                        stmt.table_name
                    )));
                }
                return Err(Error::StorageError(format!(
                    "table '{}' already exists",
                    stmt.table_name
                )));
            }
        }

        let table_handle = self.catalog.get_table(TABLES_TABLE_NAME)?.insert(&table_row)?;
        let mut compensation = Compensation::new();
        compensation.record(MetaRelation::Tables, table_handle);

        match self.create_table_body(stmt, &column_names, &column_attributes, &mut compensation) {
            Ok(result) => {
                compensation.dismiss();
                Ok(result)
            }
            Err(err) => {
                compensation.undo(&mut self.catalog);
                self.catalog.invalidate_table(&stmt.table_name);
                Err(err)
            }
        }
    }

    fn create_table_body(
        &mut self,
        stmt: &CreateTableStatement,
        column_names: &[String],
        column_attributes: &[ColumnAttribute],
        compensation: &mut Compensation,
    ) -> Result<QueryResult> {
        for (column_name, attribute) in column_names.iter().zip(column_attributes) {
            let mut row = Row::new();
            row.insert(
                "table_name".to_string(),
                Value::Text(stmt.table_name.clone()),
            );
            row.insert("column_name".to_string(), Value::Text(column_name.clone()));
            row.insert("data_type".to_string(), Value::Text(attribute.to_string()));
            let handle = self.catalog.get_table(COLUMNS_TABLE_NAME)?.insert(&row)?;
            compensation.record(MetaRelation::Columns, handle);
        }

        let relation = self.catalog.get_table(&stmt.table_name)?;
        if stmt.if_not_exists {
            relation.create_if_not_exists()?;
        } else {
            relation.create()?;
        }

        Ok(QueryResult::with_message(format!(
            "created {}",
            stmt.table_name
        )))
    }

    fn create_index(&mut self, stmt: &CreateIndexStatement) -> Result<QueryResult> {
        let table_columns = {
            let relation = self.catalog.get_table(&stmt.table_name)?;
            relation.column_names().to_vec()
        };
        for column in &stmt.columns {
            if !table_columns.contains(column) {
                return Err(Error::UnknownColumn(
                    column.clone(),
                    stmt.table_name.clone(),
                ));
            }
        }

        let mut compensation = Compensation::new();
        match self.create_index_body(stmt, &mut compensation) {
            Ok(result) => {
                compensation.dismiss();
                Ok(result)
            }
            Err(err) => {
                compensation.undo(&mut self.catalog);
                self.catalog
                    .invalidate_index(&stmt.table_name, &stmt.index_name);
                Err(err)
            }
        }
    }

    fn create_index_body(
        &mut self,
        stmt: &CreateIndexStatement,
        compensation: &mut Compensation,
    ) -> Result<QueryResult> {
        for (position, column) in stmt.columns.iter().enumerate() {
            let mut row = Row::new();
            row.insert(
                "table_name".to_string(),
                Value::Text(stmt.table_name.clone()),
            );
            row.insert(
                "index_name".to_string(),
                Value::Text(stmt.index_name.clone()),
            );
            row.insert(
                "seq_in_index".to_string(),
                Value::Integer(position as i32 + 1),
            );
            row.insert("column_name".to_string(), Value::Text(column.clone()));
            row.insert(
                "index_type".to_string(),
                Value::Text(stmt.index_type.to_string()),
            );
            row.insert(
                "is_unique".to_string(),
                Value::Boolean(stmt.index_type.is_unique()),
            );
            let handle = self.catalog.get_table(INDICES_TABLE_NAME)?.insert(&row)?;
            compensation.record(MetaRelation::Indices, handle);
        }

        let index = self
            .catalog
            .get_index(&stmt.table_name, &stmt.index_name)?;
        index.create()?;

        Ok(QueryResult::with_message(format!(
            "created index {}",
            stmt.index_name
        )))
    }

    fn drop_table(&mut self, stmt: &DropTableStatement) -> Result<QueryResult> {
        let table_name = &stmt.table_name;
        if Catalog::is_meta_table(table_name) {
            return Err(Error::SchemaProtected(table_name.clone()));
        }
        self.catalog.get_table(table_name)?;

        let filter = name_filter(table_name);
        for index_name in self.catalog.get_index_names(table_name)? {
            self.catalog.get_index(table_name, &index_name)?.drop()?;
            let mut index_filter = filter.clone();
            index_filter.insert("index_name".to_string(), Value::Text(index_name.clone()));
            let indices = self.catalog.get_table(INDICES_TABLE_NAME)?;
            for handle in indices.select(Some(&index_filter))? {
                indices.del(handle)?;
            }
            self.catalog.invalidate_index(table_name, &index_name);
        }

        let columns = self.catalog.get_table(COLUMNS_TABLE_NAME)?;
        for handle in columns.select(Some(&filter))? {
            columns.del(handle)?;
        }

        self.catalog.get_table(table_name)?.drop()?;

        let tables = self.catalog.get_table(TABLES_TABLE_NAME)?;
        for handle in tables.select(Some(&filter))? {
            tables.del(handle)?;
        }
        self.catalog.invalidate_table(table_name);

        Ok(QueryResult::with_message(format!("dropped {}", table_name)))
    }

    fn drop_index(&mut self, stmt: &DropIndexStatement) -> Result<QueryResult> {
        self.catalog
            .get_index(&stmt.table_name, &stmt.index_name)?
            .drop()?;

        let mut filter = name_filter(&stmt.table_name);
        filter.insert(
            "index_name".to_string(),
            Value::Text(stmt.index_name.clone()),
        );
        let indices = self.catalog.get_table(INDICES_TABLE_NAME)?;
        for handle in indices.select(Some(&filter))? {
            indices.del(handle)?;
        }
        self.catalog
            .invalidate_index(&stmt.table_name, &stmt.index_name);

        Ok(QueryResult::with_message(format!(
            "dropped index {}",
            stmt.index_name
        )))
    }

    // ========== DML ==========

    fn insert(&mut self, stmt: &InsertStatement) -> Result<QueryResult> {
        let (schema_names, schema_attributes) = {
            let relation = self.catalog.get_table(&stmt.table_name)?;
            (
                relation.column_names().to_vec(),
                relation.column_attributes().to_vec(),
            )
        };

        let columns: Vec<String> = if stmt.columns.is_empty() {
            schema_names.clone()
        } else {
            stmt.columns.clone()
        };
        if columns.len() != stmt.values.len() {
            return Err(Error::UnsupportedInsert(format!(
                "{} columns but {} values",
                columns.len(),
                stmt.values.len()
            )));
        }
        if columns.len() != schema_names.len() {
            return Err(Error::UnsupportedInsert(format!(
                "INSERT must cover every column of '{}'",
                stmt.table_name
            )));
        }

        let mut row = Row::new();
        for (column, literal) in columns.iter().zip(&stmt.values) {
            let position = schema_names
                .iter()
                .position(|name| name == column)
                .ok_or_else(|| Error::UnknownColumn(column.clone(), stmt.table_name.clone()))?;
            let value = literal_value(literal, schema_attributes[position], column)?;
            if row.insert(column.clone(), value).is_some() {
                return Err(Error::UnsupportedInsert(format!(
                    "column '{}' listed twice",
                    column
                )));
            }
        }

        let handle = self.catalog.get_table(&stmt.table_name)?.insert(&row)?;

        let index_names = self.catalog.get_index_names(&stmt.table_name)?;
        for index_name in &index_names {
            self.catalog
                .get_index(&stmt.table_name, index_name)?
                .insert(handle)?;
        }

        let mut message = format!("successfully inserted 1 row into {}", stmt.table_name);
        if !index_names.is_empty() {
            message.push_str(&format!(" and {} indices", index_names.len()));
        }
        Ok(QueryResult::with_message(message))
    }

    fn delete(&mut self, stmt: &DeleteStatement) -> Result<QueryResult> {
        let schema_names = {
            let relation = self.catalog.get_table(&stmt.table_name)?;
            relation.column_names().to_vec()
        };

        let mut plan = EvalPlan::TableScan {
            table: stmt.table_name.clone(),
        };
        if let Some(expr) = &stmt.where_clause {
            let predicate = where_conjunction(expr)?;
            for column in predicate.keys() {
                if !schema_names.contains(column) {
                    return Err(Error::UnknownColumn(
                        column.clone(),
                        stmt.table_name.clone(),
                    ));
                }
            }
            plan = EvalPlan::Select {
                predicate,
                child: Box::new(plan),
            };
        }

        let plan = plan.optimize(&mut self.catalog)?;
        let (table, handles) = plan.pipeline(&mut self.catalog)?;

        // indices first, so no index entry outlives its base row
        let index_names = self.catalog.get_index_names(&table)?;
        let mut rows = 0usize;
        let mut index_entries = 0usize;
        for handle in handles {
            for index_name in &index_names {
                self.catalog.get_index(&table, index_name)?.del(handle)?;
                index_entries += 1;
            }
            self.catalog.get_table(&table)?.del(handle)?;
            rows += 1;
        }

        let mut message = format!("successfully deleted {} rows from {}", rows, table);
        if index_entries > 0 {
            message.push_str(&format!(" and {} indices", index_entries));
        }
        Ok(QueryResult::with_message(message))
    }

    fn select(&mut self, stmt: &SelectStatement) -> Result<QueryResult> {
        let (schema_names, schema_attributes) = {
            let relation = self.catalog.get_table(&stmt.table_name)?;
            (
                relation.column_names().to_vec(),
                relation.column_attributes().to_vec(),
            )
        };

        let column_names: Vec<String> = match &stmt.columns {
            SelectColumns::Star => schema_names.clone(),
            SelectColumns::Columns(names) => names.clone(),
        };
        let mut column_attributes = Vec::with_capacity(column_names.len());
        for name in &column_names {
            let position = schema_names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| Error::UnknownColumn(name.clone(), stmt.table_name.clone()))?;
            column_attributes.push(schema_attributes[position]);
        }

        let mut plan = EvalPlan::TableScan {
            table: stmt.table_name.clone(),
        };
        if let Some(expr) = &stmt.where_clause {
            let predicate = where_conjunction(expr)?;
            for column in predicate.keys() {
                if !schema_names.contains(column) {
                    return Err(Error::UnknownColumn(
                        column.clone(),
                        stmt.table_name.clone(),
                    ));
                }
            }
            plan = EvalPlan::Select {
                predicate,
                child: Box::new(plan),
            };
        }
        let plan = EvalPlan::Project {
            columns: column_names.clone(),
            child: Box::new(plan),
        };

        let plan = plan.optimize(&mut self.catalog)?;
        let rows = plan.evaluate(&mut self.catalog)?;

        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            message,
        ))
    }

    // ========== SHOW ==========

    fn show_tables(&mut self) -> Result<QueryResult> {
        let column_names = vec!["table_name".to_string()];
        let column_attributes = vec![ColumnAttribute::Text];

        let tables = self.catalog.get_table(TABLES_TABLE_NAME)?;
        let mut rows = Vec::new();
        for handle in tables.select(None)? {
            let row = tables.project(handle, Some(&column_names))?;
            let is_meta = row
                .get("table_name")
                .and_then(Value::as_text)
                .map_or(false, Catalog::is_meta_table);
            if !is_meta {
                rows.push(row);
            }
        }

        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            message,
        ))
    }

    fn show_columns(&mut self, table_name: &str) -> Result<QueryResult> {
        let column_names = vec![
            "table_name".to_string(),
            "column_name".to_string(),
            "data_type".to_string(),
        ];
        let column_attributes = vec![ColumnAttribute::Text; 3];

        let columns = self.catalog.get_table(COLUMNS_TABLE_NAME)?;
        let mut rows = Vec::new();
        for handle in columns.select(Some(&name_filter(table_name)))? {
            rows.push(columns.project(handle, Some(&column_names))?);
        }

        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            message,
        ))
    }

    fn show_index(&mut self, table_name: &str) -> Result<QueryResult> {
        let column_names = vec![
            "table_name".to_string(),
            "index_name".to_string(),
            "column_name".to_string(),
            "seq_in_index".to_string(),
            "index_type".to_string(),
            "is_unique".to_string(),
        ];
        let column_attributes = vec![
            ColumnAttribute::Text,
            ColumnAttribute::Text,
            ColumnAttribute::Text,
            ColumnAttribute::Int,
            ColumnAttribute::Text,
            ColumnAttribute::Boolean,
        ];

        let indices = self.catalog.get_table(INDICES_TABLE_NAME)?;
        let mut rows = Vec::new();
        for handle in indices.select(Some(&name_filter(table_name)))? {
            rows.push(indices.project(handle, Some(&column_names))?);
        }

        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            message,
        ))
    }
}

fn name_filter(table_name: &str) -> Row {
    let mut filter = Row::new();
    filter.insert(
        "table_name".to_string(),
        Value::Text(table_name.to_string()),
    );
    filter
}

fn literal_value(literal: &Literal, attribute: ColumnAttribute, column: &str) -> Result<Value> {
    match (literal, attribute) {
        (Literal::Integer(n), ColumnAttribute::Int) => i32::try_from(*n)
            .map(Value::Integer)
            .map_err(|_| Error::TypeMismatch {
                column: column.to_string(),
                expected: attribute.to_string(),
            }),
        (Literal::String(s), ColumnAttribute::Text) => Ok(Value::Text(s.clone())),
        _ => Err(Error::TypeMismatch {
            column: column.to_string(),
            expected: attribute.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::ast::{ColumnDef, Expr};
    use crate::storage::StorageEngine;

    fn executor() -> SqlExecutor {
        let catalog = Catalog::open(StorageEngine::new()).unwrap();
        SqlExecutor::new(catalog)
    }

    fn create_foo() -> Statement {
        Statement::CreateTable(CreateTableStatement {
            table_name: "foo".to_string(),
            columns: vec![
                ColumnDef {
                    name: "id".to_string(),
                    data_type: ColumnType::Int,
                },
                ColumnDef {
                    name: "data".to_string(),
                    data_type: ColumnType::Text,
                },
            ],
            if_not_exists: false,
        })
    }

    fn insert_foo(id: i64, data: &str) -> Statement {
        Statement::Insert(InsertStatement {
            table_name: "foo".to_string(),
            columns: vec!["data".to_string(), "id".to_string()],
            values: vec![Literal::String(data.to_string()), Literal::Integer(id)],
        })
    }

    #[test]
    fn test_create_insert_select() {
        let mut exec = executor();
        let result = exec.execute(&create_foo()).unwrap();
        assert_eq!(result.message, "created foo");

        exec.execute(&insert_foo(7, "x")).unwrap();

        let result = exec
            .execute(&Statement::Select(SelectStatement {
                columns: SelectColumns::Star,
                table_name: "foo".to_string(),
                where_clause: Some(Expr::eq("id", Literal::Integer(7))),
            }))
            .unwrap();
        assert_eq!(
            result.column_names.as_deref(),
            Some(&["id".to_string(), "data".to_string()][..])
        );
        let rows = result.rows.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], Value::Integer(7));
        assert_eq!(rows[0]["data"], Value::Text("x".to_string()));
    }

    #[test]
    fn test_insert_requires_full_coverage() {
        let mut exec = executor();
        exec.execute(&create_foo()).unwrap();

        let err = exec
            .execute(&Statement::Insert(InsertStatement {
                table_name: "foo".to_string(),
                columns: vec!["id".to_string()],
                values: vec![Literal::Integer(1)],
            }))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedInsert(_)));
    }

    #[test]
    fn test_insert_positional() {
        let mut exec = executor();
        exec.execute(&create_foo()).unwrap();
        exec.execute(&Statement::Insert(InsertStatement {
            table_name: "foo".to_string(),
            columns: vec![],
            values: vec![Literal::Integer(1), Literal::String("a".to_string())],
        }))
        .unwrap();

        let result = exec
            .execute(&Statement::Select(SelectStatement {
                columns: SelectColumns::Star,
                table_name: "foo".to_string(),
                where_clause: None,
            }))
            .unwrap();
        let rows = result.rows.unwrap();
        assert_eq!(rows[0]["id"], Value::Integer(1));
        assert_eq!(rows[0]["data"], Value::Text("a".to_string()));
    }

    #[test]
    fn test_insert_type_mismatch() {
        let mut exec = executor();
        exec.execute(&create_foo()).unwrap();

        let err = exec
            .execute(&Statement::Insert(InsertStatement {
                table_name: "foo".to_string(),
                columns: vec!["id".to_string(), "data".to_string()],
                values: vec![
                    Literal::String("seven".to_string()),
                    Literal::String("x".to_string()),
                ],
            }))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_unsupported_type_is_compensated() {
        let mut exec = executor();
        let err = exec
            .execute(&Statement::CreateTable(CreateTableStatement {
                table_name: "bad".to_string(),
                columns: vec![ColumnDef {
                    name: "x".to_string(),
                    data_type: ColumnType::Double,
                }],
                if_not_exists: false,
            }))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));

        let result = exec.execute(&Statement::ShowTables).unwrap();
        assert_eq!(result.rows.unwrap().len(), 0);
    }

    #[test]
    fn test_delete_touches_indices() {
        let mut exec = executor();
        exec.execute(&create_foo()).unwrap();
        exec.execute(&insert_foo(7, "x")).unwrap();
        exec.execute(&Statement::CreateIndex(CreateIndexStatement {
            index_name: "ix".to_string(),
            table_name: "foo".to_string(),
            index_type: crate::catalog::IndexType::BTree,
            columns: vec!["id".to_string()],
        }))
        .unwrap();

        let result = exec
            .execute(&Statement::Delete(DeleteStatement {
                table_name: "foo".to_string(),
                where_clause: Some(Expr::eq("id", Literal::Integer(7))),
            }))
            .unwrap();
        assert_eq!(
            result.message,
            "successfully deleted 1 rows from foo and 1 indices"
        );
    }

    #[test]
    fn test_drop_meta_table_protected() {
        let mut exec = executor();
        let err = exec
            .execute(&Statement::DropTable(DropTableStatement {
                table_name: "_tables".to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, Error::SchemaProtected(_)));
    }

    #[test]
    fn test_update_not_implemented() {
        let mut exec = executor();
        let result = exec
            .execute(&Statement::Update(crate::sql::ast::UpdateStatement {
                table_name: "foo".to_string(),
                assignments: vec![],
                where_clause: None,
            }))
            .unwrap();
        assert_eq!(result.message, "not implemented");
    }

    #[test]
    fn test_query_result_display() {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Integer(7));
        row.insert("data".to_string(), Value::Text("x".to_string()));
        let result = QueryResult::with_rows(
            vec!["id".to_string(), "data".to_string()],
            vec![ColumnAttribute::Int, ColumnAttribute::Text],
            vec![row],
            "successfully returned 1 rows",
        );
        let printed = result.to_string();
        assert!(printed.starts_with("id data \n"));
        assert!(printed.contains("+----------+----------+"));
        assert!(printed.contains("7 \"x\" "));
        assert!(printed.ends_with("successfully returned 1 rows"));
    }
}
