//! Relation contract and heap-backed implementation
//!
//! A relation is a named container of rows with a fixed ordered schema. The
//! execution engine consumes relations only through the `Relation` trait; the
//! heap-file implementation below is the default backend.

use super::heap::StorageEngine;
use super::tuple::{Handle, Row};
use crate::catalog::types::ColumnAttribute;
use crate::error::{Error, Result};

/// Abstract contract to a stored relation
pub trait Relation {
    /// Relation name
    fn name(&self) -> &str;

    /// Column names in schema order
    fn column_names(&self) -> &[String];

    /// Column attributes in schema order
    fn column_attributes(&self) -> &[ColumnAttribute];

    /// Create the physical structure; fails if it already exists
    fn create(&mut self) -> Result<()>;

    /// Create the physical structure unless it already exists
    fn create_if_not_exists(&mut self) -> Result<()>;

    /// Destroy the physical structure
    fn drop(&mut self) -> Result<()>;

    /// Insert a row, returning its storage handle
    fn insert(&mut self, row: &Row) -> Result<Handle>;

    /// Delete the row behind a handle
    fn del(&mut self, handle: Handle) -> Result<()>;

    /// Handles of all rows matching the equality filter (all rows if `None`)
    fn select(&self, filter: Option<&Row>) -> Result<Vec<Handle>>;

    /// Project a stored row onto the given columns (all columns if `None`)
    fn project(&self, handle: Handle, columns: Option<&[String]>) -> Result<Row>;
}

/// A relation stored in a heap file
#[derive(Debug, Clone)]
pub struct HeapRelation {
    name: String,
    column_names: Vec<String>,
    column_attributes: Vec<ColumnAttribute>,
    engine: StorageEngine,
}

impl HeapRelation {
    pub fn new(
        engine: StorageEngine,
        name: impl Into<String>,
        column_names: Vec<String>,
        column_attributes: Vec<ColumnAttribute>,
    ) -> Self {
        Self {
            name: name.into(),
            column_names,
            column_attributes,
            engine,
        }
    }

    pub(crate) fn engine(&self) -> &StorageEngine {
        &self.engine
    }

    fn validate(&self, row: &Row) -> Result<()> {
        if row.len() != self.column_names.len() {
            return Err(Error::StorageError(format!(
                "row for '{}' has {} columns, schema has {}",
                self.name,
                row.len(),
                self.column_names.len()
            )));
        }
        for (column, attribute) in self.column_names.iter().zip(&self.column_attributes) {
            let value = row.get(column).ok_or_else(|| {
                Error::StorageError(format!(
                    "row for '{}' is missing column '{}'",
                    self.name, column
                ))
            })?;
            if value.attribute() != *attribute {
                return Err(Error::TypeMismatch {
                    column: column.clone(),
                    expected: attribute.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Relation for HeapRelation {
    fn name(&self) -> &str {
        &self.name
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn column_attributes(&self) -> &[ColumnAttribute] {
        &self.column_attributes
    }

    fn create(&mut self) -> Result<()> {
        self.engine.create_file(&self.name)
    }

    fn create_if_not_exists(&mut self) -> Result<()> {
        self.engine.create_file_if_absent(&self.name)
    }

    fn drop(&mut self) -> Result<()> {
        self.engine.drop_file(&self.name)
    }

    fn insert(&mut self, row: &Row) -> Result<Handle> {
        self.validate(row)?;
        self.engine.insert_row(&self.name, row.clone())
    }

    fn del(&mut self, handle: Handle) -> Result<()> {
        self.engine.delete_row(&self.name, handle)
    }

    fn select(&self, filter: Option<&Row>) -> Result<Vec<Handle>> {
        let mut handles = Vec::new();
        for (handle, row) in self.engine.scan(&self.name)? {
            let matches = match filter {
                Some(filter) => filter.iter().all(|(column, value)| {
                    row.get(column).map_or(false, |stored| stored == value)
                }),
                None => true,
            };
            if matches {
                handles.push(handle);
            }
        }
        Ok(handles)
    }

    fn project(&self, handle: Handle, columns: Option<&[String]>) -> Result<Row> {
        let row = self.engine.get_row(&self.name, handle)?;
        match columns {
            None => Ok(row),
            Some(columns) => {
                let mut projected = Row::new();
                for column in columns {
                    let value = row.get(column).ok_or_else(|| {
                        Error::UnknownColumn(column.clone(), self.name.clone())
                    })?;
                    projected.insert(column.clone(), value.clone());
                }
                Ok(projected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tuple::Value;

    fn users_relation(engine: &StorageEngine) -> HeapRelation {
        HeapRelation::new(
            engine.clone(),
            "users",
            vec!["id".to_string(), "name".to_string()],
            vec![ColumnAttribute::Int, ColumnAttribute::Text],
        )
    }

    fn user_row(id: i32, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Integer(id));
        row.insert("name".to_string(), Value::Text(name.to_string()));
        row
    }

    #[test]
    fn test_insert_select_project() {
        let engine = StorageEngine::new();
        let mut relation = users_relation(&engine);
        relation.create().unwrap();

        let handle = relation.insert(&user_row(1, "alice")).unwrap();
        relation.insert(&user_row(2, "bob")).unwrap();

        assert_eq!(relation.select(None).unwrap().len(), 2);

        let mut filter = Row::new();
        filter.insert("id".to_string(), Value::Integer(1));
        let matched = relation.select(Some(&filter)).unwrap();
        assert_eq!(matched, vec![handle]);

        let row = relation
            .project(handle, Some(&["name".to_string()]))
            .unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row["name"], Value::Text("alice".to_string()));
    }

    #[test]
    fn test_insert_rejects_wrong_type() {
        let engine = StorageEngine::new();
        let mut relation = users_relation(&engine);
        relation.create().unwrap();

        let mut row = Row::new();
        row.insert("id".to_string(), Value::Text("1".to_string()));
        row.insert("name".to_string(), Value::Text("alice".to_string()));
        assert!(matches!(
            relation.insert(&row),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_insert_rejects_missing_column() {
        let engine = StorageEngine::new();
        let mut relation = users_relation(&engine);
        relation.create().unwrap();

        let mut row = Row::new();
        row.insert("id".to_string(), Value::Integer(1));
        assert!(relation.insert(&row).is_err());
    }

    #[test]
    fn test_create_twice_fails_but_if_not_exists_succeeds() {
        let engine = StorageEngine::new();
        let mut relation = users_relation(&engine);
        relation.create().unwrap();
        assert!(relation.create().is_err());
        relation.create_if_not_exists().unwrap();
    }

    #[test]
    fn test_project_unknown_column() {
        let engine = StorageEngine::new();
        let mut relation = users_relation(&engine);
        relation.create().unwrap();
        let handle = relation.insert(&user_row(1, "alice")).unwrap();
        assert!(matches!(
            relation.project(handle, Some(&["nope".to_string()])),
            Err(Error::UnknownColumn(_, _))
        ));
    }
}
