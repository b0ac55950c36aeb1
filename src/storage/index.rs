//! Secondary index contract and implementations
//!
//! An index maps a composite key, projected from a base relation's rows, to
//! the handles of the rows carrying that key. `BTreeIndex` keeps keys in an
//! ordered map and enforces uniqueness; `HashIndex` is unordered and
//! non-unique.

use serde::{Deserialize, Serialize};

use super::heap::StorageEngine;
use super::table::{HeapRelation, Relation};
use super::tuple::{Handle, Row, Value};
use crate::catalog::types::IndexType;
use crate::error::{Error, Result};

/// A composite index key: the indexed columns' values in `seq_in_index` order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexKey(pub Vec<Value>);

/// Abstract contract to a secondary index
pub trait Index {
    /// Index name
    fn name(&self) -> &str;

    /// Indexed columns in key order
    fn key_columns(&self) -> &[String];

    /// Create the physical structure and build it over the relation's
    /// existing rows; fails if it already exists
    fn create(&mut self) -> Result<()>;

    /// Destroy the physical structure
    fn drop(&mut self) -> Result<()>;

    /// Add the row behind `handle` to the index
    fn insert(&mut self, handle: Handle) -> Result<()>;

    /// Remove the row behind `handle` from the index. The base row must
    /// still be present, as the key is recomputed from it.
    fn del(&mut self, handle: Handle) -> Result<()>;

    /// Handles of all rows whose key columns equal the given bindings
    fn lookup(&self, key: &Row) -> Result<Vec<Handle>>;
}

fn key_from_row(table: &str, key_columns: &[String], row: &Row) -> Result<IndexKey> {
    let mut values = Vec::with_capacity(key_columns.len());
    for column in key_columns {
        let value = row
            .get(column)
            .ok_or_else(|| Error::UnknownColumn(column.clone(), table.to_string()))?;
        values.push(value.clone());
    }
    Ok(IndexKey(values))
}

fn key_for_handle(
    relation: &HeapRelation,
    key_columns: &[String],
    handle: Handle,
) -> Result<IndexKey> {
    let row = relation.project(handle, Some(key_columns))?;
    key_from_row(relation.name(), key_columns, &row)
}

/// A unique, ordered index (BTREE)
#[derive(Debug)]
pub struct BTreeIndex {
    relation: HeapRelation,
    name: String,
    key_columns: Vec<String>,
}

impl BTreeIndex {
    pub fn new(relation: HeapRelation, name: impl Into<String>, key_columns: Vec<String>) -> Self {
        Self {
            relation,
            name: name.into(),
            key_columns,
        }
    }

    fn engine(&self) -> &StorageEngine {
        self.relation.engine()
    }
}

impl Index for BTreeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    fn create(&mut self) -> Result<()> {
        self.engine()
            .create_index(self.relation.name(), &self.name, IndexType::BTree)?;
        for handle in self.relation.select(None)? {
            self.insert(handle)?;
        }
        Ok(())
    }

    fn drop(&mut self) -> Result<()> {
        self.engine().drop_index(self.relation.name(), &self.name)
    }

    fn insert(&mut self, handle: Handle) -> Result<()> {
        let key = key_for_handle(&self.relation, &self.key_columns, handle)?;
        self.engine()
            .index_insert(self.relation.name(), &self.name, key, handle)
    }

    fn del(&mut self, handle: Handle) -> Result<()> {
        let key = key_for_handle(&self.relation, &self.key_columns, handle)?;
        self.engine()
            .index_remove(self.relation.name(), &self.name, &key, handle)
    }

    fn lookup(&self, key: &Row) -> Result<Vec<Handle>> {
        let key = key_from_row(self.relation.name(), &self.key_columns, key)?;
        self.engine()
            .index_lookup(self.relation.name(), &self.name, &key)
    }
}

/// A non-unique hash index (HASH)
#[derive(Debug)]
pub struct HashIndex {
    relation: HeapRelation,
    name: String,
    key_columns: Vec<String>,
}

impl HashIndex {
    pub fn new(relation: HeapRelation, name: impl Into<String>, key_columns: Vec<String>) -> Self {
        Self {
            relation,
            name: name.into(),
            key_columns,
        }
    }

    fn engine(&self) -> &StorageEngine {
        self.relation.engine()
    }
}

impl Index for HashIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    fn create(&mut self) -> Result<()> {
        self.engine()
            .create_index(self.relation.name(), &self.name, IndexType::Hash)?;
        for handle in self.relation.select(None)? {
            self.insert(handle)?;
        }
        Ok(())
    }

    fn drop(&mut self) -> Result<()> {
        self.engine().drop_index(self.relation.name(), &self.name)
    }

    fn insert(&mut self, handle: Handle) -> Result<()> {
        let key = key_for_handle(&self.relation, &self.key_columns, handle)?;
        self.engine()
            .index_insert(self.relation.name(), &self.name, key, handle)
    }

    fn del(&mut self, handle: Handle) -> Result<()> {
        let key = key_for_handle(&self.relation, &self.key_columns, handle)?;
        self.engine()
            .index_remove(self.relation.name(), &self.name, &key, handle)
    }

    fn lookup(&self, key: &Row) -> Result<Vec<Handle>> {
        let key = key_from_row(self.relation.name(), &self.key_columns, key)?;
        self.engine()
            .index_lookup(self.relation.name(), &self.name, &key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::ColumnAttribute;

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
    fn test_create_builds_over_existing_rows() {
        let engine = StorageEngine::new();
        let mut relation = users_relation(&engine);
        relation.create().unwrap();
        let handle = relation.insert(&user_row(7, "alice")).unwrap();

        let mut index = BTreeIndex::new(relation.clone(), "ix", vec!["id".to_string()]);
        index.create().unwrap();

        let mut key = Row::new();
        key.insert("id".to_string(), Value::Integer(7));
        assert_eq!(index.lookup(&key).unwrap(), vec![handle]);
    }

    #[test]
    fn test_insert_and_del_track_base_rows() {
        let engine = StorageEngine::new();
        let mut relation = users_relation(&engine);
        relation.create().unwrap();
        let mut index = BTreeIndex::new(relation.clone(), "ix", vec!["id".to_string()]);
        index.create().unwrap();

        let handle = relation.insert(&user_row(1, "alice")).unwrap();
        index.insert(handle).unwrap();

        let mut key = Row::new();
        key.insert("id".to_string(), Value::Integer(1));
        assert_eq!(index.lookup(&key).unwrap(), vec![handle]);

        index.del(handle).unwrap();
        relation.del(handle).unwrap();
        assert!(index.lookup(&key).unwrap().is_empty());
    }

    #[test]
    fn test_btree_unique_hash_not() {
        let engine = StorageEngine::new();
        let mut relation = users_relation(&engine);
        relation.create().unwrap();

        let mut btree = BTreeIndex::new(relation.clone(), "bt", vec!["name".to_string()]);
        btree.create().unwrap();
        let mut hash = HashIndex::new(relation.clone(), "hs", vec!["name".to_string()]);
        hash.create().unwrap();

        let h1 = relation.insert(&user_row(1, "same")).unwrap();
        let h2 = relation.insert(&user_row(2, "same")).unwrap();

        btree.insert(h1).unwrap();
        assert!(btree.insert(h2).is_err());

        hash.insert(h1).unwrap();
        hash.insert(h2).unwrap();
        let mut key = Row::new();
        key.insert("name".to_string(), Value::Text("same".to_string()));
        assert_eq!(hash.lookup(&key).unwrap().len(), 2);
    }

    #[test]
    fn test_composite_key_order() {
        let engine = StorageEngine::new();
        let mut relation = users_relation(&engine);
        relation.create().unwrap();
        let handle = relation.insert(&user_row(1, "alice")).unwrap();

        let mut index = HashIndex::new(
            relation.clone(),
            "ix",
            vec!["name".to_string(), "id".to_string()],
        );
        index.create().unwrap();

        let mut key = Row::new();
        key.insert("id".to_string(), Value::Integer(1));
        key.insert("name".to_string(), Value::Text("alice".to_string()));
        assert_eq!(index.lookup(&key).unwrap(), vec![handle]);
    }
}
