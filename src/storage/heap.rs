//! Heap storage for minirel
//!
//! This module implements the physical store behind the relation and index
//! contracts: named heap files of rows plus the data structures backing
//! secondary indices. All state lives behind one shared handle so that every
//! relation and index object opened on the engine sees the same files.
//!
//! Durability is explicit-snapshot only: `save_to_disk` serializes the whole
//! engine and `load_from_disk` restores it. The engine is non-recovering.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::index::IndexKey;
use super::tuple::{Handle, Row};
use crate::catalog::types::IndexType;
use crate::error::{Error, Result};

/// A heap file: rows keyed by a monotonically increasing record id, so scan
/// order is insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HeapFile {
    file_id: u32,
    next_record_id: u32,
    rows: BTreeMap<u32, Row>,
}

impl HeapFile {
    fn new(file_id: u32) -> Self {
        Self {
            file_id,
            next_record_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

/// Physical data of one secondary index
#[derive(Debug)]
enum IndexData {
    /// Ordered, unique keys
    BTree(BTreeMap<IndexKey, Vec<Handle>>),
    /// Unordered, non-unique keys
    Hash(HashMap<IndexKey, Vec<Handle>>),
}

impl IndexData {
    fn index_type(&self) -> IndexType {
        match self {
            IndexData::BTree(_) => IndexType::BTree,
            IndexData::Hash(_) => IndexType::Hash,
        }
    }

    fn entries(&self) -> Vec<(IndexKey, Vec<Handle>)> {
        match self {
            IndexData::BTree(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            IndexData::Hash(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }

    fn from_entries(index_type: IndexType, entries: Vec<(IndexKey, Vec<Handle>)>) -> Self {
        match index_type {
            IndexType::BTree => IndexData::BTree(entries.into_iter().collect()),
            IndexType::Hash => IndexData::Hash(entries.into_iter().collect()),
        }
    }
}

#[derive(Debug, Default)]
struct EngineInner {
    files: HashMap<String, HeapFile>,
    indexes: HashMap<(String, String), IndexData>,
    next_file_id: u32,
}

/// Serializable proxy for the engine state
#[derive(Serialize, Deserialize)]
struct EngineSnapshot {
    files: Vec<(String, HeapFile)>,
    indexes: Vec<IndexSnapshot>,
    next_file_id: u32,
}

#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    table: String,
    index: String,
    index_type: IndexType,
    entries: Vec<(IndexKey, Vec<Handle>)>,
}

/// The storage engine: a shared, cheaply cloneable handle to the physical
/// heap files and index structures.
#[derive(Debug, Clone, Default)]
pub struct StorageEngine {
    inner: Arc<Mutex<EngineInner>>,
}

impl StorageEngine {
    /// Create a new empty in-memory engine
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap()
    }

    /// Serialize the whole engine state to a snapshot file
    pub fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        let inner = self.lock();
        let snapshot = EngineSnapshot {
            files: inner
                .files
                .iter()
                .map(|(name, file)| (name.clone(), file.clone()))
                .collect(),
            indexes: inner
                .indexes
                .iter()
                .map(|((table, index), data)| IndexSnapshot {
                    table: table.clone(),
                    index: index.clone(),
                    index_type: data.index_type(),
                    entries: data.entries(),
                })
                .collect(),
            next_file_id: inner.next_file_id,
        };
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(file, &snapshot).map_err(|e| Error::StorageError(e.to_string()))?;
        Ok(())
    }

    /// Restore an engine from a snapshot file
    pub fn load_from_disk(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let snapshot: EngineSnapshot =
            serde_json::from_reader(file).map_err(|e| Error::StorageError(e.to_string()))?;
        let inner = EngineInner {
            files: snapshot.files.into_iter().collect(),
            indexes: snapshot
                .indexes
                .into_iter()
                .map(|s| {
                    (
                        (s.table, s.index),
                        IndexData::from_entries(s.index_type, s.entries),
                    )
                })
                .collect(),
            next_file_id: snapshot.next_file_id,
        };
        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    // ========== Heap file operations ==========

    pub(crate) fn file_exists(&self, name: &str) -> bool {
        self.lock().files.contains_key(name)
    }

    pub(crate) fn create_file(&self, name: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.files.contains_key(name) {
            return Err(Error::StorageError(format!(
                "relation file '{}' already exists",
                name
            )));
        }
        inner.next_file_id += 1;
        let file = HeapFile::new(inner.next_file_id);
        inner.files.insert(name.to_string(), file);
        Ok(())
    }

    pub(crate) fn create_file_if_absent(&self, name: &str) -> Result<()> {
        if !self.file_exists(name) {
            self.create_file(name)?;
        }
        Ok(())
    }

    pub(crate) fn drop_file(&self, name: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.files.remove(name).is_none() {
            return Err(Error::StorageError(format!(
                "no such relation file '{}'",
                name
            )));
        }
        Ok(())
    }

    pub(crate) fn insert_row(&self, name: &str, row: Row) -> Result<Handle> {
        let mut inner = self.lock();
        let file = inner
            .files
            .get_mut(name)
            .ok_or_else(|| Error::StorageError(format!("no such relation file '{}'", name)))?;
        let record_id = file.next_record_id;
        file.next_record_id += 1;
        file.rows.insert(record_id, row);
        Ok(Handle::new(file.file_id, record_id))
    }

    pub(crate) fn delete_row(&self, name: &str, handle: Handle) -> Result<()> {
        let mut inner = self.lock();
        let file = inner
            .files
            .get_mut(name)
            .ok_or_else(|| Error::StorageError(format!("no such relation file '{}'", name)))?;
        if handle.file_id() != file.file_id || file.rows.remove(&handle.record_id()).is_none() {
            return Err(Error::StorageError(format!(
                "record not found in '{}'",
                name
            )));
        }
        Ok(())
    }

    pub(crate) fn get_row(&self, name: &str, handle: Handle) -> Result<Row> {
        let inner = self.lock();
        let file = inner
            .files
            .get(name)
            .ok_or_else(|| Error::StorageError(format!("no such relation file '{}'", name)))?;
        if handle.file_id() != file.file_id {
            return Err(Error::StorageError(format!(
                "record not found in '{}'",
                name
            )));
        }
        file.rows
            .get(&handle.record_id())
            .cloned()
            .ok_or_else(|| Error::StorageError(format!("record not found in '{}'", name)))
    }

    pub(crate) fn scan(&self, name: &str) -> Result<Vec<(Handle, Row)>> {
        let inner = self.lock();
        let file = inner
            .files
            .get(name)
            .ok_or_else(|| Error::StorageError(format!("no such relation file '{}'", name)))?;
        Ok(file
            .rows
            .iter()
            .map(|(record_id, row)| (Handle::new(file.file_id, *record_id), row.clone()))
            .collect())
    }

    // ========== Index operations ==========

    pub(crate) fn create_index(&self, table: &str, index: &str, kind: IndexType) -> Result<()> {
        let mut inner = self.lock();
        let key = (table.to_string(), index.to_string());
        if inner.indexes.contains_key(&key) {
            return Err(Error::StorageError(format!(
                "index '{}' on '{}' already exists",
                index, table
            )));
        }
        let data = match kind {
            IndexType::BTree => IndexData::BTree(BTreeMap::new()),
            IndexType::Hash => IndexData::Hash(HashMap::new()),
        };
        inner.indexes.insert(key, data);
        Ok(())
    }

    pub(crate) fn drop_index(&self, table: &str, index: &str) -> Result<()> {
        let mut inner = self.lock();
        let key = (table.to_string(), index.to_string());
        if inner.indexes.remove(&key).is_none() {
            return Err(Error::StorageError(format!(
                "no such index '{}' on '{}'",
                index, table
            )));
        }
        Ok(())
    }

    pub(crate) fn index_insert(
        &self,
        table: &str,
        index: &str,
        key: IndexKey,
        handle: Handle,
    ) -> Result<()> {
        let mut inner = self.lock();
        let data = inner
            .indexes
            .get_mut(&(table.to_string(), index.to_string()))
            .ok_or_else(|| {
                Error::StorageError(format!("no such index '{}' on '{}'", index, table))
            })?;
        match data {
            IndexData::BTree(map) => {
                if map.contains_key(&key) {
                    return Err(Error::StorageError(format!(
                        "duplicate key in unique index '{}'",
                        index
                    )));
                }
                map.insert(key, vec![handle]);
            }
            IndexData::Hash(map) => {
                map.entry(key).or_default().push(handle);
            }
        }
        Ok(())
    }

    pub(crate) fn index_remove(
        &self,
        table: &str,
        index: &str,
        key: &IndexKey,
        handle: Handle,
    ) -> Result<()> {
        let mut inner = self.lock();
        let data = inner
            .indexes
            .get_mut(&(table.to_string(), index.to_string()))
            .ok_or_else(|| {
                Error::StorageError(format!("no such index '{}' on '{}'", index, table))
            })?;
        let now_empty = match data {
            IndexData::BTree(map) => match map.get_mut(key) {
                Some(handles) => {
                    handles.retain(|h| *h != handle);
                    handles.is_empty()
                }
                None => false,
            },
            IndexData::Hash(map) => match map.get_mut(key) {
                Some(handles) => {
                    handles.retain(|h| *h != handle);
                    handles.is_empty()
                }
                None => false,
            },
        };
        if now_empty {
            match data {
                IndexData::BTree(map) => {
                    map.remove(key);
                }
                IndexData::Hash(map) => {
                    map.remove(key);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn index_lookup(&self, table: &str, index: &str, key: &IndexKey) -> Result<Vec<Handle>> {
        let inner = self.lock();
        let data = inner
            .indexes
            .get(&(table.to_string(), index.to_string()))
            .ok_or_else(|| {
                Error::StorageError(format!("no such index '{}' on '{}'", index, table))
            })?;
        let handles = match data {
            IndexData::BTree(map) => map.get(key),
            IndexData::Hash(map) => map.get(key),
        };
        Ok(handles.cloned().unwrap_or_default())
    }

}
