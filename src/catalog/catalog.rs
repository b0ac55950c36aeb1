//! System catalog for minirel
//!
//! The catalog is self-describing: three meta-relations record every table,
//! every table's columns, and every index. The meta-relations are ordinary
//! heap relations and contain rows for themselves after bootstrap. The
//! catalog resolves names to live `Relation`/`Index` objects and caches them.

use std::collections::HashMap;

use super::types::{ColumnAttribute, IndexType};
use crate::error::{Error, Result};
use crate::storage::{
    BTreeIndex, HashIndex, HeapRelation, Index, Relation, Row, StorageEngine, Value,
};

/// Name of the meta-relation listing every table
pub const TABLES_TABLE_NAME: &str = "_tables";
/// Name of the meta-relation listing every table's columns
pub const COLUMNS_TABLE_NAME: &str = "_columns";
/// Name of the meta-relation listing every index
pub const INDICES_TABLE_NAME: &str = "_indices";

const TABLES_SCHEMA: &[(&str, ColumnAttribute)] = &[("table_name", ColumnAttribute::Text)];

const COLUMNS_SCHEMA: &[(&str, ColumnAttribute)] = &[
    ("table_name", ColumnAttribute::Text),
    ("column_name", ColumnAttribute::Text),
    ("data_type", ColumnAttribute::Text),
];

const INDICES_SCHEMA: &[(&str, ColumnAttribute)] = &[
    ("table_name", ColumnAttribute::Text),
    ("index_name", ColumnAttribute::Text),
    ("seq_in_index", ColumnAttribute::Int),
    ("column_name", ColumnAttribute::Text),
    ("index_type", ColumnAttribute::Text),
    ("is_unique", ColumnAttribute::Boolean),
];

fn meta_relation(
    engine: &StorageEngine,
    name: &str,
    schema: &[(&str, ColumnAttribute)],
) -> HeapRelation {
    HeapRelation::new(
        engine.clone(),
        name,
        schema.iter().map(|(n, _)| n.to_string()).collect(),
        schema.iter().map(|(_, a)| *a).collect(),
    )
}

fn name_filter(table_name: &str) -> Row {
    let mut filter = Row::new();
    filter.insert(
        "table_name".to_string(),
        Value::Text(table_name.to_string()),
    );
    filter
}

/// System catalog - resolves names to relations and indices and keeps the
/// meta-relations consistent with them
pub struct Catalog {
    engine: StorageEngine,
    tables: HeapRelation,
    columns: HeapRelation,
    indices: HeapRelation,
    relation_cache: HashMap<String, Box<dyn Relation>>,
    index_cache: HashMap<(String, String), Box<dyn Index>>,
}

impl Catalog {
    /// Open the catalog over a storage engine, bootstrapping the
    /// meta-relations if this engine has never carried one. Bootstrap is
    /// idempotent.
    pub fn open(engine: StorageEngine) -> Result<Self> {
        let mut catalog = Self {
            tables: meta_relation(&engine, TABLES_TABLE_NAME, TABLES_SCHEMA),
            columns: meta_relation(&engine, COLUMNS_TABLE_NAME, COLUMNS_SCHEMA),
            indices: meta_relation(&engine, INDICES_TABLE_NAME, INDICES_SCHEMA),
            relation_cache: HashMap::new(),
            index_cache: HashMap::new(),
            engine,
        };
        catalog.bootstrap()?;
        Ok(catalog)
    }

    /// The storage engine this catalog runs on
    pub fn engine(&self) -> &StorageEngine {
        &self.engine
    }

    /// Whether `name` is one of the three protected meta-relations
    pub fn is_meta_table(name: &str) -> bool {
        matches!(
            name,
            TABLES_TABLE_NAME | COLUMNS_TABLE_NAME | INDICES_TABLE_NAME
        )
    }

    fn bootstrap(&mut self) -> Result<()> {
        self.tables.create_if_not_exists()?;
        self.columns.create_if_not_exists()?;
        self.indices.create_if_not_exists()?;

        let meta_schemas: [(&str, &[(&str, ColumnAttribute)]); 3] = [
            (TABLES_TABLE_NAME, TABLES_SCHEMA),
            (COLUMNS_TABLE_NAME, COLUMNS_SCHEMA),
            (INDICES_TABLE_NAME, INDICES_SCHEMA),
        ];
        for (table_name, schema) in meta_schemas {
            if self.tables.select(Some(&name_filter(table_name)))?.is_empty() {
                self.tables.insert(&name_filter(table_name))?;
            }
            for (column_name, attribute) in schema {
                let mut filter = name_filter(table_name);
                filter.insert(
                    "column_name".to_string(),
                    Value::Text(column_name.to_string()),
                );
                if self.columns.select(Some(&filter))?.is_empty() {
                    let mut row = filter;
                    row.insert("data_type".to_string(), Value::Text(attribute.to_string()));
                    self.columns.insert(&row)?;
                }
            }
        }
        Ok(())
    }

    /// Resolve a table name to its relation. User tables are loaded from the
    /// meta-relations on first access and cached.
    pub fn get_table(&mut self, name: &str) -> Result<&mut dyn Relation> {
        match name {
            TABLES_TABLE_NAME => Ok(&mut self.tables),
            COLUMNS_TABLE_NAME => Ok(&mut self.columns),
            INDICES_TABLE_NAME => Ok(&mut self.indices),
            _ => {
                if !self.relation_cache.contains_key(name) {
                    let relation = self.load_relation(name)?;
                    self.relation_cache
                        .insert(name.to_string(), Box::new(relation));
                }
                match self.relation_cache.get_mut(name) {
                    Some(relation) => Ok(relation.as_mut()),
                    None => Err(Error::UnknownTable(name.to_string())),
                }
            }
        }
    }

    /// Resolve an index by table and index name, reading its definition from
    /// `_indices` on first access.
    pub fn get_index(&mut self, table: &str, index: &str) -> Result<&mut dyn Index> {
        let key = (table.to_string(), index.to_string());
        if !self.index_cache.contains_key(&key) {
            let loaded = self.load_index(table, index)?;
            self.index_cache.insert(key.clone(), loaded);
        }
        match self.index_cache.get_mut(&key) {
            Some(loaded) => Ok(loaded.as_mut()),
            None => Err(Error::UnknownIndex(index.to_string(), table.to_string())),
        }
    }

    /// Distinct index names defined on `table`, in first-seen order
    pub fn get_index_names(&self, table: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for handle in self.indices.select(Some(&name_filter(table)))? {
            let row = self
                .indices
                .project(handle, Some(&["index_name".to_string()]))?;
            if let Some(Value::Text(name)) = row.get("index_name") {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        Ok(names)
    }

    /// Drop a cached relation and every cached index on it. Called by DDL so
    /// a later CREATE of the same name reloads fresh metadata.
    pub fn invalidate_table(&mut self, name: &str) {
        self.relation_cache.remove(name);
        self.index_cache.retain(|(table, _), _| table != name);
    }

    /// Drop a cached index
    pub fn invalidate_index(&mut self, table: &str, index: &str) {
        self.index_cache
            .remove(&(table.to_string(), index.to_string()));
    }

    /// Build a relation object for `name` from the meta-relations
    fn load_relation(&self, name: &str) -> Result<HeapRelation> {
        if self.tables.select(Some(&name_filter(name)))?.is_empty() {
            return Err(Error::UnknownTable(name.to_string()));
        }

        let mut column_names = Vec::new();
        let mut column_attributes = Vec::new();
        for handle in self.columns.select(Some(&name_filter(name)))? {
            let row = self.columns.project(handle, None)?;
            let column_name = row
                .get("column_name")
                .and_then(Value::as_text)
                .ok_or_else(|| {
                    Error::StorageError(format!("malformed _columns row for '{}'", name))
                })?;
            let data_type = row.get("data_type").and_then(Value::as_text).ok_or_else(|| {
                Error::StorageError(format!("malformed _columns row for '{}'", name))
            })?;
            column_names.push(column_name.to_string());
            column_attributes.push(ColumnAttribute::from_sql(data_type)?);
        }

        Ok(HeapRelation::new(
            self.engine.clone(),
            name,
            column_names,
            column_attributes,
        ))
    }

    /// Build an index object for `(table, index)` from `_indices`
    fn load_index(&self, table: &str, index: &str) -> Result<Box<dyn Index>> {
        let mut filter = name_filter(table);
        filter.insert("index_name".to_string(), Value::Text(index.to_string()));

        let handles = self.indices.select(Some(&filter))?;
        if handles.is_empty() {
            return Err(Error::UnknownIndex(index.to_string(), table.to_string()));
        }

        let mut rows = Vec::with_capacity(handles.len());
        for handle in handles {
            rows.push(self.indices.project(handle, None)?);
        }
        rows.sort_by_key(|row| {
            row.get("seq_in_index")
                .and_then(Value::as_int)
                .unwrap_or(0)
        });

        let mut key_columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let column = row
                .get("column_name")
                .and_then(Value::as_text)
                .ok_or_else(|| {
                    Error::StorageError(format!("malformed _indices row for '{}'", index))
                })?;
            key_columns.push(column.to_string());
        }
        let index_type = rows[0]
            .get("index_type")
            .and_then(Value::as_text)
            .ok_or_else(|| {
                Error::StorageError(format!("malformed _indices row for '{}'", index))
            })?;

        let relation = self.load_relation(table)?;
        Ok(match IndexType::from_sql(index_type)? {
            IndexType::BTree => Box::new(BTreeIndex::new(relation, index, key_columns)),
            IndexType::Hash => Box::new(HashIndex::new(relation, index, key_columns)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_table(catalog: &mut Catalog, name: &str, columns: &[(&str, ColumnAttribute)]) {
        catalog.tables.insert(&name_filter(name)).unwrap();
        for (column, attribute) in columns {
            let mut row = name_filter(name);
            row.insert("column_name".to_string(), Value::Text(column.to_string()));
            row.insert("data_type".to_string(), Value::Text(attribute.to_string()));
            catalog.columns.insert(&row).unwrap();
        }
    }

    #[test]
    fn test_bootstrap_registers_meta_tables() {
        let mut catalog = Catalog::open(StorageEngine::new()).unwrap();
        let tables = catalog.get_table(TABLES_TABLE_NAME).unwrap();
        assert_eq!(tables.select(None).unwrap().len(), 3);
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let engine = StorageEngine::new();
        let first = Catalog::open(engine.clone()).unwrap();
        let tables_before = first.tables.select(None).unwrap().len();
        let columns_before = first.columns.select(None).unwrap().len();

        let second = Catalog::open(engine).unwrap();
        assert_eq!(second.tables.select(None).unwrap().len(), tables_before);
        assert_eq!(second.columns.select(None).unwrap().len(), columns_before);
    }

    #[test]
    fn test_get_table_unknown() {
        let mut catalog = Catalog::open(StorageEngine::new()).unwrap();
        assert!(matches!(
            catalog.get_table("nope"),
            Err(Error::UnknownTable(_))
        ));
    }

    #[test]
    fn test_get_table_reads_schema_in_order() {
        let mut catalog = Catalog::open(StorageEngine::new()).unwrap();
        register_table(
            &mut catalog,
            "users",
            &[
                ("id", ColumnAttribute::Int),
                ("name", ColumnAttribute::Text),
            ],
        );

        let relation = catalog.get_table("users").unwrap();
        assert_eq!(relation.column_names(), ["id", "name"]);
        assert_eq!(
            relation.column_attributes(),
            [ColumnAttribute::Int, ColumnAttribute::Text]
        );
    }

    #[test]
    fn test_get_index_reads_key_order_from_seq() {
        let mut catalog = Catalog::open(StorageEngine::new()).unwrap();
        register_table(
            &mut catalog,
            "users",
            &[
                ("id", ColumnAttribute::Int),
                ("name", ColumnAttribute::Text),
            ],
        );
        // rows inserted out of seq order on purpose
        for (seq, column) in [(2, "id"), (1, "name")] {
            let mut row = name_filter("users");
            row.insert("index_name".to_string(), Value::Text("ix".to_string()));
            row.insert("seq_in_index".to_string(), Value::Integer(seq));
            row.insert("column_name".to_string(), Value::Text(column.to_string()));
            row.insert("index_type".to_string(), Value::Text("HASH".to_string()));
            row.insert("is_unique".to_string(), Value::Boolean(false));
            catalog.indices.insert(&row).unwrap();
        }

        let index = catalog.get_index("users", "ix").unwrap();
        assert_eq!(index.key_columns(), ["name", "id"]);
        assert_eq!(catalog.get_index_names("users").unwrap(), ["ix"]);
    }

    #[test]
    fn test_get_index_unknown() {
        let mut catalog = Catalog::open(StorageEngine::new()).unwrap();
        register_table(&mut catalog, "users", &[("id", ColumnAttribute::Int)]);
        assert!(matches!(
            catalog.get_index("users", "nope"),
            Err(Error::UnknownIndex(_, _))
        ));
    }
}
