//! # Catalog Module
//!
//! The catalog is the only collaborator the engine waits on. [`CatalogReader`] abstracts it;
//! [`crate::Database`] reads a live PostgreSQL catalog and [`MemoryCatalog`] serves snapshots
//! held in memory (tests, offline runs from a JSON capture).

use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, model::Table};

// ============================================================================
// Catalog Reader Trait
// ============================================================================

/// Read access to a relational catalog.
///
/// `describe_table` must fail with [`Error::TableNotFound`] when the table does not exist so
/// callers can tell a missing table from a broken connection.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Lists user schemas, ordered by name.
    async fn list_schemas(&self) -> Result<Vec<String>>;

    /// Lists the base tables of `schema`, ordered by name.
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// Describes one table.
    async fn describe_table(&self, schema: &str, table: &str) -> Result<Table>;
}

// ============================================================================
// In-Memory Catalog
// ============================================================================

/// A catalog backed by table snapshots held in memory.
///
/// Snapshots serialize to a flat JSON array of tables, so a live catalog can be captured
/// once (`--snapshot` in the CLI) and generation replayed without a database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Table>", into = "Vec<Table>")]
pub struct MemoryCatalog {
    tables: BTreeMap<(String, String), Table>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a table snapshot.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert((table.schema.clone(), table.name.clone()), table);
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn from_json_str(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads a snapshot written by [`MemoryCatalog::to_json_string`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json).map_err(|source| Error::Config { path: path.to_path_buf(), source })
    }

    pub fn to_json_string(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Captures every table of `schema` from another reader.
    pub async fn capture<C>(reader: &C, schema: &str) -> Result<Self>
    where
        C: CatalogReader + ?Sized,
    {
        let mut catalog = Self::new();
        for name in reader.list_tables(schema).await? {
            catalog.insert(reader.describe_table(schema, &name).await?);
        }
        Ok(catalog)
    }
}

impl From<Vec<Table>> for MemoryCatalog {
    fn from(tables: Vec<Table>) -> Self {
        let mut catalog = Self::new();
        for table in tables {
            catalog.insert(table);
        }
        catalog
    }
}

impl From<MemoryCatalog> for Vec<Table> {
    fn from(catalog: MemoryCatalog) -> Self {
        catalog.tables.into_values().collect()
    }
}

#[async_trait]
impl CatalogReader for MemoryCatalog {
    async fn list_schemas(&self) -> Result<Vec<String>> {
        let mut schemas: Vec<String> = self.tables.keys().map(|(schema, _)| schema.clone()).collect();
        schemas.dedup();
        Ok(schemas)
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        Ok(self
            .tables
            .keys()
            .filter(|(s, _)| s == schema)
            .map(|(_, name)| name.clone())
            .collect())
    }

    async fn describe_table(&self, schema: &str, table: &str) -> Result<Table> {
        self.tables
            .get(&(schema.to_string(), table.to_string()))
            .cloned()
            .ok_or_else(|| Error::TableNotFound { schema: schema.to_string(), table: table.to_string() })
    }
}

// ============================================================================
// Table References
// ============================================================================

/// A `schema.table` reference as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self { schema: schema.into(), table: table.into() }
    }
}

impl FromStr for TableRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('.') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() && !table.contains('.') => {
                Ok(Self::new(schema, table))
            }
            _ => Err(Error::InvalidTableReference(s.to_string())),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}
