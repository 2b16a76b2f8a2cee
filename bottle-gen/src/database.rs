//! # Database Module
//!
//! Live PostgreSQL catalog access. [`Database`] owns a connection pool and answers
//! [`CatalogReader`] calls by querying `information_schema`, so it works with any role that
//! can see the tables it is asked to describe.

// ============================================================================
// External Crate Imports
// ============================================================================

use async_trait::async_trait;
use sqlx::{
    PgPool, Row,
    postgres::{PgConnectOptions, PgPoolOptions},
};

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    Error, Result,
    catalog::CatalogReader,
    model::{Column, ForeignKey, PrimaryKey, SequenceBinding, Table, UniqueConstraint},
};

// ============================================================================
// Catalog Queries
// ============================================================================

const SCHEMAS_QUERY: &str = "SELECT schema_name::TEXT FROM information_schema.schemata \
     WHERE schema_name NOT IN ('information_schema', 'pg_catalog', 'pg_toast') ORDER BY schema_name";

const TABLES_QUERY: &str = "SELECT table_name::TEXT FROM information_schema.tables \
     WHERE table_schema = $1 AND table_type = 'BASE TABLE' ORDER BY table_name";

const TABLE_EXISTS_QUERY: &str = "SELECT EXISTS (SELECT FROM information_schema.tables \
     WHERE table_schema = $1 AND table_name = $2 AND table_type = 'BASE TABLE')";

const COLUMNS_QUERY: &str = "SELECT c.column_name::TEXT AS column_name, c.data_type::TEXT AS data_type, \
     c.character_maximum_length::INT4 AS max_length, c.numeric_precision::INT4 AS precision, \
     c.numeric_scale::INT4 AS scale, (c.is_nullable = 'YES') AS nullable, \
     c.column_default::TEXT AS column_default, c.ordinal_position::INT4 AS ordinal_position \
     FROM information_schema.columns c \
     WHERE c.table_schema = $1 AND c.table_name = $2 ORDER BY c.ordinal_position";

const PRIMARY_KEY_QUERY: &str = "SELECT kcu.column_name::TEXT \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
      AND tc.table_name = kcu.table_name \
     WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = $1 AND tc.table_name = $2 \
     ORDER BY kcu.ordinal_position";

const FOREIGN_KEYS_QUERY: &str = "SELECT kcu.column_name::TEXT AS column_name, \
     ccu.table_schema::TEXT AS referenced_schema, ccu.table_name::TEXT AS referenced_table, \
     ccu.column_name::TEXT AS referenced_column, tc.constraint_name::TEXT AS constraint_name \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
     JOIN information_schema.constraint_column_usage ccu \
       ON ccu.constraint_name = tc.constraint_name AND ccu.table_schema = tc.table_schema \
     WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = $1 AND tc.table_name = $2 \
     ORDER BY kcu.ordinal_position";

const UNIQUE_QUERY: &str = "SELECT tc.constraint_name::TEXT AS constraint_name, kcu.column_name::TEXT AS column_name \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
      AND tc.table_name = kcu.table_name \
     WHERE tc.constraint_type = 'UNIQUE' AND tc.table_schema = $1 AND tc.table_name = $2 \
     ORDER BY tc.constraint_name, kcu.ordinal_position";

const SEQUENCES_QUERY: &str = "SELECT c.column_name::TEXT AS column_name, \
     pg_get_serial_sequence(quote_ident(c.table_schema) || '.' || quote_ident(c.table_name), c.column_name)::TEXT AS sequence \
     FROM information_schema.columns c \
     WHERE c.table_schema = $1 AND c.table_name = $2 ORDER BY c.ordinal_position";

// ============================================================================
// Database Struct
// ============================================================================

/// A PostgreSQL catalog reader.
///
/// Cheap to clone: the underlying pool is reference counted.
#[derive(Debug, Clone)]
pub struct Database {
    pub(crate) pool: PgPool,
}

impl Database {
    /// Creates a new DatabaseBuilder for configuring the connection.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Connects to a database using the provided connection string.
    pub async fn connect(url: &str) -> Result<Self> {
        DatabaseBuilder::new().connect(url).await
    }

    /// Checks if a base table exists in the given schema.
    pub async fn table_exists(&self, schema: &str, table: &str) -> Result<bool> {
        let row = sqlx::query(TABLE_EXISTS_QUERY)
            .bind(schema)
            .bind(table)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::catalog(schema, table, e))?;
        Ok(row.try_get(0)?)
    }

    async fn columns(&self, schema: &str, table: &str) -> std::result::Result<Vec<Column>, sqlx::Error> {
        let rows = sqlx::query(COLUMNS_QUERY).bind(schema).bind(table).fetch_all(&self.pool).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            columns.push(Column {
                name: row.try_get("column_name")?,
                data_type: row.try_get("data_type")?,
                max_length: row.try_get("max_length")?,
                precision: row.try_get("precision")?,
                scale: row.try_get("scale")?,
                nullable: row.try_get("nullable")?,
                default_value: row.try_get("column_default")?,
                ordinal_position: row.try_get("ordinal_position")?,
            });
        }
        Ok(columns)
    }

    async fn primary_key(&self, schema: &str, table: &str) -> std::result::Result<PrimaryKey, sqlx::Error> {
        let rows = sqlx::query(PRIMARY_KEY_QUERY).bind(schema).bind(table).fetch_all(&self.pool).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            columns.push(row.try_get::<String, _>(0)?);
        }
        Ok(PrimaryKey { columns })
    }

    async fn foreign_keys(&self, schema: &str, table: &str) -> std::result::Result<Vec<ForeignKey>, sqlx::Error> {
        let rows = sqlx::query(FOREIGN_KEYS_QUERY).bind(schema).bind(table).fetch_all(&self.pool).await?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in rows {
            keys.push(ForeignKey {
                column: row.try_get("column_name")?,
                referenced_schema: row.try_get("referenced_schema")?,
                referenced_table: row.try_get("referenced_table")?,
                referenced_column: row.try_get("referenced_column")?,
                constraint_name: row.try_get("constraint_name")?,
            });
        }
        Ok(keys)
    }

    async fn unique_constraints(
        &self,
        schema: &str,
        table: &str,
    ) -> std::result::Result<Vec<UniqueConstraint>, sqlx::Error> {
        let rows = sqlx::query(UNIQUE_QUERY).bind(schema).bind(table).fetch_all(&self.pool).await?;

        // Rows arrive ordered by constraint, so consecutive rows share a constraint.
        let mut constraints: Vec<UniqueConstraint> = Vec::new();
        for row in rows {
            let name: String = row.try_get("constraint_name")?;
            let column: String = row.try_get("column_name")?;
            match constraints.last_mut() {
                Some(last) if last.name == name => last.columns.push(column),
                _ => constraints.push(UniqueConstraint { name, columns: vec![column] }),
            }
        }
        Ok(constraints)
    }

    async fn sequences(&self, schema: &str, table: &str) -> std::result::Result<Vec<SequenceBinding>, sqlx::Error> {
        let rows = sqlx::query(SEQUENCES_QUERY).bind(schema).bind(table).fetch_all(&self.pool).await?;

        let mut sequences = Vec::new();
        for row in rows {
            let column: String = row.try_get("column_name")?;
            let sequence: Option<String> = row.try_get("sequence")?;
            if let Some(sequence) = sequence {
                sequences.push(parse_sequence(column, &sequence, schema));
            }
        }
        Ok(sequences)
    }
}

/// Splits the `schema.name` text returned by `pg_get_serial_sequence`, dropping identifier
/// quotes.
fn parse_sequence(column: String, qualified: &str, default_schema: &str) -> SequenceBinding {
    let (sequence_schema, sequence_name) = match qualified.split_once('.') {
        Some((schema, name)) => (schema.trim_matches('"').to_string(), name.trim_matches('"').to_string()),
        None => (default_schema.to_string(), qualified.trim_matches('"').to_string()),
    };
    SequenceBinding { column, sequence_name, sequence_schema }
}

// ============================================================================
// CatalogReader Implementation
// ============================================================================

#[async_trait]
impl CatalogReader for Database {
    async fn list_schemas(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(SCHEMAS_QUERY).fetch_all(&self.pool).await?;
        let mut schemas = Vec::with_capacity(rows.len());
        for row in rows {
            schemas.push(row.try_get::<String, _>(0)?);
        }
        Ok(schemas)
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(TABLES_QUERY).bind(schema).fetch_all(&self.pool).await?;
        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            tables.push(row.try_get::<String, _>(0)?);
        }
        Ok(tables)
    }

    async fn describe_table(&self, schema: &str, table: &str) -> Result<Table> {
        if !self.table_exists(schema, table).await? {
            return Err(Error::TableNotFound { schema: schema.to_string(), table: table.to_string() });
        }

        let describe = async {
            Ok::<_, sqlx::Error>(Table {
                schema: schema.to_string(),
                name: table.to_string(),
                columns: self.columns(schema, table).await?,
                primary_key: self.primary_key(schema, table).await?,
                foreign_keys: self.foreign_keys(schema, table).await?,
                unique_constraints: self.unique_constraints(schema, table).await?,
                sequences: self.sequences(schema, table).await?,
            })
        };

        let described = describe.await.map_err(|e| Error::catalog(schema, table, e))?;
        log::debug!(
            "described {} ({} columns, {} foreign keys)",
            described.qualified_name(),
            described.columns.len(),
            described.foreign_keys.len()
        );
        Ok(described)
    }
}

// ============================================================================
// DatabaseBuilder Struct
// ============================================================================

/// Connection settings for [`Database`].
pub struct DatabaseBuilder {
    max_connections: u32,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self { max_connections: 5 }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub async fn connect(self, url: &str) -> Result<Database> {
        let pool = PgPoolOptions::new().max_connections(self.max_connections).connect(url).await?;
        log::info!("connected to catalog ({} max connections)", self.max_connections);
        Ok(Database { pool })
    }

    /// Connects with explicit options, e.g. [`GeneratorConfig::connect_options`].
    ///
    /// [`GeneratorConfig::connect_options`]: crate::GeneratorConfig::connect_options
    pub async fn connect_with(self, options: PgConnectOptions) -> Result<Database> {
        let pool = PgPoolOptions::new().max_connections(self.max_connections).connect_with(options).await?;
        log::info!("connected to catalog ({} max connections)", self.max_connections);
        Ok(Database { pool })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_sequence_text_is_split_and_unquoted() {
        let seq = parse_sequence("id".to_string(), "desmonte.perfis_id_seq", "public");
        assert_eq!(seq.sequence_schema, "desmonte");
        assert_eq!(seq.sequence_name, "perfis_id_seq");

        let quoted = parse_sequence("id".to_string(), "\"Vendas\".\"Pedidos_id_seq\"", "public");
        assert_eq!(quoted.qualified_name(), "Vendas.Pedidos_id_seq");

        let bare = parse_sequence("id".to_string(), "orders_id_seq", "public");
        assert_eq!(bare.qualified_name(), "public.orders_id_seq");
    }
}
