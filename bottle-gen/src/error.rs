//! # Error Module
//!
//! A single error type for every stage of a generation run. Messages name the table, column
//! or file involved.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while reading the catalog, resolving relationships or planning artifacts.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog reader could not find the requested table.
    #[error("table {schema}.{table} does not exist in the catalog")]
    TableNotFound { schema: String, table: String },

    /// The catalog could not be queried (connectivity, permissions, malformed rows).
    #[error("catalog query failed{context}: {source}")]
    Catalog {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// A foreign key handled as a relationship points at a table that cannot be described.
    #[error("table {table}: column {column} references {target}, which could not be described")]
    UnresolvableRelationship {
        table: String,
        column: String,
        target: String,
        #[source]
        source: Box<Error>,
    },

    /// The planner was asked for a table that is not part of the resolved set.
    #[error("table {table} is not part of the resolved generation set")]
    UnknownTable { table: String },

    /// A `schema.table` reference could not be parsed.
    #[error("invalid table reference '{0}', expected schema.table")]
    InvalidTableReference(String),

    /// The configured connection settings do not form a valid URL.
    #[error("invalid database connection settings: {0}")]
    InvalidConnection(String),

    /// A configuration or snapshot file could not be parsed or serialized.
    #[error("invalid JSON in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for Error {
    fn from(source: sqlx::Error) -> Self {
        Error::Catalog { context: String::new(), source }
    }
}

impl Error {
    /// Wraps a `sqlx` failure with the table it was describing.
    pub(crate) fn catalog(schema: &str, table: &str, source: sqlx::Error) -> Self {
        Error::Catalog { context: format!(" while describing {schema}.{table}"), source }
    }

    /// Returns `true` when the error means "the table is not there", as opposed to a
    /// connectivity or parsing failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::TableNotFound { .. } => true,
            Error::UnresolvableRelationship { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
