//! # Type Mapper
//!
//! Maps catalog type names to the scalar types generated sources use. The mapping is
//! many-to-one; anything unrecognized becomes [`TargetType::Text`].

use serde::{Deserialize, Serialize};

/// A scalar type in the generated sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Integer,
    Long,
    Text,
    Boolean,
    Timestamp,
    Date,
    Time,
    Decimal,
    Float,
    Double,
    Uuid,
}

impl TargetType {
    /// The simple type name used in declarations (`Integer`, `Instant`, `BigDecimal`, ...).
    pub fn simple_name(self) -> &'static str {
        match self {
            TargetType::Integer => "Integer",
            TargetType::Long => "Long",
            TargetType::Text => "String",
            TargetType::Boolean => "Boolean",
            TargetType::Timestamp => "Instant",
            TargetType::Date => "LocalDate",
            TargetType::Time => "LocalTime",
            TargetType::Decimal => "BigDecimal",
            TargetType::Float => "Float",
            TargetType::Double => "Double",
            TargetType::Uuid => "UUID",
        }
    }

    /// The import a source file needs before it can use this type, if any.
    pub fn import(self) -> Option<&'static str> {
        match self {
            TargetType::Timestamp => Some("java.time.Instant"),
            TargetType::Date => Some("java.time.LocalDate"),
            TargetType::Time => Some("java.time.LocalTime"),
            TargetType::Decimal => Some("java.math.BigDecimal"),
            TargetType::Uuid => Some("java.util.UUID"),
            _ => None,
        }
    }

    pub fn is_text(self) -> bool {
        self == TargetType::Text
    }

    /// Parses the simple name back, as written in configuration files (`Long`, `UUID`, ...).
    pub fn from_simple_name(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|t| t.simple_name().eq_ignore_ascii_case(name))
    }
}

const ALL: [TargetType; 11] = [
    TargetType::Integer,
    TargetType::Long,
    TargetType::Text,
    TargetType::Boolean,
    TargetType::Timestamp,
    TargetType::Date,
    TargetType::Time,
    TargetType::Decimal,
    TargetType::Float,
    TargetType::Double,
    TargetType::Uuid,
];

/// Maps a catalog type name (case-insensitive) to its target scalar type.
///
/// ```rust
/// use bottle_gen::type_mapper::{map_catalog_type, TargetType};
///
/// assert_eq!(map_catalog_type("NUMERIC"), TargetType::Decimal);
/// assert_eq!(map_catalog_type("tsvector"), TargetType::Text);
/// ```
pub fn map_catalog_type(data_type: &str) -> TargetType {
    match data_type.trim().to_lowercase().as_str() {
        "smallint" | "smallserial" | "integer" | "serial" | "int" | "int2" | "int4" => TargetType::Integer,
        "bigint" | "bigserial" | "int8" => TargetType::Long,
        "character varying" | "varchar" | "text" | "char" | "character" => TargetType::Text,
        "boolean" | "bool" => TargetType::Boolean,
        "timestamp" | "timestamptz" | "timestamp with time zone" | "timestamp without time zone" => {
            TargetType::Timestamp
        }
        "date" => TargetType::Date,
        "time" | "time without time zone" => TargetType::Time,
        "numeric" | "decimal" => TargetType::Decimal,
        "real" | "float4" => TargetType::Float,
        "double precision" | "float8" => TargetType::Double,
        "uuid" => TargetType::Uuid,
        other => {
            log::debug!("unrecognized catalog type '{other}', falling back to {}", TargetType::Text.simple_name());
            TargetType::Text
        }
    }
}
