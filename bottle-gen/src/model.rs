//! # Metadata Model
//!
//! Read-only snapshots of what the catalog knows about a table: its columns, primary key,
//! foreign keys, unique constraints and sequence bindings.
//!
//! A [`Table`] is produced once per catalog lookup and never mutated afterwards. The
//! builder-style helpers (`with_*`, `not_null`, ...) exist so catalog readers and tests can
//! assemble a snapshot; nothing downstream of the resolver changes one.

use serde::{Deserialize, Serialize};

// ============================================================================
// Column
// ============================================================================

/// Metadata information about a catalog column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// The column name in the database.
    pub name: String,
    /// The catalog type name (e.g., "character varying", "bigint", "timestamp").
    pub data_type: String,
    /// Maximum character length for bounded text types.
    #[serde(default)]
    pub max_length: Option<i32>,
    /// Numeric precision, when the catalog reports one.
    #[serde(default)]
    pub precision: Option<i32>,
    /// Numeric scale, when the catalog reports one.
    #[serde(default)]
    pub scale: Option<i32>,
    /// Whether this column allows NULL values.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// The raw default-value expression (e.g., `nextval('perfis_id_seq'::regclass)`).
    #[serde(default)]
    pub default_value: Option<String>,
    /// 1-based position of the column inside its table.
    #[serde(default)]
    pub ordinal_position: i32,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Creates a nullable column without length, default or position.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            max_length: None,
            precision: None,
            scale: None,
            nullable: true,
            default_value: None,
            ordinal_position: 0,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn max_length(mut self, length: i32) -> Self {
        self.max_length = Some(length);
        self
    }

    pub fn numeric(mut self, precision: i32, scale: i32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn default_value(mut self, expression: impl Into<String>) -> Self {
        self.default_value = Some(expression.into());
        self
    }

    pub fn position(mut self, ordinal: i32) -> Self {
        self.ordinal_position = ordinal;
        self
    }

    /// Whether the default expression hands out values from a sequence.
    pub fn is_auto_generated(&self) -> bool {
        self.default_value
            .as_deref()
            .is_some_and(|expr| expr.to_ascii_lowercase().contains("nextval"))
    }

    /// Whether the catalog type is a length-bounded character type.
    pub fn is_bounded_text(&self) -> bool {
        self.max_length.is_some()
            && matches!(self.data_type.to_ascii_lowercase().as_str(), "character varying" | "varchar")
    }
}

// ============================================================================
// Keys and Constraints
// ============================================================================

/// Ordered primary key column names. Empty means the table declares no primary key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub columns: Vec<String>,
}

impl PrimaryKey {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { columns: columns.into_iter().map(Into::into).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// A single-column foreign key as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// The owning column in this table.
    pub column: String,
    #[serde(default)]
    pub referenced_schema: String,
    pub referenced_table: String,
    #[serde(default = "default_referenced_column")]
    pub referenced_column: String,
    #[serde(default)]
    pub constraint_name: String,
}

fn default_referenced_column() -> String {
    "id".to_string()
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        referenced_schema: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        let column = column.into();
        let referenced_table = referenced_table.into();
        Self {
            constraint_name: format!("{column}_{referenced_table}_fk"),
            column,
            referenced_schema: referenced_schema.into(),
            referenced_table,
            referenced_column: referenced_column.into(),
        }
    }

    pub fn named(mut self, constraint_name: impl Into<String>) -> Self {
        self.constraint_name = constraint_name.into();
        self
    }
}

/// A unique constraint and its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

impl UniqueConstraint {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.into(), columns: columns.into_iter().map(Into::into).collect() }
    }

    /// The constrained column when exactly one column participates.
    pub fn single_column(&self) -> Option<&str> {
        match self.columns.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

/// Associates an auto-generated column with the sequence that feeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceBinding {
    pub column: String,
    pub sequence_name: String,
    #[serde(default)]
    pub sequence_schema: String,
}

impl SequenceBinding {
    pub fn new(
        column: impl Into<String>,
        sequence_schema: impl Into<String>,
        sequence_name: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            sequence_name: sequence_name.into(),
            sequence_schema: sequence_schema.into(),
        }
    }

    /// `schema.name`, or just `name` when the schema is unknown.
    pub fn qualified_name(&self) -> String {
        if self.sequence_schema.is_empty() {
            self.sequence_name.clone()
        } else {
            format!("{}.{}", self.sequence_schema, self.sequence_name)
        }
    }
}

// ============================================================================
// Table
// ============================================================================

/// A read-only snapshot of one catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub schema: String,
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_key: PrimaryKey,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraint>,
    #[serde(default)]
    pub sequences: Vec<SequenceBinding>,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            primary_key: PrimaryKey::default(),
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            sequences: Vec::new(),
        }
    }

    /// Appends a column, assigning the next ordinal position when none was given.
    pub fn with_column(mut self, mut column: Column) -> Self {
        if column.ordinal_position == 0 {
            column.ordinal_position = self.columns.len() as i32 + 1;
        }
        self.columns.push(column);
        self
    }

    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = PrimaryKey::new(columns);
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn with_unique(mut self, constraint: UniqueConstraint) -> Self {
        self.unique_constraints.push(constraint);
        self
    }

    pub fn with_sequence(mut self, sequence: SequenceBinding) -> Self {
        self.sequences.push(sequence);
        self
    }

    /// `schema.name`, or just `name` when the schema is unknown.
    pub fn qualified_name(&self) -> String {
        if self.schema.is_empty() { self.name.clone() } else { format!("{}.{}", self.schema, self.name) }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_primary_key(&self, column: &Column) -> bool {
        self.primary_key.contains(&column.name)
    }

    /// The foreign key owned by `column`. A column belongs to at most one active key; if the
    /// catalog reports several, the first one wins.
    pub fn foreign_key_for(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    pub fn sequence_for(&self, column: &str) -> Option<&SequenceBinding> {
        self.sequences.iter().find(|s| s.column == column)
    }

    /// Columns covered by a single-column unique constraint, in constraint order, without
    /// duplicates.
    pub fn single_column_uniques(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for column in self.unique_constraints.iter().filter_map(UniqueConstraint::single_column) {
            if !seen.contains(&column) {
                seen.push(column);
            }
        }
        seen
    }
}
