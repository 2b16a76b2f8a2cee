//! # Policy Module
//!
//! Decides how each foreign key is rendered and what each table's class is called. The
//! resolver does not care where the answers come from: [`FixedPolicy`] answers from
//! configuration, the CLI's prompt policy asks a human.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{ForeignKey, Table};

// ============================================================================
// Policy Enums
// ============================================================================

/// How a single foreign key is rendered in the generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeignKeyPolicy {
    /// Object-valued field on the entity; the referenced table joins the generation set.
    Relationship,
    /// Plain scalar column everywhere; nothing else is scheduled.
    Column,
}

/// The run-wide foreign key configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    Relationship,
    Column,
    /// Each key is decided by the [`PolicySource`].
    #[default]
    Ask,
}

impl PolicyMode {
    /// The decision implied by the mode itself, `None` for [`PolicyMode::Ask`].
    pub fn fixed(self) -> Option<ForeignKeyPolicy> {
        match self {
            PolicyMode::Relationship => Some(ForeignKeyPolicy::Relationship),
            PolicyMode::Column => Some(ForeignKeyPolicy::Column),
            PolicyMode::Ask => None,
        }
    }
}

impl std::str::FromStr for PolicyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relationship" => Ok(PolicyMode::Relationship),
            "column" => Ok(PolicyMode::Column),
            "ask" => Ok(PolicyMode::Ask),
            other => Err(format!("unknown foreign key policy '{other}' (expected relationship, column or ask)")),
        }
    }
}

// ============================================================================
// Policy Source Trait
// ============================================================================

/// Supplies per-key handling decisions and per-table class names.
///
/// Both methods take `&mut self` so interactive implementations can drive a reader/writer pair.
pub trait PolicySource {
    /// Decides how `foreign_key` of `table` is handled. Only consulted in [`PolicyMode::Ask`].
    fn decide(&mut self, table: &Table, foreign_key: &ForeignKey) -> ForeignKeyPolicy;

    /// Returns the class name for `table`. Returning `default_name` keeps the derived name.
    fn class_name(&mut self, table: &Table, default_name: &str) -> String {
        let _ = table;
        default_name.to_string()
    }
}

impl<P: PolicySource + ?Sized> PolicySource for &mut P {
    fn decide(&mut self, table: &Table, foreign_key: &ForeignKey) -> ForeignKeyPolicy {
        (**self).decide(table, foreign_key)
    }

    fn class_name(&mut self, table: &Table, default_name: &str) -> String {
        (**self).class_name(table, default_name)
    }
}

// ============================================================================
// Fixed Policy
// ============================================================================

/// A non-interactive policy source: one default decision plus explicit overrides.
///
/// # Example
///
/// ```rust
/// use bottle_gen::policy::{FixedPolicy, ForeignKeyPolicy};
///
/// let policy = FixedPolicy::new(ForeignKeyPolicy::Relationship)
///     .with_override("empresas", "cidade_id", ForeignKeyPolicy::Column)
///     .with_class_name("papel_empresas", "Papel");
/// # let _ = policy;
/// ```
#[derive(Debug, Clone)]
pub struct FixedPolicy {
    default: ForeignKeyPolicy,
    overrides: HashMap<(String, String), ForeignKeyPolicy>,
    class_names: HashMap<String, String>,
}

impl Default for FixedPolicy {
    fn default() -> Self {
        Self::new(ForeignKeyPolicy::Relationship)
    }
}

impl FixedPolicy {
    pub fn new(default: ForeignKeyPolicy) -> Self {
        Self { default, overrides: HashMap::new(), class_names: HashMap::new() }
    }

    /// Overrides the decision for one `(table, column)` key.
    pub fn with_override(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        policy: ForeignKeyPolicy,
    ) -> Self {
        self.overrides.insert((table.into(), column.into()), policy);
        self
    }

    /// Overrides the class name of one table.
    pub fn with_class_name(mut self, table: impl Into<String>, class_name: impl Into<String>) -> Self {
        self.class_names.insert(table.into(), class_name.into());
        self
    }
}

impl PolicySource for FixedPolicy {
    fn decide(&mut self, table: &Table, foreign_key: &ForeignKey) -> ForeignKeyPolicy {
        self.overrides
            .get(&(table.name.clone(), foreign_key.column.clone()))
            .copied()
            .unwrap_or(self.default)
    }

    fn class_name(&mut self, table: &Table, default_name: &str) -> String {
        self.class_names.get(&table.name).cloned().unwrap_or_else(|| default_name.to_string())
    }
}
