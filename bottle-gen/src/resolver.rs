//! # Relationship Resolver
//!
//! Expands the tables a caller asked for into the full set that has to be generated.
//!
//! Each table is described once. Its foreign keys are then decided one by one: a
//! *relationship* key appends the referenced table to the worklist (unless a table of that
//! name is already queued), a *column* key schedules nothing. The worklist is an append-only
//! `Vec` walked with an index cursor, so tables discovered while walking are picked up in
//! discovery order and no decision is ever revisited. Since a name enters the worklist at most
//! once, cycles and self-references terminate.
//!
//! The result is a frozen [`ResolvedGenerationSet`].

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
    Error, Result,
    catalog::CatalogReader,
    model::{ForeignKey, Table},
    naming::{singularize, to_pascal_case},
    policy::{ForeignKeyPolicy, PolicyMode, PolicySource},
};

// ============================================================================
// Resolved Set
// ============================================================================

/// One decided table: its snapshot, class name and per-key policies.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedTable {
    pub table: Table,
    pub class_name: String,
    /// Foreign key column → handling decision.
    pub policies: BTreeMap<String, ForeignKeyPolicy>,
}

impl ResolvedTable {
    pub fn name(&self) -> &str {
        &self.table.name
    }

    pub fn policy(&self, column: &str) -> Option<ForeignKeyPolicy> {
        self.policies.get(column).copied()
    }

    /// The foreign key owned by `column` when it is handled as a relationship.
    pub fn relationship_for(&self, column: &str) -> Option<&ForeignKey> {
        self.table
            .foreign_key_for(column)
            .filter(|_| self.policy(column) == Some(ForeignKeyPolicy::Relationship))
    }
}

/// The tables of one generation run, in decision order.
///
/// Built only by [`Resolver::resolve`]; there are no public mutators.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedGenerationSet {
    tables: Vec<ResolvedTable>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ResolvedGenerationSet {
    fn push(&mut self, resolved: ResolvedTable) {
        self.index.insert(resolved.table.name.clone(), self.tables.len());
        self.tables.push(resolved);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.index.contains_key(table)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedTable> {
        self.tables.iter()
    }

    pub fn get(&self, table: &str) -> Option<&ResolvedTable> {
        self.index.get(table).map(|&i| &self.tables[i])
    }

    pub fn table(&self, table: &str) -> Option<&Table> {
        self.get(table).map(|r| &r.table)
    }

    pub fn class_name(&self, table: &str) -> Option<&str> {
        self.get(table).map(|r| r.class_name.as_str())
    }

    pub fn policy(&self, table: &str, column: &str) -> Option<ForeignKeyPolicy> {
        self.get(table).and_then(|r| r.policy(column))
    }

    /// Table name → class name.
    pub fn class_names(&self) -> BTreeMap<&str, &str> {
        self.tables.iter().map(|r| (r.table.name.as_str(), r.class_name.as_str())).collect()
    }

    /// Table names in decision order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|r| r.table.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a ResolvedGenerationSet {
    type Item = &'a ResolvedTable;
    type IntoIter = std::slice::Iter<'a, ResolvedTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// The key that pulled a table into the worklist.
#[derive(Debug, Clone)]
struct Origin {
    table: String,
    column: String,
}

#[derive(Debug, Clone)]
struct Pending {
    schema: String,
    table: String,
    origin: Option<Origin>,
}

/// Computes the relationship closure of a set of tables.
///
/// A resolver holds no state between runs; concurrent runs just use separate `resolve` calls.
pub struct Resolver<'a, C: CatalogReader + ?Sized> {
    catalog: &'a C,
    mode: PolicyMode,
    singularize: bool,
}

impl<'a, C: CatalogReader + ?Sized> Resolver<'a, C> {
    /// Creates a resolver that asks the policy source for every key and singularizes class
    /// names.
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog, mode: PolicyMode::Ask, singularize: true }
    }

    pub fn mode(mut self, mode: PolicyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn automatic_singularization(mut self, enabled: bool) -> Self {
        self.singularize = enabled;
        self
    }

    /// Resolves `tables` (looked up in `schema`) and everything they pull in.
    ///
    /// # Errors
    ///
    /// A lookup failure for a requested table is returned as-is. A failure for a table reached
    /// through a relationship is wrapped in [`Error::UnresolvableRelationship`].
    pub async fn resolve<S, P>(&self, schema: &str, tables: &[S], policy: &mut P) -> Result<ResolvedGenerationSet>
    where
        S: AsRef<str>,
        P: PolicySource + ?Sized,
    {
        let mut worklist: Vec<Pending> = Vec::with_capacity(tables.len());
        for name in tables {
            let name = name.as_ref();
            if !worklist.iter().any(|p| p.table == name) {
                worklist.push(Pending { schema: schema.to_string(), table: name.to_string(), origin: None });
            }
        }

        let mut resolved = ResolvedGenerationSet::default();
        let mut cursor = 0;

        while cursor < worklist.len() {
            let pending = worklist[cursor].clone();
            cursor += 1;

            if resolved.contains(&pending.table) {
                continue;
            }

            let table = self.describe(&pending).await?;
            let default_name = default_class_name(&table.name, self.singularize);
            let class_name = policy.class_name(&table, &default_name);

            let mut policies = BTreeMap::new();
            for fk in &table.foreign_keys {
                // Only the first key on a column is planned.
                if policies.contains_key(&fk.column) {
                    log::warn!(
                        "{}.{} has more than one foreign key, ignoring the one to {}",
                        table.name,
                        fk.column,
                        fk.referenced_table
                    );
                    continue;
                }
                let decision = match self.mode.fixed() {
                    Some(fixed) => fixed,
                    None => policy.decide(&table, fk),
                };
                log::debug!("{}.{} -> {}: {:?}", table.name, fk.column, fk.referenced_table, decision);

                if decision == ForeignKeyPolicy::Relationship
                    && !worklist.iter().any(|p| p.table == fk.referenced_table)
                {
                    let target_schema =
                        if fk.referenced_schema.is_empty() { schema } else { fk.referenced_schema.as_str() };
                    log::info!(
                        "{}.{} references {}.{}, scheduling it for generation",
                        table.name,
                        fk.column,
                        target_schema,
                        fk.referenced_table
                    );
                    worklist.push(Pending {
                        schema: target_schema.to_string(),
                        table: fk.referenced_table.clone(),
                        origin: Some(Origin { table: table.name.clone(), column: fk.column.clone() }),
                    });
                }

                policies.insert(fk.column.clone(), decision);
            }

            log::info!("decided {} as {}", table.qualified_name(), class_name);
            resolved.push(ResolvedTable { table, class_name, policies });
        }

        Ok(resolved)
    }

    async fn describe(&self, pending: &Pending) -> Result<Table> {
        match self.catalog.describe_table(&pending.schema, &pending.table).await {
            Ok(table) => Ok(table),
            Err(source) => match &pending.origin {
                Some(origin) => Err(Error::UnresolvableRelationship {
                    table: origin.table.clone(),
                    column: origin.column.clone(),
                    target: format!("{}.{}", pending.schema, pending.table),
                    source: Box::new(source),
                }),
                None => Err(source),
            },
        }
    }
}

/// The class name a table gets unless a policy source overrides it:
/// `singularize(to_pascal_case(table))`, or just the Pascal case when singularization is off.
///
/// ```rust
/// use bottle_gen::resolver::default_class_name;
///
/// assert_eq!(default_class_name("papel_empresas", true), "PapelEmpresa");
/// assert_eq!(default_class_name("papel_empresas", false), "PapelEmpresas");
/// ```
pub fn default_class_name(table: &str, singularize_names: bool) -> String {
    let pascal = to_pascal_case(table);
    if singularize_names { singularize(&pascal) } else { pascal }
}
