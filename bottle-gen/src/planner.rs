//! # Artifact Planner
//!
//! Turns one resolved table into a syntax-free description of everything rendered for it:
//! the entity, the request and response shapes, the repository, the service and the
//! controller.
//!
//! Every per-column decision goes through [`ArtifactPlanner::field_for`], parameterized by
//! [`ArtifactKind`]. The entity, both shapes, the repository and the service therefore agree
//! on names and types by construction: the service and controller plans never derive a name
//! of their own, they look up the fields the other plans already hold.

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{
    Error, Result,
    config::Conventions,
    model::{Column, Table},
    naming::{capitalize, decapitalize, resource_segment, strip_id_suffix, to_camel_case},
    resolver::{ResolvedGenerationSet, ResolvedTable},
    type_mapper::{TargetType, map_catalog_type},
};

// ============================================================================
// Field Plans
// ============================================================================

/// The five artifact kinds a field can be planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Entity,
    Request,
    Response,
    Repository,
    Service,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Entity,
        ArtifactKind::Request,
        ArtifactKind::Response,
        ArtifactKind::Repository,
        ArtifactKind::Service,
    ];
}

/// Which audit timestamp a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Created,
    Updated,
}

/// What a field stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum FieldRole {
    /// Primary key column.
    Identity { auto_generated: bool },
    /// Timestamp assigned by the service, never copied from a request.
    Audit { audit: AuditKind },
    /// Object-valued field referencing another generated entity.
    Relationship { target_table: String, join_column: String },
    /// Scalar identifier standing in for a relationship outside the entity.
    RelationshipId { target_table: String, target_class: String },
    Scalar,
}

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    Scalar { scalar: TargetType },
    Entity { class_name: String },
}

impl FieldType {
    pub fn simple_name(&self) -> &str {
        match self {
            FieldType::Scalar { scalar } => scalar.simple_name(),
            FieldType::Entity { class_name } => class_name,
        }
    }

    pub fn scalar(&self) -> Option<TargetType> {
        match self {
            FieldType::Scalar { scalar } => Some(*scalar),
            FieldType::Entity { .. } => None,
        }
    }
}

/// A validation constraint attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum Validation {
    NotNull,
    NotBlank,
    MaxLength(i32),
}

/// One field of one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPlan {
    /// The field identifier, unique inside its artifact.
    pub name: String,
    /// The catalog column the field comes from.
    pub column: String,
    pub role: FieldRole,
    pub field_type: FieldType,
    pub nullable: bool,
    /// Covered by a single-column unique constraint.
    pub unique: bool,
    pub validations: Vec<Validation>,
    /// Length of bounded character columns (entity only).
    pub length: Option<i32>,
    /// Precision and scale of decimal columns (entity only).
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    /// Formatted default expression (entity only, never for generated columns).
    pub default_value: Option<String>,
}

impl FieldPlan {
    pub fn type_name(&self) -> &str {
        self.field_type.simple_name()
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.role, FieldRole::Identity { .. })
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self.role, FieldRole::Relationship { .. })
    }

    pub fn has_validation(&self, validation: Validation) -> bool {
        self.validations.contains(&validation)
    }
}

// ============================================================================
// Table-Level Plans
// ============================================================================

/// Every class and route name derived for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactNames {
    pub entity: String,
    pub request: String,
    pub response: String,
    pub repository: String,
    pub service: String,
    pub controller: String,
    /// Entity class with a lower-cased first character.
    pub variable: String,
    pub resource_path: String,
}

impl ArtifactNames {
    pub fn for_class(class_name: &str, api_prefix: &str) -> Self {
        Self {
            entity: class_name.to_string(),
            request: format!("{class_name}Request"),
            response: format!("{class_name}Response"),
            repository: format!("{class_name}Repository"),
            service: format!("{class_name}Service"),
            controller: format!("{class_name}Controller"),
            variable: decapitalize(class_name),
            resource_path: format!("{}/{}", api_prefix.trim_end_matches('/'), resource_segment(class_name)),
        }
    }
}

/// The key used by identifier-typed operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierPlan {
    /// The key column; `None` when the table declares no primary key.
    pub column: Option<String>,
    pub field_name: String,
    pub id_type: TargetType,
    /// The table's key has more than one column; only the first one is used here.
    pub composite: bool,
    /// No primary key; `id_type` is the configured fallback.
    pub fallback: bool,
}

/// Generator and sequence names for a sequence-backed identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedValuePlan {
    pub generator: String,
    pub sequence: String,
    pub allocation_size: u32,
}

/// Types and generated classes an artifact refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Imports {
    /// Fully qualified non-builtin types (`java.time.Instant`, ...).
    pub types: BTreeSet<String>,
    /// Generated classes referenced by simple name.
    pub classes: BTreeSet<String>,
}

impl Imports {
    fn from_fields<'f>(fields: impl IntoIterator<Item = &'f FieldPlan>) -> Self {
        let mut imports = Imports::default();
        for field in fields {
            match &field.field_type {
                FieldType::Scalar { scalar } => imports.add_type(*scalar),
                FieldType::Entity { class_name } => {
                    imports.classes.insert(class_name.clone());
                }
            }
        }
        imports
    }

    fn add_type(&mut self, target: TargetType) {
        if let Some(import) = target.import() {
            self.types.insert(import.to_string());
        }
    }

    pub fn needs(&self, target: TargetType) -> bool {
        target.import().is_some_and(|import| self.types.contains(import))
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.classes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityPlan {
    pub class_name: String,
    pub schema: String,
    pub table: String,
    pub fields: Vec<FieldPlan>,
    pub generated_value: Option<GeneratedValuePlan>,
    pub imports: Imports,
}

/// A request or response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DtoPlan {
    pub class_name: String,
    pub fields: Vec<FieldPlan>,
    pub imports: Imports,
}

impl DtoPlan {
    pub fn field_for_column(&self, column: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|f| f.column == column)
    }
}

/// An `existsBy<Field>` capability of the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExistsCheck {
    pub method: String,
    pub field: String,
    pub column: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryPlan {
    pub class_name: String,
    pub entity: String,
    pub id_type: TargetType,
    pub exists_checks: Vec<ExistsCheck>,
    pub imports: Imports,
}

/// A class injected into another one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub class_name: String,
    pub variable: String,
}

impl Dependency {
    fn new(class_name: &str) -> Self {
        Self { class_name: class_name.to_string(), variable: decapitalize(class_name) }
    }
}

/// Where a value on the entity is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ValueSource {
    /// `entity.<entity_field>`
    Direct { entity_field: String },
    /// `entity.<entity_field>.<related_id_field>`, null when the related object is null.
    RelatedId { entity_field: String, related_id_field: String },
}

/// Resolves a request identifier into a related entity through its service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationLookup {
    pub column: String,
    pub request_field: String,
    pub entity_field: String,
    pub target_class: String,
    pub id_type: TargetType,
    pub nullable: bool,
    /// The related service; `None` when the relationship points back at this table.
    pub service: Option<Dependency>,
}

/// Rejects create/update when another row already holds the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueCheck {
    pub column: String,
    pub request_field: String,
    pub exists_method: String,
    /// The stored value compared against on update.
    pub current_value: ValueSource,
    /// On update, only checked when the value changed.
    pub skip_when_unchanged: bool,
    /// Null request values are never checked.
    pub null_exempt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditAssignment {
    pub column: String,
    pub entity_field: String,
    pub audit: AuditKind,
    pub field_type: TargetType,
    pub on_create: bool,
    pub on_update: bool,
}

/// A request value copied onto the entity as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCopy {
    pub column: String,
    pub request_field: String,
    pub entity_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMapping {
    pub column: String,
    pub response_field: String,
    pub source: ValueSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePlan {
    pub class_name: String,
    pub entity: String,
    pub request: String,
    pub response: String,
    pub id_type: TargetType,
    pub repository: Dependency,
    pub related_services: Vec<Dependency>,
    pub lookups: Vec<RelationLookup>,
    pub unique_checks: Vec<UniqueCheck>,
    pub audit: Vec<AuditAssignment>,
    pub copied_fields: Vec<FieldCopy>,
    pub response_mappings: Vec<ResponseMapping>,
    pub imports: Imports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationPlan {
    pub name: String,
    pub method: HttpMethod,
    /// Path relative to the controller's base path.
    pub path: String,
    pub status: u16,
    pub request_body: bool,
    pub paged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerPlan {
    pub class_name: String,
    pub base_path: String,
    pub service: Dependency,
    pub request: String,
    pub response: String,
    pub id_type: TargetType,
    pub default_sort: String,
    pub operations: Vec<OperationPlan>,
    pub imports: Imports,
}

impl ControllerPlan {
    pub fn operation(&self, name: &str) -> Option<&OperationPlan> {
        self.operations.iter().find(|op| op.name == name)
    }
}

/// Everything rendered for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePlan {
    pub schema: String,
    pub table: String,
    pub names: ArtifactNames,
    pub identifier: IdentifierPlan,
    pub entity: EntityPlan,
    pub request: DtoPlan,
    pub response: DtoPlan,
    pub repository: RepositoryPlan,
    pub service: ServicePlan,
    pub controller: ControllerPlan,
}

// ============================================================================
// Column Classification
// ============================================================================

enum ColumnClass<'r> {
    Identity,
    Relationship(&'r ResolvedTable),
    Audit(AuditKind),
    /// Sequence-backed column outside the key.
    ReadOnly,
    Scalar,
}

/// Whether the column is filled by a sequence: a `nextval` default or a bound sequence.
fn is_generated(table: &Table, column: &Column) -> bool {
    column.is_auto_generated() || table.sequence_for(&column.name).is_some()
}

static CAST_SUFFIX: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"::[a-zA-Z_]+.*")
        .map_err(|e| log::error!("invalid cast pattern: {e}"))
        .ok()
});

/// Formats a catalog default expression for the entity: casts are dropped and unquoted
/// literals get quoted.
///
/// ```rust
/// use bottle_gen::planner::format_default_value;
///
/// assert_eq!(format_default_value("'CE'::character varying"), "'CE'");
/// assert_eq!(format_default_value("0"), "'0'");
/// ```
pub fn format_default_value(expression: &str) -> String {
    let stripped = match &*CAST_SUFFIX {
        Some(cast) => cast.replace(expression, ""),
        None => expression.into(),
    };
    let stripped = stripped.trim();
    if stripped.len() >= 2 && stripped.starts_with('\'') && stripped.ends_with('\'') {
        stripped.to_string()
    } else {
        format!("'{stripped}'")
    }
}

/// Returns `name`, or `name` suffixed with `Ref` (then `Ref2`, `Ref3`, ...) when it is
/// already taken.
fn unique_field_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = if counter == 1 { format!("{name}Ref") } else { format!("{name}Ref{counter}") };
        if seen.insert(candidate.clone()) {
            log::warn!("field name '{name}' is already taken, using '{candidate}'");
            return candidate;
        }
        counter += 1;
    }
}

// ============================================================================
// Planner
// ============================================================================

/// Plans artifacts for the tables of a frozen [`ResolvedGenerationSet`].
pub struct ArtifactPlanner<'a> {
    resolved: &'a ResolvedGenerationSet,
    conventions: &'a Conventions,
}

impl<'a> ArtifactPlanner<'a> {
    pub fn new(resolved: &'a ResolvedGenerationSet, conventions: &'a Conventions) -> Self {
        Self { resolved, conventions }
    }

    /// Plans every resolved table, in resolution order.
    pub fn plan_all(&self) -> Result<Vec<TablePlan>> {
        self.resolved.iter().map(|r| self.plan_resolved(r)).collect()
    }

    /// Plans one table of the resolved set.
    pub fn plan(&self, table: &str) -> Result<TablePlan> {
        let resolved = self.lookup(table)?;
        self.plan_resolved(resolved)
    }

    fn lookup(&self, table: &str) -> Result<&'a ResolvedTable> {
        self.resolved.get(table).ok_or_else(|| Error::UnknownTable { table: table.to_string() })
    }

    fn plan_resolved(&self, resolved: &ResolvedTable) -> Result<TablePlan> {
        let table = &resolved.table;
        let names = ArtifactNames::for_class(&resolved.class_name, &self.conventions.api_prefix);
        let identifier = self.identifier(resolved)?;

        if identifier.fallback {
            log::warn!(
                "table {} has no primary key, identifier operations use {}",
                table.qualified_name(),
                identifier.id_type.simple_name()
            );
        } else if identifier.composite {
            log::warn!(
                "table {} has a composite primary key, identifier operations only use {}",
                table.qualified_name(),
                identifier.field_name
            );
        }

        let entity = self.entity_plan(resolved, &names, &identifier)?;
        let request = self.dto_plan(resolved, &names.request, ArtifactKind::Request)?;
        let response = self.dto_plan(resolved, &names.response, ArtifactKind::Response)?;
        let repository = self.repository_plan(resolved, &names, &identifier)?;
        let service = self.service_plan(resolved, &names, &identifier, &entity, &request, &response, &repository)?;
        let controller = controller_plan(&names, &identifier);

        log::debug!("planned {} ({} entity fields)", names.entity, entity.fields.len());

        Ok(TablePlan {
            schema: table.schema.clone(),
            table: table.name.clone(),
            names,
            identifier,
            entity,
            request,
            response,
            repository,
            service,
            controller,
        })
    }

    // ------------------------------------------------------------------------
    // Identifiers
    // ------------------------------------------------------------------------

    /// The identifier type of a table without planning its fields.
    fn identifier_type(&self, resolved: &ResolvedTable) -> Option<TargetType> {
        let table = &resolved.table;
        let first = table.primary_key.columns.first()?;
        table.column(first).map(|column| map_catalog_type(&column.data_type))
    }

    /// The identifier plan of a resolved table. The field name is the one the entity plan
    /// gives the key column.
    pub fn identifier(&self, resolved: &ResolvedTable) -> Result<IdentifierPlan> {
        let table = &resolved.table;
        let key = table.primary_key.columns.first().and_then(|first| table.column(first));

        let Some(column) = key else {
            return Ok(IdentifierPlan {
                column: None,
                field_name: "id".to_string(),
                id_type: self.conventions.fallback_id(),
                composite: false,
                fallback: true,
            });
        };

        let field_name = self
            .fields(resolved, ArtifactKind::Entity)?
            .into_iter()
            .find(|f| f.column == column.name)
            .map(|f| f.name)
            .unwrap_or_else(|| to_camel_case(&column.name));

        Ok(IdentifierPlan {
            column: Some(column.name.clone()),
            field_name,
            id_type: map_catalog_type(&column.data_type),
            composite: table.primary_key.is_composite(),
            fallback: false,
        })
    }

    // ------------------------------------------------------------------------
    // Field Derivation
    // ------------------------------------------------------------------------

    fn classify(&self, resolved: &ResolvedTable, column: &Column) -> Result<ColumnClass<'a>> {
        let table = &resolved.table;
        if table.is_primary_key(column) {
            return Ok(ColumnClass::Identity);
        }
        if let Some(fk) = resolved.relationship_for(&column.name) {
            return Ok(ColumnClass::Relationship(self.lookup(&fk.referenced_table)?));
        }
        if self.conventions.is_created_audit(&column.name) {
            return Ok(ColumnClass::Audit(AuditKind::Created));
        }
        if self.conventions.is_updated_audit(&column.name) {
            return Ok(ColumnClass::Audit(AuditKind::Updated));
        }
        if is_generated(table, column) {
            return Ok(ColumnClass::ReadOnly);
        }
        Ok(ColumnClass::Scalar)
    }

    /// Plans `column` for one artifact kind; `None` when the artifact leaves it out.
    ///
    /// | column | entity | request | response | repository | service |
    /// |---|---|---|---|---|---|
    /// | primary key | identity | - | identity | - | - |
    /// | relationship | object | target id | target id | id when unique | object (lookup) |
    /// | audit | audit | - | audit | scalar when unique | audit (assigned) |
    /// | sequence-backed | scalar | - | scalar | scalar when unique | - |
    /// | other | scalar | scalar | scalar | scalar when unique | scalar |
    ///
    /// Columns listed in the response exclusions never reach the response shape.
    /// Field names are not yet made unique here; [`ArtifactPlanner::fields`] does that.
    pub fn field_for(&self, resolved: &ResolvedTable, column: &Column, kind: ArtifactKind) -> Result<Option<FieldPlan>> {
        let table = &resolved.table;
        let class = self.classify(resolved, column)?;
        let unique = table.single_column_uniques().contains(&column.name.as_str());
        let scalar = map_catalog_type(&column.data_type);

        let role = match (&class, kind) {
            (ColumnClass::Identity, ArtifactKind::Request | ArtifactKind::Repository | ArtifactKind::Service) => {
                return Ok(None);
            }
            (ColumnClass::ReadOnly, ArtifactKind::Request | ArtifactKind::Service) => return Ok(None),
            (ColumnClass::Audit(_), ArtifactKind::Request) => return Ok(None),
            (_, ArtifactKind::Repository) if !unique => return Ok(None),
            (_, ArtifactKind::Response) if self.conventions.is_response_excluded(&column.name) => return Ok(None),

            (ColumnClass::Identity, _) => FieldRole::Identity { auto_generated: is_generated(table, column) },
            (ColumnClass::Relationship(target), ArtifactKind::Entity | ArtifactKind::Service) => {
                FieldRole::Relationship {
                    target_table: target.table.name.clone(),
                    join_column: column.name.clone(),
                }
            }
            (ColumnClass::Relationship(target), _) => FieldRole::RelationshipId {
                target_table: target.table.name.clone(),
                target_class: target.class_name.clone(),
            },
            (ColumnClass::Audit(_), ArtifactKind::Repository) => FieldRole::Scalar,
            (ColumnClass::Audit(audit), _) => FieldRole::Audit { audit: *audit },
            (ColumnClass::ReadOnly | ColumnClass::Scalar, _) => FieldRole::Scalar,
        };

        let (name, field_type) = match (&class, &role) {
            (ColumnClass::Relationship(target), FieldRole::Relationship { .. }) => (
                self.relationship_name(column),
                FieldType::Entity { class_name: target.class_name.clone() },
            ),
            (ColumnClass::Relationship(target), _) => (
                format!("{}Id", self.relationship_name(column)),
                FieldType::Scalar { scalar: self.identifier_type(target).unwrap_or(scalar) },
            ),
            _ => (to_camel_case(&column.name), FieldType::Scalar { scalar }),
        };

        let validations = match kind {
            ArtifactKind::Entity => entity_validations(column, &role),
            ArtifactKind::Request => request_validations(column, &field_type),
            _ => Vec::new(),
        };

        let entity_column = kind == ArtifactKind::Entity && matches!(field_type, FieldType::Scalar { .. });
        let default_value = column
            .default_value
            .as_deref()
            .filter(|_| entity_column && !is_generated(table, column))
            .map(format_default_value);

        Ok(Some(FieldPlan {
            name,
            column: column.name.clone(),
            role,
            field_type,
            nullable: column.nullable,
            unique,
            validations,
            length: column.max_length.filter(|_| entity_column && column.is_bounded_text()),
            precision: column.precision.filter(|_| entity_column && scalar == TargetType::Decimal),
            scale: column.scale.filter(|_| entity_column && scalar == TargetType::Decimal),
            default_value,
        }))
    }

    /// The object field name of a relationship: the column without its identifier suffix.
    fn relationship_name(&self, column: &Column) -> String {
        to_camel_case(strip_id_suffix(&column.name, &self.conventions.id_suffixes))
    }

    /// Collision-free field names for every column of the table, keyed by column.
    ///
    /// Names are settled once on the entity, which carries every column, and shared by all
    /// artifact kinds.
    fn column_names(&self, resolved: &ResolvedTable) -> Result<HashMap<String, String>> {
        let mut seen = HashSet::new();
        let mut names = HashMap::new();
        for column in &resolved.table.columns {
            if let Some(field) = self.field_for(resolved, column, ArtifactKind::Entity)? {
                names.insert(column.name.clone(), unique_field_name(&mut seen, &field.name));
            }
        }
        Ok(names)
    }

    /// Plans every column for `kind`, in column order, with collision-free names.
    ///
    /// A field takes the entity's name for its column; a relationship held by identifier
    /// appends `Id` to it.
    pub fn fields(&self, resolved: &ResolvedTable, kind: ArtifactKind) -> Result<Vec<FieldPlan>> {
        let column_names = self.column_names(resolved)?;
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for column in &resolved.table.columns {
            if let Some(mut field) = self.field_for(resolved, column, kind)? {
                if let Some(entity_name) = column_names.get(&column.name) {
                    field.name = match field.role {
                        FieldRole::RelationshipId { .. } => format!("{entity_name}Id"),
                        _ => entity_name.clone(),
                    };
                }
                field.name = unique_field_name(&mut seen, &field.name);
                fields.push(field);
            }
        }
        Ok(fields)
    }

    // ------------------------------------------------------------------------
    // Artifact Plans
    // ------------------------------------------------------------------------

    fn entity_plan(&self, resolved: &ResolvedTable, names: &ArtifactNames, identifier: &IdentifierPlan) -> Result<EntityPlan> {
        let table = &resolved.table;
        let fields = self.fields(resolved, ArtifactKind::Entity)?;

        let generated_value = identifier
            .column
            .as_deref()
            .filter(|_| !identifier.composite)
            .and_then(|name| table.column(name))
            .filter(|column| is_generated(table, column))
            .map(|column| sequence_identity(table, column));

        Ok(EntityPlan {
            class_name: names.entity.clone(),
            schema: table.schema.clone(),
            table: table.name.clone(),
            imports: Imports::from_fields(&fields),
            fields,
            generated_value,
        })
    }

    fn dto_plan(&self, resolved: &ResolvedTable, class_name: &str, kind: ArtifactKind) -> Result<DtoPlan> {
        let fields = self.fields(resolved, kind)?;
        Ok(DtoPlan { class_name: class_name.to_string(), imports: Imports::from_fields(&fields), fields })
    }

    fn repository_plan(
        &self,
        resolved: &ResolvedTable,
        names: &ArtifactNames,
        identifier: &IdentifierPlan,
    ) -> Result<RepositoryPlan> {
        let fields = self.fields(resolved, ArtifactKind::Repository)?;
        let mut imports = Imports::from_fields(&fields);
        imports.add_type(identifier.id_type);
        imports.classes.insert(names.entity.clone());

        let exists_checks = fields
            .into_iter()
            .map(|field| ExistsCheck {
                method: format!("existsBy{}", capitalize(&field.name)),
                field: field.name,
                column: field.column,
                field_type: field.field_type,
            })
            .collect();

        Ok(RepositoryPlan {
            class_name: names.repository.clone(),
            entity: names.entity.clone(),
            id_type: identifier.id_type,
            exists_checks,
            imports,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn service_plan(
        &self,
        resolved: &ResolvedTable,
        names: &ArtifactNames,
        identifier: &IdentifierPlan,
        entity: &EntityPlan,
        request: &DtoPlan,
        response: &DtoPlan,
        repository: &RepositoryPlan,
    ) -> Result<ServicePlan> {
        let entity_field = |column: &str| entity.fields.iter().find(|f| f.column == column);

        let mut related_services: Vec<Dependency> = Vec::new();
        let mut lookups = Vec::new();
        let mut audit = Vec::new();
        let mut copied_fields = Vec::new();

        for field in self.fields(resolved, ArtifactKind::Service)? {
            let Some(on_entity) = entity_field(&field.column) else { continue };
            match &field.role {
                FieldRole::Relationship { target_table, .. } => {
                    let Some(request_field) = request.field_for_column(&field.column) else { continue };
                    let target = self.lookup(target_table)?;
                    let service = if target.class_name == names.entity {
                        None
                    } else {
                        let dependency = Dependency::new(&format!("{}Service", target.class_name));
                        if !related_services.contains(&dependency) {
                            related_services.push(dependency.clone());
                        }
                        Some(dependency)
                    };
                    lookups.push(RelationLookup {
                        column: field.column.clone(),
                        request_field: request_field.name.clone(),
                        entity_field: on_entity.name.clone(),
                        target_class: target.class_name.clone(),
                        id_type: request_field.field_type.scalar().unwrap_or(identifier.id_type),
                        nullable: field.nullable,
                        service,
                    });
                }
                FieldRole::Audit { audit: kind } => audit.push(AuditAssignment {
                    column: field.column.clone(),
                    entity_field: on_entity.name.clone(),
                    audit: *kind,
                    field_type: field.field_type.scalar().unwrap_or(TargetType::Timestamp),
                    on_create: true,
                    on_update: *kind == AuditKind::Updated,
                }),
                _ => {
                    if let Some(request_field) = request.field_for_column(&field.column) {
                        copied_fields.push(FieldCopy {
                            column: field.column.clone(),
                            request_field: request_field.name.clone(),
                            entity_field: on_entity.name.clone(),
                        });
                    }
                }
            }
        }

        let mut unique_checks = Vec::new();
        for check in &repository.exists_checks {
            let (Some(request_field), Some(on_entity)) =
                (request.field_for_column(&check.column), entity_field(&check.column))
            else {
                continue;
            };
            unique_checks.push(UniqueCheck {
                column: check.column.clone(),
                request_field: request_field.name.clone(),
                exists_method: check.method.clone(),
                current_value: self.value_source(on_entity)?,
                skip_when_unchanged: true,
                null_exempt: true,
            });
        }

        let mut response_mappings = Vec::new();
        for field in &response.fields {
            let Some(on_entity) = entity_field(&field.column) else { continue };
            response_mappings.push(ResponseMapping {
                column: field.column.clone(),
                response_field: field.name.clone(),
                source: self.value_source(on_entity)?,
            });
        }

        let mut imports = Imports::default();
        imports.add_type(identifier.id_type);
        for assignment in &audit {
            imports.add_type(assignment.field_type);
        }
        imports.classes.extend([
            names.entity.clone(),
            names.request.clone(),
            names.response.clone(),
            names.repository.clone(),
        ]);
        for lookup in &lookups {
            imports.classes.insert(lookup.target_class.clone());
        }
        imports.classes.extend(related_services.iter().map(|d| d.class_name.clone()));

        Ok(ServicePlan {
            class_name: names.service.clone(),
            entity: names.entity.clone(),
            request: names.request.clone(),
            response: names.response.clone(),
            id_type: identifier.id_type,
            repository: Dependency::new(&names.repository),
            related_services,
            lookups,
            unique_checks,
            audit,
            copied_fields,
            response_mappings,
            imports,
        })
    }

    /// How the stored value behind an entity field is read.
    fn value_source(&self, entity_field: &FieldPlan) -> Result<ValueSource> {
        match &entity_field.role {
            FieldRole::Relationship { target_table, .. } => {
                let target = self.lookup(target_table)?;
                Ok(ValueSource::RelatedId {
                    entity_field: entity_field.name.clone(),
                    related_id_field: self.identifier(target)?.field_name,
                })
            }
            _ => Ok(ValueSource::Direct { entity_field: entity_field.name.clone() }),
        }
    }
}

fn entity_validations(column: &Column, role: &FieldRole) -> Vec<Validation> {
    let mut validations = Vec::new();
    if matches!(role, FieldRole::Relationship { .. }) {
        if !column.nullable {
            validations.push(Validation::NotNull);
        }
        return validations;
    }
    if let Some(length) = column.max_length.filter(|_| column.is_bounded_text()) {
        validations.push(Validation::MaxLength(length));
    }
    let generated_key = matches!(role, FieldRole::Identity { auto_generated: true });
    if !column.nullable && !generated_key {
        validations.push(Validation::NotNull);
    }
    validations
}

fn request_validations(column: &Column, field_type: &FieldType) -> Vec<Validation> {
    let mut validations = Vec::new();
    let text = field_type.scalar().is_some_and(TargetType::is_text);
    if text {
        if let Some(length) = column.max_length {
            validations.push(Validation::MaxLength(length));
        }
    }
    if !column.nullable {
        validations.push(if text { Validation::NotBlank } else { Validation::NotNull });
    }
    validations
}

/// Generator `<table>_<column>_gen` and the bound sequence, or `<schema>.<table>_<column>_seq`
/// when none is bound.
fn sequence_identity(table: &Table, column: &Column) -> GeneratedValuePlan {
    let sequence = match table.sequence_for(&column.name) {
        Some(binding) => binding.qualified_name(),
        None if table.schema.is_empty() => format!("{}_{}_seq", table.name, column.name),
        None => format!("{}.{}_{}_seq", table.schema, table.name, column.name),
    };
    GeneratedValuePlan {
        generator: format!("{}_{}_gen", table.name, column.name),
        sequence,
        allocation_size: 1,
    }
}

fn controller_plan(names: &ArtifactNames, identifier: &IdentifierPlan) -> ControllerPlan {
    let operation = |name: &str, method, path: &str, status, request_body, paged| OperationPlan {
        name: name.to_string(),
        method,
        path: path.to_string(),
        status,
        request_body,
        paged,
    };

    let mut imports = Imports::default();
    imports.add_type(identifier.id_type);
    imports.classes.extend([names.request.clone(), names.response.clone(), names.service.clone()]);

    ControllerPlan {
        class_name: names.controller.clone(),
        base_path: names.resource_path.clone(),
        service: Dependency::new(&names.service),
        request: names.request.clone(),
        response: names.response.clone(),
        id_type: identifier.id_type,
        default_sort: identifier.field_name.clone(),
        operations: vec![
            operation("find_all", HttpMethod::Get, "", 200, false, true),
            operation("find_by_id", HttpMethod::Get, "/{id}", 200, false, false),
            operation("create", HttpMethod::Post, "", 201, true, false),
            operation("update", HttpMethod::Put, "/{id}", 200, true, false),
            operation("delete", HttpMethod::Delete, "/{id}", 204, false, false),
        ],
        imports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colliding_names_get_a_ref_suffix_then_a_counter() {
        let mut seen = HashSet::new();
        assert_eq!(unique_field_name(&mut seen, "papelEmpresa"), "papelEmpresa");
        assert_eq!(unique_field_name(&mut seen, "papelEmpresa"), "papelEmpresaRef");
        assert_eq!(unique_field_name(&mut seen, "papelEmpresa"), "papelEmpresaRef2");
        assert_eq!(unique_field_name(&mut seen, "descricao"), "descricao");
    }

    #[test]
    fn defaults_lose_casts_and_gain_quotes() {
        assert_eq!(format_default_value("'CE'::character varying"), "'CE'");
        assert_eq!(format_default_value("'ativo'::text"), "'ativo'");
        assert_eq!(format_default_value("true"), "'true'");
        assert_eq!(format_default_value("0"), "'0'");
    }

    #[test]
    fn request_text_fields_are_not_blank() {
        let column = Column::new("descricao", "character varying").max_length(100).not_null();
        let validations = request_validations(&column, &FieldType::Scalar { scalar: TargetType::Text });
        assert_eq!(validations, vec![Validation::MaxLength(100), Validation::NotBlank]);

        let amount = Column::new("valor", "numeric").not_null();
        let validations = request_validations(&amount, &FieldType::Scalar { scalar: TargetType::Decimal });
        assert_eq!(validations, vec![Validation::NotNull]);
    }
}
