//! # Java Renderer
//!
//! Turns [`TablePlan`]s into Spring/JPA source files. Rendering reads plans only: every class
//! name, field name and type printed here was decided by the planner, so the six files of a
//! table always agree with each other.

use std::{
    collections::BTreeSet,
    fmt::Write,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    Result,
    config::GeneratorConfig,
    naming::{capitalize, to_camel_case, to_pascal_case},
    planner::{
        AuditAssignment, FieldPlan, FieldRole, GeneratedValuePlan, HttpMethod, Imports, OperationPlan, TablePlan,
        Validation, ValueSource,
    },
    type_mapper::TargetType,
};

// ============================================================================
// Rendered Output
// ============================================================================

/// Which file of a table an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderedKind {
    Entity,
    Request,
    Response,
    Repository,
    Service,
    Controller,
}

impl RenderedKind {
    /// Sub-package under the base package.
    pub fn sub_package(self) -> &'static str {
        match self {
            RenderedKind::Entity => "entity",
            RenderedKind::Request => "dto.request",
            RenderedKind::Response => "dto.response",
            RenderedKind::Repository => "repository",
            RenderedKind::Service => "service",
            RenderedKind::Controller => "controller.v1",
        }
    }
}

/// One rendered source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedArtifact {
    pub kind: RenderedKind,
    pub class_name: String,
    pub package: String,
    /// Path below the output root (`com/example/entity/Perfil.java`).
    pub relative_path: PathBuf,
    pub source: String,
}

/// Rendering switches taken from the generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub base_package: String,
    pub jakarta: bool,
    pub lombok: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

impl RenderOptions {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self { base_package: config.base_package.clone(), jakarta: config.is_jakarta(), lombok: config.use_lombok }
    }
}

// ============================================================================
// Renderer
// ============================================================================

pub struct JavaRenderer {
    options: RenderOptions,
}

impl JavaRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(RenderOptions::from_config(config))
    }

    /// Renders the six artifacts of one table.
    pub fn render(&self, plan: &TablePlan) -> Vec<RenderedArtifact> {
        vec![
            self.artifact(RenderedKind::Entity, &plan.names.entity, self.entity(plan)),
            self.artifact(RenderedKind::Request, &plan.names.request, self.request(plan)),
            self.artifact(RenderedKind::Response, &plan.names.response, self.response(plan)),
            self.artifact(RenderedKind::Repository, &plan.names.repository, self.repository(plan)),
            self.artifact(RenderedKind::Service, &plan.names.service, self.service(plan)),
            self.artifact(RenderedKind::Controller, &plan.names.controller, self.controller(plan)),
        ]
    }

    pub fn render_all(&self, plans: &[TablePlan]) -> Vec<RenderedArtifact> {
        plans.iter().flat_map(|plan| self.render(plan)).collect()
    }

    fn package(&self, kind: RenderedKind) -> String {
        format!("{}.{}", self.options.base_package, kind.sub_package())
    }

    fn artifact(&self, kind: RenderedKind, class_name: &str, source: String) -> RenderedArtifact {
        let package = self.package(kind);
        let mut relative_path: PathBuf = package.split('.').collect();
        relative_path.push(format!("{class_name}.java"));
        RenderedArtifact { kind, class_name: class_name.to_string(), package, relative_path, source }
    }

    fn persistence(&self) -> &'static str {
        if self.options.jakarta { "jakarta.persistence" } else { "javax.persistence" }
    }

    fn validation(&self) -> &'static str {
        if self.options.jakarta { "jakarta.validation" } else { "javax.validation" }
    }

    /// Imports for the generated classes in `imports`, skipping those in `own` package.
    fn class_imports(&self, plan: &TablePlan, own: RenderedKind, imports: &Imports) -> BTreeSet<String> {
        let names = &plan.names;
        imports
            .classes
            .iter()
            .filter_map(|class| {
                let kind = if *class == names.request {
                    RenderedKind::Request
                } else if *class == names.response {
                    RenderedKind::Response
                } else if *class == names.repository {
                    RenderedKind::Repository
                } else if *class == names.service
                    || plan.service.related_services.iter().any(|d| d.class_name == *class)
                {
                    RenderedKind::Service
                } else {
                    RenderedKind::Entity
                };
                (kind != own).then(|| format!("{}.{class}", self.package(kind)))
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Entity
    // ------------------------------------------------------------------------

    fn entity(&self, plan: &TablePlan) -> String {
        let entity = &plan.entity;
        let jpa = self.persistence();
        let mut imports: BTreeSet<String> =
            ["Column", "Entity", "Id", "Table"].iter().map(|n| format!("{jpa}.{n}")).collect();
        imports.extend(entity.imports.types.iter().cloned());
        imports.extend(self.class_imports(plan, RenderedKind::Entity, &entity.imports));

        let mut body = String::new();
        self.lombok_annotations(&mut body, &mut imports);
        let _ = writeln!(body, "@Entity");
        if entity.schema.is_empty() {
            let _ = writeln!(body, "@Table(name = \"{}\")", entity.table);
        } else {
            let _ = writeln!(body, "@Table(name = \"{}\", schema = \"{}\")", entity.table, entity.schema);
        }
        let _ = writeln!(body, "public class {} {{", entity.class_name);

        for field in &entity.fields {
            let _ = writeln!(body);
            match &field.role {
                FieldRole::Relationship { join_column, .. } => {
                    imports.extend(["FetchType", "JoinColumn", "ManyToOne"].iter().map(|n| format!("{jpa}.{n}")));
                    let optional = if field.nullable { "" } else { ", optional = false" };
                    let _ = writeln!(body, "    @ManyToOne(fetch = FetchType.LAZY{optional})");
                    let nullable = if field.nullable { "" } else { ", nullable = false" };
                    let _ = writeln!(body, "    @JoinColumn(name = \"{join_column}\"{nullable})");
                }
                role => {
                    if let FieldRole::Identity { .. } = role {
                        let _ = writeln!(body, "    @Id");
                        if let Some(generated) = &entity.generated_value {
                            imports.extend(
                                ["GeneratedValue", "GenerationType", "SequenceGenerator"]
                                    .iter()
                                    .map(|n| format!("{jpa}.{n}")),
                            );
                            write_sequence_generator(&mut body, generated);
                        }
                    }
                    self.entity_validations(&mut body, &mut imports, field);
                    if let Some(default) = &field.default_value {
                        imports.insert("org.hibernate.annotations.ColumnDefault".to_string());
                        let _ = writeln!(body, "    @ColumnDefault(\"{}\")", escape(default));
                    }
                    let _ = writeln!(body, "    @Column({})", column_attributes(field));
                }
            }
            let _ = writeln!(body, "    private {} {};", field.type_name(), field.name);
        }

        self.accessors(&mut body, &entity.fields);
        let _ = writeln!(body, "}}");
        assemble(&self.package(RenderedKind::Entity), &imports, &body)
    }

    fn entity_validations(&self, body: &mut String, imports: &mut BTreeSet<String>, field: &FieldPlan) {
        let constraints = format!("{}.constraints", self.validation());
        for validation in &field.validations {
            match validation {
                Validation::MaxLength(max) => {
                    imports.insert(format!("{constraints}.Size"));
                    let _ = writeln!(body, "    @Size(max = {max})");
                }
                Validation::NotNull => {
                    imports.insert(format!("{constraints}.NotNull"));
                    let _ = writeln!(body, "    @NotNull");
                }
                Validation::NotBlank => {
                    imports.insert(format!("{constraints}.NotBlank"));
                    let _ = writeln!(body, "    @NotBlank");
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Request / Response
    // ------------------------------------------------------------------------

    fn request(&self, plan: &TablePlan) -> String {
        let request = &plan.request;
        let constraints = format!("{}.constraints", self.validation());
        let mut imports: BTreeSet<String> = request.imports.types.iter().cloned().collect();

        let mut body = String::new();
        self.lombok_annotations(&mut body, &mut imports);
        let _ = writeln!(body, "public class {} {{", request.class_name);
        for field in &request.fields {
            let _ = writeln!(body);
            let label = to_pascal_case(&field.column);
            for validation in &field.validations {
                match validation {
                    Validation::MaxLength(max) => {
                        imports.insert(format!("{constraints}.Size"));
                        let _ = writeln!(
                            body,
                            "    @Size(max = {max}, message = \"{label} must have at most {max} characters\")"
                        );
                    }
                    Validation::NotBlank => {
                        imports.insert(format!("{constraints}.NotBlank"));
                        let _ = writeln!(body, "    @NotBlank(message = \"{label} is required\")");
                    }
                    Validation::NotNull => {
                        imports.insert(format!("{constraints}.NotNull"));
                        let _ = writeln!(body, "    @NotNull(message = \"{label} is required\")");
                    }
                }
            }
            let _ = writeln!(body, "    private {} {};", field.type_name(), field.name);
        }
        self.accessors(&mut body, &request.fields);
        let _ = writeln!(body, "}}");
        assemble(&self.package(RenderedKind::Request), &imports, &body)
    }

    fn response(&self, plan: &TablePlan) -> String {
        let response = &plan.response;
        let mut imports: BTreeSet<String> = response.imports.types.iter().cloned().collect();

        let mut body = String::new();
        self.lombok_annotations(&mut body, &mut imports);
        let _ = writeln!(body, "public class {} {{", response.class_name);
        for field in &response.fields {
            let _ = writeln!(body);
            let _ = writeln!(body, "    private {} {};", field.type_name(), field.name);
        }
        self.accessors(&mut body, &response.fields);
        let _ = writeln!(body, "}}");
        assemble(&self.package(RenderedKind::Response), &imports, &body)
    }

    // ------------------------------------------------------------------------
    // Repository
    // ------------------------------------------------------------------------

    fn repository(&self, plan: &TablePlan) -> String {
        let repository = &plan.repository;
        let mut imports: BTreeSet<String> = repository.imports.types.iter().cloned().collect();
        imports.extend(self.class_imports(plan, RenderedKind::Repository, &repository.imports));
        imports.insert("org.springframework.data.jpa.repository.JpaRepository".to_string());
        imports.insert("org.springframework.stereotype.Repository".to_string());

        let mut body = String::new();
        let _ = writeln!(body, "@Repository");
        let _ = writeln!(
            body,
            "public interface {} extends JpaRepository<{}, {}> {{",
            repository.class_name,
            repository.entity,
            repository.id_type.simple_name()
        );
        for check in &repository.exists_checks {
            let _ = writeln!(body);
            let _ = writeln!(body, "    boolean {}({} {});", check.method, check.field_type.simple_name(), check.field);
        }
        let _ = writeln!(body, "}}");
        assemble(&self.package(RenderedKind::Repository), &imports, &body)
    }

    // ------------------------------------------------------------------------
    // Service
    // ------------------------------------------------------------------------

    fn service(&self, plan: &TablePlan) -> String {
        let service = &plan.service;
        let names = &plan.names;
        let var = &names.variable;
        let id = service.id_type.simple_name();
        let repo = &service.repository.variable;

        let mut imports: BTreeSet<String> = service.imports.types.iter().cloned().collect();
        imports.extend(self.class_imports(plan, RenderedKind::Service, &service.imports));
        imports.extend(
            [
                "org.springframework.data.domain.Page",
                "org.springframework.data.domain.Pageable",
                "org.springframework.http.HttpStatus",
                "org.springframework.stereotype.Service",
                "org.springframework.transaction.annotation.Transactional",
                "org.springframework.web.server.ResponseStatusException",
            ]
            .iter()
            .map(|s| s.to_string()),
        );

        let mut dependencies = vec![&service.repository];
        dependencies.extend(service.related_services.iter());

        let mut body = String::new();
        let _ = writeln!(body, "@Service");
        let _ = writeln!(body, "public class {} {{", service.class_name);
        let _ = writeln!(body);
        for dependency in &dependencies {
            let _ = writeln!(body, "    private final {} {};", dependency.class_name, dependency.variable);
        }
        let _ = writeln!(body);
        let parameters: Vec<String> =
            dependencies.iter().map(|d| format!("{} {}", d.class_name, d.variable)).collect();
        let _ = writeln!(body, "    public {}({}) {{", service.class_name, parameters.join(", "));
        for dependency in &dependencies {
            let _ = writeln!(body, "        this.{0} = {0};", dependency.variable);
        }
        let _ = writeln!(body, "    }}");

        // Reads
        let _ = writeln!(body);
        let _ = writeln!(body, "    @Transactional(readOnly = true)");
        let _ = writeln!(body, "    public Page<{}> findAll(Pageable pageable) {{", service.response);
        let _ = writeln!(body, "        return {repo}.findAll(pageable).map(this::toResponse);");
        let _ = writeln!(body, "    }}");
        let _ = writeln!(body);
        let _ = writeln!(body, "    @Transactional(readOnly = true)");
        let _ = writeln!(body, "    public {} findById({id} id) {{", service.response);
        let _ = writeln!(body, "        return toResponse(findEntityById(id));");
        let _ = writeln!(body, "    }}");
        let _ = writeln!(body);
        let _ = writeln!(body, "    @Transactional(readOnly = true)");
        let _ = writeln!(body, "    public {} findEntityById({id} id) {{", service.entity);
        let _ = writeln!(body, "        return {repo}.findById(id)");
        let _ = writeln!(
            body,
            "                .orElseThrow(() -> new ResponseStatusException(HttpStatus.NOT_FOUND, \"{} not found with id: \" + id));",
            service.entity
        );
        let _ = writeln!(body, "    }}");

        // Writes
        let unique = !service.unique_checks.is_empty();
        let _ = writeln!(body);
        let _ = writeln!(body, "    @Transactional");
        let _ = writeln!(body, "    public {} create({} request) {{", service.response, service.request);
        if unique {
            let _ = writeln!(body, "        validateUniqueFields(request, null);");
        }
        let _ = writeln!(body, "        {0} {var} = new {0}();", service.entity);
        let _ = writeln!(body, "        applyRequest({var}, request);");
        write_audit(&mut body, var, service.audit.iter().filter(|a| a.on_create));
        let _ = writeln!(body, "        return toResponse({repo}.save({var}));");
        let _ = writeln!(body, "    }}");
        let _ = writeln!(body);
        let _ = writeln!(body, "    @Transactional");
        let _ = writeln!(body, "    public {} update({id} id, {} request) {{", service.response, service.request);
        let _ = writeln!(body, "        {} {var} = findEntityById(id);", service.entity);
        if unique {
            let _ = writeln!(body, "        validateUniqueFields(request, {var});");
        }
        let _ = writeln!(body, "        applyRequest({var}, request);");
        write_audit(&mut body, var, service.audit.iter().filter(|a| a.on_update));
        let _ = writeln!(body, "        return toResponse({repo}.save({var}));");
        let _ = writeln!(body, "    }}");
        let _ = writeln!(body);
        let _ = writeln!(body, "    @Transactional");
        let _ = writeln!(body, "    public void delete({id} id) {{");
        let _ = writeln!(body, "        if (!{repo}.existsById(id)) {{");
        let _ = writeln!(
            body,
            "            throw new ResponseStatusException(HttpStatus.NOT_FOUND, \"{} not found with id: \" + id);",
            service.entity
        );
        let _ = writeln!(body, "        }}");
        let _ = writeln!(body, "        {repo}.deleteById(id);");
        let _ = writeln!(body, "    }}");

        // Helpers
        if unique {
            imports.insert("java.util.Objects".to_string());
            let _ = writeln!(body);
            let _ = writeln!(
                body,
                "    private void validateUniqueFields({} request, {} current) {{",
                service.request, service.entity
            );
            for check in &service.unique_checks {
                let getter = format!("request.{}()", getter(&check.request_field));
                let current = read_value("current", &check.current_value);
                let _ = writeln!(body, "        if ({getter} != null");
                let _ = writeln!(body, "                && (current == null || !Objects.equals({getter}, {current}))");
                let _ = writeln!(body, "                && {repo}.{}({getter})) {{", check.exists_method);
                let _ = writeln!(
                    body,
                    "            throw new ResponseStatusException(HttpStatus.CONFLICT, \"{} already registered: \" + {getter});",
                    to_pascal_case(&check.column)
                );
                let _ = writeln!(body, "        }}");
            }
            let _ = writeln!(body, "    }}");
        }

        let _ = writeln!(body);
        let _ = writeln!(body, "    private void applyRequest({} {var}, {} request) {{", service.entity, service.request);
        for copy in &service.copied_fields {
            let _ = writeln!(body, "        {var}.{}(request.{}());", setter(&copy.entity_field), getter(&copy.request_field));
        }
        for lookup in &service.lookups {
            let finder = match &lookup.service {
                Some(dependency) => format!("{}.findEntityById", dependency.variable),
                None => "findEntityById".to_string(),
            };
            let value = format!("request.{}()", getter(&lookup.request_field));
            let related = if lookup.nullable {
                format!("{value} != null ? {finder}({value}) : null")
            } else {
                format!("{finder}({value})")
            };
            let _ = writeln!(body, "        {var}.{}({related});", setter(&lookup.entity_field));
        }
        let _ = writeln!(body, "    }}");

        let _ = writeln!(body);
        let _ = writeln!(body, "    private {} toResponse({} {var}) {{", service.response, service.entity);
        let _ = writeln!(body, "        {0} response = new {0}();", service.response);
        for mapping in &service.response_mappings {
            let _ =
                writeln!(body, "        response.{}({});", setter(&mapping.response_field), read_value(var, &mapping.source));
        }
        let _ = writeln!(body, "        return response;");
        let _ = writeln!(body, "    }}");
        let _ = writeln!(body, "}}");
        assemble(&self.package(RenderedKind::Service), &imports, &body)
    }

    // ------------------------------------------------------------------------
    // Controller
    // ------------------------------------------------------------------------

    fn controller(&self, plan: &TablePlan) -> String {
        let controller = &plan.controller;
        let service = &controller.service.variable;
        let id = controller.id_type.simple_name();

        let mut imports: BTreeSet<String> = controller.imports.types.iter().cloned().collect();
        imports.extend(self.class_imports(plan, RenderedKind::Controller, &controller.imports));
        imports.extend(
            [
                "org.springframework.data.domain.Page",
                "org.springframework.data.domain.Pageable",
                "org.springframework.data.web.PageableDefault",
                "org.springframework.http.HttpStatus",
                "org.springframework.http.MediaType",
                "org.springframework.http.ResponseEntity",
                "org.springframework.web.bind.annotation.PathVariable",
                "org.springframework.web.bind.annotation.RequestBody",
                "org.springframework.web.bind.annotation.RequestMapping",
                "org.springframework.web.bind.annotation.RestController",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        imports.insert(format!("{}.Valid", self.validation()));

        let mut body = String::new();
        let _ = writeln!(body, "@RestController");
        let _ = writeln!(
            body,
            "@RequestMapping(value = \"{}\", produces = MediaType.APPLICATION_JSON_VALUE)",
            controller.base_path
        );
        let _ = writeln!(body, "public class {} {{", controller.class_name);
        let _ = writeln!(body);
        let _ = writeln!(body, "    private final {} {service};", controller.service.class_name);
        let _ = writeln!(body);
        let _ = writeln!(body, "    public {}({} {service}) {{", controller.class_name, controller.service.class_name);
        let _ = writeln!(body, "        this.{service} = {service};");
        let _ = writeln!(body, "    }}");

        for operation in &controller.operations {
            let mapping = mapping_annotation(operation);
            imports.insert(format!("org.springframework.web.bind.annotation.{}", mapping_name(operation.method)));

            let mut parameters = Vec::new();
            if operation.paged {
                parameters.push(format!("@PageableDefault(size = 20, sort = \"{}\") Pageable pageable", controller.default_sort));
            }
            if operation.path.contains("{id}") {
                parameters.push(format!("@PathVariable {id} id"));
            }
            if operation.request_body {
                parameters.push(format!("@Valid @RequestBody {} request", controller.request));
            }

            let method = to_camel_case(&operation.name);
            let mut arguments: Vec<&str> = Vec::new();
            if operation.paged {
                arguments.push("pageable");
            }
            if operation.path.contains("{id}") {
                arguments.push("id");
            }
            if operation.request_body {
                arguments.push("request");
            }
            let call = format!("{service}.{method}({})", arguments.join(", "));

            let (returns, statement) = match operation.status {
                204 => ("Void".to_string(), format!("{call};\n        return ResponseEntity.noContent().build();")),
                201 => (
                    controller.response.clone(),
                    format!("return ResponseEntity.status(HttpStatus.CREATED).body({call});"),
                ),
                _ if operation.paged => (format!("Page<{}>", controller.response), format!("return ResponseEntity.ok({call});")),
                _ => (controller.response.clone(), format!("return ResponseEntity.ok({call});")),
            };

            let _ = writeln!(body);
            let _ = writeln!(body, "    {mapping}");
            let _ = writeln!(body, "    public ResponseEntity<{returns}> {method}({}) {{", parameters.join(", "));
            let _ = writeln!(body, "        {statement}");
            let _ = writeln!(body, "    }}");
        }
        let _ = writeln!(body, "}}");
        assemble(&self.package(RenderedKind::Controller), &imports, &body)
    }

    // ------------------------------------------------------------------------
    // Shared Pieces
    // ------------------------------------------------------------------------

    fn lombok_annotations(&self, body: &mut String, imports: &mut BTreeSet<String>) {
        if self.options.lombok {
            imports.insert("lombok.Getter".to_string());
            imports.insert("lombok.Setter".to_string());
            let _ = writeln!(body, "@Getter");
            let _ = writeln!(body, "@Setter");
        }
    }

    /// Plain getters and setters when Lombok is off.
    fn accessors(&self, body: &mut String, fields: &[FieldPlan]) {
        if self.options.lombok {
            return;
        }
        for field in fields {
            let ty = field.type_name();
            let name = &field.name;
            let _ = writeln!(body);
            let _ = writeln!(body, "    public {ty} {}() {{", getter(name));
            let _ = writeln!(body, "        return {name};");
            let _ = writeln!(body, "    }}");
            let _ = writeln!(body);
            let _ = writeln!(body, "    public void {}({ty} {name}) {{", setter(name));
            let _ = writeln!(body, "        this.{name} = {name};");
            let _ = writeln!(body, "    }}");
        }
    }
}

fn write_sequence_generator(body: &mut String, generated: &GeneratedValuePlan) {
    let _ = writeln!(
        body,
        "    @GeneratedValue(strategy = GenerationType.SEQUENCE, generator = \"{}\")",
        generated.generator
    );
    let _ = writeln!(
        body,
        "    @SequenceGenerator(name = \"{}\", sequenceName = \"{}\", allocationSize = {})",
        generated.generator, generated.sequence, generated.allocation_size
    );
}

fn write_audit<'p>(body: &mut String, var: &str, assignments: impl Iterator<Item = &'p AuditAssignment>) {
    for assignment in assignments {
        let now = match assignment.field_type {
            TargetType::Timestamp => "Instant.now()",
            TargetType::Date => "LocalDate.now()",
            TargetType::Time => "LocalTime.now()",
            other => {
                log::warn!(
                    "audit column {} has type {}, leaving it unassigned",
                    assignment.column,
                    other.simple_name()
                );
                continue;
            }
        };
        let _ = writeln!(body, "        {var}.{}({now});", setter(&assignment.entity_field));
    }
}

fn column_attributes(field: &FieldPlan) -> String {
    let mut attributes = format!("name = \"{}\"", field.column);
    if !field.nullable {
        attributes.push_str(", nullable = false");
    }
    if field.unique {
        attributes.push_str(", unique = true");
    }
    if let Some(length) = field.length {
        let _ = write!(attributes, ", length = {length}");
    }
    if let Some(precision) = field.precision {
        let _ = write!(attributes, ", precision = {precision}");
    }
    if let Some(scale) = field.scale {
        let _ = write!(attributes, ", scale = {scale}");
    }
    attributes
}

fn read_value(var: &str, source: &ValueSource) -> String {
    match source {
        ValueSource::Direct { entity_field } => format!("{var}.{}()", getter(entity_field)),
        ValueSource::RelatedId { entity_field, related_id_field } => {
            let related = format!("{var}.{}()", getter(entity_field));
            format!("{related} != null ? {related}.{}() : null", getter(related_id_field))
        }
    }
}

fn mapping_name(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "GetMapping",
        HttpMethod::Post => "PostMapping",
        HttpMethod::Put => "PutMapping",
        HttpMethod::Delete => "DeleteMapping",
    }
}

fn mapping_annotation(operation: &OperationPlan) -> String {
    let name = mapping_name(operation.method);
    if operation.path.is_empty() { format!("@{name}") } else { format!("@{name}(\"{}\")", operation.path) }
}

fn getter(field: &str) -> String {
    format!("get{}", capitalize(field))
}

fn setter(field: &str) -> String {
    format!("set{}", capitalize(field))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Package line, sorted imports and the class body.
fn assemble(package: &str, imports: &BTreeSet<String>, body: &str) -> String {
    let mut source = String::new();
    let _ = writeln!(source, "package {package};");
    let _ = writeln!(source);
    if !imports.is_empty() {
        for import in imports {
            let _ = writeln!(source, "import {import};");
        }
        let _ = writeln!(source);
    }
    source.push_str(body);
    source
}

// ============================================================================
// Writer
// ============================================================================

/// Writes artifacts below `root`, creating package directories. Returns the written paths in
/// artifact order.
pub fn write_artifacts(root: impl AsRef<Path>, artifacts: &[RenderedArtifact]) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = root.join(&artifact.relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &artifact.source)?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
