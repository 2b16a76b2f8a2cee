mod common;

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use bottle_gen::{
    CatalogReader, Column, Error, FixedPolicy, ForeignKey, ForeignKeyPolicy, MemoryCatalog, PolicyMode,
    PolicySource, Resolver, Table,
};

/// Wraps a memory catalog and counts `describe_table` calls per table.
struct CountingCatalog {
    inner: MemoryCatalog,
    described: Mutex<HashMap<String, usize>>,
}

impl CountingCatalog {
    fn new(inner: MemoryCatalog) -> Self {
        Self { inner, described: Mutex::new(HashMap::new()) }
    }

    fn count(&self, table: &str) -> usize {
        self.described.lock().unwrap().get(table).copied().unwrap_or(0)
    }
}

#[async_trait]
impl CatalogReader for CountingCatalog {
    async fn list_schemas(&self) -> bottle_gen::Result<Vec<String>> {
        self.inner.list_schemas().await
    }

    async fn list_tables(&self, schema: &str) -> bottle_gen::Result<Vec<String>> {
        self.inner.list_tables(schema).await
    }

    async fn describe_table(&self, schema: &str, table: &str) -> bottle_gen::Result<Table> {
        *self.described.lock().unwrap().entry(table.to_string()).or_default() += 1;
        self.inner.describe_table(schema, table).await
    }
}

/// Answers every key with the same decision and records what it was asked.
struct CountingPolicy {
    answer: ForeignKeyPolicy,
    asked: Vec<(String, String)>,
}

impl CountingPolicy {
    fn new(answer: ForeignKeyPolicy) -> Self {
        Self { answer, asked: Vec::new() }
    }
}

impl PolicySource for CountingPolicy {
    fn decide(&mut self, table: &Table, foreign_key: &ForeignKey) -> ForeignKeyPolicy {
        self.asked.push((table.name.clone(), foreign_key.column.clone()));
        self.answer
    }
}

/// Answers keys from a script, in the order they are asked.
struct ScriptedPolicy {
    answers: Vec<ForeignKeyPolicy>,
    asked: usize,
}

impl PolicySource for ScriptedPolicy {
    fn decide(&mut self, _table: &Table, _foreign_key: &ForeignKey) -> ForeignKeyPolicy {
        let answer = self.answers.get(self.asked).copied().unwrap_or(ForeignKeyPolicy::Column);
        self.asked += 1;
        answer
    }
}

fn linked(name: &str, references: &[&str]) -> Table {
    let mut table = Table::new("public", name).with_column(Column::new("id", "bigint").not_null());
    for target in references {
        let column = format!("{target}_id");
        table = table
            .with_column(Column::new(column.as_str(), "bigint"))
            .with_foreign_key(ForeignKey::new(column.as_str(), "public", *target, "id"));
    }
    table.with_primary_key(["id"])
}

#[tokio::test]
async fn test_table_without_foreign_keys() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CountingCatalog::new(common::catalog());
    let mut policy = CountingPolicy::new(ForeignKeyPolicy::Relationship);

    let resolved = Resolver::new(&catalog).resolve("desmonte", &["perfis"], &mut policy).await?;

    assert_eq!(resolved.table_names(), vec!["perfis"]);
    assert_eq!(resolved.class_name("perfis"), Some("Perfil"));
    assert!(policy.asked.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_relationship_pulls_in_the_referenced_table() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CountingCatalog::new(common::catalog());
    let mut policy = CountingPolicy::new(ForeignKeyPolicy::Relationship);

    let resolved = Resolver::new(&catalog).resolve("public", &["empresas"], &mut policy).await?;

    assert_eq!(resolved.table_names(), vec!["empresas", "papel_empresas"]);
    assert_eq!(resolved.class_name("empresas"), Some("Empresa"));
    assert_eq!(resolved.class_name("papel_empresas"), Some("PapelEmpresa"));
    assert_eq!(resolved.policy("empresas", "papel_empresa_id"), Some(ForeignKeyPolicy::Relationship));
    assert_eq!(policy.asked, vec![("empresas".to_string(), "papel_empresa_id".to_string())]);

    let empresas = resolved.get("empresas").ok_or("empresas missing")?;
    assert_eq!(
        empresas.relationship_for("papel_empresa_id").map(|fk| fk.referenced_table.as_str()),
        Some("papel_empresas")
    );
    Ok(())
}

#[tokio::test]
async fn test_column_policy_schedules_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CountingCatalog::new(common::catalog());
    let mut policy = CountingPolicy::new(ForeignKeyPolicy::Column);

    let resolved = Resolver::new(&catalog).resolve("public", &["empresas"], &mut policy).await?;

    assert_eq!(resolved.table_names(), vec!["empresas"]);
    assert_eq!(resolved.policy("empresas", "papel_empresa_id"), Some(ForeignKeyPolicy::Column));
    assert!(resolved.get("empresas").ok_or("empresas missing")?.relationship_for("papel_empresa_id").is_none());
    assert_eq!(catalog.count("papel_empresas"), 0);
    Ok(())
}

#[tokio::test]
async fn test_fixed_mode_never_asks() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CountingCatalog::new(common::catalog());

    let mut policy = CountingPolicy::new(ForeignKeyPolicy::Relationship);
    let resolved = Resolver::new(&catalog)
        .mode(PolicyMode::Column)
        .resolve("public", &["empresas"], &mut policy)
        .await?;
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved.policy("empresas", "papel_empresa_id"), Some(ForeignKeyPolicy::Column));
    assert!(policy.asked.is_empty());

    let mut policy = CountingPolicy::new(ForeignKeyPolicy::Column);
    let resolved = Resolver::new(&catalog)
        .mode(PolicyMode::Relationship)
        .resolve("public", &["empresas"], &mut policy)
        .await?;
    assert_eq!(resolved.table_names(), vec!["empresas", "papel_empresas"]);
    assert!(policy.asked.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_per_key_overrides() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = MemoryCatalog::new()
        .with_table(linked("pedidos", &["clientes", "vendedores"]))
        .with_table(linked("clientes", &[]))
        .with_table(linked("vendedores", &[]));
    let mut policy = FixedPolicy::new(ForeignKeyPolicy::Relationship).with_override(
        "pedidos",
        "vendedores_id",
        ForeignKeyPolicy::Column,
    );

    let resolved = Resolver::new(&catalog).resolve("public", &["pedidos"], &mut policy).await?;

    assert_eq!(resolved.table_names(), vec!["pedidos", "clientes"]);
    assert_eq!(resolved.policy("pedidos", "vendedores_id"), Some(ForeignKeyPolicy::Column));
    Ok(())
}

#[tokio::test]
async fn test_two_table_cycle_terminates() -> Result<(), Box<dyn std::error::Error>> {
    let catalog =
        CountingCatalog::new(MemoryCatalog::new().with_table(linked("a", &["b"])).with_table(linked("b", &["a"])));
    let mut policy = CountingPolicy::new(ForeignKeyPolicy::Relationship);

    let resolved = Resolver::new(&catalog).resolve("public", &["a"], &mut policy).await?;

    assert_eq!(resolved.table_names(), vec!["a", "b"]);
    assert_eq!(catalog.count("a"), 1);
    assert_eq!(catalog.count("b"), 1);
    assert_eq!(resolved.policy("b", "a_id"), Some(ForeignKeyPolicy::Relationship));
    Ok(())
}

#[tokio::test]
async fn test_three_table_cycle_terminates() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CountingCatalog::new(
        MemoryCatalog::new()
            .with_table(linked("a", &["b"]))
            .with_table(linked("b", &["c"]))
            .with_table(linked("c", &["a"])),
    );
    let mut policy = CountingPolicy::new(ForeignKeyPolicy::Relationship);

    let resolved = Resolver::new(&catalog).resolve("public", &["b"], &mut policy).await?;

    assert_eq!(resolved.table_names(), vec!["b", "c", "a"]);
    for table in ["a", "b", "c"] {
        assert_eq!(catalog.count(table), 1, "{table} described more than once");
    }
    assert_eq!(policy.asked.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_self_reference() -> Result<(), Box<dyn std::error::Error>> {
    let categorias = Table::new("public", "categorias")
        .with_column(Column::new("id", "bigint").not_null())
        .with_column(Column::new("categoria_pai_id", "bigint"))
        .with_primary_key(["id"])
        .with_foreign_key(ForeignKey::new("categoria_pai_id", "public", "categorias", "id"));
    let catalog = CountingCatalog::new(MemoryCatalog::new().with_table(categorias));
    let mut policy = CountingPolicy::new(ForeignKeyPolicy::Relationship);

    let resolved = Resolver::new(&catalog).resolve("public", &["categorias"], &mut policy).await?;

    assert_eq!(resolved.table_names(), vec!["categorias"]);
    assert_eq!(resolved.class_name("categorias"), Some("Categoria"));
    assert_eq!(resolved.policy("categorias", "categoria_pai_id"), Some(ForeignKeyPolicy::Relationship));
    assert_eq!(catalog.count("categorias"), 1);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_requests_are_described_once() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CountingCatalog::new(common::catalog());
    let mut policy = CountingPolicy::new(ForeignKeyPolicy::Relationship);

    let resolved = Resolver::new(&catalog)
        .resolve("public", &["papel_empresas", "empresas", "papel_empresas"], &mut policy)
        .await?;

    // The referenced table was already requested, so it keeps its requested position.
    assert_eq!(resolved.table_names(), vec!["papel_empresas", "empresas"]);
    assert_eq!(catalog.count("papel_empresas"), 1);
    Ok(())
}

#[tokio::test]
async fn test_discovery_order() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = MemoryCatalog::new()
        .with_table(linked("x", &["z"]))
        .with_table(linked("y", &[]))
        .with_table(linked("z", &["w"]))
        .with_table(linked("w", &[]));
    let mut policy = FixedPolicy::default();

    let resolved = Resolver::new(&catalog).resolve("public", &["x", "y"], &mut policy).await?;

    assert_eq!(resolved.table_names(), vec!["x", "y", "z", "w"]);
    Ok(())
}

#[tokio::test]
async fn test_missing_requested_table() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = common::catalog();
    let mut policy = FixedPolicy::default();

    let err = Resolver::new(&catalog).resolve("public", &["nope"], &mut policy).await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::TableNotFound { schema, table } => {
            assert_eq!(schema, "public");
            assert_eq!(table, "nope");
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_unresolvable_relationship_names_the_key() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = MemoryCatalog::new().with_table(common::empresas());
    let mut policy = FixedPolicy::default();

    let err = Resolver::new(&catalog).resolve("public", &["empresas"], &mut policy).await.unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("papel_empresa_id"));
    match err {
        Error::UnresolvableRelationship { table, column, target, source } => {
            assert_eq!(table, "empresas");
            assert_eq!(column, "papel_empresa_id");
            assert_eq!(target, "public.papel_empresas");
            assert!(matches!(*source, Error::TableNotFound { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The same key handled as a plain column resolves fine.
    let mut policy = FixedPolicy::new(ForeignKeyPolicy::Column);
    let resolved = Resolver::new(&catalog).resolve("public", &["empresas"], &mut policy).await?;
    assert_eq!(resolved.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_referenced_schema_is_used_for_lookup() -> Result<(), Box<dyn std::error::Error>> {
    let pessoas = Table::new("public", "pessoas")
        .with_column(Column::new("id", "bigint").not_null())
        .with_column(Column::new("cidade_id", "bigint"))
        .with_column(Column::new("perfil_id", "integer"))
        .with_primary_key(["id"])
        .with_foreign_key(ForeignKey::new("cidade_id", "cadastro", "cidades", "id"))
        .with_foreign_key(ForeignKey::new("perfil_id", "", "perfis", "id"));
    let cidades = Table::new("cadastro", "cidades")
        .with_column(Column::new("id", "bigint").not_null())
        .with_primary_key(["id"]);
    let perfis_here = Table::new("public", "perfis")
        .with_column(Column::new("id", "integer").not_null())
        .with_primary_key(["id"]);
    let catalog = MemoryCatalog::new().with_table(pessoas).with_table(cidades).with_table(perfis_here);
    let mut policy = FixedPolicy::default();

    let resolved = Resolver::new(&catalog).resolve("public", &["pessoas"], &mut policy).await?;

    assert_eq!(resolved.table_names(), vec!["pessoas", "cidades", "perfis"]);
    assert_eq!(resolved.table("cidades").map(|t| t.schema.as_str()), Some("cadastro"));
    // No referenced schema: looked up in the schema of the run.
    assert_eq!(resolved.table("perfis").map(|t| t.schema.as_str()), Some("public"));
    Ok(())
}

#[tokio::test]
async fn test_class_name_overrides() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = common::catalog();
    let mut policy = FixedPolicy::default().with_class_name("papel_empresas", "Papel").with_class_name("empresas", "  ");

    let resolved = Resolver::new(&catalog).resolve("public", &["empresas"], &mut policy).await?;

    assert_eq!(resolved.class_name("papel_empresas"), Some("Papel"));
    // Overrides are taken as given.
    assert_eq!(resolved.class_name("empresas"), Some("  "));
    assert_eq!(resolved.class_names().get("papel_empresas"), Some(&"Papel"));
    Ok(())
}

#[tokio::test]
async fn test_singularization_can_be_disabled() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = common::catalog();
    let mut policy = FixedPolicy::default();

    let resolved = Resolver::new(&catalog)
        .automatic_singularization(false)
        .resolve("public", &["empresas"], &mut policy)
        .await?;

    assert_eq!(resolved.class_name("empresas"), Some("Empresas"));
    assert_eq!(resolved.class_name("papel_empresas"), Some("PapelEmpresas"));
    Ok(())
}

#[tokio::test]
async fn test_empty_request_resolves_to_empty_set() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = common::catalog();
    let mut policy = FixedPolicy::default();

    let resolved = Resolver::new(&catalog).resolve::<&str, _>("public", &[], &mut policy).await?;

    assert!(resolved.is_empty());
    assert_eq!(resolved.iter().count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_second_key_on_a_column_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let contratos = Table::new("public", "contratos")
        .with_column(Column::new("id", "bigint").not_null())
        .with_column(Column::new("empresa_id", "bigint"))
        .with_primary_key(["id"])
        .with_foreign_key(ForeignKey::new("empresa_id", "public", "empresas", "id"))
        .with_foreign_key(ForeignKey::new("empresa_id", "public", "papel_empresas", "id"));
    let catalog = common::catalog().with_table(contratos);
    let mut policy = ScriptedPolicy { answers: vec![ForeignKeyPolicy::Column, ForeignKeyPolicy::Relationship], asked: 0 };

    let resolved = Resolver::new(&catalog)
        .mode(PolicyMode::Ask)
        .resolve("public", &["contratos"], &mut policy)
        .await?;

    assert_eq!(policy.asked, 1);
    assert_eq!(resolved.table_names(), vec!["contratos"]);
    assert_eq!(resolved.policy("contratos", "empresa_id"), Some(ForeignKeyPolicy::Column));

    let contratos = resolved.get("contratos").ok_or("contratos missing")?;
    assert!(contratos.relationship_for("empresa_id").is_none());
    Ok(())
}
