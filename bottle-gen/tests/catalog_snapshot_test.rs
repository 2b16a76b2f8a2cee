mod common;

use bottle_gen::{CatalogReader, Error, MemoryCatalog, TableRef};

#[tokio::test]
async fn test_listing() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = common::catalog();

    assert_eq!(catalog.list_schemas().await?, vec!["desmonte".to_string(), "public".to_string()]);
    assert_eq!(catalog.list_tables("public").await?, vec!["empresas".to_string(), "papel_empresas".to_string()]);
    assert!(catalog.list_tables("nope").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_describe() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = common::catalog();

    let perfis = catalog.describe_table("desmonte", "perfis").await?;
    assert_eq!(perfis, common::perfis());
    assert_eq!(perfis.columns[2].ordinal_position, 3);

    // Same name, wrong schema.
    let err = catalog.describe_table("public", "perfis").await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_snapshot_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = common::catalog();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("snapshot.json");

    std::fs::write(&path, catalog.to_json_string()?)?;
    let loaded = MemoryCatalog::from_path(&path)?;

    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.describe_table("public", "empresas").await?, common::empresas());
    Ok(())
}

#[tokio::test]
async fn test_snapshot_optional_fields() -> Result<(), Box<dyn std::error::Error>> {
    let json = r#"[
        {
            "schema": "public",
            "name": "cidades",
            "columns": [
                { "name": "id", "data_type": "bigint", "nullable": false },
                { "name": "nome", "data_type": "varchar", "max_length": 80 }
            ],
            "primary_key": { "columns": ["id"] },
            "foreign_keys": [ { "column": "uf_id", "referenced_table": "ufs" } ]
        }
    ]"#;

    let catalog = MemoryCatalog::from_json_str(json)?;
    let cidades = catalog.describe_table("public", "cidades").await?;

    assert!(cidades.columns[1].nullable);
    assert!(cidades.columns[1].is_bounded_text());
    assert_eq!(cidades.foreign_keys[0].referenced_column, "id");
    assert_eq!(cidades.foreign_keys[0].referenced_schema, "");
    assert!(cidades.unique_constraints.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_capture() -> Result<(), Box<dyn std::error::Error>> {
    let source = common::catalog();

    let captured = MemoryCatalog::capture(&source, "public").await?;

    assert_eq!(captured.len(), 2);
    assert_eq!(captured.describe_table("public", "papel_empresas").await?, common::papel_empresas());
    assert!(captured.describe_table("desmonte", "perfis").await.is_err());
    Ok(())
}

#[test]
fn test_invalid_snapshot_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, r#"{ "tables": [] }"#)?;

    assert!(matches!(MemoryCatalog::from_path(&path), Err(Error::Config { .. })));
    Ok(())
}

#[test]
fn test_table_references() -> Result<(), Box<dyn std::error::Error>> {
    let reference: TableRef = "desmonte.perfis".parse()?;
    assert_eq!(reference, TableRef::new("desmonte", "perfis"));
    assert_eq!(reference.to_string(), "desmonte.perfis");
    assert_eq!(" public.empresas ".parse::<TableRef>()?.table, "empresas");

    for invalid in ["perfis", ".perfis", "desmonte.", "a.b.c", ""] {
        assert!(
            matches!(invalid.parse::<TableRef>(), Err(Error::InvalidTableReference(_))),
            "{invalid} should be rejected"
        );
    }
    Ok(())
}
