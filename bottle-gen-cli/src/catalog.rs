use std::path::Path;

use anyhow::Context;
use bottle_gen::{CatalogReader, Database, GeneratorConfig, MemoryCatalog};

/// Opens the catalog to generate from: a JSON snapshot when one is given, otherwise the
/// PostgreSQL database (`DATABASE_URL` wins over the configured connection).
pub async fn initialize(
    snapshot: Option<&Path>,
    database_url: Option<&str>,
    config: &GeneratorConfig,
) -> anyhow::Result<Box<dyn CatalogReader>> {
    if let Some(path) = snapshot {
        let catalog = MemoryCatalog::from_path(path)
            .with_context(|| format!("could not load catalog snapshot {}", path.display()))?;
        log::info!("using snapshot {} ({} tables)", path.display(), catalog.len());
        return Ok(Box::new(catalog));
    }

    let builder = Database::builder().max_connections(2);
    let db = match database_url {
        Some(url) => builder.connect(url).await,
        None => builder.connect_with(config.connect_options()).await,
    }
    .context("could not connect to the catalog database")?;
    Ok(Box::new(db))
}
