use std::path::PathBuf;

use anyhow::{Context, bail};
use bottle_gen::{
    ArtifactPlanner, CatalogReader, FixedPolicy, ForeignKeyPolicy, GeneratorConfig, JavaRenderer, MemoryCatalog,
    PolicyMode, PolicySource, Resolver, TablePlan, TableRef, config::DEFAULT_CONFIG_PATH, write_artifacts,
};
use clap::Parser;

use crate::prompt::{PromptPolicy, parse_selection};

mod catalog;
mod prompt;

/// Generates JPA entities, DTOs, repositories, services and controllers from a PostgreSQL
/// schema.
#[derive(Debug, Parser)]
#[command(name = "bottle-gen", version, about)]
struct Cli {
    /// Configuration file (created with --save-config).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Schema to generate from; every table of it in batch mode.
    #[arg(long)]
    schema: Option<String>,

    /// A table to generate, as schema.table. Repeatable.
    #[arg(long = "table", value_name = "SCHEMA.TABLE")]
    tables: Vec<TableRef>,

    /// Read the catalog from a JSON snapshot instead of a database.
    #[arg(long, value_name = "JSON")]
    snapshot: Option<PathBuf>,

    /// Capture --schema (default public) into a JSON snapshot and exit.
    #[arg(long, value_name = "JSON")]
    capture: Option<PathBuf>,

    /// Foreign key handling: relationship, column or ask.
    #[arg(long, value_name = "POLICY")]
    fk_policy: Option<PolicyMode>,

    /// Output root for generated sources.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Choose schema, tables, class names and key handling interactively.
    #[arg(long)]
    interactive: bool,

    /// Print the artifact plans as JSON instead of writing sources.
    #[arg(long)]
    plan_json: bool,

    /// Render everything but write nothing.
    #[arg(long)]
    dry_run: bool,

    /// Save the effective configuration to --config.
    #[arg(long)]
    save_config: bool,

    /// Connection URL, overriding the configured database.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GeneratorConfig::load(&cli.config)
        .with_context(|| format!("could not read {}", cli.config.display()))?
        .unwrap_or_default();
    if let Some(mode) = cli.fk_policy {
        config.foreign_key_policy = mode;
    }
    if let Some(output) = &cli.output {
        config.output_directory = output.display().to_string();
    }
    if cli.save_config {
        config.save(&cli.config)?;
    }

    let catalog = catalog::initialize(cli.snapshot.as_deref(), cli.database_url.as_deref(), &config).await?;

    if let Some(path) = &cli.capture {
        let schema = cli.schema.as_deref().unwrap_or("public");
        let snapshot = MemoryCatalog::capture(&*catalog, schema).await?;
        std::fs::write(path, snapshot.to_json_string()?)
            .with_context(|| format!("could not write {}", path.display()))?;
        println!("Captured {} tables of {schema} into {}", snapshot.len(), path.display());
        return Ok(());
    }

    let plans = if cli.interactive {
        let mut prompt = PromptPolicy::stdio();
        let selection = select_interactively(&*catalog, cli.schema.as_deref(), &mut prompt).await?;
        plan(&*catalog, &config, &selection, &mut prompt).await?
    } else {
        let selection = select_batch(&*catalog, &cli).await?;
        if config.foreign_key_policy == PolicyMode::Ask {
            log::info!("no terminal to ask in batch mode, foreign keys default to relationships");
        }
        let mut policy = FixedPolicy::new(ForeignKeyPolicy::Relationship);
        plan(&*catalog, &config, &selection, &mut policy).await?
    };

    if cli.plan_json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    let artifacts = JavaRenderer::from_config(&config).render_all(&plans);
    if cli.dry_run {
        for artifact in &artifacts {
            println!("would write {}", PathBuf::from(&config.output_directory).join(&artifact.relative_path).display());
        }
        return Ok(());
    }

    let written = write_artifacts(&config.output_directory, &artifacts)?;
    println!("Generated {} files for {} tables:", written.len(), plans.len());
    for path in &written {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Resolves and plans the selection, one resolver run per schema. Tables reached from more
/// than one schema are planned once.
async fn plan<P: PolicySource + ?Sized>(
    catalog: &dyn CatalogReader,
    config: &GeneratorConfig,
    selection: &[TableRef],
    policy: &mut P,
) -> anyhow::Result<Vec<TablePlan>> {
    let mut schemas: Vec<&str> = Vec::new();
    for table in selection {
        if !schemas.contains(&table.schema.as_str()) {
            schemas.push(&table.schema);
        }
    }

    let resolver = Resolver::new(catalog)
        .mode(config.foreign_key_policy)
        .automatic_singularization(config.use_automatic_singularization);

    let mut plans: Vec<TablePlan> = Vec::new();
    for schema in schemas {
        let tables: Vec<&str> =
            selection.iter().filter(|t| t.schema == schema).map(|t| t.table.as_str()).collect();
        let resolved = resolver.resolve(schema, &tables, &mut *policy).await?;
        for plan in ArtifactPlanner::new(&resolved, &config.conventions).plan_all()? {
            if !plans.iter().any(|p| p.schema == plan.schema && p.table == plan.table) {
                plans.push(plan);
            }
        }
    }
    Ok(plans)
}

async fn select_batch(catalog: &dyn CatalogReader, cli: &Cli) -> anyhow::Result<Vec<TableRef>> {
    if !cli.tables.is_empty() {
        return Ok(cli.tables.clone());
    }
    let Some(schema) = &cli.schema else {
        bail!("nothing to generate: pass --table schema.table, --schema <schema> or --interactive");
    };
    let tables = catalog.list_tables(schema).await?;
    if tables.is_empty() {
        bail!("schema {schema} has no tables");
    }
    Ok(tables.into_iter().map(|table| TableRef::new(schema.as_str(), table)).collect())
}

async fn select_interactively<R, W>(
    catalog: &dyn CatalogReader,
    schema: Option<&str>,
    prompt: &mut PromptPolicy<R, W>,
) -> anyhow::Result<Vec<TableRef>>
where
    R: std::io::BufRead,
    W: std::io::Write,
{
    let schema = match schema {
        Some(schema) => schema.to_string(),
        None => {
            let schemas = catalog.list_schemas().await?;
            prompt.say("Available schemas:")?;
            for (i, schema) in schemas.iter().enumerate() {
                prompt.say(&format!("  {}. {schema}", i + 1))?;
            }
            let answer = prompt.ask("Schema [public]:")?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=schemas.len()).contains(&n) => schemas[n - 1].clone(),
                _ if answer.is_empty() => "public".to_string(),
                _ => answer,
            }
        }
    };

    let tables = catalog.list_tables(&schema).await?;
    if tables.is_empty() {
        bail!("schema {schema} has no tables");
    }
    prompt.say(&format!("Tables in {schema}:"))?;
    for (i, table) in tables.iter().enumerate() {
        prompt.say(&format!("  {}. {table}", i + 1))?;
    }

    loop {
        let answer = prompt.ask("Select tables (all, or numbers separated by commas):")?;
        let selection = parse_selection(&answer, tables.len());
        for invalid in &selection.invalid {
            prompt.say(&format!("Ignoring invalid option '{invalid}'"))?;
        }
        if !selection.indices.is_empty() {
            return Ok(selection.indices.iter().map(|&i| TableRef::new(schema.as_str(), tables[i].as_str())).collect());
        }
        if answer.is_empty() {
            bail!("no tables selected");
        }
    }
}
