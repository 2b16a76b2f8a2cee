//! # Bottle Gen
//!
//! A schema-driven source generator. Bottle Gen reads a relational catalog, follows foreign
//! keys to decide which tables have to be generated together, and plans a consistent set of
//! artifacts per table: a JPA entity, request and response shapes, a repository, a service and
//! a REST controller.
//!
//! ## Pipeline
//!
//! 1. A [`CatalogReader`] ([`Database`] for PostgreSQL, [`MemoryCatalog`] offline) describes
//!    tables as immutable [`Table`] snapshots.
//! 2. The [`Resolver`] expands the requested tables through their relationship keys and fixes
//!    one class name per table, producing a [`ResolvedGenerationSet`].
//! 3. The [`ArtifactPlanner`] turns each resolved table into a [`TablePlan`].
//! 4. The [`JavaRenderer`] prints the plans and [`write_artifacts`] stores them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bottle_gen::{
//!     ArtifactPlanner, Database, FixedPolicy, ForeignKeyPolicy, GeneratorConfig, JavaRenderer, Resolver,
//!     write_artifacts,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeneratorConfig::default();
//! let db = Database::builder().max_connections(2).connect_with(config.connect_options()).await?;
//!
//! let mut policy = FixedPolicy::new(ForeignKeyPolicy::Relationship);
//! let resolved = Resolver::new(&db).resolve("public", &["empresas"], &mut policy).await?;
//!
//! let plans = ArtifactPlanner::new(&resolved, &config.conventions).plan_all()?;
//! let artifacts = JavaRenderer::from_config(&config).render_all(&plans);
//! write_artifacts(&config.output_directory, &artifacts)?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod model;
pub mod naming;
pub mod planner;
pub mod policy;
pub mod render;
pub mod resolver;
pub mod type_mapper;

pub use catalog::{CatalogReader, MemoryCatalog, TableRef};
pub use config::{Conventions, GeneratorConfig};
pub use database::{Database, DatabaseBuilder};
pub use error::{Error, Result};
pub use model::{Column, ForeignKey, PrimaryKey, SequenceBinding, Table, UniqueConstraint};
pub use planner::{ArtifactKind, ArtifactPlanner, TablePlan};
pub use policy::{FixedPolicy, ForeignKeyPolicy, PolicyMode, PolicySource};
pub use render::{JavaRenderer, RenderedArtifact, write_artifacts};
pub use resolver::{ResolvedGenerationSet, Resolver};
pub use type_mapper::{TargetType, map_catalog_type};
