//! Composition root: store selection, module registration and the server
//! lifecycle.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use libris_kernel::{
    settings::{DatabaseSettings, Settings, StoreBackend},
    InitCtx, ModuleRegistry,
};
use mongodb::Database;

use crate::modules::{
    self,
    books::{
        memory::InMemoryBookRepository,
        repository::{BookRepository, MongoBookRepository},
        seed::{seed_if_empty, SeedReport},
    },
};

/// The store client handed to every module, plus the database handle when
/// one backs it.
#[derive(Clone)]
pub struct Store {
    pub repo: Arc<dyn BookRepository>,
    database: Option<Database>,
}

impl Store {
    pub async fn open(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        match settings.backend {
            StoreBackend::Memory => {
                tracing::warn!("using in-memory book store; data is lost on exit");
                Ok(Self::in_memory())
            }
            StoreBackend::Mongodb => {
                let database = libris_db::connect(settings).await?;
                // Startup continues without a reachable server
                match libris_db::ping(&database).await {
                    Ok(()) => tracing::info!(database = database.name(), "connected to MongoDB"),
                    Err(err) => tracing::warn!(error = %format!("{err:#}"), "MongoDB is not reachable yet"),
                }

                Ok(Self {
                    repo: Arc::new(MongoBookRepository::new(&database)),
                    database: Some(database),
                })
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::with_repository(Arc::new(InMemoryBookRepository::new()))
    }

    pub fn with_repository(repo: Arc<dyn BookRepository>) -> Self {
        Self {
            repo,
            database: None,
        }
    }

    /// Create the indexes modules declare. Failures are logged, not returned.
    pub async fn apply_indexes(&self, registry: &ModuleRegistry) {
        let Some(database) = &self.database else {
            return;
        };

        let indexes = registry.collect_indexes();
        if let Err(err) = libris_db::apply_indexes(database, &indexes).await {
            tracing::warn!(error = %format!("{err:#}"), "could not apply indexes");
        }
    }
}

pub fn build_registry(repo: Arc<dyn BookRepository>) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, repo)?;
    Ok(registry)
}

/// Full HTTP surface over `repo`, without running module lifecycle hooks.
pub fn app_router(settings: &Settings, repo: Arc<dyn BookRepository>) -> anyhow::Result<Router> {
    let registry = build_registry(repo)?;
    Ok(libris_http::build_router(&registry, settings))
}

/// Run the API until a shutdown signal arrives.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "libris bootstrap starting"
    );

    let store = Store::open(&settings.database).await?;
    let registry = build_registry(store.repo.clone())?;
    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    store.apply_indexes(&registry).await;
    registry.start_modules(&ctx).await?;

    tracing::info!(modules = registry.module_count(), "libris bootstrap complete");

    let served = libris_http::start_server(&registry, settings).await;
    registry
        .stop_modules()
        .await
        .context("module shutdown failed")?;

    served
}

/// Insert the sample catalog when the configured store is empty.
pub async fn seed(settings: &Settings) -> anyhow::Result<SeedReport> {
    let store = Store::open(&settings.database).await?;
    seed_if_empty(store.repo.as_ref())
        .await
        .context("failed to seed sample books")
}
