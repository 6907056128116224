//! Startup and shutdown orchestration.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use sqlx::PgPool;

use bookshelf_kernel::settings::Settings;
use bookshelf_kernel::{InitCtx, ModuleRegistry};

use crate::modules;
use crate::modules::books::store::{BookStore, PgBookStore};

/// Registry with every project module wired to `store`
pub fn build_registry(store: Arc<dyn BookStore>, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, settings);
    registry
}

/// Full HTTP application over `store`, without touching the network
pub fn build_app(store: Arc<dyn BookStore>, settings: &Settings) -> Router {
    let registry = build_registry(store, settings);
    bookshelf_http::build_router(&registry, settings)
}

/// Connect, bootstrap the schema, serve until a shutdown signal, then stop modules.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let pool = connect(&settings).await?;
    let registry = build_registry(Arc::new(PgBookStore::new(pool.clone())), &settings);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    apply_schema(&pool, &registry).await?;
    registry.start_all(&ctx).await?;

    let router = bookshelf_http::build_router(&registry, &settings);
    let served = bookshelf_http::start_server(router, &settings).await;

    let stopped = registry.stop_all().await;
    pool.close().await;
    tracing::info!("bookshelf shutdown complete");

    served.and(stopped)
}

/// Create every module's tables and exit. Returns the number of statements applied.
pub async fn bootstrap_schema(settings: &Settings) -> anyhow::Result<usize> {
    let pool = connect(settings).await?;
    let registry = build_registry(Arc::new(PgBookStore::new(pool.clone())), settings);

    let applied = apply_schema(&pool, &registry).await?;
    pool.close().await;

    Ok(applied)
}

async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    bookshelf_db::create_pool(&settings.database)
        .await
        .context("failed to connect to the database")
}

async fn apply_schema(pool: &PgPool, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let migrations = registry.collect_migrations();
    bookshelf_db::bootstrap(pool, &migrations)
        .await
        .context("failed to bootstrap schema")?;
    Ok(migrations.len())
}
