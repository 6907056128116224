//! PostgreSQL connection pool factory and idempotent schema bootstrap.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::Migration;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("DB_URL environment variable not set")]
    MissingUrl,

    #[error("failed to connect to the database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("schema statement {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Create a PostgreSQL connection pool and verify it can hand out a connection.
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let url = settings.url().map_err(|_| DbError::MissingUrl)?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
        .connect(url)
        .await
        .map_err(DbError::Connect)?;

    tracing::info!(
        target: "bookshelf-db",
        max_connections = settings.max_connections,
        "database connection successful"
    );
    Ok(pool)
}

/// Execute every module's schema statements in the given order.
///
/// Statements are expected to be idempotent; they run on every startup and
/// no record of applied statements is kept.
pub async fn bootstrap(pool: &PgPool, migrations: &[(String, Migration)]) -> Result<(), DbError> {
    for (module, migration) in migrations {
        tracing::info!(
            target: "bookshelf-db",
            module = %module,
            id = migration.id,
            "applying schema statement"
        );

        sqlx::raw_sql(migration.up)
            .execute(pool)
            .await
            .map_err(|source| DbError::Migration {
                module: module.clone(),
                id: migration.id,
                source,
            })?;
    }

    Ok(())
}
