use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during lifecycle hooks
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Idempotent schema statement contributed by a module.
///
/// `up` is executed on every startup, so it must be safe to re-run
/// (e.g. `CREATE TABLE IF NOT EXISTS`).
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A unit of the application: routes, schema, and lifecycle hooks.
///
/// At startup the registry drives every module through `init`, then runs
/// the collected `migrations` against the pool, then calls `start` before
/// the listener accepts traffic. `stop` runs after the server drains, in
/// reverse registration order.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// First hook; the pool exists but the schema may not yet
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Router mounted under `server.route_prefix`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` plus `components.schemas`); paths get the
    /// route prefix when merged into the served document
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Idempotent statements run by schema bootstrap after every `init`
    /// succeeded, ordered by module name then `Migration::id`
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Called once the schema is in place, before the listener binds
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after graceful shutdown has drained in-flight requests
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
