use anyhow::Context;
use bookshelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings
            .database
            .redacted_url()
            .unwrap_or_else(|| "<unset>".to_string()),
        "bookshelf-app bootstrap starting"
    );

    bookshelf_app::app::serve(settings).await
}
