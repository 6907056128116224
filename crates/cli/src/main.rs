use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalogue service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bootstrap the schema and serve HTTP until interrupted
    Serve,
    /// Create missing tables and exit
    Migrate,
    /// Print the resolved configuration (passwords redacted)
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            bookshelf_app::app::serve(settings).await
        }
        Command::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            let applied = bookshelf_app::app::bootstrap_schema(&settings).await?;
            tracing::info!(applied, "schema bootstrap complete");
            Ok(())
        }
        Command::Config => {
            print_config(&settings);
            Ok(())
        }
    }
}

fn print_config(settings: &Settings) {
    println!("environment        = {:?}", settings.environment);
    println!("server.bind        = {}", settings.server.bind_address());
    println!("server.prefix      = {:?}", settings.server.route_prefix);
    println!("server.timeout_ms  = {}", settings.server.request_timeout_ms);
    println!(
        "database.url       = {}",
        settings
            .database
            .redacted_url()
            .unwrap_or_else(|| "<unset>".to_string())
    );
    println!("database.max_conns = {}", settings.database.max_connections);
    println!("telemetry.filter   = {}", settings.telemetry.filter);
    println!("telemetry.format   = {:?}", settings.telemetry.log_format);
    println!("books.missing      = {:?}", settings.books.missing_fields);
}
