//! `libris` command-line entrypoint.
//!
//! - libris serve [--port <port>] [--memory]
//! - libris seed
//! - libris config

use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_kernel::settings::{Settings, StoreBackend};

/// Libris book catalog service
#[derive(Parser, Debug)]
#[command(name = "libris")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Listen port, overriding configuration
        #[arg(long)]
        port: Option<u16>,

        /// Serve from a process-local store instead of MongoDB
        #[arg(long)]
        memory: bool,
    },

    /// Insert the sample books when the catalog is empty
    Seed,

    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().context("failed to load Libris settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve {
        port: None,
        memory: false,
    }) {
        Command::Serve { port, memory } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if memory {
                settings.database.backend = StoreBackend::Memory;
            }
            libris_app::bootstrap::serve(&settings).await
        }
        Command::Seed => {
            let report = libris_app::bootstrap::seed(&settings).await?;
            tracing::info!(
                inserted = report.inserted,
                total_books = report.total_books,
                books_this_year = report.books_this_year,
                "seed complete"
            );
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
