//! DreamWeaver application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Open the SQLite store and build the repositories
//! 3. Select the active backend
//! 4. Run the requested subcommand

mod cli;
mod commands;

use std::sync::Arc;

use clap::Parser;

use dreamweaver_core::config::DreamweaverConfig;
use dreamweaver_database::DatabaseContext;
use dreamweaver_storage::{Database, KvStore, Repositories};

use crate::cli::CliArgs;
use crate::commands::App;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts, so its own log lines are dropped.
    let config_file = args.resolve_config_path();
    let mut config = DreamweaverConfig::load_or_default(&config_file);

    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting DreamWeaver v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(path = %config_file.display(), "Configuration resolved");

    if let Some(provider) = &args.provider {
        config.database.provider = provider.clone();
    }

    // Storage.
    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let db_path = data_dir.join("dreamweaver.db");
    let db = Arc::new(Database::new(&db_path)?);
    let repos = Repositories::new(KvStore::sqlite(db), &config.storage.max_items);

    // Backend.
    let context = DatabaseContext::new(repos.clone());
    context.set_database(&config.database);

    let app = App {
        config,
        data_dir,
        repos,
        context,
    };
    app.run(args.command).await?;

    Ok(())
}
