use anyhow::Context as _;
use clap::Parser;
use command::Cli;
use config::Config;
use lane_scout_db::{DbHandler, SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod command;
mod config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    setup_tracing_subscriber();

    info!("Loading configuration");
    let config = Config::load(cli.config.as_deref()).await?;

    info!("Setting up DB client");
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .context("Invalid database URL")?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;
    let db_handler = Arc::new(DbHandler::new(pool));
    db_handler
        .migrate()
        .await
        .context("Failed to run database migrations")?;

    command::execute(cli.command, config, db_handler).await
}

fn setup_tracing_subscriber() {
    let layer = fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_thread_ids(false)
        .with_target(false);
    tracing_subscriber::registry()
        .with(layer)
        .with(EnvFilter::from_default_env())
        .init();
}
