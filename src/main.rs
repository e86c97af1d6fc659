// src/main.rs
use std::error::Error;
use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

mod app;
mod bnet;
mod cache;
mod cli;
mod config;
mod export;
mod model;
mod rank;
mod setup;
mod ui;

use cache::{CACHE_FILE_NAME, ItemCache};
use cli::Cli;
use config::{Config, beside_executable};
use model::Fetch;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load_or_create(&config_path)?;
    cli.apply_to(&mut config)?;

    let mut client = setup::run(&mut config, &config_path).await?;

    let cache_path = match &cli.cache {
        Some(path) => path.clone(),
        None => beside_executable(CACHE_FILE_NAME)?,
    };
    let mut cache = ItemCache::new(cache_path);
    cache.load()?;
    info!("{} cached items in {}", cache.len(), cache.path().display());

    let ranked = rank::rank_upgrades(&mut client, &mut cache, &config.stat_weights).await;
    // Keep every item fetched so far, even if the run failed
    cache.persist()?;

    let rows = match ranked? {
        Fetch::Data(rows) => rows,
        Fetch::Unavailable(reason) => {
            warn!("Nothing to rank");
            return Err(format!("Could not read the character's equipment: {}", reason).into());
        }
    };

    let output = cli.output.clone().unwrap_or_else(|| {
        export::output_file_name(&config.character, OffsetDateTime::now_utc().date())
    });
    export::write_rows(&output, &rows)?;
    info!("Wrote {} rows to {}", rows.len(), output.display());
    Ok(())
}

/// `RUST_LOG` wins when it parses, otherwise `--debug` picks the level.
fn log_filter(rust_log: Option<String>, debug: bool) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if debug { "warn,wnb=debug" } else { "warn,wnb=info" }))
}

/// Log to stderr, or append to `--log-file` when given.
fn init_tracing(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let filter = log_filter(std::env::var("RUST_LOG").ok(), cli.debug);

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let fmt_layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false);
            Registry::default().with(filter).with(fmt_layer).init();
        }
        None => {
            let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
            Registry::default().with(filter).with(fmt_layer).init();
        }
    }
    info!("Starting wnb");
    Ok(())
}
