mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tms_core::{
    load_config, load_config_from_env, validate_config, Config, InMemoryTicketStore,
    SqliteTicketStore, StoreBackend, TicketEngine, TicketStore,
};

use console::ConsolePresenter;

/// Config file read when `TMS_CONFIG` is not set
const DEFAULT_CONFIG_PATH: &str = "tms.toml";

fn main() {
    if let Err(e) = run() {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Logs go to stderr so they never interleave with the menu on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = resolve_config()?;
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        "Effective configuration: {}",
        serde_json::to_string(&config).unwrap_or_default()
    );

    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory ticket store");
            run_console(Arc::new(InMemoryTicketStore::new()));
        }
        StoreBackend::Sqlite => {
            info!("Using SQLite ticket store at {:?}", config.database.path);
            let store = Arc::new(
                SqliteTicketStore::new(&config.database.path)
                    .context("Failed to open ticket database")?,
            );
            run_console(Arc::clone(&store) as Arc<dyn TicketStore>);

            match Arc::try_unwrap(store) {
                Ok(store) => store
                    .disconnect()
                    .context("Failed to close ticket database")?,
                Err(_) => warn!("Ticket store still in use at shutdown; connection not closed"),
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load the config named by `TMS_CONFIG`, falling back to defaults plus
/// environment when the default file is absent.
fn resolve_config() -> Result<Config> {
    if let Ok(path) = std::env::var("TMS_CONFIG") {
        let path = PathBuf::from(path);
        info!("Loading configuration from {:?}", path);
        return load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
    } else {
        info!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
        load_config_from_env().context("Failed to load config from environment")
    }
}

fn run_console(store: Arc<dyn TicketStore>) {
    let engine = TicketEngine::new(store, ConsolePresenter::stdio());
    engine.run();
}
