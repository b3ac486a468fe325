//! # smarthomed: smart home control hub
//!
//! Composition root that wires the registry to the console front end.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Install the `tracing` subscriber (stderr, so stdout stays for the console)
//! - Construct the `SmartHome` registry and seed it from configuration
//! - Attach the printing observer and start the trigger sweep
//! - Run the console session on stdin/stdout until `exit` or end of input
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

use std::sync::Arc;

use anyhow::Context;
use smarthome_adapter_console::PrintingObserver;
use smarthome_app::SmartHome;
use smarthomed::config::Config;
use smarthomed::seed;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let home = SmartHome::new(config.home_config());
    seed::apply(&home, &config).context("failed to seed registry")?;

    if config.console.echo_updates {
        home.subscribe(Arc::new(PrintingObserver::stdout()));
    }
    home.start();

    smarthome_adapter_console::run(&home, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("console session failed")?;

    Ok(())
}
