//! Command-line driver for the bookstore scenario.
//!
//! Parses flags into a `ClientConfig`, installs a `tracing` subscriber, and
//! runs `bookstore_core::ScenarioRunner` over a `ureq` transport.

pub mod cli;
pub mod transport;

use bookstore_core::{ClientConfig, ClientError, Repeat, ScenarioRunner};
use tracing::info;

pub use cli::Args;
pub use transport::UreqTransport;

/// DEBUG with `--verbose` (every request and response), INFO otherwise.
/// Does nothing if a subscriber is already installed.
pub fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .try_init();
}

/// Optionally delete existing shelves, then run the scenario `repeat` times.
pub fn run(config: ClientConfig, clear: bool, repeat: Repeat) -> Result<(), ClientError> {
    info!(url = config.base_url(), verify = config.verify(), "connecting");
    let mut runner = ScenarioRunner::new(config, UreqTransport::new());
    if clear {
        runner.clear()?;
    }
    info!(?repeat, "starting scenario");
    runner.run_repeated(repeat)
}
