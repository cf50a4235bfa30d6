use bookstore_core::{ClientConfig, Repeat};
use clap::Parser;

/// A simple client for the bookstore example application.
///
/// Creates shelves and books, checks them, and deletes them again, either a
/// fixed number of times or until interrupted.
#[derive(Parser, Debug)]
#[command(name = "bookstore-client")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Deployed application host name. Prefix with https:// to use TLS
    #[arg(long)]
    pub host: String,

    /// An API key to use for requests
    #[arg(long = "api_key")]
    pub api_key: Option<String>,

    /// Log every request and response
    #[arg(long)]
    pub verbose: bool,

    /// Number of times to run the scenario. Runs indefinitely when omitted
    #[arg(long)]
    pub count: Option<u64>,

    /// Verify API responses
    #[arg(long, overrides_with = "no_verify")]
    pub verify: bool,

    /// Do not verify API responses
    #[arg(long = "no-verify", overrides_with = "verify")]
    pub no_verify: bool,

    /// Delete all existing shelves before the first run
    #[arg(long)]
    pub clear: bool,
}

impl Args {
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.host, self.api_key.clone(), self.verify, self.verbose)
    }

    pub fn repeat(&self) -> Repeat {
        Repeat::from(self.count)
    }
}
