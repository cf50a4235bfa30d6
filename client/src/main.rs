use anyhow::Context;
use bookstore_client::Args;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.config();
    bookstore_client::init_logging(config.verbose());
    bookstore_client::run(config, args.clear, args.repeat()).context("bookstore scenario failed")
}
