//! Print the object type and owner of the configured BalanceManager.
//!
//! Usage:
//!   cargo run --bin inspect_manager [-- --env-file path/to/.env]

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "inspect_manager", about = "Inspect the configured balance manager object")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    cli::run(&args.common, |bot| async move { ops::inspect_manager(&bot).await }).await
}
