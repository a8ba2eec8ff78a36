//! Cancel `ORDER_IDS`, or every open order of the configured BalanceManager.
//!
//! Usage:
//!   cargo run --bin cancel_all [-- --env-file path/to/.env]

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cancel_all", about = "Cancel open orders of the configured balance manager")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    cli::run(&args.common, |bot| async move { ops::cancel_all(&bot).await }).await
}
