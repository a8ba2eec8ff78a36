//! Deposit `DEPOSIT_BASE` and/or `DEPOSIT_QUOTE` into the configured BalanceManager.
//!
//! Usage:
//!   cargo run --bin deposit [-- --env-file path/to/.env]

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "deposit", about = "Fund the configured balance manager")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    cli::run(&args.common, |bot| async move { ops::deposit(&bot).await }).await
}
