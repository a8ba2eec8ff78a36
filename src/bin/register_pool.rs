//! Register POOL_KEY for the configured BalanceManager (one-time per pool).
//!
//! Usage:
//!   cargo run --bin register_pool [-- --env-file path/to/.env]

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "register_pool", about = "Register the configured pool for the balance manager")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    cli::run(&args.common, |bot| async move { ops::register_pool(&bot).await }).await
}
