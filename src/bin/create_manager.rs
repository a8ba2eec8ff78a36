//! Create and share a new BalanceManager, then print its id.
//!
//! Copy the printed id into `BALANCE_MANAGER_ID`.
//!
//! Usage:
//!   cargo run --bin create_manager [-- --env-file path/to/.env]

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "create_manager", about = "Create and share a DeepBook balance manager")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    cli::run(&args.common, |bot| async move { ops::create_manager(&bot).await }).await
}
