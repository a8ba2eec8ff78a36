//! Read-only level-2 snapshot of `POOL_KEY`.
//!
//! Usage:
//!   cargo run --bin l2_snapshot [-- --env-file path/to/.env]

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "l2_snapshot", about = "Print the level-2 book of the configured pool")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    cli::run(&args.common, |bot| async move { ops::l2_snapshot(&bot).await }).await
}
