//! Place one resting bid at best bid × `BAD_BID_MULT` (default 0.5).
//!
//! Requires `ALLOW_TRADING=true`.
//!
//! Usage:
//!   cargo run --bin place_one_order [-- --env-file path/to/.env]

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "place_one_order", about = "Place one resting bid below the best bid")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    cli::run(&args.common, |bot| async move { ops::place_one_order(&bot).await }).await
}
