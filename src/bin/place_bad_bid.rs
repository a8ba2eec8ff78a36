//! Place a bid far below the market: mid price (or best bid) × `BAD_BID_MULT`
//! (default 0.2), sized to `MAX_ORDER_USD`, fees paid in DEEP.
//!
//! Requires `ALLOW_TRADING=true`.
//!
//! Usage:
//!   cargo run --bin place_bad_bid [-- --env-file path/to/.env]

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "place_bad_bid", about = "Place a resting bid far below the market")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    cli::run(&args.common, |bot| async move { ops::place_bad_bid(&bot).await }).await
}
