//! List the operations the DeepBook facade exposes, highlighting the ones
//! that look like trading calls.
//!
//! Usage:
//!   cargo run --bin inspect_sdk

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "inspect_sdk", about = "List facade operations")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    cli::run(&args.common, |bot| async move { ops::inspect_sdk(&bot.facade()) }).await
}
