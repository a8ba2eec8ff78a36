//! Print the effects, events and object changes of one transaction.
//!
//! Usage:
//!   cargo run --bin inspect_tx -- <digest>

use clap::Parser;
use deepbook_bot::cli::{self, CommonArgs};
use deepbook_bot::ops;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "inspect_tx", about = "Inspect an executed transaction")]
struct Args {
    /// Transaction digest.
    digest: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing();
    let digest = args.digest.clone();
    cli::run(&args.common, |bot| async move { ops::inspect_tx(&bot, &digest).await }).await
}
