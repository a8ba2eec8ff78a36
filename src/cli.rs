//! Shared harness for the `src/bin` scripts.
//!
//! Every binary does the same thing: install logging, load `.env`, validate
//! the configuration before touching the network, connect, run one operation
//! from [`ops`](crate::ops), and print its outcome as JSON on stdout.
//! Diagnostics go to stderr.

use crate::client::DeepBookBot;
use crate::config::Config;
use crate::error::{ConfigError, SdkError};

use clap::Args;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;

/// Flags every script accepts.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Read settings from this file instead of `./.env`.
    #[arg(long, env = "ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Print the outcome on a single line.
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

/// `fmt` layer on stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

pub fn load_config(args: &CommonArgs) -> Result<Config, ConfigError> {
    Config::load(args.env_file.as_deref())
}

/// Load and validate the configuration, connect, and run `op`.
pub async fn run<T, F, Fut>(args: &CommonArgs, op: F) -> ExitCode
where
    T: Serialize,
    F: FnOnce(DeepBookBot) -> Fut,
    Fut: Future<Output = Result<T, SdkError>>,
{
    let config = match load_config(args) {
        Ok(config) => config,
        Err(ConfigError::Invalid(fields)) => {
            for field in &fields {
                tracing::error!(field = %field.field, "{}", field.message);
            }
            tracing::error!(count = fields.len(), "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(network = %config.network, adapter = ?config.adapter, pool = %config.pool_key, "Configuration loaded");

    let bot = match DeepBookBot::connect(config).await {
        Ok(bot) => bot,
        Err(e) => return fail(&e),
    };
    tracing::info!(address = %bot.address(), adapter = bot.adapter().name(), "Connected");

    finish(args, op(bot).await)
}

/// Print `result` and map it to an exit code.
pub fn finish<T: Serialize>(args: &CommonArgs, result: Result<T, SdkError>) -> ExitCode {
    match result {
        Ok(outcome) => match print_outcome(&outcome, args.compact) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&SdkError::from(e)),
        },
        Err(e) => fail(&e),
    }
}

fn print_outcome<T: Serialize>(outcome: &T, compact: bool) -> Result<(), serde_json::Error> {
    let json = if compact {
        serde_json::to_string(outcome)?
    } else {
        serde_json::to_string_pretty(outcome)?
    };
    println!("{}", json);
    Ok(())
}

fn fail(error: &SdkError) -> ExitCode {
    match error {
        SdkError::ExecutionFailed { digest, error } => {
            tracing::error!(digest = %digest, error = %error, "Transaction failed");
        }
        SdkError::TradingDisabled(message) => tracing::error!("{}", message),
        other => tracing::error!(error = %other, "Failed"),
    }
    ExitCode::FAILURE
}
