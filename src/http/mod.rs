//! HTTP layer: `IndexerHttp` with retry policies.

pub mod client;
pub mod retry;

pub use client::IndexerHttp;
pub use retry::{RetryConfig, RetryPolicy};
