//! The signing/client collaborator: address, submission, object and
//! transaction reads, coin listing, and dev-inspect.
//!
//! [`ChainClient`] is the only way the rest of the crate touches the network
//! node. [`SuiChain`](sui::SuiChain) implements it over the Sui JSON-RPC SDK;
//! tests substitute in-memory stubs.

#[cfg(feature = "sui")]
pub mod keys;
#[cfg(feature = "sui")]
pub mod sui;
pub mod types;

pub use types::{CoinSummary, InspectResults, ObjectSummary, ReturnValue};

use crate::error::ChainError;
use crate::shared::ObjectIdStr;
use crate::tx::DraftTransaction;

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signing key.
    fn address(&self) -> &ObjectIdStr;

    /// Compile, sign and execute `tx`; returns the node's transaction-block
    /// response (effects, events, object changes).
    async fn sign_and_execute(&self, tx: &DraftTransaction) -> Result<Value, ChainError>;

    /// `Ok(None)` when the object does not exist.
    async fn get_object(&self, id: &ObjectIdStr) -> Result<Option<ObjectSummary>, ChainError>;

    async fn get_transaction(&self, digest: &str) -> Result<Value, ChainError>;

    async fn get_coins(
        &self,
        owner: &ObjectIdStr,
        coin_type: &str,
    ) -> Result<Vec<CoinSummary>, ChainError>;

    /// Dev-inspect `tx` as the signer; nothing is committed.
    async fn inspect(&self, tx: &DraftTransaction) -> Result<InspectResults, ChainError>;
}

/// Bound a network call by `timeout`.
pub async fn with_deadline<T, F>(operation: &str, timeout: Duration, fut: F) -> Result<T, ChainError>
where
    F: Future<Output = Result<T, ChainError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, secs = timeout.as_secs(), "Deadline exceeded");
            Err(ChainError::Timeout {
                operation: operation.to_string(),
                secs: timeout.as_secs(),
            })
        }
    }
}
