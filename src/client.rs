//! High-level client: `DeepBookBot` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the shared pool cache, and submission.

use crate::adapter::{self, DeepBookAdapter, Facade, MoveCallAdapter};
use crate::chain::ChainClient;
use crate::config::Config;
use crate::domain::manager::client::Managers;
use crate::domain::order::client::Orders;
use crate::domain::orderbook::client::Orderbooks;
use crate::domain::pool::client::Pools;
use crate::domain::pool::{known_pools, PoolInfo};
use crate::error::SdkError;
use crate::http::IndexerHttp;
use crate::probe::ExecutionSummary;
use crate::shared::ObjectIdStr;
use crate::tx::DraftTransaction;

use async_lock::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

// Re-export sub-client types for convenience.
pub use crate::domain::manager::client::Managers as ManagersClient;
pub use crate::domain::order::client::Orders as OrdersClient;
pub use crate::domain::orderbook::client::Orderbooks as OrderbooksClient;
pub use crate::domain::pool::client::Pools as PoolsClient;

/// A submitted transaction: the node's response and its summary.
#[derive(Debug, Clone)]
pub struct Submitted {
    pub summary: ExecutionSummary,
    pub response: Value,
}

/// The primary entry point.
///
/// Provides nested sub-client accessors for each domain:
/// `bot.pools()`, `bot.orders()`, etc.
pub struct DeepBookBot {
    pub(crate) config: Arc<Config>,
    pub(crate) chain: Arc<dyn ChainClient>,
    pub(crate) adapter: Arc<dyn DeepBookAdapter>,
    pub(crate) indexer: Option<IndexerHttp>,
    /// Resolved pools: lowercase key and pool id → PoolInfo
    pub(crate) pool_cache: Arc<RwLock<HashMap<String, PoolInfo>>>,
}

impl DeepBookBot {
    pub fn builder(config: Config) -> DeepBookBotBuilder {
        DeepBookBotBuilder::new(config)
    }

    /// Connect to the configured fullnode and indexer with the configured
    /// adapter.
    #[cfg(feature = "sui")]
    pub async fn connect(config: Config) -> Result<Self, SdkError> {
        let chain = crate::chain::sui::SuiChain::connect(
            &config.rpc_url,
            config.private_key.expose(),
            config.gas_budget,
            config.rpc_timeout,
        )
        .await?;
        let indexer = IndexerHttp::new(&config.indexer_url, config.rpc_timeout)?;
        Self::builder(config)
            .chain(Arc::new(chain))
            .indexer(indexer)
            .build()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn pools(&self) -> Pools<'_> {
        Pools { client: self }
    }

    pub fn managers(&self) -> Managers<'_> {
        Managers { client: self }
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders { client: self }
    }

    pub fn orderbooks(&self) -> Orderbooks<'_> {
        Orderbooks { client: self }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn address(&self) -> &ObjectIdStr {
        self.chain.address()
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }

    pub fn adapter(&self) -> &Arc<dyn DeepBookAdapter> {
        &self.adapter
    }

    pub fn indexer(&self) -> Option<&IndexerHttp> {
        self.indexer.as_ref()
    }

    /// The reflectable client surfaces over this bot's chain connection.
    pub fn facade(&self) -> Facade {
        let move_call = Arc::new(MoveCallAdapter::new(
            self.chain.clone(),
            self.config.deepbook.clone(),
        ));
        Facade::new(
            move_call,
            self.config.managers.clone(),
            known_pools(self.config.network),
        )
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Sign and execute `tx`. A response whose status is not `success` is an
    /// [`SdkError::ExecutionFailed`].
    pub async fn submit(&self, tx: &DraftTransaction) -> Result<Submitted, SdkError> {
        if tx.is_empty() {
            return Err(SdkError::Validation("Nothing to submit".to_string()));
        }
        tracing::info!(steps = ?tx.describe(), "Submitting transaction");
        let response = self.chain.sign_and_execute(tx).await?;
        let summary = ExecutionSummary::from_value(&response).ensure_success()?;
        tracing::info!(digest = %summary.digest, events = summary.event_count, "Transaction succeeded");
        Ok(Submitted { summary, response })
    }

    /// Clear the pool cache.
    pub async fn clear_caches(&self) {
        self.pool_cache.write().await.clear();
    }
}

impl Clone for DeepBookBot {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            chain: self.chain.clone(),
            adapter: self.adapter.clone(),
            indexer: self.indexer.clone(),
            pool_cache: self.pool_cache.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct DeepBookBotBuilder {
    config: Config,
    chain: Option<Arc<dyn ChainClient>>,
    adapter: Option<Arc<dyn DeepBookAdapter>>,
    indexer: Option<IndexerHttp>,
}

impl DeepBookBotBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            chain: None,
            adapter: None,
            indexer: None,
        }
    }

    pub fn chain(mut self, chain: Arc<dyn ChainClient>) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Use `adapter` instead of the one `config.adapter` selects.
    pub fn adapter(mut self, adapter: Arc<dyn DeepBookAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn indexer(mut self, indexer: IndexerHttp) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn build(self) -> Result<DeepBookBot, SdkError> {
        let chain = self
            .chain
            .ok_or_else(|| SdkError::Other("A chain client is required".to_string()))?;
        let adapter = match self.adapter {
            Some(adapter) => adapter,
            None => adapter::select(
                self.config.adapter,
                chain.clone(),
                self.config.deepbook.clone(),
                self.config.managers.clone(),
                known_pools(self.config.network),
            ),
        };
        tracing::debug!(adapter = adapter.name(), network = %self.config.network, "Built client");

        Ok(DeepBookBot {
            config: Arc::new(self.config),
            chain,
            adapter,
            indexer: self.indexer,
            pool_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }
}
