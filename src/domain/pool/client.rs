//! Pools sub-client: resolve pool keys and coin symbols, with cache.

use crate::client::DeepBookBot;
use crate::domain::pool::{known_coin, known_pool, CoinInfo, PoolInfo};
use crate::error::SdkError;
use crate::shared::ObjectIdStr;

/// Sub-client for pool lookups.
pub struct Pools<'a> {
    pub(crate) client: &'a DeepBookBot,
}

impl<'a> Pools<'a> {
    /// Resolve a pool by key (case-insensitive) or object id.
    ///
    /// Built-in pools are tried first, then the indexer listing. Results are
    /// cached for the life of the client.
    pub async fn resolve(&self, key_or_id: &str) -> Result<PoolInfo, SdkError> {
        let cache_key = cache_key(key_or_id);
        {
            let cache = self.client.pool_cache.read().await;
            if let Some(pool) = cache.get(&cache_key) {
                return Ok(pool.clone());
            }
        }

        let pool = match known_pool(self.client.config.network, key_or_id) {
            Some(pool) => pool,
            None => self.from_indexer(key_or_id).await?,
        };

        let mut cache = self.client.pool_cache.write().await;
        cache.insert(pool.key.to_ascii_lowercase(), pool.clone());
        cache.insert(pool.pool_id.to_string(), pool.clone());
        Ok(pool)
    }

    /// The pool named by `POOL_KEY`.
    pub async fn configured(&self) -> Result<PoolInfo, SdkError> {
        self.resolve(&self.client.config.pool_key).await
    }

    /// Every pool the indexer lists. Entries that fail validation are skipped.
    pub async fn list(&self) -> Result<Vec<PoolInfo>, SdkError> {
        let Some(indexer) = self.client.indexer.as_ref() else {
            return Ok(crate::domain::pool::known_pools(self.client.config.network));
        };
        let summaries = indexer.get_pools().await?;
        Ok(summaries
            .iter()
            .cloned()
            .filter_map(|s| match PoolInfo::try_from(s) {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping indexer pool");
                    None
                }
            })
            .collect())
    }

    /// Resolve a coin symbol: the built-in table, else the coins of `pool`.
    pub fn coin(&self, symbol: &str, pool: &PoolInfo) -> Result<CoinInfo, SdkError> {
        if let Some(coin) = known_coin(self.client.config.network, symbol) {
            return Ok(coin);
        }
        [&pool.base, &pool.quote]
            .into_iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(symbol.trim()))
            .cloned()
            .ok_or_else(|| SdkError::Validation(format!("Unknown coin {}", symbol)))
    }

    async fn from_indexer(&self, key_or_id: &str) -> Result<PoolInfo, SdkError> {
        let unknown = || {
            SdkError::Validation(format!(
                "Unknown pool {} on {}",
                key_or_id, self.client.config.network
            ))
        };
        if self.client.indexer.is_none() {
            return Err(unknown());
        }

        let by_id = ObjectIdStr::parse(key_or_id).ok();
        self.list()
            .await?
            .into_iter()
            .find(|p| match &by_id {
                Some(id) => &p.pool_id == id,
                None => p.key.eq_ignore_ascii_case(key_or_id.trim()),
            })
            .ok_or_else(unknown)
    }

    pub async fn clear_cache(&self) {
        self.client.pool_cache.write().await.clear();
    }
}

fn cache_key(key_or_id: &str) -> String {
    match ObjectIdStr::parse(key_or_id) {
        Ok(id) => id.to_string(),
        Err(_) => key_or_id.trim().to_ascii_lowercase(),
    }
}
