//! Orderbooks sub-client: level-2 depth and reference prices (never cached).

use crate::client::DeepBookBot;
use crate::domain::orderbook::{Level2Query, Level2Snapshot};
use crate::domain::pool::PoolInfo;
use crate::error::SdkError;

use rust_decimal::Decimal;

/// Sub-client for orderbook reads.
pub struct Orderbooks<'a> {
    pub(crate) client: &'a DeepBookBot,
}

impl<'a> Orderbooks<'a> {
    pub async fn level2(&self, pool: &PoolInfo, query: &Level2Query) -> Result<Level2Snapshot, SdkError> {
        Ok(self.client.adapter.level2(pool, query).await?)
    }

    /// Level 2 with the `L2_*` settings.
    pub async fn configured_level2(&self, pool: &PoolInfo) -> Result<Level2Snapshot, SdkError> {
        let config = &self.client.config;
        let query = Level2Query {
            tick_size: config.l2_tick_size,
            levels: config.l2_levels,
            include_asks: config.l2_include_asks,
        };
        self.level2(pool, &query).await
    }

    pub async fn mid_price(&self, pool: &PoolInfo) -> Result<Option<Decimal>, SdkError> {
        Ok(self.client.adapter.mid_price(pool).await?)
    }

    /// Best bid of a bids-only read.
    pub async fn best_bid(&self, pool: &PoolInfo) -> Result<Option<Decimal>, SdkError> {
        let query = Level2Query {
            tick_size: self.client.config.l2_tick_size,
            levels: self.client.config.l2_levels,
            include_asks: false,
        };
        Ok(self.level2(pool, &query).await?.best_bid())
    }

    /// Mid price, falling back to the best bid.
    pub async fn reference_price(&self, pool: &PoolInfo) -> Result<Option<Decimal>, SdkError> {
        match self.mid_price(pool).await {
            Ok(Some(mid)) => return Ok(Some(mid)),
            Ok(None) => tracing::debug!(pool = %pool.key, "No mid price; using best bid"),
            Err(e) => tracing::warn!(pool = %pool.key, error = %e, "Mid price read failed; using best bid"),
        }
        self.best_bid(pool).await
    }
}
