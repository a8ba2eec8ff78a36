//! Wire types for the DeepBook indexer pool listing.

use serde::{Deserialize, Serialize};

/// One entry of `GET /get_pools`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolSummary {
    pub pool_id: String,
    pub pool_name: String,
    pub base_asset_id: String,
    pub base_asset_decimals: u8,
    pub base_asset_symbol: String,
    #[serde(default)]
    pub base_asset_name: Option<String>,
    pub quote_asset_id: String,
    pub quote_asset_decimals: u8,
    pub quote_asset_symbol: String,
    #[serde(default)]
    pub quote_asset_name: Option<String>,
    #[serde(default)]
    pub min_size: Option<u64>,
    #[serde(default)]
    pub lot_size: Option<u64>,
    #[serde(default)]
    pub tick_size: Option<u64>,
}
