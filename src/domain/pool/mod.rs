//! Pool domain: trading venues pairing a base and a quote coin.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::network::Network;
use crate::shared::ObjectIdStr;
use serde::{Deserialize, Serialize};

// ─── CoinInfo ────────────────────────────────────────────────────────────────

/// A coin type with its display symbol and decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub symbol: String,
    pub coin_type: String,
    pub decimals: u8,
}

/// Fully-qualified type of the native coin.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

impl CoinInfo {
    pub fn new(symbol: &str, coin_type: &str, decimals: u8) -> Self {
        Self {
            symbol: symbol.to_string(),
            coin_type: coin_type.to_string(),
            decimals,
        }
    }

    pub fn sui() -> Self {
        Self::new("SUI", SUI_COIN_TYPE, 9)
    }

    /// True for the gas coin, which deposits split from gas instead of from an
    /// owned coin object.
    pub fn is_sui(&self) -> bool {
        self.coin_type == SUI_COIN_TYPE
            || self.coin_type
                == "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI"
    }
}

/// Coins known without an indexer round trip.
pub fn known_coin(network: Network, symbol: &str) -> Option<CoinInfo> {
    let symbol = symbol.trim().to_ascii_uppercase();
    let coin = match (network, symbol.as_str()) {
        (_, "SUI") => CoinInfo::sui(),
        (Network::Testnet, "DBUSDC") => CoinInfo::new(
            "DBUSDC",
            "0xf7152c05930480cd740d7311b5b8b45c6f488e3a53a11c3f74a6fac36a52e0d7::DBUSDC::DBUSDC",
            6,
        ),
        (Network::Testnet, "DEEP") => CoinInfo::new(
            "DEEP",
            "0x36dbef866a1d62bf7328989a10fb2f07d769f4ee587c0de4a0a256e57e0a58a8::deep::DEEP",
            6,
        ),
        (Network::Mainnet, "DEEP") => CoinInfo::new(
            "DEEP",
            "0xdeeb7a4662eec9f2f3def03fb937a663dddaa2e215b8078a284d026b7946c270::deep::DEEP",
            6,
        ),
        (Network::Mainnet, "USDC") => CoinInfo::new(
            "USDC",
            "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
            6,
        ),
        _ => return None,
    };
    Some(coin)
}

// ─── PoolInfo ────────────────────────────────────────────────────────────────

/// A resolved pool: object id plus the coin types it is generic over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub key: String,
    pub pool_id: ObjectIdStr,
    pub base: CoinInfo,
    pub quote: CoinInfo,
}

impl PoolInfo {
    /// `[Base, Quote]` type arguments for `pool::*` Move calls.
    pub fn type_args(&self) -> Vec<String> {
        vec![self.base.coin_type.clone(), self.quote.coin_type.clone()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolValidationError {
    InvalidPoolId { pool: String, reason: String },
    UnknownCoin { pool: String, coin_type: String },
}

impl std::fmt::Display for PoolValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolValidationError::InvalidPoolId { pool, reason } => {
                write!(f, "Pool {}: invalid id ({})", pool, reason)
            }
            PoolValidationError::UnknownCoin { pool, coin_type } => {
                write!(f, "Pool {}: malformed coin type {}", pool, coin_type)
            }
        }
    }
}

impl std::error::Error for PoolValidationError {}

fn known(network: Network, key: &str, pool_id: &str, base: &str, quote: &str) -> Option<PoolInfo> {
    Some(PoolInfo {
        key: key.to_string(),
        pool_id: ObjectIdStr::parse(pool_id).ok()?,
        base: known_coin(network, base)?,
        quote: known_coin(network, quote)?,
    })
}

/// Pools known without an indexer round trip.
pub fn known_pools(network: Network) -> Vec<PoolInfo> {
    let table: &[(&str, &str, &str, &str)] = match network {
        Network::Testnet => &[
            (
                "SUI_DBUSDC",
                "0x1c19362ca52b8ffd7a33cee805a67d40f31e6ba303753fd3a4cfdfacea7163a5",
                "SUI",
                "DBUSDC",
            ),
            (
                "DEEP_SUI",
                "0x48c95963e9eac37a316b7ae04a0deb761bcdcc2b67912374d6036e7f0e9bae9f",
                "DEEP",
                "SUI",
            ),
        ],
        Network::Mainnet => &[(
            "SUI_USDC",
            "0xe05dafb5133bcffb8d59f4e12465dc0e9faeaa05e3e342a08fe135800e3e4407",
            "SUI",
            "USDC",
        )],
    };
    table
        .iter()
        .filter_map(|(key, id, base, quote)| known(network, key, id, base, quote))
        .collect()
}

/// Look up a built-in pool by name (case-insensitive) or by object id.
pub fn known_pool(network: Network, key_or_id: &str) -> Option<PoolInfo> {
    let by_id = ObjectIdStr::parse(key_or_id).ok();
    known_pools(network).into_iter().find(|p| match &by_id {
        Some(id) => &p.pool_id == id,
        None => p.key.eq_ignore_ascii_case(key_or_id.trim()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_pool_by_name_and_id() {
        let by_name = known_pool(Network::Testnet, "sui_dbusdc").unwrap();
        assert_eq!(by_name.base.symbol, "SUI");
        assert_eq!(by_name.quote.symbol, "DBUSDC");

        let by_id = known_pool(Network::Testnet, by_name.pool_id.as_str()).unwrap();
        assert_eq!(by_id.key, "SUI_DBUSDC");
    }

    #[test]
    fn test_known_pool_scoped_by_network() {
        assert!(known_pool(Network::Mainnet, "SUI_DBUSDC").is_none());
        assert!(known_pool(Network::Mainnet, "SUI_USDC").is_some());
    }

    #[test]
    fn test_type_args_order() {
        let pool = known_pool(Network::Testnet, "DEEP_SUI").unwrap();
        let args = pool.type_args();
        assert!(args[0].ends_with("::deep::DEEP"));
        assert_eq!(args[1], SUI_COIN_TYPE);
    }

    #[test]
    fn test_sui_detection_accepts_long_form() {
        let mut coin = CoinInfo::sui();
        assert!(coin.is_sui());
        coin.coin_type =
            "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI"
                .to_string();
        assert!(coin.is_sui());
        assert!(!known_coin(Network::Testnet, "DBUSDC").unwrap().is_sui());
    }
}
