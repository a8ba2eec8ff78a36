//! Conversion: PoolSummary → PoolInfo (TryFrom + validation).

use super::wire;
use super::{CoinInfo, PoolInfo, PoolValidationError};
use crate::shared::ObjectIdStr;

/// The indexer reports coin types without the `0x` prefix.
fn coin_type(raw: &str) -> String {
    if raw.starts_with("0x") {
        raw.to_string()
    } else {
        format!("0x{}", raw)
    }
}

fn coin(pool: &str, raw_type: &str, symbol: &str, decimals: u8) -> Result<CoinInfo, PoolValidationError> {
    let coin_type = coin_type(raw_type);
    if coin_type.split("::").count() != 3 {
        return Err(PoolValidationError::UnknownCoin {
            pool: pool.to_string(),
            coin_type,
        });
    }
    Ok(CoinInfo {
        symbol: symbol.to_string(),
        coin_type,
        decimals,
    })
}

impl TryFrom<wire::PoolSummary> for PoolInfo {
    type Error = PoolValidationError;

    fn try_from(source: wire::PoolSummary) -> Result<Self, Self::Error> {
        let pool_id = ObjectIdStr::parse(&source.pool_id).map_err(|reason| {
            PoolValidationError::InvalidPoolId {
                pool: source.pool_name.clone(),
                reason,
            }
        })?;
        let base = coin(
            &source.pool_name,
            &source.base_asset_id,
            &source.base_asset_symbol,
            source.base_asset_decimals,
        )?;
        let quote = coin(
            &source.pool_name,
            &source.quote_asset_id,
            &source.quote_asset_symbol,
            source.quote_asset_decimals,
        )?;

        Ok(PoolInfo {
            key: source.pool_name,
            pool_id,
            base,
            quote,
        })
    }
}
