//! Trading guards: nothing that moves funds runs unless explicitly enabled,
//! and every order is capped in quote value.

use crate::config::Config;
use crate::error::SdkError;
use rust_decimal::Decimal;

/// Smallest base quantity a resting bid is sized to.
pub const MIN_ORDER_QTY: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Fail unless trading is enabled and the per-order cap is positive.
pub fn assert_trading_allowed(allow_trading: bool, max_order_usd: Decimal) -> Result<(), SdkError> {
    if !allow_trading {
        return Err(SdkError::TradingDisabled(
            "Trading disabled. Set ALLOW_TRADING=true in .env to enable (careful).".to_string(),
        ));
    }
    if max_order_usd <= Decimal::ZERO {
        return Err(SdkError::TradingDisabled(
            "MAX_ORDER_USD must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Limit a requested quote amount to the configured maximum.
pub fn clamp_order_usd(requested: Decimal, max_order_usd: Decimal) -> Decimal {
    if requested > max_order_usd {
        max_order_usd
    } else {
        requested
    }
}

/// Price and quantity of a bid resting far below the reference price.
///
/// `price = reference * multiplier`, `quantity = max(0.01, max_order_usd / price)`.
pub fn resting_bid(
    reference: Decimal,
    multiplier: Decimal,
    max_order_usd: Decimal,
) -> Result<(Decimal, Decimal), SdkError> {
    if reference <= Decimal::ZERO {
        return Err(SdkError::Validation(format!(
            "reference price must be positive, got {}",
            reference
        )));
    }
    if multiplier <= Decimal::ZERO || multiplier >= Decimal::ONE {
        return Err(SdkError::Validation(format!(
            "multiplier must be in (0, 1), got {}",
            multiplier
        )));
    }
    let price = (reference * multiplier).normalize();
    let quantity = (max_order_usd / price).round_dp(9).max(MIN_ORDER_QTY);
    let notional = price * quantity;
    if clamp_order_usd(notional, max_order_usd) < notional {
        tracing::warn!(%notional, %max_order_usd, "Minimum order size exceeds MAX_ORDER_USD");
    }
    Ok((price, quantity.normalize()))
}

/// Log the active safety settings once per run.
pub fn log_safety(config: &Config) {
    tracing::warn!(
        allow_trading = config.allow_trading,
        max_order_usd = %config.max_order_usd,
        order_size_base = %config.order_size_base,
        "Safety settings"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_trading_disabled_message() {
        let err = assert_trading_allowed(false, d("2")).unwrap_err();
        assert!(err.to_string().contains("ALLOW_TRADING=true"));
    }

    #[test]
    fn test_trading_requires_positive_cap() {
        assert!(assert_trading_allowed(true, Decimal::ZERO).is_err());
        assert!(assert_trading_allowed(true, d("2")).is_ok());
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_order_usd(d("5"), d("2")), d("2"));
        assert_eq!(clamp_order_usd(d("1.5"), d("2")), d("1.5"));
    }

    #[test]
    fn test_resting_bid_sizing() {
        let (price, qty) = resting_bid(d("4"), d("0.5"), d("2")).unwrap();
        assert_eq!(price, d("2"));
        assert_eq!(qty, d("1"));
    }

    #[test]
    fn test_resting_bid_floors_quantity() {
        let (_, qty) = resting_bid(d("1000"), d("0.5"), d("2")).unwrap();
        assert_eq!(qty, d("0.01"));
    }

    #[test]
    fn test_resting_bid_rejects_bad_multiplier() {
        assert!(resting_bid(d("1"), d("1"), d("2")).is_err());
        assert!(resting_bid(d("1"), d("0"), d("2")).is_err());
    }
}
