//! Pure conversion between human-readable prices/quantities and the raw
//! integers DeepBook pools store.
//!
//! All math uses `rust_decimal::Decimal` for exact arithmetic.
//! No async, no network calls.
//!
//! ```text
//! price_raw    = price * FLOAT_SCALAR * 10^quote_decimals / 10^base_decimals
//! quantity_raw = quantity * 10^base_decimals
//! ```

use std::fmt;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Fixed-point scale DeepBook applies to prices.
pub const FLOAT_SCALAR: u64 = 1_000_000_000;

/// Raw book parameters of a pool, as returned by `pool::pool_book_params`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookParams {
    pub tick_size: u64,
    pub lot_size: u64,
    pub min_size: u64,
}

/// Errors that can occur during price/quantity scaling.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalingError {
    NonPositivePrice(String),
    NonPositiveSize(String),
    Overflow { context: String },
    ZeroAmount,
    BelowMinimum { raw: u64, min: u64 },
}

impl fmt::Display for ScalingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingError::NonPositivePrice(v) => write!(f, "Price must be positive, got {}", v),
            ScalingError::NonPositiveSize(v) => write!(f, "Size must be positive, got {}", v),
            ScalingError::Overflow { context } => write!(f, "Overflow: {}", context),
            ScalingError::ZeroAmount => write!(f, "Computed amount is zero"),
            ScalingError::BelowMinimum { raw, min } => {
                write!(f, "Quantity {} is below the pool minimum {}", raw, min)
            }
        }
    }
}

impl std::error::Error for ScalingError {}

fn pow10(decimals: u8) -> Result<Decimal, ScalingError> {
    10u64
        .checked_pow(decimals as u32)
        .map(Decimal::from)
        .ok_or_else(|| ScalingError::Overflow {
            context: format!("10^{} overflow", decimals),
        })
}

fn to_u64(value: Decimal, context: &str) -> Result<u64, ScalingError> {
    value.floor().to_u64().ok_or_else(|| ScalingError::Overflow {
        context: context.to_string(),
    })
}

fn floor_to_multiple(raw: u64, step: u64) -> u64 {
    if step <= 1 {
        raw
    } else {
        raw - raw % step
    }
}

/// Convert a human price into the pool's raw price, rounded down to a tick.
pub fn scale_price(
    price: Decimal,
    base_decimals: u8,
    quote_decimals: u8,
    tick_size: u64,
) -> Result<u64, ScalingError> {
    if price <= Decimal::ZERO {
        return Err(ScalingError::NonPositivePrice(price.to_string()));
    }

    let raw = price
        .checked_mul(Decimal::from(FLOAT_SCALAR))
        .and_then(|v| v.checked_mul(pow10(quote_decimals).ok()?))
        .and_then(|v| v.checked_div(pow10(base_decimals).ok()?))
        .ok_or_else(|| ScalingError::Overflow {
            context: "price * FLOAT_SCALAR * 10^quote / 10^base".to_string(),
        })?;

    let raw = floor_to_multiple(to_u64(raw, "raw price exceeds u64")?, tick_size);
    if raw == 0 {
        return Err(ScalingError::ZeroAmount);
    }
    Ok(raw)
}

/// Convert a human base quantity into the pool's raw quantity, rounded down to
/// a lot and checked against the minimum size.
pub fn scale_quantity(
    quantity: Decimal,
    base_decimals: u8,
    params: &BookParams,
) -> Result<u64, ScalingError> {
    if quantity <= Decimal::ZERO {
        return Err(ScalingError::NonPositiveSize(quantity.to_string()));
    }

    let raw = quantity
        .checked_mul(pow10(base_decimals)?)
        .ok_or_else(|| ScalingError::Overflow {
            context: "quantity * 10^base".to_string(),
        })?;

    let raw = floor_to_multiple(to_u64(raw, "raw quantity exceeds u64")?, params.lot_size);
    if raw == 0 {
        return Err(ScalingError::ZeroAmount);
    }
    if raw < params.min_size {
        return Err(ScalingError::BelowMinimum {
            raw,
            min: params.min_size,
        });
    }
    Ok(raw)
}

/// Convert a coin amount into base units (MIST for SUI), rounding down.
pub fn scale_coin_amount(amount: Decimal, decimals: u8) -> Result<u64, ScalingError> {
    if amount <= Decimal::ZERO {
        return Err(ScalingError::NonPositiveSize(amount.to_string()));
    }
    let raw = amount
        .checked_mul(pow10(decimals)?)
        .ok_or_else(|| ScalingError::Overflow {
            context: "amount * 10^decimals".to_string(),
        })?;
    let raw = to_u64(raw, "coin amount exceeds u64")?;
    if raw == 0 {
        return Err(ScalingError::ZeroAmount);
    }
    Ok(raw)
}

/// Inverse of [`scale_price`] (without tick rounding).
pub fn unscale_price(raw: u64, base_decimals: u8, quote_decimals: u8) -> Decimal {
    let scaled = Decimal::from(raw) / Decimal::from(FLOAT_SCALAR);
    match (pow10(base_decimals), pow10(quote_decimals)) {
        (Ok(base), Ok(quote)) => (scaled * base / quote).normalize(),
        _ => Decimal::ZERO,
    }
}

/// Inverse of [`scale_quantity`] (also used for coin balances).
pub fn unscale_quantity(raw: u64, decimals: u8) -> Decimal {
    match pow10(decimals) {
        Ok(unit) => (Decimal::from(raw) / unit).normalize(),
        Err(_) => Decimal::ZERO,
    }
}
