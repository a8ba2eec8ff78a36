//! Orderbook domain: level-2 snapshots of a pool.

#[cfg(feature = "http")]
pub mod client;
pub mod state;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::bucket_levels;

/// Parameters of a level-2 read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level2Query {
    /// Price granularity levels are aggregated to.
    pub tick_size: Decimal,
    /// Maximum number of levels per side.
    pub levels: u32,
    pub include_asks: bool,
}

impl Default for Level2Query {
    fn default() -> Self {
        Self {
            tick_size: Decimal::new(1, 1),
            levels: 50,
            include_asks: true,
        }
    }
}

/// One side of the book as parallel price/quantity columns, best level first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Level2Range {
    pub prices: Vec<Decimal>,
    pub quantities: Vec<Decimal>,
}

impl Level2Range {
    pub fn new(prices: Vec<Decimal>, quantities: Vec<Decimal>) -> Self {
        Self { prices, quantities }
    }

    pub fn best_price(&self) -> Option<Decimal> {
        self.prices.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prices.len().min(self.quantities.len())
    }

    /// `(price, quantity)` pairs; unmatched trailing entries are dropped.
    pub fn levels(&self) -> impl Iterator<Item = (Decimal, Decimal)> + '_ {
        self.prices
            .iter()
            .copied()
            .zip(self.quantities.iter().copied())
    }
}

/// Bids and (optionally) asks of one pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Level2Snapshot {
    pub pool: String,
    pub bids: Level2Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asks: Option<Level2Range>,
}

impl Level2Snapshot {
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.as_ref().and_then(Level2Range::best_price)
    }

    /// Midpoint of the best bid and best ask, when both exist.
    pub fn mid(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_best_price_is_first_level() {
        let range = Level2Range::new(vec![d("1.23"), d("1.20")], vec![d("10"), d("5")]);
        assert_eq!(range.best_price(), Some(d("1.23")));
        assert_eq!(range.len(), 2);
    }

    #[test]
    fn test_empty_range_has_no_best() {
        assert_eq!(Level2Range::default().best_price(), None);
    }

    #[test]
    fn test_mid_requires_both_sides() {
        let mut snap = Level2Snapshot {
            pool: "SUI_DBUSDC".into(),
            bids: Level2Range::new(vec![d("1.0")], vec![d("1")]),
            asks: None,
        };
        assert_eq!(snap.mid(), None);
        snap.asks = Some(Level2Range::new(vec![d("1.2")], vec![d("1")]));
        assert_eq!(snap.mid(), Some(d("1.1")));
    }

    #[test]
    fn test_levels_zip_drops_unmatched() {
        let range = Level2Range::new(vec![d("2"), d("1")], vec![d("3")]);
        assert_eq!(range.levels().count(), 1);
        assert_eq!(range.len(), 1);
    }
}
