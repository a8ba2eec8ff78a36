//! Level aggregation: merge raw price levels into tick-sized buckets.

use super::Level2Range;
use crate::shared::Side;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Aggregate raw levels into buckets of `tick_size`, keeping at most
/// `max_levels` buckets, best first.
///
/// Bids round down to the tick and are ordered high → low; asks round up and
/// are ordered low → high. A non-positive tick leaves prices unbucketed.
pub fn bucket_levels(raw: &Level2Range, tick_size: Decimal, side: Side, max_levels: u32) -> Level2Range {
    let mut buckets: BTreeMap<Decimal, Decimal> = BTreeMap::new();

    for (price, quantity) in raw.levels() {
        if quantity.is_zero() {
            continue;
        }
        let key = if tick_size > Decimal::ZERO {
            let steps = price / tick_size;
            let steps = match side {
                Side::Bid => steps.floor(),
                Side::Ask => steps.ceil(),
            };
            (steps * tick_size).normalize()
        } else {
            price.normalize()
        };
        *buckets.entry(key).or_insert(Decimal::ZERO) += quantity;
    }

    let ordered: Vec<(Decimal, Decimal)> = match side {
        Side::Bid => buckets.into_iter().rev().collect(),
        Side::Ask => buckets.into_iter().collect(),
    };

    let (prices, quantities) = ordered
        .into_iter()
        .take(max_levels as usize)
        .unzip();
    Level2Range { prices, quantities }
}
