//! [`DeepBookAdapter`] that targets the DeepBook v3 Move package directly.
//!
//! Writes append Move calls to the draft; reads build a throwaway draft and
//! dev-inspect it through the chain collaborator.

use super::{DeepBookAdapter, Staged};
use crate::chain::{ChainClient, InspectResults};
use crate::config::DeepBookIds;
use crate::domain::manager::ManagerRef;
use crate::domain::order::LimitOrder;
use crate::domain::orderbook::{bucket_levels, Level2Query, Level2Range, Level2Snapshot};
use crate::domain::pool::{CoinInfo, PoolInfo};
use crate::error::{AdapterError, ChainError};
use crate::probe::{AttemptReport, UnitsReport};
use crate::shared::{
    scale_coin_amount, scale_price, scale_quantity, unscale_price, unscale_quantity, BookParams,
    ObjectIdStr, Side,
};
use crate::tx::{DraftTransaction, Input};

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Label recorded for every unit this adapter stages.
const VIA: &str = "move_call";

/// Upper bound on raw ticks requested from `get_level2_ticks_from_mid`.
pub const MAX_RAW_TICKS: u64 = 1_000;

const SUI_FRAMEWORK: &str = "0x2";

pub struct MoveCallAdapter {
    chain: Arc<dyn ChainClient>,
    ids: DeepBookIds,
}

impl MoveCallAdapter {
    pub fn new(chain: Arc<dyn ChainClient>, ids: DeepBookIds) -> Self {
        Self { chain, ids }
    }

    pub fn ids(&self) -> &DeepBookIds {
        &self.ids
    }

    fn package(&self) -> &ObjectIdStr {
        &self.ids.package_id
    }

    fn manager_type(&self) -> String {
        format!("{}::balance_manager::BalanceManager", self.package())
    }

    // ── Step builders ────────────────────────────────────────────────────

    fn trade_proof(&self, tx: &mut DraftTransaction, manager: &ManagerRef) -> Input {
        tx.move_call(
            self.package(),
            "balance_manager",
            "generate_proof_as_owner",
            vec![],
            vec![Input::shared(&manager.id, true)],
        )
    }

    fn cancel_order_step(
        &self,
        tx: &mut DraftTransaction,
        pool: &PoolInfo,
        manager: &ManagerRef,
        proof: &Input,
        order_id: u128,
    ) {
        tx.move_call(
            self.package(),
            "pool",
            "cancel_order",
            pool.type_args(),
            vec![
                Input::shared(&pool.pool_id, true),
                Input::shared(&manager.id, true),
                proof.clone(),
                Input::u128(order_id),
                Input::clock(),
            ],
        );
    }

    /// Cancel every open order of `manager` in `pool` with one call.
    pub fn cancel_all_orders(&self, tx: &mut DraftTransaction, pool: &PoolInfo, manager: &ManagerRef) {
        let proof = self.trade_proof(tx, manager);
        tx.move_call(
            self.package(),
            "pool",
            "cancel_all_orders",
            pool.type_args(),
            vec![
                Input::shared(&pool.pool_id, true),
                Input::shared(&manager.id, true),
                proof,
                Input::clock(),
            ],
        );
    }

    // ── Reads ────────────────────────────────────────────────────────────

    async fn inspect(&self, tx: &DraftTransaction) -> Result<InspectResults, AdapterError> {
        Ok(self.chain.inspect(tx).await?)
    }

    /// Raw tick, lot and minimum size of `pool`.
    pub async fn book_params(&self, pool: &PoolInfo) -> Result<BookParams, AdapterError> {
        let mut tx = DraftTransaction::new();
        tx.move_call(
            self.package(),
            "pool",
            "pool_book_params",
            pool.type_args(),
            vec![Input::shared(&pool.pool_id, false)],
        );
        let results = self.inspect(&tx).await?;
        Ok(BookParams {
            tick_size: results.decode(0, 0)?,
            lot_size: results.decode(0, 1)?,
            min_size: results.decode(0, 2)?,
        })
    }

    fn raw_range(pool: &PoolInfo, prices: &[u64], quantities: &[u64]) -> Level2Range {
        Level2Range::new(
            prices
                .iter()
                .map(|p| unscale_price(*p, pool.base.decimals, pool.quote.decimals))
                .collect(),
            quantities
                .iter()
                .map(|q| unscale_quantity(*q, pool.base.decimals))
                .collect(),
        )
    }
}

/// Raw ticks needed to cover `levels` buckets of `bucket` when one raw tick is
/// `pool_tick` in human units.
pub fn raw_ticks_for(query: &Level2Query, pool_tick: Decimal) -> u64 {
    if pool_tick <= Decimal::ZERO || query.tick_size <= Decimal::ZERO {
        return (query.levels as u64).clamp(1, MAX_RAW_TICKS);
    }
    let ticks = (Decimal::from(query.levels) * query.tick_size / pool_tick).ceil();
    ticks.to_u64().unwrap_or(MAX_RAW_TICKS).clamp(1, MAX_RAW_TICKS)
}

#[async_trait]
impl DeepBookAdapter for MoveCallAdapter {
    fn name(&self) -> &'static str {
        "move-call"
    }

    async fn create_balance_manager(&self, tx: &mut DraftTransaction) -> Result<Staged, AdapterError> {
        let manager = tx.move_call(self.package(), "balance_manager", "new", vec![], vec![]);
        let framework = ObjectIdStr::parse(SUI_FRAMEWORK).map_err(AdapterError::InvalidInput)?;
        tx.move_call(
            &framework,
            "transfer",
            "public_share_object",
            vec![self.manager_type()],
            vec![manager],
        );
        Ok(Staged::appended(VIA))
    }

    async fn deposit(
        &self,
        tx: &mut DraftTransaction,
        manager: &ManagerRef,
        coin: &CoinInfo,
        amount: Decimal,
    ) -> Result<Staged, AdapterError> {
        let raw = scale_coin_amount(amount, coin.decimals)?;
        let funds = if coin.is_sui() {
            tx.split_gas(raw)
        } else {
            tx.coin_with_balance(&coin.coin_type, raw)
        };
        tx.move_call(
            self.package(),
            "balance_manager",
            "deposit",
            vec![coin.coin_type.clone()],
            vec![Input::shared(&manager.id, true), funds],
        );
        tracing::debug!(manager = %manager.label, coin = %coin.symbol, raw, "Staged deposit");
        Ok(Staged::appended(VIA))
    }

    async fn register_balance_manager(
        &self,
        tx: &mut DraftTransaction,
        manager: &ManagerRef,
    ) -> Result<Staged, AdapterError> {
        tx.move_call(
            self.package(),
            "balance_manager",
            "register_balance_manager",
            vec![],
            vec![
                Input::shared(&manager.id, false),
                Input::shared(&self.ids.registry_id, true),
            ],
        );
        Ok(Staged::appended(VIA))
    }

    async fn register_pool(
        &self,
        tx: &mut DraftTransaction,
        pool: &PoolInfo,
        manager: &ManagerRef,
    ) -> Result<Staged, AdapterError> {
        tx.move_call(
            self.package(),
            "pool",
            "register_pool",
            pool.type_args(),
            vec![
                Input::shared(&pool.pool_id, true),
                Input::shared(&manager.id, false),
                Input::shared(&self.ids.registry_id, false),
            ],
        );
        tracing::debug!(pool = %pool.key, manager = %manager.label, "Staged pool registration");
        Ok(Staged::appended(VIA))
    }

    async fn place_limit_order(
        &self,
        tx: &mut DraftTransaction,
        order: &LimitOrder,
    ) -> Result<Staged, AdapterError> {
        let pool = &order.pool;
        let params = self.book_params(pool).await?;
        let price = scale_price(
            order.price,
            pool.base.decimals,
            pool.quote.decimals,
            params.tick_size,
        )?;
        let quantity = scale_quantity(order.quantity, pool.base.decimals, &params)?;
        tracing::debug!(price, quantity, ?params, "Scaled limit order");

        let proof = self.trade_proof(tx, &order.manager);
        tx.move_call(
            self.package(),
            "pool",
            "place_limit_order",
            pool.type_args(),
            vec![
                Input::shared(&pool.pool_id, true),
                Input::shared(&order.manager.id, true),
                proof,
                Input::u64(order.client_order_id),
                Input::u8(order.order_type.as_u8()),
                Input::u8(order.self_matching.as_u8()),
                Input::u64(price),
                Input::u64(quantity),
                Input::bool(order.side.is_bid()),
                Input::bool(order.pay_with_deep),
                Input::u64(order.expiration),
                Input::clock(),
            ],
        );
        Ok(Staged::appended(VIA))
    }

    async fn cancel_orders(
        &self,
        tx: &mut DraftTransaction,
        pool: &PoolInfo,
        manager: &ManagerRef,
        order_ids: &[String],
    ) -> Result<UnitsReport, AdapterError> {
        let mut report = UnitsReport::default();
        let mut proof: Option<Input> = None;

        for id in order_ids {
            let mut attempts = AttemptReport::default();
            match id.trim().parse::<u128>() {
                Ok(order_id) => {
                    let proof = proof
                        .get_or_insert_with(|| self.trade_proof(tx, manager))
                        .clone();
                    self.cancel_order_step(tx, pool, manager, &proof, order_id);
                    attempts.record_success(VIA);
                    report.record(id, Some(VIA.to_string()), attempts);
                }
                Err(e) => {
                    attempts.record_failure(VIA, format!("order id '{}' is not a u128: {}", id, e));
                    report.record(id, None, attempts);
                }
            }
        }

        Ok(report.into_result("cancel_order")?)
    }

    async fn level2(&self, pool: &PoolInfo, query: &Level2Query) -> Result<Level2Snapshot, AdapterError> {
        let params = self.book_params(pool).await?;
        let pool_tick = unscale_price(params.tick_size, pool.base.decimals, pool.quote.decimals);
        let ticks = raw_ticks_for(query, pool_tick);

        let mut tx = DraftTransaction::new();
        tx.move_call(
            self.package(),
            "pool",
            "get_level2_ticks_from_mid",
            pool.type_args(),
            vec![Input::shared(&pool.pool_id, false), Input::u64(ticks), Input::clock()],
        );
        let results = self.inspect(&tx).await?;
        let columns: Vec<Vec<u64>> = (0..4)
            .map(|i| results.decode::<Vec<u64>>(0, i))
            .collect::<Result<_, ChainError>>()?;

        let bids = bucket_levels(
            &Self::raw_range(pool, &columns[0], &columns[1]),
            query.tick_size,
            Side::Bid,
            query.levels,
        );
        let asks = query.include_asks.then(|| {
            bucket_levels(
                &Self::raw_range(pool, &columns[2], &columns[3]),
                query.tick_size,
                Side::Ask,
                query.levels,
            )
        });

        tracing::debug!(pool = %pool.key, ticks, bids = bids.len(), "Read level 2");
        Ok(Level2Snapshot {
            pool: pool.key.clone(),
            bids,
            asks,
        })
    }

    async fn mid_price(&self, pool: &PoolInfo) -> Result<Option<Decimal>, AdapterError> {
        let mut tx = DraftTransaction::new();
        tx.move_call(
            self.package(),
            "pool",
            "mid_price",
            pool.type_args(),
            vec![Input::shared(&pool.pool_id, false), Input::clock()],
        );
        match self.chain.inspect(&tx).await {
            Ok(results) => {
                let raw: u64 = results.decode(0, 0)?;
                Ok((raw > 0).then(|| unscale_price(raw, pool.base.decimals, pool.quote.decimals)))
            }
            // An empty side aborts inside the pool.
            Err(ChainError::Inspect(reason)) => {
                tracing::debug!(pool = %pool.key, %reason, "No mid price");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn open_orders(&self, pool: &PoolInfo, manager: &ManagerRef) -> Result<Vec<String>, AdapterError> {
        let mut tx = DraftTransaction::new();
        tx.move_call(
            self.package(),
            "pool",
            "account_open_orders",
            pool.type_args(),
            vec![Input::shared(&pool.pool_id, false), Input::shared(&manager.id, false)],
        );
        let results = self.inspect(&tx).await?;
        // VecSet<u128> encodes as its inner vector.
        let ids: Vec<u128> = results.decode(0, 0)?;
        Ok(ids.into_iter().map(|id| id.to_string()).collect())
    }

    async fn manager_balance(&self, manager: &ManagerRef, coin: &CoinInfo) -> Result<Decimal, AdapterError> {
        let mut tx = DraftTransaction::new();
        tx.move_call(
            self.package(),
            "balance_manager",
            "balance",
            vec![coin.coin_type.clone()],
            vec![Input::shared(&manager.id, false)],
        );
        let raw: u64 = self.inspect(&tx).await?.decode(0, 0)?;
        Ok(unscale_quantity(raw, coin.decimals))
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
    fn test_raw_ticks_cover_requested_levels() {
        let query = Level2Query {
            tick_size: d("0.1"),
            levels: 10,
            include_asks: true,
        };
        // 10 buckets of 0.1 with a 0.001 pool tick.
        assert_eq!(raw_ticks_for(&query, d("0.001")), 1_000);
        assert_eq!(raw_ticks_for(&query, d("0.01")), 100);
        assert_eq!(raw_ticks_for(&query, Decimal::ZERO), 10);
    }

    #[test]
    fn test_raw_ticks_capped() {
        let query = Level2Query {
            tick_size: d("1"),
            levels: 200,
            include_asks: false,
        };
        assert_eq!(raw_ticks_for(&query, d("0.00001")), MAX_RAW_TICKS);
    }
}
