//! [`DeepBookAdapter`] over surfaces whose operations are found by name.
//!
//! Each write resolves an operation through a [`CapabilityQuery`] and runs a
//! fixed plan of argument shapes against it. Reads run a single shape on a
//! scratch draft and normalize whatever value comes back.

use super::{DeepBookAdapter, Staged};
use crate::domain::manager::ManagerRef;
use crate::domain::order::LimitOrder;
use crate::domain::orderbook::{Level2Query, Level2Snapshot};
use crate::domain::pool::{CoinInfo, PoolInfo};
use crate::error::{AdapterError, ProbeError};
use crate::probe::{
    call_builder_helper, normalize, resolve, run_plan, run_units, Arg, AttemptPlan,
    CapabilityQuery, HelperOutcome, Returned, Surface, UnitsReport, WorkUnit,
};
use crate::shared::ObjectIdStr;
use crate::tx::DraftTransaction;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;

// ── Queries ─────────────────────────────────────────────────────────────────

fn cancel_query() -> CapabilityQuery {
    CapabilityQuery::new()
        .contains("cancel")
        .contains("order")
        .excludes("all")
}

fn place_query() -> Result<CapabilityQuery, AdapterError> {
    CapabilityQuery::new()
        .contains("place")
        .matches("limit|order")
        .map_err(|e| AdapterError::InvalidInput(e.to_string()))
}

fn register_query() -> CapabilityQuery {
    CapabilityQuery::new()
        .contains("register")
        .contains("balance")
        .contains("manager")
}

fn register_pool_query() -> CapabilityQuery {
    CapabilityQuery::new().contains("register").contains("pool")
}

// ── Plans ───────────────────────────────────────────────────────────────────

/// One unit per order id, each trying the four known `cancelOrder` shapes.
pub fn cancel_units(pool: &str, manager_id: &str, order_ids: &[String]) -> Vec<WorkUnit> {
    order_ids
        .iter()
        .map(|id| WorkUnit {
            key: id.clone(),
            plan: AttemptPlan::new()
                .attempt(
                    "txb,pool,managerId,orderId",
                    vec![Arg::Tx, Arg::str(pool), Arg::str(manager_id), Arg::str(id)],
                )
                .attempt(
                    "txb,pool,orderId,managerId",
                    vec![Arg::Tx, Arg::str(pool), Arg::str(id), Arg::str(manager_id)],
                )
                .attempt("txb,pool,orderId", vec![Arg::Tx, Arg::str(pool), Arg::str(id)])
                .attempt("txb,orderId", vec![Arg::Tx, Arg::str(id)]),
        })
        .collect()
}

/// The four known `placeLimitOrder` shapes. `extras` are appended to every
/// shape.
pub fn place_plan(order: &LimitOrder, extras: &[Arg]) -> AttemptPlan {
    let pool = Arg::str(&order.pool.key);
    let manager = Arg::str(order.manager.id.as_str());
    let side = Arg::str(order.side.as_str());
    let is_bid = Arg::Bool(order.side.is_bid());
    let price = Arg::Num(order.price);
    let qty = Arg::Num(order.quantity);

    let shapes: [(&str, Vec<Arg>); 4] = [
        (
            "txb,pool,managerId,side,price,qty",
            vec![Arg::Tx, pool.clone(), manager.clone(), side.clone(), price.clone(), qty.clone()],
        ),
        (
            "txb,pool,side,price,qty,managerId",
            vec![Arg::Tx, pool.clone(), side, price.clone(), qty.clone(), manager.clone()],
        ),
        (
            "txb,pool,managerId,isBid,price,qty",
            vec![Arg::Tx, pool.clone(), manager.clone(), is_bid.clone(), price.clone(), qty.clone()],
        ),
        (
            "txb,pool,isBid,price,qty,managerId",
            vec![Arg::Tx, pool, is_bid, price, qty, manager],
        ),
    ];

    shapes
        .into_iter()
        .fold(AttemptPlan::new(), |plan, (label, mut args)| {
            args.extend_from_slice(extras);
            plan.attempt(label, args)
        })
}

/// The four known `registerBalanceManager` shapes.
pub fn register_plan(owner: &ObjectIdStr, manager: &ManagerRef) -> AttemptPlan {
    let owner = Arg::str(owner.as_str());
    let key = Arg::str(&manager.label);
    let id = Arg::str(manager.id.as_str());
    AttemptPlan::new()
        .attempt(
            "txb,owner,managerKey,bmObjectId",
            vec![Arg::Tx, owner.clone(), key.clone(), id.clone()],
        )
        .attempt("txb,managerKey,bmObjectId", vec![Arg::Tx, key.clone(), id.clone()])
        .attempt("txb,bmObjectId,managerKey", vec![Arg::Tx, id.clone(), key.clone()])
        .attempt("txb,owner,bmObjectId,managerKey", vec![Arg::Tx, owner, id, key])
}

/// The four known `registerPool` shapes.
pub fn register_pool_plan(pool_key: &str, manager: &ManagerRef) -> AttemptPlan {
    let pool = Arg::str(pool_key);
    let key = Arg::str(&manager.label);
    let id = Arg::str(manager.id.as_str());
    AttemptPlan::new()
        .attempt("txb,poolKey,managerKey", vec![Arg::Tx, pool.clone(), key.clone()])
        .attempt("txb,poolKey,managerId", vec![Arg::Tx, pool.clone(), id.clone()])
        .attempt("txb,poolKey", vec![Arg::Tx, pool.clone()])
        .attempt("txb,poolKey,managerKey,managerId", vec![Arg::Tx, pool, key, id])
}

// ── Adapter ─────────────────────────────────────────────────────────────────

pub struct ProbingAdapter {
    deep_book: Arc<dyn Surface>,
    balance_manager: Arc<dyn Surface>,
    owner: ObjectIdStr,
}

impl ProbingAdapter {
    pub fn new(deep_book: Arc<dyn Surface>, balance_manager: Arc<dyn Surface>, owner: ObjectIdStr) -> Self {
        Self {
            deep_book,
            balance_manager,
            owner,
        }
    }

    fn staged(outcome: HelperOutcome) -> Staged {
        if outcome.built {
            Staged::appended(outcome.report.succeeded_label().unwrap_or_default())
        } else {
            Staged::Executed {
                response: outcome.value.unwrap_or(Value::Null),
            }
        }
    }

    /// Run a read with a single argument shape and return its value.
    async fn read(
        &self,
        surface: &dyn Surface,
        query: &CapabilityQuery,
        operation: &str,
        args: Vec<Arg>,
    ) -> Result<Value, AdapterError> {
        let (name, op) = resolve(surface, query)?;
        let mut scratch = DraftTransaction::new();
        let plan = AttemptPlan::new().attempt(&name, args);
        let success = run_plan(op.as_ref(), &mut scratch, operation, &plan).await?;
        success
            .returned
            .into_value()
            .ok_or_else(|| AdapterError::UnexpectedShape {
                operation: operation.to_string(),
                detail: format!("{} returned no value", name),
            })
    }
}

#[async_trait]
impl DeepBookAdapter for ProbingAdapter {
    fn name(&self) -> &'static str {
        "probing"
    }

    async fn create_balance_manager(&self, tx: &mut DraftTransaction) -> Result<Staged, AdapterError> {
        let query = CapabilityQuery::new()
            .contains("create")
            .contains("balance")
            .contains("manager");
        let (name, op) = resolve(self.balance_manager.as_ref(), &query)?;
        let outcome = call_builder_helper(op.as_ref(), tx, &name, &[]).await?;
        Ok(Self::staged(outcome))
    }

    async fn deposit(
        &self,
        tx: &mut DraftTransaction,
        manager: &ManagerRef,
        coin: &CoinInfo,
        amount: Decimal,
    ) -> Result<Staged, AdapterError> {
        let query = CapabilityQuery::new().contains("deposit");
        let (name, op) = resolve(self.balance_manager.as_ref(), &query)?;
        let args = [
            Arg::str(&manager.label),
            Arg::str(&coin.symbol),
            Arg::Num(amount),
        ];
        let outcome = call_builder_helper(op.as_ref(), tx, &name, &args).await?;
        Ok(Self::staged(outcome))
    }

    async fn register_balance_manager(
        &self,
        tx: &mut DraftTransaction,
        manager: &ManagerRef,
    ) -> Result<Staged, AdapterError> {
        let (name, op) = resolve(self.balance_manager.as_ref(), &register_query())?;
        let plan = register_plan(&self.owner, manager);
        let success = run_plan(op.as_ref(), tx, &name, &plan).await?;
        Ok(Staged::appended(&success.label))
    }

    /// A shape that returns a builder is curried: the builder is invoked with
    /// the draft, and its failure undoes the whole registration.
    async fn register_pool(
        &self,
        tx: &mut DraftTransaction,
        pool: &PoolInfo,
        manager: &ManagerRef,
    ) -> Result<Staged, AdapterError> {
        let (name, op) = resolve(self.deep_book.as_ref(), &register_pool_query())?;
        let plan = register_pool_plan(&pool.key, manager);
        let checkpoint = tx.checkpoint();
        let success = run_plan(op.as_ref(), tx, &name, &plan).await?;
        let builder = match success.returned {
            Returned::Builder(builder) => builder,
            _ => return Ok(Staged::appended(&success.label)),
        };

        let via = format!("{} → builder(tx)", success.label);
        match builder.invoke(tx, &[Arg::Tx]).await {
            Ok(_) => Ok(Staged::appended(&via)),
            Err(e) => {
                tx.rollback(checkpoint);
                let mut report = success.report;
                report.record_failure(&via, e.message);
                Err(ProbeError::AttemptsExhausted {
                    operation: name,
                    report,
                }
                .into())
            }
        }
    }

    async fn place_limit_order(
        &self,
        tx: &mut DraftTransaction,
        order: &LimitOrder,
    ) -> Result<Staged, AdapterError> {
        let (name, op) = resolve(self.deep_book.as_ref(), &place_query()?)?;
        let extras = [
            Arg::Num(Decimal::from(order.client_order_id)),
            Arg::Bool(order.pay_with_deep),
        ];
        let plan = place_plan(order, &extras);
        let success = run_plan(op.as_ref(), tx, &name, &plan).await?;
        Ok(Staged::appended(&success.label))
    }

    async fn cancel_orders(
        &self,
        tx: &mut DraftTransaction,
        pool: &PoolInfo,
        manager: &ManagerRef,
        order_ids: &[String],
    ) -> Result<UnitsReport, AdapterError> {
        let (name, op) = resolve(self.deep_book.as_ref(), &cancel_query())?;
        let units = cancel_units(&pool.key, manager.id.as_str(), order_ids);
        Ok(run_units(op.as_ref(), tx, &name, &units).await?)
    }

    async fn level2(&self, pool: &PoolInfo, query: &Level2Query) -> Result<Level2Snapshot, AdapterError> {
        let args = vec![
            Arg::str(&pool.key),
            Arg::Num(query.tick_size),
            Arg::Num(Decimal::from(query.levels)),
            Arg::Bool(query.include_asks),
        ];
        let value = self
            .read(
                self.deep_book.as_ref(),
                &CapabilityQuery::new().contains("level2"),
                "level2",
                args,
            )
            .await?;
        Ok(normalize::level2_snapshot(&pool.key, &value))
    }

    async fn mid_price(&self, pool: &PoolInfo) -> Result<Option<Decimal>, AdapterError> {
        let value = self
            .read(
                self.deep_book.as_ref(),
                &CapabilityQuery::new().contains("mid").contains("price"),
                "mid_price",
                vec![Arg::str(&pool.key)],
            )
            .await?;
        Ok(normalize::decimal(&value).filter(|p| *p > Decimal::ZERO))
    }

    async fn open_orders(&self, pool: &PoolInfo, manager: &ManagerRef) -> Result<Vec<String>, AdapterError> {
        let value = self
            .read(
                self.deep_book.as_ref(),
                &CapabilityQuery::new().contains("open").contains("orders"),
                "open_orders",
                vec![Arg::str(&pool.key), Arg::str(manager.id.as_str())],
            )
            .await?;
        Ok(normalize::order_ids(&value))
    }

    async fn manager_balance(&self, manager: &ManagerRef, coin: &CoinInfo) -> Result<Decimal, AdapterError> {
        let query = CapabilityQuery::new()
            .contains("balance")
            .contains("check");
        let value = self
            .read(
                self.deep_book.as_ref(),
                &query,
                "manager_balance",
                vec![Arg::str(manager.id.as_str()), Arg::str(&coin.symbol)],
            )
            .await?;
        value
            .get("balance")
            .and_then(normalize::decimal)
            .or_else(|| normalize::decimal(&value))
            .ok_or_else(|| AdapterError::UnexpectedShape {
                operation: "manager_balance".to_string(),
                detail: value.to_string(),
            })
    }
}
