//! The typed DeepBook interface the operations are written against.
//!
//! Write operations append steps to a [`DraftTransaction`] and report how
//! they were staged; reads return normalized domain types. Which
//! implementation a run uses is decided by configuration
//! ([`AdapterKind`]), never by inspecting the SDK at run time.

pub mod facade;
pub mod move_call;
pub mod probing;

pub use facade::Facade;
pub use move_call::MoveCallAdapter;
pub use probing::ProbingAdapter;

use crate::chain::ChainClient;
use crate::config::{AdapterKind, DeepBookIds};
use crate::domain::manager::{ManagerRef, ManagerRegistry};
use crate::domain::order::LimitOrder;
use crate::domain::orderbook::{Level2Query, Level2Snapshot};
use crate::domain::pool::{CoinInfo, PoolInfo};
use crate::error::AdapterError;
use crate::probe::UnitsReport;
use crate::tx::DraftTransaction;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// How a write operation was staged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "staged", rename_all = "snake_case")]
pub enum Staged {
    /// Steps were appended to the draft; `via` names the shape that worked.
    Appended { via: String },
    /// The operation submitted on its own; this is the node's response.
    Executed { response: Value },
}

impl Staged {
    pub fn appended(via: &str) -> Self {
        Staged::Appended {
            via: via.to_string(),
        }
    }
}

#[async_trait]
pub trait DeepBookAdapter: Send + Sync {
    /// Short name for logs and outcomes.
    fn name(&self) -> &'static str;

    async fn create_balance_manager(&self, tx: &mut DraftTransaction) -> Result<Staged, AdapterError>;

    async fn deposit(
        &self,
        tx: &mut DraftTransaction,
        manager: &ManagerRef,
        coin: &CoinInfo,
        amount: Decimal,
    ) -> Result<Staged, AdapterError>;

    async fn register_balance_manager(
        &self,
        tx: &mut DraftTransaction,
        manager: &ManagerRef,
    ) -> Result<Staged, AdapterError>;

    /// Register `pool` with `manager`; needed once per pool before trading.
    async fn register_pool(
        &self,
        tx: &mut DraftTransaction,
        pool: &PoolInfo,
        manager: &ManagerRef,
    ) -> Result<Staged, AdapterError>;

    async fn place_limit_order(
        &self,
        tx: &mut DraftTransaction,
        order: &LimitOrder,
    ) -> Result<Staged, AdapterError>;

    /// Cancel each id as an independent unit. Fails only when every unit
    /// failed.
    async fn cancel_orders(
        &self,
        tx: &mut DraftTransaction,
        pool: &PoolInfo,
        manager: &ManagerRef,
        order_ids: &[String],
    ) -> Result<UnitsReport, AdapterError>;

    async fn level2(&self, pool: &PoolInfo, query: &Level2Query) -> Result<Level2Snapshot, AdapterError>;

    /// `None` when the book has no mid price (e.g. one side is empty).
    async fn mid_price(&self, pool: &PoolInfo) -> Result<Option<Decimal>, AdapterError>;

    async fn open_orders(&self, pool: &PoolInfo, manager: &ManagerRef) -> Result<Vec<String>, AdapterError>;

    async fn manager_balance(&self, manager: &ManagerRef, coin: &CoinInfo) -> Result<Decimal, AdapterError>;
}

/// Build the adapter `kind` selects.
pub fn select(
    kind: AdapterKind,
    chain: Arc<dyn ChainClient>,
    ids: DeepBookIds,
    managers: ManagerRegistry,
    known_pools: Vec<PoolInfo>,
) -> Arc<dyn DeepBookAdapter> {
    let owner = chain.address().clone();
    let move_call = Arc::new(MoveCallAdapter::new(chain, ids));
    match kind {
        AdapterKind::MoveCall => move_call,
        AdapterKind::Probing => {
            let facade = Facade::new(move_call, managers, known_pools);
            Arc::new(ProbingAdapter::new(
                facade.deep_book(),
                facade.balance_manager(),
                owner,
            ))
        }
    }
}
