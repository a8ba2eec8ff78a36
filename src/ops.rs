//! Operational scripts as library functions.
//!
//! Each function runs one script against a [`DeepBookBot`] and returns a
//! serializable outcome. Anything that submits a transaction stops at a
//! non-`success` status: follow-up reads only run after a confirmed success.

use crate::adapter::{probing, Facade, Staged};
use crate::chain::ObjectSummary;
use crate::client::{DeepBookBot, Submitted};
use crate::domain::manager::ManagerRef;
use crate::domain::order::guard::{assert_trading_allowed, log_safety, resting_bid};
use crate::domain::order::LimitOrder;
use crate::domain::orderbook::Level2Snapshot;
use crate::domain::pool::{CoinInfo, PoolInfo, SUI_COIN_TYPE};
use crate::error::SdkError;
use crate::network::Network;
use crate::probe::{callable_members, normalize, ExecutionSummary, Surface, UnitsReport, WorkUnit};
use crate::shared::{ObjectIdStr, Side};
use crate::tx::DraftTransaction;

use regex::RegexBuilder;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Default multiplier for `place_one_order`.
pub const ONE_ORDER_MULT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Default multiplier for `place_bad_bid`.
pub const BAD_BID_MULT: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Pause before reading balances back after a deposit.
pub const BALANCE_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Member names `inspect_sdk` highlights.
pub const TRADING_MEMBER_PATTERN: &str = "order|cancel|place|bid|ask|limit|market";

pub const NO_OPEN_ORDERS: &str = "No open orders to cancel.";

// ── Shared helpers ──────────────────────────────────────────────────────────

/// Submit `tx`, unless the adapter already executed on its own and left
/// nothing to submit.
///
/// Every result the adapter executed on its own is checked first; a failed
/// one stops the run before anything else is submitted.
async fn settle(bot: &DeepBookBot, tx: &DraftTransaction, staged: &[Staged]) -> Result<Submitted, SdkError> {
    let mut last_executed = None;
    for response in staged.iter().filter_map(|s| match s {
        Staged::Executed { response } => Some(response),
        Staged::Appended { .. } => None,
    }) {
        let summary = ExecutionSummary::from_value(response).ensure_success()?;
        tracing::info!(digest = %summary.digest, "Adapter executed a transaction itself");
        last_executed = Some(Submitted {
            summary,
            response: response.clone(),
        });
    }

    match last_executed {
        Some(submitted) if tx.is_empty() => Ok(submitted),
        _ => bot.submit(tx).await,
    }
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Order fields as reported in outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub pool: String,
    pub manager: ManagerRef,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub client_order_id: u64,
    pub pay_with_deep: bool,
}

impl From<&LimitOrder> for OrderSummary {
    fn from(order: &LimitOrder) -> Self {
        Self {
            pool: order.pool.key.clone(),
            manager: order.manager.clone(),
            side: order.side,
            price: order.price,
            quantity: order.quantity,
            client_order_id: order.client_order_id,
            pay_with_deep: order.pay_with_deep,
        }
    }
}

// ── l2_snapshot ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct L2SnapshotOutcome {
    pub address: ObjectIdStr,
    pub network: Network,
    pub snapshot: Level2Snapshot,
}

/// Read-only level-2 snapshot of `POOL_KEY`.
pub async fn l2_snapshot(bot: &DeepBookBot) -> Result<L2SnapshotOutcome, SdkError> {
    let config = bot.config();
    tracing::info!(address = %bot.address(), network = %config.network, "Connected");

    let pool = bot.pools().configured().await?;
    let snapshot = bot.orderbooks().configured_level2(&pool).await?;
    tracing::info!(
        pool = %pool.key,
        bids = snapshot.bids.len(),
        asks = snapshot.asks.as_ref().map_or(0, |a| a.len()),
        "Level2 snapshot"
    );

    Ok(L2SnapshotOutcome {
        address: bot.address().clone(),
        network: config.network,
        snapshot,
    })
}

// ── create_manager ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CreateManagerOutcome {
    pub digest: String,
    pub staged: Staged,
    pub balance_manager_id: Option<String>,
    /// Every change, when no balance manager could be recognized.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub object_changes: Vec<Value>,
}

/// Create and share a new balance manager.
pub async fn create_manager(bot: &DeepBookBot) -> Result<CreateManagerOutcome, SdkError> {
    tracing::info!(owner = %bot.address(), network = %bot.config().network, "Creating BalanceManager");

    let mut tx = DraftTransaction::new();
    let staged = bot.managers().create(&mut tx).await?;
    tracing::info!(?staged, "Built transaction");

    let submitted = settle(bot, &tx, std::slice::from_ref(&staged)).await?;
    let changes = submitted.summary.object_changes;
    let balance_manager_id = normalize::created_balance_manager_id(&changes);

    match &balance_manager_id {
        Some(id) => {
            tracing::info!(bm_id = %id, "BalanceManager created");
            tracing::info!("Set BALANCE_MANAGER_ID={} in your .env", id);
        }
        None => {
            let types: Vec<Value> = changes
                .iter()
                .filter(|c| c.get("objectType").is_some())
                .map(|c| {
                    serde_json::json!({
                        "type": c.get("type"),
                        "objectType": c.get("objectType"),
                        "objectId": c.get("objectId"),
                    })
                })
                .collect();
            tracing::warn!(object_change_types = %serde_json::Value::Array(types), "No BalanceManager in object changes; inspect the types above");
        }
    }

    Ok(CreateManagerOutcome {
        digest: submitted.summary.digest,
        staged,
        object_changes: if balance_manager_id.is_some() { Vec::new() } else { changes },
        balance_manager_id,
    })
}

// ── deposit ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DepositLine {
    pub coin: String,
    pub amount: Decimal,
    pub staged: Staged,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceLine {
    pub coin: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepositOutcome {
    pub digest: String,
    pub manager: ManagerRef,
    pub deposits: Vec<DepositLine>,
    /// Balances read back after the deposit; unreadable coins are omitted.
    pub balances: Vec<BalanceLine>,
}

/// Deposit `DEPOSIT_BASE` / `DEPOSIT_QUOTE` into the configured manager.
pub async fn deposit(bot: &DeepBookBot) -> Result<DepositOutcome, SdkError> {
    let config = bot.config();
    let manager = bot.managers().configured()?;
    tracing::info!(owner = %bot.address(), manager = %manager.id, network = %config.network, "Depositing into BalanceManager");

    let gas = bot.chain().get_coins(bot.address(), SUI_COIN_TYPE).await?;
    if gas.is_empty() {
        return Err(SdkError::Validation("No SUI coins found for gas. Use faucet.".to_string()));
    }

    let pool = bot.pools().configured().await?;
    let mut requested: Vec<(CoinInfo, Decimal)> = Vec::new();
    if let Some(amount) = config.deposit_base {
        requested.push((bot.pools().coin(&config.base_coin, &pool)?, amount));
    }
    if let Some(amount) = config.deposit_quote {
        requested.push((bot.pools().coin(&config.quote_coin, &pool)?, amount));
    }
    if requested.is_empty() {
        return Err(SdkError::Validation(
            "Nothing to deposit. Set DEPOSIT_BASE and/or DEPOSIT_QUOTE".to_string(),
        ));
    }

    let mut tx = DraftTransaction::new();
    let mut deposits = Vec::with_capacity(requested.len());
    for (coin, amount) in &requested {
        let staged = bot.managers().deposit(&mut tx, &manager, coin, *amount).await?;
        tracing::info!(coin = %coin.symbol, amount = %amount, ?staged, "Staged deposit");
        deposits.push(DepositLine {
            coin: coin.symbol.clone(),
            amount: *amount,
            staged,
        });
    }

    let staged: Vec<Staged> = deposits.iter().map(|d| d.staged.clone()).collect();
    let submitted = settle(bot, &tx, &staged).await?;
    tracing::info!(digest = %submitted.summary.digest, "Deposits executed");

    tokio::time::sleep(BALANCE_SETTLE_DELAY).await;
    let mut balances = Vec::new();
    for (coin, _) in &requested {
        match bot.managers().balance(&manager, coin).await {
            Ok(balance) => balances.push(BalanceLine {
                coin: coin.symbol.clone(),
                balance,
            }),
            Err(e) => tracing::warn!(coin = %coin.symbol, error = %e, "Could not read manager balance (ok for now)"),
        }
    }
    tracing::info!(?balances, "BalanceManager balances");

    Ok(DepositOutcome {
        digest: submitted.summary.digest,
        manager,
        deposits,
        balances,
    })
}

// ── register_manager ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RegisterOutcome {
    pub digest: String,
    pub manager: ManagerRef,
    pub staged: Staged,
}

/// Register the configured manager in the DeepBook registry.
pub async fn register_manager(bot: &DeepBookBot) -> Result<RegisterOutcome, SdkError> {
    let manager = bot.managers().configured()?;
    tracing::warn!(owner = %bot.address(), manager = %manager.label, id = %manager.id, "Registering BalanceManager");

    let mut tx = DraftTransaction::new();
    let staged = bot.managers().register(&mut tx, &manager).await?;
    tracing::info!(?staged, "Built registerBalanceManager tx");

    let submitted = settle(bot, &tx, std::slice::from_ref(&staged)).await?;
    tracing::info!(digest = %submitted.summary.digest, "Registered BalanceManager");

    Ok(RegisterOutcome {
        digest: submitted.summary.digest,
        manager,
        staged,
    })
}

// ── register_pool ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPoolOutcome {
    pub digest: String,
    pub pool: String,
    pub manager: ManagerRef,
    pub staged: Staged,
}

/// Register `POOL_KEY` for the configured manager. One-time per pool.
pub async fn register_pool(bot: &DeepBookBot) -> Result<RegisterPoolOutcome, SdkError> {
    let manager = bot.managers().configured()?;
    let pool = bot.pools().configured().await?;
    tracing::warn!(pool = %pool.key, manager = %manager.label, id = %manager.id, "Registering pool for balance manager (one-time)");

    let mut tx = DraftTransaction::new();
    let staged = bot.managers().register_pool(&mut tx, &pool, &manager).await?;
    tracing::info!(?staged, "Built registerPool tx");

    let submitted = settle(bot, &tx, std::slice::from_ref(&staged)).await?;
    tracing::info!(digest = %submitted.summary.digest, status = ?submitted.summary.status, "registerPool tx result");

    Ok(RegisterPoolOutcome {
        digest: submitted.summary.digest,
        pool: pool.key,
        manager,
        staged,
    })
}

// ── place_one_order / place_bad_bid ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderOutcome {
    pub digest: String,
    pub reference_price: Decimal,
    pub order: OrderSummary,
    pub staged: Staged,
    /// Open orders after placement; `None` when the read failed.
    pub open_orders: Option<Vec<String>>,
}

struct RestingBid {
    reference: Decimal,
    multiplier: Decimal,
    client_order_id: u64,
    pay_with_deep: bool,
}

async fn place_resting_bid(
    bot: &DeepBookBot,
    pool: PoolInfo,
    manager: ManagerRef,
    bid: RestingBid,
) -> Result<PlaceOrderOutcome, SdkError> {
    let config = bot.config();
    let (price, quantity) = resting_bid(bid.reference, bid.multiplier, config.max_order_usd)?;

    let order = LimitOrder::builder()
        .pool(pool)
        .manager(manager)
        .bid()
        .price(price)
        .quantity(quantity)
        .client_order_id(bid.client_order_id)
        .pay_with_deep(bid.pay_with_deep)
        .build()
        .map_err(SdkError::Validation)?;
    tracing::warn!(
        pool = %order.pool.key,
        reference = %bid.reference,
        price = %price,
        quantity = %quantity,
        client_order_id = order.client_order_id,
        "Placing resting bid far below the market"
    );

    let mut tx = DraftTransaction::new();
    let staged = bot.orders().place_limit(&mut tx, &order).await?;
    tracing::info!(?staged, "Built limit order tx");

    let submitted = settle(bot, &tx, std::slice::from_ref(&staged)).await?;
    tracing::info!(digest = %submitted.summary.digest, status = ?submitted.summary.status, events = submitted.summary.event_count, "Order tx executed");

    let open_orders = match bot.orders().open(&order.pool, &order.manager).await {
        Ok(ids) => {
            tracing::info!(open_count = ids.len(), open = ?ids, "Open orders");
            Some(ids)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not read open orders (order may still be placed)");
            None
        }
    };

    Ok(PlaceOrderOutcome {
        digest: submitted.summary.digest,
        reference_price: bid.reference,
        order: OrderSummary::from(&order),
        staged,
        open_orders,
    })
}

/// Resting bid at best bid × `BAD_BID_MULT` (default 0.5).
pub async fn place_one_order(bot: &DeepBookBot) -> Result<PlaceOrderOutcome, SdkError> {
    let config = bot.config();
    assert_trading_allowed(config.allow_trading, config.max_order_usd)?;
    log_safety(config);

    let manager = bot.managers().configured()?;
    let pool = bot.pools().configured().await?;
    let best_bid = bot.orderbooks().best_bid(&pool).await?.ok_or_else(|| {
        SdkError::Validation("Could not read best bid (book may be empty, or POOL_KEY wrong).".to_string())
    })?;

    let bid = RestingBid {
        reference: best_bid,
        multiplier: config.bad_bid_mult.unwrap_or(ONE_ORDER_MULT),
        client_order_id: config.client_order_id.unwrap_or_else(now_millis),
        pay_with_deep: false,
    };
    place_resting_bid(bot, pool, manager, bid).await
}

/// Resting bid at mid (or best bid) × `BAD_BID_MULT` (default 0.2), paying
/// fees in DEEP.
pub async fn place_bad_bid(bot: &DeepBookBot) -> Result<PlaceOrderOutcome, SdkError> {
    let config = bot.config();
    assert_trading_allowed(config.allow_trading, config.max_order_usd)?;
    log_safety(config);

    let manager = bot.managers().configured()?;
    let pool = bot.pools().configured().await?;
    let reference = bot.orderbooks().reference_price(&pool).await?.ok_or_else(|| {
        SdkError::Validation(
            "Could not read best bid/ask (book may be empty, or POOL_KEY wrong).".to_string(),
        )
    })?;

    let bid = RestingBid {
        reference,
        multiplier: config.bad_bid_mult.unwrap_or(BAD_BID_MULT),
        client_order_id: config.client_order_id.unwrap_or_else(now_millis),
        pay_with_deep: true,
    };
    place_resting_bid(bot, pool, manager, bid).await
}

// ── cancel_all ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderIdSource {
    /// `ORDER_IDS`.
    Env,
    OpenOrders,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelOutcome {
    /// `None` when there was nothing to cancel.
    pub digest: Option<String>,
    pub source: OrderIdSource,
    pub order_ids: Vec<String>,
    pub report: UnitsReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The cancellation work units for `order_ids`: one unit per id, four
/// argument shapes each.
pub fn cancel_plan(pool: &PoolInfo, manager: &ManagerRef, order_ids: &[String]) -> Vec<WorkUnit> {
    probing::cancel_units(&pool.key, manager.id.as_str(), order_ids)
}

/// Cancel `ORDER_IDS`, or every open order of the configured manager.
pub async fn cancel_all(bot: &DeepBookBot) -> Result<CancelOutcome, SdkError> {
    let config = bot.config();
    let manager = bot.managers().configured()?;
    let pool = bot.pools().configured().await?;

    let (source, order_ids) = match config.order_ids.as_ref().filter(|ids| !ids.is_empty()) {
        Some(ids) => {
            tracing::info!(count = ids.len(), order_ids = ?ids, "Using ORDER_IDS from .env");
            (OrderIdSource::Env, ids.clone())
        }
        None => match bot.orders().open(&pool, &manager).await {
            Ok(ids) => {
                tracing::info!(count = ids.len(), order_ids = ?ids, "Fetched open orders");
                (OrderIdSource::OpenOrders, ids)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Could not read open orders. As a fallback, set ORDER_IDS=<id1,id2,...> in .env"
                );
                return Err(e);
            }
        },
    };

    if order_ids.is_empty() {
        tracing::info!("{}", NO_OPEN_ORDERS);
        return Ok(CancelOutcome {
            digest: None,
            source,
            order_ids,
            report: UnitsReport::default(),
            message: Some(NO_OPEN_ORDERS.to_string()),
        });
    }

    let mut tx = DraftTransaction::new();
    let report = match bot.orders().cancel(&mut tx, &pool, &manager, &order_ids).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "All cancel signatures failed");
            return Err(e);
        }
    };
    if report.failed_count() > 0 {
        tracing::warn!(
            failed = report.failed_count(),
            staged = report.succeeded_count(),
            "Some cancels could not be staged; submitting the rest"
        );
    }

    tracing::warn!(count = report.succeeded_count(), "Executing cancel tx");
    let submitted = bot.submit(&tx).await?;
    tracing::info!(digest = %submitted.summary.digest, "Cancel tx executed");

    Ok(CancelOutcome {
        digest: Some(submitted.summary.digest),
        source,
        order_ids,
        report,
        message: None,
    })
}

// ── inspect_manager ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ManagerInspection {
    pub manager: ManagerRef,
    pub object: ObjectSummary,
}

/// Existence, type and owner of the configured manager.
pub async fn inspect_manager(bot: &DeepBookBot) -> Result<ManagerInspection, SdkError> {
    let manager = bot.managers().configured()?;
    tracing::info!(label = %manager.label, id = %manager.id, "Inspecting BalanceManager");
    let object = bot.managers().inspect(&manager).await?;
    tracing::info!(object_type = ?object.object_type, owner = %object.owner, "Manager object exists");
    Ok(ManagerInspection { manager, object })
}

// ── inspect_tx ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TxInspection {
    pub digest: String,
    pub summary: ExecutionSummary,
    pub events: Value,
    pub object_changes: Value,
}

/// Effects, events and object changes of `digest`.
pub async fn inspect_tx(bot: &DeepBookBot, digest: &str) -> Result<TxInspection, SdkError> {
    let digest = digest.trim();
    if digest.is_empty() {
        return Err(SdkError::Validation("Usage: inspect_tx <digest>".to_string()));
    }
    let response = bot.chain().get_transaction(digest).await?;
    let summary = ExecutionSummary::from_value(&response);
    tracing::info!(digest = %summary.digest, status = ?summary.status, events = summary.event_count, "Transaction");

    Ok(TxInspection {
        digest: digest.to_string(),
        summary,
        events: response.get("events").cloned().unwrap_or(Value::Null),
        object_changes: response.get("objectChanges").cloned().unwrap_or(Value::Null),
    })
}

// ── inspect_sdk ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SurfaceListing {
    pub name: String,
    /// Callable members, sorted.
    pub members: Vec<String>,
    /// Members matching [`TRADING_MEMBER_PATTERN`].
    pub matched: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SdkInspection {
    pub surfaces: Vec<SurfaceListing>,
}

pub fn list_surface(surface: &dyn Surface) -> Result<SurfaceListing, SdkError> {
    let pattern = RegexBuilder::new(TRADING_MEMBER_PATTERN)
        .case_insensitive(true)
        .build()
        .map_err(|e| SdkError::Other(e.to_string()))?;
    let members = callable_members(surface);
    let matched = members
        .iter()
        .filter(|m| pattern.is_match(m))
        .cloned()
        .collect();
    Ok(SurfaceListing {
        name: surface.name().to_string(),
        members,
        matched,
    })
}

/// Sorted member lists of the facade surfaces.
pub fn inspect_sdk(facade: &Facade) -> Result<SdkInspection, SdkError> {
    let surfaces = [facade.deep_book(), facade.balance_manager()]
        .iter()
        .map(|s| list_surface(s.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    for s in &surfaces {
        tracing::info!(surface = %s.name, members = s.members.len(), matched = ?s.matched, "Surface");
    }
    Ok(SdkInspection { surfaces })
}
