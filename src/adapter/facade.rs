//! A DeepBook client surface whose operations are reachable only by name.
//!
//! [`Facade`] exposes `deepBook` and `balanceManager` method tables, both
//! inheriting the read methods of a `DeepBookClient` base table. Every
//! operation validates its positional arguments strictly and delegates to a
//! [`MoveCallAdapter`], so the probing adapter has real shapes to discover.
//!
//! Pools are addressed by key or id and managers by label or id, resolved
//! against the tables the facade was built with.

use super::{DeepBookAdapter, MoveCallAdapter};
use crate::domain::manager::{ManagerRef, ManagerRegistry};
use crate::domain::order::LimitOrder;
use crate::domain::orderbook::Level2Query;
use crate::domain::pool::{CoinInfo, PoolInfo};
use crate::error::CallError;
use crate::probe::{Arg, MethodTable, Operation, Returned};
use crate::shared::{ObjectIdStr, Side};
use crate::tx::DraftTransaction;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;

// ─── Context ─────────────────────────────────────────────────────────────────

struct Context {
    adapter: Arc<MoveCallAdapter>,
    managers: ManagerRegistry,
    pools: Vec<PoolInfo>,
    coins: Vec<CoinInfo>,
}

impl Context {
    fn pool(&self, arg: &Arg) -> Result<PoolInfo, CallError> {
        let key = string(arg, "pool")?;
        let by_id = ObjectIdStr::parse(key).ok();
        self.pools
            .iter()
            .find(|p| match &by_id {
                Some(id) => &p.pool_id == id,
                None => p.key.eq_ignore_ascii_case(key),
            })
            .cloned()
            .ok_or_else(|| CallError::new(format!("Pool {} not found", key)))
    }

    fn manager(&self, arg: &Arg) -> Result<ManagerRef, CallError> {
        let key = string(arg, "manager")?;
        self.managers
            .resolve(key)
            .ok_or_else(|| CallError::new(format!("Balance manager {} not found", key)))
    }

    fn coin(&self, arg: &Arg) -> Result<CoinInfo, CallError> {
        let key = string(arg, "coin")?;
        self.coins
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(key) || c.coin_type == key)
            .cloned()
            .ok_or_else(|| CallError::new(format!("Coin {} not found", key)))
    }
}

fn string<'a>(arg: &'a Arg, what: &str) -> Result<&'a str, CallError> {
    arg.as_str()
        .ok_or_else(|| CallError::new(format!("{} must be a string, got {:?}", what, arg)))
}

fn number(arg: &Arg, what: &str) -> Result<Decimal, CallError> {
    arg.as_num()
        .ok_or_else(|| CallError::new(format!("{} must be a number, got {:?}", what, arg)))
}

fn boolean(arg: &Arg, what: &str) -> Result<bool, CallError> {
    arg.as_bool()
        .ok_or_else(|| CallError::new(format!("{} must be a boolean, got {:?}", what, arg)))
}

fn expect_tx(arg: &Arg) -> Result<(), CallError> {
    if arg.is_tx() {
        Ok(())
    } else {
        Err(CallError::new(format!("expected a transaction, got {:?}", arg)))
    }
}

fn expect_len(args: &[Arg], allowed: &[usize], method: &str) -> Result<(), CallError> {
    if allowed.contains(&args.len()) {
        Ok(())
    } else {
        Err(CallError::new(format!(
            "{} takes {:?} arguments, got {}",
            method,
            allowed,
            args.len()
        )))
    }
}

fn to_value<T: serde::Serialize>(v: &T) -> Result<Value, CallError> {
    serde_json::to_value(v).map_err(|e| CallError::new(e.to_string()))
}

// ─── Methods ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    PlaceLimitOrder,
    CancelOrder,
    CancelAllOrders,
    RegisterPool,
    GetLevel2Range,
    MidPrice,
    AccountOpenOrders,
    CheckManagerBalance,
    CreateAndShareBalanceManager,
    DepositIntoManager,
    RegisterBalanceManager,
}

impl Method {
    fn name(&self) -> &'static str {
        match self {
            Method::PlaceLimitOrder => "placeLimitOrder",
            Method::CancelOrder => "cancelOrder",
            Method::CancelAllOrders => "cancelAllOrders",
            Method::RegisterPool => "registerPool",
            Method::GetLevel2Range => "getLevel2Range",
            Method::MidPrice => "midPrice",
            Method::AccountOpenOrders => "accountOpenOrders",
            Method::CheckManagerBalance => "checkManagerBalance",
            Method::CreateAndShareBalanceManager => "createAndShareBalanceManager",
            Method::DepositIntoManager => "depositIntoManager",
            Method::RegisterBalanceManager => "registerBalanceManager",
        }
    }

    /// Declared parameters; optional trailing ones are not counted.
    fn arity(&self) -> usize {
        match self {
            Method::PlaceLimitOrder => 6,
            Method::CancelOrder | Method::GetLevel2Range => 4,
            Method::CancelAllOrders
            | Method::RegisterPool
            | Method::DepositIntoManager
            | Method::RegisterBalanceManager => 3,
            Method::MidPrice => 1,
            Method::AccountOpenOrders | Method::CheckManagerBalance => 2,
            Method::CreateAndShareBalanceManager => 0,
        }
    }
}

struct FacadeOp {
    method: Method,
    ctx: Arc<Context>,
}

impl FacadeOp {
    fn new(method: Method, ctx: &Arc<Context>) -> Arc<dyn Operation> {
        Arc::new(Self {
            method,
            ctx: ctx.clone(),
        })
    }

    async fn place_limit_order(&self, tx: &mut DraftTransaction, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[6, 7, 8], self.method.name())?;
        expect_tx(&args[0])?;
        let pool = self.ctx.pool(&args[1])?;
        let manager = self.ctx.manager(&args[2])?;
        let side = if boolean(&args[3], "isBid")? { Side::Bid } else { Side::Ask };
        let price = number(&args[4], "price")?;
        let quantity = number(&args[5], "quantity")?;
        let client_order_id = match args.get(6) {
            Some(arg) => number(arg, "clientOrderId")?
                .to_u64()
                .ok_or_else(|| CallError::new("clientOrderId must fit in u64"))?,
            None => 0,
        };
        let pay_with_deep = match args.get(7) {
            Some(arg) => boolean(arg, "payWithDeep")?,
            None => false,
        };

        let order = LimitOrder::builder()
            .pool(pool)
            .manager(manager)
            .side(side)
            .price(price)
            .quantity(quantity)
            .client_order_id(client_order_id)
            .pay_with_deep(pay_with_deep)
            .build()
            .map_err(CallError::new)?;
        self.ctx.adapter.place_limit_order(tx, &order).await?;
        Ok(Returned::Unit)
    }

    async fn cancel_order(&self, tx: &mut DraftTransaction, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[4], self.method.name())?;
        expect_tx(&args[0])?;
        let pool = self.ctx.pool(&args[1])?;
        let manager = self.ctx.manager(&args[2])?;
        let order_id = string(&args[3], "orderId")?;
        if ObjectIdStr::looks_like(order_id) {
            return Err(CallError::new(format!("orderId {} looks like an object id", order_id)));
        }
        self.ctx
            .adapter
            .cancel_orders(tx, &pool, &manager, &[order_id.to_string()])
            .await?;
        Ok(Returned::Unit)
    }

    async fn cancel_all_orders(&self, tx: &mut DraftTransaction, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[3], self.method.name())?;
        expect_tx(&args[0])?;
        let pool = self.ctx.pool(&args[1])?;
        let manager = self.ctx.manager(&args[2])?;
        self.ctx.adapter.cancel_all_orders(tx, &pool, &manager);
        Ok(Returned::Unit)
    }

    /// Curried: validates `(txb, pool, manager)` and returns a builder that
    /// stages the registration when invoked with the draft.
    fn register_pool(&self, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[3], self.method.name())?;
        expect_tx(&args[0])?;
        let pool = self.ctx.pool(&args[1])?;
        let manager = self.ctx.manager(&args[2])?;
        Ok(Returned::Builder(Arc::new(Deferred {
            ctx: self.ctx.clone(),
            request: Request::RegisterPool { pool, manager },
        })))
    }

    async fn level2_range(&self, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[4], self.method.name())?;
        let pool = self.ctx.pool(&args[0])?;
        let levels = number(&args[2], "levels")?
            .to_u32()
            .ok_or_else(|| CallError::new("levels must fit in u32"))?;
        let query = Level2Query {
            tick_size: number(&args[1], "tickSize")?,
            levels,
            include_asks: boolean(&args[3], "includeAsks")?,
        };
        let snapshot = self.ctx.adapter.level2(&pool, &query).await?;
        Ok(Returned::Value(to_value(&snapshot)?))
    }

    async fn mid_price(&self, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[1], self.method.name())?;
        let pool = self.ctx.pool(&args[0])?;
        let mid = self.ctx.adapter.mid_price(&pool).await?;
        Ok(Returned::Value(to_value(&mid)?))
    }

    async fn account_open_orders(&self, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[2], self.method.name())?;
        let pool = self.ctx.pool(&args[0])?;
        let manager = self.ctx.manager(&args[1])?;
        let ids = self.ctx.adapter.open_orders(&pool, &manager).await?;
        Ok(Returned::Value(to_value(&ids)?))
    }

    async fn check_manager_balance(&self, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[2], self.method.name())?;
        let manager = self.ctx.manager(&args[0])?;
        let coin = self.ctx.coin(&args[1])?;
        let balance = self.ctx.adapter.manager_balance(&manager, &coin).await?;
        Ok(Returned::Value(json!({
            "coinType": coin.coin_type,
            "balance": balance.to_string(),
        })))
    }

    fn create_and_share(&self, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[0], self.method.name())?;
        Ok(Returned::Builder(Arc::new(Deferred {
            ctx: self.ctx.clone(),
            request: Request::Create,
        })))
    }

    fn deposit_into_manager(&self, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[3], self.method.name())?;
        let manager = self.ctx.manager(&args[0])?;
        let coin = self.ctx.coin(&args[1])?;
        let amount = number(&args[2], "amount")?;
        Ok(Returned::Builder(Arc::new(Deferred {
            ctx: self.ctx.clone(),
            request: Request::Deposit {
                manager,
                coin,
                amount,
            },
        })))
    }

    async fn register(&self, tx: &mut DraftTransaction, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[3], self.method.name())?;
        expect_tx(&args[0])?;
        let label = string(&args[1], "managerKey")?;
        if ObjectIdStr::looks_like(label) {
            return Err(CallError::new(format!("managerKey must be a label, got {}", label)));
        }
        let id = ObjectIdStr::parse(string(&args[2], "bmObjectId")?).map_err(CallError::new)?;
        if let Some(mapped) = self.ctx.managers.resolve(label) {
            if mapped.id != id {
                return Err(CallError::new(format!(
                    "{} is mapped to {}, not {}",
                    label, mapped.id, id
                )));
            }
        }
        let manager = ManagerRef {
            label: label.to_string(),
            id,
        };
        self.ctx.adapter.register_balance_manager(tx, &manager).await?;
        Ok(Returned::Unit)
    }
}

#[async_trait]
impl Operation for FacadeOp {
    fn arity(&self) -> usize {
        self.method.arity()
    }

    async fn invoke(&self, tx: &mut DraftTransaction, args: &[Arg]) -> Result<Returned, CallError> {
        match self.method {
            Method::PlaceLimitOrder => self.place_limit_order(tx, args).await,
            Method::CancelOrder => self.cancel_order(tx, args).await,
            Method::CancelAllOrders => self.cancel_all_orders(tx, args).await,
            Method::RegisterPool => self.register_pool(args),
            Method::GetLevel2Range => self.level2_range(args).await,
            Method::MidPrice => self.mid_price(args).await,
            Method::AccountOpenOrders => self.account_open_orders(args).await,
            Method::CheckManagerBalance => self.check_manager_balance(args).await,
            Method::CreateAndShareBalanceManager => self.create_and_share(args),
            Method::DepositIntoManager => self.deposit_into_manager(args),
            Method::RegisterBalanceManager => self.register(tx, args).await,
        }
    }
}

// ─── Deferred builders ───────────────────────────────────────────────────────

enum Request {
    Create,
    Deposit {
        manager: ManagerRef,
        coin: CoinInfo,
        amount: Decimal,
    },
    RegisterPool {
        pool: PoolInfo,
        manager: ManagerRef,
    },
}

/// Returned by the curried helpers; appends its steps when invoked
/// with the draft.
struct Deferred {
    ctx: Arc<Context>,
    request: Request,
}

#[async_trait]
impl Operation for Deferred {
    fn arity(&self) -> usize {
        1
    }

    async fn invoke(&self, tx: &mut DraftTransaction, args: &[Arg]) -> Result<Returned, CallError> {
        expect_len(args, &[1], "builder")?;
        expect_tx(&args[0])?;
        match &self.request {
            Request::Create => self.ctx.adapter.create_balance_manager(tx).await?,
            Request::Deposit {
                manager,
                coin,
                amount,
            } => self.ctx.adapter.deposit(tx, manager, coin, *amount).await?,
            Request::RegisterPool { pool, manager } => {
                self.ctx.adapter.register_pool(tx, pool, manager).await?
            }
        };
        Ok(Returned::Unit)
    }
}

// ─── Facade ──────────────────────────────────────────────────────────────────

/// The reflectable client surfaces.
pub struct Facade {
    deep_book: Arc<MethodTable>,
    balance_manager: Arc<MethodTable>,
}

impl Facade {
    pub fn new(adapter: Arc<MoveCallAdapter>, managers: ManagerRegistry, pools: Vec<PoolInfo>) -> Self {
        let mut coins: Vec<CoinInfo> = Vec::new();
        for coin in pools.iter().flat_map(|p| [&p.base, &p.quote]) {
            if !coins.iter().any(|c| c.coin_type == coin.coin_type) {
                coins.push(coin.clone());
            }
        }
        let package_id = adapter.ids().package_id.to_string();
        let registry_id = adapter.ids().registry_id.to_string();
        let ctx = Arc::new(Context {
            adapter,
            managers,
            pools,
            coins,
        });

        let base = Arc::new(
            MethodTable::new("DeepBookClient")
                .operation("getLevel2Range", FacadeOp::new(Method::GetLevel2Range, &ctx))
                .operation("midPrice", FacadeOp::new(Method::MidPrice, &ctx))
                .operation("accountOpenOrders", FacadeOp::new(Method::AccountOpenOrders, &ctx))
                .operation(
                    "checkManagerBalance",
                    FacadeOp::new(Method::CheckManagerBalance, &ctx),
                )
                .value("packageId", Value::String(package_id)),
        );

        let deep_book = MethodTable::new("deepBook")
            .with_parent(base.clone())
            .operation("placeLimitOrder", FacadeOp::new(Method::PlaceLimitOrder, &ctx))
            .operation("cancelOrder", FacadeOp::new(Method::CancelOrder, &ctx))
            .operation("cancelAllOrders", FacadeOp::new(Method::CancelAllOrders, &ctx))
            .operation("registerPool", FacadeOp::new(Method::RegisterPool, &ctx));

        let balance_manager = MethodTable::new("balanceManager")
            .with_parent(base)
            .operation(
                "createAndShareBalanceManager",
                FacadeOp::new(Method::CreateAndShareBalanceManager, &ctx),
            )
            .operation("depositIntoManager", FacadeOp::new(Method::DepositIntoManager, &ctx))
            .operation(
                "registerBalanceManager",
                FacadeOp::new(Method::RegisterBalanceManager, &ctx),
            )
            .value("registryId", Value::String(registry_id));

        Self {
            deep_book: Arc::new(deep_book),
            balance_manager: Arc::new(balance_manager),
        }
    }

    pub fn deep_book(&self) -> Arc<MethodTable> {
        self.deep_book.clone()
    }

    pub fn balance_manager(&self) -> Arc<MethodTable> {
        self.balance_manager.clone()
    }
}
