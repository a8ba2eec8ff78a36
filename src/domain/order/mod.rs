//! Order domain: DeepBook limit orders and the trading guards around them.

#[cfg(feature = "http")]
pub mod client;
pub mod guard;

use crate::domain::manager::ManagerRef;
use crate::domain::pool::PoolInfo;
use crate::shared::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Expiration DeepBook treats as "never".
pub const MAX_TIMESTAMP: u64 = 1_844_674_407_370_955_161;

// ─── OrderType ───────────────────────────────────────────────────────────────

/// Execution restriction of a limit order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    NoRestriction,
    ImmediateOrCancel,
    FillOrKill,
    PostOnly,
}

impl OrderType {
    pub fn as_u8(&self) -> u8 {
        match self {
            OrderType::NoRestriction => 0,
            OrderType::ImmediateOrCancel => 1,
            OrderType::FillOrKill => 2,
            OrderType::PostOnly => 3,
        }
    }
}

// ─── SelfMatching ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfMatching {
    #[default]
    Allowed,
    CancelTaker,
    CancelMaker,
}

impl SelfMatching {
    pub fn as_u8(&self) -> u8 {
        match self {
            SelfMatching::Allowed => 0,
            SelfMatching::CancelTaker => 1,
            SelfMatching::CancelMaker => 2,
        }
    }
}

// ─── LimitOrder ──────────────────────────────────────────────────────────────

/// A validated limit order, in human units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrder {
    pub pool: PoolInfo,
    pub manager: ManagerRef,
    pub client_order_id: u64,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub order_type: OrderType,
    pub self_matching: SelfMatching,
    pub pay_with_deep: bool,
    pub expiration: u64,
}

impl LimitOrder {
    pub fn builder() -> LimitOrderBuilder {
        LimitOrderBuilder::default()
    }
}

/// Fluent builder for [`LimitOrder`].
///
/// ```rust,ignore
/// let order = LimitOrder::builder()
///     .pool(pool)
///     .manager(manager)
///     .bid()
///     .price(price)
///     .quantity(qty)
///     .client_order_id(42)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct LimitOrderBuilder {
    pool: Option<PoolInfo>,
    manager: Option<ManagerRef>,
    client_order_id: Option<u64>,
    side: Option<Side>,
    price: Option<Decimal>,
    quantity: Option<Decimal>,
    order_type: OrderType,
    self_matching: SelfMatching,
    pay_with_deep: bool,
    expiration: Option<u64>,
}

impl LimitOrderBuilder {
    pub fn pool(mut self, pool: PoolInfo) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn manager(mut self, manager: ManagerRef) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Caller-chosen id echoed back in order events. Defaults to 0.
    pub fn client_order_id(mut self, id: u64) -> Self {
        self.client_order_id = Some(id);
        self
    }

    pub fn bid(mut self) -> Self {
        self.side = Some(Side::Bid);
        self
    }

    pub fn ask(mut self) -> Self {
        self.side = Some(Side::Ask);
        self
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    pub fn self_matching(mut self, option: SelfMatching) -> Self {
        self.self_matching = option;
        self
    }

    /// Pay trading fees in DEEP instead of the input coin.
    pub fn pay_with_deep(mut self, yes: bool) -> Self {
        self.pay_with_deep = yes;
        self
    }

    /// Expiration in milliseconds since epoch. Defaults to [`MAX_TIMESTAMP`].
    pub fn expiration(mut self, ts_ms: u64) -> Self {
        self.expiration = Some(ts_ms);
        self
    }

    pub fn build(self) -> Result<LimitOrder, String> {
        let pool = self.pool.ok_or("pool is required")?;
        let manager = self.manager.ok_or("manager is required")?;
        let side = self.side.ok_or("side is required")?;
        let price = self.price.ok_or("price is required")?;
        let quantity = self.quantity.ok_or("quantity is required")?;

        if price <= Decimal::ZERO {
            return Err(format!("price must be positive, got {}", price));
        }
        if quantity <= Decimal::ZERO {
            return Err(format!("quantity must be positive, got {}", quantity));
        }

        Ok(LimitOrder {
            pool,
            manager,
            client_order_id: self.client_order_id.unwrap_or(0),
            side,
            price,
            quantity,
            order_type: self.order_type,
            self_matching: self.self_matching,
            pay_with_deep: self.pay_with_deep,
            expiration: self.expiration.unwrap_or(MAX_TIMESTAMP),
        })
    }
}
