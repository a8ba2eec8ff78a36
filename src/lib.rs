//! # DeepBook Bot
//!
//! A trading client for DeepBook v3 on Sui: balance managers, deposits,
//! resting limit orders, cancellation, and read-only inspection.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: shared newtypes, domain models, configuration (always available)
//! 2. **Probe**: capability discovery, adaptive invocation, result normalization
//! 3. **Transaction draft**: chain-agnostic Move calls with checkpoint/rollback
//! 4. **Collaborators**: `ChainClient` (fullnode) and `IndexerHttp` (REST)
//! 5. **Adapters**: the typed `DeepBookAdapter` and its implementations
//! 6. **High-level client**: `DeepBookBot` with nested sub-clients, and `ops`
//! 7. **CLI harness**: logging, `.env`, outcome printing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use deepbook_bot::prelude::*;
//!
//! let bot = DeepBookBot::connect(Config::from_env()?).await?;
//!
//! let pool = bot.pools().configured().await?;
//! let book = bot.orderbooks().configured_level2(&pool).await?;
//! println!("best bid {:?}", book.best_bid());
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified error types.
pub mod error;

/// Network URL and deployment constants.
pub mod network;

/// Environment configuration with up-front validation.
pub mod config;

// ── Layer 2: Probe ───────────────────────────────────────────────────────────

/// Capability discovery, adaptive invocation, result normalization.
pub mod probe;

// ── Layer 3: Transaction draft ───────────────────────────────────────────────

pub mod tx;

// ── Layer 4: Collaborators ───────────────────────────────────────────────────

/// Signing/client collaborator over the Sui fullnode.
pub mod chain;

/// DeepBook indexer client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 5: Adapters ────────────────────────────────────────────────────────

/// The typed DeepBook interface and its implementations.
pub mod adapter;

// ── Layer 6: High-level client ───────────────────────────────────────────────

/// `DeepBookBot`: the primary entry point.
#[cfg(feature = "http")]
pub mod client;

/// One function per operational script.
#[cfg(feature = "http")]
pub mod ops;

// ── Layer 7: CLI harness ─────────────────────────────────────────────────────

#[cfg(all(feature = "http", feature = "sui"))]
pub mod cli;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{ObjectIdStr, Side};

    // Domain types
    pub use crate::domain::manager::{ManagerRef, ManagerRegistry};
    pub use crate::domain::order::{LimitOrder, LimitOrderBuilder, OrderType, SelfMatching};
    pub use crate::domain::orderbook::{Level2Query, Level2Range, Level2Snapshot};
    pub use crate::domain::pool::{CoinInfo, PoolInfo};

    // Errors
    pub use crate::error::{AdapterError, ChainError, ConfigError, ProbeError, SdkError};

    // Configuration + network
    pub use crate::config::{AdapterKind, Config, DeepBookIds};
    pub use crate::network::Network;

    // Probe
    pub use crate::probe::{
        AttemptPlan, AttemptReport, CapabilityQuery, ExecutionSummary, MethodTable, Surface,
        UnitsReport, WorkUnit,
    };

    // Transaction draft + collaborators
    pub use crate::chain::ChainClient;
    pub use crate::tx::DraftTransaction;

    // Adapters
    pub use crate::adapter::{DeepBookAdapter, Facade, MoveCallAdapter, ProbingAdapter, Staged};

    // High-level client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        DeepBookBot, DeepBookBotBuilder, ManagersClient, OrderbooksClient, OrdersClient,
        PoolsClient, Submitted,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};
}
