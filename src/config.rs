//! Environment configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file with `dotenvy`. Every field is validated up front and all failures are
//! reported together, before any network activity.

use crate::domain::manager::{ManagerRef, ManagerRegistry, DEFAULT_MANAGER_LABEL};
use crate::error::{ConfigError, FieldError, SdkError};
use crate::network::Network;
use crate::shared::ObjectIdStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for `L2_LEVELS`.
pub const MAX_L2_LEVELS: u32 = 200;

// ─── AdapterKind ─────────────────────────────────────────────────────────────

/// Which [`DeepBookAdapter`](crate::adapter::DeepBookAdapter) a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdapterKind {
    /// Typed DeepBook v3 Move calls.
    #[default]
    MoveCall,
    /// Name-pattern discovery over a reflectable SDK surface.
    Probing,
}

impl FromStr for AdapterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "move-call" | "movecall" | "move_call" => Ok(AdapterKind::MoveCall),
            "probing" | "probe" => Ok(AdapterKind::Probing),
            other => Err(format!("expected 'move-call' or 'probing', got '{}'", other)),
        }
    }
}

// ─── Secret ──────────────────────────────────────────────────────────────────

/// A string that never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

// ─── DeepBookIds ─────────────────────────────────────────────────────────────

/// On-chain ids of the DeepBook deployment a run targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepBookIds {
    pub package_id: ObjectIdStr,
    pub registry_id: ObjectIdStr,
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub private_key: Secret,
    pub pool_key: String,
    pub l2_tick_size: Decimal,
    pub l2_levels: u32,
    pub l2_include_asks: bool,
    pub allow_trading: bool,
    pub max_order_usd: Decimal,
    pub order_size_base: Decimal,
    pub base_coin: String,
    pub quote_coin: String,
    pub balance_manager_id: Option<ObjectIdStr>,
    pub balance_manager_key: Option<String>,
    /// Explicit label → id mapping, including the `BALANCE_MANAGER_*` pair.
    pub managers: ManagerRegistry,
    pub adapter: AdapterKind,
    pub rpc_url: String,
    pub indexer_url: String,
    pub deepbook: DeepBookIds,
    pub gas_budget: u64,
    pub rpc_timeout: Duration,

    // Script-scoped settings.
    pub order_ids: Option<Vec<String>>,
    pub bad_bid_mult: Option<Decimal>,
    pub client_order_id: Option<u64>,
    pub deposit_base: Option<Decimal>,
    pub deposit_quote: Option<Decimal>,
}

impl Config {
    /// Load `.env` (or `env_file`) into the environment, then parse it.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        match env_file {
            Some(path) => {
                if let Err(e) = dotenvy::from_path(path) {
                    return Err(ConfigError::Invalid(vec![FieldError::new(
                        "--env-file",
                        format!("{}: {}", path.display(), e),
                    )]));
                }
            }
            None => {
                if let Ok(path) = dotenvy::dotenv() {
                    tracing::debug!(path = %path.display(), "Loaded .env");
                }
            }
        }
        Self::from_env()
    }

    /// Parse from the current process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut p = FieldParser::new(lookup);

        let network = p.parse("SUI_ENV", Network::Testnet, |s| s.parse());
        let private_key = match p.optional("SUI_PRIVATE_KEY") {
            Some(k) => Secret::new(k),
            None => {
                p.fail("SUI_PRIVATE_KEY", "Missing SUI_PRIVATE_KEY");
                Secret::new("")
            }
        };
        let pool_key = p.string("POOL_KEY", "SUI_DBUSDC");
        let l2_tick_size = p.positive_decimal("L2_TICK_SIZE", "0.1");
        let l2_levels = p.parse("L2_LEVELS", 50u32, |s| {
            let n: u32 = s
                .parse()
                .map_err(|_| format!("expected a positive integer, got '{}'", s))?;
            if n == 0 {
                return Err("must be positive".to_string());
            }
            if n > MAX_L2_LEVELS {
                return Err(format!("must be at most {}", MAX_L2_LEVELS));
            }
            Ok(n)
        });
        let l2_include_asks = p.boolean("L2_INCLUDE_ASKS", true);
        let allow_trading = p.boolean("ALLOW_TRADING", false);
        let max_order_usd = p.positive_decimal("MAX_ORDER_USD", "2");
        let order_size_base = p.positive_decimal("ORDER_SIZE_BASE", "0.1");
        let base_coin = p.string("BASE_COIN", "SUI");
        let quote_coin = p.string("QUOTE_COIN", "DBUSDC");

        let balance_manager_id = p.optional_parse("BALANCE_MANAGER_ID", ObjectIdStr::parse);
        let balance_manager_key = p.optional("BALANCE_MANAGER_KEY");
        let mut managers = p
            .optional_parse("BALANCE_MANAGERS", |s| ManagerRegistry::parse(s))
            .unwrap_or_default();
        if let Some(id) = &balance_manager_id {
            let label = balance_manager_key.as_deref().unwrap_or(DEFAULT_MANAGER_LABEL);
            match managers.get(label).filter(|e| *e != id).cloned() {
                Some(existing) => p.fail(
                    "BALANCE_MANAGER_ID",
                    format!("{} is {} in BALANCE_MANAGERS", label, existing),
                ),
                None => managers.insert(label, id.clone()),
            }
        }

        let adapter = p.parse("DEEPBOOK_ADAPTER", AdapterKind::MoveCall, |s| s.parse());
        let rpc_url = p.string("SUI_RPC_URL", network.fullnode_url());
        let indexer_url = p.string("DEEPBOOK_INDEXER_URL", network.indexer_url());
        let package_id = p.object_id("DEEPBOOK_PACKAGE_ID", network.deepbook_package_id());
        let registry_id = p.object_id("DEEPBOOK_REGISTRY_ID", network.deepbook_registry_id());
        let gas_budget = p.parse("GAS_BUDGET", 50_000_000u64, |s| {
            s.parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("expected a positive integer, got '{}'", s))
        });
        let rpc_timeout_secs = p.parse("RPC_TIMEOUT_SECS", 30u64, |s| {
            s.parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("expected a positive integer, got '{}'", s))
        });

        let order_ids = p.optional("ORDER_IDS").map(|s| parse_order_ids(&s));
        let bad_bid_mult = p.optional_parse("BAD_BID_MULT", |s| {
            let m = Decimal::from_str(s).map_err(|_| format!("expected a decimal, got '{}'", s))?;
            if m <= Decimal::ZERO || m >= Decimal::ONE {
                return Err("must be between 0 and 1 (exclusive)".to_string());
            }
            Ok(m)
        });
        let client_order_id = p.optional_parse("CLIENT_ORDER_ID", |s| {
            s.parse::<u64>()
                .map_err(|_| format!("expected an unsigned integer, got '{}'", s))
        });
        let deposit_base = p.optional_parse("DEPOSIT_BASE", positive_decimal);
        let deposit_quote = p.optional_parse("DEPOSIT_QUOTE", positive_decimal);

        p.finish()?;

        Ok(Config {
            network,
            private_key,
            pool_key,
            l2_tick_size,
            l2_levels,
            l2_include_asks,
            allow_trading,
            max_order_usd,
            order_size_base,
            base_coin,
            quote_coin,
            balance_manager_id,
            balance_manager_key,
            managers,
            adapter,
            rpc_url,
            indexer_url,
            deepbook: DeepBookIds {
                package_id,
                registry_id,
            },
            gas_budget,
            rpc_timeout: Duration::from_secs(rpc_timeout_secs),
            order_ids,
            bad_bid_mult,
            client_order_id,
            deposit_base,
            deposit_quote,
        })
    }

    /// The manager this run acts on: the configured key, else the configured
    /// id, else the only mapped entry.
    ///
    /// A configured key that maps to no id selects nothing.
    pub fn manager(&self) -> Option<ManagerRef> {
        if let Some(key) = &self.balance_manager_key {
            return self.managers.resolve(key);
        }
        if let Some(id) = &self.balance_manager_id {
            return self.managers.resolve(id.as_str());
        }
        self.managers.single()
    }

    /// Like [`Config::manager`], but a missing manager is an error.
    pub fn require_manager(&self) -> Result<ManagerRef, SdkError> {
        self.manager().ok_or_else(|| {
            let detail = match &self.balance_manager_key {
                Some(key) => format!(
                    "label '{}' has no id; set BALANCE_MANAGER_ID or BALANCE_MANAGERS",
                    key
                ),
                None => "Set BALANCE_MANAGER_ID in .env (run create_manager first)".to_string(),
            };
            SdkError::Config(ConfigError::Invalid(vec![FieldError::new(
                "BALANCE_MANAGER_ID",
                detail,
            )]))
        })
    }
}

/// Split a comma-separated id list, dropping blanks.
pub fn parse_order_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn positive_decimal(s: &str) -> Result<Decimal, String> {
    let v = Decimal::from_str(s).map_err(|_| format!("expected a decimal, got '{}'", s))?;
    if v <= Decimal::ZERO {
        return Err(format!("must be positive, got {}", v));
    }
    Ok(v)
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("expected true/false, got '{}'", other)),
    }
}

// ─── FieldParser ─────────────────────────────────────────────────────────────

/// Reads fields one by one, substituting defaults on failure and collecting
/// every error for a single report.
struct FieldParser<F> {
    lookup: F,
    errors: Vec<FieldError>,
}

impl<F> FieldParser<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn new(lookup: F) -> Self {
        Self {
            lookup,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Trimmed, non-empty value.
    fn optional(&self, field: &str) -> Option<String> {
        (self.lookup)(field)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, field: &str, default: &str) -> String {
        self.optional(field).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&mut self, field: &str, default: T, f: impl FnOnce(&str) -> Result<T, String>) -> T {
        match self.optional(field) {
            None => default,
            Some(raw) => match f(&raw) {
                Ok(v) => v,
                Err(e) => {
                    self.fail(field, e);
                    default
                }
            },
        }
    }

    fn optional_parse<T>(
        &mut self,
        field: &str,
        f: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        let raw = self.optional(field)?;
        match f(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                self.fail(field, e);
                None
            }
        }
    }

    fn positive_decimal(&mut self, field: &str, default: &str) -> Decimal {
        let fallback = Decimal::from_str(default).unwrap_or(Decimal::ONE);
        self.parse(field, fallback, positive_decimal)
    }

    fn boolean(&mut self, field: &str, default: bool) -> bool {
        self.parse(field, default, parse_bool)
    }

    fn object_id(&mut self, field: &str, default: &str) -> ObjectIdStr {
        let raw = self.string(field, default);
        match ObjectIdStr::parse(&raw) {
            Ok(id) => id,
            Err(e) => {
                self.fail(field, e);
                ObjectIdStr::zero()
            }
        }
    }

    fn finish(self) -> Result<(), ConfigError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(self.errors))
        }
    }
}
