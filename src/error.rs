//! Unified error types.

use crate::probe::invoke::{AttemptReport, UnitsReport};
use crate::shared::scaling::ScalingError;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Probe(#[from] ProbeError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The transaction was submitted but its effects report a failure.
    #[error("Transaction {digest} failed: {error}")]
    ExecutionFailed { digest: String, error: String },

    #[error("{0}")]
    TradingDisabled(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

// ── Configuration ───────────────────────────────────────────────────────────

/// A single invalid setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Configuration errors. Every invalid field is reported at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{}", join_fields(.0))]
    Invalid(Vec<FieldError>),
}

impl ConfigError {
    pub fn fields(&self) -> &[FieldError] {
        match self {
            ConfigError::Invalid(fields) => fields,
        }
    }

    /// True if `field` is among the reported failures.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields().iter().any(|f| f.field == field)
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ── Probing ─────────────────────────────────────────────────────────────────

/// A failed invocation of a surface operation, reduced to its message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CallError {
    pub message: String,
}

impl CallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<AdapterError> for CallError {
    fn from(e: AdapterError) -> Self {
        CallError::new(e.to_string())
    }
}

/// Capability discovery and adaptive invocation failures.
#[derive(Error, Debug, Clone)]
pub enum ProbeError {
    #[error("No method matching {capability} (candidates: {})", .candidates.join(", "))]
    CapabilityNotFound {
        capability: String,
        candidates: Vec<String>,
    },

    #[error("All {} attempts for {operation} failed: {report}", .report.len())]
    AttemptsExhausted {
        operation: String,
        report: AttemptReport,
    },

    #[error("No {operation} unit succeeded: {report}")]
    UnitsExhausted {
        operation: String,
        report: UnitsReport,
    },

    #[error("Member {name} is not callable")]
    NotCallable { name: String },
}

// ── Adapters ────────────────────────────────────────────────────────────────

/// Errors raised while translating a typed request into transaction steps or
/// decoding a read.
#[derive(Error, Debug, Clone)]
pub enum AdapterError {
    #[error("{0}")]
    Probe(#[from] ProbeError),

    #[error("{0}")]
    Chain(String),

    #[error("Scaling error: {0}")]
    Scaling(#[from] ScalingError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unexpected result shape from {operation}: {detail}")]
    UnexpectedShape { operation: String, detail: String },
}

impl From<ChainError> for AdapterError {
    fn from(e: ChainError) -> Self {
        AdapterError::Chain(e.to_string())
    }
}

// ── Chain ───────────────────────────────────────────────────────────────────

/// Fullnode, signing and transaction-compilation errors.
#[derive(Error, Debug, Clone)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Key error: {0}")]
    Key(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Object {0} is not shared")]
    NotShared(String),

    #[error("Invalid identifier {value}: {reason}")]
    InvalidId { value: String, reason: String },

    #[error("No {coin_type} coins available for {owner}")]
    NoCoins { owner: String, coin_type: String },

    #[error("Insufficient {coin_type}: need {needed}, have {available}")]
    InsufficientBalance {
        coin_type: String,
        needed: u64,
        available: u64,
    },

    #[error("Failed to build transaction: {0}")]
    Build(String),

    #[error("Dev-inspect failed: {0}")]
    Inspect(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },
}

// ── HTTP ────────────────────────────────────────────────────────────────────

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_lists_every_field() {
        let err = ConfigError::Invalid(vec![
            FieldError::new("SUI_PRIVATE_KEY", "Missing SUI_PRIVATE_KEY"),
            FieldError::new("L2_LEVELS", "must be at most 200"),
        ]);
        assert_eq!(
            err.to_string(),
            "SUI_PRIVATE_KEY: Missing SUI_PRIVATE_KEY; L2_LEVELS: must be at most 200"
        );
        assert!(err.has_field("L2_LEVELS"));
        assert!(!err.has_field("POOL_KEY"));
    }

    #[test]
    fn test_capability_not_found_shows_candidates() {
        let err = ProbeError::CapabilityNotFound {
            capability: "[cancel, order]".to_string(),
            candidates: vec!["deposit".to_string(), "placeLimitOrder".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("[cancel, order]"));
        assert!(msg.contains("deposit, placeLimitOrder"));
    }
}
