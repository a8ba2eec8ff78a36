//! Result normalization: pull domain values out of JSON responses whose shape
//! varies between SDK versions and node endpoints.
//!
//! None of these functions fail on an unexpected shape. They degrade to an
//! empty list or `None` and leave the decision to the caller.

use crate::domain::orderbook::{Level2Range, Level2Snapshot};
use crate::error::SdkError;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

/// Fields that may hold the open-order list, in priority order.
pub const OPEN_ORDER_FIELDS: [&str; 3] = ["open", "orders", "data"];

/// Fields that may hold an order id, in priority order.
pub const ORDER_ID_FIELDS: [&str; 6] = ["orderId", "id", "order_id", "orderID", "order", "order_id_str"];

// ── Open orders ─────────────────────────────────────────────────────────────

/// The open-order list inside `value`.
pub fn open_orders(value: &Value) -> Vec<Value> {
    if let Value::Array(items) = value {
        return items.clone();
    }
    OPEN_ORDER_FIELDS
        .iter()
        .find_map(|field| value.get(field).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The id of one open-order element. A bare string or number is its own id.
pub fn order_id(item: &Value) -> Option<String> {
    match item {
        Value::Object(map) => ORDER_ID_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(scalar_id)),
        other => scalar_id(other),
    }
}

/// Ids of every element of the open-order list in `value`, skipping elements
/// with no recognizable id.
pub fn order_ids(value: &Value) -> Vec<String> {
    open_orders(value).iter().filter_map(order_id).collect()
}

// ── Object changes ──────────────────────────────────────────────────────────

/// Object id of the first change whose `objectType` contains every marker
/// (case-insensitive).
pub fn created_object_id(changes: &[Value], markers: &[&str]) -> Option<String> {
    changes.iter().find_map(|change| {
        let object_type = change.get("objectType")?.as_str()?.to_lowercase();
        if !markers
            .iter()
            .all(|m| object_type.contains(&m.to_lowercase()))
        {
            return None;
        }
        change
            .get("objectId")
            .or_else(|| change.get("objectRef").and_then(|r| r.get("objectId")))
            .and_then(Value::as_str)
            .map(str::to_string)
    })
}

/// Object id of a newly created balance manager.
pub fn created_balance_manager_id(changes: &[Value]) -> Option<String> {
    created_object_id(changes, &["balance", "manager"])
}

// ── Level 2 ─────────────────────────────────────────────────────────────────

/// A number or numeric string as a [`Decimal`].
pub fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn decimals(value: Option<&Value>) -> Vec<Decimal> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(decimal).collect())
        .unwrap_or_default()
}

/// `{prices, quantities}` as a [`Level2Range`]. Missing columns are empty;
/// non-numeric entries are skipped.
pub fn level2_range(value: &Value) -> Level2Range {
    Level2Range::new(
        decimals(value.get("prices")),
        decimals(value.get("quantities")),
    )
}

/// A level-2 read as a snapshot of `pool`.
///
/// Accepts `{bids: {prices, quantities}, asks: {…}}` or a bare
/// `{prices, quantities}`, which is taken as the bid side.
pub fn level2_snapshot(pool: &str, value: &Value) -> Level2Snapshot {
    match value.get("bids") {
        Some(bids) => Level2Snapshot {
            pool: pool.to_string(),
            bids: level2_range(bids),
            asks: value
                .get("asks")
                .filter(|a| !a.is_null())
                .map(level2_range),
        },
        None => Level2Snapshot {
            pool: pool.to_string(),
            bids: level2_range(value),
            asks: None,
        },
    }
}

// ── Execution results ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure,
    Unknown,
}

/// The parts of an executed transaction the scripts report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionSummary {
    pub digest: String,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub object_changes: Vec<Value>,
    pub event_count: usize,
}

impl ExecutionSummary {
    /// Read a transaction-block response (`digest`, `effects.status`,
    /// `objectChanges`, `events`).
    pub fn from_value(value: &Value) -> Self {
        let status_obj = value.pointer("/effects/status");
        let status = match status_obj
            .and_then(|s| s.get("status"))
            .and_then(Value::as_str)
        {
            Some("success") => ExecutionStatus::Success,
            Some("failure") => ExecutionStatus::Failure,
            _ => ExecutionStatus::Unknown,
        };
        let error = status_obj
            .and_then(|s| s.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let event_count = match value.get("events") {
            Some(Value::Array(events)) => events.len(),
            Some(Value::Object(o)) => o.get("data").and_then(Value::as_array).map_or(0, Vec::len),
            _ => 0,
        };

        Self {
            digest: value
                .get("digest")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            status,
            error,
            object_changes: value
                .get("objectChanges")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            event_count,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// Fail unless the effects report success. Nothing read after a failed
    /// submission can be trusted.
    pub fn ensure_success(self) -> Result<Self, SdkError> {
        if self.is_success() {
            return Ok(self);
        }
        tracing::error!(digest = %self.digest, status = ?self.status, error = ?self.error, "Transaction failed");
        Err(SdkError::ExecutionFailed {
            digest: self.digest,
            error: self
                .error
                .unwrap_or_else(|| format!("status {:?}", self.status).to_lowercase()),
        })
    }
}
