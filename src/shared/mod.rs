//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw strings the fullnode and indexer send.

pub mod scaling;

pub use scaling::{
    scale_coin_amount, scale_price, scale_quantity, unscale_price, unscale_quantity, BookParams,
    ScalingError,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── ObjectIdStr ─────────────────────────────────────────────────────────────

/// A Sui object id or address, normalized to `0x` + 64 lowercase hex digits.
///
/// Short forms such as `0x6` are left-padded, so two spellings of the same id
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdStr(String);

impl ObjectIdStr {
    pub fn parse(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| format!("expected 0x-prefixed hex, got '{}'", trimmed))?;
        if hex.is_empty() || hex.len() > 64 {
            return Err(format!("expected 1..=64 hex digits, got {}", hex.len()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("non-hex character in '{}'", trimmed));
        }
        Ok(Self(format!("0x{:0>64}", hex.to_ascii_lowercase())))
    }

    /// The all-zero address.
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(64)))
    }

    /// True if `s` looks like an object id rather than a label or pool name.
    pub fn looks_like(s: &str) -> bool {
        s.trim().starts_with("0x")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectIdStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectIdStr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectIdStr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectIdStr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectIdStr::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ─── Side ────────────────────────────────────────────────────────────────────

/// Order side: Bid (buy base) or Ask (sell base).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn is_bid(&self) -> bool {
        matches!(self, Side::Bid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
