//! Shared fixtures: an in-memory chain that answers DeepBook dev-inspect reads
//! and records every submitted draft.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use deepbook_bot::chain::{ChainClient, CoinSummary, InspectResults, ObjectSummary, ReturnValue};
use deepbook_bot::client::DeepBookBot;
use deepbook_bot::config::Config;
use deepbook_bot::error::ChainError;
use deepbook_bot::shared::ObjectIdStr;
use deepbook_bot::tx::{DraftTransaction, Step};

pub const OWNER: &str = "0x00000000000000000000000000000000000000000000000000000000000000f0";
pub const MANAGER_ID: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";
pub const CREATED_MANAGER_ID: &str =
    "0x00000000000000000000000000000000000000000000000000000000000000bb";

/// SUI_DBUSDC book in raw units: prices are `human × 1e6`, quantities
/// `human × 1e9`.
#[derive(Debug, Clone)]
pub struct StubBook {
    pub tick_size: u64,
    pub lot_size: u64,
    pub min_size: u64,
    pub bids: Vec<(u64, u64)>,
    pub asks: Vec<(u64, u64)>,
    pub mid: Option<u64>,
    pub open_orders: Vec<u128>,
    pub balance: u64,
}

impl Default for StubBook {
    fn default() -> Self {
        Self {
            tick_size: 1_000,
            lot_size: 100_000_000,
            min_size: 1_000_000_000,
            bids: vec![(1_230_000, 1_000_000_000), (1_220_000, 2_000_000_000)],
            asks: vec![(1_250_000, 500_000_000)],
            mid: Some(1_240_000),
            open_orders: vec![7],
            balance: 1_500_000_000,
        }
    }
}

pub struct StubChain {
    pub address: ObjectIdStr,
    pub book: StubBook,
    pub status: &'static str,
    pub gas_coins: Vec<CoinSummary>,
    pub objects: HashMap<ObjectIdStr, ObjectSummary>,
    pub object_changes: Vec<Value>,
    pub transactions: HashMap<String, Value>,
    pub executed: Mutex<Vec<DraftTransaction>>,
    pub inspected: Mutex<Vec<String>>,
}

impl StubChain {
    pub fn new() -> Self {
        let address = id(OWNER);
        Self {
            gas_coins: vec![CoinSummary {
                coin_object_id: id("0x5"),
                balance: 2_000_000_000,
            }],
            address,
            book: StubBook::default(),
            status: "success",
            objects: HashMap::new(),
            object_changes: Vec::new(),
            transactions: HashMap::new(),
            executed: Mutex::new(Vec::new()),
            inspected: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            status: "failure",
            ..Self::new()
        }
    }

    /// Every draft passed to `sign_and_execute`, in order.
    pub fn executed(&self) -> Vec<DraftTransaction> {
        self.executed.lock().unwrap().clone()
    }

    /// Function names of every dev-inspected call, in order.
    pub fn inspected(&self) -> Vec<String> {
        self.inspected.lock().unwrap().clone()
    }

    fn encode<T: serde::Serialize>(value: &T, tag: &str) -> Result<ReturnValue, ChainError> {
        ReturnValue::encode(value, tag)
    }
}

#[async_trait]
impl ChainClient for StubChain {
    fn address(&self) -> &ObjectIdStr {
        &self.address
    }

    async fn sign_and_execute(&self, tx: &DraftTransaction) -> Result<Value, ChainError> {
        let mut executed = self.executed.lock().unwrap();
        executed.push(tx.clone());
        let digest = format!("Digest{}", executed.len());
        let status = if self.status == "success" {
            json!({ "status": "success" })
        } else {
            json!({ "status": self.status, "error": "MoveAbort(place_limit_order, 3)" })
        };
        Ok(json!({
            "digest": digest,
            "effects": { "status": status },
            "objectChanges": self.object_changes,
            "events": [],
        }))
    }

    async fn get_object(&self, id: &ObjectIdStr) -> Result<Option<ObjectSummary>, ChainError> {
        Ok(self.objects.get(id).cloned())
    }

    async fn get_transaction(&self, digest: &str) -> Result<Value, ChainError> {
        self.transactions
            .get(digest)
            .cloned()
            .ok_or_else(|| ChainError::Rpc(format!("Could not find transaction {}", digest)))
    }

    async fn get_coins(&self, _owner: &ObjectIdStr, _coin_type: &str) -> Result<Vec<CoinSummary>, ChainError> {
        Ok(self.gas_coins.clone())
    }

    async fn inspect(&self, tx: &DraftTransaction) -> Result<InspectResults, ChainError> {
        let Some(Step::MoveCall(call)) = tx.steps().first() else {
            return Err(ChainError::Inspect("empty draft".to_string()));
        };
        self.inspected.lock().unwrap().push(call.function.clone());

        let book = &self.book;
        let values = match call.function.as_str() {
            "pool_book_params" => vec![
                Self::encode(&book.tick_size, "u64")?,
                Self::encode(&book.lot_size, "u64")?,
                Self::encode(&book.min_size, "u64")?,
            ],
            "get_level2_ticks_from_mid" => {
                let column = |levels: &[(u64, u64)], price: bool| -> Vec<u64> {
                    levels.iter().map(|(p, q)| if price { *p } else { *q }).collect()
                };
                vec![
                    Self::encode(&column(&book.bids, true), "vector<u64>")?,
                    Self::encode(&column(&book.bids, false), "vector<u64>")?,
                    Self::encode(&column(&book.asks, true), "vector<u64>")?,
                    Self::encode(&column(&book.asks, false), "vector<u64>")?,
                ]
            }
            "mid_price" => match book.mid {
                Some(mid) => vec![Self::encode(&mid, "u64")?],
                None => return Err(ChainError::Inspect("MoveAbort(mid_price, 6)".to_string())),
            },
            "account_open_orders" => vec![Self::encode(&book.open_orders, "vector<u128>")?],
            "balance" => vec![Self::encode(&book.balance, "u64")?],
            other => return Err(ChainError::Inspect(format!("unexpected call {}", other))),
        };
        Ok(InspectResults::new(vec![values]))
    }
}

pub fn id(s: &str) -> ObjectIdStr {
    ObjectIdStr::parse(s).unwrap()
}

/// Testnet config with a signing key and one balance manager, overridden by
/// `extra`.
pub fn config(extra: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = [
        ("SUI_PRIVATE_KEY", "suiprivkey1qtest"),
        ("BALANCE_MANAGER_ID", MANAGER_ID),
        ("L2_TICK_SIZE", "0.01"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(move |k| env.get(k).cloned()).unwrap()
}

pub fn bot(config: Config, chain: Arc<StubChain>) -> DeepBookBot {
    DeepBookBot::builder(config).chain(chain).build().unwrap()
}

/// Targets (`module::function`) of a draft's Move calls.
pub fn call_targets(tx: &DraftTransaction) -> Vec<String> {
    tx.steps()
        .iter()
        .filter_map(|step| match step {
            Step::MoveCall(call) => Some(format!("{}::{}", call.module, call.function)),
            _ => None,
        })
        .collect()
}
