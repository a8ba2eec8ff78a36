//! Chain-agnostic transaction drafts.
//!
//! A [`DraftTransaction`] is an ordered list of typed steps (Move calls, coin
//! splits) that the chain collaborator compiles into a programmable
//! transaction at submission time, resolving object versions and coins then.
//! Drafts support checkpoint/rollback so a failed build attempt never leaves
//! partial steps behind.

use crate::network::CLOCK_OBJECT_ID;
use crate::shared::ObjectIdStr;
use serde::Serialize;

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// A BCS-encodable pure argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PureArg {
    U8(u8),
    U64(u64),
    U128(u128),
    Bool(bool),
    Address(ObjectIdStr),
}

/// How an object input is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Shared { mutable: bool },
    Owned,
}

/// One argument of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    Object { id: ObjectIdStr, kind: ObjectKind },
    Pure(PureArg),
    /// The output of an earlier step.
    Result(usize),
    /// One element of a multi-value output of an earlier step.
    NestedResult(usize, usize),
    Gas,
}

impl Input {
    pub fn shared(id: &ObjectIdStr, mutable: bool) -> Self {
        Input::Object {
            id: id.clone(),
            kind: ObjectKind::Shared { mutable },
        }
    }

    pub fn owned(id: &ObjectIdStr) -> Self {
        Input::Object {
            id: id.clone(),
            kind: ObjectKind::Owned,
        }
    }

    /// The shared clock, read-only.
    pub fn clock() -> Self {
        Input::Object {
            id: ObjectIdStr::parse(CLOCK_OBJECT_ID).unwrap_or_else(|_| ObjectIdStr::zero()),
            kind: ObjectKind::Shared { mutable: false },
        }
    }

    pub fn u8(v: u8) -> Self {
        Input::Pure(PureArg::U8(v))
    }

    pub fn u64(v: u64) -> Self {
        Input::Pure(PureArg::U64(v))
    }

    pub fn u128(v: u128) -> Self {
        Input::Pure(PureArg::U128(v))
    }

    pub fn bool(v: bool) -> Self {
        Input::Pure(PureArg::Bool(v))
    }

    pub fn address(v: &ObjectIdStr) -> Self {
        Input::Pure(PureArg::Address(v.clone()))
    }
}

// ─── Steps ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveCall {
    pub package: ObjectIdStr,
    pub module: String,
    pub function: String,
    pub type_args: Vec<String>,
    pub args: Vec<Input>,
}

impl MoveCall {
    /// `package::module::function` with the package abbreviated.
    pub fn target(&self) -> String {
        format!("{}::{}::{}", short_id(&self.package), self.module, self.function)
    }
}

fn short_id(id: &ObjectIdStr) -> String {
    let hex = id.as_str().trim_start_matches("0x").trim_start_matches('0');
    if hex.len() <= 8 {
        format!("0x{}", if hex.is_empty() { "0" } else { hex })
    } else {
        format!("0x{}…", &hex[..8])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    MoveCall(MoveCall),
    /// Split fixed amounts off a coin input; output is one coin per amount.
    SplitCoins { coin: Input, amounts: Vec<u64> },
    /// A coin of `coin_type` holding exactly `amount`, assembled from the
    /// sender's owned coins at compile time; output is that coin.
    CoinWithBalance { coin_type: String, amount: u64 },
}

impl Step {
    pub fn describe(&self) -> String {
        match self {
            Step::MoveCall(call) => call.target(),
            Step::SplitCoins { amounts, .. } => format!("split_coins({})", amounts.len()),
            Step::CoinWithBalance { coin_type, amount } => {
                format!("coin_with_balance({}, {})", coin_type, amount)
            }
        }
    }
}

// ─── DraftTransaction ────────────────────────────────────────────────────────

/// Opaque marker returned by [`DraftTransaction::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftTransaction {
    steps: Vec<Step>,
}

impl DraftTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push(&mut self, step: Step) -> Input {
        self.steps.push(step);
        Input::Result(self.steps.len() - 1)
    }

    pub fn move_call(
        &mut self,
        package: &ObjectIdStr,
        module: &str,
        function: &str,
        type_args: Vec<String>,
        args: Vec<Input>,
    ) -> Input {
        self.push(Step::MoveCall(MoveCall {
            package: package.clone(),
            module: module.to_string(),
            function: function.to_string(),
            type_args,
            args,
        }))
    }

    /// Split `amount` MIST off the gas coin.
    pub fn split_gas(&mut self, amount: u64) -> Input {
        self.steps.push(Step::SplitCoins {
            coin: Input::Gas,
            amounts: vec![amount],
        });
        Input::NestedResult(self.steps.len() - 1, 0)
    }

    pub fn coin_with_balance(&mut self, coin_type: &str, amount: u64) -> Input {
        self.push(Step::CoinWithBalance {
            coin_type: coin_type.to_string(),
            amount,
        })
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.steps.len())
    }

    /// Drop every step added after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.steps.truncate(checkpoint.0);
    }

    /// One line per step, for logs and outcomes.
    pub fn describe(&self) -> Vec<String> {
        self.steps.iter().map(Step::describe).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg() -> ObjectIdStr {
        ObjectIdStr::parse("0xdee9").unwrap()
    }

    #[test]
    fn test_move_call_returns_result_index() {
        let mut tx = DraftTransaction::new();
        let first = tx.move_call(&pkg(), "balance_manager", "new", vec![], vec![]);
        let second = tx.move_call(&pkg(), "transfer", "public_share_object", vec![], vec![first]);
        assert_eq!(second, Input::Result(1));
        assert_eq!(tx.len(), 2);
    }

    #[test]
    fn test_split_gas_is_nested() {
        let mut tx = DraftTransaction::new();
        assert_eq!(tx.split_gas(10), Input::NestedResult(0, 0));
    }

    #[test]
    fn test_rollback_discards_partial_steps() {
        let mut tx = DraftTransaction::new();
        tx.move_call(&pkg(), "pool", "a", vec![], vec![]);
        let cp = tx.checkpoint();
        tx.move_call(&pkg(), "pool", "b", vec![], vec![]);
        tx.move_call(&pkg(), "pool", "c", vec![], vec![]);
        tx.rollback(cp);
        assert_eq!(tx.describe(), vec!["0xdee9::pool::a".to_string()]);
    }

    #[test]
    fn test_clock_is_read_only_shared() {
        match Input::clock() {
            Input::Object { id, kind } => {
                assert!(id.as_str().ends_with('6'));
                assert_eq!(kind, ObjectKind::Shared { mutable: false });
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_long_package_abbreviated() {
        let long = ObjectIdStr::parse(
            "0x2c8d603bc51326b8c13cef9dd07031a408a48dddb541963357661df5d3204809",
        )
        .unwrap();
        let mut tx = DraftTransaction::new();
        tx.move_call(&long, "pool", "mid_price", vec![], vec![]);
        assert_eq!(tx.describe()[0], "0x2c8d603b…::pool::mid_price");
    }
}
