//! Reflectable operation surfaces.
//!
//! A [`Surface`] is an object whose set of operations is only known at run
//! time: it can list member names (its own plus one inherited level) and hand
//! out members by name. Member access itself may fail.

use crate::error::CallError;
use crate::tx::DraftTransaction;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Names that are artifacts of the invocation mechanism, never operations.
pub const EXCLUDED_NAMES: [&str; 3] = ["arguments", "callee", "caller"];

// ─── Arguments and results ───────────────────────────────────────────────────

/// A positional argument passed to an [`Operation`].
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// The transaction under construction.
    Tx,
    Str(String),
    Num(Decimal),
    Bool(bool),
}

impl Arg {
    pub fn str(s: impl Into<String>) -> Self {
        Arg::Str(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<Decimal> {
        match self {
            Arg::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Arg::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_tx(&self) -> bool {
        matches!(self, Arg::Tx)
    }
}

/// What a successful invocation produced.
#[derive(Clone)]
pub enum Returned {
    /// Steps were appended to the draft; nothing else to report.
    Unit,
    /// A plain value (a read, or an already-executed result).
    Value(Value),
    /// A deferred builder to be invoked with the draft as its sole argument.
    Builder(Arc<dyn Operation>),
}

impl std::fmt::Debug for Returned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Returned::Unit => f.write_str("Unit"),
            Returned::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Returned::Builder(_) => f.write_str("Builder(..)"),
        }
    }
}

impl Returned {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Returned::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// A callable member of a surface.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Declared parameter count.
    fn arity(&self) -> usize;

    /// Invoke with positional `args`. Steps go into `tx`; an `Arg::Tx` marks
    /// where the draft sits in the positional list.
    async fn invoke(&self, tx: &mut DraftTransaction, args: &[Arg]) -> Result<Returned, CallError>;
}

/// A member obtained from a surface.
#[derive(Clone)]
pub enum Member {
    Operation(Arc<dyn Operation>),
    Value(Value),
}

impl Member {
    pub fn is_callable(&self) -> bool {
        matches!(self, Member::Operation(_))
    }
}

// ─── Surface ─────────────────────────────────────────────────────────────────

/// An object exposing operations by name.
pub trait Surface: Send + Sync {
    /// Diagnostic name of the surface.
    fn name(&self) -> &str;

    fn own_member_names(&self) -> Vec<String>;

    /// Names contributed by the immediate parent only.
    fn inherited_member_names(&self) -> Vec<String>;

    /// Access a member. `Ok(None)` when absent; `Err` when access fails.
    fn member(&self, name: &str) -> Result<Option<Member>, CallError>;
}

// ─── MethodTable ─────────────────────────────────────────────────────────────

#[derive(Clone)]
enum Slot {
    Operation(Arc<dyn Operation>),
    Value(Value),
    /// Accessing this member fails with the stored message.
    Faulty(String),
}

/// A concrete [`Surface`]: named slots plus an optional parent table.
///
/// Lookup walks the full parent chain; enumeration covers the table and its
/// immediate parent.
#[derive(Clone, Default)]
pub struct MethodTable {
    name: String,
    slots: BTreeMap<String, Slot>,
    parent: Option<Arc<MethodTable>>,
}

impl MethodTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: Arc<MethodTable>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn operation(mut self, name: &str, op: Arc<dyn Operation>) -> Self {
        self.slots.insert(name.to_string(), Slot::Operation(op));
        self
    }

    pub fn value(mut self, name: &str, value: Value) -> Self {
        self.slots.insert(name.to_string(), Slot::Value(value));
        self
    }

    pub fn faulty(mut self, name: &str, message: &str) -> Self {
        self.slots
            .insert(name.to_string(), Slot::Faulty(message.to_string()));
        self
    }

    fn lookup(&self, name: &str) -> Option<&Slot> {
        match self.slots.get(name) {
            Some(slot) => Some(slot),
            None => self.parent.as_ref().and_then(|p| p.lookup(name)),
        }
    }
}

impl Surface for MethodTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn own_member_names(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }

    fn inherited_member_names(&self) -> Vec<String> {
        self.parent
            .as_ref()
            .map(|p| p.own_member_names())
            .unwrap_or_default()
    }

    fn member(&self, name: &str) -> Result<Option<Member>, CallError> {
        match self.lookup(name) {
            None => Ok(None),
            Some(Slot::Operation(op)) => Ok(Some(Member::Operation(op.clone()))),
            Some(Slot::Value(v)) => Ok(Some(Member::Value(v.clone()))),
            Some(Slot::Faulty(msg)) => Err(CallError::new(msg.clone())),
        }
    }
}

// ─── FnOperation ─────────────────────────────────────────────────────────────

type BoxedFn = dyn Fn(&mut DraftTransaction, &[Arg]) -> Result<Returned, CallError> + Send + Sync;

/// An [`Operation`] backed by a synchronous closure.
pub struct FnOperation {
    arity: usize,
    f: Box<BoxedFn>,
}

impl FnOperation {
    pub fn new<F>(arity: usize, f: F) -> Arc<dyn Operation>
    where
        F: Fn(&mut DraftTransaction, &[Arg]) -> Result<Returned, CallError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            arity,
            f: Box::new(f),
        })
    }
}

#[async_trait]
impl Operation for FnOperation {
    fn arity(&self) -> usize {
        self.arity
    }

    async fn invoke(&self, tx: &mut DraftTransaction, args: &[Arg]) -> Result<Returned, CallError> {
        (self.f)(tx, args)
    }
}
