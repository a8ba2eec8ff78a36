//! Adaptive invocation: try an operation under several argument shapes in a
//! fixed order, stop at the first success, and keep a typed record of every
//! failure.
//!
//! Each attempt runs against a checkpoint of the draft transaction; a failed
//! attempt is rolled back before the next one starts.

use super::surface::{Arg, Operation, Returned};
use crate::error::ProbeError;
use crate::tx::DraftTransaction;

use serde::Serialize;
use serde_json::Value;

// ─── Plans ───────────────────────────────────────────────────────────────────

/// One argument-shape hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationAttempt {
    pub label: String,
    pub args: Vec<Arg>,
}

/// Ordered attempts for one logical operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttemptPlan {
    attempts: Vec<InvocationAttempt>,
}

impl AttemptPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt(mut self, label: &str, args: Vec<Arg>) -> Self {
        self.attempts.push(InvocationAttempt {
            label: label.to_string(),
            args,
        });
        self
    }

    pub fn attempts(&self) -> &[InvocationAttempt] {
        &self.attempts
    }

    pub fn labels(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationOutcome {
    Succeeded { label: String },
    Failed { label: String, error: String },
}

impl InvocationOutcome {
    pub fn label(&self) -> &str {
        match self {
            InvocationOutcome::Succeeded { label } | InvocationOutcome::Failed { label, .. } => {
                label
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, InvocationOutcome::Failed { .. })
    }
}

/// Every outcome of one plan, in attempt order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttemptReport {
    outcomes: Vec<InvocationOutcome>,
}

impl AttemptReport {
    pub fn outcomes(&self) -> &[InvocationOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Label of the attempt that succeeded, if any.
    pub fn succeeded_label(&self) -> Option<&str> {
        self.outcomes.iter().find_map(|o| match o {
            InvocationOutcome::Succeeded { label } => Some(label.as_str()),
            _ => None,
        })
    }

    pub fn record_success(&mut self, label: &str) {
        self.outcomes.push(InvocationOutcome::Succeeded {
            label: label.to_string(),
        });
    }

    pub fn record_failure(&mut self, label: &str, error: String) {
        tracing::debug!(label, error = %error, "Attempt failed");
        self.outcomes.push(InvocationOutcome::Failed {
            label: label.to_string(),
            error,
        });
    }
}

impl std::fmt::Display for AttemptReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .outcomes
            .iter()
            .map(|o| match o {
                InvocationOutcome::Succeeded { label } => format!("{} ok", label),
                InvocationOutcome::Failed { label, error } => format!("{} → {}", label, error),
            })
            .collect();
        write!(f, "[{}]", parts.join("; "))
    }
}

// ─── Single plan ─────────────────────────────────────────────────────────────

/// The winning attempt of a plan.
#[derive(Debug, Clone)]
pub struct PlanSuccess {
    pub label: String,
    pub returned: Returned,
    pub report: AttemptReport,
}

async fn run_attempts(
    op: &dyn Operation,
    tx: &mut DraftTransaction,
    plan: &AttemptPlan,
) -> (Option<(String, Returned)>, AttemptReport) {
    let mut report = AttemptReport::default();
    for attempt in plan.attempts() {
        let checkpoint = tx.checkpoint();
        match op.invoke(tx, &attempt.args).await {
            Ok(returned) => {
                report.record_success(&attempt.label);
                return (Some((attempt.label.clone(), returned)), report);
            }
            Err(e) => {
                tx.rollback(checkpoint);
                report.record_failure(&attempt.label, e.message);
            }
        }
    }
    (None, report)
}

/// Run `plan` until an attempt succeeds.
///
/// Attempts after the first success are never invoked. When every attempt
/// fails the error carries one failure per attempt, in order.
pub async fn run_plan(
    op: &dyn Operation,
    tx: &mut DraftTransaction,
    operation: &str,
    plan: &AttemptPlan,
) -> Result<PlanSuccess, ProbeError> {
    match run_attempts(op, tx, plan).await {
        (Some((label, returned)), report) => {
            tracing::debug!(operation, label = %label, failures = report.failure_count(), "Attempt succeeded");
            Ok(PlanSuccess {
                label,
                returned,
                report,
            })
        }
        (None, report) => Err(ProbeError::AttemptsExhausted {
            operation: operation.to_string(),
            report,
        }),
    }
}

// ─── Multiple units ──────────────────────────────────────────────────────────

/// One independent unit of work (e.g. one order id) with its own plan.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkUnit {
    pub key: String,
    pub plan: AttemptPlan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub key: String,
    /// Label of the attempt that succeeded.
    pub used: Option<String>,
    pub attempts: AttemptReport,
}

impl UnitReport {
    pub fn succeeded(&self) -> bool {
        self.used.is_some()
    }
}

/// Per-unit reports, in unit order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitsReport {
    units: Vec<UnitReport>,
}

impl UnitsReport {
    pub fn units(&self) -> &[UnitReport] {
        &self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn succeeded_count(&self) -> usize {
        self.units.iter().filter(|u| u.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.units.len() - self.succeeded_count()
    }

    pub fn any_succeeded(&self) -> bool {
        self.units.iter().any(UnitReport::succeeded)
    }

    pub fn succeeded_keys(&self) -> Vec<&str> {
        self.units
            .iter()
            .filter(|u| u.succeeded())
            .map(|u| u.key.as_str())
            .collect()
    }

    /// Record a unit. Failed units are logged as warnings.
    pub fn record(&mut self, key: &str, used: Option<String>, attempts: AttemptReport) {
        if used.is_none() {
            tracing::warn!(unit = key, attempts = %attempts, "Unit failed on every attempt");
        }
        self.units.push(UnitReport {
            key: key.to_string(),
            used,
            attempts,
        });
    }

    /// `Ok` when no units were run or at least one succeeded.
    pub fn into_result(self, operation: &str) -> Result<Self, ProbeError> {
        if self.is_empty() || self.any_succeeded() {
            Ok(self)
        } else {
            Err(ProbeError::UnitsExhausted {
                operation: operation.to_string(),
                report: self,
            })
        }
    }
}

impl std::fmt::Display for UnitsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .units
            .iter()
            .map(|u| format!("{} {}", u.key, u.attempts))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Run each unit's plan strictly in sequence. A failing unit never stops the
/// next one.
pub async fn run_units(
    op: &dyn Operation,
    tx: &mut DraftTransaction,
    operation: &str,
    units: &[WorkUnit],
) -> Result<UnitsReport, ProbeError> {
    let mut report = UnitsReport::default();
    for unit in units {
        let (winner, attempts) = run_attempts(op, tx, &unit.plan).await;
        report.record(&unit.key, winner.map(|(label, _)| label), attempts);
    }
    report.into_result(operation)
}

// ─── Builder helpers ─────────────────────────────────────────────────────────

/// Result of [`call_builder_helper`].
#[derive(Debug, Clone)]
pub struct HelperOutcome {
    /// True when steps were added to the draft; false when the helper
    /// executed on its own.
    pub built: bool,
    pub value: Option<Value>,
    pub report: AttemptReport,
}

const TX_FIRST: &str = "tx-first";
const TX_FIRST_BUILDER: &str = "tx-first → builder(tx)";
const DEFERRED: &str = "deferred → builder(tx)";
const DIRECT: &str = "direct";

/// Call a helper that may build directly, return a deferred builder, or
/// execute on its own.
///
/// 1. With a declared parameter, invoke `(tx, args…)`; a returned builder is
///    invoked with `(tx)`.
/// 2. Otherwise, or after step 1 fails, invoke `(args…)`; a returned builder
///    is invoked with `(tx)`.
/// 3. Any other value from step 2 is treated as an already-executed result.
pub async fn call_builder_helper(
    op: &dyn Operation,
    tx: &mut DraftTransaction,
    operation: &str,
    args: &[Arg],
) -> Result<HelperOutcome, ProbeError> {
    let mut report = AttemptReport::default();

    if op.arity() >= 1 {
        let checkpoint = tx.checkpoint();
        let mut with_tx = Vec::with_capacity(args.len() + 1);
        with_tx.push(Arg::Tx);
        with_tx.extend_from_slice(args);

        match op.invoke(tx, &with_tx).await {
            Ok(Returned::Builder(builder)) => match builder.invoke(tx, &[Arg::Tx]).await {
                Ok(returned) => {
                    report.record_success(TX_FIRST_BUILDER);
                    return Ok(HelperOutcome {
                        built: true,
                        value: returned.into_value(),
                        report,
                    });
                }
                Err(e) => {
                    tx.rollback(checkpoint);
                    report.record_failure(TX_FIRST_BUILDER, e.message);
                }
            },
            Ok(returned) => {
                report.record_success(TX_FIRST);
                return Ok(HelperOutcome {
                    built: true,
                    value: returned.into_value(),
                    report,
                });
            }
            Err(e) => {
                tx.rollback(checkpoint);
                report.record_failure(TX_FIRST, e.message);
            }
        }
    }

    let checkpoint = tx.checkpoint();
    let exhausted = |report| ProbeError::AttemptsExhausted {
        operation: operation.to_string(),
        report,
    };

    match op.invoke(tx, args).await {
        Ok(Returned::Builder(builder)) => match builder.invoke(tx, &[Arg::Tx]).await {
            Ok(returned) => {
                report.record_success(DEFERRED);
                Ok(HelperOutcome {
                    built: true,
                    value: returned.into_value(),
                    report,
                })
            }
            Err(e) => {
                tx.rollback(checkpoint);
                report.record_failure(DEFERRED, e.message);
                Err(exhausted(report))
            }
        },
        Ok(returned) => {
            report.record_success(DIRECT);
            Ok(HelperOutcome {
                built: tx.checkpoint() != checkpoint,
                value: returned.into_value(),
                report,
            })
        }
        Err(e) => {
            tx.rollback(checkpoint);
            report.record_failure(DIRECT, e.message);
            Err(exhausted(report))
        }
    }
}
