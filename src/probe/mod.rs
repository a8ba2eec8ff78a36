//! Runtime probing of operation surfaces whose shape is only known at run time.
//!
//! - [`discovery`]: pick an operation by name predicates.
//! - [`invoke`]: run ordered argument-shape hypotheses with rollback.
//! - [`normalize`]: extract ids and lists from variably shaped responses.

pub mod discovery;
pub mod invoke;
pub mod normalize;
pub mod surface;

pub use discovery::{callable_members, discover, resolve, CapabilityQuery, Discovery, Predicate};
pub use invoke::{
    call_builder_helper, run_plan, run_units, AttemptPlan, AttemptReport, HelperOutcome,
    InvocationAttempt, InvocationOutcome, PlanSuccess, UnitReport, UnitsReport, WorkUnit,
};
pub use normalize::{ExecutionStatus, ExecutionSummary};
pub use surface::{Arg, FnOperation, Member, MethodTable, Operation, Returned, Surface};
