//! The probing adapter end to end: discovery and shape attempts over
//! hand-built surfaces, and over the DeepBook facade.

mod common;

use common::{bot, call_targets, config, id, StubChain, CREATED_MANAGER_ID, OWNER};
use deepbook_bot::adapter::{ProbingAdapter, Staged};
use deepbook_bot::error::{CallError, SdkError};
use deepbook_bot::ops;
use deepbook_bot::probe::{Arg, FnOperation, InvocationOutcome, MethodTable, Operation, Returned};
use deepbook_bot::shared::ObjectIdStr;
use deepbook_bot::tx::Input;

use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

const PROBING: (&str, &str) = ("DEEPBOOK_ADAPTER", "probing");

/// A `deepBook` surface whose `cancelOrder` only accepts `(tx, orderId)`.
fn legacy_deep_book() -> MethodTable {
    let cancel = FnOperation::new(2, |tx, args| {
        if args.len() != 2 {
            return Err(CallError::new(format!("expected 2 arguments, got {}", args.len())));
        }
        let order_id: u128 = args[1]
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CallError::new("orderId must be numeric"))?;
        let pkg = ObjectIdStr::parse("0xdee9").map_err(CallError::new)?;
        tx.move_call(&pkg, "pool", "cancel_order", vec![], vec![Input::u128(order_id)]);
        Ok(Returned::Unit)
    });
    let cancel_all = FnOperation::new(3, |_, _| Err(CallError::new("must never be chosen")));

    MethodTable::new("deepBook")
        .operation("cancelOrder", cancel)
        .operation("cancelAllOrders", cancel_all)
        .operation(
            "accountOpenOrders",
            FnOperation::new(2, |_, _| Ok(Returned::Value(json!({ "orders": [{ "id": "5" }] })))),
        )
}

/// A `deepBook` surface whose `registerPool` only accepts `(tx, poolKey)`,
/// stages a marker step and returns a builder that stages the registration.
fn pool_registry(builder_succeeds: bool) -> MethodTable {
    let register = FnOperation::new(2, move |tx, args| {
        if args.len() != 2 {
            return Err(CallError::new(format!("expected 2 arguments, got {}", args.len())));
        }
        let pool = args[1].as_str().unwrap_or_default().to_string();
        tx.split_gas(1);
        Ok(Returned::Builder(FnOperation::new(1, move |tx, inner| {
            if !builder_succeeds {
                return Err(CallError::new(format!("{} is not registrable", pool)));
            }
            assert_eq!(inner, [Arg::Tx]);
            let pkg = ObjectIdStr::parse("0xdee9").map_err(CallError::new)?;
            tx.move_call(&pkg, "pool", "register_pool", vec![], vec![]);
            Ok(Returned::Unit)
        })))
    });
    MethodTable::new("deepBook").operation("registerPool", register)
}

fn adapter_bot(
    deep_book: MethodTable,
    balance_manager: MethodTable,
    chain: Arc<StubChain>,
    extra: &[(&str, &str)],
) -> deepbook_bot::client::DeepBookBot {
    let adapter = ProbingAdapter::new(Arc::new(deep_book), Arc::new(balance_manager), id(OWNER));
    deepbook_bot::client::DeepBookBot::builder(config(extra))
        .chain(chain)
        .adapter(Arc::new(adapter))
        .build()
        .unwrap()
}

// ── Hand-built surface ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancel_tries_every_shape_per_order() {
    let chain = Arc::new(StubChain::new());
    let adapter = ProbingAdapter::new(
        Arc::new(legacy_deep_book()),
        Arc::new(MethodTable::new("balanceManager")),
        id(OWNER),
    );
    let bot = deepbook_bot::client::DeepBookBot::builder(config(&[("ORDER_IDS", "1,2,3")]))
        .chain(chain.clone())
        .adapter(Arc::new(adapter))
        .build()
        .unwrap();

    let outcome = ops::cancel_all(&bot).await.unwrap();

    let units = outcome.report.units();
    assert_eq!(units.len(), 3);
    for (unit, key) in units.iter().zip(["1", "2", "3"]) {
        assert_eq!(unit.key, key);
        assert_eq!(unit.attempts.len(), 4);
        assert_eq!(unit.attempts.failure_count(), 3);
        assert_eq!(unit.used.as_deref(), Some("txb,orderId"));
    }
    // Failed shapes were rolled back; only the winners reached the draft.
    assert_eq!(chain.executed()[0].len(), 3);
}

#[tokio::test]
async fn test_open_orders_normalized_from_wrapped_shape() {
    let chain = Arc::new(StubChain::new());
    let adapter = ProbingAdapter::new(
        Arc::new(legacy_deep_book()),
        Arc::new(MethodTable::new("balanceManager")),
        id(OWNER),
    );
    let bot = deepbook_bot::client::DeepBookBot::builder(config(&[]))
        .chain(chain)
        .adapter(Arc::new(adapter))
        .build()
        .unwrap();

    let outcome = ops::cancel_all(&bot).await.unwrap();
    assert_eq!(outcome.order_ids, vec!["5"]);
    assert_eq!(outcome.report.succeeded_keys(), vec!["5"]);
}

#[tokio::test]
async fn test_missing_capability_lists_candidates() {
    let chain = Arc::new(StubChain::new());
    let adapter = ProbingAdapter::new(
        Arc::new(legacy_deep_book()),
        Arc::new(MethodTable::new("balanceManager")),
        id(OWNER),
    );
    let bot = deepbook_bot::client::DeepBookBot::builder(config(&[]))
        .chain(chain.clone())
        .adapter(Arc::new(adapter))
        .build()
        .unwrap();

    let err = ops::register_manager(&bot).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("No method matching"), "{}", message);
    assert!(chain.executed().is_empty());
}

#[tokio::test]
async fn test_every_shape_failing_reports_each_attempt() {
    let always_fails = FnOperation::new(4, |_, args| {
        Err(CallError::new(format!("rejected {} args", args.len())))
    });
    let table = MethodTable::new("deepBook").operation("cancelOrder", always_fails);
    let adapter = ProbingAdapter::new(
        Arc::new(table),
        Arc::new(MethodTable::new("balanceManager")),
        id(OWNER),
    );
    let chain = Arc::new(StubChain::new());
    let bot = deepbook_bot::client::DeepBookBot::builder(config(&[("ORDER_IDS", "9")]))
        .chain(chain.clone())
        .adapter(Arc::new(adapter))
        .build()
        .unwrap();

    match ops::cancel_all(&bot).await {
        Err(SdkError::Adapter(e)) => {
            let message = e.to_string();
            assert!(message.contains("rejected 4 args"));
            assert!(message.contains("rejected 2 args"));
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("expected failure"),
    }
    assert!(chain.executed().is_empty());
}

/// A `balanceManager` surface that executes SUI deposits on its own (and
/// fails) but appends DBUSDC deposits to the draft.
fn self_executing_deposits() -> MethodTable {
    let deposit = FnOperation::new(3, |tx, args| {
        if args.first().is_some_and(Arg::is_tx) {
            if args.get(2).and_then(Arg::as_str) != Some("DBUSDC") {
                return Err(CallError::new("builds DBUSDC only"));
            }
            let pkg = ObjectIdStr::parse("0xdee9").map_err(CallError::new)?;
            tx.move_call(&pkg, "balance_manager", "deposit", vec![], vec![]);
            return Ok(Returned::Unit);
        }
        Ok(Returned::Value(json!({
            "digest": "SelfExecuted1",
            "effects": { "status": { "status": "failure", "error": "InsufficientCoinBalance" } },
        })))
    });
    MethodTable::new("balanceManager").operation("depositIntoManager", deposit)
}

#[tokio::test(start_paused = true)]
async fn test_failed_self_executed_deposit_stops_the_run() {
    let chain = Arc::new(StubChain::new());
    let adapter = ProbingAdapter::new(
        Arc::new(MethodTable::new("deepBook")),
        Arc::new(self_executing_deposits()),
        id(OWNER),
    );
    let bot = deepbook_bot::client::DeepBookBot::builder(config(&[
        ("DEPOSIT_BASE", "0.5"),
        ("DEPOSIT_QUOTE", "1"),
    ]))
    .chain(chain.clone())
    .adapter(Arc::new(adapter))
    .build()
    .unwrap();

    match ops::deposit(&bot).await {
        Err(SdkError::ExecutionFailed { digest, error }) => {
            assert_eq!(digest, "SelfExecuted1");
            assert!(error.contains("InsufficientCoinBalance"));
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("expected failure"),
    }
    // The appended DBUSDC deposit is never submitted and no balance is read.
    assert!(chain.executed().is_empty());
    assert!(chain.inspected().is_empty());
}

#[tokio::test]
async fn test_register_pool_falls_through_to_pool_only_shape() {
    let chain = Arc::new(StubChain::new());
    let bot = adapter_bot(pool_registry(true), MethodTable::new("balanceManager"), chain.clone(), &[]);

    let outcome = ops::register_pool(&bot).await.unwrap();
    assert_eq!(outcome.pool, "SUI_DBUSDC");
    assert_eq!(outcome.staged, Staged::appended("txb,poolKey → builder(tx)"));
    assert_eq!(call_targets(&chain.executed()[0]), vec!["pool::register_pool"]);
}

#[tokio::test]
async fn test_register_pool_failed_builder_submits_nothing() {
    let chain = Arc::new(StubChain::new());
    let bot = adapter_bot(pool_registry(false), MethodTable::new("balanceManager"), chain.clone(), &[]);

    let err = ops::register_pool(&bot).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("txb,poolKey → builder(tx)"), "{}", message);
    assert!(message.contains("SUI_DBUSDC is not registrable"), "{}", message);
    assert!(chain.executed().is_empty());
}

// ── Facade-backed probing ───────────────────────────────────────────────────

#[tokio::test]
async fn test_facade_cancel_matches_first_shape() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[PROBING, ("ORDER_IDS", "1,2")]), chain.clone());
    assert_eq!(bot.adapter().name(), "probing");

    let outcome = ops::cancel_all(&bot).await.unwrap();
    for unit in outcome.report.units() {
        assert_eq!(unit.used.as_deref(), Some("txb,pool,managerId,orderId"));
        assert_eq!(
            unit.attempts.outcomes(),
            &[InvocationOutcome::Succeeded {
                label: "txb,pool,managerId,orderId".to_string()
            }]
        );
    }
    let targets = call_targets(&chain.executed()[0]);
    assert_eq!(targets.iter().filter(|t| *t == "pool::cancel_order").count(), 2);
}

#[tokio::test]
async fn test_facade_rejects_object_id_as_order_id() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[PROBING]), chain);
    let facade = bot.facade();
    let op = match deepbook_bot::probe::resolve(
        facade.deep_book().as_ref(),
        &deepbook_bot::probe::CapabilityQuery::new()
            .contains("cancel")
            .contains("order")
            .excludes("all"),
    ) {
        Ok((name, op)) => {
            assert_eq!(name, "cancelOrder");
            op
        }
        Err(e) => panic!("{}", e),
    };

    let mut tx = deepbook_bot::tx::DraftTransaction::new();
    let args = [
        Arg::Tx,
        Arg::str("SUI_DBUSDC"),
        Arg::str(common::MANAGER_ID),
        Arg::str(common::MANAGER_ID),
    ];
    assert!(op.invoke(&mut tx, &args).await.is_err());
    assert!(tx.is_empty());
}

#[tokio::test]
async fn test_facade_place_matches_is_bid_shape() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(
        config(&[PROBING, ("ALLOW_TRADING", "true"), ("CLIENT_ORDER_ID", "7")]),
        chain.clone(),
    );

    let outcome = ops::place_bad_bid(&bot).await.unwrap();
    assert_eq!(outcome.staged, Staged::appended("txb,pool,managerId,isBid,price,qty"));
    assert_eq!(outcome.reference_price, d("1.24"));
    assert_eq!(outcome.open_orders, Some(vec!["7".to_string()]));
    assert_eq!(
        call_targets(&chain.executed()[0]),
        vec!["balance_manager::generate_proof_as_owner", "pool::place_limit_order"]
    );
}

#[tokio::test]
async fn test_facade_register_matches_label_shape() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[PROBING]), chain.clone());

    let outcome = ops::register_manager(&bot).await.unwrap();
    assert_eq!(outcome.staged, Staged::appended("txb,managerKey,bmObjectId"));
    assert_eq!(
        call_targets(&chain.executed()[0]),
        vec!["balance_manager::register_balance_manager"]
    );
}

#[tokio::test]
async fn test_facade_register_pool_applies_curried_builder() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[PROBING]), chain.clone());

    let outcome = ops::register_pool(&bot).await.unwrap();
    assert_eq!(outcome.manager.label, "BM1");
    assert_eq!(outcome.staged, Staged::appended("txb,poolKey,managerKey → builder(tx)"));
    assert_eq!(call_targets(&chain.executed()[0]), vec!["pool::register_pool"]);
}

#[tokio::test]
async fn test_facade_create_goes_through_deferred_builder() {
    let chain = Arc::new(StubChain {
        object_changes: vec![json!({
            "type": "created",
            "objectType": "0xdee9::balance_manager::BalanceManager",
            "objectRef": { "objectId": CREATED_MANAGER_ID },
        })],
        ..StubChain::new()
    });
    let bot = bot(config(&[PROBING]), chain.clone());

    let outcome = ops::create_manager(&bot).await.unwrap();
    assert_eq!(outcome.staged, Staged::appended("deferred → builder(tx)"));
    assert_eq!(outcome.balance_manager_id.as_deref(), Some(CREATED_MANAGER_ID));
}

#[tokio::test(start_paused = true)]
async fn test_facade_deposit_and_balance_read() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[PROBING, ("DEPOSIT_BASE", "0.5")]), chain.clone());

    let outcome = ops::deposit(&bot).await.unwrap();
    assert_eq!(outcome.deposits[0].staged, Staged::appended("deferred → builder(tx)"));
    assert_eq!(outcome.balances[0].balance, d("1.5"));
    assert_eq!(call_targets(&chain.executed()[0]), vec!["balance_manager::deposit"]);
}

#[tokio::test]
async fn test_facade_level2_round_trips_through_json() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[PROBING]), chain);

    let outcome = ops::l2_snapshot(&bot).await.unwrap();
    assert_eq!(outcome.snapshot.best_bid(), Some(d("1.23")));
    assert_eq!(outcome.snapshot.best_ask(), Some(d("1.25")));
}

#[tokio::test]
async fn test_inspect_sdk_lists_facade_members() {
    let bot = bot(config(&[]), Arc::new(StubChain::new()));

    let inspection = ops::inspect_sdk(&bot.facade()).unwrap();
    let deep_book = &inspection.surfaces[0];
    assert_eq!(deep_book.name, "deepBook");
    assert_eq!(
        deep_book.members,
        vec![
            "accountOpenOrders",
            "cancelAllOrders",
            "cancelOrder",
            "checkManagerBalance",
            "getLevel2Range",
            "midPrice",
            "placeLimitOrder",
            "registerPool",
        ]
    );
    assert_eq!(
        deep_book.matched,
        vec!["accountOpenOrders", "cancelAllOrders", "cancelOrder", "placeLimitOrder"]
    );

    let balance_manager = &inspection.surfaces[1];
    assert!(balance_manager.members.contains(&"registerBalanceManager".to_string()));
    // Plain values are not operations.
    assert!(!balance_manager.members.contains(&"registryId".to_string()));
}
