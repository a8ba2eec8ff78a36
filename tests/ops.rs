//! Operational scripts end to end against an in-memory chain, with the
//! default Move-call adapter.

mod common;

use common::{bot, call_targets, config, id, StubBook, StubChain, CREATED_MANAGER_ID, MANAGER_ID};
use deepbook_bot::adapter::Staged;
use deepbook_bot::chain::ObjectSummary;
use deepbook_bot::error::SdkError;
use deepbook_bot::network::Network;
use deepbook_bot::ops::{self, OrderIdSource, NO_OPEN_ORDERS};
use deepbook_bot::shared::Side;

use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

const TRADING: [(&str, &str); 2] = [("ALLOW_TRADING", "true"), ("CLIENT_ORDER_ID", "42")];

// ── l2_snapshot ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_l2_snapshot_reads_configured_pool() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[]), chain.clone());

    let outcome = ops::l2_snapshot(&bot).await.unwrap();

    assert_eq!(outcome.network, Network::Testnet);
    assert_eq!(outcome.snapshot.pool, "SUI_DBUSDC");
    assert_eq!(outcome.snapshot.bids.prices, vec![d("1.23"), d("1.22")]);
    assert_eq!(outcome.snapshot.bids.quantities, vec![d("1"), d("2")]);
    assert_eq!(outcome.snapshot.best_ask(), Some(d("1.25")));
    assert!(chain.executed().is_empty());
}

#[tokio::test]
async fn test_l2_snapshot_without_asks() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[("L2_INCLUDE_ASKS", "false")]), chain);

    let outcome = ops::l2_snapshot(&bot).await.unwrap();
    assert!(outcome.snapshot.asks.is_none());
    assert_eq!(outcome.snapshot.best_bid(), Some(d("1.23")));
}

// ── place_bad_bid / place_one_order ─────────────────────────────────────────

#[tokio::test]
async fn test_place_bad_bid_refused_without_trading() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[]), chain.clone());

    let err = ops::place_bad_bid(&bot).await.unwrap_err();
    assert!(matches!(err, SdkError::TradingDisabled(_)));
    assert!(err.to_string().contains("ALLOW_TRADING=true"));
    assert!(chain.executed().is_empty());
    assert!(chain.inspected().is_empty());
}

#[tokio::test]
async fn test_place_bad_bid_prices_off_mid() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&TRADING), chain.clone());

    let outcome = ops::place_bad_bid(&bot).await.unwrap();

    assert_eq!(outcome.reference_price, d("1.24"));
    assert_eq!(outcome.order.price, d("0.248"));
    assert_eq!(outcome.order.quantity, d("8.064516129"));
    assert_eq!(outcome.order.side, Side::Bid);
    assert_eq!(outcome.order.client_order_id, 42);
    assert!(outcome.order.pay_with_deep);
    assert_eq!(outcome.digest, "Digest1");
    assert_eq!(outcome.open_orders, Some(vec!["7".to_string()]));

    let executed = chain.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(
        call_targets(&executed[0]),
        vec!["balance_manager::generate_proof_as_owner", "pool::place_limit_order"]
    );
}

#[tokio::test]
async fn test_place_bad_bid_falls_back_to_best_bid() {
    let chain = Arc::new(StubChain {
        book: StubBook {
            mid: None,
            ..StubBook::default()
        },
        ..StubChain::new()
    });
    let bot = bot(config(&TRADING), chain.clone());

    let outcome = ops::place_bad_bid(&bot).await.unwrap();
    assert_eq!(outcome.reference_price, d("1.23"));
    assert_eq!(outcome.order.price, d("0.246"));
}

#[tokio::test]
async fn test_place_bad_bid_empty_book_fails() {
    let chain = Arc::new(StubChain {
        book: StubBook {
            mid: None,
            bids: vec![],
            ..StubBook::default()
        },
        ..StubChain::new()
    });
    let bot = bot(config(&TRADING), chain.clone());

    let err = ops::place_bad_bid(&bot).await.unwrap_err();
    assert!(err.to_string().contains("Could not read best bid/ask"));
    assert!(chain.executed().is_empty());
}

#[tokio::test]
async fn test_failed_order_skips_follow_up_reads() {
    let chain = Arc::new(StubChain::failing());
    let bot = bot(config(&TRADING), chain.clone());

    match ops::place_bad_bid(&bot).await {
        Err(SdkError::ExecutionFailed { digest, error }) => {
            assert_eq!(digest, "Digest1");
            assert!(error.contains("MoveAbort"));
        }
        other => panic!("expected ExecutionFailed, got {:?}", other.map(|o| o.digest)),
    }
    assert!(!chain.inspected().contains(&"account_open_orders".to_string()));
}

#[tokio::test]
async fn test_place_one_order_halves_best_bid() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&TRADING), chain.clone());

    let outcome = ops::place_one_order(&bot).await.unwrap();
    assert_eq!(outcome.reference_price, d("1.23"));
    assert_eq!(outcome.order.price, d("0.615"));
    assert!(!outcome.order.pay_with_deep);
    // Best bid comes from the book, never from the mid price.
    assert!(!chain.inspected().contains(&"mid_price".to_string()));
}

#[tokio::test]
async fn test_bad_bid_mult_overrides_default() {
    let chain = Arc::new(StubChain::new());
    let mut env = TRADING.to_vec();
    env.push(("BAD_BID_MULT", "0.1"));
    let bot = bot(config(&env), chain);

    let outcome = ops::place_one_order(&bot).await.unwrap();
    assert_eq!(outcome.order.price, d("0.123"));
}

// ── cancel_all ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancel_all_uses_order_ids_from_env() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[("ORDER_IDS", "1, 2,3")]), chain.clone());

    let outcome = ops::cancel_all(&bot).await.unwrap();

    assert_eq!(outcome.source, OrderIdSource::Env);
    assert_eq!(outcome.order_ids, vec!["1", "2", "3"]);
    assert_eq!(outcome.report.succeeded_count(), 3);
    assert_eq!(outcome.digest.as_deref(), Some("Digest1"));
    // One proof shared by every cancel; open orders were never read.
    assert_eq!(
        call_targets(&chain.executed()[0]),
        vec![
            "balance_manager::generate_proof_as_owner",
            "pool::cancel_order",
            "pool::cancel_order",
            "pool::cancel_order",
        ]
    );
    assert!(chain.inspected().iter().all(|f| f != "account_open_orders"));
}

#[tokio::test]
async fn test_cancel_all_does_not_require_trading() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[("ALLOW_TRADING", "false")]), chain);

    let outcome = ops::cancel_all(&bot).await.unwrap();
    assert_eq!(outcome.source, OrderIdSource::OpenOrders);
    assert_eq!(outcome.order_ids, vec!["7"]);
}

#[tokio::test]
async fn test_cancel_all_with_nothing_open_is_a_no_op() {
    let chain = Arc::new(StubChain {
        book: StubBook {
            open_orders: vec![],
            ..StubBook::default()
        },
        ..StubChain::new()
    });
    let bot = bot(config(&[]), chain.clone());

    let outcome = ops::cancel_all(&bot).await.unwrap();
    assert_eq!(outcome.message.as_deref(), Some(NO_OPEN_ORDERS));
    assert!(outcome.digest.is_none());
    assert!(outcome.report.is_empty());
    assert!(chain.executed().is_empty());
}

#[tokio::test]
async fn test_cancel_all_partial_failure_submits_the_rest() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[("ORDER_IDS", "11,not-a-number")]), chain.clone());

    let outcome = ops::cancel_all(&bot).await.unwrap();
    assert_eq!(outcome.report.succeeded_keys(), vec!["11"]);
    assert_eq!(outcome.report.failed_count(), 1);
    assert_eq!(chain.executed().len(), 1);
}

#[tokio::test]
async fn test_cancel_all_every_unit_failing_is_an_error() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[("ORDER_IDS", "x,y")]), chain.clone());

    assert!(ops::cancel_all(&bot).await.is_err());
    assert!(chain.executed().is_empty());
}

#[test]
fn test_cancel_plan_one_unit_per_id() {
    let pool = deepbook_bot::domain::pool::known_pool(Network::Testnet, "SUI_DBUSDC").unwrap();
    let manager = deepbook_bot::domain::manager::ManagerRef {
        label: "BM1".to_string(),
        id: id(MANAGER_ID),
    };
    let ids: Vec<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();

    let units = ops::cancel_plan(&pool, &manager, &ids);
    assert_eq!(units.len(), 3);
    assert!(units.iter().all(|u| u.plan.len() == 4));
    assert_eq!(units[2].key, "3");
}

// ── Managers ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_manager_extracts_id() {
    let chain = Arc::new(StubChain {
        object_changes: vec![
            json!({ "type": "mutated", "objectType": "0x2::coin::Coin<0x2::sui::SUI>", "objectId": "0x5" }),
            json!({
                "type": "created",
                "objectType": "0xdee9::balance_manager::BalanceManager",
                "objectId": CREATED_MANAGER_ID,
            }),
        ],
        ..StubChain::new()
    });
    let bot = bot(config(&[]), chain.clone());

    let outcome = ops::create_manager(&bot).await.unwrap();
    assert_eq!(outcome.balance_manager_id.as_deref(), Some(CREATED_MANAGER_ID));
    assert!(outcome.object_changes.is_empty());
    assert_eq!(outcome.staged, Staged::appended("move_call"));
    assert_eq!(
        call_targets(&chain.executed()[0]),
        vec!["balance_manager::new", "transfer::public_share_object"]
    );
}

#[tokio::test]
async fn test_create_manager_reports_unrecognized_changes() {
    let chain = Arc::new(StubChain {
        object_changes: vec![json!({ "type": "created", "objectType": "0x2::coin::Coin", "objectId": "0x9" })],
        ..StubChain::new()
    });
    let bot = bot(config(&[]), chain);

    let outcome = ops::create_manager(&bot).await.unwrap();
    assert!(outcome.balance_manager_id.is_none());
    assert_eq!(outcome.object_changes.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deposit_reads_balances_back() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[("DEPOSIT_BASE", "1.5")]), chain.clone());

    let outcome = ops::deposit(&bot).await.unwrap();
    assert_eq!(outcome.deposits.len(), 1);
    assert_eq!(outcome.deposits[0].coin, "SUI");
    assert_eq!(outcome.balances.len(), 1);
    assert_eq!(outcome.balances[0].balance, d("1.5"));

    let executed = chain.executed();
    assert_eq!(executed.len(), 1);
    // SUI comes out of the gas coin.
    assert_eq!(executed[0].len(), 2);
    assert_eq!(call_targets(&executed[0]), vec!["balance_manager::deposit"]);
}

#[tokio::test]
async fn test_deposit_without_gas_fails_early() {
    let chain = Arc::new(StubChain {
        gas_coins: vec![],
        ..StubChain::new()
    });
    let bot = bot(config(&[("DEPOSIT_BASE", "1")]), chain.clone());

    let err = ops::deposit(&bot).await.unwrap_err();
    assert!(err.to_string().contains("No SUI coins found for gas. Use faucet."));
    assert!(chain.executed().is_empty());
}

#[tokio::test]
async fn test_deposit_needs_an_amount() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[]), chain.clone());

    let err = ops::deposit(&bot).await.unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert!(chain.executed().is_empty());
}

#[tokio::test]
async fn test_operations_requiring_a_manager_explain_how_to_get_one() {
    let chain = Arc::new(StubChain::new());
    let config = deepbook_bot::config::Config::from_lookup(|k| match k {
        "SUI_PRIVATE_KEY" => Some("suiprivkey1qtest".to_string()),
        "DEPOSIT_BASE" => Some("1".to_string()),
        _ => None,
    })
    .unwrap();
    let bot = bot(config, chain);

    let err = ops::deposit(&bot).await.unwrap_err();
    assert!(err.to_string().contains("BALANCE_MANAGER_ID"));
}

#[tokio::test]
async fn test_register_manager_targets_registry() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[]), chain.clone());

    let outcome = ops::register_manager(&bot).await.unwrap();
    assert_eq!(outcome.manager.label, "BM1");
    assert_eq!(
        call_targets(&chain.executed()[0]),
        vec!["balance_manager::register_balance_manager"]
    );
}

#[tokio::test]
async fn test_register_pool_targets_configured_pool() {
    let chain = Arc::new(StubChain::new());
    let bot = bot(config(&[("POOL_KEY", "DEEP_SUI")]), chain.clone());

    let outcome = ops::register_pool(&bot).await.unwrap();
    assert_eq!(outcome.pool, "DEEP_SUI");
    assert_eq!(outcome.staged, Staged::appended("move_call"));
    assert_eq!(call_targets(&chain.executed()[0]), vec!["pool::register_pool"]);
}

#[tokio::test]
async fn test_register_pool_requires_a_manager() {
    let chain = Arc::new(StubChain::new());
    let config = deepbook_bot::config::Config::from_lookup(|k| match k {
        "SUI_PRIVATE_KEY" => Some("suiprivkey1qtest".to_string()),
        _ => None,
    })
    .unwrap();
    let bot = bot(config, chain.clone());

    let err = ops::register_pool(&bot).await.unwrap_err();
    assert!(err.to_string().contains("BALANCE_MANAGER_ID"), "{}", err);
    assert!(chain.executed().is_empty());
}

#[tokio::test]
async fn test_inspect_manager_reports_owner() {
    let mut chain = StubChain::new();
    chain.objects.insert(
        id(MANAGER_ID),
        ObjectSummary {
            object_id: id(MANAGER_ID),
            version: 12,
            object_type: Some("0xdee9::balance_manager::BalanceManager".to_string()),
            owner: json!({ "Shared": { "initial_shared_version": 10 } }),
            shared_version: Some(10),
        },
    );
    let bot = bot(config(&[]), Arc::new(chain));

    let inspection = ops::inspect_manager(&bot).await.unwrap();
    assert!(inspection.object.is_shared());
    assert_eq!(inspection.manager.id, id(MANAGER_ID));
}

#[tokio::test]
async fn test_inspect_manager_missing_object() {
    let bot = bot(config(&[]), Arc::new(StubChain::new()));

    let err = ops::inspect_manager(&bot).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

// ── inspect_tx ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_tx_splits_response() {
    let mut chain = StubChain::new();
    chain.transactions.insert(
        "AbC123".to_string(),
        json!({
            "digest": "AbC123",
            "effects": { "status": { "status": "success" } },
            "events": [{ "type": "0xdee9::order_info::OrderPlaced" }],
            "objectChanges": [{ "type": "mutated", "objectId": "0x1" }],
        }),
    );
    let bot = bot(config(&[]), Arc::new(chain));

    let inspection = ops::inspect_tx(&bot, " AbC123 ").await.unwrap();
    assert!(inspection.summary.is_success());
    assert_eq!(inspection.summary.event_count, 1);
    assert_eq!(inspection.object_changes.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_inspect_tx_requires_digest() {
    let bot = bot(config(&[]), Arc::new(StubChain::new()));
    assert!(matches!(
        ops::inspect_tx(&bot, "  ").await,
        Err(SdkError::Validation(_))
    ));
}
