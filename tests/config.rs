//! Loading configuration from an explicit env file.
//!
//! `dotenvy` writes into the process environment, so every case lives in one
//! test to keep the sequence deterministic.

use deepbook_bot::config::{AdapterKind, Config};
use deepbook_bot::error::ConfigError;
use deepbook_bot::network::Network;

use std::io::Write;
use std::path::PathBuf;

const MANAGER: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";

fn write_env_file(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("deepbook-bot-{}-{}.env", name, std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_from_env_file() {
    let missing = std::env::temp_dir().join("deepbook-bot-does-not-exist.env");
    match Config::load(Some(&missing)) {
        Err(ConfigError::Invalid(fields)) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "--env-file");
            assert!(fields[0].message.contains("does-not-exist"));
        }
        Ok(_) => panic!("a missing env file must not load"),
    }

    let path = write_env_file(
        "load",
        &format!(
            "# trading bot\n\
             SUI_ENV=testnet\n\
             SUI_PRIVATE_KEY=suiprivkey1qfile\n\
             BALANCE_MANAGER_ID={MANAGER}\n\
             BALANCE_MANAGER_KEY=MAIN\n\
             DEEPBOOK_ADAPTER=probing\n\
             L2_TICK_SIZE=0.01\n\
             ORDER_IDS=\"4, 5\"\n"
        ),
    );
    let config = Config::load(Some(&path)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.network, Network::Testnet);
    assert_eq!(config.adapter, AdapterKind::Probing);
    assert_eq!(config.pool_key, "SUI_DBUSDC");
    assert!(!config.allow_trading);
    assert_eq!(config.order_ids, Some(vec!["4".to_string(), "5".to_string()]));

    let manager = config.require_manager().unwrap();
    assert_eq!(manager.label, "MAIN");
    assert_eq!(manager.id.as_str(), MANAGER);
    assert_eq!(config.managers.resolve("MAIN").unwrap().id, manager.id);
}
