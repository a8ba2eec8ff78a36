//! Network selection and endpoint constants.

use serde::{Deserialize, Serialize};

/// Default fullnode JSON-RPC URL for testnet.
pub const TESTNET_FULLNODE_URL: &str = "https://fullnode.testnet.sui.io:443";

/// Default fullnode JSON-RPC URL for mainnet.
pub const MAINNET_FULLNODE_URL: &str = "https://fullnode.mainnet.sui.io:443";

/// Default DeepBook indexer URL for testnet.
pub const TESTNET_INDEXER_URL: &str = "https://deepbook-indexer.testnet.mystenlabs.com";

/// Default DeepBook indexer URL for mainnet.
pub const MAINNET_INDEXER_URL: &str = "https://deepbook-indexer.mainnet.mystenlabs.com";

/// Shared clock object.
pub const CLOCK_OBJECT_ID: &str = "0x6";

/// The Sui network a run targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    pub fn fullnode_url(&self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_FULLNODE_URL,
            Network::Mainnet => MAINNET_FULLNODE_URL,
        }
    }

    pub fn indexer_url(&self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_INDEXER_URL,
            Network::Mainnet => MAINNET_INDEXER_URL,
        }
    }

    /// Published DeepBook v3 package. Upgrades change this id, so it can be
    /// overridden with `DEEPBOOK_PACKAGE_ID`.
    pub fn deepbook_package_id(&self) -> &'static str {
        match self {
            Network::Testnet => {
                "0xcbf4748a965d469ea3a36cf0ccc5743b96c2d0ae6dee0762ed3eca65fac07f7e"
            }
            Network::Mainnet => {
                "0x2c8d603bc51326b8c13cef9dd07031a408a48dddb541963357661df5d3204809"
            }
        }
    }

    /// DeepBook v3 shared registry object.
    pub fn deepbook_registry_id(&self) -> &'static str {
        match self {
            Network::Testnet => {
                "0x7c256edbda983a2cd6f946655f4bf3f00a41043993781f8674a7046e8c0e11d1"
            }
            Network::Mainnet => {
                "0xaf16199a2dff736e9f07a845f23c5da6df6f756eddb631aed9d24a93efc4549d"
            }
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(format!("expected 'testnet' or 'mainnet', got '{}'", other)),
        }
    }
}
