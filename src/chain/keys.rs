//! Signing key decoding.

use crate::error::ChainError;
use crate::shared::ObjectIdStr;

use sui_types::base_types::SuiAddress;
use sui_types::crypto::{EncodeDecodeBase64, SuiKeyPair};

/// Bech32 prefix of exported Sui private keys.
pub const PRIVATE_KEY_PREFIX: &str = "suiprivkey";

/// Decode a `suiprivkey…` key (or the legacy base64 `flag ‖ key` form).
/// Only Ed25519 keys are accepted.
pub fn parse_keypair(secret: &str) -> Result<SuiKeyPair, ChainError> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(ChainError::Key("empty private key".to_string()));
    }

    let keypair = if secret.starts_with(PRIVATE_KEY_PREFIX) {
        SuiKeyPair::decode(secret).map_err(|e| ChainError::Key(e.to_string()))?
    } else {
        SuiKeyPair::decode_base64(secret).map_err(|e| ChainError::Key(e.to_string()))?
    };

    match keypair {
        SuiKeyPair::Ed25519(_) => Ok(keypair),
        other => Err(ChainError::Key(format!(
            "Unsupported schema: {:?}",
            other.public().scheme()
        ))),
    }
}

pub fn address_of(keypair: &SuiKeyPair) -> SuiAddress {
    SuiAddress::from(&keypair.public())
}

/// Convert a Sui address into the crate's id newtype.
pub fn to_object_id(address: &SuiAddress) -> Result<ObjectIdStr, ChainError> {
    let s = address.to_string();
    ObjectIdStr::parse(&s).map_err(|reason| ChainError::InvalidId { value: s, reason })
}
