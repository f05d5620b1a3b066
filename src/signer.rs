// Signing identity resolution for paid uploads.
//
// The private key takes precedence over the mnemonic. Mnemonics derive the
// first account on the standard Ethereum path (m/44'/60'/0'/0/0).

use crate::config::Config;
use crate::error::ClientError;
use alloy_signer_local::coins_bip39::English;
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner};

/// Derive the signer used to pay for uploads.
pub fn resolve_signer(config: &Config) -> Result<PrivateKeySigner, ClientError> {
    if let Some(key) = config.private_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        let hex_key = normalize_private_key(key);
        return hex_key
            .parse::<PrivateKeySigner>()
            .map_err(|e| ClientError::InvalidPrivateKey(e.to_string()));
    }
    if let Some(phrase) = config.mnemonic.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        return MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .build()
            .map_err(|e| ClientError::InvalidMnemonic(e.to_string()));
    }
    Err(ClientError::MissingSigner)
}

/// `abc...` and `0xabc...` name the same key.
pub fn normalize_private_key(key: &str) -> String {
    let key = key.trim();
    if key.starts_with("0x") {
        key.to_string()
    } else {
        format!("0x{key}")
    }
}
