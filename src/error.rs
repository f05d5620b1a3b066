// Error types shared by every operation of the client.
//
// Configuration and validation variants are raised before any request is
// sent. `Status` is raised by the CLI layer once a completed call comes back
// with a non-success code; it keeps the decoded body so the caller can show
// what the server said.

use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Neither signing secret is configured.
    #[error("UPLOAD requires X402_PRIVATE_KEY or X402_MNEMONIC in env or .env file")]
    MissingSigner,

    #[error("X402_PRIVATE_KEY is not a valid secp256k1 private key: {0}")]
    InvalidPrivateKey(String),

    #[error("X402_MNEMONIC is not a valid mnemonic phrase: {0}")]
    InvalidMnemonic(String),

    #[error("failed to load env file {path}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("--command get requires --get-nft <tokenId>")]
    MissingTokenId,

    #[error("Invalid tokenId: {0}")]
    InvalidTokenId(String),

    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("paid request failed")]
    Payment(#[from] reqwest_middleware::Error),

    /// A request completed with a non-success status.
    #[error("{operation} failed: {status}")]
    Status {
        operation: &'static str,
        status: u16,
        data: Value,
    },
}

impl ClientError {
    /// Response payload carried by the error, if it has a non-empty one.
    pub fn response_data(&self) -> Option<&Value> {
        match self {
            ClientError::Status { data, .. } if !is_empty_payload(data) => Some(data),
            _ => None,
        }
    }
}

fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
