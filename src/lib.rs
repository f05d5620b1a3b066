// Library root
// -----------
// This crate exposes the library surface used by the `nftitem-upload`
// binary (`main.rs`).
//
// Module responsibilities:
// - `config`: reads the API base URL and signing secrets, loads `.env` files.
// - `signer`: derives the paying account from a private key or mnemonic.
// - `payment`: the `Fetch` seam and the x402 payment client factory.
// - `api`: the upload, inspect and NFT lookup calls and their result shape.
// - `cli`: flag definitions and action selection.
// - `ui`: runs an action and prints its outcome.
// - `logging`: tracing subscriber setup.
// - `error`: the shared `ClientError` type.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod payment;
pub mod signer;
pub mod ui;

pub use api::{ApiClient, OperationResult, TokenId, UploadRequest};
pub use config::Config;
pub use error::ClientError;
