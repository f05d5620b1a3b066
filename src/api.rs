// API client module: the three calls the CLI makes against the nftitem API
// gateway. Paid uploads go through the payment client built from the
// configured signer; inspection and NFT lookups are plain HTTP.

use crate::config::Config;
use crate::error::ClientError;
use crate::payment::{Fetch, PaymentClientFactory, X402Payments};
use crate::signer::resolve_signer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const UPLOAD_PATH: &str = "/upload";
pub const NFTS_PATH: &str = "/nfts";
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// 2x2 green PNG uploaded when no file is given.
pub const GREEN_SQUARE_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAIAAAACCAIAAAD91JpzAAAAD0lEQVR4nGNg+M8AQhAKABvyA/1tVLjHAAAAAElFTkSuQmCC";

/// Image payload for `/upload`. Built from raw bytes, so `content` is always
/// valid base64.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub content: String,
    pub content_type: String,
}

impl UploadRequest {
    /// Encode raw bytes with the default content type.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        UploadRequest {
            content: STANDARD.encode(bytes),
            content_type: DEFAULT_CONTENT_TYPE.into(),
        }
    }

    pub fn green_square() -> Self {
        UploadRequest {
            content: GREEN_SQUARE_PNG_BASE64.into(),
            content_type: DEFAULT_CONTENT_TYPE.into(),
        }
    }

    pub async fn from_file(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read upload content");
        Ok(Self::from_bytes(&bytes))
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// Body sent to `/upload`, identical for paid and unpaid calls.
#[derive(Serialize, Debug)]
pub struct UploadEnvelope<'a> {
    pub command: &'static str,
    pub data: &'a UploadRequest,
}

impl<'a> UploadEnvelope<'a> {
    pub fn new(data: &'a UploadRequest) -> Self {
        UploadEnvelope { command: "UPLOAD", data }
    }
}

/// NFT token id. Only non-negative integers are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(u64);

impl TokenId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TokenId {
    fn from(id: u64) -> Self {
        TokenId(id)
    }
}

impl FromStr for TokenId {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(TokenId)
            .map_err(|_| ClientError::InvalidTokenId(s.to_string()))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Normalized outcome of one API call.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OperationResult {
    pub ok: bool,
    pub status: u16,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl OperationResult {
    /// `data.url`, as returned by the NFT lookup.
    pub fn url(&self) -> Option<&str> {
        self.data.get("url").and_then(Value::as_str)
    }

    /// Turn a non-success result into a `Status` error.
    pub fn error_for_status(self, operation: &'static str) -> Result<Self, ClientError> {
        if self.ok {
            Ok(self)
        } else {
            Err(ClientError::Status {
                operation,
                status: self.status,
                data: self.data,
            })
        }
    }
}

/// API client holding the plain HTTP client, the configuration and the
/// factory used to build payment-capable clients for paid calls.
#[derive(Clone)]
pub struct ApiClient<P = X402Payments> {
    client: Client,
    config: Config,
    payments: P,
}

impl ApiClient {
    /// Client backed by real x402 payments.
    pub fn new(config: Config) -> Result<Self, ClientError> {
        Self::with_payments(config, X402Payments)
    }
}

impl<P: PaymentClientFactory> ApiClient<P> {
    pub fn with_payments(config: Config, payments: P) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            config,
            payments,
        })
    }

    /// POST the content to /upload, paying for it if the gateway asks.
    /// Fails before sending anything when no signer is configured.
    pub async fn upload_with_payment(&self, upload: &UploadRequest) -> Result<OperationResult, ClientError> {
        self.prepare_upload(upload)?.send().await
    }

    /// Resolve the signer, bind a payment client and build the upload
    /// request. Prints the target URL; nothing goes over the wire until
    /// `PaidUpload::send`.
    pub fn prepare_upload(&self, upload: &UploadRequest) -> Result<PaidUpload<P::Client>, ClientError> {
        let signer = resolve_signer(&self.config)?;
        tracing::info!(payer = %signer.address(), "resolved upload signer");
        let paying = self.payments.create(&self.client, signer);

        let url = self.config.url(UPLOAD_PATH);
        println!("Uploading to: {}", url);

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&UploadEnvelope::new(upload))
            .build()?;
        Ok(PaidUpload {
            client: paying,
            request,
        })
    }

    /// Same request as `upload_with_payment` without the payment flow, so
    /// the raw 402 challenge comes back with its headers.
    pub async fn inspect_upload(&self, upload: &UploadRequest) -> Result<OperationResult, ClientError> {
        let url = self.config.url(UPLOAD_PATH);
        println!("Inspecting (no payment): {}", url);

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&UploadEnvelope::new(upload))
            .build()?;
        let response = self.client.fetch(request).await?;
        normalize(response, true).await
    }

    /// GET /nfts/{id}. The id is validated before any request is made.
    pub async fn get_nft_url(&self, token_id: &str) -> Result<OperationResult, ClientError> {
        let id: TokenId = token_id.parse()?;
        self.get_nft(id).await
    }

    pub async fn get_nft(&self, id: TokenId) -> Result<OperationResult, ClientError> {
        let url = format!("{}/{}", self.config.url(NFTS_PATH), id);
        tracing::debug!(%url, "looking up nft");
        let request = self.client.get(&url).build()?;
        let response = self.client.fetch(request).await?;
        normalize(response, false).await
    }
}

/// An upload request bound to a payment-capable client, not yet sent.
pub struct PaidUpload<C> {
    client: C,
    request: Request,
}

impl<C: Fetch> PaidUpload<C> {
    pub async fn send(self) -> Result<OperationResult, ClientError> {
        let response = self.client.fetch(self.request).await?;
        normalize(response, false).await
    }
}

/// Decode a response body as JSON.
pub fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(body)
}

async fn normalize(response: Response, with_headers: bool) -> Result<OperationResult, ClientError> {
    let status = response.status();
    let headers = with_headers.then(|| header_map(response.headers()));
    let body = response.bytes().await?;
    // Unparseable bodies become `{}`; the excerpt is logged so error pages are not lost.
    let data = parse_body(&body).unwrap_or_else(|err| {
        let excerpt: String = String::from_utf8_lossy(&body).chars().take(200).collect();
        tracing::warn!(status = status.as_u16(), %err, body = %excerpt, "response body is not JSON");
        Value::Object(Map::new())
    });
    tracing::debug!(status = status.as_u16(), "response received");
    Ok(OperationResult {
        ok: status.is_success(),
        status: status.as_u16(),
        data,
        headers,
    })
}

/// Flatten headers into a name -> value map; repeated names are joined.
fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    #[test]
    fn envelope_shape() {
        let upload = UploadRequest::green_square();
        let body = serde_json::to_value(UploadEnvelope::new(&upload)).unwrap();
        assert_eq!(
            body,
            json!({
                "command": "UPLOAD",
                "data": {"content": GREEN_SQUARE_PNG_BASE64, "contentType": "image/png"}
            })
        );
    }

    #[test]
    fn from_bytes_encodes_standard_base64() {
        let upload = UploadRequest::from_bytes(b"hello");
        assert_eq!(upload.content, "aGVsbG8=");
        assert_eq!(upload.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn token_ids() {
        assert_eq!("93".parse::<TokenId>().unwrap().get(), 93);
        assert_eq!(" 0 ".parse::<TokenId>().unwrap().get(), 0);
        for bad in ["abc", "", "NaN", "Infinity", "-1", "1.5", "9e99"] {
            let err = bad.parse::<TokenId>().unwrap_err();
            assert!(matches!(err, ClientError::InvalidTokenId(ref s) if s == bad), "{bad}");
        }
    }

    #[test]
    fn parse_body_reports_failures() {
        assert_eq!(parse_body(br#"{"url":"x"}"#).unwrap(), json!({"url": "x"}));
        assert!(parse_body(b"<html>").is_err());
        assert!(parse_body(b"").is_err());
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("x-thing", HeaderValue::from_static("a"));
        headers.append("x-thing", HeaderValue::from_static("b"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let map = header_map(&headers);
        assert_eq!(map["x-thing"], "a, b");
        assert_eq!(map["content-type"], "application/json");
    }

    #[test]
    fn error_for_status_keeps_body() {
        let result = OperationResult {
            ok: false,
            status: 404,
            data: json!({"error": "not found"}),
            headers: None,
        };
        match result.error_for_status("GET nft") {
            Err(ClientError::Status { status, data, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(data, json!({"error": "not found"}));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn url_lookup() {
        let result = OperationResult {
            ok: true,
            status: 200,
            data: json!({"url": "https://cdn.example/93.png"}),
            headers: None,
        };
        assert_eq!(result.url(), Some("https://cdn.example/93.png"));
    }
}
