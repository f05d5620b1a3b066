// Seam between the operation handlers and the x402 payment machinery.
//
// `Fetch` is the only thing handlers need: send one request, get one
// response back. A plain `reqwest::Client` implements it for unpaid calls;
// `PaymentClientFactory` binds a signer and returns a client that answers 402
// challenges on its own. The challenge format, signature scheme and retry
// policy all belong to `x402-reqwest`.

use crate::error::ClientError;
use alloy_signer_local::PrivateKeySigner;
use reqwest::{Request, Response};
use reqwest_middleware::ClientWithMiddleware;
use std::future::Future;
use std::sync::Arc;
use x402_chain_eip155::v1_eip155_exact::V1Eip155ExactClient;
use x402_chain_eip155::v2_eip155_exact::V2Eip155ExactClient;
use x402_reqwest::{ReqwestWithPayments, ReqwestWithPaymentsBuild, X402Client};

/// Sends a single HTTP request.
pub trait Fetch {
    fn fetch(&self, request: Request) -> impl Future<Output = Result<Response, ClientError>> + Send;
}

impl Fetch for reqwest::Client {
    async fn fetch(&self, request: Request) -> Result<Response, ClientError> {
        Ok(self.execute(request).await?)
    }
}

impl Fetch for ClientWithMiddleware {
    async fn fetch(&self, request: Request) -> Result<Response, ClientError> {
        Ok(self.execute(request).await?)
    }
}

/// Builds a payment-capable client bound to one signer.
pub trait PaymentClientFactory {
    type Client: Fetch;

    fn create(&self, http: &reqwest::Client, signer: PrivateKeySigner) -> Self::Client;
}

/// x402 "exact" EVM payments, protocol versions 1 and 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct X402Payments;

impl PaymentClientFactory for X402Payments {
    type Client = ClientWithMiddleware;

    fn create(&self, http: &reqwest::Client, signer: PrivateKeySigner) -> Self::Client {
        tracing::debug!(payer = %signer.address(), "registering x402 exact EVM scheme");
        let signer = Arc::new(signer);
        let x402 = X402Client::new()
            .register(V1Eip155ExactClient::new(signer.clone()))
            .register(V2Eip155ExactClient::new(signer));
        http.clone().with_payments(x402).build()
    }
}
