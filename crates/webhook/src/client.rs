//! Outbound webhook HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use paylane_core::webhook::{DeliveryError, SIGNATURE_HEADER, WebhookSigner};
use reqwest::header::CONTENT_TYPE;

/// User agent sent with every delivery.
pub const USER_AGENT: &str = "Paylane-Webhook/1.0";

/// Delivers a webhook body to a URL.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// POSTs `body` to `url`. Only a 2xx response counts as delivered.
    async fn send(&self, url: &str, body: &[u8]) -> Result<(), DeliveryError>;
}

/// Signs bodies with HMAC-SHA256 and posts them with a bounded timeout.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    signer: WebhookSigner,
}

impl WebhookClient {
    /// Creates a client whose every request is cut off after `timeout`.
    pub fn new(signer: WebhookSigner, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, signer })
    }
}

#[async_trait]
impl WebhookSender for WebhookClient {
    async fn send(&self, url: &str, body: &[u8]) -> Result<(), DeliveryError> {
        let signature = self.signer.sign(body);

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body.to_vec())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(status.as_u16()))
        }
    }
}

fn classify(err: reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout
    } else if err.is_builder() {
        DeliveryError::InvalidRequest(err.to_string())
    } else {
        DeliveryError::Connection(err.to_string())
    }
}
