//! Network I/O behind a trait.
//!
//! # Design
//! `NetworkService` is generic over `Transport`, so tests can swap in a stub.
//! The production path uses `ReqwestTransport`, a single pooled
//! `reqwest::Client` shared by every request.
//!
//! Cancellation is all-or-nothing. Every request races the current
//! `CancellationToken`; `cancel_all` cancels that token and installs a fresh
//! one, so requests started afterwards are unaffected.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub const USER_AGENT: &str = concat!("netroute/", env!("CARGO_PKG_VERSION"));

/// Executes built requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and collects the full response.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Aborts every request currently in flight.
    fn cancel_all(&self);
}

/// `Transport` backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
    cancel: ArcSwap<CancellationToken>,
}

impl ReqwestTransport {
    /// Builds a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            cancel: ArcSwap::from_pointee(CancellationToken::new()),
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.method.into(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body: Some(body.to_vec()),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let token = self.cancel.load_full();
        tokio::select! {
            _ = token.cancelled() => Err(TransportError::Cancelled),
            result = self.send(request) => result,
        }
    }

    fn cancel_all(&self) {
        let previous = self.cancel.swap(Arc::new(CancellationToken::new()));
        previous.cancel();
    }
}
