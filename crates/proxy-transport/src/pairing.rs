//! Pairing-code resolvers.
//!
//! - [`HttpPairingResolver`] asks the broker: `GET <broker>/pair` must answer
//!   `200` with `{"pairCode": "<code>"}`.
//! - [`StaticResolver`] hands back a code that was known up front (from the
//!   command line or a config file).

use async_trait::async_trait;
use proxy_core::{PairResponse, PairingCode, PairingError, PairingResolver};
use tracing::debug;
use url::Url;

use crate::endpoint::BrokerEndpoint;

/// Requests a fresh pairing code from the broker over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPairingResolver {
    client: reqwest::Client,
    url: Url,
}

impl HttpPairingResolver {
    pub fn new(endpoint: &BrokerEndpoint) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Uses an existing client (shared connection pool, custom TLS, ...).
    pub fn with_client(client: reqwest::Client, endpoint: &BrokerEndpoint) -> Self {
        Self {
            client,
            url: endpoint.pair_url(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl PairingResolver for HttpPairingResolver {
    async fn resolve(&self) -> Result<PairingCode, PairingError> {
        debug!(url = %self.url, "requesting pairing code");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| PairingError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PairingError::Status(status.as_u16()));
        }

        let body: PairResponse = response
            .json()
            .await
            .map_err(|e| PairingError::InvalidBody(e.to_string()))?;
        Ok(PairingCode::new(body.pair_code)?)
    }
}

/// Resolves to a fixed, already-known code.
#[derive(Debug, Clone)]
pub struct StaticResolver(PairingCode);

impl StaticResolver {
    pub fn new(code: PairingCode) -> Self {
        Self(code)
    }
}

#[async_trait]
impl PairingResolver for StaticResolver {
    async fn resolve(&self) -> Result<PairingCode, PairingError> {
        Ok(self.0.clone())
    }
}
