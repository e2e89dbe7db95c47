//! HTTP asset source backed by reqwest.

use super::AssetFetcher;
use crate::error::{IconError, Result};
use std::time::Duration;
use tracing::debug;

/// Fetches assets from remote mirrors over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with an optional per-request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| unreachable_asset(location, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = location, %status, "asset request failed");
            return Err(IconError::NotFound(location.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| unreachable_asset(location, e))?;
        Ok(bytes.to_vec())
    }
}

/// Transport failures count as a missing asset.
fn unreachable_asset(location: &str, error: reqwest::Error) -> IconError {
    debug!(url = location, error = %error, "asset request failed");
    IconError::NotFound(location.to_string())
}
