//! In-memory asset source.

use super::AssetFetcher;
use crate::error::{IconError, Result};
use std::cell::RefCell;
use std::collections::HashMap;

/// Serves assets from a map of location to bytes and counts every request.
///
/// Each fetch yields to the executor once before answering, so concurrent
/// resolution chains interleave the way they do against a real network.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    assets: RefCell<HashMap<String, Vec<u8>>>,
    requests: RefCell<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset.
    pub fn insert(&self, location: impl Into<String>, data: Vec<u8>) {
        self.assets.borrow_mut().insert(location.into(), data);
    }

    /// Add a JSON asset.
    pub fn insert_json(&self, location: impl Into<String>, value: &serde_json::Value) {
        self.insert(location, value.to_string().into_bytes());
    }

    /// How many times a location was requested, found or not.
    pub fn request_count(&self, location: &str) -> usize {
        self.requests.borrow().get(location).copied().unwrap_or(0)
    }

    /// Total number of requests served.
    pub fn total_requests(&self) -> usize {
        self.requests.borrow().values().sum()
    }
}

impl AssetFetcher for MemoryFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        *self
            .requests
            .borrow_mut()
            .entry(location.to_string())
            .or_default() += 1;

        tokio::task::yield_now().await;

        self.assets
            .borrow()
            .get(location)
            .cloned()
            .ok_or_else(|| IconError::NotFound(location.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_asset_is_not_found() {
        let fetcher = MemoryFetcher::new();
        let err = fetcher.fetch("nope").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fetcher.request_count("nope"), 1);
    }

    #[tokio::test]
    async fn test_counts_requests() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert("a", vec![1, 2, 3]);

        assert_eq!(fetcher.fetch("a").await.unwrap(), vec![1, 2, 3]);
        assert_eq!(fetcher.fetch("a").await.unwrap(), vec![1, 2, 3]);
        assert_eq!(fetcher.request_count("a"), 2);
        assert_eq!(fetcher.total_requests(), 2);
    }
}
