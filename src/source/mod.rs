//! Asset fetching.
//!
//! Every descriptor and texture is read through an [`AssetFetcher`], keyed by
//! a location string built from a mirror's base location (see
//! [`MirrorConfig`](crate::config::MirrorConfig)). Locations are URLs for
//! [`HttpFetcher`], relative paths for [`DirectoryFetcher`] and entry names for
//! [`ZipFetcher`].

mod archive;
mod http;
mod memory;

pub use archive::{DirectoryFetcher, ZipFetcher};
pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

use crate::error::Result;
use serde::de::DeserializeOwned;
use std::rc::Rc;

/// Source of raw asset bytes.
///
/// Implementations report a missing asset as
/// [`IconError::NotFound`](crate::IconError::NotFound). Futures are not
/// required to be `Send`; everything runs on one cooperative executor.
#[allow(async_fn_in_trait)]
pub trait AssetFetcher {
    /// Fetch the raw bytes at a location.
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

impl<F: AssetFetcher> AssetFetcher for Rc<F> {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        (**self).fetch(location).await
    }
}

impl<F: AssetFetcher> AssetFetcher for &F {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        (**self).fetch(location).await
    }
}

/// Fetch a location and parse it as JSON.
pub async fn fetch_json<T, F>(fetcher: &F, location: &str) -> Result<T>
where
    T: DeserializeOwned,
    F: AssetFetcher,
{
    let bytes = fetcher.fetch(location).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
