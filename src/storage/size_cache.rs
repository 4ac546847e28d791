//! Persistent cache of media sizes
//!
//! Feeds need the byte size of every enclosure. Probing a size costs a HEAD
//! request, so sizes are remembered per URL for the lifetime of the store.

use crate::storage::traits::{Storage, StorageResult};
use crate::CrawlError;
use std::future::Future;

/// View of a `Storage` as a URL → size cache
pub struct SizeCache<'a, S: Storage + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: Storage + ?Sized> SizeCache<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Stored size for `url`, `None` if it was never probed
    pub fn get(&self, url: &str) -> StorageResult<Option<u64>> {
        self.store.get_size(url)
    }

    /// Records a probed size
    pub fn put(&mut self, url: &str, size: u64) -> StorageResult<()> {
        self.store.put_size(url, size)
    }

    /// Returns the size of `url`, probing and recording it on a miss
    ///
    /// `prober` runs at most once per URL for the lifetime of the store.
    /// A failed probe records nothing and is returned as is.
    pub async fn get_or_probe<F, Fut>(&mut self, url: &str, prober: F) -> Result<u64, CrawlError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<u64, CrawlError>>,
    {
        if let Some(size) = self.get(url)? {
            tracing::debug!("Size of {} cached: {} bytes", url, size);
            return Ok(size);
        }

        let size = prober(url.to_string()).await?;
        self.put(url, size)?;
        Ok(size)
    }
}
