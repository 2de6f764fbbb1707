//! Cache-aside book metadata fetcher
//!
//! Prefers a cached copy over a remote catalog call; a hit never touches
//! the network. Entries expire after 7 days and there is no other
//! invalidation path. Upstream failures degrade to "absent" rather than
//! propagating an error, so callers cannot distinguish "not found" from
//! "upstream unavailable" -- the distinction lives in the warn logs.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::catalog::{BookCatalog, BookMetadata};
use odeon_common::TtlCache;

/// Cache entries live for 7 days
const CACHE_TTL: Duration = Duration::from_secs(86400 * 7);

/// Cache-aside fetcher over a TTL cache and the remote catalog
pub struct MetadataService {
    cache: Arc<dyn TtlCache>,
    catalog: Arc<dyn BookCatalog>,
}

impl MetadataService {
    pub fn new(cache: Arc<dyn TtlCache>, catalog: Arc<dyn BookCatalog>) -> Self {
        Self { cache, catalog }
    }

    /// Fetch structured metadata for an ISBN, cache first.
    ///
    /// `Ok(None)` covers both "not in the corpus" and "upstream
    /// unavailable". No retry, no backoff.
    pub async fn fetch(&self, isbn: &str) -> Result<Option<BookMetadata>> {
        let cache_key = cache_key(isbn);

        if let Some(bytes) = self.cache.get(&cache_key).await {
            match serde_json::from_slice::<BookMetadata>(&bytes) {
                Ok(metadata) => {
                    debug!(isbn = %isbn, "Metadata cache hit");
                    return Ok(Some(metadata));
                }
                Err(e) => {
                    // Treat an undecodable blob as a miss and refetch.
                    warn!(isbn = %isbn, error = %e, "Discarding corrupt cache entry");
                }
            }
        }

        match self.catalog.search_isbn(isbn).await {
            Ok(Some(metadata)) => {
                let bytes = serde_json::to_vec(&metadata)?;
                self.cache.set(&cache_key, bytes, CACHE_TTL).await;
                debug!(isbn = %isbn, "Metadata cached from catalog");
                Ok(Some(metadata))
            }
            Ok(None) => {
                debug!(isbn = %isbn, "Catalog has no entry for ISBN");
                Ok(None)
            }
            Err(e) => {
                warn!(isbn = %isbn, error = %e, "Catalog lookup failed; treating as absent");
                Ok(None)
            }
        }
    }
}

fn cache_key(isbn: &str) -> String {
    format!("book_{}", isbn)
}
