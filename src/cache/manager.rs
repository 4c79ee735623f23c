//! Per-day freshness manager for section listings
//!
//! Provides a `SectionCacheManager` that serves a section's listing from the
//! store when it was fetched today, and otherwise performs one remote fetch,
//! validates the body, and overwrites the cache entry.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{parse_listing, Fetcher, ListingParseError, Section, TransportError};
use crate::store::{CacheEntry, CacheStore, StoreError};

/// Errors that can occur when obtaining a section listing
#[derive(Debug, Error)]
pub enum ListingError {
    /// No response was received
    #[error("Unable to reach the API: {0}")]
    Fetch(#[from] TransportError),

    /// The API answered with a non-success status
    #[error("API responded with status {status}")]
    Remote { status: u16 },

    /// The API answered successfully with a body that is not a listing
    #[error("API response could not be read: {0}")]
    Parse(#[from] ListingParseError),

    /// The fetched listing could not be persisted
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ListingError {
    /// Returns true if the session cannot continue after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, ListingError::Store(_))
    }
}

/// Decides per section and per day whether a remote fetch is required
///
/// The manager never owns the store: every call borrows it, so the session
/// keeps control of when the store is loaded and finally persisted.
#[derive(Debug, Clone)]
pub struct SectionCacheManager<F> {
    fetcher: F,
    api_key: String,
}

impl<F: Fetcher> SectionCacheManager<F> {
    /// Creates a manager that authenticates fetches with `api_key`
    pub fn new(fetcher: F, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
        }
    }

    /// Replaces the credential used for subsequent fetches
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    /// Returns the wrapped fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the listing body for `section` as of `today`
    ///
    /// # Behavior
    /// - If the stored entry was fetched on `today`, returns it without network access
    /// - Otherwise fetches once; any date other than `today`, earlier or later, is stale
    /// - On transport failure, error status or unparseable body, the store is untouched
    /// - On success, overwrites the entry, persists the store, and returns the new body
    pub async fn get_or_refresh<S: CacheStore>(
        &self,
        store: &mut S,
        section: Section,
        today: NaiveDate,
    ) -> Result<String, ListingError> {
        if let Some(entry) = store.cache_entry(section) {
            if entry.fetched_on == today {
                debug!(section = section.id(), %today, "Serving section from cache");
                return Ok(entry.listing);
            }
            debug!(
                section = section.id(),
                fetched_on = %entry.fetched_on,
                %today,
                "Cached section is stale"
            );
        }

        info!(section = section.id(), "Fetching section");
        let response = self.fetcher.fetch(section.id(), &self.api_key).await?;

        if !response.is_success() {
            warn!(section = section.id(), status = response.status, "Section fetch rejected");
            return Err(ListingError::Remote {
                status: response.status,
            });
        }

        let listing = String::from_utf8(response.body).map_err(ListingParseError::from)?;
        if let Err(e) = parse_listing(&listing) {
            warn!(section = section.id(), error = %e, "Section response is not a listing");
            return Err(e.into());
        }

        store.put_cache_entry(
            section,
            CacheEntry {
                fetched_on: today,
                listing: listing.clone(),
            },
        );
        store.flush()?;

        Ok(listing)
    }
}
