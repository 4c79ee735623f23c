//! Settings and cache views over the key-value store

use chrono::NaiveDate;
use tracing::warn;

use super::{KeyValueStore, StoreError};
use crate::data::Section;

/// Key holding the API credential
const API_KEY: &str = "api_key";

/// Key holding the display limit
const DISPLAY_LIMIT_KEY: &str = "display_limit";

/// Date format for `fetched_on` values
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cached result of the last successful fetch of one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Calendar day the listing was fetched
    pub fetched_on: NaiveDate,
    /// Unparsed response body
    pub listing: String,
}

/// Access to process-wide user settings
pub trait SettingsStore {
    /// Returns the stored API key
    fn api_key(&self) -> Option<&str>;

    /// Replaces the stored API key
    fn set_api_key(&mut self, key: &str);

    /// Returns the display limit, `None` if never configured
    fn display_limit(&self) -> Option<usize>;

    /// Replaces the display limit; 0 means unbounded
    fn set_display_limit(&mut self, limit: usize);
}

/// Access to per-section cache entries
pub trait CacheStore {
    /// Returns the entry for `section`, if one was ever stored
    fn cache_entry(&self, section: Section) -> Option<CacheEntry>;

    /// Overwrites both fields of the entry for `section`
    fn put_cache_entry(&mut self, section: Section, entry: CacheEntry);

    /// Makes all writes so far durable
    fn flush(&mut self) -> Result<(), StoreError>;
}

fn fetched_on_key(section: Section) -> String {
    format!("section.{}.fetched_on", section.id())
}

fn listing_key(section: Section) -> String {
    format!("section.{}.listing", section.id())
}

impl SettingsStore for KeyValueStore {
    fn api_key(&self) -> Option<&str> {
        self.get(API_KEY)
    }

    fn set_api_key(&mut self, key: &str) {
        self.set(API_KEY, key);
    }

    fn display_limit(&self) -> Option<usize> {
        let raw = self.get(DISPLAY_LIMIT_KEY)?;
        match raw.trim().parse() {
            Ok(limit) => Some(limit),
            Err(_) => {
                warn!(value = raw, "Ignoring unparseable display limit");
                None
            }
        }
    }

    fn set_display_limit(&mut self, limit: usize) {
        self.set(DISPLAY_LIMIT_KEY, limit.to_string());
    }
}

impl CacheStore for KeyValueStore {
    fn cache_entry(&self, section: Section) -> Option<CacheEntry> {
        let fetched_on = self.get(&fetched_on_key(section));
        let listing = self.get(&listing_key(section));

        match (fetched_on, listing) {
            (Some(date), Some(listing)) => match NaiveDate::parse_from_str(date, DATE_FORMAT) {
                Ok(fetched_on) => Some(CacheEntry {
                    fetched_on,
                    listing: listing.to_string(),
                }),
                Err(e) => {
                    warn!(section = section.id(), error = %e, "Cache entry has an invalid date");
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!(section = section.id(), "Cache entry is incomplete, treating as absent");
                None
            }
        }
    }

    fn put_cache_entry(&mut self, section: Section, entry: CacheEntry) {
        self.set(
            fetched_on_key(section),
            entry.fetched_on.format(DATE_FORMAT).to_string(),
        );
        self.set(listing_key(section), entry.listing);
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_store_has_no_settings() {
        let store = KeyValueStore::in_memory();

        assert!(store.api_key().is_none());
        assert!(store.display_limit().is_none());
        assert!(store.cache_entry(Section::World).is_none());
    }

    #[test]
    fn test_display_limit_roundtrip() {
        let mut store = KeyValueStore::in_memory();

        store.set_display_limit(0);
        assert_eq!(store.display_limit(), Some(0));

        store.set_display_limit(12);
        assert_eq!(store.display_limit(), Some(12));
    }

    #[test]
    fn test_garbage_display_limit_reads_as_unset() {
        let mut store = KeyValueStore::in_memory();
        store.set("display_limit", "lots");

        assert!(store.display_limit().is_none());
    }

    #[test]
    fn test_cache_entry_overwrites_both_fields() {
        let mut store = KeyValueStore::in_memory();
        store.put_cache_entry(
            Section::World,
            CacheEntry {
                fetched_on: date(2024, 5, 1),
                listing: "first".to_string(),
            },
        );
        store.put_cache_entry(
            Section::World,
            CacheEntry {
                fetched_on: date(2024, 5, 2),
                listing: "second".to_string(),
            },
        );

        let entry = store.cache_entry(Section::World).expect("Entry should exist");
        assert_eq!(entry.fetched_on, date(2024, 5, 2));
        assert_eq!(entry.listing, "second");
        assert!(store.cache_entry(Section::Technology).is_none());
    }

    #[test]
    fn test_incomplete_entry_is_absent() {
        let mut store = KeyValueStore::in_memory();
        store.set("section.world.fetched_on", "2024-05-01");

        assert!(store.cache_entry(Section::World).is_none());

        let mut store = KeyValueStore::in_memory();
        store.set("section.world.listing", "{}");

        assert!(store.cache_entry(Section::World).is_none());
    }

    #[test]
    fn test_cache_keys_use_lowercase_section_id() {
        let mut store = KeyValueStore::in_memory();
        store.put_cache_entry(
            Section::NyRegion,
            CacheEntry {
                fetched_on: date(2024, 1, 31),
                listing: "{}".to_string(),
            },
        );

        assert_eq!(store.get("section.nyregion.fetched_on"), Some("2024-01-31"));
        assert_eq!(store.get("section.nyregion.listing"), Some("{}"));
    }

    #[test]
    fn test_flush_persists_entries() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("store.json");
        let mut store = KeyValueStore::load(&path).expect("Load should succeed");
        store.set_api_key("0123456789abcdef0123456789abcdef");
        store.put_cache_entry(
            Section::Home,
            CacheEntry {
                fetched_on: date(2024, 5, 1),
                listing: "{\"results\":[]}".to_string(),
            },
        );

        store.flush().expect("Flush should succeed");

        let reloaded = KeyValueStore::load(&path).expect("Reload should succeed");
        assert_eq!(reloaded.api_key(), Some("0123456789abcdef0123456789abcdef"));
        assert_eq!(
            reloaded.cache_entry(Section::Home),
            store.cache_entry(Section::Home)
        );
    }
}
