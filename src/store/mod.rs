//! Persistent storage for settings and cached section listings
//!
//! A single `KeyValueStore` file backs two logical views: `SettingsStore` for
//! the API key and display limit, and `CacheStore` for per-section cache
//! entries. Callers that only need one concern depend on that trait alone.

mod kv;
mod views;

pub use kv::{KeyValueStore, StoreError};
pub use views::{CacheEntry, CacheStore, SettingsStore};
