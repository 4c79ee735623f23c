//! Section cache module
//!
//! This module decides when a section listing must be fetched again. Entries
//! are keyed by section and stamped with the calendar day they were fetched;
//! an entry is fresh only on that same day. Failed fetches never replace a
//! previously good entry.

mod manager;

pub use manager::{ListingError, SectionCacheManager};
