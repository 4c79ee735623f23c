//! Core data models for the Top Stories CLI
//!
//! This module contains the section list, the remote fetcher, and the types a
//! cached listing body is parsed into for display.

pub mod fetcher;
pub mod sections;

pub use fetcher::{Fetcher, HttpFetcher, RawResponse, TransportError};
pub use sections::Section;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Errors that can occur when decoding a listing body
#[derive(Debug, Error)]
pub enum ListingParseError {
    /// The body is not UTF-8 text
    #[error("Listing body is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),

    /// The body is not a Top Stories JSON document
    #[error("Failed to parse listing JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single story from a listing, with display fields sanitized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    /// May be empty
    pub byline: String,
    pub short_url: String,
    /// May be empty
    pub abstract_text: String,
}

/// Ordered stories from one successful fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    /// Section name reported by the API, if any
    pub section: Option<String>,
    /// Timestamp of the last update reported by the API, if any
    pub last_updated: Option<String>,
    /// Stories in source order
    pub articles: Vec<Article>,
}

/// Top Stories response document
#[derive(Debug, Deserialize)]
struct TopStoriesResponse {
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    last_updated: Option<String>,
    results: Vec<StoryRecord>,
}

/// A single result record from the API
#[derive(Debug, Deserialize)]
struct StoryRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    byline: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    short_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    url: String,
    #[serde(default, rename = "abstract", deserialize_with = "null_as_empty")]
    abstract_text: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<StoryRecord> for Article {
    fn from(record: StoryRecord) -> Self {
        let link = if record.short_url.trim().is_empty() {
            record.url
        } else {
            record.short_url
        };

        Article {
            title: sanitize(&record.title),
            byline: sanitize(&record.byline),
            short_url: sanitize(&link),
            abstract_text: sanitize(&record.abstract_text),
        }
    }
}

/// Removes every non-printable character from `s`
pub fn sanitize(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

/// Decodes a raw listing body into its ordered articles
pub fn parse_listing(raw: &str) -> Result<Listing, ListingParseError> {
    let response: TopStoriesResponse = serde_json::from_str(raw)?;

    Ok(Listing {
        section: response.section,
        last_updated: response.last_updated,
        articles: response.results.into_iter().map(Article::from).collect(),
    })
}
