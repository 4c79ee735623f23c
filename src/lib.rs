//! Top Stories CLI Library
//!
//! This module exposes the store, section cache, browser and session for use
//! by the binary and in integration tests.

pub mod app;
pub mod browser;
pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod prompt;
pub mod store;
