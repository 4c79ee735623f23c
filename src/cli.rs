//! Command-line interface parsing for the Top Stories CLI
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --section flag for opening a section straight away and the --store flag
//! for relocating the settings and cache file.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::data::Section;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified section name is not recognized
    #[error("Invalid section: '{0}'. Valid sections: {}", valid_section_ids())]
    InvalidSection(String),
}

fn valid_section_ids() -> String {
    Section::all()
        .iter()
        .map(|s| s.id())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top Stories CLI - Browse today's top stories by section
#[derive(Parser, Debug)]
#[command(name = "topstories")]
#[command(about = "Browse New York Times top stories by section, cached per day")]
#[command(version)]
pub struct Cli {
    /// Open a section immediately after startup
    ///
    /// Examples:
    ///   topstories --section world
    ///   topstories --section technology
    #[arg(long, value_name = "SECTION")]
    pub section: Option<String>,

    /// Path of the file holding settings and cached listings
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Section to open before showing the main menu
    pub initial_section: Option<Section>,
    /// Store file override
    pub store_path: Option<PathBuf>,
}

/// Parses a section string argument into a Section.
///
/// # Returns
/// * `Ok(Section)` if the string matches a known section
/// * `Err(CliError::InvalidSection)` if it doesn't
pub fn parse_section_arg(s: &str) -> Result<Section, CliError> {
    Section::from_str(s).ok_or_else(|| CliError::InvalidSection(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_section = cli
            .section
            .as_deref()
            .map(parse_section_arg)
            .transpose()?;

        Ok(StartupConfig {
            initial_section,
            store_path: cli.store.clone(),
        })
    }
}
