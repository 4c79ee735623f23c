//! Top Stories CLI - Browse New York Times top stories by section
//!
//! Fetches each section at most once per calendar day, keeps the listing in a
//! local store, and lets the user page through headlines and summaries.

use clap::Parser;
use std::io::{self, IsTerminal};
use std::process;

use topstories::app::Session;
use topstories::cli::{Cli, StartupConfig};
use topstories::data::HttpFetcher;
use topstories::logging;
use topstories::prompt;
use topstories::store::KeyValueStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Reject bad arguments before touching the terminal or the store
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    logging::init_logging();

    let store_path = config
        .store_path
        .clone()
        .unwrap_or_else(KeyValueStore::default_path);
    let store = match KeyValueStore::load(&store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };
    let mut session = Session::new(store, fetcher);

    // Styled text only when a person is watching
    prompt::set_styling(io::stdout().is_terminal());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    if let Err(e) = session
        .run(&mut input, &mut output, config.initial_section)
        .await
    {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }

    Ok(())
}
