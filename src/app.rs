//! Session controller for the Top Stories CLI
//!
//! This module owns the store for the lifetime of a run: it onboards a new
//! user, drives the main menu, hands section listings to the browser, and
//! persists the store on every way out.

use chrono::{Local, NaiveDate};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::browser::{ArticleBrowser, BrowserError, BrowserOutcome};
use crate::cache::{ListingError, SectionCacheManager};
use crate::data::{Fetcher, Section};
use crate::prompt::{self, Emphasis};
use crate::store::{KeyValueStore, SettingsStore, StoreError};

/// Where new users register for an API key
pub const SIGN_UP_URL: &str = "https://developer.nytimes.com/get-started";

/// Exact length of a Top Stories API key
pub const API_KEY_LENGTH: usize = 32;

/// Errors that end a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The store file could not be written
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading input or writing output failed
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// An entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Section(Section),
    SetLimit,
    ResetKey,
    Exit,
}

impl MenuChoice {
    /// Number of entries in the main menu
    pub fn count() -> usize {
        Section::all().len() + 3
    }

    /// Maps a 1-based menu number to its entry
    pub fn from_number(n: usize) -> Option<MenuChoice> {
        let sections = Section::all();
        match n.checked_sub(1)? {
            i if i < sections.len() => Some(MenuChoice::Section(sections[i])),
            i if i == sections.len() => Some(MenuChoice::SetLimit),
            i if i == sections.len() + 1 => Some(MenuChoice::ResetKey),
            i if i == sections.len() + 2 => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Whether the session keeps going after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Returns true if `key` is exactly 32 ASCII letters or digits
pub fn is_valid_api_key(key: &str) -> bool {
    key.len() == API_KEY_LENGTH && key.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Formats the display limit for the menu
fn describe_limit(limit: usize) -> String {
    if limit == 0 {
        "all".to_string()
    } else {
        limit.to_string()
    }
}

/// Top-level interactive session
pub struct Session<F> {
    store: KeyValueStore,
    cache: SectionCacheManager<F>,
    clock: Box<dyn Fn() -> NaiveDate>,
}

impl<F: Fetcher> Session<F> {
    /// Creates a session over a loaded store, using the local calendar date
    pub fn new(store: KeyValueStore, fetcher: F) -> Self {
        Self::with_clock(store, fetcher, || Local::now().date_naive())
    }

    /// Creates a session with a custom source of "today"
    pub fn with_clock(
        store: KeyValueStore,
        fetcher: F,
        clock: impl Fn() -> NaiveDate + 'static,
    ) -> Self {
        let api_key = store.api_key().unwrap_or_default().to_string();
        Self {
            store,
            cache: SectionCacheManager::new(fetcher, api_key),
            clock: Box::new(clock),
        }
    }

    /// Returns the session's store
    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    /// Returns the fetcher used for refreshes
    pub fn fetcher(&self) -> &F {
        self.cache.fetcher()
    }

    /// Runs the session until the user exits or input ends
    ///
    /// The store is persisted afterwards whether the session ended normally
    /// or on an error.
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
        initial_section: Option<Section>,
    ) -> Result<(), SessionError> {
        let outcome = self.interact(input, output, initial_section).await;
        if outcome.is_ok() {
            writeln!(output, "\nExiting...")?;
        }

        let persisted = self.store.persist();
        if let Err(e) = &persisted {
            error!(error = %e, "Failed to save store");
        }

        outcome?;
        persisted?;
        Ok(())
    }

    async fn interact<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
        initial_section: Option<Section>,
    ) -> Result<(), SessionError> {
        if self.store.api_key().is_none() && self.acquire_api_key(input, output)? == Flow::Quit {
            return Ok(());
        }

        if self.store.display_limit().is_none() && self.configure_limit(input, output)? == Flow::Quit {
            return Ok(());
        }

        if let Some(section) = initial_section {
            if self.open_section(section, input, output).await? == Flow::Quit {
                return Ok(());
            }
        }

        loop {
            self.write_main_menu(output)?;
            let Some(number) = prompt::select(input, output, MenuChoice::count())? else {
                return Ok(());
            };

            let flow = match MenuChoice::from_number(number) {
                Some(MenuChoice::Section(section)) => self.open_section(section, input, output).await?,
                Some(MenuChoice::SetLimit) => self.configure_limit(input, output)?,
                Some(MenuChoice::ResetKey) => self.acquire_api_key(input, output)?,
                Some(MenuChoice::Exit) => Flow::Quit,
                None => {
                    warn!(number, "Menu number has no entry");
                    prompt::write_invalid_selection(output)?;
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Fetches or recalls a section and browses it
    async fn open_section<R: BufRead, W: Write>(
        &mut self,
        section: Section,
        input: &mut R,
        output: &mut W,
    ) -> Result<Flow, SessionError> {
        let today = (self.clock)();

        let listing = match self.cache.get_or_refresh(&mut self.store, section, today).await {
            Ok(listing) => listing,
            Err(ListingError::Store(e)) => return Err(e.into()),
            Err(ListingError::Remote { status }) => {
                writeln!(
                    output,
                    "{}",
                    prompt::styled(
                        "Failed to retrieve section. Double-check your API key and try again.",
                        Emphasis::Error
                    )
                )?;
                writeln!(output, "Response Code: {}", status)?;
                return Ok(Flow::Continue);
            }
            Err(e) => {
                writeln!(output, "{} {}", prompt::styled("ERROR:", Emphasis::Error), e)?;
                return Ok(Flow::Continue);
            }
        };

        writeln!(output, "\n{}", prompt::styled(section.label(), Emphasis::Heading))?;
        let limit = self.store.display_limit().unwrap_or(0);
        let browsed = ArticleBrowser::new(input, output).render(&listing, limit);
        match browsed {
            Ok(BrowserOutcome::Back) => Ok(Flow::Continue),
            Ok(BrowserOutcome::InputClosed) => Ok(Flow::Quit),
            Err(BrowserError::Parse(e)) => {
                warn!(section = section.id(), error = %e, "Cached listing is unreadable");
                writeln!(output, "{} {}", prompt::styled("ERROR:", Emphasis::Error), e)?;
                Ok(Flow::Continue)
            }
            Err(BrowserError::Io(e)) => Err(e.into()),
        }
    }

    /// Prompts for a new API key until a valid one is entered
    fn acquire_api_key<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Flow, SessionError> {
        writeln!(
            output,
            "To use this tool, you need an API key from the NYT Dev Portal.\n"
        )?;
        writeln!(output, "\t1. Visit {} to create an account.", SIGN_UP_URL)?;
        writeln!(
            output,
            "\t2. Create a new app and enable the Top Stories API. Name the app whatever you want."
        )?;
        writeln!(
            output,
            "\t3. Copy your app's API key from the portal and paste it below."
        )?;

        let key = prompt::ask(
            input,
            output,
            "API Key: ",
            "Invalid key. Please try again.",
            |line| is_valid_api_key(line).then(|| line.to_string()),
        )?;

        let Some(key) = key else {
            return Ok(Flow::Quit);
        };

        self.store.set_api_key(&key);
        self.cache.set_api_key(key);
        info!("API key updated");
        writeln!(output, "Key saved.\n")?;
        Ok(Flow::Continue)
    }

    /// Prompts for the number of articles to show per section
    fn configure_limit<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Flow, SessionError> {
        let limit = prompt::ask(
            input,
            output,
            "How many articles should be listed per section? (0 for all): ",
            "Please enter a whole number, 0 or greater.",
            |line| line.parse::<usize>().ok(),
        )?;

        let Some(limit) = limit else {
            return Ok(Flow::Quit);
        };

        self.store.set_display_limit(limit);
        info!(limit, "Display limit updated");
        writeln!(output, "Display limit saved.\n")?;
        Ok(Flow::Continue)
    }

    fn write_main_menu<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let sections = Section::all();
        let limit = self.store.display_limit().unwrap_or(0);

        writeln!(output, "\nPlease select a section to read, or change a setting:\n")?;
        for (i, section) in sections.iter().enumerate() {
            writeln!(output, "\t{}. {}", i + 1, section.label())?;
        }
        writeln!(
            output,
            "\t{}. Set display limit (current: {})",
            sections.len() + 1,
            describe_limit(limit)
        )?;
        writeln!(output, "\t{}. Reset API key", sections.len() + 2)?;
        writeln!(output, "\t{}. Exit", sections.len() + 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RawResponse, TransportError};
    use crate::store::{CacheStore, SettingsStore};
    use std::cell::Cell;
    use std::io::Cursor;
    use tempfile::TempDir;

    const KEY: &str = "0123456789abcdefABCDEF0123456789";
    const LISTING: &str = r#"{"results":[{"title":"Lead story","byline":"By Kim","short_url":"https://nyti.ms/x","abstract":"Summary"}]}"#;

    /// Fetcher that always answers with the same status and body
    struct FixedFetcher {
        status: u16,
        body: &'static str,
        calls: Cell<usize>,
    }

    impl FixedFetcher {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                calls: Cell::new(0),
            }
        }
    }

    impl Fetcher for FixedFetcher {
        async fn fetch(&self, _section: &str, _api_key: &str) -> Result<RawResponse, TransportError> {
            self.calls.set(self.calls.get() + 1);
            Ok(RawResponse {
                status: self.status,
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn configured_store() -> KeyValueStore {
        let mut store = KeyValueStore::in_memory();
        store.set_api_key(KEY);
        store.set_display_limit(0);
        store
    }

    fn section_number(section: Section) -> usize {
        Section::all().iter().position(|s| *s == section).unwrap() + 1
    }

    async fn run_session(
        session: &mut Session<FixedFetcher>,
        keys: &str,
        initial: Option<Section>,
    ) -> (Result<(), SessionError>, String) {
        let mut input = Cursor::new(keys.to_string());
        let mut output = Vec::new();
        let result = session.run(&mut input, &mut output, initial).await;
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_api_key_validation() {
        assert!(is_valid_api_key(KEY));
        assert!(!is_valid_api_key(&KEY[..31]));
        assert!(!is_valid_api_key(&format!("{}0", KEY)));
        assert!(!is_valid_api_key("0123456789abcdef-123456789abcdef"));
        assert!(!is_valid_api_key(""));
    }

    #[test]
    fn test_menu_choice_numbers() {
        let n = Section::all().len();

        assert_eq!(MenuChoice::from_number(0), None);
        assert_eq!(
            MenuChoice::from_number(1),
            Some(MenuChoice::Section(Section::all()[0]))
        );
        assert_eq!(MenuChoice::from_number(n + 1), Some(MenuChoice::SetLimit));
        assert_eq!(MenuChoice::from_number(n + 2), Some(MenuChoice::ResetKey));
        assert_eq!(MenuChoice::from_number(n + 3), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::from_number(n + 4), None);
        assert_eq!(MenuChoice::count(), n + 3);
    }

    #[test]
    fn test_every_menu_number_has_an_entry() {
        for n in 1..=MenuChoice::count() {
            assert!(MenuChoice::from_number(n).is_some(), "Menu number {} has no entry", n);
        }
        assert_eq!(
            MenuChoice::from_number(MenuChoice::count()),
            Some(MenuChoice::Exit)
        );
    }

    #[tokio::test]
    async fn test_first_run_onboarding() {
        let mut session = Session::with_clock(
            KeyValueStore::in_memory(),
            FixedFetcher::new(200, LISTING),
            today,
        );
        let exit = MenuChoice::count();
        let keys = format!("too-short\n{}\n-1\n5\n{}\n", KEY, exit);

        let (result, output) = run_session(&mut session, &keys, None).await;

        assert!(result.is_ok());
        assert!(output.contains(SIGN_UP_URL));
        assert!(output.contains("Invalid key. Please try again."));
        assert!(output.contains("Key saved."));
        assert!(output.contains("Please enter a whole number"));
        assert!(output.contains("Exiting..."));
        assert_eq!(session.store().api_key(), Some(KEY));
        assert_eq!(session.store().display_limit(), Some(5));
    }

    #[tokio::test]
    async fn test_section_is_fetched_once_per_day() {
        let mut session =
            Session::with_clock(configured_store(), FixedFetcher::new(200, LISTING), today);
        let world = section_number(Section::World);
        let keys = format!("{world}\n2\n{world}\n2\n{}\n", MenuChoice::count());

        let (result, output) = run_session(&mut session, &keys, None).await;

        assert!(result.is_ok());
        assert_eq!(session.fetcher().calls.get(), 1);
        assert_eq!(output.matches("\t1. Lead story").count(), 2);
        assert_eq!(
            session.store().cache_entry(Section::World).map(|e| e.fetched_on),
            Some(today())
        );
    }

    #[tokio::test]
    async fn test_remote_error_reports_status_and_continues() {
        let mut session =
            Session::with_clock(configured_store(), FixedFetcher::new(401, ""), today);
        let keys = format!("1\n{}\n", MenuChoice::count());

        let (result, output) = run_session(&mut session, &keys, None).await;

        assert!(result.is_ok());
        assert!(output.contains("Failed to retrieve section."));
        assert!(output.contains("Response Code: 401"));
        assert!(output.contains("Exiting..."));
        assert!(session.store().cache_entry(Section::all()[0]).is_none());
    }

    #[tokio::test]
    async fn test_parse_error_is_reported() {
        let mut session =
            Session::with_clock(configured_store(), FixedFetcher::new(200, "oops"), today);
        let keys = format!("1\n{}\n", MenuChoice::count());

        let (result, output) = run_session(&mut session, &keys, None).await;

        assert!(result.is_ok());
        assert!(output.contains("ERROR:"));
    }

    #[tokio::test]
    async fn test_initial_section_opens_first() {
        let mut session =
            Session::with_clock(configured_store(), FixedFetcher::new(200, LISTING), today);
        let keys = format!("2\n{}\n", MenuChoice::count());

        let (result, output) = run_session(&mut session, &keys, Some(Section::Technology)).await;

        assert!(result.is_ok());
        assert!(output.contains("Technology"));
        assert!(output.find("Lead story") < output.find("Please select a section"));
        assert!(session.store().cache_entry(Section::Technology).is_some());
    }

    #[tokio::test]
    async fn test_set_limit_and_reset_key() {
        let mut session =
            Session::with_clock(configured_store(), FixedFetcher::new(200, LISTING), today);
        let n = Section::all().len();
        let new_key = "ZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZ";
        let keys = format!("{}\n3\n{}\n{}\n{}\n", n + 1, n + 2, new_key, n + 3);

        let (result, output) = run_session(&mut session, &keys, None).await;

        assert!(result.is_ok());
        assert_eq!(session.store().display_limit(), Some(3));
        assert_eq!(session.store().api_key(), Some(new_key));
        assert!(output.contains("(current: 3)"));
    }

    #[tokio::test]
    async fn test_end_of_input_exits_and_persists() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("store.json");
        let store = KeyValueStore::load(&path).expect("Load should succeed");
        let mut session = Session::with_clock(store, FixedFetcher::new(200, LISTING), today);

        let (result, output) = run_session(&mut session, &format!("{}\n", KEY), None).await;

        assert!(result.is_ok());
        assert!(output.contains("Exiting..."));
        let reloaded = KeyValueStore::load(&path).expect("Reload should succeed");
        assert_eq!(reloaded.api_key(), Some(KEY));
        assert!(reloaded.display_limit().is_none());
    }

    #[tokio::test]
    async fn test_invalid_main_menu_input_reprompts() {
        let mut session =
            Session::with_clock(configured_store(), FixedFetcher::new(200, LISTING), today);
        let keys = format!("0\nworld\n{}\n", MenuChoice::count());

        let (result, output) = run_session(&mut session, &keys, None).await;

        assert!(result.is_ok());
        assert_eq!(output.matches(prompt::INVALID_SELECTION).count(), 2);
        assert_eq!(session.fetcher().calls.get(), 0);
    }
}
