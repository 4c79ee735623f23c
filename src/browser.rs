//! Interactive article browser
//!
//! Renders a cached listing as a numbered menu and drives the selection loop.
//! The loop alternates between two states: the listing menu, and an article's
//! detail which always falls back to the menu. Only the trailing "Back" item
//! leaves the loop.

use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

use crate::data::{parse_listing, Article, ListingParseError};
use crate::prompt::{self, Emphasis};

/// Maximum number of title characters shown in the menu
pub const MAX_TITLE_WIDTH: usize = 70;

/// Marker appended to truncated titles
pub const ELLIPSIS: &str = "...";

/// Errors that end a browsing session abnormally
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The cached body could not be decoded
    #[error("Cached listing is unreadable: {0}")]
    Parse(#[from] ListingParseError),

    /// Reading input or writing output failed
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// How the selection loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserOutcome {
    /// The user chose "Back"
    Back,
    /// Input ended before "Back" was chosen
    InputClosed,
}

/// Position in the selection loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserState {
    /// Waiting for a menu choice
    ListingMenu,
    /// Showing the article at this 0-based index
    DetailShown(usize),
    /// Loop finished
    Exit,
}

impl BrowserState {
    /// Computes the next state for a menu of `shown` articles
    ///
    /// `choice` is the 1-based menu number entered, or `None` for input that
    /// was not a number. Anything outside `1..=shown + 1` keeps the menu.
    pub fn transition(self, choice: Option<usize>, shown: usize) -> BrowserState {
        match self {
            BrowserState::ListingMenu => match choice {
                Some(n) if (1..=shown).contains(&n) => BrowserState::DetailShown(n - 1),
                Some(n) if n == shown + 1 => BrowserState::Exit,
                _ => BrowserState::ListingMenu,
            },
            BrowserState::DetailShown(_) => BrowserState::ListingMenu,
            BrowserState::Exit => BrowserState::Exit,
        }
    }
}

/// Returns the articles to display under `limit`; 0 shows all
pub fn visible_articles(articles: &[Article], limit: usize) -> &[Article] {
    if limit == 0 {
        articles
    } else {
        &articles[..limit.min(articles.len())]
    }
}

/// Shortens `title` to `MAX_TITLE_WIDTH` characters plus `ELLIPSIS`
pub fn truncate_title(title: &str) -> String {
    match title.char_indices().nth(MAX_TITLE_WIDTH) {
        Some((cut, _)) => format!("{}{}", &title[..cut], ELLIPSIS),
        None => title.to_string(),
    }
}

/// Builds the numbered menu lines, ending with the "Back" item
pub fn menu_lines(articles: &[Article]) -> Vec<String> {
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| format!("\t{}. {}", i + 1, truncate_title(&article.title)))
        .chain(std::iter::once(format!("\t{}. Back", articles.len() + 1)))
        .collect()
}

/// Browses listings over a borrowed input/output pair
pub struct ArticleBrowser<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> ArticleBrowser<'a, R, W> {
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self { input, output }
    }

    /// Shows `raw_listing` limited to `limit` articles and runs the selection loop
    pub fn render(&mut self, raw_listing: &str, limit: usize) -> Result<BrowserOutcome, BrowserError> {
        let listing = parse_listing(raw_listing)?;
        let articles = visible_articles(&listing.articles, limit);
        let shown = articles.len();
        let menu = menu_lines(articles);

        debug!(total = listing.articles.len(), shown, limit, "Rendering listing");
        self.write_menu(&menu)?;

        let mut state = BrowserState::ListingMenu;
        loop {
            prompt::write_selection_prompt(self.output, shown + 1)?;
            let Some(line) = prompt::read_line(self.input)? else {
                return Ok(BrowserOutcome::InputClosed);
            };

            state = state.transition(prompt::parse_selection(&line, shown + 1), shown);
            match state {
                BrowserState::ListingMenu => prompt::write_invalid_selection(self.output)?,
                BrowserState::DetailShown(index) => {
                    self.write_detail(&articles[index])?;
                    self.write_menu(&menu)?;
                    state = state.transition(None, shown);
                }
                BrowserState::Exit => return Ok(BrowserOutcome::Back),
            }
        }
    }

    fn write_menu(&mut self, menu: &[String]) -> io::Result<()> {
        writeln!(self.output)?;
        for line in menu {
            writeln!(self.output, "{}", line)?;
        }
        Ok(())
    }

    fn write_detail(&mut self, article: &Article) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", prompt::styled(&article.title, Emphasis::Heading))?;
        if !article.byline.is_empty() {
            writeln!(self.output, "{}", article.byline)?;
        }
        writeln!(
            self.output,
            "Link: {}",
            prompt::styled(&article.short_url, Emphasis::Link)
        )?;
        if !article.abstract_text.is_empty() {
            writeln!(self.output)?;
            writeln!(self.output, "{}", article.abstract_text)?;
        }
        Ok(())
    }
}
