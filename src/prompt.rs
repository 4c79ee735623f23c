//! Line-oriented prompts over caller-supplied input and output handles
//!
//! Every interactive component receives the same `BufRead`/`Write` pair from
//! the session, so there is exactly one ordered source of user input.

use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Message printed for any unusable menu input
pub const INVALID_SELECTION: &str = "Invalid selection. Please try again.";

/// Whether output goes to a terminal that understands ANSI styling
static STYLING: AtomicBool = AtomicBool::new(false);

/// Text treatments used in menus and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Error,
    Heading,
    Link,
}

/// Turns ANSI styling on or off for the whole process
///
/// Off by default; the binary enables it only when stdout is a terminal.
pub fn set_styling(enabled: bool) {
    STYLING.store(enabled, Ordering::Relaxed);
}

/// Renders `text` with `emphasis`, or unchanged when `enabled` is false
pub fn styled_with(text: &str, emphasis: Emphasis, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    match emphasis {
        Emphasis::Error => text.red().to_string(),
        Emphasis::Heading => text.bold().to_string(),
        Emphasis::Link => text.underlined().to_string(),
    }
}

/// Renders `text` with `emphasis` if styling is enabled
pub fn styled(text: &str, emphasis: Emphasis) -> String {
    styled_with(text, emphasis, STYLING.load(Ordering::Relaxed))
}

/// Reads one line, without its trailing newline
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// garbled line is just another invalid answer. Returns `Ok(None)` once the
/// input is exhausted.
pub fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Parses a 1-based menu choice, accepting only `1..=max`
pub fn parse_selection(line: &str, max: usize) -> Option<usize> {
    line.trim()
        .parse::<usize>()
        .ok()
        .filter(|choice| (1..=max).contains(choice))
}

/// Prints the selection prompt for a menu of `max` items
pub fn write_selection_prompt<W: Write>(output: &mut W, max: usize) -> io::Result<()> {
    write!(output, "\nEnter your selection [1-{}]: ", max)?;
    output.flush()
}

/// Prints the invalid-selection message
pub fn write_invalid_selection<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output, "{}", styled(INVALID_SELECTION, Emphasis::Error))
}

/// Prompts until a choice in `1..=max` is entered
///
/// Returns `Ok(None)` if the input ends first.
pub fn select<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    max: usize,
) -> io::Result<Option<usize>> {
    loop {
        write_selection_prompt(output, max)?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match parse_selection(&line, max) {
            Some(choice) => return Ok(Some(choice)),
            None => write_invalid_selection(output)?,
        }
    }
}

/// Prompts with `label` until `parse` accepts the trimmed line
///
/// `rejection` is printed after every refused line. Returns `Ok(None)` if
/// the input ends first.
pub fn ask<R, W, T>(
    input: &mut R,
    output: &mut W,
    label: &str,
    rejection: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> io::Result<Option<T>>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "\n{}", label)?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match parse(line.trim()) {
            Some(value) => return Ok(Some(value)),
            None => writeln!(output, "{}", styled(rejection, Emphasis::Error))?,
        }
    }
}
