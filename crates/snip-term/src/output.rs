use std::{
    collections::HashSet,
    io::{self, Write},
    result::Result as StdResult,
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

/// Spaces between table columns.
const COLUMN_GAP: usize = 3;

/// ASCII control representation of `Ctrl+C`.
const CTRL_C: char = '\u{3}';
/// ASCII control representation of `Ctrl+D`.
const CTRL_D: char = '\u{4}';

/// Lowercase `ch`, keeping the first codepoint of multi-char expansions.
fn fold(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// Determine whether the combination of `code` and `modifiers` represents an
/// interactive cancellation such as `Ctrl+C`, `Ctrl+D`, or `Esc`.
fn is_cancel_key(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char(ch) => {
            if modifiers.contains(KeyModifiers::CONTROL) && matches!(fold(ch), 'c' | 'd') {
                return true;
            }

            matches!(ch, CTRL_C | CTRL_D)
        }
        KeyCode::Esc => true,
        _ => false,
    }
}

/// Errors produced by [`Output`] implementations when interacting with the user
/// or the terminal.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The requested operation is not supported by this output backend.
    #[error("{0}")]
    Unsupported(&'static str),

    /// The caller supplied invalid input (e.g. empty options for a selector).
    #[error("{0}")]
    InvalidInput(&'static str),

    /// A terminal/TTY related failure occurred.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Underlying I/O error while writing/reading to the terminal.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The user cancelled an interactive prompt.
    #[error("Selection cancelled")]
    Cancelled,
}

/// Convenience alias for output-related fallible operations.
pub type Result<T> = StdResult<T, OutputError>;

/// Abstraction over how user-facing messages, tables and prompts are produced.
pub trait Output: Send + Sync {
    /// Print an informational message.
    fn message(&self, msg: &str) -> Result<()>;
    /// Print a success message.
    fn success(&self, msg: &str) -> Result<()>;
    /// Print a warning message.
    fn warn(&self, msg: &str) -> Result<()>;
    /// Print an error/failure message.
    fn fail(&self, msg: &str) -> Result<()>;
    /// Render `rows` as aligned columns under `headers`, with an optional title.
    fn table(&self, title: Option<&str>, headers: &[&str], rows: &[Vec<String>]) -> Result<()>;
    /// Present a list of `options` and return the chosen index.
    fn select(&self, prompt: &str, options: Vec<String>) -> Result<usize>;
    /// Flush any buffered output.
    fn finish(&self) -> Result<()>;
}

/// Output implementation that suppresses all messages and rejects interactive
/// prompts. Useful for non-interactive or test environments.
pub struct Quiet;

impl Output for Quiet {
    fn message(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn success(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn warn(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn fail(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn table(&self, _title: Option<&str>, _headers: &[&str], _rows: &[Vec<String>]) -> Result<()> {
        Ok(())
    }

    fn select(&self, _prompt: &str, _options: Vec<String>) -> Result<usize> {
        Err(OutputError::Unsupported(
            "Cannot prompt for selection in quiet mode",
        ))
    }

    fn finish(&self) -> Result<()> {
        Ok(())
    }
}

/// Width of each column: the widest of its header and cells, in characters.
fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(idx) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

/// Color for the cell in column `idx`.
fn column_color(idx: usize) -> Option<Color> {
    match idx {
        0 => Some(Color::Cyan),
        1 => Some(Color::Yellow),
        _ => None,
    }
}

/// Color-capable terminal renderer for user messages and prompts.
pub struct Terminal {
    /// Whether to emit ANSI color sequences when writing to stdout.
    color_choice: ColorChoice,
}

impl Terminal {
    /// Create a new terminal output.
    ///
    /// - `color`: when `true`, always render colored output; when `false`,
    ///   disable ANSI colors.
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        Self { color_choice }
    }

    /// Write `msg` as a full line using `color`.
    fn write_colored(&self, msg: &str, color: Color) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);
        stdout.set_color(ColorSpec::new().set_fg(Some(color)))?;
        writeln!(stdout, "{msg}")?;
        stdout.reset()?;
        stdout.flush()?;
        Ok(())
    }

    /// Write one padded table line, coloring cells with `color_of`.
    fn write_row<F>(
        &self,
        stdout: &mut StandardStream,
        cells: &[String],
        widths: &[usize],
        color_of: F,
    ) -> Result<()>
    where
        F: Fn(usize) -> Option<Color>,
    {
        let last = cells.len().saturating_sub(1);
        for (idx, cell) in cells.iter().enumerate() {
            stdout.set_color(ColorSpec::new().set_fg(color_of(idx)))?;
            if idx == last {
                write!(stdout, "{cell}")?;
            } else {
                let width = widths.get(idx).copied().unwrap_or(0);
                write!(stdout, "{cell:<width$}{:gap$}", "", gap = COLUMN_GAP)?;
            }
            stdout.reset()?;
        }
        writeln!(stdout)?;
        Ok(())
    }

    /// Generate mnemonic shortcuts for the provided `options` list.
    fn generate_shortcuts(&self, options: &[String]) -> Vec<char> {
        let mut used = HashSet::new();
        options
            .iter()
            .map(|option| {
                // First unused letter of the label, then a digit, then any letter.
                let shortcut = option
                    .chars()
                    .filter(|ch| ch.is_alphabetic())
                    .map(fold)
                    .find(|ch| !used.contains(ch))
                    .or_else(|| ('1'..='9').find(|ch| !used.contains(ch)))
                    .or_else(|| ('a'..='z').find(|ch| !used.contains(ch)));
                match shortcut {
                    Some(ch) => {
                        used.insert(ch);
                        ch
                    }
                    None => '?',
                }
            })
            .collect()
    }

    /// Render `option` while highlighting `shortcut` within the label when possible.
    fn print_option_with_shortcut(&self, option: &str, shortcut: char) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);

        let matched = option
            .char_indices()
            .find(|(_, ch)| fold(*ch) == shortcut);

        if let Some((idx, ch)) = matched {
            write!(stdout, "{}", &option[..idx])?;
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            write!(stdout, "{ch}")?;
            stdout.reset()?;
            write!(stdout, "{}", &option[idx + ch.len_utf8()..])?;
        } else {
            write!(stdout, "[{shortcut}] {option}")?;
        }

        writeln!(stdout)?;
        stdout.flush()?;
        Ok(())
    }
}

impl Output for Terminal {
    fn message(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Cyan)
    }

    fn success(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Green)
    }

    fn warn(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Rgb(255, 165, 0)) // Orange
    }

    fn fail(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Red)
    }

    fn table(&self, title: Option<&str>, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let widths = column_widths(headers, rows);
        let mut stdout = StandardStream::stdout(self.color_choice);

        if let Some(title) = title {
            stdout.set_color(ColorSpec::new().set_bold(true))?;
            writeln!(stdout, "{title}")?;
            stdout.reset()?;
        }

        let headers: Vec<String> = headers.iter().map(ToString::to_string).collect();
        self.write_row(&mut stdout, &headers, &widths, |_| Some(Color::Magenta))?;
        for row in rows {
            self.write_row(&mut stdout, row, &widths, column_color)?;
        }

        stdout.flush()?;
        Ok(())
    }

    fn select(&self, prompt: &str, options: Vec<String>) -> Result<usize> {
        if options.is_empty() {
            return Err(OutputError::InvalidInput(
                "No options provided for selection",
            ));
        }

        let shortcuts = self.generate_shortcuts(&options);

        println!("{prompt}");
        for (option, shortcut) in options.iter().zip(shortcuts.iter()) {
            print!("  ");
            self.print_option_with_shortcut(option, *shortcut)?;
        }

        print!(" > ");
        io::stdout().flush()?;

        // Raw mode for a single key press; restored below on every path.
        terminal::enable_raw_mode().map_err(|e| OutputError::Terminal(e.to_string()))?;

        let result = (|| -> Result<(usize, char)> {
            loop {
                if let Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind,
                    ..
                }) = event::read().map_err(|e| OutputError::Terminal(e.to_string()))?
                {
                    if kind != KeyEventKind::Press {
                        continue;
                    }

                    if is_cancel_key(code, modifiers) {
                        return Err(OutputError::Cancelled);
                    }

                    if let KeyCode::Char(ch) = code {
                        let ch = fold(ch);
                        if let Some(index) = shortcuts.iter().position(|&s| s == ch) {
                            return Ok((index, ch));
                        }
                    }
                }
            }
        })();

        terminal::disable_raw_mode().map_err(|e| OutputError::Terminal(e.to_string()))?;

        match result {
            Ok((index, ch)) => {
                println!("{ch}");
                Ok(index)
            }
            Err(OutputError::Cancelled) => {
                println!();
                Err(OutputError::Cancelled)
            }
            Err(e) => Err(e),
        }
    }

    fn finish(&self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }
}
