//! Grid Text Encoding
//!
//! Turns arbitrary text into rows the display can render. Encoding is pure and
//! total: characters the device cannot show are replaced, never rejected.
//!
//! ```text
//! message ──► wrap (word boundaries, hard cut for long tokens)
//!                │
//!                ▼ per line
//!         ASCII coercion ─► trim ─► truncate ─► trim ─► pad
//!                                                       │
//!                          whitelist mask ◄─ ` _ → ' - ◄┘
//! ```
//!
//! Every row produced is exactly `cols` characters wide. Percent-escaping is
//! left to the transport, since a row only becomes a URL segment when sent.

use textwrap::{Options, WordSeparator, WordSplitter, WrapAlgorithm};

use crate::config::GridConfig;

/// Stand-in for characters outside 7-bit ASCII
pub const PLACEHOLDER: char = '?';

/// Replacement for characters outside the device whitelist
pub const MASK: char = '*';

/// Punctuation the device can render
const ALLOWED_PUNCTUATION: &[char] = &['@', '!', '(', ')', '$', '-', '=', '\'', ',', ':', '.', '/'];

/// Whether the device can render `c`
#[must_use]
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
        || ALLOWED_PUNCTUATION.contains(&c)
}

/// Map characters missing from the device charset onto close equivalents
fn substitute(c: char) -> char {
    match c {
        '`' => '\'',
        '_' => '-',
        other => other,
    }
}

fn to_ascii(c: char) -> char {
    if c.is_ascii() {
        c
    } else {
        PLACEHOLDER
    }
}

/// Width-1 stand-in for ASCII control characters while wrapping
///
/// textwrap measures display width, which is zero for control characters and
/// skips escape sequences. Input is ASCII by then, so this never collides.
const CONTROL_STAND_IN: char = '\u{00B7}';

/// Wrap one input line (no `\n`) counting every character as one column
fn wrap_line(line: &str, options: &Options<'_>) -> Vec<String> {
    let mut controls = line.chars().filter(char::is_ascii_control);
    let shielded: String = line
        .chars()
        .map(|c| if c.is_ascii_control() { CONTROL_STAND_IN } else { c })
        .collect();

    let wrapped = textwrap::wrap(&shielded, options);
    if wrapped.is_empty() {
        return vec![String::new()];
    }
    wrapped
        .iter()
        .map(|piece| {
            piece
                .chars()
                .map(|c| {
                    if c == CONTROL_STAND_IN {
                        controls.next().unwrap_or(c)
                    } else {
                        c
                    }
                })
                .collect()
        })
        .collect()
}

/// Encodes text into fixed-width grid rows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentEncoder {
    cols: usize,
}

impl ContentEncoder {
    /// Encoder for rows of `cols` characters (at least one)
    #[must_use]
    pub fn new(cols: usize) -> Self {
        Self { cols: cols.max(1) }
    }

    /// Encoder matching a grid's width
    #[must_use]
    pub fn for_grid(grid: &GridConfig) -> Self {
        Self::new(grid.cols)
    }

    /// Row width
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Encode a message into rows, one per wrapped line
    #[must_use]
    pub fn encode(&self, message: &str) -> Vec<String> {
        self.wrap(message)
            .iter()
            .map(|line| self.encode_line(line))
            .collect()
    }

    /// Split a message into lines of at most `cols` characters
    ///
    /// Lines break at spaces, first-fit. A token longer than a row is cut
    /// into row-sized pieces. Blank input lines are kept. Every character,
    /// control characters included, counts as one column.
    #[must_use]
    pub fn wrap(&self, message: &str) -> Vec<String> {
        let options = Options::new(self.cols)
            .wrap_algorithm(WrapAlgorithm::FirstFit)
            .word_separator(WordSeparator::AsciiSpace)
            .word_splitter(WordSplitter::NoHyphenation)
            .break_words(true);

        let ascii: String = message.chars().map(to_ascii).collect();
        ascii
            .lines()
            .flat_map(|line| wrap_line(line, &options))
            .collect()
    }

    /// Encode a single line into exactly one row
    ///
    /// Applying this to its own output returns the output unchanged.
    #[must_use]
    pub fn encode_line(&self, line: &str) -> String {
        let ascii: String = line.chars().map(to_ascii).collect();
        let trimmed = ascii.trim_end();

        let truncated: String = trimmed.chars().take(self.cols).collect();
        let mut row = truncated.trim_end().to_string();
        let width = row.chars().count();
        row.extend(std::iter::repeat(' ').take(self.cols - width));

        row.chars()
            .map(substitute)
            .map(|c| if is_allowed(c) { c } else { MASK })
            .collect()
    }

    /// A row of spaces
    #[must_use]
    pub fn blank_line(&self) -> String {
        " ".repeat(self.cols)
    }
}

impl Default for ContentEncoder {
    fn default() -> Self {
        Self::for_grid(&GridConfig::default())
    }
}
