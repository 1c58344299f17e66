use std::iter::FusedIterator;
use std::sync::LazyLock;

use regex::Regex;

use super::labels;

static DELIMITER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[•*\s-]*resultado\s*:?\s*\d*|[-=_─━*]{3,})$").unwrap()
});
static SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)by:\s*@AnoninoBuscasOfcBot").unwrap());

/// How a dump separates one person from the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `• RESULTADO: n` headers or rule lines between blocks.
    Delimited,
    /// Blank lines between blocks (AnoninoBuscasOfcBot exports).
    Paragraphs,
    /// Every name label opens a new block.
    NameAnchored,
}

impl Layout {
    /// Pick the layout of a normalized dump. Delimiters win over the bot
    /// signature; anything else falls back to name anchoring.
    pub fn detect(text: &str) -> Self {
        if text.lines().any(is_delimiter) {
            Layout::Delimited
        } else if SIGNATURE_RE.is_match(text) {
            Layout::Paragraphs
        } else {
            Layout::NameAnchored
        }
    }

    fn is_separator(self, line: &str) -> bool {
        match self {
            Layout::Delimited => is_delimiter(line),
            Layout::Paragraphs => line.trim().is_empty(),
            Layout::NameAnchored => false,
        }
    }

    /// A name line closes the open block in name-anchored dumps, and in the
    /// other layouts once the block already holds a name.
    fn splits_at_name(self, block_has_name: bool) -> bool {
        self == Layout::NameAnchored || block_has_name
    }
}

fn is_delimiter(line: &str) -> bool {
    DELIMITER_RE.is_match(line.trim())
}

/// Lazy iterator over the blocks of a normalized dump.
/// Yields trimmed slices of the input; empty segments are skipped.
pub struct Blocks<'a> {
    text: &'a str,
    pos: usize,
    layout: Layout,
}

impl<'a> Blocks<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_layout(text, Layout::detect(text))
    }

    pub fn with_layout(text: &'a str, layout: Layout) -> Self {
        Blocks { text, pos: 0, layout }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn next_segment(&mut self) -> Option<&'a str> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        let mut start: Option<usize> = None;
        let mut end = 0;
        let mut offset = 0;
        let mut has_name = false;

        for line in rest.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();
            let content = line.trim_end_matches(['\n', '\r']);

            if self.layout.is_separator(content) {
                if let Some(s) = start {
                    self.pos += offset;
                    return Some(rest[s..end].trim());
                }
                continue;
            }
            let is_name = labels::is_name_line(content);
            if let Some(s) = start.filter(|_| is_name && self.layout.splits_at_name(has_name)) {
                self.pos += line_start;
                return Some(rest[s..end].trim());
            }
            has_name |= is_name;
            start.get_or_insert(line_start);
            end = offset;
        }

        self.pos = self.text.len();
        start.map(|s| rest[s..end].trim())
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(segment) = self.next_segment() {
            if !segment.is_empty() {
                return Some(segment);
            }
        }
        None
    }
}

impl FusedIterator for Blocks<'_> {}
