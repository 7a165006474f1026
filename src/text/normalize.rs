//! Whitespace-insensitive text view with a bidirectional index map
//!
//! `NormalizedText::parse` strips leading and trailing spaces/tabs from
//! every line while recording enough per-line metadata to translate any
//! offset between the stripped buffer and the original text. Fuzzy matches
//! run on the stripped view; reports point into the real file.

use crate::{CopytraceError, CopytraceResult};
use serde::{Deserialize, Serialize};

/// Per-line whitespace accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMeta {
    /// 1-based line number
    pub line_number: usize,
    /// Leading spaces/tabs stripped from this line
    pub leading_ws: usize,
    /// Trailing spaces/tabs stripped from this line
    pub trailing_ws: usize,
}

/// A text with per-line whitespace stripped, plus the index map back to the
/// original. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct NormalizedText {
    /// The stripped text. Every line, including a final segment that had no
    /// terminator in the input, ends with `\n` — which makes `parse`
    /// idempotent on its own output.
    pub normalized: String,
    /// One entry per line of the original text
    pub lines: Vec<LineMeta>,
    /// Byte offset in the ORIGINAL text at which each line begins;
    /// strictly increasing
    pub line_starts: Vec<usize>,
    /// Byte offset in `normalized` at which each line begins
    normalized_starts: Vec<usize>,
    /// Byte length of the original text
    pub original_len: usize,
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

impl NormalizedText {
    /// Walk `text` left to right, emitting each line with its surrounding
    /// whitespace removed and recording the index map.
    pub fn parse(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut normalized = String::with_capacity(text.len());
        let mut lines = Vec::new();
        let mut line_starts = Vec::new();
        let mut normalized_starts = Vec::new();

        let mut pos = 0;
        let mut line_number = 1;
        while pos < bytes.len() {
            let line_end = bytes[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |i| pos + i);
            let line = &text[pos..line_end];

            let leading = line.bytes().take_while(|&b| is_blank(b)).count();
            let trailing = if leading == line.len() {
                0
            } else {
                line.bytes().rev().take_while(|&b| is_blank(b)).count()
            };

            line_starts.push(pos);
            normalized_starts.push(normalized.len());
            normalized.push_str(&line[leading..line.len() - trailing]);
            normalized.push('\n');
            lines.push(LineMeta {
                line_number,
                leading_ws: leading,
                trailing_ws: trailing,
            });

            line_number += 1;
            pos = line_end + 1;
        }

        Self {
            normalized,
            lines,
            line_starts,
            normalized_starts,
            original_len: text.len(),
        }
    }

    /// 0-based index of the line whose original byte range contains
    /// `original_index`, by binary search on `line_starts`.
    pub fn find_line_containing(&self, original_index: usize) -> CopytraceResult<usize> {
        let idx = self.line_starts.partition_point(|&s| s <= original_index);
        if idx == 0 {
            return Err(CopytraceError::NotFoundInLines(original_index));
        }
        Ok(idx - 1)
    }

    /// Translate an offset in `normalized` back to the original text.
    ///
    /// The round-trip contract: for any original offset inside a line's
    /// stripped span, `original_index_for(normalized_index_for(i)) == i`.
    pub fn original_index_for(&self, normalized_index: usize) -> usize {
        if self.lines.is_empty() {
            return 0;
        }
        let idx = self
            .normalized_starts
            .partition_point(|&s| s <= normalized_index);
        let line = idx.saturating_sub(1);
        let diff = normalized_index - self.normalized_starts[line];
        self.line_starts[line] + self.lines[line].leading_ws + diff
    }

    /// Translate an original-text offset into `normalized`, clamped into the
    /// line's stripped span.
    pub fn normalized_index_for(&self, original_index: usize) -> CopytraceResult<usize> {
        let line = self.find_line_containing(original_index)?;
        let meta = self.lines[line];
        let line_len = self.line_len(line);
        let content_len = line_len - meta.leading_ws - meta.trailing_ws;

        let offset = original_index - self.line_starts[line];
        let in_content = offset.saturating_sub(meta.leading_ws).min(content_len);
        Ok(self.normalized_starts[line] + in_content)
    }

    /// Original byte length of line `line` (terminator excluded).
    fn line_len(&self, line: usize) -> usize {
        let meta = self.lines[line];
        let content = match self.normalized_starts.get(line + 1) {
            // next normalized start − this start − the '\n' we appended
            Some(&next) => next - self.normalized_starts[line] - 1,
            None => self.normalized.len() - self.normalized_starts[line] - 1,
        };
        content + meta.leading_ws + meta.trailing_ws
    }
}
