//! Text metrics for the document being edited.
//!
//! Planners reason about lines, columns, and end-of-line style without ever
//! touching an editor buffer; this module is the crate's stand-in for the
//! host's text document API. Offsets are byte offsets into the source unless
//! a function says otherwise.

/// End-of-line style detected from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eol {
    Lf,
    CrLf,
}

impl Eol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Eol::Lf => "\n",
            Eol::CrLf => "\r\n",
        }
    }
}

/// Owned source text plus a line-start table.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    line_starts: Vec<usize>,
    eol: Eol,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        let eol = if text.contains("\r\n") { Eol::CrLf } else { Eol::Lf };
        Self {
            text,
            line_starts,
            eol,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn eol(&self) -> Eol {
        self.eol
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Zero-based line index containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insertion) => insertion - 1,
        }
    }

    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts[line]
    }

    /// End of the line including its EOL bytes (start of the next line).
    pub fn line_end(&self, line: usize) -> usize {
        self.line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.text.len())
    }

    /// End of the line's content, excluding EOL bytes.
    pub fn line_content_end(&self, line: usize) -> usize {
        let mut end = self.line_end(line);
        let bytes = self.text.as_bytes();
        let start = self.line_start(line);
        while end > start && (bytes[end - 1] == b'\n' || bytes[end - 1] == b'\r') {
            end -= 1;
        }
        end
    }

    pub fn line_text(&self, line: usize) -> &str {
        &self.text[self.line_start(line)..self.line_content_end(line)]
    }

    /// Column of the first non-whitespace character on `line`; the content
    /// length for a blank line. Indentation is ASCII, so the column doubles
    /// as a byte offset within the line.
    pub fn first_non_ws(&self, line: usize) -> usize {
        let text = self.line_text(line);
        text.len() - text.trim_start_matches([' ', '\t']).len()
    }

    /// Byte offset of the first non-whitespace character on `line`.
    pub fn first_non_ws_offset(&self, line: usize) -> usize {
        self.line_start(line) + self.first_non_ws(line)
    }

    /// First non-whitespace column of the line containing `offset`.
    pub fn indent_col_at(&self, offset: usize) -> usize {
        self.first_non_ws(self.line_of(offset))
    }

    /// UTF-16 code-unit offset corresponding to byte offset `offset`,
    /// the unit editor position APIs count in.
    pub fn utf16_of_byte(&self, offset: usize) -> usize {
        self.text[..offset].chars().map(char::len_utf16).sum()
    }

    /// Byte offset corresponding to a UTF-16 code-unit offset.
    pub fn byte_of_utf16(&self, utf16: usize) -> usize {
        let mut units = 0;
        for (byte_idx, ch) in self.text.char_indices() {
            if units >= utf16 {
                return byte_idx;
            }
            units += ch.len_utf16();
        }
        self.text.len()
    }
}
