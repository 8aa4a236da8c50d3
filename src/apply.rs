use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use crate::document::Document;
use crate::tree::Span;

/// The planner's output: a verified byte-span replacement.
///
/// All four edit kinds compile down to this one shape — an insert is a
/// replacement over an empty span. The engine only ever computes plans;
/// applying one to text (or a file) is the collaborator side of the
/// contract and lives here so the CLI and tests have it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PlannedEdit does nothing until it is applied"]
pub struct PlannedEdit {
    /// Replacement text to splice at [start, end).
    pub text: String,
    /// Starting byte offset (inclusive).
    pub start: usize,
    /// Ending byte offset (exclusive); equals `start` for inserts.
    pub end: usize,
    /// Verification of what the span is expected to hold before applying.
    pub expected_before: Verification,
}

/// Verification strategy for apply safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Exact text match required.
    ExactMatch(String),
    /// xxh3 hash of the expected text (faster for large spans).
    Hash(u64),
}

impl Verification {
    /// Create verification from text, using a hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            Verification::Hash(xxh3_64(text.as_bytes()))
        } else {
            Verification::ExactMatch(text.to_string())
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Verification::ExactMatch(expected) => text == expected,
            Verification::Hash(expected) => xxh3_64(text.as_bytes()) == *expected,
        }
    }
}

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("before-text verification failed at [{start}, {end}): found {found:?}")]
    BeforeTextMismatch {
        start: usize,
        end: usize,
        found: String,
    },

    #[error("invalid byte span: [{start}, {end}) in text of length {len}")]
    InvalidSpan {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("span does not fall on character boundaries: [{start}, {end})")]
    NotCharBoundary { start: usize, end: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of applying a planned edit to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { bytes_changed: usize },
    /// The span already holds the new text.
    AlreadyApplied,
}

impl PlannedEdit {
    /// An insert plan at `offset`.
    pub fn insertion(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            start: offset,
            end: offset,
            expected_before: Verification::ExactMatch(String::new()),
        }
    }

    /// A replace/delete/rename plan over `span`.
    pub fn replacement(text: impl Into<String>, span: Span, expected_before: &str) -> Self {
        Self {
            text: text.into(),
            start: span.start,
            end: span.end,
            expected_before: Verification::from_text(expected_before),
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// The plan's span as zero-based UTF-16 code-unit offsets, the unit
    /// editor position APIs count in.
    pub fn utf16_span(&self, document: &Document) -> (usize, usize) {
        (
            document.utf16_of_byte(self.start),
            document.utf16_of_byte(self.end),
        )
    }

    fn validate<'a>(&self, source: &'a str) -> Result<&'a str, ApplyError> {
        if self.start > self.end || self.end > source.len() {
            return Err(ApplyError::InvalidSpan {
                start: self.start,
                end: self.end,
                len: source.len(),
            });
        }
        if !source.is_char_boundary(self.start) || !source.is_char_boundary(self.end) {
            return Err(ApplyError::NotCharBoundary {
                start: self.start,
                end: self.end,
            });
        }
        let current = &source[self.start..self.end];
        if current == self.text {
            return Ok(current);
        }
        if !self.expected_before.matches(current) {
            return Err(ApplyError::BeforeTextMismatch {
                start: self.start,
                end: self.end,
                found: current.to_string(),
            });
        }
        Ok(current)
    }

    /// Splice this plan into `source` and return the edited text.
    pub fn apply_to(&self, source: &str) -> Result<String, ApplyError> {
        self.validate(source)?;
        let mut edited =
            String::with_capacity(source.len() + self.text.len() - (self.end - self.start));
        edited.push_str(&source[..self.start]);
        edited.push_str(&self.text);
        edited.push_str(&source[self.end..]);
        Ok(edited)
    }

    /// Apply this plan to a file atomically (tempfile + rename). Idempotent:
    /// re-applying an already-applied plan reports `AlreadyApplied`.
    pub fn apply_to_file(&self, path: &Path) -> Result<ApplyOutcome, ApplyError> {
        let source = fs::read_to_string(path)?;
        let current = self.validate(&source)?;
        if current == self.text {
            return Ok(ApplyOutcome::AlreadyApplied);
        }
        let edited = self.apply_to(&source)?;
        atomic_write(path, edited.as_bytes())?;
        Ok(ApplyOutcome::Applied {
            bytes_changed: self.text.len(),
        })
    }
}

/// Atomic file write: tempfile in the same directory, flush, rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), ApplyError> {
    let parent = path.parent().ok_or_else(|| {
        ApplyError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        ))
    })?;
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
