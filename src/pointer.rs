use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("malformed JSON pointer '{input}': {message}")]
    Malformed { input: String, message: String },
}

/// An RFC 6901 JSON Pointer, stored as unescaped segments.
///
/// The empty pointer addresses the document root. Segments are unescaped in
/// memory (`~1` is `/`, `~0` is `~`) and re-escaped on display, so a segment
/// may contain any character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Pointer {
    segments: Vec<String>,
}

impl Pointer {
    /// The empty pointer, addressing the document root.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, PointerError> {
        if input.is_empty() {
            return Ok(Self::root());
        }
        if !input.starts_with('/') {
            return Err(PointerError::Malformed {
                input: input.to_string(),
                message: "pointer must be empty or start with '/'".to_string(),
            });
        }
        let mut segments = Vec::new();
        for raw in input[1..].split('/') {
            segments.push(unescape_segment(raw).map_err(|message| PointerError::Malformed {
                input: input.to_string(),
                message,
            })?);
        }
        Ok(Self { segments })
    }

    /// Build a pointer from unescaped segments.
    pub fn join(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parent pointer; `None` at the root.
    pub fn parent(&self) -> Option<Pointer> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn child(&self, segment: impl Into<String>) -> Pointer {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", escape_segment(segment))?;
        }
        Ok(())
    }
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape_segment(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(format!("'~' must be followed by '0' or '1' in segment '{raw}'")),
        }
    }
    Ok(out)
}
