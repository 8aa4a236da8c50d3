//! Span-recording parsers for the two OpenAPI dialects.
//!
//! Both parsers produce the [`crate::tree::Node`] tree: plain values plus
//! byte spans for every key and value token. They are deliberately not
//! general-purpose — they cover what well-formed OpenAPI documents contain
//! and reject the rest, so planners never have to reason about constructs
//! the range model cannot represent.

mod json;
mod yaml;

use thiserror::Error;

use crate::tree::Node;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("unsupported construct at offset {offset}: {message}")]
    Unsupported { offset: usize, message: String },
}

/// Source dialect of the document being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Json,
    Yaml,
}

impl Dialect {
    /// Dialect from a file extension, defaulting to YAML for the common
    /// `.yaml`/`.yml` pair.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "json" => Some(Dialect::Json),
            "yaml" | "yml" => Some(Dialect::Yaml),
            _ => None,
        }
    }
}

/// Parse `text` into a span-carrying tree, or fail with the first error.
pub fn safe_parse(text: &str, dialect: Dialect) -> Result<Node, ParseError> {
    match dialect {
        Dialect::Json => json::parse(text),
        Dialect::Yaml => yaml::parse(text),
    }
}
