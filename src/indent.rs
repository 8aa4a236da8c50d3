//! Base indentation inference.
//!
//! The planners reindent everything they emit, so they need to know the
//! document's indent unit. It is derived once per plan invocation from the
//! first nested mapping that actually has a member; a document with no
//! nesting yet falls back to two spaces.

use crate::document::Document;
use crate::parse::Dialect;
use crate::tree::{children, entry_ranges, root_ref, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    pub width: usize,
    pub ch: char,
}

impl Default for Indent {
    fn default() -> Self {
        Self { width: 2, ch: ' ' }
    }
}

impl Indent {
    /// One indent level as a string.
    pub fn unit(&self) -> String {
        self.ch.to_string().repeat(self.width)
    }
}

/// Infer the indent unit from the first object-typed child of the root with
/// at least one member.
///
/// That member sits two levels deep in JSON but only one indent level deep
/// in YAML (the root has no braces and block-sequence dashes occupy the
/// parent column), hence the dialect-specific divisor.
pub fn infer(document: &Document, root: &Node, dialect: Dialect) -> Indent {
    let mut member_start = None;
    for child in children(&root_ref(root), true) {
        if !child.is_object() {
            continue;
        }
        match entry_ranges(&child) {
            Some(ranges) if !ranges.is_empty() => {
                member_start = Some(ranges[0].start);
                break;
            }
            _ => {}
        }
    }
    let Some(start) = member_start else {
        return Indent::default();
    };

    let line = document.line_of(start);
    let col = document.first_non_ws(line);
    if col == 0 {
        return Indent::default();
    }
    let depth = match dialect {
        Dialect::Json => 2,
        Dialect::Yaml => 1,
    };
    let width = (col + depth / 2) / depth;
    if width == 0 {
        return Indent::default();
    }
    let ch = document.line_text(line)[col - 1..col]
        .chars()
        .next()
        .unwrap_or(' ');
    Indent { width, ch }
}
