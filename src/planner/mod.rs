//! Edit planners: pure functions from an [`EditContext`] to a
//! [`PlannedEdit`].
//!
//! One implementation per (operation, dialect) pair; nothing here mutates
//! the tree or the document. The plan describes an edit the collaborator
//! applies to live text, and every range the planners hand out is computed
//! against the one immutable snapshot held by the context.

pub mod errors;
pub mod json;
pub mod yaml;

pub use errors::PlanError;

use serde_json::Value;

use crate::apply::PlannedEdit;
use crate::document::Document;
use crate::fix::{Fix, Issue, OasVersion};
use crate::indent::Indent;
use crate::parse::Dialect;
use crate::sources::RefMapper;
use crate::tree::{key_range, Node, NodeRef};

/// Ephemeral aggregate for one plan invocation. Owns nothing; discarded
/// once the plan is produced.
pub struct EditContext<'a> {
    pub fix: &'a Fix,
    pub root: &'a Node,
    pub target: NodeRef<'a>,
    pub dialect: Dialect,
    /// Render placeholders instead of literal values.
    pub snippet: bool,
    pub indent: Indent,
    pub document: &'a Document,
    pub issues: &'a [Issue],
    pub version: OasVersion,
    pub bundle: Option<&'a Value>,
    pub mapper: Option<&'a dyn RefMapper>,
}

impl EditContext<'_> {
    pub(crate) fn source_text(&self, start: usize, end: usize) -> &str {
        &self.document.text()[start..end]
    }
}

/// Replace the key token only; the value is untouched. Key spans are
/// dialect-agnostic, so both dialects share this planner.
pub fn rename_key(ctx: &EditContext<'_>, value: String) -> Result<PlannedEdit, PlanError> {
    if ctx.target.pointer.is_root() {
        return Err(PlanError::unsupported("the document root has no key"));
    }
    let span = key_range(ctx.root, &ctx.target).ok_or_else(|| {
        PlanError::unsupported(format!(
            "array item '{}' has no key to rename",
            ctx.target.pointer
        ))
    })?;
    Ok(PlannedEdit::replacement(
        value,
        span,
        ctx.source_text(span.start, span.end),
    ))
}

/// Reindent `text` for splicing at column `padding`.
///
/// Prefixes the first line with the padding (unless told not to), shifts
/// continuation lines by `padding + extra`, and expands `\t` indent markers
/// to the document's indent unit.
pub(crate) fn shift(
    text: &str,
    indent: &Indent,
    padding: usize,
    extra: usize,
    add_first_padding: bool,
) -> String {
    let pad = indent.ch.to_string().repeat(padding);
    let continuation = indent.ch.to_string().repeat(padding + extra);
    let mut shifted = if add_first_padding {
        format!("{pad}{text}")
    } else {
        text.to_string()
    };
    shifted = shifted.replace('\n', &format!("\n{continuation}"));
    shifted.replace('\t', &indent.unit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_pads_and_expands_markers() {
        let indent = Indent { width: 2, ch: ' ' };
        assert_eq!(
            shift("\"a\": {\n\t\"b\": 1\n}", &indent, 2, 0, true),
            "  \"a\": {\n    \"b\": 1\n  }"
        );
    }

    #[test]
    fn shift_extra_for_dash_prefix() {
        let indent = Indent { width: 2, ch: ' ' };
        assert_eq!(
            shift("- a: 1\n  b: 2", &indent, 2, 2, true),
            "  - a: 1\n      b: 2"
        );
    }

    #[test]
    fn shift_can_skip_first_padding() {
        let indent = Indent { width: 1, ch: ' ' };
        assert_eq!(shift("{\n\t\"a\": 1\n}", &indent, 2, 0, false), "{\n   \"a\": 1\n  }");
    }
}
