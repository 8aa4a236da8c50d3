//! YAML edit planners.
//!
//! Block-style YAML has no commas to manage, but positions are line
//! oriented: inserts land at line starts, array items carry a `"- "`
//! prefix, and deletions consume whole line ranges so no indentation or
//! dash marker is left dangling.

use crate::apply::PlannedEdit;
use crate::ordering::OrderingPolicy;
use crate::planner::errors::PlanError;
use crate::planner::{shift, EditContext};
use crate::tree::{entry_ranges, next, parent, range, value_range, Span};

/// Insert the rendered payload into an object or array.
///
/// Anchored inserts land at the start of the anchor's own line (before
/// it); unanchored inserts land on the line after the last member, with a
/// synthesized trailing newline when that member closes the document.
pub fn insert(
    ctx: &EditContext<'_>,
    value: String,
    policy: &OrderingPolicy,
) -> Result<PlannedEdit, PlanError> {
    let document = ctx.document;
    let ranges = entry_ranges(&ctx.target)
        .ok_or_else(|| PlanError::unsupported("cannot insert into a scalar"))?;

    let mut anchor = None;
    if let Some(key) = OrderingPolicy::insertion_key(&ctx.fix.fix) {
        anchor = policy.find_anchor(ctx.root, &ctx.target.pointer, key, true);
    }

    let (anchor_start, position, ensure_eol) = if let Some(anchor) = anchor {
        let span = range(ctx.root, &anchor)
            .ok_or_else(|| PlanError::target_not_found(anchor.pointer.as_string()))?;
        let line = document.line_of(span.start);
        (span.start, document.line_start(line), false)
    } else if let Some(last) = ranges.last() {
        let line = document.line_of(last.end);
        if line + 1 >= document.line_count() {
            // The last member closes the document without a trailing
            // newline; append one before the new member.
            (last.start, document.len(), true)
        } else {
            (last.start, document.line_start(line + 1), false)
        }
    } else {
        return insert_into_empty(ctx, value);
    };

    let col = document.indent_col_at(anchor_start);
    let body = if ctx.target.is_object() {
        shift(&value, &ctx.indent, col, 0, true)
    } else {
        shift(&format!("- {value}"), &ctx.indent, col, "- ".len(), true)
    };
    let text = format!("{}{body}\n", if ensure_eol { "\n" } else { "" });
    Ok(PlannedEdit::insertion(text, position))
}

/// Block-style YAML cannot splice members into `{}` / `[]`; the whole flow
/// token is replaced with block content starting on its own line.
fn insert_into_empty(ctx: &EditContext<'_>, value: String) -> Result<PlannedEdit, PlanError> {
    let document = ctx.document;
    let span = value_range(ctx.root, &ctx.target)
        .ok_or_else(|| PlanError::target_not_found(ctx.target.pointer.as_string()))?;
    let at_root = ctx.target.pointer.is_root();
    let col = if at_root {
        0
    } else {
        document.indent_col_at(span.start) + ctx.indent.width
    };
    let body = if ctx.target.is_object() {
        shift(&value, &ctx.indent, col, 0, true)
    } else {
        shift(&format!("- {value}"), &ctx.indent, col, "- ".len(), true)
    };
    let text = if at_root { body } else { format!("\n{body}") };
    Ok(PlannedEdit::replacement(
        text,
        span,
        ctx.source_text(span.start, span.end),
    ))
}

/// Replace the value token only.
///
/// Container replacement text is reindented to the replaced value's
/// column; replacing a scalar with a container synthesizes a leading
/// newline because block style needs the value on its own line under its
/// key.
pub fn replace(ctx: &EditContext<'_>, value: String) -> Result<PlannedEdit, PlanError> {
    let document = ctx.document;
    let span = value_range(ctx.root, &ctx.target)
        .ok_or_else(|| PlanError::target_not_found(ctx.target.pointer.as_string()))?;

    let colon = value.find(':');
    let dash = value.find("- ");
    let is_object_value = matches!(colon, Some(c) if c > 0)
        && match (dash, colon) {
            (None, _) => true,
            (Some(d), Some(c)) => d > 0 && d > c,
            _ => false,
        };
    let is_array_value = dash.is_some()
        && match (colon, dash) {
            (None, _) => true,
            (Some(c), Some(d)) => c > 0 && c > d,
            _ => false,
        };

    let mut value = value;
    if is_object_value || is_array_value {
        let col = document.indent_col_at(span.start);
        if ctx.target.is_array() {
            // A recorded value end may sit on the next key's line; keep
            // that line's indent and newline out of the replaced range.
            let line = document.line_of(span.end);
            if !document.line_text(line).trim_start().starts_with('-') && line > 0 {
                let end = document.line_content_end(line - 1);
                let value = shift(&value, &ctx.indent, col, 0, false);
                let span = Span::new(span.start, end);
                return Ok(PlannedEdit::replacement(
                    value,
                    span,
                    ctx.source_text(span.start, span.end),
                ));
            }
        }
        let parent_is_object = parent(ctx.root, &ctx.target)
            .map(|parent_ref| parent_ref.is_object())
            .unwrap_or(false);
        if ctx.target.is_scalar() && parent_is_object {
            value = shift(
                &format!("\n{value}"),
                &ctx.indent,
                col,
                ctx.indent.width,
                false,
            );
        } else {
            value = shift(&value, &ctx.indent, col, 0, false);
        }
    }
    Ok(PlannedEdit::replacement(
        value,
        span,
        ctx.source_text(span.start, span.end),
    ))
}

/// Delete the member's line range: through the next sibling's first
/// content column (consuming the indentation and dash marker), or the full
/// line range when deleting the last member.
pub fn delete(ctx: &EditContext<'_>) -> Result<PlannedEdit, PlanError> {
    if ctx.target.pointer.is_root() {
        return Err(PlanError::unsupported("cannot delete the document root"));
    }
    let document = ctx.document;
    let span = range(ctx.root, &ctx.target)
        .ok_or_else(|| PlanError::target_not_found(ctx.target.pointer.as_string()))?;
    let parent_ref = parent(ctx.root, &ctx.target)
        .ok_or_else(|| PlanError::target_not_found(ctx.target.pointer.as_string()))?;
    let next_ref = next(ctx.root, &ctx.target);

    let (start, end) = if parent_ref.is_array() {
        match next_ref {
            Some(next_ref) => {
                let next_span = range(ctx.root, &next_ref)
                    .ok_or_else(|| PlanError::target_not_found(next_ref.pointer.as_string()))?;
                let next_line = document.line_of(next_span.start);
                (
                    span.start - "- ".len(),
                    document.first_non_ws_offset(next_line),
                )
            }
            None => full_lines(ctx, span),
        }
    } else if parent_ref.is_object() {
        match next_ref {
            Some(next_ref) => {
                let next_span = range(ctx.root, &next_ref)
                    .ok_or_else(|| PlanError::target_not_found(next_ref.pointer.as_string()))?;
                let next_line = document.line_of(next_span.start);
                (span.start, document.first_non_ws_offset(next_line))
            }
            None => full_lines(ctx, span),
        }
    } else {
        return Err(PlanError::unsupported("cannot delete from a scalar"));
    };

    Ok(PlannedEdit::replacement(
        String::new(),
        Span::new(start, end),
        ctx.source_text(start, end),
    ))
}

/// Start of the member's first line through one line past its end.
fn full_lines(ctx: &EditContext<'_>, span: Span) -> (usize, usize) {
    let document = ctx.document;
    let start = document.line_start(document.line_of(span.start));
    let end = document.line_end(document.line_of(span.end));
    (start, end)
}
