//! JSON edit planners.

use crate::apply::PlannedEdit;
use crate::ordering::OrderingPolicy;
use crate::planner::errors::PlanError;
use crate::planner::{shift, EditContext};
use crate::tree::{entry_ranges, next, parent, prev, range, value_range, Span};

/// Insert the rendered payload into an object or array.
///
/// With existing members the payload is anchored on the last member (or the
/// ordering-policy neighbor when a single well-known key lands in an
/// anchored container) and spliced after it with a leading comma. An empty
/// container takes the payload just inside its opening brace, pre-padded
/// one indent level, with no comma.
pub fn insert(
    ctx: &EditContext<'_>,
    value: String,
    policy: &OrderingPolicy,
) -> Result<PlannedEdit, PlanError> {
    let document = ctx.document;
    let ranges = entry_ranges(&ctx.target)
        .ok_or_else(|| PlanError::unsupported("cannot insert into a scalar"))?;

    let (anchor_start, position, comma, value) = if !ranges.is_empty() {
        let mut anchor = None;
        if ctx.target.is_object() {
            if let Some(key) = OrderingPolicy::insertion_key(&ctx.fix.fix) {
                anchor = policy.find_anchor(ctx.root, &ctx.target.pointer, key, false);
            }
        }
        let span = anchor
            .and_then(|anchor| range(ctx.root, &anchor))
            .unwrap_or_else(|| *ranges.last().expect("non-empty ranges"));
        (span.start, span.end, ",", value)
    } else {
        let span = value_range(ctx.root, &ctx.target)
            .ok_or_else(|| PlanError::target_not_found(ctx.target.pointer.as_string()))?;
        let start = span.start + 1;
        (start, start, "", format!("{}{value}", ctx.indent.unit()))
    };

    let col = document.indent_col_at(anchor_start);
    let text = format!("{comma}\n{}", shift(&value, &ctx.indent, col, 0, true));
    Ok(PlannedEdit::insertion(text, position))
}

/// Replace the value token only; object/array replacement text is
/// reindented to the replaced value's column.
pub fn replace(ctx: &EditContext<'_>, value: String) -> Result<PlannedEdit, PlanError> {
    let span = value_range(ctx.root, &ctx.target)
        .ok_or_else(|| PlanError::target_not_found(ctx.target.pointer.as_string()))?;

    let is_object = value.starts_with('{') && value.ends_with('}');
    let is_array = value.starts_with('[') && value.ends_with(']');
    let value = if is_object || is_array {
        let col = ctx.document.indent_col_at(span.start);
        shift(&value, &ctx.indent, col, 0, false)
    } else {
        value
    };
    Ok(PlannedEdit::replacement(
        value,
        span,
        ctx.source_text(span.start, span.end),
    ))
}

/// Delete the whole entry, spanning from the previous sibling's line end
/// (one character earlier when deleting the last member, so no dangling
/// comma remains) through the end of the target and its trailing comma.
pub fn delete(ctx: &EditContext<'_>) -> Result<PlannedEdit, PlanError> {
    if ctx.target.pointer.is_root() {
        return Err(PlanError::unsupported("cannot delete the document root"));
    }
    let document = ctx.document;
    let target_span = range(ctx.root, &ctx.target)
        .ok_or_else(|| PlanError::target_not_found(ctx.target.pointer.as_string()))?;

    let start = match prev(ctx.root, &ctx.target) {
        Some(prev_ref) => {
            let prev_span = range(ctx.root, &prev_ref)
                .ok_or_else(|| PlanError::target_not_found(prev_ref.pointer.as_string()))?;
            let base = document.line_content_end(document.line_of(prev_span.end));
            if next(ctx.root, &ctx.target).is_some() {
                base
            } else {
                base - 1
            }
        }
        None => {
            let parent_ref = parent(ctx.root, &ctx.target)
                .ok_or_else(|| PlanError::target_not_found(ctx.target.pointer.as_string()))?;
            let parent_span = range(ctx.root, &parent_ref)
                .ok_or_else(|| PlanError::target_not_found(parent_ref.pointer.as_string()))?;
            document.line_content_end(document.line_of(parent_span.start))
        }
    };
    // Consume the target's own trailing comma, but nothing else on the
    // line (the container's closing brace may share it).
    let bytes = document.text().as_bytes();
    let mut end = target_span.end;
    while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
        end += 1;
    }
    if bytes.get(end) == Some(&b',') {
        end += 1;
    } else {
        end = target_span.end;
    }
    Ok(PlannedEdit::replacement(
        String::new(),
        Span::new(start, end),
        ctx.source_text(start, end),
    ))
}
