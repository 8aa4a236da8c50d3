//! Payload rendering and placeholder synthesis.
//!
//! A fix payload is serialized to the target dialect with `\t` indent
//! markers (the planners later expand those to the document's inferred
//! indent). Parameters are substituted by re-parsing the rendered payload
//! and splicing per-parameter spans: literal mode takes the first resolver
//! candidate, snippet mode renders numbered placeholders with optional
//! pipe-delimited choice lists.

use serde::Serialize;
use serde_json::Value;

use crate::fix::{FixKind, ParameterKind};
use crate::parse::{safe_parse, Dialect};
use crate::planner::{EditContext, PlanError};
use crate::pointer::Pointer;
use crate::sources::{SourceContext, SourceRegistry};
use crate::tree::{find_node, key_range, value_range, Node, Span};

/// Render the fix payload for the context's dialect.
pub fn render_fix(ctx: &EditContext<'_>, registry: &SourceRegistry) -> Result<String, PlanError> {
    match ctx.dialect {
        Dialect::Json => fix_as_json_string(ctx, registry),
        Dialect::Yaml => fix_as_yaml_string(ctx, registry),
    }
}

pub fn fix_as_json_string(
    ctx: &EditContext<'_>,
    registry: &SourceRegistry,
) -> Result<String, PlanError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    ctx.fix
        .fix
        .serialize(&mut serializer)
        .map_err(|err| PlanError::Payload {
            message: err.to_string(),
        })?;
    let mut text = String::from_utf8(buf)
        .expect("serde_json emits UTF-8")
        .trim()
        .to_string();

    if !ctx.fix.parameters.is_empty() {
        text = handle_parameters(ctx, registry, &text)?;
    }
    if ctx.snippet && matches!(ctx.fix.kind, FixKind::Insert | FixKind::Replace) {
        text = text.replace("$ref", "\\$ref");
    }
    if ctx.target.is_object() && ctx.fix.kind == FixKind::Insert {
        // Members are spliced into an existing object: drop the payload's
        // own braces and one level of indent markers.
        text = text.replacen("{\n\t", "", 1);
        if let Some(stripped) = text.strip_suffix("\n}") {
            text = stripped.to_string();
        }
        text = dedent_one_tab(&text);
    }
    Ok(text)
}

pub fn fix_as_yaml_string(
    ctx: &EditContext<'_>,
    registry: &SourceRegistry,
) -> Result<String, PlanError> {
    let mut text = serde_yaml::to_string(&ctx.fix.fix)
        .map_err(|err| PlanError::Payload {
            message: err.to_string(),
        })?
        .trim()
        .to_string();

    if !ctx.fix.parameters.is_empty() {
        text = handle_parameters(ctx, registry, &text)?;
    }
    if ctx.snippet && matches!(ctx.fix.kind, FixKind::Insert | FixKind::Replace) {
        text = text.replace("$ref", "\\$ref");
    }
    // The dump indents with two spaces; convert leading pairs to markers.
    Ok(yaml_indent_markers(&text))
}

struct Replacement {
    span: Span,
    text: String,
}

/// Substitute each declared parameter inside the rendered payload text.
/// Parameters are processed strictly in declaration order.
fn handle_parameters(
    ctx: &EditContext<'_>,
    registry: &SourceRegistry,
    text: &str,
) -> Result<String, PlanError> {
    let root = safe_parse(text, ctx.dialect)?;
    let mut replacements: Vec<Replacement> = Vec::new();

    for parameter in &ctx.fix.parameters {
        let index = replacements.len() + 1;
        let pointer = Pointer::parse(&parameter.path)?;
        let target = find_node(&root, &pointer)
            .ok_or_else(|| PlanError::target_not_found(parameter.path.as_str()))?;
        let replace_key = parameter.kind == ParameterKind::Key;

        let default_text = if replace_key {
            target.key().unwrap_or_default().to_string()
        } else {
            match target.node {
                Node::Scalar(scalar) => value_text(&scalar.value),
                node => value_text(&node.to_value()),
            }
        };

        let mut candidates: Option<Vec<Value>> = None;
        if let Some(name) = &parameter.source {
            if let Some(source) = registry.get(name) {
                let issue = parameter
                    .fix_index
                    .and_then(|fix_index| ctx.issues.get(fix_index))
                    .or_else(|| ctx.issues.first());
                if let (Some(issue), Some(bundle)) = (issue, ctx.bundle) {
                    candidates = Some(source.candidates(&SourceContext {
                        issue,
                        fix: ctx.fix,
                        parameter,
                        version: ctx.version,
                        bundle,
                        document: ctx.document,
                        mapper: ctx.mapper,
                    }));
                }
            }
        }

        let span = if replace_key {
            key_range(&root, &target)
        } else {
            value_range(&root, &target)
        }
        .ok_or_else(|| PlanError::target_not_found(parameter.path.as_str()))?;
        // Quoted tokens are substituted inside their quotes so the rendered
        // payload stays well-formed.
        let quoted = is_quoted(&text[span.start..span.end]);
        let span = if quoted {
            Span::new(span.start + 1, span.end - 1)
        } else {
            span
        };

        let final_text = if ctx.snippet {
            placeholder(
                index,
                default_text,
                parameter.values.as_deref(),
                candidates.as_deref(),
            )
        } else {
            match candidates.as_deref() {
                Some([first, ..]) if quoted => value_text(first),
                Some([first, ..]) => literal_text(ctx.dialect, first),
                // No candidate: the payload default is already in place.
                _ => continue,
            }
        };
        replacements.push(Replacement {
            span,
            text: final_text,
        });
    }

    let mut out = text.to_string();
    replacements.sort_by_key(|replacement| replacement.span.start);
    for replacement in replacements.iter().rev() {
        out.replace_range(replacement.span.start..replacement.span.end, &replacement.text);
    }
    Ok(out)
}

/// Render a numbered placeholder: `${n|a,b,c|}` when choices exist,
/// `${n:default}` otherwise. Resolver candidates override declared choices,
/// or become the default when no choices were declared.
fn placeholder(
    index: usize,
    default_text: String,
    declared: Option<&[Value]>,
    candidates: Option<&[Value]>,
) -> String {
    let mut choices: Option<Vec<Value>> = declared.map(<[Value]>::to_vec);
    let mut default_text = default_text;
    if let Some(candidates) = candidates {
        if !candidates.is_empty() {
            if choices.is_some() {
                choices = Some(candidates.to_vec());
            } else {
                default_text = value_text(&candidates[0]);
            }
        }
    }

    match choices {
        Some(choices) => {
            let rendered: Vec<String> = choices
                .iter()
                .map(|choice| value_text(choice).replace(',', "\\,"))
                .collect();
            format!("${{{index}|{}|}}", rendered.join(","))
        }
        None => {
            let escaped = default_text.replace('$', "\\$").replace('}', "\\}");
            format!("${{{index}:{escaped}}}")
        }
    }
}

/// Bare text of a value, for placeholder defaults and choice lists.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// A value as a literal of the target dialect.
fn literal_text(dialect: Dialect, value: &Value) -> String {
    match dialect {
        Dialect::Json => value.to_string(),
        Dialect::Yaml => serde_yaml::to_string(value)
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|_| value_text(value)),
    }
}

fn is_quoted(token: &str) -> bool {
    token.len() >= 2
        && ((token.starts_with('"') && token.ends_with('"'))
            || (token.starts_with('\'') && token.ends_with('\'')))
}

fn dedent_one_tab(text: &str) -> String {
    text.split('\n')
        .map(|line| line.strip_prefix('\t').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert each line's leading two-space indentation to `\t` markers.
fn yaml_indent_markers(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let spaces = line.len() - line.trim_start_matches(' ').len();
            let mut out = "\t".repeat(spaces / 2);
            if spaces % 2 == 1 {
                out.push(' ');
            }
            out.push_str(&line[spaces..]);
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}
