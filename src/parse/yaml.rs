//! Line-oriented parser for block-style YAML with token spans.
//!
//! Covers the subset well-formed OpenAPI documents use: block mappings,
//! block sequences (including compact `- key: value` items), plain and
//! single/double-quoted scalars, the empty flow containers `{}` / `[]`, and
//! comments. Anchors, tags, non-empty flow collections, block scalars, and
//! multi-document streams are rejected as unsupported.

use serde_json::Value;

use super::ParseError;
use crate::tree::{ArrayNode, MapEntry, Node, ObjectNode, ScalarNode, Span};

pub(super) fn parse(text: &str) -> Result<Node, ParseError> {
    let lines = scan_lines(text)?;
    if lines.is_empty() {
        return Err(ParseError::Syntax {
            offset: 0,
            message: "empty document".to_string(),
        });
    }
    let mut parser = Parser {
        src: text,
        lines,
        idx: 0,
    };
    let indent = parser.lines[0].indent;
    let node = parser.node_at(indent)?;
    if parser.idx < parser.lines.len() {
        let line = &parser.lines[parser.idx];
        return Err(ParseError::Syntax {
            offset: line.content_start,
            message: "unexpected content after document".to_string(),
        });
    }
    Ok(node)
}

/// One non-blank line: indentation plus comment-stripped content bounds.
#[derive(Debug, Clone, Copy)]
struct Line {
    indent: usize,
    content_start: usize,
    content_end: usize,
}

fn scan_lines(text: &str) -> Result<Vec<Line>, ParseError> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in text.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();
        let content = raw.trim_end_matches(['\n', '\r']);

        let mut indent = 0;
        for ch in content.chars() {
            match ch {
                ' ' => indent += 1,
                '\t' => {
                    return Err(ParseError::Syntax {
                        offset: line_start + indent,
                        message: "tab in indentation".to_string(),
                    })
                }
                _ => break,
            }
        }
        let body = &content[indent..];
        if body.is_empty() || body.starts_with('#') {
            continue;
        }
        if body.starts_with('%') {
            return Err(ParseError::Unsupported {
                offset: line_start + indent,
                message: "YAML directives".to_string(),
            });
        }
        if body == "---" || body.starts_with("--- ") || body == "..." {
            return Err(ParseError::Unsupported {
                offset: line_start + indent,
                message: "multi-document streams".to_string(),
            });
        }

        let cut = comment_cut(body);
        let trimmed = body[..cut].trim_end_matches([' ', '\t']);
        if trimmed.is_empty() {
            continue;
        }
        lines.push(Line {
            indent,
            content_start: line_start + indent,
            content_end: line_start + indent + trimmed.len(),
        });
    }
    Ok(lines)
}

/// Index of the first `#` that starts a comment (quote-aware), or the
/// content length.
fn comment_cut(body: &str) -> usize {
    let mut in_single = false;
    let mut in_double = false;
    let mut escape = false;
    let mut prev_ws = true;
    for (idx, ch) in body.char_indices() {
        if in_double {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_double = false;
            }
        } else if in_single {
            if ch == '\'' {
                in_single = false;
            }
        } else {
            match ch {
                '"' => in_double = true,
                '\'' => in_single = true,
                '#' if prev_ws => return idx,
                _ => {}
            }
        }
        prev_ws = ch == ' ' || ch == '\t';
    }
    body.len()
}

struct Parser<'a> {
    src: &'a str,
    lines: Vec<Line>,
    idx: usize,
}

impl<'a> Parser<'a> {
    fn content(&self, line: &Line) -> &'a str {
        &self.src[line.content_start..line.content_end]
    }

    fn is_dash(&self, line: &Line) -> bool {
        let content = self.content(line);
        content == "-" || content.starts_with("- ")
    }

    fn node_at(&mut self, indent: usize) -> Result<Node, ParseError> {
        let line = self.lines[self.idx];
        if self.is_dash(&line) {
            self.sequence(indent)
        } else if key_colon(self.content(&line)).is_some() {
            self.mapping(line.content_start, indent)
        } else {
            // Scalar document (or a stray line the caller will reject).
            let node = self.value_token(line.content_start, line.content_end)?;
            self.idx += 1;
            Ok(node)
        }
    }

    fn sequence(&mut self, indent: usize) -> Result<Node, ParseError> {
        let start = self.lines[self.idx].content_start;
        let mut items = Vec::new();
        while self.idx < self.lines.len() {
            let line = self.lines[self.idx];
            if line.indent != indent || !self.is_dash(&line) {
                break;
            }
            let after_dash = line.content_start + 1;
            let inline_start = skip_spaces(self.src, after_dash, line.content_end);
            if inline_start >= line.content_end {
                // Dash alone: the item is a nested block on following lines.
                self.idx += 1;
                if self.idx < self.lines.len() && self.lines[self.idx].indent > indent {
                    let child_indent = self.lines[self.idx].indent;
                    items.push(self.node_at(child_indent)?);
                } else {
                    let at = line.content_end;
                    items.push(null_scalar(at));
                }
            } else {
                items.push(self.item(inline_start, line)?);
            }
        }
        let end = items
            .last()
            .map(|item| item.span().end)
            .unwrap_or(start + 1);
        Ok(Node::Array(ArrayNode {
            span: Span::new(start, end),
            items,
        }))
    }

    /// An item with inline content on the dash line. Compact mappings
    /// (`- key: value`) continue on lines indented to the item column.
    fn item(&mut self, inline_start: usize, line: Line) -> Result<Node, ParseError> {
        let inline = &self.src[inline_start..line.content_end];
        if inline == "-" || inline.starts_with("- ") {
            return Err(ParseError::Unsupported {
                offset: inline_start,
                message: "nested sequence on the dash line".to_string(),
            });
        }
        let item_col = inline_start - line_start_of(line);
        if key_colon(inline).is_some() {
            self.mapping(inline_start, item_col)
        } else {
            let node = self.value_token(inline_start, line.content_end)?;
            self.idx += 1;
            Ok(node)
        }
    }

    /// Block mapping whose first key starts at `key_start` on the current
    /// line; further entries sit at column `indent`.
    fn mapping(&mut self, key_start: usize, indent: usize) -> Result<Node, ParseError> {
        let mut entries = vec![self.entry(key_start, indent)?];
        while self.idx < self.lines.len() {
            let line = self.lines[self.idx];
            if line.indent != indent || self.is_dash(&line) {
                break;
            }
            if key_colon(self.content(&line)).is_none() {
                return Err(ParseError::Syntax {
                    offset: line.content_start,
                    message: "expected 'key:' mapping entry".to_string(),
                });
            }
            entries.push(self.entry(line.content_start, indent)?);
        }
        let span = Span::new(
            entries[0].key_span.start,
            entries
                .last()
                .map(|entry| entry.node.span().end.max(entry.key_span.end))
                .unwrap_or(key_start),
        );
        Ok(Node::Object(ObjectNode { span, entries }))
    }

    fn entry(&mut self, key_start: usize, indent: usize) -> Result<MapEntry, ParseError> {
        let line = self.lines[self.idx];
        let slice = &self.src[key_start..line.content_end];
        let colon = key_colon(slice).ok_or(ParseError::Syntax {
            offset: key_start,
            message: "expected ':' after mapping key".to_string(),
        })?;
        let key_token = slice[..colon].trim_end_matches([' ', '\t']);
        let key_span = Span::new(key_start, key_start + key_token.len());
        let key = decode_key(key_token);

        let value_start = skip_spaces(self.src, key_start + colon + 1, line.content_end);
        if value_start < line.content_end {
            let node = self.value_token(value_start, line.content_end)?;
            self.idx += 1;
            return Ok(MapEntry {
                key,
                key_span,
                node,
            });
        }

        // No inline value: a nested block, a sequence at the same column,
        // or null.
        self.idx += 1;
        let node = if self.idx < self.lines.len() {
            let next = self.lines[self.idx];
            if next.indent > indent {
                self.node_at(next.indent)?
            } else if next.indent == indent && self.is_dash(&next) {
                self.sequence(indent)?
            } else {
                null_scalar(line.content_end)
            }
        } else {
            null_scalar(line.content_end)
        };
        Ok(MapEntry {
            key,
            key_span,
            node,
        })
    }

    /// A single-line value token: scalar, quoted scalar, or empty flow
    /// container.
    fn value_token(&self, start: usize, end: usize) -> Result<Node, ParseError> {
        let token = &self.src[start..end];
        let span = Span::new(start, end);
        match token {
            "{}" | "{ }" => {
                return Ok(Node::Object(ObjectNode {
                    span,
                    entries: Vec::new(),
                }))
            }
            "[]" | "[ ]" => {
                return Ok(Node::Array(ArrayNode {
                    span,
                    items: Vec::new(),
                }))
            }
            _ => {}
        }
        let first = token.chars().next().unwrap_or(' ');
        let unsupported = |message: &str| {
            Err(ParseError::Unsupported {
                offset: start,
                message: message.to_string(),
            })
        };
        match first {
            '{' | '[' => return unsupported("non-empty flow collections"),
            '&' | '*' => return unsupported("anchors and aliases"),
            '|' | '>' => return unsupported("block scalars"),
            '!' => return unsupported("tags"),
            '"' | '\'' => {
                if token.len() < 2 || !token.ends_with(first) {
                    return unsupported("multi-line quoted scalars");
                }
            }
            _ => {}
        }
        let value = serde_yaml::from_str::<Value>(token)
            .unwrap_or_else(|_| Value::String(token.to_string()));
        Ok(Node::Scalar(ScalarNode { span, value }))
    }
}

fn null_scalar(at: usize) -> Node {
    Node::Scalar(ScalarNode {
        span: Span::new(at, at),
        value: Value::Null,
    })
}

fn line_start_of(line: Line) -> usize {
    line.content_start - line.indent
}

fn skip_spaces(src: &str, mut pos: usize, end: usize) -> usize {
    let bytes = src.as_bytes();
    while pos < end && bytes[pos] == b' ' {
        pos += 1;
    }
    pos
}

/// Offset of the key-terminating colon in `slice` (quote-aware), if this
/// looks like a mapping entry. The colon must be followed by a space or end
/// the content.
fn key_colon(slice: &str) -> Option<usize> {
    let mut chars = slice.char_indices();
    let (_, first) = chars.next()?;
    if first == '"' || first == '\'' {
        // Quoted key: find the closing quote, then the colon.
        let mut escape = false;
        let mut close = None;
        for (idx, ch) in chars {
            if first == '"' && escape {
                escape = false;
                continue;
            }
            if first == '"' && ch == '\\' {
                escape = true;
                continue;
            }
            if ch == first {
                close = Some(idx);
                break;
            }
        }
        let close = close?;
        let rest = &slice[close + 1..];
        let colon = rest.find(':')?;
        if !rest[..colon].trim().is_empty() {
            return None;
        }
        let colon_abs = close + 1 + colon;
        return terminated(slice, colon_abs).then_some(colon_abs);
    }
    for (idx, ch) in slice.char_indices() {
        if ch == ':' && terminated(slice, idx) {
            return Some(idx);
        }
    }
    None
}

fn terminated(slice: &str, colon: usize) -> bool {
    match slice[colon + 1..].chars().next() {
        None => true,
        Some(ch) => ch == ' ' || ch == '\t',
    }
}

fn decode_key(token: &str) -> String {
    if (token.starts_with('"') && token.ends_with('"') && token.len() >= 2)
        || (token.starts_with('\'') && token.ends_with('\'') && token.len() >= 2)
    {
        serde_yaml::from_str::<String>(token).unwrap_or_else(|_| token.to_string())
    } else {
        token.to_string()
    }
}
