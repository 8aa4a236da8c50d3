//! Recursive-descent JSON parser that records token spans.

use serde_json::Value;

use super::ParseError;
use crate::tree::{ArrayNode, MapEntry, Node, ObjectNode, ScalarNode, Span};

pub(super) fn parse(text: &str) -> Result<Node, ParseError> {
    let mut parser = Parser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
    };
    parser.skip_ws();
    let node = parser.value()?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(parser.syntax("trailing characters after document"));
    }
    Ok(node)
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn syntax(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(&byte) = self.bytes.get(self.pos) {
            if byte == b' ' || byte == b'\t' || byte == b'\n' || byte == b'\r' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), ParseError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.syntax(format!("expected '{}'", byte as char)))
        }
    }

    fn value(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Some(b'{') => self.object(),
            Some(b'[') => self.array(),
            Some(b'"') => {
                let (span, raw) = self.string_token()?;
                let value: Value = serde_json::from_str(raw)
                    .map_err(|err| self.syntax(format!("invalid string: {err}")))?;
                Ok(Node::Scalar(ScalarNode { span, value }))
            }
            Some(byte) if byte == b'-' || byte.is_ascii_digit() => self.number(),
            Some(b't') => self.literal("true", Value::Bool(true)),
            Some(b'f') => self.literal("false", Value::Bool(false)),
            Some(b'n') => self.literal("null", Value::Null),
            Some(byte) => Err(self.syntax(format!("unexpected character '{}'", byte as char))),
            None => Err(self.syntax("unexpected end of input")),
        }
    }

    fn object(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.expect(b'{')?;
        let mut entries = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Node::Object(ObjectNode {
                span: Span::new(start, self.pos),
                entries,
            }));
        }
        loop {
            self.skip_ws();
            let (key_span, raw) = self.string_token()?;
            let key: String = serde_json::from_str(raw)
                .map_err(|err| self.syntax(format!("invalid key: {err}")))?;
            self.skip_ws();
            self.expect(b':')?;
            self.skip_ws();
            let node = self.value()?;
            entries.push(MapEntry {
                key,
                key_span,
                node,
            });
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Node::Object(ObjectNode {
                        span: Span::new(start, self.pos),
                        entries,
                    }));
                }
                _ => return Err(self.syntax("expected ',' or '}'")),
            }
        }
    }

    fn array(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.expect(b'[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Node::Array(ArrayNode {
                span: Span::new(start, self.pos),
                items,
            }));
        }
        loop {
            self.skip_ws();
            items.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Node::Array(ArrayNode {
                        span: Span::new(start, self.pos),
                        items,
                    }));
                }
                _ => return Err(self.syntax("expected ',' or ']'")),
            }
        }
    }

    /// Consume a quoted string; span includes both quotes.
    fn string_token(&mut self) -> Result<(Span, &'a str), ParseError> {
        let start = self.pos;
        self.expect(b'"')?;
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    let span = Span::new(start, self.pos);
                    return Ok((span, &self.text[start..self.pos]));
                }
                Some(b'\\') => {
                    self.pos += 2;
                    if self.pos > self.bytes.len() {
                        return Err(self.syntax("unterminated escape"));
                    }
                }
                Some(_) => self.pos += 1,
                None => return Err(self.syntax("unterminated string")),
            }
        }
    }

    fn number(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_digit()
                || byte == b'-'
                || byte == b'+'
                || byte == b'.'
                || byte == b'e'
                || byte == b'E'
            {
                self.pos += 1;
            } else {
                break;
            }
        }
        let raw = &self.text[start..self.pos];
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| self.syntax(format!("invalid number '{raw}': {err}")))?;
        Ok(Node::Scalar(ScalarNode {
            span: Span::new(start, self.pos),
            value,
        }))
    }

    fn literal(&mut self, keyword: &str, value: Value) -> Result<Node, ParseError> {
        let start = self.pos;
        if self.text[self.pos..].starts_with(keyword) {
            self.pos += keyword.len();
            Ok(Node::Scalar(ScalarNode {
                span: Span::new(start, self.pos),
                value,
            }))
        } else {
            Err(self.syntax(format!("expected '{keyword}'")))
        }
    }
}
