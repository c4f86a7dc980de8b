//! Relaxed literal parser
//!
//! Accepts the dict/list literal text operators tend to type into a single
//! form field, which strict JSON rejects:
//!
//! - single-quoted strings: `['x', 'y']`
//! - trailing commas: `{"a": 1,}`
//! - `True` / `False` / `None` alongside `true` / `false` / `null`
//! - bare numeric object keys: `{1: 'a'}` (stored as key `"1"`)
//!
//! Nesting is bounded by [`MAX_NESTING_DEPTH`].

use crate::value::{Object, Value, MAX_NESTING_DEPTH};
use serde_json::Number;
use thiserror::Error;

/// Error from the relaxed parser
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at position {position}")]
pub struct LiteralError {
    /// Byte offset of the failure
    pub position: usize,
    /// What went wrong
    pub message: String,
}

/// Parse relaxed literal text into a value
///
/// The whole input must be consumed; surrounding whitespace is ignored.
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        src: input.as_bytes(),
        text: input,
        pos: 0,
    };
    let value = parser.value(0)?;
    parser.skip_ws();
    if parser.pos != parser.src.len() {
        return Err(parser.error("trailing characters"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: &str) -> LiteralError {
        LiteralError {
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), LiteralError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, LiteralError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.skip_ws();
        match self.peek() {
            Some(b'{') => self.object(depth),
            Some(b'[') => self.array(depth),
            Some(q @ (b'\'' | b'"')) => self.string(q).map(Value::String),
            Some(b'-' | b'+' | b'.' | b'0'..=b'9') => self.number().map(Value::Number),
            Some(c) if c.is_ascii_alphabetic() => self.word(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn object(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.expect(b'{')?;
        let mut obj = Object::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Value::Object(obj));
            }
            let key = match self.peek() {
                Some(q @ (b'\'' | b'"')) => self.string(q)?,
                Some(b'-' | b'0'..=b'9') => self.number()?.to_string(),
                _ => return Err(self.error("expected object key")),
            };
            self.skip_ws();
            self.expect(b':')?;
            let value = self.value(depth + 1)?;
            obj.insert(key, value);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn array(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.expect(b'[')?;
        let mut arr = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b']') {
                self.pos += 1;
                return Ok(Value::Array(arr));
            }
            arr.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn string(&mut self, quote: u8) -> Result<String, LiteralError> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            let rest = &self.text[self.pos..];
            let Some(c) = rest.chars().next() else {
                return Err(self.error("unterminated string"));
            };
            self.pos += c.len_utf8();
            match c {
                c if c as u32 == quote as u32 => return Ok(out),
                '\\' => {
                    let Some(esc) = self.text[self.pos..].chars().next() else {
                        return Err(self.error("unterminated escape"));
                    };
                    self.pos += esc.len_utf8();
                    match esc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        'u' => out.push(self.unicode_escape()?),
                        other => out.push(other),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        let end = self.pos + 4;
        let hex = self
            .text
            .get(self.pos..end)
            .ok_or_else(|| self.error("short unicode escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("bad unicode escape"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }

    fn number(&mut self) -> Result<Number, LiteralError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'_' | b'0'..=b'9')
        ) {
            self.pos += 1;
        }
        let raw: String = self.text[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let raw = raw.strip_prefix('+').unwrap_or(raw.as_str());
        if let Ok(i) = raw.parse::<i64>() {
            return Ok(Number::from(i));
        }
        if let Ok(u) = raw.parse::<u64>() {
            return Ok(Number::from(u));
        }
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| LiteralError {
                position: start,
                message: format!("invalid number '{}'", raw),
            })
    }

    fn word(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }
        match &self.text[start..self.pos] {
            "true" | "True" => Ok(Value::Bool(true)),
            "false" | "False" => Ok(Value::Bool(false)),
            "null" | "None" => Ok(Value::Null),
            _ => Err(LiteralError {
                position: start,
                message: "unknown bare word".to_string(),
            }),
        }
    }
}
