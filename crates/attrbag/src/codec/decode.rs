use crate::config::{Limit, Limits};
use crate::value::{Map, Number, Value};

use super::CodecError;

/// Parses column text into a [`Value`], applying the canonical numeric policy.
///
/// The parser keeps its own stack of open containers, so nesting depth is
/// bounded only by `limits`, never by the call stack.
///
/// # Errors
///
/// - [`CodecError::MalformedText`] - not well-formed JSON, or an object repeats a key
/// - [`CodecError::UnsupportedNumericLiteral`] - an integer outside `i64`, or a
///   fractional literal that overflows `f64`
/// - [`CodecError::ResourceExhausted`] - nesting or value count beyond `limits`
pub fn decode_with_limits(text: &str, limits: &Limits) -> Result<Value, CodecError> {
    let mut parser = Parser::new(text, limits);
    let value = parser.parse()?;
    tracing::trace!(nodes = parser.nodes, bytes = text.len(), "decoded attribute text");
    Ok(value)
}

enum Open {
    Array(Vec<Value>),
    Object { map: Map, key: String },
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    limits: &'a Limits,
    nodes: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, limits: &'a Limits) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            limits,
            nodes: 0,
        }
    }

    fn parse(&mut self) -> Result<Value, CodecError> {
        let mut stack: Vec<Open> = Vec::new();

        'value: loop {
            self.skip_whitespace();
            let mut value = match self.peek() {
                Some(b'{') => {
                    self.open_container(stack.len())?;
                    self.skip_whitespace();
                    if self.eat(b'}') {
                        Value::Object(Map::new())
                    } else {
                        let key = self.member_key(&Map::new())?;
                        stack.push(Open::Object {
                            map: Map::new(),
                            key,
                        });
                        continue 'value;
                    }
                }
                Some(b'[') => {
                    self.open_container(stack.len())?;
                    self.skip_whitespace();
                    if self.eat(b']') {
                        Value::Array(Vec::new())
                    } else {
                        stack.push(Open::Array(Vec::new()));
                        continue 'value;
                    }
                }
                Some(_) => {
                    let leaf = self.leaf()?;
                    self.count_node()?;
                    leaf
                }
                None => return Err(self.malformed("unexpected end of input")),
            };

            // Hand the finished value to its parent, closing every container
            // that this value completes.
            loop {
                match stack.last_mut() {
                    None => {
                        self.skip_whitespace();
                        if self.pos != self.bytes.len() {
                            return Err(self.malformed("trailing characters after value"));
                        }
                        return Ok(value);
                    }
                    Some(Open::Array(items)) => {
                        items.push(value);
                        self.skip_whitespace();
                        if self.eat(b',') {
                            continue 'value;
                        }
                        if !self.eat(b']') {
                            return Err(self.malformed("expected ',' or ']'"));
                        }
                    }
                    Some(Open::Object { map, key }) => {
                        map.insert(std::mem::take(key), value);
                        self.skip_whitespace();
                        if self.eat(b',') {
                            self.skip_whitespace();
                            *key = self.member_key(map)?;
                            continue 'value;
                        }
                        if !self.eat(b'}') {
                            return Err(self.malformed("expected ',' or '}'"));
                        }
                    }
                }
                value = match stack.pop() {
                    Some(Open::Array(items)) => Value::Array(items),
                    Some(Open::Object { map, .. }) => Value::Object(map),
                    None => return Err(self.malformed("unbalanced container")),
                };
            }
        }
    }

    /// Accounts for a container about to be opened at nesting `depth`.
    fn open_container(&mut self, depth: usize) -> Result<(), CodecError> {
        if depth >= self.limits.max_depth {
            return Err(CodecError::ResourceExhausted {
                limit: Limit::Depth(self.limits.max_depth),
            });
        }
        self.count_node()?;
        self.pos += 1;
        Ok(())
    }

    fn count_node(&mut self) -> Result<(), CodecError> {
        self.nodes += 1;
        if self.nodes > self.limits.max_nodes {
            return Err(CodecError::ResourceExhausted {
                limit: Limit::Nodes(self.limits.max_nodes),
            });
        }
        Ok(())
    }

    /// Reads `"key" :` and rejects a key already present in `map`.
    fn member_key(&mut self, map: &Map) -> Result<String, CodecError> {
        let start = self.pos;
        if self.peek() != Some(b'"') {
            return Err(self.malformed("expected a string key"));
        }
        let key = self.string()?;
        if map.contains_key(&key) {
            return Err(CodecError::MalformedText {
                position: start,
                message: "duplicate object key",
            });
        }
        self.skip_whitespace();
        if !self.eat(b':') {
            return Err(self.malformed("expected ':'"));
        }
        Ok(key)
    }

    fn leaf(&mut self) -> Result<Value, CodecError> {
        match self.peek() {
            Some(b'"') => self.string().map(Value::String),
            Some(b't') => self.literal("true", Value::Bool(true)),
            Some(b'f') => self.literal("false", Value::Bool(false)),
            Some(b'n') => self.literal("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.number(),
            _ => Err(self.malformed("expected a value")),
        }
    }

    fn literal(&mut self, word: &'static str, value: Value) -> Result<Value, CodecError> {
        if self.text[self.pos..].starts_with(word) {
            self.pos += word.len();
            Ok(value)
        } else {
            Err(self.malformed("invalid literal"))
        }
    }

    fn number(&mut self) -> Result<Value, CodecError> {
        let start = self.pos;
        self.eat(b'-');

        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.digits(),
            _ => return Err(self.malformed("expected a digit")),
        }
        let mut fractional = false;
        if self.eat(b'.') {
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.malformed("expected a digit after '.'"));
            }
            self.digits();
            fractional = true;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.malformed("expected a digit in exponent"));
            }
            self.digits();
            fractional = true;
        }

        let literal = &self.text[start..self.pos];
        let unsupported = || CodecError::UnsupportedNumericLiteral {
            text: literal.to_string(),
        };
        if fractional {
            let f: f64 = literal.parse().map_err(|_| unsupported())?;
            Number::from_f64(f).map(Value::Number).ok_or_else(unsupported)
        } else {
            let n: i64 = literal.parse().map_err(|_| unsupported())?;
            Ok(Value::Number(Number::from(n)))
        }
    }

    fn digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    /// Reads a string literal starting at the opening quote.
    fn string(&mut self) -> Result<String, CodecError> {
        self.pos += 1;
        let mut out = String::new();
        let mut run_start = self.pos;

        loop {
            match self.peek() {
                None => return Err(self.malformed("unterminated string")),
                Some(b'"') => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    let ch = self.escape()?;
                    out.push(ch);
                    run_start = self.pos;
                }
                Some(b) if b < 0x20 => {
                    return Err(self.malformed("control character in string"));
                }
                // Multi-byte UTF-8 sequences never contain bytes below 0x80, so
                // stepping byte-wise keeps every run boundary on a char boundary.
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Decodes the escape sequence after a backslash.
    fn escape(&mut self) -> Result<char, CodecError> {
        let ch = match self.peek() {
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\u{08}',
            Some(b'f') => '\u{0C}',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => {
                self.pos += 1;
                return self.unicode_escape();
            }
            None => return Err(self.malformed("unterminated string")),
            Some(_) => return Err(self.malformed("invalid escape sequence")),
        };
        self.pos += 1;
        Ok(ch)
    }

    fn unicode_escape(&mut self) -> Result<char, CodecError> {
        let start = self.pos;
        let first = self.hex4()?;
        let code = match first {
            0xD800..=0xDBFF => {
                if !(self.eat(b'\\') && self.eat(b'u')) {
                    return Err(CodecError::MalformedText {
                        position: start,
                        message: "unpaired surrogate in \\u escape",
                    });
                }
                let second = self.hex4()?;
                if !(0xDC00..=0xDFFF).contains(&second) {
                    return Err(CodecError::MalformedText {
                        position: start,
                        message: "unpaired surrogate in \\u escape",
                    });
                }
                0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(CodecError::MalformedText {
                    position: start,
                    message: "unpaired surrogate in \\u escape",
                });
            }
            _ => first,
        };
        char::from_u32(code).ok_or(CodecError::MalformedText {
            position: start,
            message: "invalid \\u escape",
        })
    }

    fn hex4(&mut self) -> Result<u32, CodecError> {
        let bytes = self.bytes;
        let digits = bytes
            .get(self.pos..self.pos + 4)
            .filter(|d| d.iter().all(u8::is_ascii_hexdigit))
            .ok_or_else(|| self.malformed("expected four hex digits"))?;
        let mut code = 0u32;
        for d in digits {
            // Infallible after the is_ascii_hexdigit filter.
            code = code * 16 + char::from(*d).to_digit(16).unwrap_or(0);
        }
        self.pos += 4;
        Ok(code)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn malformed(&self, message: &'static str) -> CodecError {
        CodecError::MalformedText {
            position: self.pos,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};

    fn number(text: &str) -> Number {
        decode(text).unwrap().as_number().unwrap()
    }

    fn malformed_at(text: &str) -> (usize, &'static str) {
        match decode(text) {
            Err(CodecError::MalformedText { position, message }) => (position, message),
            other => panic!("expected MalformedText for {:?}, got {:?}", text, other),
        }
    }

    #[test]
    fn integral_literals_decode_as_integers() {
        assert_eq!(number("5"), Number::from(5));
        assert_eq!(number("-0"), Number::from(0));
        assert_eq!(number("9223372036854775807"), Number::from(i64::MAX));
        assert_eq!(number("-9223372036854775808"), Number::from(i64::MIN));
    }

    #[test]
    fn fraction_or_exponent_decodes_as_float() {
        assert_eq!(number("5.0"), Number::from_f64(5.0).unwrap());
        assert_eq!(number("5e0"), Number::from_f64(5.0).unwrap());
        assert_eq!(number("1E+2"), Number::from_f64(100.0).unwrap());
        assert_eq!(number("-2.5e-3"), Number::from_f64(-0.0025).unwrap());
        assert!(number("1e-400").is_fractional());
    }

    #[test]
    fn out_of_range_numbers_are_unsupported() {
        for text in ["9223372036854775808", "-9223372036854775809", "123456789012345678901234567890", "1e400", "-1.5e309"] {
            assert_eq!(
                decode(text),
                Err(CodecError::UnsupportedNumericLiteral {
                    text: text.to_string()
                }),
                "{}",
                text
            );
        }
    }

    #[test]
    fn unsupported_literal_text_is_just_the_number() {
        assert_eq!(
            decode(r#"{"big": 18446744073709551616 }"#),
            Err(CodecError::UnsupportedNumericLiteral {
                text: "18446744073709551616".to_string()
            })
        );
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(malformed_at("01"), (1, "trailing characters after value"));
        assert_eq!(malformed_at("-"), (1, "expected a digit"));
        assert_eq!(malformed_at("1."), (2, "expected a digit after '.'"));
        assert_eq!(malformed_at("1e"), (2, "expected a digit in exponent"));
        assert_eq!(malformed_at("+1"), (0, "expected a value"));
        assert_eq!(malformed_at(".5"), (0, "expected a value"));
    }

    #[test]
    fn structure_errors_point_at_the_offending_byte() {
        assert_eq!(malformed_at("[1 2]"), (3, "expected ',' or ']'"));
        assert_eq!(malformed_at("{\"a\" 1}"), (5, "expected ':'"));
        assert_eq!(malformed_at("{a:1}"), (1, "expected a string key"));
        assert_eq!(malformed_at("[1,]"), (3, "expected a value"));
        assert_eq!(malformed_at("{\"a\":1,}"), (7, "expected a string key"));
        assert_eq!(malformed_at("[1"), (2, "expected ',' or ']'"));
        assert_eq!(malformed_at("{} x"), (3, "trailing characters after value"));
        assert_eq!(malformed_at("nul"), (0, "invalid literal"));
        assert_eq!(malformed_at("   "), (3, "unexpected end of input"));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        assert_eq!(
            malformed_at(r#"{"a":1,"b":2,"a":3}"#),
            (13, "duplicate object key")
        );
        // Same key in sibling objects is fine.
        assert!(decode(r#"[{"a":1},{"a":2}]"#).is_ok());
    }

    #[test]
    fn string_escapes_decode() {
        let value = decode(r#""q\" b\\ s\/ \b\f\n\r\t é ☃""#).unwrap();
        assert_eq!(value.as_str(), Some("q\" b\\ s/ \u{08}\u{0C}\n\r\t é ☃"));
    }

    #[test]
    fn surrogate_pairs() {
        assert_eq!(decode(r#""\ud83e\udd80""#).unwrap().as_str(), Some("🦀"));
        assert_eq!(malformed_at(r#""\ud83e""#).1, "unpaired surrogate in \\u escape");
        assert_eq!(malformed_at(r#""\udd80""#).1, "unpaired surrogate in \\u escape");
        assert_eq!(malformed_at(r#""\ud83eA""#).1, "unpaired surrogate in \\u escape");
    }

    #[test]
    fn string_errors() {
        assert_eq!(malformed_at("\"abc"), (4, "unterminated string"));
        assert_eq!(malformed_at("\"a\u{01}\""), (2, "control character in string"));
        assert_eq!(malformed_at(r#""\x""#), (2, "invalid escape sequence"));
        assert_eq!(malformed_at(r#""\u12g4""#), (3, "expected four hex digits"));
    }

    #[test]
    fn raw_non_ascii_is_kept() {
        assert_eq!(decode("\"日本 🦀\"").unwrap().as_str(), Some("日本 🦀"));
    }

    #[test]
    fn whitespace_is_insignificant() {
        let spaced = decode(" {\n\t\"a\" : [ 1 , 2.0 ] ,\r\n \"b\" : null } ").unwrap();
        assert_eq!(encode(&spaced), r#"{"a":[1,2.0],"b":null}"#);
    }

    #[test]
    fn key_order_is_preserved() {
        let value = decode(r#"{"z":1,"y":2,"x":3}"#).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "y", "x"]);
    }

    #[test]
    fn deep_text_stops_at_the_depth_limit() {
        let text = "[".repeat(100_000);
        assert_eq!(
            decode(&text),
            Err(CodecError::ResourceExhausted {
                limit: Limit::Depth(128)
            })
        );
    }
}
