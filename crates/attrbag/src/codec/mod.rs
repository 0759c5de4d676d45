//! # Canonical Text Codec
//!
//! Converts a [`Value`] to and from the text stored in an attribute column.
//! The text is compact JSON (RFC 8259) with object members in insertion
//! order, so any JSON tool can read a column, but only this module decides
//! how numbers are typed when one is read back.
//!
//! ## Numeric Canonicalization
//!
//! One rule, applied to every literal no matter which engine stored the text:
//!
//! | Literal | Decodes to |
//! |---------|------------|
//! | no `.`, no exponent, fits `i64` (`5`, `-0`) | integral |
//! | no `.`, no exponent, outside `i64` | [`CodecError::UnsupportedNumericLiteral`] |
//! | has `.` or exponent (`5.0`, `5e0`) | fractional |
//! | fractional that overflows `f64` (`1e400`) | [`CodecError::UnsupportedNumericLiteral`] |
//!
//! The encoder writes integral numbers as plain integers and fractional
//! numbers with a `.` or exponent, so `decode(encode(v)) == v` for every value.
//!
//! ## Absence
//!
//! There is deliberately no text for "absent". A slot with no value is a
//! column with no value (`None`), which never passes through this codec. A
//! `null` *inside* a tree is the literal `null`.

mod decode;
mod encode;

use thiserror::Error;

use crate::config::{Limit, Limits};
use crate::value::Value;

pub use decode::decode_with_limits;
pub use encode::encode;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The text is not well-formed. `position` is a byte offset into the text.
    #[error("malformed attribute text at byte {position}: {message}")]
    MalformedText {
        position: usize,
        message: &'static str,
    },

    /// A number that neither subtype can hold without changing its meaning.
    #[error("unsupported numeric literal '{text}'")]
    UnsupportedNumericLiteral { text: String },

    /// The text nests deeper or holds more values than the limits allow.
    #[error("limit exceeded while decoding: {limit}")]
    ResourceExhausted { limit: Limit },
}

/// Decodes column text with the default [`Limits`].
pub fn decode(text: &str) -> Result<Value, CodecError> {
    decode_with_limits(text, &Limits::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Map, Number};

    #[test]
    fn round_trip_preserves_order_and_subtypes() {
        let value = Value::from_iter([
            ("z", Value::from(1)),
            ("a", Value::Number(Number::from_f64(1.0).unwrap())),
            ("m", Value::from(vec![Value::Null, Value::Bool(false)])),
        ]);
        let text = encode(&value);
        assert_eq!(text, r#"{"z":1,"a":1.0,"m":[null,false]}"#);
        assert_eq!(decode(&text).unwrap(), value);
    }

    #[test]
    fn empty_object_is_distinct_text() {
        let text = encode(&Value::Object(Map::new()));
        assert_eq!(text, "{}");
        assert_eq!(decode(&text).unwrap(), Value::Object(Map::new()));
    }

    #[test]
    fn empty_text_is_malformed() {
        assert_eq!(
            decode(""),
            Err(CodecError::MalformedText {
                position: 0,
                message: "unexpected end of input"
            })
        );
    }

    #[test]
    fn decode_respects_limits() {
        let limits = Limits::new(2, 100);
        assert!(decode_with_limits("[[1]]", &limits).is_ok());
        assert_eq!(
            decode_with_limits("[[[1]]]", &limits),
            Err(CodecError::ResourceExhausted {
                limit: Limit::Depth(2)
            })
        );
        assert_eq!(
            decode_with_limits("[1,2,3]", &Limits::new(2, 3)),
            Err(CodecError::ResourceExhausted {
                limit: Limit::Nodes(3)
            })
        );
    }

    #[test]
    fn error_messages_carry_position_and_text() {
        let err = decode("{\"a\":}").unwrap_err();
        assert_eq!(err.to_string(), "malformed attribute text at byte 5: expected a value");
        let err = decode("99999999999999999999").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported numeric literal '99999999999999999999'"
        );
    }
}
