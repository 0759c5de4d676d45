use crate::value::Value;

/// Renders `value` as canonical column text.
///
/// Compact (no insignificant whitespace), object members in insertion order.
/// Strings escape `"`, `\` and every control character; all other characters,
/// including non-ASCII, are written as UTF-8. Fractional numbers always carry
/// a `.` or an exponent, so they decode back as fractional.
pub fn encode(value: &Value) -> String {
    // Keys are strings and numbers are finite, so serialization cannot fail.
    serde_json::to_string(value).expect("attribute value serialization failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::value::{Map, Number};

    fn text(s: &str) -> String {
        encode(&Value::from(s))
    }

    fn float(f: f64) -> Value {
        Value::Number(Number::from_f64(f).unwrap())
    }

    #[test]
    fn leaves() {
        assert_eq!(encode(&Value::Null), "null");
        assert_eq!(encode(&Value::Bool(true)), "true");
        assert_eq!(encode(&Value::from(-3)), "-3");
        assert_eq!(encode(&Value::from(i64::MIN)), "-9223372036854775808");
        assert_eq!(encode(&float(2.5)), "2.5");
        assert_eq!(encode(&float(3.0)), "3.0");
        assert_eq!(encode(&float(-0.0)), "-0.0");
    }

    #[test]
    fn fractional_numbers_keep_their_marker() {
        for f in [1e21, 1e-7, 123456789.0, f64::MAX, f64::MIN_POSITIVE, 0.1] {
            let out = encode(&float(f));
            assert!(out.contains('.') || out.contains('e'), "{}", out);
            let back = decode(&out).unwrap().as_number().unwrap();
            assert!(back.is_fractional(), "{}", out);
            assert_eq!(back.as_f64(), f);
        }
    }

    #[test]
    fn containers_are_compact() {
        let value = Value::from_iter([
            ("tags", Value::from(vec![Value::from("a"), Value::from("b")])),
            ("empty", Value::Object(Map::new())),
            ("none", Value::Array(Vec::new())),
        ]);
        assert_eq!(encode(&value), r#"{"tags":["a","b"],"empty":{},"none":[]}"#);
    }

    #[test]
    fn members_keep_insertion_order() {
        let value = Value::from_iter([("z", Value::from(1)), ("a", Value::from(2))]);
        assert_eq!(encode(&value), r#"{"z":1,"a":2}"#);
        assert_eq!(value.to_string(), encode(&value));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(text("plain"), r#""plain""#);
        assert_eq!(text("say \"hi\""), r#""say \"hi\"""#);
        assert_eq!(text("back\\slash"), r#""back\\slash""#);
        assert_eq!(text("a\nb\tc\r"), r#""a\nb\tc\r""#);
        assert_eq!(text("\u{08}\u{0C}"), r#""\b\f""#);
        assert_eq!(text("\u{01}\u{1f}"), r#""\u0001\u001f""#);
        assert_eq!(text("/"), r#""/""#);
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(text("naïve ☃ 日本 🦀"), "\"naïve ☃ 日本 🦀\"");
    }

    #[test]
    fn keys_are_escaped_too() {
        let value = Value::from_iter([("a\"b", Value::Null)]);
        assert_eq!(encode(&value), r#"{"a\"b":null}"#);
    }
}
