use serde::{Serialize, Serializer};

/// A JSON number with a fixed integral/fractional subtype.
///
/// The subtype is part of the value: `5` and `5.0` are different numbers and
/// stay different across encode/decode. Fractional numbers are always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number(N);

#[derive(Debug, Clone, Copy, PartialEq)]
enum N {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn from_i64(n: i64) -> Self {
        Number(N::Int(n))
    }

    /// Returns `None` for NaN and infinities, which JSON cannot represent.
    pub fn from_f64(f: f64) -> Option<Self> {
        f.is_finite().then_some(Number(N::Float(f)))
    }

    pub fn is_integral(&self) -> bool {
        matches!(self.0, N::Int(_))
    }

    pub fn is_fractional(&self) -> bool {
        matches!(self.0, N::Float(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.0 {
            N::Int(n) => Some(n),
            N::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self.0 {
            N::Int(n) => n as f64,
            N::Float(f) => f,
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::from_i64(n)
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            N::Int(n) => serializer.serialize_i64(n),
            N::Float(f) => serializer.serialize_f64(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite() {
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
        assert!(Number::from_f64(f64::NEG_INFINITY).is_none());
        assert!(Number::from_f64(1.5).is_some());
    }

    #[test]
    fn accessors() {
        assert_eq!(Number::from(-42).as_i64(), Some(-42));
        assert_eq!(Number::from(-42).as_f64(), -42.0);
        assert_eq!(Number::from_f64(0.25).unwrap().as_i64(), None);
        assert_eq!(Number::from_f64(0.25).unwrap().as_f64(), 0.25);
    }

    #[test]
    fn subtypes_do_not_compare_equal() {
        assert_ne!(Number::from(5), Number::from_f64(5.0).unwrap());
        assert!(Number::from(5).is_integral());
        assert!(Number::from_f64(5.0).unwrap().is_fractional());
    }

    #[test]
    fn serializes_with_its_subtype() {
        assert_eq!(serde_json::to_string(&Number::from(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Number::from_f64(5.0).unwrap()).unwrap(), "5.0");
    }
}
