//! Document value types.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;

use crate::error::CodecError;

/// Keyed document container. Keys are unique and keep insertion order, which
/// the encoders preserve on the wire.
pub type Document = IndexMap<String, Value>;

/// A value in the document model.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Declared 32-bit integer, written with a 1-4 byte payload.
    Int(i32),
    /// Declared 64-bit integer, written with a 5-8 byte payload.
    Long(i64),
    Float(f32),
    Double(f64),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Object(Document),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::BigInt(_) => "big integer",
            Self::BigDecimal(_) => "big decimal",
            Self::Date(_) => "date",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as a string reference, if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Int` or `Long` variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i64::from(*i)),
            Self::Long(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Document> {
        match self {
            Self::Object(doc) => Some(doc),
            _ => None,
        }
    }

    /// Looks up a member of an `Object` value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|doc| doc.get(key))
    }
}

/// How `Null` and missing values surface when decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shape {
    /// Explicit `Value::Null` sentinels; null-valued object members are kept.
    #[default]
    Document,
    /// Nulls surface as absence: a null root decodes to `None` and
    /// null-valued object members are left out. Array slots keep `Value::Null`
    /// so positions do not shift.
    Plain,
}

/// Arbitrary-precision decimal: `unscaled * 10^-scale`.
///
/// Equality and hashing are scale-sensitive, so `1.0` and `1.00` are distinct
/// values. Ordering is by scale, then by unscaled value, so it agrees with
/// equality but is not numeric order across scales (`10` sorts before `2.5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    unscaled: BigInt,
    scale: i32,
}

impl BigDecimal {
    pub fn new(unscaled: impl Into<BigInt>, scale: i32) -> Self {
        Self {
            unscaled: unscaled.into(),
            scale,
        }
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }
}

impl Ord for BigDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scale
            .cmp(&other.scale)
            .then_with(|| self.unscaled.cmp(&other.unscaled))
    }
}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.unscaled.sign() == Sign::Minus { "-" } else { "" };
        let digits = self.unscaled.magnitude().to_string();
        if self.scale <= 0 {
            if self.unscaled.is_zero() {
                return f.write_str("0");
            }
            let zeros = "0".repeat(self.scale.unsigned_abs() as usize);
            return write!(f, "{sign}{digits}{zeros}");
        }
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int_part}.{frac_part}")
        } else {
            let zeros = "0".repeat(scale - digits.len());
            write!(f, "{sign}0.{zeros}{digits}")
        }
    }
}

impl FromStr for BigDecimal {
    type Err = CodecError;

    /// Parses plain decimal notation such as `-12.500`; the scale is the
    /// number of fraction digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        let unsigned_int = int_part.trim_start_matches(['-', '+']);
        let digits_ok = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if unsigned_int.is_empty() && frac_part.is_empty()
            || !digits_ok(unsigned_int)
            || !digits_ok(frac_part)
        {
            return Err(CodecError::Malformed(format!("invalid decimal literal: {s:?}")));
        }
        let scale = i32::try_from(frac_part.len())
            .map_err(|_| CodecError::Malformed(format!("decimal scale too large: {s:?}")))?;
        let joined = format!("{int_part}{frac_part}");
        let unscaled = BigInt::from_str(&joined).map_err(CodecError::malformed)?;
        Ok(Self::new(unscaled, scale))
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<i64> for Value {
    fn from(l: i64) -> Self {
        Self::Long(l)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Double(f)
    }
}

impl From<BigInt> for Value {
    fn from(b: BigInt) -> Self {
        Self::BigInt(b)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Self::BigDecimal(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Document> for Value {
    fn from(d: Document) -> Self {
        Self::Object(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}L"),
            Self::Float(v) => write!(f, "{v}f"),
            Self::Double(v) => write!(f, "{v}"),
            Self::BigInt(b) => write!(f, "{b}n"),
            Self::BigDecimal(d) => write!(f, "{d}m"),
            Self::Date(ms) => write!(f, "date({ms})"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Object(doc) => {
                write!(f, "{{")?;
                for (i, (k, v)) in doc.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
