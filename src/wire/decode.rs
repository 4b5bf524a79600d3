//! Binary decoding: bytes → `Value`.

use std::io::{self, Read};

use num_bigint::BigInt;

use super::tag::{self, Magic};
use super::varint::{self, read_array, read_length, read_u8};
use crate::compact::{ReferenceTable, Scalar};
use crate::error::{CodecError, Result};
use crate::types::{BigDecimal, Document, Shape, Value};

/// Default limit on container nesting while decoding.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Upper bound on capacity reserved up front from an untrusted length.
const PREALLOC_LIMIT: usize = 4096;

/// What to do when one element fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Replace the failed element with absence (`Null` in document shape) and
    /// keep decoding the enclosing container. Unknown tags, bad payloads and
    /// truncation are absorbed; other I/O errors still propagate. A container
    /// whose input ends before its announced member count keeps the members
    /// read so far.
    #[default]
    Lenient,
    /// Propagate every error.
    Strict,
}

impl DecodePolicy {
    /// Settles the outcome of decoding one element. `Ok(None)` is absence.
    fn settle(self, outcome: Result<Option<Value>>) -> Result<Option<Value>> {
        match outcome {
            Err(e) if self == Self::Lenient && e.is_recoverable() => {
                tracing::warn!(error = %e, "element failed to decode, substituting null");
                Ok(None)
            }
            other => other,
        }
    }
}

/// Reads tag-prefixed values from a byte source.
///
/// Without a reference table this reads the plain binary format; a bound
/// table (see [`crate::compact::CompactReader`]) enables `REF` tags and
/// index-encoded object keys.
#[derive(Debug)]
pub struct StreamReader<R> {
    input: R,
    policy: DecodePolicy,
    max_depth: usize,
    depth: usize,
    table: Option<ReferenceTable>,
}

impl<R: Read> StreamReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            policy: DecodePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
            table: None,
        }
    }

    /// Sets how element-level decode failures are handled.
    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the maximum container nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Swaps in a new source and returns the previous one. Any bound
    /// reference table is dropped.
    pub fn rebind(&mut self, input: R) -> R {
        self.depth = 0;
        self.table = None;
        std::mem::replace(&mut self.input, input)
    }

    pub(crate) fn set_table(&mut self, table: ReferenceTable) {
        self.table = Some(table);
    }

    pub(crate) fn table(&self) -> Option<&ReferenceTable> {
        self.table.as_ref()
    }

    pub fn get_ref(&self) -> &R {
        &self.input
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        read_u8(&mut self.input)
    }

    pub(crate) fn read_length(&mut self) -> Result<usize> {
        read_length(&mut self.input)
    }

    /// Consumes an optional `BiJ`/`FMB` magic and returns the tag after it.
    ///
    /// Returns `None` when the stream ends first or a magic starts but does
    /// not complete. Consumed bytes are not given back.
    pub fn read_header(&mut self) -> Result<Option<u8>> {
        let first = match eof_as_none(self.read_u8())? {
            Some(b) => b,
            None => return Ok(None),
        };
        let magic = match first {
            b'B' => Magic::BiJ,
            b'F' => Magic::Fmb,
            _ => return Ok(Some(first)),
        };
        let rest = magic.bytes();
        for &expected in &rest[1..] {
            if eof_as_none(self.read_u8())? != Some(expected) {
                return Ok(None);
            }
        }
        eof_as_none(self.read_u8())
    }

    /// Consumes the root framing and reports whether it announced
    /// `expected_tag`, bare or behind a magic.
    pub fn check_header(&mut self, expected_tag: u8) -> Result<bool> {
        Ok(self.read_header()? == Some(expected_tag))
    }

    /// Reads one tag-prefixed value.
    ///
    /// In [`Shape::Document`] this always yields `Some`, with `Value::Null`
    /// for nulls. In [`Shape::Plain`] a null yields `None`. Under
    /// [`DecodePolicy::Lenient`] a recoverable failure is treated as a null.
    pub fn read_value(&mut self, shape: Shape) -> Result<Option<Value>> {
        let outcome = self.read_tagged(shape);
        self.settle_value(outcome, shape)
    }

    fn settle_value(
        &self,
        outcome: Result<Option<Value>>,
        shape: Shape,
    ) -> Result<Option<Value>> {
        let value = self.policy.settle(outcome)?;
        Ok(match shape {
            Shape::Document => Some(value.unwrap_or(Value::Null)),
            Shape::Plain => value,
        })
    }

    fn read_tagged(&mut self, shape: Shape) -> Result<Option<Value>> {
        let tag_byte = self.read_u8()?;
        self.read_body(tag_byte, shape)
    }

    /// Decodes the payload announced by `tag_byte`. `Ok(None)` is a null.
    pub(crate) fn read_body(&mut self, tag_byte: u8, shape: Shape) -> Result<Option<Value>> {
        let value = match tag_byte {
            tag::NULL => return Ok(None),
            tag::TRUE => Value::Bool(true),
            tag::FALSE => Value::Bool(false),
            0x05..=0x0C | 0x15..=0x1C => varint::decode_integer(&mut self.input, tag_byte)?,
            tag::FLOAT => Value::Float(f32::from_be_bytes(read_array(&mut self.input)?)),
            tag::FLOAT_ZERO => Value::Float(0.0),
            tag::DOUBLE => Value::Double(f64::from_be_bytes(read_array(&mut self.input)?)),
            tag::DOUBLE_ZERO => Value::Double(0.0),
            tag::STRING => Value::String(self.read_string_payload()?),
            tag::BIG_INTEGER => Value::BigInt(self.read_big_integer_payload()?),
            tag::BIG_DECIMAL => Value::BigDecimal(self.read_big_decimal_payload()?),
            tag::DATE => Value::Date(self.read_date_payload()?),
            tag::BINARY => Value::Binary(self.read_binary_payload()?),
            tag::ARRAY => self.read_array(shape)?,
            tag::OBJECT => self.read_object(shape)?,
            tag::REF if self.table.is_some() => self.read_reference()?,
            other => return Err(CodecError::UnknownTag(other)),
        };
        Ok(Some(value))
    }

    /// Reads an array body (after the tag).
    pub fn read_array(&mut self, shape: Shape) -> Result<Value> {
        self.enter()?;
        let result = self.read_array_members(shape);
        self.depth -= 1;
        result
    }

    /// Reads an object body (after the tag).
    pub fn read_object(&mut self, shape: Shape) -> Result<Value> {
        self.enter()?;
        let result = self.read_object_members(shape);
        self.depth -= 1;
        result
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn read_array_members(&mut self, shape: Shape) -> Result<Value> {
        let len = self.read_length()?;
        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for read in 0..len {
            let first = self.read_u8();
            let Some(tag_byte) = self.member_start(first, len, read)? else {
                break;
            };
            let outcome = self.read_body(tag_byte, shape);
            // Plain-shape nulls still occupy their slot.
            items.push(self.settle_value(outcome, shape)?.unwrap_or(Value::Null));
        }
        Ok(Value::Array(items))
    }

    fn read_object_members(&mut self, shape: Shape) -> Result<Value> {
        let len = self.read_length()?;
        let mut doc = Document::with_capacity(len.min(PREALLOC_LIMIT));
        for read in 0..len {
            let first = self.read_key();
            let Some(key) = self.member_start(first, len, read)? else {
                break;
            };
            if let Some(value) = self.read_value(shape)? {
                doc.insert(key, value);
            }
        }
        Ok(Value::Object(doc))
    }

    /// Settles the first read of a container member.
    ///
    /// `None` ends the container: the input ran out before the announced
    /// member count, and the lenient policy keeps the members read so far.
    /// The strict policy reports the truncation.
    fn member_start<T>(
        &self,
        first: Result<T>,
        announced: usize,
        read: usize,
    ) -> Result<Option<T>> {
        match first {
            Err(CodecError::Io(e))
                if e.kind() == io::ErrorKind::UnexpectedEof
                    && self.policy == DecodePolicy::Lenient =>
            {
                tracing::warn!(announced, read, "input ended inside a container");
                Ok(None)
            }
            other => other.map(Some),
        }
    }

    fn read_key(&mut self) -> Result<String> {
        if self.table.is_none() {
            return self.read_string_payload();
        }
        match self.resolve_reference()? {
            Scalar::Str(s) => Ok(s.to_owned()),
            other => Err(CodecError::Malformed(format!(
                "object key reference resolves to non-string {other}"
            ))),
        }
    }

    fn read_reference(&mut self) -> Result<Value> {
        Ok(self.resolve_reference()?.to_value())
    }

    fn resolve_reference(&mut self) -> Result<Scalar<'_>> {
        let Some(table) = self.table.as_ref() else {
            return Err(CodecError::Malformed("reference without a table".into()));
        };
        let index = varint::read_index(&mut self.input, table.byte_width())?;
        table.get(index).ok_or_else(|| {
            CodecError::Malformed(format!(
                "reference {index} out of range for table of {}",
                table.len()
            ))
        })
    }

    // -- Untagged payloads, shared with the compact table header --

    pub(crate) fn read_binary_payload(&mut self) -> Result<Vec<u8>> {
        let len = self.read_length()?;
        self.read_exact_vec(len)
    }

    pub(crate) fn read_string_payload(&mut self) -> Result<String> {
        let bytes = self.read_binary_payload()?;
        String::from_utf8(bytes)
            .map_err(|e| CodecError::Malformed(format!("invalid UTF-8 string: {e}")))
    }

    pub(crate) fn read_big_integer_payload(&mut self) -> Result<BigInt> {
        let bytes = self.read_binary_payload()?;
        Ok(BigInt::from_signed_bytes_be(&bytes))
    }

    pub(crate) fn read_big_decimal_payload(&mut self) -> Result<BigDecimal> {
        // read_length never exceeds i32::MAX
        let scale = self.read_length()? as i32;
        let unscaled = self.read_big_integer_payload()?;
        Ok(BigDecimal::new(unscaled, scale))
    }

    pub(crate) fn read_date_payload(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(read_array(&mut self.input)?))
    }

    /// Reads exactly `len` bytes without trusting `len` for the allocation.
    fn read_exact_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        (&mut self.input).take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("need {len} bytes but only {} remaining", buf.len()),
            )
            .into());
        }
        Ok(buf)
    }
}

fn eof_as_none(result: Result<u8>) -> Result<Option<u8>> {
    match result {
        Ok(b) => Ok(Some(b)),
        Err(CodecError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// Decodes a single value from a byte slice in the plain binary format.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let mut reader = StreamReader::new(bytes).with_policy(DecodePolicy::Strict);
    Ok(reader.read_value(Shape::Document)?.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::encode;

    /// Encode then decode a value and verify round-trip.
    fn round_trip(value: &Value) -> Value {
        let bytes = encode::encode_value(value).expect("encode failed");
        decode_value(&bytes).expect("decode failed")
    }

    fn assert_round_trip(value: Value) {
        assert_eq!(round_trip(&value), value, "failed for {value}");
    }

    #[test]
    fn round_trip_null_and_bool() {
        assert_round_trip(Value::Null);
        assert_round_trip(Value::Bool(true));
        assert_round_trip(Value::Bool(false));
    }

    #[test]
    fn round_trip_int_byte_boundaries() {
        for v in [
            0,
            1,
            -1,
            0xFF,
            0x100,
            -0xFF,
            -0x100,
            0xFFFF,
            0x1_0000,
            0xFF_FFFF,
            0x100_0000,
            -0x100_0000,
            i32::MAX,
            i32::MIN,
            i32::MIN + 1,
        ] {
            assert_round_trip(Value::Int(v));
        }
    }

    #[test]
    fn round_trip_long_byte_boundaries() {
        let mut cases = vec![0i64, 1, -1, i64::MAX, i64::MIN, i64::MIN + 1];
        for bytes in 1..8u32 {
            let edge = 1i64 << (8 * bytes);
            cases.extend([edge - 1, edge, -(edge - 1), -edge]);
        }
        for v in cases {
            assert_round_trip(Value::Long(v));
        }
    }

    #[test]
    fn round_trip_floats() {
        for f in [0.0f32, -0.0, 1.5, f32::MIN_POSITIVE, f32::MAX, -3.25] {
            let back = round_trip(&Value::Float(f));
            match back {
                Value::Float(g) => assert_eq!(g.to_bits(), f.to_bits(), "failed for {f}"),
                other => panic!("expected float, got {other}"),
            }
        }
        for d in [0.0f64, -0.0, std::f64::consts::PI, f64::MAX, -1e-300] {
            let back = round_trip(&Value::Double(d));
            match back {
                Value::Double(g) => assert_eq!(g.to_bits(), d.to_bits(), "failed for {d}"),
                other => panic!("expected double, got {other}"),
            }
        }
    }

    #[test]
    fn round_trip_big_numbers() {
        let huge = BigInt::from(u128::MAX) * BigInt::from(u128::MAX);
        assert_round_trip(Value::BigInt(huge.clone()));
        assert_round_trip(Value::BigInt(-huge));
        assert_round_trip(Value::BigInt(BigInt::from(0)));
        for (unscaled, scale) in [(0, 0), (12345, 2), (-1, 30), (7, 300)] {
            assert_round_trip(Value::BigDecimal(BigDecimal::new(unscaled, scale)));
        }
    }

    #[test]
    fn round_trip_date_string_binary() {
        assert_round_trip(Value::Date(0));
        assert_round_trip(Value::Date(-86_400_000));
        assert_round_trip(Value::Date(1_700_000_000_123));
        assert_round_trip(Value::from(""));
        assert_round_trip(Value::from("héllo wörld"));
        assert_round_trip(Value::from("x".repeat(300)));
        assert_round_trip(Value::Binary(Vec::new()));
        assert_round_trip(Value::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]));
    }

    #[test]
    fn round_trip_nested() {
        let inner = Document::from([
            ("name".to_string(), Value::from("Alice")),
            ("tags".to_string(), Value::Array(vec![Value::from("a"), Value::Null])),
        ]);
        let value = Value::Array(vec![
            Value::Object(inner),
            Value::Array(Vec::new()),
            Value::Object(Document::new()),
        ]);
        assert_round_trip(value);
    }

    #[test]
    fn object_member_order_preserved() {
        let doc = Document::from([
            ("z".to_string(), Value::Int(1)),
            ("a".to_string(), Value::Int(2)),
            ("m".to_string(), Value::Int(3)),
        ]);
        let back = round_trip(&Value::Object(doc));
        let keys: Vec<&str> = back
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn container_length_boundaries() {
        for len in [254usize, 255, 256] {
            let value = Value::Array((0..len as i32).map(Value::Int).collect());
            let bytes = encode::encode_value(&value).expect("encode failed");
            if len < 255 {
                assert_eq!(bytes[1], len as u8);
            } else {
                assert_eq!(bytes[1], tag::LENGTH_EXTENDED);
                assert_eq!(&bytes[2..6], &(len as u32).to_be_bytes());
            }
            assert_eq!(decode_value(&bytes).expect("decode failed"), value);

            let doc: Document = (0..len)
                .map(|i| (format!("k{i}"), Value::Int(i as i32)))
                .collect();
            assert_round_trip(Value::Object(doc));
        }
    }

    #[test]
    fn lenient_substitutes_null_for_unknown_tag() {
        // Two members: an unknown tag, then `true`.
        let bytes = [tag::ARRAY, 0x02, 0x7A, tag::TRUE];
        let mut reader = StreamReader::new(&bytes[..]);
        let value = reader.read_value(Shape::Document).expect("lenient decode");
        assert_eq!(value, Some(Value::Array(vec![Value::Null, Value::Bool(true)])));
    }

    #[test]
    fn strict_reports_unknown_tag() {
        let bytes = [tag::ARRAY, 0x02, 0x7A, tag::TRUE];
        let mut reader = StreamReader::new(&bytes[..]).with_policy(DecodePolicy::Strict);
        assert!(matches!(
            reader.read_value(Shape::Document),
            Err(CodecError::UnknownTag(0x7A))
        ));
    }

    #[test]
    fn lenient_truncated_container_keeps_members_read() {
        // Array announces three members but only one is present.
        let bytes = [tag::ARRAY, 0x03, 0x05, 0x09];
        let mut reader = StreamReader::new(&bytes[..]);
        let value = reader.read_value(Shape::Document).expect("lenient decode");
        assert_eq!(value, Some(Value::Array(vec![Value::Int(9)])));
    }

    #[test]
    fn strict_truncated_container_is_eof() {
        let bytes = [tag::ARRAY, 0x03, 0x05, 0x09];
        let mut reader = StreamReader::new(&bytes[..]).with_policy(DecodePolicy::Strict);
        match reader.read_value(Shape::Document) {
            Err(CodecError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected EOF, got {other:?}"),
        }
    }

    #[test]
    fn huge_announced_count_stops_at_end_of_input() {
        // i32::MAX members announced, none present.
        let bytes = [tag::ARRAY, 0xFF, 0x7F, 0xFF, 0xFF, 0xFF];
        let mut reader = StreamReader::new(&bytes[..]);
        assert_eq!(
            reader.read_value(Shape::Document).expect("lenient decode"),
            Some(Value::Array(Vec::new()))
        );

        let bytes = [tag::OBJECT, 0xFF, 0x7F, 0xFF, 0xFF, 0xFF];
        let mut reader = StreamReader::new(&bytes[..]);
        assert_eq!(
            reader.read_value(Shape::Plain).expect("lenient decode"),
            Some(Value::Object(Document::new()))
        );
    }

    #[test]
    fn truncated_payload_becomes_null_then_container_ends() {
        // Second member is a string cut short; the array announces five.
        let bytes = [tag::ARRAY, 0x05, tag::TRUE, tag::STRING, 0x05, b'a'];
        let mut reader = StreamReader::new(&bytes[..]);
        assert_eq!(
            reader.read_value(Shape::Document).expect("lenient decode"),
            Some(Value::Array(vec![Value::Bool(true), Value::Null]))
        );
    }

    #[test]
    fn truncated_object_keeps_complete_members() {
        // Two members announced; the second key is cut short.
        let bytes = [tag::OBJECT, 0x02, 0x01, b'a', tag::TRUE, 0x03, b'b'];
        let mut reader = StreamReader::new(&bytes[..]);
        let expected = Document::from([("a".to_string(), Value::Bool(true))]);
        assert_eq!(
            reader.read_value(Shape::Document).expect("lenient decode"),
            Some(Value::Object(expected))
        );
    }

    #[test]
    fn truncated_nested_containers_end_at_every_level() {
        let bytes = [tag::ARRAY, 0x7F, tag::ARRAY, 0x7F, tag::ARRAY, 0x7F, 0x05, 0x01];
        let mut reader = StreamReader::new(&bytes[..]);
        let innermost = Value::Array(vec![Value::Int(1)]);
        let expected = Value::Array(vec![Value::Array(vec![innermost])]);
        assert_eq!(
            reader.read_value(Shape::Document).expect("lenient decode"),
            Some(expected)
        );
    }

    #[test]
    fn strict_truncated_string_is_eof() {
        let bytes = [tag::STRING, 0x05, b'a', b'b'];
        let mut reader = StreamReader::new(&bytes[..]).with_policy(DecodePolicy::Strict);
        match reader.read_value(Shape::Document) {
            Err(CodecError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected EOF, got {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let bytes = [tag::STRING, 0x02, 0xC3, 0x28];
        let mut reader = StreamReader::new(&bytes[..]).with_policy(DecodePolicy::Strict);
        assert!(matches!(
            reader.read_value(Shape::Document),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn ref_tag_without_table_is_unknown() {
        let bytes = [tag::REF, 0x00];
        assert!(matches!(decode_value(&bytes), Err(CodecError::UnknownTag(tag::REF))));
    }

    #[test]
    fn plain_shape_drops_null_members() {
        let doc = Document::from([
            ("a".to_string(), Value::Null),
            ("b".to_string(), Value::Int(2)),
        ]);
        let bytes = encode::encode_value(&Value::Object(doc)).expect("encode failed");

        let mut reader = StreamReader::new(&bytes[..]);
        let plain = reader.read_value(Shape::Plain).expect("decode");
        let expected = Document::from([("b".to_string(), Value::Int(2))]);
        assert_eq!(plain, Some(Value::Object(expected)));

        let mut reader = StreamReader::new(&[tag::NULL][..]);
        assert_eq!(reader.read_value(Shape::Plain).expect("decode"), None);
        let mut reader = StreamReader::new(&[tag::NULL][..]);
        assert_eq!(reader.read_value(Shape::Document).expect("decode"), Some(Value::Null));
    }

    #[test]
    fn plain_shape_keeps_array_slots() {
        let bytes = [tag::ARRAY, 0x02, tag::NULL, tag::TRUE];
        let mut reader = StreamReader::new(&bytes[..]);
        assert_eq!(
            reader.read_value(Shape::Plain).expect("decode"),
            Some(Value::Array(vec![Value::Null, Value::Bool(true)]))
        );
    }

    #[test]
    fn depth_limit() {
        let mut value = Value::Null;
        for _ in 0..10 {
            value = Value::Array(vec![value]);
        }
        let bytes = encode::encode_value(&value).expect("encode failed");

        let mut reader = StreamReader::new(&bytes[..]).with_max_depth(10);
        assert_eq!(reader.read_value(Shape::Document).expect("decode"), Some(value));

        let mut reader = StreamReader::new(&bytes[..]).with_max_depth(9);
        assert!(matches!(
            reader.read_value(Shape::Document),
            Err(CodecError::DepthExceeded(9))
        ));
    }

    #[test]
    fn check_header_bare_and_magic() {
        let mut reader = StreamReader::new(&[tag::OBJECT][..]);
        assert!(reader.check_header(tag::OBJECT).expect("header"));

        let mut reader = StreamReader::new(&b"BiJ\x10"[..]);
        assert!(reader.check_header(tag::ARRAY).expect("header"));

        let mut reader = StreamReader::new(&b"FMB\x11"[..]);
        assert!(reader.check_header(tag::OBJECT).expect("header"));

        let mut reader = StreamReader::new(&b"BiJ\x10"[..]);
        assert!(!reader.check_header(tag::OBJECT).expect("header"));

        let mut reader = StreamReader::new(&b"Bxx\x11"[..]);
        assert!(!reader.check_header(tag::OBJECT).expect("header"));

        let mut reader = StreamReader::new(&b""[..]);
        assert!(!reader.check_header(tag::OBJECT).expect("header"));
    }

    #[test]
    fn rebind_reads_new_source() {
        let first = [tag::TRUE];
        let second = [tag::FALSE];
        let mut reader = StreamReader::new(&first[..]);
        assert_eq!(reader.read_value(Shape::Document).expect("decode"), Some(Value::Bool(true)));
        reader.rebind(&second[..]);
        assert_eq!(reader.read_value(Shape::Document).expect("decode"), Some(Value::Bool(false)));
    }
}
