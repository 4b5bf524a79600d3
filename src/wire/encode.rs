//! Binary encoding: `Value` → bytes.

use std::io::Write;

use num_bigint::BigInt;

use super::tag::{self, Magic};
use super::varint::{self, encode_int, encode_long, write_length};
use crate::compact::{ReferenceTable, Scalar};
use crate::error::{CodecError, Result};
use crate::types::{BigDecimal, Document, Value};

/// Writes tag-prefixed values to a byte sink.
///
/// Without a reference table this produces the plain binary format. With one
/// (see [`crate::compact::CompactWriter`]) strings, big numbers and dates are
/// written as table references and object keys as bare indices.
///
/// The writer can be pointed at a new sink with [`StreamWriter::rebind`] to
/// reuse it across documents.
#[derive(Debug)]
pub struct StreamWriter<W> {
    output: W,
    table: Option<ReferenceTable>,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            table: None,
        }
    }

    pub(crate) fn with_table(output: W, table: ReferenceTable) -> Self {
        Self {
            output,
            table: Some(table),
        }
    }

    /// Swaps in a new sink and returns the previous one.
    pub fn rebind(&mut self, output: W) -> W {
        std::mem::replace(&mut self.output, output)
    }

    pub(crate) fn set_table(&mut self, table: Option<ReferenceTable>) -> Option<ReferenceTable> {
        std::mem::replace(&mut self.table, table)
    }

    pub fn get_ref(&self) -> &W {
        &self.output
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }

    pub fn write_magic(&mut self, magic: Magic) -> Result<()> {
        self.output.write_all(&magic.bytes())?;
        Ok(())
    }

    pub(crate) fn write_tag(&mut self, tag_byte: u8) -> Result<()> {
        self.write_u8(tag_byte)
    }

    pub(crate) fn write_u8(&mut self, b: u8) -> Result<()> {
        self.output.write_all(&[b])?;
        Ok(())
    }

    pub(crate) fn write_length(&mut self, len: usize) -> Result<()> {
        write_length(&mut self.output, len)
    }

    /// Appends the tag-prefixed encoding of `value`, recursing into
    /// containers.
    pub fn write(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.write_tag(tag::NULL),
            Value::Bool(b) => self.write_tag(if *b { tag::TRUE } else { tag::FALSE }),
            Value::Int(i) => encode_int(*i).write_to(&mut self.output),
            Value::Long(l) => encode_long(*l).write_to(&mut self.output),
            Value::Float(f) => self.write_float(*f),
            Value::Double(d) => self.write_double(*d),
            Value::String(s) => self.write_scalar(Scalar::Str(s)),
            Value::BigInt(b) => self.write_scalar(Scalar::BigInt(b)),
            Value::BigDecimal(d) => self.write_scalar(Scalar::BigDecimal(d)),
            Value::Date(ms) => self.write_scalar(Scalar::Date(*ms)),
            Value::Binary(b) => {
                self.write_tag(tag::BINARY)?;
                self.write_binary_payload(b)
            }
            Value::Array(items) => self.write_array(items),
            Value::Object(doc) => self.write_object(doc),
        }
    }

    fn write_float(&mut self, f: f32) -> Result<()> {
        // Only +0.0 takes the short form; -0.0 keeps its sign bit.
        if f.to_bits() == 0 {
            return self.write_tag(tag::FLOAT_ZERO);
        }
        self.write_tag(tag::FLOAT)?;
        self.output.write_all(&f.to_be_bytes())?;
        Ok(())
    }

    fn write_double(&mut self, d: f64) -> Result<()> {
        if d.to_bits() == 0 {
            return self.write_tag(tag::DOUBLE_ZERO);
        }
        self.write_tag(tag::DOUBLE)?;
        self.output.write_all(&d.to_be_bytes())?;
        Ok(())
    }

    /// Writes a table-eligible scalar, as a reference when a table is bound.
    fn write_scalar(&mut self, scalar: Scalar<'_>) -> Result<()> {
        if self.table.is_some() {
            self.write_tag(tag::REF)?;
            return self.write_reference(scalar);
        }
        match scalar {
            Scalar::Str(s) => {
                self.write_tag(tag::STRING)?;
                self.write_string_payload(s)
            }
            Scalar::BigInt(b) => {
                self.write_tag(tag::BIG_INTEGER)?;
                self.write_big_integer_payload(b)
            }
            Scalar::BigDecimal(d) => {
                self.write_tag(tag::BIG_DECIMAL)?;
                self.write_big_decimal_payload(d)
            }
            Scalar::Date(ms) => {
                self.write_tag(tag::DATE)?;
                self.write_date_payload(ms)
            }
        }
    }

    /// Writes the bare fixed-width index of `scalar`.
    fn write_reference(&mut self, scalar: Scalar<'_>) -> Result<()> {
        let Some(table) = self.table.as_ref() else {
            return Err(CodecError::MissingReference(format!(
                "{scalar} (no reference table bound)"
            )));
        };
        let index = table
            .index_of(scalar)
            .ok_or_else(|| CodecError::MissingReference(scalar.to_string()))?;
        varint::write_index(&mut self.output, index, table.byte_width())
    }

    fn write_array(&mut self, items: &[Value]) -> Result<()> {
        self.write_tag(tag::ARRAY)?;
        self.write_length(items.len())?;
        for item in items {
            self.write(item)?;
        }
        Ok(())
    }

    fn write_object(&mut self, doc: &Document) -> Result<()> {
        self.write_tag(tag::OBJECT)?;
        self.write_length(doc.len())?;
        for (key, value) in doc {
            // Keys carry no tag: a length-prefixed string, or a bare index.
            if self.table.is_some() {
                self.write_reference(Scalar::Str(key))?;
            } else {
                self.write_string_payload(key)?;
            }
            self.write(value)?;
        }
        Ok(())
    }

    // -- Untagged payloads, shared with the compact table header --

    pub(crate) fn write_string_payload(&mut self, s: &str) -> Result<()> {
        self.write_binary_payload(s.as_bytes())
    }

    pub(crate) fn write_binary_payload(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_length(bytes.len())?;
        if !bytes.is_empty() {
            self.output.write_all(bytes)?;
        }
        Ok(())
    }

    pub(crate) fn write_big_integer_payload(&mut self, b: &BigInt) -> Result<()> {
        self.write_binary_payload(&b.to_signed_bytes_be())
    }

    pub(crate) fn write_big_decimal_payload(&mut self, d: &BigDecimal) -> Result<()> {
        let scale = usize::try_from(d.scale()).map_err(|_| {
            CodecError::Unsupported(format!("negative decimal scale {} in {d}", d.scale()))
        })?;
        self.write_length(scale)?;
        self.write_big_integer_payload(d.unscaled())
    }

    pub(crate) fn write_date_payload(&mut self, ms: i64) -> Result<()> {
        self.output.write_all(&ms.to_be_bytes())?;
        Ok(())
    }
}

/// Encodes a single value into a fresh buffer using the plain binary format.
pub fn encode_value(value: &Value) -> Result<Vec<u8>> {
    let mut writer = StreamWriter::new(Vec::new());
    writer.write(value)?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value) -> Vec<u8> {
        encode_value(value).expect("encode failed")
    }

    #[test]
    fn encode_null_and_booleans() {
        assert_eq!(encode(&Value::Null), [0x01]);
        assert_eq!(encode(&Value::Bool(true)), [0x03]);
        assert_eq!(encode(&Value::Bool(false)), [0x04]);
    }

    #[test]
    fn encode_zero_floats_use_short_tags() {
        assert_eq!(encode(&Value::Float(0.0)), [tag::FLOAT_ZERO]);
        assert_eq!(encode(&Value::Double(0.0)), [tag::DOUBLE_ZERO]);
    }

    #[test]
    fn encode_negative_zero_keeps_payload() {
        let bytes = encode(&Value::Double(-0.0));
        assert_eq!(bytes[0], tag::DOUBLE);
        assert_eq!(&bytes[1..], &(-0.0f64).to_be_bytes());
    }

    #[test]
    fn encode_float32() {
        let bytes = encode(&Value::Float(1.5));
        assert_eq!(bytes, [tag::FLOAT, 0x3F, 0xC0, 0x00, 0x00]);
    }

    #[test]
    fn encode_empty_string_and_binary() {
        assert_eq!(encode(&Value::from("")), [tag::STRING, 0x00]);
        assert_eq!(encode(&Value::Binary(Vec::new())), [tag::BINARY, 0x00]);
    }

    #[test]
    fn encode_short_string() {
        assert_eq!(encode(&Value::from("hi")), [tag::STRING, 0x02, b'h', b'i']);
    }

    #[test]
    fn encode_big_integer_twos_complement() {
        assert_eq!(
            encode(&Value::BigInt(BigInt::from(-1))),
            [tag::BIG_INTEGER, 0x01, 0xFF]
        );
        assert_eq!(
            encode(&Value::BigInt(BigInt::from(128))),
            [tag::BIG_INTEGER, 0x02, 0x00, 0x80]
        );
    }

    #[test]
    fn encode_big_decimal_scale_then_unscaled() {
        let d = BigDecimal::new(12345, 2);
        assert_eq!(
            encode(&Value::BigDecimal(d)),
            [tag::BIG_DECIMAL, 0x02, 0x02, 0x30, 0x39]
        );
    }

    #[test]
    fn encode_negative_scale_unsupported() {
        let err = encode_value(&Value::BigDecimal(BigDecimal::new(1, -3))).unwrap_err();
        assert!(matches!(err, CodecError::Unsupported(_)));
    }

    #[test]
    fn encode_date_fixed_width() {
        let bytes = encode(&Value::Date(1));
        assert_eq!(bytes, [tag::DATE, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn encode_object_keys_untagged() {
        let doc = Document::from([("a".to_string(), Value::Int(1))]);
        assert_eq!(
            encode(&Value::Object(doc)),
            [tag::OBJECT, 0x01, 0x01, b'a', 0x05, 0x01]
        );
    }

    #[test]
    fn encode_array_header() {
        let items = vec![Value::Null, Value::Bool(true)];
        assert_eq!(encode(&Value::Array(items)), [tag::ARRAY, 0x02, 0x01, 0x03]);
    }

    #[test]
    fn rebind_returns_previous_sink() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write(&Value::Null).expect("write");
        let first = writer.rebind(Vec::new());
        writer.write(&Value::Bool(true)).expect("write");
        assert_eq!(first, [0x01]);
        assert_eq!(writer.into_inner(), [0x03]);
    }
}
