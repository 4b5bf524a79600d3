//! Variable-width integers and the length primitive.
//!
//! Integers carry their sign in the tag and store the absolute value as the
//! shortest big-endian run of bytes. Lengths take one byte below 255 and five
//! bytes (`0xFF` + `u32`) otherwise.

use std::io::{Read, Write};

use super::tag::{self, IntTag};
use crate::error::{CodecError, Result};
use crate::types::Value;

/// Tag and right-aligned big-endian payload of an encoded integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntEncoding {
    tag: u8,
    buf: [u8; tag::MAX_INT_BYTES],
    len: usize,
}

impl IntEncoding {
    fn new(negative: bool, magnitude: u64, min_len: usize) -> Self {
        let len = magnitude_len(magnitude).max(min_len);
        Self {
            tag: tag::int_tag(negative, len),
            buf: magnitude.to_be_bytes(),
            len,
        }
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn payload(&self) -> &[u8] {
        &self.buf[tag::MAX_INT_BYTES - self.len..]
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&[self.tag])?;
        out.write_all(self.payload())?;
        Ok(())
    }
}

/// Bytes needed for `n` without leading zero bytes; zero takes one byte.
fn magnitude_len(n: u64) -> usize {
    let bits = (u64::BITS - n.leading_zeros()) as usize;
    bits.div_ceil(8).max(1)
}

/// Encodes a declared 32-bit integer (1-4 payload bytes).
pub fn encode_int(v: i32) -> IntEncoding {
    IntEncoding::new(v < 0, u64::from(v.unsigned_abs()), 1)
}

/// Encodes a declared 64-bit integer (5-8 payload bytes).
///
/// A natural payload shorter than five bytes gets four zero bytes in front,
/// so a reader can tell a long from an int by the tag alone.
pub fn encode_long(v: i64) -> IntEncoding {
    let magnitude = v.unsigned_abs();
    let natural = magnitude_len(magnitude);
    let len = if natural <= tag::MAX_INT32_BYTES {
        natural + tag::LONG_PADDING
    } else {
        natural
    };
    IntEncoding::new(v < 0, magnitude, len)
}

/// Decodes the payload of an integer tag.
///
/// 1-3 byte payloads are `Int`, 5-8 byte payloads are `Long`. A 4-byte payload
/// is an `Int` unless its magnitude falls outside the 32-bit range, in which
/// case it is promoted to `Long`.
pub fn decode_integer<R: Read>(input: &mut R, tag_byte: u8) -> Result<Value> {
    let IntTag { negative, bytes } =
        tag::int_tag_info(tag_byte).ok_or(CodecError::UnknownTag(tag_byte))?;
    let mut buf = [0u8; tag::MAX_INT_BYTES];
    input.read_exact(&mut buf[tag::MAX_INT_BYTES - bytes..])?;
    let magnitude = u64::from_be_bytes(buf);

    const INT_NEG_LIMIT: u64 = 1 << 31;
    const LONG_NEG_LIMIT: u64 = 1 << 63;

    let value = if bytes <= tag::MAX_INT32_BYTES {
        match (negative, magnitude) {
            (false, m) if m <= i32::MAX as u64 => Value::Int(m as i32),
            (false, m) => Value::Long(m as i64),
            // -(2^31) has no positive counterpart in i32.
            (true, INT_NEG_LIMIT) => Value::Int(i32::MIN),
            (true, m) if m < INT_NEG_LIMIT => Value::Int(-(m as i32)),
            (true, m) => Value::Long(-(m as i64)),
        }
    } else {
        match (negative, magnitude) {
            (false, m) if m <= i64::MAX as u64 => Value::Long(m as i64),
            (true, LONG_NEG_LIMIT) => Value::Long(i64::MIN),
            (true, m) if m < LONG_NEG_LIMIT => Value::Long(-(m as i64)),
            (_, m) => {
                return Err(CodecError::Malformed(format!(
                    "integer magnitude {m} out of range (negative: {negative})"
                )));
            }
        }
    };
    Ok(value)
}

/// Writes a length: one byte below 255, otherwise `0xFF` + 4-byte big-endian.
pub fn write_length<W: Write>(out: &mut W, len: usize) -> Result<()> {
    if len < usize::from(tag::LENGTH_EXTENDED) {
        out.write_all(&[len as u8])?;
        return Ok(());
    }
    if len > tag::MAX_LENGTH {
        return Err(CodecError::Unsupported(format!(
            "length {len} exceeds maximum of {}",
            tag::MAX_LENGTH
        )));
    }
    out.write_all(&[tag::LENGTH_EXTENDED])?;
    out.write_all(&(len as u32).to_be_bytes())?;
    Ok(())
}

/// Reads a length written by [`write_length`].
pub fn read_length<R: Read>(input: &mut R) -> Result<usize> {
    let first = read_u8(input)?;
    if first != tag::LENGTH_EXTENDED {
        return Ok(usize::from(first));
    }
    let len = u32::from_be_bytes(read_array(input)?) as usize;
    if len > tag::MAX_LENGTH {
        return Err(CodecError::Malformed(format!(
            "length {len} exceeds maximum of {}",
            tag::MAX_LENGTH
        )));
    }
    Ok(len)
}

/// Writes a reference-table index as a fixed-width big-endian run.
pub fn write_index<W: Write>(out: &mut W, index: u32, width: usize) -> Result<()> {
    debug_assert!((1..=4).contains(&width));
    out.write_all(&index.to_be_bytes()[4 - width..])?;
    Ok(())
}

/// Reads a fixed-width big-endian reference-table index.
pub fn read_index<R: Read>(input: &mut R, width: usize) -> Result<u32> {
    debug_assert!((1..=4).contains(&width));
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf[4 - width..])?;
    Ok(u32::from_be_bytes(buf))
}

pub(crate) fn read_u8<R: Read>(input: &mut R) -> Result<u8> {
    let [b]: [u8; 1] = read_array(input)?;
    Ok(b)
}

pub(crate) fn read_array<R: Read, const N: usize>(input: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    input.read_exact(&mut buf)?;
    Ok(buf)
}
