//! Compact decoding: reference table header, then the referencing body.

use std::io::Read;

use super::table::ReferenceTable;
use crate::error::{CodecError, Result};
use crate::types::{Shape, Value};
use crate::wire::decode::{DecodePolicy, StreamReader};
use crate::wire::tag;

/// Reads a compact document: table first, then values resolved against it.
#[derive(Debug)]
pub struct CompactReader<R> {
    inner: StreamReader<R>,
}

impl<R: Read> CompactReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            inner: StreamReader::new(input),
        }
    }

    /// Continues on a plain reader that has already consumed the leading
    /// `REF` tag.
    pub(crate) fn from_stream(inner: StreamReader<R>) -> Self {
        Self { inner }
    }

    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.inner = self.inner.with_policy(policy);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.inner = self.inner.with_max_depth(max_depth);
        self
    }

    /// Swaps in a new source and returns the previous one. The table read
    /// from the previous source is dropped.
    pub fn rebind(&mut self, input: R) -> R {
        self.inner.rebind(input)
    }

    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    /// The table read by [`CompactReader::read_table`], if any.
    pub fn table(&self) -> Option<&ReferenceTable> {
        self.inner.table()
    }

    /// Consumes an optional magic and the table header.
    ///
    /// Returns `false`, consuming what it read, when the stream does not open
    /// with a table.
    pub fn read_header(&mut self) -> Result<bool> {
        if !self.inner.check_header(tag::REF)? {
            return Ok(false);
        }
        self.read_table()?;
        Ok(true)
    }

    /// Reads the table groups that follow the `REF` tag and binds them for
    /// reference resolution.
    pub fn read_table(&mut self) -> Result<&ReferenceTable> {
        let groups = self.inner.read_u8()?;
        if groups > 4 {
            return Err(CodecError::Malformed(format!(
                "reference table announces {groups} groups"
            )));
        }

        let mut strings = Vec::new();
        let mut big_integers = Vec::new();
        let mut big_decimals = Vec::new();
        let mut dates = Vec::new();
        for _ in 0..groups {
            let group_tag = self.inner.read_u8()?;
            let size = self.inner.read_length()?;
            match group_tag {
                tag::STRING => {
                    for _ in 0..size {
                        strings.push(self.inner.read_string_payload()?);
                    }
                }
                tag::BIG_INTEGER => {
                    for _ in 0..size {
                        big_integers.push(self.inner.read_big_integer_payload()?);
                    }
                }
                tag::BIG_DECIMAL => {
                    for _ in 0..size {
                        big_decimals.push(self.inner.read_big_decimal_payload()?);
                    }
                }
                tag::DATE => {
                    for _ in 0..size {
                        dates.push(self.inner.read_date_payload()?);
                    }
                }
                other => {
                    return Err(CodecError::Malformed(format!(
                        "unknown reference group tag 0x{other:02X}"
                    )));
                }
            }
        }

        let table = ReferenceTable::from_groups(strings, big_integers, big_decimals, dates);
        tracing::trace!(
            entries = table.len(),
            groups,
            width = table.byte_width(),
            "read reference table"
        );
        self.inner.set_table(table);
        self.inner
            .table()
            .ok_or_else(|| CodecError::Malformed("reference table not bound".into()))
    }

    /// Reads the root tag after the table and reports whether it is
    /// `expected_tag`.
    pub fn check_root(&mut self, expected_tag: u8) -> Result<bool> {
        Ok(self.inner.read_u8()? == expected_tag)
    }

    /// Reads one tag-prefixed value, resolving references against the table.
    pub fn read_value(&mut self, shape: Shape) -> Result<Option<Value>> {
        if self.inner.table().is_none() {
            return Err(CodecError::Malformed(
                "compact value read before its reference table".into(),
            ));
        }
        self.inner.read_value(shape)
    }

    /// Reads an array body (after the tag).
    pub fn read_array(&mut self, shape: Shape) -> Result<Value> {
        self.inner.read_array(shape)
    }

    /// Reads an object body (after the tag).
    pub fn read_object(&mut self, shape: Shape) -> Result<Value> {
        self.inner.read_object(shape)
    }
}
