//! Document-level entry points.
//!
//! Codecs are small `Copy` configuration values. Each call builds its own
//! reader or writer, so one codec can be shared freely between call sites.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::compact::{CompactReader, CompactWriter, ReferenceTable};
use crate::detect::{self, ReopenableSource, StoreType};
use crate::error::{CodecError, Result};
use crate::types::{Shape, Value};
use crate::wire::decode::DEFAULT_MAX_DEPTH;
use crate::wire::tag::{self, Magic};
use crate::wire::{DecodePolicy, StreamReader, StreamWriter};

/// Container kind expected at the root of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootKind {
    #[default]
    Object,
    Array,
}

impl RootKind {
    pub fn tag(self) -> u8 {
        match self {
            Self::Object => tag::OBJECT,
            Self::Array => tag::ARRAY,
        }
    }
}

/// Encodes a root document.
pub trait DocumentEncoder {
    /// Writes `value` to `output` and hands the sink back.
    ///
    /// The root must be an object or an array.
    fn encode<W: Write>(&self, value: &Value, output: W) -> Result<W>;

    fn encode_to_vec(&self, value: &Value) -> Result<Vec<u8>> {
        self.encode(value, Vec::new())
    }

    fn encode_to_bytes(&self, value: &Value) -> Result<Bytes> {
        let writer = self.encode(value, BytesMut::new().writer())?;
        Ok(writer.into_inner().freeze())
    }
}

/// Decodes a root document.
pub trait DocumentDecoder {
    /// Reads one document whose root is `root`.
    ///
    /// Returns `Ok(None)` when the stream does not open with the expected
    /// framing.
    fn decode<R: Read>(&self, input: R, root: RootKind) -> Result<Option<Value>>;

    fn decode_slice(&self, bytes: &[u8], root: RootKind) -> Result<Option<Value>> {
        self.decode(bytes, root)
    }

    fn decode_buf<B: Buf>(&self, buf: B, root: RootKind) -> Result<Option<Value>> {
        self.decode(buf.reader(), root)
    }
}

fn ensure_container(value: &Value) -> Result<()> {
    match value {
        Value::Object(_) | Value::Array(_) => Ok(()),
        other => Err(CodecError::Unsupported(format!(
            "document root must be an object or array, got {}",
            other.type_name()
        ))),
    }
}

fn header_mismatch(root: RootKind) -> Result<Option<Value>> {
    tracing::debug!(?root, "stream does not open with the expected root");
    Ok(None)
}

/// Plain binary codec.
///
/// ```ignore
/// let codec = BinaryCodec::new().magic(Magic::BiJ).policy(DecodePolicy::Strict);
/// let bytes = codec.encode_to_vec(&doc)?;
/// let back = codec.decode_slice(&bytes, RootKind::Object)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCodec {
    magic: Option<Magic>,
    shape: Shape,
    policy: DecodePolicy,
    max_depth: usize,
}

impl Default for BinaryCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryCodec {
    pub fn new() -> Self {
        Self {
            magic: None,
            shape: Shape::default(),
            policy: DecodePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Writes `magic` before the root tag.
    pub fn magic(mut self, magic: Magic) -> Self {
        self.magic = Some(magic);
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl DocumentEncoder for BinaryCodec {
    fn encode<W: Write>(&self, value: &Value, output: W) -> Result<W> {
        ensure_container(value)?;
        let mut writer = StreamWriter::new(output);
        if let Some(magic) = self.magic {
            writer.write_magic(magic)?;
        }
        writer.write(value)?;
        writer.flush()?;
        Ok(writer.into_inner())
    }
}

impl DocumentDecoder for BinaryCodec {
    fn decode<R: Read>(&self, input: R, root: RootKind) -> Result<Option<Value>> {
        let mut reader = StreamReader::new(input)
            .with_policy(self.policy)
            .with_max_depth(self.max_depth);
        if !reader.check_header(root.tag())? {
            return header_mismatch(root);
        }
        read_plain_root(&mut reader, root, self.shape).map(Some)
    }
}

fn read_plain_root<R: Read>(
    reader: &mut StreamReader<R>,
    root: RootKind,
    shape: Shape,
) -> Result<Value> {
    match root {
        RootKind::Object => reader.read_object(shape),
        RootKind::Array => reader.read_array(shape),
    }
}

/// Reference-table codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactCodec {
    magic: Option<Magic>,
    shape: Shape,
    policy: DecodePolicy,
    max_depth: usize,
}

impl Default for CompactCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl CompactCodec {
    pub fn new() -> Self {
        Self {
            magic: None,
            shape: Shape::default(),
            policy: DecodePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Writes `magic` before the table header.
    pub fn magic(mut self, magic: Magic) -> Self {
        self.magic = Some(magic);
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl DocumentEncoder for CompactCodec {
    fn encode<W: Write>(&self, value: &Value, output: W) -> Result<W> {
        ensure_container(value)?;
        let mut writer = CompactWriter::new(output, ReferenceTable::build(value));
        if let Some(magic) = self.magic {
            writer.write_magic(magic)?;
        }
        writer.write_table()?;
        writer.write(value)?;
        writer.flush()?;
        Ok(writer.into_inner())
    }
}

impl DocumentDecoder for CompactCodec {
    fn decode<R: Read>(&self, input: R, root: RootKind) -> Result<Option<Value>> {
        let mut reader = CompactReader::new(input)
            .with_policy(self.policy)
            .with_max_depth(self.max_depth);
        if !reader.read_header()? {
            return header_mismatch(root);
        }
        read_compact_root(&mut reader, root, self.shape)
    }
}

fn read_compact_root<R: Read>(
    reader: &mut CompactReader<R>,
    root: RootKind,
    shape: Shape,
) -> Result<Option<Value>> {
    if !reader.check_root(root.tag())? {
        return header_mismatch(root);
    }
    let value = match root {
        RootKind::Object => reader.read_object(shape)?,
        RootKind::Array => reader.read_array(shape)?,
    };
    Ok(Some(value))
}

/// Decoder for either binary variant, chosen by the first tag after the
/// optional magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniversalCodec {
    shape: Shape,
    policy: DecodePolicy,
    max_depth: usize,
}

impl Default for UniversalCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl UniversalCodec {
    pub fn new() -> Self {
        Self {
            shape: Shape::default(),
            policy: DecodePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Detects the envelope of `source`, peels it off and decodes the
    /// payload.
    ///
    /// Returns `Ok(None)` when nothing recognizable is found. A JSON text
    /// payload is reported as [`CodecError::Unsupported`].
    pub fn decode_detected<S>(&self, source: &S, root: RootKind) -> Result<Option<Value>>
    where
        S: ReopenableSource + ?Sized,
    {
        let Some(envelope) = detect::detect(source)? else {
            return Ok(None);
        };
        if envelope.store_type == StoreType::Text {
            return Err(CodecError::Unsupported(format!(
                "text payload ({envelope}) needs a JSON text parser"
            )));
        }
        self.decode(envelope.open(source)?, root)
    }
}

impl DocumentDecoder for UniversalCodec {
    fn decode<R: Read>(&self, input: R, root: RootKind) -> Result<Option<Value>> {
        let mut reader = StreamReader::new(input)
            .with_policy(self.policy)
            .with_max_depth(self.max_depth);
        match reader.read_header()? {
            Some(tag::REF) => {
                let mut reader = CompactReader::from_stream(reader);
                reader.read_table()?;
                read_compact_root(&mut reader, root, self.shape)
            }
            Some(found) if found == root.tag() => {
                read_plain_root(&mut reader, root, self.shape).map(Some)
            }
            _ => header_mismatch(root),
        }
    }
}

/// Detects and decodes `source` with default settings.
pub fn decode_detected<S>(source: &S, root: RootKind) -> Result<Option<Value>>
where
    S: ReopenableSource + ?Sized,
{
    UniversalCodec::new().decode_detected(source, root)
}
