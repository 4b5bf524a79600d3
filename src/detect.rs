//! Envelope and store-type detection from the first bytes of a source.
//!
//! Encoded documents may be stored gzip-compressed, base64-encoded, or both
//! (gzip applied first). [`detect`] looks at four bytes through each candidate
//! view and reports which envelope and which payload kind it found.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::read::DecoderReader;
use bytes::Bytes;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::Result;
use crate::wire::tag::{self, Magic};

/// First bytes of every gzip member written with no optional header fields.
pub const GZIP_HEADER: [u8; 4] = [0x1F, 0x8B, 0x08, 0x00];

/// [`GZIP_HEADER`] as it starts a standard base64 encoding.
pub const BASE64_GZIP_HEADER: [u8; 4] = *b"H4sI";

const PREFIX_LEN: usize = 4;

/// Kind of payload inside the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreType {
    /// JSON text.
    Text,
    /// Plain binary encoding.
    Binary,
    /// Reference-table encoding.
    Compact,
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Compact => "compact",
        })
    }
}

/// Outer wrapping of a stored document and the payload kind inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Envelope {
    pub base64: bool,
    pub gzip: bool,
    pub store_type: StoreType,
}

impl Envelope {
    /// An unwrapped payload.
    pub fn plain(store_type: StoreType) -> Self {
        Self {
            base64: false,
            gzip: false,
            store_type,
        }
    }

    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    pub fn with_base64(mut self, base64: bool) -> Self {
        self.base64 = base64;
        self
    }

    /// Opens `source` with this envelope peeled off.
    pub fn open<'s, S>(&self, source: &'s S) -> Result<Box<dyn Read + 's>>
    where
        S: ReopenableSource + ?Sized,
    {
        Ok(unwrap_view(source.open()?, self.base64, self.gzip))
    }

    /// Wraps already-encoded bytes: gzip first, then base64.
    pub fn seal(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut bytes = payload.to_vec();
        if self.gzip {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&bytes)?;
            bytes = encoder.finish()?;
        }
        if self.base64 {
            bytes = BASE64_STANDARD.encode(&bytes).into_bytes();
        }
        Ok(bytes)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |b: bool| if b { "on" } else { "off" };
        write!(
            f,
            "base64: {}, gzip: {}, store type: {}",
            on_off(self.base64),
            on_off(self.gzip),
            self.store_type
        )
    }
}

/// A byte source that can be read from the start more than once.
pub trait ReopenableSource {
    /// Opens a fresh reader positioned at the first byte.
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

impl ReopenableSource for [u8] {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self))
    }
}

impl ReopenableSource for Vec<u8> {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        self.as_slice().open()
    }
}

impl ReopenableSource for Bytes {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        (**self).open()
    }
}

impl ReopenableSource for Path {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(BufReader::new(File::open(self)?)))
    }
}

impl ReopenableSource for PathBuf {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        self.as_path().open()
    }
}

impl<T: ReopenableSource + ?Sized> ReopenableSource for &T {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        (**self).open()
    }
}

fn unwrap_view<'a>(raw: Box<dyn Read + 'a>, base64: bool, gzip: bool) -> Box<dyn Read + 'a> {
    let decoded: Box<dyn Read + 'a> = if base64 {
        Box::new(DecoderReader::new(raw, &BASE64_STANDARD))
    } else {
        raw
    };
    if gzip {
        Box::new(GzDecoder::new(decoded))
    } else {
        decoded
    }
}

/// Identifies the envelope and payload kind of `source`.
///
/// Returns `Ok(None)` when the prefix matches no known payload, including
/// when a gzip or base64 view of the source fails to decode. Errors opening
/// or reading the raw source propagate.
pub fn detect<S>(source: &S) -> Result<Option<Envelope>>
where
    S: ReopenableSource + ?Sized,
{
    let raw = read_prefix(&mut source.open()?)?;

    let (base64, gzip) = if raw == GZIP_HEADER {
        (false, true)
    } else if raw == BASE64_GZIP_HEADER {
        (true, true)
    } else if raw.iter().all(|&b| is_base64_byte(b)) {
        (true, false)
    } else {
        (false, false)
    };

    let prefix = if base64 || gzip {
        let mut view = unwrap_view(source.open()?, base64, gzip);
        match read_prefix(&mut view) {
            Ok(prefix) => prefix,
            Err(e) if is_decode_failure(&e) => {
                tracing::debug!(base64, gzip, error = %e, "envelope view failed to decode");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        raw
    };

    let Some(store_type) = classify(prefix) else {
        tracing::debug!(?prefix, base64, gzip, "no known payload kind");
        return Ok(None);
    };
    let envelope = Envelope {
        base64,
        gzip,
        store_type,
    };
    tracing::debug!(%envelope, "detected envelope");
    Ok(Some(envelope))
}

/// Reads up to four bytes; a shorter source leaves the rest zeroed.
fn read_prefix(input: &mut dyn Read) -> io::Result<[u8; PREFIX_LEN]> {
    let mut buf = [0u8; PREFIX_LEN];
    let mut filled = 0;
    while filled < PREFIX_LEN {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(buf)
}

fn is_decode_failure(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof
    )
}

fn is_base64_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
}

fn classify(prefix: [u8; PREFIX_LEN]) -> Option<StoreType> {
    let root = match prefix {
        [b'{' | b'[', ..] => return Some(StoreType::Text),
        [.., root] if Magic::from_prefix(&prefix).is_some() => root,
        [root, ..] => root,
    };
    match root {
        tag::REF => Some(StoreType::Compact),
        root if tag::is_container(root) => Some(StoreType::Binary),
        _ => None,
    }
}
