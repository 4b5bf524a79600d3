//! bijson: binary encodings for JSON-like documents.
//!
//! Documents are [`Value`] trees: JSON's value space plus distinct 32/64-bit
//! integers, big integers, big decimals, dates and binary blobs. They can be
//! stored in a plain tag-prefixed binary form or in a compact form that
//! replaces repeated strings, big numbers and dates with indices into a
//! reference table. Either form may be wrapped in gzip and/or base64.
//!
//! # Architecture
//!
//! - **`wire`**: Tags, variable-width integers, plain stream writer/reader
//! - **`compact`**: Reference table and the compact writer/reader
//! - **`detect`**: Envelope and payload detection, unwrapping and sealing
//! - **`codec`**: Document-level codecs and detected decoding
//! - **`types`**: The `Value` model
//!
//! ```ignore
//! use bijson::{CompactCodec, DocumentDecoder, DocumentEncoder, RootKind};
//!
//! let codec = CompactCodec::new();
//! let bytes = codec.encode_to_vec(&doc)?;
//! let back = codec.decode_slice(&bytes, RootKind::Object)?;
//! ```

pub mod codec;
pub mod compact;
pub mod detect;
pub mod error;
pub mod types;
pub mod wire;

pub use codec::{
    BinaryCodec, CompactCodec, DocumentDecoder, DocumentEncoder, RootKind, UniversalCodec,
    decode_detected,
};
pub use detect::{Envelope, StoreType, detect};
pub use error::{CodecError, Result};
pub use types::{BigDecimal, Document, Shape, Value};
pub use wire::{DecodePolicy, Magic};
