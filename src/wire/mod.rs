//! Plain binary wire format.
//!
//! Every value starts with a one-byte tag. Integers carry their sign in the
//! tag, lengths use a one- or five-byte form, and all multi-byte quantities are
//! big-endian.

pub mod decode;
pub mod encode;
pub mod tag;
pub mod varint;

pub use decode::{DecodePolicy, StreamReader, decode_value};
pub use encode::{StreamWriter, encode_value};
pub use tag::Magic;
