//! Wire tag bytes, document magics and fixed widths.

// Null / reference
pub const NULL: u8 = 0x01;
/// Reference into the compact table. Also opens the table header.
pub const REF: u8 = 0x02;

// Boolean
pub const TRUE: u8 = 0x03;
pub const FALSE: u8 = 0x04;

// Integers: base + payload byte count (1..=8).
// Positive: 0x05..=0x0C, negative: 0x15..=0x1C. Payload is the magnitude.
pub const POS_INT_BASE: u8 = 0x04;
pub const NEG_INT_BASE: u8 = 0x14;

// IEEE 754, big-endian
pub const FLOAT: u8 = 0x0D;
pub const DOUBLE: u8 = 0x0E;
pub const FLOAT_ZERO: u8 = 0x1D;
pub const DOUBLE_ZERO: u8 = 0x1E;

// Length-prefixed
pub const STRING: u8 = 0x0F;
pub const ARRAY: u8 = 0x10;
pub const OBJECT: u8 = 0x11;
pub const BIG_INTEGER: u8 = 0x20;
pub const BIG_DECIMAL: u8 = 0x21;
pub const BINARY: u8 = 0x55;

// Fixed 8-byte payload
pub const DATE: u8 = 0x22;

/// Length byte announcing a 4-byte big-endian length.
pub const LENGTH_EXTENDED: u8 = 0xFF;

/// Largest length the format can carry.
pub const MAX_LENGTH: usize = i32::MAX as usize;

/// Widest integer payload.
pub const MAX_INT_BYTES: usize = 8;

/// Widest payload still decoded as a declared 32-bit int.
pub const MAX_INT32_BYTES: usize = 4;

/// Zero bytes prepended to a long whose natural payload is shorter than
/// five bytes, keeping the 1-4 byte tags for 32-bit ints.
pub const LONG_PADDING: usize = 4;

pub const DATE_WIDTH: usize = 8;

/// Optional 3-byte marker in front of the root tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magic {
    /// `BiJ`, the usual binary document marker.
    BiJ,
    /// `FMB`, the alternate marker.
    Fmb,
}

impl Magic {
    pub const fn bytes(self) -> [u8; 3] {
        match self {
            Self::BiJ => *b"BiJ",
            Self::Fmb => *b"FMB",
        }
    }

    /// Recognizes a magic from the first three bytes of a prefix.
    pub fn from_prefix(prefix: &[u8]) -> Option<Self> {
        match prefix.get(..3)? {
            b"BiJ" => Some(Self::BiJ),
            b"FMB" => Some(Self::Fmb),
            _ => None,
        }
    }
}

/// Sign and payload width carried by an integer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntTag {
    pub negative: bool,
    pub bytes: usize,
}

/// Builds the integer tag for a payload of `bytes` bytes.
pub const fn int_tag(negative: bool, bytes: usize) -> u8 {
    debug_assert!(bytes >= 1 && bytes <= MAX_INT_BYTES);
    let base = if negative { NEG_INT_BASE } else { POS_INT_BASE };
    base + bytes as u8
}

/// Splits an integer tag into sign and width, or `None` for any other tag.
pub fn int_tag_info(tag: u8) -> Option<IntTag> {
    match tag {
        0x05..=0x0C => Some(IntTag {
            negative: false,
            bytes: usize::from(tag - POS_INT_BASE),
        }),
        0x15..=0x1C => Some(IntTag {
            negative: true,
            bytes: usize::from(tag - NEG_INT_BASE),
        }),
        _ => None,
    }
}

/// Whether `tag` opens a document root (object or array).
pub fn is_container(tag: u8) -> bool {
    tag == OBJECT || tag == ARRAY
}
