//! Reference-table ("compact") encoding.
//!
//! Encoding takes two passes. The first collects every distinct string, big
//! integer, big decimal and date into a [`ReferenceTable`]; the second writes
//! that table as a header and then the document, with each of those scalars
//! (and every object key) replaced by its fixed-width table index.

pub mod reader;
pub mod table;
pub mod writer;

pub use reader::CompactReader;
pub use table::{ReferenceTable, Scalar, TableBuilder};
pub use writer::CompactWriter;
