//! Compact encoding, pass two: table header plus reference-substituted body.

use std::io::Write;

use super::table::ReferenceTable;
use crate::error::Result;
use crate::types::Value;
use crate::wire::tag::{self, Magic};
use crate::wire::StreamWriter;

/// Writes a reference table followed by values that point into it.
///
/// The table must have been built from every value later passed to
/// [`CompactWriter::write`]; a scalar it does not contain fails the write with
/// [`crate::CodecError::MissingReference`].
#[derive(Debug)]
pub struct CompactWriter<W> {
    inner: StreamWriter<W>,
}

impl<W: Write> CompactWriter<W> {
    pub fn new(output: W, table: ReferenceTable) -> Self {
        Self {
            inner: StreamWriter::with_table(output, table),
        }
    }

    /// Swaps in a new sink and table for the next document and returns the
    /// previous sink.
    pub fn rebind(&mut self, output: W, table: ReferenceTable) -> W {
        self.inner.set_table(Some(table));
        self.inner.rebind(output)
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    pub fn write_magic(&mut self, magic: Magic) -> Result<()> {
        self.inner.write_magic(magic)
    }

    /// Writes the table header: `REF`, the number of non-empty groups, then
    /// each non-empty group as tag, size and untagged payloads.
    pub fn write_table(&mut self) -> Result<()> {
        // Lend the table out so its payloads can go through the same writer.
        let table = self.inner.set_table(None).unwrap_or_default();
        let result = write_groups(&mut self.inner, &table);
        self.inner.set_table(Some(table));
        result
    }

    /// Writes one value with table-eligible scalars replaced by references.
    pub fn write(&mut self, value: &Value) -> Result<()> {
        self.inner.write(value)
    }
}

fn write_groups<W: Write>(out: &mut StreamWriter<W>, table: &ReferenceTable) -> Result<()> {
    out.write_tag(tag::REF)?;
    out.write_u8(table.non_empty_groups() as u8)?;

    if !table.strings().is_empty() {
        out.write_tag(tag::STRING)?;
        out.write_length(table.strings().len())?;
        for s in table.strings() {
            out.write_string_payload(s)?;
        }
    }
    if !table.big_integers().is_empty() {
        out.write_tag(tag::BIG_INTEGER)?;
        out.write_length(table.big_integers().len())?;
        for b in table.big_integers() {
            out.write_big_integer_payload(b)?;
        }
    }
    if !table.big_decimals().is_empty() {
        out.write_tag(tag::BIG_DECIMAL)?;
        out.write_length(table.big_decimals().len())?;
        for d in table.big_decimals() {
            out.write_big_decimal_payload(d)?;
        }
    }
    if !table.dates().is_empty() {
        out.write_tag(tag::DATE)?;
        out.write_length(table.dates().len())?;
        for &ms in table.dates() {
            out.write_date_payload(ms)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::types::Document;

    fn encode(value: &Value) -> Vec<u8> {
        let mut writer = CompactWriter::new(Vec::new(), ReferenceTable::build(value));
        writer.write_table().expect("write table");
        writer.write(value).expect("write value");
        writer.into_inner()
    }

    #[test]
    fn keys_and_values_share_one_entry() {
        let doc = Document::from([
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::from("a")),
        ]);
        let bytes = encode(&Value::Object(doc));
        // One group of two strings.
        let header = [tag::REF, 0x01, tag::STRING, 0x02, 0x01, b'a', 0x01, b'b'];
        // Key "a" -> Int(1), key "b" -> reference to "a".
        let body = [tag::OBJECT, 0x02, 0x00, 0x05, 0x01, 0x01, tag::REF, 0x00];
        assert_eq!(&bytes[..header.len()], header);
        assert_eq!(&bytes[header.len()..], body);
    }

    #[test]
    fn empty_table_header() {
        let bytes = encode(&Value::Array(vec![Value::Int(7), Value::Null]));
        assert_eq!(bytes, [tag::REF, 0x00, tag::ARRAY, 0x02, 0x05, 0x07, tag::NULL]);
    }

    #[test]
    fn groups_follow_fixed_order() {
        let value = Value::Array(vec![
            Value::Date(1),
            Value::BigInt(7.into()),
            Value::from("s"),
        ]);
        let bytes = encode(&value);
        assert_eq!(&bytes[..2], [tag::REF, 0x03]);
        assert_eq!(&bytes[2..6], [tag::STRING, 0x01, 0x01, b's']);
        assert_eq!(&bytes[6..10], [tag::BIG_INTEGER, 0x01, 0x01, 0x07]);
        assert_eq!(&bytes[10..12], [tag::DATE, 0x01]);
        assert_eq!(&bytes[12..20], 1i64.to_be_bytes());
        // body: array of three references, dates last in the table
        assert_eq!(
            &bytes[20..],
            [tag::ARRAY, 0x03, tag::REF, 0x02, tag::REF, 0x01, tag::REF, 0x00]
        );
    }

    #[test]
    fn repeated_string_stored_once() {
        let value = Value::Array(vec![Value::from("repeat me"); 50]);
        let bytes = encode(&value);
        let needle: &[u8] = b"repeat me";
        let hits = bytes.windows(needle.len()).filter(|w| *w == needle).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn scalar_missing_from_table_is_an_error() {
        let mut writer = CompactWriter::new(Vec::new(), ReferenceTable::build(&Value::from("x")));
        writer.write_table().expect("write table");
        assert!(matches!(
            writer.write(&Value::from("y")),
            Err(CodecError::MissingReference(_))
        ));
    }

    #[test]
    fn two_byte_indices_past_255_entries() {
        let items: Vec<Value> = (0..300).map(|i| Value::from(format!("s{i:03}"))).collect();
        let value = Value::Array(items);
        let table = ReferenceTable::build(&value);
        assert_eq!(table.byte_width(), 2);

        let bytes = encode(&value);
        // body ends with the reference to the largest string, "s299"
        let tail = &bytes[bytes.len() - 3..];
        assert_eq!(tail[0], tag::REF);
        assert_eq!(u16::from_be_bytes([tail[1], tail[2]]), 299);
    }

    #[test]
    fn rebind_swaps_table() {
        let first = Value::from("one");
        let second = Value::from("two");
        let mut writer = CompactWriter::new(Vec::new(), ReferenceTable::build(&first));
        writer.write(&first).expect("write first");
        let previous = writer.rebind(Vec::new(), ReferenceTable::build(&second));
        writer.write(&second).expect("write second");
        assert_eq!(previous, [tag::REF, 0x00]);
        assert_eq!(writer.into_inner(), [tag::REF, 0x00]);
    }
}
