//! Reference table: deduplicated strings, big numbers and dates.
//!
//! Pass one of compact encoding walks the whole document and collects every
//! distinct table-eligible scalar into four groups. Each group is sorted, and
//! a value's index is its position in its group plus the sizes of the groups
//! before it (strings, big integers, big decimals, dates).

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use num_bigint::BigInt;

use crate::types::{BigDecimal, Value};

/// Borrowed view of a value that can live in the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar<'a> {
    Str(&'a str),
    BigInt(&'a BigInt),
    BigDecimal(&'a BigDecimal),
    /// Milliseconds since the Unix epoch.
    Date(i64),
}

impl<'a> Scalar<'a> {
    /// Returns the table view of `value`, if its kind is table-eligible.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Str(s)),
            Value::BigInt(b) => Some(Self::BigInt(b)),
            Value::BigDecimal(d) => Some(Self::BigDecimal(d)),
            Value::Date(ms) => Some(Self::Date(*ms)),
            _ => None,
        }
    }

    pub fn to_value(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.to_owned()),
            Self::BigInt(b) => Value::BigInt(b.clone()),
            Self::BigDecimal(d) => Value::BigDecimal(d.clone()),
            Self::Date(ms) => Value::Date(ms),
        }
    }
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::BigInt(b) => write!(f, "{b}n"),
            Self::BigDecimal(d) => write!(f, "{d}m"),
            Self::Date(ms) => write!(f, "date({ms})"),
        }
    }
}

/// Collects table entries from one or more documents.
#[derive(Debug, Default)]
pub struct TableBuilder {
    strings: BTreeSet<String>,
    big_integers: BTreeSet<BigInt>,
    big_decimals: BTreeSet<BigDecimal>,
    dates: BTreeSet<i64>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every string (object keys included), big integer, big decimal and
    /// date reachable from `value`.
    pub fn collect(&mut self, value: &Value) -> &mut Self {
        match value {
            Value::String(s) => self.add_string(s),
            Value::BigInt(b) => {
                if !self.big_integers.contains(b) {
                    self.big_integers.insert(b.clone());
                }
            }
            Value::BigDecimal(d) => {
                if !self.big_decimals.contains(d) {
                    self.big_decimals.insert(d.clone());
                }
            }
            Value::Date(ms) => {
                self.dates.insert(*ms);
            }
            Value::Array(items) => {
                for item in items {
                    self.collect(item);
                }
            }
            Value::Object(doc) => {
                for (key, member) in doc {
                    self.add_string(key);
                    self.collect(member);
                }
            }
            Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Long(_)
            | Value::Float(_)
            | Value::Double(_)
            | Value::Binary(_) => {}
        }
        self
    }

    fn add_string(&mut self, s: &str) {
        if !self.strings.contains(s) {
            self.strings.insert(s.to_owned());
        }
    }

    /// Freezes the collected groups into an indexable table.
    pub fn finish(self) -> ReferenceTable {
        let table = ReferenceTable::from_groups(
            self.strings.into_iter().collect(),
            self.big_integers.into_iter().collect(),
            self.big_decimals.into_iter().collect(),
            self.dates.into_iter().collect(),
        );
        tracing::trace!(
            strings = table.strings.len(),
            big_integers = table.big_integers.len(),
            big_decimals = table.big_decimals.len(),
            dates = table.dates.len(),
            width = table.byte_width(),
            "built reference table"
        );
        table
    }
}

/// Global indices of every entry, built on first lookup.
#[derive(Debug, Default)]
struct HashIndex {
    strings: HashMap<String, u32>,
    big_integers: HashMap<BigInt, u32>,
    big_decimals: HashMap<BigDecimal, u32>,
    dates: HashMap<i64, u32>,
}

fn index_group<T: Clone + Eq + std::hash::Hash>(group: &[T], base: usize) -> HashMap<T, u32> {
    group
        .iter()
        .enumerate()
        .map(|(pos, v)| (v.clone(), (base + pos) as u32))
        .collect()
}

/// Immutable, indexable set of the scalars shared by one document.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    strings: Vec<String>,
    big_integers: Vec<BigInt>,
    big_decimals: Vec<BigDecimal>,
    dates: Vec<i64>,
    index: OnceCell<HashIndex>,
}

impl ReferenceTable {
    /// Runs pass one over `value`.
    pub fn build(value: &Value) -> Self {
        let mut builder = TableBuilder::new();
        builder.collect(value);
        builder.finish()
    }

    /// Assembles a table from groups in wire order.
    pub(crate) fn from_groups(
        strings: Vec<String>,
        big_integers: Vec<BigInt>,
        big_decimals: Vec<BigDecimal>,
        dates: Vec<i64>,
    ) -> Self {
        Self {
            strings,
            big_integers,
            big_decimals,
            dates,
            index: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len() + self.big_integers.len() + self.big_decimals.len() + self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn big_integers(&self) -> &[BigInt] {
        &self.big_integers
    }

    pub fn big_decimals(&self) -> &[BigDecimal] {
        &self.big_decimals
    }

    pub fn dates(&self) -> &[i64] {
        &self.dates
    }

    /// Number of groups holding at least one entry.
    pub fn non_empty_groups(&self) -> usize {
        [
            self.strings.len(),
            self.big_integers.len(),
            self.big_decimals.len(),
            self.dates.len(),
        ]
        .iter()
        .filter(|&&n| n > 0)
        .count()
    }

    /// Width in bytes of every index in a document using this table.
    pub fn byte_width(&self) -> usize {
        match self.len() {
            0..=0xFF => 1,
            0x100..=0xFFFF => 2,
            0x1_0000..=0xFF_FFFF => 3,
            _ => 4,
        }
    }

    /// Resolves a global index.
    pub fn get(&self, index: u32) -> Option<Scalar<'_>> {
        let mut i = index as usize;
        if i < self.strings.len() {
            return Some(Scalar::Str(&self.strings[i]));
        }
        i -= self.strings.len();
        if i < self.big_integers.len() {
            return Some(Scalar::BigInt(&self.big_integers[i]));
        }
        i -= self.big_integers.len();
        if i < self.big_decimals.len() {
            return Some(Scalar::BigDecimal(&self.big_decimals[i]));
        }
        i -= self.big_decimals.len();
        self.dates.get(i).map(|&ms| Scalar::Date(ms))
    }

    /// Global index of `scalar`, if present.
    ///
    /// Looks in the hash index first. A miss is confirmed with a binary search
    /// of the sorted group before reporting absence.
    pub fn index_of(&self, scalar: Scalar<'_>) -> Option<u32> {
        let hashed = self.index.get_or_init(|| self.hash_index());
        let hit = match scalar {
            Scalar::Str(s) => hashed.strings.get(s),
            Scalar::BigInt(b) => hashed.big_integers.get(b),
            Scalar::BigDecimal(d) => hashed.big_decimals.get(d),
            Scalar::Date(ms) => hashed.dates.get(&ms),
        };
        if let Some(&index) = hit {
            return Some(index);
        }
        let found = self.search(scalar);
        if let Some(index) = found {
            tracing::debug!(%scalar, index, "hash index miss resolved by ordered search");
        }
        found
    }

    fn search(&self, scalar: Scalar<'_>) -> Option<u32> {
        let (bi_base, bd_base, date_base) = self.group_bases();
        match scalar {
            Scalar::Str(s) => search_group(&self.strings, 0, |p| p.as_str().cmp(s)),
            Scalar::BigInt(b) => search_group(&self.big_integers, bi_base, |p| p.cmp(b)),
            Scalar::BigDecimal(d) => search_group(&self.big_decimals, bd_base, |p| p.cmp(d)),
            Scalar::Date(ms) => search_group(&self.dates, date_base, |p| p.cmp(&ms)),
        }
    }

    /// Starting indices of the big integer, big decimal and date groups.
    fn group_bases(&self) -> (usize, usize, usize) {
        let bi_base = self.strings.len();
        let bd_base = bi_base + self.big_integers.len();
        let date_base = bd_base + self.big_decimals.len();
        (bi_base, bd_base, date_base)
    }

    fn hash_index(&self) -> HashIndex {
        let (bi_base, bd_base, date_base) = self.group_bases();
        HashIndex {
            strings: index_group(&self.strings, 0),
            big_integers: index_group(&self.big_integers, bi_base),
            big_decimals: index_group(&self.big_decimals, bd_base),
            dates: index_group(&self.dates, date_base),
        }
    }
}

fn search_group<T>(group: &[T], base: usize, f: impl FnMut(&T) -> Ordering) -> Option<u32> {
    group
        .binary_search_by(f)
        .ok()
        .map(|pos| (base + pos) as u32)
}
