//! Document model: values, decimals and decode shapes.

mod value;

pub use value::{BigDecimal, Document, Shape, Value};
