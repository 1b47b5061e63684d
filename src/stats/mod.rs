//! Stats module - benchmark comparison

mod comparator;

pub use comparator::{CompareError, Comparator, ComparisonRow};
