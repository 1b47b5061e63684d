//! Metrics module - benchmark metric catalog

mod catalog;

pub use catalog::MetricCatalog;
