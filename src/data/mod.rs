//! Data module - dataset loading, cleaning and caching

mod cache;
mod dataset;
mod loader;
mod processor;

pub use cache::DatasetCache;
pub use dataset::{Dataset, HospitalRecord, MetricRecord};
pub use loader::{DataLoader, LoaderError};
pub use processor::TableKind;

#[cfg(test)]
pub(crate) use dataset::fixtures;
