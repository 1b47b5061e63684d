//! CSV Data Loader Module
//! Fetches the hospital directory and HCAHPS tables and turns them into
//! typed records using Polars.

use crate::config::AppConfig;
use crate::data::dataset::{Address, Dataset, HospitalRecord, MetricRecord};
use crate::data::processor::{DataProcessor, TableKind};
use crate::metrics::MetricCatalog;
use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use thiserror::Error;

const USER_AGENT: &str = "hcahps-benchmark/0.1.0";

/// The dataset could not be obtained; fatal to session start.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("The {table} table is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        table: TableKind,
        columns: Vec<&'static str>,
    },
    #[error("The {0} table has no usable rows")]
    Empty(TableKind),
}

/// Where a table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    /// `http(s)://` locations are fetched, anything else is a local path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }

    /// Raw bytes of the table.
    pub fn fetch(&self) -> Result<Vec<u8>, LoaderError> {
        match self {
            DataSource::Url(url) => {
                debug!("fetching {}", url);
                let resp = ureq::get(url)
                    .set("User-Agent", USER_AGENT)
                    .call()
                    .map_err(|source| LoaderError::Fetch {
                        url: url.clone(),
                        source: Box::new(source),
                    })?;
                let len = resp
                    .header("Content-Length")
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(0);
                let mut data: Vec<u8> = Vec::with_capacity(len);
                resp.into_reader()
                    .read_to_end(&mut data)
                    .map_err(|source| LoaderError::Download {
                        url: url.clone(),
                        source,
                    })?;
                debug!("fetched {} bytes from {}", data.len(), url);
                Ok(data)
            }
            DataSource::File(path) => fs::read(path).map_err(|source| LoaderError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

/// Canonical column name -> header as spelled in the file.
type ColumnMap = HashMap<&'static str, String>;

/// Loads both tables into a [`Dataset`].
pub struct DataLoader {
    hospital_source: DataSource,
    metric_source: DataSource,
    catalog: MetricCatalog,
}

impl DataLoader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            hospital_source: DataSource::parse(&config.hospital_source),
            metric_source: DataSource::parse(&config.metric_source),
            catalog: MetricCatalog::hcahps(),
        }
    }

    /// Fetch, parse and deduplicate both tables.
    pub fn load(&self) -> Result<Dataset, LoaderError> {
        let hospital_bytes = self.hospital_source.fetch()?;
        let metric_bytes = self.metric_source.fetch()?;

        let hospitals = Self::parse_hospitals(&hospital_bytes)?;
        let metrics = Self::parse_metrics(&metric_bytes, &self.catalog)?;
        let dataset = Dataset::from_records(hospitals, metrics);

        info!(
            "dataset ready: {} hospitals, {} metric records",
            dataset.hospital_count(),
            dataset.metric_count()
        );
        Ok(dataset)
    }

    /// Parse the hospital directory.
    pub fn parse_hospitals(bytes: &[u8]) -> Result<Vec<HospitalRecord>, LoaderError> {
        let df = Self::read_csv(bytes)?;
        let columns = Self::resolve_columns(&df, TableKind::Hospital)?;

        let ids = Self::text_column(&df, &columns, "hospital_id")?;
        let names = Self::text_column(&df, &columns, "name")?;
        let states = Self::text_column(&df, &columns, "state")?;
        let streets = Self::text_column(&df, &columns, "address")?;
        let cities = Self::text_column(&df, &columns, "city")?;
        let zips = Self::text_column(&df, &columns, "zip_code")?;

        let mut records = Vec::with_capacity(df.height());
        let mut skipped = 0usize;

        for i in 0..df.height() {
            let id = DataProcessor::clean_text(ids[i].as_deref());
            let name = DataProcessor::clean_text(names[i].as_deref());
            let state = DataProcessor::clean_state(states[i].as_deref());

            let (Some(hospital_id), Some(name), Some(state)) = (id, name, state) else {
                skipped += 1;
                continue;
            };

            records.push(HospitalRecord {
                hospital_id,
                name,
                state,
                address: Address {
                    street: DataProcessor::clean_text(streets[i].as_deref()),
                    city: DataProcessor::clean_text(cities[i].as_deref()),
                    zip_code: DataProcessor::clean_text(zips[i].as_deref()),
                },
            });
        }

        if skipped > 0 {
            warn!("skipped {} hospital rows without id, name or state", skipped);
        }
        if records.is_empty() {
            return Err(LoaderError::Empty(TableKind::Hospital));
        }
        info!("parsed {} hospital rows", records.len());
        Ok(records)
    }

    /// Parse the survey table, keeping only catalog metrics.
    pub fn parse_metrics(
        bytes: &[u8],
        catalog: &MetricCatalog,
    ) -> Result<Vec<MetricRecord>, LoaderError> {
        let df = Self::read_csv(bytes)?;
        let columns = Self::resolve_columns(&df, TableKind::Metric)?;

        let ids = Self::text_column(&df, &columns, "hospital_id")?;
        let keys = Self::text_column(&df, &columns, "metric_key")?;
        let values = Self::text_column(&df, &columns, "value")?;
        let state_avgs = Self::text_column(&df, &columns, "state_average")?;
        let national_avgs = Self::text_column(&df, &columns, "national_average")?;
        let states = Self::text_column(&df, &columns, "state")?;

        let mut records = Vec::new();
        let mut other_measures = 0usize;
        let mut missing_values = 0usize;

        for i in 0..df.height() {
            let (Some(hospital_id), Some(metric_key)) = (
                DataProcessor::clean_text(ids[i].as_deref()),
                DataProcessor::clean_text(keys[i].as_deref()),
            ) else {
                continue;
            };
            if !catalog.contains(&metric_key) {
                other_measures += 1;
                continue;
            }

            let value = DataProcessor::coerce_percent(values[i].as_deref());
            if value.is_none() {
                missing_values += 1;
            }

            records.push(MetricRecord {
                hospital_id,
                metric_key,
                value,
                state_average: DataProcessor::coerce_percent(state_avgs[i].as_deref()),
                national_average: DataProcessor::coerce_percent(national_avgs[i].as_deref()),
                state: DataProcessor::clean_state(states[i].as_deref()),
            });
        }

        debug!(
            "ignored {} rows for measures outside the catalog",
            other_measures
        );
        if missing_values > 0 {
            warn!("{} metric values were not numeric, kept as N/A", missing_values);
        }
        info!("parsed {} metric rows", records.len());
        Ok(records)
    }

    /// Read a CSV with every column as text; typing happens per column later.
    fn read_csv(bytes: &[u8]) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;
        Ok(df)
    }

    /// Match the file's headers to canonical names, failing on absent
    /// required columns. First matching header wins.
    fn resolve_columns(df: &DataFrame, table: TableKind) -> Result<ColumnMap, LoaderError> {
        let mut columns = ColumnMap::new();
        for header in df.get_column_names() {
            let header = header.to_string();
            let normalized = DataProcessor::normalize_column_name(&header);
            if let Some(canonical) = table.canonical_column(&normalized) {
                columns.entry(canonical).or_insert(header);
            }
        }

        let missing: Vec<&'static str> = table
            .required_columns()
            .iter()
            .copied()
            .filter(|c| !columns.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(LoaderError::MissingColumns {
                table,
                columns: missing,
            });
        }
        Ok(columns)
    }

    /// Column cells as owned text; an absent optional column is all `None`.
    fn text_column(
        df: &DataFrame,
        columns: &ColumnMap,
        canonical: &str,
    ) -> Result<Vec<Option<String>>, LoaderError> {
        let Some(header) = columns.get(canonical) else {
            return Ok(vec![None; df.height()]);
        };

        let series = df
            .column(header.as_str())?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let values = series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }
}
