//! Comparator Module
//! Hospital vs. state vs. national benchmark for each requested metric.

use crate::data::{Dataset, HospitalRecord, MetricRecord};
use crate::metrics::MetricCatalog;
use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("Hospital '{0}' is not in the loaded dataset")]
    HospitalNotFound(String),
    #[error("Metric '{0}' is not a benchmark metric")]
    UnknownMetric(String),
}

/// One metric's three-way comparison. `None` is "N/A".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub metric_key: String,
    pub metric_label: String,
    pub hospital_value: Option<f64>,
    pub state_value: Option<f64>,
    pub national_value: Option<f64>,
    pub delta_vs_state: Option<f64>,
    pub delta_vs_national: Option<f64>,
}

/// Which benchmark a lookup is for.
#[derive(Debug, Clone, Copy)]
enum Scope {
    State,
    National,
}

impl Scope {
    fn reported(self, record: &MetricRecord) -> Option<f64> {
        match self {
            Scope::State => record.state_average,
            Scope::National => record.national_average,
        }
    }
}

/// Pure comparison over a loaded dataset.
pub struct Comparator<'a> {
    dataset: &'a Dataset,
    catalog: &'a MetricCatalog,
}

impl<'a> Comparator<'a> {
    pub fn new(dataset: &'a Dataset, catalog: &'a MetricCatalog) -> Self {
        Self { dataset, catalog }
    }

    /// One row per requested key, in the order given.
    pub fn compare<S: AsRef<str>>(
        &self,
        hospital_id: &str,
        metric_keys: &[S],
    ) -> Result<Vec<ComparisonRow>, CompareError> {
        let hospital = self
            .dataset
            .hospital(hospital_id)
            .ok_or_else(|| CompareError::HospitalNotFound(hospital_id.to_string()))?;

        metric_keys
            .iter()
            .map(|key| self.compare_metric(hospital, key.as_ref()))
            .collect()
    }

    fn compare_metric(
        &self,
        hospital: &HospitalRecord,
        metric_key: &str,
    ) -> Result<ComparisonRow, CompareError> {
        let entry = self
            .catalog
            .get(metric_key)
            .ok_or_else(|| CompareError::UnknownMetric(metric_key.to_string()))?;

        let own = self.dataset.metric(&hospital.hospital_id, metric_key);
        let hospital_value = own.and_then(|record| record.value);
        let state_value = self.benchmark(hospital, own, metric_key, Scope::State);
        let national_value = self.benchmark(hospital, own, metric_key, Scope::National);

        Ok(ComparisonRow {
            metric_key: entry.key.to_string(),
            metric_label: entry.label.to_string(),
            hospital_value,
            state_value,
            national_value,
            delta_vs_state: delta(hospital_value, state_value),
            delta_vs_national: delta(hospital_value, national_value),
        })
    }

    /// Reported average from the hospital's own row, then from any row in
    /// scope, then the mean of the values in scope.
    fn benchmark(
        &self,
        hospital: &HospitalRecord,
        own: Option<&MetricRecord>,
        metric_key: &str,
        scope: Scope,
    ) -> Option<f64> {
        if let Some(reported) = own.and_then(|record| scope.reported(record)) {
            return Some(reported);
        }

        let in_scope: Vec<&MetricRecord> = self
            .dataset
            .records_for(metric_key)
            .filter(|record| match scope {
                Scope::State => self.dataset.state_of(record) == Some(hospital.state.as_str()),
                Scope::National => true,
            })
            .collect();

        if let Some(reported) = in_scope.iter().find_map(|record| scope.reported(record)) {
            return Some(reported);
        }

        peer_mean(&hospital.hospital_id, &in_scope)
    }
}

/// Mean of the present values; `None` unless some hospital other than the
/// target contributes.
fn peer_mean(target_id: &str, records: &[&MetricRecord]) -> Option<f64> {
    let mut has_peer = false;
    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| {
            let value = record.value?;
            has_peer |= record.hospital_id != target_id;
            Some(value)
        })
        .collect();

    if !has_peer {
        return None;
    }
    Some(values.mean())
}

fn delta(value: Option<f64>, benchmark: Option<f64>) -> Option<f64> {
    Some(value? - benchmark?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{hospital, metric};

    const CLEAN: &str = "H_CLEAN_HSP_A_P";
    const NURSE: &str = "H_COMP_1_A_P";
    const RECOMMEND: &str = "H_RECMND_DY";

    fn with_reported(mut record: MetricRecord, state: f64, national: f64) -> MetricRecord {
        record.state_average = Some(state);
        record.national_average = Some(national);
        record
    }

    /// Three TX hospitals, one in OK, one alone in AK. No reported averages.
    fn computed_dataset() -> Dataset {
        Dataset::from_records(
            vec![
                hospital("T1", "General Hospital", "TX"),
                hospital("T2", "Lakeside Medical", "TX"),
                hospital("T3", "Hill Country", "TX"),
                hospital("O1", "Prairie Regional", "OK"),
                hospital("A1", "Lonely Pines", "AK"),
            ],
            vec![
                metric("T1", CLEAN, Some(85.0)),
                metric("T2", CLEAN, Some(75.0)),
                metric("T3", CLEAN, None),
                metric("O1", CLEAN, Some(65.0)),
                metric("A1", CLEAN, Some(90.0)),
                metric("T2", NURSE, Some(80.0)),
                metric("A1", RECOMMEND, Some(70.0)),
            ],
        )
    }

    #[test]
    fn test_reported_benchmarks_scenario() {
        let dataset = Dataset::from_records(
            vec![hospital("450001", "General Hospital", "TX")],
            vec![with_reported(metric("450001", CLEAN, Some(85.0)), 80.0, 78.0)],
        );
        let catalog = MetricCatalog::hcahps();
        let rows = Comparator::new(&dataset, &catalog)
            .compare("450001", &[CLEAN])
            .unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.metric_label, "Care Cleanliness");
        assert_eq!(row.hospital_value, Some(85.0));
        assert_eq!(row.state_value, Some(80.0));
        assert_eq!(row.national_value, Some(78.0));
        assert!((row.delta_vs_state.unwrap() - 5.0).abs() < 1e-6);
        assert!((row.delta_vs_national.unwrap() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_computed_averages_skip_missing_values() {
        let dataset = computed_dataset();
        let catalog = MetricCatalog::hcahps();
        let rows = Comparator::new(&dataset, &catalog)
            .compare("T1", &[CLEAN])
            .unwrap();

        let row = &rows[0];
        // TX: 85 and 75, T3 has no value
        assert!((row.state_value.unwrap() - 80.0).abs() < 1e-6);
        // all: 85, 75, 65, 90
        assert!((row.national_value.unwrap() - 78.75).abs() < 1e-6);
        let expected = row.hospital_value.unwrap() - row.state_value.unwrap();
        assert!((row.delta_vs_state.unwrap() - expected).abs() < 1e-6);
        assert!((row.delta_vs_national.unwrap() - 6.25).abs() < 1e-6);
    }

    #[test]
    fn test_missing_record_is_not_available() {
        let dataset = computed_dataset();
        let catalog = MetricCatalog::hcahps();
        let rows = Comparator::new(&dataset, &catalog)
            .compare("T1", &[NURSE])
            .unwrap();

        let row = &rows[0];
        assert_eq!(row.metric_label, "Nurse Communication");
        assert_eq!(row.hospital_value, None);
        assert_eq!(row.delta_vs_state, None);
        assert_eq!(row.delta_vs_national, None);
        // benchmarks still come from the peers that reported
        assert_eq!(row.state_value, Some(80.0));
    }

    #[test]
    fn test_hospital_alone_in_state_has_no_state_value() {
        let dataset = computed_dataset();
        let catalog = MetricCatalog::hcahps();
        let comparator = Comparator::new(&dataset, &catalog);

        let rows = comparator.compare("A1", &[CLEAN]).unwrap();
        let row = &rows[0];
        assert_eq!(row.hospital_value, Some(90.0));
        assert_eq!(row.state_value, None);
        assert_eq!(row.delta_vs_state, None);
        assert!(row.national_value.is_some());

        // nobody else reported this metric at all
        let rows = comparator.compare("A1", &[RECOMMEND]).unwrap();
        let row = &rows[0];
        assert_eq!(row.national_value, None);
        assert_eq!(row.delta_vs_national, None);
    }

    #[test]
    fn test_peer_reported_state_average_is_used() {
        let dataset = Dataset::from_records(
            vec![hospital("1", "General Hospital", "TX"), hospital("2", "Other", "TX")],
            vec![
                metric("1", CLEAN, Some(85.0)),
                with_reported(metric("2", CLEAN, Some(60.0)), 81.0, 79.0),
            ],
        );
        let catalog = MetricCatalog::hcahps();
        let rows = Comparator::new(&dataset, &catalog)
            .compare("1", &[CLEAN])
            .unwrap();
        let row = &rows[0];
        assert_eq!(row.state_value, Some(81.0));
        assert_eq!(row.national_value, Some(79.0));
    }

    #[test]
    fn test_rows_follow_request_order() {
        let dataset = computed_dataset();
        let catalog = MetricCatalog::hcahps();
        let keys = [RECOMMEND, CLEAN, NURSE];
        let rows = Comparator::new(&dataset, &catalog)
            .compare("T2", &keys)
            .unwrap();

        let got: Vec<&str> = rows.iter().map(|r| r.metric_key.as_str()).collect();
        assert_eq!(got, keys);
    }

    #[test]
    fn test_every_catalog_subset_yields_one_row_per_key() {
        let dataset = computed_dataset();
        let catalog = MetricCatalog::hcahps();
        let comparator = Comparator::new(&dataset, &catalog);
        let all = catalog.keys();

        for hospital in dataset.hospitals() {
            for len in 1..=all.len() {
                let subset = &all[..len];
                let rows = comparator.compare(&hospital.hospital_id, subset).unwrap();
                assert_eq!(rows.len(), subset.len());
            }
        }
    }

    #[test]
    fn test_unknown_hospital() {
        let dataset = computed_dataset();
        let catalog = MetricCatalog::hcahps();
        let err = Comparator::new(&dataset, &catalog)
            .compare("NOPE", &[CLEAN])
            .unwrap_err();
        assert_eq!(err, CompareError::HospitalNotFound("NOPE".to_string()));
    }

    #[test]
    fn test_unknown_metric() {
        let dataset = computed_dataset();
        let catalog = MetricCatalog::hcahps();
        let err = Comparator::new(&dataset, &catalog)
            .compare("T1", &["H_STAR_RATING"])
            .unwrap_err();
        assert_eq!(err, CompareError::UnknownMetric("H_STAR_RATING".to_string()));
    }

    #[test]
    fn test_compare_is_idempotent() {
        let dataset = computed_dataset();
        let catalog = MetricCatalog::hcahps();
        let comparator = Comparator::new(&dataset, &catalog);
        let keys = catalog.keys();

        let first = comparator.compare("T1", &keys).unwrap();
        let second = comparator.compare("T1", &keys).unwrap();
        assert_eq!(first, second);
    }
}
