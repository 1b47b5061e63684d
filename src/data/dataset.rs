//! Dataset Module
//! Typed, deduplicated in-memory snapshot of the two source tables.

use serde::Serialize;
use std::collections::BTreeMap;

/// Street address of a hospital; any part may be missing in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
}

/// One row of the hospital directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalRecord {
    pub hospital_id: String,
    pub name: String,
    /// Two-letter state code, upper-cased
    pub state: String,
    pub address: Address,
}

impl HospitalRecord {
    /// "Name (City, ST)" for selectors where names repeat across states.
    pub fn display_label(&self) -> String {
        match &self.address.city {
            Some(city) => format!("{} ({}, {})", self.name, city, self.state),
            None => format!("{} ({})", self.name, self.state),
        }
    }
}

/// One metric of one hospital. `None` means the source had no usable number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub hospital_id: String,
    pub metric_key: String,
    pub value: Option<f64>,
    pub state_average: Option<f64>,
    pub national_average: Option<f64>,
    /// State column of the survey table, if it has one
    pub state: Option<String>,
}

/// Both tables, keyed for lookup.
///
/// Ordered maps keep iteration (and therefore averaging) deterministic.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    hospitals: BTreeMap<String, HospitalRecord>,
    /// metric_key -> hospital_id -> record
    metrics: BTreeMap<String, BTreeMap<String, MetricRecord>>,
}

impl Dataset {
    /// Build from raw records. Later duplicates replace earlier ones.
    pub fn from_records<H, M>(hospitals: H, metrics: M) -> Self
    where
        H: IntoIterator<Item = HospitalRecord>,
        M: IntoIterator<Item = MetricRecord>,
    {
        let mut dataset = Self::default();
        for hospital in hospitals {
            dataset
                .hospitals
                .insert(hospital.hospital_id.clone(), hospital);
        }
        for record in metrics {
            dataset
                .metrics
                .entry(record.metric_key.clone())
                .or_default()
                .insert(record.hospital_id.clone(), record);
        }
        dataset
    }

    pub fn hospital(&self, hospital_id: &str) -> Option<&HospitalRecord> {
        self.hospitals.get(hospital_id)
    }

    /// Hospitals in id order.
    pub fn hospitals(&self) -> impl Iterator<Item = &HospitalRecord> {
        self.hospitals.values()
    }

    pub fn hospital_count(&self) -> usize {
        self.hospitals.len()
    }

    /// Total number of metric records across all keys.
    pub fn metric_count(&self) -> usize {
        self.metrics.values().map(BTreeMap::len).sum()
    }

    pub fn metric(&self, hospital_id: &str, metric_key: &str) -> Option<&MetricRecord> {
        self.metrics.get(metric_key)?.get(hospital_id)
    }

    /// Every hospital's record for one metric.
    pub fn records_for<'a>(&'a self, metric_key: &str) -> impl Iterator<Item = &'a MetricRecord> + 'a {
        self.metrics
            .get(metric_key)
            .into_iter()
            .flat_map(|by_hospital| by_hospital.values())
    }

    /// State a metric record belongs to: the directory's state, falling back
    /// to the survey table's own state column.
    pub fn state_of<'a>(&'a self, record: &'a MetricRecord) -> Option<&'a str> {
        self.hospitals
            .get(&record.hospital_id)
            .map(|hospital| hospital.state.as_str())
            .or(record.state.as_deref())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn hospital(id: &str, name: &str, state: &str) -> HospitalRecord {
        HospitalRecord {
            hospital_id: id.to_string(),
            name: name.to_string(),
            state: state.to_string(),
            address: Address::default(),
        }
    }

    pub fn metric(hospital_id: &str, key: &str, value: Option<f64>) -> MetricRecord {
        MetricRecord {
            hospital_id: hospital_id.to_string(),
            metric_key: key.to_string(),
            value,
            state_average: None,
            national_average: None,
            state: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{hospital, metric};
    use super::*;

    #[test]
    fn test_duplicates_last_seen_wins() {
        let dataset = Dataset::from_records(
            vec![
                hospital("010001", "Old Name", "AL"),
                hospital("010001", "New Name", "AL"),
            ],
            vec![
                metric("010001", "H_RECMND_DY", Some(70.0)),
                metric("010001", "H_RECMND_DY", Some(72.0)),
            ],
        );

        assert_eq!(dataset.hospital_count(), 1);
        assert_eq!(dataset.hospital("010001").unwrap().name, "New Name");
        assert_eq!(dataset.metric_count(), 1);
        assert_eq!(
            dataset.metric("010001", "H_RECMND_DY").unwrap().value,
            Some(72.0)
        );
    }

    #[test]
    fn test_state_of_prefers_directory() {
        let mut orphan = metric("999999", "H_RECMND_DY", Some(50.0));
        orphan.state = Some("NV".to_string());
        let mut listed = metric("010001", "H_RECMND_DY", Some(60.0));
        listed.state = Some("XX".to_string());

        let dataset = Dataset::from_records(
            vec![hospital("010001", "Listed", "AL")],
            vec![orphan.clone(), listed.clone()],
        );

        assert_eq!(dataset.state_of(&listed), Some("AL"));
        assert_eq!(dataset.state_of(&orphan), Some("NV"));
    }

    #[test]
    fn test_display_label_includes_city() {
        let mut record = hospital("1", "General Hospital", "TX");
        assert_eq!(record.display_label(), "General Hospital (TX)");
        record.address.city = Some("Austin".to_string());
        assert_eq!(record.display_label(), "General Hospital (Austin, TX)");
    }
}
