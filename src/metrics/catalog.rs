//! Metric Catalog Module
//! The HCAHPS measures offered as benchmarks, in default display order.

use serde::Serialize;

/// One benchmark metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricEntry {
    /// HCAHPS measure id as it appears in the survey table
    pub key: &'static str,
    pub label: &'static str,
    /// What the percentage counts
    pub description: &'static str,
}

const HCAHPS_METRICS: &[MetricEntry] = &[
    MetricEntry {
        key: "H_COMP_1_A_P",
        label: "Nurse Communication",
        description: "% of patients who said nurses \"always\" communicated well.",
    },
    MetricEntry {
        key: "H_COMP_2_A_P",
        label: "Doctor Communication",
        description: "% of patients who said doctors \"always\" communicated well.",
    },
    MetricEntry {
        key: "H_COMP_3_A_P",
        label: "Staff Responsiveness",
        description: "% of patients who said they \"always\" received help as soon as they wanted.",
    },
    MetricEntry {
        key: "H_COMP_5_A_P",
        label: "Care Transition",
        description: "% of patients who \"strongly agree\" they understood their care when leaving the hospital.",
    },
    MetricEntry {
        key: "H_COMP_6_Y_P",
        label: "Discharge Info",
        description: "% of patients who said staff \"did\" give them discharge information.",
    },
    MetricEntry {
        key: "H_CLEAN_HSP_A_P",
        label: "Care Cleanliness",
        description: "% of patients who said their room was \"always\" clean.",
    },
    MetricEntry {
        key: "H_QUIET_HSP_A_P",
        label: "Quietness",
        description: "% of patients who said the area around their room was \"always\" quiet at night.",
    },
    MetricEntry {
        key: "H_RECMND_DY",
        label: "Recommend",
        description: "% of patients who would \"definitely recommend\" the hospital.",
    },
];

/// Read-only list of benchmark metrics.
#[derive(Debug, Clone, Copy)]
pub struct MetricCatalog {
    entries: &'static [MetricEntry],
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::hcahps()
    }
}

impl MetricCatalog {
    /// The HCAHPS patient-experience measures.
    pub const fn hcahps() -> Self {
        Self {
            entries: HCAHPS_METRICS,
        }
    }

    /// All metrics in default display order.
    pub fn list_metrics(&self) -> &'static [MetricEntry] {
        self.entries
    }

    pub fn get(&self, key: &str) -> Option<&'static MetricEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key.to_string()).collect()
    }

    /// Position of a key in display order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_order_starts_with_nurse_communication() {
        let catalog = MetricCatalog::hcahps();
        let metrics = catalog.list_metrics();
        assert_eq!(metrics.len(), 8);
        assert_eq!(metrics[0].label, "Nurse Communication");
        assert_eq!(metrics[7].key, "H_RECMND_DY");
    }

    #[test]
    fn test_keys_are_unique() {
        let catalog = MetricCatalog::hcahps();
        let unique: HashSet<_> = catalog.list_metrics().iter().map(|m| m.key).collect();
        assert_eq!(unique.len(), catalog.list_metrics().len());
    }

    #[test]
    fn test_lookup() {
        let catalog = MetricCatalog::hcahps();
        assert_eq!(catalog.get("H_CLEAN_HSP_A_P").unwrap().label, "Care Cleanliness");
        assert!(!catalog.contains("H_STAR_RATING"));
        assert_eq!(catalog.position("H_COMP_2_A_P"), Some(1));
    }
}
