//! Data Processor Module
//! Header normalization and cell cleaning for the two source tables.

use std::fmt;

/// Which of the two source tables a frame holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Hospital General Information
    Hospital,
    /// HCAHPS survey results
    Metric,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Hospital => write!(f, "hospital"),
            TableKind::Metric => write!(f, "metric"),
        }
    }
}

impl TableKind {
    /// Canonical columns that must be present.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Hospital => &["hospital_id", "name", "state"],
            TableKind::Metric => &["hospital_id", "metric_key", "value"],
        }
    }

    /// Map a normalized header to its canonical column, if the table uses it.
    pub fn canonical_column(self, normalized: &str) -> Option<&'static str> {
        match self {
            TableKind::Hospital => match normalized {
                "hospital_id" | "facility_id" | "provider_id" | "ccn" => Some("hospital_id"),
                "name" | "facility_name" | "hospital_name" => Some("name"),
                "state" => Some("state"),
                "address" | "street_address" => Some("address"),
                "city" | "city_town" => Some("city"),
                "zip_code" | "zip" => Some("zip_code"),
                _ => None,
            },
            TableKind::Metric => match normalized {
                "hospital_id" | "facility_id" | "provider_id" => Some("hospital_id"),
                "metric_key" | "hcahps_measure_id" | "measure_id" => Some("metric_key"),
                "value" | "hcahps_answer_percent" | "answer_percent" | "score" => Some("value"),
                "state_average" | "state_avg" => Some("state_average"),
                "national_average" | "national_avg" => Some("national_average"),
                "state" => Some("state"),
                _ => None,
            },
        }
    }
}

/// Stateless cleaning helpers shared by both tables.
pub struct DataProcessor;

impl DataProcessor {
    /// Lower-case, collapse non-alphanumeric runs to `_`, trim `_`.
    ///
    /// `" HCAHPS Answer Percent"` becomes `hcahps_answer_percent`, and a
    /// leading byte-order mark disappears with the rest of the punctuation.
    pub fn normalize_column_name(header: &str) -> String {
        let mut normalized = String::with_capacity(header.len());
        let mut pending_sep = false;

        for c in header.trim().chars() {
            if c.is_ascii_alphanumeric() {
                if pending_sep && !normalized.is_empty() {
                    normalized.push('_');
                }
                pending_sep = false;
                normalized.push(c.to_ascii_lowercase());
            } else {
                pending_sep = true;
            }
        }

        normalized
    }

    /// Trimmed text, `None` when blank.
    pub fn clean_text(raw: Option<&str>) -> Option<String> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Parse a percentage cell. Anything that is not a finite number in
    /// 0..=100 (CMS writes "Not Available") is missing.
    pub fn coerce_percent(raw: Option<&str>) -> Option<f64> {
        let text = raw?.trim();
        let text = text.strip_suffix('%').unwrap_or(text).trim();
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && (0.0..=100.0).contains(v))
    }

    /// Upper-cased state code.
    pub fn clean_state(raw: Option<&str>) -> Option<String> {
        Self::clean_text(raw).map(|s| s.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cms_headers() {
        assert_eq!(
            DataProcessor::normalize_column_name(" HCAHPS Answer Percent "),
            "hcahps_answer_percent"
        );
        assert_eq!(DataProcessor::normalize_column_name("City/Town"), "city_town");
        assert_eq!(
            DataProcessor::normalize_column_name("\u{feff}Facility ID"),
            "facility_id"
        );
        assert_eq!(DataProcessor::normalize_column_name("ZIP  Code"), "zip_code");
    }

    #[test]
    fn test_canonical_aliases() {
        assert_eq!(
            TableKind::Hospital.canonical_column("facility_name"),
            Some("name")
        );
        assert_eq!(
            TableKind::Metric.canonical_column("hcahps_measure_id"),
            Some("metric_key")
        );
        assert_eq!(TableKind::Metric.canonical_column("footnote"), None);
    }

    #[test]
    fn test_coerce_percent() {
        assert_eq!(DataProcessor::coerce_percent(Some(" 85 ")), Some(85.0));
        assert_eq!(DataProcessor::coerce_percent(Some("72.5%")), Some(72.5));
        assert_eq!(DataProcessor::coerce_percent(Some("Not Available")), None);
        assert_eq!(DataProcessor::coerce_percent(Some("")), None);
        assert_eq!(DataProcessor::coerce_percent(Some("NaN")), None);
        assert_eq!(DataProcessor::coerce_percent(Some("140")), None);
        assert_eq!(DataProcessor::coerce_percent(None), None);
    }

    #[test]
    fn test_clean_state() {
        assert_eq!(DataProcessor::clean_state(Some(" tx")), Some("TX".to_string()));
        assert_eq!(DataProcessor::clean_state(Some("  ")), None);
    }
}
