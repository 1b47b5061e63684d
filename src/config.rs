//! Application configuration.
//! Where the two tables come from and how the window is presented.

use serde::{Deserialize, Serialize};

/// CMS Hospital General Information export.
pub const DEFAULT_HOSPITAL_SOURCE: &str = "https://www.dropbox.com/scl/fi/fq5o8a6evwpsfzutjp7uw/Hospital_General_Information.csv?rlkey=c60s0se15d6nzs40mm19a2q5v&st=li48t6ft&dl=1";

/// CMS HCAHPS hospital-level survey export.
pub const DEFAULT_METRIC_SOURCE: &str = "https://www.dropbox.com/scl/fi/d35e3po3qfyaw7fz3qend/HCAHPS.csv?rlkey=pw76uj8z5270ks7izz6esx62r&st=ugsr5p6s&dl=1";

/// Static settings for one dashboard process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Hospital directory CSV (URL or local path)
    pub hospital_source: String,
    /// HCAHPS metric CSV (URL or local path)
    pub metric_source: String,
    pub window_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hospital_source: DEFAULT_HOSPITAL_SOURCE.to_string(),
            metric_source: DEFAULT_METRIC_SOURCE.to_string(),
            window_title: "Hospital HCAHPS Benchmarking Tool".to_string(),
        }
    }
}

impl AppConfig {
    /// Config pointing both tables at explicit locations.
    pub fn with_sources(hospital_source: impl Into<String>, metric_source: impl Into<String>) -> Self {
        Self {
            hospital_source: hospital_source.into(),
            metric_source: metric_source.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_remote_sources() {
        let config = AppConfig::default();
        assert!(config.hospital_source.starts_with("https://"));
        assert!(config.metric_source.starts_with("https://"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"hospital_source": "hospitals.csv"}"#).unwrap();
        assert_eq!(config.hospital_source, "hospitals.csv");
        assert_eq!(config.metric_source, DEFAULT_METRIC_SOURCE);
    }
}
