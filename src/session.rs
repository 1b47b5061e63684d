//! Session Controller Module
//! Current hospital and metric selection, and the views derived from it.

use crate::charts::{build_chart, ChartSpec};
use crate::data::{Dataset, HospitalRecord};
use crate::metrics::MetricCatalog;
use crate::ppt::{ExportError, ReportExporter};
use crate::stats::{CompareError, Comparator, ComparisonRow};
use chrono::NaiveDate;
use log::{debug, info};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No hospital selected")]
    NoHospitalSelected,
    #[error(transparent)]
    Compare(#[from] CompareError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl SessionError {
    /// Short message for the status line.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::NoHospitalSelected => "Select a hospital to compare.".to_string(),
            SessionError::Compare(CompareError::HospitalNotFound(id)) => {
                format!("Hospital {} is not in the loaded data.", id)
            }
            SessionError::Compare(CompareError::UnknownMetric(key)) => {
                format!("{} is not an HCAHPS benchmark metric.", key)
            }
            SessionError::Export(ExportError::NothingToExport) => {
                "Select at least one metric to build a report.".to_string()
            }
            SessionError::Export(e) => format!("Could not build the report: {}", e),
        }
    }
}

/// Entry of the hospital selector.
#[derive(Debug, Clone, PartialEq)]
pub struct HospitalOption {
    pub id: String,
    pub label: String,
}

/// Everything the dashboard shows for the current selection.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub hospital: HospitalRecord,
    pub rows: Vec<ComparisonRow>,
    pub chart: ChartSpec,
}

/// A generated report, ready to be saved.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct SessionController {
    dataset: Arc<Dataset>,
    catalog: MetricCatalog,
    selected_hospital: Option<String>,
    selected_metrics: Vec<String>,
}

impl SessionController {
    /// First hospital by name, every metric.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let catalog = MetricCatalog::hcahps();
        let mut session = Self {
            dataset,
            catalog,
            selected_hospital: None,
            selected_metrics: catalog.keys(),
        };
        session.selected_hospital = session
            .hospital_options()
            .into_iter()
            .next()
            .map(|option| option.id);
        session
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Hospitals sorted by name, then id.
    pub fn hospital_options(&self) -> Vec<HospitalOption> {
        let mut hospitals: Vec<&HospitalRecord> = self.dataset.hospitals().collect();
        hospitals.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.hospital_id.cmp(&b.hospital_id))
        });
        hospitals
            .into_iter()
            .map(|hospital| HospitalOption {
                id: hospital.hospital_id.clone(),
                label: hospital.display_label(),
            })
            .collect()
    }

    pub fn selected_hospital(&self) -> Option<&str> {
        self.selected_hospital.as_deref()
    }

    pub fn selected_metrics(&self) -> &[String] {
        &self.selected_metrics
    }

    pub fn is_metric_selected(&self, key: &str) -> bool {
        self.selected_metrics.iter().any(|k| k == key)
    }

    pub fn select_hospital(&mut self, hospital_id: &str) -> Result<(), SessionError> {
        if self.dataset.hospital(hospital_id).is_none() {
            return Err(CompareError::HospitalNotFound(hospital_id.to_string()).into());
        }
        debug!("hospital selected: {}", hospital_id);
        self.selected_hospital = Some(hospital_id.to_string());
        Ok(())
    }

    /// Toggle a metric; the selection stays in catalog order.
    pub fn set_metric(&mut self, key: &str, selected: bool) -> Result<(), SessionError> {
        if !self.catalog.contains(key) {
            return Err(CompareError::UnknownMetric(key.to_string()).into());
        }

        self.selected_metrics.retain(|k| k != key);
        if selected {
            self.selected_metrics.push(key.to_string());
            let catalog = self.catalog;
            self.selected_metrics
                .sort_by_key(|k| catalog.position(k).unwrap_or(usize::MAX));
        }
        Ok(())
    }

    pub fn select_all_metrics(&mut self) {
        self.selected_metrics = self.catalog.keys();
    }

    pub fn clear_metrics(&mut self) {
        self.selected_metrics.clear();
    }

    /// Comparison rows and chart for the current selection.
    pub fn view(&self) -> Result<DashboardView, SessionError> {
        let hospital_id = self
            .selected_hospital
            .as_deref()
            .ok_or(SessionError::NoHospitalSelected)?;
        let hospital = self
            .dataset
            .hospital(hospital_id)
            .ok_or_else(|| CompareError::HospitalNotFound(hospital_id.to_string()))?
            .clone();

        let rows = Comparator::new(&self.dataset, &self.catalog)
            .compare(hospital_id, &self.selected_metrics)?;
        let chart = build_chart(&rows);

        Ok(DashboardView {
            hospital,
            rows,
            chart,
        })
    }

    /// Build the report for the current selection.
    pub fn download(&self, date: NaiveDate) -> Result<ReportFile, SessionError> {
        let view = self.view()?;
        let bytes = ReportExporter::export_dated(&view.rows, &view.chart, &view.hospital.name, date)?;
        let file_name = ReportExporter::report_file_name(&view.hospital.name, date);
        info!("report ready: {} ({} bytes)", file_name, bytes.len());
        Ok(ReportFile { file_name, bytes })
    }
}
