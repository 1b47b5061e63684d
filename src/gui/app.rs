//! HCAHPS Benchmark Main Application
//! Main window with control panel and chart viewer.

use crate::config::AppConfig;
use crate::data::{DataLoader, Dataset, DatasetCache};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::session::{SessionController, SessionError};
use anyhow::Context;
use chrono::Local;
use egui::{Align2, RichText, SidePanel};
use log::{error, info};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Dataset loading result from background thread
enum LoadResult {
    Complete(Arc<Dataset>),
    Error(String),
}

/// Main application window.
pub struct BenchmarkApp {
    config: AppConfig,
    session: Option<SessionController>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
    load_error: Option<String>,
}

impl BenchmarkApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self {
            config,
            session: None,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
            load_error: None,
        };
        app.start_loading();
        app
    }

    /// Load both tables once through the shared cache.
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.load_error = None;
        self.control_panel.set_status("Loading data...");

        let config = self.config.clone();
        thread::spawn(move || {
            let result = DatasetCache::shared().get_or_load(|| DataLoader::new(&config).load());
            let message = match result {
                Ok(dataset) => LoadResult::Complete(dataset),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(message);
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(dataset)) => {
                self.control_panel.set_status(&format!(
                    "Loaded {} hospitals, {} survey results",
                    dataset.hospital_count(),
                    dataset.metric_count()
                ));
                self.session = Some(SessionController::new(dataset));
                self.is_loading = false;
                self.refresh_view();
            }
            Ok(LoadResult::Error(message)) => {
                error!("dataset unavailable: {}", message);
                self.control_panel.set_error("Data unavailable");
                self.load_error = Some(message);
                self.is_loading = false;
            }
            Err(TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.control_panel.set_error("Data unavailable");
                self.load_error = Some("The loader stopped before finishing.".to_string());
                self.is_loading = false;
            }
        }
    }

    /// Recompute the dashboard for the current selection.
    fn refresh_view(&mut self) {
        let Some(session) = &self.session else {
            return;
        };

        match session.view() {
            Ok(view) => self.chart_viewer.set_view(view),
            Err(e) => {
                self.chart_viewer.clear();
                self.control_panel.set_error(&e.user_message());
            }
        }
    }

    fn handle_action(&mut self, action: ControlPanelAction) {
        let outcome = match action {
            ControlPanelAction::None => return,
            ControlPanelAction::DownloadReport => self.handle_download(),
            ControlPanelAction::OpenReport => self.handle_open_report(),
            selection => {
                self.apply_selection(selection);
                return;
            }
        };

        if let Err(e) = outcome {
            error!("{:#}", e);
            self.control_panel.set_error(&format!("{:#}", e));
        }
    }

    fn apply_selection(&mut self, action: ControlPanelAction) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let result: Result<(), SessionError> = match action {
            ControlPanelAction::HospitalChanged(id) => session.select_hospital(&id),
            ControlPanelAction::MetricToggled(key, on) => session.set_metric(&key, on),
            ControlPanelAction::SelectAllMetrics => {
                session.select_all_metrics();
                Ok(())
            }
            ControlPanelAction::ClearMetrics => {
                session.clear_metrics();
                Ok(())
            }
            _ => Ok(()),
        };

        match result {
            Ok(()) => self.refresh_view(),
            Err(e) => self.control_panel.set_error(&e.user_message()),
        }
    }

    /// Build the report, then ask where to save it.
    fn handle_download(&mut self) -> anyhow::Result<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };

        let report = match session.download(Local::now().date_naive()) {
            Ok(report) => report,
            Err(e) => {
                self.control_panel.set_error(&e.user_message());
                return Ok(());
            }
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PowerPoint", &["pptx"])
            .set_file_name(&report.file_name)
            .save_file()
        else {
            return Ok(()); // User cancelled
        };

        std::fs::write(&path, &report.bytes)
            .with_context(|| format!("Failed to save report to {}", path.display()))?;

        info!("report saved to {}", path.display());
        self.control_panel
            .set_status(&format!("Report saved: {}", path.display()));
        self.control_panel.last_report = Some(path);
        Ok(())
    }

    fn handle_open_report(&self) -> anyhow::Result<()> {
        let Some(path) = &self.control_panel.last_report else {
            return Ok(());
        };
        open::that(path).with_context(|| format!("Failed to open {}", path.display()))
    }

    /// Blocking message shown when the data could not be loaded.
    fn show_load_error(&mut self, ctx: &egui::Context) {
        let Some(message) = self.load_error.clone() else {
            return;
        };

        egui::CentralPanel::default().show(ctx, |_ui| {});
        egui::Window::new("Data unavailable")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new("The HCAHPS data could not be loaded.").strong());
                ui.add_space(5.0);
                ui.label(&message);
                ui.add_space(10.0);
                if ui.button("Retry").clicked() {
                    self.start_loading();
                }
            });
    }
}

impl eframe::App for BenchmarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        if self.load_error.is_some() {
            self.show_load_error(ctx);
            return;
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, self.session.as_ref());
                    self.handle_action(action);
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.is_loading {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }
            let catalog = self
                .session
                .as_ref()
                .map(|session| *session.catalog())
                .unwrap_or_default();
            self.chart_viewer.show(ctx, ui, &catalog);
        });
    }
}
