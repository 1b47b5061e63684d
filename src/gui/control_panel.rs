//! Control Panel Widget
//! Left side panel: hospital selection, metric checkboxes and report actions.

use crate::session::SessionController;
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::PathBuf;

/// Left side control panel with selection and export controls.
pub struct ControlPanel {
    pub status: String,
    pub is_error: bool,
    /// Where the last report was saved
    pub last_report: Option<PathBuf>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            status: "Loading data...".to_string(),
            is_error: false,
            last_report: None,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel. Without a session only the header and status
    /// are shown.
    pub fn show(&mut self, ui: &mut egui::Ui, session: Option<&SessionController>) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏥 HCAHPS Benchmark")
                    .size(22.0)
                    .color(Color32::from_rgb(91, 155, 213)),
            );
            ui.label(
                RichText::new("Hospital vs. State vs. National")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        if let Some(session) = session {
            self.show_hospital_section(ui, session, &mut action);

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            self.show_metric_section(ui, session, &mut action);

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            // ===== Action Buttons =====
            let has_metrics = !session.selected_metrics().is_empty();
            ui.vertical_centered(|ui| {
                ui.add_enabled_ui(has_metrics, |ui| {
                    let button =
                        egui::Button::new(RichText::new("📄 Download PowerPoint Report").size(14.0))
                            .min_size(egui::vec2(220.0, 35.0));
                    if ui.add(button).clicked() {
                        action = ControlPanelAction::DownloadReport;
                    }
                });

                ui.add_space(8.0);

                ui.add_enabled_ui(self.last_report.is_some(), |ui| {
                    let open_button = egui::Button::new(RichText::new("📂 Open report").size(14.0))
                        .min_size(egui::vec2(150.0, 30.0));
                    if ui.add(open_button).clicked() {
                        action = ControlPanelAction::OpenReport;
                    }
                });
            });

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);
        }

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = if self.is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    fn show_hospital_section(
        &self,
        ui: &mut egui::Ui,
        session: &SessionController,
        action: &mut ControlPanelAction,
    ) {
        ui.label(RichText::new("🏥 Hospital").size(14.0).strong());
        ui.add_space(5.0);

        let options = session.hospital_options();
        let selected = session.selected_hospital();
        let selected_text = options
            .iter()
            .find(|option| Some(option.id.as_str()) == selected)
            .map(|option| option.label.clone())
            .unwrap_or_else(|| "Select a hospital".to_string());

        ComboBox::from_id_salt("hospital")
            .width(ui.available_width() - 10.0)
            .selected_text(selected_text)
            .height(400.0)
            .show_ui(ui, |ui| {
                for option in &options {
                    let is_selected = Some(option.id.as_str()) == selected;
                    if ui.selectable_label(is_selected, &option.label).clicked() && !is_selected {
                        *action = ControlPanelAction::HospitalChanged(option.id.clone());
                    }
                }
            });
    }

    fn show_metric_section(
        &self,
        ui: &mut egui::Ui,
        session: &SessionController,
        action: &mut ControlPanelAction,
    ) {
        ui.label(RichText::new("📋 Metrics").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                    for entry in session.catalog().list_metrics() {
                        let mut checked = session.is_metric_selected(entry.key);
                        if ui
                            .checkbox(&mut checked, entry.label)
                            .on_hover_text(entry.description)
                            .changed()
                        {
                            *action = ControlPanelAction::MetricToggled(entry.key.to_string(), checked);
                        }
                    }
                });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                *action = ControlPanelAction::SelectAllMetrics;
            }
            if ui.small_button("Clear All").clicked() {
                *action = ControlPanelAction::ClearMetrics;
            }
        });
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.is_error = false;
    }

    pub fn set_error(&mut self, status: &str) {
        self.status = status.to_string();
        self.is_error = true;
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    HospitalChanged(String),
    MetricToggled(String, bool),
    SelectAllMetrics,
    ClearMetrics,
    DownloadReport,
    OpenReport,
}
