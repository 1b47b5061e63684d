//! Chart Viewer Widget
//! Central panel: metric definitions, the comparison table and the
//! grouped bar chart for the current selection.

use crate::charts::ChartPlotter;
use crate::metrics::MetricCatalog;
use crate::session::DashboardView;
use egui::{Color32, RichText, ScrollArea};
use log::warn;

const CHART_HEIGHT: f32 = 420.0;

#[derive(Default)]
pub struct ChartViewer {
    pub view: Option<DashboardView>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.view = Some(view);
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, catalog: &MetricCatalog) {
        let Some(view) = &self.view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(
                    RichText::new(format!("Benchmarking: {}", view.hospital.name))
                        .size(20.0)
                        .strong(),
                );
                ui.label(
                    RichText::new(view.hospital.display_label())
                        .size(12.0)
                        .color(Color32::GRAY),
                );
                ui.add_space(8.0);

                egui::CollapsingHeader::new("Metric definitions")
                    .default_open(false)
                    .show(ui, |ui| {
                        for entry in catalog.list_metrics() {
                            ui.horizontal_wrapped(|ui| {
                                ui.label(RichText::new(entry.label).strong());
                                ui.label(entry.description);
                            });
                        }
                    });

                ui.add_space(10.0);

                if view.rows.is_empty() {
                    ui.label(
                        RichText::new("Select at least one metric to compare.")
                            .size(14.0)
                            .color(Color32::GRAY),
                    );
                    return;
                }

                ui.label(RichText::new("Comparison Table").size(16.0).strong());
                ui.add_space(5.0);
                ChartPlotter::draw_comparison_table(ui, &view.rows);

                ui.add_space(15.0);

                ui.horizontal(|ui| {
                    ui.label(RichText::new("Benchmark Chart").size(16.0).strong());
                    if ui.small_button("Copy chart spec").clicked() {
                        match view.chart.to_json() {
                            Ok(json) => ctx.copy_text(json),
                            Err(e) => warn!("chart spec not serializable: {}", e),
                        }
                    }
                });
                ui.add_space(5.0);
                ChartPlotter::draw_bar_chart(ui, &view.chart, CHART_HEIGHT);
            });
    }
}
