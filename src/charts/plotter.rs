//! Chart Plotter Module
//! Draws the benchmark chart and comparison table with egui / egui_plot.

use crate::charts::{format_percent, ChartSpec, Rgb, Series};
use crate::stats::ComparisonRow;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot};

/// Background for deltas where the hospital is ahead / behind.
const BETTER_BG: Color32 = Color32::from_rgb(212, 237, 218);
const WORSE_BG: Color32 = Color32::from_rgb(248, 215, 218);
const DELTA_TEXT: Color32 = Color32::from_rgb(33, 37, 41);

const BAR_WIDTH: f64 = 0.25;

pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color(rgb: Rgb) -> Color32 {
        Color32::from_rgb(rgb.0, rgb.1, rgb.2)
    }

    /// Grouped bars, one group per category, x = category index.
    pub fn draw_bar_chart(ui: &mut egui::Ui, chart: &ChartSpec, height: f32) {
        let x_labels: Vec<String> = chart.categories.iter().map(|c| c.label.clone()).collect();

        Plot::new("benchmark_chart")
            .height(height)
            .legend(Legend::default())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(100.0)
            .x_axis_label(chart.x_axis_title.clone())
            .y_axis_label(chart.y_axis_title.clone())
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < x_labels.len() {
                    x_labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for series in Series::ALL {
                    let offset = (series.index() as f64 - 1.0) * BAR_WIDTH;
                    let bars: Vec<Bar> = chart
                        .categories
                        .iter()
                        .enumerate()
                        .flat_map(|(i, category)| {
                            category
                                .bars
                                .iter()
                                .filter(move |bar| bar.series == series)
                                .map(move |bar| {
                                    Bar::new(i as f64 + offset, bar.value)
                                        .width(BAR_WIDTH)
                                        .name(format!("{}: {}", category.label, bar.text))
                                })
                        })
                        .collect();

                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .color(Self::color(series.color()))
                            .name(series.name()),
                    );
                }
            });
    }

    /// Comparison table with deltas tinted green/red.
    pub fn draw_comparison_table(ui: &mut egui::Ui, rows: &[ComparisonRow]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("comparison_table")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        for header in [
                            "Measure",
                            "Hospital",
                            "State Avg",
                            "National Avg",
                            "vs State",
                            "vs National",
                        ] {
                            ui.label(RichText::new(header).strong());
                        }
                        ui.end_row();

                        for row in rows {
                            ui.label(&row.metric_label);
                            ui.label(Self::cell(row.hospital_value));
                            ui.label(Self::cell(row.state_value));
                            ui.label(Self::cell(row.national_value));
                            Self::delta_label(ui, row.delta_vs_state);
                            Self::delta_label(ui, row.delta_vs_national);
                            ui.end_row();
                        }
                    });
            });
    }

    fn cell(value: Option<f64>) -> String {
        value.map(format_percent).unwrap_or_else(|| "N/A".to_string())
    }

    fn delta_label(ui: &mut egui::Ui, delta: Option<f64>) {
        let Some(delta) = delta else {
            ui.label("N/A");
            return;
        };

        let text = RichText::new(format!("{:+.1}", delta)).color(DELTA_TEXT);
        let text = if delta > 0.0 {
            text.background_color(BETTER_BG)
        } else if delta < 0.0 {
            text.background_color(WORSE_BG)
        } else {
            text
        };
        ui.label(text);
    }
}
