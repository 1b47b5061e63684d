//! HCAHPS Benchmark - Hospital Patient Experience Dashboard
//!
//! Compares a hospital's HCAHPS survey results against state and national
//! benchmarks and exports the comparison as a PowerPoint report.

mod charts;
mod config;
mod data;
mod gui;
mod metrics;
mod ppt;
mod session;
mod stats;

use config::AppConfig;
use eframe::egui;
use gui::BenchmarkApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = AppConfig::default();
    let title = config.window_title.clone();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title(&title),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        &title,
        options,
        Box::new(|cc| Ok(Box::new(BenchmarkApp::new(cc, config)))),
    )
}
