//! Static Chart Renderer
//! Rasterises a [`ChartSpec`] to PNG for embedding in the report.
//!
//! Layout:
//! 1. White canvas with a fixed plot area
//! 2. Horizontal grid lines every 10 points on a 0-100 scale
//! 3. One group of three bars per category, colored by series
//!
//! The image carries no text. Titles, category labels and the legend are
//! laid out as slide text by the report exporter, using [`PlotArea`] to line
//! them up with the bars.

use crate::charts::{ChartSpec, Rgb};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::prelude::{
    BitMapBackend, Color, IntoDrawingArea, PathElement, RGBColor, Rectangle, BLACK, WHITE,
};
use std::io::Cursor;
use thiserror::Error;

const GRID: RGBColor = RGBColor(220, 220, 220);
const AXIS_MAX: f64 = 100.0;
const GRID_STEP: f64 = 10.0;
/// Share of a category slot taken by its bar group
const GROUP_FILL: f64 = 0.8;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to encode chart PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Plot rectangle inside the image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PlotArea {
    pub fn for_size(width: u32, height: u32) -> Self {
        Self {
            left: width / 20,
            top: height / 20,
            right: width - width / 40,
            bottom: height - height / 20,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Width of one category slot.
    pub fn slot_width(&self, categories: usize) -> f64 {
        self.width() as f64 / categories.max(1) as f64
    }

    /// Horizontal center of a category slot.
    pub fn category_center(&self, index: usize, categories: usize) -> f64 {
        self.left as f64 + self.slot_width(categories) * (index as f64 + 0.5)
    }

    /// Pixel row for a value on the 0-100 axis.
    pub fn map_y(&self, value: f64) -> i32 {
        let clamped = value.clamp(0.0, AXIS_MAX);
        let ratio = clamped / AXIS_MAX;
        (self.bottom as f64 - ratio * self.height() as f64).round() as i32
    }

    /// Left and right pixel columns of one bar.
    pub fn bar_span(&self, category: usize, categories: usize, slot: usize) -> (i32, i32) {
        let slot_w = self.slot_width(categories);
        let bar_w = slot_w * GROUP_FILL / 3.0;
        let group_left = self.left as f64 + slot_w * category as f64 + slot_w * (1.0 - GROUP_FILL) / 2.0;
        let x0 = group_left + bar_w * slot as f64;
        (x0.round() as i32, (x0 + bar_w).round() as i32 - 1)
    }
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render the chart as PNG bytes.
    pub fn render_png(chart: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        Self::draw(chart, &mut buffer, width, height)?;

        let img = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Draw("pixel buffer size mismatch".to_string()))?;
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }

    fn draw(chart: &ChartSpec, buffer: &mut [u8], width: u32, height: u32) -> Result<(), RenderError> {
        let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let area = PlotArea::for_size(width, height);
        let (left, right) = (area.left as i32, area.right as i32);

        // Grid
        let mut tick = 0.0;
        while tick <= AXIS_MAX {
            let y = area.map_y(tick);
            root.draw(&PathElement::new(vec![(left, y), (right, y)], GRID.stroke_width(1)))
                .map_err(draw_err)?;
            tick += GRID_STEP;
        }

        // Bars
        let count = chart.categories.len();
        for (category_idx, category) in chart.categories.iter().enumerate() {
            for bar in &category.bars {
                let (x0, x1) = area.bar_span(category_idx, count, bar.series.index());
                let top = area.map_y(bar.value);
                root.draw(&Rectangle::new(
                    [(x0, top), (x1, area.bottom as i32)],
                    Self::to_plotters(bar.color).filled(),
                ))
                .map_err(draw_err)?;
            }
        }

        // Axes
        let bottom = area.bottom as i32;
        root.draw(&PathElement::new(vec![(left, bottom), (right, bottom)], BLACK.stroke_width(2)))
            .map_err(draw_err)?;
        root.draw(&PathElement::new(
            vec![(left, area.top as i32), (left, bottom)],
            BLACK.stroke_width(2),
        ))
        .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }

    fn to_plotters(color: Rgb) -> RGBColor {
        RGBColor(color.0, color.1, color.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::build_chart;
    use crate::stats::ComparisonRow;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn sample_rows() -> Vec<ComparisonRow> {
        vec![ComparisonRow {
            metric_key: "H_CLEAN_HSP_A_P".to_string(),
            metric_label: "Care Cleanliness".to_string(),
            hospital_value: Some(85.0),
            state_value: Some(80.0),
            national_value: None,
            delta_vs_state: Some(5.0),
            delta_vs_national: None,
        }]
    }

    #[test]
    fn test_render_png_has_png_signature() {
        let chart = build_chart(&sample_rows());
        let png = ChartRenderer::render_png(&chart, 400, 200).unwrap();
        assert_eq!(&png[..8], &PNG_MAGIC);

        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (400, 200));

        // hospital bar sits at the left of the only slot
        let area = PlotArea::for_size(400, 200);
        let (x0, x1) = area.bar_span(0, 1, 0);
        let x = ((x0 + x1) / 2) as u32;
        let y = area.bottom - 5;
        let pixel = decoded.get_pixel(x, y);
        assert_eq!(pixel.0, [91, 155, 213]);
    }

    #[test]
    fn test_empty_chart_still_renders() {
        let png = ChartRenderer::render_png(&build_chart(&[]), 200, 100).unwrap();
        assert_eq!(&png[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_map_y_bounds() {
        let area = PlotArea::for_size(400, 200);
        assert_eq!(area.map_y(0.0), area.bottom as i32);
        assert_eq!(area.map_y(100.0), area.top as i32);
        assert_eq!(area.map_y(150.0), area.top as i32);
    }

    #[test]
    fn test_category_centers_are_evenly_spaced() {
        let area = PlotArea::for_size(1000, 500);
        let first = area.category_center(0, 4);
        let second = area.category_center(1, 4);
        assert!((second - first - area.slot_width(4)).abs() < 1e-9);
    }
}
