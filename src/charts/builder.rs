//! Chart Builder Module
//! Turns comparison rows into a renderer-agnostic grouped bar chart.

use crate::stats::ComparisonRow;
use serde::Serialize;

/// RGB color, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{}", self.hex()))
    }
}

/// The three bars of every category, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Series {
    Hospital,
    StateAverage,
    NationalAverage,
}

impl Series {
    pub const ALL: [Series; 3] = [Series::Hospital, Series::StateAverage, Series::NationalAverage];

    pub fn name(self) -> &'static str {
        match self {
            Series::Hospital => "Hospital",
            Series::StateAverage => "State Avg",
            Series::NationalAverage => "National Avg",
        }
    }

    /// Fixed palette, same for every chart.
    pub fn color(self) -> Rgb {
        match self {
            Series::Hospital => Rgb(91, 155, 213),
            Series::StateAverage => Rgb(237, 125, 49),
            Series::NationalAverage => Rgb(112, 173, 71),
        }
    }

    /// Slot within the category group.
    pub fn index(self) -> usize {
        match self {
            Series::Hospital => 0,
            Series::StateAverage => 1,
            Series::NationalAverage => 2,
        }
    }

    fn value(self, row: &ComparisonRow) -> Option<f64> {
        match self {
            Series::Hospital => row.hospital_value,
            Series::StateAverage => row.state_value,
            Series::NationalAverage => row.national_value,
        }
    }
}

/// A single bar. Bars with no value are not emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSpec {
    pub series: Series,
    pub value: f64,
    pub text: String,
    pub color: Rgb,
}

/// One metric on the category axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpec {
    pub label: String,
    pub bars: Vec<BarSpec>,
}

/// Declarative grouped bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub categories: Vec<CategorySpec>,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            x_axis_title: "Measure".to_string(),
            y_axis_title: "Score (%)".to_string(),
            categories: Vec::new(),
        }
    }
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Legend entries, always all three series.
    pub fn legend(&self) -> Vec<(&'static str, Rgb)> {
        Series::ALL.iter().map(|s| (s.name(), s.color())).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One decimal and a percent sign.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Build the chart for a set of comparison rows; no rows, no categories.
pub fn build_chart(rows: &[ComparisonRow]) -> ChartSpec {
    let categories = rows
        .iter()
        .map(|row| CategorySpec {
            label: row.metric_label.clone(),
            bars: Series::ALL
                .iter()
                .filter_map(|&series| {
                    let value = series.value(row)?;
                    Some(BarSpec {
                        series,
                        value,
                        text: format_percent(value),
                        color: series.color(),
                    })
                })
                .collect(),
        })
        .collect();

    ChartSpec {
        categories,
        ..ChartSpec::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, hospital: Option<f64>, state: Option<f64>, national: Option<f64>) -> ComparisonRow {
        ComparisonRow {
            metric_key: label.to_uppercase(),
            metric_label: label.to_string(),
            hospital_value: hospital,
            state_value: state,
            national_value: national,
            delta_vs_state: None,
            delta_vs_national: None,
        }
    }

    #[test]
    fn test_one_category_per_row_with_three_bars() {
        let rows = vec![
            row("Care Cleanliness", Some(85.0), Some(80.0), Some(78.0)),
            row("Quietness", Some(61.24), Some(60.0), Some(62.0)),
        ];
        let chart = build_chart(&rows);

        assert_eq!(chart.categories.len(), 2);
        assert_eq!(chart.categories[0].label, "Care Cleanliness");
        let bars = &chart.categories[0].bars;
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].series, Series::Hospital);
        assert_eq!(bars[0].text, "85.0%");
        assert_eq!(chart.categories[1].bars[0].text, "61.2%");
    }

    #[test]
    fn test_missing_values_omit_bars() {
        let chart = build_chart(&[row("Nurse Communication", None, Some(80.0), None)]);
        let bars = &chart.categories[0].bars;
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].series, Series::StateAverage);
    }

    #[test]
    fn test_palette_is_fixed_per_series() {
        let rows = vec![
            row("A", Some(1.0), Some(2.0), Some(3.0)),
            row("B", Some(4.0), Some(5.0), Some(6.0)),
        ];
        let chart = build_chart(&rows);
        for category in &chart.categories {
            for bar in &category.bars {
                assert_eq!(bar.color, bar.series.color());
            }
        }
        assert_ne!(Series::Hospital.color(), Series::StateAverage.color());
        assert_ne!(Series::StateAverage.color(), Series::NationalAverage.color());
    }

    #[test]
    fn test_empty_rows_give_empty_chart() {
        let chart = build_chart(&[]);
        assert!(chart.is_empty());
        assert_eq!(chart.legend().len(), 3);
    }

    #[test]
    fn test_json_uses_hex_colors() {
        let chart = build_chart(&[row("Recommend", Some(70.0), None, None)]);
        let json = chart.to_json().unwrap();
        assert!(json.contains("\"#5B9BD5\""));
        assert!(json.contains("\"70.0%\""));
    }
}
