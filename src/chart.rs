//! Chart payload projection.
//!
//! Converts a page of rows into a Chart.js-shaped payload, assuming the row
//! shape `(label, value)`: column 0 becomes the label, column 1 the data
//! point. Values with a numeric reading (including NUMERIC columns arriving
//! as text) are emitted as floats; anything else passes through unchanged so
//! text-valued series still render.

use crate::db::Row;
use serde::Serialize;

/// Fixed fill color for the single dataset.
const BACKGROUND_COLOR: &str = "rgba(54, 162, 235, 0.6)";

/// Fixed border color for the single dataset.
const BORDER_COLOR: &str = "rgba(54, 162, 235, 1)";

/// Chart.js-compatible payload derived from a page of rows.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPayload {
    /// One label per row, from column 0.
    pub labels: Vec<String>,

    /// A single dataset built from column 1.
    pub datasets: Vec<Dataset>,
}

/// A single Chart.js dataset with fixed styling.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Series label shown in the chart legend.
    pub label: &'static str,

    /// Data points; floats where coercion succeeded, raw values otherwise.
    pub data: Vec<serde_json::Value>,

    /// Fill color.
    pub background_color: &'static str,

    /// Border color.
    pub border_color: &'static str,

    /// Border width in pixels.
    pub border_width: u32,
}

impl ChartPayload {
    /// Returns a payload with no labels and no data points.
    pub fn empty() -> Self {
        project(&[])
    }

    /// Returns true if the payload carries no data points.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Projects rows into a chart payload.
///
/// Rows with fewer than two columns contribute a label with a null data
/// point rather than failing.
pub fn project(rows: &[Row]) -> ChartPayload {
    let labels = rows
        .iter()
        .map(|row| {
            row.first()
                .map(|v| v.to_display_string())
                .unwrap_or_default()
        })
        .collect();

    let data = rows
        .iter()
        .map(|row| match row.get(1) {
            Some(value) => match value.as_f64() {
                Some(n) => serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
                None => value.to_json(),
            },
            None => serde_json::Value::Null,
        })
        .collect();

    ChartPayload {
        labels,
        datasets: vec![Dataset {
            label: "Incident Count",
            data,
            background_color: BACKGROUND_COLOR,
            border_color: BORDER_COLOR,
            border_width: 1,
        }],
    }
}
