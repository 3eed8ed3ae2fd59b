//! Public chart and map description types.
//!
//! These are renderer-neutral; `to_plotly` on each spec turns them into a
//! Plotly figure (`{"data": [...], "layout": {...}}`).

use serde::Serialize;

/// Line dash style. Historical data is solid, projections are dotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    Solid,
    Dot,
}

impl Dash {
    pub fn as_str(self) -> &'static str {
        match self {
            Dash::Solid => "solid",
            Dash::Dot => "dot",
        }
    }
}

/// Which Y axis a trace is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub side: AxisSide,
    pub title: String,
}

/// One drawn line segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    /// Historical and forecast segments of one series share a group.
    pub legend_group: String,
    pub show_legend: bool,
    pub x: Vec<i32>,
    pub y: Vec<f64>,
    pub unit: String,
    pub color: String,
    pub dash: Dash,
    pub axis: AxisSide,
    /// Translucent fill down to zero, as an `rgba(...)` colour.
    pub fill: Option<String>,
    pub hover_template: String,
}

/// Horizontal reference line across the plot (zero line, target).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub y: f64,
    pub color: String,
    pub dash: Dash,
    pub annotation: Option<String>,
}

/// Line chart with one or two Y axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub traces: Vec<Trace>,
    /// One axis, or primary + secondary. Never more than two.
    pub axes: Vec<Axis>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl ChartSpec {
    pub fn is_dual_axis(&self) -> bool {
        self.axes.len() == 2
    }

    /// Traces that appear in the legend.
    pub fn legend_entries(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(|t| t.show_legend)
    }
}

/// World map shaded per ISO3 code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethSpec {
    pub title: String,
    pub locations: Vec<String>,
    pub z: Vec<f64>,
    /// `(position in 0..=1, colour)` stops.
    pub colorscale: Vec<(f64, String)>,
    pub zmin: f64,
    pub zmax: f64,
    pub show_scale: bool,
    pub colorbar_title: Option<String>,
    pub hover_template: String,
    /// Land colour override (uniform maps tint the whole globe).
    pub land_color: Option<String>,
}
