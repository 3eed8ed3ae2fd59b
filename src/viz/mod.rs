//! Chart and map descriptions, emitted as Plotly figures.
//!
//! - Single or dual Y axis, chosen from the distinct units of the traces
//! - Historical segments solid, forecast segments dotted in the same colour
//! - Distinct series colors (Microsoft Office palette)
//! - Zero line for rate-like units and an optional target line
//!
//! Nothing is drawn here; [`ChartSpec::to_plotly`] and
//! [`ChoroplethSpec::to_plotly`] produce JSON for any Plotly front end and
//! [`html::page`] wraps it into a standalone document.

pub mod html;
pub mod map;
pub mod types;
pub mod util;

pub use map::{build_choropleth, build_uniform_price_map};
pub use types::{Axis, AxisSide, ChartSpec, ChoroplethSpec, Dash, ReferenceLine, Trace};

use crate::assembler::LabeledResult;
use crate::models::Series;
use serde_json::{Value, json};
use util::{hex_rgba, is_percentage_like, office_color};

/// One input series for [`build_line_chart`].
#[derive(Debug, Clone, PartialEq)]
pub struct TraceInput {
    pub label: String,
    pub historical: Series,
    pub forecast: Series,
    pub unit: String,
    /// Palette colour by position when unset.
    pub color: Option<String>,
}

impl TraceInput {
    pub fn new(label: impl Into<String>, historical: Series, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            historical,
            forecast: Series::new(),
            unit: unit.into(),
            color: None,
        }
    }

    pub fn with_forecast(mut self, forecast: Series) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    fn has_data(&self) -> bool {
        !self.historical.is_empty() || !self.forecast.is_empty()
    }
}

impl From<&LabeledResult> for TraceInput {
    fn from(r: &LabeledResult) -> Self {
        TraceInput::new(r.label.clone(), r.result.historical.clone(), r.result.unit.clone())
            .with_forecast(r.result.forecast.clone())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChartOptions {
    /// Draw a dotted reference line with annotation at this value.
    pub target: Option<f64>,
}

const ZERO_LINE: &str = "rgba(148,163,184,0.25)";
const TARGET_LINE: &str = "rgba(56,189,248,0.45)";

/// Build a line chart from labeled series.
///
/// Units are collected in first-seen order over traces with data. With two
/// or more distinct units the chart gets a secondary axis titled with the
/// second unit, and every trace whose unit differs from the first goes there.
pub fn build_line_chart(inputs: &[TraceInput], title: &str, options: ChartOptions) -> ChartSpec {
    let mut units: Vec<&str> = Vec::new();
    for t in inputs.iter().filter(|t| t.has_data()) {
        if !units.contains(&t.unit.as_str()) {
            units.push(&t.unit);
        }
    }
    let dual = units.len() >= 2;
    let primary = units.first().copied().unwrap_or("");

    let axes = if dual {
        vec![
            Axis {
                side: AxisSide::Primary,
                title: primary.to_string(),
            },
            Axis {
                side: AxisSide::Secondary,
                title: units[1].to_string(),
            },
        ]
    } else {
        vec![Axis {
            side: AxisSide::Primary,
            title: primary.to_string(),
        }]
    };

    let mut traces = Vec::new();
    for (idx, t) in inputs.iter().enumerate() {
        let color = t
            .color
            .clone()
            .unwrap_or_else(|| office_color(idx).to_string());
        let axis = if dual && t.unit != primary {
            AxisSide::Secondary
        } else {
            AxisSide::Primary
        };
        let segments = [
            (&t.historical, t.label.clone(), Dash::Solid),
            (&t.forecast, format!("{} (forecast)", t.label), Dash::Dot),
        ];
        for (series, name, dash) in segments {
            if series.is_empty() {
                continue;
            }
            let fill = (dash == Dash::Solid && !dual).then(|| hex_rgba(&color, 0.08));
            traces.push(Trace {
                hover_template: format!(
                    "<b>{name}</b><br>%{{x}}: %{{y:.2f}} {}<extra></extra>",
                    t.unit
                ),
                name,
                legend_group: t.label.clone(),
                show_legend: true,
                x: series.years().collect(),
                y: series.values().collect(),
                unit: t.unit.clone(),
                color: color.clone(),
                dash,
                axis,
                fill,
            });
        }
    }

    let mut reference_lines = Vec::new();
    let rates = inputs.iter().any(|t| is_percentage_like(&t.unit));
    if rates {
        reference_lines.push(ReferenceLine {
            y: 0.0,
            color: ZERO_LINE.to_string(),
            dash: Dash::Dot,
            annotation: None,
        });
    }
    if let Some(target) = options.target {
        let suffix = if rates { "%" } else { "" };
        reference_lines.push(ReferenceLine {
            y: target,
            color: TARGET_LINE.to_string(),
            dash: Dash::Dot,
            annotation: Some(format!("{target}{suffix}")),
        });
    }

    ChartSpec {
        title: title.to_string(),
        traces,
        axes,
        reference_lines,
    }
}

impl ChartSpec {
    /// Plotly figure JSON.
    pub fn to_plotly(&self) -> Value {
        let data: Vec<Value> = self
            .traces
            .iter()
            .map(|t| {
                let mut v = json!({
                    "type": "scatter",
                    "mode": "lines",
                    "name": t.name,
                    "legendgroup": t.legend_group,
                    "showlegend": t.show_legend,
                    "x": t.x,
                    "y": t.y,
                    "line": { "color": t.color, "width": 2.5, "dash": t.dash.as_str() },
                    "hovertemplate": t.hover_template,
                });
                if let Some(fill) = &t.fill {
                    v["fill"] = json!("tozeroy");
                    v["fillcolor"] = json!(fill);
                }
                if t.axis == AxisSide::Secondary {
                    v["yaxis"] = json!("y2");
                }
                v
            })
            .collect();

        let shapes: Vec<Value> = self
            .reference_lines
            .iter()
            .map(|r| {
                json!({
                    "type": "line",
                    "xref": "paper", "x0": 0, "x1": 1,
                    "yref": "y", "y0": r.y, "y1": r.y,
                    "line": { "color": r.color, "width": 1, "dash": r.dash.as_str() },
                })
            })
            .collect();
        let annotations: Vec<Value> = self
            .reference_lines
            .iter()
            .filter_map(|r| {
                let text = r.annotation.as_ref()?;
                Some(json!({
                    "xref": "paper", "x": 1, "xanchor": "right",
                    "yref": "y", "y": r.y, "yanchor": "bottom",
                    "text": text, "showarrow": false,
                    "font": { "size": 10, "color": r.color },
                }))
            })
            .collect();

        let mut layout = json!({
            "title": { "text": self.title, "x": 0.01 },
            "hovermode": "x unified",
            "legend": { "orientation": "h", "yanchor": "bottom", "y": 1.02, "xanchor": "right", "x": 1 },
            "xaxis": { "showgrid": true, "zeroline": false },
            "shapes": shapes,
            "annotations": annotations,
            "margin": { "l": 60, "r": 40, "t": 64, "b": 50 },
            "height": 450,
        });
        for axis in &self.axes {
            match axis.side {
                AxisSide::Primary => {
                    layout["yaxis"] = json!({ "title": { "text": axis.title }, "zeroline": false });
                }
                AxisSide::Secondary => {
                    layout["yaxis2"] = json!({
                        "title": { "text": axis.title },
                        "overlaying": "y",
                        "side": "right",
                        "showgrid": false,
                        "zeroline": false,
                    });
                }
            }
        }
        json!({ "data": data, "layout": layout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(pairs: &[(i32, f64)]) -> Series {
        Series::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn fill_only_on_single_axis_history() {
        let t = TraceInput::new("US", s(&[(2020, 1.0)]), "% y/y").with_forecast(s(&[(2021, 2.0)]));
        let chart = build_line_chart(&[t], "CPI", ChartOptions::default());
        assert!(chart.traces[0].fill.is_some());
        assert!(chart.traces[1].fill.is_none());
    }

    #[test]
    fn secondary_traces_point_at_y2() {
        let a = TraceInput::new("CPI", s(&[(2020, 1.0)]), "% y/y");
        let b = TraceInput::new("Brent", s(&[(2020, 40.0)]), "USD/bbl");
        let fig = build_line_chart(&[a, b], "mix", ChartOptions::default()).to_plotly();
        assert!(fig["data"][0].get("yaxis").is_none());
        assert_eq!(fig["data"][1]["yaxis"], "y2");
        assert_eq!(fig["layout"]["yaxis2"]["title"]["text"], "USD/bbl");
    }
}
