//! Choropleth map builders.

use super::types::ChoroplethSpec;
use crate::catalog::{MapScale, OIL_SCALE};
use crate::models::{Series, Snapshot};
use serde_json::{Value, json};

fn stops(scale: &[(f64, &str)]) -> Vec<(f64, String)> {
    scale.iter().map(|(p, c)| (*p, c.to_string())).collect()
}

/// Colour one year of an indicator per country.
///
/// Bounds come from the scale; values outside are left for the renderer to
/// clamp. Returns `None` when the snapshot holds no values.
pub fn build_choropleth(
    snapshot: &Snapshot,
    indicator_name: &str,
    scale: &MapScale,
) -> Option<ChoroplethSpec> {
    if snapshot.is_empty() {
        return None;
    }
    let suffix = if snapshot.is_forecast() {
        " (IMF forecast)"
    } else {
        ""
    };
    Some(ChoroplethSpec {
        title: format!("{indicator_name} — {}{suffix}", snapshot.year),
        locations: snapshot.values.keys().cloned().collect(),
        z: snapshot.values.values().copied().collect(),
        colorscale: stops(scale.stops),
        zmin: scale.zmin,
        zmax: scale.zmax,
        show_scale: true,
        colorbar_title: Some(scale.title.to_string()),
        hover_template: format!(
            "<b>%{{location}}</b><br>{}: %{{z:.1f}}<extra></extra>",
            scale.title
        ),
        land_color: None,
    })
}

/// Paint one world-market price uniformly over every location: one market,
/// one price. Returns `None` when `year` has no price.
pub fn build_uniform_price_map(
    series: &Series,
    year: i32,
    label: &str,
    unit: &str,
    locations: &[&str],
) -> Option<ChoroplethSpec> {
    let price = series.get(year)?;
    let pad = price.abs().max(1.0) * 1e-4;
    Some(ChoroplethSpec {
        title: format!("{label} — World Market Price {year}: <b>{price:.1} {unit}</b>"),
        locations: locations.iter().map(|l| l.to_string()).collect(),
        z: vec![price; locations.len()],
        colorscale: stops(OIL_SCALE),
        zmin: price - pad,
        zmax: price + pad,
        show_scale: false,
        colorbar_title: None,
        hover_template: format!(
            "<b>%{{location}}</b><br>{label}: {price:.1} {unit} ({year})<extra></extra>"
        ),
        land_color: OIL_SCALE.first().map(|(_, c)| c.to_string()),
    })
}

impl ChoroplethSpec {
    /// Plotly figure JSON.
    pub fn to_plotly(&self) -> Value {
        let colorscale: Vec<Value> = self.colorscale.iter().map(|(p, c)| json!([p, c])).collect();
        let mut trace = json!({
            "type": "choropleth",
            "locationmode": "ISO-3",
            "locations": self.locations,
            "z": self.z,
            "colorscale": colorscale,
            "zmin": self.zmin,
            "zmax": self.zmax,
            "showscale": self.show_scale,
            "hovertemplate": self.hover_template,
            "marker": { "line": { "color": "rgba(255,255,255,0.12)", "width": 0.5 } },
        });
        if let Some(title) = &self.colorbar_title {
            trace["colorbar"] = json!({ "title": { "text": title }, "thickness": 14, "len": 0.68 });
        }
        let mut geo = json!({
            "showframe": false,
            "showcoastlines": false,
            "projection": { "type": "natural earth" },
            "showland": true,
            "landcolor": "#1E293B",
            "showocean": true,
            "oceancolor": "#0F172A",
            "showcountries": true,
        });
        if let Some(land) = &self.land_color {
            geo["landcolor"] = json!(land);
        }
        json!({
            "data": [trace],
            "layout": {
                "title": { "text": self.title, "x": 0.01 },
                "geo": geo,
                "margin": { "l": 0, "r": 0, "t": 50, "b": 0 },
                "height": 520,
            }
        })
    }
}
