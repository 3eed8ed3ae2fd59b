//! Standalone HTML output for Plotly figures.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Wrap a figure into a self-contained page that loads Plotly from its CDN.
pub fn page(figure: &Value, title: &str) -> String {
    // `</` inside the inline JSON would close the script element early
    let fig = figure.to_string().replace("</", "<\\/");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="figure" style="width:100%;height:100%;"></div>
<script>
const fig = {fig};
Plotly.newPlot("figure", fig.data, fig.layout, {{responsive: true}});
</script>
</body>
</html>
"#,
        title = escape(title),
    )
}

/// Write a figure as `.html` (standalone page) or, for any other extension,
/// pretty-printed Plotly JSON.
pub fn save_figure<P: AsRef<Path>>(figure: &Value, title: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
    let body = if is_html {
        page(figure, title)
    } else {
        serde_json::to_string_pretty(figure).context("serialize figure")?
    };
    std::fs::write(path, body).with_context(|| format!("write {}", path.display()))
}
