use macroscope::models::Series;
use macroscope::viz::types::{AxisSide, Dash};
use macroscope::viz::{ChartOptions, TraceInput, build_line_chart, html};

fn s(from: i32, to: i32, v: f64) -> Series {
    (from..=to).map(|y| (y, v)).collect()
}

#[test]
fn same_unit_stays_on_one_axis() {
    let a = TraceInput::new("United States", s(2015, 2023, 2.0), "% y/y");
    let b = TraceInput::new("Germany", s(2015, 2023, 1.5), "% y/y");
    let chart = build_line_chart(&[a, b], "CPI", ChartOptions::default());
    assert!(!chart.is_dual_axis());
    assert_eq!(chart.axes.len(), 1);
    assert_eq!(chart.axes[0].title, "% y/y");
    assert!(chart.traces.iter().all(|t| t.axis == AxisSide::Primary));
    assert!(chart.traces.iter().all(|t| t.fill.is_some()));
}

#[test]
fn second_unit_goes_to_the_secondary_axis() {
    let cpi = TraceInput::new("CPI Inflation", s(2015, 2023, 2.0), "% y/y");
    let brent = TraceInput::new("Brent Crude Oil", s(2015, 2023, 70.0), "USD/bbl");
    let rate = TraceInput::new("Policy rate", s(2015, 2023, 1.0), "%");
    let chart = build_line_chart(&[cpi, brent, rate], "Mix", ChartOptions::default());

    assert!(chart.is_dual_axis());
    assert_eq!(chart.axes[1].title, "USD/bbl");
    let sides: Vec<AxisSide> = chart.traces.iter().map(|t| t.axis).collect();
    assert_eq!(
        sides,
        [AxisSide::Primary, AxisSide::Secondary, AxisSide::Secondary]
    );
    // no fill under lines once two scales share the plot
    assert!(chart.traces.iter().all(|t| t.fill.is_none()));
}

#[test]
fn empty_traces_do_not_claim_an_axis() {
    let empty = TraceInput::new("Missing", Series::new(), "USD/bbl");
    let cpi = TraceInput::new("CPI", s(2020, 2023, 2.0), "% y/y");
    let chart = build_line_chart(&[empty, cpi], "CPI", ChartOptions::default());
    assert!(!chart.is_dual_axis());
    assert_eq!(chart.traces.len(), 1);
}

#[test]
fn legend_has_one_entry_per_non_empty_segment() {
    let hist = s(2015, 2023, 2.0);
    let with_fc = TraceInput::new("United States", hist.clone(), "% y/y").with_forecast(s(2024, 2028, 2.1));
    let only_hist = TraceInput::new("Germany", hist, "% y/y");
    let only_fc = TraceInput::new("Japan", Series::new(), "% y/y").with_forecast(s(2024, 2026, 1.0));
    let chart = build_line_chart(&[with_fc, only_hist, only_fc], "CPI", ChartOptions::default());

    let entries: Vec<(&str, Dash)> = chart
        .legend_entries()
        .map(|t| (t.name.as_str(), t.dash))
        .collect();
    assert_eq!(
        entries,
        [
            ("United States", Dash::Solid),
            ("United States (forecast)", Dash::Dot),
            ("Germany", Dash::Solid),
            ("Japan (forecast)", Dash::Dot),
        ]
    );
    // both segments of one label share colour and legend group
    assert_eq!(chart.traces[0].color, chart.traces[1].color);
    assert_eq!(chart.traces[0].legend_group, chart.traces[1].legend_group);
    assert_ne!(chart.traces[0].color, chart.traces[2].color);
}

#[test]
fn zero_and_target_lines_for_rates() {
    let cpi = TraceInput::new("CPI", s(2015, 2023, 2.0), "% y/y");
    let chart = build_line_chart(&[cpi], "CPI", ChartOptions { target: Some(2.0) });
    assert_eq!(chart.reference_lines.len(), 2);
    assert_eq!(chart.reference_lines[0].y, 0.0);
    assert_eq!(chart.reference_lines[1].annotation.as_deref(), Some("2%"));

    let oil = TraceInput::new("Brent", s(2015, 2023, 70.0), "USD/bbl");
    let chart = build_line_chart(&[oil], "Oil", ChartOptions::default());
    assert!(chart.reference_lines.is_empty());
}

#[test]
fn plotly_figure_and_html_page() {
    let cpi = TraceInput::new("CPI", s(2020, 2022, 2.0), "% y/y").with_color("#123456");
    let fig = build_line_chart(&[cpi], "Inflation </script>", ChartOptions::default()).to_plotly();
    assert_eq!(fig["data"][0]["x"], serde_json::json!([2020, 2021, 2022]));
    assert_eq!(fig["data"][0]["line"]["color"], "#123456");
    assert_eq!(fig["data"][0]["fillcolor"], "rgba(18,52,86,0.08)");
    assert_eq!(fig["layout"]["yaxis"]["title"]["text"], "% y/y");

    let page = html::page(&fig, "Inflation");
    assert!(page.contains("Plotly.newPlot"));
    assert!(!page.contains("</script>\"") && page.matches("</script>").count() == 2);

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("chart.json");
    html::save_figure(&fig, "Inflation", &json_path).unwrap();
    let back: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(back, fig);
}
