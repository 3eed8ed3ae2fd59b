use macroscope::models::Series;
use macroscope::stats::{Order, rank, summarize};
use std::collections::BTreeMap;

#[test]
fn summary_of_an_inflation_path() {
    let s: Series = [(2019, 1.8), (2020, 1.2), (2021, 4.7), (2022, 8.0), (2023, 4.1)]
        .into_iter()
        .collect();
    let sum = summarize("United States", "% y/y", &s);
    assert_eq!(sum.count, 5);
    assert_eq!(sum.latest, Some((2023, 4.1)));
    assert!((sum.change.unwrap() - (4.1 - 8.0)).abs() < 1e-9);
    assert_eq!(sum.peak, Some((2022, 8.0)));
    assert_eq!(sum.trough, Some((2020, 1.2)));
    assert!((sum.mean.unwrap() - 3.96).abs() < 1e-9);
    assert_eq!(sum.median, Some(4.1));
}

#[test]
fn change_needs_the_previous_year() {
    let gap: Series = [(2018, 1.0), (2020, 3.0)].into_iter().collect();
    let sum = summarize("x", "%", &gap);
    assert_eq!(sum.change, None);
    assert_eq!(sum.median, Some(2.0));
}

#[test]
fn empty_series_summary() {
    let sum = summarize("x", "%", &Series::new());
    assert_eq!(sum.count, 0);
    assert!(sum.latest.is_none() && sum.mean.is_none() && sum.median.is_none());
}

#[test]
fn ranking_top_and_bottom() {
    let mut v = BTreeMap::new();
    for (k, x) in [("ARG", 211.4), ("CHE", 2.1), ("DEU", 5.9), ("TUR", 53.9), ("JPN", 3.2)] {
        v.insert(k.to_string(), x);
    }
    let top = rank(&v, 2, Order::Top);
    assert_eq!(top, vec![("ARG".to_string(), 211.4), ("TUR".to_string(), 53.9)]);
    let bottom = rank(&v, 3, Order::Bottom);
    let codes: Vec<&str> = bottom.iter().map(|(c, _)| c.as_str()).collect();
    assert_eq!(codes, ["CHE", "JPN", "DEU"]);
    assert_eq!(rank(&v, 10, Order::Top).len(), 5);
}
