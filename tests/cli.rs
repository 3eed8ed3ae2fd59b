use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("macroscope").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("series"))
        .stdout(predicate::str::contains("catalog"));
}

#[test]
fn catalog_lists_indicators_and_countries() {
    let mut cmd = Command::cargo_bin("macroscope").unwrap();
    cmd.arg("catalog");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("cpi"))
        .stdout(predicate::str::contains("IMF WEO > ECB > Eurostat > World Bank"))
        .stdout(predicate::str::contains("United States"));
}

#[test]
fn catalog_flags_indicators_with_projections() {
    let out = Command::cargo_bin("macroscope")
        .unwrap()
        .arg("catalog")
        .output()
        .unwrap();
    let stdout = String::from_utf8(out.stdout).unwrap();
    let line = |id: &str| {
        stdout
            .lines()
            .find(|l| l.trim_start().starts_with(&format!("{id} ")))
            .unwrap()
            .to_string()
    };
    assert!(line("cpi").contains("[forecast]"));
    assert!(line("gdp_growth").contains("[forecast]"));
    assert!(!line("brent").contains("[forecast]"));
    assert!(!line("policy_rate").contains("[forecast]"));
}

#[test]
fn inverted_range_is_rejected_before_fetching() {
    let mut cmd = Command::cargo_bin("macroscope").unwrap();
    cmd.args([
        "series",
        "--countries",
        "Germany",
        "--indicators",
        "cpi",
        "--date",
        "2020:2010",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("start year 2020 must be before end year 2010"));
}

#[test]
fn unknown_indicator_for_map() {
    let mut cmd = Command::cargo_bin("macroscope").unwrap();
    cmd.args(["map", "--indicator", "happiness"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown indicator: happiness"));
}

#[test]
fn letter_generator_cancels_on_closed_input() {
    let mut cmd = assert_cmd::Command::cargo_bin("engagement-letter").unwrap();
    cmd.write_stdin("Jane Consulting SAS\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn series_online_cpi() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cpi.csv");
    let mut cmd = Command::cargo_bin("macroscope").unwrap();
    cmd.args([
        "series",
        "--countries",
        "United States,Germany",
        "--indicators",
        "cpi",
        "--date",
        "2015:2023",
        "--stats",
        "--locale",
        "de",
        "--out",
    ])
    .arg(&out);
    cmd.assert().success();
    let txt = std::fs::read_to_string(&out).unwrap();
    assert!(txt.starts_with("year,United States,Germany"));
}

#[cfg(feature = "online")]
#[test]
fn map_online_brent() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("brent.json");
    let mut cmd = Command::cargo_bin("macroscope").unwrap();
    cmd.args(["map", "--indicator", "brent", "--year", "2023", "--out"])
        .arg(&out);
    cmd.assert().success();
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v["data"][0]["type"], "choropleth");
}
