//! BIS statistics (SDMX REST, CSV output).
//!
//! Codes are `FLOW/KEY`, e.g. `WS_CBPOL/M.US` (policy rates) or
//! `WS_XRU/A.JP.JPY.A` (exchange rates). The CSV has one row per observation
//! with `TIME_PERIOD` and `OBS_VALUE` among many other columns.

use super::{Provider, ProviderId, enc_path, get_text, or_empty, period_year};
use crate::models::{Fetched, Series};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client as HttpClient;

#[derive(Debug, Clone)]
pub struct Bis {
    pub base_url: String,
    http: HttpClient,
}

impl Bis {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn try_fetch(&self, code: &str) -> Result<Fetched> {
        let url = format!("{}/{}", self.base_url, enc_path(code));
        let query = [
            ("format".to_string(), "csv".to_string()),
            ("detail".to_string(), "dataonly".to_string()),
        ];
        let body = get_text(&self.http, &url, &query)?;
        parse_sdmx_csv(&body).map(Fetched::historical)
    }
}

impl Provider for Bis {
    fn id(&self) -> ProviderId {
        ProviderId::Bis
    }

    fn fetch(&self, code: &str) -> Fetched {
        or_empty(self.id(), code, self.try_fetch(code))
    }
}

/// Parse SDMX CSV into an annual series. Blank or `NaN` cells are skipped.
pub fn parse_sdmx_csv(body: &str) -> Result<Series> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());
    let headers = rdr.headers().context("read SDMX CSV header")?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(t), Some(v)) = (col("TIME_PERIOD"), col("OBS_VALUE")) else {
        bail!("SDMX CSV without TIME_PERIOD/OBS_VALUE columns");
    };

    let mut obs = Vec::new();
    for rec in rdr.records() {
        let rec = rec.context("read SDMX CSV row")?;
        let (Some(period), Some(value)) = (rec.get(t), rec.get(v)) else {
            continue;
        };
        if let (Some(year), Ok(x)) = (period_year(period), value.trim().parse::<f64>()) {
            obs.push((year, x));
        }
    }
    Ok(Series::annual_mean(obs))
}
