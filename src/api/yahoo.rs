//! Yahoo Finance chart endpoint for equity benchmark indices.
//!
//! `GET {base}/{symbol}?interval=1mo&range=max` returns monthly closes as
//! parallel `timestamp` / `close` arrays; closes may be `null`.

use super::{Provider, ProviderId, enc, get_text, or_empty};
use crate::models::{Fetched, Series};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike};
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Envelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct Yahoo {
    pub base_url: String,
    http: HttpClient,
}

impl Yahoo {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn try_fetch(&self, symbol: &str) -> Result<Fetched> {
        let url = format!("{}/{}", self.base_url, enc(symbol));
        let query = [
            ("interval".to_string(), "1mo".to_string()),
            ("range".to_string(), "max".to_string()),
        ];
        let body = get_text(&self.http, &url, &query)?;
        parse_chart(&body).map(Fetched::historical)
    }
}

impl Provider for Yahoo {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn fetch(&self, code: &str) -> Fetched {
        or_empty(self.id(), code, self.try_fetch(code))
    }
}

/// Parse a chart payload into annual average closes.
pub fn parse_chart(body: &str) -> Result<Series> {
    let env: Envelope = serde_json::from_str(body).context("parse Yahoo chart json")?;
    if let Some(e) = env.chart.error {
        bail!("yahoo error {}: {}", e.code, e.description);
    }
    let Some(r) = env.chart.result.and_then(|mut v| (!v.is_empty()).then(|| v.swap_remove(0)))
    else {
        return Ok(Series::new());
    };
    let closes = r
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();
    let obs = r
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, c)| Some((DateTime::from_timestamp(*ts, 0)?.year(), c?)));
    Ok(Series::annual_mean(obs))
}
