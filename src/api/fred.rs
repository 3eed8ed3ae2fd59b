//! FRED graph CSV download (no API key).
//!
//! `GET fredgraph.csv?id=DCOILBRENTEU` returns two columns, a date and a
//! value. The header name of the date column varies (`DATE`,
//! `observation_date`), so columns are read by position. Missing values are
//! written as `.`.

use super::{Provider, ProviderId, get_text, or_empty};
use crate::models::{Fetched, Series};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client as HttpClient;

#[derive(Debug, Clone)]
pub struct Fred {
    pub base_url: String,
    http: HttpClient,
}

impl Fred {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.to_string(),
            http,
        }
    }

    fn try_fetch(&self, code: &str) -> Result<Fetched> {
        let query = [("id".to_string(), code.trim().to_string())];
        let body = get_text(&self.http, &self.base_url, &query)?;
        parse_csv(&body).map(Fetched::historical)
    }
}

impl Provider for Fred {
    fn id(&self) -> ProviderId {
        ProviderId::Fred
    }

    fn fetch(&self, code: &str) -> Fetched {
        or_empty(self.id(), code, self.try_fetch(code))
    }
}

/// Parse a FRED `date,value` CSV and average it per calendar year.
pub fn parse_csv(body: &str) -> Result<Series> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());
    let mut obs = Vec::new();
    for rec in rdr.records() {
        let rec = rec.context("read FRED csv row")?;
        let (Some(d), Some(v)) = (rec.get(0), rec.get(1)) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d") else {
            continue;
        };
        if let Ok(x) = v.trim().parse::<f64>() {
            obs.push((date.year(), x));
        }
    }
    Ok(Series::annual_mean(obs))
}
