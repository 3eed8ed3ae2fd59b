//! IMF World Economic Outlook via the DataMapper API.
//!
//! `GET {base}/{indicator}/{country}` returns
//! `{"values": {"PCPIPCH": {"USA": {"1980": 13.5, ...}}}, "info": {...}}`.
//! Values past the last-actual year are WEO projections. Omitting the country
//! returns every country in one payload (used for maps).

use super::{Provider, ProviderId, enc, get_text, or_empty};
use crate::models::{CrossSection, Fetched, Lenient, Series, default_last_actual};
use anyhow::{Context, Result, anyhow};
use log::warn;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    values: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    info: BTreeMap<String, Info>,
}

#[derive(Debug, Deserialize)]
struct Info {
    #[serde(rename = "lastActual", default)]
    last_actual: Option<Lenient>,
}

#[derive(Debug, Clone)]
pub struct ImfWeo {
    pub base_url: String,
    http: HttpClient,
}

impl ImfWeo {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Code format: `INDICATOR/COUNTRY`, e.g. `PCPIPCH/USA`.
    fn try_fetch(&self, code: &str) -> Result<Fetched> {
        let (indicator, country) = code
            .split_once('/')
            .ok_or_else(|| anyhow!("expected INDICATOR/COUNTRY, got {code:?}"))?;
        let url = format!("{}/{}/{}", self.base_url, enc(indicator), enc(country));
        let body = get_text(&self.http, &url, &[])?;
        parse_country(&body, indicator, country)
    }

    fn try_cross_section(&self, indicator: &str) -> Result<CrossSection> {
        let url = format!("{}/{}", self.base_url, enc(indicator));
        let body = get_text(&self.http, &url, &[])?;
        parse_all(&body, indicator)
    }
}

impl Provider for ImfWeo {
    fn id(&self) -> ProviderId {
        ProviderId::Imf
    }

    fn fetch(&self, code: &str) -> Fetched {
        let mut fetched = or_empty(self.id(), code, self.try_fetch(code));
        if fetched.last_actual.is_none() {
            fetched.last_actual = Some(default_last_actual());
        }
        fetched
    }

    fn fetch_cross_section(&self, code: &str) -> Option<CrossSection> {
        // Map requests name only the indicator; tolerate a country suffix.
        let indicator = code.split('/').next().unwrap_or(code);
        match self.try_cross_section(indicator) {
            Ok(cs) => Some(cs),
            Err(e) => {
                warn!("{}: cross-section {indicator} unavailable: {e:#}", self.id());
                None
            }
        }
    }
}

// Anything that is not a whole calendar year counts as missing.
fn last_actual(p: &Payload, indicator: &str) -> Option<i32> {
    p.info
        .get(indicator)
        .and_then(|i| i.last_actual)
        .and_then(|l| l.0)
        .filter(|y| y.fract() == 0.0 && (1900.0..=2200.0).contains(y))
        .map(|y| y as i32)
}

// Country entries are `{year: value}` objects; anything else carries no data.
fn to_series(years: &Value) -> Series {
    let Some(obj) = years.as_object() else {
        return Series::new();
    };
    obj.iter()
        .filter_map(|(y, v)| {
            let year = y.trim().parse::<i32>().ok()?;
            let value = Lenient::deserialize(v).ok()?.0?;
            Some((year, value))
        })
        .collect()
}

/// Parse a single-country payload. A missing country or indicator yields an
/// empty series; the last-actual year falls back to current year minus one.
pub fn parse_country(body: &str, indicator: &str, country: &str) -> Result<Fetched> {
    let p: Payload = serde_json::from_str(body).context("parse IMF DataMapper json")?;
    let series = p
        .values
        .get(indicator)
        .and_then(|by_country| by_country.get(country))
        .map(to_series)
        .unwrap_or_default();
    Ok(Fetched {
        series,
        last_actual: Some(last_actual(&p, indicator).unwrap_or_else(default_last_actual)),
    })
}

/// Parse an all-countries payload. Countries without any numeric value are dropped.
pub fn parse_all(body: &str, indicator: &str) -> Result<CrossSection> {
    let p: Payload = serde_json::from_str(body).context("parse IMF DataMapper json")?;
    let by_country = p
        .values
        .get(indicator)
        .map(|m| {
            m.iter()
                .map(|(iso, years)| (iso.clone(), to_series(years)))
                .filter(|(_, s)| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    Ok(CrossSection {
        by_country,
        last_actual: Some(last_actual(&p, indicator).unwrap_or_else(default_last_actual)),
    })
}
