//! World Bank Indicators API (v2).
//!
//! `GET {base}/country/{iso3}/indicator/{id}?format=json&per_page=1000&page=N`
//! returns `[Meta, [Entry, ...]]`, or `[{"message": ...}]` on API errors.
//! Pages are followed until `meta.pages`.
//!
//! ### Notes
//! - The API sometimes serializes `per_page` as a **string**; both forms are accepted.
//! - Codes are `INDICATOR/COUNTRY`, e.g. `FP.CPI.TOTL.ZG/DEU`.

use super::{Provider, ProviderId, enc, get_text, or_empty};
use crate::models::{Fetched, Series};
use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;

/// Safety cap to avoid pathological jobs.
const MAX_PAGES: u32 = 50;

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub pages: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(|_| E::custom("negative value for u32"))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// Raw observation (position 1 array). Only the fields we use are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub countryiso3code: String,
    pub date: String,
    pub value: Option<f64>,
}

/// One decoded page.
#[derive(Debug, Clone)]
pub struct Page {
    pub meta: Meta,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
pub struct WorldBank {
    pub base_url: String,
    http: HttpClient,
}

impl WorldBank {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn try_fetch(&self, code: &str) -> Result<Fetched> {
        let (indicator, country) = code
            .split_once('/')
            .ok_or_else(|| anyhow!("expected INDICATOR/COUNTRY, got {code:?}"))?;
        let url = format!(
            "{}/country/{}/indicator/{}",
            self.base_url,
            enc(country),
            enc(indicator)
        );

        let mut page = 1u32;
        let mut entries = Vec::new();
        loop {
            if page > MAX_PAGES {
                bail!("page limit exceeded ({MAX_PAGES})");
            }
            let query = [
                ("format".to_string(), "json".to_string()),
                ("per_page".to_string(), "1000".to_string()),
                ("page".to_string(), page.to_string()),
            ];
            let body = get_text(&self.http, &url, &query)?;
            let p = parse_page(&body).with_context(|| format!("page {page} of {code}"))?;
            entries.extend(p.entries);
            if page >= p.meta.pages {
                break;
            }
            page += 1;
        }
        Ok(Fetched::historical(to_series(&entries)))
    }
}

impl Provider for WorldBank {
    fn id(&self) -> ProviderId {
        ProviderId::WorldBank
    }

    fn fetch(&self, code: &str) -> Fetched {
        or_empty(self.id(), code, self.try_fetch(code))
    }
}

/// Decode one response page. An API error payload is surfaced as an error;
/// a page without an entries array (no data) yields no entries.
pub fn parse_page(body: &str) -> Result<Page> {
    let v: Value = serde_json::from_str(body).context("decode json")?;
    let arr = v
        .as_array()
        .ok_or_else(|| anyhow!("unexpected response shape: not a top-level array"))?;
    let Some(head) = arr.first() else {
        bail!("unexpected response: empty array");
    };
    if head.get("message").is_some() {
        bail!("world bank api error: {head}");
    }
    let meta: Meta = serde_json::from_value(head.clone()).context("parse meta")?;
    let entries: Vec<Entry> = match arr.get(1) {
        Some(Value::Array(_)) => {
            serde_json::from_value(arr[1].clone()).context("parse entries")?
        }
        _ => Vec::new(),
    };
    Ok(Page { meta, entries })
}

/// Annual series from entries; null values and non-year dates are skipped.
pub fn to_series(entries: &[Entry]) -> Series {
    entries
        .iter()
        .filter_map(|e| Some((e.date.trim().parse::<i32>().ok()?, e.value?)))
        .filter(|(_, v)| v.is_finite())
        .collect::<Series>()
}
