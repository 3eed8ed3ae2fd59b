//! Eurostat dissemination API (JSON-stat 2.0).
//!
//! Codes are `dataset?dim=value&...`, e.g.
//! `prc_hicp_aind?geo=DE&unit=RCH_A&coicop=CP00`. Every non-time dimension
//! must be pinned to one value so the flat value index equals the time index.

use super::{Provider, ProviderId, enc, get_text, or_empty, period_year, split_code};
use crate::models::{Fetched, Lenient, Series};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct Dataset {
    /// Either a sparse object `{"3": 1.2}` or a dense array.
    value: Value,
    id: Vec<String>,
    size: Vec<usize>,
    dimension: BTreeMap<String, DimensionDef>,
}

#[derive(Debug, Deserialize)]
struct DimensionDef {
    category: Category,
}

#[derive(Debug, Deserialize)]
struct Category {
    index: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct Eurostat {
    pub base_url: String,
    http: HttpClient,
}

impl Eurostat {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn try_fetch(&self, code: &str) -> Result<Fetched> {
        let (dataset, mut query) = split_code(code);
        query.push(("format".into(), "JSON".into()));
        query.push(("lang".into(), "EN".into()));
        let url = format!("{}/{}", self.base_url, enc(dataset));
        let body = get_text(&self.http, &url, &query)?;
        parse_json_stat(&body).map(Fetched::historical)
    }
}

impl Provider for Eurostat {
    fn id(&self) -> ProviderId {
        ProviderId::Eurostat
    }

    fn fetch(&self, code: &str) -> Fetched {
        or_empty(self.id(), code, self.try_fetch(code))
    }
}

/// Parse a JSON-stat 2.0 dataset with a single free `time` dimension.
pub fn parse_json_stat(body: &str) -> Result<Series> {
    let ds: Dataset = serde_json::from_str(body).context("parse JSON-stat")?;
    let Some(pos) = ds.id.iter().position(|d| d == "time") else {
        bail!("JSON-stat dataset without a time dimension");
    };
    let other: usize = ds
        .size
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != pos)
        .map(|(_, n)| *n)
        .product();
    if other != 1 {
        bail!("JSON-stat dataset is not a single series ({other} combinations besides time)");
    }
    let Some(time) = ds.dimension.get("time") else {
        bail!("JSON-stat dataset without time categories");
    };
    // index position -> period label
    let labels: BTreeMap<usize, &str> = time
        .category
        .index
        .iter()
        .map(|(label, i)| (*i, label.as_str()))
        .collect();

    let cells: Vec<(usize, Option<f64>)> = match &ds.value {
        Value::Object(m) => m
            .iter()
            .filter_map(|(k, v)| Some((k.parse().ok()?, Lenient::deserialize(v).ok()?.0)))
            .collect(),
        Value::Array(a) => a
            .iter()
            .enumerate()
            .map(|(i, v)| (i, Lenient::deserialize(v).ok().and_then(|l| l.0)))
            .collect(),
        _ => bail!("JSON-stat value is neither object nor array"),
    };

    let obs = cells.into_iter().filter_map(|(i, v)| {
        let year = period_year(labels.get(&i)?)?;
        Some((year, v?))
    });
    Ok(Series::annual_mean(obs))
}
