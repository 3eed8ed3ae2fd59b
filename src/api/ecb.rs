//! ECB Data Portal (SDMX 2.1 REST, `format=jsondata`).
//!
//! Series codes are `FLOW/KEY`, e.g. `ICP/M.U2.N.000000.4.ANR`. The response
//! carries observations as `{"0": [value, status...], ...}` whose keys index
//! into the time-period dimension listed under `structure`.

use super::{Provider, ProviderId, enc_path, get_text, or_empty, period_year};
use crate::models::{Fetched, Lenient, Series};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    data_sets: Vec<DataSet>,
    structure: Structure,
}

#[derive(Debug, Deserialize)]
struct DataSet {
    #[serde(default)]
    series: BTreeMap<String, SeriesObs>,
}

#[derive(Debug, Deserialize)]
struct SeriesObs {
    #[serde(default)]
    observations: BTreeMap<String, Vec<Lenient>>,
}

#[derive(Debug, Deserialize)]
struct Structure {
    dimensions: Dimensions,
}

#[derive(Debug, Deserialize)]
struct Dimensions {
    #[serde(default)]
    observation: Vec<Dimension>,
}

#[derive(Debug, Deserialize)]
struct Dimension {
    id: String,
    values: Vec<DimValue>,
}

#[derive(Debug, Deserialize)]
struct DimValue {
    id: String,
}

#[derive(Debug, Clone)]
pub struct Ecb {
    pub base_url: String,
    http: HttpClient,
}

impl Ecb {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn try_fetch(&self, code: &str) -> Result<Fetched> {
        let url = format!("{}/{}", self.base_url, enc_path(code));
        let query = [("format".to_string(), "jsondata".to_string())];
        let body = get_text(&self.http, &url, &query)?;
        parse_sdmx_json(&body).map(Fetched::historical)
    }
}

impl Provider for Ecb {
    fn id(&self) -> ProviderId {
        ProviderId::Ecb
    }

    fn fetch(&self, code: &str) -> Fetched {
        or_empty(self.id(), code, self.try_fetch(code))
    }
}

/// Parse an SDMX-JSON data message into an annual series (sub-annual
/// observations averaged per year). Only the first series is read.
pub fn parse_sdmx_json(body: &str) -> Result<Series> {
    let msg: Message = serde_json::from_str(body).context("parse SDMX-JSON")?;
    let time = msg
        .structure
        .dimensions
        .observation
        .iter()
        .find(|d| d.id == "TIME_PERIOD")
        .or_else(|| msg.structure.dimensions.observation.first());
    let Some(time) = time else {
        bail!("SDMX-JSON without an observation dimension");
    };
    let Some(series) = msg.data_sets.first().and_then(|ds| ds.series.values().next()) else {
        return Ok(Series::new());
    };

    let obs = series.observations.iter().filter_map(|(idx, vals)| {
        let i = idx.split(':').next()?.parse::<usize>().ok()?;
        let year = period_year(&time.values.get(i)?.id)?;
        let v = vals.first()?.0?;
        Some((year, v))
    });
    Ok(Series::annual_mean(obs))
}
