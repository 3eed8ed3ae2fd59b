//! Synchronous clients for the public statistical providers.
//!
//! Every provider implements [`Provider`]: one code in, one annual series out.
//! `fetch` never fails. Transport errors, non-success HTTP statuses and parse
//! failures are logged and turned into an empty result; nothing is retried.
//!
//! | provider    | shape                                      |
//! |-------------|--------------------------------------------|
//! | `imf`       | DataMapper JSON keyed by country and year   |
//! | `ecb`       | SDMX-JSON observation arrays                |
//! | `eurostat`  | JSON-stat 2.0                               |
//! | `bis`       | SDMX CSV                                    |
//! | `worldbank` | `[meta, [entries]]`, paginated              |
//! | `fred`      | CSV of `date,value`                         |
//! | `yahoo`     | chart JSON with timestamps and closes       |

pub mod bis;
pub mod ecb;
pub mod eurostat;
pub mod fred;
pub mod imf;
pub mod worldbank;
pub mod yahoo;

use crate::config::{HttpSettings, Settings};
use crate::models::{CrossSection, Fetched};
use ahash::AHashMap;
use anyhow::{Context, Result, bail};
use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub use bis::Bis;
pub use ecb::Ecb;
pub use eurostat::Eurostat;
pub use fred::Fred;
pub use imf::ImfWeo;
pub use worldbank::WorldBank;
pub use yahoo::Yahoo;

/// Identifier of a data provider. Doubles as the provenance of assembled data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Imf,
    Ecb,
    Eurostat,
    Bis,
    WorldBank,
    Fred,
    Yahoo,
}

impl ProviderId {
    pub const ALL: [ProviderId; 7] = [
        ProviderId::Imf,
        ProviderId::Ecb,
        ProviderId::Eurostat,
        ProviderId::Bis,
        ProviderId::WorldBank,
        ProviderId::Fred,
        ProviderId::Yahoo,
    ];

    /// Provenance label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            ProviderId::Imf => "IMF WEO",
            ProviderId::Ecb => "ECB",
            ProviderId::Eurostat => "Eurostat",
            ProviderId::Bis => "BIS",
            ProviderId::WorldBank => "World Bank",
            ProviderId::Fred => "FRED",
            ProviderId::Yahoo => "Yahoo Finance",
        }
    }

    /// The outlook provider is the only one that publishes forecasts.
    pub fn is_outlook(self) -> bool {
        matches!(self, ProviderId::Imf)
    }

    /// Regional providers are consulted only when the caller prefers them.
    pub fn is_regional(self) -> bool {
        matches!(self, ProviderId::Ecb)
    }

    /// Market data refreshes faster than statistical releases.
    pub fn is_market(self) -> bool {
        matches!(self, ProviderId::Fred | ProviderId::Yahoo)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Common contract of all fetchers.
pub trait Provider {
    fn id(&self) -> ProviderId;

    /// Fetch one series. Never fails: any error yields an empty result.
    fn fetch(&self, code: &str) -> Fetched;

    /// All countries for one code in a single call, if the provider supports it.
    fn fetch_cross_section(&self, _code: &str) -> Option<CrossSection> {
        None
    }
}

/// Provider lookup by id.
#[derive(Default)]
pub struct Registry {
    providers: AHashMap<ProviderId, Box<dyn Provider>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All live HTTP providers configured from `settings`.
    pub fn live(settings: &Settings) -> Result<Self> {
        let http = build_http(&settings.http)?;
        let ep = &settings.endpoints;
        let mut reg = Self::new();
        reg.register(Box::new(ImfWeo::new(&ep.imf, http.clone())));
        reg.register(Box::new(Ecb::new(&ep.ecb, http.clone())));
        reg.register(Box::new(Eurostat::new(&ep.eurostat, http.clone())));
        reg.register(Box::new(Bis::new(&ep.bis, http.clone())));
        reg.register(Box::new(WorldBank::new(&ep.world_bank, http.clone())));
        reg.register(Box::new(Fred::new(&ep.fred, http.clone())));
        reg.register(Box::new(Yahoo::new(&ep.yahoo, http)));
        Ok(reg)
    }

    /// Register (or replace) the provider for its id.
    pub fn register(&mut self, provider: Box<dyn Provider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, id: ProviderId) -> Option<&dyn Provider> {
        self.providers.get(&id).map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Blocking HTTP client shared by all providers.
pub fn build_http(settings: &HttpSettings) -> Result<HttpClient> {
    HttpClient::builder()
        .timeout(settings.timeout())
        .connect_timeout(settings.connect_timeout())
        .redirect(Policy::limited(5))
        .user_agent(settings.user_agent.clone())
        .build()
        .context("build http client")
}

/// Single GET, no retry. Non-success statuses are errors.
pub(crate) fn get_text(http: &HttpClient, url: &str, query: &[(String, String)]) -> Result<String> {
    let resp = http
        .get(url)
        .query(query)
        .send()
        .with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("GET {url}: request failed with HTTP {status}");
    }
    resp.text().with_context(|| format!("read body of {url}"))
}

/// Log-and-swallow adapter turning a fallible fetch into the `Provider` contract.
pub(crate) fn or_empty(id: ProviderId, code: &str, res: Result<Fetched>) -> Fetched {
    match res {
        Ok(f) => {
            debug!("{id}: {code} -> {} annual values", f.series.len());
            f
        }
        Err(e) => {
            warn!("{id}: {code} unavailable: {e:#}");
            Fetched::empty()
        }
    }
}

// Allow -, _, . unescaped in codes (common for series keys)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Percent-encode one path segment.
pub(crate) fn enc(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment.trim(), SAFE).to_string()
}

/// Percent-encode each `/`-separated part, keeping the separators.
pub(crate) fn enc_path(path: &str) -> String {
    path.split('/').map(enc).collect::<Vec<_>>().join("/")
}

/// Split `dataset?k=v&k2=v2` into the dataset and its query pairs.
pub(crate) fn split_code(code: &str) -> (&str, Vec<(String, String)>) {
    match code.split_once('?') {
        Some((head, q)) => {
            let pairs = q
                .split('&')
                .filter(|kv| !kv.is_empty())
                .map(|kv| match kv.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (kv.to_string(), String::new()),
                })
                .collect();
            (head, pairs)
        }
        None => (code, Vec::new()),
    }
}

/// Calendar year of a provider period label (`2020`, `2020-03`, `2020-Q1`,
/// `2020-S2`, `2020-W07`, `2020-03-31`).
pub fn period_year(period: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{4})(?:$|[-\s]?(?:\d{2}|[QSWHM]\d{1,2}|\d{2}-\d{2})\s*$)")
            .expect("static regex")
    });
    re.captures(period)?.get(1)?.as_str().parse().ok()
}
