//! Runtime settings: HTTP client, cache TTLs, pacing, provider endpoints.
//!
//! Resolution order: built-in defaults, then an optional JSON file, then
//! `MACROSCOPE_*` environment variables. The CLI applies its own flags last.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpSettings,
    pub cache: CacheSettings,
    /// Delay between consecutive resolutions in a batch (rate-limit courtesy).
    pub pace_ms: u64,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// TTL for statistical series (IMF, ECB, Eurostat, BIS, World Bank).
    pub series_ttl_secs: u64,
    /// TTL for market data (FRED commodity prices, equity quotes).
    pub market_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub imf: String,
    pub ecb: String,
    pub eurostat: String,
    pub bis: String,
    pub world_bank: String,
    pub fred: String,
    pub yahoo: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            cache: CacheSettings::default(),
            pace_ms: 0,
            endpoints: Endpoints::default(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!("macroscope/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            series_ttl_secs: 86_400,
            market_ttl_secs: 3_600,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            imf: "https://www.imf.org/external/datamapper/api/v1".into(),
            ecb: "https://data-api.ecb.europa.eu/service/data".into(),
            eurostat: "https://ec.europa.eu/eurostat/api/dissemination/statistics/1.0/data"
                .into(),
            bis: "https://stats.bis.org/api/v1/data".into(),
            world_bank: "https://api.worldbank.org/v2".into(),
            fred: "https://fred.stlouisfed.org/graph/fredgraph.csv".into(),
            yahoo: "https://query1.finance.yahoo.com/v8/finance/chart".into(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl CacheSettings {
    pub fn series_ttl(&self) -> Duration {
        Duration::from_secs(self.series_ttl_secs)
    }

    pub fn market_ttl(&self) -> Duration {
        Duration::from_secs(self.market_ttl_secs)
    }
}

impl Settings {
    /// Defaults, optionally overlaid with a JSON file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => {
                let txt = std::fs::read_to_string(p)
                    .with_context(|| format!("read config {}", p.display()))?;
                serde_json::from_str(&txt)
                    .with_context(|| format!("parse config {}", p.display()))?
            }
            None => Settings::default(),
        };
        settings.apply_env(|k| std::env::var(k).ok())?;
        Ok(settings)
    }

    /// Apply `MACROSCOPE_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let num = |key: &str| -> Result<Option<u64>> {
            match lookup(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .with_context(|| format!("{key} must be a non-negative integer, got {v:?}")),
                None => Ok(None),
            }
        };
        if let Some(v) = num("MACROSCOPE_CACHE_TTL_SECS")? {
            self.cache.series_ttl_secs = v;
        }
        if let Some(v) = num("MACROSCOPE_MARKET_TTL_SECS")? {
            self.cache.market_ttl_secs = v;
        }
        if let Some(v) = num("MACROSCOPE_PACE_MS")? {
            self.pace_ms = v;
        }
        if let Some(v) = num("MACROSCOPE_HTTP_TIMEOUT_SECS")? {
            self.http.timeout_secs = v;
        }
        Ok(())
    }

    pub fn pace(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let s: Settings = serde_json::from_str(r#"{"pace_ms": 250, "cache": {"market_ttl_secs": 60}}"#)
            .unwrap();
        assert_eq!(s.pace_ms, 250);
        assert_eq!(s.cache.market_ttl_secs, 60);
        assert_eq!(s.cache.series_ttl_secs, 86_400);
        assert_eq!(s.http.timeout_secs, 30);
        assert!(s.endpoints.imf.starts_with("https://www.imf.org"));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MACROSCOPE_CACHE_TTL_SECS", "10"),
            ("MACROSCOPE_PACE_MS", "5"),
        ]
        .into_iter()
        .collect();
        let mut s = Settings::default();
        s.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(s.cache.series_ttl_secs, 10);
        assert_eq!(s.pace_ms, 5);
        assert_eq!(s.cache.market_ttl_secs, 3_600);
    }

    #[test]
    fn env_rejects_garbage() {
        let mut s = Settings::default();
        let err = s
            .apply_env(|k| (k == "MACROSCOPE_PACE_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("MACROSCOPE_PACE_MS"));
    }
}
