//! Fallback-chain interpreter over the indicator table.
//!
//! For one (country, indicator) pair the [`Assembler`] walks the indicator's
//! [`SourceSpec`] list in declared order and keeps the first source whose
//! historical part is non-empty. Provider responses, assembled results and
//! cross-country snapshots are each held in a [`TtlCache`].

use crate::api::{ProviderId, Registry};
use crate::cache::TtlCache;
use crate::catalog::{self, Country, Indicator, SourceSpec, Transform};
use crate::config::Settings;
use crate::error::ValidationError;
use crate::models::{
    Assembled, CrossSection, Fetched, Provenance, Series, Snapshot, YearRange,
    default_last_actual,
};
use log::{debug, info, warn};
use serde::Serialize;
use std::time::Duration;

/// Caller options for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Query {
    pub range: YearRange,
    /// Consult regional (ECB) sources; skipped otherwise.
    pub prefer_regional: bool,
    /// Keep the outlook provider's projections past the last-actual year.
    pub include_forecast: bool,
}

impl Query {
    pub fn new(range: YearRange) -> Self {
        Self {
            range,
            prefer_regional: false,
            include_forecast: false,
        }
    }

    pub fn with_forecast(mut self, on: bool) -> Self {
        self.include_forecast = on;
        self
    }

    pub fn prefer_regional(mut self, on: bool) -> Self {
        self.prefer_regional = on;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FetchKey {
    provider: ProviderId,
    code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolveKey {
    /// `None` for global indicators, whose result does not depend on the country.
    country: Option<&'static str>,
    indicator: &'static str,
    query: Query,
}

/// A resolved pair with the legend label chosen for the batch.
#[derive(Debug, Clone, Serialize)]
pub struct LabeledResult {
    pub label: String,
    pub country: &'static str,
    pub indicator: &'static str,
    pub indicator_name: &'static str,
    #[serde(flatten)]
    pub result: Assembled,
}

pub struct Assembler {
    registry: Registry,
    fetches: TtlCache<FetchKey, Fetched>,
    results: TtlCache<ResolveKey, Assembled>,
    sections: TtlCache<FetchKey, CrossSection>,
    series_ttl: Duration,
    market_ttl: Duration,
    pace: Duration,
}

impl Assembler {
    /// Assembler with explicit TTLs for statistical and market data.
    pub fn new(registry: Registry, series_ttl: Duration, market_ttl: Duration) -> Self {
        Self {
            registry,
            fetches: TtlCache::new(series_ttl),
            results: TtlCache::new(series_ttl),
            sections: TtlCache::new(series_ttl),
            series_ttl,
            market_ttl,
            pace: Duration::ZERO,
        }
    }

    pub fn from_settings(registry: Registry, settings: &Settings) -> Self {
        Self::new(
            registry,
            settings.cache.series_ttl(),
            settings.cache.market_ttl(),
        )
        .with_pace(settings.pace())
    }

    /// Fixed delay between consecutive resolutions of a batch.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Drop every cached response and result.
    pub fn clear_cache(&mut self) {
        self.fetches.clear();
        self.results.clear();
        self.sections.clear();
    }

    fn ttl_for(&self, provider: ProviderId) -> Duration {
        if provider.is_market() {
            self.market_ttl
        } else {
            self.series_ttl
        }
    }

    /// Resolve one (country, indicator) pair through the fallback chain.
    ///
    /// Never fails: when no source has data the result is empty, carries the
    /// indicator's default unit and provenance [`Provenance::None`].
    pub fn resolve(&mut self, country: &Country, indicator: &Indicator, query: &Query) -> Assembled {
        let scoped = (!indicator.is_global()).then_some(country);
        self.resolve_scoped(scoped, indicator, query)
    }

    /// Resolve a global indicator without naming a country. Country-scoped
    /// indicators have no country to fill their codes and come back empty.
    pub fn resolve_global(&mut self, indicator: &Indicator, query: &Query) -> Assembled {
        self.resolve_scoped(None, indicator, query)
    }

    fn resolve_scoped(
        &mut self,
        scoped: Option<&Country>,
        indicator: &Indicator,
        query: &Query,
    ) -> Assembled {
        let key = ResolveKey {
            country: scoped.map(|c| c.name),
            indicator: indicator.id,
            query: *query,
        };
        if let Some(hit) = self.results.get(&key) {
            debug!("cache hit: {} / {}", scoped.map_or("world", |c| c.name), indicator.id);
            return hit.clone();
        }

        let out = self.walk(scoped, indicator, query);
        let ttl = match out.provenance {
            Provenance::Source(p) => self.ttl_for(p),
            Provenance::None => self.series_ttl.min(self.market_ttl),
        };
        info!(
            "{} / {} -> {} ({} values)",
            scoped.map_or("world", |c| c.name),
            indicator.id,
            out.provenance,
            out.historical.len() + out.forecast.len()
        );
        self.results.insert_with_ttl(key, out.clone(), ttl);
        out
    }

    fn walk(&mut self, country: Option<&Country>, indicator: &Indicator, query: &Query) -> Assembled {
        for spec in indicator.sources {
            if spec.provider.is_regional() && !query.prefer_regional {
                continue;
            }
            let Some(code) = spec.code_for(country) else {
                continue;
            };
            let Some(fetched) = self.fetch(spec.provider, &code) else {
                continue;
            };
            let candidate = shape(spec, fetched, query);
            if !candidate.historical.is_empty() {
                return candidate;
            }
            debug!("{}: {code} has no historical data in range", spec.provider);
        }
        Assembled::empty(indicator.unit)
    }

    fn fetch(&mut self, provider: ProviderId, code: &str) -> Option<Fetched> {
        let key = FetchKey {
            provider,
            code: code.to_string(),
        };
        if let Some(hit) = self.fetches.get(&key) {
            return Some(hit.clone());
        }
        let Some(p) = self.registry.get(provider) else {
            warn!("{provider}: not registered, skipping {code}");
            return None;
        };
        let fetched = p.fetch(code);
        let ttl = self.ttl_for(provider);
        self.fetches.insert_with_ttl(key, fetched.clone(), ttl);
        Some(fetched)
    }

    /// Resolve catalog entries by name.
    pub fn resolve_by_name(
        &mut self,
        country: &str,
        indicator: &str,
        query: &Query,
    ) -> Result<Assembled, ValidationError> {
        let c = catalog::country(country)?;
        let i = catalog::indicator(indicator)?;
        Ok(self.resolve(c, i, query))
    }

    /// Resolve every selected pair, sequentially and in selection order
    /// (countries outer, indicators inner). Global indicators are resolved
    /// once per batch.
    pub fn resolve_batch<C, I>(
        &mut self,
        countries: &[C],
        indicators: &[I],
        query: &Query,
    ) -> Result<Vec<LabeledResult>, ValidationError>
    where
        C: AsRef<str>,
        I: AsRef<str>,
    {
        if countries.is_empty() {
            return Err(ValidationError::EmptySelection("country"));
        }
        if indicators.is_empty() {
            return Err(ValidationError::EmptySelection("indicator"));
        }
        let cs = countries
            .iter()
            .map(|c| catalog::country(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let is = indicators
            .iter()
            .map(|i| catalog::indicator(i.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut pairs: Vec<(&'static Country, &'static Indicator)> = Vec::new();
        for &c in &cs {
            for &i in &is {
                if i.is_global() && pairs.iter().any(|(_, seen)| seen.id == i.id) {
                    continue;
                }
                pairs.push((c, i));
            }
        }

        let one_country = cs.len() == 1;
        let one_indicator = is.len() == 1;
        let mut out = Vec::with_capacity(pairs.len());
        for (n, (c, i)) in pairs.into_iter().enumerate() {
            if n > 0 && !self.pace.is_zero() {
                std::thread::sleep(self.pace);
            }
            let result = self.resolve(c, i, query);
            out.push(LabeledResult {
                label: make_label(c, i, one_country, one_indicator),
                country: c.name,
                indicator: i.id,
                indicator_name: i.name,
                result,
            });
        }
        Ok(out)
    }

    /// Cross-country values of `indicator` for `year`, from the first source
    /// whose provider publishes whole cross sections.
    pub fn snapshot(&mut self, indicator: &Indicator, year: i32) -> Snapshot {
        for spec in indicator.sources {
            let key = FetchKey {
                provider: spec.provider,
                code: spec.template.to_string(),
            };
            let cached = self.sections.get(&key).cloned();
            let cs = match cached {
                Some(hit) => hit,
                None => {
                    let Some(p) = self.registry.get(spec.provider) else {
                        continue;
                    };
                    // A failed request is remembered as an empty section.
                    let fresh = p.fetch_cross_section(spec.template).unwrap_or_default();
                    let ttl = self.ttl_for(spec.provider);
                    self.sections.insert_with_ttl(key, fresh.clone(), ttl);
                    fresh
                }
            };
            if cs.by_country.is_empty() {
                continue;
            }
            let values = CrossSection {
                by_country: cs
                    .by_country
                    .iter()
                    .map(|(iso, s)| (iso.clone(), apply(spec.transform, s.clone())))
                    .collect(),
                last_actual: cs.last_actual,
            }
            .year(year);
            return Snapshot {
                year,
                values,
                last_actual: cs.last_actual,
                provenance: Provenance::Source(spec.provider),
            };
        }
        Snapshot::empty(year)
    }
}

fn apply(transform: Transform, series: Series) -> Series {
    match transform {
        Transform::None => series,
        Transform::YoyPercent => series.yoy_percent(),
    }
}

// Turn one provider response into a candidate result.
fn shape(spec: &SourceSpec, fetched: Fetched, query: &Query) -> Assembled {
    let series = apply(spec.transform, fetched.series);
    let (historical, forecast, last_actual) = if spec.provider.is_outlook() {
        let la = fetched.last_actual.unwrap_or_else(default_last_actual);
        let (hist, fc) = series.split_after(la);
        let fc = if query.include_forecast {
            fc.clip(query.range)
        } else {
            Series::new()
        };
        (hist.clip(query.range), fc, Some(la))
    } else {
        (series.clip(query.range), Series::new(), None)
    };
    Assembled {
        historical,
        forecast,
        unit: spec.unit.to_string(),
        provenance: Provenance::Source(spec.provider),
        last_actual,
    }
}

/// Shorter legend labels when possible:
/// - one indicator across many countries -> country name only
/// - one country across many indicators -> indicator name only
/// - global indicators -> indicator name only
/// - otherwise "Country — Indicator"
pub fn make_label(
    country: &Country,
    indicator: &Indicator,
    one_country: bool,
    one_indicator: bool,
) -> String {
    if indicator.is_global() || (one_country && !one_indicator) {
        indicator.name.to_string()
    } else if one_indicator && !one_country {
        country.name.to_string()
    } else {
        format!("{} — {}", country.name, indicator.name)
    }
}
