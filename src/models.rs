use crate::api::ProviderId;
use crate::error::ValidationError;
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

/// Inclusive calendar-year window used when clipping series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Validate and build a range. `start` must be strictly before `end`.
    pub fn new(start: i32, end: i32) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

/// Default "last actual" year when a provider does not report one.
pub fn default_last_actual() -> i32 {
    Local::now().year() - 1
}

/// Annual time series: calendar year -> value, unique years, ascending order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(BTreeMap<i32, f64>);

impl Series {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build from `(year, value)` pairs. A repeated year keeps the last value.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    /// Average dated observations per calendar year (daily/monthly -> annual).
    /// Non-finite values are dropped.
    pub fn annual_mean(observations: impl IntoIterator<Item = (i32, f64)>) -> Self {
        let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for (year, v) in observations {
            if !v.is_finite() {
                continue;
            }
            let e = sums.entry(year).or_insert((0.0, 0));
            e.0 += v;
            e.1 += 1;
        }
        Self(
            sums.into_iter()
                .map(|(y, (sum, n))| (y, sum / n as f64))
                .collect(),
        )
    }

    pub fn insert(&mut self, year: i32, value: f64) {
        self.0.insert(year, value);
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.0.get(&year).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.0.iter().map(|(y, v)| (*y, *v))
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied()
    }

    pub fn first(&self) -> Option<(i32, f64)> {
        self.0.first_key_value().map(|(y, v)| (*y, *v))
    }

    pub fn last(&self) -> Option<(i32, f64)> {
        self.0.last_key_value().map(|(y, v)| (*y, *v))
    }

    /// Highest value with its year (earliest year wins ties).
    pub fn peak(&self) -> Option<(i32, f64)> {
        self.iter()
            .fold(None, |best: Option<(i32, f64)>, (y, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((y, v)),
            })
    }

    /// Lowest value with its year (earliest year wins ties).
    pub fn trough(&self) -> Option<(i32, f64)> {
        self.iter()
            .fold(None, |best: Option<(i32, f64)>, (y, v)| match best {
                Some((_, b)) if b <= v => best,
                _ => Some((y, v)),
            })
    }

    /// Keep only years inside `range` (inclusive).
    pub fn clip(&self, range: YearRange) -> Series {
        Self(
            self.0
                .range(range.start..=range.end)
                .map(|(y, v)| (*y, *v))
                .collect(),
        )
    }

    /// Split into (`year <= cut`, `year > cut`).
    pub fn split_after(&self, cut: i32) -> (Series, Series) {
        let head = self.0.range(..=cut).map(|(y, v)| (*y, *v)).collect();
        let tail = self
            .0
            .range((Excluded(cut), Unbounded))
            .map(|(y, v)| (*y, *v))
            .collect();
        (Self(head), Self(tail))
    }

    /// Year-over-year percent change of an index level series.
    ///
    /// Emitted only for years whose previous year exists with a non-zero value.
    pub fn yoy_percent(&self) -> Series {
        let mut out = BTreeMap::new();
        for (y, v) in self.iter() {
            if let Some(prev) = self.get(y - 1)
                && prev != 0.0
            {
                out.insert(y, (v / prev - 1.0) * 100.0);
            }
        }
        Self(out)
    }

    /// Union of two series; on overlapping years `other` wins.
    pub fn union(&self, other: &Series) -> Series {
        let mut out = self.0.clone();
        out.extend(other.0.iter().map(|(y, v)| (*y, *v)));
        Self(out)
    }
}

impl FromIterator<(i32, f64)> for Series {
    fn from_iter<T: IntoIterator<Item = (i32, f64)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

/// What a single provider call produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fetched {
    pub series: Series,
    /// Last observed (non-projected) year, reported by outlook providers.
    pub last_actual: Option<i32>,
}

impl Fetched {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn historical(series: Series) -> Self {
        Self {
            series,
            last_actual: None,
        }
    }
}

/// Which provider populated an assembled result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Source(ProviderId),
    None,
}

impl Provenance {
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Source(p) => p.label(),
            Provenance::None => "none",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Outcome of resolving one (country, indicator) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assembled {
    pub historical: Series,
    pub forecast: Series,
    pub unit: String,
    pub provenance: Provenance,
    pub last_actual: Option<i32>,
}

impl Assembled {
    /// Result when no configured provider had data.
    pub fn empty(unit: &str) -> Self {
        Self {
            historical: Series::new(),
            forecast: Series::new(),
            unit: unit.to_string(),
            provenance: Provenance::None,
            last_actual: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.historical.is_empty() && self.forecast.is_empty()
    }

    /// Historical and forecast values merged into one series.
    pub fn combined(&self) -> Series {
        self.historical.union(&self.forecast)
    }
}

/// Cross-country values for one indicator, used by the map builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    /// ISO3 (or provider area code) -> annual series.
    pub by_country: BTreeMap<String, Series>,
    pub last_actual: Option<i32>,
}

impl CrossSection {
    /// Values of every country that has an observation in `year`.
    pub fn year(&self, year: i32) -> BTreeMap<String, f64> {
        self.by_country
            .iter()
            .filter_map(|(code, s)| s.get(year).map(|v| (code.clone(), v)))
            .collect()
    }
}

/// One year of an indicator across countries, ready for a choropleth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub year: i32,
    /// ISO3 -> value; countries without an observation are absent.
    pub values: BTreeMap<String, f64>,
    pub last_actual: Option<i32>,
    pub provenance: Provenance,
}

impl Snapshot {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            values: BTreeMap::new(),
            last_actual: None,
            provenance: Provenance::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `year` lies past the last observed year (a projection).
    pub fn is_forecast(&self) -> bool {
        self.last_actual.is_some_and(|la| self.year > la)
    }
}

/// Numeric cell that some providers serialize as a number and others as a
/// string (`"1.5"`, `"no data"`, `"."`). Unparseable text becomes `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lenient(pub Option<f64>);

impl<'de> Deserialize<'de> for Lenient {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        struct LenientVisitor;

        impl<'de> Visitor<'de> for LenientVisitor {
            type Value = Lenient;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a number, a numeric string, or null")
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Lenient(Some(v).filter(|x| x.is_finite())))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Lenient(Some(v as f64)))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Lenient(Some(v as f64)))
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Lenient(
                    s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
                ))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Lenient(None))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Lenient(None))
            }
        }

        deserializer.deserialize_any(LenientVisitor)
    }
}
