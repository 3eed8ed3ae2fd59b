use macroscope::api::{Provider, ProviderId, Registry};
use macroscope::catalog;
use macroscope::models::{CrossSection, Fetched, Provenance, Series, YearRange};
use macroscope::{Assembler, Query, ValidationError};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

type CallLog = Rc<RefCell<Vec<(ProviderId, String)>>>;

/// Canned responses keyed by code; every call is logged.
struct Mock {
    id: ProviderId,
    data: HashMap<String, Fetched>,
    section: Option<CrossSection>,
    calls: CallLog,
}

impl Mock {
    fn new(id: ProviderId, calls: &CallLog) -> Self {
        Self {
            id,
            data: HashMap::new(),
            section: None,
            calls: calls.clone(),
        }
    }

    fn with(mut self, code: &str, fetched: Fetched) -> Self {
        self.data.insert(code.to_string(), fetched);
        self
    }

    fn with_section(mut self, cs: CrossSection) -> Self {
        self.section = Some(cs);
        self
    }
}

impl Provider for Mock {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn fetch(&self, code: &str) -> Fetched {
        self.calls.borrow_mut().push((self.id, code.to_string()));
        self.data.get(code).cloned().unwrap_or_default()
    }

    fn fetch_cross_section(&self, code: &str) -> Option<CrossSection> {
        self.calls.borrow_mut().push((self.id, format!("section:{code}")));
        self.section.clone()
    }
}

fn years(from: i32, to: i32, value: f64) -> Series {
    (from..=to).map(|y| (y, value + f64::from(y - from))).collect()
}

fn outlook(series: Series, last_actual: i32) -> Fetched {
    Fetched {
        series,
        last_actual: Some(last_actual),
    }
}

fn assembler(providers: Vec<Mock>) -> Assembler {
    let mut reg = Registry::new();
    for p in providers {
        reg.register(Box::new(p));
    }
    Assembler::new(reg, Duration::from_secs(3600), Duration::from_secs(600))
}

fn range(start: i32, end: i32) -> Query {
    Query::new(YearRange::new(start, end).unwrap())
}

fn called(calls: &CallLog, id: ProviderId) -> usize {
    calls.borrow().iter().filter(|(p, _)| *p == id).count()
}

#[test]
fn primary_source_sets_provenance() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Imf, &calls).with("PCPIPCH/USA", outlook(years(2000, 2029, 1.0), 2023)),
        Mock::new(ProviderId::WorldBank, &calls)
            .with("FP.CPI.TOTL.ZG/USA", Fetched::historical(years(2000, 2023, 5.0))),
    ]);
    let us = catalog::country("United States").unwrap();
    let cpi = catalog::indicator("cpi").unwrap();

    let res = asm.resolve(us, cpi, &range(2010, 2030));
    assert_eq!(res.provenance, Provenance::Source(ProviderId::Imf));
    assert_eq!(res.provenance.label(), "IMF WEO");
    assert_eq!(res.unit, "% y/y");
    assert_eq!(res.last_actual, Some(2023));
    assert_eq!(called(&calls, ProviderId::WorldBank), 0);
}

#[test]
fn us_cpi_without_forecast_stops_at_last_actual() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Imf, &calls).with("PCPIPCH/USA", outlook(years(1980, 2029, 1.0), 2015)),
    ]);
    let us = catalog::country("United States").unwrap();
    let cpi = catalog::indicator("cpi").unwrap();

    let res = asm.resolve(us, cpi, &range(2010, 2020));
    assert!(res.forecast.is_empty());
    assert_eq!(res.historical.first().map(|(y, _)| y), Some(2010));
    assert!(res.historical.years().all(|y| y <= 2015));

    let with_fc = asm.resolve(us, cpi, &range(2010, 2020).with_forecast(true));
    assert_eq!(with_fc.forecast.years().collect::<Vec<_>>(), (2016..=2020).collect::<Vec<_>>());
    assert!(with_fc.historical.years().all(|y| y <= 2015));
}

#[test]
fn falls_back_in_declared_order() {
    let calls = CallLog::default();
    let index: Series = [(2019, 100.0), (2020, 102.0), (2021, 105.06)].into_iter().collect();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Imf, &calls),
        Mock::new(ProviderId::Ecb, &calls),
        Mock::new(ProviderId::Eurostat, &calls).with(
            "prc_hicp_aind?geo=DE&unit=INX_A_AVG&coicop=CP00",
            Fetched::historical(index),
        ),
        Mock::new(ProviderId::WorldBank, &calls)
            .with("FP.CPI.TOTL.ZG/DEU", Fetched::historical(years(2000, 2023, 9.0))),
    ]);
    let de = catalog::country("Germany").unwrap();
    let cpi = catalog::indicator("cpi").unwrap();

    let res = asm.resolve(de, cpi, &range(2015, 2025));
    assert_eq!(res.provenance, Provenance::Source(ProviderId::Eurostat));
    // index levels become year-over-year changes
    assert_eq!(res.historical.len(), 2);
    assert!((res.historical.get(2020).unwrap() - 2.0).abs() < 1e-9);
    assert!((res.historical.get(2021).unwrap() - 3.0).abs() < 1e-9);

    let order: Vec<ProviderId> = calls.borrow().iter().map(|(p, _)| *p).collect();
    assert_eq!(order, vec![ProviderId::Imf, ProviderId::Eurostat]);
}

#[test]
fn regional_source_only_when_preferred() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Imf, &calls),
        Mock::new(ProviderId::Ecb, &calls)
            .with("ICP/M.FR.N.000000.4.ANR", Fetched::historical(years(2010, 2023, 1.5))),
        Mock::new(ProviderId::WorldBank, &calls)
            .with("FP.CPI.TOTL.ZG/FRA", Fetched::historical(years(2010, 2023, 3.0))),
    ]);
    let fr = catalog::country("France").unwrap();
    let cpi = catalog::indicator("cpi").unwrap();

    let plain = asm.resolve(fr, cpi, &range(2010, 2023));
    assert_eq!(plain.provenance, Provenance::Source(ProviderId::WorldBank));
    assert_eq!(called(&calls, ProviderId::Ecb), 0);

    let regional = asm.resolve(fr, cpi, &range(2010, 2023).prefer_regional(true));
    assert_eq!(regional.provenance, Provenance::Source(ProviderId::Ecb));
    assert_eq!(regional.historical.get(2010), Some(1.5));
}

#[test]
fn all_empty_is_none_with_default_unit() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Imf, &calls),
        Mock::new(ProviderId::Eurostat, &calls),
        Mock::new(ProviderId::WorldBank, &calls),
    ]);
    let de = catalog::country("Germany").unwrap();
    let gdp = catalog::indicator("gdp_growth").unwrap();

    let res = asm.resolve(de, gdp, &range(2000, 2020));
    assert!(res.is_empty());
    assert_eq!(res.provenance, Provenance::None);
    assert_eq!(res.unit, "% y/y");
    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["provenance"], "none");
    assert_eq!(called(&calls, ProviderId::Imf), 1);
    assert_eq!(called(&calls, ProviderId::Eurostat), 1);
    assert_eq!(called(&calls, ProviderId::WorldBank), 1);
}

#[test]
fn data_outside_range_does_not_count() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Imf, &calls).with("LUR/JPN", outlook(years(1990, 1999, 2.0), 1999)),
        Mock::new(ProviderId::WorldBank, &calls)
            .with("SL.UEM.TOTL.ZS/JPN", Fetched::historical(years(2000, 2022, 4.0))),
    ]);
    let jp = catalog::country("Japan").unwrap();
    let u = catalog::indicator("unemployment").unwrap();

    let res = asm.resolve(jp, u, &range(2005, 2010));
    assert_eq!(res.provenance, Provenance::Source(ProviderId::WorldBank));
    assert_eq!(res.historical.len(), 6);
}

#[test]
fn commodity_indicator_ignores_country_providers() {
    let calls = CallLog::default();
    let brent_prices: Series = [(2021, 70.9), (2022, 99.0), (2023, 82.5)].into_iter().collect();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Imf, &calls),
        Mock::new(ProviderId::WorldBank, &calls),
        Mock::new(ProviderId::Fred, &calls).with("DCOILBRENTEU", Fetched::historical(brent_prices)),
    ]);
    let brent = catalog::indicator("brent").unwrap();
    let us = catalog::country("United States").unwrap();
    let de = catalog::country("Germany").unwrap();

    let a = asm.resolve(us, brent, &range(2020, 2024));
    let b = asm.resolve(de, brent, &range(2020, 2024));
    assert_eq!(a, b);
    assert_eq!(a.provenance, Provenance::Source(ProviderId::Fred));
    assert_eq!(a.unit, "USD/bbl");
    assert_eq!(
        calls.borrow().as_slice(),
        &[(ProviderId::Fred, "DCOILBRENTEU".to_string())]
    );

    let c = asm.resolve_global(brent, &range(2020, 2024));
    assert_eq!(c, a);
}

#[test]
fn regional_only_indicator_without_regional_code_is_empty() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![Mock::new(ProviderId::Ecb, &calls)]);
    let us = catalog::country("United States").unwrap();
    let energy = catalog::indicator("hicp_energy").unwrap();

    let res = asm.resolve(us, energy, &range(2010, 2020).prefer_regional(true));
    assert!(res.is_empty());
    assert_eq!(res.provenance, Provenance::None);
    assert!(calls.borrow().is_empty());
}

#[test]
fn country_scoped_sources() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Ecb, &calls)
            .with("FM/D.U2.EUR.4F.KR.MRR_FR.LEV", Fetched::historical(years(2015, 2020, 0.0))),
        Mock::new(ProviderId::Bis, &calls)
            .with("WS_CBPOL/M.US", Fetched::historical(years(2015, 2020, 0.25))),
        Mock::new(ProviderId::Fred, &calls)
            .with("BAMLC0A0CM", Fetched::historical(years(2015, 2020, 1.2))),
    ]);
    let us = catalog::country("United States").unwrap();
    let it = catalog::country("Italy").unwrap();
    let jp = catalog::country("Japan").unwrap();
    let q = range(2015, 2020).prefer_regional(true);

    let policy = catalog::indicator("policy_rate").unwrap();
    assert_eq!(
        asm.resolve(it, policy, &q).provenance,
        Provenance::Source(ProviderId::Ecb)
    );
    assert_eq!(
        asm.resolve(us, policy, &q).provenance,
        Provenance::Source(ProviderId::Bis)
    );

    let spread = catalog::indicator("credit_spread").unwrap();
    assert_eq!(
        asm.resolve(us, spread, &q).provenance,
        Provenance::Source(ProviderId::Fred)
    );
    assert!(asm.resolve(jp, spread, &q).is_empty());
    // Japan matched no scoped FRED series, so FRED saw one call only
    assert_eq!(called(&calls, ProviderId::Fred), 1);
}

#[test]
fn unregistered_providers_are_skipped() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::WorldBank, &calls)
            .with("NY.GDP.MKTP.KD.ZG/CAN", Fetched::historical(years(2010, 2020, 1.0))),
    ]);
    let ca = catalog::country("Canada").unwrap();
    let gdp = catalog::indicator("gdp_growth").unwrap();
    let res = asm.resolve(ca, gdp, &range(2010, 2020));
    assert_eq!(res.provenance, Provenance::Source(ProviderId::WorldBank));
}

#[test]
fn results_and_fetches_are_cached() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Imf, &calls).with("NGDP_RPCH/ITA", outlook(years(2000, 2029, 0.5), 2024)),
    ]);
    let it = catalog::country("Italy").unwrap();
    let gdp = catalog::indicator("gdp_growth").unwrap();

    let first = asm.resolve(it, gdp, &range(2010, 2020));
    let again = asm.resolve(it, gdp, &range(2010, 2020));
    assert_eq!(first, again);
    assert_eq!(calls.borrow().len(), 1);

    // a different window reuses the cached provider response
    let wider = asm.resolve(it, gdp, &range(2000, 2024));
    assert_eq!(wider.historical.len(), 25);
    assert_eq!(calls.borrow().len(), 1);

    asm.clear_cache();
    asm.resolve(it, gdp, &range(2010, 2020));
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn zero_ttl_disables_caching() {
    let calls = CallLog::default();
    let mut reg = Registry::new();
    reg.register(Box::new(
        Mock::new(ProviderId::Fred, &calls).with("DCOILWTICO", Fetched::historical(years(2020, 2023, 60.0))),
    ));
    let mut asm = Assembler::new(reg, Duration::ZERO, Duration::ZERO);
    let wti = catalog::indicator("wti").unwrap();
    asm.resolve_global(wti, &range(2020, 2023));
    asm.resolve_global(wti, &range(2020, 2023));
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn batch_labels_follow_selection_shape() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![
        Mock::new(ProviderId::Imf, &calls)
            .with("PCPIPCH/USA", outlook(years(2000, 2029, 1.0), 2024))
            .with("PCPIPCH/DEU", outlook(years(2000, 2029, 2.0), 2024))
            .with("NGDP_RPCH/USA", outlook(years(2000, 2029, 3.0), 2024)),
        Mock::new(ProviderId::Fred, &calls),
    ]);
    let q = range(2010, 2020);

    let by_country = asm
        .resolve_batch(&["United States", "Germany"], &["cpi"], &q)
        .unwrap();
    let labels: Vec<&str> = by_country.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["United States", "Germany"]);

    let by_indicator = asm
        .resolve_batch(&["United States"], &["cpi", "gdp_growth"], &q)
        .unwrap();
    let labels: Vec<&str> = by_indicator.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["CPI Inflation", "Real GDP Growth"]);

    let grid = asm
        .resolve_batch(&["United States", "Germany"], &["cpi", "brent"], &q)
        .unwrap();
    let labels: Vec<&str> = grid.iter().map(|r| r.label.as_str()).collect();
    // brent is one world price and appears once
    assert_eq!(
        labels,
        [
            "United States — CPI Inflation",
            "Brent Crude Oil",
            "Germany — CPI Inflation"
        ]
    );
    assert_eq!(grid[1].result.provenance, Provenance::None);
}

#[test]
fn batch_rejects_bad_selections() {
    let mut asm = assembler(Vec::new());
    let q = range(2010, 2020);
    let none: [&str; 0] = [];

    assert_eq!(
        asm.resolve_batch(&none, &["cpi"], &q).unwrap_err(),
        ValidationError::EmptySelection("country")
    );
    assert_eq!(
        asm.resolve_batch(&["Germany"], &none, &q).unwrap_err(),
        ValidationError::EmptySelection("indicator")
    );
    assert_eq!(
        asm.resolve_batch(&["Atlantis"], &["cpi"], &q).unwrap_err(),
        ValidationError::UnknownCountry("Atlantis".into())
    );
    assert_eq!(
        asm.resolve_batch(&["Germany"], &["happiness"], &q).unwrap_err(),
        ValidationError::UnknownIndicator("happiness".into())
    );
    assert_eq!(
        YearRange::new(2020, 2020).unwrap_err(),
        ValidationError::InvalidRange {
            start: 2020,
            end: 2020
        }
    );
}

#[test]
fn snapshot_marks_forecast_years() {
    let calls = CallLog::default();
    let mut by_country = BTreeMap::new();
    by_country.insert("USA".to_string(), years(2020, 2026, 3.0));
    by_country.insert("DEU".to_string(), years(2020, 2024, 2.0));
    let cs = CrossSection {
        by_country,
        last_actual: Some(2024),
    };
    let mut asm = assembler(vec![Mock::new(ProviderId::Imf, &calls).with_section(cs)]);
    let cpi = catalog::indicator("cpi").unwrap();

    let actual = asm.snapshot(cpi, 2024);
    assert_eq!(actual.values.len(), 2);
    assert!(!actual.is_forecast());
    assert_eq!(actual.provenance, Provenance::Source(ProviderId::Imf));

    let projected = asm.snapshot(cpi, 2026);
    assert!(projected.is_forecast());
    assert_eq!(projected.values.keys().collect::<Vec<_>>(), ["USA"]);

    // one cross-section download for both years
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn failed_cross_section_is_not_refetched() {
    let calls = CallLog::default();
    let mut asm = assembler(vec![Mock::new(ProviderId::Imf, &calls)]);
    let cpi = catalog::indicator("cpi").unwrap();

    for _ in 0..3 {
        let snap = asm.snapshot(cpi, 2023);
        assert!(snap.values.is_empty());
        assert_eq!(snap.provenance, Provenance::None);
    }
    assert_eq!(called(&calls, ProviderId::Imf), 1);

    asm.clear_cache();
    asm.snapshot(cpi, 2023);
    assert_eq!(called(&calls, ProviderId::Imf), 2);
}

#[test]
fn extreme_last_actual_keeps_history() {
    let calls = CallLog::default();
    let imf = Mock::new(ProviderId::Imf, &calls).with("PCPIPCH/USA", outlook(years(2010, 2024, 1.0), i32::MAX));
    let mut asm = assembler(vec![imf]);
    let us = catalog::country("United States").unwrap();
    let cpi = catalog::indicator("cpi").unwrap();

    let r = asm.resolve(us, cpi, &range(2010, 2024).with_forecast(true));
    assert_eq!(r.historical.len(), 15);
    assert!(r.forecast.is_empty());
}
