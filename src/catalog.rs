//! Static country and indicator tables.
//!
//! Each indicator carries an ordered list of [`SourceSpec`]s. The order is the
//! fallback policy: the assembler walks it front to back and keeps the first
//! source with historical data. Code templates use `{placeholder}` fields that
//! are filled from the [`Country`] record; a country lacking the code simply
//! does not use that source.

use crate::api::ProviderId;
use crate::error::ValidationError;
use regex::Regex;
use std::sync::OnceLock;

/// Display name plus the identifier each provider uses for the country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub name: &'static str,
    /// IMF WEO code (ISO3, or an area code such as `EURO`).
    pub weo: Option<&'static str>,
    /// World Bank code (ISO3 or aggregate).
    pub wb: Option<&'static str>,
    pub iso2: Option<&'static str>,
    pub ecb: Option<&'static str>,
    pub eurostat: Option<&'static str>,
    pub bis: Option<&'static str>,
    pub currency: Option<&'static str>,
    /// Yahoo symbol of the benchmark equity index.
    pub equity: Option<&'static str>,
}

impl Country {
    /// Country covered by the global providers: WEO and World Bank by ISO3,
    /// BIS by ISO2.
    pub const fn new(name: &'static str, iso3: &'static str, iso2: &'static str) -> Self {
        Self {
            name,
            weo: Some(iso3),
            wb: Some(iso3),
            iso2: Some(iso2),
            ecb: None,
            eurostat: None,
            bis: Some(iso2),
            currency: None,
            equity: None,
        }
    }

    /// Euro member: ECB and Eurostat both use the ISO2 code, currency is EUR.
    pub const fn euro(mut self) -> Self {
        self.ecb = self.iso2;
        self.eurostat = self.iso2;
        self.currency = Some("EUR");
        self
    }

    /// EU member outside the euro: Eurostat only.
    pub const fn eu(mut self) -> Self {
        self.eurostat = self.iso2;
        self
    }

    pub const fn eurostat(mut self, geo: &'static str) -> Self {
        self.eurostat = Some(geo);
        self
    }

    pub const fn currency(mut self, code: &'static str) -> Self {
        self.currency = Some(code);
        self
    }

    pub const fn equity(mut self, symbol: &'static str) -> Self {
        self.equity = Some(symbol);
        self
    }

    /// Look up the code a template placeholder refers to.
    pub fn code(&self, placeholder: &str) -> Option<&'static str> {
        match placeholder {
            "weo" => self.weo,
            "wb" => self.wb,
            "iso2" => self.iso2,
            "ecb" => self.ecb,
            "eurostat" => self.eurostat,
            "bis" => self.bis,
            "currency" => self.currency,
            "equity" => self.equity,
            _ => None,
        }
    }
}

const EURO_AREA: Country = Country {
    name: "Euro Area",
    weo: Some("EURO"),
    wb: Some("EMU"),
    iso2: None,
    ecb: Some("U2"),
    eurostat: Some("EA20"),
    bis: Some("XM"),
    currency: Some("EUR"),
    equity: Some("^STOXX50E"),
};

pub static COUNTRIES: &[Country] = &[
    // Advanced
    Country::new("United States", "USA", "US").currency("USD").equity("^GSPC"),
    EURO_AREA,
    Country::new("Germany", "DEU", "DE").euro().equity("^GDAXI"),
    Country::new("France", "FRA", "FR").euro().equity("^FCHI"),
    Country::new("Italy", "ITA", "IT").euro().equity("FTSEMIB.MI"),
    Country::new("Spain", "ESP", "ES").euro().equity("^IBEX"),
    Country::new("Netherlands", "NLD", "NL").euro().equity("^AEX"),
    Country::new("Belgium", "BEL", "BE").euro().equity("^BFX"),
    Country::new("Austria", "AUT", "AT").euro().equity("^ATX"),
    Country::new("Portugal", "PRT", "PT").euro(),
    Country::new("Greece", "GRC", "GR").euro().eurostat("EL"),
    Country::new("Ireland", "IRL", "IE").euro().equity("^ISEQ"),
    Country::new("Finland", "FIN", "FI").euro(),
    Country::new("Luxembourg", "LUX", "LU").euro(),
    Country::new("Slovakia", "SVK", "SK").euro(),
    Country::new("Slovenia", "SVN", "SI").euro(),
    Country::new("Estonia", "EST", "EE").euro(),
    Country::new("Latvia", "LVA", "LV").euro(),
    Country::new("Lithuania", "LTU", "LT").euro(),
    Country::new("Croatia", "HRV", "HR").euro(),
    Country::new("United Kingdom", "GBR", "GB").currency("GBP").equity("^FTSE"),
    Country::new("Japan", "JPN", "JP").currency("JPY").equity("^N225"),
    Country::new("Canada", "CAN", "CA").currency("CAD").equity("^GSPTSE"),
    Country::new("Australia", "AUS", "AU").currency("AUD").equity("^AXJO"),
    Country::new("New Zealand", "NZL", "NZ").currency("NZD"),
    Country::new("Switzerland", "CHE", "CH").currency("CHF").equity("^SSMI"),
    Country::new("Sweden", "SWE", "SE").eu().currency("SEK").equity("^OMX"),
    Country::new("Norway", "NOR", "NO").currency("NOK"),
    Country::new("Denmark", "DNK", "DK").eu().currency("DKK"),
    Country::new("Iceland", "ISL", "IS").currency("ISK"),
    // Eastern Europe
    Country::new("Poland", "POL", "PL").eu().currency("PLN"),
    Country::new("Czech Republic", "CZE", "CZ").eu().currency("CZK"),
    Country::new("Hungary", "HUN", "HU").eu().currency("HUF"),
    Country::new("Romania", "ROU", "RO").eu().currency("RON"),
    Country::new("Bulgaria", "BGR", "BG").eu().currency("BGN"),
    // Asia-Pacific
    Country::new("China", "CHN", "CN").currency("CNY").equity("000001.SS"),
    Country::new("India", "IND", "IN").currency("INR").equity("^BSESN"),
    Country::new("South Korea", "KOR", "KR").currency("KRW").equity("^KS11"),
    Country::new("Indonesia", "IDN", "ID").currency("IDR").equity("^JKSE"),
    Country::new("Malaysia", "MYS", "MY").currency("MYR"),
    Country::new("Thailand", "THA", "TH").currency("THB"),
    Country::new("Philippines", "PHL", "PH").currency("PHP"),
    Country::new("Vietnam", "VNM", "VN").currency("VND"),
    Country::new("Singapore", "SGP", "SG").currency("SGD"),
    Country::new("Pakistan", "PAK", "PK").currency("PKR"),
    Country::new("Bangladesh", "BGD", "BD").currency("BDT"),
    // Latin America
    Country::new("Brazil", "BRA", "BR").currency("BRL").equity("^BVSP"),
    Country::new("Mexico", "MEX", "MX").currency("MXN").equity("^MXX"),
    Country::new("Argentina", "ARG", "AR").currency("ARS"),
    Country::new("Chile", "CHL", "CL").currency("CLP"),
    Country::new("Colombia", "COL", "CO").currency("COP"),
    Country::new("Peru", "PER", "PE").currency("PEN"),
    Country::new("Bolivia", "BOL", "BO"),
    Country::new("Ecuador", "ECU", "EC"),
    Country::new("Uruguay", "URY", "UY"),
    Country::new("Paraguay", "PRY", "PY"),
    Country::new("Venezuela", "VEN", "VE"),
    // Middle East & North Africa
    Country::new("Saudi Arabia", "SAU", "SA").currency("SAR"),
    Country::new("UAE", "ARE", "AE"),
    Country::new("Turkey", "TUR", "TR").currency("TRY"),
    Country::new("Israel", "ISR", "IL").currency("ILS"),
    Country::new("Egypt", "EGY", "EG"),
    Country::new("Morocco", "MAR", "MA"),
    Country::new("Tunisia", "TUN", "TN"),
    Country::new("Algeria", "DZA", "DZ"),
    Country::new("Libya", "LBY", "LY"),
    Country::new("Iran", "IRN", "IR"),
    Country::new("Iraq", "IRQ", "IQ"),
    Country::new("Jordan", "JOR", "JO"),
    Country::new("Lebanon", "LBN", "LB"),
    // Sub-Saharan Africa
    Country::new("South Africa", "ZAF", "ZA").currency("ZAR"),
    Country::new("Nigeria", "NGA", "NG"),
    Country::new("Kenya", "KEN", "KE"),
    Country::new("Ethiopia", "ETH", "ET"),
    Country::new("Ghana", "GHA", "GH"),
    Country::new("Tanzania", "TZA", "TZ"),
    Country::new("Uganda", "UGA", "UG"),
    Country::new("Mozambique", "MOZ", "MZ"),
    Country::new("Côte d'Ivoire", "CIV", "CI"),
    Country::new("Senegal", "SEN", "SN"),
    Country::new("Cameroon", "CMR", "CM"),
    Country::new("Angola", "AGO", "AO"),
    Country::new("Zambia", "ZMB", "ZM"),
    Country::new("Zimbabwe", "ZWE", "ZW"),
    // CIS
    Country::new("Russia", "RUS", "RU").currency("RUB"),
    Country::new("Ukraine", "UKR", "UA"),
    Country::new("Kazakhstan", "KAZ", "KZ"),
    Country::new("Uzbekistan", "UZB", "UZ"),
];

/// WEO codes of the euro area and its members (ECB-wide series apply to them).
const EURO_MEMBERS: &[&str] = &[
    "EURO", "DEU", "FRA", "ITA", "ESP", "NLD", "BEL", "AUT", "PRT", "GRC", "IRL", "FIN", "LUX",
    "SVK", "SVN", "EST", "LVA", "LTU", "HRV",
];

/// Whether an indicator is measured per country or is one world-market price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Country,
    Global,
}

/// Post-fetch transformation of a provider series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    None,
    /// Index level -> year-over-year percent change.
    YoyPercent,
}

/// One entry of an indicator's fallback chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSpec {
    pub provider: ProviderId,
    /// Provider code with `{weo}`, `{wb}`, `{iso2}`, `{ecb}`, `{eurostat}`,
    /// `{bis}`, `{currency}`, `{equity}` placeholders.
    pub template: &'static str,
    pub unit: &'static str,
    pub transform: Transform,
    /// Restrict the source to these WEO codes.
    pub only: Option<&'static [&'static str]>,
}

impl SourceSpec {
    pub const fn new(provider: ProviderId, template: &'static str, unit: &'static str) -> Self {
        Self {
            provider,
            template,
            unit,
            transform: Transform::None,
            only: None,
        }
    }

    pub const fn yoy(mut self) -> Self {
        self.transform = Transform::YoyPercent;
        self
    }

    pub const fn only(mut self, weo: &'static [&'static str]) -> Self {
        self.only = Some(weo);
        self
    }

    /// Concrete provider code for `country`, or `None` when the source does
    /// not apply (restricted elsewhere, or a placeholder the country lacks).
    pub fn code_for(&self, country: Option<&Country>) -> Option<String> {
        if let Some(only) = self.only {
            let weo = country.and_then(|c| c.weo)?;
            if !only.contains(&weo) {
                return None;
            }
        }

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("static regex"));
        let mut out = String::with_capacity(self.template.len());
        let mut last = 0;
        for caps in re.captures_iter(self.template) {
            let whole = caps.get(0)?;
            let code = country?.code(&caps[1])?;
            out.push_str(&self.template[last..whole.start()]);
            out.push_str(code);
            last = whole.end();
        }
        out.push_str(&self.template[last..]);
        Some(out)
    }
}

/// Choropleth colour scale with fixed bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapScale {
    pub stops: &'static [(f64, &'static str)],
    pub zmin: f64,
    pub zmax: f64,
    pub title: &'static str,
}

/// Teal (deflation) through yellow (target zone) to dark red (hyperinflation).
pub const CPI_SCALE: MapScale = MapScale {
    stops: &[
        (0.00, "#0D9488"),
        (0.20, "#4ADE80"),
        (0.38, "#FEF08A"),
        (0.55, "#FB923C"),
        (0.75, "#EF4444"),
        (1.00, "#7F1D1D"),
    ],
    zmin: -5.0,
    zmax: 30.0,
    title: "CPI %",
};

pub const GROWTH_SCALE: MapScale = MapScale {
    stops: &[(0.0, "#B91C1C"), (0.5, "#F8FAFC"), (1.0, "#15803D")],
    zmin: -10.0,
    zmax: 10.0,
    title: "GDP %",
};

pub const UNEMPLOYMENT_SCALE: MapScale = MapScale {
    stops: &[(0.0, "#F0F9FF"), (0.5, "#38BDF8"), (1.0, "#1E3A8A")],
    zmin: 0.0,
    zmax: 25.0,
    title: "Unemployment %",
};

/// Colours of the uniform commodity-price map.
pub const OIL_SCALE: &[(f64, &str)] = &[(0.0, "#92400E"), (0.5, "#EA580C"), (1.0, "#FCD34D")];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicator {
    pub id: &'static str,
    pub name: &'static str,
    /// Unit reported when no source has data.
    pub unit: &'static str,
    pub scope: Scope,
    /// Some source publishes projections past the last actual year.
    pub has_forecast: bool,
    pub sources: &'static [SourceSpec],
    pub map: Option<MapScale>,
    /// Reference line drawn on charts (e.g. an inflation target).
    pub target: Option<f64>,
}

impl Indicator {
    pub fn is_global(&self) -> bool {
        self.scope == Scope::Global
    }
}

use ProviderId::{Bis, Ecb, Eurostat, Fred, Imf, WorldBank, Yahoo};

pub static INDICATORS: &[Indicator] = &[
    Indicator {
        id: "cpi",
        name: "CPI Inflation",
        unit: "% y/y",
        scope: Scope::Country,
        has_forecast: true,
        sources: &[
            SourceSpec::new(Imf, "PCPIPCH/{weo}", "% y/y"),
            SourceSpec::new(Ecb, "ICP/M.{ecb}.N.000000.4.ANR", "% y/y"),
            SourceSpec::new(
                Eurostat,
                "prc_hicp_aind?geo={eurostat}&unit=INX_A_AVG&coicop=CP00",
                "% y/y",
            )
            .yoy(),
            SourceSpec::new(WorldBank, "FP.CPI.TOTL.ZG/{wb}", "% y/y"),
        ],
        map: Some(CPI_SCALE),
        target: Some(2.0),
    },
    Indicator {
        id: "hicp_energy",
        name: "HICP Energy Inflation",
        unit: "% y/y",
        scope: Scope::Country,
        has_forecast: false,
        sources: &[SourceSpec::new(Ecb, "ICP/M.{ecb}.N.NRGY00.4.INX", "% y/y").yoy()],
        map: None,
        target: None,
    },
    Indicator {
        id: "gdp_growth",
        name: "Real GDP Growth",
        unit: "% y/y",
        scope: Scope::Country,
        has_forecast: true,
        sources: &[
            SourceSpec::new(Imf, "NGDP_RPCH/{weo}", "% y/y"),
            SourceSpec::new(
                Eurostat,
                "nama_10_gdp?geo={eurostat}&unit=CLV_PCH_PRE&na_item=B1GQ",
                "% y/y",
            ),
            SourceSpec::new(WorldBank, "NY.GDP.MKTP.KD.ZG/{wb}", "% y/y"),
        ],
        map: Some(GROWTH_SCALE),
        target: None,
    },
    Indicator {
        id: "unemployment",
        name: "Unemployment Rate",
        unit: "% of labour force",
        scope: Scope::Country,
        has_forecast: true,
        sources: &[
            SourceSpec::new(Imf, "LUR/{weo}", "% of labour force"),
            SourceSpec::new(
                Eurostat,
                "une_rt_a?geo={eurostat}&age=Y15-74&sex=T&unit=PC_ACT",
                "% of labour force",
            ),
            SourceSpec::new(WorldBank, "SL.UEM.TOTL.ZS/{wb}", "% of labour force"),
        ],
        map: Some(UNEMPLOYMENT_SCALE),
        target: None,
    },
    Indicator {
        id: "policy_rate",
        name: "Central Bank Policy Rate",
        unit: "%",
        scope: Scope::Country,
        has_forecast: false,
        sources: &[
            SourceSpec::new(Ecb, "FM/D.U2.EUR.4F.KR.MRR_FR.LEV", "%").only(EURO_MEMBERS),
            SourceSpec::new(Bis, "WS_CBPOL/M.{bis}", "%"),
        ],
        map: None,
        target: None,
    },
    Indicator {
        id: "bond_yield_10y",
        name: "10-Year Government Bond Yield",
        unit: "%",
        scope: Scope::Country,
        has_forecast: false,
        sources: &[
            SourceSpec::new(Ecb, "IRS/M.{ecb}.L.L40.CI.0000.EUR.N.Z", "%"),
            SourceSpec::new(Eurostat, "irt_lt_mcby_a?geo={eurostat}&int_rt=MCBY", "%"),
            SourceSpec::new(Fred, "IRLTLT01{iso2}M156N", "%"),
        ],
        map: None,
        target: None,
    },
    Indicator {
        id: "credit_spread",
        name: "Corporate Credit Spread",
        unit: "pp",
        scope: Scope::Country,
        has_forecast: false,
        sources: &[
            SourceSpec::new(Fred, "BAMLC0A0CM", "pp").only(&["USA"]),
            SourceSpec::new(Fred, "BAMLHE00EHYIOAS", "pp").only(&["EURO"]),
        ],
        map: None,
        target: None,
    },
    Indicator {
        id: "exchange_rate",
        name: "Exchange Rate vs USD",
        unit: "LCU per USD",
        scope: Scope::Country,
        has_forecast: false,
        sources: &[
            SourceSpec::new(Bis, "WS_XRU/A.{bis}.{currency}.A", "LCU per USD"),
            SourceSpec::new(WorldBank, "PA.NUS.FCRF/{wb}", "LCU per USD"),
        ],
        map: None,
        target: None,
    },
    Indicator {
        id: "equity_index",
        name: "Equity Benchmark Index",
        unit: "index points",
        scope: Scope::Country,
        has_forecast: false,
        sources: &[SourceSpec::new(Yahoo, "{equity}", "index points")],
        map: None,
        target: None,
    },
    Indicator {
        id: "brent",
        name: "Brent Crude Oil",
        unit: "USD/bbl",
        scope: Scope::Global,
        has_forecast: false,
        sources: &[SourceSpec::new(Fred, "DCOILBRENTEU", "USD/bbl")],
        map: None,
        target: None,
    },
    Indicator {
        id: "wti",
        name: "WTI Crude Oil",
        unit: "USD/bbl",
        scope: Scope::Global,
        has_forecast: false,
        sources: &[SourceSpec::new(Fred, "DCOILWTICO", "USD/bbl")],
        map: None,
        target: None,
    },
];

/// Find a country by display name or WEO code (case-insensitive).
pub fn country(name: &str) -> Result<&'static Country, ValidationError> {
    let needle = name.trim();
    COUNTRIES
        .iter()
        .find(|c| {
            c.name.eq_ignore_ascii_case(needle)
                || c.weo.is_some_and(|w| w.eq_ignore_ascii_case(needle))
        })
        .ok_or_else(|| ValidationError::UnknownCountry(needle.to_string()))
}

/// Find an indicator by id or display name (case-insensitive).
pub fn indicator(id: &str) -> Result<&'static Indicator, ValidationError> {
    let needle = id.trim();
    INDICATORS
        .iter()
        .find(|i| i.id.eq_ignore_ascii_case(needle) || i.name.eq_ignore_ascii_case(needle))
        .ok_or_else(|| ValidationError::UnknownIndicator(needle.to_string()))
}

/// Three-letter WEO codes of every catalogued country; aggregates are skipped.
pub fn map_locations() -> Vec<&'static str> {
    COUNTRIES
        .iter()
        .filter_map(|c| c.weo)
        .filter(|w| w.len() == 3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_fill_from_country() {
        let de = country("Germany").unwrap();
        let cpi = indicator("cpi").unwrap();
        let codes: Vec<_> = cpi.sources.iter().map(|s| s.code_for(Some(de))).collect();
        assert_eq!(codes[0].as_deref(), Some("PCPIPCH/DEU"));
        assert_eq!(codes[1].as_deref(), Some("ICP/M.DE.N.000000.4.ANR"));
        assert_eq!(
            codes[2].as_deref(),
            Some("prc_hicp_aind?geo=DE&unit=INX_A_AVG&coicop=CP00")
        );
        assert_eq!(codes[3].as_deref(), Some("FP.CPI.TOTL.ZG/DEU"));
    }

    #[test]
    fn missing_code_skips_source() {
        let us = country("united states").unwrap();
        let ecb = &indicator("hicp_energy").unwrap().sources[0];
        assert_eq!(ecb.code_for(Some(us)), None);
        // placeholder templates need a country
        assert_eq!(ecb.code_for(None), None);
    }

    #[test]
    fn restricted_sources() {
        let spread = indicator("credit_spread").unwrap();
        let us = country("USA").unwrap();
        let ea = country("Euro Area").unwrap();
        assert_eq!(spread.sources[0].code_for(Some(us)).as_deref(), Some("BAMLC0A0CM"));
        assert_eq!(spread.sources[0].code_for(Some(ea)), None);
        assert_eq!(spread.sources[1].code_for(Some(ea)).as_deref(), Some("BAMLHE00EHYIOAS"));
    }

    #[test]
    fn greece_uses_el_on_eurostat() {
        let gr = country("Greece").unwrap();
        assert_eq!(gr.eurostat, Some("EL"));
        assert_eq!(gr.ecb, Some("GR"));
    }

    #[test]
    fn global_sources_need_no_country() {
        let brent = indicator("Brent Crude Oil").unwrap();
        assert!(brent.is_global());
        assert_eq!(brent.sources[0].code_for(None).as_deref(), Some("DCOILBRENTEU"));
    }

    #[test]
    fn map_locations_skip_aggregates() {
        let locs = map_locations();
        assert!(locs.contains(&"USA"));
        assert!(!locs.contains(&"EURO"));
    }

    #[test]
    fn unknown_names_are_typed_errors() {
        assert_eq!(
            country("Atlantis"),
            Err(ValidationError::UnknownCountry("Atlantis".into()))
        );
        assert!(matches!(
            indicator("gdp_level"),
            Err(ValidationError::UnknownIndicator(_))
        ));
    }
}
