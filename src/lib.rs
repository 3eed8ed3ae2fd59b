//! macroscope
//!
//! A Rust library for retrieving, caching, charting and exporting
//! macroeconomic indicators from public statistical APIs. Pairs with the
//! `macroscope` CLI; the `engagement-letter` binary is built on [`letter`].
//!
//! ### Features
//! - Seven providers (IMF WEO, ECB, Eurostat, BIS, World Bank, FRED, Yahoo)
//!   behind one [`api::Provider`] trait
//! - Per-indicator fallback chains: the first provider with data wins
//! - TTL caching of fetched series and assembled results
//! - Plotly line charts (single or dual axis, forecast styling) and choropleth maps
//! - CSV, XLSX and JSON exports; summary statistics
//!
//! ### Example
//! ```no_run
//! use macroscope::{Assembler, Query, Registry, Settings, YearRange};
//!
//! let settings = Settings::load(None)?;
//! let mut asm = Assembler::from_settings(Registry::live(&settings)?, &settings);
//! let query = Query::new(YearRange::new(2010, 2024)?).with_forecast(true);
//! let results = asm.resolve_batch(&["United States", "Germany"], &["cpi"], &query)?;
//! let table = macroscope::storage::DataTable::from_results(&results);
//! macroscope::storage::save_csv(&table, "cpi.csv")?;
//!
//! let inputs: Vec<_> = results.iter().map(macroscope::viz::TraceInput::from).collect();
//! let chart = macroscope::viz::build_line_chart(&inputs, "Inflation", Default::default());
//! macroscope::viz::html::save_figure(&chart.to_plotly(), "Inflation", "cpi.html")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod assembler;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod letter;
pub mod models;
pub mod stats;
pub mod storage;
pub mod viz;

pub use api::{Provider, ProviderId, Registry};
pub use assembler::{Assembler, LabeledResult, Query};
pub use config::Settings;
pub use error::ValidationError;
pub use models::{Assembled, Fetched, Provenance, Series, Snapshot, YearRange};
