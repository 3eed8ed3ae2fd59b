use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use macroscope::catalog::{self, COUNTRIES, INDICATORS};
use macroscope::models::default_last_actual;
use macroscope::stats::{self, Order};
use macroscope::viz::{self, ChartOptions, TraceInput, html, map, util};
use macroscope::{Assembler, Query, Registry, Settings, YearRange, storage};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "macroscope",
    version,
    about = "Fetch, chart, map & export macroeconomic indicators with per-indicator source fallback"
)]
struct Cli {
    /// JSON settings file (timeouts, cache TTLs, provider base URLs).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Cache lifetime of statistical data, in seconds.
    #[arg(long, global = true, env = "MACROSCOPE_CACHE_TTL_SECS")]
    cache_ttl: Option<u64>,
    /// Cache lifetime of market data (FRED, Yahoo), in seconds.
    #[arg(long, global = true, env = "MACROSCOPE_MARKET_TTL_SECS")]
    market_ttl: Option<u64>,
    /// Delay between consecutive requests of a batch, in milliseconds.
    #[arg(long, global = true, env = "MACROSCOPE_PACE_MS")]
    pace_ms: Option<u64>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve indicators for countries (and optionally save, chart, and print stats).
    Series(SeriesArgs),
    /// Build a one-year world map of an indicator.
    Map(MapArgs),
    /// List catalogued countries and indicators with their source chains.
    Catalog,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Csv,
    Xlsx,
    Json,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    /// Country names separated by comma or semicolon (e.g., "United States,Germany")
    #[arg(short, long)]
    countries: String,
    /// Indicator ids separated by comma or semicolon (e.g., cpi,gdp_growth)
    #[arg(short, long)]
    indicators: String,
    /// Year range START:END
    #[arg(short = 'd', long, default_value = "2000:2030")]
    date: String,
    /// Keep IMF projections past the last-actual year.
    #[arg(long, default_value_t = false)]
    forecast: bool,
    /// Consult ECB series before the international providers.
    #[arg(long, default_value_t = false)]
    prefer_regional: bool,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv, xlsx or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Write a Plotly chart (.html page, anything else figure JSON).
    #[arg(long)]
    chart: Option<PathBuf>,
    /// Chart title.
    #[arg(long)]
    title: Option<String>,
    /// Print summary statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Number formatting locale for --stats (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en")]
    locale: String,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Indicator id (e.g., cpi, gdp_growth, unemployment, brent)
    #[arg(short, long)]
    indicator: String,
    /// Year to show; defaults to the last year with actual data.
    #[arg(short, long)]
    year: Option<i32>,
    /// Output path (.html page, anything else figure JSON).
    #[arg(long, default_value = "map.html")]
    out: PathBuf,
    /// Print the N highest and lowest values.
    #[arg(long)]
    top: Option<usize>,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_range(s: &str) -> Result<YearRange> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("invalid --date {s:?}, expected START:END"))?;
    let start = a.trim().parse::<i32>().with_context(|| format!("invalid start year {a:?}"))?;
    let end = b.trim().parse::<i32>().with_context(|| format!("invalid end year {b:?}"))?;
    Ok(YearRange::new(start, end)?)
}

fn fmt_opt(v: Option<f64>, locale: &str) -> String {
    let (loc, sep) = util::map_locale(locale);
    match v {
        Some(x) if x.is_finite() => util::format_value(x, 2, loc, sep),
        _ => "NA".to_string(),
    }
}

fn fmt_point(p: Option<(i32, f64)>, locale: &str) -> String {
    match p {
        Some((y, v)) => format!("{} ({y})", fmt_opt(Some(v), locale)),
        None => "NA".to_string(),
    }
}

fn settings(cli: &Cli) -> Result<Settings> {
    let mut s = Settings::load(cli.config.as_deref())?;
    if let Some(v) = cli.cache_ttl {
        s.cache.series_ttl_secs = v;
    }
    if let Some(v) = cli.market_ttl {
        s.cache.market_ttl_secs = v;
    }
    if let Some(v) = cli.pace_ms {
        s.pace_ms = v;
    }
    Ok(s)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.cmd {
        Command::Catalog => {
            cmd_catalog();
            Ok(())
        }
        Command::Series(args) => {
            // Validate the selection before any network setup.
            let range = parse_range(&args.date)?;
            let s = settings(cli)?;
            let asm = Assembler::from_settings(Registry::live(&s)?, &s);
            cmd_series(asm, range, args)
        }
        Command::Map(args) => {
            let indicator = catalog::indicator(&args.indicator)?;
            let s = settings(cli)?;
            let asm = Assembler::from_settings(Registry::live(&s)?, &s);
            cmd_map(asm, indicator, args)
        }
    }
}

fn cmd_catalog() {
    println!("Indicators:");
    for i in INDICATORS {
        let chain: Vec<String> = i.sources.iter().map(|s| s.provider.to_string()).collect();
        let scope = if i.is_global() { "  [global]" } else { "" };
        let outlook = if i.has_forecast { "  [forecast]" } else { "" };
        println!(
            "  {:<16} {} ({}){scope}{outlook}  <- {}",
            i.id,
            i.name,
            i.unit,
            chain.join(" > ")
        );
    }
    println!("Countries:");
    for c in COUNTRIES {
        println!("  {:<5} {}", c.weo.unwrap_or("-"), c.name);
    }
}

fn infer_format(format: Option<OutFormat>, path: &Path) -> Result<OutFormat> {
    if let Some(f) = format {
        return Ok(f);
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Ok(OutFormat::Csv),
        "xlsx" => Ok(OutFormat::Xlsx),
        "json" => Ok(OutFormat::Json),
        other => bail!("unsupported format: {other}"),
    }
}

fn cmd_series(mut asm: Assembler, range: YearRange, args: &SeriesArgs) -> Result<()> {
    let countries = parse_list(&args.countries);
    let indicators = parse_list(&args.indicators);
    let query = Query::new(range)
        .with_forecast(args.forecast)
        .prefer_regional(args.prefer_regional);
    if args.forecast {
        for id in &indicators {
            if let Ok(i) = catalog::indicator(id)
                && !i.has_forecast
            {
                eprintln!("note: {} has no projections; --forecast has no effect", i.name);
            }
        }
    }
    let results = asm.resolve_batch(&countries, &indicators, &query)?;

    for r in &results {
        eprintln!(
            "{}: {} values from {}",
            r.label,
            r.result.historical.len() + r.result.forecast.len(),
            r.result.provenance
        );
    }

    if let Some(path) = args.out.as_ref() {
        let table = storage::DataTable::from_results(&results);
        match infer_format(args.format, path)? {
            OutFormat::Csv => storage::save_csv(&table, path)?,
            OutFormat::Xlsx => storage::save_xlsx(&table, "Data", path)?,
            OutFormat::Json => storage::save_json(&results, path)?,
        }
        eprintln!("Saved {} years to {}", table.len(), path.display());
    }

    if let Some(chart_path) = args.chart.as_ref() {
        let mut ids: Vec<&str> = results.iter().map(|r| r.indicator).collect();
        ids.sort_unstable();
        ids.dedup();
        let single = match ids.as_slice() {
            [only] => Some(catalog::indicator(only)?),
            _ => None,
        };
        let title = args
            .title
            .clone()
            .or_else(|| single.map(|i| i.name.to_string()))
            .unwrap_or_else(|| "Macro indicators".to_string());
        let options = ChartOptions {
            target: single.and_then(|i| i.target),
        };
        let inputs: Vec<TraceInput> = results.iter().map(TraceInput::from).collect();
        let chart = viz::build_line_chart(&inputs, &title, options);
        html::save_figure(&chart.to_plotly(), &title, chart_path)?;
        eprintln!("Wrote chart to {}", chart_path.display());
    }

    if args.stats {
        for r in &results {
            let s = stats::summarize(&r.label, &r.result.unit, &r.result.historical);
            println!(
                "{} [{}]  count={}  latest={}  change={}  peak={}  trough={}  mean={}  median={}",
                s.label,
                s.unit,
                s.count,
                fmt_point(s.latest, &args.locale),
                fmt_opt(s.change, &args.locale),
                fmt_point(s.peak, &args.locale),
                fmt_point(s.trough, &args.locale),
                fmt_opt(s.mean, &args.locale),
                fmt_opt(s.median, &args.locale),
            );
        }
    }

    Ok(())
}

fn cmd_map(mut asm: Assembler, indicator: &catalog::Indicator, args: &MapArgs) -> Result<()> {
    let year = args.year.unwrap_or_else(default_last_actual);

    let (spec, values) = if indicator.is_global() {
        let range = YearRange::new(year - 1, year)?;
        let res = asm.resolve_global(indicator, &Query::new(range));
        let spec = map::build_uniform_price_map(
            &res.historical,
            year,
            indicator.name,
            &res.unit,
            &catalog::map_locations(),
        )
        .ok_or_else(|| anyhow!("no {} price for {year}", indicator.name))?;
        (spec, None)
    } else {
        let scale = indicator
            .map
            .ok_or_else(|| anyhow!("{} has no map scale", indicator.id))?;
        let snap = asm.snapshot(indicator, year);
        info!("{} snapshot for {year}: {} countries", indicator.id, snap.values.len());
        let spec = map::build_choropleth(&snap, indicator.name, &scale)
            .ok_or_else(|| anyhow!("no {} data for {year}", indicator.name))?;
        (spec, Some(snap.values))
    };

    html::save_figure(&spec.to_plotly(), &spec.title, &args.out)?;
    eprintln!("Wrote map to {}", args.out.display());

    if let (Some(n), Some(values)) = (args.top, values.as_ref()) {
        for (heading, order) in [("Highest", Order::Top), ("Lowest", Order::Bottom)] {
            println!("{heading}:");
            for (code, v) in stats::rank(values, n, order) {
                println!("  {code:<5} {v:>8.1}");
            }
        }
    }
    Ok(())
}
