//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::report_adapter;
use crate::domain::config_validation::validate_config;
use crate::domain::error::FibextError;
use crate::domain::level::{RenderOptions, compute_levels};
use crate::domain::market::{default_markets, parse_markets};
use crate::domain::range_resolver::{RangeQuery, resolve_range};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{LevelReport, ReportFormat, ReportPort};

/// `show_close` when neither the config file nor a flag decides.
pub const DEFAULT_SHOW_CLOSE: bool = true;

#[derive(Parser, Debug)]
#[command(name = "fibext", about = "Price-extension levels from a trading window")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default, Clone)]
pub struct LevelSwitches {
    /// Drop levels outside the daily limit band instead of flagging them
    #[arg(long, conflicts_with = "no_limit")]
    pub apply_limit: bool,
    /// Keep out-of-band levels and flag them
    #[arg(long)]
    pub no_limit: bool,
    /// Append the short (high-anchored) group
    #[arg(long, conflicts_with = "no_short")]
    pub show_short: bool,
    /// Leave out the short group
    #[arg(long)]
    pub no_short: bool,
    /// Append the close-anchored group
    #[arg(long, conflicts_with = "no_close")]
    pub show_close: bool,
    /// Leave out the close-anchored group
    #[arg(long)]
    pub no_close: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute extension levels for one security
    Levels {
        #[arg(long)]
        code: String,
        /// Single trading day, or the first day of a range with --end-date
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Comma-separated market suffixes, tried in order
        #[arg(long)]
        market: Option<String>,
        #[command(flatten)]
        switches: LevelSwitches,
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List securities available on a market
    ListSymbols {
        #[arg(long)]
        market: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Levels {
            code,
            date,
            end_date,
            config,
            data_dir,
            market,
            switches,
            format,
            output,
        } => {
            let query = match end_date {
                Some(end) => RangeQuery::range(&code, date, end),
                None => RangeQuery::single_day(&code, date),
            };
            run_levels(
                &query,
                config.as_ref(),
                data_dir.as_deref(),
                market.as_deref(),
                &switches,
                format,
                output.as_deref(),
            )
        }
        Command::ListSymbols {
            market,
            config,
            data_dir,
        } => run_list_symbols(&market, config.as_ref(), data_dir.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FibextError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Load and validate an optional config file.
fn load_optional_config(path: Option<&PathBuf>) -> Result<Option<FileConfigAdapter>, ExitCode> {
    let Some(path) = path else {
        return Ok(None);
    };
    info!(path = %path.display(), "loading config");
    let adapter = load_config(path)?;
    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }
    Ok(Some(adapter))
}

fn as_port(config: &Option<FileConfigAdapter>) -> Option<&dyn ConfigPort> {
    config.as_ref().map(|c| c as &dyn ConfigPort)
}

/// Flags win over the `[levels]` section, which wins over the built-in defaults.
pub fn build_render_options(
    config: Option<&dyn ConfigPort>,
    switches: &LevelSwitches,
) -> RenderOptions {
    let resolve = |on: bool, off: bool, key: &str, default: bool| {
        if off {
            false
        } else if on {
            true
        } else {
            config
                .map(|c| c.get_bool("levels", key, default))
                .unwrap_or(default)
        }
    };

    RenderOptions {
        apply_limit: resolve(switches.apply_limit, switches.no_limit, "apply_limit", false),
        show_short: resolve(switches.show_short, switches.no_short, "show_short", false),
        show_close: resolve(
            switches.show_close,
            switches.no_close,
            "show_close",
            DEFAULT_SHOW_CLOSE,
        ),
    }
}

pub fn build_markets(
    config: Option<&dyn ConfigPort>,
    market_override: Option<&str>,
) -> Result<Vec<String>, FibextError> {
    let raw = match market_override {
        Some(m) => m.to_string(),
        None => match config.and_then(|c| c.get_string("data", "markets")) {
            Some(m) => m,
            None => return Ok(default_markets()),
        },
    };
    parse_markets(&raw).map_err(|e| FibextError::ConfigInvalid {
        section: "data".into(),
        key: "markets".into(),
        reason: e.to_string(),
    })
}

pub fn resolve_data_dir(
    config: Option<&dyn ConfigPort>,
    dir_override: Option<&Path>,
) -> Result<PathBuf, FibextError> {
    if let Some(dir) = dir_override {
        return Ok(dir.to_path_buf());
    }
    config
        .and_then(|c| c.get_string("data", "dir"))
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| FibextError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })
}

pub fn resolve_format(
    config: Option<&dyn ConfigPort>,
    format_override: Option<ReportFormat>,
) -> Result<ReportFormat, FibextError> {
    if let Some(f) = format_override {
        return Ok(f);
    }
    match config.and_then(|c| c.get_string("report", "format")) {
        Some(s) => s.parse().map_err(|reason| FibextError::ConfigInvalid {
            section: "report".into(),
            key: "format".into(),
            reason,
        }),
        None => Ok(ReportFormat::default()),
    }
}

/// Resolve the window, compute the levels and hand them to the renderer.
pub fn run_levels_pipeline(
    data_port: &dyn DataPort,
    query: &RangeQuery,
    markets: &[String],
    options: RenderOptions,
    reporter: &dyn ReportPort,
    output_path: Option<&Path>,
) -> Result<usize, FibextError> {
    let summary = resolve_range(data_port, query, markets)?;
    let levels = compute_levels(summary.high, summary.low, summary.close, &options);
    debug!(count = levels.len(), ?options, "levels computed");
    if levels.is_empty() {
        info!("no levels satisfy the limit band");
    }

    let report = LevelReport {
        summary: &summary,
        options,
        levels: &levels,
    };
    reporter.write(&report, output_path)?;
    if let Some(path) = output_path {
        info!(path = %path.display(), "report written");
    }
    Ok(levels.len())
}

fn level_settings(
    config: Option<&dyn ConfigPort>,
    data_dir: Option<&Path>,
    market_override: Option<&str>,
    format_override: Option<ReportFormat>,
) -> Result<(PathBuf, Vec<String>, ReportFormat), FibextError> {
    Ok((
        resolve_data_dir(config, data_dir)?,
        build_markets(config, market_override)?,
        resolve_format(config, format_override)?,
    ))
}

fn run_levels(
    query: &RangeQuery,
    config_path: Option<&PathBuf>,
    data_dir: Option<&Path>,
    market_override: Option<&str>,
    switches: &LevelSwitches,
    format_override: Option<ReportFormat>,
    output_path: Option<&Path>,
) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let config_port = as_port(&config);

    let (data_dir, markets, format) =
        match level_settings(config_port, data_dir, market_override, format_override) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
    let options = build_render_options(config_port, switches);

    let data_port = CsvAdapter::new(data_dir);
    let reporter = report_adapter(format);
    match run_levels_pipeline(
        &data_port,
        query,
        &markets,
        options,
        reporter.as_ref(),
        output_path,
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e @ FibextError::NoData { .. }) => {
            eprintln!("error: query failed: {e}");
            (&e).into()
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_list_symbols(
    market: &str,
    config_path: Option<&PathBuf>,
    data_dir: Option<&Path>,
) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data_dir = match resolve_data_dir(as_port(&config), data_dir) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let market = market.trim().to_uppercase();
    match CsvAdapter::new(data_dir).list_symbols(&market) {
        Ok(symbols) => {
            if symbols.is_empty() {
                eprintln!("No symbols found on {}", market);
            }
            for s in symbols {
                println!("{}", s);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let port: &dyn ConfigPort = &config;
    let options = build_render_options(Some(port), &LevelSwitches::default());
    let markets = build_markets(Some(port), None).unwrap_or_default();
    let format = resolve_format(Some(port), None).unwrap_or_default();
    let data_dir = port
        .get_string("data", "dir")
        .unwrap_or_else(|| "(unset)".to_string());

    eprintln!("  Data dir:    {}", data_dir);
    eprintln!("  Markets:     {}", markets.join(","));
    eprintln!("  Apply limit: {}", options.apply_limit);
    eprintln!("  Show short:  {}", options.show_short);
    eprintln!("  Show close:  {}", options.show_close);
    eprintln!("  Format:      {}", format);
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
