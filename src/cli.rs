//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export::CsvExporter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{self, Analysis};
use crate::domain::config_validation::{
    date_window, indicator_requests, signal_evaluator, validate_analysis_config,
};
use crate::domain::error::AnalysisError;
use crate::domain::series::Series;
use crate::logging::init_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::export_port::{ExportPort, RowOrder};

#[derive(Parser, Debug)]
#[command(
    name = "marketlens",
    about = "Technical indicators and trading signals for a price series"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators and signals for one symbol
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: Option<String>,
        /// Write the augmented table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        newest_first: bool,
    },
    /// Validate an analysis configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    match cli.command {
        Command::Analyze {
            config,
            symbol,
            output,
            newest_first,
        } => run_analyze(&config, symbol.as_deref(), output.as_deref(), newest_first),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn fail(err: &AnalysisError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// `[data] dir`, resolved against the config file's directory when relative.
pub fn data_dir(config: &dyn ConfigPort, config_path: &Path) -> Result<PathBuf, AnalysisError> {
    let dir = config
        .get_string("data", "dir")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AnalysisError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })?;
    let dir = PathBuf::from(dir.trim());
    if dir.is_relative() {
        if let Some(parent) = config_path.parent() {
            return Ok(parent.join(dir));
        }
    }
    Ok(dir)
}

pub fn resolve_symbol(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, AnalysisError> {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AnalysisError::ConfigMissing {
            section: "data".into(),
            key: "symbol".into(),
        })
}

/// Fetch, validate and analyze one symbol.
pub fn analyze_symbol(
    data_port: &dyn DataPort,
    config: &dyn ConfigPort,
    symbol: &str,
) -> Result<(Series, Analysis), AnalysisError> {
    let (start, end) = date_window(config)?;
    let bars = data_port.fetch_series(symbol, start, end)?;
    info!(symbol, bars = bars.len(), "fetched series");

    let series = Series::new(symbol, bars)?;
    let requests = indicator_requests(config)?;
    let evaluator = signal_evaluator(config)?;
    let analysis = analysis::analyze(&series, &requests, &evaluator);
    Ok((series, analysis))
}

/// Console report: series header, one line per signal, then the summary.
pub fn format_report(series: &Series, analysis: &Analysis) -> String {
    let first = &series.bars()[0];
    let last = series.last();

    let mut lines = vec![
        format!(
            "{}: {} bars, {} to {}",
            series.symbol(),
            series.len(),
            first.timestamp.date(),
            last.timestamp.date()
        ),
        format!("Last close: {}", last.close),
        String::new(),
        format!("{:<12} {:<8} Detail", "Topic", "Signal"),
    ];
    lines.extend(analysis.signals.iter().map(|signal| {
        format!(
            "{:<12} {:<8} {}",
            signal.topic.to_string(),
            signal.category.to_string(),
            signal.message
        )
    }));

    let s = &analysis.summary;
    lines.push(String::new());
    lines.push(format!(
        "Summary: {} buy, {} sell, {} neutral, {} without data. Bias: {}",
        s.buy, s.sell, s.neutral, s.insufficient, s.bias
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn run_analyze(
    config_path: &Path,
    symbol_override: Option<&str>,
    output_override: Option<&Path>,
    newest_first: bool,
) -> ExitCode {
    info!(path = %config_path.display(), "loading config");
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_analysis_config(&config) {
        return fail(&e);
    }

    let symbol = match resolve_symbol(symbol_override, &config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let dir = match data_dir(&config, config_path) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(dir);
    let (series, analysis) = match analyze_symbol(&data_port, &config, &symbol) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    print!("{}", format_report(&series, &analysis));

    let output = output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("export", "path").map(PathBuf::from));
    if let Some(output) = output {
        let order = if newest_first || config.get_bool("export", "newest_first", false) {
            RowOrder::NewestFirst
        } else {
            RowOrder::OldestFirst
        };
        let exporter = CsvExporter::new();
        if let Err(e) = exporter.export(&series, &analysis.indicators, order, &output) {
            return fail(&e);
        }
        println!("\nTable written to: {}", output.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_analysis_config(&config) {
        return fail(&e);
    }

    // Validation has already parsed both, so neither can fail here.
    let requests = indicator_requests(&config).unwrap_or_default();
    let evaluator = signal_evaluator(&config).unwrap_or_default();

    println!("Indicators:");
    for request in &requests {
        println!("  {:<22} {}", request.to_string(), request.column_names().join(", "));
    }
    println!("\nSignal rules read:");
    for request in evaluator.required_requests() {
        println!("  {}", request.column_names().join(", "));
    }
    println!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let dir = match data_dir(&config, config_path) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    match CsvAdapter::new(dir).list_symbols() {
        Ok(symbols) => {
            for symbol in symbols {
                println!("{symbol}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
