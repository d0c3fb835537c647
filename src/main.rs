//! CLI entry point for the bikeshare explorer.
//!
//! Provides an interactive session that mirrors the classic prompt flow, and a
//! one-shot `stats` subcommand for scripted queries.

mod interactive;

use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bikeshare_explorer::analyzers::aggregate;
use bikeshare_explorer::config::{CityFiles, Config};
use bikeshare_explorer::filter::filter;
use bikeshare_explorer::output::{
    ReportSummary, append_summary, print_pretty, render_report, write_json,
};
use bikeshare_explorer::parser::load_trips;
use bikeshare_explorer::selection::{
    City, DayFilter, FilterSpec, MonthFilter, parse_city, parse_day, parse_month,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::interactive::Session;

#[derive(Parser)]
#[command(name = "bikeshare_explorer")]
#[command(about = "Explore US bikeshare trip data", long_about = None)]
struct Cli {
    /// Directory holding the city CSV files (overrides BIKESHARE_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// JSON file mapping city names to CSV paths
    #[arg(long, global = true, value_name = "FILE")]
    city_files: Option<PathBuf>,

    /// Raw rows shown per page (overrides BIKESHARE_PAGE_SIZE)
    #[arg(long, global = true)]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: choose a city and filters, browse rows, read statistics
    Explore,
    /// Compute statistics for one city and filter without prompting
    Stats {
        /// chicago, new york city or washington
        #[arg(long, value_parser = parse_city)]
        city: City,

        /// "all" or january..june
        #[arg(long, default_value = "all", value_parser = parse_month)]
        month: MonthFilter,

        /// "all" or monday..sunday
        #[arg(long, default_value = "all", value_parser = parse_day)]
        day: DayFilter,

        /// Print the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        /// CSV file to append a one-line summary to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/bikeshare_explorer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_explorer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command.unwrap_or(Commands::Explore) {
        Commands::Explore => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            Session::new(stdin.lock(), stdout.lock(), config).run()?;
        }
        Commands::Stats {
            city,
            month,
            day,
            json,
            output,
        } => {
            stats(&config, city, FilterSpec::new(month, day), json, output.as_deref())?;
        }
    }

    Ok(())
}

/// Environment first, then command-line overrides.
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(size) = cli.page_size {
        anyhow::ensure!(size > 0, "--page-size must be greater than zero");
        config.page_size = size;
    }
    if let Some(path) = &cli.city_files {
        config.city_files = CityFiles::load(path)?;
    }

    Ok(config)
}

#[tracing::instrument(skip(config, output), fields(city = %city, month = %spec.month, day = %spec.day))]
fn stats(
    config: &Config,
    city: City,
    spec: FilterSpec,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let path = config.path_for(city);
    let dataset = load_trips(&path).with_context(|| format!("loading trips for {city}"))?;
    let view = filter(&dataset, &spec);
    let report = aggregate(&view);
    print_pretty(&report);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        write_json(&mut out, &report)?;
    } else {
        write!(out, "{}", render_report(&report))?;
    }

    if let Some(output) = output {
        append_summary(output, &ReportSummary::new(city, &spec, &report))?;
        info!(output = %output.display(), "Summary appended");
    }

    Ok(())
}
