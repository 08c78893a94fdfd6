//! Hurdle CLI binary.
//!
//! Command-line interface for the hurdle forward-return screener: screen a
//! single metric, or batch-run the reference metric list and persist one
//! plot per metric.

mod data;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use hurdle::{BinSpec, ForwardReturnScreen, ScreenConfig, ScreenResult};

/// Metric expressions of the reference batch run.
const DEFAULT_METRICS: &str = "price/epsNtm,entrVal/ebitdaNtm,entrVal/salesNtm,roe,pB";

#[derive(Parser)]
#[command(name = "hurdle")]
#[command(about = "Forward-return distributions for screened equities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen one metric and print its forward-return histogram
    Screen {
        /// CSV file with date, ticker_exchange, price, and fundamental columns
        file: PathBuf,

        /// Metric expression (a field like 'roe' or a ratio like 'price/epsNtm')
        #[arg(short, long)]
        metric: String,

        /// Keep equity-dates with metric strictly greater than this value
        #[arg(short, long, default_value = "30")]
        threshold: f64,

        /// Forward-return horizon in snapshot periods (fractions truncate)
        #[arg(short = 'T', long, default_value = "12")]
        timeframe: f64,

        /// Bin count, or 'auto'
        #[arg(short, long, default_value = "auto")]
        bins: BinSpec,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the histogram plot to this SVG file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run a list of metrics and write one plot per metric
    Batch {
        /// CSV file with date, ticker_exchange, price, and fundamental columns
        file: PathBuf,

        /// Metric expressions to screen
        #[arg(short, long, value_delimiter = ',', default_value = DEFAULT_METRICS)]
        metrics: Vec<String>,

        /// Keep equity-dates with metric strictly greater than this value
        #[arg(short, long, default_value = "30")]
        threshold: f64,

        /// Forward-return horizon in snapshot periods (fractions truncate)
        #[arg(short = 'T', long, default_value = "12")]
        timeframe: f64,

        /// Bin count, or 'auto'
        #[arg(short, long, default_value = "50")]
        bins: BinSpec,

        /// Directory for the generated SVG plots
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Screen {
            file,
            metric,
            threshold,
            timeframe,
            bins,
            format,
            out,
        } => {
            run_screen(&file, &metric, threshold, timeframe, bins, &format, out)?;
        }
        Commands::Batch {
            file,
            metrics,
            threshold,
            timeframe,
            bins,
            out_dir,
        } => {
            run_batch(&file, &metrics, threshold, timeframe, bins, &out_dir)?;
        }
    }

    Ok(())
}

/// Truncate a fractional timeframe toward the integer period count.
fn truncate_timeframe(timeframe: f64) -> Result<usize> {
    let periods = timeframe.trunc();
    if periods < 1.0 {
        bail!("timeframe must truncate to at least one period, got {timeframe}");
    }
    Ok(periods as usize)
}

fn run_screen(
    file: &Path,
    metric: &str,
    threshold: f64,
    timeframe: f64,
    bins: BinSpec,
    format: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let timeframe = truncate_timeframe(timeframe)?;
    let screen = ForwardReturnScreen::new(
        metric,
        ScreenConfig {
            threshold,
            timeframe,
            bins,
        },
    )?;

    let market_data = data::load_market_data(file)?;
    let result = screen.run(&market_data)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "text" => {
            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║                   Forward-Return Screen                      ║");
            println!("╚══════════════════════════════════════════════════════════════╝\n");

            println!("Metric:     {}", metric);
            println!("Threshold:  > {}", threshold);
            println!("Timeframe:  {} periods", timeframe);
            println!("Bins:       {}", bins);
            println!(
                "Data:       {} rows, {} columns ({})",
                market_data.len(),
                market_data.columns().len(),
                file.display()
            );
            println!();

            print_table(&result);
        }
        other => bail!("unknown output format '{}', use 'text' or 'json'", other),
    }

    if let Some(path) = out {
        fs::write(&path, result.render.to_svg())?;
        println!("Plot written to {}", path.display());
    }

    Ok(())
}

fn print_table(result: &ScreenResult) {
    if result.histogram.is_empty() {
        println!("No observations passed the screen.");
        return;
    }

    println!("{}", result.render.title);
    println!();
    println!("{:>10} {:>16}", "Frequency", "Binned_Return");
    println!("{}", "─".repeat(27));
    for (frequency, right_edge) in result.histogram.rows() {
        println!("{:>10} {:>16.6}", frequency, right_edge);
    }
    println!("{}", "─".repeat(27));
    println!(
        "{:>10} observations in {} bins",
        result.histogram.total(),
        result.histogram.len()
    );
    println!();
}

fn run_batch(
    file: &Path,
    metrics: &[String],
    threshold: f64,
    timeframe: f64,
    bins: BinSpec,
    out_dir: &Path,
) -> Result<()> {
    if metrics.is_empty() {
        bail!("no metrics specified");
    }

    let timeframe = truncate_timeframe(timeframe)?;
    let market_data = data::load_market_data(file)?;
    fs::create_dir_all(out_dir)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Forward-Return Batch Run                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!(
        "Data:       {} rows, {} columns ({})",
        market_data.len(),
        market_data.columns().len(),
        file.display()
    );
    println!("Threshold:  > {}", threshold);
    println!("Timeframe:  {} periods", timeframe);
    println!("Bins:       {}", bins);
    println!();

    for metric in metrics {
        let screen = ForwardReturnScreen::new(
            metric,
            ScreenConfig {
                threshold,
                timeframe,
                bins,
            },
        )?;
        let result = screen.run(&market_data)?;

        let path = out_dir.join(format!("{}.svg", screen.metric().file_stem()));
        fs::write(&path, result.render.to_svg())?;

        println!(
            "{:<20} {:>8} observations in {:>3} bins -> {}",
            metric,
            result.histogram.total(),
            result.histogram.len(),
            path.display()
        );
    }
    println!();

    Ok(())
}
