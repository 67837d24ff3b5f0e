/// Run an intensity analysis from a request file and print the interval and
/// category tables.
///
/// The request file carries the analysis config and the zonal histograms of
/// each interval (see `intensity_core::config`). Region and resolution may be
/// overridden on the command line.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use intensity_core::prelude::*;
use intensity_core::view::{scope_options, IntervalBehavior};
use intensity_core::AnalysisRequest;
use log::info;
use serde::Serialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "intensity", about = "Land-cover change intensity analysis (interval and category level)")]
struct Args {
    /// Request JSON: config plus per-interval transition histograms.
    #[arg(short, long)]
    input: PathBuf,

    /// Category scope: "average" or an interval label such as 1985-1990.
    #[arg(short, long, default_value = Scope::AVERAGE_LABEL)]
    scope: String,

    /// Override the request's region key.
    #[arg(short, long)]
    region: Option<String>,

    /// Override the request's sampling resolution (metres).
    #[arg(long)]
    resolution_m: Option<u32>,

    /// Write the run and both views as JSON to this path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List the available category scopes and exit.
    #[arg(long)]
    list_scopes: bool,
}

/// Everything the presentation layer needs, in one document.
#[derive(Serialize)]
struct Report<'a> {
    run: &'a AnalysisRun,
    interval_series: &'a IntervalSeries,
    category_view: &'a CategoryView,
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_interval_table(series: &IntervalSeries) {
    println!("Interval Level");
    println!("{:<12} {:>14} {:>8}", "Interval", "S_t (%/yr)", "");
    println!("{}", "-".repeat(36));
    for ((label, s), behavior) in series.labels.iter().zip(&series.intensities).zip(&series.behaviors) {
        let tag = match behavior {
            IntervalBehavior::Fast => "fast",
            IntervalBehavior::Slow => "slow",
        };
        println!("{label:<12} {s:>14.4} {tag:>8}");
    }
    println!("Global Uniform Intensity (U): {:.2}%", series.uniform_intensity);
}

fn print_category_table(view: &CategoryView) {
    println!("\n{}", view.title);
    println!(
        "{:<14} {:>12} {:>12} {:>10} {:>10} {:>6}",
        "Category", "Gain (%/yr)", "Loss (%/yr)", "Gain", "Loss", "N"
    );
    println!("{}", "-".repeat(70));
    for row in &view.rows {
        println!(
            "{:<14} {:>12.4} {:>12.4} {:>10} {:>10} {:>6}",
            row.name,
            row.gain_intensity,
            row.loss_intensity,
            format!("{:?}", row.gain_behavior),
            format!("{:?}", row.loss_behavior),
            row.intervals_observed,
        );
    }
    println!("Reference: {:.4}%/yr. {}", view.reference_intensity, view.legend);
}

/// Attach the remediation hint, if any, so the error is reported once.
fn with_hint(err: IntensityError) -> anyhow::Error {
    match err.hint() {
        Some(hint) => anyhow::anyhow!("{err}\n{hint}"),
        None => err.into(),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading request {}", args.input.display()))?;
    let mut request = AnalysisRequest::from_json(&text)
        .with_context(|| format!("parsing request {}", args.input.display()))?;
    if let Some(region) = args.region {
        request.config.region = region;
    }
    if let Some(res) = args.resolution_m {
        request.config.resolution_m = res;
    }

    let context = AnalysisContext::from_config(&request.config).context("invalid analysis config")?;
    info!(
        "analysing {} at {} m over {} intervals",
        context.region(),
        context.resolution().metres(),
        context.intervals().len()
    );

    let session = AnalysisSession::new();
    let run = session.run(context, &request.histograms).map_err(with_hint)?;

    if args.list_scopes {
        for option in scope_options(&run) {
            println!("{option}");
        }
        return Ok(());
    }

    let series = session.interval_series()?;
    let view = session
        .category_view(&Scope::parse(&args.scope))
        .with_context(|| format!("scope {:?}", args.scope))?;

    print_interval_table(&series);
    print_category_table(&view);

    if let Some(path) = args.output {
        let report = Report { run: &run, interval_series: &series, category_view: &view };
        fs::write(&path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("  -> {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_is_reported_once_with_the_error() {
        let err = IntensityError::InsufficientCoverage {
            interval: "2000-2005".into(),
            region: "SAH".into(),
            resolution_m: 5000,
        };
        let message = format!("{:#}", with_hint(err.clone()));
        assert_eq!(message.matches(&err.to_string()).count(), 1);
        assert!(message.ends_with(err.hint().unwrap()), "{message}");
    }

    #[test]
    fn test_error_without_hint_passes_through() {
        let err = IntensityError::UnknownInterval("1990-1995".into());
        assert_eq!(format!("{:#}", with_hint(err.clone())), err.to_string());
    }
}
