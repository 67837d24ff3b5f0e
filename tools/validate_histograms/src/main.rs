/// Validation tool: decode every stored histogram of a request and check
/// key integrity, coverage and gain/loss conservation per interval.

use anyhow::{bail, Context, Result};
use clap::Parser;
use intensity_core::metrics::{compute_category_intensity, compute_interval_intensity};
use intensity_core::{AnalysisContext, AnalysisRequest, TransitionTable};
use std::fs;

#[derive(Parser, Debug)]
#[command(name = "validate_histograms", about = "Check a request's transition histograms before analysis")]
struct Args {
    /// Request JSON file to validate.
    #[arg(short, long)]
    input: String,
}

/// Outcome for one interval of the request.
#[derive(Debug, PartialEq)]
struct IntervalCheck {
    label: String,
    total_pixels: u64,
    changed_pixels: u64,
    problems: Vec<String>,
}

fn check_request(request: &AnalysisRequest) -> Result<Vec<IntervalCheck>> {
    let context = AnalysisContext::from_config(&request.config).context("invalid analysis config")?;
    let scheme = context.scheme();
    let mut checks = Vec::new();

    for interval in context.intervals() {
        let label = interval.label();
        let mut check = IntervalCheck { label: label.clone(), total_pixels: 0, changed_pixels: 0, problems: Vec::new() };

        let Some(histogram) = request.histograms.get(&label) else {
            check.problems.push("no histogram".into());
            checks.push(check);
            continue;
        };
        let table = match TransitionTable::from_histogram(histogram, scheme) {
            Ok(t) => t,
            Err(e) => {
                check.problems.push(e.to_string());
                checks.push(check);
                continue;
            }
        };

        let level = compute_interval_intensity(&table, interval.duration_years());
        check.total_pixels = level.total_pixels;
        check.changed_pixels = level.changed_pixels;
        if level.total_pixels == 0 {
            check.problems.push("zero valid pixels".into());
        }

        let stats = compute_category_intensity(&table, interval.duration_years(), scheme);
        let gains: u64 = stats.iter().map(|s| s.gain_pixels).sum();
        let losses: u64 = stats.iter().map(|s| s.loss_pixels).sum();
        if gains != level.changed_pixels || losses != level.changed_pixels {
            check.problems.push(format!(
                "conservation broken: gains {gains}, losses {losses}, changed {}",
                level.changed_pixels
            ));
        }
        checks.push(check);
    }

    let known: Vec<String> = context.intervals().iter().map(|i| i.label()).collect();
    for (label, _) in request.histograms.iter() {
        if !known.iter().any(|k| k == label) {
            checks.push(IntervalCheck {
                label: label.to_string(),
                total_pixels: 0,
                changed_pixels: 0,
                problems: vec!["histogram for an interval outside the analysis years".into()],
            });
        }
    }
    Ok(checks)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let text = fs::read_to_string(&args.input).with_context(|| format!("reading {}", args.input))?;
    let request = AnalysisRequest::from_json(&text).with_context(|| format!("parsing {}", args.input))?;

    let checks = check_request(&request)?;
    eprintln!("{:<12} {:>12} {:>12}  Status", "Interval", "Pixels", "Changed");
    eprintln!("{}", "-".repeat(50));
    let mut failed = 0usize;
    for c in &checks {
        let status = if c.problems.is_empty() { "ok".to_string() } else { c.problems.join("; ") };
        eprintln!("{:<12} {:>12} {:>12}  {}", c.label, c.total_pixels, c.changed_pixels, status);
        if !c.problems.is_empty() {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} intervals failed validation", checks.len());
    }
    eprintln!("All {} intervals valid.", checks.len());
    Ok(())
}
