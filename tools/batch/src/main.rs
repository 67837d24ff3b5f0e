//! Batch runner: analyses every request file in a directory in parallel and
//! writes one run JSON per request, then prints a per-region summary.
//! Request files are the same documents the `intensity` binary reads.

use anyhow::{bail, Context, Result};
use clap::Parser;
use intensity_core::prelude::*;
use intensity_core::AnalysisRequest;
use log::warn;
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "batch", about = "Run intensity analysis over a directory of request files")]
struct Args {
    /// Directory containing request JSON files.
    #[arg(short, long)]
    requests_dir: String,

    /// Output directory for per-request run JSON files.
    #[arg(short, long, default_value = "data/runs")]
    output: String,

    /// Process only requests for this region key (e.g. MED).
    #[arg(short = 'g', long)]
    region: Option<String>,

    /// Override the sampling resolution of every request (metres).
    #[arg(long)]
    resolution_m: Option<u32>,

    /// Fail the batch if any request fails.
    #[arg(long)]
    strict: bool,
}

// ── Output types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunDocument<'a> {
    source: String,
    run: &'a AnalysisRun,
    interval_series: IntervalSeries,
    average: CategoryView,
}

#[derive(Debug)]
struct Summary {
    name: String,
    region: String,
    resolution_m: u32,
    n_intervals: usize,
    uniform: f64,
    fastest: Option<(String, f64)>,
}

// ── Request discovery ─────────────────────────────────────────────────────────

fn discover_requests(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading requests_dir {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn load_request(path: &Path, resolution_m: Option<u32>) -> Result<AnalysisRequest> {
    let text = fs::read_to_string(path)?;
    let mut request =
        AnalysisRequest::from_json(&text).with_context(|| format!("parsing {}", path.display()))?;
    if let Some(res) = resolution_m {
        request.config.resolution_m = res;
    }
    Ok(request)
}

/// Fastest interval by intensity, if any.
fn fastest_interval(series: &IntervalSeries) -> Option<(String, f64)> {
    series
        .labels
        .iter()
        .zip(&series.intensities)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(label, &s)| (label.clone(), s))
}

fn process(path: &Path, request: &AnalysisRequest, out_dir: &Path) -> Result<Summary> {
    let context = AnalysisContext::from_config(&request.config)
        .with_context(|| format!("config of {}", path.display()))?;
    let run = run_analysis(&context, &request.histograms).map_err(|err| match err.hint() {
        Some(hint) => anyhow::anyhow!("{}: {err}. {hint}", path.display()),
        None => anyhow::anyhow!("{}: {err}", path.display()),
    })?;

    let series = interval_series(&run);
    let average = category_view(&run, &Scope::Average)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "request".into());

    let doc = RunDocument {
        source: path.display().to_string(),
        run: &run,
        interval_series: series.clone(),
        average,
    };
    let out_path = out_dir.join(format!("{name}.run.json"));
    fs::write(&out_path, serde_json::to_string_pretty(&doc)?)
        .with_context(|| format!("writing {}", out_path.display()))?;

    Ok(Summary {
        name,
        region: run.region().to_string(),
        resolution_m: run.resolution().metres(),
        n_intervals: run.intervals().len(),
        uniform: run.global_uniform_intensity(),
        fastest: fastest_interval(&series),
    })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let requests_dir = Path::new(&args.requests_dir);

    eprintln!("Discovering requests in {} ...", args.requests_dir);
    let paths = discover_requests(requests_dir)?;

    let mut requests = Vec::with_capacity(paths.len());
    for path in paths {
        match load_request(&path, args.resolution_m) {
            Ok(req) => requests.push((path, req)),
            Err(e) => warn!("{e:#}"),
        }
    }
    if let Some(ref region) = args.region {
        requests.retain(|(_, req)| &req.config.region == region);
    }

    let out_dir = Path::new(&args.output);
    fs::create_dir_all(out_dir)?;

    eprintln!("Processing {} requests ...", requests.len());
    let results: Vec<Result<Summary>> = requests
        .par_iter()
        .map(|(path, req)| process(path, req, out_dir))
        .collect();

    let mut summaries = Vec::new();
    let mut failures = 0usize;
    for res in results {
        match res {
            Ok(s) => summaries.push(s),
            Err(e) => {
                eprintln!("Warning: {e:#}");
                failures += 1;
            }
        }
    }
    if failures > 0 {
        eprintln!("{failures} requests skipped due to errors.");
        if args.strict {
            bail!("{failures} of {} requests failed", requests.len());
        }
    }

    eprintln!(
        "\n{:<20} {:<14} {:>7} {:>4} {:>9} {:>12} {:>9}",
        "Request", "Region", "Res(m)", "N", "U(%/yr)", "Fastest", "S_t"
    );
    eprintln!("{}", "-".repeat(82));
    for s in &summaries {
        let (fast_label, fast_s) = s.fastest.clone().unwrap_or_else(|| ("-".into(), 0.0));
        eprintln!(
            "{:<20} {:<14} {:>7} {:>4} {:>9.3} {:>12} {:>9.3}",
            s.name, s.region, s.resolution_m, s.n_intervals, s.uniform, fast_label, fast_s
        );
    }

    eprintln!("\nDone. {} run files in {}.", summaries.len(), args.output);
    Ok(())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
