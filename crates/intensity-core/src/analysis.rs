//! Analysis orchestrator: histogram fan-out → transition tables → interval and
//! category intensities → uniform baseline.
//!
//! Pipeline for one run:
//!   1. One histogram request per interval (concurrent under `threading`).
//!   2. Decode each histogram into a transition table.
//!   3. Interval- and category-level intensities per interval.
//!   4. Global uniform intensity over the completed series.
//!
//! Results are assembled in interval order whatever the completion order.
//! A run is only constructed once every interval has succeeded; the first
//! failing interval (in interval order) aborts the whole run.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::classes::ClassScheme;
use crate::context::{AnalysisContext, RegionKey, Resolution};
use crate::error::{IntensityError, Result};
use crate::histogram::{HistogramRequest, ZonalHistogrammer};
use crate::interval::Interval;
use crate::maybe_rayon::*;
use crate::metrics::{
    compute_category_intensity, compute_interval_intensity, compute_uniform_intensity, CategoryStat,
    IntervalIntensity,
};
use crate::transition::TransitionTable;

// ── Per-interval result ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalResult {
    pub interval: Interval,
    pub total_pixels: u64,
    pub persist_pixels: u64,
    pub changed_pixels: u64,
    /// Percent of area changing per year (S_t).
    pub interval_intensity: f64,
    /// One entry per scheme class, in scheme order.
    pub category_stats: Vec<CategoryStat>,
}

impl IntervalResult {
    /// Compute both levels from one interval's transition table.
    pub fn from_table(interval: Interval, table: &TransitionTable, scheme: &ClassScheme) -> Self {
        let duration = interval.duration_years();
        let level = compute_interval_intensity(table, duration);
        Self {
            interval,
            total_pixels: level.total_pixels,
            persist_pixels: level.persist_pixels,
            changed_pixels: level.changed_pixels,
            interval_intensity: level.intensity,
            category_stats: compute_category_intensity(table, duration, scheme),
        }
    }

    pub fn label(&self) -> String {
        self.interval.label()
    }

    pub fn level(&self) -> IntervalIntensity {
        IntervalIntensity {
            total_pixels: self.total_pixels,
            persist_pixels: self.persist_pixels,
            changed_pixels: self.changed_pixels,
            intensity: self.interval_intensity,
        }
    }
}

// ── Completed run ─────────────────────────────────────────────────────────────

/// Every interval of one region + resolution selection, plus the uniform
/// intensity derived from all of them. Never partially populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RunRecord")]
pub struct AnalysisRun {
    region: RegionKey,
    resolution: Resolution,
    scheme: ClassScheme,
    intervals: Vec<IntervalResult>,
    global_uniform_intensity: f64,
}

/// Unvalidated wire form of [`AnalysisRun`].
#[derive(Deserialize)]
struct RunRecord {
    region: RegionKey,
    resolution: Resolution,
    scheme: ClassScheme,
    intervals: Vec<IntervalResult>,
}

impl TryFrom<RunRecord> for AnalysisRun {
    type Error = IntensityError;

    fn try_from(record: RunRecord) -> Result<Self> {
        Self::new(record.region, record.resolution, record.scheme, record.intervals)
    }
}

impl AnalysisRun {
    /// Assemble a run from completed intervals; the uniform intensity is
    /// computed here, once.
    pub fn new(
        region: RegionKey,
        resolution: Resolution,
        scheme: ClassScheme,
        intervals: Vec<IntervalResult>,
    ) -> Result<Self> {
        if intervals.is_empty() {
            return Err(IntensityError::EmptyAnalysisRun);
        }
        let levels: Vec<(Interval, IntervalIntensity)> =
            intervals.iter().map(|r| (r.interval, r.level())).collect();
        let global_uniform_intensity = compute_uniform_intensity(&levels);
        Ok(Self { region, resolution, scheme, intervals, global_uniform_intensity })
    }

    pub fn region(&self) -> &RegionKey {
        &self.region
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn scheme(&self) -> &ClassScheme {
        &self.scheme
    }

    pub fn intervals(&self) -> &[IntervalResult] {
        &self.intervals
    }

    /// U: the reference line for interval intensities.
    pub fn global_uniform_intensity(&self) -> f64 {
        self.global_uniform_intensity
    }

    pub fn labels(&self) -> Vec<String> {
        self.intervals.iter().map(IntervalResult::label).collect()
    }

    /// The interval whose label is `label`.
    pub fn interval(&self, label: &str) -> Result<&IntervalResult> {
        self.intervals
            .iter()
            .find(|r| r.interval.label() == label)
            .ok_or_else(|| IntensityError::UnknownInterval(label.to_string()))
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Query, decode and measure a single interval.
pub fn analyze_interval<H>(context: &AnalysisContext, histogrammer: &H, interval: Interval) -> Result<IntervalResult>
where
    H: ZonalHistogrammer + ?Sized,
{
    let request = HistogramRequest {
        region: context.region(),
        interval,
        resolution: context.resolution(),
    };
    let histogram = histogrammer.transition_histogram(&request)?;
    let table = TransitionTable::from_histogram(&histogram, context.scheme())?;
    if table.total_pixels() == 0 {
        return Err(request.insufficient_coverage());
    }

    let result = IntervalResult::from_table(interval, &table, context.scheme());
    debug!(
        "interval {}: {} px, {} changed, S_t = {:.4}%/yr",
        interval, result.total_pixels, result.changed_pixels, result.interval_intensity
    );
    Ok(result)
}

/// Run the full analysis for `context`.
pub fn run_analysis<H>(context: &AnalysisContext, histogrammer: &H) -> Result<AnalysisRun>
where
    H: ZonalHistogrammer + ?Sized,
{
    let outcomes: Vec<Result<IntervalResult>> = context
        .intervals()
        .to_vec()
        .into_par_iter()
        .map(|interval| analyze_interval(context, histogrammer, interval))
        .collect();
    let intervals = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

    let run = AnalysisRun::new(
        context.region().clone(),
        context.resolution(),
        context.scheme().clone(),
        intervals,
    )?;
    info!(
        "analysis of {} at {} m: {} intervals, U = {:.4}%/yr",
        run.region(),
        run.resolution().metres(),
        run.intervals().len(),
        run.global_uniform_intensity()
    );
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::ClassId;
    use crate::histogram::StoredHistograms;
    use crate::transition::RawHistogram;
    use approx::assert_relative_eq;

    fn hist(entries: &[(&str, u64)]) -> RawHistogram {
        entries.iter().map(|&(k, v)| (k, v)).collect()
    }

    fn two_interval_context() -> (AnalysisContext, StoredHistograms) {
        let ctx = AnalysisContext::new(
            RegionKey::new("EAF"),
            Resolution::default(),
            ClassScheme::reference(),
            &[2000, 2005, 2015],
        )
        .unwrap();
        let mut stored = StoredHistograms::new();
        stored.insert(ctx.intervals()[0], hist(&[("101", 50), ("102", 30), ("202", 20)]));
        stored.insert(ctx.intervals()[1], hist(&[("101", 100), ("201", 40), ("202", 60)]));
        (ctx, stored)
    }

    #[test]
    fn run_assembles_intervals_in_order() {
        let (ctx, stored) = two_interval_context();
        let run = run_analysis(&ctx, &stored).unwrap();

        assert_eq!(run.labels(), vec!["2000-2005", "2005-2015"]);
        let first = &run.intervals()[0];
        assert_eq!((first.total_pixels, first.changed_pixels), (100, 30));
        assert_relative_eq!(first.interval_intensity, 6.0, epsilon = 1e-12);
        let second = &run.intervals()[1];
        assert_eq!((second.total_pixels, second.changed_pixels), (200, 40));
        assert_relative_eq!(second.interval_intensity, 2.0, epsilon = 1e-12);

        // (70 / 150) / 15 × 100
        assert_relative_eq!(run.global_uniform_intensity(), 70.0 / 150.0 / 15.0 * 100.0, epsilon = 1e-12);
    }

    #[test]
    fn category_stats_cover_the_whole_scheme() {
        let (ctx, stored) = two_interval_context();
        let run = run_analysis(&ctx, &stored).unwrap();
        for result in run.intervals() {
            assert_eq!(result.category_stats.len(), 10);
            assert_eq!(result.category_stats[0].class_id, ClassId(1));
        }
    }

    #[test]
    fn missing_interval_surfaces_coverage_error() {
        let (ctx, _) = two_interval_context();
        let mut stored = StoredHistograms::new();
        stored.insert(ctx.intervals()[0], hist(&[("101", 1)]));
        let err = run_analysis(&ctx, &stored).unwrap_err();
        assert!(matches!(err, IntensityError::InsufficientCoverage { ref interval, .. } if interval == "2005-2015"));
    }

    #[test]
    fn malformed_key_aborts_run() {
        let (ctx, mut stored) = two_interval_context();
        stored.insert(ctx.intervals()[1], hist(&[("101", 1), ("1099", 3)]));
        assert!(matches!(
            run_analysis(&ctx, &stored),
            Err(IntensityError::MalformedTransitionKey { .. })
        ));
    }

    #[test]
    fn all_zero_histogram_from_histogrammer_is_insufficient_coverage() {
        struct ZeroCounts;
        impl ZonalHistogrammer for ZeroCounts {
            fn transition_histogram(&self, _request: &HistogramRequest<'_>) -> Result<RawHistogram> {
                Ok([("101", 0u64)].into_iter().collect())
            }
        }
        let (ctx, _) = two_interval_context();
        assert!(matches!(
            run_analysis(&ctx, &ZeroCounts),
            Err(IntensityError::InsufficientCoverage { .. })
        ));
    }

    #[test]
    fn unknown_label_lookup_fails() {
        let (ctx, stored) = two_interval_context();
        let run = run_analysis(&ctx, &stored).unwrap();
        assert!(run.interval("2005-2015").is_ok());
        assert_eq!(
            run.interval("1999-2000").unwrap_err(),
            IntensityError::UnknownInterval("1999-2000".into())
        );
    }

    #[test]
    fn empty_run_is_rejected() {
        let err = AnalysisRun::new(RegionKey::new("x"), Resolution::default(), ClassScheme::reference(), Vec::new())
            .unwrap_err();
        assert_eq!(err, IntensityError::EmptyAnalysisRun);
    }

    #[test]
    fn run_survives_json_round_trip_with_recomputed_baseline() {
        let (ctx, stored) = two_interval_context();
        let run = run_analysis(&ctx, &stored).unwrap();
        let json = serde_json::to_string(&run).unwrap();
        let back: AnalysisRun = serde_json::from_str(&json).unwrap();
        assert_eq!(back.labels(), run.labels());
        assert_relative_eq!(back.global_uniform_intensity(), run.global_uniform_intensity());
    }
}
