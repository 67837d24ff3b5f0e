//! Uniform intensity across the whole time series.
//!
//!   U = (Σ changed / mean(total)) / Σ duration × 100
//!
//! The annual rate the series would show if all of its change were spread
//! evenly over the years. Interval intensities are read against this line.
use crate::interval::Interval;
use super::interval::IntervalIntensity;

/// Global uniform intensity over `(interval, interval-level result)` pairs.
///
/// Order-independent. Returns 0 for an empty slice or when every interval
/// has zero pixels.
pub fn compute_uniform_intensity(intervals: &[(Interval, IntervalIntensity)]) -> f64 {
    if intervals.is_empty() {
        return 0.0;
    }

    let total_pixels: u64 = intervals.iter().map(|(_, r)| r.total_pixels).sum();
    let total_changed: u64 = intervals.iter().map(|(_, r)| r.changed_pixels).sum();
    let total_duration: u64 = intervals.iter().map(|(i, _)| i.duration_years() as u64).sum();

    let mean_total = total_pixels as f64 / intervals.len() as f64;
    if mean_total <= 0.0 || total_duration == 0 {
        return 0.0;
    }
    (total_changed as f64 / mean_total) / total_duration as f64 * 100.0
}
