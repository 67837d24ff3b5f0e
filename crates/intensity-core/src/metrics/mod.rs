//! Intensity calculators: interval level, category level and the uniform
//! baseline shared by all intervals.
pub mod category;
pub mod interval;
pub mod uniform;

pub use category::{compute_category_intensity, CategoryStat};
pub use interval::{compute_interval_intensity, IntervalIntensity};
pub use uniform::compute_uniform_intensity;

/// Annualized percentage: `part / whole / duration × 100`, zero when `whole` is zero.
#[inline]
pub(crate) fn annual_percent(part: u64, whole: u64, duration_years: u32) -> f64 {
    if whole == 0 || duration_years == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) / duration_years as f64 * 100.0
}
