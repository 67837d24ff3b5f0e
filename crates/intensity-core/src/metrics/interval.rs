//! Interval-level intensity.
//!
//! The share of the region that changed category during the interval,
//! annualized and expressed as percent of area per year:
//!
//!   S_t = (changed / total) / duration × 100
//!
//! `S_t` is 0 when the table holds no pixels.
use serde::{Deserialize, Serialize};

use super::annual_percent;
use crate::transition::TransitionTable;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalIntensity {
    pub total_pixels: u64,
    pub persist_pixels: u64,
    /// `total_pixels - persist_pixels`.
    pub changed_pixels: u64,
    /// Percent of area changing per year.
    pub intensity: f64,
}

pub fn compute_interval_intensity(table: &TransitionTable, duration_years: u32) -> IntervalIntensity {
    let total_pixels = table.total_pixels();
    let persist_pixels = table.persist_pixels();
    let changed_pixels = total_pixels - persist_pixels;

    IntervalIntensity {
        total_pixels,
        persist_pixels,
        changed_pixels,
        intensity: annual_percent(changed_pixels, total_pixels, duration_years),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::ClassScheme;
    use crate::transition::RawHistogram;
    use approx::assert_relative_eq;

    fn table(entries: &[(&str, u64)]) -> TransitionTable {
        let hist: RawHistogram = entries.iter().map(|&(k, v)| (k, v)).collect();
        TransitionTable::from_histogram(&hist, &ClassScheme::reference()).unwrap()
    }

    #[test]
    fn single_interval_scenario() {
        let t = table(&[("101", 50), ("102", 30), ("202", 20)]);
        let r = compute_interval_intensity(&t, 5);
        assert_eq!(r.total_pixels, 100);
        assert_eq!(r.persist_pixels, 70);
        assert_eq!(r.changed_pixels, 30);
        assert_relative_eq!(r.intensity, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_table_has_zero_intensity() {
        let t = table(&[]);
        let r = compute_interval_intensity(&t, 5);
        assert_eq!(r.total_pixels, 0);
        assert_eq!(r.intensity, 0.0);
    }

    #[test]
    fn zero_count_records_do_not_divide_by_zero() {
        let t = table(&[("101", 0), ("203", 0)]);
        let r = compute_interval_intensity(&t, 2);
        assert_eq!(r.changed_pixels, 0);
        assert_eq!(r.intensity, 0.0);
    }

    #[test]
    fn full_persistence_is_zero_change() {
        let t = table(&[("101", 40), ("909", 60)]);
        let r = compute_interval_intensity(&t, 10);
        assert!(r.persist_pixels <= r.total_pixels);
        assert_eq!(r.changed_pixels, 0);
        assert_eq!(r.intensity, 0.0);
    }
}
