//! Category-level gain and loss intensities.
//!
//! For each class `c` of the scheme:
//!
//!   loss_intensity(c) = (start_c − persist_c) / start_c / duration × 100
//!   gain_intensity(c) = (end_c   − persist_c) / end_c   / duration × 100
//!
//! Loss is normalized by the area the class had at the start of the interval,
//! gain by the area it has at the end. Each intensity is 0 when its
//! denominator is 0.
//!
//! Every scheme class yields a stat, including classes absent from the
//! interval (`observed == false`, zero intensities).
use serde::{Deserialize, Serialize};

use super::annual_percent;
use crate::classes::{ClassId, ClassScheme};
use crate::transition::TransitionTable;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub class_id: ClassId,
    /// Percent of the class's end-of-interval area gained per year.
    pub gain_intensity: f64,
    /// Percent of the class's start-of-interval area lost per year.
    pub loss_intensity: f64,
    pub start_pixels: u64,
    pub end_pixels: u64,
    pub persist_pixels: u64,
    pub gain_pixels: u64,
    pub loss_pixels: u64,
}

impl CategoryStat {
    /// True when the class occupies any pixel at either end of the interval.
    pub fn observed(&self) -> bool {
        self.start_pixels > 0 || self.end_pixels > 0
    }
}

/// One stat per scheme class, in scheme order.
pub fn compute_category_intensity(
    table: &TransitionTable,
    duration_years: u32,
    scheme: &ClassScheme,
) -> Vec<CategoryStat> {
    scheme
        .ids()
        .map(|class_id| {
            let totals = table.class_totals(class_id);
            let loss_pixels = totals.loss_pixels();
            let gain_pixels = totals.gain_pixels();
            CategoryStat {
                class_id,
                gain_intensity: annual_percent(gain_pixels, totals.end_pixels, duration_years),
                loss_intensity: annual_percent(loss_pixels, totals.start_pixels, duration_years),
                start_pixels: totals.start_pixels,
                end_pixels: totals.end_pixels,
                persist_pixels: totals.persist_pixels,
                gain_pixels,
                loss_pixels,
            }
        })
        .collect()
}
