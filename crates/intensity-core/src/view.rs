//! Presentation-ready views over a completed [`AnalysisRun`].
//!
//! Views are pure reads: switching scope never touches the histogrammer and
//! costs O(intervals × classes).

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::analysis::AnalysisRun;
use crate::classes::ClassId;
use crate::error::Result;

/// Which intervals the category view summarises.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Scope {
    /// Mean over all intervals, read against the uniform intensity.
    Average,
    /// One interval by label, read against that interval's intensity.
    Interval(String),
}

impl Scope {
    /// Dropdown label of the averaged scope.
    pub const AVERAGE_LABEL: &'static str = "Average (All Years)";

    /// Parse a dropdown label; anything other than the average label (or
    /// plain `"average"`) names an interval.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed == Self::AVERAGE_LABEL || trimmed.eq_ignore_ascii_case("average") {
            Scope::Average
        } else {
            Scope::Interval(trimmed.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Scope::Average => Self::AVERAGE_LABEL,
            Scope::Interval(label) => label,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Scope {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Scope::parse(s))
    }
}

impl From<String> for Scope {
    fn from(label: String) -> Self {
        Scope::parse(&label)
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.label().to_string()
    }
}

/// Interval intensity relative to the uniform line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalBehavior {
    Fast,
    Slow,
}

/// Category intensity relative to the scope's reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryBehavior {
    Active,
    Dormant,
}

impl CategoryBehavior {
    fn against(intensity: f64, reference: f64) -> Self {
        if intensity > reference {
            CategoryBehavior::Active
        } else {
            CategoryBehavior::Dormant
        }
    }
}

// ── Interval level ────────────────────────────────────────────────────────────

/// Interval chart data: one bar per interval plus the uniform line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSeries {
    pub labels: Vec<String>,
    pub intensities: Vec<f64>,
    pub uniform_intensity: f64,
    pub behaviors: Vec<IntervalBehavior>,
}

pub fn interval_series(run: &AnalysisRun) -> IntervalSeries {
    let uniform = run.global_uniform_intensity();
    let intensities: Vec<f64> = run.intervals().iter().map(|r| r.interval_intensity).collect();
    let behaviors = intensities
        .iter()
        .map(|&s| if s > uniform { IntervalBehavior::Fast } else { IntervalBehavior::Slow })
        .collect();

    IntervalSeries {
        labels: run.labels(),
        intensities,
        uniform_intensity: uniform,
        behaviors,
    }
}

// ── Category level ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub class_id: ClassId,
    pub name: String,
    pub gain_intensity: f64,
    pub loss_intensity: f64,
    pub gain_behavior: CategoryBehavior,
    pub loss_behavior: CategoryBehavior,
    /// Intervals in the scope where the class occupied any pixel.
    pub intervals_observed: usize,
}

/// Category chart data for one scope. Rows follow scheme order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryView {
    pub scope: Scope,
    pub title: String,
    pub reference_intensity: f64,
    pub legend: String,
    pub rows: Vec<CategoryRow>,
}

impl CategoryView {
    pub fn class_names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn gains(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.gain_intensity).collect()
    }

    pub fn losses(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.loss_intensity).collect()
    }

    /// The reference value repeated once per row, for drawing as a line.
    pub fn reference_line(&self) -> Vec<f64> {
        vec![self.reference_intensity; self.rows.len()]
    }

    pub fn row(&self, class_id: ClassId) -> Option<&CategoryRow> {
        self.rows.iter().find(|r| r.class_id == class_id)
    }
}

/// Dropdown entries: the average scope first, then every interval label.
pub fn scope_options(run: &AnalysisRun) -> Vec<String> {
    std::iter::once(Scope::AVERAGE_LABEL.to_string()).chain(run.labels()).collect()
}

/// Category gain/loss intensities and reference line for `scope`.
///
/// `Average` takes the arithmetic mean of each class's intensities over the
/// intervals of the run, counting an interval where the class is absent as
/// zero; a class never observed keeps zero intensities. Fails with `UnknownInterval` for a label not in `run`.
pub fn category_view(run: &AnalysisRun, scope: &Scope) -> Result<CategoryView> {
    let scheme = run.scheme();

    let (reference, title, legend, stats): (f64, String, String, Vec<(ClassId, f64, f64, usize)>) = match scope {
        Scope::Average => {
            // (gain sum, loss sum, stat entries, observed intervals)
            let mut sums = vec![(0.0f64, 0.0f64, 0usize, 0usize); scheme.len()];
            for result in run.intervals() {
                for stat in &result.category_stats {
                    if let Some(i) = scheme.index_of(stat.class_id) {
                        sums[i].0 += stat.gain_intensity;
                        sums[i].1 += stat.loss_intensity;
                        sums[i].2 += 1;
                        sums[i].3 += usize::from(stat.observed());
                    }
                }
            }
            let stats = scheme
                .ids()
                .zip(sums)
                .map(|(id, (gain, loss, n, observed))| {
                    if n == 0 {
                        (id, 0.0, 0.0, observed)
                    } else {
                        (id, gain / n as f64, loss / n as f64, observed)
                    }
                })
                .collect();
            (
                run.global_uniform_intensity(),
                "Category Level (Average)".to_string(),
                "Dashed line = Uniform Intensity (U)".to_string(),
                stats,
            )
        }
        Scope::Interval(label) => {
            let result = run.interval(label)?;
            let stats = result
                .category_stats
                .iter()
                .map(|s| (s.class_id, s.gain_intensity, s.loss_intensity, usize::from(s.observed())))
                .collect();
            (
                result.interval_intensity,
                format!("Category Level ({label})"),
                format!("Dashed line = Interval Intensity ({label})"),
                stats,
            )
        }
    };

    let rows = stats
        .into_iter()
        .map(|(class_id, gain, loss, observed)| CategoryRow {
            class_id,
            name: scheme.name(class_id).unwrap_or_default().to_string(),
            gain_intensity: gain,
            loss_intensity: loss,
            gain_behavior: CategoryBehavior::against(gain, reference),
            loss_behavior: CategoryBehavior::against(loss, reference),
            intervals_observed: observed,
        })
        .collect();

    Ok(CategoryView {
        scope: scope.clone(),
        title,
        reference_intensity: reference,
        legend,
        rows,
    })
}
