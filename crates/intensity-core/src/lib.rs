//! # Intensity Core
//!
//! Land-cover change Intensity Analysis over a time series of classified
//! rasters, at two levels:
//! - **interval**: how fast the region changes in each time interval,
//!   compared with the uniform intensity of the whole series;
//! - **category**: how fast each class gains and loses area within an
//!   interval, compared with that interval's intensity.
//!
//! The engine never touches pixels. It consumes per-interval transition
//! histograms from a [`ZonalHistogrammer`] and returns plain data for a
//! presentation layer.

pub mod analysis;
pub mod classes;
pub mod config;
pub mod context;
pub mod error;
pub mod histogram;
pub mod interval;
mod maybe_rayon;
pub mod metrics;
pub mod session;
pub mod transition;
pub mod view;

pub use analysis::{run_analysis, AnalysisRun, IntervalResult};
pub use classes::{ClassId, ClassScheme, LandCoverClass};
pub use config::{AnalysisConfig, AnalysisRequest};
pub use context::{AnalysisContext, RegionKey, Resolution};
pub use error::{IntensityError, Result};
pub use histogram::{HistogramRequest, StoredHistograms, ZonalHistogrammer};
pub use interval::Interval;
pub use metrics::CategoryStat;
pub use session::{AnalysisSession, RunTicket};
pub use transition::{RawHistogram, TransitionRecord, TransitionTable};
pub use view::{category_view, interval_series, scope_options, CategoryView, IntervalSeries, Scope};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{run_analysis, AnalysisRun, IntervalResult};
    pub use crate::classes::{ClassId, ClassScheme};
    pub use crate::context::{AnalysisContext, RegionKey, Resolution};
    pub use crate::error::{IntensityError, Result};
    pub use crate::histogram::{HistogramRequest, StoredHistograms, ZonalHistogrammer};
    pub use crate::session::AnalysisSession;
    pub use crate::view::{category_view, interval_series, CategoryView, IntervalSeries, Scope};
}
