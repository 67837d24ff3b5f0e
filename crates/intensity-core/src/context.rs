//! Explicit analysis context: what to analyse, where, and at which resolution.
//!
//! A context is immutable. Changing the region or resolution produces a new
//! context, which in turn produces a new [`crate::analysis::AnalysisRun`].
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::classes::ClassScheme;
use crate::config::AnalysisConfig;
use crate::error::{IntensityError, Result};
use crate::interval::{intervals_from_years, Interval};

/// Opaque region selection key handed to the histogrammer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionKey(pub String);

impl RegionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sampling resolution in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Resolution(u32);

impl Resolution {
    pub const MIN_M: u32 = 250;
    pub const MAX_M: u32 = 10_000;
    pub const STEP_M: u32 = 250;
    pub const DEFAULT_M: u32 = 5_000;

    pub fn new(metres: u32) -> Result<Self> {
        if !(Self::MIN_M..=Self::MAX_M).contains(&metres) {
            return Err(IntensityError::InvalidResolution {
                value: metres,
                reason: format!("outside {}..={} m", Self::MIN_M, Self::MAX_M),
            });
        }
        if metres % Self::STEP_M != 0 {
            return Err(IntensityError::InvalidResolution {
                value: metres,
                reason: format!("not a multiple of {} m", Self::STEP_M),
            });
        }
        Ok(Self(metres))
    }

    pub fn metres(&self) -> u32 {
        self.0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(Self::DEFAULT_M)
    }
}

impl TryFrom<u32> for Resolution {
    type Error = IntensityError;

    fn try_from(metres: u32) -> Result<Self> {
        Self::new(metres)
    }
}

impl From<Resolution> for u32 {
    fn from(r: Resolution) -> Self {
        r.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    region: RegionKey,
    resolution: Resolution,
    scheme: Arc<ClassScheme>,
    intervals: Vec<Interval>,
}

impl AnalysisContext {
    pub fn new(region: RegionKey, resolution: Resolution, scheme: ClassScheme, years: &[i32]) -> Result<Self> {
        Ok(Self {
            region,
            resolution,
            scheme: Arc::new(scheme),
            intervals: intervals_from_years(years)?,
        })
    }

    /// Validate a config into a context.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Self::new(
            RegionKey::new(config.region.clone()),
            Resolution::new(config.resolution_m)?,
            config.scheme(),
            &config.years,
        )
    }

    /// Same analysis over another region.
    pub fn with_region(&self, region: RegionKey) -> Self {
        Self { region, ..self.clone() }
    }

    /// Same analysis at another sampling resolution.
    pub fn with_resolution(&self, resolution: Resolution) -> Self {
        Self { resolution, ..self.clone() }
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

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_bounds_and_step() {
        assert!(Resolution::new(250).is_ok());
        assert!(Resolution::new(10_000).is_ok());
        assert!(Resolution::new(0).is_err());
        assert!(Resolution::new(10_250).is_err());
        assert!(Resolution::new(1_100).is_err());
        assert_eq!(Resolution::default().metres(), 5_000);
    }

    #[test]
    fn config_becomes_context() {
        let ctx = AnalysisContext::from_config(&AnalysisConfig::default()).unwrap();
        assert_eq!(ctx.intervals().len(), 8);
        assert_eq!(ctx.region().as_str(), "Whole Africa");
        assert_eq!(ctx.scheme().len(), 10);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = AnalysisConfig { years: vec![2000], ..AnalysisConfig::default() };
        assert!(matches!(AnalysisContext::from_config(&cfg), Err(IntensityError::InvalidYears(_))));

        let cfg = AnalysisConfig { resolution_m: 100, ..AnalysisConfig::default() };
        assert!(matches!(
            AnalysisContext::from_config(&cfg),
            Err(IntensityError::InvalidResolution { value: 100, .. })
        ));
    }

    #[test]
    fn with_builders_leave_original_untouched() {
        let ctx = AnalysisContext::from_config(&AnalysisConfig::default()).unwrap();
        let med = ctx.with_region(RegionKey::new("MED")).with_resolution(Resolution::new(1000).unwrap());
        assert_eq!(ctx.region().as_str(), "Whole Africa");
        assert_eq!(ctx.resolution().metres(), 5000);
        assert_eq!(med.region().as_str(), "MED");
        assert_eq!(med.resolution().metres(), 1000);
        assert_eq!(med.intervals(), ctx.intervals());
    }
}
