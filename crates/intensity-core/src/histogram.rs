//! Zonal histogrammer boundary.
//!
//! The histogrammer pairs the start and end rasters of an interval over a
//! region and returns the transition counts. It is the only long-latency
//! collaborator of the engine; requests for different intervals are
//! independent of each other.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::context::{RegionKey, Resolution};
use crate::error::{IntensityError, Result};
use crate::interval::Interval;
use crate::transition::RawHistogram;

/// One interval's histogram query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramRequest<'a> {
    pub region: &'a RegionKey,
    pub interval: Interval,
    pub resolution: Resolution,
}

impl HistogramRequest<'_> {
    /// The coverage error for this request.
    pub fn insufficient_coverage(&self) -> IntensityError {
        IntensityError::InsufficientCoverage {
            interval: self.interval.label(),
            region: self.region.to_string(),
            resolution_m: self.resolution.metres(),
        }
    }
}

/// Source of per-interval transition histograms.
///
/// Implementations fail with `InsufficientCoverage` when the region and
/// resolution yield no valid pixels. Retrying is the implementation's
/// concern, never the engine's.
pub trait ZonalHistogrammer: Send + Sync {
    fn transition_histogram(&self, request: &HistogramRequest<'_>) -> Result<RawHistogram>;
}

/// Precomputed histograms keyed by interval label (`"1985-1990"`).
///
/// Serves one region/resolution combination; the request's region and
/// resolution are not consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredHistograms(BTreeMap<String, RawHistogram>);

impl StoredHistograms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, interval: Interval, histogram: RawHistogram) {
        self.0.insert(interval.label(), histogram);
    }

    pub fn get(&self, label: &str) -> Option<&RawHistogram> {
        self.0.get(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawHistogram)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl ZonalHistogrammer for StoredHistograms {
    fn transition_histogram(&self, request: &HistogramRequest<'_>) -> Result<RawHistogram> {
        match self.0.get(&request.interval.label()) {
            Some(hist) if hist.total_pixels() > 0 => Ok(hist.clone()),
            _ => Err(request.insufficient_coverage()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_histograms_serve_by_label() {
        let interval = Interval::new(1985, 1990).unwrap();
        let mut stored = StoredHistograms::new();
        stored.insert(interval, [("101", 7u64)].into_iter().collect());

        let region = RegionKey::new("SAH");
        let request = HistogramRequest { region: &region, interval, resolution: Resolution::default() };
        assert_eq!(stored.transition_histogram(&request).unwrap().total_pixels(), 7);
    }

    #[test]
    fn missing_or_empty_histogram_is_insufficient_coverage() {
        let mut stored = StoredHistograms::new();
        stored.insert(Interval::new(1990, 1995).unwrap(), RawHistogram::new());
        let region = RegionKey::new("SAH");

        for interval in [Interval::new(1990, 1995).unwrap(), Interval::new(1995, 2000).unwrap()] {
            let request = HistogramRequest { region: &region, interval, resolution: Resolution::default() };
            let err = stored.transition_histogram(&request).unwrap_err();
            assert_eq!(
                err,
                IntensityError::InsufficientCoverage {
                    interval: interval.label(),
                    region: "SAH".into(),
                    resolution_m: 5000,
                }
            );
        }
    }
}
