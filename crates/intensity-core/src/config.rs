//! User-facing analysis configuration and request files.
//!
//! Defaults reproduce the reference deployment (Africa, GLC-FCS30D years,
//! 5 km sampling). A request file is a config plus the stored zonal
//! histograms for each interval:
//!
//! ```json
//! {
//!   "region": "MED",
//!   "resolution_m": 1000,
//!   "years": [1985, 1990, 1995],
//!   "histograms": {
//!     "1985-1990": { "101": 50, "102": 30, "202": 20 },
//!     "1990-1995": { "101": 45, "201": 5, "202": 50 }
//!   }
//! }
//! ```
use serde::{Deserialize, Serialize};

use crate::classes::ClassScheme;
use crate::context::Resolution;
use crate::histogram::StoredHistograms;

/// Selection covering every reference region at once.
pub const WHOLE_REGION: &str = "Whole Africa";

/// Individually selectable reference regions.
pub const REFERENCE_REGIONS: [&str; 5] = ["EAF", "MED", "SAF", "SAH", "WAF"];

/// Default analysis years of the reference time series.
pub const DEFAULT_YEARS: [i32; 9] = [1985, 1990, 1995, 2000, 2005, 2010, 2015, 2020, 2022];

/// Region choices in dropdown order: the whole area first, then each region.
pub fn region_options() -> Vec<String> {
    std::iter::once(WHOLE_REGION)
        .chain(REFERENCE_REGIONS)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Region selection key, passed through to the histogrammer.
    pub region: String,
    /// Sampling resolution in metres.
    pub resolution_m: u32,
    /// Strictly increasing analysis years.
    pub years: Vec<i32>,
    /// Class scheme; the reference scheme when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<ClassScheme>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            region: WHOLE_REGION.to_string(),
            resolution_m: Resolution::DEFAULT_M,
            years: DEFAULT_YEARS.to_vec(),
            classes: None,
        }
    }
}

impl AnalysisConfig {
    pub fn scheme(&self) -> ClassScheme {
        self.classes.clone().unwrap_or_default()
    }
}

/// Input document of the CLI and batch tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(flatten)]
    pub config: AnalysisConfig,
    #[serde(default)]
    pub histograms: StoredHistograms,
}

impl AnalysisRequest {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_reference_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
        assert_eq!(cfg.resolution_m, 5000);
        assert_eq!(cfg.years.len(), 9);
        assert_eq!(cfg.scheme(), ClassScheme::reference());
    }

    #[test]
    fn request_reads_config_and_histograms() {
        let req = AnalysisRequest::from_json(
            r#"{
                "region": "MED",
                "resolution_m": 1000,
                "years": [1985, 1990],
                "classes": [{"id": 1, "name": "Cropland"}, {"id": 2, "name": "Forest"}],
                "histograms": {"1985-1990": {"101": 50, "102": 30, "202": 20}}
            }"#,
        )
        .unwrap();
        assert_eq!(req.config.region, "MED");
        assert_eq!(req.config.scheme().len(), 2);
        assert_eq!(req.histograms.len(), 1);
    }

    #[test]
    fn region_options_start_with_whole_area() {
        let options = region_options();
        assert_eq!(options.len(), 6);
        assert_eq!(options[0], WHOLE_REGION);
        assert_eq!(options[5], "WAF");
    }
}
