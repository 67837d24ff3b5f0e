//! Error types for the intensity analysis engine.

use thiserror::Error;

/// Main error type for intensity analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntensityError {
    /// A histogram key does not decode to two member classes of the scheme.
    #[error("malformed transition key {key:?}: {reason}")]
    MalformedTransitionKey { key: String, reason: String },

    /// The region/resolution combination yields no valid pixels for an interval.
    #[error("no valid pixels for interval {interval} in region {region:?} at {resolution_m} m")]
    InsufficientCoverage {
        interval: String,
        region: String,
        resolution_m: u32,
    },

    #[error("unknown interval {0:?}")]
    UnknownInterval(String),

    #[error("analysis run has no completed intervals")]
    EmptyAnalysisRun,

    /// A run finished after a newer run had already been started.
    #[error("analysis run {ticket} was superseded by run {current}")]
    StaleRun { ticket: u64, current: u64 },

    #[error("invalid analysis years: {0}")]
    InvalidYears(String),

    #[error("invalid resolution {value} m: {reason}")]
    InvalidResolution { value: u32, reason: String },

    #[error("invalid class scheme: {0}")]
    InvalidClassScheme(String),
}

impl IntensityError {
    /// User-facing remediation for expected, input-driven failures.
    ///
    /// Returns `None` for data-integrity and programming errors, which are
    /// surfaced as-is.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            IntensityError::InsufficientCoverage { .. } => Some(
                "Try a finer resolution (e.g. 1000 m) or check that the region overlaps the land-cover data.",
            ),
            IntensityError::InvalidResolution { .. } => {
                Some("Resolution must be between 250 m and 10000 m in steps of 250 m.")
            }
            _ => None,
        }
    }

    /// True for conditions caused by the user's selection rather than by bad data.
    pub fn is_user_facing(&self) -> bool {
        self.hint().is_some()
    }
}

/// Result type alias for intensity analysis operations.
pub type Result<T> = std::result::Result<T, IntensityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_error_carries_hint() {
        let err = IntensityError::InsufficientCoverage {
            interval: "1985-1990".into(),
            region: "MED".into(),
            resolution_m: 5000,
        };
        assert!(err.is_user_facing());
        assert!(err.hint().unwrap().contains("resolution"));
        assert_eq!(
            err.to_string(),
            "no valid pixels for interval 1985-1990 in region \"MED\" at 5000 m"
        );
    }

    #[test]
    fn integrity_errors_have_no_hint() {
        let err = IntensityError::MalformedTransitionKey {
            key: "1099".into(),
            reason: "to-class 99 is not in the class scheme".into(),
        };
        assert!(err.hint().is_none());
        assert!(IntensityError::UnknownInterval("x".into()).hint().is_none());
    }
}
