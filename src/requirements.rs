//! Minimum requirements a run must meet, e.g. to fail a build when too many requests were unsuccessful.

use crate::{RequirementsError, Sample};
use std::fmt::Display;

/// Minimum sample count and success ratio of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MinRequirements {
    min_samples: Option<usize>,
    min_success_ratio: f64,
}

impl Default for MinRequirements {
    /// Instantiates a default [`MinRequirements`]: no minimum sample count and a minimum success ratio of
    /// `0.90`.
    fn default() -> Self {
        Self {
            min_samples: None,
            min_success_ratio: 0.90,
        }
    }
}

impl MinRequirements {
    /// Creates a new [`MinRequirements`] the same as `self` but requiring at least `min_samples` samples.
    pub fn with_min_samples(&self, min_samples: usize) -> Self {
        Self {
            min_samples: Some(min_samples),
            ..self.clone()
        }
    }

    /// Creates a new [`MinRequirements`] the same as `self` but with the given minimum success ratio, a
    /// fraction between `0.0` and `1.0`.
    pub fn with_min_success_ratio(&self, min_success_ratio: f64) -> Self {
        Self {
            min_success_ratio,
            ..self.clone()
        }
    }

    pub fn min_samples(&self) -> Option<usize> {
        self.min_samples
    }

    pub fn min_success_ratio(&self) -> f64 {
        self.min_success_ratio
    }

    /// Checks `samples`, unsuccessful ones included, against `self`.
    ///
    /// # Errors
    /// - [`RequirementsError::TooFewSamples`] if a minimum sample count is set and not reached.
    /// - [`RequirementsError::SuccessRatioTooLow`] if the share of successful samples is below the minimum.
    pub fn check(&self, samples: &[Sample]) -> Result<RequirementsReport, RequirementsError> {
        if let Some(required) = self.min_samples {
            if samples.len() < required {
                return Err(RequirementsError::TooFewSamples {
                    actual: samples.len(),
                    required,
                });
            }
        }

        let report = RequirementsReport::new(samples);
        log::debug!("requirements check:\n{report}");
        if report.success_ratio < self.min_success_ratio {
            return Err(RequirementsError::SuccessRatioTooLow {
                actual: report.success_ratio,
                required: self.min_success_ratio,
            });
        }
        Ok(report)
    }
}

/// Counts gathered by [`MinRequirements::check`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementsReport {
    pub total_samples: usize,
    pub successful_samples: usize,
    /// `0.0` when there are no samples.
    pub success_ratio: f64,
}

impl RequirementsReport {
    pub fn new(samples: &[Sample]) -> Self {
        let total_samples = samples.len();
        let successful_samples = samples.iter().filter(|s| s.success).count();
        let success_ratio = if total_samples == 0 {
            0.0
        } else {
            successful_samples as f64 / total_samples as f64
        };
        Self {
            total_samples,
            successful_samples,
            success_ratio,
        }
    }
}

impl Display for RequirementsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total samples:      {}", self.total_samples)?;
        writeln!(f, "Successful samples: {}", self.successful_samples)?;
        write!(f, "Success ratio:      {:.0}%", self.success_ratio * 100.0)
    }
}
