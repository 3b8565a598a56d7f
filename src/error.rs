//! Errors returned by statistics, classification, binning, and merge operations.

use thiserror::Error;

/// Error returned by the histogram engine.
///
/// - [`HistogramError::EmptyInput`] is surfaced to the caller, who shows a "no data" message instead of
///   statistics (see [`crate::EMPTY_HISTOGRAM_MSG`]).
/// - [`HistogramError::Decode`] is absorbed during classification: the sample is treated as not belonging to
///   the segment in question.
/// - [`HistogramError::MergeSizeMismatch`] aborts the sparse merge only; the unmerged histogram is kept.
/// - [`HistogramError::InvalidConfiguration`] is surfaced immediately and no partial result is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistogramError {
    #[error("no samples to analyze")]
    EmptyInput,

    #[error("cannot decode segment value `{value}`: {reason}")]
    Decode { value: String, reason: String },

    #[error("cannot merge bin lists of different sizes ({left} and {right})")]
    MergeSizeMismatch { left: usize, right: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl HistogramError {
    pub(crate) fn decode(value: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_cfg(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Error returned when a run does not meet its [`crate::MinRequirements`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequirementsError {
    #[error("the run only contains {actual} samples, but a minimum of {required} samples is required")]
    TooFewSamples { actual: usize, required: usize },

    #[error(
        "only {:.1}% of the samples were successful, but a minimum of {:.1}% is required",
        .actual * 100.0,
        .required * 100.0
    )]
    SuccessRatioTooLow { actual: f64, required: f64 },
}
