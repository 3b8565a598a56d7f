//! The end-to-end build of a histogram ready for display.

use crate::{
    binning::build_histogram,
    natural_order::NaturalKey,
    post_process::{merge_sparse_segments, segment_ordering},
    DiagramType, Histogram, HistogramCfg, HistogramError, Sample, SummaryStats,
};

/// Message shown instead of a histogram when there are no samples.
pub const EMPTY_HISTOGRAM_MSG: &str =
    "The sample log did not contain any samples to create a histogram from.";

/// A [`Histogram`] after the sparse merge, with its segments in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramReport {
    histogram: Histogram,
    ordering: Vec<NaturalKey>,
    merged: bool,
    diagram_type: DiagramType,
}

impl HistogramReport {
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn stats(&self) -> &SummaryStats {
        self.histogram.stats()
    }

    /// Segment labels in display order.
    pub fn ordering(&self) -> &[NaturalKey] {
        &self.ordering
    }

    /// Whether sparse segments were merged.
    pub fn merged(&self) -> bool {
        self.merged
    }

    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }

    /// `(label_count, step)` of the frequency axis.
    pub fn y_axis_labels(&self) -> (u64, u64) {
        self.histogram.y_axis_labels()
    }
}

/// Builds the histogram of `samples`, merges sparse segments if configured, and orders the segments for
/// display. A failed merge is logged and the unmerged histogram is kept.
///
/// # Errors
/// - [`HistogramError::EmptyInput`] if `samples` is empty; callers show [`EMPTY_HISTOGRAM_MSG`] instead.
/// - [`HistogramError::InvalidConfiguration`] if `cfg` is invalid for these samples.
pub fn histogram_report(
    samples: &[Sample],
    cfg: &HistogramCfg,
) -> Result<HistogramReport, HistogramError> {
    log::trace!("entering `histogram_report` with {} samples", samples.len());
    let mut histogram = build_histogram(samples, cfg)?;

    let merged = merge_sparse_segments(&mut histogram, cfg).unwrap_or_else(|err| {
        log::warn!("keeping unmerged histogram: {err}");
        false
    });
    let ordering = segment_ordering(&histogram, cfg.segment_key());

    Ok(HistogramReport {
        histogram,
        ordering,
        merged,
        diagram_type: cfg.diagram_type(),
    })
}
