//! [`HistogramCfg`] and the binning window derived from it.

use crate::{
    natural_order::NaturalKey, segment::SegmentSet, HistogramError, SegmentKey, SummaryStats,
};

//=================
// UpperBound

/// How the upper edge of the binning window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpperBound {
    /// The largest response time.
    #[default]
    Auto,
    /// The given value, if it is above the lower edge; otherwise the largest response time.
    Fixed(u32),
    /// Twice the upper quartile, which keeps long tails from compressing the interesting part of the histogram.
    DoubleUpperQuartile,
}

//=================
// DiagramType

/// The kind of artifact the rendering collaborator should produce. Carried through unchanged; the engine
/// computes the same data for every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagramType {
    #[default]
    Histogram,
    LineGraph,
    Scatter,
    Stats,
}

//=================
// HistogramCfg

/// Configuration of a histogram build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramCfg {
    pub(crate) lower_bound: Option<u32>,
    pub(crate) upper_bound: UpperBound,
    pub(crate) num_bins: u32,
    pub(crate) log_scale: bool,
    pub(crate) segment_key: Option<SegmentKey>,
    pub(crate) segment_values: Option<SegmentSet>,
    pub(crate) group_sparse_segments: bool,
    pub(crate) sparse_divisor: u32,
    pub(crate) filter_prefix: String,
    pub(crate) query_param: String,
    pub(crate) diagram_type: DiagramType,
}

impl Default for HistogramCfg {
    /// Instantiates a default [`HistogramCfg`]. The defaults are:
    /// - No explicit lower bound: the window starts at the smallest response time.
    /// - [`UpperBound::Auto`]: the window ends at the largest response time.
    /// - `num_bins` of `20`, on a linear scale.
    /// - No segmentation. When a segment key is set without explicit values, the values are enumerated from
    ///   the samples.
    /// - No grouping of sparse segments; when enabled, the sparse bound is
    ///   `max_frequency * num_bins / sparse_divisor` with a `sparse_divisor` of `16`.
    /// - `"filter"` as the prefix of filter parameters and `"query"` as the search-text parameter.
    fn default() -> Self {
        Self {
            lower_bound: None,
            upper_bound: UpperBound::Auto,
            num_bins: 20,
            log_scale: false,
            segment_key: None,
            segment_values: None,
            group_sparse_segments: false,
            sparse_divisor: 16,
            filter_prefix: "filter".to_owned(),
            query_param: "query".to_owned(),
            diagram_type: DiagramType::Histogram,
        }
    }
}

impl HistogramCfg {
    /// Creates a new [`HistogramCfg`] the same as `self` but with the given lower edge of the binning window.
    pub fn with_lower_bound(&self, lower_bound: u32) -> Self {
        Self {
            lower_bound: Some(lower_bound),
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but with the given [`UpperBound`] policy.
    pub fn with_upper_bound(&self, upper_bound: UpperBound) -> Self {
        Self {
            upper_bound,
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but with the given target number of bins.
    pub fn with_num_bins(&self, num_bins: u32) -> Self {
        Self {
            num_bins,
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but with geometric (`true`) or fixed-width bins.
    pub fn with_log_scale(&self, log_scale: bool) -> Self {
        Self {
            log_scale,
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but segmented by `segment_key`.
    pub fn with_segment_key(&self, segment_key: impl Into<SegmentKey>) -> Self {
        Self {
            segment_key: Some(segment_key.into()),
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but with an explicit list of segment values, which
    /// replaces the enumeration of values from the samples. Values ending in `.*` match by prefix.
    pub fn with_segment_values<I, S>(&self, segment_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: SegmentSet = segment_values
            .into_iter()
            .map(|v| NaturalKey(v.into()))
            .collect();
        Self {
            segment_values: Some(values),
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but with sparse segments grouped or not.
    pub fn with_group_sparse_segments(&self, group_sparse_segments: bool) -> Self {
        Self {
            group_sparse_segments,
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but with the given divisor of the sparse bound.
    pub fn with_sparse_divisor(&self, sparse_divisor: u32) -> Self {
        Self {
            sparse_divisor,
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but with the given prefix of filter parameter names.
    pub fn with_filter_prefix(&self, filter_prefix: impl Into<String>) -> Self {
        Self {
            filter_prefix: filter_prefix.into(),
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but with the given name of the search-text parameter.
    pub fn with_query_param(&self, query_param: impl Into<String>) -> Self {
        Self {
            query_param: query_param.into(),
            ..self.clone()
        }
    }

    /// Creates a new [`HistogramCfg`] the same as `self` but with the given [`DiagramType`].
    pub fn with_diagram_type(&self, diagram_type: DiagramType) -> Self {
        Self {
            diagram_type,
            ..self.clone()
        }
    }

    pub fn num_bins(&self) -> u32 {
        self.num_bins
    }

    pub fn log_scale(&self) -> bool {
        self.log_scale
    }

    pub fn segment_key(&self) -> Option<&SegmentKey> {
        self.segment_key.as_ref()
    }

    pub fn segment_values(&self) -> Option<&SegmentSet> {
        self.segment_values.as_ref()
    }

    pub fn group_sparse_segments(&self) -> bool {
        self.group_sparse_segments
    }

    pub fn sparse_divisor(&self) -> u32 {
        self.sparse_divisor
    }

    pub fn filter_prefix(&self) -> &str {
        &self.filter_prefix
    }

    pub fn query_param(&self) -> &str {
        &self.query_param
    }

    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }

    /// Checks the settings that do not depend on the samples.
    ///
    /// # Errors
    /// [`HistogramError::InvalidConfiguration`] if `num_bins` or `sparse_divisor` is zero.
    pub fn validate(&self) -> Result<(), HistogramError> {
        if self.num_bins == 0 {
            return Err(HistogramError::invalid_cfg("num_bins must be positive"));
        }
        if self.sparse_divisor == 0 {
            return Err(HistogramError::invalid_cfg(
                "sparse_divisor must be positive",
            ));
        }
        Ok(())
    }

    /// Resolves the binning window against the run's statistics.
    ///
    /// # Errors
    /// [`HistogramError::InvalidConfiguration`] if the settings are invalid (see [`Self::validate`]) or if the
    /// resolved upper edge is not above the resolved lower edge.
    pub fn resolve_window(&self, stats: &SummaryStats) -> Result<BinWindow, HistogramError> {
        self.validate()?;
        let lower_bound = self.lower_bound.unwrap_or(stats.min);
        let upper_bound = match self.upper_bound {
            UpperBound::DoubleUpperQuartile => stats.quartile_up.saturating_mul(2),
            UpperBound::Fixed(upper) if upper > lower_bound => upper,
            UpperBound::Fixed(_) | UpperBound::Auto => stats.max,
        };
        if upper_bound <= lower_bound {
            return Err(HistogramError::invalid_cfg(format!(
                "upper bound {upper_bound} must be greater than lower bound {lower_bound}"
            )));
        }
        Ok(BinWindow {
            lower_bound,
            upper_bound,
            num_bins: self.num_bins,
            log_scale: self.log_scale,
        })
    }
}

//=================
// BinWindow

/// The resolved window and scale shared by every bin list of one histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinWindow {
    pub lower_bound: u32,
    pub upper_bound: u32,
    pub num_bins: u32,
    pub log_scale: bool,
}
