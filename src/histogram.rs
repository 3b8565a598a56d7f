//! [`Histogram`], the result of a histogram build.

use crate::{
    axis_scale::{optimal_axis_labels, FREQUENCY_MIN_STEP},
    binning::BinSchedule,
    bins::BinList,
    natural_order::NaturalKey,
    segment::NO_SEGMENT,
    SummaryStats, Wrapper,
};
use std::collections::BTreeMap;

/// Mapping of segment labels to their [`BinList`]s in natural label order; inherits all [`BTreeMap`] methods.
pub type SegmentBins = Wrapper<BTreeMap<NaturalKey, BinList>>;

/// Total frequency per segment label.
pub type SegmentTotals = Wrapper<BTreeMap<NaturalKey, u64>>;

/// Response-time histogram of a run, one [`BinList`] per segment, together with the run's [`SummaryStats`].
///
/// All bin lists share the bounds of [`Self::schedule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: SegmentBins,
    stats: SummaryStats,
    schedule: BinSchedule,
    max_frequency: u32,
}

impl Histogram {
    pub fn new(bins: SegmentBins, stats: SummaryStats, schedule: BinSchedule) -> Self {
        let max_frequency = max_frequency(&bins);
        Self {
            bins,
            stats,
            schedule,
            max_frequency,
        }
    }

    pub fn bins(&self) -> &SegmentBins {
        &self.bins
    }

    pub fn get(&self, label: &str) -> Option<&BinList> {
        self.bins.get(&NaturalKey::from(label))
    }

    /// Segment labels in natural order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.bins.keys().map(|k| k.as_str())
    }

    pub fn stats(&self) -> &SummaryStats {
        &self.stats
    }

    pub fn schedule(&self) -> &BinSchedule {
        &self.schedule
    }

    /// Largest single bin frequency over all segments.
    pub fn max_frequency(&self) -> u32 {
        self.max_frequency
    }

    /// Sum of the frequencies of all segments.
    pub fn total_frequency(&self) -> u64 {
        self.bins.values().map(BinList::total_frequency).sum()
    }

    pub fn segment_totals(&self) -> SegmentTotals {
        self.bins.map_values(BinList::total_frequency)
    }

    /// Whether any segment other than [`NO_SEGMENT`] is present.
    pub fn is_segmented(&self) -> bool {
        self.bins.keys().any(|k| k.as_str() != NO_SEGMENT)
    }

    /// `(label_count, step)` of the frequency axis.
    pub fn y_axis_labels(&self) -> (u64, u64) {
        optimal_axis_labels(u64::from(self.max_frequency), FREQUENCY_MIN_STEP)
    }

    pub(crate) fn replace_bins(&mut self, bins: SegmentBins) {
        self.max_frequency = max_frequency(&bins);
        self.bins = bins;
    }
}

fn max_frequency(bins: &SegmentBins) -> u32 {
    bins.values().map(BinList::max_frequency).max().unwrap_or(0)
}
