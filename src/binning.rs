//! The binning engine: the bound schedule of a histogram and the per-segment sweep that fills it.

use crate::{
    bins::{Bin, BinList},
    cfg::BinWindow,
    natural_order::NaturalKey,
    sample::sorted_by_response_time,
    segment::{SegmentClassifier, SegmentSet, NO_SEGMENT},
    Histogram, HistogramCfg, HistogramError, Sample, SegmentBins, SummaryStats, Wrapper,
};
use std::collections::BTreeMap;

/// Absorbs floating-point error in geometric bounds that land just below an integer.
const LOG_BOUND_EPSILON: f64 = 1e-9;

//=================
// BinSchedule

/// The strictly increasing upper bounds shared by every [`BinList`] of one histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinSchedule {
    bounds: Vec<u32>,
    start_index: usize,
}

impl BinSchedule {
    /// Computes the bounds for `window` given the smallest (`min`) and largest (`max`) response times.
    ///
    /// - A leading bin bounded by `window.lower_bound` is added when `min` is below it.
    /// - `window.num_bins` bins follow, of equal width on a linear scale or of equal ratio on a log scale.
    /// - A trailing bin bounded by `max` is added when `max` exceeds the last computed bound.
    ///
    /// A computed bound that does not exceed its predecessor is dropped, so narrow windows may yield fewer
    /// bins than requested.
    pub fn new(window: &BinWindow, min: u32, max: u32) -> Self {
        log::trace!("entering `BinSchedule::new` with {window:?}");
        let mut bounds = Vec::with_capacity(window.num_bins as usize + 2);
        let mut start_index = 0;
        if min < window.lower_bound {
            bounds.push(window.lower_bound);
            start_index = 1;
        }

        let lower = u64::from(window.lower_bound);
        let upper = u64::from(window.upper_bound);
        let n = u64::from(window.num_bins);

        if window.log_scale {
            let log_lower = lower.max(1) as f64;
            let base = (((upper as f64).ln() - log_lower.ln()) / n as f64).exp();
            for i in 1..=n {
                let bound = if i == n {
                    upper
                } else {
                    (log_lower * base.powi(i as i32) + LOG_BOUND_EPSILON).floor() as u64
                };
                push_increasing(&mut bounds, bound);
            }
        } else {
            let width = upper - lower;
            for i in 1..=n {
                push_increasing(&mut bounds, lower + (i * width).div_ceil(n));
            }
        }

        if bounds.last().map_or(true, |&last| last < max) {
            bounds.push(max);
        }

        Self {
            bounds,
            start_index,
        }
    }

    pub fn bounds(&self) -> &[u32] {
        &self.bounds
    }

    /// Index of the first regular bin: `1` when the schedule starts with a leading bin, `0` otherwise.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// A [`BinList`] with this schedule's bounds and all frequencies zero.
    pub fn empty_bins(&self) -> BinList {
        self.bounds.iter().map(|&bound| Bin::new(bound, 0)).collect()
    }
}

fn push_increasing(bounds: &mut Vec<u32>, bound: u64) {
    let bound = u32::try_from(bound).unwrap_or(u32::MAX);
    if bounds.last().map_or(true, |&last| last < bound) {
        bounds.push(bound);
    }
}

//=================
// UnsegmentedRemainder

/// The samples of one engine call that no segment has claimed yet, by position in the sorted sample slice.
#[derive(Debug, Clone)]
pub struct UnsegmentedRemainder {
    members: Vec<bool>,
    len: usize,
}

impl UnsegmentedRemainder {
    /// A remainder holding all `len` samples.
    pub fn new(len: usize) -> Self {
        Self {
            members: vec![true; len],
            len,
        }
    }

    pub fn remove(&mut self, index: usize) {
        if let Some(member) = self.members.get_mut(index) {
            if std::mem::replace(member, false) {
                self.len -= 1;
            }
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

//=================
// Sweep

/// Fills one [`BinList`] with a single forward pass over `sorted`, which must be ordered ascending by
/// response time. A bin counts the accepted samples above the previous bound and at most its own bound.
/// `accept` receives each sample's position in `sorted`.
pub fn sweep(
    sorted: &[&Sample],
    schedule: &BinSchedule,
    mut accept: impl FnMut(usize, &Sample) -> bool,
) -> BinList {
    let mut cursor = 0;
    schedule
        .bounds()
        .iter()
        .map(|&bound| {
            let mut frequency = 0;
            while let Some(sample) = sorted
                .get(cursor)
                .filter(|s| s.response_time_ms <= bound)
            {
                if accept(cursor, *sample) {
                    frequency += 1;
                }
                cursor += 1;
            }
            Bin::new(bound, frequency)
        })
        .collect()
}

/// Bins `sorted` once per value of `universe`, then bins the samples no segment applies to under
/// [`NO_SEGMENT`]. The reserved label is only present when that remainder is non-empty, so an empty
/// `universe` yields a single unsegmented bin list.
pub fn bin_segments(
    sorted: &[&Sample],
    schedule: &BinSchedule,
    classifier: &SegmentClassifier,
    universe: &SegmentSet,
) -> SegmentBins {
    log::trace!(
        "entering `bin_segments` with {} samples and {} segments",
        sorted.len(),
        universe.len()
    );
    let mut remainder = UnsegmentedRemainder::new(sorted.len());
    let mut bins = BTreeMap::new();

    for value in universe {
        let list = match classifier.matcher(value.as_str()) {
            Ok(matcher) => sweep(sorted, schedule, |i, sample| {
                let applies = matcher.applies(sample).unwrap_or_else(|err| {
                    log::warn!("segment `{value}` treated as not applying: {err}");
                    false
                });
                if applies {
                    remainder.remove(i);
                }
                applies
            }),
            Err(err) => {
                log::warn!("segment `{value}` matches no sample: {err}");
                schedule.empty_bins()
            }
        };
        log::debug!(
            "segment `{value}`: {} samples processed",
            list.total_frequency()
        );
        bins.insert(value.clone(), list);
    }

    if !remainder.is_empty() {
        let list = sweep(sorted, schedule, |i, _| remainder.contains(i));
        log::debug!(
            "segment `{NO_SEGMENT}`: {} samples processed",
            list.total_frequency()
        );
        bins.insert(NaturalKey::from(NO_SEGMENT), list);
    }

    Wrapper(bins)
}

/// Builds the (unmerged) histogram of `samples` as configured by `cfg`.
///
/// # Errors
/// - [`HistogramError::EmptyInput`] if `samples` is empty.
/// - [`HistogramError::InvalidConfiguration`] if `cfg` is invalid or its window is empty.
pub fn build_histogram(
    samples: &[Sample],
    cfg: &HistogramCfg,
) -> Result<Histogram, HistogramError> {
    log::trace!("entering `build_histogram`");
    cfg.validate()?;
    let stats = SummaryStats::new(samples)?;
    let window = cfg.resolve_window(&stats)?;
    let schedule = BinSchedule::new(&window, stats.min, stats.max);

    let classifier = SegmentClassifier::from_cfg(cfg);
    let universe = match (classifier.key(), &cfg.segment_values) {
        (None, _) => SegmentSet::new(),
        (Some(_), Some(values)) => values.clone(),
        (Some(_), None) => classifier.universe(samples),
    };
    log::debug!("segment universe: {universe:?}");

    let sorted = sorted_by_response_time(samples);
    let bins = bin_segments(&sorted, &schedule, &classifier, &universe);
    Ok(Histogram::new(bins, stats, schedule))
}
