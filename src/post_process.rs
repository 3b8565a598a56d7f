//! Display ordering of segments and the merge of sparse segments.

use crate::{
    bins::BinList,
    natural_order::NaturalKey,
    segment::{DisplayOrder, NO_SEGMENT},
    Histogram, HistogramCfg, HistogramError, SegmentBins, SegmentKey,
};
use std::collections::{BTreeMap, BTreeSet};

/// Separator between member labels in the label of a merged segment.
pub const MERGED_LABEL_SEPARATOR: &str = ", ";

//=================
// Ordering

/// Segment labels by descending total frequency, ties in natural label order.
pub fn frequency_ordering(histogram: &Histogram) -> Vec<NaturalKey> {
    let mut totals: Vec<(NaturalKey, u64)> = histogram.segment_totals().into_iter().collect();
    totals.sort_by(|(_, t1), (_, t2)| t2.cmp(t1));
    totals.into_iter().map(|(label, _)| label).collect()
}

/// Segment labels in display order: natural order for counting keys, [`frequency_ordering`] otherwise.
pub fn segment_ordering(histogram: &Histogram, key: Option<&SegmentKey>) -> Vec<NaturalKey> {
    match key.map(|k| k.kind().display_order()) {
        Some(DisplayOrder::Natural) => histogram.bins().keys().cloned().collect(),
        Some(DisplayOrder::ByFrequency) | None => frequency_ordering(histogram),
    }
}

//=================
// Sparse merge

/// `max_frequency * num_bins / sparse_divisor`: groups of segments are closed once they reach this total.
pub fn sparse_bound(histogram: &Histogram, cfg: &HistogramCfg) -> u64 {
    u64::from(histogram.max_frequency()) * u64::from(cfg.num_bins)
        / u64::from(cfg.sparse_divisor.max(1))
}

/// Partitions the labels of `ordering` into merge groups.
///
/// Walking `ordering`, each segment joins the current group, and the group is closed when its running total
/// plus the total of the next segment reaches `sparse_bound`. [`NO_SEGMENT`] is never grouped and is returned
/// as the last, singleton group.
pub fn sparse_groups(
    histogram: &Histogram,
    ordering: &[NaturalKey],
    sparse_bound: u64,
) -> Vec<Vec<NaturalKey>> {
    let totals = histogram.segment_totals();
    let total_of = |label: &NaturalKey| totals.get(label).copied().unwrap_or(0);

    let (reserved, segments): (Vec<&NaturalKey>, Vec<&NaturalKey>) = ordering
        .iter()
        .partition(|label| label.as_str() == NO_SEGMENT);

    let mut groups = Vec::new();
    let mut group = Vec::new();
    let mut group_total = 0;
    for (i, &label) in segments.iter().enumerate() {
        group.push(label.clone());
        group_total += total_of(label);
        let next_total = segments.get(i + 1).map_or(0, |&next| total_of(next));
        if group_total + next_total >= sparse_bound {
            groups.push(std::mem::take(&mut group));
            group_total = 0;
        }
    }
    if !group.is_empty() {
        groups.push(group);
    }

    groups.extend(reserved.into_iter().map(|label| vec![label.clone()]));
    groups
}

/// Builds the segment mapping in which each multi-member group of `groups` is replaced by one bin list with
/// the bin-by-bin sum of its members, labelled with the member labels in natural order joined by
/// [`MERGED_LABEL_SEPARATOR`].
///
/// # Errors
/// [`HistogramError::MergeSizeMismatch`] if the bin lists of one group differ in length.
pub fn merge_groups(
    histogram: &Histogram,
    groups: &[Vec<NaturalKey>],
) -> Result<SegmentBins, HistogramError> {
    log::trace!("entering `merge_groups` with {} groups", groups.len());
    let mut merged_bins = BTreeMap::new();
    for group in groups {
        let members: BTreeSet<&NaturalKey> = group.iter().collect();
        let mut lists = members.iter().filter_map(|&label| histogram.bins().get(label));
        let first = match lists.next() {
            Some(list) => list.clone(),
            None => continue,
        };
        let merged: BinList = lists.try_fold(first, |acc, list| acc.merged(list))?;

        let label = members
            .iter()
            .map(|label| label.as_str())
            .collect::<Vec<_>>()
            .join(MERGED_LABEL_SEPARATOR);
        log::debug!(
            "segment `{label}`: {} samples after merge",
            merged.total_frequency()
        );
        merged_bins.insert(NaturalKey(label), merged);
    }
    Ok(merged_bins.into())
}

/// Merges the sparse segments of `histogram` in place when `cfg` segments the samples and asks for grouping.
/// Returns whether any segments were merged.
///
/// # Errors
/// [`HistogramError::MergeSizeMismatch`] as for [`merge_groups`]; `histogram` is then left unchanged.
pub fn merge_sparse_segments(
    histogram: &mut Histogram,
    cfg: &HistogramCfg,
) -> Result<bool, HistogramError> {
    if cfg.segment_key.is_none() || !cfg.group_sparse_segments {
        return Ok(false);
    }
    let bound = sparse_bound(histogram, cfg);
    log::debug!("sparse bound: {bound}");

    let ordering = frequency_ordering(histogram);
    let groups = sparse_groups(histogram, &ordering, bound);
    if groups.iter().all(|group| group.len() < 2) {
        return Ok(false);
    }
    let merged = merge_groups(histogram, &groups)?;
    histogram.replace_bins(merged);
    Ok(true)
}
