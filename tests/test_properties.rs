mod common;

use common::init_logging;
use dev_utils::{
    sample_fns::{random_samples, SampleGenParams, CHANNELS},
    test_support::{f64_are_close, snapshot, u64_comparator},
};
use hdrhistogram::Histogram as HdrHistogram;
use response_histogram::{
    build_histogram, histogram_report, HistogramCfg, SegmentKey, SummaryStats, UpperBound,
    NO_SEGMENT,
};

fn samples() -> Vec<response_histogram::Sample> {
    random_samples(SampleGenParams::default())
}

#[test]
fn test_order_statistics_are_monotonic() {
    init_logging();
    for seed in [1, 2, 3] {
        let samples = random_samples(SampleGenParams {
            seed,
            count: 257,
            ..SampleGenParams::default()
        });
        let s = SummaryStats::new(&samples).expect("non-empty");
        assert!(s.min <= s.quartile_low);
        assert!(s.quartile_low <= s.median);
        assert!(s.median <= s.quartile_up);
        assert!(s.quartile_up <= s.quantile_95);
        assert!(s.quantile_95 <= s.max);
        assert!(s.min <= s.average && s.average <= s.max);
        assert!(s.start_of_first_request < s.end_of_last_request);
    }
}

#[test]
fn test_stats_agree_with_hdrhistogram() {
    init_logging();
    let samples = samples();
    let stats = SummaryStats::new(&samples).expect("non-empty");

    let mut hdr = HdrHistogram::<u64>::new_with_bounds(1, 60_000, 3).expect("valid bounds");
    for s in &samples {
        hdr.record(u64::from(s.response_time_ms))
            .expect("value within bounds");
    }

    let exact = u64_comparator(0.0);
    assert!(exact(u64::from(stats.min), hdr.min()));
    assert!(exact(u64::from(stats.max), hdr.max()));
    assert!(f64_are_close(f64::from(stats.average), hdr.mean(), 0.01));

    let median = u64::from(stats.median);
    assert!(hdr.value_at_quantile(0.49) <= median);
    assert!(median <= hdr.value_at_quantile(0.51));
    let quartile_up = u64::from(stats.quartile_up);
    assert!(hdr.value_at_quantile(0.74) <= quartile_up);
    assert!(quartile_up <= hdr.value_at_quantile(0.76));
}

#[test]
fn test_grand_total_equals_sample_count() {
    init_logging();
    let samples = samples();
    let n = samples.len() as u64;

    let keys = ["cached", "timeout", "numFilters", "numWordsInQuery", "channel"];
    for key in keys {
        for log_scale in [false, true] {
            let cfg = HistogramCfg::default()
                .with_segment_key(key)
                .with_log_scale(log_scale);
            let histogram = build_histogram(&samples, &cfg).expect("valid");
            assert_eq!(histogram.total_frequency(), n, "key {key}, log {log_scale}");
            assert!(
                histogram.get(NO_SEGMENT).is_none(),
                "every sample has a value for {key}"
            );
            for (label, list) in histogram.bins() {
                assert_eq!(
                    list.frequencies().map(u64::from).sum::<u64>(),
                    list.total_frequency(),
                    "segment {label}"
                );
            }
        }
    }
}

#[test]
fn test_bin_lists_share_one_schedule() {
    init_logging();
    let samples = samples();
    let cfg = HistogramCfg::default()
        .with_lower_bound(100)
        .with_upper_bound(UpperBound::DoubleUpperQuartile)
        .with_num_bins(30)
        .with_segment_key("channel");
    let histogram = build_histogram(&samples, &cfg).expect("valid");

    let bounds = histogram.schedule().bounds();
    assert!(bounds.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(histogram.schedule().start_index(), 1);
    let stats = histogram.stats();
    let upper = 2 * stats.quartile_up;
    assert_eq!(bounds.last().copied(), Some(stats.max.max(upper)));
    for (_, list) in histogram.bins() {
        assert_eq!(list.bounds().collect::<Vec<_>>(), bounds);
    }
}

#[test]
fn test_explicit_values_leave_a_remainder() {
    init_logging();
    let samples = samples();
    let cfg = HistogramCfg::default()
        .with_segment_key("channel")
        .with_segment_values(["de", "e.*"]);
    let histogram = build_histogram(&samples, &cfg).expect("valid");

    let expected_rest = samples
        .iter()
        .filter(|s| !matches!(s.query_param("channel"), Some("de") | Some("en")))
        .count() as u64;
    assert_eq!(
        histogram.labels().collect::<Vec<_>>(),
        vec![NO_SEGMENT, "de", "e.*"]
    );
    let rest = histogram.get(NO_SEGMENT).map(|l| l.total_frequency());
    assert_eq!(rest, Some(expected_rest));
    assert_eq!(histogram.total_frequency(), samples.len() as u64);
}

#[test]
fn test_build_is_deterministic() {
    init_logging();
    let samples = samples();
    let cfg = HistogramCfg::default()
        .with_log_scale(true)
        .with_segment_key("numFilters");
    let first = build_histogram(&samples, &cfg).expect("valid");
    let second = build_histogram(&samples, &cfg).expect("valid");
    assert_eq!(snapshot(&first), snapshot(&second));
}

#[test]
fn test_merge_preserves_group_totals() {
    init_logging();
    let samples = samples();
    let cfg = HistogramCfg::default()
        .with_segment_key("channel")
        .with_group_sparse_segments(true)
        .with_sparse_divisor(1);
    let unmerged = build_histogram(&samples, &cfg).expect("valid");
    let report = histogram_report(&samples, &cfg).expect("valid");
    assert!(report.merged());

    let unmerged_totals = unmerged.segment_totals();
    for (label, list) in report.histogram().bins() {
        let members_total: u64 = label
            .split(", ")
            .map(|member| {
                unmerged
                    .get(member)
                    .map(|l| l.total_frequency())
                    .unwrap_or(0)
            })
            .sum();
        assert_eq!(list.total_frequency(), members_total, "group {label}");
    }
    assert_eq!(
        report.histogram().total_frequency(),
        unmerged_totals.values().sum::<u64>()
    );
}

#[test]
fn test_display_ordering() {
    init_logging();
    let samples = samples();

    let cfg = HistogramCfg::default().with_segment_key("channel");
    let report = histogram_report(&samples, &cfg).expect("valid");
    assert_eq!(report.ordering().len(), CHANNELS.len());
    let totals: Vec<u64> = report
        .ordering()
        .iter()
        .filter_map(|label| report.histogram().get(label))
        .map(|l| l.total_frequency())
        .collect();
    assert!(totals.windows(2).all(|w| w[0] >= w[1]));

    let cfg = HistogramCfg::default().with_segment_key(SegmentKey::NumFilters);
    let report = histogram_report(&samples, &cfg).expect("valid");
    let ordering: Vec<&str> = report.ordering().iter().map(|k| k.as_str()).collect();
    assert_eq!(ordering, vec!["0", "1", "2", "3"]);

    let (count, step) = report.y_axis_labels();
    assert!(count >= 1);
    assert_eq!(step % 50, 0);
}
