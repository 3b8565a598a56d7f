mod common;

use common::{init_logging, repeated, window_cfg};
use dev_utils::{sample_fns::samples_from_times, test_support::frequencies};
use response_histogram::{
    build_histogram, histogram_report, HistogramCfg, HistogramError, Sample, SummaryStats,
    EMPTY_HISTOGRAM_MSG, EMPTY_STATS_MSG, NO_SEGMENT,
};

#[test]
fn test_five_samples_five_bins() {
    init_logging();
    let samples = samples_from_times(&[10, 20, 30, 40, 50]);
    let histogram = build_histogram(&samples, &window_cfg(0, 5)).expect("valid");

    assert_eq!(histogram.schedule().bounds(), &[10, 20, 30, 40, 50]);
    assert_eq!(frequencies(&histogram, NO_SEGMENT), vec![1, 1, 1, 1, 1]);
    assert_eq!(histogram.stats().median, 30);
    assert_eq!(histogram.labels().collect::<Vec<_>>(), vec![NO_SEGMENT]);
}

#[test]
fn test_cached_segments() {
    init_logging();
    let samples = vec![
        Sample::new(10, 0).with_cache_age(5),
        Sample::new(20, 10),
        Sample::new(30, 20),
    ];
    let cfg = HistogramCfg::default().with_segment_key("cached");
    let histogram = build_histogram(&samples, &cfg).expect("valid");

    assert_eq!(
        histogram.labels().collect::<Vec<_>>(),
        vec!["cached", "uncached"]
    );
    let totals = histogram.segment_totals();
    let totals: Vec<u64> = totals.values().copied().collect();
    assert_eq!(totals, vec![1, 2]);
    assert_eq!(histogram.total_frequency(), 3);
}

#[test]
fn test_empty_input() {
    init_logging();
    let cfg = HistogramCfg::default();
    assert_eq!(SummaryStats::new(&[]), Err(HistogramError::EmptyInput));
    assert_eq!(
        build_histogram(&[], &cfg).map(|_| ()),
        Err(HistogramError::EmptyInput)
    );

    let shown = match histogram_report(&[], &cfg) {
        Ok(_) => "histogram",
        Err(HistogramError::EmptyInput) => EMPTY_HISTOGRAM_MSG,
        Err(_) => "error",
    };
    assert_eq!(shown, EMPTY_HISTOGRAM_MSG);
    assert_ne!(EMPTY_STATS_MSG, EMPTY_HISTOGRAM_MSG);
}

#[test]
fn test_sparse_merge_depends_on_bound() {
    init_logging();
    let mut samples = repeated(97, 100, "channel=de");
    samples.extend(repeated(3, 100, "channel=en"));
    let cfg = window_cfg(0, 5)
        .with_segment_key("channel")
        .with_group_sparse_segments(true);

    // sparse bound 97 * 5 / 16 = 30: "de" closes its own group and "en" is left alone
    let report = histogram_report(&samples, &cfg).expect("valid");
    assert!(!report.merged());
    assert_eq!(
        report.histogram().labels().collect::<Vec<_>>(),
        vec!["de", "en"]
    );

    // sparse bound 97 * 5 / 4 = 121: both segments together stay below it
    let report = histogram_report(&samples, &cfg.with_sparse_divisor(4)).expect("valid");
    assert!(report.merged());
    assert_eq!(
        report.histogram().labels().collect::<Vec<_>>(),
        vec!["de, en"]
    );
    assert_eq!(
        frequencies(report.histogram(), "de, en"),
        vec![0, 0, 0, 0, 100]
    );
}

#[test]
fn test_invalid_window() {
    init_logging();
    let samples = samples_from_times(&[40, 40, 40]);
    assert!(matches!(
        build_histogram(&samples, &HistogramCfg::default()),
        Err(HistogramError::InvalidConfiguration(_))
    ));
    assert!(build_histogram(&samples, &window_cfg(0, 4)).is_ok());
}
