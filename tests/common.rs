use response_histogram::{HistogramCfg, Sample};

pub fn init_logging() {
    _ = env_logger::builder().is_test(true).try_init();
}

/// Configuration with an explicit lower bound and `num_bins` linear bins.
pub fn window_cfg(lower_bound: u32, num_bins: u32) -> HistogramCfg {
    HistogramCfg::default()
        .with_lower_bound(lower_bound)
        .with_num_bins(num_bins)
}

/// `count` samples with response time `response_time_ms` and the raw URL query `query`.
pub fn repeated(count: usize, response_time_ms: u32, query: &str) -> Vec<Sample> {
    (0..count)
        .map(|i| Sample::new(response_time_ms, 10 * i as i64).with_query(query))
        .collect()
}
