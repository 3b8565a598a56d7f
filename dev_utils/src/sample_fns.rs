//! Sample fixtures for tests and benchmarks.

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use response_histogram::Sample;

pub const CHANNELS: [&str; 5] = ["de", "en", "fr", "it", "nl"];

const WORDS: [&str; 8] = [
    "red", "shoes", "suede", "dress", "long", "blue", "jacket", "42",
];

const FILTERS: [&str; 4] = ["filterColor", "filterSize", "filterBrand", "filterPrice"];

/// One sample per response time, started 100 ms apart from epoch millisecond `1_000`.
pub fn samples_from_times(times: &[u32]) -> Vec<Sample> {
    times
        .iter()
        .enumerate()
        .map(|(i, &t)| Sample::new(t, 1_000 + 100 * i as i64))
        .collect()
}

/// Parameters of [`random_samples`].
#[derive(Debug, Clone, Copy)]
pub struct SampleGenParams {
    pub count: usize,
    pub seed: u64,
    /// Probability that a sample is served from the cache.
    pub cached_ratio: f64,
    pub timeout_ratio: f64,
    pub failure_ratio: f64,
}

impl Default for SampleGenParams {
    fn default() -> Self {
        Self {
            count: 1_000,
            seed: 42,
            cached_ratio: 0.3,
            timeout_ratio: 0.02,
            failure_ratio: 0.03,
        }
    }
}

/// Reproducible search-request samples with a long-tailed response time distribution.
///
/// Every sample carries a `query` of one to four words, a `channel` skewed towards the first entries of
/// [`CHANNELS`], zero to three filter parameters, and a volatile `sid`.
pub fn random_samples(params: SampleGenParams) -> Vec<Sample> {
    log::trace!("entering `random_samples` with {params:?}");
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut start = 1_700_000_000_000_i64;

    (0..params.count)
        .map(|i| {
            start += rng.gen_range(0..50);
            let response_time = rng.gen_range(1..=40) * rng.gen_range(1..=50) + rng.gen_range(0..5);
            let cached = rng.gen_bool(params.cached_ratio);
            Sample::new(response_time, start)
                .with_query(&random_query(&mut rng, i))
                .with_cache_age(if cached { rng.gen_range(1..600) } else { 0 })
                .with_timed_out(rng.gen_bool(params.timeout_ratio))
                .with_success(!rng.gen_bool(params.failure_ratio))
                .with_result_count(rng.gen_range(0..500))
        })
        .collect()
}

fn random_query(rng: &mut StdRng, i: usize) -> String {
    let num_words = rng.gen_range(1..=4);
    let words: Vec<&str> = (0..num_words)
        .filter_map(|_| WORDS.choose(&mut *rng).copied())
        .collect();

    // square root of a uniform draw favours the last index, i.e. the first channel
    let channel_idx = (rng.gen_range(0..CHANNELS.len() * CHANNELS.len()) as f64).sqrt() as usize;
    let channel = CHANNELS[CHANNELS.len() - 1 - channel_idx.min(CHANNELS.len() - 1)];

    let mut query = format!("query={}&channel={channel}&sid={i}", words.join("+"));
    let num_filters = rng.gen_range(0..=3);
    for filter in FILTERS.iter().take(num_filters) {
        query.push_str(&format!("&{filter}={}", rng.gen_range(1..10)));
    }
    query
}

/// The `n` largest response times of `samples` made `factor` times slower, as a second run of the same
/// requests.
pub fn slowed_down(samples: &[Sample], n: usize, factor: u32) -> Vec<Sample> {
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(samples[i].response_time_ms));
    let slowed: Vec<usize> = order.into_iter().take(n).collect();

    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut s = s.clone();
            if slowed.contains(&i) {
                s.response_time_ms = s.response_time_ms.saturating_mul(factor);
            }
            s
        })
        .collect()
}
