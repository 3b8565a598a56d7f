use crate::{HistogramError, Sample};
use std::fmt::Display;

/// Message shown instead of statistics when there are no samples.
pub const EMPTY_STATS_MSG: &str =
    "The sample log did not contain any samples to calculate descriptive statistics from.";

/// Common summary statistics of a load-test run.
///
/// The quantiles are index order statistics over the samples sorted by response time, not interpolated values:
/// for `n` samples, `quartile_low` is the response time at index `(n-1)/4`, `median` at `(n-1)/2`,
/// `quartile_up` at `3(n-1)/4` and `quantile_95` at `95(n-1)/100` (integer division). For small `n` or tied
/// values several of them may coincide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryStats {
    pub count: usize,
    pub min: u32,
    pub quartile_low: u32,
    pub median: u32,
    pub quartile_up: u32,
    pub quantile_95: u32,
    pub max: u32,
    /// Integer-truncated mean response time.
    pub average: u32,
    /// Epoch milliseconds of the earliest request start.
    pub start_of_first_request: i64,
    /// Epoch milliseconds of the latest request completion.
    pub end_of_last_request: i64,
}

impl SummaryStats {
    /// Computes summary statistics from the given samples, in any order.
    ///
    /// # Errors
    /// [`HistogramError::EmptyInput`] if `samples` is empty.
    pub fn new(samples: &[Sample]) -> Result<Self, HistogramError> {
        log::trace!("entering `SummaryStats::new` with {} samples", samples.len());
        let (start_of_first_request, end_of_last_request) =
            run_window(samples).ok_or(HistogramError::EmptyInput)?;

        let mut times: Vec<u32> = samples.iter().map(|s| s.response_time_ms).collect();
        times.sort_unstable();

        let n = times.len();
        let last = n - 1;
        let total: u64 = times.iter().map(|&t| u64::from(t)).sum();

        Ok(Self {
            count: n,
            min: times[0],
            quartile_low: times[last / 4],
            median: times[last / 2],
            quartile_up: times[last * 3 / 4],
            quantile_95: times[last * 95 / 100],
            max: times[last],
            average: (total / n as u64) as u32,
            start_of_first_request,
            end_of_last_request,
        })
    }

    /// Wall-clock duration of the run in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.end_of_last_request - self.start_of_first_request
    }

    /// Requests per second over the run's duration; `None` for a zero-length run.
    pub fn throughput_rps(&self) -> Option<f64> {
        let duration = self.duration_ms();
        if duration <= 0 {
            return None;
        }
        Some((self.count as f64 * 1000.0) / duration as f64)
    }
}

impl Display for SummaryStats {
    /// One-line, tab-separated run summary.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let throughput = self
            .throughput_rps()
            .map(|t| format!("{t:.2}"))
            .unwrap_or_else(|| "n/a".to_owned());
        write!(
            f,
            "Samples: {}\tTotal time: {}\tThroughput: {}\tAverage: {}\tMin: {}\tLow: {}\tMedian: {}\tUp: {}\tMax: {}",
            self.count,
            format_millis_to_minutes(self.duration_ms()),
            throughput,
            self.average,
            self.min,
            self.quartile_low,
            self.median,
            self.quartile_up,
            self.max,
        )
    }
}

/// Computes a [`SummaryStats`] from samples.
pub fn summary_stats(samples: &[Sample]) -> Result<SummaryStats, HistogramError> {
    SummaryStats::new(samples)
}

/// Returns `(start of first request, end of last request)` in epoch milliseconds, or `None` if there are no
/// samples. Independent of any response-time ordering.
pub fn run_window(samples: &[Sample]) -> Option<(i64, i64)> {
    samples.iter().fold(None, |acc, s| {
        let (start, end) = acc.unwrap_or((i64::MAX, i64::MIN));
        Some((start.min(s.start_of_request), end.max(s.end_of_request())))
    })
}

/// Formats a millisecond duration as `m:ss.mmm min`.
pub fn format_millis_to_minutes(millis: i64) -> String {
    let minutes = millis / 60_000;
    let seconds = (millis / 1000) % 60;
    format!("{}:{:02}.{:03} min", minutes, seconds, millis % 1000)
}

/// Formats a millisecond duration as `s.mmm sec`.
pub fn format_millis_to_seconds(millis: i64) -> String {
    format!("{}.{:03} sec", millis / 1000, millis % 1000)
}
