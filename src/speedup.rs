//! Request-by-request comparison of the response times of two runs of the same load test.

use crate::{summary_stats::run_window, Sample};
use std::{cmp::Ordering, collections::BTreeMap, fmt::Display};

/// Query parameters that differ between runs of the same requests and are left out of the comparison key.
pub const VOLATILE_PARAMS: [&str; 7] = [
    "sid",
    "username",
    "password",
    "format",
    "noArticleNumberSearch",
    "noCampaign",
    "idsOnly",
];

/// Comparison key of `sample`: its query parameters in URL order without [`VOLATILE_PARAMS`], joined as
/// `key=value` pairs by `&`. Empty for a sample without a query.
pub fn comparison_key(sample: &Sample) -> String {
    sample
        .query_params
        .iter()
        .filter(|(k, _)| !VOLATILE_PARAMS.contains(&k.as_str()))
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

//=================
// RunResponseTimes

/// Response times of one run, grouped by [`comparison_key`] in sample order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunResponseTimes {
    pub times: BTreeMap<String, Vec<u32>>,
    /// Wall-clock duration of the run; `0` for an empty run.
    pub duration_ms: i64,
}

impl RunResponseTimes {
    pub fn new(samples: &[Sample]) -> Self {
        let mut times: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for sample in samples {
            times
                .entry(comparison_key(sample))
                .or_default()
                .push(sample.response_time_ms);
        }
        let duration_ms = run_window(samples).map_or(0, |(start, end)| end - start);
        Self { times, duration_ms }
    }

    /// Number of keys whose request was issued more than once.
    pub fn repeated_requests(&self) -> usize {
        self.times.values().filter(|t| t.len() > 1).count()
    }
}

//=================
// SpeedUp

/// The response times of the `pos`-th occurrence of request `key` in an old and a new run.
///
/// Ordered by [`Self::speed_up`], then `key`, then `pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedUp {
    pub old_time: u32,
    pub new_time: u32,
    pub key: String,
    pub pos: usize,
}

impl SpeedUp {
    /// `old_time / new_time - 1`: positive when the new run was faster.
    pub fn speed_up(&self) -> f64 {
        f64::from(self.old_time) / f64::from(self.new_time) - 1.0
    }

    /// `old_time - new_time`.
    pub fn diff_ms(&self) -> i64 {
        i64::from(self.old_time) - i64::from(self.new_time)
    }
}

impl Ord for SpeedUp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.speed_up()
            .total_cmp(&other.speed_up())
            .then_with(|| self.key.cmp(&other.key))
            .then_with(|| self.pos.cmp(&other.pos))
            .then_with(|| self.old_time.cmp(&other.old_time))
    }
}

impl PartialOrd for SpeedUp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for SpeedUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ms -> {} ms ({:+.1}%) {}#{}",
            self.old_time,
            self.new_time,
            self.speed_up() * 100.0,
            self.key,
            self.pos
        )
    }
}

//=================
// SpeedUpReport

/// Outcome of [`compare_runs`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedUpReport {
    /// Ascending: the largest slow-downs first, the largest speed-ups last.
    pub speed_ups: Vec<SpeedUp>,
    pub median_speed_up: Option<f64>,
    /// Sum of `old_time - new_time`.
    pub total_diff_ms: i64,
    pub average_diff_ms: Option<i64>,
    /// Number of requests that took longer in the new run.
    pub num_slower: usize,
    pub old_duration_ms: i64,
    pub new_duration_ms: i64,
}

impl SpeedUpReport {
    /// The `n` largest speed-ups, largest first.
    pub fn top_speed_ups(&self, n: usize) -> impl Iterator<Item = &SpeedUp> + '_ {
        self.speed_ups.iter().rev().take(n)
    }

    /// The `n` largest slow-downs, largest first.
    pub fn top_slow_downs(&self, n: usize) -> impl Iterator<Item = &SpeedUp> + '_ {
        self.speed_ups.iter().take(n)
    }
}

impl Display for SpeedUpReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of data points: {}", self.speed_ups.len())?;
        if let Some(median) = self.median_speed_up {
            writeln!(f, "Median speed-up: {:.1}%", median * 100.0)?;
        }
        writeln!(f, "Total diffs: {} ms", self.total_diff_ms)?;
        if let Some(average) = self.average_diff_ms {
            writeln!(f, "Average diffs: {average} ms")?;
        }
        write!(f, "Number of samples that were slower: {}", self.num_slower)
    }
}

/// Compares the response times of `old` and `new` request by request.
///
/// Requests are paired by [`comparison_key`] and by their position among the requests with the same key. The
/// runs are only compared when they have the same number of distinct keys; otherwise the report has no
/// speed-ups, though it still carries the run durations.
pub fn compare_runs(old: &[Sample], new: &[Sample]) -> SpeedUpReport {
    log::trace!("entering `compare_runs`");
    let old = RunResponseTimes::new(old);
    let new = RunResponseTimes::new(new);

    let mut speed_ups = Vec::new();
    if old.times.len() == new.times.len() {
        for (key, old_times) in &old.times {
            let new_times = match new.times.get(key) {
                Some(times) => times,
                None => continue,
            };
            speed_ups.extend(old_times.iter().zip(new_times).enumerate().map(
                |(pos, (&old_time, &new_time))| SpeedUp {
                    old_time,
                    new_time,
                    key: key.clone(),
                    pos,
                },
            ));
        }
    } else {
        log::warn!(
            "runs are not comparable: {} and {} distinct requests",
            old.times.len(),
            new.times.len()
        );
    }
    speed_ups.sort();

    let total_diff_ms: i64 = speed_ups.iter().map(SpeedUp::diff_ms).sum();
    let len = speed_ups.len();
    SpeedUpReport {
        median_speed_up: speed_ups.get(len / 2).map(SpeedUp::speed_up),
        total_diff_ms,
        average_diff_ms: (len > 0).then(|| total_diff_ms / len as i64),
        num_slower: speed_ups.iter().filter(|s| s.old_time < s.new_time).count(),
        old_duration_ms: old.duration_ms,
        new_duration_ms: new.duration_ms,
        speed_ups,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample(query: &str, response_time_ms: u32, start: i64) -> Sample {
        Sample::new(response_time_ms, start).with_query(query)
    }

    #[test]
    fn test_comparison_key_drops_volatile_params() {
        let s = sample("sid=abc&query=shoes&format=json&page=2&idsOnly=true", 10, 0);
        assert_eq!(comparison_key(&s), "query=shoes&page=2");
        assert_eq!(comparison_key(&Sample::new(10, 0)), "");
    }

    #[test]
    fn test_run_response_times() {
        let run = RunResponseTimes::new(&[
            sample("query=a&sid=1", 100, 0),
            sample("query=b", 50, 20),
            sample("query=a&sid=2", 80, 200),
        ]);
        assert_eq!(run.times["query=a"], vec![100, 80]);
        assert_eq!(run.repeated_requests(), 1);
        assert_eq!(run.duration_ms, 280);
    }

    #[test]
    fn test_compare_runs() {
        let old = vec![
            sample("query=a", 100, 0),
            sample("query=b", 50, 0),
            sample("query=a", 90, 100),
        ];
        let new = vec![
            sample("query=a&sid=9", 50, 0),
            sample("query=b", 100, 0),
            sample("query=a", 90, 100),
        ];
        let report = compare_runs(&old, &new);
        let summary: Vec<(&str, usize, u32, u32)> = report
            .speed_ups
            .iter()
            .map(|s| (s.key.as_str(), s.pos, s.old_time, s.new_time))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("query=b", 0, 50, 100),
                ("query=a", 1, 90, 90),
                ("query=a", 0, 100, 50),
            ]
        );
        assert_eq!(report.median_speed_up, Some(0.0));
        assert_eq!(report.total_diff_ms, 0);
        assert_eq!(report.average_diff_ms, Some(0));
        assert_eq!(report.num_slower, 1);
        assert_eq!(report.old_duration_ms, 190);
        assert_eq!(report.top_speed_ups(1).next().map(|s| s.pos), Some(0));
        assert_eq!(
            report.top_slow_downs(1).next().map(|s| s.key.as_str()),
            Some("query=b")
        );
    }

    #[test]
    fn test_incomparable_runs() {
        let old = vec![sample("query=a", 100, 0), sample("query=b", 50, 0)];
        let new = vec![sample("query=a", 100, 0)];
        let report = compare_runs(&old, &new);
        assert!(report.speed_ups.is_empty());
        assert_eq!(report.median_speed_up, None);
        assert_eq!(report.average_diff_ms, None);
        assert_eq!(report.new_duration_ms, 100);
    }

    #[test]
    fn test_speed_up_display() {
        let s = SpeedUp {
            old_time: 150,
            new_time: 100,
            key: "query=a".to_owned(),
            pos: 2,
        };
        assert_eq!(s.to_string(), "150 ms -> 100 ms (+50.0%) query=a#2");
    }
}
