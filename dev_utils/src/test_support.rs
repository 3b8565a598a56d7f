use response_histogram::{BinList, Histogram};

pub fn f64_are_close(left: f64, right: f64, pct: f64) -> bool {
    let avg_abs = (left.abs() + right.abs()) / 2.0;
    (left - right).abs() <= avg_abs * pct
}

pub fn u64_comparator(pct: f64) -> impl Fn(u64, u64) -> bool {
    move |left: u64, right: u64| {
        if pct == 0.0 {
            return left == right;
        }
        let avg_abs = (left as f64 + right as f64) / 2.0;
        left.abs_diff(right) as f64 <= avg_abs * pct
    }
}

/// Frequencies of the segment `label` of `histogram`; empty if there is no such segment.
pub fn frequencies(histogram: &Histogram, label: &str) -> Vec<u32> {
    histogram
        .get(label)
        .map(|list| list.frequencies().collect())
        .unwrap_or_default()
}

/// Bounds and frequencies of every segment, for comparing two builds.
pub fn snapshot(histogram: &Histogram) -> Vec<(String, Vec<(u32, u32)>)> {
    histogram
        .bins()
        .iter()
        .map(|(label, list)| (label.to_string(), pairs(list)))
        .collect()
}

fn pairs(list: &BinList) -> Vec<(u32, u32)> {
    list.bins().iter().map(|b| (b.bound, b.frequency)).collect()
}
