//! Human-friendly axis labelling.

/// Preferred number of axis labels.
pub const TARGET_LABEL_COUNT: u64 = 6;

/// Smallest step between labels of the frequency axis.
pub const FREQUENCY_MIN_STEP: u64 = 50;

/// Chooses `(label_count, step)` for an axis running from `0` to `max_value`, with `step` a multiple of
/// `min_step`.
///
/// Candidate divisions into 4 to 7 parts are tried; the one whose last label lands closest to `max_value`
/// wins, ties going to the label count nearest [`TARGET_LABEL_COUNT`]. A `min_step` of `0` is treated as `1`.
pub fn optimal_axis_labels(max_value: u64, min_step: u64) -> (u64, u64) {
    let min_step = min_step.max(1);
    let candidates = (TARGET_LABEL_COUNT - 2)..(TARGET_LABEL_COUNT + 2);

    candidates
        .map(|k| {
            let step = (max_value / k / min_step).max(1) * min_step;
            let count = (max_value / step).max(1);
            let remainder = max_value.abs_diff(count * step);
            (count, step, remainder)
        })
        .min_by_key(|&(count, _, remainder)| (remainder, count.abs_diff(TARGET_LABEL_COUNT)))
        .map(|(count, step, _)| (count, step))
        .unwrap_or((1, min_step))
}
