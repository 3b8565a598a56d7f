//! Sample generators and comparison helpers for the tests and benchmarks of `response_histogram`.

pub mod sample_fns;
pub mod test_support;
