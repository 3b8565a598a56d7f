//! Descriptive statistics and response-time histograms of load-test runs.
//!
//! A run is a slice of [`Sample`]s, one per recorded HTTP request. This library computes
//! - the run's [`SummaryStats`]: index order statistics of the response times, the average, and the run's
//!   wall-clock window;
//! - a [`Histogram`] of the response times over a linear or logarithmic bin schedule, optionally partitioned
//!   into segments by a [`SegmentKey`] such as the cache state, the number of filter parameters or the value
//!   of a query parameter;
//! - the display ordering of the segments and the merge of segments too sparse to show on their own.
//!
//! It also checks a run against [`MinRequirements`] and compares two runs request by request
//! ([`compare_runs`]).
//!
//! Reading sample logs and rendering diagrams are left to the caller.
//!
//! ```rust
//! use response_histogram::{histogram_report, HistogramCfg, Sample};
//!
//! let samples: Vec<Sample> = [120, 80, 310, 95, 101]
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, t)| Sample::new(t, 1_000 * i as i64).with_cache_age(if i % 2 == 0 { 0 } else { 30 }))
//!     .collect();
//!
//! let cfg = HistogramCfg::default().with_num_bins(10).with_segment_key("cached");
//! let report = histogram_report(&samples, &cfg).expect("non-empty run");
//!
//! println!("{}", report.stats());
//! for label in report.ordering() {
//!     let bins = report.histogram().get(label).expect("label from the ordering");
//!     println!("{label}: {:?}", bins.frequencies().collect::<Vec<_>>());
//! }
//! ```

#![deny(clippy::unwrap_used)]

mod axis_scale;
pub use axis_scale::*;

mod binning;
pub use binning::*;

mod bins;
pub use bins::*;

mod cfg;
pub use cfg::*;

mod error;
pub use error::*;

mod histogram;
pub use histogram::*;

mod natural_order;
pub use natural_order::*;

mod post_process;
pub use post_process::*;

mod report;
pub use report::*;

mod requirements;
pub use requirements::*;

mod sample;
pub use sample::*;

mod segment;
pub use segment::*;

mod speedup;
pub use speedup::*;

mod summary_stats;
pub use summary_stats::*;

mod wrapper;
pub use wrapper::*;
