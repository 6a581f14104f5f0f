//! Fixed-memory streaming histogram.
//!
//! Values stream into a [`HistogramAccumulator`]; once its buffer of `2 * max_bins` points fills,
//! the closest neighbouring points are fused until `max_bins` remain. Partial states from
//! different shards combine with `merge`, travel through a compact binary codec, and finalize
//! into at most `max_bins` bins with interpolated weights.

pub mod config;
mod error;
pub mod histogram;
pub mod logging;

pub use config::{MaxBins, BINS_COUNT_LIMIT};
pub use error::{HistError, HistResult};
pub use histogram::{
    Bin, BinSink, ColumnarBins, HistogramAccumulator, HistogramAggregate, WeightedValue,
};
