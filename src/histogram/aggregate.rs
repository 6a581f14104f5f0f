//! The `histogram(max_bins)` aggregate: configuration bound to the per-group state operations.

use std::io::{Read, Write};

use crate::config::MaxBins;
use crate::histogram::accumulator::HistogramAccumulator;
use crate::histogram::bins::{Bin, BinSink};
use crate::HistResult;

/// Numeric column values accepted by the aggregate, widened to `f64` before accumulation.
pub trait IntoMean: Copy {
    fn into_mean(self) -> f64;
}

macro_rules! impl_into_mean {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoMean for $t {
                #[inline]
                fn into_mean(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_into_mean!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Aggregate descriptor owning the configured bin count.
///
/// Every raw value is added with weight `1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HistogramAggregate {
    max_bins: MaxBins,
}

/// Builder for [`HistogramAggregate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramAggregateBuilder {
    max_bins: Option<u64>,
}

impl HistogramAggregateBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bin-count parameter; validated in [`Self::build`].
    #[inline]
    pub fn max_bins(mut self, n: u64) -> Self {
        self.max_bins = Some(n);
        self
    }

    /// Validate and build. A missing bin count is rejected like a zero one.
    pub fn build(self) -> HistResult<HistogramAggregate> {
        let max_bins = MaxBins::from_u64(self.max_bins.unwrap_or(0))?;
        Ok(HistogramAggregate { max_bins })
    }
}

impl HistogramAggregate {
    pub const NAME: &'static str = "histogram";

    #[inline]
    pub fn new(max_bins: MaxBins) -> Self {
        Self { max_bins }
    }

    #[inline]
    pub fn builder() -> HistogramAggregateBuilder {
        HistogramAggregateBuilder::new()
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    #[inline]
    pub fn max_bins(&self) -> MaxBins {
        self.max_bins
    }

    /// Fresh empty per-group state.
    pub fn create_state(&self) -> HistogramAccumulator {
        HistogramAccumulator::new(self.max_bins)
    }

    pub fn add<T: IntoMean>(&self, state: &mut HistogramAccumulator, value: T) -> HistResult<()> {
        state.add(value.into_mean(), 1.0, self.max_bins)
    }

    /// Add every value of a column slice; stops at the first rejected value.
    pub fn add_batch<T: IntoMean>(
        &self,
        state: &mut HistogramAccumulator,
        values: &[T],
    ) -> HistResult<()> {
        for &v in values {
            self.add(state, v)?;
        }
        Ok(())
    }

    pub fn merge(
        &self,
        state: &mut HistogramAccumulator,
        other: &HistogramAccumulator,
    ) -> HistResult<()> {
        state.merge(other, self.max_bins)
    }

    pub fn serialize<W: Write + ?Sized>(
        &self,
        state: &HistogramAccumulator,
        w: &mut W,
    ) -> HistResult<()> {
        state.write_to(w)
    }

    pub fn deserialize<R: Read + ?Sized>(&self, r: &mut R) -> HistResult<HistogramAccumulator> {
        HistogramAccumulator::read_from(r, self.max_bins)
    }

    /// Emit the state's bins into `sink` as one row.
    pub fn insert_result_into<S: BinSink + ?Sized>(
        &self,
        state: &mut HistogramAccumulator,
        sink: &mut S,
    ) {
        state.insert_result_into(sink, self.max_bins)
    }

    pub fn finalize(&self, state: &mut HistogramAccumulator) -> Vec<Bin> {
        state.finalize(self.max_bins)
    }
}
