pub mod aggregate;
pub mod bins;
pub mod test_helpers;
pub mod weighted_value;
pub mod wire;

// Internal building blocks
mod accumulator;
mod compressor;
mod parallel;

// Public surface
pub use accumulator::HistogramAccumulator;
pub use aggregate::{HistogramAggregate, HistogramAggregateBuilder, IntoMean};
pub use bins::{Bin, BinSink, ColumnarBins};
pub use weighted_value::WeightedValue;
pub use wire::MAX_POINTS_CEILING;
