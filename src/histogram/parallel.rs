//! Partitioned aggregation: one accumulator per partition, built on the rayon pool, then merged
//! by a single reducing step in partition order.

use rayon::prelude::*;

use crate::histogram::accumulator::HistogramAccumulator;
use crate::histogram::aggregate::{HistogramAggregate, IntoMean};
use crate::HistResult;

impl HistogramAggregate {
    /// Build one partial state per partition concurrently.
    pub fn partial_states<T>(&self, partitions: &[Vec<T>]) -> HistResult<Vec<HistogramAccumulator>>
    where
        T: IntoMean + Sync,
    {
        partitions
            .par_iter()
            .map(|part| -> HistResult<HistogramAccumulator> {
                let mut state = self.create_state();
                self.add_batch(&mut state, part)?;
                Ok(state)
            })
            .collect()
    }

    /// Aggregate every partition into one state.
    ///
    /// Partials are merged left to right, so the result is deterministic for a given
    /// partitioning, independent of thread scheduling.
    pub fn aggregate_partitions<T>(&self, partitions: &[Vec<T>]) -> HistResult<HistogramAccumulator>
    where
        T: IntoMean + Sync,
    {
        let partials = self.partial_states(partitions)?;
        log::debug!("merging {} partial histogram states", partials.len());
        let mut acc = self.create_state();
        for part in &partials {
            self.merge(&mut acc, part)?;
        }
        Ok(acc)
    }
}
