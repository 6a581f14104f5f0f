// src/histogram/accumulator.rs
use crate::config::MaxBins;
use crate::histogram::bins::{emit_bins, Bin, BinSink};
use crate::histogram::compressor::{compress_points, unique_points};
use crate::histogram::weighted_value::WeightedValue;
use crate::{HistError, HistResult};

/// Per-group state of the streaming histogram.
///
/// - `points` is a fixed buffer of `2 * max_bins` slots; only `points[..size]` is occupied and,
///   outside of compression/finalization, in insertion order.
/// - `lower_bound`/`upper_bound` are the min/max of every value ever added, independent of
///   compression. They start at `+inf`/`-inf` so the first value sets both.
/// - `max_bins` is configuration and is not stored; every operation that may compress takes it.
///
/// One writer at a time. Parallel aggregation builds one accumulator per partition and
/// combines them with [`HistogramAccumulator::merge`].
#[derive(Debug, Clone)]
pub struct HistogramAccumulator {
    size: u32,
    lower_bound: f64,
    upper_bound: f64,
    points: Box<[WeightedValue]>,
}

impl PartialEq for HistogramAccumulator {
    fn eq(&self, other: &Self) -> bool {
        self.lower_bound.to_bits() == other.lower_bound.to_bits()
            && self.upper_bound.to_bits() == other.upper_bound.to_bits()
            && self.points().len() == other.points().len()
            && self
                .points()
                .iter()
                .zip(other.points())
                .all(|(a, b)| {
                    a.mean.to_bits() == b.mean.to_bits() && a.weight.to_bits() == b.weight.to_bits()
                })
    }
}

#[inline]
fn ensure_finite_value(value: f64) -> HistResult<()> {
    // NaN breaks sorting and compression; ±inf does not fit the bin partition.
    if !value.is_finite() {
        return Err(HistError::NonFiniteInput {
            context: "sample value",
        });
    }
    Ok(())
}

#[inline]
fn ensure_positive_weight(weight: f64) -> HistResult<()> {
    if !(weight.is_finite() && weight > 0.0) {
        return Err(HistError::InvalidWeight {
            context: "sample weight",
        });
    }
    Ok(())
}

impl HistogramAccumulator {
    /// Empty state with a point buffer sized for `max_bins`.
    pub fn new(max_bins: MaxBins) -> Self {
        Self::with_capacity(max_bins.capacity())
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        HistogramAccumulator {
            size: 0,
            lower_bound: f64::INFINITY,
            upper_bound: f64::NEG_INFINITY,
            points: vec![WeightedValue::VACANT; capacity].into_boxed_slice(),
        }
    }

    /// Seed from decoded parts. `points.len()` must not exceed `capacity`.
    pub(crate) fn from_parts(
        capacity: usize,
        lower_bound: f64,
        upper_bound: f64,
        points: &[WeightedValue],
    ) -> Self {
        debug_assert!(points.len() <= capacity);
        let mut acc = Self::with_capacity(capacity);
        acc.points[..points.len()].copy_from_slice(points);
        acc.size = points.len() as u32;
        acc.lower_bound = lower_bound;
        acc.upper_bound = upper_bound;
        acc
    }

    /// Number of occupied point slots.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Fixed number of point slots (`2 * max_bins` at construction).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    #[inline]
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Occupied points, in buffer order.
    #[inline]
    pub fn points(&self) -> &[WeightedValue] {
        &self.points[..self.size as usize]
    }

    /// Sum of point weights.
    pub fn total_weight(&self) -> f64 {
        self.points().iter().map(|p| p.weight).sum()
    }

    /// Append `(value, weight)`; compresses to `max_bins` once the buffer is full.
    ///
    /// Fails on NaN/±inf values and on weights that are not finite and positive; the state is
    /// left untouched in that case.
    pub fn add(&mut self, value: f64, weight: f64, max_bins: MaxBins) -> HistResult<()> {
        ensure_finite_value(value)?;
        ensure_positive_weight(weight)?;

        // A decoded state may arrive with every slot taken.
        if self.size as usize >= self.capacity() {
            self.compress(self.bin_target(max_bins));
        }

        self.points[self.size as usize] = WeightedValue::new(value, weight);
        self.size += 1;
        self.lower_bound = self.lower_bound.min(value);
        self.upper_bound = self.upper_bound.max(value);

        if self.size as usize >= max_bins.capacity().min(self.capacity()) {
            self.compress(self.bin_target(max_bins));
        }
        Ok(())
    }

    /// `max_bins`, capped at half the buffer so compressing always frees a slot.
    #[inline]
    fn bin_target(&self, max_bins: MaxBins) -> u32 {
        let half = (self.capacity() / 2).max(1) as u32;
        max_bins.get().min(half)
    }

    /// Absorb `other`: widen the bounds, then replay each of its points through [`Self::add`].
    ///
    /// Replays may compress, so the result depends on merge order. Merging is only
    /// approximately associative and commutative.
    pub fn merge(&mut self, other: &HistogramAccumulator, max_bins: MaxBins) -> HistResult<()> {
        self.lower_bound = self.lower_bound.min(other.lower_bound);
        self.upper_bound = self.upper_bound.max(other.upper_bound);
        for p in other.points() {
            self.add(p.mean, p.weight, max_bins)?;
        }
        Ok(())
    }

    /// Sort points by mean and fuse the closest neighbours until at most `target` remain.
    ///
    /// With `size <= target` this only sorts.
    pub fn compress(&mut self, target: u32) {
        let n = self.size as usize;
        let kept = compress_points(&mut self.points[..n], target as usize);
        self.size = kept as u32;
    }

    /// Fuse neighbouring points whose means are numerically indistinguishable.
    ///
    /// Expects sorted points, i.e. call right after [`Self::compress`].
    pub fn unique(&mut self) {
        let n = self.size as usize;
        let kept = unique_points(&mut self.points[..n]);
        self.size = kept as u32;
    }

    /// Compress to `max_bins`, deduplicate, then emit one bin per remaining point into `sink`.
    ///
    /// Ends the sink row even when the state is empty.
    pub fn insert_result_into<S: BinSink + ?Sized>(&mut self, sink: &mut S, max_bins: MaxBins) {
        self.compress(max_bins.get());
        self.unique();
        emit_bins(self.points(), self.lower_bound, self.upper_bound, sink);
    }

    /// Convenience over [`Self::insert_result_into`] collecting into a `Vec`.
    pub fn finalize(&mut self, max_bins: MaxBins) -> Vec<Bin> {
        let mut out = Vec::with_capacity(max_bins.get() as usize);
        self.insert_result_into(&mut out, max_bins);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::test_helpers::{
        assert_bins_well_formed, assert_exact, assert_rel_close, total_weight,
    };

    fn bins(n: u32) -> MaxBins {
        MaxBins::new(n).unwrap()
    }

    #[test]
    fn empty_state_has_sentinel_bounds() {
        let mut acc = HistogramAccumulator::new(bins(4));
        assert!(acc.is_empty());
        assert_eq!(acc.capacity(), 8);
        assert_eq!(acc.lower_bound(), f64::INFINITY);
        assert_eq!(acc.upper_bound(), f64::NEG_INFINITY);
        assert!(acc.finalize(bins(4)).is_empty());
    }

    #[test]
    fn add_tracks_bounds_and_size() {
        let mb = bins(8);
        let mut acc = HistogramAccumulator::new(mb);
        for v in [3.0, -1.5, 7.25] {
            acc.add(v, 1.0, mb).unwrap();
        }
        assert_eq!(acc.size(), 3);
        assert_eq!(acc.lower_bound(), -1.5);
        assert_eq!(acc.upper_bound(), 7.25);
        // insertion order is preserved until compression
        assert_eq!(acc.points()[1], WeightedValue::new(-1.5, 1.0));
    }

    #[test]
    fn add_compresses_when_buffer_fills() {
        let mb = bins(3);
        let mut acc = HistogramAccumulator::new(mb);
        for i in 0..5 {
            acc.add(i as f64, 1.0, mb).unwrap();
        }
        assert_eq!(acc.size(), 5);
        acc.add(5.0, 1.0, mb).unwrap();
        assert_eq!(acc.size(), 3);
        for i in 0..1000 {
            acc.add((i % 17) as f64, 1.0, mb).unwrap();
            assert!(acc.size() as usize <= mb.capacity());
        }
    }

    #[test]
    fn rejects_non_finite_values_without_mutation() {
        let mb = bins(4);
        let mut acc = HistogramAccumulator::new(mb);
        acc.add(1.0, 1.0, mb).unwrap();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = acc.add(bad, 1.0, mb).unwrap_err();
            assert!(matches!(err, HistError::NonFiniteInput { .. }));
        }
        assert_eq!(acc.size(), 1);
        assert_eq!(acc.upper_bound(), 1.0);
    }

    #[test]
    fn rejects_invalid_weights() {
        let mb = bins(4);
        let mut acc = HistogramAccumulator::new(mb);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                acc.add(1.0, bad, mb),
                Err(HistError::InvalidWeight { .. })
            ));
        }
        assert!(acc.is_empty());
    }

    #[test]
    fn four_points_two_bins_keeps_outlier_apart() {
        let mb = bins(2);
        let mut acc = HistogramAccumulator::new(mb);
        for v in [1.0, 2.0, 3.0, 100.0] {
            acc.add(v, 1.0, mb).unwrap();
        }
        let out = acc.finalize(mb);
        assert_eq!(out.len(), 2);
        assert_exact("first lower", 1.0, out[0].lower);
        assert_exact("last upper", 100.0, out[1].upper);
        assert!(out[1].lower > 3.0 && out[1].lower < 100.0);
        assert_rel_close("weight", 4.0, total_weight(&out), 1e-12);
        assert_bins_well_formed("scenario", &out);
    }

    #[test]
    fn merge_widens_bounds_and_replays_points() {
        let mb = bins(16);
        let mut a = HistogramAccumulator::new(mb);
        let mut b = HistogramAccumulator::new(mb);
        a.add(1.0, 2.0, mb).unwrap();
        b.add(-4.0, 1.0, mb).unwrap();
        b.add(9.0, 0.5, mb).unwrap();
        a.merge(&b, mb).unwrap();
        assert_eq!(a.size(), 3);
        assert_eq!(a.lower_bound(), -4.0);
        assert_eq!(a.upper_bound(), 9.0);
        assert_rel_close("weight", 3.5, a.total_weight(), 1e-15);
    }

    #[test]
    fn merge_of_empty_is_noop() {
        let mb = bins(4);
        let mut a = HistogramAccumulator::new(mb);
        a.add(2.0, 1.0, mb).unwrap();
        let before = a.clone();
        a.merge(&HistogramAccumulator::new(mb), mb).unwrap();
        assert_eq!(a, before);
    }

    #[test]
    fn compress_above_size_only_reorders() {
        let mb = bins(10);
        let mut acc = HistogramAccumulator::new(mb);
        for v in [5.0, 1.0, 3.0] {
            acc.add(v, 1.0, mb).unwrap();
        }
        acc.compress(10);
        let means: Vec<f64> = acc.points().iter().map(|p| p.mean).collect();
        assert_eq!(means, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn full_decoded_state_accepts_more_values() {
        let mb = bins(2);
        let pts: Vec<WeightedValue> = (0..4).map(|i| WeightedValue::new(i as f64, 1.0)).collect();
        let mut acc = HistogramAccumulator::from_parts(mb.capacity(), 0.0, 3.0, &pts);
        assert_eq!(acc.size(), 4);
        acc.add(10.0, 1.0, mb).unwrap();
        assert!(acc.size() as usize <= mb.capacity());
        assert_rel_close("weight", 5.0, acc.total_weight(), 1e-15);
    }

    #[test]
    fn add_with_larger_max_bins_stays_in_buffer() {
        let mut acc = HistogramAccumulator::new(bins(2));
        let larger = bins(5);
        for i in 0..10 {
            acc.add(i as f64, 1.0, larger).unwrap();
            assert!(acc.size() as usize <= acc.capacity());
        }
        assert_eq!(acc.capacity(), 4);
        assert_eq!(acc.lower_bound(), 0.0);
        assert_eq!(acc.upper_bound(), 9.0);
        assert_rel_close("weight", 10.0, acc.total_weight(), 1e-12);

        let mut other = HistogramAccumulator::new(larger);
        for i in 0..8 {
            other.add(100.0 + i as f64, 1.0, larger).unwrap();
        }
        acc.merge(&other, larger).unwrap();
        assert!(acc.size() as usize <= acc.capacity());
        assert_rel_close("merged weight", 18.0, acc.total_weight(), 1e-12);
    }

    #[test]
    fn extreme_magnitudes_compress_to_target() {
        let mb = bins(2);
        let mut acc = HistogramAccumulator::new(mb);
        for i in 0..300 {
            let v = match i % 3 {
                0 => 1.7e308,
                1 => -1.7e308,
                _ => 0.0,
            };
            acc.add(v, 1.0, mb).unwrap();
        }
        acc.compress(2);
        assert!(acc.size() <= 2);
        for p in acc.points() {
            assert!(p.mean.is_finite(), "{p:?}");
            assert!(p.mean.abs() <= 1.7e308 * (1.0 + 1e-12), "{p:?}");
        }
        assert_rel_close("weight", 300.0, acc.total_weight(), 1e-12);
        let out = acc.finalize(mb);
        assert!(out.len() <= 2);
        assert_rel_close("bin weight", 300.0, total_weight(&out), 1e-12);
    }

    #[test]
    fn finalize_dedups_identical_values() {
        let mb = bins(8);
        let mut acc = HistogramAccumulator::new(mb);
        for _ in 0..5 {
            acc.add(0.3, 1.0, mb).unwrap();
        }
        acc.add(0.1 + 0.2, 1.0, mb).unwrap();
        let out = acc.finalize(mb);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].weight, 6.0);
        assert_eq!(out[0].lower, 0.3);
        assert_eq!(out[0].upper, 0.1 + 0.2);
    }
}
