//! Output bins and the sinks that receive them.
//!
//! Bin edges sit halfway between neighbouring points; the outermost edges are the observed
//! `lower_bound`/`upper_bound`. Weights use a linear density approximation: each half of a bin
//! blends the point's weight 3:1 with its neighbour's, and the bin weight is the mean of both
//! halves. Summed over all bins this returns exactly the total point weight.

use serde::{Deserialize, Serialize};

use crate::histogram::weighted_value::WeightedValue;

/// One emitted interval `[lower, upper]` with its estimated weight.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub weight: f64,
}

/// Receiver of finalized bins (a result column writer, a `Vec`, ...).
pub trait BinSink {
    fn push_bin(&mut self, bin: Bin);

    /// Called once after the last bin of one finalized state.
    fn finish_row(&mut self) {}
}

impl BinSink for Vec<Bin> {
    #[inline]
    fn push_bin(&mut self, bin: Bin) {
        self.push(bin);
    }
}

/// Array-of-tuples column: three parallel `f64` columns plus per-row end offsets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnarBins {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub weight: Vec<f64>,
    pub offsets: Vec<usize>,
}

impl ColumnarBins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of finished rows (one per finalized state).
    #[inline]
    pub fn rows(&self) -> usize {
        self.offsets.len()
    }

    /// Bins of row `i`, or `None` when out of range.
    pub fn row(&self, i: usize) -> Option<Vec<Bin>> {
        let end = *self.offsets.get(i)?;
        let start = if i == 0 { 0 } else { self.offsets[i - 1] };
        Some(
            (start..end)
                .map(|j| Bin {
                    lower: self.lower[j],
                    upper: self.upper[j],
                    weight: self.weight[j],
                })
                .collect(),
        )
    }
}

impl BinSink for ColumnarBins {
    fn push_bin(&mut self, bin: Bin) {
        self.lower.push(bin.lower);
        self.upper.push(bin.upper);
        self.weight.push(bin.weight);
    }

    fn finish_row(&mut self) {
        self.offsets.push(self.lower.len());
    }
}

/// Emit one bin per point. `points` must be sorted and deduplicated.
pub(crate) fn emit_bins<S: BinSink + ?Sized>(
    points: &[WeightedValue],
    lower_bound: f64,
    upper_bound: f64,
    sink: &mut S,
) {
    let n = points.len();
    for i in 0..n {
        let p = points[i];
        let first = i == 0;
        let last = i + 1 == n;

        let lower = if first {
            lower_bound
        } else {
            (p.mean + points[i - 1].mean) / 2.0
        };
        let upper = if last {
            upper_bound
        } else {
            (p.mean + points[i + 1].mean) / 2.0
        };

        let lower_weight = if first {
            p.weight
        } else {
            (points[i - 1].weight + p.weight * 3.0) / 4.0
        };
        let upper_weight = if last {
            p.weight
        } else {
            (points[i + 1].weight + p.weight * 3.0) / 4.0
        };

        sink.push_bin(Bin {
            lower,
            upper,
            weight: (lower_weight + upper_weight) / 2.0,
        });
    }
    sink.finish_row();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::test_helpers::{assert_bins_well_formed, assert_rel_close, total_weight};

    #[test]
    fn single_point_spans_bounds() {
        let mut out: Vec<Bin> = Vec::new();
        emit_bins(&[WeightedValue::new(5.0, 3.0)], 1.0, 9.0, &mut out);
        assert_eq!(
            out,
            vec![Bin {
                lower: 1.0,
                upper: 9.0,
                weight: 3.0
            }]
        );
    }

    #[test]
    fn interpolates_edges_and_weights() {
        let pts = [
            WeightedValue::new(0.0, 4.0),
            WeightedValue::new(2.0, 8.0),
            WeightedValue::new(6.0, 4.0),
        ];
        let mut out: Vec<Bin> = Vec::new();
        emit_bins(&pts, -1.0, 7.0, &mut out);
        assert_eq!(out.len(), 3);
        assert_eq!((out[0].lower, out[0].upper), (-1.0, 1.0));
        assert_eq!((out[1].lower, out[1].upper), (1.0, 4.0));
        assert_eq!((out[2].lower, out[2].upper), (4.0, 7.0));
        // left = 4, right = (8 + 12)/4 = 5
        assert_eq!(out[0].weight, 4.5);
        // left = (4 + 24)/4 = 7, right = (4 + 24)/4 = 7
        assert_eq!(out[1].weight, 7.0);
        assert_eq!(out[2].weight, 4.5);
        assert_bins_well_formed("interp", &out);
        assert_rel_close("total", 16.0, total_weight(&out), 1e-12);
    }

    #[test]
    fn columnar_sink_tracks_rows() {
        let mut col = ColumnarBins::new();
        emit_bins(&[WeightedValue::new(1.0, 1.0)], 1.0, 1.0, &mut col);
        emit_bins(&[], f64::INFINITY, f64::NEG_INFINITY, &mut col);
        emit_bins(
            &[WeightedValue::new(1.0, 1.0), WeightedValue::new(3.0, 1.0)],
            1.0,
            3.0,
            &mut col,
        );
        assert_eq!(col.rows(), 3);
        assert_eq!(col.offsets, vec![1, 1, 3]);
        assert_eq!(col.row(1), Some(Vec::new()));
        let third = col.row(2).unwrap();
        assert_eq!(third[0].upper, 2.0);
        assert_eq!(third[1].lower, 2.0);
        assert!(col.row(3).is_none());
    }
}
