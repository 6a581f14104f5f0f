use serde::{Deserialize, Serialize};

/// A point of the histogram: the mean of one or more fused input values and their total weight.
///
/// Fusing is [`WeightedValue::combine`], a running weighted mean. It is not symmetric under
/// floating-point rounding, so the receiver must always be the left (smaller-mean) point.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedValue {
    pub mean: f64,
    pub weight: f64,
}

impl WeightedValue {
    /// Placeholder for unoccupied buffer slots.
    pub(crate) const VACANT: WeightedValue = WeightedValue {
        mean: 0.0,
        weight: 0.0,
    };

    #[inline]
    pub fn new(mean: f64, weight: f64) -> Self {
        WeightedValue { mean, weight }
    }

    /// Weighted average of `self` and `other`:
    /// `mean' = a.mean + b.weight * (b.mean - a.mean) / (a.weight + b.weight)`.
    ///
    /// When the difference of means overflows, the mean is taken as the sum of weight-scaled
    /// means instead, which stays finite between the two inputs.
    #[inline]
    pub fn combine(&self, other: &WeightedValue) -> WeightedValue {
        let weight = other.weight + self.weight;
        let delta = other.mean - self.mean;
        let mean = if delta.is_finite() || !(self.mean.is_finite() && other.mean.is_finite()) {
            self.mean + other.weight * delta / weight
        } else {
            self.mean * (self.weight / weight) + other.mean * (other.weight / weight)
        };
        WeightedValue { mean, weight }
    }
}

/// Stable sort by mean under the IEEE total order.
#[inline]
pub(crate) fn sort_by_mean(points: &mut [WeightedValue]) {
    points.sort_by(|a, b| a.mean.total_cmp(&b.mean));
}

/// Non-strictly increasing by mean.
#[inline]
pub fn is_sorted_by_mean(points: &[WeightedValue]) -> bool {
    points.windows(2).all(|w| w[0].mean <= w[1].mean)
}
