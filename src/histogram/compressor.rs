//! Distance compression (Ben-Haim & Tom-Tov streaming histogram).
//!
//! Pipeline for `compress_points`:
//!   1) sort points by mean (stable)
//!   2) thread a doubly-linked list over indices `0..n`, index `n` is the boundary sentinel
//!   3) seed a min-heap with the gap between every point and its right neighbour
//!   4) pop the smallest gap, skip it if stale (lazy deletion), otherwise fuse the pair
//!      and queue the fused point's new gaps
//!   5) compact the survivors into a prefix of the buffer

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::histogram::weighted_value::{sort_by_mean, WeightedValue};

type QueueItem = Reverse<(OrderedFloat<f64>, usize)>;

/// Doubly-linked active set over point indices.
struct ActiveList {
    previous: Vec<usize>,
    next: Vec<usize>,
    active: Vec<bool>,
}

impl ActiveList {
    /// Chain `0..n` in index order; `n` is the sentinel closing the ring.
    fn new(n: usize) -> Self {
        let mut previous: Vec<usize> = (0..=n).map(|i| i.wrapping_sub(1)).collect();
        let mut next: Vec<usize> = (0..=n).map(|i| i + 1).collect();
        next[n] = 0;
        previous[0] = n;
        let mut active = vec![true; n + 1];
        active[n] = false;
        Self {
            previous,
            next,
            active,
        }
    }

    #[inline]
    fn unlink(&mut self, i: usize) {
        let (p, n) = (self.previous[i], self.next[i]);
        self.previous[n] = p;
        self.next[p] = n;
        self.active[i] = false;
    }
}

/// Gap between `i` and its current right neighbour. Only call when that neighbour is active.
#[inline]
fn quality(points: &[WeightedValue], list: &ActiveList, i: usize) -> f64 {
    points[list.next[i]].mean - points[i].mean
}

/// Fuse the closest adjacent points until at most `max_bins` remain.
///
/// `points` is the occupied prefix of the buffer. It is always left sorted by mean and the
/// surviving points occupy `points[..returned]`.
pub(crate) fn compress_points(points: &mut [WeightedValue], max_bins: usize) -> usize {
    sort_by_mean(points);
    let size = points.len();
    if size <= max_bins {
        return size;
    }

    let mut list = ActiveList::new(size);

    // Every fusion pushes at most two entries and there are `size - max_bins` fusions.
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::with_capacity(2 * size - max_bins);
    for i in 0..size - 1 {
        queue.push(Reverse((OrderedFloat(quality(points, &list, i)), i)));
    }

    let mut remaining = size;
    let mut stale = 0usize;
    while remaining > max_bins {
        let Some(Reverse((OrderedFloat(q), left))) = queue.pop() else {
            break;
        };
        let right = list.next[left];
        // NaN gaps compare equal under OrderedFloat, so they still count as live.
        if !list.active[left]
            || !list.active[right]
            || OrderedFloat(quality(points, &list, left)) != OrderedFloat(q)
        {
            stale += 1;
            continue;
        }

        points[left] = points[left].combine(&points[right]);
        list.unlink(right);
        remaining -= 1;

        if list.active[list.next[left]] {
            queue.push(Reverse((OrderedFloat(quality(points, &list, left)), left)));
        }
        let prev = list.previous[left];
        if list.active[prev] {
            queue.push(Reverse((OrderedFloat(quality(points, &list, prev)), prev)));
        }
    }

    let mut kept = 0usize;
    for i in 0..size {
        if list.active[i] {
            points[kept] = points[i];
            kept += 1;
        }
    }
    debug_assert_eq!(kept, remaining);

    log::trace!(
        "compress: points {} -> {} (max_bins={}, stale queue entries={})",
        size,
        remaining,
        max_bins,
        stale
    );
    remaining
}

/// Fuse neighbours whose means are indistinguishable at the last decimal digit.
///
/// Assumes `points` is sorted by mean; returns the new occupied length.
pub(crate) fn unique_points(points: &mut [WeightedValue]) -> usize {
    if points.is_empty() {
        return 0;
    }
    let mut left = 0usize;
    for right in 1..points.len() {
        let min_diff = 10.0 * (points[left].mean + points[right].mean) * f64::EPSILON;
        if points[left].mean + min_diff.abs() >= points[right].mean {
            points[left] = points[left].combine(&points[right]);
        } else {
            left += 1;
            points[left] = points[right];
        }
    }
    left + 1
}
