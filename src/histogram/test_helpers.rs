//! Assertion helpers shared by unit and integration tests.

use crate::histogram::Bin;

pub fn assert_exact(label: &str, expected: f64, got: f64) {
    assert!(
        expected.to_bits() == got.to_bits(),
        "{}: expected exactly {:.17}, got {:.17}",
        label,
        expected,
        got
    );
}

pub fn assert_rel_close(label: &str, expected: f64, got: f64, rtol: f64) {
    let denom = expected.abs().max(1e-300);
    let rel = ((expected - got).abs()) / denom;
    assert!(
        rel < rtol,
        "{}: expected ~= {:.9}, got {:.9}, rel_err={:.6e}, rtol={:.6e}",
        label,
        expected,
        got,
        rel,
        rtol
    );
}

pub fn assert_monotone_chain(label: &str, values: &[f64]) {
    for i in 1..values.len() {
        assert!(
            values[i] >= values[i - 1],
            "{}: non-monotone at i={}: {} < {}",
            label,
            i,
            values[i],
            values[i - 1]
        );
    }
}

/// Lower edges non-decreasing, each bin `lower <= upper`, every weight positive.
pub fn assert_bins_well_formed(label: &str, bins: &[Bin]) {
    let lowers: Vec<f64> = bins.iter().map(|b| b.lower).collect();
    assert_monotone_chain(label, &lowers);
    for (i, b) in bins.iter().enumerate() {
        assert!(
            b.lower <= b.upper,
            "{}: bin {} inverted: [{}, {}]",
            label,
            i,
            b.lower,
            b.upper
        );
        assert!(b.weight > 0.0, "{}: bin {} weight {}", label, i, b.weight);
    }
}

pub fn total_weight(bins: &[Bin]) -> f64 {
    bins.iter().map(|b| b.weight).sum()
}
