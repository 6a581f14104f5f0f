//! Aggregate configuration: the validated bin-count parameter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{HistError, HistResult};

/// Upper bound accepted for the bin-count parameter.
pub const BINS_COUNT_LIMIT: u32 = 250;

/// Configured upper bound on emitted bins, validated to `1..=BINS_COUNT_LIMIT`.
///
/// Shared by every accumulator of one aggregate configuration; it also fixes the point buffer
/// capacity at `2 * max_bins`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MaxBins(u32);

impl MaxBins {
    pub fn new(n: u32) -> HistResult<Self> {
        if n == 0 {
            return Err(HistError::ZeroMaxBins);
        }
        if n > BINS_COUNT_LIMIT {
            return Err(HistError::InvalidMaxBins {
                got: n as u64,
                limit: BINS_COUNT_LIMIT,
            });
        }
        Ok(MaxBins(n))
    }

    /// Parse from a wider integer, as handed over by a query-parameter layer.
    pub fn from_u64(n: u64) -> HistResult<Self> {
        match u32::try_from(n) {
            Ok(v) => Self::new(v),
            Err(_) => Err(HistError::InvalidMaxBins {
                got: n,
                limit: BINS_COUNT_LIMIT,
            }),
        }
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Point buffer capacity (`2 * max_bins`).
    #[inline]
    pub fn capacity(self) -> usize {
        2 * self.0 as usize
    }
}

impl TryFrom<u32> for MaxBins {
    type Error = HistError;
    fn try_from(n: u32) -> HistResult<Self> {
        MaxBins::new(n)
    }
}

impl From<MaxBins> for u32 {
    fn from(m: MaxBins) -> u32 {
        m.0
    }
}

impl fmt::Display for MaxBins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_range() {
        assert_eq!(MaxBins::new(1).unwrap().get(), 1);
        assert_eq!(MaxBins::new(250).unwrap().capacity(), 500);
    }

    #[test]
    fn rejects_zero_and_out_of_bound() {
        assert!(matches!(MaxBins::new(0), Err(HistError::ZeroMaxBins)));
        assert!(matches!(
            MaxBins::new(251),
            Err(HistError::InvalidMaxBins { got: 251, .. })
        ));
        assert!(matches!(
            MaxBins::from_u64(u64::MAX),
            Err(HistError::InvalidMaxBins { .. })
        ));
    }

    #[test]
    fn serde_validates() {
        let m: MaxBins = serde_json::from_str("16").unwrap();
        assert_eq!(m.get(), 16);
        assert!(serde_json::from_str::<MaxBins>("0").is_err());
        assert!(serde_json::from_str::<MaxBins>("1000").is_err());
        assert_eq!(serde_json::to_string(&m).unwrap(), "16");
    }
}
