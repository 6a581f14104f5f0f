// src/histogram/wire.rs
//
// Binary state codec.
//
// Layout (little-endian, no header/version/checksum):
//
//   0..8    : lower_bound (f64)
//   8..16   : upper_bound (f64)
//   16..    : size (unsigned LEB128, 1..=10 bytes)
//   then    : size * { mean: f64, weight: f64 }   (16 bytes each, buffer order)
//
// Encoding writes the state as-is: no sort or compression is forced first.
// Decoding validates `size` before touching any point bytes; a state written under a larger
// `max_bins` is rejected. Short reads surface as `io::ErrorKind::UnexpectedEof`.

use std::io::{self, Read, Write};

use crate::config::MaxBins;
use crate::histogram::accumulator::HistogramAccumulator;
use crate::histogram::weighted_value::WeightedValue;
use crate::{HistError, HistResult};

/// Absolute ceiling on decoded point counts, whatever the configuration.
pub const MAX_POINTS_CEILING: u64 = 1 << 30;

const POINT_LEN: usize = 16;
const MAX_VARINT_LEN: usize = 10;

/* ============================
 * Varint helpers
 * ============================ */

pub fn write_var_uint<W: Write + ?Sized>(w: &mut W, mut v: u64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut n = 0;
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            buf[n] = byte;
            n += 1;
            break;
        }
        buf[n] = byte | 0x80;
        n += 1;
    }
    w.write_all(&buf[..n])
}

pub fn read_var_uint<R: Read + ?Sized>(r: &mut R) -> HistResult<u64> {
    let mut v = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let mut byte = [0u8; 1];
        r.read_exact(&mut byte)?;
        let b = byte[0];
        if i == MAX_VARINT_LEN - 1 && b > 0x01 {
            return Err(HistError::InvalidPayload {
                what: "varint overflows u64",
            });
        }
        v |= ((b & 0x7f) as u64) << (7 * i);
        if b & 0x80 == 0 {
            return Ok(v);
        }
    }
    Err(HistError::InvalidPayload {
        what: "varint longer than 10 bytes",
    })
}

#[inline]
fn read_f64<R: Read + ?Sized>(r: &mut R) -> io::Result<f64> {
    let mut arr = [0u8; 8];
    r.read_exact(&mut arr)?;
    Ok(f64::from_le_bytes(arr))
}

/* ============================
 * Encode
 * ============================ */

impl HistogramAccumulator {
    /// Serialize the current state to `w`.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> HistResult<()> {
        w.write_all(&self.lower_bound().to_le_bytes())?;
        w.write_all(&self.upper_bound().to_le_bytes())?;
        write_var_uint(w, self.size() as u64)?;

        let mut payload = Vec::with_capacity(self.points().len() * POINT_LEN);
        for p in self.points() {
            payload.extend_from_slice(&p.mean.to_le_bytes());
            payload.extend_from_slice(&p.weight.to_le_bytes());
        }
        w.write_all(&payload)?;
        Ok(())
    }

    /// Serialize into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + MAX_VARINT_LEN + self.points().len() * POINT_LEN);
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        buf
    }

    /* ============================
     * Decode
     * ============================ */

    /// Deserialize a state written by [`Self::write_to`], bounds-checked against `max_bins`.
    pub fn read_from<R: Read + ?Sized>(r: &mut R, max_bins: MaxBins) -> HistResult<Self> {
        decode_state(r, max_bins.capacity())
    }

    /// Deserialize from a byte slice; trailing bytes are ignored.
    pub fn from_bytes(mut bytes: &[u8], max_bins: MaxBins) -> HistResult<Self> {
        Self::read_from(&mut bytes, max_bins)
    }
}

pub(crate) fn decode_state<R: Read + ?Sized>(
    r: &mut R,
    capacity: usize,
) -> HistResult<HistogramAccumulator> {
    let lower_bound = read_f64(r)?;
    let upper_bound = read_f64(r)?;
    let size = read_var_uint(r)?;

    if size > capacity as u64 {
        log::debug!("rejecting serialized histogram: size={size} > capacity={capacity}");
        return Err(HistError::OversizedState {
            size,
            limit: capacity as u64,
        });
    }
    if size > MAX_POINTS_CEILING {
        log::debug!("rejecting serialized histogram: size={size} above absolute ceiling");
        return Err(HistError::OversizedState {
            size,
            limit: MAX_POINTS_CEILING,
        });
    }

    let n = size as usize;
    let mut payload = vec![0u8; n * POINT_LEN];
    r.read_exact(&mut payload)?;

    let points: Vec<WeightedValue> = payload
        .chunks_exact(POINT_LEN)
        .map(|chunk| {
            let mut m = [0u8; 8];
            let mut w = [0u8; 8];
            m.copy_from_slice(&chunk[..8]);
            w.copy_from_slice(&chunk[8..]);
            WeightedValue::new(f64::from_le_bytes(m), f64::from_le_bytes(w))
        })
        .collect();

    Ok(HistogramAccumulator::from_parts(
        capacity,
        lower_bound,
        upper_bound,
        &points,
    ))
}
