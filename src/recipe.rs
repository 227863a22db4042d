//! Deterministic per-row recovery recipes.
//!
//! Everything in this module is wire format: a decoder reconstructs which
//! originals a recovery symbol combines, and with which coefficients, solely
//! from `(row, input_count)` using these functions. Two implementations must
//! agree bit for bit, so the constants and mappings here are frozen and
//! covered by stored regression vectors.

use crate::prng::Pcg32;

/// Number of column-residue lanes. Columns are partitioned by `c % 8`.
pub const COLUMN_LANE_COUNT: usize = 8;

/// Polynomial partial sums kept per lane (degrees 0, 1, 2).
pub const COLUMN_SUM_COUNT: usize = 3;

/// Originals covered per LDPC pair-add: each recovery row mixes in
/// `ceil(N / 16)` pseudo-random pairs of originals.
pub const PAIR_ADD_RATE: usize = 16;

/// GF(256) coefficient assigned to a column.
///
/// Never zero, so every column's coefficient is invertible. Cycles with
/// period 255.
#[inline]
pub fn column_value(column: usize) -> u8 {
    (column % 255) as u8 + 1
}

/// GF(256) coefficient that blends the Product sum into the Sum for a row.
#[inline]
pub fn row_value(row: u32) -> u8 {
    (row % 255) as u8 + 1
}

/// Cell-selection bitmask for one (lane, row) pair.
///
/// The low `COLUMN_SUM_COUNT` bits select lane-sum cells 0..3 for the Sum
/// accumulator; the next `COLUMN_SUM_COUNT` bits select cells 0..3 for the
/// Product accumulator. Zero draws are rejected, so every lane contributes
/// at least one cell to every row.
pub fn row_opcode(lane: usize, row: u32) -> u32 {
    debug_assert!(lane < COLUMN_LANE_COUNT);
    const OPCODE_MASK: u32 = (1 << (COLUMN_SUM_COUNT * 2)) - 1;

    let mut prng = Pcg32::seeded(u64::from(row), lane as u64);
    loop {
        let opcode = prng.next_u32() & OPCODE_MASK;
        if opcode != 0 {
            return opcode;
        }
    }
}
