//! Window parameters, lane-sum construction, and the recovery encoder.
//!
//! The encoder precomputes, per column-residue lane, three polynomial
//! partial sums over the originals (degrees 0..2 in each column's value).
//! One recovery symbol then costs a sparse LDPC overlay plus a handful of
//! lane-cell XORs instead of a pass over all N originals.

use crate::gf::{self, Gf256};
use crate::prng::Pcg32;
use crate::recipe::{
    self, COLUMN_LANE_COUNT, COLUMN_SUM_COUNT, PAIR_ADD_RATE,
};
use crate::xor::XorBatch;
use crate::Error;

/// Window parameters: input count and the derived symbol geometry.
///
/// `total_bytes` is split into `input_count` columns of `symbol_bytes` each;
/// the final column holds the remaining `final_bytes` (`1..=symbol_bytes`)
/// and its tail is treated as implicit zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    input_count: usize,
    total_bytes: u64,
    symbol_bytes: usize,
    final_bytes: usize,
}

impl Params {
    /// Derive window parameters from the input count and total byte length.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` if `input_count` is zero or does not fit in
    /// `u32`, if `total_bytes < input_count`, or if the split would leave
    /// the final column empty.
    pub fn new(input_count: usize, total_bytes: u64) -> Result<Self, Error> {
        if input_count == 0 || input_count > u32::MAX as usize {
            return Err(Error::InvalidInput);
        }
        let n = input_count as u64;
        if total_bytes < n {
            return Err(Error::InvalidInput);
        }

        let symbol_bytes64 = total_bytes.div_ceil(n);
        let symbol_bytes = usize::try_from(symbol_bytes64).map_err(|_| Error::InvalidInput)?;
        // ceil() rounding can leave the final column empty or negative,
        // e.g. (input_count = 3, total_bytes = 4) or (5, 6); such a split
        // has no valid symbol layout.
        let final_bytes64 = (n - 1)
            .checked_mul(symbol_bytes64)
            .and_then(|head| total_bytes.checked_sub(head))
            .ok_or(Error::InvalidInput)?;
        if final_bytes64 == 0 {
            return Err(Error::InvalidInput);
        }
        let final_bytes = final_bytes64 as usize;

        Ok(Params {
            input_count,
            total_bytes,
            symbol_bytes,
            final_bytes,
        })
    }

    /// Number of original columns in the window.
    #[inline]
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Total protected bytes across all columns.
    #[inline]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Size of every symbol, original and recovery, in bytes.
    #[inline]
    pub fn symbol_bytes(&self) -> usize {
        self.symbol_bytes
    }

    /// Effective size of the final column (`1..=symbol_bytes`).
    #[inline]
    pub fn final_bytes(&self) -> usize {
        self.final_bytes
    }

    /// Whether `column` is the (possibly short) final column.
    #[inline]
    pub fn is_final_column(&self, column: usize) -> bool {
        column == self.input_count - 1
    }

    /// Effective byte length of `column`.
    #[inline]
    pub fn column_bytes(&self, column: usize) -> usize {
        if self.is_final_column(column) {
            self.final_bytes
        } else {
            self.symbol_bytes
        }
    }
}

/// Parameters plus the borrowed original columns.
#[derive(Debug)]
struct Window<'a> {
    params: Params,
    originals: Vec<&'a [u8]>,
}

impl<'a> Window<'a> {
    fn new(params: Params, originals: &[&'a [u8]]) -> Result<Self, Error> {
        if originals.len() != params.input_count() {
            return Err(Error::InvalidInput);
        }
        for (column, original) in originals.iter().enumerate() {
            if original.len() != params.column_bytes(column) {
                return Err(Error::InvalidInput);
            }
        }
        Ok(Window {
            params,
            originals: originals.to_vec(),
        })
    }

    /// The column's data at its effective length (short for the final one).
    #[inline]
    fn original(&self, column: usize) -> &'a [u8] {
        self.originals[column]
    }
}

/// One recovery symbol, borrowed from the encoder's output buffer.
///
/// The data aliases encoder-internal storage: the exclusive borrow taken by
/// [`Encoder::encode`] keeps the view valid exactly until the next call.
/// Copy the bytes out to keep them longer.
#[derive(Debug)]
pub struct RecoverySymbol<'e> {
    data: &'e [u8],
    row: u32,
}

impl<'e> RecoverySymbol<'e> {
    /// The symbol payload, `symbol_bytes` long.
    #[inline]
    pub fn data(&self) -> &'e [u8] {
        self.data
    }

    /// Payload length in bytes.
    #[inline]
    pub fn bytes(&self) -> usize {
        self.data.len()
    }

    /// The row index identifying this symbol's recipe.
    #[inline]
    pub fn row(&self) -> u32 {
        self.row
    }
}

/// Zero-initialized heap buffer with fallible allocation.
fn alloc_symbol(bytes: usize) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(|_| Error::OutOfMemory)?;
    buffer.resize(bytes, 0);
    Ok(buffer)
}

/// `dst = src`, zero-extended to the destination length.
#[inline]
fn copy_zero_extended(dst: &mut [u8], src: &[u8]) {
    dst[..src.len()].copy_from_slice(src);
    dst[src.len()..].fill(0);
}

/// Recovery symbol encoder over a fixed window of originals.
///
/// Construction validates the window and builds the lane-sum table in one
/// step; a live encoder is always fully initialized and [`Encoder::encode`]
/// cannot fail. The originals are borrowed, never copied, and must outlive
/// the encoder.
pub struct Encoder<'a> {
    window: Window<'a>,
    /// `lane_sums[lane][k]` holds the XOR over columns `c ≡ lane (mod 8)` of
    /// `column_value(c)^k · original[c]`. Invariant after construction.
    lane_sums: [[Vec<u8>; COLUMN_SUM_COUNT]; COLUMN_LANE_COUNT],
    sum: Vec<u8>,
    product: Vec<u8>,
}

impl<'a> Encoder<'a> {
    /// Build an encoder over `originals`.
    ///
    /// Every column must be exactly `params.column_bytes(column)` long; the
    /// final column supplies only its `final_bytes` prefix and its tail is
    /// never read.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` on a count or length mismatch;
    /// `Error::OutOfMemory` if the lane-sum or scratch buffers cannot be
    /// allocated. On error nothing is published.
    pub fn new(params: Params, originals: &[&'a [u8]]) -> Result<Self, Error> {
        let window = Window::new(params, originals)?;
        let symbol_bytes = params.symbol_bytes();

        let mut lane_sums: [[Vec<u8>; COLUMN_SUM_COUNT]; COLUMN_LANE_COUNT] = Default::default();
        for lane in lane_sums.iter_mut() {
            for cell in lane.iter_mut() {
                *cell = alloc_symbol(symbol_bytes)?;
            }
        }
        let sum = alloc_symbol(symbol_bytes)?;
        let product = alloc_symbol(symbol_bytes)?;

        // Fold every column into its lane's three partial sums. The final
        // column contributes only its effective prefix; the cell tails stay
        // zero from allocation.
        for (column, &original) in window.originals.iter().enumerate() {
            let lane = column % COLUMN_LANE_COUNT;
            let cx = Gf256(recipe::column_value(column));
            let cx2 = gf::sqr(cx);
            let len = original.len();

            let [cell0, cell1, cell2] = &mut lane_sums[lane];
            gf::add_mem(cell0, original);
            gf::muladd_mem(&mut cell1[..len], original, cx);
            gf::muladd_mem(&mut cell2[..len], original, cx2);
        }

        Ok(Encoder {
            window,
            lane_sums,
            sum,
            product,
        })
    }

    /// Window parameters this encoder was built with.
    #[inline]
    pub fn params(&self) -> &Params {
        &self.window.params
    }

    /// Generate the recovery symbol for `row`.
    ///
    /// Pure in `(row, originals)`: equal inputs yield byte-identical
    /// symbols. The returned view is valid until the next call.
    pub fn encode(&mut self, row: u32) -> RecoverySymbol<'_> {
        let count = self.window.params.input_count() as u32;

        // LDPC overlay: ceil(N / 16) pseudo-random pairs of originals seed
        // the two accumulators. Duplicate draws cancel via XOR.
        let mut prng = Pcg32::seeded(u64::from(row), u64::from(count));
        let pair_count = (count as usize + PAIR_ADD_RATE - 1) / PAIR_ADD_RATE;

        let element = (prng.next_u32() % count) as usize;
        copy_zero_extended(&mut self.sum, self.window.original(element));
        let element = (prng.next_u32() % count) as usize;
        copy_zero_extended(&mut self.product, self.window.original(element));

        let mut sum = XorBatch::new(&mut self.sum);
        let mut product = XorBatch::new(&mut self.product);

        for _ in 1..pair_count {
            let element = (prng.next_u32() % count) as usize;
            sum.add(self.window.original(element));
            let element = (prng.next_u32() % count) as usize;
            product.add(self.window.original(element));
        }

        // Mix in the lane cells the row's opcodes select: low bits feed Sum,
        // high bits feed Product.
        for (lane, cells) in self.lane_sums.iter().enumerate() {
            let opcode = recipe::row_opcode(lane, row);
            let mut mask = 1;
            for cell in cells {
                if opcode & mask != 0 {
                    sum.add(cell);
                }
                mask <<= 1;
            }
            for cell in cells {
                if opcode & mask != 0 {
                    product.add(cell);
                }
                mask <<= 1;
            }
        }

        sum.finalize();
        product.finalize();

        // Sum += RX · Product
        gf::muladd_mem(
            &mut self.sum,
            &self.product,
            Gf256(recipe::row_value(row)),
        );

        RecoverySymbol {
            data: self.sum.as_slice(),
            row,
        }
    }
}
