//! fountain256 - Convolutional fountain FEC over GF(256)
//!
//! Protects a fixed window of N equal-length original symbols by generating
//! an unlimited stream of recovery symbols. Each recovery symbol is a
//! pseudo-random GF(256)-linear combination of the originals, derived on
//! demand from its row index: a sparse LDPC pair overlay seeds two running
//! sums, precomputed per-lane polynomial partial sums supply mixing
//! diversity, and a final field blend folds the two sums into one output.
//! A decoder rebuilds any row's recipe solely from `(row, N)` using the
//! public [`recipe`] and [`prng`] modules.
//!
//! This is not an MDS code: as losses grow, a decoder occasionally needs one
//! extra symbol beyond the loss count. In exchange, encoding one symbol
//! costs a sparse overlay plus a fixed number of lane-cell XORs instead of
//! a pass over all N originals.
//!
//! # Example
//!
//! ```rust
//! use fountain256::{Encoder, Params};
//!
//! // Four originals of 64 bytes each.
//! let data: Vec<Vec<u8>> = (0u8..4).map(|i| vec![i; 64]).collect();
//! let originals: Vec<&[u8]> = data.iter().map(|d| d.as_slice()).collect();
//!
//! let params = Params::new(4, 256).unwrap();
//! let mut encoder = Encoder::new(params, &originals).unwrap();
//!
//! // Any nonnegative row index yields a deterministic recovery symbol.
//! let symbol = encoder.encode(7);
//! assert_eq!(symbol.bytes(), 64);
//! assert_eq!(symbol.row(), 7);
//!
//! // The view aliases the encoder's output buffer; copy to keep it.
//! let kept = symbol.data().to_vec();
//! assert_eq!(encoder.encode(7).data(), &kept[..]);
//! ```
//!
//! # Window geometry
//!
//! `Params::new(n, total_bytes)` splits `total_bytes` into `n` columns of
//! `ceil(total_bytes / n)` bytes; the final column may be shorter and its
//! tail is treated as implicit zeros. Originals are borrowed for the
//! encoder's lifetime, never copied.

pub mod gf;
pub mod prng;
pub mod recipe;

mod encoder;
mod xor;

pub use encoder::{Encoder, Params, RecoverySymbol};
pub use gf::Gf256;

/// Error type for encoder operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Zero input count, bad window geometry, or mismatched column lengths.
    InvalidInput,
    /// Buffer allocation failed during encoder construction.
    OutOfMemory,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInput => write!(f, "invalid encoder input"),
            Error::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for Error {}

/// One-time process-wide initialization.
///
/// The GF(256) tables are const-evaluated statics, so there is nothing to
/// compute at runtime; this exists for callers that want an explicit
/// init-before-use step and is idempotent.
pub fn init() -> Result<(), Error> {
    // Touch the scalar type so the tables are resident before first use.
    std::hint::black_box(Gf256(2) * Gf256(3));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }

    #[test]
    fn error_display() {
        assert_eq!(Error::InvalidInput.to_string(), "invalid encoder input");
        assert_eq!(Error::OutOfMemory.to_string(), "out of memory");
    }
}
