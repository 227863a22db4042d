//! Batched XOR accumulation into a destination buffer.
//!
//! [`XorBatch`] queues full-length sources and drains them with a fused
//! multi-source XOR, so each destination word is read and written once per
//! batch instead of once per source. The result is byte-identical to adding
//! each source sequentially; batching only changes memory traffic.

use crate::gf;

/// Pending sources held before a fused flush.
const BATCH_WIDTH: usize = 4;

const EMPTY: &[u8] = &[];

/// Accumulates XOR additions into `dst`.
///
/// Full-length sources are queued and flushed [`BATCH_WIDTH`] at a time;
/// shorter sources (the final column of a window) are applied immediately
/// over their prefix, which is equivalent because XOR commutes. Dropping the
/// batch without calling [`finalize`](Self::finalize) loses queued sources,
/// so the encoder always finalizes.
pub(crate) struct XorBatch<'d, 's> {
    dst: &'d mut [u8],
    pending: [&'s [u8]; BATCH_WIDTH],
    count: usize,
}

impl<'d, 's> XorBatch<'d, 's> {
    pub fn new(dst: &'d mut [u8]) -> Self {
        XorBatch {
            dst,
            pending: [EMPTY; BATCH_WIDTH],
            count: 0,
        }
    }

    /// Queue `src` for XOR into the destination.
    pub fn add(&mut self, src: &'s [u8]) {
        if src.len() < self.dst.len() {
            gf::add_mem(self.dst, src);
            return;
        }
        debug_assert_eq!(src.len(), self.dst.len());
        self.pending[self.count] = src;
        self.count += 1;
        if self.count == BATCH_WIDTH {
            self.flush();
        }
    }

    /// Drain any queued sources. After this the destination equals its
    /// initial contents XORed with every source submitted via `add`.
    pub fn finalize(mut self) {
        self.flush();
    }

    fn flush(&mut self) {
        let sources = &self.pending[..self.count];
        if sources.is_empty() {
            return;
        }

        let len = self.dst.len();
        let words = len / 8;
        for w in 0..words {
            let base = w * 8;
            let mut acc = u64::from_ne_bytes(self.dst[base..base + 8].try_into().unwrap());
            for src in sources {
                acc ^= u64::from_ne_bytes(src[base..base + 8].try_into().unwrap());
            }
            self.dst[base..base + 8].copy_from_slice(&acc.to_ne_bytes());
        }
        for i in words * 8..len {
            for src in sources {
                self.dst[i] ^= src[i];
            }
        }

        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_xor(dst: &mut [u8], sources: &[Vec<u8>]) {
        for src in sources {
            for (d, s) in dst.iter_mut().zip(src) {
                *d ^= s;
            }
        }
    }

    #[test]
    fn matches_sequential_xor() {
        // Cross the batch width and exercise a non-multiple-of-8 length.
        for source_count in 0..10 {
            let len = 29;
            let sources: Vec<Vec<u8>> = (0..source_count)
                .map(|s| (0..len).map(|i| ((s * 37 + i * 11) % 256) as u8).collect())
                .collect();

            let mut expected: Vec<u8> = (0..len).map(|i| (i * 3) as u8).collect();
            let mut actual = expected.clone();
            reference_xor(&mut expected, &sources);

            let mut batch = XorBatch::new(&mut actual);
            for src in &sources {
                batch.add(src);
            }
            batch.finalize();

            assert_eq!(actual, expected, "{source_count} sources");
        }
    }

    #[test]
    fn short_source_applies_to_prefix() {
        let mut dst = vec![0u8; 8];
        let full = vec![0x0Fu8; 8];
        let short = vec![0xF0u8; 3];

        let mut batch = XorBatch::new(&mut dst);
        batch.add(&full);
        batch.add(&short);
        batch.finalize();

        assert_eq!(dst, [0xFF, 0xFF, 0xFF, 0x0F, 0x0F, 0x0F, 0x0F, 0x0F]);
    }

    #[test]
    fn duplicate_sources_cancel() {
        let src = vec![0xABu8; 16];
        let mut dst = vec![0x5Au8; 16];
        let mut batch = XorBatch::new(&mut dst);
        batch.add(&src);
        batch.add(&src);
        batch.finalize();
        assert_eq!(dst, vec![0x5Au8; 16]);
    }
}
