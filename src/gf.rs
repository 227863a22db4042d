//! GF(256) arithmetic over the Rijndael polynomial.
//!
//! The field is GF(2^8) with the irreducible polynomial
//! x^8 + x^4 + x^3 + x + 1 (0x11B). Addition is XOR; multiplication is
//! table-driven for the bulk kernels and delegated to the [`Gf256`] scalar
//! type for one-off values.
//!
//! Two kinds of operations live here:
//!
//! - Scalar: the [`Gf256`] newtype with full field arithmetic (`+ - * /`).
//! - Bulk: [`add_mem`] and [`muladd_mem`] over byte buffers, with SIMD fast
//!   paths (SSSE3 on x86_64, NEON on aarch64) behind the `simd` feature and
//!   a scalar table fallback that is always compiled. All paths produce
//!   byte-identical output.

use ::gf256::gf::gf;

/// Scalar element of GF(2^8) under the Rijndael polynomial 0x11B.
///
/// Generator 0x03 (0x02 does not generate the full multiplicative group of
/// this field).
#[gf(polynomial = 0x11b, generator = 0x3)]
pub type Gf256;

/// c² over GF(256).
#[inline]
pub fn sqr(x: Gf256) -> Gf256 {
    x * x
}

/// Const-compatible GF(256) multiply, used only to build [`MUL_TABLE`].
///
/// Shift-and-reduce form: the 0x1B byte is 0x11B with the x^8 term dropped,
/// applied whenever the running product overflows degree 7.
const fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut p = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            p ^= a;
        }
        let carry = a & 0x80;
        a <<= 1;
        if carry != 0 {
            a ^= 0x1B;
        }
        b >>= 1;
    }
    p
}

const fn build_mul_table() -> [[u8; 256]; 256] {
    let mut table = [[0u8; 256]; 256];
    let mut c = 0usize;
    while c < 256 {
        let mut x = 0usize;
        while x < 256 {
            table[c][x] = gf_mul(c as u8, x as u8);
            x += 1;
        }
        c += 1;
    }
    table
}

/// `MUL_TABLE[c][x] = c · x` for every coefficient, computed at compile time.
static MUL_TABLE: [[u8; 256]; 256] = build_mul_table();

/// `dst[i] ^= src[i]` (GF(256) addition).
///
/// `src` may be shorter than `dst`; only the common prefix is touched.
#[inline]
pub fn add_mem(dst: &mut [u8], src: &[u8]) {
    debug_assert!(src.len() <= dst.len());
    let len = src.len();
    let words = len / 8;
    for w in 0..words {
        let base = w * 8;
        let d = u64::from_ne_bytes(dst[base..base + 8].try_into().unwrap());
        let s = u64::from_ne_bytes(src[base..base + 8].try_into().unwrap());
        dst[base..base + 8].copy_from_slice(&(d ^ s).to_ne_bytes());
    }
    for i in words * 8..len {
        dst[i] ^= src[i];
    }
}

/// `dst[i] ^= coeff · src[i]`.
pub fn muladd_mem(dst: &mut [u8], src: &[u8], coeff: Gf256) {
    debug_assert_eq!(dst.len(), src.len());

    if coeff.0 == 0 {
        return;
    }
    if coeff.0 == 1 {
        add_mem(dst, src);
        return;
    }

    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    if is_x86_feature_detected!("ssse3") {
        unsafe { simd::muladd_mem_ssse3(dst, src, coeff.0) };
        return;
    }

    #[cfg(all(feature = "simd", target_arch = "aarch64"))]
    if std::arch::is_aarch64_feature_detected!("neon") {
        unsafe { simd::muladd_mem_neon(dst, src, coeff.0) };
        return;
    }

    let table = &MUL_TABLE[coeff.0 as usize];
    for i in 0..dst.len() {
        dst[i] ^= table[src[i] as usize];
    }
}

#[cfg(all(feature = "simd", any(target_arch = "x86_64", target_arch = "aarch64")))]
mod simd {
    use super::MUL_TABLE;

    /// Nibble lookup tables for one coefficient: `lo[n] = c·n`,
    /// `hi[n] = c·(n << 4)`, so `c·x = lo[x & 0xF] ^ hi[x >> 4]`.
    #[inline]
    fn nibble_tables(coeff: u8) -> ([u8; 16], [u8; 16]) {
        let row = &MUL_TABLE[coeff as usize];
        let mut lo = [0u8; 16];
        let mut hi = [0u8; 16];
        for n in 0..16 {
            lo[n] = row[n];
            hi[n] = row[n << 4];
        }
        (lo, hi)
    }

    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "ssse3")]
    pub unsafe fn muladd_mem_ssse3(dst: &mut [u8], src: &[u8], coeff: u8) {
        use std::arch::x86_64::*;

        let (lo, hi) = nibble_tables(coeff);
        let table_lo = _mm_loadu_si128(lo.as_ptr() as *const __m128i);
        let table_hi = _mm_loadu_si128(hi.as_ptr() as *const __m128i);
        let mask = _mm_set1_epi8(0x0F);

        let chunks = dst.len() / 16;
        for i in 0..chunks {
            let off = i * 16;
            let data = _mm_loadu_si128(src.as_ptr().add(off) as *const __m128i);
            let l = _mm_shuffle_epi8(table_lo, _mm_and_si128(data, mask));
            let h = _mm_shuffle_epi8(table_hi, _mm_and_si128(_mm_srli_epi64(data, 4), mask));
            let product = _mm_xor_si128(l, h);
            let current = _mm_loadu_si128(dst.as_ptr().add(off) as *const __m128i);
            _mm_storeu_si128(
                dst.as_mut_ptr().add(off) as *mut __m128i,
                _mm_xor_si128(current, product),
            );
        }

        let row = &MUL_TABLE[coeff as usize];
        for i in chunks * 16..dst.len() {
            dst[i] ^= row[src[i] as usize];
        }
    }

    #[cfg(target_arch = "aarch64")]
    #[target_feature(enable = "neon")]
    pub unsafe fn muladd_mem_neon(dst: &mut [u8], src: &[u8], coeff: u8) {
        use std::arch::aarch64::*;

        let (lo, hi) = nibble_tables(coeff);
        let table_lo = vld1q_u8(lo.as_ptr());
        let table_hi = vld1q_u8(hi.as_ptr());
        let mask = vdupq_n_u8(0x0F);

        let chunks = dst.len() / 16;
        for i in 0..chunks {
            let off = i * 16;
            let data = vld1q_u8(src.as_ptr().add(off));
            let l = vqtbl1q_u8(table_lo, vandq_u8(data, mask));
            let h = vqtbl1q_u8(table_hi, vandq_u8(vshrq_n_u8(data, 4), mask));
            let product = veorq_u8(l, h);
            let current = vld1q_u8(dst.as_ptr().add(off));
            vst1q_u8(dst.as_mut_ptr().add(off), veorq_u8(current, product));
        }

        let row = &MUL_TABLE[coeff as usize];
        for i in chunks * 16..dst.len() {
            dst[i] ^= row[src[i] as usize];
        }
    }
}
