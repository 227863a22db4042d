//! Wire-format regression vectors.
//!
//! These outputs were produced by an independent reference model of the
//! codec and freeze the encode pipeline end to end: the PRNG seeding, the
//! LDPC pair draws, the lane opcodes, the column/row values, and the GF(256)
//! kernels. Any byte of drift here breaks interop with existing decoders.

use fountain256::{Encoder, Params};

fn from_hex(hex: &str) -> Vec<u8> {
    assert_eq!(hex.len() % 2, 0);
    (0..hex.len() / 2)
        .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap())
        .collect()
}

fn column_refs(window: &[Vec<u8>]) -> Vec<&[u8]> {
    window.iter().map(|d| d.as_slice()).collect()
}

fn encode_rows(originals: &[&[u8]], total_bytes: u64, rows: u32) -> Vec<Vec<u8>> {
    let params = Params::new(originals.len(), total_bytes).unwrap();
    let mut encoder = Encoder::new(params, originals).unwrap();
    (0..rows)
        .map(|row| encoder.encode(row).data().to_vec())
        .collect()
}

#[test]
fn canonical_window_n8() {
    // orig[i][j] = i*16 + j over an 8 x 16 window.
    let data: Vec<Vec<u8>> = (0..8)
        .map(|i| (0..16).map(|j| (i * 16 + j) as u8).collect())
        .collect();
    let originals: Vec<&[u8]> = data.iter().map(|d| d.as_slice()).collect();

    let expected = [
        "cad1fce7a6bd908b1209243f7e654853",
        "ddfa93b441660f28fed9b09762452c0b",
        "733ee9a45c11c68b2d60b7fa024f98d5",
        "3b6d97c1782ed482bdeb1147fea85204",
        "c08b561df7bc612aaee5387399d20f44",
        "17b852fd9d32d87718b75df2923dd778",
        "b97820e1905109c8eb2a72b3c2035b9a",
        "c8f7b689340b4a752b14556ad7e8a996",
    ];

    let symbols = encode_rows(&originals, 128, 8);
    for (row, (symbol, hex)) in symbols.iter().zip(expected).enumerate() {
        assert_eq!(symbol, &from_hex(hex), "row {row}");
    }
}

#[test]
fn short_final_column() {
    // N=2, S=4, F=3: the final column's missing byte is implicit zero.
    let first: &[u8] = &[0x11, 0x22, 0x33, 0x44];
    let last: &[u8] = &[0x55, 0x66, 0x77];

    let expected = ["aaccee00", "38a1d688", "2e34cb00", "c0bc6144"];

    let symbols = encode_rows(&[first, last], 7, 4);
    for (row, (symbol, hex)) in symbols.iter().zip(expected).enumerate() {
        assert_eq!(symbol, &from_hex(hex), "row {row}");
    }
}

#[test]
fn single_original_window() {
    let zero: &[u8] = &[0x00, 0x00, 0x00, 0x00];
    assert_eq!(encode_rows(&[zero], 4, 1)[0], from_hex("00000000"));

    let data: &[u8] = &[0xAA, 0xBB, 0xCC, 0xDD];
    let symbols = encode_rows(&[data], 4, 3);
    assert_eq!(symbols[0], from_hex("aabbccdd"));
    assert_eq!(symbols[1], from_hex("4f6d83a1"));
    assert_eq!(symbols[2], from_hex("aabbccdd"));
}

#[test]
fn encode_is_linear_in_the_originals() {
    // encode(A ^ B) == encode(A) ^ encode(B) for every row: the whole
    // pipeline is GF(256)-linear and the pair/opcode draws ignore payload.
    let n = 13;
    let total = (13 * 9 - 4) as u64;
    let params = Params::new(n, total).unwrap();

    let fill = |seed: usize| -> Vec<Vec<u8>> {
        (0..n)
            .map(|c| {
                (0..params.column_bytes(c))
                    .map(|i| ((c * 131 + i * 29 + seed * 83 + 7) % 256) as u8)
                    .collect()
            })
            .collect()
    };

    let a = fill(1);
    let b = fill(2);
    let xor: Vec<Vec<u8>> = a
        .iter()
        .zip(&b)
        .map(|(ra, rb)| ra.iter().zip(rb).map(|(x, y)| x ^ y).collect())
        .collect();

    let mut enc_a = Encoder::new(params, &column_refs(&a)).unwrap();
    let mut enc_b = Encoder::new(params, &column_refs(&b)).unwrap();
    let mut enc_xor = Encoder::new(params, &column_refs(&xor)).unwrap();

    for row in [0u32, 1, 5, 77, 255, 256, 100_000] {
        let sa = enc_a.encode(row).data().to_vec();
        let sb = enc_b.encode(row).data().to_vec();
        let sx = enc_xor.encode(row).data().to_vec();
        let combined: Vec<u8> = sa.iter().zip(&sb).map(|(x, y)| x ^ y).collect();
        assert_eq!(sx, combined, "row {row}");
    }
}
