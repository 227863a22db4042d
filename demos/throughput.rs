//! Encode throughput measurement for fountain256.
//!
//! Times lane-sum construction and per-symbol generation separately, since
//! construction is paid once per window and symbols are unlimited.

use std::time::Instant;

use fountain256::{Encoder, Params};

fn main() {
    let input_count = 100;
    let symbol_bytes = 1296u64;
    let rows = 30u32;
    let trials = 1000;

    let total_bytes = input_count as u64 * symbol_bytes;
    let params = Params::new(input_count, total_bytes).unwrap();

    let data: Vec<Vec<u8>> = (0..input_count)
        .map(|i| {
            (0..symbol_bytes as usize)
                .map(|j| ((i * symbol_bytes as usize + j) % 256) as u8)
                .collect()
        })
        .collect();
    let originals: Vec<&[u8]> = data.iter().map(|d| d.as_slice()).collect();

    // Window initialization (lane-sum construction).
    let init_start = Instant::now();
    for _ in 0..trials {
        let encoder = Encoder::new(params, &originals).unwrap();
        std::hint::black_box(&encoder);
    }
    let init_us = init_start.elapsed().as_micros() as f64 / trials as f64;
    let init_mbps = total_bytes as f64 / init_us;

    // Per-symbol generation.
    let mut encoder = Encoder::new(params, &originals).unwrap();
    let mut checksum = 0u64;
    let encode_start = Instant::now();
    for trial in 0..trials {
        for row in 0..rows {
            let symbol = encoder.encode(trial as u32 * rows + row);
            checksum ^= u64::from(symbol.data()[0]);
        }
    }
    let elapsed = encode_start.elapsed();
    let symbol_us = elapsed.as_micros() as f64 / (trials * rows as usize) as f64;
    let symbol_mbps = symbol_bytes as f64 / symbol_us;

    println!("window: {input_count} x {symbol_bytes} bytes");
    println!("init:   {init_us:9.2} us/window ({init_mbps:8.1} MB/s)");
    println!("encode: {symbol_us:9.2} us/symbol ({symbol_mbps:8.1} MB/s)");
    println!("(checksum {checksum})");
}
