//! Lossy-channel demo: encode a window, drop random originals, recover them
//! from the recovery stream with a reference Gaussian-elimination decoder.
//!
//! ```text
//! cargo run --example loss_recovery -- --input-count 64 --loss-rate 0.15
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn, Level};

use fountain256::prng::Pcg32;
use fountain256::recipe::{self, COLUMN_LANE_COUNT, COLUMN_SUM_COUNT, PAIR_ADD_RATE};
use fountain256::{gf, Encoder, Gf256, Params};

#[derive(Parser, Debug)]
#[command(about = "fountain256 loss recovery demo")]
struct Args {
    /// Number of original symbols in the window.
    #[arg(long, default_value_t = 64)]
    input_count: usize,

    /// Bytes per symbol.
    #[arg(long, default_value_t = 1200)]
    symbol_bytes: usize,

    /// Probability that an original symbol is lost in transit.
    #[arg(long, default_value_t = 0.1)]
    loss_rate: f64,

    /// RNG seed for the simulated channel.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

/// Per-column coefficients of one recovery row, rebuilt from (row, N).
fn row_coefficients(input_count: usize, row: u32) -> Vec<Gf256> {
    let count = input_count as u32;
    let mut coefficients = vec![Gf256(0); input_count];

    let rx = Gf256(recipe::row_value(row));
    let mut prng = Pcg32::seeded(u64::from(row), u64::from(count));
    let pair_count = (input_count + PAIR_ADD_RATE - 1) / PAIR_ADD_RATE;
    for _ in 0..pair_count {
        let element = (prng.next_u32() % count) as usize;
        coefficients[element] = coefficients[element] + Gf256(1);
        let element = (prng.next_u32() % count) as usize;
        coefficients[element] = coefficients[element] + rx;
    }

    for (column, coefficient) in coefficients.iter_mut().enumerate() {
        let opcode = recipe::row_opcode(column % COLUMN_LANE_COUNT, row);
        let cx = Gf256(recipe::column_value(column));
        let powers = [Gf256(1), cx, cx * cx];
        for (k, &power) in powers.iter().enumerate() {
            if opcode & (1 << k) != 0 {
                *coefficient = *coefficient + power;
            }
            if opcode & (1 << (COLUMN_SUM_COUNT + k)) != 0 {
                *coefficient = *coefficient + rx * power;
            }
        }
    }

    coefficients
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
    let args = Args::parse();

    if !(0.0..1.0).contains(&args.loss_rate) {
        bail!("loss rate must be in [0, 1)");
    }

    let total_bytes = (args.input_count * args.symbol_bytes) as u64;
    let params = Params::new(args.input_count, total_bytes)?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let data: Vec<Vec<u8>> = (0..args.input_count)
        .map(|_| (0..args.symbol_bytes).map(|_| rng.gen()).collect())
        .collect();
    let originals: Vec<&[u8]> = data.iter().map(|d| d.as_slice()).collect();
    let mut encoder = Encoder::new(params, &originals)?;

    // Simulated channel: each original is independently lost.
    let lost: Vec<usize> = (0..args.input_count)
        .filter(|_| rng.gen_bool(args.loss_rate))
        .collect();
    info!(
        input_count = args.input_count,
        symbol_bytes = args.symbol_bytes,
        lost = lost.len(),
        "window transmitted"
    );
    if lost.is_empty() {
        info!("nothing lost, nothing to do");
        return Ok(());
    }

    // Pull recovery symbols from row 0 upward until the lost columns are
    // solvable, exactly as a receiver would.
    let mut pivots: Vec<(usize, Vec<Gf256>, Vec<u8>)> = Vec::with_capacity(lost.len());
    let mut row = 0u32;
    while pivots.len() < lost.len() {
        if row >= lost.len() as u32 + 32 {
            bail!("recovery stalled after {row} symbols");
        }
        let coefficients = row_coefficients(args.input_count, row);
        let mut buffer = encoder.encode(row).data().to_vec();
        row += 1;

        for (column, original) in originals.iter().enumerate() {
            if lost.contains(&column) {
                continue;
            }
            gf::muladd_mem(&mut buffer, original, coefficients[column]);
        }
        let mut vector: Vec<Gf256> = lost.iter().map(|&c| coefficients[c]).collect();

        for (pivot_index, pivot_vector, pivot_buffer) in &pivots {
            let factor = vector[*pivot_index];
            if factor.0 != 0 {
                for (v, p) in vector.iter_mut().zip(pivot_vector) {
                    *v = *v + factor * *p;
                }
                gf::muladd_mem(&mut buffer, pivot_buffer, factor);
            }
        }

        let Some(pivot_index) = vector.iter().position(|v| v.0 != 0) else {
            warn!(row = row - 1, "dependent symbol, pulling another");
            continue;
        };
        let inverse = Gf256(1) / vector[pivot_index];
        for v in vector.iter_mut() {
            *v = inverse * *v;
        }
        for byte in buffer.iter_mut() {
            *byte = (inverse * Gf256(*byte)).0;
        }
        pivots.push((pivot_index, vector, buffer));
    }

    for i in (1..lost.len()).rev() {
        let (earlier, rest) = pivots.split_at_mut(i);
        let (pivot_index, pivot_vector, pivot_buffer) = &rest[0];
        for (_, vector, buffer) in earlier.iter_mut() {
            let factor = vector[*pivot_index];
            if factor.0 != 0 {
                for (v, p) in vector.iter_mut().zip(pivot_vector) {
                    *v = *v + factor * *p;
                }
                gf::muladd_mem(buffer, pivot_buffer, factor);
            }
        }
    }

    let mut failures = 0;
    for (pivot_index, _, buffer) in &pivots {
        let column = lost[*pivot_index];
        if buffer[..] != *originals[column] {
            warn!(column, "recovered symbol mismatch");
            failures += 1;
        }
    }
    if failures > 0 {
        bail!("{failures} of {} columns failed to recover", lost.len());
    }

    info!(
        lost = lost.len(),
        symbols_used = row,
        overhead = row as usize - lost.len(),
        "all lost symbols recovered"
    );
    Ok(())
}
