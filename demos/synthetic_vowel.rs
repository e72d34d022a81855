//! Track F1/F2 of a synthetic vowel block by block.
//!
//! Usage: synthetic_vowel [f1_hz] [f2_hz] [sample_rate]
//!
//! Set RUST_LOG=debug to see buffer reallocations and solver sweeps.

use formants_core::{suggested_order, FormantPair, WorkContext, DEFAULT_SAFETY_MARGIN};
use log::{info, warn};
use std::env;
use std::f64::consts::PI;

const BLOCK_LENGTH: usize = 512;
const BLOCK_COUNT: usize = 8;

/// Pulse train at `pitch_hz` through one two-pole resonator per formant
fn synthesize(formants: &[f64], pitch_hz: f64, sample_rate: f64, length: usize) -> Vec<f64> {
    let period = (sample_rate / pitch_hz).round() as usize;
    let mut signal: Vec<f64> = (0..length)
        .map(|n| if n % period == 0 { 1.0 } else { 0.0 })
        .collect();

    for &frequency in formants {
        let radius = (-PI * 80.0 / sample_rate).exp();
        let a1 = 2.0 * radius * (2.0 * PI * frequency / sample_rate).cos();
        let a2 = -radius * radius;
        let (mut y1, mut y2) = (0.0, 0.0);
        for sample in signal.iter_mut() {
            let y = *sample + a1 * y1 + a2 * y2;
            y2 = y1;
            y1 = y;
            *sample = y;
        }
    }
    signal
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let f1: f64 = args.get(1).map_or(Ok(700.0), |a| a.parse()).expect("Invalid f1");
    let f2: f64 = args.get(2).map_or(Ok(1200.0), |a| a.parse()).expect("Invalid f2");
    let sample_rate: f64 = args.get(3).map_or(Ok(16000.0), |a| a.parse()).expect("Invalid sample_rate");

    let signal = synthesize(&[f1, f2, 2600.0], 120.0, sample_rate, BLOCK_LENGTH * BLOCK_COUNT);
    let order = suggested_order(sample_rate).min(BLOCK_LENGTH - 1);
    info!("analysing {BLOCK_COUNT} blocks of {BLOCK_LENGTH} samples at order {order}");

    let mut context = WorkContext::<f64>::new(BLOCK_LENGTH, order).expect("Failed to create context");
    let mut formants = Vec::new();

    for (index, block) in signal.chunks_exact(BLOCK_LENGTH).enumerate() {
        let info = match context.analyze_into(
            block,
            BLOCK_LENGTH,
            order,
            sample_rate,
            DEFAULT_SAFETY_MARGIN,
            &mut formants,
        ) {
            Ok(info) => info,
            Err(e) => {
                warn!("block {index}: {e}");
                continue;
            }
        };

        // Skip anything at or below 1.5x the pulse rate
        let pair = FormantPair::from_sorted(&formants, 180.0);
        let show = |slot: usize| {
            pair.get(slot)
                .map_or("--".to_string(), |f| format!("{:.0} Hz (bw {:.0})", f.frequency, f.bandwidth))
        };
        println!(
            "block {index}: F1 {:<20} F2 {:<20} {} formants, {} sweeps",
            show(0),
            show(1),
            formants.len(),
            info.sweeps
        );
    }
}
