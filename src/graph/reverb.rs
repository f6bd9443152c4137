//! Reverb curve
//!
//! Maps a reverb percentage onto the parameters of a three-tap echo.
//! With `intensity = percent / 100` the curve is linear:
//!
//! | parameter | at 0%  | at 100% |
//! |-----------|--------|---------|
//! | in gain   | 0.80   | 0.80    |
//! | out gain  | 0.70   | 0.88    |
//! | base ms   | 40     | 70      |
//! | decay 1   | 0.20   | 0.55    |
//! | decay 2   | 0.15   | 0.40    |
//! | decay 3   | 0.10   | 0.30    |
//!
//! The three delays are the base delay scaled by 1.0, 1.5 and 2.2.
//!
//! Everything is computed in integer units of the output precision from the
//! integer percent, so rounding is exact half-up and never depends on
//! floating point representation.

use super::stage::Echo;

const IN_GAIN: f64 = 0.8;

/// Round `numerator / denominator` half-up (both non-negative)
fn div_round_half_up(numerator: u32, denominator: u32) -> u32 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// Echo parameters for a reverb amount in `1..=100` percent
///
/// Callers omit the echo stage entirely at 0%; the curve itself is still
/// defined there.
pub fn reverb_curve(reverb_percent: u8) -> Echo {
    let p = u32::from(reverb_percent.min(100));

    // out gain: 0.70 + 0.18 * i, in 1/10000
    let out_gain = f64::from(7000 + 18 * p) / 10_000.0;

    // base delay 40 + 30 * i ms, scaled by 1.0 / 1.5 / 2.2
    let delay1 = 40 + div_round_half_up(30 * p, 100);
    let delay2 = 60 + div_round_half_up(45 * p, 100);
    let delay3 = 88 + div_round_half_up(66 * p, 100);

    // decays in 1/100
    let decay1 = 20 + div_round_half_up(35 * p, 100);
    let decay2 = 15 + div_round_half_up(25 * p, 100);
    let decay3 = 10 + div_round_half_up(20 * p, 100);

    Echo {
        in_gain: IN_GAIN,
        out_gain,
        delays_ms: [delay1, delay2, delay3],
        decays: [
            f64::from(decay1) / 100.0,
            f64::from(decay2) / 100.0,
            f64::from(decay3) / 100.0,
        ],
    }
}
