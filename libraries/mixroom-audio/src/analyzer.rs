//! Level analysis of rendered buffers
//!
//! Peak, RMS and clipping are measured in one pass over every channel. The
//! score is a plain additive heuristic, not a loudness standard.

use mixroom_core::{AudioBuffer, QualityStats};

/// Absolute sample value counted as clipped
pub const CLIP_THRESHOLD: f32 = 0.99;

/// Measure a buffer
pub fn analyze(buffer: &AudioBuffer) -> QualityStats {
    let mut peak = 0.0_f32;
    let mut sum_squares = 0.0_f64;
    let mut clipping_count = 0_u64;

    for channel in buffer.channels() {
        for &sample in channel {
            let magnitude = sample.abs();
            peak = peak.max(magnitude);
            sum_squares += f64::from(sample) * f64::from(sample);
            if magnitude >= CLIP_THRESHOLD {
                clipping_count += 1;
            }
        }
    }

    let total = buffer.len();
    let rms = if total == 0 {
        0.0
    } else {
        (sum_squares / total as f64).sqrt() as f32
    };

    QualityStats {
        peak,
        rms,
        clipping: clipping_count > 0,
        clipping_count,
        score: score_for(peak, rms, clipping_count),
    }
}

/// Heuristic 0-100 score
///
/// Starts at 100 and subtracts 20 for more than 100 clipped samples, a
/// further 30 for more than 1000, 20 for an RMS below 0.05 and 10 for a
/// peak below 0.5.
pub fn score_for(peak: f32, rms: f32, clipping_count: u64) -> u8 {
    let mut score: i32 = 100;
    if clipping_count > 100 {
        score -= 20;
    }
    if clipping_count > 1000 {
        score -= 30;
    }
    if rms < 0.05 {
        score -= 20;
    }
    if peak < 0.5 {
        score -= 10;
    }
    score.clamp(0, 100) as u8
}
