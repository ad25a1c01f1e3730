//! RMSSD to stress score mapping.
//!
//! A linear heuristic: higher variability maps to lower stress. The score is
//! a coarse wellness indicator, not a clinical measurement.

/// Multiplier applied to RMSSD (ms) before subtracting from the ceiling.
pub const RMSSD_SCALE: f64 = 2.0;

/// Upper bound of the score range.
pub const MAX_STRESS: u8 = 100;

/// Map an RMSSD value in milliseconds to a stress score in `0..=100`.
///
/// `score = clamp(100 - round(rmssd * 2), 0, 100)`. An RMSSD of 50 ms or
/// more reads as fully relaxed; 0 ms reads as maximal stress. Total for any
/// input: non-finite RMSSD saturates at the nearest bound.
pub fn stress_score(rmssd_ms: f64) -> u8 {
    let scaled = (rmssd_ms * RMSSD_SCALE).round();
    (i64::from(MAX_STRESS)).saturating_sub(scaled as i64).clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(stress_score(0.0), 100);
        assert_eq!(stress_score(50.0), 0);
        assert_eq!(stress_score(25.0), 50);
    }

    #[test]
    fn test_clamps_high_variability() {
        assert_eq!(stress_score(60.0), 0);
        assert_eq!(stress_score(1000.0), 0);
    }

    #[test]
    fn test_rounds_to_nearest() {
        // 12.3 ms scales to 24.6, rounding to 25.
        assert_eq!(stress_score(12.3), 75);
        // 12.2 ms scales to 24.4, rounding to 24.
        assert_eq!(stress_score(12.2), 76);
    }

    #[test]
    fn test_monotone_non_increasing() {
        let mut previous = stress_score(0.0);
        for tenths in 1..=600 {
            let score = stress_score(tenths as f64 / 10.0);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_total_on_degenerate_input() {
        assert_eq!(stress_score(f64::NAN), 100);
        assert_eq!(stress_score(f64::INFINITY), 0);
        assert_eq!(stress_score(f64::NEG_INFINITY), 100);
        assert_eq!(stress_score(-5.0), 100);
    }
}
