//! Exponential half-life decay of edge weights.

use chrono::{DateTime, Utc};

/// Decayed weight at `at` for a weight that was exact at `last_updated`:
/// `w * 0.5^(elapsed / half_life)`.
///
/// Non-positive half-life means total decay. Negative elapsed time (a
/// reference instant in the future of `at`, e.g. a late-arriving read)
/// returns the stored weight unchanged -- decay never amplifies.
pub fn decayed_weight(
    weight: f32,
    last_updated: DateTime<Utc>,
    at: DateTime<Utc>,
    half_life_secs: f64,
) -> f32 {
    if half_life_secs <= 0.0 {
        return 0.0;
    }
    let elapsed_secs = (at - last_updated).num_milliseconds() as f64 / 1000.0;
    if elapsed_secs <= 0.0 {
        return weight;
    }
    (f64::from(weight) * 0.5_f64.powf(elapsed_secs / half_life_secs)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn one_half_life_halves_the_weight() {
        let t0 = Utc::now();
        let w = decayed_weight(0.6, t0, t0 + Duration::minutes(60), 3600.0);
        assert!((w - 0.3).abs() < 1e-6, "0.6 over one 60-minute half-life -> 0.3, got {}", w);
    }

    #[test]
    fn decay_is_monotone_non_increasing_in_elapsed_time() {
        let t0 = Utc::now();
        let mut prev = decayed_weight(0.9, t0, t0, 1800.0);
        for minutes in [1i64, 5, 30, 120, 600, 3000] {
            let w = decayed_weight(0.9, t0, t0 + Duration::minutes(minutes), 1800.0);
            assert!(w <= prev, "w(t) must be non-increasing, {} > {}", w, prev);
            assert!(w >= 0.0);
            prev = w;
        }
    }

    #[test]
    fn zero_elapsed_returns_stored_weight() {
        let t0 = Utc::now();
        assert_eq!(decayed_weight(0.42, t0, t0, 3600.0), 0.42);
    }

    #[test]
    fn future_reference_never_amplifies() {
        let t0 = Utc::now();
        let w = decayed_weight(0.42, t0 + Duration::minutes(10), t0, 3600.0);
        assert_eq!(w, 0.42);
    }

    #[test]
    fn non_positive_half_life_is_total_decay() {
        let t0 = Utc::now();
        assert_eq!(decayed_weight(0.8, t0, t0 + Duration::seconds(1), 0.0), 0.0);
        assert_eq!(decayed_weight(0.8, t0, t0 + Duration::seconds(1), -5.0), 0.0);
    }

    #[test]
    fn decay_composes_across_intermediate_reads() {
        // 0.5^(a+b) == 0.5^a * 0.5^b: decaying in two hops equals one hop.
        let t0 = Utc::now();
        let mid = t0 + Duration::minutes(25);
        let end = t0 + Duration::minutes(70);

        let direct = decayed_weight(0.8, t0, end, 2400.0);
        let hop = decayed_weight(decayed_weight(0.8, t0, mid, 2400.0), mid, end, 2400.0);
        assert!((direct - hop).abs() < 1e-6);
    }
}
