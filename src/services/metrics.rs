//! Per-instrument series metrics.
//!
//! Pure functions over a chronological close-price slice. Degenerate inputs
//! (single point, non-positive prices) produce 0-valued metrics, never errors.

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMetrics {
    pub return_pct: f64,
    pub volatility_pct: f64,
    pub max_drawdown_pct: f64,
}

pub fn compute(closes: &[f64]) -> SeriesMetrics {
    SeriesMetrics {
        return_pct: total_return_pct(closes),
        volatility_pct: volatility_pct(closes),
        max_drawdown_pct: max_drawdown_pct(closes),
    }
}

/// `(last/first - 1) * 100`; 0 with fewer than two points.
pub fn total_return_pct(closes: &[f64]) -> f64 {
    match (closes.first(), closes.last()) {
        (Some(first), Some(last)) if closes.len() >= 2 && *first != 0.0 => {
            (last / first - 1.0) * 100.0
        }
        _ => 0.0,
    }
}

/// Population standard deviation of day-over-day simple returns, in percent.
/// Steps whose prior close is <= 0 are skipped; fewer than two valid daily
/// returns yields 0.
pub fn volatility_pct(closes: &[f64]) -> f64 {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    variance.sqrt() * 100.0
}

/// Most negative `(close/peak - 1) * 100` under a running peak; 0 when the
/// price never dips below its running peak.
pub fn max_drawdown_pct(closes: &[f64]) -> f64 {
    let Some(&first) = closes.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut worst = 0.0_f64;

    for &close in closes {
        if close > peak {
            peak = close;
        }
        let drawdown = (close / peak - 1.0) * 100.0;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst
}

/// Rescales so the first point equals 100. A non-positive first close falls
/// back to base 1.0, a degenerate-input guard rather than a real scenario.
pub fn normalize(closes: &[f64]) -> Vec<f64> {
    let base = match closes.first() {
        Some(&first) if first > 0.0 => first,
        _ => 1.0,
    };

    closes.iter().map(|c| c / base * 100.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_point_yields_zero_metrics() {
        let m = compute(&[123.45]);
        assert_eq!(m.return_pct, 0.0);
        assert_eq!(m.volatility_pct, 0.0);
        assert_eq!(m.max_drawdown_pct, 0.0);
    }

    #[test]
    fn total_return_doubles_to_100_pct() {
        assert_eq!(total_return_pct(&[50.0, 75.0, 100.0]), 100.0);
    }

    #[test]
    fn monotonic_rise_has_zero_drawdown() {
        assert_eq!(max_drawdown_pct(&[10.0, 11.0, 12.0, 13.0]), 0.0);
    }

    #[test]
    fn drawdown_is_worst_drop_from_running_peak() {
        // peak 120, trough 90 -> -25%
        let closes = [100.0, 120.0, 90.0, 110.0];
        let dd = max_drawdown_pct(&closes);
        assert!((dd - (-25.0)).abs() < 1e-9);
        assert!(dd <= 0.0);
    }

    #[test]
    fn drawdown_matches_prefix_minimum() {
        let closes = [100.0, 80.0, 95.0, 130.0, 104.0, 120.0];

        let mut peak: f64 = closes[0];
        let mut expected = 0.0_f64;
        for &c in &closes {
            peak = peak.max(c);
            expected = expected.min((c / peak - 1.0) * 100.0);
        }

        assert!((max_drawdown_pct(&closes) - expected).abs() < 1e-9);
    }

    #[test]
    fn volatility_is_population_stddev_of_daily_returns() {
        // returns: +10%, -10% -> mean 0, pstdev 0.1 -> 10%
        let closes = [100.0, 110.0, 99.0];
        let v = volatility_pct(&closes);
        assert!((v - 10.0).abs() < 1e-9);
    }

    #[test]
    fn volatility_skips_steps_with_non_positive_prior_close() {
        // only the 100 -> 110 and 110 -> 99 steps are valid
        let with_bad = [0.0, 100.0, 110.0, 99.0];
        let clean = [100.0, 110.0, 99.0];
        assert_eq!(volatility_pct(&with_bad), volatility_pct(&clean));
    }

    #[test]
    fn volatility_needs_two_valid_returns() {
        assert_eq!(volatility_pct(&[100.0, 110.0]), 0.0);
    }

    #[test]
    fn normalization_starts_at_100_and_stays_proportional() {
        let closes = [80.0, 100.0, 40.0];
        let n = normalize(&closes);
        assert_eq!(n[0], 100.0);
        assert!((n[1] - 125.0).abs() < 1e-9);
        assert!((n[2] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn normalization_falls_back_when_first_close_is_non_positive() {
        let n = normalize(&[0.0, 2.0]);
        assert_eq!(n, vec![0.0, 200.0]);
    }
}
