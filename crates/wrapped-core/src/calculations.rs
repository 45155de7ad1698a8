//! Pure numeric helpers shared by the aggregation engine and the report
//! sections. All functions are deterministic and allocation-light.

/// Milliseconds per hour, the divisor for all play-time conversions.
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Convert played milliseconds to hours.
pub fn ms_to_hours(ms: u64) -> f64 {
    ms as f64 / MS_PER_HOUR
}

/// Trailing rolling mean over `values`.
///
/// Position `i` averages `values[i + 1 - window ..= i]`. Positions with
/// fewer than `window` points behind them are undefined and yield `None`.
/// A window of 0 is treated as 1 (identity).
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0f64;

    for (i, value) in values.iter().enumerate() {
        running += value;
        if i + 1 > window {
            running -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(running / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Express each value as a percentage of the total.
///
/// When the total is zero every percentage is zero (empty data degrades to
/// zeros, never to NaN).
pub fn percentages(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v / total * 100.0).collect()
}

/// Average of `total` spread over `days`, guarding against non-positive
/// day counts from degenerate date ranges.
pub fn average_per_day(total: f64, days: i64) -> f64 {
    total / days.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── ms_to_hours ───────────────────────────────────────────────────────

    #[test]
    fn test_ms_to_hours_exact() {
        assert_eq!(ms_to_hours(3_600_000), 1.0);
        assert_eq!(ms_to_hours(0), 0.0);
        assert!((ms_to_hours(1_800_000) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ms_to_hours_round_trips_total() {
        // sum(ms) == hours * 3_600_000 within floating tolerance.
        let ms: u64 = 123_456_789;
        assert!((ms_to_hours(ms) * MS_PER_HOUR - ms as f64).abs() < 1e-3);
    }

    // ── rolling_mean ──────────────────────────────────────────────────────

    #[test]
    fn test_rolling_mean_basic() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn test_rolling_mean_window_one() {
        let out = rolling_mean(&[1.0, 2.0, 3.0], 1);
        assert_eq!(out, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_rolling_mean_window_zero_treated_as_one() {
        let out = rolling_mean(&[5.0], 0);
        assert_eq!(out, vec![Some(5.0)]);
    }

    #[test]
    fn test_rolling_mean_window_larger_than_series() {
        let out = rolling_mean(&[1.0, 2.0], 5);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn test_rolling_mean_empty() {
        assert!(rolling_mean(&[], 3).is_empty());
    }

    // ── percentages ───────────────────────────────────────────────────────

    #[test]
    fn test_percentages_sum_to_100() {
        let out = percentages(&[1.0, 2.0, 3.0, 4.0]);
        let sum: f64 = out.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((out[3] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentages_zero_total() {
        let out = percentages(&[0.0, 0.0, 0.0]);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_percentages_empty() {
        assert!(percentages(&[]).is_empty());
    }

    // ── average_per_day ───────────────────────────────────────────────────

    #[test]
    fn test_average_per_day() {
        assert!((average_per_day(14.0, 7) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_per_day_guards_non_positive_days() {
        assert_eq!(average_per_day(5.0, 0), 5.0);
        assert_eq!(average_per_day(5.0, -3), 5.0);
    }
}
