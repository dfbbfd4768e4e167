use chrono::TimeDelta;
use pvdash_types::Sample;

/// Pairs further apart than this are treated as a data gap and skipped.
pub const MAX_GAP: TimeDelta = TimeDelta::hours(2);

/// Trapezoidal integral of a power series in kilo-units times hours (W → kWh).
///
/// Consecutive pairs are taken in the given order; a pair whose spacing
/// exceeds [`MAX_GAP`] contributes nothing.
#[must_use]
pub fn integrate(samples: &[Sample]) -> f64 {
    samples
        .windows(2)
        .filter_map(|w| {
            let dt = w[1].at - w[0].at;
            if dt > MAX_GAP {
                return None;
            }
            let hours = dt.num_milliseconds() as f64 / 3_600_000.0;
            Some((w[0].value + w[1].value) * hours / 2.0 / 1000.0)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn pair_beyond_gap_is_excluded() {
        let s = [
            Sample::new(t(6, 0), 100.0),
            Sample::new(t(6, 30), 100.0),
            Sample::new(t(9, 30), 100.0),
        ];
        assert!((integrate(&s) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn exactly_two_hours_still_counts() {
        let s = [Sample::new(t(6, 0), 1000.0), Sample::new(t(8, 0), 1000.0)];
        assert!((integrate(&s) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn fewer_than_two_samples_is_zero() {
        assert_eq!(integrate(&[]), 0.0);
        assert_eq!(integrate(&[Sample::new(t(6, 0), 5.0)]), 0.0);
    }
}
