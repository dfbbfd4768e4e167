use chrono::{NaiveDateTime, TimeDelta};
use pvdash_types::Sample;

/// How far outside a series' first/last sample the edge value is still used.
pub const EDGE_GRACE: TimeDelta = TimeDelta::minutes(31);

/// Value of `samples` at `at`.
///
/// - Empty input yields `0.0`.
/// - Before the first sample: the first value if `at` is at most
///   [`EDGE_GRACE`] earlier, otherwise `0.0`. Symmetric after the last sample.
/// - Between two samples: linear interpolation by elapsed time.
/// - On an exact timestamp: that sample's value.
///
/// Input need not be sorted.
#[must_use]
pub fn interpolate_nearest(samples: &[Sample], at: NaiveDateTime) -> f64 {
    let mut sorted: Vec<Sample> = samples.to_vec();
    sorted.sort_by_key(|s| s.at);
    interpolate_sorted(&sorted, at)
}

/// [`interpolate_nearest`] for input already ascending by timestamp.
#[must_use]
pub fn interpolate_sorted(sorted: &[Sample], at: NaiveDateTime) -> f64 {
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return 0.0;
    };
    if at < first.at {
        return if first.at - at <= EDGE_GRACE { first.value } else { 0.0 };
    }
    if at > last.at {
        return if at - last.at <= EDGE_GRACE { last.value } else { 0.0 };
    }

    // first index with sample.at >= at; exists because at <= last.at
    let idx = sorted.partition_point(|s| s.at < at);
    let hi = sorted[idx];
    if hi.at == at || idx == 0 {
        return hi.value;
    }
    let lo = sorted[idx - 1];
    let span = (hi.at - lo.at).num_milliseconds() as f64;
    if span <= 0.0 {
        return hi.value;
    }
    let frac = (at - lo.at).num_milliseconds() as f64 / span;
    lo.value + (hi.value - lo.value) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn balcony() -> Vec<Sample> {
        vec![Sample::new(t(9, 0), 10.0), Sample::new(t(9, 30), 20.0)]
    }

    #[test]
    fn grace_before_first_sample() {
        assert_eq!(interpolate_nearest(&balcony(), t(8, 40)), 10.0);
        assert_eq!(interpolate_nearest(&balcony(), t(8, 29)), 10.0);
        assert_eq!(interpolate_nearest(&balcony(), t(8, 0)), 0.0);
    }

    #[test]
    fn grace_after_last_sample() {
        assert_eq!(interpolate_nearest(&balcony(), t(10, 1)), 20.0);
        assert_eq!(interpolate_nearest(&balcony(), t(10, 2)), 0.0);
    }

    #[test]
    fn midpoint_is_linear() {
        assert!((interpolate_nearest(&balcony(), t(9, 15)) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn exact_matches_return_sample_value() {
        assert_eq!(interpolate_nearest(&balcony(), t(9, 0)), 10.0);
        assert_eq!(interpolate_nearest(&balcony(), t(9, 30)), 20.0);
    }

    #[test]
    fn unsorted_input_and_empty_input() {
        let mut rev = balcony();
        rev.reverse();
        assert!((interpolate_nearest(&rev, t(9, 15)) - 15.0).abs() < 1e-9);
        assert_eq!(interpolate_nearest(&[], t(9, 15)), 0.0);
    }
}
