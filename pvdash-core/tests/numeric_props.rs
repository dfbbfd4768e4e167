use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;
use pvdash_core::timeseries::interpolate::EDGE_GRACE;
use pvdash_core::{Sample, integrate, interpolate_nearest};

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

// Ascending samples with strictly increasing minutes-of-day and values in [0, 5000].
fn arb_series() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::btree_map(0i64..1440, 0.0f64..5000.0, 1..40).prop_map(|m| {
        m.into_iter()
            .map(|(min, v)| Sample::new(base() + TimeDelta::minutes(min), v))
            .collect()
    })
}

proptest! {
    #[test]
    fn interpolation_stays_within_sample_range(series in arb_series(), at_min in -120i64..1560) {
        let at = base() + TimeDelta::minutes(at_min);
        let v = interpolate_nearest(&series, at);
        let lo = series.iter().map(|s| s.value).fold(f64::INFINITY, f64::min);
        let hi = series.iter().map(|s| s.value).fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(v == 0.0 || (v >= lo - 1e-9 && v <= hi + 1e-9));
    }

    #[test]
    fn interpolation_hits_every_sample_exactly(series in arb_series()) {
        for s in &series {
            prop_assert_eq!(interpolate_nearest(&series, s.at), s.value);
        }
    }

    #[test]
    fn far_outside_the_series_is_zero(series in arb_series()) {
        let first = series.first().unwrap().at;
        let last = series.last().unwrap().at;
        let one_min = TimeDelta::minutes(1);
        prop_assert_eq!(interpolate_nearest(&series, first - EDGE_GRACE - one_min), 0.0);
        prop_assert_eq!(interpolate_nearest(&series, last + EDGE_GRACE + one_min), 0.0);
    }

    #[test]
    fn integral_is_non_negative_and_bounded(series in arb_series()) {
        let e = integrate(&series);
        let hi = series.iter().map(|s| s.value).fold(0.0f64, f64::max);
        let span_h = (series.last().unwrap().at - series.first().unwrap().at).num_minutes() as f64 / 60.0;
        prop_assert!(e >= 0.0);
        prop_assert!(e <= hi * span_h / 1000.0 + 1e-9);
    }

    #[test]
    fn constant_power_integrates_to_power_times_covered_hours(
        power in 0.0f64..5000.0,
        steps in prop::collection::vec(1i64..180, 1..30),
    ) {
        let mut at = base();
        let mut samples = vec![Sample::new(at, power)];
        let mut covered_min = 0i64;
        for step in steps {
            at += TimeDelta::minutes(step);
            samples.push(Sample::new(at, power));
            if step <= 120 {
                covered_min += step;
            }
        }
        let want = power * covered_min as f64 / 60.0 / 1000.0;
        prop_assert!((integrate(&samples) - want).abs() < 1e-6);
    }
}
