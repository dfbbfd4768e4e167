//! Deterministic synthetic measurements.
//!
//! Production follows a half-sine between sunrise and sunset, consumption a
//! flat base load with a lunch and an evening bump. The day of the month
//! scales production slightly so days are distinguishable.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use pvdash_core::{MonthBundle, MonthKey, Sample, Series};

/// Bulk export cadence.
pub const BULK_STEP_MINUTES: i64 = 15;
/// Point source cadence.
pub const POINT_STEP_MINUTES: i64 = 5;

const SUNRISE_H: f64 = 6.5;
const SUNSET_H: f64 = 19.5;
const ROOF_PEAK_W: f64 = 6_000.0;
const BALCONY_PEAK_W: f64 = 600.0;

fn hours(at: NaiveDateTime) -> f64 {
    (at.time() - NaiveTime::MIN).num_minutes() as f64 / 60.0
}

fn day_scale(day: NaiveDate) -> f64 {
    0.8 + 0.2 * f64::from(day.day() % 5) / 4.0
}

fn sun(at: NaiveDateTime, peak: f64) -> f64 {
    let h = hours(at);
    if h <= SUNRISE_H || h >= SUNSET_H {
        return 0.0;
    }
    let x = (h - SUNRISE_H) / (SUNSET_H - SUNRISE_H);
    (peak * (PI * x).sin() * day_scale(at.date())).round()
}

/// Rooftop production at `at` in W.
#[must_use]
pub fn roof_at(at: NaiveDateTime) -> f64 {
    sun(at, ROOF_PEAK_W)
}

/// Balcony production at `at` in W.
#[must_use]
pub fn balcony_at(at: NaiveDateTime) -> f64 {
    sun(at, BALCONY_PEAK_W)
}

/// Household consumption at `at` in W.
#[must_use]
pub fn consumption_at(at: NaiveDateTime) -> f64 {
    let h = hours(at);
    let mut w = 350.0;
    if (11.5..13.5).contains(&h) {
        w += 1_800.0;
    }
    if (18.0..21.0).contains(&h) {
        w += 1_200.0;
    }
    w
}

/// Signed grid exchange at `at` in W; negative is export.
#[must_use]
pub fn grid_at(at: NaiveDateTime) -> f64 {
    consumption_at(at) - roof_at(at) - balcony_at(at)
}

/// One day of balcony samples at [`POINT_STEP_MINUTES`] cadence.
#[must_use]
pub fn balcony_day(day: NaiveDate) -> Series {
    let start = day.and_time(NaiveTime::MIN);
    (0..24 * 60 / POINT_STEP_MINUTES)
        .map(|i| start + TimeDelta::minutes(i * POINT_STEP_MINUTES))
        .map(|at| Sample::new(at, balcony_at(at)))
        .collect()
}

/// A full month export.
///
/// Like real exports it runs up to the midnight row of the following month,
/// which the bundle drops.
#[must_use]
pub fn month_bundle(month: MonthKey) -> MonthBundle {
    let mut bundle = MonthBundle::new(month);
    let Some(first) = month.first_day() else {
        return bundle;
    };
    let mut at = first.and_time(NaiveTime::MIN);
    while bundle.insert(
        Sample::new(at, roof_at(at)),
        Sample::new(at, consumption_at(at)),
        Sample::new(at, grid_at(at)),
    ) {
        at += TimeDelta::minutes(BULK_STEP_MINUTES);
    }
    bundle
}
