//! Calendar addressing: days, months and the upstream timestamp formats.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use pvdash_types::{DashError, Granularity, SeriesKind};
use serde::{Deserialize, Serialize};

/// A calendar month, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Build a month key.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `month` is not in `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self, DashError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(DashError::InvalidArg(format!("month out of range: {month}")))
        }
    }

    /// Month containing `day`.
    #[must_use]
    pub fn of(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month, 1-based.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// `YYYYMM`, as used in statistics export file names.
    #[must_use]
    pub fn compact(self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// Whether `day` lies in this month.
    #[must_use]
    pub fn contains(self, day: NaiveDate) -> bool {
        day.year() == self.year && day.month() == self.month
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || DashError::InvalidArg(format!("expected YYYY-MM, got '{s}'"));
        let (y, m) = s.trim().split_once('-').ok_or_else(bad)?;
        let year = y.parse::<i32>().map_err(|_| bad())?;
        let month = m.parse::<u32>().map_err(|_| bad())?;
        Self::new(year, month)
    }
}

/// The unit a population request covers: one day, or the month a bulk fetch returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKey {
    /// A single ISO day.
    Day(NaiveDate),
    /// An ISO month.
    Month(MonthKey),
}

impl PeriodKey {
    /// Population period for `kind` when `day` is requested.
    #[must_use]
    pub fn for_kind(kind: SeriesKind, day: NaiveDate) -> Self {
        match kind.granularity() {
            Granularity::Daily => Self::Day(day),
            Granularity::Monthly => Self::Month(MonthKey::of(day)),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Month(m) => m.fmt(f),
        }
    }
}

/// Parse an ISO day (`YYYY-MM-DD`).
///
/// # Errors
/// Returns `InvalidArg` for anything else.
pub fn parse_day(s: &str) -> Result<NaiveDate, DashError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| DashError::InvalidArg(format!("invalid day '{s}': {e}")))
}

/// `today` shifted by `delta` days (negative goes back).
///
/// Saturates at the representable calendar range.
#[must_use]
pub fn day_offset(today: NaiveDate, delta: i64) -> NaiveDate {
    let shifted = if delta >= 0 {
        today.checked_add_days(Days::new(delta.unsigned_abs()))
    } else {
        today.checked_sub_days(Days::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(if delta >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// Days from `from` to `to`, both inclusive. Empty if `to < from`.
#[must_use]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d <= to).collect()
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a local timestamp as emitted by either upstream source.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]` and the ISO `T`-separated forms.
///
/// # Errors
/// Returns `Parse` when none of the formats match.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, DashError> {
    let t = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(t, f).ok())
        .ok_or_else(|| DashError::parse("timestamp", format!("unrecognized timestamp '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_key_formats() {
        let m = MonthKey::of(d(2025, 3, 14));
        assert_eq!(m.to_string(), "2025-03");
        assert_eq!(m.compact(), "202503");
        assert_eq!("2025-03".parse::<MonthKey>().unwrap(), m);
        assert!(m.contains(d(2025, 3, 31)));
        assert!(!m.contains(d(2025, 4, 1)));
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("march".parse::<MonthKey>().is_err());
    }

    #[test]
    fn period_follows_kind_granularity() {
        let day = d(2025, 3, 14);
        assert_eq!(
            PeriodKey::for_kind(SeriesKind::Roof, day).to_string(),
            "2025-03"
        );
        assert_eq!(
            PeriodKey::for_kind(SeriesKind::Balcony, day).to_string(),
            "2025-03-14"
        );
        assert_eq!(
            PeriodKey::for_kind(SeriesKind::FeedIn, day),
            PeriodKey::Day(day)
        );
    }

    #[test]
    fn day_offset_crosses_month_boundaries() {
        assert_eq!(day_offset(d(2025, 3, 1), -1), d(2025, 2, 28));
        assert_eq!(day_offset(d(2025, 3, 31), 1), d(2025, 4, 1));
        assert_eq!(day_offset(d(2025, 3, 10), 0), d(2025, 3, 10));
    }

    #[test]
    fn days_between_is_inclusive() {
        let days = days_between(d(2025, 2, 27), d(2025, 3, 2));
        assert_eq!(days.len(), 4);
        assert!(days_between(d(2025, 3, 2), d(2025, 3, 1)).is_empty());
    }

    #[test]
    fn parses_both_upstream_timestamp_styles() {
        let want = d(2025, 3, 1).and_hms_opt(8, 15, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01 08:15:00").unwrap(), want);
        assert_eq!(parse_timestamp("2025-03-01 08:15").unwrap(), want);
        assert_eq!(parse_timestamp("2025-03-01T08:15:00").unwrap(), want);
        assert!(matches!(
            parse_timestamp("08:15"),
            Err(DashError::Parse { .. })
        ));
    }
}
