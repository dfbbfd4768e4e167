use std::collections::BTreeMap;

use chrono::NaiveDate;
use pvdash_types::{Sample, Series, SeriesKind};

use crate::period::MonthKey;

/// Samples of every bulk kind for one day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkDay {
    /// Rooftop production (`V`).
    pub roof: Vec<Sample>,
    /// Consumption (`V2`).
    pub consumption: Vec<Sample>,
    /// Signed grid exchange (`V3`).
    pub grid: Vec<Sample>,
}

impl BulkDay {
    /// Samples for a bulk kind; `None` for kinds the bulk source does not carry.
    #[must_use]
    pub fn samples(&self, kind: SeriesKind) -> Option<&[Sample]> {
        match kind {
            SeriesKind::Roof => Some(&self.roof),
            SeriesKind::Consumption => Some(&self.consumption),
            SeriesKind::Grid => Some(&self.grid),
            SeriesKind::Balcony
            | SeriesKind::FeedIn
            | SeriesKind::GridDraw
            | SeriesKind::NetConsumption => None,
        }
    }
}

/// Everything one bulk fetch returned for a month, grouped per day.
///
/// Only days inside `month` are kept; the export may contain boundary rows of
/// the following month which [`MonthBundle::insert`] discards.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBundle {
    month: MonthKey,
    days: BTreeMap<NaiveDate, BulkDay>,
}

impl MonthBundle {
    /// Empty bundle for `month`.
    #[must_use]
    pub const fn new(month: MonthKey) -> Self {
        Self {
            month,
            days: BTreeMap::new(),
        }
    }

    /// Month the bundle covers.
    #[must_use]
    pub const fn month(&self) -> MonthKey {
        self.month
    }

    /// Append one co-timestamped row of all three channels.
    ///
    /// Returns `false` (and stores nothing) when the row falls outside the month.
    pub fn insert(&mut self, roof: Sample, consumption: Sample, grid: Sample) -> bool {
        let day = roof.at.date();
        if !self.month.contains(day) {
            return false;
        }
        let entry = self.days.entry(day).or_default();
        entry.roof.push(roof);
        entry.consumption.push(consumption);
        entry.grid.push(grid);
        true
    }

    /// Days present in the payload, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Raw rows of one day.
    #[must_use]
    pub fn day(&self, day: NaiveDate) -> Option<&BulkDay> {
        self.days.get(&day)
    }

    /// Series of one bulk kind on one day.
    #[must_use]
    pub fn series(&self, kind: SeriesKind, day: NaiveDate) -> Option<Series> {
        self.days
            .get(&day)
            .and_then(|d| d.samples(kind))
            .map(|s| Series::new(s.to_vec()))
    }

    /// Number of days present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no day survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
