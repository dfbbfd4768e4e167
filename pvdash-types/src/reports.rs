use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::kind::SeriesKind;
use crate::series::Sample;

/// Latest reading of each raw kind on a given day.
///
/// A field is `None` when the day's series holds no samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    /// Day the readings were taken from.
    pub day: NaiveDate,
    /// Latest rooftop production.
    pub roof: Option<Sample>,
    /// Latest balcony production.
    pub balcony: Option<Sample>,
    /// Latest household consumption.
    pub consumption: Option<Sample>,
    /// Latest signed grid exchange.
    pub grid: Option<Sample>,
}

impl LiveSnapshot {
    /// Combined production of both PV systems, counting missing readings as zero.
    #[must_use]
    pub fn production(&self) -> f64 {
        self.roof.map_or(0.0, |s| s.value) + self.balcony.map_or(0.0, |s| s.value)
    }
}

/// Energy (kWh) per kind over a span of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySummary {
    /// First day included.
    pub from: NaiveDate,
    /// Last day included.
    pub to: NaiveDate,
    /// Integrated energy per kind.
    pub energy_kwh: BTreeMap<SeriesKind, f64>,
    /// Kinds that could not be resolved, with the failure text.
    ///
    /// Failed kinds are left out of `energy_kwh` so the remaining figures can
    /// still be shown.
    pub failures: BTreeMap<SeriesKind, String>,
}

impl EnergySummary {
    /// Energy of one kind, if it was resolved.
    #[must_use]
    pub fn get(&self, kind: SeriesKind) -> Option<f64> {
        self.energy_kwh.get(&kind).copied()
    }
}
