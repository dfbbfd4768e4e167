use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashError;

/// How often one upstream call covers a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// One call per day.
    Daily,
    /// One call per calendar month, unbundled into days afterwards.
    Monthly,
}

/// Where the samples of a series come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// The inverter cloud API (one day per request).
    Point,
    /// The home-automation statistics export (one month per request).
    Bulk,
    /// Computed from other series already resolvable through the store.
    Derived,
}

/// Every series the dashboard knows about.
///
/// Raw kinds are fetched from an upstream source; derived kinds declare their
/// dependencies through [`SeriesKind::dependencies`] and are computed from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesKind {
    /// Rooftop PV production.
    Roof,
    /// Household consumption as measured by the home-automation system.
    Consumption,
    /// Grid exchange, signed: negative values are export.
    Grid,
    /// Balcony PV production.
    Balcony,
    /// Exported power, `max(0, -grid)`.
    FeedIn,
    /// Imported power, `max(0, grid)`.
    GridDraw,
    /// `roof + balcony + grid`, aligned to the consumption timestamps.
    NetConsumption,
}

impl SeriesKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Roof,
        Self::Consumption,
        Self::Grid,
        Self::Balcony,
        Self::FeedIn,
        Self::GridDraw,
        Self::NetConsumption,
    ];

    /// Raw kinds delivered together by a single bulk (monthly) fetch.
    pub const BULK: [Self; 3] = [Self::Roof, Self::Consumption, Self::Grid];

    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roof => "roof",
            Self::Consumption => "consumption",
            Self::Grid => "grid",
            Self::Balcony => "balcony",
            Self::FeedIn => "feed-in",
            Self::GridDraw => "grid-draw",
            Self::NetConsumption => "net-consumption",
        }
    }

    /// Upstream source of the samples.
    #[must_use]
    pub const fn origin(self) -> Origin {
        match self {
            Self::Roof | Self::Consumption | Self::Grid => Origin::Bulk,
            Self::Balcony => Origin::Point,
            Self::FeedIn | Self::GridDraw | Self::NetConsumption => Origin::Derived,
        }
    }

    /// Fetch granularity. Derived kinds are computed per day.
    #[must_use]
    pub const fn granularity(self) -> Granularity {
        match self.origin() {
            Origin::Bulk => Granularity::Monthly,
            Origin::Point | Origin::Derived => Granularity::Daily,
        }
    }

    /// Whether the kind is fetched rather than computed.
    #[must_use]
    pub const fn is_raw(self) -> bool {
        !matches!(self.origin(), Origin::Derived)
    }

    /// Kinds that must be resolved (for the same day) before this one can be computed.
    ///
    /// Empty for raw kinds. The declared graph is acyclic.
    #[must_use]
    pub const fn dependencies(self) -> &'static [Self] {
        match self {
            Self::Roof | Self::Consumption | Self::Grid | Self::Balcony => &[],
            Self::FeedIn | Self::GridDraw => &[Self::Grid],
            Self::NetConsumption => &[Self::Consumption, Self::Roof, Self::Grid, Self::Balcony],
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesKind {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted || k.as_str().replace('-', "") == wanted)
            .ok_or_else(|| DashError::InvalidArg(format!("unknown series kind '{s}'")))
    }
}
