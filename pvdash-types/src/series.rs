use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One measurement: a local timestamp and a value in base units (W).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Local wall-clock time of the measurement.
    pub at: NaiveDateTime,
    /// Measured value.
    pub value: f64,
}

impl Sample {
    /// Build a sample.
    #[must_use]
    pub const fn new(at: NaiveDateTime, value: f64) -> Self {
        Self { at, value }
    }
}

/// A day of samples, ascending by timestamp.
///
/// Spacing is usually regular but callers must not rely on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    /// Build a series, sorting the samples by timestamp (stable for equal timestamps).
    #[must_use]
    pub fn new(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.at);
        Self { samples }
    }

    /// Single zero-valued sample at midnight of `day`.
    ///
    /// Stands in for days a source has no data for, so interpolation against the
    /// series stays well defined.
    #[must_use]
    pub fn placeholder(day: NaiveDate) -> Self {
        Self {
            samples: vec![Sample::new(day.and_time(chrono::NaiveTime::MIN), 0.0)],
        }
    }

    /// Samples in ascending timestamp order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Consume the series and return its samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Earliest sample.
    #[must_use]
    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    /// Latest sample.
    #[must_use]
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Iterate over the samples.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Apply `f` to every value, keeping timestamps.
    #[must_use]
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            samples: self
                .samples
                .iter()
                .map(|s| Sample::new(s.at, f(s.value)))
                .collect(),
        }
    }
}

impl From<Vec<Sample>> for Series {
    fn from(samples: Vec<Sample>) -> Self {
        Self::new(samples)
    }
}

impl From<Series> for Vec<Sample> {
    fn from(series: Series) -> Self {
        series.samples
    }
}

impl FromIterator<Sample> for Series {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
