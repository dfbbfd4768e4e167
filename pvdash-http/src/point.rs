use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use pvdash_core::connector::PointSource;
use pvdash_core::{
    CredentialProvider, DashError, PointSourceConfig, Sample, Series, parse_timestamp,
};
use serde::{Deserialize, Serialize};

use crate::fetcher::RetryingFetcher;

const REPORT_PATH: &str = "report/select_power_by_station";

#[derive(Debug, Serialize)]
struct PowerRequest {
    #[serde(rename = "sid_list")]
    station_ids: Vec<u64>,
    #[serde(rename = "sid")]
    station_id: u64,
    start_date: String,
    end_date: String,
    page: u32,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    #[serde(default)]
    data: Vec<StationPower>,
}

#[derive(Debug, Deserialize)]
struct StationPower {
    #[serde(default)]
    data_list: Vec<PowerRow>,
}

#[derive(Debug, Deserialize)]
struct PowerRow {
    date: String,
    #[serde(default)]
    pv_power: Option<Lenient>,
}

// The API reports power either as a number or as a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lenient {
    Num(f64),
    Text(String),
}

impl Lenient {
    fn value(&self) -> Result<f64, DashError> {
        match self {
            Self::Num(v) => Ok(*v),
            Self::Text(s) if s.trim().is_empty() => Ok(0.0),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| DashError::parse("pv_power", format!("not a number: '{s}'"))),
        }
    }
}

/// Daily balcony production from the inverter cloud report API.
///
/// One POST per day for the first page of the station's power report. Days
/// before the station's activation date are answered with a placeholder
/// without touching the network, as are days the API returns no rows for.
pub struct PointAcquirer {
    fetcher: Arc<RetryingFetcher>,
    credentials: Arc<dyn CredentialProvider>,
    cfg: PointSourceConfig,
}

impl PointAcquirer {
    /// Build an acquirer.
    pub fn new(
        fetcher: Arc<RetryingFetcher>,
        credentials: Arc<dyn CredentialProvider>,
        cfg: PointSourceConfig,
    ) -> Self {
        Self {
            fetcher,
            credentials,
            cfg,
        }
    }

    fn report_url(&self) -> String {
        format!("{}/{REPORT_PATH}", self.cfg.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, day: NaiveDate) -> PowerRequest {
        let d = day.format("%Y-%m-%d").to_string();
        PowerRequest {
            station_ids: vec![self.cfg.station_id],
            station_id: self.cfg.station_id,
            start_date: d.clone(),
            end_date: d,
            page: 1,
            page_size: self.cfg.page_size,
        }
    }

    async fn fetch(&self, day: NaiveDate) -> Result<Series, DashError> {
        let creds = self.credentials.credentials().await?;
        let request = self
            .fetcher
            .client()
            .post(self.report_url())
            .header("authorization", creds.bearer_token)
            .json(&self.request_body(day));
        let body = self.fetcher.send(request).await?.text().await.map_err(|e| {
            DashError::network(self.report_url(), None, format!("reading body: {e}"))
        })?;
        parse_power_report(day, &body)
    }
}

/// Decode a power report into a series for `day`.
///
/// Rows carry clock times only; they are stamped with `day`. An empty report
/// yields [`Series::placeholder`].
///
/// # Errors
/// Returns `Parse` for malformed JSON, timestamps or power values.
pub fn parse_power_report(day: NaiveDate, body: &str) -> Result<Series, DashError> {
    let what = format!("power report for {day}");
    let resp: PowerResponse = serde_json::from_str(body).map_err(|e| DashError::parse(&what, e))?;
    let rows = resp
        .data
        .into_iter()
        .next()
        .map(|s| s.data_list)
        .unwrap_or_default();
    if rows.is_empty() {
        return Ok(Series::placeholder(day));
    }
    let samples = rows
        .iter()
        .map(|row| {
            let at = parse_timestamp(&format!("{} {}", day.format("%Y-%m-%d"), row.date))?;
            let value = row.pv_power.as_ref().map_or(Ok(0.0), Lenient::value)?;
            Ok(Sample::new(at, value))
        })
        .collect::<Result<Vec<_>, DashError>>()?;
    Ok(Series::new(samples))
}

#[async_trait]
impl PointSource for PointAcquirer {
    fn name(&self) -> &'static str {
        "pvdash-http/point"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pvdash_http::point::day", skip(self), fields(day = %day))
    )]
    async fn day(&self, day: NaiveDate) -> Result<Series, DashError> {
        if day < self.cfg.activation_date {
            #[cfg(feature = "tracing")]
            tracing::debug!(activation = %self.cfg.activation_date, "before activation; placeholder");
            return Ok(Series::placeholder(day));
        }
        let status = self.fetcher.status();
        let id = status.notify(&format!("Loading {}..", day.format("%Y-%m-%d")));
        let out = self.fetch(day).await;
        status.clear(id);
        out
    }
}
