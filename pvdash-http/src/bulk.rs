use std::sync::Arc;

use async_trait::async_trait;
use pvdash_core::connector::BulkSource;
use pvdash_core::{
    BulkSourceConfig, CredentialProvider, DashError, MonthBundle, MonthKey, Sample,
    parse_timestamp,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use url::Url;

use crate::fetcher::RetryingFetcher;

/// Monthly roof/consumption/grid statistics from the home-automation server.
///
/// The server sits behind a DNS alias that redirects to its current address,
/// so every fetch first follows the alias and then requests
/// `stats/<resource_id>.<YYYYMM>.xml` relative to where it landed.
pub struct BulkAcquirer {
    fetcher: Arc<RetryingFetcher>,
    credentials: Arc<dyn CredentialProvider>,
    cfg: BulkSourceConfig,
}

impl BulkAcquirer {
    /// Build an acquirer.
    pub fn new(
        fetcher: Arc<RetryingFetcher>,
        credentials: Arc<dyn CredentialProvider>,
        cfg: BulkSourceConfig,
    ) -> Self {
        Self {
            fetcher,
            credentials,
            cfg,
        }
    }

    async fn resolve_host(&self) -> Result<Url, DashError> {
        let resp = self
            .fetcher
            .send(self.fetcher.client().get(&self.cfg.dns_alias_url))
            .await?;
        let mut host = resp.url().clone();
        if !host.path().ends_with('/') {
            let path = format!("{}/", host.path());
            host.set_path(&path);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(host = %host, "resolved dns alias");
        Ok(host)
    }

    fn stats_url(&self, host: &Url, month: MonthKey) -> Result<Url, DashError> {
        let file = format!("stats/{}.{}.xml", self.cfg.resource_id, month.compact());
        host.join(&file)
            .map_err(|e| DashError::InvalidArg(format!("bad stats url '{file}': {e}")))
    }

    async fn fetch(&self, month: MonthKey) -> Result<MonthBundle, DashError> {
        let creds = self.credentials.credentials().await?;
        let host = self.resolve_host().await?;
        let url = self.stats_url(&host, month)?;
        let request = self
            .fetcher
            .client()
            .get(url.clone())
            .basic_auth(creds.basic_user, Some(creds.basic_pass));
        let xml = self
            .fetcher
            .send(request)
            .await?
            .text()
            .await
            .map_err(|e| DashError::network(url.as_str(), None, format!("reading body: {e}")))?;
        parse_stats_xml(month, &xml)
    }
}

/// Decode a statistics export into a bundle for `month`.
///
/// Every element with a `T` attribute is a row; `V`, `V2` and `V3` are roof,
/// consumption and grid in kilo-units and are scaled to base units. Rows
/// outside `month` (the export ends with the first reading of the next month)
/// are dropped.
///
/// # Errors
/// Returns `Parse` for ill-formed XML, unreadable timestamps, or a row missing
/// one of the value attributes.
pub fn parse_stats_xml(month: MonthKey, xml: &str) -> Result<MonthBundle, DashError> {
    let what = format!("stats xml for {month}");
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut bundle = MonthBundle::new(month);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                if let Some(row) = read_row(&e, &what)? {
                    let (at, [v, v2, v3]) = row;
                    bundle.insert(
                        Sample::new(at, v * 1000.0),
                        Sample::new(at, v2 * 1000.0),
                        Sample::new(at, v3 * 1000.0),
                    );
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DashError::parse(
                    &what,
                    format!("at byte {}: {e}", reader.buffer_position()),
                ));
            }
        }
    }
    Ok(bundle)
}

type Row = (chrono::NaiveDateTime, [f64; 3]);

fn read_row(e: &BytesStart<'_>, what: &str) -> Result<Option<Row>, DashError> {
    let mut t = None;
    let mut values: [Option<f64>; 3] = [None; 3];
    for attr in e.attributes() {
        let attr = attr.map_err(|err| DashError::parse(what, err))?;
        let slot = match attr.key.as_ref() {
            b"T" => None,
            b"V" => Some(0),
            b"V2" => Some(1),
            b"V3" => Some(2),
            _ => continue,
        };
        let raw = attr
            .unescape_value()
            .map_err(|err| DashError::parse(what, err))?;
        match slot {
            None => t = Some(parse_timestamp(&raw)?),
            Some(i) => {
                let v = raw.trim().parse::<f64>().map_err(|_| {
                    DashError::parse(what, format!("non-numeric value '{raw}'"))
                })?;
                values[i] = Some(v);
            }
        }
    }
    let Some(at) = t else {
        return Ok(None);
    };
    match values {
        [Some(v), Some(v2), Some(v3)] => Ok(Some((at, [v, v2, v3]))),
        _ => Err(DashError::parse(
            what,
            format!("row at {at} is missing one of V, V2, V3"),
        )),
    }
}

#[async_trait]
impl BulkSource for BulkAcquirer {
    fn name(&self) -> &'static str {
        "pvdash-http/bulk"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pvdash_http::bulk::month", skip(self), fields(month = %month))
    )]
    async fn month(&self, month: MonthKey) -> Result<MonthBundle, DashError> {
        let status = self.fetcher.status();
        let id = status.notify(&format!("Loading {month}.."));
        let out = self.fetch(month).await;
        status.clear(id);
        out
    }
}
