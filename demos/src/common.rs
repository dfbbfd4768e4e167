use std::env;
use std::sync::Arc;

use pvdash::{BulkSource, DashError, PointSource, StatusSink, TracingStatus};
use pvdash_http::HttpSources;

/// Point and bulk sources for one demo run.
pub struct Sources {
    /// Daily production source.
    pub point: Arc<dyn PointSource>,
    /// Monthly statistics source.
    pub bulk: Arc<dyn BulkSource>,
    /// Status sink shared by the sources.
    pub status: Arc<dyn StatusSink>,
}

fn required(name: &str) -> Result<String, DashError> {
    env::var(name).map_err(|_| DashError::InvalidArg(format!("environment variable {name} is not set")))
}

/// Sources for demos: fixtures when `PVDASH_DEMOS_USE_MOCK` is set, the live
/// upstreams otherwise.
///
/// Live mode logs in with `PVDASH_CLOUD_USER`/`PVDASH_CLOUD_PASS` and reads the
/// statistics server with `PVDASH_STATS_USER`/`PVDASH_STATS_PASS`.
///
/// # Errors
/// `InvalidArg` when a live-mode variable is missing.
pub fn get_sources() -> Result<Sources, DashError> {
    let status: Arc<dyn StatusSink> = Arc::new(TracingStatus::default());
    if env::var("PVDASH_DEMOS_USE_MOCK").is_ok() {
        println!("--- (Using mock sources) ---");
        let mock = Arc::new(pvdash_mock::MockSource::new());
        return Ok(Sources {
            point: mock.clone(),
            bulk: mock,
            status,
        });
    }
    let http = HttpSources::builder()
        .status(status.clone())
        .login(
            required("PVDASH_CLOUD_USER")?,
            required("PVDASH_CLOUD_PASS")?,
            required("PVDASH_STATS_USER")?,
            required("PVDASH_STATS_PASS")?,
        )
        .build()?;
    Ok(Sources {
        point: http.point,
        bulk: http.bulk,
        status,
    })
}
