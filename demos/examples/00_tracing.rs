use chrono::Local;
use pvdash::{Dashboard, SeriesKind};
use pvdash_demos::common::get_sources;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,pvdash=debug,pvdash_http=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let sources = get_sources()?;
    let dash = Dashboard::builder()
        .point_source(sources.point)
        .bulk_source(sources.bulk)
        .status(sources.status)
        .build()?;

    let today = Local::now().date_naive();

    // Net consumption pulls roof, balcony and grid through the same cache.
    let net = dash.series(SeriesKind::NetConsumption, today).await?;
    // Served from the month fetched above.
    let _ = dash.series(SeriesKind::FeedIn, today).await?;

    println!("net consumption samples today: {}", net.len());
    Ok(())
}
