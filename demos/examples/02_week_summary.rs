use std::time::Duration;

use chrono::Local;
use pvdash::{Dashboard, SeriesKind, day_offset};
use pvdash_demos::common::get_sources;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sources = get_sources()?;
    let dash = Dashboard::builder()
        .point_source(sources.point)
        .bulk_source(sources.bulk)
        .get_timeout(Some(Duration::from_secs(120)))
        .build()?;

    let today = Local::now().date_naive();
    let from = day_offset(today, -6);
    let summary = dash.summary_range(from, today).await?;

    println!("energy {from} .. {today}");
    for kind in SeriesKind::ALL {
        match summary.get(kind) {
            Some(kwh) => println!("  {:<16} {kwh:>8.2} kWh", kind.as_str()),
            None => println!(
                "  {:<16} failed: {}",
                kind.as_str(),
                summary.failures.get(&kind).map_or("", String::as_str)
            ),
        }
    }
    Ok(())
}
