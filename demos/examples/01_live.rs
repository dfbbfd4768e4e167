use chrono::Local;
use pvdash::Dashboard;
use pvdash_demos::common::get_sources;

fn watts(s: Option<pvdash::Sample>) -> String {
    s.map_or_else(|| "-".to_string(), |s| format!("{:.0} W at {}", s.value, s.at.time()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sources = get_sources()?;
    let dash = Dashboard::builder()
        .point_source(sources.point)
        .bulk_source(sources.bulk)
        .build()?;

    let live = dash.live(Local::now().date_naive()).await?;
    println!("roof        {}", watts(live.roof));
    println!("balcony     {}", watts(live.balcony));
    println!("consumption {}", watts(live.consumption));
    println!("grid        {}", watts(live.grid));
    println!("production  {:.0} W", live.production());
    Ok(())
}
