// src/bin/test_provider.rs
use corona_dashboard_api::models::{HistoryRange, Selection};
use corona_dashboard_api::services::provider::ProviderClient;
use corona_dashboard_api::services::series;

#[tokio::main]
async fn main() -> Result<(), corona_dashboard_api::BoxError> {
    env_logger::init();

    let provider = ProviderClient::new()?;

    let global = provider.global_snapshot().await?;
    println!("Global snapshot:  {:?}", global);

    let entities = provider.entities().await?;
    println!("Known entities:   {}", entities.len());

    let timeline = provider
        .history(&Selection::Global, HistoryRange::Days(7))
        .await?;
    let (points, summary) = series::normalize(&timeline)?;
    println!(
        "7-day history:    {} points, last date {:?}",
        summary.point_count, summary.last_date
    );
    if let Some(point) = points.last() {
        println!("Latest point:     {:?}", point);
    }

    Ok(())
}
