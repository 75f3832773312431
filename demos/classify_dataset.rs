use dotenv::dotenv;
use fnol_classifier::*;
use log::info;
use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

/// Usage: cargo run --example classify_dataset -- claims.csv [limit]
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: classify_dataset <claims.csv> [limit]")?;
    let limit: Option<usize> = args.next().map(|l| l.parse()).transpose()?;

    let started = Instant::now();

    let mut dataset = ClaimsDataset::from_csv_path(&path)?;
    if let Some(limit) = limit {
        dataset = ClaimsDataset::from_rows(dataset.into_rows().into_iter().take(limit).collect());
    }

    info!("Connecting to OpenAI");
    let service = Arc::new(OpenAiClient::from_env()?);
    let config = ClassifierConfig::from_env()?;
    info!("Using model {} with concurrency {}", config.model, config.concurrency);

    let pipeline = ClaimPipeline::new(ClaimClassifier::new(service, config));
    let (records, report) = evaluate_dataset(&pipeline, &dataset).await;

    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }
    println!("\n{}", report);

    info!("Processing time: {:.1?}", started.elapsed());
    Ok(())
}
