use common::utils::config::get_config;
use ingestion_pipeline::IngestionPipeline;
use tracing::info;

mod telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let config = get_config()?;

    let pipeline = IngestionPipeline::new(&config).await?;

    // A standalone run reports a failed page fetch through the exit status.
    let summary = pipeline.run().await?;
    info!(?summary, "Ingestion run finished");

    Ok(())
}
