#![allow(clippy::missing_docs_in_private_items)]

pub mod pipeline;
pub mod types;
pub mod utils;

pub use pipeline::{
    ImageOutcome, IngestionConfig, IngestionFilters, IngestionPipeline, RunSummary,
};
use tracing::{error, info};

/// Run the pipeline once to completion and log how it ended.
///
/// Errors are logged, never returned: a failed run only means no new images
/// until the next process start.
pub async fn run_ingestion(pipeline: &IngestionPipeline) {
    info!("Starting ingestion run");
    match pipeline.run().await {
        Ok(summary) => info!(
            pages = summary.pages_fetched,
            records = summary.records_seen,
            stored = summary.stored,
            rejected = summary.rejected,
            failed = summary.failed,
            skipped_existing = summary.skipped_existing,
            "Ingestion run finished"
        ),
        Err(e) => error!("Ingestion run stopped: {}", e),
    }
}
