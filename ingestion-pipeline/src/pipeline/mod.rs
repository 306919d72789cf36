mod config;
mod filters;
mod services;

pub use config::{IngestionConfig, IngestionFilters};
pub use filters::{aspect_ratio, file_extension, Rejection};
#[allow(clippy::module_name_repetitions)]
pub use services::{DefaultPipelineServices, PipelineServices};

use std::{path::Path, sync::Arc};

use common::{
    error::AppError,
    storage::{
        image_library::{write_atomic, ImageLibrary},
        processed_set::ProcessedSetStore,
    },
    utils::config::AppConfig,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::utils::image_processing::{read_dimensions, reencode_as_png};

/// Result of evaluating one file URL.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    /// The URL was already in the processed set; nothing was done.
    AlreadyProcessed,
    Stored,
    RejectedAspectRatio(f64),
    /// Download, decode, encode or write failed.
    Failed(String),
}

/// Counters for one pass over the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub records_seen: usize,
    pub filtered: usize,
    pub skipped_existing: usize,
    pub already_processed: usize,
    pub stored: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &ImageOutcome) {
        match outcome {
            ImageOutcome::AlreadyProcessed => self.already_processed += 1,
            ImageOutcome::Stored => self.stored += 1,
            ImageOutcome::RejectedAspectRatio(_) => self.rejected += 1,
            ImageOutcome::Failed(_) => self.failed += 1,
        }
    }
}

#[allow(clippy::module_name_repetitions)]
pub struct IngestionPipeline {
    library: ImageLibrary,
    processed: Mutex<ProcessedSetStore>,
    pipeline_config: IngestionConfig,
    services: Arc<dyn PipelineServices>,
}

impl IngestionPipeline {
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        Self::new_with_config(config, IngestionConfig::default()).await
    }

    pub async fn new_with_config(
        config: &AppConfig,
        pipeline_config: IngestionConfig,
    ) -> Result<Self, AppError> {
        let services = DefaultPipelineServices::new(config)?;
        let processed = ProcessedSetStore::load(config.processed_file_path()).await;

        Ok(Self::with_services(
            ImageLibrary::new(config.image_dir_path()),
            processed,
            pipeline_config,
            Arc::new(services),
        ))
    }

    pub fn with_services(
        library: ImageLibrary,
        processed: ProcessedSetStore,
        pipeline_config: IngestionConfig,
        services: Arc<dyn PipelineServices>,
    ) -> Self {
        Self {
            library,
            processed: Mutex::new(processed),
            pipeline_config,
            services,
        }
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    /// Snapshot of the processed set in recording order.
    pub async fn processed_urls(&self) -> Vec<String> {
        self.processed.lock().await.urls().to_vec()
    }

    /// Walk the listing from page 1 until an empty page.
    ///
    /// A page that cannot be fetched or decoded ends the run with that error.
    /// Everything that goes wrong for a single image is absorbed by
    /// [`Self::process_image`].
    #[tracing::instrument(skip_all, fields(image_dir = %self.library.dir().display()))]
    pub async fn run(&self) -> Result<RunSummary, AppError> {
        self.library.ensure_exists().await?;

        let filters = &self.pipeline_config.filters;
        let mut summary = RunSummary::default();
        let mut page: u32 = 1;

        loop {
            let records = self.services.fetch_page(page).await?;
            summary.pages_fetched += 1;

            if records.is_empty() {
                info!(page, "Listing exhausted");
                break;
            }
            info!(page, records = records.len(), "Fetched listing page");

            for record in &records {
                summary.records_seen += 1;

                let file_url = match filters.screen(record) {
                    Ok(file_url) => file_url,
                    Err(reason) => {
                        debug!(id = record.id, %reason, "Skipping post");
                        summary.filtered += 1;
                        continue;
                    }
                };

                let output_path = self.library.path_for(record.id);
                match self.library.is_stored(record.id).await {
                    Ok(false) => {}
                    Ok(true) => {
                        summary.skipped_existing += 1;
                        continue;
                    }
                    Err(err) => {
                        warn!(id = record.id, error = %err, "Could not check for stored image");
                        summary.failed += 1;
                        continue;
                    }
                }

                let outcome = self.process_image(file_url, &output_path).await;
                summary.record(&outcome);
            }

            page += 1;
        }

        Ok(summary)
    }

    /// Evaluate one image and record `url` in the processed set.
    ///
    /// URLs already in the set are skipped without any side effect. For any
    /// other URL the set is updated and rewritten before this returns, whether
    /// the image was stored, rejected or failed.
    #[tracing::instrument(skip_all, fields(url = %url))]
    pub async fn process_image(&self, url: &str, output_path: &Path) -> ImageOutcome {
        let mut processed = self.processed.lock().await;
        if processed.contains(url) {
            return ImageOutcome::AlreadyProcessed;
        }

        let outcome = match self.evaluate(url, output_path).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Skipping image");
                ImageOutcome::Failed(err.to_string())
            }
        };

        if let Err(err) = processed.mark_processed(url).await {
            error!(
                path = %processed.path().display(),
                error = %err,
                "Failed to persist processed set"
            );
        }

        outcome
    }

    async fn evaluate(&self, url: &str, output_path: &Path) -> Result<ImageOutcome, AppError> {
        let bytes = self.services.download(url).await?;

        let header = bytes.clone();
        let (width, height) =
            tokio::task::spawn_blocking(move || read_dimensions(&header)).await??;
        let ratio = aspect_ratio(width, height)?;

        if !self.pipeline_config.filters.accepts_aspect_ratio(ratio) {
            debug!(width, height, ratio, "Aspect ratio out of range");
            return Ok(ImageOutcome::RejectedAspectRatio(ratio));
        }

        let png = tokio::task::spawn_blocking(move || reencode_as_png(&bytes)).await??;
        write_atomic(output_path, &png).await?;
        info!(
            width,
            height,
            path = %output_path.display(),
            "Stored image"
        );

        Ok(ImageOutcome::Stored)
    }
}
