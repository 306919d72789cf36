use common::utils::config::get_config;
use html_router::{html_routes, html_state::HtmlState};
use ingestion_pipeline::{run_ingestion, IngestionPipeline};
use tracing::{error, info};

mod telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    // Get config
    let config = get_config()?;

    let html_state = HtmlState::new(config.clone());
    let app = html_routes(&html_state).with_state(html_state);

    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&serve_address).await?;
    info!("Server running on {}", config.site_url());

    // The scrape runs once in the background; the server keeps serving
    // whatever is already on disk regardless of how it ends.
    tokio::spawn(async move {
        match IngestionPipeline::new(&config).await {
            Ok(pipeline) => run_ingestion(&pipeline).await,
            Err(e) => error!("Failed to set up ingestion pipeline: {}", e),
        }
    });

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use common::utils::config::AppConfig;
    use tower::ServiceExt;

    #[tokio::test]
    async fn smoke_startup_serves_empty_library() {
        let root = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            http_port: 0,
            image_dir: root.path().join("posts").to_string_lossy().into_owned(),
            processed_file: root.path().join("checked.json").to_string_lossy().into_owned(),
            public_dir: root.path().join("public").to_string_lossy().into_owned(),
            ..Default::default()
        };

        let html_state = HtmlState::new(config.clone());
        let app = html_routes(&html_state).with_state(html_state);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Building the pipeline must not touch the network or the disk.
        let pipeline = IngestionPipeline::new(&config)
            .await
            .expect("pipeline builds from config");
        assert!(pipeline.processed_urls().await.is_empty());
        assert!(!root.path().join("posts").exists());
    }
}
