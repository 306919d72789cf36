use common::utils::config::get_config;
use html_router::{html_routes, html_state::HtmlState};
use tracing::info;

mod telemetry;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    // Get config
    let config = get_config()?;

    let html_state = HtmlState::new(config.clone());
    let app = html_routes(&html_state).with_state(html_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
