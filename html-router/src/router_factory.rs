use std::path::PathBuf;

use axum::{extract::FromRef, middleware::from_fn_with_state, Router};
use tower_http::{compression::CompressionLayer, services::ServeDir};

use crate::{html_state::HtmlState, middlewares::response_middleware::with_template_response};

pub struct RouterFactory<S> {
    app_state: HtmlState,
    public_routers: Vec<Router<S>>,
    mounted_dirs: Vec<(String, PathBuf)>,
    public_assets_dir: Option<PathBuf>,
    compression_enabled: bool,
}

impl<S> RouterFactory<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    pub fn new(app_state: &HtmlState) -> Self {
        Self {
            app_state: app_state.to_owned(),
            public_routers: Vec::new(),
            mounted_dirs: Vec::new(),
            public_assets_dir: None,
            compression_enabled: false,
        }
    }

    // Serve the files of `directory` under the URL prefix `path`
    pub fn with_static_dir(mut self, path: &str, directory: impl Into<PathBuf>) -> Self {
        self.mounted_dirs.push((path.to_string(), directory.into()));
        self
    }

    // Serve `directory` for any path no route matched
    pub fn with_public_assets(mut self, directory: impl Into<PathBuf>) -> Self {
        self.public_assets_dir = Some(directory.into());
        self
    }

    // Add a router that will be merged at the root level
    pub fn add_public_routes(mut self, routes: Router<S>) -> Self {
        self.public_routers.push(routes);
        self
    }

    /// Enables response compression when building the router.
    pub const fn with_compression(mut self) -> Self {
        self.compression_enabled = true;
        self
    }

    pub fn build(self) -> Router<S> {
        // Pages rendered through the template middleware
        let mut app_router = Router::new();

        for router in self.public_routers {
            app_router = app_router.merge(router);
        }

        app_router = app_router.layer(from_fn_with_state(
            self.app_state.clone(),
            with_template_response::<HtmlState>,
        ));

        // Static directories bypass the app middleware
        let mut final_router = Router::new();

        for (path, directory) in self.mounted_dirs {
            tracing::debug!("Static files: serving {} from {:?}", path, directory);
            final_router = final_router.nest_service(&path, ServeDir::new(directory));
        }

        final_router = final_router.merge(app_router);

        if let Some(directory) = self.public_assets_dir {
            tracing::debug!("Assets: serving from filesystem: {:?}", directory);
            final_router = final_router.fallback_service(ServeDir::new(directory));
        }

        if self.compression_enabled {
            final_router = final_router.layer(CompressionLayer::new());
        }

        final_router
    }
}
