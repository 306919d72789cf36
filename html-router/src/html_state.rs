use common::create_template_engine;
use common::storage::image_library::ImageLibrary;
use common::utils::config::AppConfig;
use common::utils::template_engine::{ProvidesTemplateEngine, TemplateEngine};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct HtmlState {
    pub templates: Arc<TemplateEngine>,
    pub config: AppConfig,
    pub library: ImageLibrary,
}

impl HtmlState {
    pub fn new(config: AppConfig) -> Self {
        let library = ImageLibrary::new(config.image_dir_path());
        Self::new_with_resources(config, library, None)
    }

    pub fn new_with_resources(
        config: AppConfig,
        library: ImageLibrary,
        template_engine: Option<Arc<TemplateEngine>>,
    ) -> Self {
        let templates =
            template_engine.unwrap_or_else(|| Arc::new(create_template_engine!("templates")));
        debug!("Template engine configured for html_router.");

        Self {
            templates,
            config,
            library,
        }
    }
}

impl ProvidesTemplateEngine for HtmlState {
    fn template_engine(&self) -> &Arc<TemplateEngine> {
        &self.templates
    }
}

impl crate::middlewares::response_middleware::ProvidesHtmlState for HtmlState {
    fn html_state(&self) -> &HtmlState {
        self
    }
}
