use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use common::{
    error::AppError,
    storage::image_library::pick_random,
    utils::template_engine::{ProvidesTemplateEngine, Value},
};
use minijinja::context;
use serde::Serialize;
use tracing::error;

use crate::html_state::HtmlState;

pub trait ProvidesHtmlState {
    fn html_state(&self) -> &HtmlState;
}

#[derive(Clone, Debug)]
pub enum TemplateKind {
    Full(String),
    Error(StatusCode),
    Redirect(String),
}

#[derive(Clone)]
pub struct TemplateResponse {
    template_kind: TemplateKind,
    context: Value,
}

impl TemplateResponse {
    pub fn new_template<T: Serialize>(name: impl Into<String>, context: T) -> Self {
        Self {
            template_kind: TemplateKind::Full(name.into()),
            context: Value::from_serialize(&context),
        }
    }

    pub fn error(status: StatusCode, title: &str, description: &str) -> Self {
        let ctx = context! {
            status_code => status.as_u16(),
            title => title,
            description => description
        };
        Self {
            template_kind: TemplateKind::Error(status),
            context: ctx,
        }
    }

    pub fn not_found() -> Self {
        Self::error(
            StatusCode::NOT_FOUND,
            "Not Found",
            "There are no images here yet. Check back soon.",
        )
    }

    pub fn server_error() -> Self {
        Self::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Something went wrong on our end.",
        )
    }

    pub fn redirect(path: impl Into<String>) -> Self {
        Self {
            template_kind: TemplateKind::Redirect(path.into()),
            context: Value::from_serialize(()),
        }
    }
}

impl IntoResponse for TemplateResponse {
    fn into_response(self) -> Response {
        Extension(self).into_response()
    }
}

/// Head metadata shared by every full page: favicon, OpenGraph and Twitter
/// card tags.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub og_title: String,
    pub description: String,
    pub site_url: String,
    pub image_count: usize,
    /// File name of a random stored image, used as favicon and preview.
    pub favicon: Option<String>,
}

impl PageMeta {
    pub fn new(site_title: &str, site_url: String, images: &[String]) -> Self {
        Self {
            og_title: format!("The {site_title} API"),
            description: format!(
                "{} random images of {site_title} and counting...",
                images.len()
            ),
            site_url,
            image_count: images.len(),
            favicon: pick_random(images).cloned(),
        }
    }
}

#[derive(Serialize)]
struct ContextWrapper<'a> {
    site_title: &'a str,
    meta: Option<PageMeta>,
    #[serde(flatten)]
    context: HashMap<String, Value>,
}

pub async fn with_template_response<S>(
    State(state): State<S>,
    req: Request,
    next: Next,
) -> Response
where
    S: ProvidesTemplateEngine + ProvidesHtmlState + Clone + Send + Sync + 'static,
{
    let response = next.run(req).await;

    let Some(template_response) = response.extensions().get::<TemplateResponse>().cloned() else {
        return response;
    };

    fn context_to_map(
        value: &Value,
    ) -> Result<HashMap<String, Value>, minijinja::value::ValueKind> {
        match value.kind() {
            minijinja::value::ValueKind::Map => {
                let mut map = HashMap::new();
                if let Ok(keys) = value.try_iter() {
                    for key in keys {
                        if let Ok(val) = value.get_item(&key) {
                            map.insert(key.to_string(), val);
                        }
                    }
                }
                Ok(map)
            }
            minijinja::value::ValueKind::None | minijinja::value::ValueKind::Undefined => {
                Ok(HashMap::new())
            }
            other => Err(other),
        }
    }

    let (template_name, status) = match &template_response.template_kind {
        TemplateKind::Redirect(path) => return Redirect::to(path).into_response(),
        TemplateKind::Full(name) => (name.as_str(), StatusCode::OK),
        TemplateKind::Error(status) => ("errors/error.html", *status),
    };

    let html_state = state.html_state();
    let context_map = match context_to_map(&template_response.context) {
        Ok(map) => map,
        Err(kind) => {
            error!(
                "Template context must be a map or unit, got kind={:?} for template_kind={:?}",
                kind, template_response.template_kind
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response();
        }
    };

    // The head is built from whatever is on disk right now; a missing
    // directory just means a page without image metadata.
    let meta = html_state
        .library
        .list_image_files()
        .await
        .ok()
        .map(|files| {
            PageMeta::new(
                &html_state.config.site_title,
                html_state.config.site_url(),
                &files,
            )
        });

    let context = ContextWrapper {
        site_title: &html_state.config.site_title,
        meta,
        context: context_map,
    };

    match state.template_engine().render_view(template_name, &context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render template '{}': {:?}", template_name, e);
            let status = if status.is_success() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                status
            };
            (status, Html(fallback_error())).into_response()
        }
    }
}

#[derive(Debug)]
pub enum HtmlError {
    AppError(AppError),
}

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        Self::AppError(err)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        match self {
            Self::AppError(AppError::NotFound(_)) => TemplateResponse::not_found().into_response(),
            Self::AppError(err) => {
                error!("Internal error: {:?}", err);
                TemplateResponse::server_error().into_response()
            }
        }
    }
}

fn fallback_error() -> String {
    r#"
    <html>
        <body>
            <div class="center">
                <h1>Error</h1>
                <p>Sorry, something went wrong displaying this page.</p>
            </div>
        </body>
    </html>
    "#
    .to_string()
}
