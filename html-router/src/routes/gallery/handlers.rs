use axum::{extract::State, response::IntoResponse};
use serde::Serialize;

use crate::html_state::HtmlState;
use crate::middlewares::response_middleware::{HtmlError, TemplateResponse};

#[derive(Serialize)]
pub struct GalleryPage {
    title: String,
    /// Stored file names in directory-listing order.
    images: Vec<String>,
}

pub async fn gallery_handler(State(state): State<HtmlState>) -> Result<impl IntoResponse, HtmlError> {
    let images = state.library.list_image_files().await?;
    if images.is_empty() {
        return Ok(TemplateResponse::not_found());
    }

    Ok(TemplateResponse::new_template(
        "gallery.html",
        GalleryPage {
            title: format!("All {} Images", state.config.site_title),
            images,
        },
    ))
}
