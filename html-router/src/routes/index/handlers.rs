use axum::{extract::State, response::IntoResponse};
use common::storage::image_library::pick_random;
use serde::Serialize;

use crate::html_state::HtmlState;
use crate::middlewares::response_middleware::{HtmlError, TemplateResponse};

#[derive(Serialize)]
pub struct RandomImagePage {
    title: String,
    image: String,
}

pub async fn index_handler(State(state): State<HtmlState>) -> Result<impl IntoResponse, HtmlError> {
    let files = state.library.list_image_files().await?;
    let Some(image) = pick_random(&files) else {
        return Ok(TemplateResponse::not_found());
    };

    Ok(TemplateResponse::new_template(
        "index.html",
        RandomImagePage {
            title: state.config.site_title.clone(),
            image: image.clone(),
        },
    ))
}

pub async fn random_image_handler(
    State(state): State<HtmlState>,
) -> Result<impl IntoResponse, HtmlError> {
    let Some(image) = state.library.random_image().await? else {
        return Ok(TemplateResponse::not_found());
    };

    Ok(TemplateResponse::redirect(format!("/image/{image}")))
}
