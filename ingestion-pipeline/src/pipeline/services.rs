use async_trait::async_trait;
use bytes::Bytes;
use common::{error::AppError, utils::config::AppConfig};
use tracing::debug;
use url::Url;

use crate::types::SourceRecord;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Network access used by the pipeline.
#[async_trait]
pub trait PipelineServices: Send + Sync {
    /// One listing page of posts for the configured tag. An empty vector
    /// means the listing is exhausted.
    async fn fetch_page(&self, page: u32) -> Result<Vec<SourceRecord>, AppError>;

    /// Full body of the resource at `url`.
    async fn download(&self, url: &str) -> Result<Bytes, AppError>;
}

pub struct DefaultPipelineServices {
    client: reqwest::Client,
    listing_url: Url,
    tag: String,
}

impl DefaultPipelineServices {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {e}")))?;

        Self::with_client(client, &config.source_base_url, &config.source_tag)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        tag: &str,
    ) -> Result<Self, AppError> {
        let mut base = Url::parse(base_url).map_err(|e| {
            AppError::InternalError(format!("Invalid source base url {base_url}: {e}"))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let listing_url = base.join("posts.json").map_err(|e| {
            AppError::InternalError(format!("Invalid source base url {base_url}: {e}"))
        })?;

        Ok(Self {
            client,
            listing_url,
            tag: tag.to_string(),
        })
    }

    /// `posts.json?tags=<tag>&page=<page>` under the configured base URL.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.listing_url.clone();
        url.query_pairs_mut()
            .append_pair("tags", &self.tag)
            .append_pair("page", &page.to_string());
        url
    }
}

#[async_trait]
impl PipelineServices for DefaultPipelineServices {
    async fn fetch_page(&self, page: u32) -> Result<Vec<SourceRecord>, AppError> {
        let url = self.page_url(page);
        debug!(%url, page, "Fetching listing page");

        self.client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| AppError::FetchPage { page, source })?
            .json::<Vec<SourceRecord>>()
            .await
            .map_err(|source| AppError::FetchPage { page, source })
    }

    async fn download(&self, url: &str) -> Result<Bytes, AppError> {
        let fetch_error = |source| AppError::Fetch {
            url: url.to_string(),
            source,
        };

        self.client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?
            .bytes()
            .await
            .map_err(fetch_error)
    }
}
