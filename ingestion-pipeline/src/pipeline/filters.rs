use std::fmt;

use common::error::AppError;

use super::config::IngestionFilters;
use crate::types::SourceRecord;

/// Why a listed post never reached the download step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingFileUrl,
    Rating,
    Extension,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFileUrl => write!(f, "no file url"),
            Self::Rating => write!(f, "rating not accepted"),
            Self::Extension => write!(f, "unsupported file extension"),
        }
    }
}

impl IngestionFilters {
    /// Checks the listing metadata of `record` and hands back its file URL
    /// when the post may be downloaded.
    pub fn screen<'a>(&self, record: &'a SourceRecord) -> Result<&'a str, Rejection> {
        let Some(file_url) = record.file_url.as_deref().filter(|u| !u.is_empty()) else {
            return Err(Rejection::MissingFileUrl);
        };

        match &record.rating {
            Some(rating) if self.accepted_ratings.contains(rating) => {}
            _ => return Err(Rejection::Rating),
        }

        let allowed = file_extension(file_url).is_some_and(|ext| {
            self.allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        });
        if !allowed {
            return Err(Rejection::Extension);
        }

        Ok(file_url)
    }

    /// Inclusive check against the configured aspect ratio bounds.
    pub fn accepts_aspect_ratio(&self, ratio: f64) -> bool {
        ratio >= self.min_aspect_ratio && ratio <= self.max_aspect_ratio
    }
}

/// `width / height`, failing for images without a usable height.
pub fn aspect_ratio(width: u32, height: u32) -> Result<f64, AppError> {
    if width == 0 || height == 0 {
        return Err(AppError::Decode(format!(
            "image has invalid dimensions {width}x{height}"
        )));
    }
    Ok(f64::from(width) / f64::from(height))
}

/// Extension of the last path segment of `file_url`, lowercased.
pub fn file_extension(file_url: &str) -> Option<String> {
    let path = url::Url::parse(file_url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| file_url.to_string());

    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
