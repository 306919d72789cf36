use crate::types::Rating;

/// Acceptance rules applied to every listed post and downloaded image.
#[derive(Debug, Clone)]
pub struct IngestionFilters {
    pub accepted_ratings: Vec<Rating>,
    /// Lowercase file extensions, without the dot.
    pub allowed_extensions: Vec<String>,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
}

impl Default for IngestionFilters {
    fn default() -> Self {
        Self {
            accepted_ratings: vec![Rating::General, Rating::Sensitive],
            allowed_extensions: ["png", "jpg", "jpeg", "webp", "gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_aspect_ratio: 0.96,
            max_aspect_ratio: 1.04,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestionConfig {
    pub filters: IngestionFilters,
}
