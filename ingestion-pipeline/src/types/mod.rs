use serde::{Deserialize, Serialize};

/// Content classification attached to every post by the image board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rating {
    General,
    Sensitive,
    Questionable,
    Explicit,
    Other(String),
}

impl Rating {
    pub fn as_str(&self) -> &str {
        match self {
            Self::General => "g",
            Self::Sensitive => "s",
            Self::Questionable => "q",
            Self::Explicit => "e",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for Rating {
    fn from(code: String) -> Self {
        match code.as_str() {
            "g" | "general" => Self::General,
            "s" | "sensitive" => Self::Sensitive,
            "q" | "questionable" => Self::Questionable,
            "e" | "explicit" => Self::Explicit,
            _ => Self::Other(code),
        }
    }
}

impl From<Rating> for String {
    fn from(rating: Rating) -> Self {
        rating.as_str().to_string()
    }
}

/// One post from a `posts.json` listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: u64,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default, alias = "width")]
    pub image_width: Option<u32>,
    #[serde(default, alias = "height")]
    pub image_height: Option<u32>,
}
