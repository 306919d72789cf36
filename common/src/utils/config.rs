use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_http_port", alias = "port")]
    pub http_port: u16,
    /// Public base URL used for links and OpenGraph metadata.
    #[serde(default, alias = "site")]
    pub site_url: Option<String>,
    #[serde(default = "default_site_title")]
    pub site_title: String,
    #[serde(default = "default_image_dir")]
    pub image_dir: String,
    #[serde(default = "default_processed_file")]
    pub processed_file: String,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    #[serde(default = "default_source_base_url")]
    pub source_base_url: String,
    #[serde(default = "default_source_tag")]
    pub source_tag: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            site_url: None,
            site_title: default_site_title(),
            image_dir: default_image_dir(),
            processed_file: default_processed_file(),
            public_dir: default_public_dir(),
            source_base_url: default_source_base_url(),
            source_tag: default_source_tag(),
        }
    }
}

impl AppConfig {
    /// The configured site URL, or `http://localhost:<port>` when unset.
    pub fn site_url(&self) -> String {
        match self.site_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://localhost:{}", self.http_port),
        }
    }

    pub fn image_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.image_dir)
    }

    pub fn processed_file_path(&self) -> PathBuf {
        PathBuf::from(&self.processed_file)
    }

    pub fn public_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.public_dir)
    }
}

const fn default_http_port() -> u16 {
    4000
}

fn default_site_title() -> String {
    "Shiggy".to_string()
}

fn default_image_dir() -> String {
    "./posts".to_string()
}

fn default_processed_file() -> String {
    "./checked.json".to_string()
}

fn default_public_dir() -> String {
    "./public".to_string()
}

fn default_source_base_url() -> String {
    "https://danbooru.donmai.us".to_string()
}

fn default_source_tag() -> String {
    "kemomimi-chan_(naga_u)".to_string()
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http_port, 4000);
        assert_eq!(config.site_url(), "http://localhost:4000");
        assert_eq!(config.image_dir_path(), PathBuf::from("./posts"));
        assert_eq!(config.processed_file_path(), PathBuf::from("./checked.json"));
    }

    #[test]
    fn test_site_url_follows_port_and_override() {
        let mut config = AppConfig {
            http_port: 8080,
            ..Default::default()
        };
        assert_eq!(config.site_url(), "http://localhost:8080");

        config.site_url = Some("https://shiggy.example.com/".into());
        assert_eq!(config.site_url(), "https://shiggy.example.com");

        config.site_url = Some("   ".into());
        assert_eq!(config.site_url(), "http://localhost:8080");
    }

    #[test]
    fn test_deserialize_accepts_legacy_aliases() {
        let config: AppConfig = Config::builder()
            .set_override("port", 5000)
            .expect("override port")
            .set_override("site", "https://example.org")
            .expect("override site")
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("config should deserialize");

        assert_eq!(config.http_port, 5000);
        assert_eq!(config.site_url(), "https://example.org");
        assert_eq!(config.source_tag, "kemomimi-chan_(naga_u)");
    }
}
