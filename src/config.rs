use anyhow::{Context, Result};
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// json dataset to load at startup; the built-in sample is used when unset
    pub dataset_path: Option<String>,
    pub default_threshold: f64,
    pub default_content_ratio: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("failed to parse PORT")?,
            dataset_path: env::var("DATASET_PATH").ok().filter(|p| !p.is_empty()),
            default_threshold: env::var("DEFAULT_THRESHOLD")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse()
                .context("failed to parse DEFAULT_THRESHOLD")?,
            default_content_ratio: env::var("DEFAULT_CONTENT_RATIO")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse()
                .context("failed to parse DEFAULT_CONTENT_RATIO")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            dataset_path: None,
            default_threshold: 0.7,
            default_content_ratio: 0.7,
        }
    }
}
