//! Application configuration. AI credentials, paths, limits.

use crate::usecases::DEFAULT_MAX_IMAGE_BYTES;
use serde::Deserialize;
use std::path::PathBuf;

/// File inside `data_dir` that holds the staged bill.
pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory for the local storage file. Read from BILL_SPLIT_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Largest accepted receipt photo in bytes. Read from BILL_SPLIT_MAX_IMAGE_BYTES.
    #[serde(default)]
    pub max_image_bytes: Option<usize>,

    // ─────────────────────────────────────────────────────────────────────────
    // AI Extraction Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// AI API key (e.g., OpenAI). Read from BILL_SPLIT_AI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// AI API URL. Defaults to OpenAI. Read from BILL_SPLIT_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// Vision model name. Defaults to "gpt-4o-mini". Read from BILL_SPLIT_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("BILL_SPLIT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        // Environment wins over the file.
        c = c.add_source(config::Environment::with_prefix("BILL_SPLIT"));
        c.build()?.try_deserialize()
    }

    /// Returns the data directory. Defaults to "./data".
    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    /// Path of the JSON file holding the staged bill.
    pub fn local_storage_path(&self) -> PathBuf {
        self.data_dir_or_default().join(LOCAL_STORAGE_FILE)
    }

    /// Returns the image size limit. Defaults to 10 MiB.
    pub fn max_image_bytes_or_default(&self) -> usize {
        self.max_image_bytes.unwrap_or(DEFAULT_MAX_IMAGE_BYTES)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AI Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the AI API key if configured and non-empty.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key.clone().filter(|k| !k.trim().is_empty())
    }

    /// Returns the AI API URL. Defaults to OpenAI chat completions endpoint.
    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    /// Returns the AI model name. Defaults to "gpt-4o-mini".
    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    /// Returns true if AI is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.local_storage_path(), PathBuf::from("./data/local_storage.json"));
        assert_eq!(cfg.max_image_bytes_or_default(), DEFAULT_MAX_IMAGE_BYTES);
        assert_eq!(
            cfg.ai_api_url_or_default(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(cfg.ai_model_or_default(), "gpt-4o-mini");
        assert!(!cfg.is_ai_configured());
    }

    #[test]
    fn test_blank_api_key_is_not_configured() {
        let cfg = AppConfig {
            ai_api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(!cfg.is_ai_configured());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bill-split.toml");
        std::fs::write(
            &path,
            "data_dir = \"/tmp/bills\"\nai_model = \"llava\"\nmax_image_bytes = 2048\n",
        )
        .unwrap();

        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.data_dir_or_default(), PathBuf::from("/tmp/bills"));
        assert_eq!(cfg.ai_model_or_default(), "llava");
        assert_eq!(cfg.max_image_bytes_or_default(), 2048);
    }
}
