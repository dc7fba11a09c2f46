//! Environment-driven server settings.

use std::path::PathBuf;

use tracing::warn;

use crate::ConfigError;

/// Default request body ceiling (16 MiB).
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 16 * 1024 * 1024;

const DEFAULT_API_BASE: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5008";
const DEFAULT_UPLOAD_DIR: &str = "temp_uploads";
const DEFAULT_PROMPT_DIR: &str = "prompts";
const DEFAULT_TEXT_MODEL: &str = "deepseek-v3";
const DEFAULT_VISION_MODEL: &str = "qwen-vl-max-latest";

/// Connection details and model names for the remote chat-completion API.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub api_base: String,
    /// Model used for text prompts.
    pub text_model: String,
    /// Model used for image prompts.
    pub vision_model: String,
}

impl LlmSettings {
    /// Whether a non-blank API key is configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
        }
    }
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    /// Origins allowed for cross-origin requests.
    pub allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub prompt_dir: PathBuf,
    /// Largest accepted request body, in bytes.
    pub max_content_length: u64,
    pub llm: LlmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            prompt_dir: PathBuf::from(DEFAULT_PROMPT_DIR),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            llm: LlmSettings::default(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_content_length = match get("MAX_CONTENT_LENGTH") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::invalid("MAX_CONTENT_LENGTH", raw))?,
            None => defaults.max_content_length,
        };

        let llm = LlmSettings {
            api_key: get("API_KEY_QWEN").unwrap_or_default(),
            api_base: get("URL_QWEN").unwrap_or(defaults.llm.api_base),
            text_model: get("TEXT_MODEL").unwrap_or(defaults.llm.text_model),
            vision_model: get("VISION_MODEL").unwrap_or(defaults.llm.vision_model),
        };
        if !llm.has_api_key() {
            warn!("API_KEY_QWEN is not set; remote calls will be rejected");
        }

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.allowed_origins),
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            prompt_dir: get("PROMPT_DIR").map(PathBuf::from).unwrap_or(defaults.prompt_dir),
            max_content_length,
            llm,
        })
    }
}

/// Splits a comma-separated origin list, dropping blank entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:5008");
        assert_eq!(settings.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(settings.upload_dir, PathBuf::from("temp_uploads"));
        assert_eq!(settings.max_content_length, 16 * 1024 * 1024);
        assert_eq!(settings.llm.text_model, "deepseek-v3");
        assert_eq!(settings.llm.vision_model, "qwen-vl-max-latest");
        assert!(settings.llm.api_key.is_empty());
        assert!(!settings.llm.has_api_key());
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let settings = Settings::from_lookup(lookup_from(&[("API_KEY_QWEN", "   ")])).unwrap();
        assert!(settings.llm.api_key.is_empty());
        assert!(!settings.llm.has_api_key());

        let settings = Settings::from_lookup(lookup_from(&[("API_KEY_QWEN", "sk-test")])).unwrap();
        assert!(settings.llm.has_api_key());
    }

    #[test]
    fn reads_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("API_KEY_QWEN", "sk-test"),
            ("URL_QWEN", "http://localhost:9000/v1"),
            ("ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
            ("MAX_CONTENT_LENGTH", "1024"),
            ("PROMPT_DIR", "/etc/aigtag/prompts"),
        ]))
        .unwrap();

        assert_eq!(settings.llm.api_key, "sk-test");
        assert_eq!(settings.llm.api_base, "http://localhost:9000/v1");
        assert_eq!(
            settings.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(settings.max_content_length, 1024);
        assert_eq!(settings.prompt_dir, PathBuf::from("/etc/aigtag/prompts"));
    }

    #[test]
    fn rejects_non_numeric_content_length() {
        let err = Settings::from_lookup(lookup_from(&[("MAX_CONTENT_LENGTH", "16MB")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "MAX_CONTENT_LENGTH"));
    }
}
