//! Prompt template table and server settings for aigtag.
//!
//! This crate provides the read-only configuration shared by the server:
//!
//! - [`TemplateStore`] — Immutable table of prompt templates, built once at startup
//! - [`PromptTemplate`] — A single template entry (id, file path, label)
//! - [`Settings`] — Environment-driven server settings
//! - [`LlmSettings`] — Credentials and model names for the remote API
//!
//! # Example
//!
//! ```rust
//! use aigtag_config::TemplateStore;
//!
//! let store = TemplateStore::builtin("prompts");
//! assert!(store.lookup("zhouyi").is_some());
//! assert!(store.lookup("not-a-real-id").is_none());
//! ```

mod settings;
mod templates;

pub use settings::{LlmSettings, Settings, DEFAULT_MAX_CONTENT_LENGTH};
pub use templates::{PromptTemplate, TemplateStore, VISION_TEMPLATE_FILE};

/// Errors that can occur when building configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// Two template entries share the same id.
    #[error("Duplicate template id: '{0}'")]
    DuplicateTemplate(String),
}

impl ConfigError {
    /// Creates an invalid-value error.
    pub fn invalid(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}
