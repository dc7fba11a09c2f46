//! Chat-completion client for the aigtag prompt and image endpoints.
//!
//! - [`LlmClient`] — OpenAI-compatible client with text and image entry points
//! - [`image_data_url`] / [`image_subtype`] — MIME inference for inline images
//!
//! # Example
//!
//! ```rust,ignore
//! use aigtag_config::LlmSettings;
//! use aigtag_llm::LlmClient;
//!
//! let client = LlmClient::new(&LlmSettings::default());
//! let answer = client
//!     .invoke_text(Path::new("prompts/zhouyi.prompt"), "test", "deepseek-v3")
//!     .await?;
//! ```

mod client;
mod mime;

pub use client::{LlmClient, LlmError, SENTINEL_ANSWER, TEMPERATURE};
pub use mime::{image_data_url, image_subtype, DEFAULT_IMAGE_SUBTYPE};
