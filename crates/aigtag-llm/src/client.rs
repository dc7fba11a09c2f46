//! OpenAI-compatible chat client for text and image prompts.
//!
//! Remote failures are not errors here: they are logged and replaced by
//! [`SENTINEL_ANSWER`]. Only local problems (unreadable template, request
//! that cannot be built) surface as [`LlmError`].

use std::path::Path;
use std::time::{Duration, Instant};

use aigtag_config::LlmSettings;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestSystemMessageContentPart,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageUrlArgs,
        ResponseFormat,
    },
    Client,
};
use tracing::{debug, info, warn};

use crate::mime::image_data_url;

/// Answer returned in place of the model output when the remote call fails.
pub const SENTINEL_ANSWER: &str = "敏感词censored by QWEN";

/// Sampling temperature for every request.
pub const TEMPERATURE: f32 = 0.6;

/// Local errors raised while preparing a model call.
#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    /// The template file could not be read.
    #[error("Failed to read template '{path}': {source}")]
    Template {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The request could not be assembled.
    #[error("Failed to build request: {0}")]
    Request(String),
}

fn request_err(e: OpenAIError) -> LlmError {
    LlmError::Request(e.to_string())
}

/// Reads a template file as the system instruction.
async fn read_template(path: &Path) -> Result<String, LlmError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LlmError::Template {
            path: path.display().to_string(),
            source,
        })?;
    debug!("Template {} loaded ({} chars)", path.display(), content.chars().count());
    Ok(content)
}

/// Builds a system + user request with plain text content.
fn text_request(
    model: &str,
    system_prompt: &str,
    user_input: &str,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let messages = vec![
        ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()?,
        ),
        ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()?,
        ),
    ];

    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .stream(false)
        .temperature(TEMPERATURE)
        .build()
}

/// Builds a request whose user turn is a single inline image, asking for JSON output.
fn image_request(
    model: &str,
    system_prompt: &str,
    data_url: String,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let system_part = ChatCompletionRequestMessageContentPartTextArgs::default()
        .text(system_prompt)
        .build()?;
    let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
        .image_url(ImageUrlArgs::default().url(data_url).build()?)
        .build()?;

    let messages = vec![
        ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(ChatCompletionRequestSystemMessageContent::Array(vec![
                    ChatCompletionRequestSystemMessageContentPart::Text(system_part),
                ]))
                .build()?,
        ),
        ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(vec![
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(image_part),
                ]))
                .build()?,
        ),
    ];

    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .response_format(ResponseFormat::JsonObject)
        .stream(false)
        .temperature(TEMPERATURE)
        .build()
}

/// Extracts the first choice's content from a completion response.
fn extract_content(response: CreateChatCompletionResponse, elapsed_ms: u64) -> Option<String> {
    let (input_tokens, output_tokens) = response
        .usage
        .as_ref()
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((0, 0));

    info!(
        "LLM: {}ms, tokens: {}/{} (in/out)",
        elapsed_ms, input_tokens, output_tokens
    );

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
}

/// Client for the remote chat-completion API.
pub struct LlmClient {
    client: Client<OpenAIConfig>,
}

impl LlmClient {
    /// Creates a client for the configured endpoint. Failed calls are not retried.
    pub fn new(settings: &LlmSettings) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(&settings.api_base)
            .with_api_key(&settings.api_key);

        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Self {
            client: Client::with_config(config).with_backoff(no_retry),
        }
    }

    /// Answers `user_input` using the template at `template_path` as system prompt.
    pub async fn invoke_text(
        &self,
        template_path: &Path,
        user_input: &str,
        model: &str,
    ) -> Result<String, LlmError> {
        let system_prompt = read_template(template_path).await?;
        let request = text_request(model, &system_prompt, user_input).map_err(request_err)?;

        info!("Invoking {} with text prompt", model);
        Ok(self.complete(request).await)
    }

    /// Describes an image using the template at `template_path`; the answer is expected to be JSON.
    pub async fn invoke_image(
        &self,
        image_bytes: &[u8],
        file_extension: &str,
        template_path: &Path,
        model: &str,
    ) -> Result<String, LlmError> {
        let system_prompt = read_template(template_path).await?;
        let data_url = image_data_url(image_bytes, file_extension);
        let request = image_request(model, &system_prompt, data_url).map_err(request_err)?;

        info!(
            "Invoking {} with image ({} bytes, .{})",
            model,
            image_bytes.len(),
            file_extension
        );
        Ok(self.complete(request).await)
    }

    /// Sends one completion request, substituting the sentinel on any remote failure.
    async fn complete(&self, request: CreateChatCompletionRequest) -> String {
        let start = Instant::now();
        match self.client.chat().create(request).await {
            Ok(response) => extract_content(response, start.elapsed().as_millis() as u64)
                .unwrap_or_else(|| {
                    warn!("LLM response had no content");
                    SENTINEL_ANSWER.to_string()
                }),
            Err(e) => {
                warn!("LLM request failed: {}", e);
                SENTINEL_ANSWER.to_string()
            }
        }
    }
}
