//! services/api/src/adapters/deepseek.rs
//!
//! This module contains the adapter for DeepSeek, the last vendor in the
//! fallback chain. DeepSeek speaks the OpenAI chat-completions dialect, so
//! the adapter reuses the `async-openai` client pointed at the DeepSeek API
//! base.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use coursecraft_core::ports::{GenerationProvider, GenerationRequest, PortError, PortResult};

const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";
const DEFAULT_SYSTEM: &str = "You are a helpful assistant.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationProvider` against the DeepSeek API.
#[derive(Clone)]
pub struct DeepSeekAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl DeepSeekAdapter {
    /// Creates a new `DeepSeekAdapter` with its own client, since the API
    /// base differs from the shared OpenAI client's.
    pub fn new(api_key: &str, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(DEEPSEEK_API_BASE);
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

//=========================================================================================
// `GenerationProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationProvider for DeepSeekAdapter {
    fn name(&self) -> &str {
        "deepseek"
    }

    async fn generate(&self, request: &GenerationRequest) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.as_deref().unwrap_or(DEFAULT_SYSTEM))
                .build()
                .map_err(|e| PortError::Provider(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.as_str())
                .build()
                .map_err(|e| PortError::Provider(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_output_tokens)
            .build()
            .map_err(|e| PortError::Provider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(format!("DeepSeek error: {e}")))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Provider(
                    "DeepSeek response contained no text content".to_string(),
                ))
            }
        } else {
            Err(PortError::Provider(
                "DeepSeek returned no choices in its response".to_string(),
            ))
        }
    }
}
