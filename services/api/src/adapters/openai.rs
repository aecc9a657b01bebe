//! services/api/src/adapters/openai.rs
//!
//! This module contains the adapter for OpenAI's chat-completions API, the
//! first fallback vendor. It implements the `GenerationProvider` port from
//! the `core` crate.

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

const DEFAULT_SYSTEM: &str = "You are a helpful assistant.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationProvider` using the OpenAI API.
#[derive(Clone)]
pub struct OpenAiAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAdapter {
    /// Creates a new `OpenAiAdapter` around a shared client.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `GenerationProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationProvider for OpenAiAdapter {
    fn name(&self) -> &str {
        "openai"
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
            .map_err(|e: OpenAIError| PortError::Provider(format!("OpenAI error: {e}")))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::Provider("OpenAI returned no message content".to_string()))
    }
}
