//! GroqProvider -- concrete [`CompletionProvider`] implementation for the
//! Groq chat completions API.
//!
//! Groq exposes an OpenAI-compatible endpoint (`/openai/v1`), so the
//! provider is built on [`async_openai`] with a Groq base URL: type-safe
//! request/response handling and built-in SSE streaming. Supports both
//! non-streaming (`complete`) and streaming (`stream`) modes.

pub mod streaming;

use std::pin::Pin;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionStreamOptions,
    CreateChatCompletionRequest, FinishReason,
};
use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use mindline_core::llm::provider::CompletionProvider;
use mindline_types::llm::{
    CompletionError, CompletionRequest, CompletionResponse, StopReason, StreamEvent, Usage,
};
use mindline_types::message::MessageRole;

use self::streaming::map_groq_stream;

/// Groq OpenAI-compatible API base URL.
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Groq completion provider.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`. The key arrives wrapped in
/// [`SecretString`] and is only exposed when building the client config.
pub struct GroqProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GroqProvider {
    /// Create a new Groq provider for the given model.
    pub fn new(api_key: &SecretString, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Create a provider against a non-default base URL (useful for
    /// proxies and tests).
    pub fn with_base_url(api_key: &SecretString, model: String, base_url: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(base_url);

        Self {
            client: Client::with_config(config),
            model,
        }
    }

    /// The configured default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic
    /// [`CompletionRequest`].
    fn build_request(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> CreateChatCompletionRequest {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        // Fixed instruction first
        if let Some(ref system) = request.system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.clone()),
                    name: None,
                },
            ));
        }

        // Conversation messages
        for msg in &request.messages {
            let wire_msg = match msg.role {
                MessageRole::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    let assistant = ChatCompletionRequestAssistantMessage {
                        content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        )),
                        refusal: None,
                        name: None,
                        audio: None,
                        tool_calls: None,
                        function_call: None,
                    };
                    ChatCompletionRequestMessage::Assistant(assistant)
                }
            };
            messages.push(wire_msg);
        }

        // Use the model from the request if set, otherwise fall back to the
        // configured default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let mut req = CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        };

        if stream {
            req.stream = Some(true);
            req.stream_options = Some(ChatCompletionStreamOptions {
                include_usage: Some(true),
                include_obfuscation: None,
            });
        }

        req
    }
}

// GroqProvider intentionally does NOT derive Debug to prevent accidental
// exposure of internal state including the API key inside the async-openai
// Client.

impl CompletionProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        let groq_request = self.build_request(request, false);

        let response = self
            .client
            .chat()
            .create(groq_request)
            .await
            .map_err(map_groq_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let stop_reason = response
            .choices
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .map(map_finish_reason)
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, CompletionError>> + Send + 'static>> {
        let groq_request = self.build_request(&request, true);

        // Clone the client for the 'static stream closure
        let client = self.client.clone();

        Box::pin(async_stream::try_stream! {
            let upstream = client
                .chat()
                .create_stream(groq_request)
                .await
                .map_err(map_groq_error)?;

            let mut inner = map_groq_stream(upstream);

            use futures_util::StreamExt;
            while let Some(event) = inner.next().await {
                match event {
                    Ok(ev) => yield ev,
                    Err(e) => Err(e)?,
                }
            }
        })
    }
}

/// Map an OpenAI-protocol finish reason onto [`StopReason`].
///
/// Tool and function finish reasons collapse to `EndTurn`: this client
/// never requests tools.
pub(crate) fn map_finish_reason(reason: &FinishReason) -> StopReason {
    match reason {
        FinishReason::Stop => StopReason::EndTurn,
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ToolCalls => StopReason::EndTurn,
        FinishReason::ContentFilter => StopReason::EndTurn,
        FinishReason::FunctionCall => StopReason::EndTurn,
    }
}

/// Map an `async_openai::error::OpenAIError` to a [`CompletionError`].
fn map_groq_error(err: async_openai::error::OpenAIError) -> CompletionError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Invalid API Key")
                || api_err.message.contains("Invalid API key")
            {
                CompletionError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                CompletionError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "context_length_exceeded"
                || api_err.message.contains("maximum context length")
            {
                CompletionError::ContextLengthExceeded
            } else if code == "server_error" || error_type == "overloaded_error" {
                CompletionError::Overloaded(api_err.message.clone())
            } else {
                CompletionError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if let Some(status) = reqwest_err.status() {
                match status.as_u16() {
                    401 => CompletionError::AuthenticationFailed,
                    429 => CompletionError::RateLimited {
                        retry_after_ms: None,
                    },
                    503 => CompletionError::Overloaded(err.to_string()),
                    _ => CompletionError::Provider {
                        message: err.to_string(),
                    },
                }
            } else {
                CompletionError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::JSONDeserialize(_, content) => {
            CompletionError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::StreamError(stream_err) => CompletionError::Stream(stream_err.to_string()),
        OpenAIError::InvalidArgument(msg) => CompletionError::InvalidRequest(msg.clone()),
        _ => CompletionError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindline_types::message::Message;

    fn test_provider() -> GroqProvider {
        let key = SecretString::from("gsk-test".to_string());
        GroqProvider::new(&key, "llama-3.3-70b-versatile".to_string())
    }

    #[test]
    fn test_provider_identity() {
        let provider = test_provider();
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.model(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_build_request_messages() {
        let provider = test_provider();
        let request = CompletionRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![
                Message::user("What is anxiety?"),
                Message::assistant("Anxiety is..."),
                Message::user("And depression?"),
            ],
            system: Some("Be empathetic".to_string()),
            max_tokens: 2048,
            temperature: Some(0.7),
            stream: false,
        };

        let wire = provider.build_request(&request, false);
        assert_eq!(wire.model, "llama-3.3-70b-versatile");
        // 1 system + 3 conversation = 4 messages
        assert_eq!(wire.messages.len(), 4);
        assert_eq!(wire.max_completion_tokens, Some(2048));
        assert!(wire.stream.is_none());
        assert!(wire.stream_options.is_none());
    }

    #[test]
    fn test_build_request_streaming() {
        let provider = test_provider();
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![Message::user("Hello")],
            system: None,
            max_tokens: 512,
            temperature: None,
            stream: true,
        };

        let wire = provider.build_request(&request, true);
        // Empty request model falls back to the configured default
        assert_eq!(wire.model, "llama-3.3-70b-versatile");
        assert_eq!(wire.stream, Some(true));
        let opts = wire.stream_options.unwrap();
        assert_eq!(opts.include_usage, Some(true));
    }

    #[test]
    fn test_map_finish_reason() {
        assert_eq!(map_finish_reason(&FinishReason::Stop), StopReason::EndTurn);
        assert_eq!(
            map_finish_reason(&FinishReason::Length),
            StopReason::MaxTokens
        );
        assert_eq!(
            map_finish_reason(&FinishReason::ToolCalls),
            StopReason::EndTurn
        );
    }

    #[test]
    fn test_map_groq_error_auth() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Invalid API Key".to_string(),
            r#type: Some("authentication_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_groq_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, CompletionError::AuthenticationFailed));
    }

    #[test]
    fn test_map_groq_error_rate_limit() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Rate limit reached".to_string(),
            r#type: Some("rate_limit_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_groq_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, CompletionError::RateLimited { .. }));
    }

    #[test]
    fn test_map_groq_error_invalid_argument() {
        use async_openai::error::OpenAIError;
        let err = map_groq_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, CompletionError::InvalidRequest(_)));
    }
}
