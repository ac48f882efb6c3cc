//! OpenAI Provider - Implementation of AIProvider for the OpenAI chat API.
//!
//! Talks to either the public OpenAI API or an Azure OpenAI resource. When an
//! `api_version` is configured the Azure deployment URL scheme and `api-key`
//! header are used; otherwise requests go to `{endpoint}/chat/completions`
//! with `Bearer` auth.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key, "https://my-resource.openai.azure.com")
//!     .with_model("gpt-4o-mini")
//!     .with_api_version("2024-02-15-preview");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Structured output
//!
//! A `structured_schema` on the request is sent as a single function tool with
//! `tool_choice: "auto"`, so the model may answer in free text or call it.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::Instrument;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, FunctionSchema,
    MessageRole, ProviderInfo, StructuredCall, TokenUsage,
};

/// Connection settings shared by the chat and embedding clients.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL (e.g. https://api.openai.com/v1 or an Azure resource URL).
    pub endpoint: String,
    /// Model name, or deployment name on Azure.
    pub model: String,
    /// Azure API version; `None` selects plain OpenAI.
    pub api_version: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key and endpoint.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            endpoint: endpoint.into(),
            model: "gpt-4o-mini".to_string(),
            api_version: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the model (or Azure deployment).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Switches to Azure OpenAI with the given API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when targeting Azure OpenAI.
    pub fn is_azure(&self) -> bool {
        self.api_version.is_some()
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    pub(crate) fn timeout_secs(&self) -> u32 {
        u32::try_from(self.timeout.as_secs()).unwrap_or(u32::MAX)
    }

    /// Builds the URL for an operation such as `chat/completions` or `embeddings`.
    pub(crate) fn operation_url(&self, operation: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        match &self.api_version {
            Some(version) => format!(
                "{}/openai/deployments/{}/{}?api-version={}",
                base, self.model, operation, version
            ),
            None => format!("{}/{}", base, operation),
        }
    }

    /// Adds the auth header matching the configured flavor.
    pub(crate) fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.is_azure() {
            builder.header("api-key", self.api_key())
        } else {
            builder.header("Authorization", format!("Bearer {}", self.api_key()))
        }
    }

    /// Builds an HTTP client honoring the configured timeout.
    pub(crate) fn http_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder().timeout(self.timeout).build()
    }
}

/// OpenAI chat completion provider.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new OpenAI provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = config
            .http_client()
            .map_err(|e| AIError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Converts our request to OpenAI's format.
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref prompt) = request.system_prompt {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: prompt.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(OpenAIMessage {
                role: match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            });
        }

        let tools = request
            .structured_schema
            .as_ref()
            .map(|schema| vec![OpenAITool::function(schema)]);
        let tool_choice = tools.as_ref().map(|_| "auto".to_string());

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools,
            tool_choice,
        }
    }

    /// Sends a request and maps transport failures.
    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let openai_request = self.to_openai_request(request);

        self.config
            .authorize(self.client.post(self.config.operation_url("chat/completions")))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout_secs(),
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), &error_body))
    }

    /// Parses a completion response body.
    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let response = self.handle_response_status(response).await?;

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        into_completion(openai_response)
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let span = tracing::debug_span!(
            "chat_completion",
            trace_id = %request.metadata.trace_id,
            model = %self.config.model,
        );
        async {
            let response = self.send_request(&request).await?;
            self.parse_response(response).await
        }
        .instrument(span)
        .await
    }

    fn provider_info(&self) -> ProviderInfo {
        let name = if self.config.is_azure() {
            "azure-openai"
        } else {
            "openai"
        };
        ProviderInfo::new(name, &self.config.model)
    }
}

/// Maps a non-success HTTP status to an `AIError`.
fn classify_status(status: u16, error_body: &str) -> AIError {
    match status {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_after(error_body)),
        400 => {
            if error_body.contains("maximum context length")
                || error_body.contains("context_length_exceeded")
            {
                AIError::ContextTooLong
            } else if error_body.contains("content_filter") {
                AIError::content_filtered(error_body)
            } else {
                AIError::InvalidRequest(error_body.to_string())
            }
        }
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, error_body)),
        _ => AIError::network(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Parses retry-after from an error body, defaulting to 30 seconds.
pub(crate) fn parse_retry_after(error_body: &str) -> u32 {
    let message = serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|parsed| {
            parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        });

    if let Some(msg) = message {
        if let Some(idx) = msg.find("try again in ") {
            let rest = &msg[idx + 13..];
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(secs) = digits.parse::<u32>() {
                return secs;
            }
        }
    }
    30
}

fn into_completion(openai_response: OpenAIResponse) -> Result<CompletionResponse, AIError> {
    let choice = openai_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AIError::parse("No choices in response"))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        Some("tool_calls") | Some("function_call") => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    };

    let message = choice.message;
    let structured_call = message
        .tool_calls
        .into_iter()
        .flatten()
        .map(|call| call.function)
        .next()
        .or(message.function_call)
        .map(|f| StructuredCall {
            name: f.name,
            arguments: f.arguments,
        });

    let usage = openai_response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(CompletionResponse {
        content: message.content.filter(|text| !text.is_empty()),
        structured_call,
        usage,
        model: openai_response.model.unwrap_or_default(),
        finish_reason,
    })
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAIFunctionDef,
}

impl OpenAITool {
    fn function(schema: &FunctionSchema) -> Self {
        Self {
            kind: "function",
            function: OpenAIFunctionDef {
                name: schema.name.clone(),
                description: schema.description.clone(),
                parameters: schema.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: Option<String>,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
    /// Legacy single function call field.
    function_call: Option<OpenAIFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    function: OpenAIFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Message, RequestMetadata};
    use serde_json::json;

    fn provider(config: OpenAIConfig) -> OpenAIProvider {
        OpenAIProvider::new(config).unwrap()
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAIConfig::new("test-key", "https://custom.api.com")
            .with_model("gpt-4o")
            .with_api_version("2024-02-15-preview")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.endpoint, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.is_azure());
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn openai_url_appends_operation() {
        let config = OpenAIConfig::new("k", "https://api.openai.com/v1/");
        assert_eq!(
            config.operation_url("chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn azure_url_uses_deployment_and_version() {
        let config = OpenAIConfig::new("k", "https://res.openai.azure.com")
            .with_model("gpt-4o-mini")
            .with_api_version("2024-02-15-preview");
        assert_eq!(
            config.operation_url("embeddings"),
            "https://res.openai.azure.com/openai/deployments/gpt-4o-mini/embeddings?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn request_includes_system_prompt_and_tool() {
        let provider = provider(OpenAIConfig::new("k", "https://api.openai.com/v1"));
        let request = CompletionRequest::new(RequestMetadata::new("t"))
            .with_system_prompt("collect fields")
            .with_messages([Message::user("hi"), Message::assistant("hello")])
            .with_temperature(0.7)
            .with_max_tokens(1500)
            .with_structured_schema(FunctionSchema::new("f", "desc", json!({"type": "object"})));

        let body = serde_json::to_value(provider.to_openai_request(&request)).unwrap();

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "collect fields");
        assert_eq!(body["messages"][2]["role"], "assistant");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "f");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["max_tokens"], 1500);
    }

    #[test]
    fn request_without_schema_omits_tools() {
        let provider = provider(OpenAIConfig::new("k", "https://api.openai.com/v1"));
        let request =
            CompletionRequest::new(RequestMetadata::new("t")).with_message(MessageRole::User, "q");

        let body = serde_json::to_value(provider.to_openai_request(&request)).unwrap();

        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn parses_text_response() {
        let raw: OpenAIResponse = serde_json::from_value(json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": "שלום"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }))
        .unwrap();

        let response = into_completion(raw).unwrap();

        assert_eq!(response.content.as_deref(), Some("שלום"));
        assert!(response.structured_call.is_none());
        assert_eq!(response.usage.total_tokens, 15);
    }

    #[test]
    fn parses_tool_call_response() {
        let raw: OpenAIResponse = serde_json::from_value(json!({
            "model": "gpt-4o-mini",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "complete_data_collection", "arguments": "{\"name\":\"x\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let response = into_completion(raw).unwrap();

        let call = response.structured_call.unwrap();
        assert_eq!(call.name, "complete_data_collection");
        assert_eq!(call.arguments, "{\"name\":\"x\"}");
        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert!(response.content.is_none());
    }

    #[test]
    fn parses_legacy_function_call() {
        let raw: OpenAIResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {"function_call": {"name": "f", "arguments": "{}"}},
                "finish_reason": "function_call"
            }]
        }))
        .unwrap();

        let response = into_completion(raw).unwrap();
        assert_eq!(response.structured_call.unwrap().name, "f");
    }

    #[test]
    fn empty_choices_is_parse_error() {
        let raw: OpenAIResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(into_completion(raw), Err(AIError::Parse(_))));
    }

    #[test]
    fn classifies_error_statuses() {
        assert_eq!(classify_status(401, ""), AIError::AuthenticationFailed);
        assert_eq!(classify_status(429, ""), AIError::rate_limited(30));
        assert_eq!(
            classify_status(400, "context_length_exceeded"),
            AIError::ContextTooLong
        );
        assert!(matches!(classify_status(503, "busy"), AIError::Unavailable { .. }));
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Rate limit exceeded. Please try again in 20s."}}"#;
        assert_eq!(parse_retry_after(error), 20);
    }

    #[test]
    fn parse_retry_after_default() {
        let error = r#"{"error":{"message":"Something went wrong"}}"#;
        assert_eq!(parse_retry_after(error), 30);
    }

    #[test]
    fn provider_info_reflects_flavor() {
        let openai = provider(OpenAIConfig::new("k", "https://api.openai.com/v1"));
        let azure = provider(
            OpenAIConfig::new("k", "https://res.openai.azure.com").with_api_version("2024-02-15-preview"),
        );

        assert_eq!(openai.provider_info().name, "openai");
        assert_eq!(azure.provider_info().name, "azure-openai");
        assert_eq!(azure.provider_info().model, "gpt-4o-mini");
    }
}
