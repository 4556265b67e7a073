//! Client for OpenAI-compatible `/chat/completions` endpoints (OpenAI, OpenRouter, ...)

use crate::ai::types::{AiError, AiResponse, ToolCall, ToolResponse};
use crate::ai::Message;
use crate::tools::ToolDefinition;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Retry configuration for transient errors
const MAX_RETRIES: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(crate::config::DEFAULT_OPENAI_RETRY_BASE_MS);

const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    auth_headers: header::HeaderMap,
    endpoint: String,
    model: String,
    max_tokens: u32,
    retry_base_delay: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: OpenAIFunctionCall,
}

/// Function name plus its arguments as a JSON-encoded string
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIToolFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIToolFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: OpenAIMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

impl OpenAIClient {
    /// `api_base` is the provider root, e.g. `https://openrouter.ai/api/v1`
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Result<Self, String> {
        let mut auth_headers = header::HeaderMap::new();
        auth_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if !api_key.is_empty() {
            let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?;
            auth_headers.insert(header::AUTHORIZATION, auth_value);
        }

        Ok(Self {
            client: crate::http::shared_client().clone(),
            auth_headers,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            model: model.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            retry_base_delay: BASE_DELAY,
        })
    }

    /// Delay before the first retry. Later retries double it.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, AiError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.into_iter().map(Self::to_openai_message).collect(),
            max_tokens: self.max_tokens,
            tools: None,
            tool_choice: None,
        };

        let response = self.send_with_retry(&request).await?;
        let content = into_ai_response(response)?.content;
        if content.is_empty() {
            return Err(AiError::new("OpenAI API returned no content"));
        }
        Ok(content)
    }

    /// Generate a response with tool support.
    ///
    /// `tool_messages` are the assistant/tool message pairs from earlier rounds,
    /// appended after the conversation messages.
    pub async fn generate_with_tools(
        &self,
        messages: Vec<Message>,
        tool_messages: Vec<OpenAIMessage>,
        tools: Vec<ToolDefinition>,
    ) -> Result<AiResponse, AiError> {
        let mut api_messages: Vec<OpenAIMessage> =
            messages.into_iter().map(Self::to_openai_message).collect();
        api_messages.extend(tool_messages);

        let openai_tools: Vec<OpenAITool> = tools
            .into_iter()
            .map(|t| OpenAITool {
                tool_type: "function".to_string(),
                function: OpenAIToolFunction {
                    name: t.name,
                    description: t.description,
                    parameters: serde_json::to_value(t.input_schema).unwrap_or_default(),
                },
            })
            .collect();

        let has_tools = !openai_tools.is_empty();
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: api_messages,
            max_tokens: self.max_tokens,
            tools: if has_tools { Some(openai_tools) } else { None },
            tool_choice: if has_tools { Some("auto".to_string()) } else { None },
        };

        log::debug!(
            "Sending tool request to OpenAI API: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        let response = self.send_with_retry(&request).await?;
        into_ai_response(response)
    }

    /// Build the assistant + tool messages that continue a conversation after tool execution
    pub fn build_tool_result_messages(
        tool_calls: &[ToolCall],
        tool_responses: &[ToolResponse],
    ) -> Vec<OpenAIMessage> {
        let mut messages = Vec::with_capacity(tool_responses.len() + 1);

        messages.push(OpenAIMessage {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(
                tool_calls
                    .iter()
                    .map(|tc| OpenAIToolCall {
                        id: tc.id.clone(),
                        call_type: function_type(),
                        function: OpenAIFunctionCall {
                            name: tc.name.clone(),
                            arguments: tc.arguments.to_string(),
                        },
                    })
                    .collect(),
            ),
            tool_call_id: None,
        });

        for tr in tool_responses {
            messages.push(OpenAIMessage {
                role: "tool".to_string(),
                content: Some(tr.content.clone()),
                tool_calls: None,
                tool_call_id: Some(tr.tool_call_id.clone()),
            });
        }

        messages
    }

    fn to_openai_message(message: Message) -> OpenAIMessage {
        OpenAIMessage {
            role: message.role.to_string(),
            content: Some(message.content),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    async fn send_with_retry(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, AiError> {
        let mut last_error: Option<AiError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_base_delay * (1 << (attempt - 1));
                log::warn!(
                    "[OPENAI] Retry attempt {}/{} after {}ms delay",
                    attempt,
                    MAX_RETRIES,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&self.endpoint)
                .headers(self.auth_headers.clone())
                .json(request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("[OPENAI] Request failed (attempt {}): {}", attempt + 1, e);
                    last_error = Some(AiError::new(format!("OpenAI API request failed: {}", e)));
                    continue;
                }
            };

            let status = response.status();
            let status_code = status.as_u16();

            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();

                if is_retryable_status(status_code) && attempt < MAX_RETRIES {
                    log::warn!(
                        "[OPENAI] Received retryable status {} (attempt {}), will retry",
                        status,
                        attempt + 1
                    );
                    last_error = Some(AiError::with_status(
                        format!("HTTP {}: {}", status, error_text),
                        status_code,
                    ));
                    continue;
                }

                let error_msg = match serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                    Ok(error_response) => format!("OpenAI API error: {}", error_response.error.message),
                    Err(_) => format!("OpenAI API returned error status: {}, body: {}", status, error_text),
                };
                return Err(AiError::with_status(error_msg, status_code));
            }

            return response
                .json::<ChatCompletionResponse>()
                .await
                .map_err(|e| AiError::new(format!("Failed to parse OpenAI response: {}", e)));
        }

        Err(last_error.unwrap_or_else(|| AiError::new("Max retries exceeded")))
    }
}

fn is_retryable_status(status_code: u16) -> bool {
    matches!(status_code, 429 | 502 | 503 | 504)
}

fn into_ai_response(response: ChatCompletionResponse) -> Result<AiResponse, AiError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AiError::new("OpenAI API returned no choices"))?;

    let tool_calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| {
            let arguments = if tc.function.arguments.trim().is_empty() {
                Value::Object(Default::default())
            } else {
                serde_json::from_str(&tc.function.arguments).unwrap_or_else(|e| {
                    log::warn!(
                        "[OPENAI] Tool call {} has non-JSON arguments: {}",
                        tc.function.name,
                        e
                    );
                    Value::String(tc.function.arguments.clone())
                })
            };
            ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments,
            }
        })
        .collect();

    Ok(AiResponse {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
        stop_reason: choice.finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MessageRole;
    use actix_web::dev::ServerHandle;
    use actix_web::http::StatusCode;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted `/chat/completions` endpoint that counts its hits
    struct StubProvider {
        hits: AtomicUsize,
        replies: Mutex<VecDeque<(u16, Value)>>,
    }

    async fn stub_completions(stub: web::Data<StubProvider>) -> HttpResponse {
        stub.hits.fetch_add(1, Ordering::SeqCst);
        let (status, body) = stub
            .replies
            .lock()
            .pop_front()
            .unwrap_or((500, json!({"error": {"message": "no reply scripted"}})));
        HttpResponse::build(StatusCode::from_u16(status).unwrap()).json(body)
    }

    fn completion(text: &str) -> Value {
        json!({
            "choices": [{
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }]
        })
    }

    /// Serves `replies` in order on an ephemeral local port
    fn start_stub(replies: Vec<(u16, Value)>) -> (OpenAIClient, web::Data<StubProvider>, ServerHandle) {
        let stub = web::Data::new(StubProvider {
            hits: AtomicUsize::new(0),
            replies: Mutex::new(replies.into()),
        });
        let data = stub.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/v1/chat/completions", web::post().to(stub_completions))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let client = OpenAIClient::new("key", &format!("http://{}/v1", addr), "stub-model")
            .unwrap()
            .with_retry_delay(Duration::from_millis(1));
        (client, stub, handle)
    }

    fn ask() -> Vec<Message> {
        vec![Message {
            role: MessageRole::User,
            content: "hi".to_string(),
        }]
    }

    #[actix_web::test]
    async fn test_unavailable_provider_is_retried() {
        let unavailable = json!({"error": {"message": "overloaded"}});
        let (client, stub, handle) = start_stub(vec![
            (503, unavailable.clone()),
            (503, unavailable),
            (200, completion("hello")),
        ]);

        let text = client.generate_text(ask()).await.unwrap();
        assert_eq!(text, "hello");
        assert_eq!(stub.hits.load(Ordering::SeqCst), 3);
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_bad_request_is_not_retried() {
        let (client, stub, handle) = start_stub(vec![
            (400, json!({"error": {"message": "unknown model"}})),
            (200, completion("too late")),
        ]);

        let err = client.generate_text(ask()).await.unwrap_err();
        assert_eq!(err.status_code, Some(400));
        assert_eq!(err.message, "OpenAI API error: unknown model");
        assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_retries_give_up_with_last_status() {
        let unavailable = json!({"error": {"message": "overloaded"}});
        let (client, stub, handle) = start_stub(vec![(503, unavailable); 5]);

        let err = client.generate_text(ask()).await.unwrap_err();
        assert_eq!(err.status_code, Some(503));
        assert_eq!(stub.hits.load(Ordering::SeqCst), MAX_RETRIES as usize + 1);
        handle.stop(true).await;
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = OpenAIClient::new("key", "https://openrouter.ai/api/v1/", "gpt-4o-mini").unwrap();
        assert_eq!(client.endpoint, "https://openrouter.ai/api/v1/chat/completions");
        assert_eq!(client.model(), "gpt-4o-mini");
        assert!(client.auth_headers.contains_key(header::AUTHORIZATION));
    }

    #[test]
    fn test_empty_key_sends_no_auth_header() {
        let client = OpenAIClient::new("", "http://localhost:8080/v1", "local").unwrap();
        assert!(!client.auth_headers.contains_key(header::AUTHORIZATION));
    }

    #[test]
    fn test_parse_tool_call_response() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "query_database",
                            "arguments": "{\"action\":\"get_club\",\"club_id\":3}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response: ChatCompletionResponse = serde_json::from_value(raw).unwrap();
        let ai = into_ai_response(response).unwrap();
        assert!(ai.content.is_empty());
        assert_eq!(ai.tool_calls.len(), 1);
        assert_eq!(ai.tool_calls[0].arguments["club_id"], 3);
        assert_eq!(ai.stop_reason.as_deref(), Some("tool_calls"));
    }

    #[test]
    fn test_no_choices_is_error() {
        let response: ChatCompletionResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(into_ai_response(response).is_err());
    }

    #[test]
    fn test_tool_result_messages_follow_assistant_call() {
        let calls = vec![ToolCall {
            id: "call_9".to_string(),
            name: "query_database".to_string(),
            arguments: serde_json::json!({"action": "list_clubs"}),
        }];
        let responses = vec![ToolResponse::success("call_9".to_string(), "[]".to_string())];

        let messages = OpenAIClient::build_tool_result_messages(&calls, &responses);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "assistant");
        let sent = messages[0].tool_calls.as_ref().unwrap();
        assert_eq!(sent[0].function.arguments, "{\"action\":\"list_clubs\"}");
        assert_eq!(messages[1].role, "tool");
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("call_9"));
    }

    #[test]
    fn test_request_omits_tools_when_none() {
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![OpenAIClient::to_openai_message(Message {
                role: MessageRole::System,
                content: "be brief".to_string(),
            })],
            max_tokens: 10,
            tools: None,
            tool_choice: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [429, 502, 503, 504] {
            assert!(is_retryable_status(code));
        }
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(500));
    }
}
