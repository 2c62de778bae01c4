use crate::config::{self, Settings};
use crate::llm::error::LlmCallError;
use crate::llm::{ChatRequest, LlmClient, LlmResponse, Provider};
use crate::sanitize::sanitize;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-5";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        // Fatal on smart punctuation or any other non-ASCII byte: the key
        // goes straight into an HTTP header.
        config::validate_credential("OPENAI_API_KEY", &api_key)?;

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    async fn create_chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> anyhow::Result<ChatCompletionResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        if !status.is_success() {
            return Err(LlmCallError {
                provider: Provider::OpenAi,
                stage: "http",
                detail: format!("status={status}"),
                raw_body: Some(text),
            }
            .into());
        }

        serde_json::from_str::<ChatCompletionResponse>(&text)
            .with_context(|| format!("failed to decode chat completion: {}", sanitize(&text)))
    }

    fn response_payload(res: ChatCompletionResponse) -> anyhow::Result<LlmResponse> {
        let choice = res.choices.into_iter().next().ok_or_else(|| LlmCallError {
            provider: Provider::OpenAi,
            stage: "choices",
            detail: "response carried no choices".to_string(),
            raw_body: None,
        })?;

        // Some transports decode the constrained output for us.
        if let Some(parsed) = choice.message.parsed {
            return Ok(LlmResponse::Structured(parsed));
        }

        match choice.message.content {
            Some(serde_json::Value::String(text)) => Ok(LlmResponse::Text(text)),
            Some(value @ serde_json::Value::Object(_)) => Ok(LlmResponse::Structured(value)),
            _ => Err(LlmCallError {
                provider: Provider::OpenAi,
                stage: "content",
                detail: "message content missing or unusable".to_string(),
                raw_body: None,
            }
            .into()),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn complete_json(&self, request: ChatRequest) -> anyhow::Result<LlmResponse> {
        // Outbound text is sanitized here regardless of what callers did;
        // interpolated business summaries are the usual smart-quote source.
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: sanitize(&request.system),
                },
                Message {
                    role: "user",
                    content: sanitize(&request.user),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let res = self.create_chat_completion(req).await?;
        Self::response_payload(res)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<serde_json::Value>,
    #[serde(default)]
    parsed: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: serde_json::Value) -> ChatCompletionResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn decodes_text_content() {
        let res = decode(json!({
            "choices": [{"message": {"content": "{\"ai_score\": 7}"}}]
        }));
        match OpenAiClient::response_payload(res).unwrap() {
            LlmResponse::Text(text) => assert_eq!(text, "{\"ai_score\": 7}"),
            other => panic!("expected text payload, got {other:?}"),
        }
    }

    #[test]
    fn prefers_pre_parsed_payload_over_content() {
        let res = decode(json!({
            "choices": [{"message": {
                "parsed": {"action": "BUY"},
                "content": "{\"action\": \"SELL\"}",
            }}]
        }));
        match OpenAiClient::response_payload(res).unwrap() {
            LlmResponse::Structured(value) => assert_eq!(value, json!({"action": "BUY"})),
            other => panic!("expected structured payload, got {other:?}"),
        }
    }

    #[test]
    fn object_content_counts_as_structured() {
        let res = decode(json!({
            "choices": [{"message": {"content": {"ai_maturity_score": 8}}}]
        }));
        assert!(matches!(
            OpenAiClient::response_payload(res).unwrap(),
            LlmResponse::Structured(_)
        ));
    }

    #[test]
    fn empty_choices_is_an_error() {
        let res = decode(json!({"choices": []}));
        assert!(OpenAiClient::response_payload(res).is_err());
    }

    #[test]
    fn request_serializes_json_object_directive() {
        let req = ChatCompletionRequest {
            model: "gpt-5".to_string(),
            messages: vec![Message {
                role: "user",
                content: "hi".to_string(),
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["response_format"]["type"], json!("json_object"));
        assert_eq!(v["messages"][0]["role"], json!("user"));
    }
}
