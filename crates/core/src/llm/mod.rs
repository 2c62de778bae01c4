pub mod error;
pub mod json;
pub mod openai;

/// One completion request: a fixed system instruction plus the rendered user
/// prompt. The transport constrains output to a single JSON object.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
}

/// What came back: some transports hand over an already-decoded object,
/// others only raw text expected to be JSON.
#[derive(Debug, Clone)]
pub enum LlmResponse {
    Structured(serde_json::Value),
    Text(String),
}

#[derive(Debug, Clone, Copy)]
pub enum Provider {
    OpenAi,
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete_json(&self, request: ChatRequest) -> anyhow::Result<LlmResponse>;
}
