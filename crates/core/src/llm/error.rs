use crate::llm::Provider;
use crate::sanitize::sanitize;
use std::fmt;

/// Carries enough of the failed exchange to diagnose a bad run from logs.
/// Display output is sanitized so the error itself can never corrupt log
/// encoding.
#[derive(Debug, Clone)]
pub struct LlmCallError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_body: Option<String>,
}

impl fmt::Display for LlmCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM error (provider={:?}, stage={}): {}",
            self.provider,
            self.stage,
            sanitize(&self.detail)
        )
    }
}

impl std::error::Error for LlmCallError {}
