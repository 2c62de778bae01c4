pub mod domain;
pub mod llm;
pub mod market;
pub mod orchestrator;
pub mod prompt;
pub mod report;
pub mod sanitize;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub openai_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub market_data_base_url: Option<String>,
        pub market_data_api_key: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                market_data_base_url: std::env::var("MARKET_DATA_BASE_URL").ok(),
                market_data_api_key: std::env::var("MARKET_DATA_API_KEY").ok(),
            })
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }

        pub fn require_market_data_base_url(&self) -> anyhow::Result<&str> {
            self.market_data_base_url
                .as_deref()
                .context("MARKET_DATA_BASE_URL is required")
        }
    }

    /// Credentials end up in HTTP headers, which reject non-ASCII bytes.
    /// Em/en dashes get their own message: they are what keys copied out of
    /// formatted documents actually contain.
    pub fn validate_credential(name: &str, value: &str) -> anyhow::Result<()> {
        if value.contains('\u{2014}') || value.contains('\u{2013}') {
            anyhow::bail!(
                "{name} contains em-dash or en-dash characters that break HTTP header \
                 encoding; re-copy the key as plain text without smart punctuation"
            );
        }
        if !value.is_ascii() {
            anyhow::bail!("{name} contains non-ASCII characters that break HTTP header encoding");
        }
        Ok(())
    }

}
