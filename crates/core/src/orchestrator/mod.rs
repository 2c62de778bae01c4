pub mod metrics;

use crate::config::Settings;
use crate::domain::analysis::{AiStory, AiStrategy, AnalysisResult, InvestmentRecommendation};
use crate::domain::context::CompanyContext;
use crate::domain::retirement::RetirementAnalysis;
use crate::domain::LlmSection;
use crate::llm::openai::OpenAiClient;
use crate::llm::{json, ChatRequest, LlmClient, LlmResponse};
use crate::market::MarketDataClient;
use crate::prompt;
use crate::sanitize::sanitize;
use chrono::Local;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Outcome tag for one pipeline stage: the model's decoded payload, or the
/// documented static fallback. Callers compose stages by inspecting the tag
/// instead of catching errors.
#[derive(Debug, Clone)]
pub enum Stage<T> {
    Generated(T),
    Fallback(T),
}

impl<T> Stage<T> {
    pub fn get(&self) -> &T {
        match self {
            Stage::Generated(value) | Stage::Fallback(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Stage::Generated(value) | Stage::Fallback(value) => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Stage::Fallback(_))
    }
}

pub struct Analyzer {
    llm: Arc<dyn LlmClient>,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Construction fails only for configuration errors (missing or
    /// non-ASCII credential). Those surface to the caller unrecoverably;
    /// everything after construction degrades to defaults instead.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(OpenAiClient::from_settings(settings)?)))
    }

    /// Fetch-then-analyze. The market collaborator's not-found sentinel is
    /// passed through unchanged and no LLM call is made for it.
    pub async fn analyze_symbol(
        &self,
        market: &dyn MarketDataClient,
        symbol: &str,
        period: &str,
    ) -> anyhow::Result<Option<AnalysisResult>> {
        let Some(snapshot) = market.fetch(symbol, period).await? else {
            tracing::warn!(symbol = %sanitize(symbol), "no market data for symbol; analysis skipped");
            return Ok(None);
        };
        Ok(Some(self.analyze_stock(symbol, &snapshot.info).await))
    }

    /// Stock mode: strictly sequential stages, no automatic retries. Always
    /// returns a complete result; failed stages contribute their fallbacks.
    pub async fn analyze_stock(&self, symbol: &str, info: &Map<String, Value>) -> AnalysisResult {
        let ctx = CompanyContext::from_info(symbol, info);
        tracing::info!(
            symbol = %sanitize(&ctx.symbol),
            company = %sanitize(&ctx.name),
            "starting stock analysis"
        );

        let strategy = self
            .run_stage::<AiStrategy>(
                "ai_strategy",
                prompt::STRATEGY_SYSTEM,
                prompt::ai_strategy_prompt(&ctx),
            )
            .await;

        let recommendation = self
            .run_stage::<InvestmentRecommendation>(
                "recommendation",
                prompt::RECOMMENDATION_SYSTEM,
                prompt::recommendation_prompt(&ctx, strategy.get()),
            )
            .await;

        let story = self
            .run_stage::<AiStory>(
                "ai_story",
                prompt::STORY_SYSTEM,
                prompt::story_prompt(&ctx, strategy.get()),
            )
            .await;

        let ai_metrics = metrics::derive(&ctx.sector, strategy.get());

        AnalysisResult {
            investment_recommendation: recommendation.into_inner(),
            ai_metrics,
            ai_story: story.into_inner(),
            analysis_timestamp: Local::now(),
        }
    }

    /// 401k mode: one render, one call. Missing sections default
    /// independently; a failed call or empty parse yields the full default
    /// document. Never errors.
    pub async fn analyze_retirement_plan(&self, company_name: &str) -> RetirementAnalysis {
        tracing::info!(company = %sanitize(company_name), "starting 401k analysis");

        let request = ChatRequest {
            system: prompt::RETIREMENT_SYSTEM.to_string(),
            user: prompt::retirement_prompt(company_name),
        };

        let sections = match self.llm.complete_json(request).await {
            Ok(response) => json::parse_object(&response),
            Err(err) => {
                tracing::warn!(
                    error = %sanitize(&format!("{err:#}")),
                    "401k analysis call failed; returning default document"
                );
                Map::new()
            }
        };
        if sections.is_empty() {
            tracing::warn!("401k response empty or unparseable; every section defaults");
        }

        RetirementAnalysis::from_sections(&sections)
    }

    /// One stage: at most one remote call, never retried. Any failure on
    /// the way to a typed payload takes the documented fallback.
    async fn run_stage<T: LlmSection>(
        &self,
        stage: &'static str,
        system: &str,
        user: String,
    ) -> Stage<T> {
        let request = ChatRequest {
            system: system.to_string(),
            user,
        };
        match self.llm.complete_json(request).await {
            Ok(response) => decode_stage(stage, &response),
            Err(err) => {
                tracing::warn!(
                    stage,
                    error = %sanitize(&format!("{err:#}")),
                    "stage call failed; using fallback"
                );
                Stage::Fallback(T::default())
            }
        }
    }
}

fn decode_stage<T: LlmSection>(stage: &'static str, response: &LlmResponse) -> Stage<T> {
    let object = json::parse_object(response);
    if object.is_empty() {
        // An empty object is indistinguishable from a failed parse here;
        // both take the fallback.
        tracing::warn!(stage, "empty or unparseable stage response; using fallback");
        return Stage::Fallback(T::default());
    }

    match serde_json::from_value::<T>(Value::Object(object)) {
        Ok(mut value) => {
            value.normalize();
            Stage::Generated(value)
        }
        Err(err) => {
            tracing::warn!(
                stage,
                error = %err,
                "stage payload did not match the requested shape; using fallback"
            );
            Stage::Fallback(T::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::Action;
    use crate::domain::retirement::RothChoice;
    use crate::llm::Provider;
    use crate::market::MarketSnapshot;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Every call errors; counts attempts.
    #[derive(Default)]
    struct FailingLlm {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LlmClient for FailingLlm {
        fn provider(&self) -> Provider {
            Provider::OpenAi
        }

        async fn complete_json(&self, _request: ChatRequest) -> anyhow::Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("connection reset by peer")
        }
    }

    /// Serves a fixed script of responses in order.
    struct ScriptedLlm {
        responses: Mutex<Vec<LlmResponse>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<LlmResponse>) -> Self {
            let mut reversed = responses;
            reversed.reverse();
            Self {
                responses: Mutex::new(reversed),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider(&self) -> Provider {
            Provider::OpenAi
        }

        async fn complete_json(&self, _request: ChatRequest) -> anyhow::Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    struct NoDataMarket;

    #[async_trait::async_trait]
    impl MarketDataClient for NoDataMarket {
        fn provider_name(&self) -> &'static str {
            "test_no_data"
        }

        async fn fetch(
            &self,
            _symbol: &str,
            _period: &str,
        ) -> anyhow::Result<Option<MarketSnapshot>> {
            Ok(None)
        }
    }

    fn tech_info() -> Map<String, Value> {
        json!({
            "longName": "Example Corp",
            "sector": "Technology",
            "industry": "Software",
            "marketCap": 2_500_000_000.0_f64,
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[tokio::test]
    async fn failing_client_still_yields_a_complete_result() {
        let analyzer = Analyzer::new(Arc::new(FailingLlm::default()));
        let result = analyzer.analyze_stock("EXMP", &tech_info()).await;

        assert_eq!(result.investment_recommendation.action, Action::Hold);
        assert_eq!(result.investment_recommendation.ai_score, 5.0);
        assert_eq!(result.ai_metrics.ai_investment_score, 5.0);
        // metrics still derive from the fallback strategy: 1.5 * 5 * 2 = 15
        assert_eq!(result.ai_metrics.ai_revenue_exposure, 15.0);
        assert_eq!(result.ai_metrics.ai_partnerships, 0);
        assert!(result.ai_story.use_cases.is_empty());
    }

    #[tokio::test]
    async fn missing_market_data_makes_no_llm_call() {
        let llm = Arc::new(FailingLlm::default());
        let analyzer = Analyzer::new(llm.clone());

        let result = analyzer
            .analyze_symbol(&NoDataMarket, "ZZZZ", "1y")
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scripted_stages_flow_into_the_result() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            LlmResponse::Structured(json!({
                "ai_initiatives": ["a", "b", "c"],
                "partnerships": ["p1", "p2"],
                "ai_maturity_score": 8,
                "overall_assessment": "strong",
            })),
            LlmResponse::Text(
                json!({
                    "action": "buy",
                    "ai_score": 9,
                    "reasoning": "clear AI moat",
                    "key_catalysts": ["launch"],
                    "risk_factors": ["competition"],
                })
                .to_string(),
            ),
            LlmResponse::Structured(json!({
                "strategy_summary": "leading position",
                "use_cases": ["assistant"],
            })),
        ]));
        let analyzer = Analyzer::new(llm.clone());

        let result = analyzer.analyze_stock("EXMP", &tech_info()).await;

        assert_eq!(result.investment_recommendation.action, Action::Buy);
        assert_eq!(result.investment_recommendation.ai_score, 9.0);
        assert_eq!(result.ai_story.strategy_summary, "leading position");
        // 1.5 * 8 * 2 + 3 * 5 = 39.0
        assert_eq!(result.ai_metrics.ai_revenue_exposure, 39.0);
        assert_eq!(result.ai_metrics.ai_partnerships, 2);
        // round(8 * 10) + 2 * 5 = 90
        assert_eq!(result.ai_metrics.ai_patents, 90);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn one_bad_stage_does_not_abort_the_pipeline() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            // strategy stage returns junk text
            LlmResponse::Text("not json at all".to_string()),
            LlmResponse::Structured(json!({"action": "SELL", "ai_score": 2})),
            LlmResponse::Structured(json!({"strategy_summary": "thin story"})),
        ]));
        let analyzer = Analyzer::new(llm);

        let result = analyzer.analyze_stock("EXMP", &tech_info()).await;

        // later stages ran against the strategy fallback
        assert_eq!(result.investment_recommendation.action, Action::Sell);
        assert_eq!(result.ai_metrics.ai_investment_score, 5.0);
        assert_eq!(result.ai_story.strategy_summary, "thin story");
    }

    #[tokio::test]
    async fn retirement_failure_returns_the_default_document() {
        let analyzer = Analyzer::new(Arc::new(FailingLlm::default()));
        let doc = analyzer.analyze_retirement_plan("Example Corp").await;

        assert_eq!(doc.recommendation.optimization_score, 5.0);
        assert_eq!(doc.roth_analysis.recommendation, RothChoice::Traditional);
        assert_eq!(doc.overview.vesting_period, "Unknown");
    }

    #[tokio::test]
    async fn retirement_sections_pass_through_when_present() {
        let llm = Arc::new(ScriptedLlm::new(vec![LlmResponse::Structured(json!({
            "overview": {"match_percentage": 75, "roth_available": true},
            "recommendation": {"optimization_score": 8, "urgency_level": "high"},
        }))]));
        let analyzer = Analyzer::new(llm);

        let doc = analyzer.analyze_retirement_plan("Example Corp").await;

        assert_eq!(doc.overview.match_percentage, 75.0);
        assert!(doc.overview.roth_available);
        assert_eq!(doc.recommendation.optimization_score, 8.0);
        // untouched sections keep their defaults
        assert_eq!(doc.contribution_strategy.recommended_contribution_percent, 10.0);
    }

    #[tokio::test]
    async fn empty_object_response_takes_the_fallback() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            LlmResponse::Structured(json!({})),
            LlmResponse::Structured(json!({})),
            LlmResponse::Structured(json!({})),
        ]));
        let analyzer = Analyzer::new(llm);

        let result = analyzer.analyze_stock("EXMP", &tech_info()).await;
        assert_eq!(result.investment_recommendation.action, Action::Hold);
        assert_eq!(
            result.investment_recommendation.reasoning,
            "Unable to complete investment analysis at this time."
        );
    }

    #[test]
    fn stage_tag_reports_fallback() {
        let generated: Stage<AiStrategy> = decode_stage(
            "ai_strategy",
            &LlmResponse::Structured(json!({"ai_maturity_score": 7})),
        );
        assert!(!generated.is_fallback());
        assert_eq!(generated.get().ai_maturity_score, 7.0);

        let fallback: Stage<AiStrategy> =
            decode_stage("ai_strategy", &LlmResponse::Text("garbage".to_string()));
        assert!(fallback.is_fallback());
    }

    #[test]
    fn decode_stage_clamps_generated_payloads() {
        let stage: Stage<AiStrategy> = decode_stage(
            "ai_strategy",
            &LlmResponse::Structured(json!({"ai_maturity_score": 42})),
        );
        assert!(!stage.is_fallback());
        assert_eq!(stage.get().ai_maturity_score, 10.0);
    }
}
