use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::LlmSection;

/// Investment action. Parsing is lenient: whatever the model sends that is
/// not a recognizable BUY or SELL becomes HOLD, so the field is never absent
/// and never out of its enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Action {
    #[serde(rename = "BUY")]
    Buy,
    #[default]
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Hold => "HOLD",
            Action::Sell => "SELL",
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.trim().to_ascii_uppercase().as_str() {
            "BUY" => Action::Buy,
            "SELL" => Action::Sell,
            _ => Action::Hold,
        })
    }
}

/// Output of the AI-strategy stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiStrategy {
    pub ai_initiatives: Vec<String>,
    pub competitive_advantages: Vec<String>,
    pub revenue_streams: Vec<String>,
    pub partnerships: Vec<String>,
    pub opportunities: Vec<String>,
    pub risks: Vec<String>,
    pub ai_maturity_score: f64,
    pub overall_assessment: String,
}

impl Default for AiStrategy {
    fn default() -> Self {
        Self {
            ai_initiatives: Vec::new(),
            competitive_advantages: Vec::new(),
            revenue_streams: Vec::new(),
            partnerships: Vec::new(),
            opportunities: Vec::new(),
            risks: Vec::new(),
            ai_maturity_score: 5.0,
            overall_assessment: "Unable to complete AI analysis at this time.".to_string(),
        }
    }
}

impl LlmSection for AiStrategy {
    fn normalize(&mut self) {
        self.ai_maturity_score = self.ai_maturity_score.clamp(0.0, 10.0);
    }
}

/// Output of the investment-recommendation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentRecommendation {
    pub action: Action,
    pub ai_score: f64,
    pub reasoning: String,
    pub key_catalysts: Vec<String>,
    pub risk_factors: Vec<String>,
}

impl Default for InvestmentRecommendation {
    fn default() -> Self {
        Self {
            action: Action::Hold,
            ai_score: 5.0,
            reasoning: "Unable to complete investment analysis at this time.".to_string(),
            key_catalysts: Vec::new(),
            risk_factors: Vec::new(),
        }
    }
}

impl LlmSection for InvestmentRecommendation {
    fn normalize(&mut self) {
        self.ai_score = self.ai_score.clamp(0.0, 10.0);
    }
}

/// Output of the AI-story stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiStory {
    pub strategy_summary: String,
    pub use_cases: Vec<String>,
    pub opportunities: Vec<String>,
    pub competitive_advantages: Vec<String>,
}

impl Default for AiStory {
    fn default() -> Self {
        Self {
            strategy_summary: "AI strategy analysis not available at this time.".to_string(),
            use_cases: Vec::new(),
            opportunities: Vec::new(),
            competitive_advantages: Vec::new(),
        }
    }
}

impl LlmSection for AiStory {}

/// Locally derived metrics; never produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMetrics {
    pub ai_revenue_exposure: f64,
    pub ai_partnerships: u32,
    pub ai_patents: u32,
    pub ai_investment_score: f64,
}

impl Default for AiMetrics {
    fn default() -> Self {
        Self {
            ai_revenue_exposure: 0.0,
            ai_partnerships: 0,
            ai_patents: 0,
            ai_investment_score: 5.0,
        }
    }
}

/// Aggregate stock-mode result. Every field is populated on every path; the
/// default value is the whole-pipeline fallback document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub investment_recommendation: InvestmentRecommendation,
    pub ai_metrics: AiMetrics,
    pub ai_story: AiStory,
    pub analysis_timestamp: DateTime<Local>,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            investment_recommendation: InvestmentRecommendation::default(),
            ai_metrics: AiMetrics::default(),
            ai_story: AiStory::default(),
            analysis_timestamp: Local::now(),
        }
    }
}
