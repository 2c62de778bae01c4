use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::LlmSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl<'de> Deserialize<'de> for Urgency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Urgency::Low,
            "high" => Urgency::High,
            _ => Urgency::Medium,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RothChoice {
    Roth,
    #[default]
    Traditional,
    Mix,
}

impl RothChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            RothChoice::Roth => "Roth",
            RothChoice::Traditional => "Traditional",
            RothChoice::Mix => "Mix",
        }
    }
}

impl<'de> Deserialize<'de> for RothChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let lowered = raw.trim().to_ascii_lowercase();
        Ok(if lowered == "roth" {
            RothChoice::Roth
        } else if lowered.contains("mix") {
            RothChoice::Mix
        } else {
            RothChoice::Traditional
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanOverview {
    pub match_percentage: f64,
    pub max_match_salary_percent: f64,
    pub vesting_period: String,
    pub roth_available: bool,
    pub company_size: String,
    pub industry_rating: String,
}

impl Default for PlanOverview {
    fn default() -> Self {
        Self {
            match_percentage: 0.0,
            max_match_salary_percent: 0.0,
            vesting_period: "Unknown".to_string(),
            roth_available: false,
            company_size: "Unknown".to_string(),
            industry_rating: "Unknown".to_string(),
        }
    }
}

impl LlmSection for PlanOverview {
    fn normalize(&mut self) {
        self.match_percentage = self.match_percentage.clamp(0.0, 100.0);
        self.max_match_salary_percent = self.max_match_salary_percent.clamp(0.0, 15.0);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanRecommendation {
    pub optimization_score: f64,
    pub primary_advice: String,
    pub key_actions: Vec<String>,
    pub urgency_level: Urgency,
}

impl Default for PlanRecommendation {
    fn default() -> Self {
        Self {
            optimization_score: 5.0,
            primary_advice: "401k analysis temporarily unavailable.".to_string(),
            key_actions: vec![
                "Contribute at least enough to get the company match".to_string(),
                "Review plan documents".to_string(),
            ],
            urgency_level: Urgency::Medium,
        }
    }
}

impl LlmSection for PlanRecommendation {
    fn normalize(&mut self) {
        self.optimization_score = self.optimization_score.clamp(0.0, 10.0);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributionStrategy {
    pub recommended_contribution_percent: f64,
    pub annual_savings_potential: String,
    pub tax_optimization: String,
    pub recommended_actions: Vec<String>,
}

impl Default for ContributionStrategy {
    fn default() -> Self {
        Self {
            recommended_contribution_percent: 10.0,
            annual_savings_potential: "Not calculated".to_string(),
            tax_optimization: "Standard tax-deferred benefits apply".to_string(),
            recommended_actions: vec![
                "Start with the company match".to_string(),
                "Increase contributions annually".to_string(),
            ],
        }
    }
}

impl LlmSection for ContributionStrategy {
    fn normalize(&mut self) {
        self.recommended_contribution_percent =
            self.recommended_contribution_percent.clamp(0.0, 30.0);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RothAnalysis {
    pub recommendation: RothChoice,
    pub reasoning: String,
    pub age_considerations: String,
    pub tax_bracket_impact: String,
}

impl Default for RothAnalysis {
    fn default() -> Self {
        Self {
            recommendation: RothChoice::Traditional,
            reasoning: "Default recommendation for tax-deferred savings".to_string(),
            age_considerations: "Younger employees may benefit from Roth options".to_string(),
            tax_bracket_impact: "Consider current vs expected future tax rates".to_string(),
        }
    }
}

impl LlmSection for RothAnalysis {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FundOptions {
    pub fund_categories: Vec<String>,
    pub recommended_funds: Vec<String>,
    pub expense_ratio_analysis: String,
    pub diversification_advice: String,
}

impl Default for FundOptions {
    fn default() -> Self {
        Self {
            fund_categories: vec![
                "Target Date Funds".to_string(),
                "Index Funds".to_string(),
                "Bond Funds".to_string(),
            ],
            recommended_funds: vec![
                "Low-cost index funds".to_string(),
                "Target-date funds for simplicity".to_string(),
            ],
            expense_ratio_analysis: "Look for funds with expense ratios under 0.5%".to_string(),
            diversification_advice: "Mix of stocks, bonds, and international exposure".to_string(),
        }
    }
}

impl LlmSection for FundOptions {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalBenefits {
    pub other_benefits: Vec<String>,
    pub financial_wellness_perks: Vec<String>,
    pub catch_up_contributions: String,
    pub loan_provisions: String,
}

impl Default for AdditionalBenefits {
    fn default() -> Self {
        Self {
            other_benefits: vec!["Standard 401k benefits".to_string()],
            financial_wellness_perks: vec!["Online planning tools".to_string()],
            catch_up_contributions: "Available for employees 50 and older".to_string(),
            loan_provisions: "Check with HR for loan availability".to_string(),
        }
    }
}

impl LlmSection for AdditionalBenefits {}

/// Aggregate 401k-mode result: six independently-defaulted sections. A
/// section missing from the model's payload defaults without touching the
/// others; an empty payload yields the full default document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementAnalysis {
    pub overview: PlanOverview,
    pub recommendation: PlanRecommendation,
    pub contribution_strategy: ContributionStrategy,
    pub roth_analysis: RothAnalysis,
    pub fund_options: FundOptions,
    pub additional_benefits: AdditionalBenefits,
    pub analysis_timestamp: DateTime<Local>,
}

impl RetirementAnalysis {
    pub fn from_sections(sections: &Map<String, Value>) -> Self {
        Self {
            overview: PlanOverview::from_value(sections.get("overview")),
            recommendation: PlanRecommendation::from_value(sections.get("recommendation")),
            contribution_strategy: ContributionStrategy::from_value(
                sections.get("contribution_strategy"),
            ),
            roth_analysis: RothAnalysis::from_value(sections.get("roth_analysis")),
            fund_options: FundOptions::from_value(sections.get("fund_options")),
            additional_benefits: AdditionalBenefits::from_value(
                sections.get("additional_benefits"),
            ),
            analysis_timestamp: Local::now(),
        }
    }
}

impl Default for RetirementAnalysis {
    fn default() -> Self {
        Self::from_sections(&Map::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sections(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn missing_section_defaults_while_present_sections_pass_through() {
        let payload = sections(json!({
            "overview": {
                "match_percentage": 50,
                "max_match_salary_percent": 6,
                "vesting_period": "3 years",
                "roth_available": true,
                "company_size": "large enterprise",
                "industry_rating": "above average",
            },
            "recommendation": {
                "optimization_score": 8,
                "primary_advice": "Max out the match",
                "key_actions": ["Raise contribution to 6%"],
                "urgency_level": "high",
            },
            // roth_analysis intentionally absent
            "contribution_strategy": {"recommended_contribution_percent": 12},
            "fund_options": {"fund_categories": ["Large Cap"]},
            "additional_benefits": {"other_benefits": ["HSA"]},
        }));

        let doc = RetirementAnalysis::from_sections(&payload);
        assert_eq!(doc.overview.match_percentage, 50.0);
        assert!(doc.overview.roth_available);
        assert_eq!(doc.recommendation.urgency_level, Urgency::High);
        assert_eq!(doc.contribution_strategy.recommended_contribution_percent, 12.0);
        assert_eq!(doc.fund_options.fund_categories, vec!["Large Cap"]);

        // the absent section is fully defaulted
        assert_eq!(doc.roth_analysis.recommendation, RothChoice::Traditional);
        assert_eq!(
            doc.roth_analysis.reasoning,
            "Default recommendation for tax-deferred savings"
        );
    }

    #[test]
    fn empty_payload_yields_full_default_document() {
        let doc = RetirementAnalysis::from_sections(&Map::new());
        assert_eq!(doc.overview.vesting_period, "Unknown");
        assert_eq!(doc.recommendation.optimization_score, 5.0);
        assert_eq!(
            doc.recommendation.primary_advice,
            "401k analysis temporarily unavailable."
        );
        assert_eq!(doc.contribution_strategy.recommended_contribution_percent, 10.0);
        assert_eq!(doc.fund_options.fund_categories.len(), 3);
        assert_eq!(doc.additional_benefits.other_benefits, vec!["Standard 401k benefits"]);
    }

    #[test]
    fn malformed_section_defaults_without_failing_the_document() {
        let payload = sections(json!({
            "overview": "not an object",
            "recommendation": {"optimization_score": 9},
        }));
        let doc = RetirementAnalysis::from_sections(&payload);
        assert_eq!(doc.overview.match_percentage, 0.0);
        assert_eq!(doc.recommendation.optimization_score, 9.0);
    }

    #[test]
    fn numeric_fields_clamp_to_documented_ranges() {
        let payload = sections(json!({
            "overview": {"match_percentage": 250, "max_match_salary_percent": 40},
            "contribution_strategy": {"recommended_contribution_percent": 95},
        }));
        let doc = RetirementAnalysis::from_sections(&payload);
        assert_eq!(doc.overview.match_percentage, 100.0);
        assert_eq!(doc.overview.max_match_salary_percent, 15.0);
        assert_eq!(doc.contribution_strategy.recommended_contribution_percent, 30.0);
    }

    #[test]
    fn urgency_and_roth_choice_parse_leniently() {
        let u: Urgency = serde_json::from_value(json!("HIGH")).unwrap();
        assert_eq!(u, Urgency::High);
        let u: Urgency = serde_json::from_value(json!("whenever")).unwrap();
        assert_eq!(u, Urgency::Medium);

        let r: RothChoice = serde_json::from_value(json!("roth")).unwrap();
        assert_eq!(r, RothChoice::Roth);
        let r: RothChoice = serde_json::from_value(json!("A mix of both")).unwrap();
        assert_eq!(r, RothChoice::Mix);
        let r: RothChoice = serde_json::from_value(json!("unsure")).unwrap();
        assert_eq!(r, RothChoice::Traditional);
    }
}
