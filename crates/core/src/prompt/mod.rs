use crate::domain::analysis::AiStrategy;
use crate::domain::context::CompanyContext;
use crate::sanitize::sanitize;

// Fixed per-stage system instructions.
pub const STRATEGY_SYSTEM: &str = "You are an expert AI investment analyst with deep knowledge of \
     technology companies and their AI strategies.";
pub const RECOMMENDATION_SYSTEM: &str = "You are a senior investment analyst specializing in AI and \
     technology investments. Provide clear, actionable investment recommendations.";
pub const STORY_SYSTEM: &str = "You are an expert at creating compelling investment narratives \
     focused on AI potential. Be specific and factual.";
pub const RETIREMENT_SYSTEM: &str = "You are an expert financial advisor and benefits analyst \
     specializing in 401k plans and retirement optimization. Provide detailed, practical advice \
     based on current industry standards.";

const SUMMARY_LIMIT: usize = 1000;
const TOP_ITEMS: usize = 3;

pub fn ai_strategy_prompt(ctx: &CompanyContext) -> String {
    let name = sanitize(&ctx.name);
    let sector = sanitize(&ctx.sector);
    let industry = sanitize(&ctx.industry);
    let summary: String = sanitize(&ctx.business_summary)
        .chars()
        .take(SUMMARY_LIMIT)
        .collect();

    let prompt = format!(
        "Analyze the AI strategy and potential of {name} ({symbol}).\n\
         \n\
         Company details:\n\
         - Sector: {sector}\n\
         - Industry: {industry}\n\
         - Business summary: {summary}\n\
         - Market cap: ${market_cap}B\n\
         - Employees: {employees}\n\
         \n\
         Cover:\n\
         1. Current AI initiatives and strategies\n\
         2. AI competitive advantages\n\
         3. Potential AI revenue streams\n\
         4. AI partnerships and collaborations\n\
         5. Future AI opportunities\n\
         6. AI-related risks and challenges\n\
         \n\
         Respond with a single JSON object of exactly this shape:\n\
         {{\n\
           \"ai_initiatives\": [\"initiative1\", \"initiative2\"],\n\
           \"competitive_advantages\": [\"advantage1\", \"advantage2\"],\n\
           \"revenue_streams\": [\"stream1\", \"stream2\"],\n\
           \"partnerships\": [\"partner1\", \"partner2\"],\n\
           \"opportunities\": [\"opportunity1\", \"opportunity2\"],\n\
           \"risks\": [\"risk1\", \"risk2\"],\n\
           \"ai_maturity_score\": 0-10,\n\
           \"overall_assessment\": \"detailed assessment\"\n\
         }}",
        symbol = ctx.symbol,
        market_cap = billions(ctx.market_cap),
        employees = thousands(ctx.employees),
    );

    // The summary may have re-introduced anything; one last pass keeps the
    // wire payload ASCII no matter what was interpolated.
    sanitize(&prompt)
}

pub fn recommendation_prompt(ctx: &CompanyContext, strategy: &AiStrategy) -> String {
    let name = sanitize(&ctx.name);
    let sector = sanitize(&ctx.sector);
    let industry = sanitize(&ctx.industry);

    let prompt = format!(
        "Based on the AI analysis of {name} ({symbol}), provide an investment recommendation \
         specifically focused on AI potential.\n\
         \n\
         Company context:\n\
         - Sector: {sector}\n\
         - Industry: {industry}\n\
         - Market cap: ${market_cap}B\n\
         \n\
         AI analysis summary:\n\
         - AI maturity score: {score}/10\n\
         - Key AI initiatives: {initiatives}\n\
         - Competitive advantages: {advantages}\n\
         - AI opportunities: {opportunities}\n\
         \n\
         Provide a clear investment recommendation (BUY/HOLD/SELL) based on AI potential, with \
         reasoning focused on AI investment merits, an AI potential score (0-10), and specific \
         AI-related catalysts or concerns.\n\
         \n\
         Respond with a single JSON object of exactly this shape:\n\
         {{\n\
           \"action\": \"BUY/HOLD/SELL\",\n\
           \"ai_score\": 0-10,\n\
           \"reasoning\": \"detailed reasoning focusing on AI investment potential\",\n\
           \"key_catalysts\": [\"catalyst1\", \"catalyst2\"],\n\
           \"risk_factors\": [\"risk1\", \"risk2\"]\n\
         }}",
        symbol = ctx.symbol,
        market_cap = billions(ctx.market_cap),
        score = strategy.ai_maturity_score,
        initiatives = join_top(&strategy.ai_initiatives),
        advantages = join_top(&strategy.competitive_advantages),
        opportunities = join_top(&strategy.opportunities),
    );

    sanitize(&prompt)
}

pub fn story_prompt(ctx: &CompanyContext, strategy: &AiStrategy) -> String {
    let name = sanitize(&ctx.name);

    let prompt = format!(
        "Create a compelling AI investment story for {name} ({symbol}).\n\
         \n\
         Based on this AI analysis:\n\
         - AI initiatives: {initiatives}\n\
         - Competitive advantages: {advantages}\n\
         - AI opportunities: {opportunities}\n\
         - Revenue streams: {streams}\n\
         \n\
         Create an investment narrative covering the strategic AI positioning, specific AI use \
         cases and applications, future AI growth opportunities, and competitive AI advantages.\n\
         \n\
         Respond with a single JSON object of exactly this shape:\n\
         {{\n\
           \"strategy_summary\": \"2-3 sentence summary of AI strategy\",\n\
           \"use_cases\": [\"specific use case 1\", \"specific use case 2\", \"specific use case 3\"],\n\
           \"opportunities\": [\"growth opportunity 1\", \"growth opportunity 2\"],\n\
           \"competitive_advantages\": [\"advantage 1\", \"advantage 2\"]\n\
         }}",
        symbol = ctx.symbol,
        initiatives = join_all(&strategy.ai_initiatives),
        advantages = join_all(&strategy.competitive_advantages),
        opportunities = join_all(&strategy.opportunities),
        streams = join_all(&strategy.revenue_streams),
    );

    sanitize(&prompt)
}

pub fn retirement_prompt(company_name: &str) -> String {
    let company = sanitize(company_name);

    let prompt = format!(
        "Analyze the 401k benefits and retirement plan for {company}.\n\
         \n\
         Provide a comprehensive analysis including:\n\
         1. Company 401k match details (percentage and limits)\n\
         2. Vesting schedule and requirements\n\
         3. Available investment options and fund categories\n\
         4. Roth 401k availability and recommendations\n\
         5. Contribution strategies and optimization tips\n\
         6. Additional retirement benefits and perks\n\
         7. Comparison to industry standards\n\
         8. Personalized recommendations for maximizing benefits\n\
         \n\
         Respond with a single JSON object of exactly this shape:\n\
         {{\n\
           \"overview\": {{\n\
             \"match_percentage\": 0-100,\n\
             \"max_match_salary_percent\": 0-15,\n\
             \"vesting_period\": \"immediate/1 year/2 years/etc\",\n\
             \"roth_available\": true/false,\n\
             \"company_size\": \"startup/mid-size/large enterprise\",\n\
             \"industry_rating\": \"below average/average/above average/excellent\"\n\
           }},\n\
           \"recommendation\": {{\n\
             \"optimization_score\": 0-10,\n\
             \"primary_advice\": \"main recommendation\",\n\
             \"key_actions\": [\"action1\", \"action2\", \"action3\"],\n\
             \"urgency_level\": \"low/medium/high\"\n\
           }},\n\
           \"contribution_strategy\": {{\n\
             \"recommended_contribution_percent\": 0-30,\n\
             \"annual_savings_potential\": \"$X,XXX - $XX,XXX\",\n\
             \"tax_optimization\": \"details about tax benefits\",\n\
             \"recommended_actions\": [\"specific action 1\", \"specific action 2\"]\n\
           }},\n\
           \"roth_analysis\": {{\n\
             \"recommendation\": \"Roth/Traditional/Mix\",\n\
             \"reasoning\": \"detailed explanation\",\n\
             \"age_considerations\": \"advice based on career stage\",\n\
             \"tax_bracket_impact\": \"current vs future tax considerations\"\n\
           }},\n\
           \"fund_options\": {{\n\
             \"fund_categories\": [\"Large Cap\", \"International\", \"Bonds\", \"Target Date\"],\n\
             \"recommended_funds\": [\"specific fund recommendation 1\", \"fund recommendation 2\"],\n\
             \"expense_ratio_analysis\": \"low/medium/high cost funds available\",\n\
             \"diversification_advice\": \"portfolio allocation recommendations\"\n\
           }},\n\
           \"additional_benefits\": {{\n\
             \"other_benefits\": [\"pension\", \"stock options\", \"HSA\", \"etc\"],\n\
             \"financial_wellness_perks\": [\"financial advisor access\", \"planning tools\"],\n\
             \"catch_up_contributions\": \"available for 50+ employees\",\n\
             \"loan_provisions\": \"details about 401k loans if available\"\n\
           }}\n\
         }}\n\
         \n\
         Base the analysis on typical benefits for companies of this size and industry. For \
         well-known companies, use publicly available information about their actual benefits. \
         Provide specific, actionable recommendations."
    );

    sanitize(&prompt)
}

/// Currency formatted in billions to one decimal.
pub fn billions(value: f64) -> String {
    format!("{:.1}", value / 1e9)
}

/// Integer with thousands separators.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn join_top(items: &[String]) -> String {
    items
        .iter()
        .take(TOP_ITEMS)
        .map(|s| sanitize(s))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_all(items: &[String]) -> String {
    items.iter().map(|s| sanitize(s)).collect::<Vec<_>>().join(", ")
}
