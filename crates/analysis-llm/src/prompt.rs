//! Analyst prompt rendering.

use analysis_core::MissBatch;

/// Output contract appended to every prompt.
///
/// Field names and vocabularies must stay in sync with
/// [`AnalysisRecord`](analysis_core::AnalysisRecord).
pub const FORMAT_INSTRUCTIONS: &str = r#"Your response must be a JSON array with exactly one object per stock, and nothing else.
Do not include explanations or Markdown code fences.
Each object must have this shape:
{
  "stock": string,
  "news_summary": string,
  "news_type": [string],
  "sentiment": string,
  "market_reaction": string,
  "fundamental_impact": {
    "revenue": string,
    "margins": string,
    "balance_sheet": string,
    "long_term_moat": string
  },
  "time_horizon_impact": {
    "short_term": string,
    "long_term": string
  },
  "risk_level": string,
  "thesis_changed": boolean,
  "valuation_comment": string,
  "recommended_action": string,
  "action_reason": string,
  "invalidation_triggers": string
}"#;

/// Renders the analyst prompt for one miss batch.
#[must_use]
pub fn render(batch: &MissBatch) -> String {
    let stocks = batch
        .holdings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a professional equity research analyst.

Stocks: [{stocks}]
Exchange: {exchange}
Horizon: {horizon}
RiskProfile: {risk_profile}

Task:
Search latest real-time news/events related to the stocks.
Ignore noise. Focus only on items that materially affect price or fundamentals.
Assess whether the news changes the investment thesis.

Rules:
- Be objective and concise.
- Separate facts from opinion.
- No generic investment advice.
- End user is a layman, so explain jargon in simple terms.

Response mapping rules:
Restrict yourself to the following values for each stock:
news_type: [earnings|regulatory|management|macro|sector|competition|one_time|structural]
sentiment: [bullish|neutral|bearish]
market_reaction: [up|down|flat|unknown]
revenue: [positive|neutral|negative]
margins: [positive|neutral|negative]
balance_sheet: [positive|neutral|negative]
long_term_moat: [improving|stable|weakening]
risk_level: [low|medium|high]
thesis_changed: [true|false]
recommended_action: [exit|partial_exit|hold|accumulate|buy]

{FORMAT_INSTRUCTIONS}
",
        exchange = batch.exchange,
        horizon = batch.horizon,
        risk_profile = batch.risk_profile,
    )
}
