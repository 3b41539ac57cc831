//! The analysis record produced per symbol.
//!
//! Field names and vocabularies match the JSON the generative backend is asked
//! to produce, so a record decodes straight from backend output and is stored
//! as the same JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::Symbol;

/// Category of a news item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsType {
    /// Quarterly or annual results.
    Earnings,
    /// Regulator or government action.
    Regulatory,
    /// Leadership changes or conduct.
    Management,
    /// Rates, inflation, currency.
    Macro,
    /// Industry-wide developments.
    Sector,
    /// Competitor moves.
    Competition,
    /// Non-recurring event.
    OneTime,
    /// Lasting change to the business.
    Structural,
}

/// Overall tone of the news.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Positive for the price.
    Bullish,
    /// No clear direction.
    Neutral,
    /// Negative for the price.
    Bearish,
}

/// How the price reacted to the news.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketReaction {
    /// Price moved up.
    Up,
    /// Price moved down.
    Down,
    /// No meaningful move.
    Flat,
    /// Reaction not yet observable.
    Unknown,
}

/// Direction of a fundamental line item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Improving.
    Positive,
    /// Unchanged.
    Neutral,
    /// Deteriorating.
    Negative,
}

/// Direction of the long-term competitive moat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoatTrend {
    /// Moat widening.
    Improving,
    /// Moat intact.
    Stable,
    /// Moat eroding.
    Weakening,
}

/// Risk attached to the position after the news.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Low risk.
    Low,
    /// Medium risk.
    Medium,
    /// High risk.
    High,
}

/// Suggested action for the holder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Sell the whole position.
    Exit,
    /// Trim the position.
    PartialExit,
    /// Keep the position as is.
    Hold,
    /// Add gradually.
    Accumulate,
    /// Buy now.
    Buy,
}

/// Impact of the news on the company's fundamentals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundamentalImpact {
    /// Revenue trend.
    pub revenue: Trend,
    /// Margin trend.
    pub margins: Trend,
    /// Balance sheet trend.
    pub balance_sheet: Trend,
    /// Long-term moat trend.
    pub long_term_moat: MoatTrend,
}

/// Expected impact over the short and long term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeHorizonImpact {
    /// Short-term outlook.
    pub short_term: String,
    /// Long-term outlook.
    pub long_term: String,
}

/// Structured market analysis for one stock.
///
/// Immutable once produced. The cache stores it as opaque JSON and never
/// interprets individual fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Symbol the analysis is about, as reported by the backend.
    pub stock: Symbol,
    /// Plain-language summary of material news.
    pub news_summary: String,
    /// Categories the news falls into.
    pub news_type: BTreeSet<NewsType>,
    /// Overall sentiment.
    pub sentiment: Sentiment,
    /// Observed market reaction.
    pub market_reaction: MarketReaction,
    /// Impact on fundamentals.
    pub fundamental_impact: FundamentalImpact,
    /// Impact per horizon.
    pub time_horizon_impact: TimeHorizonImpact,
    /// Risk level after the news.
    pub risk_level: RiskLevel,
    /// Whether the investment thesis changed.
    pub thesis_changed: bool,
    /// Comment on valuation.
    pub valuation_comment: String,
    /// Suggested action.
    pub recommended_action: RecommendedAction,
    /// Why that action.
    pub action_reason: String,
    /// What would invalidate the recommendation.
    pub invalidation_triggers: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "stock": "AAPL",
        "news_summary": "Services revenue beat estimates.",
        "news_type": ["earnings", "one_time"],
        "sentiment": "bullish",
        "market_reaction": "up",
        "fundamental_impact": {
            "revenue": "positive",
            "margins": "neutral",
            "balance_sheet": "neutral",
            "long_term_moat": "stable"
        },
        "time_horizon_impact": {
            "short_term": "Momentum likely to continue.",
            "long_term": "Thesis intact."
        },
        "risk_level": "medium",
        "thesis_changed": false,
        "valuation_comment": "Trading above historical average multiple.",
        "recommended_action": "hold",
        "action_reason": "Fundamentals unchanged.",
        "invalidation_triggers": "Services growth below 10%."
    }"#;

    #[test]
    fn test_record_decodes_backend_vocabulary() {
        let record: AnalysisRecord = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(record.stock.as_str(), "AAPL");
        assert!(record.news_type.contains(&NewsType::OneTime));
        assert_eq!(record.recommended_action, RecommendedAction::Hold);
        assert_eq!(record.fundamental_impact.long_term_moat, MoatTrend::Stable);
    }

    #[test]
    fn test_record_rejects_out_of_vocabulary_values() {
        let bad = SAMPLE.replace("\"hold\"", "\"strong_buy\"");
        assert!(serde_json::from_str::<AnalysisRecord>(&bad).is_err());
    }

    #[test]
    fn test_record_rejects_missing_fields() {
        let bad = SAMPLE.replace("\"thesis_changed\": false,", "");
        assert!(serde_json::from_str::<AnalysisRecord>(&bad).is_err());
    }

    #[test]
    fn test_news_types_form_a_set() {
        let dup = SAMPLE.replace(r#"["earnings", "one_time"]"#, r#"["macro", "macro"]"#);
        let record: AnalysisRecord = serde_json::from_str(&dup).unwrap();
        assert_eq!(record.news_type.len(), 1);
    }
}
