//! Strategy advisory: prompt construction and strict parsing of the model's
//! JSON reply. A reply that does not match the schema is a typed error, and
//! callers fall back to showing the raw text.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::TimeframeAnalysis;
use crate::calc::{ProfitResult, RiskReward};
use crate::error::CalcError;

/// Risk level called out by the advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Trade direction suggested by the advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

/// Strategic recommendation for the proposed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Enter,
    Hold,
    Wait,
    Exit,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Enter => "Enter",
            Recommendation::Hold => "Hold",
            Recommendation::Wait => "Wait",
            Recommendation::Exit => "Exit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestedLevels {
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
}

/// The advisory reply, as a strict schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAdvice {
    pub risk_assessment: RiskAssessment,
    pub direction: Direction,
    pub strategic_recommendation: Recommendation,
    pub suggested_levels: SuggestedLevels,
    pub technical_considerations: String,
    pub position_size_adjustment: String,
    /// Signal strength, 0-100.
    pub confidence_score: u8,
}

/// Assemble the advisory prompt from the trade setup, both P&L scenarios,
/// and the per-timeframe technical summaries.
#[allow(clippy::too_many_arguments)]
pub fn build_prompt(
    token: &str,
    current_price: Decimal,
    entry_price: Decimal,
    take_profit: Decimal,
    stop_loss: Decimal,
    position_size: Decimal,
    risk_reward: &RiskReward,
    profit: &ProfitResult,
    loss: &ProfitResult,
    analyses: &[TimeframeAnalysis],
) -> String {
    let tech_analysis = analyses
        .iter()
        .map(TimeframeAnalysis::summary)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze this trading scenario with technical data and provide strategic advice:

TOKEN: {token}
CURRENT PRICE: ${current_price:.4}

PROPOSED TRADE:
- Entry Price: ${entry_price:.4}
- Take Profit: ${take_profit:.4}
- Stop Loss: ${stop_loss:.4}
- Position Size: ${position_size}
- Risk/Reward Ratio: {ratio:.2}

FINANCIAL IMPACT:
- Potential Profit: ${profit_net} ({profit_pct:.2}%)
- Potential Loss: ${loss_net} ({loss_pct:.2}%)

TECHNICAL ANALYSIS:
{tech_analysis}

Based on the technical analysis across multiple timeframes, provide ONLY a JSON response with this exact structure. Do not include any explanations, markdown formatting, or additional text:

{{
  "risk_assessment": {{
    "level": "Low|Medium|High",
    "reasoning": "Brief explanation of risk factors"
  }},
  "direction": "Long|Short",
  "strategic_recommendation": "Enter|Hold|Wait|Exit",
  "suggested_levels": {{
    "take_profit": 186.50,
    "stop_loss": 181.50
  }},
  "technical_considerations": "Key insights from candlestick patterns and trends",
  "position_size_adjustment": "Recommended position size or percentage change",
  "confidence_score": 75
}}

Return ONLY the JSON object. Use specific price levels from the technical data. Direction should be "Long" for buying/expecting price increase, "Short" for selling/expecting price decrease. Confidence score should be 0-100 based on signal strength."#,
        token = token,
        current_price = current_price,
        entry_price = entry_price,
        take_profit = take_profit,
        stop_loss = stop_loss,
        position_size = position_size,
        ratio = risk_reward.ratio,
        profit_net = profit.net_amount,
        profit_pct = profit.price_change_pct,
        loss_net = loss.net_amount,
        loss_pct = loss.price_change_pct,
        tech_analysis = tech_analysis,
    )
}

/// Parse the raw completion text into [`StrategyAdvice`], tolerating markdown
/// code fences around the JSON object.
pub fn parse_advice(raw: &str) -> Result<StrategyAdvice, CalcError> {
    let cleaned = strip_code_fences(raw);

    serde_json::from_str(cleaned).map_err(|_| CalcError::AdvisoryMalformed {
        raw: raw.to_string(),
    })
}

/// Remove a surrounding ```json ... ``` (or plain ```) fence, if present.
fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();

    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }

    s.trim()
}
