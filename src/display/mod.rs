//! Terminal presentation: ANSI/truecolor styling and result rendering.
//!
//! Purely a formatting layer over computed results; nothing here feeds back
//! into the calculation.

use rust_decimal::Decimal;

use crate::advisor::{Recommendation, RiskLevel, StrategyAdvice};
use crate::calc::ProfitResult;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// 24-bit foreground escape.
fn rgb(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;2;{r};{g};{b}m")
}

/// Truecolor terminals advertise themselves via COLORTERM.
fn supports_truecolor() -> bool {
    std::env::var("COLORTERM")
        .map(|v| v.to_lowercase() == "truecolor")
        .unwrap_or(false)
}

fn colorize(s: &str, true_color: String, ansi_fallback: &str) -> String {
    if supports_truecolor() {
        format!("{BOLD}{true_color}{s}{RESET}")
    } else {
        format!("{BOLD}{ansi_fallback}{s}{RESET}")
    }
}

pub fn positive(s: &str) -> String {
    colorize(s, rgb(0, 255, 0), "\x1b[92m")
}

pub fn negative(s: &str) -> String {
    colorize(s, rgb(255, 0, 0), "\x1b[91m")
}

pub fn info(s: &str) -> String {
    colorize(s, rgb(0, 150, 255), "\x1b[94m")
}

pub fn warning(s: &str) -> String {
    colorize(s, rgb(255, 255, 0), "\x1b[93m")
}

/// Format a monetary amount as `$1,234.56`, negatives as `$-1,234.56`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.abs().round_dp(2);
    let text = format!("{rounded:.2}");
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    format!("${sign}{grouped}.{frac_part}")
}

/// One-line scenario result, green for a net gain and red for a net loss.
pub fn print_scenario(title: &str, result: &ProfitResult) {
    let line = format!(
        "{:.2}% | Net: {}",
        result.price_change_pct,
        format_currency(result.net_amount)
    );

    let (title, line) = if result.net_amount >= Decimal::ZERO {
        (positive(title), positive(&line))
    } else {
        (negative(title), negative(&line))
    };

    println!("{title:<12}: {line}");
}

/// Full field-by-field breakdown of a computed result.
pub fn print_breakdown(result: &ProfitResult, position_size: Decimal) {
    println!("\nResults (Position: {})", format_currency(position_size));
    println!("{:<15}: {:.4}%", "fee rate", result.fee_rate_used * Decimal::from(100));
    println!("{:<15}: {:.3}%", "price change", result.price_change_pct);
    println!("{:<15}: {}", "gross amount", format_currency(result.gross_amount));
    println!("{:<15}: {}", "fees", format_currency(result.fees));
    println!("{:<15}: {}", "net amount", format_currency(result.net_amount));
}

/// Render a parsed advisory with per-field color rules.
pub fn print_advice(advice: &StrategyAdvice) {
    let risk_color: fn(&str) -> String = match advice.risk_assessment.level {
        RiskLevel::Low => positive,
        RiskLevel::Medium => warning,
        RiskLevel::High => negative,
    };

    let rec_color: fn(&str) -> String = match advice.strategic_recommendation {
        Recommendation::Enter => positive,
        Recommendation::Hold | Recommendation::Wait => warning,
        Recommendation::Exit => negative,
    };

    let dir_color: fn(&str) -> String = match advice.direction {
        crate::advisor::Direction::Long => positive,
        crate::advisor::Direction::Short => negative,
    };

    println!("{}", info("Strategic Analysis"));
    println!("{}", "=".repeat(50));

    println!(
        "Risk Assessment: {}",
        risk_color(&advice.risk_assessment.level.to_string())
    );
    println!("   {}", advice.risk_assessment.reasoning);
    println!();

    println!(
        "Strategic Recommendation: {}",
        rec_color(&advice.strategic_recommendation.to_string())
    );
    println!("Direction: {}", dir_color(&advice.direction.to_string()));
    println!();

    println!("{}:", info("Suggested Levels"));
    println!(
        "   Take Profit: {}",
        positive(&format!("${:.4}", advice.suggested_levels.take_profit))
    );
    println!(
        "   Stop Loss:   {}",
        negative(&format!("${:.4}", advice.suggested_levels.stop_loss))
    );
    println!();

    println!("{}:", info("Technical Considerations"));
    println!("   {}", advice.technical_considerations);
    println!();

    println!(
        "{}: {}",
        info("Position Size"),
        advice.position_size_adjustment
    );
    println!();

    let confidence_color: fn(&str) -> String = if advice.confidence_score >= 70 {
        positive
    } else if advice.confidence_score >= 50 {
        warning
    } else {
        negative
    };
    println!(
        "Confidence Score: {}",
        confidence_color(&format!("{}%", advice.confidence_score))
    );
}

/// Fallback when the advisory reply did not match the schema: show it as-is.
pub fn print_raw_advice(raw: &str) {
    println!("{}:", info("AI Analysis"));
    println!("{}", "-".repeat(40));
    println!("{raw}");
}
