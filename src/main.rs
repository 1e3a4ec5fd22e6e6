//! Spot-trading profit/loss calculator.
//!
//! Computes percentage change, gross P&L, fees, and net P&L for a trade,
//! optionally against the live Binance price, with an optional AI-generated
//! strategy suggestion.

mod advisor;
mod analysis;
mod api;
mod calc;
mod display;
mod error;
mod models;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{AdvisorClient, BinanceClient};
use crate::calc::{FeeTier, ProfitCalculator, ProfitResult, RiskReward, TradeQuote};
use crate::error::CalcError;
use crate::models::Interval;

/// Spot-trading P&L calculator CLI.
#[derive(Parser)]
#[command(name = "scalpcalc")]
#[command(about = "Profit/loss calculator for spot trades with live prices and AI suggestions", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute take-profit and stop-loss scenarios offline
    Calc {
        /// Your entry price
        entry_price: Decimal,

        /// Take profit exit price
        take_profit: Decimal,

        /// Stop loss exit price
        stop_loss: Decimal,

        /// USD size of position
        position_size: Decimal,

        /// Use the discounted (BNB) fee rate
        #[arg(long)]
        discount: bool,

        /// Leverage multiplier (1 = spot)
        #[arg(long, default_value = "1")]
        leverage: Decimal,
    },

    /// Fetch the live price and show the full P&L breakdown for your entry
    Price {
        /// Cryptocurrency symbol (e.g., BTC, ETH, SOL)
        token: String,

        /// Your entry price
        entry_price: Decimal,

        /// USD size of position
        position_size: Decimal,

        /// Use the discounted (BNB) fee rate
        #[arg(long)]
        discount: bool,
    },

    /// Analyze a proposed trade: scenarios, risk/reward, optional AI advice
    Strategy {
        /// Cryptocurrency symbol (e.g., BTC, ETH, SOL)
        token: String,

        /// Take profit exit price
        take_profit: Decimal,

        /// Stop loss exit price
        stop_loss: Decimal,

        /// USD size of position
        position_size: Decimal,

        /// Use the discounted (BNB) fee rate
        #[arg(long)]
        discount: bool,

        /// Manual entry price (default: live Binance price)
        #[arg(long)]
        entry: Option<Decimal>,

        /// Request an AI-powered strategy suggestion
        #[arg(long)]
        ai: bool,
    },
}

/// Candle fetch plan for the advisory: (interval, lookback).
const ADVISORY_TIMEFRAMES: [(Interval, u32); 5] = [
    (Interval::M1, 240), // last 4 hours
    (Interval::M15, 26), // same day
    (Interval::H1, 48),  // last 48 hours
    (Interval::W1, 3),   // last 3 weeks
    (Interval::Mo1, 12), // last 12 months
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Calc {
            entry_price,
            take_profit,
            stop_loss,
            position_size,
            discount,
            leverage,
        } => {
            let fee_tier = tier(discount);

            let profit = ProfitCalculator::compute(&TradeQuote {
                entry_price,
                exit_price: take_profit,
                position_size,
                fee_tier,
                leverage,
            })?;
            let loss = ProfitCalculator::compute(&TradeQuote {
                entry_price,
                exit_price: stop_loss,
                position_size,
                fee_tier,
                leverage,
            })?;

            display::print_scenario("TAKE PROFIT", &profit);
            display::print_scenario("STOP LOSS", &loss);
        }

        Commands::Price {
            token,
            entry_price,
            position_size,
            discount,
        } => {
            let symbol = usdt_symbol(&token);
            let client = BinanceClient::new()?;

            println!("Fetching current price for {symbol}...");
            let current_price = client.current_price(&symbol).await?;

            println!("Current price: ${current_price:.4}");
            println!("Your entry price: ${entry_price:.4}");

            let result = ProfitCalculator::compute(&TradeQuote::spot(
                entry_price,
                current_price,
                position_size,
                tier(discount),
            ))?;

            display::print_breakdown(&result, position_size);
        }

        Commands::Strategy {
            token,
            take_profit,
            stop_loss,
            position_size,
            discount,
            entry,
            ai,
        } => {
            let symbol = usdt_symbol(&token);
            let client = BinanceClient::new()?;
            let fee_tier = tier(discount);

            let entry_price = match entry {
                Some(price) => price,
                None => {
                    let price = client.current_price(&symbol).await?;
                    println!(
                        "{}: ${price:.4}",
                        display::info(&format!("{symbol}-CURR"))
                    );
                    price
                }
            };

            let profit = ProfitCalculator::compute(&TradeQuote::spot(
                entry_price,
                take_profit,
                position_size,
                fee_tier,
            ))?;
            let loss = ProfitCalculator::compute(&TradeQuote::spot(
                entry_price,
                stop_loss,
                position_size,
                fee_tier,
            ))?;

            println!();
            display::print_scenario("TAKE PROFIT", &profit);
            display::print_scenario("STOP LOSS", &loss);

            let risk_reward = RiskReward::from_levels(entry_price, take_profit, stop_loss)?;
            println!();
            println!(
                "{}: {:.2} | Risk: {:.2}% | Reward: {:.2}%",
                display::info("Risk/Reward"),
                risk_reward.ratio,
                risk_reward.risk_pct,
                risk_reward.reward_pct
            );

            if ai {
                println!();
                let setup = AdvisorySetup {
                    token: token.to_uppercase(),
                    symbol,
                    entry_price,
                    take_profit,
                    stop_loss,
                    position_size,
                    risk_reward,
                    profit,
                    loss,
                };

                // Advisory failures never sink the run; the numbers above stand.
                if let Err(e) = run_advisory(&client, &setup).await {
                    warn!(error = %e, "Advisory failed");
                    println!("{}", display::warning(&format!("AI suggestion unavailable: {e}")));
                }
            }
        }
    }

    Ok(())
}

/// Inputs the advisory flow needs beyond the candle data.
struct AdvisorySetup {
    token: String,
    symbol: String,
    entry_price: Decimal,
    take_profit: Decimal,
    stop_loss: Decimal,
    position_size: Decimal,
    risk_reward: RiskReward,
    profit: ProfitResult,
    loss: ProfitResult,
}

/// Fetch candles across timeframes, build the prompt, call the advisory
/// service, and render the reply. A malformed reply falls back to raw text;
/// per-timeframe fetch failures only shrink the analysis.
async fn run_advisory(client: &BinanceClient, setup: &AdvisorySetup) -> Result<(), CalcError> {
    let advisor_client = AdvisorClient::from_env()?;

    println!("Fetching technical data...");

    let mut analyses = Vec::new();
    for (interval, limit) in ADVISORY_TIMEFRAMES {
        match client.klines(&setup.symbol, interval, limit).await {
            Ok(candles) => {
                println!("   {:>3} candles: {}", interval.as_str(), candles.len());
                match analysis::analyze(&candles, interval) {
                    Some(a) => analyses.push(a),
                    None => info!(interval = %interval, "Insufficient candle data, skipping timeframe"),
                }
            }
            Err(e) => {
                warn!(interval = %interval, error = %e, "Candle fetch failed, skipping timeframe");
                println!("   {:>3} candles: unavailable", interval.as_str());
            }
        }
    }

    println!("\nAnalyzing with AI...");

    let prompt = advisor::build_prompt(
        &setup.token,
        setup.entry_price,
        setup.entry_price,
        setup.take_profit,
        setup.stop_loss,
        setup.position_size,
        &setup.risk_reward,
        &setup.profit,
        &setup.loss,
        &analyses,
    );

    let raw = advisor_client.request_completion(&prompt).await?;

    println!();
    match advisor::parse_advice(&raw) {
        Ok(advice) => display::print_advice(&advice),
        Err(CalcError::AdvisoryMalformed { raw }) => display::print_raw_advice(&raw),
        Err(e) => return Err(e),
    }

    Ok(())
}

fn tier(discount: bool) -> FeeTier {
    if discount {
        FeeTier::Discounted
    } else {
        FeeTier::Standard
    }
}

/// Binance spot symbols are quoted against USDT.
fn usdt_symbol(token: &str) -> String {
    format!("{}USDT", token.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usdt_symbol_uppercases() {
        assert_eq!(usdt_symbol("btc"), "BTCUSDT");
        assert_eq!(usdt_symbol("SOL"), "SOLUSDT");
    }

    #[test]
    fn test_tier_selection() {
        assert_eq!(tier(false), FeeTier::Standard);
        assert_eq!(tier(true), FeeTier::Discounted);
    }
}
