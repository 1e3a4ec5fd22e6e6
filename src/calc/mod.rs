//! Core profit/loss calculation for spot-market trades.
//!
//! Pure functions only: each computation is independent, touches no shared
//! state, and returns bit-identical output for identical input.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// Binance spot fee, 0.10% per trade.
pub const STANDARD_FEE_RATE: Decimal = dec!(0.0010);

/// Binance spot fee with the BNB discount, 0.075% per trade.
pub const DISCOUNTED_FEE_RATE: Decimal = dec!(0.00075);

/// Selector between the standard and the discounted trading-fee rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeTier {
    Standard,
    Discounted,
}

impl FeeTier {
    /// The fee rate this tier resolves to.
    pub fn rate(&self) -> Decimal {
        match self {
            FeeTier::Standard => STANDARD_FEE_RATE,
            FeeTier::Discounted => DISCOUNTED_FEE_RATE,
        }
    }
}

/// Input to a single profit/loss computation.
///
/// `position_size` is the notional USD size, not margin. A negative size is
/// accepted and acts as a plain sign multiplier on the gross amount (and the
/// fees); no short-position special-casing is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeQuote {
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub position_size: Decimal,
    pub fee_tier: FeeTier,
    /// Multiplier on the raw percentage move; 1 for an unleveraged spot position.
    pub leverage: Decimal,
}

impl TradeQuote {
    /// Quote for an unleveraged spot position (leverage = 1).
    pub fn spot(
        entry_price: Decimal,
        exit_price: Decimal,
        position_size: Decimal,
        fee_tier: FeeTier,
    ) -> Self {
        Self {
            entry_price,
            exit_price,
            position_size,
            fee_tier,
            leverage: Decimal::ONE,
        }
    }
}

/// Outcome of a profit/loss computation, rounded for display at the output
/// boundary only: percentages to 3 decimal places, monetary amounts to 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfitResult {
    /// Raw price change, in percent.
    pub price_change_pct: Decimal,
    /// Price change scaled by leverage, in percent.
    pub gross_pct: Decimal,
    /// Profit or loss before fees, in USD.
    pub gross_amount: Decimal,
    /// Trading fees charged on the position, in USD.
    pub fees: Decimal,
    /// Profit or loss after fees, in USD.
    pub net_amount: Decimal,
    /// The resolved fee rate, exposed for display and audit.
    pub fee_rate_used: Decimal,
}

/// Calculator mapping a [`TradeQuote`] to a [`ProfitResult`].
pub struct ProfitCalculator;

impl ProfitCalculator {
    /// Compute percentage change, gross P&L, fees, and net P&L for a quote.
    ///
    /// Fees are charged once per computation (`position_size * fee_rate`),
    /// treating the rate as a blended round-trip cost rather than charging
    /// each leg separately. Rounding happens only on the returned fields,
    /// never between intermediate steps.
    pub fn compute(quote: &TradeQuote) -> Result<ProfitResult, CalcError> {
        if quote.entry_price <= Decimal::ZERO {
            return Err(CalcError::InvalidInput(format!(
                "entry price must be positive, got {}",
                quote.entry_price
            )));
        }

        let fee_rate = quote.fee_tier.rate();
        let price_change = (quote.exit_price - quote.entry_price) / quote.entry_price;
        let gross_pct = price_change * quote.leverage;
        let gross_amount = quote.position_size * gross_pct;
        let fees = quote.position_size * fee_rate;
        let net_amount = gross_amount - fees;

        Ok(ProfitResult {
            price_change_pct: (price_change * dec!(100)).round_dp(3),
            gross_pct: (gross_pct * dec!(100)).round_dp(3),
            gross_amount: gross_amount.round_dp(2),
            fees: fees.round_dp(2),
            net_amount: net_amount.round_dp(2),
            fee_rate_used: fee_rate,
        })
    }
}

/// Risk/reward metrics for a proposed entry with take-profit and stop-loss
/// levels. Percentages are unrounded; callers format for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskReward {
    pub risk_pct: Decimal,
    pub reward_pct: Decimal,
    pub ratio: Decimal,
}

impl RiskReward {
    /// Derive risk/reward from the proposed levels.
    pub fn from_levels(
        entry: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
    ) -> Result<Self, CalcError> {
        if entry <= Decimal::ZERO {
            return Err(CalcError::InvalidInput(format!(
                "entry price must be positive, got {entry}"
            )));
        }

        let risk_pct = (stop_loss - entry).abs() / entry * dec!(100);
        let reward_pct = (take_profit - entry).abs() / entry * dec!(100);
        let ratio = if risk_pct > Decimal::ZERO {
            reward_pct / risk_pct
        } else {
            Decimal::ZERO
        };

        Ok(Self {
            risk_pct,
            reward_pct,
            ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(entry: Decimal, exit: Decimal, size: Decimal, tier: FeeTier) -> ProfitResult {
        ProfitCalculator::compute(&TradeQuote::spot(entry, exit, size, tier)).unwrap()
    }

    #[test]
    fn test_flat_price_nets_to_minus_fees() {
        for entry in [dec!(0.0001), dec!(1), dec!(100), dec!(43250.10)] {
            let r = compute(entry, entry, dec!(1000), FeeTier::Standard);
            assert_eq!(r.price_change_pct, Decimal::ZERO);
            assert_eq!(r.gross_amount, Decimal::ZERO);
            assert_eq!(r.net_amount, -r.fees);
        }
    }

    #[test]
    fn test_fees_independent_of_exit_price() {
        for exit in [dec!(1), dec!(90), dec!(100), dec!(110), dec!(100000)] {
            let r = compute(dec!(100), exit, dec!(1000), FeeTier::Standard);
            assert_eq!(r.fees, dec!(1.00));

            let r = compute(dec!(100), exit, dec!(1000), FeeTier::Discounted);
            assert_eq!(r.fees, dec!(0.75));
        }
    }

    #[test]
    fn test_gross_is_not_antisymmetric_under_price_swap() {
        // Percentage change is relative to the entry price, so swapping
        // entry and exit must NOT simply flip the sign of the gross amount.
        let forward = compute(dec!(100), dec!(110), dec!(1000), FeeTier::Standard);
        let reverse = compute(dec!(110), dec!(100), dec!(1000), FeeTier::Standard);

        assert_eq!(forward.gross_amount, dec!(100.00));
        assert_eq!(reverse.gross_amount, dec!(-90.91));
        assert_ne!(forward.gross_amount, -reverse.gross_amount);
    }

    #[test]
    fn test_fee_rate_ordering() {
        assert!(DISCOUNTED_FEE_RATE < STANDARD_FEE_RATE);
        assert!(STANDARD_FEE_RATE > Decimal::ZERO && STANDARD_FEE_RATE < dec!(0.01));
        assert!(DISCOUNTED_FEE_RATE > Decimal::ZERO && DISCOUNTED_FEE_RATE < dec!(0.01));
    }

    #[test]
    fn test_standard_tier_profit_example() {
        let r = compute(dec!(100), dec!(110), dec!(1000), FeeTier::Standard);
        assert_eq!(r.price_change_pct, dec!(10.0));
        assert_eq!(r.gross_amount, dec!(100.00));
        assert_eq!(r.fees, dec!(1.00));
        assert_eq!(r.net_amount, dec!(99.00));
        assert_eq!(r.fee_rate_used, STANDARD_FEE_RATE);
    }

    #[test]
    fn test_discounted_tier_loss_example() {
        let r = compute(dec!(100), dec!(90), dec!(1000), FeeTier::Discounted);
        assert_eq!(r.price_change_pct, dec!(-10.0));
        assert_eq!(r.gross_amount, dec!(-100.00));
        assert_eq!(r.fees, dec!(0.75));
        assert_eq!(r.net_amount, dec!(-100.75));
        assert_eq!(r.fee_rate_used, DISCOUNTED_FEE_RATE);
    }

    #[test]
    fn test_nonpositive_entry_is_invalid() {
        for entry in [Decimal::ZERO, dec!(-1), dec!(-100)] {
            for exit in [dec!(0), dec!(50), dec!(100)] {
                let quote = TradeQuote::spot(entry, exit, dec!(1000), FeeTier::Standard);
                assert!(matches!(
                    ProfitCalculator::compute(&quote),
                    Err(CalcError::InvalidInput(_))
                ));
            }
        }
    }

    #[test]
    fn test_repeating_fraction_rounds_at_output() {
        // 1/3 move: 33.333...% on a $1000 position.
        let r = compute(dec!(3), dec!(4), dec!(1000), FeeTier::Standard);
        assert_eq!(r.price_change_pct, dec!(33.333));
        assert_eq!(r.gross_amount, dec!(333.33));
        assert_eq!(r.fees, dec!(1.00));
        assert_eq!(r.net_amount, dec!(332.33));
    }

    #[test]
    fn test_monetary_midpoint_rounds_to_even() {
        // Gross of exactly $0.045 and $0.035 both land on $0.04.
        let r = compute(dec!(100), dec!(100.0045), dec!(1000), FeeTier::Standard);
        assert_eq!(r.gross_amount, dec!(0.04));

        let r = compute(dec!(100), dec!(100.0035), dec!(1000), FeeTier::Standard);
        assert_eq!(r.gross_amount, dec!(0.04));
    }

    #[test]
    fn test_leverage_scales_gross_not_fees() {
        let quote = TradeQuote {
            entry_price: dec!(100),
            exit_price: dec!(110),
            position_size: dec!(1000),
            fee_tier: FeeTier::Standard,
            leverage: dec!(3),
        };
        let r = ProfitCalculator::compute(&quote).unwrap();

        assert_eq!(r.price_change_pct, dec!(10.0));
        assert_eq!(r.gross_pct, dec!(30.0));
        assert_eq!(r.gross_amount, dec!(300.00));
        assert_eq!(r.fees, dec!(1.00));
        assert_eq!(r.net_amount, dec!(299.00));
    }

    #[test]
    fn test_negative_size_flips_sign() {
        let r = compute(dec!(100), dec!(110), dec!(-1000), FeeTier::Standard);
        assert_eq!(r.gross_amount, dec!(-100.00));
        assert_eq!(r.fees, dec!(-1.00));
        assert_eq!(r.net_amount, dec!(-99.00));
    }

    #[test]
    fn test_idempotent() {
        let quote = TradeQuote::spot(dec!(184.2), dec!(186.5), dec!(2500), FeeTier::Discounted);
        let a = ProfitCalculator::compute(&quote).unwrap();
        let b = ProfitCalculator::compute(&quote).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_risk_reward_from_levels() {
        let rr = RiskReward::from_levels(dec!(100), dec!(110), dec!(95)).unwrap();
        assert_eq!(rr.reward_pct, dec!(10));
        assert_eq!(rr.risk_pct, dec!(5));
        assert_eq!(rr.ratio, dec!(2));
    }

    #[test]
    fn test_risk_reward_zero_risk() {
        let rr = RiskReward::from_levels(dec!(100), dec!(110), dec!(100)).unwrap();
        assert_eq!(rr.risk_pct, Decimal::ZERO);
        assert_eq!(rr.ratio, Decimal::ZERO);
    }

    #[test]
    fn test_risk_reward_rejects_bad_entry() {
        assert!(RiskReward::from_levels(Decimal::ZERO, dec!(110), dec!(95)).is_err());
    }
}
