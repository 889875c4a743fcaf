//! Fee calculation and display/minimal unit conversion.
//!
//! Amounts are integers in the minimal denomination (`sunc`, 10^-6 SUNC)
//! and never pass through floating point. Gas prices come from
//! configuration as `f64` and are fixed to nine decimal places before
//! use, so `ceil(gas × price)` is computed exactly.

use suncity_types::config::{ChainConfig, GasPriceTier, DEFAULT_GAS_LIMIT, MAX_GAS_PRICE};
use suncity_types::{Result, SuncityError};

use crate::message::Coin;
use crate::transaction::Fee;

/// Gas prices are applied at a resolution of 10^-9 minimal units.
const PRICE_SCALE: u128 = 1_000_000_000;

/// Fee amount in minimal units: `ceil(gas_limit × price)`.
///
/// # Errors
///
/// Returns [`SuncityError::InvalidParameter`] for a negative,
/// non-finite or out-of-range price, or if the fee overflows.
pub fn fee_amount(gas_limit: u64, price: f64) -> Result<u128> {
    if !price.is_finite() || !(0.0..=MAX_GAS_PRICE).contains(&price) {
        return Err(SuncityError::InvalidParameter {
            reason: format!("gas price must be a finite number in 0..={MAX_GAS_PRICE}, got {price}"),
        });
    }
    // Bounded by MAX_GAS_PRICE, so the cast cannot saturate.
    let scaled = (price * PRICE_SCALE as f64).round() as u128;
    u128::from(gas_limit)
        .checked_mul(scaled)
        .and_then(|total| total.checked_add(PRICE_SCALE - 1))
        .map(|total| total / PRICE_SCALE)
        .ok_or_else(|| SuncityError::InvalidParameter {
            reason: format!("fee for {gas_limit} gas at {price} overflows"),
        })
}

/// Builds the fee for `gas_limit` at the chain's `tier` price, paid in
/// the minimal denomination.
pub fn calculate_fee(chain: &ChainConfig, gas_limit: u64, tier: GasPriceTier) -> Result<Fee> {
    let amount = fee_amount(gas_limit, chain.gas_price_step.price(tier))?;
    Ok(Fee::new(Coin::new(chain.minimal_denom.clone(), amount), gas_limit))
}

/// [`calculate_fee`] with the default gas limit.
pub fn default_fee(chain: &ChainConfig, tier: GasPriceTier) -> Result<Fee> {
    calculate_fee(chain, DEFAULT_GAS_LIMIT, tier)
}

/// Converts a display amount such as `"1.5"` into minimal units.
///
/// Accepts digits with at most one decimal point and at most `decimals`
/// fractional digits.
///
/// # Errors
///
/// Returns [`SuncityError::InvalidParameter`] for empty or malformed
/// input, excess precision, or overflow.
pub fn parse_amount(display: &str, decimals: u8) -> Result<u128> {
    let invalid = |reason: String| SuncityError::InvalidParameter { reason };
    let trimmed = display.trim();

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid(format!("'{display}' is not an amount")));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("'{display}' is not an amount")));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(invalid(format!(
            "'{display}' has more than {decimals} decimal places"
        )));
    }

    let scale = 10u128
        .checked_pow(u32::from(decimals))
        .ok_or_else(|| invalid(format!("decimals {decimals} too large")))?;
    let overflow = || invalid(format!("'{display}' is too large"));

    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let mut fraction_value: u128 = 0;
    for b in fraction.bytes() {
        fraction_value = fraction_value * 10 + u128::from(b - b'0');
    }
    fraction_value *= 10u128.pow(u32::from(decimals) - fraction.len() as u32);

    whole_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(overflow)
}

/// Renders minimal units as a display amount, trimming trailing zeros:
/// `1_500_000` at 6 decimals is `"1.5"`.
pub fn format_amount(minimal: u128, decimals: u8) -> String {
    if decimals == 0 {
        return minimal.to_string();
    }
    let digits = format!("{minimal:0>width$}", width = usize::from(decimals) + 1);
    let (whole, fraction) = digits.split_at(digits.len() - usize::from(decimals));
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Renders a coin for display, e.g. `"1.5 SUNC"`. Foreign denominations
/// are shown in minimal units.
pub fn format_coin(coin: &Coin, chain: &ChainConfig) -> String {
    if coin.denom == chain.minimal_denom {
        format!("{} {}", format_amount(coin.amount, chain.decimals), chain.coin_denom)
    } else {
        format!("{} {}", coin.amount, coin.denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tiers() -> std::result::Result<(), SuncityError> {
        let chain = ChainConfig::default();
        let expected = [
            (GasPriceTier::Low, 2_000u128),
            (GasPriceTier::Average, 5_000),
            (GasPriceTier::High, 8_000),
        ];
        for (tier, amount) in expected {
            let fee = default_fee(&chain, tier)?;
            assert_eq!(fee.gas_limit, DEFAULT_GAS_LIMIT);
            assert_eq!(fee.amount, vec![Coin::new("sunc", amount)]);
        }
        Ok(())
    }

    #[test]
    fn fee_rounds_up() -> std::result::Result<(), SuncityError> {
        assert_eq!(fee_amount(1, 0.025)?, 1);
        assert_eq!(fee_amount(101, 0.01)?, 2);
        assert_eq!(fee_amount(100, 0.01)?, 1);
        assert_eq!(fee_amount(0, 0.04)?, 0);
        assert!(fee_amount(1, f64::NAN).is_err());
        assert!(fee_amount(1, -0.1).is_err());
        Ok(())
    }

    #[test]
    fn extreme_inputs_return_errors() -> std::result::Result<(), SuncityError> {
        assert!(matches!(
            fee_amount(u64::MAX, 1e11),
            Err(SuncityError::InvalidParameter { .. })
        ));
        assert!(matches!(
            fee_amount(1, MAX_GAS_PRICE * 2.0),
            Err(SuncityError::InvalidParameter { .. })
        ));
        assert_eq!(fee_amount(u64::MAX, 1.0)?, u128::from(u64::MAX));
        assert_eq!(
            fee_amount(u64::MAX, MAX_GAS_PRICE)?,
            u128::from(u64::MAX) * 1_000_000
        );
        Ok(())
    }

    #[test]
    fn parse_amounts() -> std::result::Result<(), SuncityError> {
        assert_eq!(parse_amount("1.5", 6)?, 1_500_000);
        assert_eq!(parse_amount("0.000001", 6)?, 1);
        assert_eq!(parse_amount(" 42 ", 6)?, 42_000_000);
        assert_eq!(parse_amount(".5", 6)?, 500_000);
        assert_eq!(parse_amount("3.", 6)?, 3_000_000);
        assert_eq!(parse_amount("7", 0)?, 7);
        Ok(())
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", ".", "1.2.3", "-1", "1e6", "abc", "1.0000001", "1,5"] {
            assert!(parse_amount(bad, 6).is_err(), "{bad}");
        }
        assert!(parse_amount(&"9".repeat(40), 6).is_err());
    }

    #[test]
    fn format_amounts() {
        assert_eq!(format_amount(1_500_000, 6), "1.5");
        assert_eq!(format_amount(1, 6), "0.000001");
        assert_eq!(format_amount(0, 6), "0");
        assert_eq!(format_amount(42_000_000, 6), "42");
        assert_eq!(format_amount(7, 0), "7");
    }

    #[test]
    fn format_coin_uses_display_denom() {
        let chain = ChainConfig::default();
        assert_eq!(format_coin(&Coin::new("sunc", 2_500_000), &chain), "2.5 SUNC");
        assert_eq!(format_coin(&Coin::new("uatom", 10), &chain), "10 uatom");
    }
}
