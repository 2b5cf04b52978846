use crate::envelope::ComputationError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for prices, ATR, OBV, VWAP and RSI.
pub const PRICE_DP: u32 = 2;
/// Decimal places for MACD, Bollinger values, widths and ratios.
pub const RATIO_DP: u32 = 4;

/// Round a computed value to `dp` places, half to even, without trailing zeros.
///
/// Rounds the exact binary value, so `2.675` (stored just below) gives `2.67`.
pub fn round(metric: &'static str, value: f64, dp: u32) -> Result<Decimal, ComputationError> {
    Decimal::from_f64_retain(value)
        .map(|d| {
            d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
                .normalize()
        })
        .ok_or(ComputationError::NonFinite { metric, value })
}

/// Round an indicator reading that may still be in warm-up.
pub fn round_opt(
    metric: &'static str,
    value: Option<f64>,
    dp: u32,
) -> Result<Option<Decimal>, ComputationError> {
    value.map(|v| round(metric, v, dp)).transpose()
}

/// Whole units, truncated toward zero.
pub fn whole(metric: &'static str, value: f64) -> Result<u64, ComputationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value.trunc() as u64)
    } else {
        Err(ComputationError::NonFinite { metric, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_places() {
        assert_eq!(round("x", 101.23456, PRICE_DP).unwrap(), dec!(101.23));
        assert_eq!(round("x", -0.123456, RATIO_DP).unwrap(), dec!(-0.1235));
        assert_eq!(round("x", 100.0, PRICE_DP).unwrap().to_string(), "100");
        assert_eq!(round("x", 0.125, PRICE_DP).unwrap(), dec!(0.12));
    }

    #[test]
    fn test_round_uses_binary_value() {
        assert_eq!(round("x", 2.675, PRICE_DP).unwrap(), dec!(2.67));
        assert_eq!(round("x", 1.005, PRICE_DP).unwrap(), dec!(1));
        assert_eq!(round("x", 0.1 + 0.2, RATIO_DP).unwrap(), dec!(0.3));
    }

    #[test]
    fn test_round_rejects_nan() {
        assert!(matches!(
            round("RSI", f64::NAN, PRICE_DP),
            Err(ComputationError::NonFinite { metric: "RSI", .. })
        ));
        assert!(round("x", f64::INFINITY, PRICE_DP).is_err());
    }

    #[test]
    fn test_round_opt_keeps_undefined() {
        assert_eq!(round_opt("x", None, PRICE_DP).unwrap(), None);
        assert_eq!(round_opt("x", Some(1.005), PRICE_DP).unwrap().map(|d| d.scale() <= 2), Some(true));
    }

    #[test]
    fn test_whole_truncates() {
        assert_eq!(whole("v", 1234.99).unwrap(), 1234);
        assert!(whole("v", -1.0).is_err());
    }
}
