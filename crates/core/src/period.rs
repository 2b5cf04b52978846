use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::traits::DataError;

/// Calendar unit of a lookback period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    Days,
    Months,
    Years,
}

impl PeriodUnit {
    fn suffix(&self) -> &'static str {
        match self {
            PeriodUnit::Days => "d",
            PeriodUnit::Months => "mo",
            PeriodUnit::Years => "y",
        }
    }
}

/// A lookback window such as `200d`, `3mo` or `1y`.
///
/// The number of bars inside the window depends on the market calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub count: u32,
    pub unit: PeriodUnit,
}

impl Period {
    pub fn days(count: u32) -> Self {
        Self {
            count,
            unit: PeriodUnit::Days,
        }
    }

    pub fn months(count: u32) -> Self {
        Self {
            count,
            unit: PeriodUnit::Months,
        }
    }

    pub fn years(count: u32) -> Self {
        Self {
            count,
            unit: PeriodUnit::Years,
        }
    }

    /// Start of the calendar window that ends at `end`.
    ///
    /// Windows reaching past chrono's range start at `DateTime::MIN_UTC`.
    pub fn start_before(&self, end: DateTime<Utc>) -> DateTime<Utc> {
        let months = match self.unit {
            PeriodUnit::Days => {
                return Duration::try_days(i64::from(self.count))
                    .and_then(|days| end.checked_sub_signed(days))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC)
            }
            PeriodUnit::Months => self.count,
            PeriodUnit::Years => self.count.saturating_mul(12),
        };
        end.checked_sub_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}

impl FromStr for Period {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| DataError::InvalidPeriod(s.to_string()))?;
        let (digits, suffix) = s.split_at(split);

        let count: u32 = digits
            .parse()
            .map_err(|_| DataError::InvalidPeriod(s.to_string()))?;
        if count == 0 {
            return Err(DataError::InvalidPeriod(s.to_string()));
        }

        let unit = match suffix.to_ascii_lowercase().as_str() {
            "d" => PeriodUnit::Days,
            "mo" => PeriodUnit::Months,
            "y" => PeriodUnit::Years,
            _ => return Err(DataError::InvalidPeriod(s.to_string())),
        };

        Ok(Self { count, unit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_periods() {
        assert_eq!("200d".parse::<Period>().unwrap(), Period::days(200));
        assert_eq!("3mo".parse::<Period>().unwrap(), Period::months(3));
        assert_eq!("1y".parse::<Period>().unwrap(), Period::years(1));
        assert_eq!(" 2Y ".parse::<Period>().unwrap(), Period::years(2));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for bad in ["", "d", "12", "0d", "3w", "-1d", "1.5y"] {
            let err = bad.parse::<Period>().unwrap_err();
            assert!(matches!(err, DataError::InvalidPeriod(_)), "{bad}");
        }
    }

    #[test]
    fn test_display_round_trips_suffix() {
        assert_eq!(Period::months(3).to_string(), "3mo");
        assert_eq!(Period::days(200).to_string(), "200d");
    }

    #[test]
    fn test_start_before() {
        let end = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        assert_eq!(
            Period::days(10).start_before(end),
            Utc.with_ymd_and_hms(2024, 3, 21, 0, 0, 0).unwrap()
        );
        // Clamped to the last day of February.
        assert_eq!(
            Period::months(1).start_before(end),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
        assert_eq!(
            Period::years(1).start_before(end),
            Utc.with_ymd_and_hms(2023, 3, 31, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_before_saturates_out_of_range() {
        let end = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let huge_days: Period = "999999999d".parse().unwrap();
        assert_eq!(huge_days.start_before(end), DateTime::<Utc>::MIN_UTC);
        assert_eq!(Period::days(u32::MAX).start_before(end), DateTime::<Utc>::MIN_UTC);
        assert_eq!(Period::years(u32::MAX).start_before(end), DateTime::<Utc>::MIN_UTC);
    }
}
