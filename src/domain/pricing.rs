//! Pricing calculator
//!
//! Pure cost functions. Durations are measured at millisecond resolution and
//! converted to fractional hours with exact decimal arithmetic; stored costs
//! are never rounded.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::DomainResult;
use crate::shared::types::DomainError;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Longest single extension, in hours (31 days).
pub const MAX_EXTENSION_HOURS: i64 = 744;

/// Cost of a booking window together with its length in hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub hours: Decimal,
    pub total: Decimal,
}

fn window_millis(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<i64> {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return Err(DomainError::InvalidDuration(format!(
            "end time {} must be after start time {}",
            end, start
        )));
    }
    Ok(millis)
}

/// Length of `[start, end)` in fractional hours.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Decimal> {
    let millis = window_millis(start, end)?;
    Ok(Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR))
}

/// `price_per_hour × hours(end − start)`.
pub fn cost(
    price_per_hour: Decimal,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DomainResult<Decimal> {
    let millis = window_millis(start, end)?;
    // Multiply before dividing so whole-minute windows stay exact.
    price_per_hour
        .checked_mul(Decimal::from(millis))
        .map(|c| c / Decimal::from(MILLIS_PER_HOUR))
        .ok_or_else(|| DomainError::InvalidDuration("booking cost is out of range".into()))
}

pub fn quote(
    price_per_hour: Decimal,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DomainResult<Quote> {
    Ok(Quote {
        hours: hours_between(start, end)?,
        total: cost(price_per_hour, start, end)?,
    })
}

/// Additional cost of extending by `hours_to_add` at `price_per_hour`.
pub fn extension_cost(price_per_hour: Decimal, hours_to_add: Decimal) -> DomainResult<Decimal> {
    ensure_extension_hours(hours_to_add)?;
    price_per_hour
        .checked_mul(hours_to_add)
        .ok_or_else(|| DomainError::InvalidDuration("extension cost is out of range".into()))
}

/// Hours to add must lie in `(0, MAX_EXTENSION_HOURS]`.
pub fn ensure_extension_hours(hours: Decimal) -> DomainResult<()> {
    if hours <= Decimal::ZERO {
        return Err(DomainError::InvalidDuration(format!(
            "hours to add must be positive, got {}",
            hours
        )));
    }
    if hours > Decimal::from(MAX_EXTENSION_HOURS) {
        return Err(DomainError::InvalidDuration(format!(
            "hours to add must be at most {}, got {}",
            MAX_EXTENSION_HOURS, hours
        )));
    }
    Ok(())
}

/// Convert fractional hours to a duration, truncated to whole milliseconds.
pub fn hours_to_duration(hours: Decimal) -> DomainResult<Duration> {
    ensure_extension_hours(hours)?;
    let millis = (hours * Decimal::from(MILLIS_PER_HOUR))
        .trunc()
        .to_i64()
        .ok_or_else(|| DomainError::InvalidDuration(format!("{} hours is out of range", hours)))?;
    if millis <= 0 {
        return Err(DomainError::InvalidDuration(format!(
            "{} hours is shorter than a millisecond",
            hours
        )));
    }
    Ok(Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn cost_for_whole_hours() {
        let total = cost(dec("50"), t0(), t0() + Duration::hours(2)).unwrap();
        assert_eq!(total, dec("100"));
    }

    #[test]
    fn cost_for_fractional_hours() {
        let total = cost(dec("40"), t0(), t0() + Duration::minutes(90)).unwrap();
        assert_eq!(total, dec("60"));
        let q = quote(dec("40"), t0(), t0() + Duration::minutes(90)).unwrap();
        assert_eq!(q.hours, dec("1.5"));
    }

    #[test]
    fn cost_is_not_rounded() {
        // 20 minutes at 10/h = 3.333...
        let total = cost(dec("10"), t0(), t0() + Duration::minutes(20)).unwrap();
        assert!(total > dec("3.33") && total < dec("3.34"));
        assert_ne!(total, dec("3.33"));
    }

    #[test]
    fn zero_or_negative_window_is_invalid() {
        assert!(matches!(
            cost(dec("50"), t0(), t0()),
            Err(DomainError::InvalidDuration(_))
        ));
        assert!(matches!(
            cost(dec("50"), t0(), t0() - Duration::hours(1)),
            Err(DomainError::InvalidDuration(_))
        ));
    }

    #[test]
    fn extension_cost_uses_given_rate() {
        assert_eq!(extension_cost(dec("50"), dec("2")).unwrap(), dec("100"));
        assert!(extension_cost(dec("50"), Decimal::ZERO).is_err());
        assert!(extension_cost(dec("50"), dec("-1")).is_err());
    }

    #[test]
    fn hours_convert_to_duration() {
        assert_eq!(hours_to_duration(dec("2")).unwrap(), Duration::hours(2));
        assert_eq!(hours_to_duration(dec("0.25")).unwrap(), Duration::minutes(15));
        assert!(hours_to_duration(dec("0")).is_err());
    }

    #[test]
    fn extension_hours_are_capped() {
        assert!(ensure_extension_hours(Decimal::from(MAX_EXTENSION_HOURS)).is_ok());
        assert!(matches!(
            extension_cost(dec("50"), Decimal::from(MAX_EXTENSION_HOURS + 1)),
            Err(DomainError::InvalidDuration(_))
        ));
        assert!(hours_to_duration(dec("10000000000")).is_err());
    }

    #[test]
    fn huge_rate_does_not_overflow() {
        let start = Utc::now();
        assert!(matches!(
            cost(Decimal::MAX, start, start + Duration::hours(2)),
            Err(DomainError::InvalidDuration(_))
        ));
    }
}
