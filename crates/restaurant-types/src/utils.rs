//! Small helpers shared across crates.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Minutes elapsed from `from` to `to`, fractional.
///
/// Negative when `to` precedes `from`.
pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
	(to - from).num_milliseconds() as f64 / 60_000.0
}

/// Rounds a currency amount to two decimal places, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
	amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	#[test]
	fn test_minutes_between() {
		let start = Utc::now();
		assert_eq!(minutes_between(start, start + Duration::seconds(90)), 1.5);
		assert_eq!(minutes_between(start + Duration::minutes(2), start), -2.0);
	}

	#[test]
	fn test_round_money() {
		assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
		assert_eq!(round_money(Decimal::new(9775, 2)), Decimal::new(9775, 2));
	}
}
