//! Heuristic order-timing estimator.
//!
//! Everything here is a pure function of an order history snapshot and an
//! explicit `now`. Nothing is cached and no order is ever modified.

use crate::state::lifecycle;
use chrono::{DateTime, Duration, Utc};
use restaurant_types::{
	minutes_between, ComplexityLevel, Insight, InsightKind, InsightPriority, Order, OrderInsights,
	OrderStatus, Recommendation, StatusPrediction, StatusStats,
};
use std::collections::HashMap;

/// Base confidence for any prediction, in percent.
const BASE_CONFIDENCE: f64 = 50.0;
/// Upper bound on confidence, in percent.
const MAX_CONFIDENCE: f64 = 95.0;
/// Confidence starts rising once elapsed time reaches this share of expected.
const RISE_THRESHOLD: f64 = 0.8;
/// Percentage points gained per multiple of the expected time.
const RISE_RATE: f64 = 30.0;

/// Recommendations below this confidence are dropped.
pub const MIN_RECOMMENDATION_CONFIDENCE: u8 = 50;

/// Floor estimates, in minutes, used when a status has no history.
pub fn fallback_minutes(status: OrderStatus) -> f64 {
	match status {
		OrderStatus::Pending => 0.0,
		OrderStatus::Confirmed => 2.0,
		OrderStatus::Preparing => 10.0,
		OrderStatus::Ready => 5.0,
		OrderStatus::Delivered | OrderStatus::Cancelled => 0.0,
	}
}

/// Summarizes minutes between creation and last update, bucketed by each
/// order's current status.
///
/// Orders whose last update precedes their creation are skipped.
pub fn historical_averages(orders: &[Order]) -> HashMap<OrderStatus, StatusStats> {
	let mut buckets: HashMap<OrderStatus, Vec<f64>> = HashMap::new();
	for order in orders {
		if order.updated_at < order.created_at {
			continue;
		}
		buckets
			.entry(order.status)
			.or_default()
			.push(minutes_between(order.created_at, order.updated_at));
	}

	buckets
		.into_iter()
		.map(|(status, samples)| {
			let count = samples.len();
			let sum: f64 = samples.iter().sum();
			let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
			let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
			(
				status,
				StatusStats {
					avg: sum / count as f64,
					min,
					max,
					count,
				},
			)
		})
		.collect()
}

/// Estimates built from one history snapshot.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
	averages: HashMap<OrderStatus, StatusStats>,
}

impl Estimator {
	pub fn from_history(orders: &[Order]) -> Self {
		Self {
			averages: historical_averages(orders),
		}
	}

	/// Expected minutes for a status: the historical average when there is
	/// at least one sample, otherwise the fallback.
	pub fn expected_minutes(&self, status: OrderStatus) -> f64 {
		match self.averages.get(&status) {
			Some(stats) if stats.count >= 1 => stats.avg,
			_ => fallback_minutes(status),
		}
	}

	/// Suggests the next status. `None` for delivered or cancelled orders.
	pub fn predict_next_status(&self, order: &Order, now: DateTime<Utc>) -> Option<StatusPrediction> {
		let next = lifecycle::next(order.status)?;
		let elapsed = minutes_between(order.created_at, now);
		let expected = self.expected_minutes(next);

		Some(StatusPrediction {
			suggested_status: next,
			confidence: confidence(elapsed, expected),
			elapsed_minutes: elapsed.round() as i64,
			expected_minutes: expected.round() as i64,
			reason: reason(order.status, next, elapsed),
		})
	}

	/// `now` plus the expected minutes of every status still ahead.
	/// `None` for delivered or cancelled orders.
	pub fn estimated_delivery(&self, order: &Order, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
		if lifecycle::is_terminal(order.status) {
			return None;
		}
		let remaining: f64 = lifecycle::remaining_after(order.status)
			.iter()
			.map(|status| self.expected_minutes(*status))
			.sum();
		Some(now + Duration::milliseconds((remaining * 60_000.0).round() as i64))
	}

	/// Full analysis of one order.
	pub fn order_insights(&self, order: &Order, now: DateTime<Utc>) -> OrderInsights {
		let elapsed = minutes_between(order.created_at, now);
		let complexity_level = complexity(order);

		OrderInsights {
			order_id: order.id,
			current_status: order.status,
			elapsed_minutes: elapsed.round() as i64,
			prediction: self.predict_next_status(order, now),
			estimated_delivery: self.estimated_delivery(order, now),
			complexity_level,
			item_count: order.item_count(),
			insights: insights(order, elapsed, complexity_level),
		}
	}

	/// Suggested moves for active orders, most confident first.
	///
	/// Ties keep the input order.
	pub fn recommendations(
		&self,
		orders: &[Order],
		now: DateTime<Utc>,
		limit: usize,
	) -> Vec<Recommendation> {
		let mut recommendations: Vec<Recommendation> = orders
			.iter()
			.filter(|order| !lifecycle::is_terminal(order.status))
			.filter_map(|order| {
				let prediction = self.predict_next_status(order, now)?;
				if prediction.confidence < MIN_RECOMMENDATION_CONFIDENCE {
					return None;
				}
				Some(Recommendation {
					order_id: order.id,
					customer_name: order.customer_name.clone(),
					current_status: order.status,
					suggested_status: prediction.suggested_status,
					recommended_action: format!("Move to {}", prediction.suggested_status),
					confidence: prediction.confidence,
					reason: prediction.reason,
					elapsed_minutes: prediction.elapsed_minutes,
				})
			})
			.collect();

		recommendations.sort_by(|a, b| b.confidence.cmp(&a.confidence));
		recommendations.truncate(limit);
		recommendations
	}
}

/// Confidence percentage for a transition given elapsed and expected minutes.
///
/// A zero expectation is overdue as soon as the order exists.
pub fn confidence(elapsed: f64, expected: f64) -> u8 {
	let percent = if expected <= 0.0 {
		if elapsed >= 0.0 {
			MAX_CONFIDENCE
		} else {
			BASE_CONFIDENCE
		}
	} else if elapsed >= RISE_THRESHOLD * expected {
		(BASE_CONFIDENCE + elapsed / expected * RISE_RATE).min(MAX_CONFIDENCE)
	} else {
		BASE_CONFIDENCE
	};
	percent.round() as u8
}

/// Canned explanation for a suggested move.
pub fn reason(current: OrderStatus, next: OrderStatus, elapsed: f64) -> String {
	use OrderStatus::*;

	let phrase = match (current, next) {
		(Pending, Confirmed) if elapsed >= 3.0 => {
			"Order has been pending for a while. Consider confirming it."
		},
		(Pending, Confirmed) => "Order is new. You can confirm it when ready.",
		(Confirmed, Preparing) if elapsed >= 5.0 => {
			"Order confirmed. Kitchen should start preparing now."
		},
		(Confirmed, Preparing) => "Order confirmed. Ready to move to preparation.",
		(Preparing, Ready) if elapsed >= 15.0 => {
			"Order has been preparing for a while. Should be ready soon."
		},
		(Preparing, Ready) => "Order is being prepared. Monitor progress.",
		(Ready, Delivered) if elapsed >= 5.0 => {
			"Order is ready and waiting. Should be delivered soon."
		},
		(Ready, Delivered) => "Order is ready for delivery.",
		_ => return format!("Time to move from {} to {}", current, next),
	};
	phrase.to_string()
}

/// Classifies how much work an order represents.
pub fn complexity(order: &Order) -> ComplexityLevel {
	let units = order.item_count();
	let lines = order.line_count();
	if units > 10 || lines > 5 {
		ComplexityLevel::High
	} else if units < 3 && lines < 2 {
		ComplexityLevel::Low
	} else {
		ComplexityLevel::Normal
	}
}

/// Warnings for orders lingering in a status, plus a note for complex orders.
pub fn insights(order: &Order, elapsed_minutes: f64, complexity: ComplexityLevel) -> Vec<Insight> {
	let warning = |message: &str| Insight {
		kind: InsightKind::Warning,
		message: message.to_string(),
		priority: InsightPriority::High,
	};

	let mut insights = Vec::new();
	match order.status {
		OrderStatus::Pending if elapsed_minutes > 10.0 => insights.push(warning(
			"Order has been pending for over 10 minutes. Consider confirming soon.",
		)),
		OrderStatus::Preparing if elapsed_minutes > 30.0 => insights.push(warning(
			"Order has been preparing for over 30 minutes. Check kitchen status.",
		)),
		_ => {},
	}

	if complexity == ComplexityLevel::High {
		insights.push(Insight {
			kind: InsightKind::Info,
			message: "This is a complex order with multiple items. May take longer to prepare."
				.to_string(),
			priority: InsightPriority::Medium,
		});
	}

	if order.status == OrderStatus::Ready && elapsed_minutes > 15.0 {
		insights.push(warning("Order is ready but not yet delivered. Expedite delivery."));
	}

	insights
}

#[cfg(test)]
mod tests {
	use super::*;
	use restaurant_types::LineItem;
	use rust_decimal::Decimal;

	fn t0() -> DateTime<Utc> {
		DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
			.unwrap()
			.with_timezone(&Utc)
	}

	fn minutes(n: i64) -> Duration {
		Duration::minutes(n)
	}

	fn order(id: u64, status: OrderStatus, created: DateTime<Utc>, updated: DateTime<Utc>) -> Order {
		Order {
			id,
			customer_name: format!("Customer {}", id),
			customer_phone: String::new(),
			payment_mode: "cash".into(),
			items: vec![LineItem::new(1, "Idli", 1, Decimal::from(30))],
			subtotal: Decimal::from(30),
			tax_amount: Decimal::ZERO,
			total_amount: Decimal::from(30),
			status,
			created_at: created,
			updated_at: updated,
		}
	}

	fn with_items(mut order: Order, lines: &[(u64, u32)]) -> Order {
		order.items = lines
			.iter()
			.map(|(id, qty)| LineItem::new(*id, "Dish", *qty, Decimal::from(10)))
			.collect();
		order
	}

	#[test]
	fn test_historical_averages_bucket_by_current_status() {
		let history = vec![
			order(1, OrderStatus::Confirmed, t0(), t0() + minutes(4)),
			order(2, OrderStatus::Confirmed, t0(), t0() + minutes(6)),
			order(3, OrderStatus::Ready, t0(), t0() + minutes(20)),
			order(4, OrderStatus::Ready, t0(), t0() - minutes(1)),
		];
		let averages = historical_averages(&history);

		let confirmed = averages[&OrderStatus::Confirmed];
		assert_eq!(confirmed.count, 2);
		assert_eq!(confirmed.avg, 5.0);
		assert_eq!(confirmed.min, 4.0);
		assert_eq!(confirmed.max, 6.0);
		assert_eq!(averages[&OrderStatus::Ready].count, 1);
		assert!(!averages.contains_key(&OrderStatus::Pending));
	}

	#[test]
	fn test_prediction_at_twelve_minutes_with_five_minute_average() {
		let history = vec![order(9, OrderStatus::Confirmed, t0(), t0() + minutes(5))];
		let estimator = Estimator::from_history(&history);
		let pending = order(1, OrderStatus::Pending, t0(), t0());

		let prediction = estimator
			.predict_next_status(&pending, t0() + minutes(12))
			.unwrap();
		assert_eq!(prediction.suggested_status, OrderStatus::Confirmed);
		assert_eq!(prediction.expected_minutes, 5);
		assert_eq!(prediction.elapsed_minutes, 12);
		assert!(prediction.confidence >= 50);
		assert_eq!(prediction.confidence, 95);
		assert_eq!(
			prediction.reason,
			"Order has been pending for a while. Consider confirming it."
		);
	}

	#[test]
	fn test_confidence_formula() {
		assert_eq!(confidence(1.0, 10.0), 50);
		assert_eq!(confidence(9.0, 10.0), 77);
		assert_eq!(confidence(10.0, 10.0), 80);
		assert_eq!(confidence(100.0, 10.0), 95);
		assert_eq!(confidence(0.0, 0.0), 95);
	}

	#[test]
	fn test_fallback_used_without_history() {
		let estimator = Estimator::default();
		let preparing = order(1, OrderStatus::Preparing, t0(), t0());
		let prediction = estimator
			.predict_next_status(&preparing, t0() + minutes(2))
			.unwrap();
		assert_eq!(prediction.suggested_status, OrderStatus::Ready);
		assert_eq!(prediction.expected_minutes, 5);
		assert_eq!(prediction.confidence, 50);
		assert_eq!(prediction.reason, "Order is being prepared. Monitor progress.");
	}

	#[test]
	fn test_no_prediction_for_terminal_orders() {
		let estimator = Estimator::default();
		for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
			let done = order(1, status, t0(), t0());
			assert!(estimator.predict_next_status(&done, t0() + minutes(90)).is_none());
			assert!(estimator.estimated_delivery(&done, t0()).is_none());
		}
	}

	#[test]
	fn test_estimated_delivery_sums_remaining_statuses() {
		let estimator = Estimator::default();
		let pending = order(1, OrderStatus::Pending, t0(), t0());
		// confirmed 2 + preparing 10 + ready 5 + delivered 0
		assert_eq!(
			estimator.estimated_delivery(&pending, t0()),
			Some(t0() + minutes(17))
		);
		let ready = order(2, OrderStatus::Ready, t0(), t0());
		assert_eq!(estimator.estimated_delivery(&ready, t0()), Some(t0()));
	}

	#[test]
	fn test_estimated_delivery_moves_with_now_only() {
		let history = vec![order(9, OrderStatus::Preparing, t0(), t0() + minutes(13))];
		let estimator = Estimator::from_history(&history);
		let confirmed = order(1, OrderStatus::Confirmed, t0(), t0());

		let earlier = estimator.estimated_delivery(&confirmed, t0() + minutes(3)).unwrap();
		let later = estimator.estimated_delivery(&confirmed, t0() + minutes(7)).unwrap();
		assert!(later >= earlier);
		assert_eq!(later - earlier, minutes(4));
	}

	#[test]
	fn test_complexity_levels() {
		let base = order(1, OrderStatus::Pending, t0(), t0());
		assert_eq!(complexity(&with_items(base.clone(), &[(1, 2)])), ComplexityLevel::Low);
		assert_eq!(
			complexity(&with_items(base.clone(), &[(1, 1), (2, 1)])),
			ComplexityLevel::Normal
		);
		assert_eq!(complexity(&with_items(base.clone(), &[(1, 11)])), ComplexityLevel::High);
		let six_lines: Vec<(u64, u32)> = (1..=6).map(|id| (id, 1)).collect();
		assert_eq!(complexity(&with_items(base, &six_lines)), ComplexityLevel::High);
	}

	#[test]
	fn test_complexity_with_maximum_quantities() {
		let bulk = with_items(
			order(1, OrderStatus::Pending, t0(), t0()),
			&[(1, u32::MAX), (2, u32::MAX)],
		);
		assert_eq!(bulk.item_count(), 2 * u64::from(u32::MAX));
		assert_eq!(complexity(&bulk), ComplexityLevel::High);

		let report = Estimator::default().order_insights(&bulk, t0() + minutes(1));
		assert_eq!(report.item_count, 2 * u64::from(u32::MAX));
		assert_eq!(report.complexity_level, ComplexityLevel::High);
	}

	#[test]
	fn test_insight_rules() {
		let pending = order(1, OrderStatus::Pending, t0(), t0());
		let found = insights(&pending, 11.0, ComplexityLevel::Normal);
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].kind, InsightKind::Warning);
		assert_eq!(found[0].priority, InsightPriority::High);

		assert!(insights(&pending, 10.0, ComplexityLevel::Normal).is_empty());

		let ready = order(2, OrderStatus::Ready, t0(), t0());
		let found = insights(&ready, 16.0, ComplexityLevel::High);
		assert_eq!(found.len(), 2);
		assert_eq!(found[0].kind, InsightKind::Info);
		assert!(found[1].message.contains("Expedite delivery"));

		let preparing = order(3, OrderStatus::Preparing, t0(), t0());
		assert_eq!(insights(&preparing, 31.0, ComplexityLevel::Low).len(), 1);
	}

	#[test]
	fn test_recommendations_sorted_and_bounded() {
		let estimator = Estimator::default();
		let now = t0() + minutes(30);
		let orders = vec![
			order(1, OrderStatus::Preparing, t0() + minutes(28), t0()),
			order(2, OrderStatus::Pending, t0(), t0()),
			order(3, OrderStatus::Delivered, t0(), t0()),
			order(4, OrderStatus::Confirmed, t0() + minutes(20), t0()),
			order(5, OrderStatus::Cancelled, t0(), t0()),
		];

		let recommendations = estimator.recommendations(&orders, now, 10);
		let ids: Vec<u64> = recommendations.iter().map(|r| r.order_id).collect();
		assert_eq!(ids, vec![2, 4, 1]);
		assert!(recommendations
			.windows(2)
			.all(|pair| pair[0].confidence >= pair[1].confidence));
		assert!(recommendations.iter().all(|r| r.confidence >= 50));
		assert_eq!(recommendations[0].recommended_action, "Move to confirmed");

		assert_eq!(estimator.recommendations(&orders, now, 2).len(), 2);
	}

	#[test]
	fn test_recommendations_use_history_averages() {
		let history = vec![
			order(10, OrderStatus::Confirmed, t0(), t0() + minutes(4)),
			order(11, OrderStatus::Preparing, t0(), t0() + minutes(20)),
		];
		let estimator = Estimator::from_history(&history);
		let now = t0() + minutes(60);
		let active = vec![
			order(1, OrderStatus::Confirmed, now - minutes(10), now - minutes(10)),
			order(2, OrderStatus::Pending, now - minutes(4), now - minutes(4)),
			order(3, OrderStatus::Confirmed, now - minutes(18), now - minutes(18)),
		];

		let recommendations = estimator.recommendations(&active, now, 10);
		let ranked: Vec<(u64, u8)> = recommendations
			.iter()
			.map(|r| (r.order_id, r.confidence))
			.collect();
		assert_eq!(ranked, vec![(2, 80), (3, 77), (1, 50)]);
		assert_eq!(recommendations[1].recommended_action, "Move to preparing");

		// Without history every one of these is overdue against the fallbacks.
		let fallback = Estimator::default().recommendations(&active, now, 10);
		assert!(fallback.iter().all(|r| r.confidence == 95));
	}

	#[test]
	fn test_reason_default_template() {
		assert_eq!(
			reason(OrderStatus::Pending, OrderStatus::Preparing, 1.0),
			"Time to move from pending to preparing"
		);
	}

	#[test]
	fn test_order_insights_assembles_fields() {
		let estimator = Estimator::default();
		let pending = with_items(order(7, OrderStatus::Pending, t0(), t0()), &[(1, 2), (2, 3)]);
		let report = estimator.order_insights(&pending, t0() + minutes(12));

		assert_eq!(report.order_id, 7);
		assert_eq!(report.elapsed_minutes, 12);
		assert_eq!(report.item_count, 5);
		assert_eq!(report.complexity_level, ComplexityLevel::Normal);
		assert!(report.prediction.is_some());
		assert_eq!(report.estimated_delivery, Some(t0() + minutes(29)));
		assert_eq!(report.insights.len(), 1);
	}
}
