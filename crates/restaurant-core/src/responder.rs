//! Canned-text query responder.
//!
//! A closed decision table: the query is lower-cased, an order id is pulled
//! out of it when the caller did not supply one, and keyword containment
//! picks the intent. Checked in order: status, delivery time, help.

use crate::state::lifecycle;
use chrono::{DateTime, Local, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use restaurant_types::{ChatResponse, Order, OrderInsights, OrderStatus};

static ORDER_REFERENCE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"(?i)order\s*(?:#|number)?\s*(\d+)").expect("valid order reference pattern")
});

static TRAILING_DIGITS: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(\d+)\s*$").expect("valid trailing digits pattern"));

const STATUS_KEYWORDS: &[&str] = &["status", "where", "track"];
const TIME_KEYWORDS: &[&str] = &["time", "when", "how long"];
const HELP_KEYWORDS: &[&str] = &["help", "what can"];

const ASK_FOR_ID: &str = "I can help you track your order! Please provide your order number. \
	For example: 'Track order #123' or 'What's the status of order 123?'";
const ASK_FOR_ID_TIME: &str = "To check delivery time, please provide your order number.";
const READY_SOON: &str =
	"Your order should be ready very soon! Please check with the restaurant for exact timing.";
const HELP_TEXT: &str = "I can help you with:\n\n\
	• Track your order status\n\
	• Check estimated delivery time\n\
	• Get order updates\n\n\
	Just ask me like:\n\
	- 'Track order #123'\n\
	- 'What's the status of order 123?'\n\
	- 'When will order 123 be ready?'";
const GENERAL_TEXT: &str = "I'm here to help you track your order! You can ask me:\n\n\
	• 'Track order #123' - to check order status\n\
	• 'When will order 123 be ready?' - for delivery time\n\
	• 'Help' - for more options";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
	Status,
	DeliveryTime,
	Help,
	General,
}

/// A classified query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedQuery {
	pub intent: QueryIntent,
	pub order_id: Option<u64>,
}

impl ParsedQuery {
	/// Order the reply should be built from, when the intent needs one.
	pub fn lookup_id(&self) -> Option<u64> {
		match self.intent {
			QueryIntent::Status | QueryIntent::DeliveryTime => self.order_id,
			QueryIntent::Help | QueryIntent::General => None,
		}
	}
}

/// Finds an order id in free text.
pub fn extract_order_id(query: &str) -> Option<u64> {
	ORDER_REFERENCE
		.captures(query)
		.or_else(|| TRAILING_DIGITS.captures(query))
		.and_then(|captures| captures.get(1))
		.and_then(|m| m.as_str().parse().ok())
}

pub fn parse_query(query: &str, supplied_id: Option<u64>) -> ParsedQuery {
	let lower = query.to_lowercase();
	let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

	let intent = if contains_any(STATUS_KEYWORDS) {
		QueryIntent::Status
	} else if contains_any(TIME_KEYWORDS) {
		QueryIntent::DeliveryTime
	} else if contains_any(HELP_KEYWORDS) {
		QueryIntent::Help
	} else {
		QueryIntent::General
	};

	ParsedQuery {
		intent,
		order_id: supplied_id.or_else(|| extract_order_id(query)),
	}
}

/// Fixed customer-facing phrase for each status.
pub fn status_phrase(status: OrderStatus) -> &'static str {
	match status {
		OrderStatus::Pending => "Your order is pending confirmation.",
		OrderStatus::Confirmed => "Your order has been confirmed and will be prepared soon!",
		OrderStatus::Preparing => "Your order is currently being prepared in our kitchen.",
		OrderStatus::Ready => "Great news! Your order is ready for pickup/delivery.",
		OrderStatus::Delivered => "Your order has been delivered! Enjoy your meal!",
		OrderStatus::Cancelled => "This order has been cancelled.",
	}
}

fn clock_time(at: DateTime<Utc>) -> String {
	at.with_timezone(&Local).format("%-I:%M:%S %p").to_string()
}

/// Renders the reply for a parsed query.
///
/// `found` carries the referenced order and its insights, or `None` when
/// the lookup came back empty.
pub fn respond(
	parsed: &ParsedQuery,
	found: Option<(&Order, &OrderInsights)>,
	now: DateTime<Utc>,
) -> ChatResponse {
	match parsed.intent {
		QueryIntent::Help => ChatResponse::text(HELP_TEXT, false),
		QueryIntent::General => ChatResponse::text(GENERAL_TEXT, false),
		QueryIntent::Status => {
			let Some(id) = parsed.order_id else {
				return ChatResponse::text(ASK_FOR_ID, true);
			};
			match found {
				Some((order, insights)) => status_reply(order, insights),
				None => ChatResponse::text(
					format!(
						"I couldn't find order #{}. Please check your order number and try again.",
						id
					),
					false,
				),
			}
		},
		QueryIntent::DeliveryTime => {
			let Some(id) = parsed.order_id else {
				return ChatResponse::text(ASK_FOR_ID_TIME, true);
			};
			match found {
				Some((order, insights)) => time_reply(order, insights, now),
				None => ChatResponse::text(
					format!("I couldn't find order #{}. Please check your order number.", id),
					false,
				),
			}
		},
	}
}

fn status_reply(order: &Order, insights: &OrderInsights) -> ChatResponse {
	let mut response = format!(
		"Order #{} is currently: **{}**\n\n{}",
		order.id,
		order.status.as_str().to_uppercase(),
		status_phrase(order.status)
	);

	if let Some(delivery) = insights.estimated_delivery {
		if !lifecycle::is_terminal(order.status) {
			response.push_str(&format!("\n\nEstimated delivery time: {}", clock_time(delivery)));
		}
	}
	if let Some(prediction) = &insights.prediction {
		response.push_str(&format!("\n\n💡 AI Insight: {}", prediction.reason));
	}

	ChatResponse {
		response,
		needs_order_id: false,
		order_data: Some(order.clone()),
	}
}

fn time_reply(order: &Order, insights: &OrderInsights, now: DateTime<Utc>) -> ChatResponse {
	let Some(delivery) = insights.estimated_delivery else {
		return ChatResponse::text(status_phrase(order.status), false);
	};

	let minutes_left = ((delivery - now).num_milliseconds() as f64 / 60_000.0).round() as i64;
	if minutes_left > 0 {
		ChatResponse::text(
			format!(
				"Based on current status, your order should be ready in approximately {} minutes (around {}).",
				minutes_left,
				clock_time(delivery)
			),
			false,
		)
	} else {
		ChatResponse::text(READY_SOON, false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::estimator::Estimator;
	use chrono::Duration;
	use restaurant_types::LineItem;
	use rust_decimal::Decimal;

	fn order(id: u64, status: OrderStatus, created_at: DateTime<Utc>) -> Order {
		Order {
			id,
			customer_name: "Asha".into(),
			customer_phone: String::new(),
			payment_mode: "cash".into(),
			items: vec![LineItem::new(1, "Idli", 1, Decimal::from(30))],
			subtotal: Decimal::from(30),
			tax_amount: Decimal::ZERO,
			total_amount: Decimal::from(30),
			status,
			created_at,
			updated_at: created_at,
		}
	}

	#[test]
	fn test_extract_order_id_patterns() {
		assert_eq!(extract_order_id("Track order #42"), Some(42));
		assert_eq!(extract_order_id("order number 17 please"), Some(17));
		assert_eq!(extract_order_id("ORDER 9"), Some(9));
		assert_eq!(extract_order_id("where is my food 31"), Some(31));
		assert_eq!(extract_order_id("where is my food"), None);
	}

	#[test]
	fn test_intent_precedence() {
		assert_eq!(parse_query("Track order #1", None).intent, QueryIntent::Status);
		assert_eq!(
			parse_query("What time is the status update?", None).intent,
			QueryIntent::Status
		);
		assert_eq!(
			parse_query("When will order 3 be ready?", None).intent,
			QueryIntent::DeliveryTime
		);
		assert_eq!(parse_query("How long for 3", None).intent, QueryIntent::DeliveryTime);
		assert_eq!(parse_query("help", None).intent, QueryIntent::Help);
		assert_eq!(parse_query("What can you do?", None).intent, QueryIntent::Help);
		assert_eq!(parse_query("hello", None).intent, QueryIntent::General);
	}

	#[test]
	fn test_supplied_id_wins_over_text() {
		let parsed = parse_query("track order #5", Some(8));
		assert_eq!(parsed.order_id, Some(8));
		assert_eq!(parsed.lookup_id(), Some(8));
		assert_eq!(parse_query("help", Some(8)).lookup_id(), None);
	}

	#[test]
	fn test_track_unknown_order() {
		let parsed = parse_query("Track order #42", None);
		let reply = respond(&parsed, None, Utc::now());
		assert!(reply.response.contains("couldn't find order #42"));
		assert!(!reply.needs_order_id);
		assert!(reply.order_data.is_none());
	}

	#[test]
	fn test_status_without_id_asks_for_one() {
		let reply = respond(&parse_query("where is my order?", None), None, Utc::now());
		assert!(reply.needs_order_id);
		assert!(reply.response.starts_with("I can help you track your order!"));

		let reply = respond(&parse_query("when will it arrive?", None), None, Utc::now());
		assert!(reply.needs_order_id);
		assert_eq!(reply.response, ASK_FOR_ID_TIME);
	}

	#[test]
	fn test_help_ignores_order_id() {
		let reply = respond(&parse_query("help", Some(3)), None, Utc::now());
		assert_eq!(reply.response, HELP_TEXT);
		assert!(!reply.needs_order_id);
	}

	#[test]
	fn test_general_guidance() {
		let reply = respond(&parse_query("hi there", None), None, Utc::now());
		assert_eq!(reply.response, GENERAL_TEXT);
	}

	#[test]
	fn test_status_reply_includes_estimate_and_reason() {
		let now = Utc::now();
		let pending = order(7, OrderStatus::Pending, now - Duration::minutes(4));
		let insights = Estimator::default().order_insights(&pending, now);

		let reply = respond(&parse_query("status of order 7", None), Some((&pending, &insights)), now);
		assert!(reply
			.response
			.starts_with("Order #7 is currently: **PENDING**\n\nYour order is pending confirmation."));
		assert!(reply.response.contains("Estimated delivery time: "));
		assert!(reply
			.response
			.ends_with("💡 AI Insight: Order has been pending for a while. Consider confirming it."));
		assert_eq!(reply.order_data.map(|o| o.id), Some(7));
	}

	#[test]
	fn test_status_reply_for_delivered_order() {
		let now = Utc::now();
		let delivered = order(2, OrderStatus::Delivered, now);
		let insights = Estimator::default().order_insights(&delivered, now);

		let reply = respond(&parse_query("track order 2", None), Some((&delivered, &insights)), now);
		assert_eq!(
			reply.response,
			"Order #2 is currently: **DELIVERED**\n\nYour order has been delivered! Enjoy your meal!"
		);
	}

	#[test]
	fn test_time_reply_counts_remaining_minutes() {
		let now = Utc::now();
		let preparing = order(4, OrderStatus::Preparing, now);
		let insights = Estimator::default().order_insights(&preparing, now);

		let reply = respond(&parse_query("when is order 4 ready", None), Some((&preparing, &insights)), now);
		// ready 5 + delivered 0
		assert!(reply.response.contains("approximately 5 minutes"));

		let ready = order(5, OrderStatus::Ready, now);
		let insights = Estimator::default().order_insights(&ready, now);
		let reply = respond(&parse_query("when is order 5 ready", None), Some((&ready, &insights)), now);
		assert_eq!(reply.response, READY_SOON);

		let cancelled = order(6, OrderStatus::Cancelled, now);
		let insights = Estimator::default().order_insights(&cancelled, now);
		let reply = respond(&parse_query("how long for order 6", None), Some((&cancelled, &insights)), now);
		assert_eq!(reply.response, "This order has been cancelled.");
	}
}
