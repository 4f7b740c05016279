//! Order status progression.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle stage of an order.
///
/// Transitions are strictly sequential and forward-only; there is no cancel,
/// reject, or reverse edge. [`OrderStatus::Delivered`] is terminal.
///
/// # Examples
///
/// ```
/// use brickmart::orders::OrderStatus;
///
/// assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Processing));
/// assert_eq!(OrderStatus::Delivered.next(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
	Pending,
	Processing,
	Shipped,
	Delivered,
}

/// Error for unrecognized persisted status strings.
#[derive(Debug, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(String);

impl OrderStatus {
	/// The single status reachable from this one, or `None` at the terminal
	/// stage.
	pub fn next(self) -> Option<Self> {
		match self {
			Self::Pending => Some(Self::Processing),
			Self::Processing => Some(Self::Shipped),
			Self::Shipped => Some(Self::Delivered),
			Self::Delivered => None,
		}
	}

	/// Whether no further transition is possible.
	pub fn is_terminal(self) -> bool {
		self.next().is_none()
	}

	/// Stable string form, used both for persistence and presentation.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "Pending",
			Self::Processing => "Processing",
			Self::Shipped => "Shipped",
			Self::Delivered => "Delivered",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"Pending" => Ok(Self::Pending),
			"Processing" => Ok(Self::Processing),
			"Shipped" => Ok(Self::Shipped),
			"Delivered" => Ok(Self::Delivered),
			other => Err(UnknownStatus(other.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn progression_is_sequential_and_terminal() {
		let mut status = OrderStatus::Pending;
		let mut seen = vec![status];
		while let Some(next) = status.next() {
			status = next;
			seen.push(status);
		}
		assert_eq!(
			seen,
			vec![
				OrderStatus::Pending,
				OrderStatus::Processing,
				OrderStatus::Shipped,
				OrderStatus::Delivered,
			]
		);
		assert!(OrderStatus::Delivered.is_terminal());
		assert!(!OrderStatus::Shipped.is_terminal());
	}

	#[test]
	fn round_trips_through_strings() {
		for status in [
			OrderStatus::Pending,
			OrderStatus::Processing,
			OrderStatus::Shipped,
			OrderStatus::Delivered,
		] {
			assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
		}
		assert!("Cancelled".parse::<OrderStatus>().is_err());
	}
}
