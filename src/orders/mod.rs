//! Order service: checkout, shipping, status progression, and listings.

mod status;
mod tracking;

pub use status::{OrderStatus, UnknownStatus};
pub use tracking::{TRACKING_ID_LEN, generate_tracking_id};

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::storage::{CartLine, NewOrder, Order, Storage};

/// Flat shipping rule: 150.00 below a 1000.00 subtotal, free from there up.
///
/// # Examples
///
/// ```
/// use brickmart::orders::compute_shipping;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(compute_shipping(dec!(999.99)), dec!(150.0));
/// assert_eq!(compute_shipping(dec!(1000.0)), dec!(0.0));
/// ```
pub fn compute_shipping(subtotal: Decimal) -> Decimal {
	if subtotal < dec!(1000.0) {
		dec!(150.0)
	} else {
		dec!(0.0)
	}
}

/// Checkout preview: the cart as it would be charged right now.
#[derive(Debug, Serialize)]
pub struct CheckoutSummary {
	pub lines: Vec<CartLine>,
	pub subtotal: Decimal,
	pub shipping: Decimal,
	pub total: Decimal,
}

/// Result of a completed checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutReceipt {
	pub tracking_id: String,
	pub orders: Vec<Order>,
	pub subtotal: Decimal,
	pub shipping: Decimal,
	pub total: Decimal,
}

/// Converts carts into immutable orders and advances them to delivery.
#[derive(Clone)]
pub struct OrderService {
	storage: Arc<dyn Storage>,
}

impl OrderService {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self { storage }
	}

	/// Prices the owner's current cart without mutating anything.
	///
	/// The shipping charge is computed once from the full cart subtotal;
	/// checkout stores that same charge on every order row it creates.
	pub async fn summary(&self, owner: &str) -> Result<CheckoutSummary> {
		let lines = self.storage.list_cart(owner).await?;
		if lines.is_empty() {
			return Err(Error::EmptyCart);
		}
		let subtotal: Decimal = lines
			.iter()
			.map(|line| line.unit_price * Decimal::from(line.quantity))
			.sum();
		let shipping = compute_shipping(subtotal);
		Ok(CheckoutSummary {
			total: subtotal + shipping,
			lines,
			subtotal,
			shipping,
		})
	}

	/// Turns the owner's cart into one order row per cart line, all sharing
	/// a freshly generated tracking id, and clears the cart. Order creation
	/// and cart clearing happen in one storage transaction: a failure leaves
	/// both untouched.
	pub async fn checkout(
		&self,
		owner: &str,
		shipping_address: &str,
		payment_method: &str,
	) -> Result<CheckoutReceipt> {
		let shipping_address = shipping_address.trim();
		let payment_method = payment_method.trim();
		if shipping_address.is_empty() {
			return Err(Error::MissingField("shipping_address"));
		}
		if payment_method.is_empty() {
			return Err(Error::MissingField("payment_method"));
		}

		let summary = self.summary(owner).await?;
		let tracking_id = generate_tracking_id();
		let ordered_at = Utc::now();

		let new_orders = summary
			.lines
			.iter()
			.map(|line| {
				let subtotal = line.unit_price * Decimal::from(line.quantity);
				NewOrder {
					owner: owner.to_string(),
					product_name: line.product_name.clone(),
					unit_price: line.unit_price,
					quantity: line.quantity,
					subtotal,
					shipping_address: shipping_address.to_string(),
					shipping_charge: summary.shipping,
					total_amount: subtotal + summary.shipping,
					payment_method: payment_method.to_string(),
					ordered_at,
					tracking_id: tracking_id.clone(),
				}
			})
			.collect();

		let orders = self.storage.place_orders(owner, new_orders).await?;
		info!(
			owner,
			tracking_id = %tracking_id,
			lines = orders.len(),
			total = %summary.total,
			"checkout completed"
		);

		Ok(CheckoutReceipt {
			tracking_id,
			orders,
			subtotal: summary.subtotal,
			shipping: summary.shipping,
			total: summary.total,
		})
	}

	/// Advances an order exactly one step along
	/// Pending → Processing → Shipped → Delivered, stamping the delivery
	/// timestamp on the final step.
	///
	/// Silently does nothing when the order is absent, not owned by
	/// `acting_user`, or already delivered; probing ids learns nothing.
	pub async fn advance_status(&self, order_id: i64, acting_user: &str) -> Result<()> {
		let Some(order) = self.storage.find_order(order_id).await? else {
			debug!(order_id, "advance ignored: no such order");
			return Ok(());
		};
		if order.owner != acting_user {
			debug!(order_id, acting_user, "advance ignored: not the owner");
			return Ok(());
		}
		let Some(next) = order.status.next() else {
			debug!(order_id, "advance ignored: already delivered");
			return Ok(());
		};

		let delivered_at = (next == OrderStatus::Delivered).then(Utc::now);
		self.storage
			.set_order_status(order_id, next, delivered_at)
			.await?;
		info!(order_id, from = %order.status, to = %next, "order status advanced");
		Ok(())
	}

	/// Looks up one order as seen by its owner; anyone else sees nothing.
	pub async fn find_owned(&self, order_id: i64, owner: &str) -> Result<Option<Order>> {
		Ok(self
			.storage
			.find_order(order_id)
			.await?
			.filter(|order| order.owner == owner))
	}

	/// The owner's orders, newest first.
	pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<Order>> {
		Ok(self.storage.orders_by_owner(owner).await?)
	}

	/// All order rows of one checkout. The caller must verify every returned
	/// order belongs to the requesting user before disclosing anything.
	pub async fn list_by_tracking(&self, tracking_id: &str) -> Result<Vec<Order>> {
		Ok(self.storage.orders_by_tracking(tracking_id).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(dec!(0.0), dec!(150.0))]
	#[case(dec!(80.0), dec!(150.0))]
	#[case(dec!(999.99), dec!(150.0))]
	#[case(dec!(1000.0), dec!(0.0))]
	#[case(dec!(1000.01), dec!(0.0))]
	#[case(dec!(1560.0), dec!(0.0))]
	fn shipping_boundary(#[case] subtotal: Decimal, #[case] expected: Decimal) {
		assert_eq!(compute_shipping(subtotal), expected);
	}
}
