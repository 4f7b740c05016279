//! Process-local storage backend.
//!
//! Everything lives behind a single `parking_lot` lock, which makes
//! `place_orders` trivially atomic. Intended for tests and
//! zero-configuration runs; data is lost at process exit.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{
	CartLine, NewCartLine, NewOrder, NewReview, Order, Review, Storage, StorageError, User,
};
use crate::orders::OrderStatus;

#[derive(Default)]
struct Inner {
	users: HashMap<String, User>,
	cart: Vec<CartLine>,
	orders: Vec<Order>,
	reviews: Vec<Review>,
	next_cart_id: i64,
	next_order_id: i64,
	next_review_id: i64,
}

/// In-memory [`Storage`] backend.
#[derive(Default)]
pub struct MemoryStorage {
	inner: RwLock<Inner>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl Storage for MemoryStorage {
	async fn insert_user(
		&self,
		username: &str,
		password_hash: &str,
	) -> Result<User, StorageError> {
		let mut inner = self.inner.write();
		if inner.users.contains_key(username) {
			return Err(StorageError::Duplicate);
		}
		let user = User {
			username: username.to_string(),
			password_hash: password_hash.to_string(),
		};
		inner.users.insert(username.to_string(), user.clone());
		Ok(user)
	}

	async fn find_user(&self, username: &str) -> Result<Option<User>, StorageError> {
		Ok(self.inner.read().users.get(username).cloned())
	}

	async fn find_cart_line(
		&self,
		owner: &str,
		product_name: &str,
	) -> Result<Option<CartLine>, StorageError> {
		Ok(self
			.inner
			.read()
			.cart
			.iter()
			.find(|line| line.owner == owner && line.product_name == product_name)
			.cloned())
	}

	async fn insert_cart_line(&self, line: NewCartLine) -> Result<CartLine, StorageError> {
		let mut inner = self.inner.write();
		inner.next_cart_id += 1;
		let line = CartLine {
			id: inner.next_cart_id,
			owner: line.owner,
			product_name: line.product_name,
			unit_price: line.unit_price,
			quantity: line.quantity,
			added_at: line.added_at,
		};
		inner.cart.push(line.clone());
		Ok(line)
	}

	async fn add_cart_quantity(&self, line_id: i64, amount: u32) -> Result<(), StorageError> {
		let mut inner = self.inner.write();
		if let Some(line) = inner.cart.iter_mut().find(|line| line.id == line_id) {
			// Saturate rather than wrap; callers reject overflowing adds
			// before they reach storage.
			line.quantity = line.quantity.saturating_add(amount);
		}
		Ok(())
	}

	async fn list_cart(&self, owner: &str) -> Result<Vec<CartLine>, StorageError> {
		Ok(self
			.inner
			.read()
			.cart
			.iter()
			.filter(|line| line.owner == owner)
			.cloned()
			.collect())
	}

	async fn remove_cart_line(&self, owner: &str, line_id: i64) -> Result<(), StorageError> {
		self.inner
			.write()
			.cart
			.retain(|line| !(line.id == line_id && line.owner == owner));
		Ok(())
	}

	async fn clear_cart(&self, owner: &str) -> Result<(), StorageError> {
		self.inner.write().cart.retain(|line| line.owner != owner);
		Ok(())
	}

	async fn place_orders(
		&self,
		owner: &str,
		orders: Vec<NewOrder>,
	) -> Result<Vec<Order>, StorageError> {
		// One write lock spans both steps, so insert+clear is atomic.
		let mut inner = self.inner.write();
		let mut created = Vec::with_capacity(orders.len());
		for order in orders {
			inner.next_order_id += 1;
			let order = Order {
				id: inner.next_order_id,
				owner: order.owner,
				product_name: order.product_name,
				unit_price: order.unit_price,
				quantity: order.quantity,
				subtotal: order.subtotal,
				shipping_address: order.shipping_address,
				shipping_charge: order.shipping_charge,
				total_amount: order.total_amount,
				payment_method: order.payment_method,
				status: OrderStatus::Pending,
				ordered_at: order.ordered_at,
				delivered_at: None,
				tracking_id: order.tracking_id,
			};
			inner.orders.push(order.clone());
			created.push(order);
		}
		inner.cart.retain(|line| line.owner != owner);
		Ok(created)
	}

	async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StorageError> {
		Ok(self
			.inner
			.read()
			.orders
			.iter()
			.find(|order| order.id == order_id)
			.cloned())
	}

	async fn set_order_status(
		&self,
		order_id: i64,
		status: OrderStatus,
		delivered_at: Option<DateTime<Utc>>,
	) -> Result<(), StorageError> {
		let mut inner = self.inner.write();
		if let Some(order) = inner.orders.iter_mut().find(|order| order.id == order_id) {
			order.status = status;
			if delivered_at.is_some() {
				order.delivered_at = delivered_at;
			}
		}
		Ok(())
	}

	async fn orders_by_owner(&self, owner: &str) -> Result<Vec<Order>, StorageError> {
		let mut orders: Vec<Order> = self
			.inner
			.read()
			.orders
			.iter()
			.filter(|order| order.owner == owner)
			.cloned()
			.collect();
		orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at).then(b.id.cmp(&a.id)));
		Ok(orders)
	}

	async fn orders_by_tracking(&self, tracking_id: &str) -> Result<Vec<Order>, StorageError> {
		Ok(self
			.inner
			.read()
			.orders
			.iter()
			.filter(|order| order.tracking_id == tracking_id)
			.cloned()
			.collect())
	}

	async fn find_review(&self, order_id: i64) -> Result<Option<Review>, StorageError> {
		Ok(self
			.inner
			.read()
			.reviews
			.iter()
			.find(|review| review.order_id == order_id)
			.cloned())
	}

	async fn upsert_review(&self, review: NewReview) -> Result<Review, StorageError> {
		let mut inner = self.inner.write();
		if let Some(existing) = inner
			.reviews
			.iter_mut()
			.find(|r| r.order_id == review.order_id)
		{
			existing.rating = review.rating;
			existing.comment = review.comment;
			existing.reviewed_at = review.reviewed_at;
			return Ok(existing.clone());
		}
		inner.next_review_id += 1;
		let review = Review {
			id: inner.next_review_id,
			order_id: review.order_id,
			author: review.author,
			rating: review.rating,
			comment: review.comment,
			reviewed_at: review.reviewed_at,
		};
		inner.reviews.push(review.clone());
		Ok(review)
	}
}
