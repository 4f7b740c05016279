//! Persistence boundary.
//!
//! The domain services see storage only through the [`Storage`] trait:
//! create/read/update/delete plus the equality and sort queries the route
//! table needs, and one transactional batch operation ([`Storage::place_orders`])
//! so that checkout is all-or-nothing. Two backends are provided:
//! [`MemoryStorage`] for tests and zero-configuration runs, and
//! [`SqliteStorage`] over a sqlx pool.

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::orders::OrderStatus;

/// Storage-layer failure.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	/// A persisted value could not be read back into its domain type.
	#[error("corrupt row: {0}")]
	Corrupt(String),

	/// A uniqueness constraint was violated (currently only usernames).
	#[error("duplicate key")]
	Duplicate,
}

/// A registered account. The hash is an argon2 PHC string, never plaintext.
#[derive(Debug, Clone)]
pub struct User {
	pub username: String,
	pub password_hash: String,
}

/// One product+quantity entry in a user's cart.
///
/// `unit_price` is a snapshot taken at first add; re-adding the same product
/// increments `quantity` and leaves the price untouched.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
	pub id: i64,
	pub owner: String,
	pub product_name: String,
	pub unit_price: Decimal,
	pub quantity: u32,
	pub added_at: DateTime<Utc>,
}

/// Insert payload for a cart line.
#[derive(Debug, Clone)]
pub struct NewCartLine {
	pub owner: String,
	pub product_name: String,
	pub unit_price: Decimal,
	pub quantity: u32,
	pub added_at: DateTime<Utc>,
}

/// An immutable order row; one per cart line of a checkout.
///
/// `tracking_id` groups all rows created by one checkout. The only mutation
/// after insert is the forward status progression (with `delivered_at`
/// stamped on the final step).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
	pub id: i64,
	pub owner: String,
	pub product_name: String,
	pub unit_price: Decimal,
	pub quantity: u32,
	pub subtotal: Decimal,
	pub shipping_address: String,
	pub shipping_charge: Decimal,
	pub total_amount: Decimal,
	pub payment_method: String,
	pub status: OrderStatus,
	pub ordered_at: DateTime<Utc>,
	pub delivered_at: Option<DateTime<Utc>>,
	pub tracking_id: String,
}

/// Insert payload for an order row. Status always starts at Pending.
#[derive(Debug, Clone)]
pub struct NewOrder {
	pub owner: String,
	pub product_name: String,
	pub unit_price: Decimal,
	pub quantity: u32,
	pub subtotal: Decimal,
	pub shipping_address: String,
	pub shipping_charge: Decimal,
	pub total_amount: Decimal,
	pub payment_method: String,
	pub ordered_at: DateTime<Utc>,
	pub tracking_id: String,
}

/// A rating+comment for one order; at most one per order.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
	pub id: i64,
	pub order_id: i64,
	pub author: String,
	pub rating: i32,
	pub comment: Option<String>,
	pub reviewed_at: DateTime<Utc>,
}

/// Upsert payload for a review.
#[derive(Debug, Clone)]
pub struct NewReview {
	pub order_id: i64,
	pub author: String,
	pub rating: i32,
	pub comment: Option<String>,
	pub reviewed_at: DateTime<Utc>,
}

/// Persistence backend for users, cart lines, orders, and reviews.
///
/// All per-user queries filter by the owning username inside the backend so
/// that a caller can never reach another user's rows through this interface.
#[async_trait]
pub trait Storage: Send + Sync {
	/// Inserts a user; fails with [`StorageError::Duplicate`] when the
	/// username is already registered.
	async fn insert_user(&self, username: &str, password_hash: &str)
	-> Result<User, StorageError>;

	async fn find_user(&self, username: &str) -> Result<Option<User>, StorageError>;

	/// Finds the owner's cart line for an exact product name, if any.
	async fn find_cart_line(
		&self,
		owner: &str,
		product_name: &str,
	) -> Result<Option<CartLine>, StorageError>;

	async fn insert_cart_line(&self, line: NewCartLine) -> Result<CartLine, StorageError>;

	/// Increments a cart line's quantity in place.
	async fn add_cart_quantity(&self, line_id: i64, amount: u32) -> Result<(), StorageError>;

	async fn list_cart(&self, owner: &str) -> Result<Vec<CartLine>, StorageError>;

	/// Deletes one cart line if and only if it belongs to `owner`; silently
	/// does nothing otherwise.
	async fn remove_cart_line(&self, owner: &str, line_id: i64) -> Result<(), StorageError>;

	async fn clear_cart(&self, owner: &str) -> Result<(), StorageError>;

	/// Inserts all order rows and clears the owner's cart in one atomic
	/// write: either every order lands and the cart empties, or nothing
	/// changes.
	async fn place_orders(
		&self,
		owner: &str,
		orders: Vec<NewOrder>,
	) -> Result<Vec<Order>, StorageError>;

	async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StorageError>;

	/// Overwrites an order's status, and its delivery timestamp when given.
	async fn set_order_status(
		&self,
		order_id: i64,
		status: OrderStatus,
		delivered_at: Option<DateTime<Utc>>,
	) -> Result<(), StorageError>;

	/// The owner's orders, newest first.
	async fn orders_by_owner(&self, owner: &str) -> Result<Vec<Order>, StorageError>;

	/// All order rows sharing one tracking id. Ownership is checked by the
	/// caller before disclosure.
	async fn orders_by_tracking(&self, tracking_id: &str) -> Result<Vec<Order>, StorageError>;

	async fn find_review(&self, order_id: i64) -> Result<Option<Review>, StorageError>;

	/// Creates the review for an order, or overwrites rating, comment, and
	/// timestamp of the existing one.
	async fn upsert_review(&self, review: NewReview) -> Result<Review, StorageError>;
}
