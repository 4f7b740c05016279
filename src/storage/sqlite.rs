//! SQLite storage backend over a sqlx pool.
//!
//! Monetary amounts are persisted as decimal strings (sqlx's decimal column
//! mapping covers postgres/mysql only); timestamps go through sqlx's chrono
//! support. The schema is created at connect time.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};

use super::{
	CartLine, NewCartLine, NewOrder, NewReview, Order, Review, Storage, StorageError, User,
};
use crate::orders::OrderStatus;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
	username      TEXT PRIMARY KEY,
	password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cart_lines (
	id           INTEGER PRIMARY KEY AUTOINCREMENT,
	owner        TEXT NOT NULL,
	product_name TEXT NOT NULL,
	unit_price   TEXT NOT NULL,
	quantity     INTEGER NOT NULL,
	added_at     TEXT NOT NULL,
	UNIQUE (owner, product_name)
);

CREATE TABLE IF NOT EXISTS orders (
	id               INTEGER PRIMARY KEY AUTOINCREMENT,
	owner            TEXT NOT NULL,
	product_name     TEXT NOT NULL,
	unit_price       TEXT NOT NULL,
	quantity         INTEGER NOT NULL,
	subtotal         TEXT NOT NULL,
	shipping_address TEXT NOT NULL,
	shipping_charge  TEXT NOT NULL,
	total_amount     TEXT NOT NULL,
	payment_method   TEXT NOT NULL,
	status           TEXT NOT NULL,
	ordered_at       TEXT NOT NULL,
	delivered_at     TEXT,
	tracking_id      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orders_owner ON orders (owner, ordered_at);
CREATE INDEX IF NOT EXISTS idx_orders_tracking ON orders (tracking_id);

CREATE TABLE IF NOT EXISTS reviews (
	id          INTEGER PRIMARY KEY AUTOINCREMENT,
	order_id    INTEGER NOT NULL UNIQUE REFERENCES orders (id),
	author      TEXT NOT NULL,
	rating      INTEGER NOT NULL,
	comment     TEXT,
	reviewed_at TEXT NOT NULL
);
"#;

/// [`Storage`] backend over SQLite.
pub struct SqliteStorage {
	pool: SqlitePool,
}

impl SqliteStorage {
	/// Opens (creating if missing) the database at `url` and applies the
	/// schema.
	pub async fn connect(url: &str) -> Result<Self, StorageError> {
		let options = SqliteConnectOptions::from_str(url)
			.map_err(StorageError::Database)?
			.create_if_missing(true);
		let pool = SqlitePoolOptions::new().connect_with(options).await?;
		Self::with_pool(pool).await
	}

	/// A private in-memory database, pinned to one connection so every
	/// query sees the same data. Used by tests.
	pub async fn in_memory() -> Result<Self, StorageError> {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect("sqlite::memory:")
			.await?;
		Self::with_pool(pool).await
	}

	async fn with_pool(pool: SqlitePool) -> Result<Self, StorageError> {
		sqlx::raw_sql(SCHEMA).execute(&pool).await?;
		Ok(Self { pool })
	}
}

fn get_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, StorageError> {
	let raw: String = row.try_get(column)?;
	Decimal::from_str(&raw).map_err(|e| StorageError::Corrupt(format!("{column}: {e}")))
}

fn get_quantity(row: &SqliteRow) -> Result<u32, StorageError> {
	let raw: i64 = row.try_get("quantity")?;
	u32::try_from(raw).map_err(|_| StorageError::Corrupt(format!("quantity: {raw}")))
}

fn cart_line_from_row(row: &SqliteRow) -> Result<CartLine, StorageError> {
	Ok(CartLine {
		id: row.try_get("id")?,
		owner: row.try_get("owner")?,
		product_name: row.try_get("product_name")?,
		unit_price: get_decimal(row, "unit_price")?,
		quantity: get_quantity(row)?,
		added_at: row.try_get("added_at")?,
	})
}

fn order_from_row(row: &SqliteRow) -> Result<Order, StorageError> {
	let status: String = row.try_get("status")?;
	Ok(Order {
		id: row.try_get("id")?,
		owner: row.try_get("owner")?,
		product_name: row.try_get("product_name")?,
		unit_price: get_decimal(row, "unit_price")?,
		quantity: get_quantity(row)?,
		subtotal: get_decimal(row, "subtotal")?,
		shipping_address: row.try_get("shipping_address")?,
		shipping_charge: get_decimal(row, "shipping_charge")?,
		total_amount: get_decimal(row, "total_amount")?,
		payment_method: row.try_get("payment_method")?,
		status: status
			.parse()
			.map_err(|e: crate::orders::UnknownStatus| StorageError::Corrupt(e.to_string()))?,
		ordered_at: row.try_get("ordered_at")?,
		delivered_at: row.try_get("delivered_at")?,
		tracking_id: row.try_get("tracking_id")?,
	})
}

fn review_from_row(row: &SqliteRow) -> Result<Review, StorageError> {
	Ok(Review {
		id: row.try_get("id")?,
		order_id: row.try_get("order_id")?,
		author: row.try_get("author")?,
		rating: row.try_get("rating")?,
		comment: row.try_get("comment")?,
		reviewed_at: row.try_get("reviewed_at")?,
	})
}

#[async_trait]
impl Storage for SqliteStorage {
	async fn insert_user(
		&self,
		username: &str,
		password_hash: &str,
	) -> Result<User, StorageError> {
		sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
			.bind(username)
			.bind(password_hash)
			.execute(&self.pool)
			.await
			.map_err(|e| match &e {
				sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Duplicate,
				_ => StorageError::Database(e),
			})?;
		Ok(User {
			username: username.to_string(),
			password_hash: password_hash.to_string(),
		})
	}

	async fn find_user(&self, username: &str) -> Result<Option<User>, StorageError> {
		let row = sqlx::query("SELECT username, password_hash FROM users WHERE username = ?")
			.bind(username)
			.fetch_optional(&self.pool)
			.await?;
		Ok(match row {
			Some(row) => Some(User {
				username: row.try_get("username")?,
				password_hash: row.try_get("password_hash")?,
			}),
			None => None,
		})
	}

	async fn find_cart_line(
		&self,
		owner: &str,
		product_name: &str,
	) -> Result<Option<CartLine>, StorageError> {
		let row = sqlx::query("SELECT * FROM cart_lines WHERE owner = ? AND product_name = ?")
			.bind(owner)
			.bind(product_name)
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(cart_line_from_row).transpose()
	}

	async fn insert_cart_line(&self, line: NewCartLine) -> Result<CartLine, StorageError> {
		let result = sqlx::query(
			"INSERT INTO cart_lines (owner, product_name, unit_price, quantity, added_at) \
			 VALUES (?, ?, ?, ?, ?)",
		)
		.bind(&line.owner)
		.bind(&line.product_name)
		.bind(line.unit_price.to_string())
		.bind(i64::from(line.quantity))
		.bind(line.added_at)
		.execute(&self.pool)
		.await?;
		Ok(CartLine {
			id: result.last_insert_rowid(),
			owner: line.owner,
			product_name: line.product_name,
			unit_price: line.unit_price,
			quantity: line.quantity,
			added_at: line.added_at,
		})
	}

	async fn add_cart_quantity(&self, line_id: i64, amount: u32) -> Result<(), StorageError> {
		// Saturate at the u32 ceiling so the column always reads back as a
		// valid quantity; callers reject overflowing adds before storage.
		sqlx::query("UPDATE cart_lines SET quantity = MIN(quantity + ?, 4294967295) WHERE id = ?")
			.bind(i64::from(amount))
			.bind(line_id)
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	async fn list_cart(&self, owner: &str) -> Result<Vec<CartLine>, StorageError> {
		let rows = sqlx::query("SELECT * FROM cart_lines WHERE owner = ? ORDER BY id")
			.bind(owner)
			.fetch_all(&self.pool)
			.await?;
		rows.iter().map(cart_line_from_row).collect()
	}

	async fn remove_cart_line(&self, owner: &str, line_id: i64) -> Result<(), StorageError> {
		// Filtering on owner here is what makes foreign ids a silent no-op.
		sqlx::query("DELETE FROM cart_lines WHERE id = ? AND owner = ?")
			.bind(line_id)
			.bind(owner)
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	async fn clear_cart(&self, owner: &str) -> Result<(), StorageError> {
		sqlx::query("DELETE FROM cart_lines WHERE owner = ?")
			.bind(owner)
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	async fn place_orders(
		&self,
		owner: &str,
		orders: Vec<NewOrder>,
	) -> Result<Vec<Order>, StorageError> {
		let mut tx = self.pool.begin().await?;
		let mut created = Vec::with_capacity(orders.len());
		for order in orders {
			let result = sqlx::query(
				"INSERT INTO orders (owner, product_name, unit_price, quantity, subtotal, \
				 shipping_address, shipping_charge, total_amount, payment_method, status, \
				 ordered_at, delivered_at, tracking_id) \
				 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?)",
			)
			.bind(&order.owner)
			.bind(&order.product_name)
			.bind(order.unit_price.to_string())
			.bind(i64::from(order.quantity))
			.bind(order.subtotal.to_string())
			.bind(&order.shipping_address)
			.bind(order.shipping_charge.to_string())
			.bind(order.total_amount.to_string())
			.bind(&order.payment_method)
			.bind(OrderStatus::Pending.as_str())
			.bind(order.ordered_at)
			.bind(&order.tracking_id)
			.execute(&mut *tx)
			.await?;
			created.push(Order {
				id: result.last_insert_rowid(),
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
			});
		}
		sqlx::query("DELETE FROM cart_lines WHERE owner = ?")
			.bind(owner)
			.execute(&mut *tx)
			.await?;
		tx.commit().await?;
		Ok(created)
	}

	async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StorageError> {
		let row = sqlx::query("SELECT * FROM orders WHERE id = ?")
			.bind(order_id)
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(order_from_row).transpose()
	}

	async fn set_order_status(
		&self,
		order_id: i64,
		status: OrderStatus,
		delivered_at: Option<DateTime<Utc>>,
	) -> Result<(), StorageError> {
		sqlx::query(
			"UPDATE orders SET status = ?, delivered_at = COALESCE(?, delivered_at) \
			 WHERE id = ?",
		)
		.bind(status.as_str())
		.bind(delivered_at)
		.bind(order_id)
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	async fn orders_by_owner(&self, owner: &str) -> Result<Vec<Order>, StorageError> {
		let rows =
			sqlx::query("SELECT * FROM orders WHERE owner = ? ORDER BY ordered_at DESC, id DESC")
				.bind(owner)
				.fetch_all(&self.pool)
				.await?;
		rows.iter().map(order_from_row).collect()
	}

	async fn orders_by_tracking(&self, tracking_id: &str) -> Result<Vec<Order>, StorageError> {
		let rows = sqlx::query("SELECT * FROM orders WHERE tracking_id = ? ORDER BY id")
			.bind(tracking_id)
			.fetch_all(&self.pool)
			.await?;
		rows.iter().map(order_from_row).collect()
	}

	async fn find_review(&self, order_id: i64) -> Result<Option<Review>, StorageError> {
		let row = sqlx::query("SELECT * FROM reviews WHERE order_id = ?")
			.bind(order_id)
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(review_from_row).transpose()
	}

	async fn upsert_review(&self, review: NewReview) -> Result<Review, StorageError> {
		sqlx::query(
			"INSERT INTO reviews (order_id, author, rating, comment, reviewed_at) \
			 VALUES (?, ?, ?, ?, ?) \
			 ON CONFLICT (order_id) DO UPDATE SET \
			 rating = excluded.rating, comment = excluded.comment, \
			 reviewed_at = excluded.reviewed_at",
		)
		.bind(review.order_id)
		.bind(&review.author)
		.bind(review.rating)
		.bind(&review.comment)
		.bind(review.reviewed_at)
		.execute(&self.pool)
		.await?;
		self.find_review(review.order_id)
			.await?
			.ok_or_else(|| StorageError::Corrupt("review upsert left no row".into()))
	}
}
