//! SQLite backend tests: value round-trips (decimals, timestamps, status),
//! the username unique key, the transactional checkout, and one end-to-end
//! run of the service stack over sqlx.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal_macros::dec;

use brickmart::cart::CartService;
use brickmart::catalog::Catalog;
use brickmart::orders::{OrderService, OrderStatus};
use brickmart::reviews::ReviewService;
use brickmart::storage::{NewCartLine, NewOrder, SqliteStorage, Storage, StorageError};

async fn storage() -> Arc<SqliteStorage> {
	Arc::new(SqliteStorage::in_memory().await.unwrap())
}

#[tokio::test]
async fn username_unique_key_holds() {
	let storage = storage().await;
	storage.insert_user("mason", "hash-a").await.unwrap();

	let err = storage.insert_user("mason", "hash-b").await.unwrap_err();
	assert!(matches!(err, StorageError::Duplicate));

	let user = storage.find_user("mason").await.unwrap().unwrap();
	assert_eq!(user.password_hash, "hash-a");
}

#[tokio::test]
async fn cart_line_round_trips_decimals_and_timestamps() {
	let storage = storage().await;
	let added_at = Utc::now();
	let line = storage
		.insert_cart_line(NewCartLine {
			owner: "mason".into(),
			product_name: "Cement".into(),
			unit_price: dec!(380.0),
			quantity: 3,
			added_at,
		})
		.await
		.unwrap();

	let fetched = storage
		.find_cart_line("mason", "Cement")
		.await
		.unwrap()
		.unwrap();
	assert_eq!(fetched.id, line.id);
	assert_eq!(fetched.unit_price, dec!(380.0));
	assert_eq!(fetched.quantity, 3);
	// Persisted as text; allow for sub-second formatting differences.
	assert!((fetched.added_at - added_at).num_seconds().abs() < 1);

	storage.add_cart_quantity(line.id, 2).await.unwrap();
	let bumped = storage.list_cart("mason").await.unwrap();
	assert_eq!(bumped.len(), 1);
	assert_eq!(bumped[0].quantity, 5);
}

#[tokio::test]
async fn quantity_increment_saturates_at_the_column_ceiling() {
	let storage = storage().await;
	let line = storage
		.insert_cart_line(NewCartLine {
			owner: "mason".into(),
			product_name: "Bricks".into(),
			unit_price: dec!(8.0),
			quantity: u32::MAX - 1,
			added_at: Utc::now(),
		})
		.await
		.unwrap();

	storage.add_cart_quantity(line.id, 10).await.unwrap();

	// The row must still read back as a valid quantity afterwards.
	let fetched = storage
		.find_cart_line("mason", "Bricks")
		.await
		.unwrap()
		.unwrap();
	assert_eq!(fetched.quantity, u32::MAX);
}

#[tokio::test]
async fn remove_is_owner_scoped() {
	let storage = storage().await;
	let line = storage
		.insert_cart_line(NewCartLine {
			owner: "alice".into(),
			product_name: "Steel".into(),
			unit_price: dec!(75.0),
			quantity: 1,
			added_at: Utc::now(),
		})
		.await
		.unwrap();

	storage.remove_cart_line("bob", line.id).await.unwrap();
	assert_eq!(storage.list_cart("alice").await.unwrap().len(), 1);

	storage.remove_cart_line("alice", line.id).await.unwrap();
	assert!(storage.list_cart("alice").await.unwrap().is_empty());
}

fn new_order(owner: &str, tracking_id: &str, product: &str, subtotal: rust_decimal::Decimal) -> NewOrder {
	NewOrder {
		owner: owner.into(),
		product_name: product.into(),
		unit_price: subtotal,
		quantity: 1,
		subtotal,
		shipping_address: "12 Kiln Road".into(),
		shipping_charge: dec!(150.0),
		total_amount: subtotal + dec!(150.0),
		payment_method: "cod".into(),
		ordered_at: Utc::now(),
		tracking_id: tracking_id.into(),
	}
}

#[tokio::test]
async fn place_orders_inserts_batch_and_clears_cart() {
	let storage = storage().await;
	storage
		.insert_cart_line(NewCartLine {
			owner: "mason".into(),
			product_name: "Bricks".into(),
			unit_price: dec!(8.0),
			quantity: 10,
			added_at: Utc::now(),
		})
		.await
		.unwrap();

	let created = storage
		.place_orders(
			"mason",
			vec![
				new_order("mason", "TRACK00001", "Bricks", dec!(80.0)),
				new_order("mason", "TRACK00001", "Steel", dec!(75.0)),
			],
		)
		.await
		.unwrap();

	assert_eq!(created.len(), 2);
	assert!(created.iter().all(|o| o.status == OrderStatus::Pending));
	assert!(storage.list_cart("mason").await.unwrap().is_empty());

	let tracked = storage.orders_by_tracking("TRACK00001").await.unwrap();
	assert_eq!(tracked.len(), 2);
	assert_eq!(tracked[0].total_amount, dec!(230.0));
}

#[tokio::test]
async fn status_and_delivery_timestamp_persist() {
	let storage = storage().await;
	let created = storage
		.place_orders("mason", vec![new_order("mason", "TRACK00002", "Cement", dec!(380.0))])
		.await
		.unwrap();
	let order_id = created[0].id;

	storage
		.set_order_status(order_id, OrderStatus::Processing, None)
		.await
		.unwrap();
	let order = storage.find_order(order_id).await.unwrap().unwrap();
	assert_eq!(order.status, OrderStatus::Processing);
	assert!(order.delivered_at.is_none());

	let delivered_at = Utc::now();
	storage
		.set_order_status(order_id, OrderStatus::Delivered, Some(delivered_at))
		.await
		.unwrap();
	let order = storage.find_order(order_id).await.unwrap().unwrap();
	assert_eq!(order.status, OrderStatus::Delivered);
	let stored = order.delivered_at.expect("delivery timestamp must be set");
	assert!((stored - delivered_at).num_seconds().abs() < 1);
}

#[tokio::test]
async fn services_run_end_to_end_over_sqlite() {
	let storage = storage().await;
	let storage: Arc<dyn Storage> = storage;
	let cart = CartService::new(storage.clone(), Arc::new(Catalog::builtin()));
	let orders = OrderService::new(storage.clone());
	let reviews = ReviewService::new(storage);

	cart.add_item("mason", "Bricks", 10).await.unwrap();
	let receipt = orders.checkout("mason", "12 Kiln Road", "cod").await.unwrap();
	assert_eq!(receipt.total, dec!(230.0));
	assert!(cart.list("mason").await.unwrap().is_empty());

	let order_id = receipt.orders[0].id;
	orders.advance_status(order_id, "mason").await.unwrap();

	let review = reviews
		.submit(order_id, "mason", 4, Some("good bricks".into()))
		.await
		.unwrap();
	let again = reviews
		.submit(order_id, "mason", 5, None)
		.await
		.unwrap();
	assert_eq!(review.id, again.id);
	assert_eq!(again.rating, 5);
	assert_eq!(again.comment, None);
}
