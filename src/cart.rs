//! Cart service.
//!
//! One cart line per (owner, product) pair: adding a product a second time
//! increments the existing line's quantity and keeps the unit price snapshot
//! taken at first add.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::storage::{CartLine, NewCartLine, Storage};

/// Per-user cart over the catalog and a storage backend.
#[derive(Clone)]
pub struct CartService {
	storage: Arc<dyn Storage>,
	catalog: Arc<Catalog>,
}

impl CartService {
	pub fn new(storage: Arc<dyn Storage>, catalog: Arc<Catalog>) -> Self {
		Self { storage, catalog }
	}

	/// Adds `quantity` of a product, resolved against the catalog by
	/// case-insensitive display name.
	///
	/// A line already holding this product is incremented in place; its unit
	/// price stays the first-add snapshot even if the catalog price has
	/// moved since. An increment that would overflow the line's quantity is
	/// rejected as [`Error::InvalidQuantity`] and leaves the line unchanged.
	pub async fn add_item(&self, owner: &str, product_name: &str, quantity: u32) -> Result<()> {
		if quantity == 0 {
			return Err(Error::InvalidQuantity);
		}
		let product = self
			.catalog
			.find_by_name(product_name)
			.ok_or_else(|| Error::UnknownProduct(product_name.to_string()))?;

		match self.storage.find_cart_line(owner, &product.name).await? {
			Some(line) => {
				if line.quantity.checked_add(quantity).is_none() {
					return Err(Error::InvalidQuantity);
				}
				self.storage.add_cart_quantity(line.id, quantity).await?;
				debug!(owner, product = %product.name, quantity, "cart line incremented");
			}
			None => {
				self.storage
					.insert_cart_line(NewCartLine {
						owner: owner.to_string(),
						product_name: product.name.clone(),
						unit_price: product.price,
						quantity,
						added_at: Utc::now(),
					})
					.await?;
				debug!(owner, product = %product.name, quantity, "cart line created");
			}
		}
		Ok(())
	}

	/// The owner's cart lines. Order carries no meaning; callers sum
	/// independently.
	pub async fn list(&self, owner: &str) -> Result<Vec<CartLine>> {
		Ok(self.storage.list_cart(owner).await?)
	}

	/// Removes one line. A line id that does not belong to `owner` is
	/// silently ignored, so existence of other users' lines never leaks
	/// through error differentiation.
	pub async fn remove_item(&self, owner: &str, line_id: i64) -> Result<()> {
		Ok(self.storage.remove_cart_line(owner, line_id).await?)
	}

	/// Sum of unit price × quantity over the owner's lines; zero when empty.
	pub async fn total(&self, owner: &str) -> Result<Decimal> {
		let lines = self.storage.list_cart(owner).await?;
		Ok(lines
			.iter()
			.map(|line| line.unit_price * Decimal::from(line.quantity))
			.sum())
	}

	/// Empties the owner's cart. Part of checkout; exposed for symmetry.
	pub async fn clear(&self, owner: &str) -> Result<()> {
		Ok(self.storage.clear_cart(owner).await?)
	}
}
