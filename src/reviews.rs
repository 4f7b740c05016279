//! Review service: one rating+comment per order, authored by its owner.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::{NewReview, Review, Storage};

/// Records or overwrites the single review of an order.
#[derive(Clone)]
pub struct ReviewService {
	storage: Arc<dyn Storage>,
}

impl ReviewService {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self { storage }
	}

	/// Submits a review for an order.
	///
	/// An absent order and an order owned by someone else both fail with
	/// [`Error::NotOwner`], so guessing ids learns nothing. Re-submitting
	/// overwrites rating, comment, and timestamp of the existing review in
	/// place; the upsert is keyed by order id.
	pub async fn submit(
		&self,
		order_id: i64,
		author: &str,
		rating: i32,
		comment: Option<String>,
	) -> Result<Review> {
		let order = self
			.storage
			.find_order(order_id)
			.await?
			.filter(|order| order.owner == author)
			.ok_or(Error::NotOwner)?;

		let review = self
			.storage
			.upsert_review(NewReview {
				order_id: order.id,
				author: author.to_string(),
				rating,
				comment,
				reviewed_at: Utc::now(),
			})
			.await?;
		info!(order_id, author, rating, "review recorded");
		Ok(review)
	}

	/// The order's review, if one has been submitted.
	pub async fn get(&self, order_id: i64) -> Result<Option<Review>> {
		Ok(self.storage.find_review(order_id).await?)
	}
}
