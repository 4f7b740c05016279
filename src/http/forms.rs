//! Typed form parsing.
//!
//! Form fields are decoded and validated here, at the boundary, so the
//! domain services only ever see well-typed inputs. Each parse failure maps
//! to the domain error the affected service defines for it.

use serde::Deserialize;

use crate::error::{Error, Result};

fn decode<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T> {
	serde_urlencoded::from_bytes(body).map_err(|_| Error::MalformedForm)
}

/// `username` + `password`, for both `/register` and `/login`.
///
/// Emptiness is judged by the services (registration rejects blank fields,
/// login treats them as bad credentials), so this only decodes.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub password: String,
}

impl CredentialsForm {
	pub fn parse(body: &[u8]) -> Result<Self> {
		decode(body)
	}
}

/// `product_name` + optional `quantity` for adding to the cart.
#[derive(Debug, Deserialize)]
struct AddToCartRaw {
	product_name: Option<String>,
	quantity: Option<String>,
}

/// Validated add-to-cart input.
#[derive(Debug, PartialEq, Eq)]
pub struct AddToCartForm {
	pub product_name: String,
	pub quantity: u32,
}

impl AddToCartForm {
	/// A missing quantity defaults to 1; anything that does not parse as a
	/// positive integer is [`Error::InvalidQuantity`].
	pub fn parse(body: &[u8]) -> Result<Self> {
		let raw: AddToCartRaw = decode(body)?;
		let product_name = raw
			.product_name
			.filter(|name| !name.trim().is_empty())
			.ok_or(Error::MissingField("product_name"))?;
		let quantity = match raw.quantity.as_deref() {
			None | Some("") => 1,
			Some(raw) => raw.trim().parse::<u32>().map_err(|_| Error::InvalidQuantity)?,
		};
		if quantity == 0 {
			return Err(Error::InvalidQuantity);
		}
		Ok(Self {
			product_name,
			quantity,
		})
	}
}

/// `shipping_address` + `payment_method` for placing an order.
///
/// Blank-field rejection lives in the order service, which owns the
/// `MissingField` contract.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
	#[serde(default)]
	pub shipping_address: String,
	#[serde(default)]
	pub payment_method: String,
}

impl CheckoutForm {
	pub fn parse(body: &[u8]) -> Result<Self> {
		decode(body)
	}
}

/// `rating` + optional `comment` for reviewing an order.
#[derive(Debug, Deserialize)]
struct ReviewRaw {
	rating: Option<String>,
	comment: Option<String>,
}

/// Validated review input.
#[derive(Debug, PartialEq, Eq)]
pub struct ReviewForm {
	pub rating: i32,
	pub comment: Option<String>,
}

impl ReviewForm {
	pub fn parse(body: &[u8]) -> Result<Self> {
		let raw: ReviewRaw = decode(body)?;
		let rating = raw
			.rating
			.as_deref()
			.map(str::trim)
			.filter(|r| !r.is_empty())
			.ok_or(Error::InvalidRating)?
			.parse::<i32>()
			.map_err(|_| Error::InvalidRating)?;
		let comment = raw.comment.filter(|c| !c.trim().is_empty());
		Ok(Self { rating, comment })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_to_cart_defaults_quantity_to_one() {
		let form = AddToCartForm::parse(b"product_name=Cement").unwrap();
		assert_eq!(
			form,
			AddToCartForm {
				product_name: "Cement".into(),
				quantity: 1
			}
		);
	}

	#[test]
	fn add_to_cart_rejects_bad_quantities() {
		for body in [
			&b"product_name=Cement&quantity=0"[..],
			b"product_name=Cement&quantity=-3",
			b"product_name=Cement&quantity=lots",
			b"product_name=Cement&quantity=2.5",
		] {
			assert!(matches!(
				AddToCartForm::parse(body),
				Err(Error::InvalidQuantity)
			));
		}
	}

	#[test]
	fn add_to_cart_requires_a_product_name() {
		assert!(matches!(
			AddToCartForm::parse(b"quantity=2"),
			Err(Error::MissingField("product_name"))
		));
	}

	#[test]
	fn review_requires_a_parseable_rating() {
		assert!(matches!(ReviewForm::parse(b"comment=great"), Err(Error::InvalidRating)));
		assert!(matches!(
			ReviewForm::parse(b"rating=five"),
			Err(Error::InvalidRating)
		));
		let form = ReviewForm::parse(b"rating=4&comment=solid+bricks").unwrap();
		assert_eq!(form.rating, 4);
		assert_eq!(form.comment.as_deref(), Some("solid bricks"));
	}

	#[test]
	fn review_blank_comment_becomes_none() {
		let form = ReviewForm::parse(b"rating=5&comment=").unwrap();
		assert_eq!(form.comment, None);
	}

	#[test]
	fn undecodable_body_is_malformed_form() {
		assert!(matches!(
			AddToCartForm::parse(b"product_name=%GG"),
			Err(Error::MalformedForm)
		));
		assert!(matches!(
			CredentialsForm::parse(b"username=%GG"),
			Err(Error::MalformedForm)
		));
	}

	#[test]
	fn credentials_decode_with_defaults() {
		let form = CredentialsForm::parse(b"username=mason").unwrap();
		assert_eq!(form.username, "mason");
		assert_eq!(form.password, "");
	}
}
