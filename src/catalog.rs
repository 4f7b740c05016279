//! Static product catalog.
//!
//! The catalog is reference data: defined once at process start, never
//! mutated, and not persisted. Lookups are case-insensitive both by key
//! (detail pages) and by display name (the add-to-cart path submits the
//! product's display name).

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// A catalog entry.
///
/// Prices are strictly positive decimals; `image_url` and `specs` are
/// optional presentation extras.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
	pub key: String,
	pub name: String,
	pub price: Decimal,
	pub description: String,
	pub image_url: Option<String>,
	pub specs: Option<Vec<String>>,
}

/// Immutable product catalog keyed by lowercase product key.
#[derive(Debug)]
pub struct Catalog {
	products: HashMap<String, Product>,
}

impl Catalog {
	/// Builds the built-in building-materials catalog.
	pub fn builtin() -> Self {
		Self::from_products(vec![
			Product {
				key: "cement".into(),
				name: "Cement".into(),
				price: dec!(380.0),
				description: "OPC and PPC cement for all types of construction needs.".into(),
				image_url: None,
				specs: Some(vec!["OPC 43".into(), "OPC 53".into(), "PPC".into()]),
			},
			Product {
				key: "bricks".into(),
				name: "Bricks".into(),
				price: dec!(8.0),
				description: "High-quality red clay bricks for walls and structures.".into(),
				image_url: None,
				specs: None,
			},
			Product {
				key: "steel".into(),
				name: "Steel".into(),
				price: dec!(75.0),
				description: "Strong TMT steel bars for long-lasting construction.".into(),
				image_url: None,
				specs: Some(vec!["Fe 500".into(), "Fe 550".into()]),
			},
		])
	}

	/// Builds a catalog from explicit entries. Keys are lowercased.
	pub fn from_products(products: Vec<Product>) -> Self {
		Self {
			products: products
				.into_iter()
				.map(|p| (p.key.to_ascii_lowercase(), p))
				.collect(),
		}
	}

	/// Looks up a product by key, case-insensitively.
	///
	/// # Examples
	///
	/// ```
	/// use brickmart::catalog::Catalog;
	///
	/// let catalog = Catalog::builtin();
	/// assert!(catalog.get("CEMENT").is_some());
	/// assert!(catalog.get("plywood").is_none());
	/// ```
	pub fn get(&self, key: &str) -> Option<&Product> {
		self.products.get(&key.to_ascii_lowercase())
	}

	/// Looks up a product by display name, case-insensitively.
	pub fn find_by_name(&self, name: &str) -> Option<&Product> {
		self.products
			.values()
			.find(|p| p.name.eq_ignore_ascii_case(name))
	}

	/// All products, sorted by key for a stable listing.
	pub fn all(&self) -> Vec<&Product> {
		let mut products: Vec<&Product> = self.products.values().collect();
		products.sort_by(|a, b| a.key.cmp(&b.key));
		products
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn get_is_case_insensitive() {
		let catalog = Catalog::builtin();
		assert_eq!(catalog.get("cement").unwrap().name, "Cement");
		assert_eq!(catalog.get("Cement").unwrap().name, "Cement");
		assert_eq!(catalog.get("BRICKS").unwrap().name, "Bricks");
	}

	#[test]
	fn unknown_key_is_absent() {
		let catalog = Catalog::builtin();
		assert!(catalog.get("granite").is_none());
	}

	#[test]
	fn find_by_name_matches_display_name() {
		let catalog = Catalog::builtin();
		let steel = catalog.find_by_name("steel").unwrap();
		assert_eq!(steel.key, "steel");
		assert_eq!(steel.price, dec!(75.0));
		assert!(catalog.find_by_name("Granite").is_none());
	}

	#[test]
	fn listing_is_sorted_by_key() {
		let catalog = Catalog::builtin();
		let keys: Vec<&str> = catalog.all().iter().map(|p| p.key.as_str()).collect();
		assert_eq!(keys, vec!["bricks", "cement", "steel"]);
	}
}
