//! Domain errors.
//!
//! Every variant except [`Error::Storage`] and [`Error::PasswordHash`] is a
//! user-recoverable rejection: the HTTP layer answers it with a redirect to
//! a sensible prior view rather than an error page. The one exception is
//! [`Error::MalformedForm`], which has no prior view and gets a plain 400.

use thiserror::Error;

use crate::storage::StorageError;

/// Result alias used throughout the domain services.
pub type Result<T> = std::result::Result<T, Error>;

/// Storefront domain error.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
	/// A required registration field was empty.
	#[error("invalid input: {0} must not be empty")]
	InvalidInput(&'static str),

	/// The request body could not be decoded as a form at all. Unlike the
	/// field-level rejections this has no view to send the user back to, so
	/// the HTTP layer answers it with 400.
	#[error("request body is not a valid form")]
	MalformedForm,

	/// The username is already registered.
	#[error("username is already taken")]
	DuplicateUser,

	/// Unknown username or wrong password. Deliberately indistinct.
	#[error("invalid username or password")]
	InvalidCredentials,

	/// No catalog product matches the given name.
	#[error("unknown product: {0}")]
	UnknownProduct(String),

	/// Quantity missing, unparseable, or zero.
	#[error("quantity must be a positive integer")]
	InvalidQuantity,

	/// Checkout was requested with no cart lines.
	#[error("cart is empty")]
	EmptyCart,

	/// A checkout form field was blank.
	#[error("missing field: {0}")]
	MissingField(&'static str),

	/// The acting user does not own the order in question.
	#[error("order does not belong to the requesting user")]
	NotOwner,

	/// Review rating missing or unparseable.
	#[error("rating must be an integer")]
	InvalidRating,

	/// Password hashing or hash parsing failed.
	#[error("password hashing failed: {0}")]
	PasswordHash(String),

	/// The storage backend failed; surfaces as service-unavailable.
	#[error(transparent)]
	Storage(#[from] StorageError),
}
