//! Account service: registration and authentication.

mod hasher;

pub use hasher::{Argon2Hasher, PasswordHasher};

use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::storage::{Storage, StorageError, User};

/// Creates and authenticates users; owns password-hash storage.
#[derive(Clone)]
pub struct AccountService {
	storage: Arc<dyn Storage>,
	hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
	pub fn new(storage: Arc<dyn Storage>, hasher: Arc<dyn PasswordHasher>) -> Self {
		Self { storage, hasher }
	}

	/// Registers a new user.
	///
	/// Rejects empty fields with [`Error::InvalidInput`] and an existing
	/// username with [`Error::DuplicateUser`]. The storage unique key backs
	/// up the pre-check, so two concurrent registrations of one name cannot
	/// both succeed.
	pub async fn register(&self, username: &str, password: &str) -> Result<User> {
		let username = username.trim();
		if username.is_empty() {
			return Err(Error::InvalidInput("username"));
		}
		if password.is_empty() {
			return Err(Error::InvalidInput("password"));
		}
		if self.storage.find_user(username).await?.is_some() {
			return Err(Error::DuplicateUser);
		}

		let password_hash = self.hasher.hash(password)?;
		let user = self
			.storage
			.insert_user(username, &password_hash)
			.await
			.map_err(|e| match e {
				StorageError::Duplicate => Error::DuplicateUser,
				other => Error::Storage(other),
			})?;
		info!(username, "user registered");
		Ok(user)
	}

	/// Authenticates a username/password pair.
	///
	/// An unknown username and a wrong password both come back as
	/// [`Error::InvalidCredentials`].
	pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
		let user = self
			.storage
			.find_user(username.trim())
			.await?
			.ok_or(Error::InvalidCredentials)?;
		if self.hasher.verify(password, &user.password_hash)? {
			Ok(user)
		} else {
			Err(Error::InvalidCredentials)
		}
	}
}
