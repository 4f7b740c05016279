//! Password hashing.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
	PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::error::{Error, Result};

/// Password hashing seam.
///
/// The account service only ever sees this trait, so the algorithm can be
/// swapped without touching registration or login.
pub trait PasswordHasher: Send + Sync {
	/// Hashes a password with a fresh random salt.
	fn hash(&self, password: &str) -> Result<String>;

	/// Verifies a password against a stored hash.
	///
	/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash
	/// cannot be parsed.
	fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Argon2id hasher, the default for new accounts.
///
/// # Examples
///
/// ```
/// use brickmart::accounts::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new();
/// let hash = hasher.hash("correct horse battery staple").unwrap();
/// assert!(hasher.verify("correct horse battery staple", &hash).unwrap());
/// assert!(!hasher.verify("tr0ub4dor&3", &hash).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
	pub fn new() -> Self {
		Self
	}
}

impl PasswordHasher for Argon2Hasher {
	fn hash(&self, password: &str) -> Result<String> {
		let salt = SaltString::generate(&mut OsRng);
		Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| Error::PasswordHash(e.to_string()))
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool> {
		let parsed = PasswordHash::new(hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
		// verify_password is constant-time with respect to the hash output
		Ok(Argon2::default()
			.verify_password(password.as_bytes(), &parsed)
			.is_ok())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hashes_are_salted() {
		let hasher = Argon2Hasher::new();
		let a = hasher.hash("hunter2").unwrap();
		let b = hasher.hash("hunter2").unwrap();
		assert_ne!(a, b, "two hashes of one password must differ by salt");
		assert!(hasher.verify("hunter2", &a).unwrap());
		assert!(hasher.verify("hunter2", &b).unwrap());
	}

	#[test]
	fn garbage_hash_is_an_error_not_a_match() {
		let hasher = Argon2Hasher::new();
		assert!(hasher.verify("hunter2", "not-a-phc-string").is_err());
	}
}
