//! Session store.
//!
//! Sessions map an opaque random token (carried in a cookie) to the
//! authenticated username. The store is process-local; restarting the
//! server logs everyone out, which is acceptable for this service.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

/// In-memory token → username store.
#[derive(Debug, Default)]
pub struct SessionStore {
	sessions: RwLock<HashMap<String, String>>,
}

impl SessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens a session for `username` and returns the fresh token.
	pub fn create(&self, username: &str) -> String {
		let token = Uuid::new_v4().to_string();
		self.sessions
			.write()
			.insert(token.clone(), username.to_string());
		token
	}

	/// Resolves a token to its username, if the session is live.
	pub fn resolve(&self, token: &str) -> Option<String> {
		self.sessions.read().get(token).cloned()
	}

	/// Ends a session. Unknown tokens are ignored.
	pub fn destroy(&self, token: &str) {
		self.sessions.write().remove(token);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn create_resolve_destroy() {
		let store = SessionStore::new();
		let token = store.create("mason");
		assert_eq!(store.resolve(&token).as_deref(), Some("mason"));

		store.destroy(&token);
		assert_eq!(store.resolve(&token), None);
	}

	#[test]
	fn tokens_are_unique_per_session() {
		let store = SessionStore::new();
		assert_ne!(store.create("mason"), store.create("mason"));
	}

	#[test]
	fn unknown_token_resolves_to_nothing() {
		let store = SessionStore::new();
		assert_eq!(store.resolve("forged-token"), None);
	}
}
