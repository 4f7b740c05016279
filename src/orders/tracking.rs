//! Tracking id generation.

use rand::Rng;

/// Symbols a tracking id is drawn from: uppercase letters and digits.
const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a tracking id.
pub const TRACKING_ID_LEN: usize = 10;

/// Generates a fresh tracking id: 10 symbols drawn uniformly from the
/// 36-symbol uppercase-alphanumeric alphabet.
///
/// The id is a grouping key, not a secret; collisions over the 36^10 space
/// are ignored and no uniqueness check is performed.
pub fn generate_tracking_id() -> String {
	let mut rng = rand::thread_rng();
	(0..TRACKING_ID_LEN)
		.map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_have_the_expected_shape() {
		for _ in 0..100 {
			let id = generate_tracking_id();
			assert_eq!(id.len(), TRACKING_ID_LEN);
			assert!(
				id.bytes().all(|b| ALPHABET.contains(&b)),
				"unexpected symbol in {id}"
			);
		}
	}

	#[test]
	fn consecutive_ids_differ() {
		// 36^-10 collision odds; a repeat here means the generator is broken.
		assert_ne!(generate_tracking_id(), generate_tracking_id());
	}
}
