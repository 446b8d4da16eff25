use prov_registry::NewCredential;
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

/// Length of the random identity suffix and, by default, of the secret.
pub const DEFAULT_SECRET_LEN: usize = 8;

/// Shorter secrets are never issued.
pub const MIN_SECRET_LEN: usize = DEFAULT_SECRET_LEN;

/// `len` characters drawn uniformly from `[A-Za-z0-9]`.
#[must_use]
pub fn random_alphanumeric(len: usize) -> String {
	OsRng
		.sample_iter(&Alphanumeric)
		.take(len)
		.map(char::from)
		.collect()
}

/// The hardware id followed by a random suffix, so identities stay traceable
/// to the board they were issued for.
#[must_use]
pub fn generate_identity(hardware_id: &str) -> String {
	format!("{hardware_id}{}", random_alphanumeric(DEFAULT_SECRET_LEN))
}

// 8 characters is weak for a pre-shared key, `CredentialRotator::with_secret_len`
// widens it where the device firmware allows.
#[must_use]
pub fn generate_secret(len: usize) -> String {
	random_alphanumeric(len)
}

/// A fresh identity/secret pair ready to be registered.
#[must_use]
pub fn generate_credential(hardware_id: &str, secret_len: usize) -> NewCredential {
	NewCredential::pre_shared_key(generate_identity(hardware_id), generate_secret(secret_len))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn is_alphanumeric(s: &str) -> bool {
		s.chars().all(|c| c.is_ascii_alphanumeric())
	}

	#[test]
	fn identity_is_prefixed_by_hardware_id() {
		for _ in 0..64 {
			let identity = generate_identity("abc123");
			let suffix = identity.strip_prefix("abc123").unwrap();

			assert_eq!(suffix.len(), DEFAULT_SECRET_LEN);
			assert!(is_alphanumeric(suffix));
		}
	}

	#[test]
	fn secret_has_requested_length() {
		for _ in 0..64 {
			let secret = generate_secret(DEFAULT_SECRET_LEN);

			assert_eq!(secret.len(), DEFAULT_SECRET_LEN);
			assert!(is_alphanumeric(&secret));
		}

		assert_eq!(generate_secret(32).len(), 32);
	}

	#[test]
	fn generated_credentials_differ() {
		let a = generate_credential("abc123", DEFAULT_SECRET_LEN);
		let b = generate_credential("abc123", DEFAULT_SECRET_LEN);

		assert_ne!(
			(a.identity, a.pre_shared_key),
			(b.identity, b.pre_shared_key)
		);
	}
}
