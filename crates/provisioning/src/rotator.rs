use std::sync::Arc;

use futures_concurrency::future::Join;
use prov_registry::{Credential, Error, Registry};
use tracing::{debug, info, instrument, warn};

use crate::secret::{generate_credential, DEFAULT_SECRET_LEN, MIN_SECRET_LEN};

/// Outcome of a successful [`CredentialRotator::rotate`].
#[derive(Debug)]
pub struct Rotation {
	/// The freshly issued credential, secret included.
	pub credential: Credential,
	/// Ids of the credentials that were deleted.
	pub revoked: Vec<String>,
	/// Deletions that failed; those credentials may still be registered.
	pub failed_revocations: Vec<FailedRevocation>,
}

impl Rotation {
	/// `true` when every previous credential is known to be gone.
	#[must_use]
	pub fn is_clean(&self) -> bool {
		self.failed_revocations.is_empty()
	}
}

#[derive(Debug)]
pub struct FailedRevocation {
	pub credential_id: String,
	pub error: Error,
}

/// Replaces every credential of a device with a single new one.
#[derive(Clone)]
pub struct CredentialRotator {
	registry: Arc<dyn Registry>,
	secret_len: usize,
}

impl CredentialRotator {
	pub fn new(registry: Arc<dyn Registry>) -> Self {
		Self {
			registry,
			secret_len: DEFAULT_SECRET_LEN,
		}
	}

	/// Lengths below [`MIN_SECRET_LEN`] are raised to it.
	#[must_use]
	pub fn with_secret_len(mut self, secret_len: usize) -> Self {
		if secret_len < MIN_SECRET_LEN {
			warn!(secret_len, min = MIN_SECRET_LEN, "Secret length too short, using the minimum");
		}

		self.secret_len = secret_len.max(MIN_SECRET_LEN);
		self
	}

	/// Deletes all credentials of `device_id` and issues exactly one new one.
	///
	/// Listing or creation failures abort and surface the registry error as is.
	/// Individual deletions are best effort: they all run concurrently, the
	/// rotation waits for every one of them and then issues the replacement no
	/// matter how they went. Failed ones are reported in
	/// [`Rotation::failed_revocations`].
	///
	/// If creation fails after deletions went through the device is left with
	/// no credential at all. Deletion is idempotent, so rotating again is safe.
	#[instrument(skip(self), err)]
	pub async fn rotate(&self, device_id: &str, hardware_id: &str) -> Result<Rotation, Error> {
		let existing = self.registry.list_credentials(device_id).await?;
		debug!(count = existing.len(), "Revoking existing credentials");

		let registry = &*self.registry;

		let mut revoked = Vec::with_capacity(existing.len());
		let mut failed_revocations = vec![];

		for (credential_id, res) in existing
			.into_iter()
			.map(|credential| async move {
				let res = registry.delete_credential(device_id, &credential.id).await;
				(credential.id, res)
			})
			.collect::<Vec<_>>()
			.join()
			.await
		{
			match res {
				Ok(()) => revoked.push(credential_id),
				Err(error) => {
					warn!(%credential_id, ?error, "Failed to revoke credential, continuing rotation");
					failed_revocations.push(FailedRevocation {
						credential_id,
						error,
					});
				}
			}
		}

		let new_credential = generate_credential(hardware_id, self.secret_len);

		let mut credential = self
			.registry
			.create_credential(device_id, &new_credential)
			.await?;

		// The registry may not echo the key back, we still know what we sent.
		if credential.pre_shared_key.is_none() {
			credential.pre_shared_key = Some(new_credential.pre_shared_key);
		}

		info!(
			credential_id = %credential.id,
			revoked = revoked.len(),
			failed = failed_revocations.len(),
			"Rotated device credentials"
		);

		Ok(Rotation {
			credential,
			revoked,
			failed_revocations,
		})
	}
}
