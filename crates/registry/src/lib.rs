#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Client side of the device registry: devices keyed by hardware id and the
//! pre-shared-key credentials issued to them.

mod client;
mod config;
mod error;
mod types;

use async_trait::async_trait;

pub use client::RegistryClient;
pub use config::{RegistryConfig, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};
pub use error::Error;
pub use types::{Credential, CredentialType, Device, LogEntry, NewCredential};

pub use reqwest::StatusCode;

/// Operations the provisioning flow needs from the registry.
///
/// None of these retry; callers decide whether an error is worth another go.
#[async_trait]
pub trait Registry: Send + Sync {
	async fn list_devices(&self) -> Result<Vec<Device>, Error>;

	/// `None` when no device carries `hardware_id`.
	async fn find_device_by_hardware_id(&self, hardware_id: &str) -> Result<Option<Device>, Error>;

	/// Fails with [`Error::Conflict`] if the registry already knows the hardware id.
	async fn create_device(&self, name: &str, hardware_id: &str) -> Result<Device, Error>;

	/// Query by hardware id and create the device only when nothing matched.
	///
	/// The two requests are not atomic on the registry side. Implementations
	/// may serialize callers locally, but separate processes can still race
	/// and end up with duplicate devices.
	async fn find_or_create_device_by_hardware_id(
		&self,
		name: &str,
		hardware_id: &str,
	) -> Result<Device, Error> {
		if let Some(device) = self.find_device_by_hardware_id(hardware_id).await? {
			return Ok(device);
		}

		self.create_device(name, hardware_id).await
	}

	async fn list_credentials(&self, device_id: &str) -> Result<Vec<Credential>, Error>;

	/// The returned credential is the only place its secret is ever visible.
	async fn create_credential(
		&self,
		device_id: &str,
		credential: &NewCredential,
	) -> Result<Credential, Error>;

	/// Deleting a credential that no longer exists counts as success.
	async fn delete_credential(&self, device_id: &str, credential_id: &str) -> Result<(), Error>;
}
