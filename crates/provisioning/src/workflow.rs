use std::{fmt, sync::Arc};

use prov_device_config::{
	check_return_code, read_hardware_id, ConfigKey, ConfigProtocolClient, ReturnCode,
};
use prov_registry::{Credential, Registry};
use tracing::{debug, error, info, instrument, warn};

use crate::{
	session::{ProvisioningSession, State, WriteStatus},
	CredentialRotator, Error, Rotation,
};

/// What the registry knows about the resolved device's credentials.
#[derive(Debug, Clone)]
pub enum CredentialStatus {
	/// A credential whose secret this session holds.
	Live(Credential),
	/// A credential exists but its secret was never captured here, so it can't
	/// be written to the device. Rotating is the way out.
	SecretUnknown(Credential),
	/// Nothing registered yet, rotation has to be triggered explicitly.
	Missing,
}

/// Network settings supplied by whoever runs the provisioning.
#[derive(Clone)]
pub struct WifiSettings {
	pub ssid: String,
	pub passphrase: String,
}

impl fmt::Debug for WifiSettings {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WifiSettings")
			.field("ssid", &self.ssid)
			.finish_non_exhaustive()
	}
}

/// Result of one key written during a batch. A device-side rejection shows up
/// as [`prov_device_config::Error::Protocol`] carrying the return code.
#[derive(Debug)]
pub struct FieldReport {
	pub key: ConfigKey,
	pub result: Result<(), Error>,
}

impl FieldReport {
	#[must_use]
	pub const fn is_success(&self) -> bool {
		self.result.is_ok()
	}
}

struct DeviceLink {
	name: String,
	client: Arc<dyn ConfigProtocolClient>,
}

/// Drives one device through provisioning, one external trigger at a time.
///
/// Each `on_*` call is a trigger. A step that fails moves the workflow to
/// [`State::Failed`] but leaves whatever earlier steps put in the session
/// alone, so the failing trigger can simply be retried.
pub struct ProvisioningWorkflow {
	registry: Arc<dyn Registry>,
	rotator: CredentialRotator,
	link: Option<DeviceLink>,
	session: ProvisioningSession,
	state: State,
}

impl ProvisioningWorkflow {
	pub fn new(registry: Arc<dyn Registry>) -> Self {
		Self {
			rotator: CredentialRotator::new(Arc::clone(&registry)),
			registry,
			link: None,
			session: ProvisioningSession::default(),
			state: State::Idle,
		}
	}

	#[must_use]
	pub fn with_rotator(mut self, rotator: CredentialRotator) -> Self {
		self.rotator = rotator;
		self
	}

	#[must_use]
	pub const fn state(&self) -> State {
		self.state
	}

	#[must_use]
	pub const fn session(&self) -> &ProvisioningSession {
		&self.session
	}

	#[must_use]
	pub const fn is_connected(&self) -> bool {
		self.link.is_some()
	}

	/// The link layer reports a device as connected. `name` becomes the
	/// registry name if the device has to be created.
	pub fn attach_device(&mut self, name: impl Into<String>, client: Arc<dyn ConfigProtocolClient>) {
		let name = name.into();
		debug!(%name, "Device attached");
		self.link = Some(DeviceLink { name, client });
	}

	pub fn detach_device(&mut self) {
		if let Some(DeviceLink { name, .. }) = self.link.take() {
			debug!(%name, "Device detached");
		}
	}

	/// Throws away the session and starts over from [`State::Idle`].
	pub fn reset(&mut self) {
		self.session = ProvisioningSession::default();
		self.state = State::Idle;
	}

	/// Reads the hardware id off the connected device.
	#[instrument(skip(self), err)]
	pub async fn on_connect(&mut self) -> Result<String, Error> {
		let client = Arc::clone(&self.link.as_ref().ok_or(Error::NotConnected)?.client);

		self.state = State::ReadingHardwareId;

		match read_hardware_id(&*client).await {
			Ok(hardware_id) => {
				info!(%hardware_id, "Device replied with its hardware id");
				self.session.set_hardware_id(hardware_id.clone());
				Ok(hardware_id)
			}
			Err(e) => self.fail(e),
		}
	}

	/// Resolves the registry device for the hardware id read earlier, creating
	/// it if needed, then looks at its credentials.
	///
	/// Returns `None` without touching anything when no device is connected or
	/// no hardware id was read yet.
	#[instrument(skip(self), err)]
	pub async fn on_find_or_create(&mut self) -> Result<Option<CredentialStatus>, Error> {
		let (Some(link), Some(hardware_id)) = (&self.link, &self.session.hardware_id) else {
			debug!("Find-or-create requires a connected device with a known hardware id");
			return Ok(None);
		};

		let name = link.name.clone();
		let hardware_id = hardware_id.clone();

		self.state = State::ResolvingDevice;

		let device = match self
			.registry
			.find_or_create_device_by_hardware_id(&name, &hardware_id)
			.await
		{
			Ok(device) => device,
			Err(e) => return self.fail(e),
		};

		info!(device_id = %device.id, "Found/created registry device");
		let device_id = device.id.clone();
		self.session.device = Some(device);

		self.state = State::ResolvingCredential;

		let credentials = match self.registry.list_credentials(&device_id).await {
			Ok(credentials) => credentials,
			Err(e) => return self.fail(e),
		};

		if credentials.len() > 1 {
			warn!(count = credentials.len(), "Device has more than one credential registered");
		}

		let Some(credential) = self.session.adopt_credential(credentials).cloned() else {
			debug!("Device has no credentials yet");
			return Ok(Some(CredentialStatus::Missing));
		};

		if credential.has_secret() {
			self.state = State::WritingConfig;
			Ok(Some(CredentialStatus::Live(credential)))
		} else {
			warn!(
				credential_id = %credential.id,
				"Found a credential whose secret was never captured"
			);
			Ok(Some(CredentialStatus::SecretUnknown(credential)))
		}
	}

	/// Replaces all credentials of the resolved device with a new one and makes
	/// it the session's live credential. May be triggered again at any point.
	#[instrument(skip(self), err)]
	pub async fn on_rotate(&mut self) -> Result<Rotation, Error> {
		let hardware_id = self
			.session
			.hardware_id
			.clone()
			.ok_or(Error::MissingHardwareId)?;
		let device_id = self
			.session
			.device
			.as_ref()
			.map(|device| device.id.clone())
			.ok_or(Error::NoDevice)?;

		self.state = State::ResolvingCredential;

		match self.rotator.rotate(&device_id, &hardware_id).await {
			Ok(rotation) => {
				self.session.live_credential = Some(rotation.credential.clone());
				self.state = State::WritingConfig;
				Ok(rotation)
			}
			Err(e) => self.fail(e),
		}
	}

	/// Writes a single key. A device-side rejection comes back as a non-OK
	/// [`ReturnCode`] and, like a link failure, only concerns this key.
	#[instrument(skip(self, value), err)]
	pub async fn on_send_field(&mut self, key: ConfigKey, value: &str) -> Result<ReturnCode, Error> {
		let client = Arc::clone(&self.link.as_ref().ok_or(Error::NotConnected)?.client);

		self.state = State::WritingConfig;
		let res = self.write_field(&*client, key, value).await;
		self.state = State::Done;

		res
	}

	/// Writes the live credential's identity and secret.
	#[instrument(skip(self))]
	pub async fn on_send_credential(&mut self) -> Result<Vec<FieldReport>, Error> {
		let client = Arc::clone(&self.link.as_ref().ok_or(Error::NotConnected)?.client);
		let (identity, secret) = self.live_secret()?;

		self.state = State::WritingConfig;

		let mut reports = Vec::with_capacity(2);
		for (key, value) in [(ConfigKey::PskId, identity), (ConfigKey::Psk, secret)] {
			let result = self.write_checked(&*client, key, &value).await;
			reports.push(FieldReport { key, result });
		}

		self.state = State::Done;

		Ok(reports)
	}

	/// Writes network settings and the live credential, all four keys, each
	/// reported on its own.
	#[instrument(skip(self, wifi))]
	pub async fn on_send_all(&mut self, wifi: &WifiSettings) -> Result<Vec<FieldReport>, Error> {
		let client = Arc::clone(&self.link.as_ref().ok_or(Error::NotConnected)?.client);
		let (identity, secret) = self.live_secret()?;

		self.state = State::WritingConfig;

		let mut reports = Vec::with_capacity(ConfigKey::ALL.len());
		for (key, value) in [
			(ConfigKey::WifiSsid, wifi.ssid.clone()),
			(ConfigKey::WifiPsk, wifi.passphrase.clone()),
			(ConfigKey::PskId, identity),
			(ConfigKey::Psk, secret),
		] {
			let result = self.write_checked(&*client, key, &value).await;
			reports.push(FieldReport { key, result });
		}

		self.state = State::Done;

		Ok(reports)
	}

	fn live_secret(&self) -> Result<(String, String), Error> {
		let credential = self
			.session
			.live_credential
			.as_ref()
			.ok_or(Error::NoLiveCredential)?;

		let secret = credential
			.pre_shared_key
			.clone()
			.ok_or_else(|| Error::SecretUnknown {
				credential_id: credential.id.clone(),
			})?;

		Ok((credential.identity.clone(), secret))
	}

	async fn write_field(
		&mut self,
		client: &dyn ConfigProtocolClient,
		key: ConfigKey,
		value: &str,
	) -> Result<ReturnCode, Error> {
		if key.is_secret() {
			debug!(%key, "Writing configuration value");
		} else {
			debug!(%key, %value, "Writing configuration value");
		}

		let res = client.write(key.as_str(), value).await;

		let status = match &res {
			Ok(code) if code.is_success() => WriteStatus::Accepted,
			Ok(code) => {
				warn!(%key, %code, "Device rejected configuration value");
				WriteStatus::Rejected(*code)
			}
			Err(e) => {
				warn!(%key, ?e, "Failed to write configuration value");
				WriteStatus::Failed(e.to_string())
			}
		};
		self.session.writes.insert(key, status);

		res.map_err(Into::into)
	}

	async fn write_checked(
		&mut self,
		client: &dyn ConfigProtocolClient,
		key: ConfigKey,
		value: &str,
	) -> Result<(), Error> {
		let code = self.write_field(client, key, value).await?;

		check_return_code(key.as_str(), code).map_err(Into::into)
	}

	fn fail<T>(&mut self, e: impl Into<Error>) -> Result<T, Error> {
		let e = e.into();
		error!(from = ?self.state, ?e, "Provisioning step failed");
		self.state = State::Failed;

		Err(e)
	}
}
