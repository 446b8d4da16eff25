use std::{
	collections::HashMap,
	sync::{Arc, Mutex as StdMutex, PoisonError, Weak},
};

use async_trait::async_trait;
use reqwest::{header::ACCEPT, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument, trace};

use crate::{
	types::{CreateDevice, ListResponse, SingleResponse},
	Credential, Device, Error, LogEntry, NewCredential, Registry, RegistryConfig,
};

const API_KEY_HEADER: &str = "X-API-Key";

trait WithApiKey {
	fn with_api_key(self, api_key: &str) -> Self;
}

impl WithApiKey for RequestBuilder {
	fn with_api_key(self, api_key: &str) -> Self {
		self.header(API_KEY_HEADER, api_key)
			.header(ACCEPT, "application/json")
	}
}

/// HTTPS client for the device registry of a single project.
///
/// Cloning is cheap and clones share both the connection pool and the
/// per-hardware-id locks used by
/// [`find_or_create_device_by_hardware_id`](Registry::find_or_create_device_by_hardware_id).
#[derive(Debug, Clone)]
pub struct RegistryClient {
	client: reqwest::Client,
	base_url: Arc<str>,
	api_key: Arc<str>,
	creation_locks: Arc<StdMutex<HashMap<String, Weak<Mutex<()>>>>>,
}

impl RegistryClient {
	pub fn new(config: RegistryConfig) -> Result<Self, Error> {
		let base_url = config.base_url();
		Url::parse(&base_url).map_err(|e| Error::InvalidConfig(format!("{base_url}: {e}")))?;

		let mut builder = reqwest::Client::builder();
		if let Some(timeout) = config.request_timeout {
			builder = builder.timeout(timeout);
		}

		let client = builder
			.build()
			.map_err(|e| Error::InvalidConfig(e.to_string()))?;

		Ok(Self {
			client,
			base_url: base_url.into(),
			api_key: config.api_key.into(),
			creation_locks: Arc::default(),
		})
	}

	#[must_use]
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Logs the registry collected for a device.
	#[instrument(skip(self), err)]
	pub async fn list_device_logs(&self, device_id: &str) -> Result<Vec<LogEntry>, Error> {
		let res = self
			.client
			.get(format!("{}/logs", self.base_url))
			.query(&[("deviceId", device_id)])
			.with_api_key(&self.api_key)
			.send()
			.await?;

		decode::<ListResponse<LogEntry>>(res).await.map(|r| r.list)
	}

	/// Holds creation for `hardware_id` until the guard drops, so two callers in
	/// this process can't both decide the device is missing.
	async fn lock_hardware_id(&self, hardware_id: &str) -> OwnedMutexGuard<()> {
		let lock = {
			let mut locks = self
				.creation_locks
				.lock()
				.unwrap_or_else(PoisonError::into_inner);

			locks.retain(|_, lock| lock.strong_count() > 0);

			if let Some(lock) = locks.get(hardware_id).and_then(Weak::upgrade) {
				lock
			} else {
				let lock = Arc::new(Mutex::new(()));
				locks.insert(hardware_id.to_string(), Arc::downgrade(&lock));
				lock
			}
		};

		lock.lock_owned().await
	}
}

#[async_trait]
impl Registry for RegistryClient {
	#[instrument(skip(self), err)]
	async fn list_devices(&self) -> Result<Vec<Device>, Error> {
		let res = self
			.client
			.get(format!("{}/devices", self.base_url))
			.with_api_key(&self.api_key)
			.send()
			.await?;

		decode::<ListResponse<Device>>(res).await.map(|r| r.list)
	}

	#[instrument(skip(self), err)]
	async fn find_device_by_hardware_id(&self, hardware_id: &str) -> Result<Option<Device>, Error> {
		let res = self
			.client
			.get(format!("{}/devices", self.base_url))
			.query(&[("hardwareId", hardware_id)])
			.with_api_key(&self.api_key)
			.send()
			.await?;

		let mut devices = decode::<ListResponse<Device>>(res).await?.list;
		if devices.len() > 1 {
			debug!(
				count = devices.len(),
				"Multiple devices share this hardware id, using the first one"
			);
		}

		Ok((!devices.is_empty()).then(|| devices.swap_remove(0)))
	}

	#[instrument(skip(self), err)]
	async fn create_device(&self, name: &str, hardware_id: &str) -> Result<Device, Error> {
		let res = self
			.client
			.post(format!("{}/devices", self.base_url))
			.query(&[("hardwareId", hardware_id)])
			.json(&CreateDevice {
				name,
				hardware_ids: [hardware_id],
			})
			.with_api_key(&self.api_key)
			.send()
			.await?;

		let device = decode::<SingleResponse<Device>>(res).await?.data;
		debug!(device_id = %device.id, "Created registry device");

		Ok(device)
	}

	#[instrument(skip(self), err)]
	async fn find_or_create_device_by_hardware_id(
		&self,
		name: &str,
		hardware_id: &str,
	) -> Result<Device, Error> {
		let _guard = self.lock_hardware_id(hardware_id).await;

		if let Some(device) = self.find_device_by_hardware_id(hardware_id).await? {
			trace!(device_id = %device.id, "Found existing registry device");
			return Ok(device);
		}

		self.create_device(name, hardware_id).await
	}

	#[instrument(skip(self), err)]
	async fn list_credentials(&self, device_id: &str) -> Result<Vec<Credential>, Error> {
		let res = self
			.client
			.get(format!("{}/devices/{device_id}/credentials", self.base_url))
			.with_api_key(&self.api_key)
			.send()
			.await?;

		decode::<ListResponse<Credential>>(res).await.map(|r| r.list)
	}

	#[instrument(skip(self, credential), fields(identity = %credential.identity), err)]
	async fn create_credential(
		&self,
		device_id: &str,
		credential: &NewCredential,
	) -> Result<Credential, Error> {
		let res = self
			.client
			.post(format!("{}/devices/{device_id}/credentials", self.base_url))
			.json(credential)
			.with_api_key(&self.api_key)
			.send()
			.await?;

		decode::<SingleResponse<Credential>>(res)
			.await
			.map(|r| r.data)
	}

	#[instrument(skip(self), err)]
	async fn delete_credential(&self, device_id: &str, credential_id: &str) -> Result<(), Error> {
		let res = self
			.client
			.delete(format!(
				"{}/devices/{device_id}/credentials/{credential_id}",
				self.base_url
			))
			.with_api_key(&self.api_key)
			.send()
			.await?;

		if res.status() == StatusCode::NOT_FOUND {
			debug!("Credential was already gone");
			return Ok(());
		}

		check_status(res).await.map(|_| ())
	}
}

async fn check_status(res: Response) -> Result<Response, Error> {
	let status = res.status();
	if status.is_success() {
		return Ok(res);
	}

	let body = res.text().await.unwrap_or_default();

	Err(Error::from_status(status, body))
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, Error> {
	let bytes = check_status(res).await?.bytes().await?;

	serde_json::from_slice(&bytes).map_err(Into::into)
}
