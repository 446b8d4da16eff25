#![allow(dead_code)]

use std::{
	collections::{HashMap, HashSet},
	sync::{
		atomic::{AtomicBool, AtomicUsize, Ordering},
		Arc, Mutex,
	},
};

use async_trait::async_trait;
use prov_device_config::{self as device, ConfigProtocolClient, ConfigValue, ReturnCode, HARDWARE_ID_KEY};
use prov_registry::{self as registry, Credential, Device, NewCredential, Registry, StatusCode};
use tokio::sync::Barrier;

#[derive(Default)]
struct RegistryState {
	devices: Vec<Device>,
	credentials: HashMap<String, Vec<Credential>>,
	next_device: usize,
	next_credential: usize,
	failing_deletes: HashSet<String>,
	fail_list_credentials: bool,
	fail_create_credential: bool,
	echo_secret: bool,
}

/// Registry kept in memory, with knobs to make individual calls fail.
#[derive(Default)]
pub struct MemoryRegistry {
	state: Mutex<RegistryState>,
	delete_barrier: Mutex<Option<Arc<Barrier>>>,
	pub create_credential_calls: AtomicUsize,
	pub delete_calls: AtomicUsize,
}

impl MemoryRegistry {
	pub fn new() -> Arc<Self> {
		let this = Self::default();
		this.state.lock().unwrap().echo_secret = true;
		Arc::new(this)
	}

	pub fn add_device(&self, id: &str, hardware_id: &str) {
		self.state.lock().unwrap().devices.push(Device {
			id: id.to_string(),
			name: "nrf-board".to_string(),
			hardware_ids: vec![hardware_id.to_string()],
		});
	}

	/// Registers a credential the way a listing would show it, without secret.
	pub fn add_credential(&self, device_id: &str, id: &str) {
		self.state
			.lock()
			.unwrap()
			.credentials
			.entry(device_id.to_string())
			.or_default()
			.push(Credential {
				id: id.to_string(),
				identity: format!("old-{id}"),
				pre_shared_key: None,
			});
	}

	pub fn credentials(&self, device_id: &str) -> Vec<Credential> {
		self.state
			.lock()
			.unwrap()
			.credentials
			.get(device_id)
			.cloned()
			.unwrap_or_default()
	}

	pub fn devices(&self) -> Vec<Device> {
		self.state.lock().unwrap().devices.clone()
	}

	pub fn fail_delete_of(&self, credential_id: &str) {
		self.state
			.lock()
			.unwrap()
			.failing_deletes
			.insert(credential_id.to_string());
	}

	pub fn fail_list_credentials(&self, fail: bool) {
		self.state.lock().unwrap().fail_list_credentials = fail;
	}

	pub fn fail_create_credential(&self, fail: bool) {
		self.state.lock().unwrap().fail_create_credential = fail;
	}

	/// Make created credentials come back without their secret.
	pub fn withhold_secrets(&self) {
		self.state.lock().unwrap().echo_secret = false;
	}

	/// Every delete blocks until `n` deletes are in flight at once.
	pub fn require_concurrent_deletes(&self, n: usize) {
		*self.delete_barrier.lock().unwrap() = Some(Arc::new(Barrier::new(n)));
	}
}

fn server_error(body: &str) -> registry::Error {
	registry::Error::Server {
		status: StatusCode::INTERNAL_SERVER_ERROR,
		body: body.to_string(),
	}
}

#[async_trait]
impl Registry for MemoryRegistry {
	async fn list_devices(&self) -> Result<Vec<Device>, registry::Error> {
		Ok(self.devices())
	}

	async fn find_device_by_hardware_id(
		&self,
		hardware_id: &str,
	) -> Result<Option<Device>, registry::Error> {
		Ok(self
			.state
			.lock()
			.unwrap()
			.devices
			.iter()
			.find(|device| device.has_hardware_id(hardware_id))
			.cloned())
	}

	async fn create_device(&self, name: &str, hardware_id: &str) -> Result<Device, registry::Error> {
		let mut state = self.state.lock().unwrap();

		if state
			.devices
			.iter()
			.any(|device| device.has_hardware_id(hardware_id))
		{
			return Err(registry::Error::Conflict {
				body: format!("hardware id {hardware_id} already registered"),
			});
		}

		state.next_device += 1;
		let device = Device {
			id: format!("dev{}", state.next_device),
			name: name.to_string(),
			hardware_ids: vec![hardware_id.to_string()],
		};
		state.devices.push(device.clone());

		Ok(device)
	}

	async fn list_credentials(&self, device_id: &str) -> Result<Vec<Credential>, registry::Error> {
		let state = self.state.lock().unwrap();
		if state.fail_list_credentials {
			return Err(server_error("listing unavailable"));
		}

		// Secrets are never listed.
		Ok(state
			.credentials
			.get(device_id)
			.into_iter()
			.flatten()
			.map(|credential| Credential {
				pre_shared_key: None,
				..credential.clone()
			})
			.collect())
	}

	async fn create_credential(
		&self,
		device_id: &str,
		credential: &NewCredential,
	) -> Result<Credential, registry::Error> {
		self.create_credential_calls.fetch_add(1, Ordering::SeqCst);

		let mut state = self.state.lock().unwrap();
		if state.fail_create_credential {
			return Err(server_error("issuance unavailable"));
		}

		state.next_credential += 1;
		let created = Credential {
			id: format!("cred{}", state.next_credential),
			identity: credential.identity.clone(),
			pre_shared_key: Some(credential.pre_shared_key.clone()),
		};

		state
			.credentials
			.entry(device_id.to_string())
			.or_default()
			.push(created.clone());

		Ok(if state.echo_secret {
			created
		} else {
			Credential {
				pre_shared_key: None,
				..created
			}
		})
	}

	async fn delete_credential(
		&self,
		device_id: &str,
		credential_id: &str,
	) -> Result<(), registry::Error> {
		self.delete_calls.fetch_add(1, Ordering::SeqCst);

		let barrier = self.delete_barrier.lock().unwrap().clone();
		if let Some(barrier) = barrier {
			barrier.wait().await;
		}

		let mut state = self.state.lock().unwrap();
		if state.failing_deletes.contains(credential_id) {
			return Err(server_error("delete failed"));
		}

		if let Some(credentials) = state.credentials.get_mut(device_id) {
			credentials.retain(|credential| credential.id != credential_id);
		}

		Ok(())
	}
}

/// Device whose configuration store is a map.
pub struct MemoryDevice {
	values: Mutex<HashMap<String, ConfigValue>>,
	rejected: Mutex<HashMap<String, ReturnCode>>,
	link_down: AtomicBool,
}

impl MemoryDevice {
	pub fn new(hardware_id: &[u8]) -> Arc<Self> {
		Arc::new(Self {
			values: Mutex::new(HashMap::from([(
				HARDWARE_ID_KEY.to_string(),
				ConfigValue::Binary(hardware_id.to_vec()),
			)])),
			rejected: Mutex::default(),
			link_down: AtomicBool::new(false),
		})
	}

	pub fn reject(&self, key: &str, code: ReturnCode) {
		self.rejected.lock().unwrap().insert(key.to_string(), code);
	}

	pub fn set_link_down(&self, down: bool) {
		self.link_down.store(down, Ordering::SeqCst);
	}

	pub fn value(&self, key: &str) -> Option<String> {
		self.values
			.lock()
			.unwrap()
			.get(key)
			.and_then(|value| value.as_str().map(str::to_string))
	}
}

#[async_trait]
impl ConfigProtocolClient for MemoryDevice {
	async fn read(&self, key: &str) -> Result<ConfigValue, device::Error> {
		if self.link_down.load(Ordering::SeqCst) {
			return Err(device::Error::transport("link lost"));
		}

		self.values
			.lock()
			.unwrap()
			.get(key)
			.cloned()
			.ok_or_else(|| device::Error::Protocol {
				key: key.to_string(),
				code: ReturnCode::NoEntry,
			})
	}

	async fn write(&self, key: &str, value: &str) -> Result<ReturnCode, device::Error> {
		if self.link_down.load(Ordering::SeqCst) {
			return Err(device::Error::transport("link lost"));
		}

		if let Some(code) = self.rejected.lock().unwrap().get(key) {
			return Ok(*code);
		}

		self.values
			.lock()
			.unwrap()
			.insert(key.to_string(), ConfigValue::from(value));

		Ok(ReturnCode::Ok)
	}
}
