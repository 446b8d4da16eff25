use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Registry(#[from] prov_registry::Error),
	#[error(transparent)]
	Device(#[from] prov_device_config::Error),

	#[error("no device is connected")]
	NotConnected,
	#[error("hardware id has not been read from the device yet")]
	MissingHardwareId,
	#[error("no registry device has been resolved yet")]
	NoDevice,
	#[error("session holds no live credential")]
	NoLiveCredential,
	#[error("secret of credential <id='{credential_id}'> was never captured; rotate to issue a new one")]
	SecretUnknown { credential_id: String },
}
