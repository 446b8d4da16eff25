use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub(crate) struct SingleResponse<T> {
	pub data: T,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ListResponse<T> {
	#[serde(default = "Vec::new")]
	pub list: Vec<T>,
}

/// A registry record for one physical device.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub hardware_ids: Vec<String>,
}

impl Device {
	#[must_use]
	pub fn has_hardware_id(&self, hardware_id: &str) -> bool {
		self.hardware_ids.iter().any(|id| id == hardware_id)
	}
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateDevice<'a> {
	pub name: &'a str,
	pub hardware_ids: [&'a str; 1],
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialType {
	PreSharedKey,
}

/// A credential as known by the registry.
///
/// The registry only hands out `pre_shared_key` in the response to the request
/// that created the credential, every later listing leaves it empty. Whoever
/// issues a credential has to [`take`](Self::take_pre_shared_key) the key
/// right away or it is gone for good.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
	pub id: String,
	pub identity: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pre_shared_key: Option<String>,
}

impl Credential {
	#[must_use]
	pub const fn has_secret(&self) -> bool {
		self.pre_shared_key.is_some()
	}

	pub fn take_pre_shared_key(&mut self) -> Option<String> {
		self.pre_shared_key.take()
	}
}

impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credential")
			.field("id", &self.id)
			.field("identity", &self.identity)
			.field(
				"pre_shared_key",
				&self.pre_shared_key.as_ref().map(|_| "<redacted>"),
			)
			.finish()
	}
}

/// Request body for issuing a new credential.
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewCredential {
	#[serde(rename = "type")]
	pub kind: CredentialType,
	pub identity: String,
	pub pre_shared_key: String,
}

impl NewCredential {
	pub fn pre_shared_key(identity: impl Into<String>, pre_shared_key: impl Into<String>) -> Self {
		Self {
			kind: CredentialType::PreSharedKey,
			identity: identity.into(),
			pre_shared_key: pre_shared_key.into(),
		}
	}
}

impl fmt::Debug for NewCredential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NewCredential")
			.field("kind", &self.kind)
			.field("identity", &self.identity)
			.finish_non_exhaustive()
	}
}

/// A single log line a device shipped to the registry.
///
/// Only the commonly present fields are typed, anything else is kept as-is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
	#[serde(default)]
	pub device_id: Option<String>,
	#[serde(default)]
	pub timestamp: Option<String>,
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub module: Option<String>,
	#[serde(default)]
	pub message: Option<String>,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}
