use std::collections::BTreeMap;

use prov_device_config::{ConfigKey, ReturnCode};
use prov_registry::{Credential, Device};

/// Where a [`ProvisioningWorkflow`](crate::ProvisioningWorkflow) currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
	Idle,
	ReadingHardwareId,
	ResolvingDevice,
	ResolvingCredential,
	WritingConfig,
	Done,
	Failed,
}

/// Last known result of writing one configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
	Accepted,
	Rejected(ReturnCode),
	Failed(String),
}

/// Everything learned during one provisioning run. Lives only in memory.
#[derive(Debug, Default, Clone)]
pub struct ProvisioningSession {
	pub hardware_id: Option<String>,
	pub device: Option<Device>,
	pub live_credential: Option<Credential>,
	pub writes: BTreeMap<ConfigKey, WriteStatus>,
}

impl ProvisioningSession {
	/// Drops everything tied to the previous board when a different hardware
	/// id shows up.
	pub(crate) fn set_hardware_id(&mut self, hardware_id: String) {
		if self.hardware_id.as_deref() != Some(hardware_id.as_str()) {
			self.device = None;
			self.live_credential = None;
			self.writes.clear();
		}

		self.hardware_id = Some(hardware_id);
	}

	/// Picks the live credential out of a registry listing. The credential this
	/// session already holds wins if it is still registered, together with the
	/// secret captured for it; otherwise the first listed one is adopted.
	pub(crate) fn adopt_credential(&mut self, mut listed: Vec<Credential>) -> Option<&Credential> {
		let held = self
			.live_credential
			.as_ref()
			.and_then(|live| listed.iter().position(|credential| credential.id == live.id));

		let mut adopted = match held {
			Some(idx) => listed.swap_remove(idx),
			None if listed.is_empty() => {
				self.live_credential = None;
				return None;
			}
			None => listed.swap_remove(0),
		};

		if held.is_some() && adopted.pre_shared_key.is_none() {
			adopted.pre_shared_key = self
				.live_credential
				.take()
				.and_then(|mut live| live.take_pre_shared_key());
		}

		Some(self.live_credential.insert(adopted))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn credential(id: &str, secret: Option<&str>) -> Credential {
		Credential {
			id: id.to_string(),
			identity: format!("abc123{id}"),
			pre_shared_key: secret.map(str::to_string),
		}
	}

	#[test]
	fn new_hardware_id_clears_previous_board() {
		let mut session = ProvisioningSession::default();
		session.set_hardware_id("abc123".to_string());
		session.live_credential = Some(credential("cred1", Some("s3cr3tPw")));
		session.writes.insert(ConfigKey::Psk, WriteStatus::Accepted);

		session.set_hardware_id("abc123".to_string());
		assert!(session.live_credential.is_some());

		session.set_hardware_id("def456".to_string());
		assert!(session.live_credential.is_none());
		assert!(session.writes.is_empty());
	}

	#[test]
	fn captured_secret_survives_relisting() {
		let mut session = ProvisioningSession {
			live_credential: Some(credential("cred1", Some("s3cr3tPw"))),
			..Default::default()
		};

		session.adopt_credential(vec![credential("cred1", None)]);

		assert_eq!(
			session
				.live_credential
				.as_ref()
				.and_then(|c| c.pre_shared_key.as_deref()),
			Some("s3cr3tPw")
		);
	}

	#[test]
	fn other_credential_does_not_inherit_secret() {
		let mut session = ProvisioningSession {
			live_credential: Some(credential("cred1", Some("s3cr3tPw"))),
			..Default::default()
		};

		session.adopt_credential(vec![credential("cred2", None)]);

		assert!(!session
			.live_credential
			.as_ref()
			.is_some_and(Credential::has_secret));
	}

	#[test]
	fn held_credential_wins_over_leftovers_listed_first() {
		let mut session = ProvisioningSession {
			live_credential: Some(credential("cred2", Some("s3cr3tPw"))),
			..Default::default()
		};

		let adopted = session
			.adopt_credential(vec![credential("old1", None), credential("cred2", None)])
			.unwrap();

		assert_eq!(adopted.id, "cred2");
		assert_eq!(adopted.pre_shared_key.as_deref(), Some("s3cr3tPw"));
	}

	#[test]
	fn empty_listing_clears_live_credential() {
		let mut session = ProvisioningSession {
			live_credential: Some(credential("cred1", Some("s3cr3tPw"))),
			..Default::default()
		};

		assert!(session.adopt_credential(Vec::new()).is_none());
		assert!(session.live_credential.is_none());
	}
}
