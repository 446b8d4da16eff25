use anyhow::{Context, Result};
use prov_core::Rotation;
use prov_registry::{Credential, Device, LogEntry};
use serde::Serialize;
use serde_json::json;

use crate::OutputFormat;

pub struct Output {
	format: OutputFormat,
}

impl Output {
	pub const fn new(format: OutputFormat) -> Self {
		Self { format }
	}

	pub fn devices(&self, devices: &[Device]) -> Result<()> {
		match self.format {
			OutputFormat::Json => print_json(&devices),
			OutputFormat::Human => {
				for device in devices {
					println!(
						"{}\t{}\t{}",
						device.id,
						device.name,
						device.hardware_ids.join(",")
					);
				}
				Ok(())
			}
		}
	}

	pub fn credentials(&self, credentials: &[Credential]) -> Result<()> {
		match self.format {
			OutputFormat::Json => print_json(&credentials),
			OutputFormat::Human => {
				for credential in credentials {
					println!("{}\t{}", credential.id, credential.identity);
				}
				Ok(())
			}
		}
	}

	/// The issued secret shows up here and nowhere else, it can't be listed later.
	pub fn rotation(&self, rotation: &Rotation) -> Result<()> {
		let credential = &rotation.credential;
		let secret = credential.pre_shared_key.as_deref().unwrap_or_default();

		match self.format {
			OutputFormat::Json => print_json(&json!({
				"credential": credential,
				"revoked": rotation.revoked,
				"failedRevocations": rotation
					.failed_revocations
					.iter()
					.map(|failed| &failed.credential_id)
					.collect::<Vec<_>>(),
				"deviceConfig": {
					"golioth/psk-id": credential.identity,
					"golioth/psk": secret,
				},
			})),
			OutputFormat::Human => {
				println!(
					"Created credential {} (revoked {}, failed {})",
					credential.id,
					rotation.revoked.len(),
					rotation.failed_revocations.len()
				);
				println!("golioth/psk-id\t{}", credential.identity);
				println!("golioth/psk\t{secret}");
				Ok(())
			}
		}
	}

	pub fn logs(&self, logs: &[LogEntry]) -> Result<()> {
		match self.format {
			OutputFormat::Json => print_json(&logs),
			OutputFormat::Human => {
				for entry in logs {
					println!(
						"{} [{}] {}: {}",
						entry.timestamp.as_deref().unwrap_or("-"),
						entry.level.as_deref().unwrap_or("-"),
						entry.module.as_deref().unwrap_or("-"),
						entry.message.as_deref().unwrap_or_default()
					);
				}
				Ok(())
			}
		}
	}
}

fn print_json(value: &impl Serialize) -> Result<()> {
	println!(
		"{}",
		serde_json::to_string_pretty(value).context("serializing output")?
	);

	Ok(())
}
