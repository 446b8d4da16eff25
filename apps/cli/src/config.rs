//! Optional JSON settings file for the CLI

use std::path::Path;

use anyhow::{Context, Result};
use prov_registry::{RegistryConfig, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};

/// Settings that rarely change between invocations. The API key is not part
/// of it and has to come from the command line or the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
	pub api_url: Option<String>,
	pub project_id: Option<String>,
	/// Seconds, 0 turns the timeout off
	pub timeout_secs: Option<u64>,
}

impl CliConfig {
	pub fn load(path: &Path) -> Result<Self> {
		let json = std::fs::read_to_string(path)
			.with_context(|| format!("reading config file {}", path.display()))?;

		serde_json::from_str(&json).with_context(|| format!("parsing config file {}", path.display()))
	}

	/// Command line values win over the file, the file wins over defaults.
	pub fn merge(self, overrides: Self) -> Self {
		Self {
			api_url: overrides.api_url.or(self.api_url),
			project_id: overrides.project_id.or(self.project_id),
			timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
		}
	}

	pub fn into_registry_config(self, api_key: String) -> Result<RegistryConfig> {
		let project_id = self
			.project_id
			.context("no project id given, pass --project-id or set GOLIOTH_PROJECT_ID")?;

		let timeout = match self.timeout_secs {
			Some(0) => None,
			Some(secs) => Some(std::time::Duration::from_secs(secs)),
			None => Some(prov_registry::DEFAULT_REQUEST_TIMEOUT),
		};

		Ok(RegistryConfig::new(project_id, api_key)
			.with_api_url(self.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()))
			.with_request_timeout(timeout))
	}
}
