use std::{fmt, time::Duration};

pub const DEFAULT_API_URL: &str = "https://api.golioth.io";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-wide registry settings, built once at startup and handed to
/// [`RegistryClient::new`](crate::RegistryClient::new).
#[derive(Clone)]
pub struct RegistryConfig {
	pub api_url: String,
	pub project_id: String,
	pub api_key: String,
	/// `None` disables the per-request timeout entirely.
	pub request_timeout: Option<Duration>,
}

impl RegistryConfig {
	pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
		Self {
			api_url: DEFAULT_API_URL.to_string(),
			project_id: project_id.into(),
			api_key: api_key.into(),
			request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
		}
	}

	#[must_use]
	pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
		self.api_url = api_url.into();
		self
	}

	#[must_use]
	pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
		self.request_timeout = request_timeout;
		self
	}

	/// `{api_url}/v1/projects/{project_id}`, without a trailing slash.
	#[must_use]
	pub fn base_url(&self) -> String {
		format!(
			"{}/v1/projects/{}",
			self.api_url.trim_end_matches('/'),
			self.project_id
		)
	}
}

impl fmt::Debug for RegistryConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegistryConfig")
			.field("api_url", &self.api_url)
			.field("project_id", &self.project_id)
			.field("api_key", &"<redacted>")
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_url_ignores_trailing_slash() {
		let config = RegistryConfig::new("proj", "key").with_api_url("http://localhost:8080/");
		assert_eq!(config.base_url(), "http://localhost:8080/v1/projects/proj");
	}

	#[test]
	fn debug_hides_api_key() {
		let config = RegistryConfig::new("proj", "super-secret");
		assert!(!format!("{config:?}").contains("super-secret"));
	}
}
