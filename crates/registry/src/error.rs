use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("failed to reach the registry: {0}")]
	Network(#[source] reqwest::Error),
	#[error("registry rejected the API key <status='{status}'>")]
	Auth { status: StatusCode },
	#[error("registry reported a conflicting resource: {body}")]
	Conflict { body: String },
	#[error("registry returned an error <status='{status}'>: {body}")]
	Server { status: StatusCode, body: String },
	#[error("malformed registry response: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("invalid registry configuration: {0}")]
	InvalidConfig(String),
}

impl Error {
	/// Maps a non-success response onto the error taxonomy.
	pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
		match status {
			StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth { status },
			StatusCode::CONFLICT => Self::Conflict { body },
			_ => Self::Server { status, body },
		}
	}

	#[must_use]
	pub const fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Auth { status } | Self::Server { status, .. } => Some(*status),
			Self::Conflict { .. } => Some(StatusCode::CONFLICT),
			_ => None,
		}
	}
}

impl From<reqwest::Error> for Error {
	fn from(e: reqwest::Error) -> Self {
		// Body decoding goes through serde_json directly, so anything reqwest
		// surfaces here happened on the wire.
		Self::Network(e)
	}
}
