use std::{error::Error as StdError, string::FromUtf8Error};

use thiserror::Error;

use crate::ReturnCode;

#[derive(Debug, Error)]
pub enum Error {
	#[error("device link failure: {0}")]
	Transport(#[source] Box<dyn StdError + Send + Sync>),
	#[error("device rejected key <key='{key}'>: {code}")]
	Protocol { key: String, code: ReturnCode },
	#[error("unexpected value under key <key='{key}'>: expected {expected}, found {found}")]
	UnexpectedValue {
		key: String,
		expected: &'static str,
		found: String,
	},
	#[error("value under key <key='{key}'> is not valid UTF-8")]
	InvalidUtf8 {
		key: String,
		#[source]
		source: FromUtf8Error,
	},
}

impl Error {
	/// Wraps whatever the link layer reported.
	pub fn transport(e: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
		Self::Transport(e.into())
	}
}
