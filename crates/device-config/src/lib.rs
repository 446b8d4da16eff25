#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Key-value configuration access on an attached device.
//!
//! The link to the device and the binary encoding of values live behind
//! [`ConfigProtocolClient`]; this crate only fixes the contract and the keys
//! provisioning cares about.

mod error;
mod key;
mod return_code;

use async_trait::async_trait;
use tracing::trace;

pub use error::Error;
pub use key::{ConfigKey, HARDWARE_ID_KEY};
pub use return_code::ReturnCode;

/// Decoded configuration value, at least byte strings and text are expected.
pub type ConfigValue = rmpv::Value;

/// A single read or write against a connected device.
///
/// Implementations report link problems as [`Error::Transport`] and never
/// retry on their own.
#[async_trait]
pub trait ConfigProtocolClient: Send + Sync {
	async fn read(&self, key: &str) -> Result<ConfigValue, Error>;

	/// A device that answers at all answers with a [`ReturnCode`], rejected
	/// writes included.
	async fn write(&self, key: &str, value: &str) -> Result<ReturnCode, Error>;
}

/// Reads `hwinfo/devid` and decodes its byte string as UTF-8.
pub async fn read_hardware_id<C>(client: &C) -> Result<String, Error>
where
	C: ConfigProtocolClient + ?Sized,
{
	let value = client.read(HARDWARE_ID_KEY).await?;
	trace!(?value, "Read hardware id value");

	decode_byte_string(HARDWARE_ID_KEY, value)
}

pub fn decode_byte_string(key: &str, value: ConfigValue) -> Result<String, Error> {
	match value {
		ConfigValue::Binary(bytes) => String::from_utf8(bytes).map_err(|source| Error::InvalidUtf8 {
			key: key.to_string(),
			source,
		}),
		other => Err(Error::UnexpectedValue {
			key: key.to_string(),
			expected: "byte string",
			found: value_kind(&other).to_string(),
		}),
	}
}

/// Turns a non-OK write status into [`Error::Protocol`].
pub fn check_return_code(key: &str, code: ReturnCode) -> Result<(), Error> {
	if code.is_success() {
		Ok(())
	} else {
		Err(Error::Protocol {
			key: key.to_string(),
			code,
		})
	}
}

const fn value_kind(value: &ConfigValue) -> &'static str {
	match value {
		ConfigValue::Nil => "nil",
		ConfigValue::Boolean(_) => "boolean",
		ConfigValue::Integer(_) => "integer",
		ConfigValue::F32(_) | ConfigValue::F64(_) => "float",
		ConfigValue::String(_) => "text string",
		ConfigValue::Binary(_) => "byte string",
		ConfigValue::Array(_) => "array",
		ConfigValue::Map(_) => "map",
		ConfigValue::Ext(..) => "extension",
	}
}
