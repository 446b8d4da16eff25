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

//! Provisioning of a locally attached device with network settings and
//! registry credentials.
//!
//! [`ProvisioningWorkflow`] coordinates the two sides: the registry, reached
//! through [`prov_registry::Registry`], and the device's key-value
//! configuration, reached through [`prov_device_config::ConfigProtocolClient`].
//! [`CredentialRotator`] handles the revoke-all-then-issue dance on its own
//! and can be used without a device.

mod error;
mod rotator;
pub mod secret;
mod session;
mod workflow;

pub use error::Error;
pub use rotator::{CredentialRotator, FailedRevocation, Rotation};
pub use session::{ProvisioningSession, State, WriteStatus};
pub use workflow::{CredentialStatus, FieldReport, ProvisioningWorkflow, WifiSettings};
