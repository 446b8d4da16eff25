use std::fmt;

/// Read-only key holding the device's hardware identifier as a byte string.
pub const HARDWARE_ID_KEY: &str = "hwinfo/devid";

/// Writable string-valued keys the provisioning flow fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
	WifiSsid,
	WifiPsk,
	PskId,
	Psk,
}

impl ConfigKey {
	pub const ALL: [Self; 4] = [Self::WifiSsid, Self::WifiPsk, Self::PskId, Self::Psk];

	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::WifiSsid => "wifi/ssid",
			Self::WifiPsk => "wifi/psk",
			Self::PskId => "golioth/psk-id",
			Self::Psk => "golioth/psk",
		}
	}

	/// Values under these keys must never reach the logs.
	#[must_use]
	pub const fn is_secret(self) -> bool {
		matches!(self, Self::WifiPsk | Self::Psk)
	}
}

impl fmt::Display for ConfigKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
