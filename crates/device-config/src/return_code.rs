use std::fmt;

/// Status a device attaches to every configuration response.
///
/// Numbering follows the SMP management protocol, anything it doesn't name is
/// carried as [`ReturnCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCode {
	Ok,
	Unknown,
	NoMemory,
	InvalidValue,
	Timeout,
	NoEntry,
	BadState,
	ResponseTooLong,
	NotSupported,
	Corrupt,
	Busy,
	Other(i32),
}

impl ReturnCode {
	#[must_use]
	pub const fn is_success(self) -> bool {
		matches!(self, Self::Ok)
	}

	#[must_use]
	pub const fn code(self) -> i32 {
		match self {
			Self::Ok => 0,
			Self::Unknown => 1,
			Self::NoMemory => 2,
			Self::InvalidValue => 3,
			Self::Timeout => 4,
			Self::NoEntry => 5,
			Self::BadState => 6,
			Self::ResponseTooLong => 7,
			Self::NotSupported => 8,
			Self::Corrupt => 9,
			Self::Busy => 10,
			Self::Other(code) => code,
		}
	}
}

impl From<i32> for ReturnCode {
	fn from(code: i32) -> Self {
		match code {
			0 => Self::Ok,
			1 => Self::Unknown,
			2 => Self::NoMemory,
			3 => Self::InvalidValue,
			4 => Self::Timeout,
			5 => Self::NoEntry,
			6 => Self::BadState,
			7 => Self::ResponseTooLong,
			8 => Self::NotSupported,
			9 => Self::Corrupt,
			10 => Self::Busy,
			other => Self::Other(other),
		}
	}
}

impl fmt::Display for ReturnCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Ok => "OK",
			Self::Unknown => "unknown error",
			Self::NoMemory => "out of memory",
			Self::InvalidValue => "invalid value",
			Self::Timeout => "timeout",
			Self::NoEntry => "no such entry",
			Self::BadState => "bad state",
			Self::ResponseTooLong => "response too long",
			Self::NotSupported => "not supported",
			Self::Corrupt => "corrupt",
			Self::Busy => "busy",
			Self::Other(_) => "unrecognized",
		};

		write!(f, "{name} ({})", self.code())
	}
}
