//! Translation of emulated UART line settings to host line settings.

/// The standard baud rates the host line is normalized to.
///
/// A requested baud rate is clamped down to the highest entry that does not exceed it.
pub const BAUD_RATE_BUCKETS: [u32; 12] = [110, 300, 600, 1200, 2400, 4800, 9600, 14400, 19200, 38400, 57600, 115200];

/// Line control register bits used by the translation.
pub mod lcr {
	/// Set for two stop bits, clear for one.
	pub const STOP_BITS: u8 = 0x04;

	/// Set to enable parity.
	pub const PARITY_ENABLE: u8 = 0x08;

	/// Selects even parity, or space parity when combined with [`STICK_PARITY`].
	pub const EVEN_PARITY: u8 = 0x10;

	/// Selects mark/space parity instead of odd/even parity.
	pub const STICK_PARITY: u8 = 0x20;
}

/// Snapshot of the emulated UART line settings.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct UartConfig {
	/// The baud rate programmed by the guest.
	pub baud_rate: u32,

	/// The number of data bits per character.
	pub data_bits: u8,

	/// The raw line control register.
	pub line_control: u8,
}

/// The number of stop bits.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StopBits {
	One,
	Two,
}

/// The parity scheme.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Parity {
	None,
	Odd,
	Even,
	Mark,
	Space,
}

/// Host line settings derived from a [`UartConfig`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LineConfig {
	/// The normalized baud rate.
	///
	/// This is `None` if the requested baud rate is below the lowest bucket,
	/// in which case the host line keeps its current baud rate.
	pub baud_rate: Option<u32>,

	/// The number of data bits per character.
	pub data_bits: u8,

	/// The number of stop bits.
	pub stop_bits: StopBits,

	/// The parity scheme.
	pub parity: Parity,
}

/// Get the baud rate bucket that a requested baud rate falls into.
pub fn baud_rate_bucket(baud_rate: u32) -> Option<u32> {
	BAUD_RATE_BUCKETS.iter().rev().copied().find(|&min| baud_rate >= min)
}

/// Get the number of stop bits selected by a line control register.
pub fn stop_bits(line_control: u8) -> StopBits {
	if line_control & lcr::STOP_BITS != 0 {
		StopBits::Two
	} else {
		StopBits::One
	}
}

/// Get the parity scheme selected by a line control register.
pub fn parity(line_control: u8) -> Parity {
	if line_control & lcr::PARITY_ENABLE == 0 {
		return Parity::None;
	}
	let even = line_control & lcr::EVEN_PARITY != 0;
	match (line_control & lcr::STICK_PARITY != 0, even) {
		(false, false) => Parity::Odd,
		(false, true) => Parity::Even,
		(true, false) => Parity::Mark,
		(true, true) => Parity::Space,
	}
}

/// Translate emulated UART settings to host line settings.
pub fn translate(uart: &UartConfig) -> LineConfig {
	LineConfig {
		baud_rate: baud_rate_bucket(uart.baud_rate),
		data_bits: uart.data_bits,
		stop_bits: stop_bits(uart.line_control),
		parity: parity(uart.line_control),
	}
}

impl std::fmt::Display for StopBits {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::One => write!(f, "1"),
			Self::Two => write!(f, "2"),
		}
	}
}

impl std::fmt::Display for Parity {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::None => write!(f, "none"),
			Self::Odd => write!(f, "odd"),
			Self::Even => write!(f, "even"),
			Self::Mark => write!(f, "mark"),
			Self::Space => write!(f, "space"),
		}
	}
}

impl std::fmt::Display for LineConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self.baud_rate {
			Some(baud_rate) => write!(f, "{} baud", baud_rate)?,
			None => write!(f, "unchanged baud")?,
		}
		write!(f, ", {} data bits, {} stop bits, {} parity", self.data_bits, self.stop_bits, self.parity)
	}
}
