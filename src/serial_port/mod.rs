//! [`SerialDevice`] trait to support different host serial port implementations.

use core::time::Duration;

use crate::LineConfig;

#[cfg(feature = "serial2")]
pub mod serial2;

/// [`SerialDevice`]s are the host side of a serial passthrough.
///
/// Reads must honor the configured read timeout.
/// With a zero read timeout, a read must return immediately with whatever data is already buffered.
pub trait SerialDevice: Sized {
	/// The full device configuration, as captured when the device is opened.
	type Configuration: Clone;

	/// Open the device at the given path, keeping its current configuration.
	fn open(path: &str) -> std::io::Result<Self>;

	/// Get the full current configuration of the device.
	fn configuration(&self) -> std::io::Result<Self::Configuration>;

	/// Replace the full configuration of the device.
	fn set_configuration(&mut self, configuration: &Self::Configuration) -> std::io::Result<()>;

	/// Apply translated line settings on top of the current configuration.
	fn apply_line_config(&mut self, line: &LineConfig) -> std::io::Result<()>;

	/// Set the read timeout.
	fn set_read_timeout(&mut self, timeout: Duration) -> std::io::Result<()>;

	/// Set the write timeout.
	fn set_write_timeout(&mut self, timeout: Duration) -> std::io::Result<()>;

	/// Read available bytes, returning the number of bytes read.
	fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize>;

	/// Write bytes, returning the number of bytes written.
	fn write(&mut self, buffer: &[u8]) -> std::io::Result<usize>;

	/// Wait until all written data has been handed to the device.
	fn flush(&mut self) -> std::io::Result<()>;
}
