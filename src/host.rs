use std::io::ErrorKind;
use std::time::Duration;

use crate::{translate, IoError, LineConfig, Mode, SerialDevice, SetupError, SetupFailure, UartConfig};

/// The read timeout of a host serial port: return immediately with whatever is buffered.
pub const READ_TIMEOUT: Duration = Duration::ZERO;

/// The write timeout of a host serial port.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

/// A real serial port on the host.
///
/// The configuration of the port is captured when it is opened,
/// and restored on [`Self::close()`] if the line settings were changed in the mean time.
pub struct HostSerial<Port: SerialDevice> {
	port: Port,
	original: Port::Configuration,
	reconfigured: bool,
}

impl<Port> std::fmt::Debug for HostSerial<Port>
where
	Port: SerialDevice + std::fmt::Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HostSerial")
			.field("port", &self.port)
			.field("reconfigured", &self.reconfigured)
			.finish_non_exhaustive()
	}
}

impl<Port: SerialDevice> HostSerial<Port> {
	/// Open the host serial port at `path`.
	///
	/// There is no retry: a missing device can not be fixed by trying again.
	pub fn open(path: &str, port: usize) -> Result<Self, SetupError> {
		let device = Port::open(path).map_err(|e| SetupError::new(Mode::HostSerial, path, port, SetupFailure::OpenDevice(e)))?;
		Self::with_port(device).map_err(|reason| SetupError::new(Mode::HostSerial, path, port, reason))
	}

	/// Use an already opened serial port.
	///
	/// This configures the timeouts and captures the current configuration of the port.
	pub fn with_port(mut port: Port) -> Result<Self, SetupFailure> {
		let timeouts = port
			.set_read_timeout(READ_TIMEOUT)
			.and_then(|()| port.set_write_timeout(WRITE_TIMEOUT));
		if let Err(e) = timeouts {
			error!("error setting serial port timeouts: {}", e);
			return Err(SetupFailure::ConfigureTimeouts(e));
		}
		let original = port.configuration().map_err(SetupFailure::ReadConfiguration)?;
		Ok(Self {
			port,
			original,
			reconfigured: false,
		})
	}

	/// Get a reference to the underlying serial port.
	pub fn port(&self) -> &Port {
		&self.port
	}

	/// Get the configuration that was captured when the port was opened.
	pub fn original_configuration(&self) -> &Port::Configuration {
		&self.original
	}

	/// Read a byte if one is available, without blocking.
	pub fn read(&mut self) -> Result<Option<u8>, IoError> {
		let mut buffer = [0u8; 1];
		match self.port.read(&mut buffer) {
			Ok(0) => Ok(None),
			Ok(_) => Ok(Some(buffer[0])),
			Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted) => Ok(None),
			Err(e) => Err(IoError::new("read", e)),
		}
	}

	/// Write a byte without confirming delivery.
	pub fn write(&mut self, byte: u8) -> Result<(), IoError> {
		match self.port.write(&[byte]) {
			Ok(0) => {
				trace!("host serial port did not accept {:#04X}", byte);
				Ok(())
			},
			Ok(_) => Ok(()),
			Err(e) if e.kind() == ErrorKind::TimedOut => {
				trace!("write to host serial port timed out, dropping {:#04X}", byte);
				Ok(())
			},
			Err(e) => Err(IoError::new("write", e)),
		}
	}

	/// Translate the emulated UART settings and apply them to the port.
	pub fn apply_params(&mut self, uart: &UartConfig) -> Result<LineConfig, IoError> {
		let line = translate(uart);
		debug!("configuring host serial port: {}", line);
		self.reconfigured = true;
		self.port.apply_line_config(&line).map_err(|e| IoError::new("apply_line_config", e))?;
		Ok(line)
	}

	/// Flush pending output, restore the original configuration if needed and release the port.
	pub fn close(mut self) -> Result<(), IoError> {
		// Restore even if the flush failed.
		let flushed = self.port.flush().map_err(|e| IoError::new("flush", e));
		if self.reconfigured {
			debug!("restoring original host serial port configuration");
			self.port
				.set_configuration(&self.original)
				.map_err(|e| IoError::new("set_configuration", e))?;
		}
		flushed
	}
}
