use serial_passthrough::{LineConfig, Parity, SerialDevice, StopBits};
use std::collections::{HashMap, VecDeque};
use std::io::ErrorKind;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};
use std::time::Duration;

static DEVICES: LazyLock<Mutex<HashMap<String, Arc<Mutex<MockLine>>>>> = LazyLock::new(Mutex::default);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MockConfiguration {
	pub baud_rate: u32,
	pub data_bits: u8,
	pub stop_bits: StopBits,
	pub parity: Parity,
	pub rts_cts: bool,
}

impl Default for MockConfiguration {
	fn default() -> Self {
		Self {
			baud_rate: 115200,
			data_bits: 7,
			stop_bits: StopBits::Two,
			parity: Parity::Odd,
			rts_cts: true,
		}
	}
}

/// The simulated hardware behind a [`MockSerialPort`].
#[derive(Debug, Default)]
pub struct MockLine {
	pub configuration: MockConfiguration,
	pub read_timeout: Option<Duration>,
	pub write_timeout: Option<Duration>,
	pub rx: VecDeque<u8>,
	pub tx: Vec<u8>,
	pub open_handles: usize,
	pub set_configuration_calls: usize,
	pub fail_timeouts: bool,
}

/// A serial port backed by a [`MockLine`] registered under a path.
#[derive(Debug)]
pub struct MockSerialPort {
	line: Arc<Mutex<MockLine>>,
}

impl MockSerialPort {
	/// Register a device under `path` and get a handle to its hardware.
	pub fn install(path: &str, configuration: MockConfiguration) -> Arc<Mutex<MockLine>> {
		let line = Arc::new(Mutex::new(MockLine {
			configuration,
			..MockLine::default()
		}));
		DEVICES.lock().unwrap().insert(path.to_owned(), line.clone());
		line
	}

	fn line(&self) -> MutexGuard<'_, MockLine> {
		self.line.lock().unwrap()
	}
}

impl Drop for MockSerialPort {
	fn drop(&mut self) {
		self.line().open_handles -= 1;
	}
}

impl SerialDevice for MockSerialPort {
	type Configuration = MockConfiguration;

	fn open(path: &str) -> std::io::Result<Self> {
		let line = DEVICES.lock().unwrap().get(path).cloned().ok_or(ErrorKind::NotFound)?;
		line.lock().unwrap().open_handles += 1;
		Ok(Self { line })
	}

	fn configuration(&self) -> std::io::Result<MockConfiguration> {
		Ok(self.line().configuration.clone())
	}

	fn set_configuration(&mut self, configuration: &MockConfiguration) -> std::io::Result<()> {
		let mut line = self.line();
		line.set_configuration_calls += 1;
		line.configuration = configuration.clone();
		Ok(())
	}

	fn apply_line_config(&mut self, config: &LineConfig) -> std::io::Result<()> {
		let mut line = self.line();
		if let Some(baud_rate) = config.baud_rate {
			line.configuration.baud_rate = baud_rate;
		}
		line.configuration.data_bits = config.data_bits;
		line.configuration.stop_bits = config.stop_bits;
		line.configuration.parity = config.parity;
		Ok(())
	}

	fn set_read_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
		let mut line = self.line();
		if line.fail_timeouts {
			return Err(ErrorKind::InvalidInput.into());
		}
		line.read_timeout = Some(timeout);
		Ok(())
	}

	fn set_write_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
		let mut line = self.line();
		if line.fail_timeouts {
			return Err(ErrorKind::InvalidInput.into());
		}
		line.write_timeout = Some(timeout);
		Ok(())
	}

	fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
		let mut line = self.line();
		if line.rx.is_empty() {
			return Err(ErrorKind::TimedOut.into());
		}
		let len = buffer.len().min(line.rx.len());
		for (target, byte) in buffer.iter_mut().zip(line.rx.drain(..len)) {
			*target = byte;
		}
		Ok(len)
	}

	fn write(&mut self, buffer: &[u8]) -> std::io::Result<usize> {
		self.line().tx.extend_from_slice(buffer);
		Ok(buffer.len())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}
