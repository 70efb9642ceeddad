use crate::{
	Error, HostSerial, IoError, OverlappedPipe, PipeClient, PipeServer, RetryPrompt, SerialDevice, UartConfig, UnixPipe,
};

/// The transport used by a [`PassthroughDevice`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
	/// Create a named pipe and wait for a peer to connect.
	PipeServer,

	/// Connect to a named pipe created by a server.
	PipeClient,

	/// Open a real serial port on the host.
	HostSerial,
}

/// Settings needed to open a [`PassthroughDevice`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PassthroughConfig {
	/// The transport to use.
	pub mode: Mode,

	/// The pipe name or the path of the host serial port.
	pub target: String,

	/// The index of the emulated serial port, used in diagnostics.
	pub port: usize,
}

/// The open transport of a [`PassthroughDevice`].
enum Channel<Port: SerialDevice, Pipe> {
	PipeServer(PipeServer),
	PipeClient(PipeClient<Pipe>),
	HostSerial(HostSerial<Port>),
}

macro_rules! make_device_struct {
	($($DefaultPort:ty)?) => {
		/// Serial passthrough for one emulated serial port.
		///
		/// The device owns exactly one transport, selected by [`Mode`] when the device is opened.
		/// It is polled from a single thread, normally once per emulation tick.
		///
		/// If the `"serial2"` feature is enabled, the `Port` generic type argument defaults to [`serial2::SerialPort`].
		/// If it is not enabled, the `Port` argument must always be specified.
		pub struct PassthroughDevice<Port $(= $DefaultPort)?, Pipe = UnixPipe>
		where
			Port: SerialDevice,
			Pipe: OverlappedPipe,
		{
			channel: Channel<Port, Pipe>,
			port: usize,
			uart: Option<UartConfig>,
		}
	};
}

#[cfg(feature = "serial2")]
make_device_struct!(serial2::SerialPort);

#[cfg(not(feature = "serial2"))]
make_device_struct!();

impl<Port, Pipe> std::fmt::Debug for PassthroughDevice<Port, Pipe>
where
	Port: SerialDevice,
	Pipe: OverlappedPipe,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PassthroughDevice")
			.field("mode", &self.mode())
			.field("port", &self.port)
			.field("uart", &self.uart)
			.finish_non_exhaustive()
	}
}

#[cfg(feature = "serial2")]
impl PassthroughDevice<serial2::SerialPort, UnixPipe> {
	/// Open a passthrough device.
	///
	/// For [`Mode::PipeClient`], `prompt` is asked whether to retry while the server is not available.
	/// It is not used in the other modes.
	pub fn open<Prompt>(config: &PassthroughConfig, prompt: &mut Prompt) -> Result<Self, Error>
	where
		Prompt: RetryPrompt + ?Sized,
	{
		Self::open_with_backends(config, prompt)
	}
}

impl<Port, Pipe> PassthroughDevice<Port, Pipe>
where
	Port: SerialDevice,
	Pipe: OverlappedPipe,
{
	/// Open a passthrough device with custom host serial port and pipe client implementations.
	///
	/// On failure, everything that was already acquired is released again.
	pub fn open_with_backends<Prompt>(config: &PassthroughConfig, prompt: &mut Prompt) -> Result<Self, Error>
	where
		Prompt: RetryPrompt + ?Sized,
	{
		let channel = match config.mode {
			Mode::PipeServer => Channel::PipeServer(PipeServer::create(&config.target, config.port)?),
			Mode::PipeClient => Channel::PipeClient(PipeClient::connect(&config.target, config.port, prompt)?),
			Mode::HostSerial => Channel::HostSerial(HostSerial::open(&config.target, config.port)?),
		};
		debug!("opened serial passthrough for COM{} as {}", config.port + 1, config.mode);
		Ok(Self {
			channel,
			port: config.port,
			uart: None,
		})
	}

	/// Get the transport mode of the device.
	pub fn mode(&self) -> Mode {
		match &self.channel {
			Channel::PipeServer(_) => Mode::PipeServer,
			Channel::PipeClient(_) => Mode::PipeClient,
			Channel::HostSerial(_) => Mode::HostSerial,
		}
	}

	/// Get the index of the emulated serial port.
	pub fn port(&self) -> usize {
		self.port
	}

	/// Get the UART settings that were last applied with [`Self::apply_params()`].
	pub fn uart_config(&self) -> Option<&UartConfig> {
		self.uart.as_ref()
	}

	/// Get the named pipe server, if the device is in [`Mode::PipeServer`].
	pub fn pipe_server(&self) -> Option<&PipeServer> {
		match &self.channel {
			Channel::PipeServer(server) => Some(server),
			_ => None,
		}
	}

	/// Get the named pipe client, if the device is in [`Mode::PipeClient`].
	pub fn pipe_client(&self) -> Option<&PipeClient<Pipe>> {
		match &self.channel {
			Channel::PipeClient(client) => Some(client),
			_ => None,
		}
	}

	/// Get the host serial port, if the device is in [`Mode::HostSerial`].
	pub fn host_serial(&self) -> Option<&HostSerial<Port>> {
		match &self.channel {
			Channel::HostSerial(host) => Some(host),
			_ => None,
		}
	}

	/// Read a byte if one is available.
	///
	/// This never blocks.
	pub fn read(&mut self) -> Result<Option<u8>, Error> {
		let byte = match &mut self.channel {
			Channel::PipeServer(server) => server.read()?,
			Channel::PipeClient(client) => client.read()?,
			Channel::HostSerial(host) => host.read()?,
		};
		Ok(byte)
	}

	/// Write a byte.
	///
	/// For [`Mode::PipeServer`] and [`Mode::HostSerial`] this returns immediately without confirming delivery.
	/// For [`Mode::PipeClient`] this waits until the write completed, see [`PipeClient::commit_write()`].
	pub fn write(&mut self, byte: u8) -> Result<(), Error> {
		match &mut self.channel {
			Channel::PipeServer(server) => server.write(byte)?,
			Channel::PipeClient(client) => client.commit_write(byte)?,
			Channel::HostSerial(host) => host.write(byte)?,
		}
		Ok(())
	}

	/// Apply new UART line settings.
	///
	/// Only [`Mode::HostSerial`] has line settings, for the other modes this only records the settings.
	pub fn apply_params(&mut self, uart: &UartConfig) -> Result<(), Error> {
		self.uart = Some(*uart);
		if let Channel::HostSerial(host) = &mut self.channel {
			host.apply_params(uart)?;
		}
		Ok(())
	}

	/// Flush pending output and release the transport.
	///
	/// For [`Mode::HostSerial`], this also restores the original configuration of the port if it was changed.
	pub fn close(self) -> Result<(), Error> {
		let mode = self.mode();
		let result: Result<(), IoError> = match self.channel {
			Channel::PipeServer(server) => server.close(),
			Channel::PipeClient(client) => client.close(),
			Channel::HostSerial(host) => host.close(),
		};
		debug!("closed serial passthrough for COM{} ({})", self.port + 1, mode);
		Ok(result?)
	}
}

impl std::str::FromStr for Mode {
	type Err = &'static str;

	fn from_str(data: &str) -> Result<Self, Self::Err> {
		if data.eq_ignore_ascii_case("pipe-server") {
			Ok(Self::PipeServer)
		} else if data.eq_ignore_ascii_case("pipe-client") {
			Ok(Self::PipeClient)
		} else if data.eq_ignore_ascii_case("host-serial") {
			Ok(Self::HostSerial)
		} else {
			Err("invalid mode: expected \"pipe-server\", \"pipe-client\" or \"host-serial\"")
		}
	}
}

impl std::fmt::Display for Mode {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::PipeServer => write!(f, "named pipe server"),
			Self::PipeClient => write!(f, "named pipe client"),
			Self::HostSerial => write!(f, "host serial port"),
		}
	}
}
