use std::panic::Location;

use crate::Mode;

/// An error that can occur while operating a passthrough device.
#[derive(Debug)]
pub enum Error {
	/// The transport could not be created, opened or connected.
	Setup(SetupError),

	/// An I/O call on an open transport failed.
	Io(IoError),
}

/// The transport for a passthrough device could not be set up.
#[derive(Debug)]
pub struct SetupError {
	/// The mode the device was being opened in.
	pub mode: Mode,

	/// The pipe name or host device path.
	pub target: String,

	/// The index of the emulated serial port.
	pub port: usize,

	/// The reason setup failed.
	pub reason: SetupFailure,
}

/// The reason why setting up a transport failed.
#[derive(Debug)]
pub enum SetupFailure {
	/// The named pipe server could not be created.
	CreateServer(std::io::Error),

	/// The named pipe server was not available and the user declined to retry.
	ServerUnavailable,

	/// The host serial device could not be opened.
	OpenDevice(std::io::Error),

	/// The read and write timeouts of the host serial device could not be set.
	ConfigureTimeouts(std::io::Error),

	/// The original configuration of the host serial device could not be read.
	ReadConfiguration(std::io::Error),
}

/// An I/O operation failed with something other than "operation in progress".
#[derive(Debug)]
pub struct IoError {
	/// The source location that issued the failing operation.
	pub location: &'static Location<'static>,

	/// The name of the failing operation.
	pub operation: &'static str,

	/// The error reported by the operating system.
	pub error: std::io::Error,
}

impl SetupError {
	pub(crate) fn new(mode: Mode, target: &str, port: usize, reason: SetupFailure) -> Self {
		Self {
			mode,
			target: target.to_owned(),
			port,
			reason,
		}
	}
}

impl IoError {
	/// Wrap an I/O error, recording the location of the caller.
	#[track_caller]
	pub fn new(operation: &'static str, error: std::io::Error) -> Self {
		Self {
			location: Location::caller(),
			operation,
			error,
		}
	}
}

impl SetupFailure {
	/// Get the underlying I/O error, if any.
	pub fn io_error(&self) -> Option<&std::io::Error> {
		match self {
			Self::CreateServer(e) => Some(e),
			Self::ServerUnavailable => None,
			Self::OpenDevice(e) => Some(e),
			Self::ConfigureTimeouts(e) => Some(e),
			Self::ReadConfiguration(e) => Some(e),
		}
	}
}

/// Get the best available description of an I/O error.
///
/// Errors that carry an OS error code are described with [`os_error_message()`],
/// other errors use their own [`Display`](std::fmt::Display) implementation.
pub fn system_error_message(error: &std::io::Error) -> String {
	match error.raw_os_error() {
		Some(code) => os_error_message(code),
		None => error.to_string(),
	}
}

/// Get the system message for an OS error code.
///
/// If the operating system can not resolve a message for the code,
/// this returns `"Unknown system error (0x%08X)"` with the code filled in.
pub fn os_error_message(code: i32) -> String {
	let message = std::io::Error::from_raw_os_error(code).to_string();
	let suffix = format!(" (os error {})", code);
	let message = message.strip_suffix(suffix.as_str()).unwrap_or(&message);
	let message = trim_newline(message);
	// Unix libc and the Windows fallback in std use these prefixes for unresolved codes.
	if message.is_empty() || message.starts_with("Unknown error") || message.starts_with("OS Error") {
		format!("Unknown system error (0x{:08X})", code as u32)
	} else {
		message.to_owned()
	}
}

/// Remove a single trailing `"\r\n"`, `"\n"` or `"\r"` from a message.
pub fn trim_newline(message: &str) -> &str {
	message
		.strip_suffix("\r\n")
		.or_else(|| message.strip_suffix('\n'))
		.or_else(|| message.strip_suffix('\r'))
		.unwrap_or(message)
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Setup(e) => Some(e),
			Self::Io(e) => Some(e),
		}
	}
}

impl std::error::Error for SetupError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.reason.io_error().map(|e| e as &(dyn std::error::Error + 'static))
	}
}

impl std::error::Error for IoError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		Some(&self.error)
	}
}

impl From<SetupError> for Error {
	fn from(other: SetupError) -> Self {
		Self::Setup(other)
	}
}

impl From<IoError> for Error {
	fn from(other: IoError) -> Self {
		Self::Io(other)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Setup(e) => write!(f, "{}", e),
			Self::Io(e) => write!(f, "{}", e),
		}
	}
}

impl std::fmt::Display for SetupError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let com = self.port + 1;
		match &self.reason {
			SetupFailure::CreateServer(e) => write!(
				f,
				"Named pipe (server, named_pipe=\"{}\", port=COM{}): {}",
				self.target,
				com,
				system_error_message(e)
			),
			SetupFailure::ServerUnavailable => write!(
				f,
				"Named pipe server not available (named_pipe=\"{}\", port=COM{})",
				self.target, com
			),
			SetupFailure::OpenDevice(e) => write!(
				f,
				"Host serial port (path=\"{}\", port=COM{}): {}",
				self.target,
				com,
				system_error_message(e)
			),
			SetupFailure::ConfigureTimeouts(e) => write!(
				f,
				"Host serial port (path=\"{}\", port=COM{}): failed to set timeouts: {}",
				self.target,
				com,
				system_error_message(e)
			),
			SetupFailure::ReadConfiguration(e) => write!(
				f,
				"Host serial port (path=\"{}\", port=COM{}): failed to read configuration: {}",
				self.target,
				com,
				system_error_message(e)
			),
		}
	}
}

impl std::fmt::Display for IoError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"{}({}): '{}' failed: {}",
			self.location.file(),
			self.location.line(),
			self.operation,
			system_error_message(&self.error)
		)
	}
}
