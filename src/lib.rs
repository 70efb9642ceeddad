//! Non-blocking serial passthrough between an emulated UART and the host.
//!
//! A [`PassthroughDevice`] relays bytes between an emulated serial port and one of three transports:
//! * the server side of a named pipe ([`PipeServer`]),
//! * the client side of a named pipe ([`PipeClient`]),
//! * a real serial port on the host ([`HostSerial`]).
//!
//! The device is driven from the main loop of an emulator.
//! Reads never block, so they can be polled once per tick.
//! Writes return immediately, except for the named pipe client,
//! which waits for each write to complete (see [`PipeClient::commit_write()`]).
//!
//! Whenever the guest changes the line control register of the UART,
//! call [`PassthroughDevice::apply_params()`] to update the host serial port.
//!
//! # Optional features
//!
//! * `serial2` (default): implement [`SerialDevice`] for [`serial2::SerialPort`]
//!   and use it as the default host serial port of a [`PassthroughDevice`].
//! * `log`: emit log messages through the `log` crate.

#[macro_use]
mod log;

mod device;
mod error;
mod host;
pub mod params;
pub mod pipe;
mod prompt;
mod serial_port;

pub use device::{Mode, PassthroughConfig, PassthroughDevice};
pub use error::{os_error_message, system_error_message, trim_newline, Error, IoError, SetupError, SetupFailure};
pub use host::{HostSerial, READ_TIMEOUT, WRITE_TIMEOUT};
pub use params::{translate, LineConfig, Parity, StopBits, UartConfig};
pub use pipe::{AsyncChannelState, OverlappedPipe, PipeClient, PipeServer, UnixPipe};
pub use prompt::{NeverRetry, RetryPrompt};
pub use serial_port::SerialDevice;

/// Re-exported `serial2` crate in case you need to modify serial port settings.
#[cfg(feature = "serial2")]
pub use serial2;
