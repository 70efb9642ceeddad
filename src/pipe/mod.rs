//! Named pipe transports.
//!
//! A named pipe is a Unix domain stream socket bound at the pipe name.
//! The [`PipeServer`] binds the name and serves one peer at a time.
//! The [`PipeClient`] connects to a server through an [`OverlappedPipe`].

use std::task::Poll;

mod async_state;
mod client;
mod server;
mod socket;
mod unix;

pub use async_state::{AsyncChannelState, CompletionSignal};
pub use client::PipeClient;
pub use server::PipeServer;
pub use unix::UnixPipe;

/// The number of bytes reserved for each direction of a pipe.
pub const PIPE_BUFFER_SIZE: usize = 65536;

/// The maximum length of a pipe name in bytes, including a terminator.
pub const MAX_PIPE_NAME_LEN: usize = 1024;

/// Truncate a pipe name to fit in [`MAX_PIPE_NAME_LEN`] bytes including a terminator.
///
/// The name is cut on a character boundary, so it may end up shorter than the limit.
pub fn truncate_pipe_name(name: &str) -> &str {
	let max = MAX_PIPE_NAME_LEN - 1;
	if name.len() <= max {
		return name;
	}
	let mut end = max;
	while !name.is_char_boundary(end) {
		end -= 1;
	}
	&name[..end]
}

/// A pipe that completes single byte operations asynchronously.
///
/// Issuing an operation either completes it immediately ([`Poll::Ready`]),
/// or accepts it for later completion ([`Poll::Pending`]).
/// An `Err` always means the operation failed, never that it is still in progress.
///
/// At most one read and one write may be outstanding at any time.
pub trait OverlappedPipe: Sized {
	/// Connect to the server listening on the given pipe name.
	fn connect(name: &str) -> std::io::Result<Self>;

	/// Issue an asynchronous read of a single byte.
	fn start_read(&mut self) -> std::io::Result<Poll<u8>>;

	/// Check if the outstanding read completed, without blocking.
	fn poll_read(&mut self) -> std::io::Result<Poll<u8>>;

	/// Issue an asynchronous write of a single byte.
	fn start_write(&mut self, byte: u8) -> std::io::Result<Poll<()>>;

	/// Wait without timeout for the outstanding write to complete.
	///
	/// Returns the number of bytes the completed write transferred.
	fn wait_write(&mut self) -> std::io::Result<usize>;

	/// Wait until all written data has been handed to the peer.
	fn flush(&mut self) -> std::io::Result<()>;
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn test_short_name_is_kept() {
		assert!(truncate_pipe_name("/tmp/com1") == "/tmp/com1");
		assert!(truncate_pipe_name("") == "");
	}

	#[test]
	fn test_long_name_is_truncated() {
		let name = "a".repeat(2000);
		assert!(truncate_pipe_name(&name).len() == MAX_PIPE_NAME_LEN - 1);
		let name = "a".repeat(MAX_PIPE_NAME_LEN - 1);
		assert!(truncate_pipe_name(&name) == name);
	}

	#[test]
	fn test_truncate_on_char_boundary() {
		// 'é' is two bytes, so byte 1023 falls in the middle of a character.
		let name = "é".repeat(600);
		let truncated = truncate_pipe_name(&name);
		assert!(truncated.len() == 1022);
		assert!(truncated.chars().all(|c| c == 'é'));
	}
}
