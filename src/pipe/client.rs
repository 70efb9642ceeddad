use std::task::Poll;

use super::{truncate_pipe_name, AsyncChannelState, OverlappedPipe};
use crate::{IoError, Mode, RetryPrompt, SetupError, SetupFailure};

/// Client side of a named pipe.
///
/// Reads never block: a read is issued once and then polled on every call until it completes.
/// Writes are synchronous commits: see [`Self::commit_write()`].
pub struct PipeClient<Pipe> {
	pipe: Pipe,
	state: AsyncChannelState,
}

impl<Pipe> std::fmt::Debug for PipeClient<Pipe>
where
	Pipe: std::fmt::Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PipeClient")
			.field("pipe", &self.pipe)
			.field("read_pending", &self.state.read_pending)
			.finish_non_exhaustive()
	}
}

impl<Pipe: OverlappedPipe> PipeClient<Pipe> {
	/// Connect to the named pipe server listening on `name`.
	///
	/// If the server is not available, the user is asked through `prompt` whether to try again.
	/// Declining fails with [`SetupFailure::ServerUnavailable`].
	pub fn connect<Prompt>(name: &str, port: usize, prompt: &mut Prompt) -> Result<Self, SetupError>
	where
		Prompt: RetryPrompt + ?Sized,
	{
		let name = truncate_pipe_name(name);
		let message = format!(
			"Server not available (named_pipe=\"{}\", port=COM{}).\nMake sure the server is started.\nTry again? ([No] aborts the passthrough.)",
			name,
			port + 1,
		);

		let pipe = loop {
			match Pipe::connect(name) {
				Ok(pipe) => break pipe,
				Err(e) => {
					debug!("failed to connect to named pipe server {}: {}", name, e);
					if !prompt.retry(&message) {
						return Err(SetupError::new(Mode::PipeClient, name, port, SetupFailure::ServerUnavailable));
					}
				},
			}
		};

		info!("named pipe client @ {}", name);
		Ok(Self::new(pipe))
	}

	/// Create a client for an already connected pipe.
	pub fn new(pipe: Pipe) -> Self {
		Self {
			pipe,
			state: AsyncChannelState::new(),
		}
	}

	/// Get the bookkeeping of the outstanding asynchronous operations.
	pub fn state(&self) -> &AsyncChannelState {
		&self.state
	}

	/// Get a reference to the underlying pipe.
	pub fn pipe(&self) -> &Pipe {
		&self.pipe
	}

	/// Get a mutable reference to the underlying pipe.
	pub fn pipe_mut(&mut self) -> &mut Pipe {
		&mut self.pipe
	}

	/// Read a byte if one is available, without blocking.
	///
	/// If no read is outstanding, a new one is issued first.
	/// Then the outstanding read is polled for completion.
	pub fn read(&mut self) -> Result<Option<u8>, IoError> {
		if !self.state.read_pending {
			self.state.read_completion.reset();
			match self.pipe.start_read().map_err(|e| IoError::new("start_read", e))? {
				Poll::Ready(byte) => self.complete_read(byte),
				Poll::Pending => self.state.read_pending = true,
			}
		}

		if !self.state.read_completion.is_set() {
			if let Poll::Ready(byte) = self.pipe.poll_read().map_err(|e| IoError::new("poll_read", e))? {
				self.complete_read(byte);
			}
		}

		if self.state.read_completion.is_set() {
			self.state.read_pending = false;
			trace!("named pipe client read: {:#04X}", self.state.read_byte);
			Ok(Some(self.state.read_byte))
		} else {
			Ok(None)
		}
	}

	/// Write a byte and wait for the write to complete.
	///
	/// This may block the caller.
	/// A write is expected to complete almost immediately.
	/// If it does not, the peer is most likely paused or misbehaving,
	/// and this function waits without a timeout until the write completes or fails.
	pub fn commit_write(&mut self, byte: u8) -> Result<(), IoError> {
		self.state.write_completion.reset();
		if self.pipe.start_write(byte).map_err(|e| IoError::new("start_write", e))?.is_pending() {
			trace!("named pipe client write pending, waiting for completion");
			let written = self.pipe.wait_write().map_err(|e| IoError::new("wait_write", e))?;
			if written != 1 {
				return Err(IoError::new("wait_write", std::io::ErrorKind::WriteZero.into()));
			}
		}
		self.state.write_completion.set();
		Ok(())
	}

	/// Flush the pipe and release it.
	pub fn close(mut self) -> Result<(), IoError> {
		self.pipe.flush().map_err(|e| IoError::new("flush", e))
	}

	fn complete_read(&mut self, byte: u8) {
		self.state.read_byte = byte;
		self.state.read_completion.set();
	}
}
