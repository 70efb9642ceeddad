use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::task::Poll;

use super::{socket, OverlappedPipe};

/// [`OverlappedPipe`] on top of a non-blocking Unix domain socket.
///
/// Completion is emulated with readiness:
/// a read stays outstanding until a non-blocking receive produces a byte,
/// and a write that would block is completed by a blocking send in [`OverlappedPipe::wait_write()`].
pub struct UnixPipe {
	stream: UnixStream,
	pending_write: Option<u8>,
}

impl UnixPipe {
	/// Wrap a connected stream, switching it to non-blocking mode.
	pub fn new(stream: UnixStream) -> std::io::Result<Self> {
		stream.set_nonblocking(true)?;
		socket::disable_sigpipe(&stream)?;
		Ok(Self {
			stream,
			pending_write: None,
		})
	}

	/// Get a reference to the underlying stream.
	pub fn stream(&self) -> &UnixStream {
		&self.stream
	}

	fn try_read_byte(&mut self) -> std::io::Result<Poll<u8>> {
		let mut buffer = [0u8; 1];
		loop {
			match self.stream.read(&mut buffer) {
				Ok(0) => return Err(std::io::Error::new(ErrorKind::BrokenPipe, "the pipe has been ended")),
				Ok(_) => return Ok(Poll::Ready(buffer[0])),
				Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(Poll::Pending),
				Err(e) if e.kind() == ErrorKind::Interrupted => continue,
				Err(e) => return Err(e),
			}
		}
	}
}

impl std::fmt::Debug for UnixPipe {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use std::os::unix::io::AsRawFd;
		f.debug_struct("UnixPipe")
			.field("fd", &self.stream.as_raw_fd())
			.field("pending_write", &self.pending_write)
			.finish()
	}
}

impl OverlappedPipe for UnixPipe {
	fn connect(name: &str) -> std::io::Result<Self> {
		Self::new(UnixStream::connect(name)?)
	}

	fn start_read(&mut self) -> std::io::Result<Poll<u8>> {
		self.try_read_byte()
	}

	fn poll_read(&mut self) -> std::io::Result<Poll<u8>> {
		self.try_read_byte()
	}

	fn start_write(&mut self, byte: u8) -> std::io::Result<Poll<()>> {
		debug_assert!(self.pending_write.is_none());
		loop {
			match socket::send(&self.stream, &[byte]) {
				Ok(0) => return Err(ErrorKind::WriteZero.into()),
				Ok(_) => return Ok(Poll::Ready(())),
				Err(e) if e.kind() == ErrorKind::WouldBlock => {
					self.pending_write = Some(byte);
					return Ok(Poll::Pending);
				},
				Err(e) if e.kind() == ErrorKind::Interrupted => continue,
				Err(e) => return Err(e),
			}
		}
	}

	fn wait_write(&mut self) -> std::io::Result<usize> {
		let byte = self
			.pending_write
			.take()
			.ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "no write in progress"))?;
		self.stream.set_nonblocking(false)?;
		let result = socket::send_all(&self.stream, &[byte]);
		self.stream.set_nonblocking(true)?;
		result.map(|()| 1)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		self.stream.flush()
	}
}
