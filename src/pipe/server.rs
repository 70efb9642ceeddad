use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{socket, truncate_pipe_name, PIPE_BUFFER_SIZE};
use crate::{IoError, Mode, SetupError, SetupFailure};

/// The maximum time [`PipeServer::close()`] spends handing queued output to the peer.
pub const FLUSH_TIMEOUT: Duration = Duration::from_millis(1000);

/// Server side of a named pipe.
///
/// The server serves a single peer at a time.
/// Peers that connect while another peer is served are disconnected straight away.
///
/// The pipe name is removed when the server is closed or dropped.
/// A name left behind by a server that no longer runs is reclaimed by [`Self::create()`].
///
/// All operations return immediately:
/// reads return `None` when no data is available,
/// and writes are best effort without delivery confirmation.
pub struct PipeServer {
	listener: UnixListener,
	path: PathBuf,
	peer: Option<UnixStream>,
	inbound: VecDeque<u8>,
	outbound: VecDeque<u8>,
	scratch: Box<[u8]>,
	bound: bool,
}

/// What happened to the peer during a transfer.
enum PeerStatus {
	Connected,
	HungUp,
}

impl std::fmt::Debug for PipeServer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PipeServer")
			.field("path", &self.path)
			.field("connected", &self.peer.is_some())
			.field("inbound", &self.inbound.len())
			.field("outbound", &self.outbound.len())
			.finish_non_exhaustive()
	}
}

impl PipeServer {
	/// Create a named pipe server listening on `name`.
	pub fn create(name: &str, port: usize) -> Result<Self, SetupError> {
		let name = truncate_pipe_name(name);
		let listener = bind_listener(Path::new(name))
			.and_then(|listener| {
				listener.set_nonblocking(true)?;
				Ok(listener)
			})
			.map_err(|e| SetupError::new(Mode::PipeServer, name, port, SetupFailure::CreateServer(e)))?;

		info!("named pipe server @ {}", name);
		Ok(Self {
			listener,
			path: PathBuf::from(name),
			peer: None,
			inbound: VecDeque::with_capacity(PIPE_BUFFER_SIZE),
			outbound: VecDeque::with_capacity(PIPE_BUFFER_SIZE),
			scratch: vec![0; PIPE_BUFFER_SIZE].into_boxed_slice(),
			bound: true,
		})
	}

	/// Get the path the server is listening on.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Check if a peer is currently connected.
	pub fn is_connected(&self) -> bool {
		self.peer.is_some()
	}

	/// Read a byte if one is available, without blocking.
	pub fn read(&mut self) -> Result<Option<u8>, IoError> {
		self.accept_peer()?;
		self.send_outbound()?;
		if self.inbound.is_empty() {
			self.receive_inbound()?;
		}
		Ok(self.inbound.pop_front())
	}

	/// Write a byte without waiting for delivery.
	///
	/// The byte is dropped if no peer is connected or if the output buffer is full.
	pub fn write(&mut self, byte: u8) -> Result<(), IoError> {
		self.accept_peer()?;
		if self.peer.is_none() {
			trace!("no peer connected to named pipe {}, dropping {:#04X}", self.path.display(), byte);
			return Ok(());
		}
		if self.outbound.len() < PIPE_BUFFER_SIZE {
			self.outbound.push_back(byte);
		} else {
			trace!("output buffer of named pipe {} full, dropping {:#04X}", self.path.display(), byte);
		}
		self.send_outbound()
	}

	/// Hand queued output to the peer, disconnect it and remove the pipe name.
	pub fn close(mut self) -> Result<(), IoError> {
		if let Some(peer) = self.peer.take() {
			if !self.outbound.is_empty() {
				let pending: Vec<u8> = self.outbound.drain(..).collect();
				let flushed = peer
					.set_nonblocking(false)
					.and_then(|()| peer.set_write_timeout(Some(FLUSH_TIMEOUT)))
					.and_then(|()| socket::send_all(&peer, &pending));
				if let Err(e) = flushed {
					warn!("failed to flush {} bytes to named pipe {}: {}", pending.len(), self.path.display(), e);
				}
			}
			// The peer may already be gone.
			let _ = peer.shutdown(std::net::Shutdown::Both);
		}

		self.bound = false;
		match std::fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(IoError::new("remove_file", e)),
		}
	}

	fn accept_peer(&mut self) -> Result<(), IoError> {
		loop {
			let stream = match self.listener.accept() {
				Ok((stream, _address)) => stream,
				Err(e) if is_retry(&e) => return Ok(()),
				Err(e) => return Err(IoError::new("accept", e)),
			};
			if self.peer.is_some() {
				debug!("named pipe {} is busy, refusing another peer", self.path.display());
				let _ = stream.shutdown(std::net::Shutdown::Both);
				continue;
			}
			stream.set_nonblocking(true).map_err(|e| IoError::new("set_nonblocking", e))?;
			socket::disable_sigpipe(&stream).map_err(|e| IoError::new("disable_sigpipe", e))?;
			debug!("peer connected to named pipe {}", self.path.display());
			self.peer = Some(stream);
		}
	}

	fn disconnect_peer(&mut self) {
		if let Some(peer) = self.peer.take() {
			let _ = peer.shutdown(std::net::Shutdown::Both);
			debug!("peer disconnected from named pipe {}", self.path.display());
		}
		self.inbound.clear();
		self.outbound.clear();
	}

	fn receive_inbound(&mut self) -> Result<(), IoError> {
		let status = match self.peer.as_ref() {
			None => return Ok(()),
			Some(mut peer) => match peer.read(&mut self.scratch) {
				Ok(0) => PeerStatus::HungUp,
				Ok(count) => {
					self.inbound.extend(&self.scratch[..count]);
					PeerStatus::Connected
				},
				Err(e) if is_retry(&e) => PeerStatus::Connected,
				Err(e) if is_disconnect(&e) => PeerStatus::HungUp,
				Err(e) => return Err(IoError::new("read", e)),
			},
		};
		if let PeerStatus::HungUp = status {
			self.disconnect_peer();
		}
		Ok(())
	}

	fn send_outbound(&mut self) -> Result<(), IoError> {
		let status = match self.peer.as_ref() {
			None => return Ok(()),
			Some(peer) => loop {
				let (chunk, _) = self.outbound.as_slices();
				if chunk.is_empty() {
					break PeerStatus::Connected;
				}
				match socket::send(peer, chunk) {
					Ok(0) => break PeerStatus::HungUp,
					Ok(count) => {
						self.outbound.drain(..count);
					},
					Err(e) if e.kind() == ErrorKind::Interrupted => continue,
					Err(e) if e.kind() == ErrorKind::WouldBlock => break PeerStatus::Connected,
					Err(e) if is_disconnect(&e) => break PeerStatus::HungUp,
					Err(e) => return Err(IoError::new("write", e)),
				}
			},
		};
		if let PeerStatus::HungUp = status {
			self.disconnect_peer();
		}
		Ok(())
	}
}

impl Drop for PipeServer {
	fn drop(&mut self) {
		if self.bound {
			let _ = std::fs::remove_file(&self.path);
		}
	}
}

/// Bind a listener, reclaiming the name if it is a socket nobody listens on anymore.
fn bind_listener(path: &Path) -> std::io::Result<UnixListener> {
	match UnixListener::bind(path) {
		Err(e) if e.kind() == ErrorKind::AddrInUse && is_stale_socket(path) => {
			debug!("removing stale named pipe {}", path.display());
			std::fs::remove_file(path)?;
			UnixListener::bind(path)
		},
		result => result,
	}
}

fn is_stale_socket(path: &Path) -> bool {
	let is_socket = std::fs::symlink_metadata(path)
		.map(|metadata| metadata.file_type().is_socket())
		.unwrap_or(false);
	is_socket && matches!(UnixStream::connect(path), Err(e) if e.kind() == ErrorKind::ConnectionRefused)
}

fn is_retry(error: &std::io::Error) -> bool {
	matches!(error.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted)
}

fn is_disconnect(error: &std::io::Error) -> bool {
	matches!(
		error.kind(),
		ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::NotConnected
	)
}
