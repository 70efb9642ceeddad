//! Sending on Unix sockets without raising `SIGPIPE`.
//!
//! A send to a peer that hung up fails with [`ErrorKind::BrokenPipe`](std::io::ErrorKind::BrokenPipe).
//! The process is not signalled, even if it did not ignore `SIGPIPE`.

use std::io::ErrorKind;
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;

/// Prepare a freshly connected or accepted stream for [`send()`].
pub fn disable_sigpipe(stream: &UnixStream) -> std::io::Result<()> {
	#[cfg(any(target_vendor = "apple", target_os = "freebsd"))]
	{
		let enable: libc::c_int = 1;
		let result = unsafe {
			libc::setsockopt(
				stream.as_raw_fd(),
				libc::SOL_SOCKET,
				libc::SO_NOSIGPIPE,
				(&enable as *const libc::c_int).cast(),
				std::mem::size_of::<libc::c_int>() as libc::socklen_t,
			)
		};
		if result != 0 {
			return Err(std::io::Error::last_os_error());
		}
	}
	#[cfg(not(any(target_vendor = "apple", target_os = "freebsd")))]
	let _ = stream;
	Ok(())
}

/// Send some bytes, returning the number of bytes sent.
pub fn send(stream: &UnixStream, data: &[u8]) -> std::io::Result<usize> {
	#[cfg(any(target_os = "linux", target_os = "android"))]
	let flags = libc::MSG_NOSIGNAL;
	#[cfg(not(any(target_os = "linux", target_os = "android")))]
	let flags = 0;

	let sent = unsafe { libc::send(stream.as_raw_fd(), data.as_ptr().cast(), data.len(), flags) };
	if sent < 0 {
		Err(std::io::Error::last_os_error())
	} else {
		Ok(sent as usize)
	}
}

/// Send all bytes, retrying partial and interrupted sends.
///
/// On a non-blocking stream this fails with [`ErrorKind::WouldBlock`] once the socket buffer is full.
pub fn send_all(stream: &UnixStream, mut data: &[u8]) -> std::io::Result<()> {
	while !data.is_empty() {
		match send(stream, data) {
			Ok(0) => return Err(ErrorKind::WriteZero.into()),
			Ok(count) => data = &data[count..],
			Err(e) if e.kind() == ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		}
	}
	Ok(())
}
