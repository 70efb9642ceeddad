use serial_passthrough::OverlappedPipe;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::Poll;

/// How the mock completes an issued write.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WriteBehavior {
	/// The write completes while it is issued.
	Immediate,
	/// The write is accepted and completes when waited on.
	Deferred,
	/// The write is accepted, but waiting for it reports an error.
	DeferredFailure(ErrorKind),
	/// Issuing the write fails.
	Fail(ErrorKind),
}

#[derive(Debug)]
pub struct MockPipeState {
	/// Bytes the peer has sent that are ready to complete a read.
	pub incoming: VecDeque<u8>,
	/// Bytes that completed a write.
	pub written: Vec<u8>,
	pub read_outstanding: bool,
	pub start_read_calls: usize,
	pub poll_read_calls: usize,
	pub read_failure: Option<ErrorKind>,
	pub poll_failure: Option<ErrorKind>,
	pub write_behavior: WriteBehavior,
	pub pending_write: Option<u8>,
	pub wait_write_calls: usize,
}

/// A pipe with scripted completion behavior.
///
/// Clones share the same state, so a test can keep a handle to inspect and drive the pipe.
#[derive(Debug, Clone)]
pub struct MockPipe {
	state: Arc<Mutex<MockPipeState>>,
}

impl MockPipe {
	pub fn new() -> Self {
		Self {
			state: Arc::new(Mutex::new(MockPipeState {
				incoming: VecDeque::new(),
				written: Vec::new(),
				read_outstanding: false,
				start_read_calls: 0,
				poll_read_calls: 0,
				read_failure: None,
				poll_failure: None,
				write_behavior: WriteBehavior::Immediate,
				pending_write: None,
				wait_write_calls: 0,
			})),
		}
	}

	pub fn state(&self) -> MutexGuard<'_, MockPipeState> {
		self.state.lock().unwrap()
	}

	/// Make data from the peer available.
	pub fn deliver(&self, data: &[u8]) {
		self.state().incoming.extend(data);
	}
}

impl OverlappedPipe for MockPipe {
	fn connect(_name: &str) -> std::io::Result<Self> {
		Ok(Self::new())
	}

	fn start_read(&mut self) -> std::io::Result<Poll<u8>> {
		let mut state = self.state();
		state.start_read_calls += 1;
		assert!(!state.read_outstanding, "read issued while another read is outstanding");
		if let Some(kind) = state.read_failure {
			return Err(kind.into());
		}
		match state.incoming.pop_front() {
			Some(byte) => Ok(Poll::Ready(byte)),
			None => {
				state.read_outstanding = true;
				Ok(Poll::Pending)
			},
		}
	}

	fn poll_read(&mut self) -> std::io::Result<Poll<u8>> {
		let mut state = self.state();
		state.poll_read_calls += 1;
		if let Some(kind) = state.poll_failure {
			return Err(kind.into());
		}
		if !state.read_outstanding {
			return Ok(Poll::Pending);
		}
		match state.incoming.pop_front() {
			Some(byte) => {
				state.read_outstanding = false;
				Ok(Poll::Ready(byte))
			},
			None => Ok(Poll::Pending),
		}
	}

	fn start_write(&mut self, byte: u8) -> std::io::Result<Poll<()>> {
		let mut state = self.state();
		assert!(state.pending_write.is_none(), "write issued while another write is outstanding");
		match state.write_behavior {
			WriteBehavior::Immediate => {
				state.written.push(byte);
				Ok(Poll::Ready(()))
			},
			WriteBehavior::Deferred | WriteBehavior::DeferredFailure(_) => {
				state.pending_write = Some(byte);
				Ok(Poll::Pending)
			},
			WriteBehavior::Fail(kind) => Err(kind.into()),
		}
	}

	fn wait_write(&mut self) -> std::io::Result<usize> {
		let mut state = self.state();
		state.wait_write_calls += 1;
		let byte = state.pending_write.take().ok_or(ErrorKind::InvalidInput)?;
		match state.write_behavior {
			WriteBehavior::DeferredFailure(kind) => Err(kind.into()),
			_ => {
				state.written.push(byte);
				Ok(1)
			},
		}
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}
