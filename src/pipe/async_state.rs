/// A completion signal for one direction of asynchronous I/O.
///
/// The signal is reset before an operation is issued and set once the operation completed.
#[derive(Debug, Default, Clone)]
pub struct CompletionSignal {
	signaled: bool,
}

impl CompletionSignal {
	/// Create a new signal in the reset state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Mark the signal as reset.
	pub fn reset(&mut self) {
		self.signaled = false;
	}

	/// Mark the signal as set.
	pub fn set(&mut self) {
		self.signaled = true;
	}

	/// Check if the signal is set.
	pub fn is_set(&self) -> bool {
		self.signaled
	}
}

/// Bookkeeping for the outstanding asynchronous operations of a pipe client.
///
/// There is at most one outstanding read and one outstanding write.
/// A new read may only be issued when [`Self::read_pending`] is false.
#[derive(Debug, Default)]
pub struct AsyncChannelState {
	pub(crate) read_pending: bool,
	pub(crate) read_byte: u8,
	pub(crate) read_completion: CompletionSignal,
	pub(crate) write_completion: CompletionSignal,
}

impl AsyncChannelState {
	/// Create fresh state with both signals reset and no read pending.
	pub fn new() -> Self {
		Self::default()
	}

	/// Check if an issued read has not been observed complete yet.
	pub fn read_pending(&self) -> bool {
		self.read_pending
	}

	/// Get the completion signal of the read direction.
	pub fn read_completion(&self) -> &CompletionSignal {
		&self.read_completion
	}

	/// Get the completion signal of the write direction.
	pub fn write_completion(&self) -> &CompletionSignal {
		&self.write_completion
	}
}
