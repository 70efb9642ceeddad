/// Asks the user whether a failed connection attempt should be retried.
pub trait RetryPrompt {
	/// Show `message` and return true if the user wants to try again.
	fn retry(&mut self, message: &str) -> bool;
}

impl<F> RetryPrompt for F
where
	F: FnMut(&str) -> bool,
{
	fn retry(&mut self, message: &str) -> bool {
		self(message)
	}
}

/// A [`RetryPrompt`] that always declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverRetry;

impl RetryPrompt for NeverRetry {
	fn retry(&mut self, _message: &str) -> bool {
		false
	}
}
