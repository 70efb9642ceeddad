//! Logging shims.
//!
//! The macros forward to the `log` crate when the `log` feature is enabled.
//! Without the feature they only type-check their arguments.

macro_rules! log_at {
	($level:ident; $($args:tt)*) => {{
		#[cfg(feature = "log")]
		::log::$level!($($args)*);
		#[cfg(not(feature = "log"))]
		let _ = format_args!($($args)*);
	}};
}

#[allow(unused_macros)]
macro_rules! trace {
	($($args:tt)*) => { log_at!(trace; $($args)*) };
}

#[allow(unused_macros)]
macro_rules! debug {
	($($args:tt)*) => { log_at!(debug; $($args)*) };
}

#[allow(unused_macros)]
macro_rules! info {
	($($args:tt)*) => { log_at!(info; $($args)*) };
}

#[allow(unused_macros)]
macro_rules! warn {
	($($args:tt)*) => { log_at!(warn; $($args)*) };
}

#[allow(unused_macros)]
macro_rules! error {
	($($args:tt)*) => { log_at!(error; $($args)*) };
}
