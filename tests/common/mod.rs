#![allow(dead_code, unused_imports)]

pub mod mock_pipe;
pub mod mock_serial_port;

pub use mock_pipe::{MockPipe, WriteBehavior};
pub use mock_serial_port::{MockConfiguration, MockSerialPort};

/// Make a pipe name in the temporary directory that is unique for this process.
pub fn temp_pipe_name(name: &str) -> String {
	let path = std::env::temp_dir().join(format!("{}-{}", name, std::process::id()));
	let _ = std::fs::remove_file(&path);
	path.to_string_lossy().into_owned()
}
