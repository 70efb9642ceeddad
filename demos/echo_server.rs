use serial_passthrough::{Mode, NeverRetry, PassthroughConfig, PassthroughDevice};
use std::time::Duration;

fn main() {
	let name = std::env::temp_dir().join("serial-passthrough-echo");
	let config = PassthroughConfig {
		mode: Mode::PipeServer,
		target: name.to_string_lossy().into_owned(),
		port: 0,
	};

	let mut device = PassthroughDevice::open(&config, &mut NeverRetry)
		.map_err(|e| println!("{}", e))
		.unwrap();
	println!("Echoing everything sent to {}", name.display());

	// Echo until a peer sends 0x04 (end of transmission).
	loop {
		match device.read() {
			Ok(Some(0x04)) => break,
			Ok(Some(byte)) => device.write(byte).unwrap(),
			Ok(None) => std::thread::sleep(Duration::from_millis(1)),
			Err(e) => panic!("Error: {}", e),
		}
	}

	device.close().unwrap();
}
