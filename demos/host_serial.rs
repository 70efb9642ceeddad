use serial_passthrough::{Mode, NeverRetry, PassthroughConfig, PassthroughDevice, UartConfig};
use std::time::{Duration, Instant};

fn main() {
	let config = PassthroughConfig {
		mode: Mode::HostSerial,
		target: "/dev/ttyUSB0".into(),
		port: 0,
	};

	let mut device = PassthroughDevice::open(&config, &mut NeverRetry)
		.map_err(|e| println!("{}", e))
		.unwrap();

	// 9600 baud, 8 data bits, no parity, one stop bit.
	device
		.apply_params(&UartConfig {
			baud_rate: 9600,
			data_bits: 8,
			line_control: 0x03,
		})
		.unwrap();

	for &byte in b"hello\r\n" {
		device.write(byte).unwrap();
	}

	let deadline = Instant::now() + Duration::from_secs(1);
	let mut received = Vec::new();
	while Instant::now() < deadline {
		match device.read().unwrap() {
			Some(byte) => received.push(byte),
			None => std::thread::sleep(Duration::from_millis(1)),
		}
	}
	println!("Received: {:?}", String::from_utf8_lossy(&received));

	// Restores the original settings of the port.
	device.close().unwrap();
}
