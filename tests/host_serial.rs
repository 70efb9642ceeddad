use assert2::{assert, let_assert};
use serial_passthrough::params::lcr;
use serial_passthrough::{
	Error, Mode, NeverRetry, Parity, PassthroughConfig, PassthroughDevice, SetupFailure, StopBits, UartConfig, READ_TIMEOUT,
	WRITE_TIMEOUT,
};
use test_log::test;

mod common;
use common::{MockConfiguration, MockPipe, MockSerialPort};

type Device = PassthroughDevice<MockSerialPort, MockPipe>;

fn host_config(path: &str) -> PassthroughConfig {
	PassthroughConfig {
		mode: Mode::HostSerial,
		target: path.to_owned(),
		port: 0,
	}
}

#[test]
fn open_configures_timeouts() {
	let line = MockSerialPort::install("/dev/mock-timeouts", MockConfiguration::default());
	let_assert!(Ok(device) = Device::open_with_backends(&host_config("/dev/mock-timeouts"), &mut NeverRetry));
	assert!(device.mode() == Mode::HostSerial);

	{
		let line = line.lock().unwrap();
		assert!(line.read_timeout == Some(READ_TIMEOUT));
		assert!(line.write_timeout == Some(WRITE_TIMEOUT));
		assert!(line.open_handles == 1);
	}

	let_assert!(Some(host) = device.host_serial());
	assert!(host.original_configuration() == &MockConfiguration::default());

	let_assert!(Ok(()) = device.close());
	assert!(line.lock().unwrap().open_handles == 0);
}

#[test]
fn apply_params_configures_line() {
	let line = MockSerialPort::install("/dev/mock-9600", MockConfiguration::default());
	let_assert!(Ok(mut device) = Device::open_with_backends(&host_config("/dev/mock-9600"), &mut NeverRetry));

	let uart = UartConfig {
		baud_rate: 9600,
		data_bits: 8,
		line_control: 0x03,
	};
	let_assert!(Ok(()) = device.apply_params(&uart));
	assert!(device.uart_config() == Some(&uart));

	{
		let line = line.lock().unwrap();
		assert!(line.configuration.baud_rate == 9600);
		assert!(line.configuration.data_bits == 8);
		assert!(line.configuration.stop_bits == StopBits::One);
		assert!(line.configuration.parity == Parity::None);
		// Flow control is not touched by the translation.
		assert!(line.configuration.rts_cts);
	}

	let_assert!(Ok(()) = device.close());
}

#[test]
fn close_restores_original_configuration() {
	let original = MockConfiguration {
		baud_rate: 19200,
		..MockConfiguration::default()
	};
	let line = MockSerialPort::install("/dev/mock-restore", original.clone());
	let config = host_config("/dev/mock-restore");

	let_assert!(Ok(mut device) = Device::open_with_backends(&config, &mut NeverRetry));
	let uart = UartConfig {
		baud_rate: 2400,
		data_bits: 5,
		line_control: lcr::STOP_BITS | lcr::PARITY_ENABLE | lcr::EVEN_PARITY,
	};
	let_assert!(Ok(()) = device.apply_params(&uart));
	assert!(line.lock().unwrap().configuration != original);

	let_assert!(Ok(()) = device.close());
	assert!(line.lock().unwrap().configuration == original);

	// Reopening sees the restored configuration.
	let_assert!(Ok(device) = Device::open_with_backends(&config, &mut NeverRetry));
	let_assert!(Some(host) = device.host_serial());
	assert!(host.original_configuration() == &original);
	let_assert!(Ok(()) = device.close());
}

#[test]
fn close_without_params_leaves_configuration_alone() {
	let line = MockSerialPort::install("/dev/mock-untouched", MockConfiguration::default());
	let_assert!(Ok(device) = Device::open_with_backends(&host_config("/dev/mock-untouched"), &mut NeverRetry));
	let_assert!(Ok(()) = device.close());
	assert!(line.lock().unwrap().set_configuration_calls == 0);
}

#[test]
fn low_baud_rate_keeps_current_rate() {
	let line = MockSerialPort::install("/dev/mock-slow", MockConfiguration::default());
	let_assert!(Ok(mut device) = Device::open_with_backends(&host_config("/dev/mock-slow"), &mut NeverRetry));

	let uart = UartConfig {
		baud_rate: 50,
		data_bits: 8,
		line_control: 0x03,
	};
	let_assert!(Ok(()) = device.apply_params(&uart));
	{
		let line = line.lock().unwrap();
		assert!(line.configuration.baud_rate == 115200);
		assert!(line.configuration.data_bits == 8);
	}
	let_assert!(Ok(()) = device.close());
}

#[test]
fn read_and_write_bytes() {
	let line = MockSerialPort::install("/dev/mock-data", MockConfiguration::default());
	let_assert!(Ok(mut device) = Device::open_with_backends(&host_config("/dev/mock-data"), &mut NeverRetry));

	// An empty line times out immediately.
	let_assert!(Ok(None) = device.read());

	line.lock().unwrap().rx.extend([0x10, 0x20]);
	let_assert!(Ok(Some(0x10)) = device.read());
	let_assert!(Ok(Some(0x20)) = device.read());
	let_assert!(Ok(None) = device.read());

	let_assert!(Ok(()) = device.write(0xAA));
	let_assert!(Ok(()) = device.write(0x55));
	assert!(line.lock().unwrap().tx == [0xAA, 0x55]);

	let_assert!(Ok(()) = device.close());
}

#[test]
fn missing_device_fails_setup() {
	let config = PassthroughConfig {
		mode: Mode::HostSerial,
		target: "/dev/mock-missing".into(),
		port: 1,
	};
	let_assert!(Err(Error::Setup(e)) = Device::open_with_backends(&config, &mut NeverRetry));
	assert!(e.mode == Mode::HostSerial);
	assert!(e.port == 1);
	let_assert!(SetupFailure::OpenDevice(io) = &e.reason);
	assert!(io.kind() == std::io::ErrorKind::NotFound);
	assert!(e.to_string().starts_with("Host serial port (path=\"/dev/mock-missing\", port=COM2): "));
}

#[test]
fn failing_timeouts_release_device() {
	let line = MockSerialPort::install("/dev/mock-no-timeouts", MockConfiguration::default());
	line.lock().unwrap().fail_timeouts = true;

	let_assert!(Err(Error::Setup(e)) = Device::open_with_backends(&host_config("/dev/mock-no-timeouts"), &mut NeverRetry));
	let_assert!(SetupFailure::ConfigureTimeouts(_) = &e.reason);
	assert!(line.lock().unwrap().open_handles == 0);
}
