//! Trait implementation using the `serial2` crate.

use std::time::Duration;

use serial2::{CharSize, KeepSettings, Settings};

use crate::{LineConfig, Parity, StopBits};

impl crate::SerialDevice for serial2::SerialPort {
	type Configuration = Settings;

	fn open(path: &str) -> std::io::Result<Self> {
		serial2::SerialPort::open(path, KeepSettings)
	}

	fn configuration(&self) -> std::io::Result<Settings> {
		self.get_configuration()
	}

	fn set_configuration(&mut self, configuration: &Settings) -> std::io::Result<()> {
		serial2::SerialPort::set_configuration(self, configuration)
	}

	fn apply_line_config(&mut self, line: &LineConfig) -> std::io::Result<()> {
		let mut settings = self.get_configuration()?;
		if let Some(baud_rate) = line.baud_rate {
			settings.set_baud_rate(baud_rate)?;
		}
		settings.set_char_size(char_size(line.data_bits)?);
		settings.set_stop_bits(match line.stop_bits {
			StopBits::One => serial2::StopBits::One,
			StopBits::Two => serial2::StopBits::Two,
		});
		settings.set_parity(match line.parity {
			Parity::None => serial2::Parity::None,
			Parity::Odd => serial2::Parity::Odd,
			Parity::Even => serial2::Parity::Even,
			Parity::Mark | Parity::Space => {
				warn!("{} parity is not supported by the host serial port, disabling parity", line.parity);
				serial2::Parity::None
			},
		});
		serial2::SerialPort::set_configuration(self, &settings)
	}

	fn set_read_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
		serial2::SerialPort::set_read_timeout(self, timeout)
	}

	fn set_write_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
		serial2::SerialPort::set_write_timeout(self, timeout)
	}

	fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
		serial2::SerialPort::read(self, buffer)
	}

	fn write(&mut self, buffer: &[u8]) -> std::io::Result<usize> {
		serial2::SerialPort::write(self, buffer)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		serial2::SerialPort::flush(self)
	}
}

fn char_size(data_bits: u8) -> std::io::Result<CharSize> {
	match data_bits {
		5 => Ok(CharSize::Bits5),
		6 => Ok(CharSize::Bits6),
		7 => Ok(CharSize::Bits7),
		8 => Ok(CharSize::Bits8),
		_ => Err(std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			format!("unsupported number of data bits: {}", data_bits),
		)),
	}
}
