use std::io::{BufRead, Read, Write};
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use serial_passthrough::{PassthroughConfig, PassthroughDevice, UartConfig};

mod logging;
mod options;

use options::{Command, Options};

fn main() {
	if let Err(()) = do_main(clap::Parser::parse()) {
		std::process::exit(1);
	}
}

fn do_main(options: Options) -> Result<(), ()> {
	logging::init(module_path!(), options.verbose);
	match &options.command {
		Command::Bridge {
			mode,
			target,
			port,
			uart,
			tick_us,
		} => {
			let config = PassthroughConfig {
				mode: *mode,
				target: target.clone(),
				port: *port,
			};
			bridge(&config, &uart.uart_config(), Duration::from_micros(*tick_us))?;
		},
		Command::Translate { uart } => {
			let uart = uart.uart_config();
			let line = serial_passthrough::translate(&uart);
			log::debug!(
				"Translating {} baud, {} data bits, line control 0x{:02X}",
				uart.baud_rate,
				uart.data_bits,
				uart.line_control
			);
			println!("{}", line);
		},
		Command::ShellCompletion { shell, output } => {
			write_shell_completion(*shell, output.as_deref())?;
		},
	}

	Ok(())
}

fn bridge(config: &PassthroughConfig, uart: &UartConfig, tick: Duration) -> Result<(), ()> {
	let mut device = PassthroughDevice::open(config, &mut ask_retry).map_err(|e| log::error!("{}", e))?;
	device.apply_params(uart).map_err(|e| log::error!("{}", e))?;

	let input = spawn_stdin_reader();
	let stdout = std::io::stdout();
	let mut stdout = stdout.lock();

	let result = loop {
		match input.try_recv() {
			Ok(data) => {
				if let Err(e) = data.iter().try_for_each(|&byte| device.write(byte)) {
					break Err(e);
				}
			},
			Err(mpsc::TryRecvError::Empty) => (),
			Err(mpsc::TryRecvError::Disconnected) => {
				log::debug!("End of input reached, closing the {}", config.mode);
				break Ok(());
			},
		}

		let received = match read_available(&mut device) {
			Ok(received) => received,
			Err(e) => break Err(e),
		};
		if !received.is_empty() {
			if let Err(e) = stdout.write_all(&received).and_then(|()| stdout.flush()) {
				log::error!("Failed to write to stdout: {}", e);
				break Ok(());
			}
		}

		std::thread::sleep(tick);
	};

	// Always close, the host serial port configuration must be restored.
	let closed = device.close();
	result.map_err(|e| log::error!("{}", e))?;
	closed.map_err(|e| log::error!("{}", e))
}

/// Read all bytes the device has available right now.
fn read_available(device: &mut PassthroughDevice) -> Result<Vec<u8>, serial_passthrough::Error> {
	let mut received = Vec::new();
	while let Some(byte) = device.read()? {
		received.push(byte);
	}
	Ok(received)
}

/// Read stdin on a background thread, so the main loop never blocks on it.
///
/// The channel is closed when stdin reaches end of file.
fn spawn_stdin_reader() -> mpsc::Receiver<Vec<u8>> {
	let (sender, receiver) = mpsc::channel();
	std::thread::spawn(move || {
		let stdin = std::io::stdin();
		let mut stdin = stdin.lock();
		let mut buffer = [0u8; 1024];
		loop {
			match stdin.read(&mut buffer) {
				Ok(0) => break,
				Ok(count) => {
					if sender.send(buffer[..count].to_vec()).is_err() {
						break;
					}
				},
				Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
				Err(e) => {
					log::error!("Failed to read from stdin: {}", e);
					break;
				},
			}
		}
	});
	receiver
}

/// Ask the user on the terminal whether to try connecting again.
fn ask_retry(message: &str) -> bool {
	let stderr = std::io::stderr();
	let mut stderr = stderr.lock();
	if write!(stderr, "{} [y/N] ", message).and_then(|()| stderr.flush()).is_err() {
		return false;
	}

	let mut answer = String::new();
	match std::io::stdin().lock().read_line(&mut answer) {
		Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"),
		Err(e) => {
			log::error!("Failed to read answer from stdin: {}", e);
			false
		},
	}
}

fn write_shell_completion(shell: clap_complete::Shell, path: Option<&Path>) -> Result<(), ()> {
	use clap::CommandFactory;

	let mut buffer = Vec::with_capacity(4 * 1024);

	let mut command = Options::command();
	clap_complete::generate(shell, &mut command, env!("CARGO_BIN_NAME"), &mut buffer);
	if !buffer.ends_with(b"\n") {
		buffer.push(b'\n');
	}

	let path = path.unwrap_or_else(|| Path::new("-"));
	if path == Path::new("-") {
		log::debug!("Writing shell completion for {} to stdout", shell);
		let stdout = std::io::stdout();
		stdout
			.lock()
			.write_all(&buffer)
			.map_err(|e| log::error!("Failed to write to stdout: {}", e))?;
	} else {
		log::debug!("Writing shell completion for {} to {}", shell, path.display());
		let mut output = std::fs::File::create(path).map_err(|e| log::error!("Failed to create {}: {}", path.display(), e))?;
		output
			.write_all(&buffer)
			.map_err(|e| log::error!("Failed to write to {}: {}", path.display(), e))?;
	}

	Ok(())
}
