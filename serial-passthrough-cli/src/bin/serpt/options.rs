use std::path::PathBuf;

use serial_passthrough::Mode;

/// Relay bytes between a terminal and a serial passthrough transport.
///
/// The bridge behaves like the emulated side of a serial passthrough:
/// bytes read from stdin are written to the transport,
/// and bytes received from the transport are written to stdout.
#[derive(clap::Parser)]
#[command(author, version)]
pub struct Options {
	#[clap(long, short)]
	#[clap(global = true)]
	#[clap(action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
	/// Open a passthrough device and relay stdin and stdout through it.
	Bridge {
		/// The transport to use.
		#[clap(value_name = "pipe-server|pipe-client|host-serial")]
		mode: Mode,

		/// The pipe name or the path of the host serial port.
		#[clap(value_name = "TARGET")]
		target: String,

		/// The index of the emulated serial port (0 is COM1).
		#[clap(long, short)]
		#[clap(default_value = "0")]
		port: usize,

		#[command(flatten)]
		uart: UartOptions,

		/// The time between two polls of the device, in microseconds.
		#[clap(long)]
		#[clap(default_value = "1000")]
		tick_us: u64,
	},

	/// Show how emulated UART settings are translated to host line settings.
	Translate {
		#[command(flatten)]
		uart: UartOptions,
	},

	/// Write shell completions to a file or stdout.
	ShellCompletion {
		/// The shell for which to generate completions.
		#[clap(long)]
		shell: clap_complete::Shell,

		/// The file to write the generated completion file to.
		#[clap(long, short)]
		output: Option<PathBuf>,
	},
}

/// The line settings as programmed by the guest.
#[derive(clap::Args)]
pub struct UartOptions {
	/// The baud rate.
	#[clap(long, short)]
	#[clap(default_value = "9600")]
	pub baud: u32,

	/// The number of data bits per character.
	#[clap(long)]
	#[clap(default_value = "8")]
	#[clap(value_parser = clap::value_parser!(u8).range(5..=8))]
	pub data_bits: u8,

	/// The raw line control register, in decimal or with a 0x prefix.
	#[clap(long)]
	#[clap(default_value = "0x03")]
	#[clap(value_parser = parse_line_control)]
	pub line_control: u8,
}

impl UartOptions {
	pub fn uart_config(&self) -> serial_passthrough::UartConfig {
		serial_passthrough::UartConfig {
			baud_rate: self.baud,
			data_bits: self.data_bits,
			line_control: self.line_control,
		}
	}
}

fn parse_line_control(data: &str) -> Result<u8, String> {
	let parsed = match data.strip_prefix("0x").or_else(|| data.strip_prefix("0X")) {
		Some(hex) => u8::from_str_radix(hex, 16),
		None => data.parse(),
	};
	parsed.map_err(|_| format!("invalid line control register: expected a number in the range 0..255, got {:?}", data))
}
