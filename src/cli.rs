use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::message::DEFAULT_CAPACITY;

#[derive(Parser)]
#[command(about, author, version)]
pub struct Args {
	/// Update commands and exit.
	#[arg(value_enum)]
	pub commands: Option<Mode>,
	/// File guild configurations are stored in.
	#[arg(long, env = "CONFIG_PATH", default_value = "guilds.json")]
	pub config_path: PathBuf,
	/// Number of recent messages remembered for delete logs.
	#[arg(long, env = "MESSAGE_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
	pub message_capacity: usize,
}

impl Args {
	pub fn parse() -> Self {
		// to avoid importing `Parser` in main
		<Self as Parser>::parse()
	}
}

#[derive(Clone, Debug, ValueEnum)]
pub enum Mode {
	Register,
	Unregister,
}
