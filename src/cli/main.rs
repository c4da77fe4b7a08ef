#![warn(clippy::pedantic)]

use clap::Parser;
use futures::future::join_all;
use rmrf::{Deleter, Host, Options};
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tracing_subscriber::prelude::*;

/// Delete files and directories, and everything beneath them.
#[derive(Parser)]
#[command(
	version = concat!(env!("CARGO_PKG_VERSION")),
	verbatim_doc_comment,
)]
struct Args {
	/// The paths to delete. It is not an error if a path does not exist.
	#[arg(required = true)]
	paths: Vec<PathBuf>,

	/// The number of attempts on a busy file before giving up. Only used on Windows.
	#[arg(long, env = "RMRF_BUSY_MAX_TRIES", default_value_t = rmrf::retry::BUSY_MAX_TRIES)]
	busy_max_tries: u32,

	/// The delay in milliseconds between attempts on a busy file. Only used on Windows.
	#[arg(long, env = "RMRF_BUSY_RETRY_DELAY", default_value_t = 100)]
	busy_retry_delay: u64,

	/// The maximum number of file system operations in flight at once, or zero for no limit.
	#[arg(long, env = "RMRF_FILE_PERMITS", default_value_t = rmrf::options::FILE_PERMITS)]
	file_permits: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
	setup_tracing();

	let args = Args::parse();

	// Create the deleter.
	let options = Options {
		busy_max_tries: args.busy_max_tries,
		busy_retry_delay: Duration::from_millis(args.busy_retry_delay),
		file_permits: Some(args.file_permits),
		..Options::default()
	};
	let deleter = Deleter::new(Host, options);

	// Delete the paths concurrently.
	let results = join_all(args.paths.iter().map(|path| deleter.delete(path))).await;

	// Print the errors.
	let mut code = ExitCode::SUCCESS;
	for error in results.into_iter().filter_map(Result::err) {
		eprint!("{}", error.trace());
		code = ExitCode::FAILURE;
	}
	code
}

fn setup_tracing() {
	let env_layer = if std::env::var("RMRF_TRACING").is_ok() {
		match tracing_subscriber::filter::EnvFilter::try_from_env("RMRF_TRACING") {
			Ok(filter) => Some(filter),
			Err(error) => {
				eprintln!("Invalid RMRF_TRACING filter: {error}");
				None
			},
		}
	} else if cfg!(debug_assertions) {
		Some(tracing_subscriber::EnvFilter::new("[]=info"))
	} else {
		None
	};
	if let Some(env_layer) = env_layer {
		let format_layer = tracing_subscriber::fmt::layer()
			.pretty()
			.with_writer(std::io::stderr)
			.with_span_events(tracing_subscriber::fmt::format::FmtSpan::NEW);
		let subscriber = tracing_subscriber::registry()
			.with(env_layer)
			.with(format_layer);
		subscriber.init();
	}
}
