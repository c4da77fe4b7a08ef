use crate::retry::{Platform, BUSY_MAX_TRIES, BUSY_RETRY_DELAY};
use std::time::Duration;

/// The default number of file system operations in flight at once.
pub const FILE_PERMITS: usize = 16;

/// Options for a deleter.
#[derive(Clone, Debug)]
pub struct Options {
	/// Whether to recover from permission and busy failures.
	pub platform: Platform,

	/// The number of attempts made on a busy path before its failure is returned.
	pub busy_max_tries: u32,

	/// The delay between attempts on a busy path.
	pub busy_retry_delay: Duration,

	/// The maximum number of file system operations in flight at once, or `None` for no limit.
	pub file_permits: Option<usize>,
}

impl Default for Options {
	fn default() -> Self {
		Options {
			platform: Platform::host(),
			busy_max_tries: BUSY_MAX_TRIES,
			busy_retry_delay: BUSY_RETRY_DELAY,
			file_permits: Some(FILE_PERMITS),
		}
	}
}
