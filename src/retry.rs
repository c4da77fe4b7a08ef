use crate::{error::Code, options::Options};
use std::{io, time::Duration};

/// The number of attempts made on a busy path before its failure is returned.
pub const BUSY_MAX_TRIES: u32 = 3;

/// The delay between attempts on a busy path.
pub const BUSY_RETRY_DELAY: Duration = Duration::from_millis(100);

/// The mode set on a path that could not be removed for lack of permission.
pub const PERMISSIVE_MODE: u32 = 0o666;

/// Whether permission bits and open handles can block deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
	/// Read only files and files held open by another process cannot be removed, as on Windows.
	Restrictive,

	Permissive,
}

/// The retry policy. It decides what to do with a failure on one path.
#[derive(Clone, Debug)]
pub struct Policy {
	platform: Platform,
	busy_max_tries: u32,
	busy_retry_delay: Duration,
}

/// What to do about a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
	/// The path is already gone.
	Ignore,

	/// Make the path readable and writable by everyone, then start over.
	RetryAfterFixingPermissions,

	/// Wait, then start over.
	RetryAfterDelay(Duration),

	/// Return the failure.
	Propagate,
}

/// The retry state of one path. It is never shared with the path's entries or siblings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct State {
	busy_tries: u32,
}

impl Platform {
	/// Get the platform this process runs on.
	#[must_use]
	pub fn host() -> Platform {
		if cfg!(windows) {
			Platform::Restrictive
		} else {
			Platform::Permissive
		}
	}

	#[must_use]
	pub fn is_restrictive(self) -> bool {
		matches!(self, Platform::Restrictive)
	}
}

impl Default for Platform {
	fn default() -> Self {
		Platform::host()
	}
}

impl Policy {
	#[must_use]
	pub fn new(platform: Platform) -> Policy {
		Policy {
			platform,
			busy_max_tries: BUSY_MAX_TRIES,
			busy_retry_delay: BUSY_RETRY_DELAY,
		}
	}

	#[must_use]
	pub fn with_busy_retries(mut self, max_tries: u32, delay: Duration) -> Policy {
		self.busy_max_tries = max_tries;
		self.busy_retry_delay = delay;
		self
	}

	#[must_use]
	pub fn platform(&self) -> Platform {
		self.platform
	}

	/// Classify a failure on a path.
	pub fn recover(&self, error: &io::Error, state: &mut State) -> Outcome {
		match (Code::of(error), self.platform) {
			// Deleting something that is already gone succeeds on every platform.
			(Some(Code::NotFound), _) => Outcome::Ignore,

			// The permission fix is not counted. It is expected to work the first time.
			(Some(Code::NotPermitted), Platform::Restrictive) => {
				Outcome::RetryAfterFixingPermissions
			},

			(Some(Code::Busy), Platform::Restrictive) => {
				if state.busy_tries >= self.busy_max_tries {
					Outcome::Propagate
				} else {
					state.busy_tries += 1;
					Outcome::RetryAfterDelay(self.busy_retry_delay)
				}
			},

			_ => Outcome::Propagate,
		}
	}
}

impl Default for Policy {
	fn default() -> Self {
		Policy::new(Platform::host())
	}
}

impl From<&Options> for Policy {
	fn from(options: &Options) -> Self {
		Policy::new(options.platform)
			.with_busy_retries(options.busy_max_tries, options.busy_retry_delay)
	}
}

impl State {
	#[must_use]
	pub fn new() -> State {
		State { busy_tries: 1 }
	}

	/// The number of attempts made so far, counting only busy failures.
	#[must_use]
	pub fn busy_tries(&self) -> u32 {
		self.busy_tries
	}
}

impl Default for State {
	fn default() -> Self {
		State::new()
	}
}
