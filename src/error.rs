use std::{
	io,
	panic::Location,
	path::{Path, PathBuf},
};
use thiserror::Error;

/// A result.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error.
#[derive(Debug, Error)]
#[error(r#"Failed to {operation} "{}"."#, .path.display())]
pub struct Error {
	operation: Operation,
	path: PathBuf,
	location: &'static Location<'static>,
	#[source]
	source: io::Error,
}

/// The file system primitive that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	SymlinkMetadata,
	ReadDir,
	RemoveFile,
	RemoveDir,
	SetPermissions,
}

/// A failure code recognized by the retry policy. Every other failure is opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
	/// There is no file system object at the path.
	NotFound,

	/// The operation was not permitted.
	NotPermitted,

	/// The file system object is busy or locked.
	Busy,
}

pub struct Trace<'a>(&'a Error);

/// Windows reports a file opened by another process as a sharing or lock violation.
const ERROR_SHARING_VIOLATION: i32 = 32;
const ERROR_LOCK_VIOLATION: i32 = 33;

impl Error {
	#[must_use]
	#[track_caller]
	pub fn new(operation: Operation, path: impl Into<PathBuf>, source: io::Error) -> Error {
		Error {
			operation,
			path: path.into(),
			location: Location::caller(),
			source,
		}
	}

	#[must_use]
	pub fn operation(&self) -> Operation {
		self.operation
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	#[must_use]
	pub fn location(&self) -> &'static Location<'static> {
		self.location
	}

	/// The underlying error, exactly as the file system reported it.
	#[must_use]
	pub fn io(&self) -> &io::Error {
		&self.source
	}

	#[must_use]
	pub fn into_io(self) -> io::Error {
		self.source
	}

	#[must_use]
	pub fn kind(&self) -> io::ErrorKind {
		self.source.kind()
	}

	#[must_use]
	pub fn raw_os_error(&self) -> Option<i32> {
		self.source.raw_os_error()
	}

	#[must_use]
	pub fn code(&self) -> Option<Code> {
		Code::of(&self.source)
	}

	#[must_use]
	pub fn trace(&self) -> Trace<'_> {
		Trace(self)
	}
}

impl Code {
	#[must_use]
	pub fn of(error: &io::Error) -> Option<Code> {
		match error.kind() {
			io::ErrorKind::NotFound => return Some(Code::NotFound),
			io::ErrorKind::PermissionDenied => return Some(Code::NotPermitted),
			io::ErrorKind::ResourceBusy => return Some(Code::Busy),
			_ => {},
		}
		if cfg!(windows)
			&& matches!(
				error.raw_os_error(),
				Some(ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION)
			) {
			return Some(Code::Busy);
		}
		None
	}
}

impl std::fmt::Display for Operation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let operation = match self {
			Operation::SymlinkMetadata => "get the metadata of",
			Operation::ReadDir => "read the directory",
			Operation::RemoveFile => "remove the file",
			Operation::RemoveDir => "remove the directory",
			Operation::SetPermissions => "set the permissions of",
		};
		write!(f, "{operation}")
	}
}

impl<'a> std::fmt::Display for Trace<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let error = self.0;
		writeln!(f, "{error}")?;
		writeln!(f, "  {}", error.location)?;
		let mut source: Option<&dyn std::error::Error> = Some(&error.source);
		while let Some(error) = source {
			writeln!(f, "{error}")?;
			source = error.source();
		}
		Ok(())
	}
}
