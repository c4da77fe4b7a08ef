use async_trait::async_trait;
use std::{ffi::OsString, io, path::Path, sync::Arc};

pub mod host;
#[cfg(test)]
pub mod memory;

pub use self::host::Host;

/// The kind of a file system object, observed without following symlinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
	File,
	Directory,

	/// A symlink, whatever it points to.
	Symlink,
}

/// The file system primitives a deleter is built on.
#[async_trait]
pub trait Fs: Send + Sync {
	/// Get the kind of the object at the path. A symlink is reported as itself, never as its target.
	async fn symlink_metadata(&self, path: &Path) -> io::Result<Kind>;

	/// Get the names of a directory's immediate entries.
	async fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>>;

	/// Remove a file or a symlink. A symlink is never traversed.
	async fn remove_file(&self, path: &Path) -> io::Result<()>;

	/// Remove an empty directory.
	async fn remove_dir(&self, path: &Path) -> io::Result<()>;

	async fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()>;
}

#[async_trait]
impl<T> Fs for Arc<T>
where
	T: Fs + ?Sized,
{
	async fn symlink_metadata(&self, path: &Path) -> io::Result<Kind> {
		self.as_ref().symlink_metadata(path).await
	}

	async fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
		self.as_ref().read_dir(path).await
	}

	async fn remove_file(&self, path: &Path) -> io::Result<()> {
		self.as_ref().remove_file(path).await
	}

	async fn remove_dir(&self, path: &Path) -> io::Result<()> {
		self.as_ref().remove_dir(path).await
	}

	async fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()> {
		self.as_ref().set_permissions(path, mode).await
	}
}
