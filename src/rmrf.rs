use crate::{
	error::{Error, Operation, Result},
	fs::{Fs, Host, Kind},
	options::Options,
	retry::{Outcome, Policy, State, PERMISSIVE_MODE},
};
use async_recursion::async_recursion;
use futures::future::join_all;
use std::{ffi::OsString, path::Path, sync::Arc};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Delete the file system object at the path and everything beneath it, with the default options.
pub async fn rmrf(path: impl AsRef<Path>) -> Result<()> {
	Deleter::new(Host, Options::default())
		.delete(path.as_ref())
		.await
}

/// Deletes file system objects and everything beneath them.
#[derive(Clone)]
pub struct Deleter {
	inner: Arc<Inner>,
}

struct Inner {
	fs: Box<dyn Fs>,
	policy: Policy,
	file_semaphore: Option<Semaphore>,
}

/// A failed attempt on one path.
enum Failure {
	/// An operation on the path itself failed. The policy decides what happens next.
	Path(Error),

	/// One of the directory's entries could not be deleted.
	Entry(Error),
}

impl Deleter {
	#[must_use]
	pub fn new(fs: impl Fs + 'static, options: Options) -> Deleter {
		let policy = Policy::from(&options);
		let file_semaphore = options
			.file_permits
			.filter(|permits| *permits > 0)
			.map(Semaphore::new);
		let inner = Inner {
			fs: Box::new(fs),
			policy,
			file_semaphore,
		};
		Deleter {
			inner: Arc::new(inner),
		}
	}

	#[must_use]
	pub fn policy(&self) -> &Policy {
		&self.inner.policy
	}

	/// Delete the file system object at the path and everything beneath it. It is not an error if there is nothing at the path.
	#[tracing::instrument(skip_all, fields(path = %path.display()))]
	pub async fn delete(&self, path: &Path) -> Result<()> {
		self.delete_path(path).await?;
		tracing::debug!("Deleted.");
		Ok(())
	}

	#[async_recursion]
	async fn delete_path(&self, path: &Path) -> Result<()> {
		let mut state = State::new();
		loop {
			let error = match self.try_delete_path(path).await {
				Ok(()) => return Ok(()),
				Err(Failure::Entry(error)) => return Err(error),
				Err(Failure::Path(error)) => error,
			};
			match self.inner.policy.recover(error.io(), &mut state) {
				Outcome::Ignore => {
					tracing::trace!(path = %path.display(), "Already gone.");
					return Ok(());
				},

				Outcome::RetryAfterFixingPermissions => {
					tracing::debug!(path = %path.display(), %error, "Fixing permissions.");
					self.set_permissions(path, PERMISSIVE_MODE).await?;
				},

				Outcome::RetryAfterDelay(delay) => {
					tracing::debug!(
						path = %path.display(),
						%error,
						tries = state.busy_tries(),
						?delay,
						"Busy, retrying."
					);
					tokio::time::sleep(delay).await;
				},

				Outcome::Propagate => return Err(error),
			}
		}
	}

	async fn try_delete_path(&self, path: &Path) -> Result<(), Failure> {
		// Get the kind without following a symlink.
		let kind = self.symlink_metadata(path).await.map_err(Failure::Path)?;

		// Files and symlinks are removed directly.
		if kind != Kind::Directory {
			self.remove_file(path).await.map_err(Failure::Path)?;
			return Ok(());
		}

		// Delete the entries concurrently, waiting for all of them.
		let names = self.read_dir(path).await.map_err(Failure::Path)?;
		let results = join_all(names.into_iter().map(|name| async move {
			let path = path.join(name);
			self.delete_path(&path).await
		}))
		.await;
		results
			.into_iter()
			.collect::<Result<Vec<()>>>()
			.map_err(Failure::Entry)?;

		// Remove the now empty directory.
		self.remove_dir(path).await.map_err(Failure::Path)?;

		Ok(())
	}

	async fn permit(&self) -> Option<SemaphorePermit<'_>> {
		match &self.inner.file_semaphore {
			Some(semaphore) => semaphore.acquire().await.ok(),
			None => None,
		}
	}

	async fn symlink_metadata(&self, path: &Path) -> Result<Kind> {
		let _permit = self.permit().await;
		tracing::trace!(path = %path.display(), "Getting the metadata.");
		self.inner
			.fs
			.symlink_metadata(path)
			.await
			.map_err(|error| Error::new(Operation::SymlinkMetadata, path, error))
	}

	async fn read_dir(&self, path: &Path) -> Result<Vec<OsString>> {
		let _permit = self.permit().await;
		tracing::trace!(path = %path.display(), "Reading the directory.");
		self.inner
			.fs
			.read_dir(path)
			.await
			.map_err(|error| Error::new(Operation::ReadDir, path, error))
	}

	async fn remove_file(&self, path: &Path) -> Result<()> {
		let _permit = self.permit().await;
		tracing::trace!(path = %path.display(), "Removing the file.");
		self.inner
			.fs
			.remove_file(path)
			.await
			.map_err(|error| Error::new(Operation::RemoveFile, path, error))
	}

	async fn remove_dir(&self, path: &Path) -> Result<()> {
		let _permit = self.permit().await;
		tracing::trace!(path = %path.display(), "Removing the directory.");
		self.inner
			.fs
			.remove_dir(path)
			.await
			.map_err(|error| Error::new(Operation::RemoveDir, path, error))
	}

	async fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
		let _permit = self.permit().await;
		self.inner
			.fs
			.set_permissions(path, mode)
			.await
			.map_err(|error| Error::new(Operation::SetPermissions, path, error))
	}
}
