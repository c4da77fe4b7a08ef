use super::{Fs, Kind};
use async_trait::async_trait;
use std::{ffi::OsString, io, path::Path};

/// The host's file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct Host;

#[async_trait]
impl Fs for Host {
	async fn symlink_metadata(&self, path: &Path) -> io::Result<Kind> {
		let file_type = tokio::fs::symlink_metadata(path).await?.file_type();
		let kind = if file_type.is_symlink() {
			Kind::Symlink
		} else if file_type.is_dir() {
			Kind::Directory
		} else {
			Kind::File
		};
		Ok(kind)
	}

	async fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
		let mut read_dir = tokio::fs::read_dir(path).await?;
		let mut names = Vec::new();
		while let Some(entry) = read_dir.next_entry().await? {
			names.push(entry.file_name());
		}
		Ok(names)
	}

	async fn remove_file(&self, path: &Path) -> io::Result<()> {
		// Directory symlinks and junctions must be removed as directories on Windows.
		#[cfg(windows)]
		{
			use std::os::windows::fs::FileTypeExt;
			let file_type = tokio::fs::symlink_metadata(path).await?.file_type();
			if file_type.is_symlink_dir() {
				return tokio::fs::remove_dir(path).await;
			}
		}
		tokio::fs::remove_file(path).await
	}

	async fn remove_dir(&self, path: &Path) -> io::Result<()> {
		tokio::fs::remove_dir(path).await
	}

	async fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()> {
		#[cfg(unix)]
		let permissions = {
			use std::os::unix::fs::PermissionsExt;
			std::fs::Permissions::from_mode(mode)
		};

		// Only the read-only attribute is expressible here.
		#[cfg(not(unix))]
		let permissions = {
			let mut permissions = tokio::fs::symlink_metadata(path).await?.permissions();
			permissions.set_readonly(mode & 0o222 == 0);
			permissions
		};

		tokio::fs::set_permissions(path, permissions).await
	}
}
