use super::{Fs, Kind};
use crate::error::Operation;
use async_trait::async_trait;
use std::{
	collections::{BTreeMap, HashMap, VecDeque},
	ffi::OsString,
	io,
	path::{Path, PathBuf},
	sync::Mutex,
};
use tokio::time::Instant;

/// An in memory file system that records every call and fails on demand.
#[derive(Debug, Default)]
pub struct Memory {
	state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
	nodes: BTreeMap<PathBuf, Node>,
	failures: HashMap<(Operation, PathBuf), VecDeque<io::ErrorKind>>,
	calls: Vec<Call>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Node {
	File { mode: u32 },
	Directory { mode: u32 },
	Symlink { target: PathBuf },
}

#[derive(Clone, Debug)]
pub struct Call {
	pub operation: Operation,
	pub path: PathBuf,
	pub mode: Option<u32>,
	pub instant: Instant,
}

impl Memory {
	#[must_use]
	pub fn new() -> Memory {
		Memory::default()
	}

	/// Add a file, creating its ancestors.
	#[must_use]
	pub fn file(self, path: impl AsRef<Path>) -> Memory {
		self.insert(path.as_ref(), Node::File { mode: 0o644 });
		self
	}

	/// Add a symlink, creating its ancestors.
	#[must_use]
	pub fn symlink(self, path: impl AsRef<Path>, target: impl Into<PathBuf>) -> Memory {
		let target = target.into();
		self.insert(path.as_ref(), Node::Symlink { target });
		self
	}

	/// Fail the next calls of an operation on a path with these kinds, in order.
	#[must_use]
	pub fn fail(
		self,
		operation: Operation,
		path: impl Into<PathBuf>,
		kinds: impl IntoIterator<Item = io::ErrorKind>,
	) -> Memory {
		self.state
			.lock()
			.unwrap()
			.failures
			.entry((operation, path.into()))
			.or_default()
			.extend(kinds);
		self
	}

	/// Get the paths of every remaining object, sorted.
	#[must_use]
	pub fn paths(&self) -> Vec<PathBuf> {
		self.state.lock().unwrap().nodes.keys().cloned().collect()
	}

	#[must_use]
	pub fn exists(&self, path: impl AsRef<Path>) -> bool {
		self.state
			.lock()
			.unwrap()
			.nodes
			.contains_key(path.as_ref())
	}

	#[must_use]
	pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
		match self.state.lock().unwrap().nodes.get(path.as_ref())? {
			Node::File { mode } | Node::Directory { mode } => Some(*mode),
			Node::Symlink { .. } => None,
		}
	}

	#[must_use]
	pub fn calls(&self) -> Vec<Call> {
		self.state.lock().unwrap().calls.clone()
	}

	/// Get the calls of an operation on a path.
	#[must_use]
	pub fn calls_to(&self, operation: Operation, path: impl AsRef<Path>) -> Vec<Call> {
		self.calls()
			.into_iter()
			.filter(|call| call.operation == operation && call.path == path.as_ref())
			.collect()
	}

	fn insert(&self, path: &Path, node: Node) {
		let mut state = self.state.lock().unwrap();
		for ancestor in path.ancestors().skip(1) {
			if ancestor.parent().is_none() || ancestor.as_os_str().is_empty() {
				break;
			}
			state
				.nodes
				.entry(ancestor.to_owned())
				.or_insert(Node::Directory { mode: 0o755 });
		}
		state.nodes.insert(path.to_owned(), node);
	}

	/// Record a call, then either fail it or run it against the state.
	async fn call<T>(
		&self,
		operation: Operation,
		path: &Path,
		mode: Option<u32>,
		f: impl FnOnce(&mut BTreeMap<PathBuf, Node>) -> io::Result<T>,
	) -> io::Result<T> {
		tokio::task::yield_now().await;
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call {
			operation,
			path: path.to_owned(),
			mode,
			instant: Instant::now(),
		});
		let failure = state
			.failures
			.get_mut(&(operation, path.to_owned()))
			.and_then(VecDeque::pop_front);
		if let Some(kind) = failure {
			return Err(io::Error::from(kind));
		}
		f(&mut state.nodes)
	}
}

fn not_found() -> io::Error {
	io::Error::from(io::ErrorKind::NotFound)
}

fn children<'a>(
	nodes: &'a BTreeMap<PathBuf, Node>,
	path: &'a Path,
) -> impl Iterator<Item = &'a PathBuf> + 'a {
	nodes.keys().filter(move |key| key.parent() == Some(path))
}

#[async_trait]
impl Fs for Memory {
	async fn symlink_metadata(&self, path: &Path) -> io::Result<Kind> {
		self.call(Operation::SymlinkMetadata, path, None, |nodes| {
			let kind = match nodes.get(path).ok_or_else(not_found)? {
				Node::File { .. } => Kind::File,
				Node::Directory { .. } => Kind::Directory,
				Node::Symlink { .. } => Kind::Symlink,
			};
			Ok(kind)
		})
		.await
	}

	async fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
		self.call(Operation::ReadDir, path, None, |nodes| {
			match nodes.get(path).ok_or_else(not_found)? {
				Node::Directory { .. } => {},
				_ => return Err(io::Error::from(io::ErrorKind::NotADirectory)),
			}
			let names = children(nodes, path)
				.filter_map(|child| child.file_name())
				.map(ToOwned::to_owned)
				.collect();
			Ok(names)
		})
		.await
	}

	async fn remove_file(&self, path: &Path) -> io::Result<()> {
		self.call(Operation::RemoveFile, path, None, |nodes| {
			match nodes.get(path).ok_or_else(not_found)? {
				Node::Directory { .. } => Err(io::Error::from(io::ErrorKind::IsADirectory)),
				Node::File { .. } | Node::Symlink { .. } => {
					nodes.remove(path);
					Ok(())
				},
			}
		})
		.await
	}

	async fn remove_dir(&self, path: &Path) -> io::Result<()> {
		self.call(Operation::RemoveDir, path, None, |nodes| {
			match nodes.get(path).ok_or_else(not_found)? {
				Node::Directory { .. } => {},
				_ => return Err(io::Error::from(io::ErrorKind::NotADirectory)),
			}
			if children(nodes, path).next().is_some() {
				return Err(io::Error::from(io::ErrorKind::DirectoryNotEmpty));
			}
			nodes.remove(path);
			Ok(())
		})
		.await
	}

	async fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()> {
		self.call(Operation::SetPermissions, path, Some(mode), |nodes| {
			// Follow a symlink, as chmod does.
			let path = match nodes.get(path).ok_or_else(not_found)? {
				Node::Symlink { target } => target.clone(),
				_ => path.to_owned(),
			};
			match nodes.get_mut(&path).ok_or_else(not_found)? {
				Node::File { mode: current } | Node::Directory { mode: current } => {
					*current = mode;
					Ok(())
				},
				Node::Symlink { .. } => Err(io::Error::from(io::ErrorKind::Unsupported)),
			}
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn test_ancestors_are_created() {
		let memory = Memory::new().file("/test/foo/bar/3.md");
		assert_eq!(
			memory.paths(),
			vec![
				PathBuf::from("/test"),
				PathBuf::from("/test/foo"),
				PathBuf::from("/test/foo/bar"),
				PathBuf::from("/test/foo/bar/3.md"),
			]
		);
	}

	#[tokio::test]
	async fn test_failures_are_consumed_in_order() {
		let memory = Memory::new().file("/test/1.md").fail(
			Operation::SymlinkMetadata,
			"/test/1.md",
			[io::ErrorKind::ResourceBusy, io::ErrorKind::PermissionDenied],
		);
		let path = Path::new("/test/1.md");

		let error = memory.symlink_metadata(path).await.unwrap_err();
		assert_eq!(error.kind(), io::ErrorKind::ResourceBusy);
		let error = memory.symlink_metadata(path).await.unwrap_err();
		assert_eq!(error.kind(), io::ErrorKind::PermissionDenied);
		assert_eq!(memory.symlink_metadata(path).await.unwrap(), Kind::File);
		assert_eq!(memory.calls_to(Operation::SymlinkMetadata, path).len(), 3);
	}

	#[tokio::test]
	async fn test_remove_dir_requires_empty() {
		let memory = Memory::new().file("/test/1.md");
		let error = memory.remove_dir(Path::new("/test")).await.unwrap_err();
		assert_eq!(error.kind(), io::ErrorKind::DirectoryNotEmpty);
		memory.remove_file(Path::new("/test/1.md")).await.unwrap();
		memory.remove_dir(Path::new("/test")).await.unwrap();
		assert!(memory.paths().is_empty());
	}
}
