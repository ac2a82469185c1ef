//! Editor buffer entities tracked by the session.
//!
//! A [`Buffer`] is the session's last observation of one editor buffer:
//! handle, path, content, and the version counter reported to the
//! analysis service. Buffers are owned exclusively by the session and
//! mutated only through [`crate::sync::DocumentSync`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lsp_types::Uri;
use ropey::Rope;

use crate::{Result, uri_from_path};

/// Handle used for buffers that were never opened in the editor and
/// were read directly from disk, e.g. to resolve diagnostic positions
/// in unopened files.
pub const DETACHED_BUFFER: i64 = -1;

/// A single editor buffer as last observed by the session.
#[derive(Debug, Clone)]
pub struct Buffer {
	num: i64,
	path: PathBuf,
	contents: Rope,
	version: i32,
}

impl Buffer {
	/// Creates a buffer snapshot for the editor-assigned handle `num`.
	pub fn new(num: i64, path: impl Into<PathBuf>, text: &str, version: i32) -> Self {
		Self {
			num,
			path: path.into(),
			contents: Rope::from_str(text),
			version,
		}
	}

	/// Creates a detached buffer (handle [`DETACHED_BUFFER`]) for a file
	/// read straight from disk. Detached buffers exist only to support
	/// position translation and are never inserted into a [`BufferSet`].
	pub fn detached(path: impl Into<PathBuf>, text: &str) -> Self {
		Self::new(DETACHED_BUFFER, path, text, 0)
	}

	/// The editor-assigned buffer handle.
	pub fn num(&self) -> i64 {
		self.num
	}

	/// The file backing this buffer.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The buffer's location identifier.
	pub fn uri(&self) -> Result<Uri> {
		uri_from_path(&self.path)
	}

	/// The document version last reported to the analysis service.
	///
	/// 0 exactly once per buffer lifetime (first open), strictly
	/// increasing afterward; re-opening continues the sequence.
	pub fn version(&self) -> i32 {
		self.version
	}

	/// The buffer content.
	pub fn contents(&self) -> &Rope {
		&self.contents
	}

	/// The buffer content as an owned string.
	pub fn text(&self) -> String {
		self.contents.to_string()
	}
}

/// The buffers currently known to the session, keyed by editor handle.
#[derive(Debug, Default)]
pub struct BufferSet {
	buffers: HashMap<i64, Buffer>,
}

impl BufferSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Looks up a buffer by its editor handle.
	pub fn get(&self, num: i64) -> Option<&Buffer> {
		self.buffers.get(&num)
	}

	/// Inserts or replaces the buffer under its handle.
	pub fn insert(&mut self, buffer: Buffer) {
		self.buffers.insert(buffer.num(), buffer);
	}

	/// Finds the open buffer backing `uri`, if any.
	pub fn by_uri(&self, uri: &Uri) -> Option<&Buffer> {
		self.buffers
			.values()
			.find(|b| b.uri().map(|u| u.as_str() == uri.as_str()).unwrap_or(false))
	}

	/// Number of tracked buffers.
	pub fn len(&self) -> usize {
		self.buffers.len()
	}

	/// Whether no buffer has been observed yet.
	pub fn is_empty(&self) -> bool {
		self.buffers.is_empty()
	}
}
