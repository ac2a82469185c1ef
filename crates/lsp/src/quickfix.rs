//! Diagnostics aggregation into the editor's problem list.
//!
//! The analysis service publishes diagnostics per file, unordered and
//! at any time; the editor wants one flat, stably-ordered list. The
//! [`DiagnosticsState`] keeps the latest per-file sets plus a dirty
//! flag so the problem list is only rebuilt when something actually
//! changed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lsp_types::{Diagnostic, Uri};
use serde::Serialize;
use tracing::debug;

use crate::buffer::{Buffer, BufferSet};
use crate::path_from_uri;
use crate::position::point_from_position;
use crate::{Error, Result};

/// One problem-list entry, in the editor's coordinate system (1-based
/// line, 1-based byte column) with a path relative to the working
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickfixEntry {
	/// Path relative to the editor's working directory.
	pub filename: String,
	/// 1-based line.
	pub lnum: usize,
	/// 1-based byte column.
	pub col: usize,
	/// The diagnostic message.
	pub text: String,
}

/// Latest diagnostics per file, plus whether anything changed since the
/// problem list was last built.
#[derive(Default)]
pub struct DiagnosticsState {
	by_uri: HashMap<String, Vec<Diagnostic>>,
	changed: bool,
}

impl DiagnosticsState {
	/// Creates an empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records the latest diagnostics for `uri`, replacing any previous
	/// set for that file wholesale. An empty set clears the file's
	/// diagnostics but is still a change worth republishing.
	pub fn update(&mut self, uri: &Uri, diagnostics: Vec<Diagnostic>) {
		debug!(uri = uri.as_str(), count = diagnostics.len(), "diagnostics updated");
		self.by_uri.insert(uri.as_str().to_string(), diagnostics);
		self.changed = true;
	}

	/// Whether diagnostics changed since the last [`Self::problem_list`].
	pub fn is_changed(&self) -> bool {
		self.changed
	}

	/// Builds the flat problem list, or `None` if nothing changed since
	/// the last build.
	///
	/// Files come out in lexical URI order and diagnostics within a file
	/// keep their published order, so identical state always renders
	/// identically. Positions resolve against the open buffer's content
	/// when the file is loaded, and against the on-disk content
	/// otherwise.
	///
	/// The dirty flag clears even when a later step fails: a broken
	/// entry would fail identically on retry, and republishing the same
	/// failure on every event helps nobody.
	pub fn problem_list(
		&mut self,
		buffers: &BufferSet,
		cwd: &Path,
	) -> Result<Option<Vec<QuickfixEntry>>> {
		if !self.changed {
			return Ok(None);
		}
		self.changed = false;

		let mut files: Vec<(&String, &Vec<Diagnostic>)> = self.by_uri.iter().collect();
		files.sort_by(|a, b| a.0.cmp(b.0));

		let mut entries = Vec::new();
		for (raw_uri, diagnostics) in files {
			if diagnostics.is_empty() {
				continue;
			}
			let uri: Uri = raw_uri
				.parse()
				.map_err(|_| Error::Protocol(format!("bad diagnostic URI: {raw_uri}")))?;
			let path = path_from_uri(&uri)?;

			// Translate against live content when the file is open,
			// against the disk copy otherwise.
			let storage;
			let buffer = match buffers.by_uri(&uri) {
				Some(open) => open,
				None => {
					storage = Buffer::detached(&path, &fs::read_to_string(&path)?);
					&storage
				}
			};

			let filename = relative_to(&path, cwd)?;
			for diagnostic in diagnostics {
				let point = point_from_position(buffer, diagnostic.range.start)?;
				entries.push(QuickfixEntry {
					filename: filename.clone(),
					lnum: point.line,
					col: point.col,
					text: diagnostic.message.clone(),
				});
			}
		}
		Ok(Some(entries))
	}
}

/// Expresses `path` relative to `cwd`, walking up with `..` components
/// where needed.
fn relative_to(path: &Path, cwd: &Path) -> Result<String> {
	let mut base = cwd;
	let mut ups = PathBuf::new();
	loop {
		if let Ok(rest) = path.strip_prefix(base) {
			let rel = ups.join(rest);
			return rel
				.to_str()
				.map(str::to_owned)
				.ok_or_else(|| Error::Protocol(format!("non-UTF-8 path: {}", rel.display())));
		}
		match base.parent() {
			Some(parent) => {
				ups.push("..");
				base = parent;
			}
			None => {
				return Err(Error::RelativePath {
					path: path.to_path_buf(),
					cwd: cwd.to_path_buf(),
				});
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use lsp_types::{Position, Range};

	use super::*;

	fn diagnostic(line: u32, character: u32, message: &str) -> Diagnostic {
		Diagnostic {
			range: Range {
				start: Position { line, character },
				end: Position { line, character },
			},
			message: message.to_string(),
			..Diagnostic::default()
		}
	}

	fn open_buffers() -> BufferSet {
		let mut buffers = BufferSet::new();
		buffers.insert(Buffer::new(1, "/proj/a.go", "alpha\nbeta\n", 0));
		buffers.insert(Buffer::new(2, "/proj/b.go", "caf\u{e9} x\n", 0));
		buffers
	}

	#[test]
	fn test_entries_sorted_by_file_then_published_order() {
		let mut state = DiagnosticsState::new();
		let b: Uri = "file:///proj/b.go".parse().unwrap();
		let a: Uri = "file:///proj/a.go".parse().unwrap();
		state.update(&b, vec![diagnostic(0, 0, "late file")]);
		state.update(
			&a,
			vec![diagnostic(1, 0, "second line"), diagnostic(0, 0, "first line")],
		);

		let entries = state
			.problem_list(&open_buffers(), Path::new("/proj"))
			.unwrap()
			.unwrap();
		let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
		// Files in URI order; within a file, published order survives.
		assert_eq!(texts, vec!["second line", "first line", "late file"]);
		assert_eq!(entries[0].filename, "a.go");
		assert_eq!(entries[2].filename, "b.go");
	}

	#[test]
	fn test_identical_state_renders_identically() {
		let uri: Uri = "file:///proj/a.go".parse().unwrap();
		let diags = vec![diagnostic(0, 2, "x"), diagnostic(1, 1, "y")];
		let buffers = open_buffers();
		let cwd = Path::new("/proj");

		let mut first = DiagnosticsState::new();
		first.update(&uri, diags.clone());
		let mut second = DiagnosticsState::new();
		second.update(&uri, diags);

		assert_eq!(
			first.problem_list(&buffers, cwd).unwrap(),
			second.problem_list(&buffers, cwd).unwrap()
		);
	}

	#[test]
	fn test_unchanged_state_yields_none() {
		let mut state = DiagnosticsState::new();
		let buffers = open_buffers();
		assert_eq!(state.problem_list(&buffers, Path::new("/proj")).unwrap(), None);

		let uri: Uri = "file:///proj/a.go".parse().unwrap();
		state.update(&uri, vec![diagnostic(0, 0, "once")]);
		assert!(state.problem_list(&buffers, Path::new("/proj")).unwrap().is_some());
		// Nothing new since the last build.
		assert_eq!(state.problem_list(&buffers, Path::new("/proj")).unwrap(), None);
	}

	#[test]
	fn test_empty_set_clears_but_still_republishes() {
		let mut state = DiagnosticsState::new();
		let uri: Uri = "file:///proj/a.go".parse().unwrap();
		let buffers = open_buffers();
		let cwd = Path::new("/proj");

		state.update(&uri, vec![diagnostic(0, 0, "stale")]);
		state.problem_list(&buffers, cwd).unwrap();

		state.update(&uri, vec![]);
		let entries = state.problem_list(&buffers, cwd).unwrap().unwrap();
		assert!(entries.is_empty());
	}

	#[test]
	fn test_utf16_column_translated_to_byte_column() {
		let mut state = DiagnosticsState::new();
		let uri: Uri = "file:///proj/b.go".parse().unwrap();
		// "x" sits at UTF-16 offset 5 but byte offset 6 (é is 2 bytes).
		state.update(&uri, vec![diagnostic(0, 5, "shadowed")]);

		let entries = state
			.problem_list(&open_buffers(), Path::new("/proj"))
			.unwrap()
			.unwrap();
		assert_eq!(entries[0].lnum, 1);
		assert_eq!(entries[0].col, 7);
	}

	#[test]
	fn test_paths_outside_cwd_walk_up() {
		assert_eq!(
			relative_to(Path::new("/proj/sub/a.go"), Path::new("/proj")).unwrap(),
			"sub/a.go"
		);
		assert_eq!(
			relative_to(Path::new("/other/b.go"), Path::new("/proj/sub")).unwrap(),
			"../../other/b.go"
		);
	}

	#[test]
	fn test_entry_serializes_to_editor_shape() {
		let entry = QuickfixEntry {
			filename: "a.go".to_string(),
			lnum: 3,
			col: 7,
			text: "boom".to_string(),
		};
		assert_eq!(
			serde_json::to_value(&entry).unwrap(),
			serde_json::json!({"filename": "a.go", "lnum": 3, "col": 7, "text": "boom"})
		);
	}

	#[test]
	fn test_dirty_flag_clears_even_on_failure() {
		let mut state = DiagnosticsState::new();
		let uri: Uri = "file:///no/such/file.go".parse().unwrap();
		state.update(&uri, vec![diagnostic(0, 0, "gone")]);

		let buffers = BufferSet::new();
		assert!(state.problem_list(&buffers, Path::new("/")).is_err());
		assert!(!state.is_changed());
	}
}
