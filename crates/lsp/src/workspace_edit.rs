//! Multi-file edit grouping and rendering.
//!
//! A workspace-wide edit (rename, organize imports across files) comes
//! back from the service as edits scattered over URIs. [`FileEdits`]
//! groups them per file in stable path order; [`render_file_edits`]
//! materializes the result in one of several output modes, so the same
//! edit set can be previewed, diffed, listed, or written in place.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use lsp_types::{
	DocumentChangeOperation, DocumentChanges, OneOf, TextEdit, Uri, WorkspaceEdit,
};
use ropey::Rope;
use similar::TextDiff;
use tracing::debug;

use crate::apply::apply_edits;
use crate::buffer::BufferSet;
use crate::path_from_uri;
use crate::{Error, Result};

/// Edits grouped per file, ordered by path.
#[derive(Debug, Default)]
pub struct FileEdits {
	files: BTreeMap<String, Vec<TextEdit>>,
}

impl FileEdits {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `edits` for `filename`, appending to any existing set. Empty
	/// edit lists are dropped so they never produce output.
	pub fn insert(&mut self, filename: impl Into<String>, edits: Vec<TextEdit>) {
		if edits.is_empty() {
			return;
		}
		self.files.entry(filename.into()).or_default().extend(edits);
	}

	/// Groups a workspace edit per file.
	///
	/// Both encodings the protocol allows are accepted; resource
	/// operations (create/rename/delete files) are not, since they
	/// cannot be expressed as text edits.
	pub fn from_workspace_edit(edit: WorkspaceEdit) -> Result<Self> {
		let mut files = Self::new();
		if let Some(changes) = edit.changes {
			for (uri, edits) in changes {
				files.insert_uri(&uri, edits)?;
			}
		}
		match edit.document_changes {
			Some(DocumentChanges::Edits(doc_edits)) => {
				for doc_edit in doc_edits {
					let edits = flatten(doc_edit.edits);
					files.insert_uri(&doc_edit.text_document.uri, edits)?;
				}
			}
			Some(DocumentChanges::Operations(ops)) => {
				for op in ops {
					match op {
						DocumentChangeOperation::Edit(doc_edit) => {
							let edits = flatten(doc_edit.edits);
							files.insert_uri(&doc_edit.text_document.uri, edits)?;
						}
						DocumentChangeOperation::Op(_) => {
							return Err(Error::Protocol(
								"workspace edit contains file operations".to_string(),
							));
						}
					}
				}
			}
			None => {}
		}
		Ok(files)
	}

	fn insert_uri(&mut self, uri: &Uri, edits: Vec<TextEdit>) -> Result<()> {
		let path = path_from_uri(uri)?;
		let filename = path
			.to_str()
			.map(str::to_owned)
			.ok_or_else(|| Error::Protocol(format!("non-UTF-8 path: {}", path.display())))?;
		self.insert(filename, edits);
		Ok(())
	}

	/// The affected files and their edits, in path order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<TextEdit>)> {
		self.files.iter()
	}

	/// Number of affected files.
	pub fn len(&self) -> usize {
		self.files.len()
	}

	/// Whether no file is affected.
	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}
}

fn flatten(edits: Vec<OneOf<TextEdit, lsp_types::AnnotatedTextEdit>>) -> Vec<TextEdit> {
	edits
		.into_iter()
		.map(|edit| match edit {
			OneOf::Left(edit) => edit,
			OneOf::Right(annotated) => annotated.text_edit,
		})
		.collect()
}

/// How [`render_file_edits`] materializes an edit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
	/// Print each file's full new content to `out`.
	Print,
	/// Write each file's new content back to disk. With `preserve`, the
	/// original is kept next to it under `<file>.orig` first.
	Write {
		/// Keep a `<file>.orig` backup of the original content.
		preserve: bool,
	},
	/// Print a unified diff per changed file.
	Diff,
	/// Print the names of files that would change.
	List,
}

/// Applies each file's edits and renders the results per `mode`.
///
/// Original content comes from the open buffer when `buffers` holds
/// one for the file, from disk otherwise. Files are processed in path
/// order, so output (and on-disk write order) is deterministic for a
/// given edit set.
pub fn render_file_edits(
	files: &FileEdits,
	buffers: Option<&BufferSet>,
	mode: OutputMode,
	out: &mut dyn Write,
) -> Result<()> {
	let total = files.len();
	for (index, (filename, edits)) in files.iter().enumerate() {
		let path = Path::new(filename);
		let open = buffers.and_then(|b| {
			let uri = crate::uri_from_path(path).ok()?;
			b.by_uri(&uri).map(|buffer| buffer.text())
		});
		let original = match open {
			Some(text) => text,
			None => fs::read_to_string(path)?,
		};
		let new_content = apply_edits(&Rope::from_str(&original), edits)?;
		debug!(file = filename, edits = edits.len(), "rendered file edits");

		match mode {
			OutputMode::Print => {
				if total > 1 {
					let base = path
						.file_name()
						.map(|n| n.to_string_lossy().into_owned())
						.unwrap_or_else(|| filename.clone());
					writeln!(out, "{base}:")?;
				}
				write!(out, "{new_content}")?;
				if index + 1 < total {
					writeln!(out)?;
				}
			}
			OutputMode::Write { preserve } => {
				if preserve {
					// Rename rather than copy so the backup keeps the
					// original file's permissions.
					fs::rename(path, format!("{filename}.orig"))?;
				}
				fs::write(path, &new_content)?;
			}
			OutputMode::Diff => {
				if new_content != original {
					let diff = TextDiff::from_lines(&original, &new_content);
					write!(
						out,
						"{}",
						diff.unified_diff()
							.header(&format!("{filename}.orig"), filename)
					)?;
				}
			}
			OutputMode::List => {
				if new_content != original {
					writeln!(out, "{filename}")?;
				}
			}
		}
	}
	Ok(())
}
