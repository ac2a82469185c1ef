//! File-level operations against files on disk, outside any live
//! editor buffer: format a file, organize its imports, rename a symbol
//! across the workspace. Each opens the on-disk content with the
//! service, collects the resulting edits, and hands them to
//! [`render_file_edits`] in the caller's chosen output mode.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use lsp_types::{CodeActionOrCommand, Uri};
use tracing::info;

use crate::buffer::Buffer;
use crate::position::position_from_point;
use crate::service::AnalysisService;
use crate::workspace_edit::{FileEdits, OutputMode, render_file_edits};
use crate::{Error, Point, Result, uri_from_path};

/// Title of the code action that rewrites a file's import block.
pub const ORGANIZE_IMPORTS: &str = "Organize Imports";

/// A position in a file, in editor coordinates (1-based line, 1-based
/// byte column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePosition {
	/// The file.
	pub path: PathBuf,
	/// 1-based line.
	pub line: usize,
	/// 1-based byte column.
	pub col: usize,
}

/// Reads `path` and opens it with the service at version 0. Returns
/// the URI and the content.
async fn open_file(
	service: &dyn AnalysisService,
	language_id: &str,
	path: &Path,
) -> Result<(Uri, String)> {
	let text = fs::read_to_string(path)?;
	let uri = uri_from_path(path)?;
	service
		.did_open(uri.clone(), language_id.to_string(), 0, text.clone())
		.await
		.map_err(|err| Error::service("textDocument/didOpen", err))?;
	Ok((uri, text))
}

fn filename(path: &Path) -> Result<String> {
	path.to_str()
		.map(str::to_owned)
		.ok_or_else(|| Error::Protocol(format!("non-UTF-8 path: {}", path.display())))
}

/// Formats `path` and renders the result per `mode`.
pub async fn format_file(
	service: &dyn AnalysisService,
	language_id: &str,
	path: &Path,
	mode: OutputMode,
	out: &mut dyn Write,
) -> Result<()> {
	let (uri, _) = open_file(service, language_id, path).await?;
	let edits = service
		.formatting(uri)
		.await
		.map_err(|err| Error::service("textDocument/formatting", err))?
		.unwrap_or_default();
	info!(file = %path.display(), edits = edits.len(), "formatted file");

	let mut files = FileEdits::new();
	files.insert(filename(path)?, edits);
	render_file_edits(&files, None, mode, out)
}

/// Organizes the imports of `path` and renders the result per `mode`.
///
/// The service offers import organization as a code action; only the
/// action titled [`ORGANIZE_IMPORTS`] is applied, any other offered
/// action is ignored.
pub async fn organize_imports(
	service: &dyn AnalysisService,
	language_id: &str,
	path: &Path,
	mode: OutputMode,
	out: &mut dyn Write,
) -> Result<()> {
	let (uri, _) = open_file(service, language_id, path).await?;
	let actions = service
		.code_action(uri)
		.await
		.map_err(|err| Error::service("textDocument/codeAction", err))?;

	let mut files = FileEdits::new();
	for action in actions {
		let CodeActionOrCommand::CodeAction(action) = action else {
			continue;
		};
		if action.title != ORGANIZE_IMPORTS {
			continue;
		}
		if let Some(edit) = action.edit {
			files = FileEdits::from_workspace_edit(edit)?;
		}
		break;
	}
	info!(file = %path.display(), files = files.len(), "organized imports");
	render_file_edits(&files, None, mode, out)
}

/// Renames the symbol at `position` to `new_name` across the
/// workspace, rendering every affected file per `mode`.
pub async fn rename_symbol(
	service: &dyn AnalysisService,
	language_id: &str,
	position: &FilePosition,
	new_name: &str,
	mode: OutputMode,
	out: &mut dyn Write,
) -> Result<()> {
	let (uri, text) = open_file(service, language_id, &position.path).await?;
	let snapshot = Buffer::detached(&position.path, &text);
	let protocol_position = position_from_point(
		&snapshot,
		Point {
			line: position.line,
			col: position.col,
		},
	)?;

	let edit = service
		.rename(uri, protocol_position, new_name.to_string())
		.await
		.map_err(|err| Error::service("textDocument/rename", err))?;
	let files = match edit {
		Some(edit) => FileEdits::from_workspace_edit(edit)?,
		None => FileEdits::new(),
	};
	info!(
		file = %position.path.display(),
		new_name,
		files = files.len(),
		"renamed symbol"
	);
	render_file_edits(&files, None, mode, out)
}
