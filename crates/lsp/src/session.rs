//! The per-editor session: one owner for all bridge state.
//!
//! A [`Session`] is driven by serialized editor events; the editor
//! delivers one callback at a time, so the session needs no internal
//! locking. The only concurrency is the background hover lookup, which
//! owns clones of the two edge [`Arc`]s and reports straight to the
//! editor when it completes.

use std::fs;
use std::sync::Arc;

use lsp_types::{Location, Position, Range, TextEdit, Uri};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::buffer::Buffer;
use crate::completion::{CompletionMatch, CompletionSession};
use crate::editor::Editor;
use crate::jumps::JumpStack;
use crate::live::apply_line_edits;
use crate::position::{point_from_position, position_from_point};
use crate::quickfix::DiagnosticsState;
use crate::service::{AnalysisService, hover_text};
use crate::sync::DocumentSync;
use crate::tools::ORGANIZE_IMPORTS;
use crate::workspace_edit::FileEdits;
use crate::{Error, Point, Result, apply_edits, path_from_uri};

/// Which tool rewrites the buffer on a format request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatTool {
	/// Formatting disabled.
	#[default]
	None,
	/// Plain whole-document formatting.
	Format,
	/// Formatting via the organize-imports code action.
	OrganizeImports,
}

/// All state for one editor instance talking to one analysis service.
pub struct Session {
	editor: Arc<dyn Editor>,
	service: Arc<dyn AnalysisService>,
	sync: DocumentSync,
	diagnostics: DiagnosticsState,
	jumps: JumpStack,
	completion: CompletionSession,
	format_tool: FormatTool,
}

impl Session {
	/// Creates a session reporting documents as `language_id`.
	pub fn new(
		editor: Arc<dyn Editor>,
		service: Arc<dyn AnalysisService>,
		language_id: impl Into<String>,
		format_tool: FormatTool,
	) -> Self {
		Self {
			editor,
			service: service.clone(),
			sync: DocumentSync::new(service, language_id),
			diagnostics: DiagnosticsState::new(),
			jumps: JumpStack::new(),
			completion: CompletionSession::new(),
			format_tool,
		}
	}

	/// Editor event: buffer `num` was loaded with `text` from `path`.
	pub async fn buf_read_post(&mut self, num: i64, path: &str, text: &str) -> Result<()> {
		self.sync.buf_read_post(num, path, text).await
	}

	/// Editor event: buffer `num`'s content changed to `text`.
	pub async fn buf_text_changed(&mut self, num: i64, text: &str) -> Result<()> {
		self.sync.buf_text_changed(num, text).await
	}

	/// Service notification: new diagnostics for `uri`. Refreshes the
	/// editor's problem list.
	pub fn publish_diagnostics(
		&mut self,
		uri: &Uri,
		diagnostics: Vec<lsp_types::Diagnostic>,
	) -> Result<()> {
		self.diagnostics.update(uri, diagnostics);
		self.update_quickfix()
	}

	/// Rebuilds and republishes the problem list if diagnostics changed
	/// since the last build.
	pub fn update_quickfix(&mut self) -> Result<()> {
		let cwd = self.editor.cwd()?;
		if let Some(entries) = self.diagnostics.problem_list(self.sync.buffers(), &cwd)? {
			self.editor.set_problem_list(&entries)?;
		}
		Ok(())
	}

	/// Formats buffer `num` in place with the configured tool.
	///
	/// The buffer is mutated through line-granular operations inside an
	/// edit batch, then the service is brought up to date with the new
	/// content. The batch ends on every path, including a failed
	/// mutation.
	pub async fn format_current_buffer(&mut self, num: i64) -> Result<()> {
		let buffer = self.sync.buffers().get(num).ok_or(Error::UnknownBuffer(num))?;
		let uri = buffer.uri()?;

		let edits = match self.format_tool {
			FormatTool::None => return Ok(()),
			FormatTool::Format => self
				.service
				.formatting(uri)
				.await
				.map_err(|err| Error::service("textDocument/formatting", err))?
				.unwrap_or_default(),
			FormatTool::OrganizeImports => self.organize_imports_edits(&uri).await?,
		};
		if edits.is_empty() {
			return Ok(());
		}
		let formatted = apply_edits(buffer.contents(), &edits)?;
		info!(buffer = num, edits = edits.len(), "formatting buffer");

		self.editor.begin_edit_batch(num)?;
		let applied = apply_line_edits(self.editor.as_ref(), buffer, &edits);
		let ended = self.editor.end_edit_batch(num);
		applied?;
		ended?;

		// Hooks were suppressed during the batch, so report the change
		// ourselves.
		self.sync.buf_text_changed(num, &formatted).await
	}

	/// Fetches the organize-imports edits for `uri`.
	///
	/// No offered action means nothing to do; more than one action with
	/// the expected title means the service's answer is ambiguous and
	/// the format is aborted rather than guessed at.
	pub async fn organize_imports_edits(&self, uri: &Uri) -> Result<Vec<TextEdit>> {
		let actions = self
			.service
			.code_action(uri.clone())
			.await
			.map_err(|err| Error::service("textDocument/codeAction", err))?;

		let mut matching = Vec::new();
		for action in actions {
			if let lsp_types::CodeActionOrCommand::CodeAction(action) = action
				&& action.title == ORGANIZE_IMPORTS
			{
				matching.push(action);
			}
		}
		match matching.len() {
			0 => Ok(Vec::new()),
			1 => {
				let action = matching.remove(0);
				let Some(edit) = action.edit else {
					return Ok(Vec::new());
				};
				let filename = path_from_uri(uri)?;
				let files = FileEdits::from_workspace_edit(edit)?;
				Ok(files
					.iter()
					.find(|(name, _)| std::path::Path::new(name) == filename)
					.map(|(_, edits)| edits.clone())
					.unwrap_or_default())
			}
			n => Err(Error::Protocol(format!(
				"received {n} \"{ORGANIZE_IMPORTS}\" actions; expected at most one"
			))),
		}
	}

	/// Completion phase one: queries candidates for the cursor at
	/// 1-based `(line, col)` in buffer `num` and returns the byte column
	/// the completed text starts at.
	pub async fn complete_find_start(
		&mut self,
		num: i64,
		line: usize,
		col: usize,
	) -> Result<usize> {
		let buffer = self.sync.buffers().get(num).ok_or(Error::UnknownBuffer(num))?;
		let uri = buffer.uri()?;
		let position = position_from_point(buffer, Point { line, col })?;
		let response = self
			.service
			.completion(uri, position)
			.await
			.map_err(|err| Error::service("textDocument/completion", err))?;
		Ok(self.completion.begin(col, response))
	}

	/// Completion phase two: the candidates parked by
	/// [`Self::complete_find_start`].
	pub fn complete_matches(&mut self) -> Vec<CompletionMatch> {
		self.completion.matches()
	}

	/// Jumps to the definition of the symbol under the cursor at
	/// 1-based `(line, col)` in buffer `num`, pushing the departure
	/// point onto the jump stack.
	pub async fn goto_definition(&mut self, num: i64, line: usize, col: usize) -> Result<()> {
		let buffer = self.sync.buffers().get(num).ok_or(Error::UnknownBuffer(num))?;
		let uri = buffer.uri()?;
		let position = position_from_point(buffer, Point { line, col })?;

		let locations = self
			.service
			.definition(uri.clone(), position)
			.await
			.map_err(|err| Error::service("textDocument/definition", err))?;
		match locations.as_slice() {
			[] => {
				self.editor.show_message("No definition exists under cursor");
				Ok(())
			}
			[target] => {
				self.jumps.push(Location {
					uri,
					range: Range {
						start: position,
						end: position,
					},
				});
				self.navigate(target)
			}
			many => Err(Error::MultiLocationAmbiguity(many.len())),
		}
	}

	/// Pops `count` entries off the jump stack and returns the cursor
	/// to the most recent departure point.
	pub fn goto_previous(&mut self, count: usize) -> Result<()> {
		let target = match self.jumps.rewind(count) {
			None => {
				self.editor.show_message("Already at top of stack");
				return Ok(());
			}
			Some(location) => location.clone(),
		};
		self.navigate(&target)
	}

	/// Moves the cursor to `location`, translating its position against
	/// the open buffer if the file is loaded and against the disk copy
	/// otherwise.
	fn navigate(&self, location: &Location) -> Result<()> {
		let path = path_from_uri(&location.uri)?;
		let storage;
		let buffer = match self.sync.buffers().by_uri(&location.uri) {
			Some(open) => open,
			None => {
				storage = Buffer::detached(&path, &fs::read_to_string(&path)?);
				&storage
			}
		};
		let point = point_from_position(buffer, location.range.start)?;
		self.editor.open_location(&path, point.line, point.col)
	}

	/// Hover text for the cursor at 1-based `(line, col)` in buffer
	/// `num`. Empty when the service has nothing to say.
	pub async fn hover(&self, num: i64, line: usize, col: usize) -> Result<String> {
		let (uri, position) = self.resolve_cursor(num, line, col)?;
		let hover = self
			.service
			.hover(uri, position)
			.await
			.map_err(|err| Error::service("textDocument/hover", err))?;
		Ok(hover.as_ref().map(hover_text).unwrap_or_default())
	}

	/// Like [`Self::hover`], but the service round trip runs on a
	/// background task and the result goes straight to the editor. The
	/// buffer may have changed by the time the text arrives; the editor
	/// shows it anyway.
	pub fn hover_background(&self, num: i64, line: usize, col: usize) -> Result<JoinHandle<()>> {
		let (uri, position) = self.resolve_cursor(num, line, col)?;
		let service = self.service.clone();
		let editor = self.editor.clone();
		Ok(tokio::spawn(async move {
			match service.hover(uri, position).await {
				Ok(Some(hover)) => editor.show_hover(&hover_text(&hover)),
				Ok(None) => {}
				Err(err) => {
					warn!(%err, "background hover failed");
					editor.show_message(&format!("failed to get hover details: {err}"));
				}
			}
		}))
	}

	fn resolve_cursor(&self, num: i64, line: usize, col: usize) -> Result<(Uri, Position)> {
		let buffer = self.sync.buffers().get(num).ok_or(Error::UnknownBuffer(num))?;
		Ok((
			buffer.uri()?,
			position_from_point(buffer, Point { line, col })?,
		))
	}

	/// The buffers currently tracked by this session.
	pub fn buffers(&self) -> &crate::buffer::BufferSet {
		self.sync.buffers()
	}

	/// Jump-stack depth, for status displays.
	pub fn jump_depth(&self) -> usize {
		self.jumps.depth()
	}
}
