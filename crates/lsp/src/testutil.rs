//! Test doubles for the editor and analysis-service seams.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use lsp_types::{
	CodeActionOrCommand, CompletionResponse, Hover, Location, Position, TextEdit, Uri,
	WorkspaceEdit,
};

use crate::Result;
use crate::editor::Editor;
use crate::quickfix::QuickfixEntry;
use crate::service::{AnalysisService, ServiceResult};

/// In-memory editor: buffers are plain line vectors, every side effect
/// is recorded.
#[derive(Default)]
pub(crate) struct VecEditor {
	pub lines: Mutex<HashMap<i64, Vec<String>>>,
	pub messages: Mutex<Vec<String>>,
	pub hovers: Mutex<Vec<String>>,
	pub problem_lists: Mutex<Vec<Vec<QuickfixEntry>>>,
	pub opened: Mutex<Vec<(PathBuf, usize, usize)>>,
	pub batches: Mutex<Vec<&'static str>>,
	pub cwd: PathBuf,
}

impl VecEditor {
	pub fn new() -> Self {
		Self {
			cwd: PathBuf::from("/"),
			..Self::default()
		}
	}

	pub fn with_buffer(num: i64, content: &str) -> Self {
		let editor = Self::new();
		editor.set_buffer(num, content);
		editor
	}

	pub fn set_buffer(&self, num: i64, content: &str) {
		let lines = content
			.strip_suffix('\n')
			.unwrap_or(content)
			.split('\n')
			.map(str::to_owned)
			.collect();
		self.lines.lock().unwrap().insert(num, lines);
	}

	/// Buffer content in string form (newline-terminated lines).
	pub fn content(&self, num: i64) -> String {
		let lines = self.lines.lock().unwrap();
		let mut out = lines.get(&num).cloned().unwrap_or_default().join("\n");
		out.push('\n');
		out
	}
}

impl Editor for VecEditor {
	fn append_lines(&self, buf: i64, after: usize, lines: &[String]) -> Result<()> {
		let mut all = self.lines.lock().unwrap();
		let target = all.entry(buf).or_default();
		for (offset, line) in lines.iter().enumerate() {
			target.insert(after + offset, line.clone());
		}
		Ok(())
	}

	fn delete_lines(&self, buf: i64, first: usize, last: usize) -> Result<()> {
		let mut all = self.lines.lock().unwrap();
		let target = all.entry(buf).or_default();
		target.drain(first - 1..last);
		Ok(())
	}

	fn begin_edit_batch(&self, _buf: i64) -> Result<()> {
		self.batches.lock().unwrap().push("begin");
		Ok(())
	}

	fn end_edit_batch(&self, _buf: i64) -> Result<()> {
		self.batches.lock().unwrap().push("end");
		Ok(())
	}

	fn open_location(&self, path: &Path, line: usize, col: usize) -> Result<()> {
		self.opened
			.lock()
			.unwrap()
			.push((path.to_path_buf(), line, col));
		Ok(())
	}

	fn set_problem_list(&self, entries: &[QuickfixEntry]) -> Result<()> {
		self.problem_lists.lock().unwrap().push(entries.to_vec());
		Ok(())
	}

	fn show_message(&self, text: &str) {
		self.messages.lock().unwrap().push(text.to_string());
	}

	fn show_hover(&self, text: &str) {
		self.hovers.lock().unwrap().push(text.to_string());
	}

	fn cwd(&self) -> Result<PathBuf> {
		Ok(self.cwd.clone())
	}
}

/// Analysis service with canned responses and a call log.
#[derive(Default)]
pub(crate) struct RecordingService {
	pub calls: Mutex<Vec<String>>,
	pub hover_response: Mutex<Option<Hover>>,
	pub definition_response: Mutex<Vec<Location>>,
	pub completion_response: Mutex<Option<CompletionResponse>>,
	pub formatting_response: Mutex<Option<Vec<TextEdit>>>,
	pub code_actions: Mutex<Vec<CodeActionOrCommand>>,
	pub rename_response: Mutex<Option<WorkspaceEdit>>,
}

impl RecordingService {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().clone()
	}

	fn record(&self, call: String) {
		self.calls.lock().unwrap().push(call);
	}
}

#[async_trait]
impl AnalysisService for RecordingService {
	async fn did_open(
		&self,
		uri: Uri,
		_language_id: String,
		version: i32,
		_text: String,
	) -> ServiceResult<()> {
		self.record(format!("didOpen {} v{version}", uri.as_str()));
		Ok(())
	}

	async fn did_change(&self, uri: Uri, version: i32, _text: String) -> ServiceResult<()> {
		self.record(format!("didChange {} v{version}", uri.as_str()));
		Ok(())
	}

	async fn hover(&self, uri: Uri, _position: Position) -> ServiceResult<Option<Hover>> {
		self.record(format!("hover {}", uri.as_str()));
		Ok(self.hover_response.lock().unwrap().clone())
	}

	async fn definition(&self, uri: Uri, _position: Position) -> ServiceResult<Vec<Location>> {
		self.record(format!("definition {}", uri.as_str()));
		Ok(self.definition_response.lock().unwrap().clone())
	}

	async fn completion(
		&self,
		uri: Uri,
		_position: Position,
	) -> ServiceResult<Option<CompletionResponse>> {
		self.record(format!("completion {}", uri.as_str()));
		Ok(self.completion_response.lock().unwrap().clone())
	}

	async fn formatting(&self, uri: Uri) -> ServiceResult<Option<Vec<TextEdit>>> {
		self.record(format!("formatting {}", uri.as_str()));
		Ok(self.formatting_response.lock().unwrap().clone())
	}

	async fn code_action(&self, uri: Uri) -> ServiceResult<Vec<CodeActionOrCommand>> {
		self.record(format!("codeAction {}", uri.as_str()));
		Ok(self.code_actions.lock().unwrap().clone())
	}

	async fn rename(
		&self,
		uri: Uri,
		_position: Position,
		new_name: String,
	) -> ServiceResult<Option<WorkspaceEdit>> {
		self.record(format!("rename {} -> {new_name}", uri.as_str()));
		Ok(self.rename_response.lock().unwrap().clone())
	}
}
