//! The analysis-service surface consumed by the bridge.
//!
//! The service is an opaque RPC peer exposing `textDocument/*`
//! operations; how results are computed, ranked, or transported is not
//! this crate's concern. Implementations live with the transport.

use async_trait::async_trait;
use lsp_types::{
	CodeActionOrCommand, CompletionResponse, Hover, HoverContents, Location, MarkedString,
	Position, TextEdit, Uri, WorkspaceEdit,
};

/// Error from a single service call.
///
/// Callers wrap it with the failing operation's name via
/// [`crate::Error::service`]; the failure is surfaced to the user and
/// never fatal to the session.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
	/// Creates a service error from any displayable failure.
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

/// Result alias for service calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// The `textDocument/*` operations of the analysis service.
#[async_trait]
pub trait AnalysisService: Send + Sync {
	/// `textDocument/didOpen` with full document content.
	async fn did_open(
		&self,
		uri: Uri,
		language_id: String,
		version: i32,
		text: String,
	) -> ServiceResult<()>;

	/// `textDocument/didChange` carrying the entire new content
	/// (full-document sync, not incremental).
	async fn did_change(&self, uri: Uri, version: i32, text: String) -> ServiceResult<()>;

	/// `textDocument/hover`.
	async fn hover(&self, uri: Uri, position: Position) -> ServiceResult<Option<Hover>>;

	/// `textDocument/definition`.
	async fn definition(&self, uri: Uri, position: Position) -> ServiceResult<Vec<Location>>;

	/// `textDocument/completion`.
	async fn completion(
		&self,
		uri: Uri,
		position: Position,
	) -> ServiceResult<Option<CompletionResponse>>;

	/// `textDocument/formatting` over the whole document.
	async fn formatting(&self, uri: Uri) -> ServiceResult<Option<Vec<TextEdit>>>;

	/// `textDocument/codeAction` over the whole document.
	async fn code_action(&self, uri: Uri) -> ServiceResult<Vec<CodeActionOrCommand>>;

	/// `textDocument/rename`.
	async fn rename(
		&self,
		uri: Uri,
		position: Position,
		new_name: String,
	) -> ServiceResult<Option<WorkspaceEdit>>;
}

/// Extracts trimmed display text from hover contents.
pub fn hover_text(hover: &Hover) -> String {
	fn marked(value: &MarkedString) -> &str {
		match value {
			MarkedString::String(s) => s,
			MarkedString::LanguageString(l) => &l.value,
		}
	}

	let text = match &hover.contents {
		HoverContents::Scalar(value) => marked(value).to_string(),
		HoverContents::Array(values) => values
			.iter()
			.map(marked)
			.collect::<Vec<_>>()
			.join("\n"),
		HoverContents::Markup(markup) => markup.value.clone(),
	};
	text.trim().to_string()
}
