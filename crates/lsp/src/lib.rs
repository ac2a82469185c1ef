//! Bridge between a live editor's buffer state and a language server's
//! position/edit model.
//!
//! The bridge keeps the server's view of open documents consistent with
//! the editor's, translates between the editor's byte-oriented
//! coordinates and the protocol's UTF-16 coordinates, turns
//! protocol-level edits back into safe mutations of a live buffer or an
//! on-disk file, and carries the session state (jump history, problem
//! list, two-phase completion) that must survive across independent,
//! serialized editor callbacks.
//!
//! The two collaborators at the edges are opaque traits:
//! [`editor::Editor`] for editor-control calls and
//! [`service::AnalysisService`] for the `textDocument/*` operations.
//! Everything between them is owned by a single [`session::Session`]
//! that is only ever mutated from one serialized editor event at a
//! time.
//!
//! - [`position`]: editor (line, byte col) ⇄ protocol (line, UTF-16 col)
//! - [`apply`]: generic string-splicing edit application
//! - [`live`]: line-granular, undo-safe live-buffer edit application
//! - [`sync`]: buffer open/version/change bookkeeping
//! - [`workspace_edit`]: multi-file edit grouping and rendering
//! - [`quickfix`]: diagnostics aggregation into a problem list
//! - [`jumps`]: go-to-definition jump stack
//! - [`completion`]: two-phase completion session state
//! - [`tools`]: file-level format/imports/rename operations

use std::path::{Path, PathBuf};

/// Re-export of the [`lsp_types`] dependency of this crate.
pub use lsp_types;
use lsp_types::Uri;

pub mod apply;
pub mod buffer;
pub mod completion;
pub mod editor;
pub mod jumps;
pub mod live;
pub mod position;
pub mod quickfix;
pub mod service;
pub mod session;
pub mod sync;
pub mod tools;
pub mod workspace_edit;

#[cfg(test)]
mod testutil;

pub use apply::apply_edits;
pub use buffer::{Buffer, BufferSet, DETACHED_BUFFER};
pub use completion::{CompletionMatch, CompletionSession};
pub use editor::Editor;
pub use jumps::JumpStack;
pub use live::{LineOp, apply_line_edits, plan_line_edits};
pub use position::{Point, lsp_position_to_char, point_from_position, position_from_point};
pub use quickfix::{DiagnosticsState, QuickfixEntry};
pub use service::{AnalysisService, ServiceError, ServiceResult, hover_text};
pub use session::{FormatTool, Session};
pub use sync::DocumentSync;
pub use tools::{FilePosition, ORGANIZE_IMPORTS, format_file, organize_imports, rename_symbol};
pub use workspace_edit::{FileEdits, OutputMode, render_file_edits};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors.
///
/// No error here is fatal to the session: each operation is scoped to a
/// single editor event, and a failure aborts only that event's effect.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// A position does not resolve against the buffer's current content,
	/// e.g. it went stale after a concurrent edit or lands inside a
	/// code point.
	#[error("cannot resolve position {line}:{col} against current buffer content")]
	PositionResolution {
		/// Line of the offending position, in the coordinate system it
		/// was supplied in.
		line: usize,
		/// Column of the offending position.
		col: usize,
	},
	/// An edit is not expressible as whole-line insert/delete operations.
	#[error("edit not expressible as whole-line operations: {0}")]
	UnsupportedEditShape(String),
	/// A navigation query resolved to more than one location.
	#[error("query resolved to {0} locations; refusing to pick one")]
	MultiLocationAmbiguity(usize),
	/// A diagnostic's file cannot be expressed relative to the working
	/// directory.
	#[error("cannot express {path} relative to {cwd}")]
	RelativePath {
		/// The file that failed to relativize.
		path: PathBuf,
		/// The working directory it was relativized against.
		cwd: PathBuf,
	},
	/// An operation referenced a buffer the session has never observed.
	#[error("unknown buffer {0}")]
	UnknownBuffer(i64),
	/// A call to the analysis service failed.
	#[error("{op} failed: {message}")]
	Service {
		/// The protocol operation that failed.
		op: &'static str,
		/// The underlying failure.
		message: String,
	},
	/// Malformed protocol data (URIs, ranges, action shapes).
	#[error("protocol error: {0}")]
	Protocol(String),
	/// Input/output errors from disk-backed files.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl Error {
	/// Wraps a service-call failure with the failing operation's name.
	pub fn service(op: &'static str, err: impl std::fmt::Display) -> Self {
		Self::Service {
			op,
			message: err.to_string(),
		}
	}
}

/// Converts a filesystem path to a `file://` URI.
pub fn uri_from_path(path: &Path) -> Result<Uri> {
	let raw = path
		.to_str()
		.ok_or_else(|| Error::Protocol(format!("non-UTF-8 path: {}", path.display())))?;
	format!("file://{raw}")
		.parse()
		.map_err(|_| Error::Protocol(format!("cannot build file URI for {raw}")))
}

/// Converts a `file://` URI back to a filesystem path.
pub fn path_from_uri(uri: &Uri) -> Result<PathBuf> {
	uri.as_str()
		.strip_prefix("file://")
		.map(PathBuf::from)
		.ok_or_else(|| Error::Protocol(format!("not a file URI: {}", uri.as_str())))
}
