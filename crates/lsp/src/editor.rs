//! The editor capability surface consumed by the bridge.

use std::path::{Path, PathBuf};

use crate::Result;
use crate::quickfix::QuickfixEntry;

/// Editor-control operations the bridge is allowed to perform.
///
/// Implementations wrap the editor's command channel; the bridge treats
/// them as an opaque capability surface. All methods are invoked from
/// the serialized event dispatch, except [`Self::show_hover`] which
/// background lookups may call.
pub trait Editor: Send + Sync {
	/// Inserts `lines` after 1-based line `after` in buffer `buf`
	/// (`after == 0` inserts before the first line).
	fn append_lines(&self, buf: i64, after: usize, lines: &[String]) -> Result<()>;

	/// Deletes 1-based lines `first..=last` from buffer `buf`.
	fn delete_lines(&self, buf: i64, first: usize, last: usize) -> Result<()>;

	/// Prepares buffer `buf` for a batch of line mutations: suppress
	/// automatic event hooks so no re-entrant callbacks fire, snapshot
	/// undo history so the batch coalesces into a single undo step, and
	/// suspend viewport-change callbacks.
	fn begin_edit_batch(&self, buf: i64) -> Result<()>;

	/// Ends a batch started by [`Self::begin_edit_batch`], restoring
	/// hooks and undo state. Callers invoke this on every exit path,
	/// including after a failed mutation.
	fn end_edit_batch(&self, buf: i64) -> Result<()>;

	/// Opens (or focuses) `path`, places the cursor at the 1-based
	/// editor position, and recenters the viewport best-effort.
	fn open_location(&self, path: &Path, line: usize, col: usize) -> Result<()>;

	/// Replaces the editor's problem list wholesale. The list is always
	/// concrete; an empty slice clears the display.
	fn set_problem_list(&self, entries: &[QuickfixEntry]) -> Result<()>;

	/// Shows a one-line message to the user.
	fn show_message(&self, text: &str);

	/// Shows hover text near the cursor. Best-effort; may arrive from a
	/// background task after the buffer has changed.
	fn show_hover(&self, text: &str);

	/// The editor's current working directory.
	fn cwd(&self) -> Result<PathBuf>;
}
