//! Line-granular edit application for live buffers.
//!
//! Live-buffer APIs only support efficient whole-line operations and
//! must preserve the editor's undo history, so this applier expresses
//! every edit as line inserts and deletes instead of whole-content
//! replacement. Edits it cannot express — true intra-line
//! replacements, or multi-line spans carrying replacement text — are
//! rejected with [`Error::UnsupportedEditShape`]; this is a known
//! limitation of the line-oriented shape, not something to silently
//! work around.
//!
//! For any edit list whose members are all line-aligned, the resulting
//! content equals [`crate::apply::apply_edits`] on the same original.

use lsp_types::TextEdit;
use tracing::debug;

use crate::buffer::Buffer;
use crate::editor::Editor;
use crate::position::point_from_position;
use crate::{Error, Result};

/// A whole-line mutation of a live buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOp {
	/// Insert `lines` after 1-based line `after` (0 inserts before the
	/// first line).
	Append {
		/// Line the insertion goes after.
		after: usize,
		/// The lines to insert.
		lines: Vec<String>,
	},
	/// Delete 1-based lines `first..=last`.
	Delete {
		/// First deleted line.
		first: usize,
		/// Last deleted line.
		last: usize,
	},
}

/// Plans whole-line operations for `edits` against `buf`.
///
/// Operations come out ordered from the bottom of the buffer upward
/// (last edit first), so executing them in order never invalidates a
/// pending line number. The entire list is validated before anything
/// is returned; a rejected edit list therefore implies no buffer
/// mutation at all.
pub fn plan_line_edits(buf: &Buffer, edits: &[TextEdit]) -> Result<Vec<LineOp>> {
	let mut ops = Vec::new();
	for edit in edits.iter().rev() {
		let start = point_from_position(buf, edit.range.start)?;
		let end = point_from_position(buf, edit.range.end)?;

		if start.col != 1 || end.col != 1 {
			return Err(Error::UnsupportedEditShape(format!(
				"edit endpoints must sit at line start (start {}:{}, end {}:{})",
				start.line, start.col, end.line, end.col
			)));
		}

		if start.line != end.line {
			if !edit.new_text.is_empty() {
				return Err(Error::UnsupportedEditShape(format!(
					"multi-line span with replacement text {:?}",
					edit.new_text
				)));
			}
			ops.push(LineOp::Delete {
				first: start.line,
				last: end.line - 1,
			});
		} else {
			if edit.new_text.is_empty() {
				// equal start/end with nothing to insert
				continue;
			}
			let text = edit
				.new_text
				.strip_suffix('\n')
				.unwrap_or(&edit.new_text);
			ops.push(LineOp::Append {
				after: start.line - 1,
				lines: text.split('\n').map(str::to_owned).collect(),
			});
		}
	}
	Ok(ops)
}

/// Applies `edits` to the live buffer behind `buf` through the editor's
/// line primitives.
///
/// The caller is responsible for bracketing this in an edit batch
/// ([`Editor::begin_edit_batch`] / [`Editor::end_edit_batch`]) so hooks
/// stay quiet and the whole batch lands as one undo step.
pub fn apply_line_edits(editor: &dyn Editor, buf: &Buffer, edits: &[TextEdit]) -> Result<()> {
	let ops = plan_line_edits(buf, edits)?;
	debug!(buffer = buf.num(), ops = ops.len(), "applying line-granular edits");
	for op in &ops {
		match op {
			LineOp::Append { after, lines } => editor.append_lines(buf.num(), *after, lines)?,
			LineOp::Delete { first, last } => editor.delete_lines(buf.num(), *first, *last)?,
		}
	}
	Ok(())
}
