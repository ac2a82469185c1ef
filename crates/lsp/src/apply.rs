//! Generic edit application: splice an edit list into full document
//! content.
//!
//! Used whenever the result is a full replacement string (write to
//! disk, print, or feed to a diff renderer). Live buffers are mutated
//! through [`crate::live`] instead.

use lsp_types::TextEdit;
use ropey::Rope;

use crate::position::lsp_position_to_char;
use crate::{Error, Result};

/// Applies `edits` to `text` and returns the new full content.
///
/// Every range is resolved against the *original* content before any
/// splice, then edits are applied from the highest start offset to the
/// lowest so a completed splice never shifts the offsets of edits
/// still pending. Arbitrary sub-line ranges are legal; overlapping
/// ranges are rejected with [`Error::Protocol`].
pub fn apply_edits(text: &Rope, edits: &[TextEdit]) -> Result<String> {
	let mut resolved = Vec::with_capacity(edits.len());
	for (index, edit) in edits.iter().enumerate() {
		let start = lsp_position_to_char(text, edit.range.start)?;
		let end = lsp_position_to_char(text, edit.range.end)?;
		if start > end {
			return Err(Error::Protocol(format!(
				"edit range starts after it ends ({:?})",
				edit.range
			)));
		}
		resolved.push((start, end, index, edit.new_text.as_str()));
	}
	// Highest start first; for equal starts the later edit goes first,
	// matching strict last-to-first application.
	resolved.sort_by(|a, b| b.0.cmp(&a.0).then(b.2.cmp(&a.2)));

	// Resolved offsets are only valid if no edit reaches into the span
	// of one already applied.
	for pair in resolved.windows(2) {
		if pair[1].1 > pair[0].0 {
			return Err(Error::Protocol(format!(
				"overlapping edit ranges ({}..{} and {}..{})",
				pair[1].0, pair[1].1, pair[0].0, pair[0].1
			)));
		}
	}

	let mut out = text.clone();
	for (start, end, _, new_text) in resolved {
		out.remove(start..end);
		out.insert(start, new_text);
	}
	Ok(out.to_string())
}
